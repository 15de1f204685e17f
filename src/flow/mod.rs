//! The flow engine's solving layer: the BFS/augment kernel (C2, `bfs`) and
//! the Edmonds–Karp solver built on it (C3, `edmonds_karp`).

pub mod bfs;
pub mod edmonds_karp;

pub use edmonds_karp::{augment_excluding_edge, augment_excluding_vertex, maxflow, total_flow_at};
