#![deny(missing_docs)]

//! Flow analysis for a municipal water-distribution network.
//!
//! The core of this crate is the flow engine: [`network`] (the capacitated
//! graph), [`flow`] (the BFS/augment kernel and Edmonds–Karp solver),
//! [`metrics`] and [`load_balance`] (slack accounting and redistribution),
//! and [`ablation`] (surgically removing a vertex or edge's contribution to
//! an existing max-flow). [`analysis`] bundles those into the query surface
//! a report writer or CLI menu is built from.
//!
//! Around that core sits the ambient stack every shippable crate needs:
//! [`ingest`] (CSV loading), [`report`] (CSV emission), [`config`] (runtime
//! options), [`error`] (the crate-wide error type), and [`cli`] (the
//! interactive menu driving the binary in `src/bin/water_network.rs`).

pub mod ablation;
pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod flow;
pub mod ingest;
pub mod load_balance;
pub mod metrics;
pub mod network;
pub mod report;
