//! One breadth-first search over the residual graph, in three flavours that
//! differ only in which edges they relax (§4.2): plain, vertex-masked, and
//! edge-masked. All three are layered on a single private kernel so the
//! residual-arithmetic and path-reconstruction logic lives in one place.

use std::collections::VecDeque;

use crate::network::{EdgeIndex, Network, VertexIndex};

/// Find an augmenting path from `s` to `t` in the residual graph.
///
/// Returns `true` if a path exists; on success `t`'s `path_edge` chain (and
/// every intermediate vertex's) leads back to `s` and can be walked with
/// [`path_bottleneck`] and [`augment_path`].
pub fn find_path(net: &mut Network, s: VertexIndex, t: VertexIndex) -> bool {
    search(net, s, t, |_| true, |_| true)
}

/// Find an augmenting path from `s` to `t` that never passes through
/// `blocked` (used to re-maximise flow after a station has been drained).
pub fn find_path_excluding_vertex(
    net: &mut Network,
    s: VertexIndex,
    t: VertexIndex,
    blocked: VertexIndex,
) -> bool {
    search(net, s, t, |v| v != blocked, |_| true)
}

/// Find an augmenting path from `s` to `t` that never uses the edge `a -> b`
/// (and, when `unidirectional` is `false`, never uses `b -> a` either).
pub fn find_path_excluding_edge(
    net: &mut Network,
    s: VertexIndex,
    t: VertexIndex,
    a: VertexIndex,
    b: VertexIndex,
    unidirectional: bool,
) -> bool {
    let mut forbidden = net.edges_between(a, b);
    if !unidirectional {
        forbidden.extend(net.edges_between(b, a));
    }
    search(net, s, t, |_| true, move |e| !forbidden.contains(&e))
}

/// The residual neighbours of `u`: for each outgoing edge with spare forward
/// capacity, `(destination, edge, forward = true)`; for each incoming edge
/// with positive flow, `(origin, edge, forward = false)` — the implicit
/// back-arc of §4.2.
fn residual_neighbors(net: &Network, u: VertexIndex) -> Vec<(VertexIndex, EdgeIndex)> {
    let mut neighbors = Vec::new();
    for &e in net.vertex(u).outgoing() {
        let edge = net.edge(e);
        if edge.absolute_slack() > 0.0 {
            neighbors.push((edge.destination(), e));
        }
    }
    for &e in net.vertex(u).incoming() {
        let edge = net.edge(e);
        if edge.flow() > 0.0 {
            neighbors.push((edge.origin(), e));
        }
    }
    neighbors
}

fn search(
    net: &mut Network,
    s: VertexIndex,
    t: VertexIndex,
    mut vertex_allowed: impl FnMut(VertexIndex) -> bool,
    mut edge_allowed: impl FnMut(EdgeIndex) -> bool,
) -> bool {
    net.reset_scratch();
    if s == t {
        return true;
    }
    let mut queue = VecDeque::new();
    net.set_visited(s, true);
    queue.push_back(s);
    while let Some(u) = queue.pop_front() {
        for (w, e) in residual_neighbors(net, u) {
            if net.visited(w) || !vertex_allowed(w) || !edge_allowed(e) {
                continue;
            }
            net.set_visited(w, true);
            net.set_path_edge(w, e);
            if w == t {
                return true;
            }
            queue.push_back(w);
        }
    }
    false
}

/// The bottleneck (minimum residual) along the path most recently found by
/// one of the `find_path*` functions, from `s` to `t`.
///
/// # Panics
///
/// Panics if `t`'s `path_edge` chain does not lead back to `s` — callers must
/// only invoke this right after a successful `find_path*` call on the same
/// `net`, `s`, `t`.
#[must_use]
pub fn path_bottleneck(net: &Network, s: VertexIndex, t: VertexIndex) -> f64 {
    let mut bottleneck = f64::INFINITY;
    let mut current = t;
    while current != s {
        let e = net
            .path_edge(current)
            .expect("path_edge chain must reach s");
        let edge = net.edge(e);
        let residual = if edge.destination() == current {
            edge.absolute_slack()
        } else {
            edge.flow()
        };
        bottleneck = bottleneck.min(residual);
        current = if edge.destination() == current {
            edge.origin()
        } else {
            edge.destination()
        };
    }
    bottleneck
}

/// Push `amount` of flow along the path most recently found by one of the
/// `find_path*` functions, from `s` to `t`: forward edges gain flow, backward
/// (implicit reverse-arc) edges lose it.
pub fn augment_path(net: &mut Network, s: VertexIndex, t: VertexIndex, amount: f64) {
    let mut current = t;
    while current != s {
        let e = net
            .path_edge(current)
            .expect("path_edge chain must reach s");
        let forward = net.edge(e).destination() == current;
        current = if forward {
            let origin = net.edge(e).origin();
            net.edge_mut(e).add_flow(amount);
            origin
        } else {
            let destination = net.edge(e).destination();
            net.edge_mut(e).add_flow(-amount);
            destination
        };
    }
}
