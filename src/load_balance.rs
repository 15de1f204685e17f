//! The load balancer (§4.5, C5): shifts flow off the tightest edges onto
//! slack alternatives without changing total throughput.

use serde::Serialize;
use tracing::{debug, info_span};

use crate::metrics::{self, Metrics};
use crate::network::{EdgeIndex, Network, VertexIndex};

/// One traversal step of a residual path found by [`widest_alternative`]:
/// the edge, and whether it was used in its forward sense (gains flow) or as
/// an implicit backward arc (loses flow) — mirrors `flow::bfs::augment_path`.
struct Step {
    edge: EdgeIndex,
    forward: bool,
}

/// Run the load balancer on `net` in place, for at most `max_iterations`
/// rounds (§4.5, §9: the hard cap the crate always enforces alongside the
/// original's weaker OR-based convergence test).
pub fn balance(net: &mut Network, max_iterations: usize) {
    let span = info_span!("load_balance");
    let _enter = span.enter();
    let mut previous = metrics::compute(net);
    for iteration in 0..max_iterations {
        run_iteration(net);
        net.refresh_vertex_flows();
        let current = metrics::compute(net);
        let improved = current.average_absolute_slack < previous.average_absolute_slack
            || current.average_relative_slack < previous.average_relative_slack
            || current.variance_absolute_slack < previous.variance_absolute_slack
            || current.variance_relative_slack < previous.variance_relative_slack;
        debug!(iteration, improved, "load balance round");
        previous = current;
        if !improved {
            break;
        }
    }
}

/// One pass over every eligible edge (§4.5 step 1–2).
fn run_iteration(net: &mut Network) {
    let order = ordered_edges(net);
    for edge_index in order {
        let flow = net.edge(edge_index).flow();
        if flow <= 0.0 {
            continue;
        }
        let origin = net.edge(edge_index).origin();
        let destination = net.edge(edge_index).destination();
        let Some((bottleneck, path)) =
            widest_alternative(net, origin, destination, edge_index)
        else {
            continue;
        };
        let delta = bottleneck.min(flow);
        if delta <= 0.0 {
            continue;
        }
        net.edge_mut(edge_index).add_flow(-delta);
        for step in path {
            let amount = if step.forward { delta } else { -delta };
            net.edge_mut(step.edge).add_flow(amount);
        }
    }
}

/// Edges eligible for rebalancing (not incident to a super vertex, positive
/// capacity), sorted ascending by relative slack, ties broken by descending
/// flow (§4.5 step 1).
fn ordered_edges(net: &Network) -> Vec<EdgeIndex> {
    let mut edges: Vec<EdgeIndex> = net
        .edge_indices()
        .filter(|&e| {
            let edge = net.edge(e);
            edge.capacity() > 0.0
                && !net.vertex(edge.origin()).kind().is_super()
                && !net.vertex(edge.destination()).kind().is_super()
        })
        .collect();
    edges.sort_by(|&a, &b| {
        let ea = net.edge(a);
        let eb = net.edge(b);
        ea.relative_slack()
            .partial_cmp(&eb.relative_slack())
            .unwrap()
            .then(eb.flow().partial_cmp(&ea.flow()).unwrap())
    });
    edges
}

/// Enumerate every simple residual path from `origin` to `destination`,
/// excluding `excluded` itself, and return the one with the widest
/// bottleneck along with its step list (§4.5 step 2: "the path whose minimum
/// residual is largest").
///
/// Exhaustive DFS over simple paths: acceptable for the municipal-scale
/// networks this crate targets, but exponential in the worst case — this
/// crate does not memoise or prune beyond the visited-set check a simple
/// path requires.
fn widest_alternative(
    net: &Network,
    origin: VertexIndex,
    destination: VertexIndex,
    excluded: EdgeIndex,
) -> Option<(f64, Vec<Step>)> {
    let mut visited = vec![origin];
    let mut path = Vec::new();
    let mut best: Option<(f64, Vec<Step>)> = None;
    search(
        net,
        origin,
        destination,
        excluded,
        f64::INFINITY,
        &mut visited,
        &mut path,
        &mut best,
    );
    best
}

#[allow(clippy::too_many_arguments)]
fn search(
    net: &Network,
    u: VertexIndex,
    destination: VertexIndex,
    excluded: EdgeIndex,
    bottleneck_so_far: f64,
    visited: &mut Vec<VertexIndex>,
    path: &mut Vec<Step>,
    best: &mut Option<(f64, Vec<Step>)>,
) {
    if u == destination && !path.is_empty() {
        let improves = match best {
            Some((b, _)) => bottleneck_so_far > *b,
            None => true,
        };
        if improves {
            *best = Some((bottleneck_so_far, path.clone()));
        }
        return;
    }
    for &e in net.vertex(u).outgoing() {
        if e == excluded {
            continue;
        }
        let edge = net.edge(e);
        let residual = edge.absolute_slack();
        if residual <= 0.0 {
            continue;
        }
        let w = edge.destination();
        if visited.contains(&w) {
            continue;
        }
        visited.push(w);
        path.push(Step { edge: e, forward: true });
        search(
            net,
            w,
            destination,
            excluded,
            bottleneck_so_far.min(residual),
            visited,
            path,
            best,
        );
        path.pop();
        visited.pop();
    }
    for &e in net.vertex(u).incoming() {
        if e == excluded {
            continue;
        }
        let edge = net.edge(e);
        let residual = edge.flow();
        if residual <= 0.0 {
            continue;
        }
        let w = edge.origin();
        if visited.contains(&w) {
            continue;
        }
        visited.push(w);
        path.push(Step { edge: e, forward: false });
        search(
            net,
            w,
            destination,
            excluded,
            bottleneck_so_far.min(residual),
            visited,
            path,
            best,
        );
        path.pop();
        visited.pop();
    }
}

/// Before/after metrics of a single [`balance`] run, as returned to callers
/// that need the comparison (`analysis::optimize_load`).
#[derive(Clone, Copy, Debug, Serialize)]
pub struct LoadOptimizationReport {
    /// Metrics computed before the balancer ran.
    pub before: Metrics,
    /// Metrics computed after the balancer settled.
    pub after: Metrics,
}
