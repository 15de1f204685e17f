//! The ablation engine (§4.6, C6): drain the flow through a vertex or edge,
//! then re-maximise under an exclusion mask, without recomputing a max-flow
//! from zero.

use std::collections::VecDeque;

use tracing::{info, info_span};

use crate::error::Result;
use crate::flow;
use crate::network::{EdgeIndex, Network, VertexIndex};

/// Take a station out of commission: drain every drop of flow through it,
/// then re-maximise the network so the restored flow never uses it again
/// (§4.6).
pub fn station_out_of_commission(net: &mut Network, station: VertexIndex) -> Result<f64> {
    let span = info_span!("station_out_of_commission");
    let _enter = span.enter();
    drain_vertex(net, station);
    let flow = flow::augment_excluding_vertex(net, station)?;
    info!(flow, "station ablated");
    Ok(flow)
}

/// Take a pipeline out of commission: drain both endpoints (the second only
/// when the pipe is bidirectional), then re-maximise the network excluding
/// the pipe's edge(s) (§4.6).
pub fn pipeline_out_of_commission(
    net: &mut Network,
    a: VertexIndex,
    b: VertexIndex,
    unidirectional: bool,
) -> Result<f64> {
    let span = info_span!("pipeline_out_of_commission");
    let _enter = span.enter();
    drain_vertex(net, a);
    if !unidirectional {
        drain_vertex(net, b);
    }
    let flow = flow::augment_excluding_edge(net, a, b, unidirectional)?;
    info!(flow, "pipeline ablated");
    Ok(flow)
}

/// Drain every unit of flow passing through `v`, by alternately cancelling
/// cycles through `v` and source-to-sink paths through `v`, until neither
/// remains (§4.6 primitive). Each iteration strictly reduces one of those
/// two quantities, so the loop terminates.
fn drain_vertex(net: &mut Network, v: VertexIndex) {
    loop {
        if let Some(cycle) = find_flow_cycle(net, v) {
            cancel(net, &cycle);
            continue;
        }
        let (Some(source), Some(target)) = (net.super_source(), net.super_target()) else {
            break;
        };
        let outbound = find_forward_flow_path(net, v, target);
        let inbound = find_forward_flow_path(net, source, v);
        match (inbound, outbound) {
            (Some(mut through_path), Some(rest)) => {
                through_path.extend(rest);
                cancel(net, &through_path);
            }
            _ => break,
        }
    }
}

/// Subtract the minimum flow among `edges` from every edge in `edges`.
fn cancel(net: &mut Network, edges: &[EdgeIndex]) {
    let delta = edges
        .iter()
        .map(|&e| net.edge(e).flow())
        .fold(f64::INFINITY, f64::min);
    for &e in edges {
        net.edge_mut(e).add_flow(-delta);
    }
}

/// Find the shortest cycle of positive-flow edges that returns to `v`, if
/// one exists. Returns the cycle's edges in traversal order starting and
/// ending at `v`.
fn find_flow_cycle(net: &mut Network, v: VertexIndex) -> Option<Vec<EdgeIndex>> {
    net.reset_scratch();
    let mut queue = VecDeque::new();

    let seeds: Vec<EdgeIndex> = net.vertex(v).outgoing().to_vec();
    for e in seeds {
        if net.edge(e).flow() <= 0.0 {
            continue;
        }
        let w = net.edge(e).destination();
        if w == v {
            return Some(vec![e]);
        }
        if !net.visited(w) {
            net.set_visited(w, true);
            net.set_path_edge(w, e);
            queue.push_back(w);
        }
    }
    net.set_visited(v, true);

    while let Some(u) = queue.pop_front() {
        let outgoing: Vec<EdgeIndex> = net.vertex(u).outgoing().to_vec();
        for e in outgoing {
            if net.edge(e).flow() <= 0.0 {
                continue;
            }
            let w = net.edge(e).destination();
            if w == v {
                return Some(reconstruct_flow_path(net, u, e, v));
            }
            if !net.visited(w) {
                net.set_visited(w, true);
                net.set_path_edge(w, e);
                queue.push_back(w);
            }
        }
    }
    None
}

/// Find a path of positive-flow edges from `s` to `t`, if one exists.
fn find_forward_flow_path(net: &mut Network, s: VertexIndex, t: VertexIndex) -> Option<Vec<EdgeIndex>> {
    net.reset_scratch();
    if s == t {
        return Some(Vec::new());
    }
    let mut queue = VecDeque::new();
    net.set_visited(s, true);
    queue.push_back(s);
    while let Some(u) = queue.pop_front() {
        let outgoing: Vec<EdgeIndex> = net.vertex(u).outgoing().to_vec();
        for e in outgoing {
            if net.edge(e).flow() <= 0.0 {
                continue;
            }
            let w = net.edge(e).destination();
            if w == t {
                return Some(reconstruct_flow_path(net, u, e, s));
            }
            if !net.visited(w) {
                net.set_visited(w, true);
                net.set_path_edge(w, e);
                queue.push_back(w);
            }
        }
    }
    None
}

/// Walk the `path_edge` chain back from `last_hop_from` to `root`, then
/// append the final edge `closing_edge` that reaches the target.
fn reconstruct_flow_path(
    net: &Network,
    last_hop_from: VertexIndex,
    closing_edge: EdgeIndex,
    root: VertexIndex,
) -> Vec<EdgeIndex> {
    let mut edges = vec![closing_edge];
    let mut current = last_hop_from;
    while current != root {
        let e = net
            .path_edge(current)
            .expect("flow-path BFS chain must reach its root");
        edges.push(e);
        current = net.edge(e).origin();
    }
    edges.reverse();
    edges
}
