//! Edmonds–Karp (§4.3): repeatedly call the BFS kernel until no augmenting
//! path remains. Also home to the exclusion-aware re-maximisation helpers the
//! ablation engine (§4.6) layers on top of the same kernel.

use tracing::{debug, info_span};

use crate::error::{Error, Result};
use crate::flow::bfs;
use crate::network::{Network, VertexIndex};

/// Compute (or extend) a maximum flow from the network's super-source to its
/// super-target, creating the super vertices on first use (§4.3, §9).
///
/// Returns the total realised flow. Fails with [`Error::DegenerateTopology`]
/// if the network has no reservoirs or no cities.
pub fn maxflow(net: &mut Network) -> Result<f64> {
    let span = info_span!("maxflow");
    let _enter = span.enter();
    let (source, target) = net.ensure_super_vertices()?;
    if source == target {
        return Err(Error::DegenerateTopology {
            reason: "source and target coincide".to_string(),
        });
    }
    let flow = drive(net, source, target, bfs::find_path);
    net.refresh_vertex_flows();
    debug!(flow, "maxflow converged");
    Ok(flow)
}

/// Re-maximise flow from super-source to super-target while never routing
/// through `blocked` (§4.6, station ablation's second phase).
pub fn augment_excluding_vertex(net: &mut Network, blocked: VertexIndex) -> Result<f64> {
    let span = info_span!("augment_excluding_vertex");
    let _enter = span.enter();
    let (source, target) = net.ensure_super_vertices()?;
    let flow = drive(net, source, target, |net, s, t| {
        bfs::find_path_excluding_vertex(net, s, t, blocked)
    });
    net.refresh_vertex_flows();
    Ok(flow)
}

/// Re-maximise flow from super-source to super-target while never using the
/// edge `a -> b` (and, unless `unidirectional`, never `b -> a` either); §4.6,
/// pipeline ablation's second phase.
pub fn augment_excluding_edge(
    net: &mut Network,
    a: VertexIndex,
    b: VertexIndex,
    unidirectional: bool,
) -> Result<f64> {
    let span = info_span!("augment_excluding_edge");
    let _enter = span.enter();
    let (source, target) = net.ensure_super_vertices()?;
    let flow = drive(net, source, target, |net, s, t| {
        bfs::find_path_excluding_edge(net, s, t, a, b, unidirectional)
    });
    net.refresh_vertex_flows();
    Ok(flow)
}

/// Drive the kernel with `find_path` until it stops finding augmenting
/// paths, returning the total flow realised at `target`.
fn drive(
    net: &mut Network,
    source: VertexIndex,
    target: VertexIndex,
    mut find_path: impl FnMut(&mut Network, VertexIndex, VertexIndex) -> bool,
) -> f64 {
    while find_path(net, source, target) {
        let amount = bfs::path_bottleneck(net, source, target);
        bfs::augment_path(net, source, target, amount);
    }
    total_flow_at(net, target)
}

/// Total flow realised at `target` — the sum of flow on its incoming edges.
/// Equal, by conservation, to the sum of flow on the super-source's outgoing
/// edges (§3 P3).
#[must_use]
pub fn total_flow_at(net: &Network, target: VertexIndex) -> f64 {
    net.vertex(target)
        .incoming()
        .iter()
        .map(|&e| net.edge(e).flow())
        .sum()
}
