//! Per-edge slack statistics (§4.4): how much headroom the current flow
//! leaves on the network's pipes, and how evenly it is spread.

use serde::Serialize;

use crate::network::Network;

/// Slack statistics over every edge not incident to a super-source or
/// super-target, and whose capacity is positive (§4.4, §7 item 4: zero
/// capacity edges are skipped rather than contributing a synthetic zero).
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Metrics {
    /// Average `capacity - flow` across eligible edges.
    pub average_absolute_slack: f64,
    /// Average `(capacity - flow) / capacity` across eligible edges.
    pub average_relative_slack: f64,
    /// Largest `capacity - flow` among eligible edges.
    pub max_absolute_slack: f64,
    /// Largest `(capacity - flow) / capacity` among eligible edges.
    pub max_relative_slack: f64,
    /// Population variance (divisor N) of absolute slack.
    pub variance_absolute_slack: f64,
    /// Population variance (divisor N) of relative slack.
    pub variance_relative_slack: f64,
    /// `variance_absolute_slack.sqrt()`.
    pub stdev_absolute_slack: f64,
    /// `variance_relative_slack.sqrt()`.
    pub stdev_relative_slack: f64,
    /// Σ demand over every city vertex.
    pub total_demand: f64,
    /// Σ realised flow over every city vertex.
    pub total_achieved_flow: f64,
}

/// Compute [`Metrics`] for the current state of `net`.
#[must_use]
pub fn compute(net: &Network) -> Metrics {
    let mut absolute: Vec<f64> = Vec::new();
    let mut relative: Vec<f64> = Vec::new();

    for edge_index in net.edge_indices() {
        let edge = net.edge(edge_index);
        if edge.capacity() <= 0.0 {
            continue;
        }
        let origin_super = net.vertex(edge.origin()).kind().is_super();
        let destination_super = net.vertex(edge.destination()).kind().is_super();
        if origin_super || destination_super {
            continue;
        }
        absolute.push(edge.absolute_slack());
        relative.push(edge.relative_slack());
    }

    let (average_absolute_slack, variance_absolute_slack, max_absolute_slack) =
        summarize(&absolute);
    let (average_relative_slack, variance_relative_slack, max_relative_slack) =
        summarize(&relative);

    let mut total_demand = 0.0;
    let mut total_achieved_flow = 0.0;
    for vertex_index in net.vertex_indices() {
        let vertex = net.vertex(vertex_index);
        if let crate::network::VertexKind::City { demand } = vertex.kind() {
            total_demand += demand;
            total_achieved_flow += vertex.flow();
        }
    }

    Metrics {
        average_absolute_slack,
        average_relative_slack,
        max_absolute_slack,
        max_relative_slack,
        variance_absolute_slack,
        variance_relative_slack,
        stdev_absolute_slack: variance_absolute_slack.sqrt(),
        stdev_relative_slack: variance_relative_slack.sqrt(),
        total_demand,
        total_achieved_flow,
    }
}

/// Returns `(average, population variance, max)` of `values`, all `0.0` for
/// an empty slice.
fn summarize(values: &[f64]) -> (f64, f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0, 0.0);
    }
    let n = values.len() as f64;
    let average = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - average).powi(2)).sum::<f64>() / n;
    let max = values.iter().copied().fold(f64::MIN, f64::max);
    (average, variance, max)
}
