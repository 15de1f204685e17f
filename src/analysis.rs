//! The analysis façade (§4.8, C8): the query surface every report and CLI
//! menu entry is built from. Every "what-if" takes its own
//! [`Network::deep_copy`] so the baseline solved network is never disturbed.

use serde::Serialize;
use tracing::info_span;

use crate::ablation;
use crate::error::{Error, Result};
use crate::flow;
use crate::load_balance::{self, LoadOptimizationReport};
use crate::network::{Network, VertexIndex, VertexKind};

/// Tolerance below which two flow totals are considered equal — floating
/// point arithmetic over repeated augmentations accumulates small error.
const EPSILON: f64 = 1e-6;

/// Which family of vertex `not_essential` enumerates over (§4.8).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EssentialKind {
    /// Reservoirs.
    Reservoir,
    /// Pumping stations.
    Station,
}

/// A city whose demand is not fully met.
#[derive(Clone, Debug, Serialize)]
pub struct Deficit {
    /// The city's code.
    pub city: String,
    /// The city's stated demand.
    pub demand: f64,
    /// `demand - flow`.
    pub deficit: f64,
}

/// A city's realised flow before and after some ablation.
#[derive(Clone, Debug, Serialize)]
pub struct CityImpact {
    /// The city's code.
    pub city: String,
    /// Flow realised at the city before ablation.
    pub before: f64,
    /// Flow realised at the city after ablation.
    pub after: f64,
}

/// The per-city list of pipelines whose ablation changes that city's
/// realised flow (§4.8, `essential_pipelines`, inverted to a per-city view).
#[derive(Clone, Debug, Serialize)]
pub struct PipelineCityImpact {
    /// The city's code.
    pub city: String,
    /// `(pipe_a, pipe_b)` pairs naming every pipeline whose ablation changes
    /// this city's realised flow.
    pub affecting_pipelines: Vec<(String, String)>,
}

/// Realised flow at the city named `code`.
pub fn city_flow(net: &Network, code: &str) -> Result<f64> {
    let index = require_vertex(net, code)?;
    Ok(net.vertex(index).flow())
}

/// Every city whose demand exceeds its realised flow, with the shortfall.
#[must_use]
pub fn deficit_report(net: &Network) -> Vec<Deficit> {
    let mut deficits = Vec::new();
    for index in net.vertex_indices() {
        let vertex = net.vertex(index);
        if let VertexKind::City { demand } = vertex.kind() {
            let shortfall = demand - vertex.flow();
            if shortfall > EPSILON {
                deficits.push(Deficit {
                    city: vertex.code().to_string(),
                    demand: *demand,
                    deficit: shortfall,
                });
            }
        }
    }
    deficits
}

/// The subset of reservoirs or stations whose ablation leaves total realised
/// flow unchanged (§4.8). Requires a baseline solve to already be present on
/// `net` (its super-target must exist).
pub fn not_essential(net: &Network, kind: EssentialKind) -> Result<Vec<String>> {
    let span = info_span!("not_essential", ?kind);
    let _enter = span.enter();
    let target = net
        .super_target()
        .ok_or_else(|| Error::DegenerateTopology {
            reason: "no baseline solve has been run".to_string(),
        })?;
    let baseline = flow::total_flow_at(net, target);

    let mut survivors = Vec::new();
    for index in net.vertex_indices() {
        let matches = match (kind, net.vertex(index).kind()) {
            (EssentialKind::Reservoir, VertexKind::Reservoir { .. }) => true,
            (EssentialKind::Station, VertexKind::PumpingStation) => true,
            _ => false,
        };
        if !matches {
            continue;
        }
        let mut snapshot = net.deep_copy();
        ablation::station_out_of_commission(&mut snapshot, index)?;
        let snapshot_target = snapshot.super_target().expect("deep copy keeps super vertices");
        let after = flow::total_flow_at(&snapshot, snapshot_target);
        if (baseline - after).abs() <= EPSILON {
            survivors.push(net.vertex(index).code().to_string());
        }
    }
    Ok(survivors)
}

/// The full per-city old-vs-new flow table after ablating the vertex named
/// `code` (reservoir or station).
pub fn component_impact(net: &Network, code: &str) -> Result<Vec<CityImpact>> {
    let index = require_vertex(net, code)?;
    let mut snapshot = net.deep_copy();
    ablation::station_out_of_commission(&mut snapshot, index)?;
    Ok(city_impacts(net, &snapshot))
}

/// The full per-city old-vs-new flow table after ablating the pipeline
/// between `a` and `b`.
pub fn pipeline_impact(net: &Network, a: &str, b: &str) -> Result<Vec<CityImpact>> {
    let (a_index, b_index, unidirectional) = pipeline_endpoints(net, a, b)?;
    let mut snapshot = net.deep_copy();
    ablation::pipeline_out_of_commission(&mut snapshot, a_index, b_index, unidirectional)?;
    Ok(city_impacts(net, &snapshot))
}

/// For every pipeline in the network, ablate it on its own snapshot and
/// record which cities' realised flow changed; invert that into a per-city
/// list of affecting pipelines (§4.8).
pub fn essential_pipelines(net: &Network) -> Result<Vec<PipelineCityImpact>> {
    let span = info_span!("essential_pipelines");
    let _enter = span.enter();
    let mut affecting: Vec<(String, Vec<(String, String)>)> = net
        .vertex_indices()
        .filter(|&i| matches!(net.vertex(i).kind(), VertexKind::City { .. }))
        .map(|i| (net.vertex(i).code().to_string(), Vec::new()))
        .collect();

    for (a, b, unidirectional) in pipelines(net) {
        let mut snapshot = net.deep_copy();
        ablation::pipeline_out_of_commission(&mut snapshot, a, b, unidirectional)?;
        let a_code = net.vertex(a).code().to_string();
        let b_code = net.vertex(b).code().to_string();
        for (city_code, pipelines) in &mut affecting {
            let city_index = net
                .find_vertex(city_code)
                .expect("city codes are collected from net itself");
            let before = net.vertex(city_index).flow();
            let after = snapshot.vertex(city_index).flow();
            if (before - after).abs() > EPSILON {
                pipelines.push((a_code.clone(), b_code.clone()));
            }
        }
    }

    Ok(affecting
        .into_iter()
        .map(|(city, affecting_pipelines)| PipelineCityImpact {
            city,
            affecting_pipelines,
        })
        .collect())
}

/// Run the load balancer (§4.5) on a snapshot of `net` and report the
/// before/after slack metrics, leaving `net` itself untouched (§4.8).
#[must_use]
pub fn optimize_load(net: &Network, max_iterations: usize) -> LoadOptimizationReport {
    let mut snapshot = net.deep_copy();
    let before = crate::metrics::compute(&snapshot);
    load_balance::balance(&mut snapshot, max_iterations);
    let after = crate::metrics::compute(&snapshot);
    LoadOptimizationReport { before, after }
}

fn city_impacts(before: &Network, after: &Network) -> Vec<CityImpact> {
    before
        .vertex_indices()
        .filter_map(|index| match before.vertex(index).kind() {
            VertexKind::City { .. } => Some(CityImpact {
                city: before.vertex(index).code().to_string(),
                before: before.vertex(index).flow(),
                after: after.vertex(index).flow(),
            }),
            _ => None,
        })
        .collect()
}

/// Every distinct pipeline in the network as `(origin, destination,
/// unidirectional)`, each bidirectional pair counted once.
fn pipelines(net: &Network) -> Vec<(VertexIndex, VertexIndex, bool)> {
    let mut pairs = Vec::new();
    for e in net.edge_indices() {
        let edge = net.edge(e);
        if net.vertex(edge.origin()).kind().is_super() || net.vertex(edge.destination()).kind().is_super() {
            continue;
        }
        match edge.reverse() {
            None => pairs.push((edge.origin(), edge.destination(), true)),
            Some(reverse) if e < reverse => pairs.push((edge.origin(), edge.destination(), false)),
            Some(_) => {}
        }
    }
    pairs
}

fn pipeline_endpoints(net: &Network, a: &str, b: &str) -> Result<(VertexIndex, VertexIndex, bool)> {
    let a_index = require_vertex(net, a)?;
    let b_index = require_vertex(net, b)?;
    let forward = net.edges_between(a_index, b_index);
    let edge = forward.first().ok_or_else(|| Error::UnknownEntity {
        code: format!("{a}-{b}"),
    })?;
    let unidirectional = net.edge(*edge).reverse().is_none();
    Ok((a_index, b_index, unidirectional))
}

fn require_vertex(net: &Network, code: &str) -> Result<VertexIndex> {
    net.find_vertex(code).ok_or_else(|| Error::UnknownEntity {
        code: code.to_string(),
    })
}
