//! The end-to-end scenarios from §8: trivial, split, alternate-path,
//! redundant-station, bidirectional-balancing, and essential-edge-ablation.

use water_network::analysis::{self, EssentialKind};
use water_network::network::{Network, VertexKind};
use water_network::{ablation, flow, metrics};

#[test]
fn trivial_reservoir_feeds_city() {
    let mut net = Network::new();
    net.add_vertex("R", VertexKind::Reservoir { max_delivery: 10.0 });
    net.add_vertex("C", VertexKind::City { demand: 10.0 });
    net.add_edge("R", "C", 10.0, 0.0);

    let total = flow::maxflow(&mut net).unwrap();
    assert_eq!(total, 10.0);
    assert_eq!(analysis::city_flow(&net, "C").unwrap(), 10.0);
    assert!(analysis::deficit_report(&net).is_empty());

    let survivors = analysis::not_essential(&net, EssentialKind::Reservoir).unwrap();
    assert!(!survivors.contains(&"R".to_string()), "R is essential, not a survivor");
}

#[test]
fn split_across_two_unit_capacity_stations() {
    let mut net = Network::new();
    net.add_vertex("R", VertexKind::Reservoir { max_delivery: 15.0 });
    net.add_vertex("A", VertexKind::PumpingStation);
    net.add_vertex("B", VertexKind::PumpingStation);
    net.add_vertex("C", VertexKind::City { demand: 20.0 });
    net.add_edge("R", "A", 1.0, 0.0);
    net.add_edge("R", "B", 1.0, 0.0);
    net.add_edge("A", "C", 1.0, 0.0);
    net.add_edge("B", "C", 1.0, 0.0);

    let total = flow::maxflow(&mut net).unwrap();
    assert_eq!(total, 2.0);

    let deficits = analysis::deficit_report(&net);
    assert_eq!(deficits.len(), 1);
    assert_eq!(deficits[0].deficit, 18.0);

    let a = net.find_vertex("A").unwrap();
    let b = net.find_vertex("B").unwrap();
    let mut without_a = net.deep_copy();
    let after_a = ablation::station_out_of_commission(&mut without_a, a).unwrap();
    assert_eq!(after_a, 1.0, "A is essential");

    let mut without_b = net.deep_copy();
    let after_b = ablation::station_out_of_commission(&mut without_b, b).unwrap();
    assert_eq!(after_b, 1.0, "B is essential");
}

#[test]
fn alternate_disjoint_paths_and_station_ablation() {
    let mut net = Network::new();
    net.add_vertex("R", VertexKind::Reservoir { max_delivery: 10.0 });
    net.add_vertex("P1", VertexKind::PumpingStation);
    net.add_vertex("P2", VertexKind::PumpingStation);
    net.add_vertex("C", VertexKind::City { demand: 10.0 });
    net.add_edge("R", "P1", 5.0, 0.0);
    net.add_edge("P1", "C", 5.0, 0.0);
    net.add_edge("R", "P2", 5.0, 0.0);
    net.add_edge("P2", "C", 5.0, 0.0);

    let total = flow::maxflow(&mut net).unwrap();
    assert_eq!(total, 10.0);

    let p1 = net.find_vertex("P1").unwrap();
    let after = ablation::station_out_of_commission(&mut net, p1).unwrap();
    assert_eq!(after, 5.0);
    let deficits = analysis::deficit_report(&net);
    assert_eq!(deficits.len(), 1);
    assert_eq!(deficits[0].deficit, 5.0);
}

#[test]
fn redundant_third_path_keeps_all_stations_non_essential() {
    let mut net = Network::new();
    net.add_vertex("R", VertexKind::Reservoir { max_delivery: 10.0 });
    net.add_vertex("P1", VertexKind::PumpingStation);
    net.add_vertex("P2", VertexKind::PumpingStation);
    net.add_vertex("P3", VertexKind::PumpingStation);
    net.add_vertex("C", VertexKind::City { demand: 10.0 });
    net.add_edge("R", "P1", 5.0, 0.0);
    net.add_edge("P1", "C", 5.0, 0.0);
    net.add_edge("R", "P2", 5.0, 0.0);
    net.add_edge("P2", "C", 5.0, 0.0);
    net.add_edge("R", "P3", 10.0, 0.0);
    net.add_edge("P3", "C", 10.0, 0.0);

    let total = flow::maxflow(&mut net).unwrap();
    assert_eq!(total, 10.0, "limited by the reservoir, not the pipes");

    let mut survivors = analysis::not_essential(&net, EssentialKind::Station).unwrap();
    survivors.sort();
    assert_eq!(survivors, vec!["P1".to_string(), "P2".to_string(), "P3".to_string()]);
}

#[test]
fn bidirectional_pipe_balances_without_losing_total_flow() {
    let mut net = Network::new();
    net.add_vertex("R", VertexKind::Reservoir { max_delivery: 10.0 });
    net.add_vertex("A", VertexKind::PumpingStation);
    net.add_vertex("B", VertexKind::PumpingStation);
    net.add_vertex("C", VertexKind::City { demand: 10.0 });
    net.add_edge("R", "A", 10.0, 0.0);
    net.add_bidirectional("A", "B", 5.0, 0.0, 0.0);
    net.add_edge("B", "C", 10.0, 0.0);
    net.add_edge("A", "C", 10.0, 0.0);

    let total = flow::maxflow(&mut net).unwrap();
    assert_eq!(total, 10.0);

    let iterations = net.edge_count();
    let report = analysis::optimize_load(&net, iterations);
    assert_eq!(report.before.total_achieved_flow, report.after.total_achieved_flow);
    assert!(
        report.after.variance_relative_slack <= report.before.variance_relative_slack + 1e-9,
        "load balancing must not increase relative slack variance"
    );
}

#[test]
fn ablating_the_single_essential_pipe_drops_flow_to_zero() {
    let mut net = Network::new();
    net.add_vertex("R", VertexKind::Reservoir { max_delivery: 10.0 });
    net.add_vertex("C", VertexKind::City { demand: 10.0 });
    net.add_edge("R", "C", 10.0, 0.0);
    flow::maxflow(&mut net).unwrap();

    let impacts = analysis::essential_pipelines(&net).unwrap();
    let city = impacts.iter().find(|i| i.city == "C").unwrap();
    assert!(city.affecting_pipelines.contains(&("R".to_string(), "C".to_string())));

    let r = net.find_vertex("R").unwrap();
    let c = net.find_vertex("C").unwrap();
    let after = ablation::pipeline_out_of_commission(&mut net, r, c, true).unwrap();
    assert_eq!(after, 0.0);
}

#[test]
fn snapshot_mutation_never_touches_the_original() {
    let mut net = Network::new();
    net.add_vertex("R", VertexKind::Reservoir { max_delivery: 10.0 });
    net.add_vertex("C", VertexKind::City { demand: 10.0 });
    net.add_edge("R", "C", 10.0, 0.0);
    flow::maxflow(&mut net).unwrap();

    let baseline = analysis::city_flow(&net, "C").unwrap();
    let mut snapshot = net.deep_copy();
    let c = snapshot.find_vertex("C").unwrap();
    let _ = ablation::station_out_of_commission(&mut snapshot, c);

    assert_eq!(analysis::city_flow(&net, "C").unwrap(), baseline);
}

#[test]
fn conservation_holds_after_maxflow() {
    let mut net = Network::new();
    net.add_vertex("R", VertexKind::Reservoir { max_delivery: 10.0 });
    net.add_vertex("P", VertexKind::PumpingStation);
    net.add_vertex("C", VertexKind::City { demand: 10.0 });
    net.add_edge("R", "P", 10.0, 0.0);
    net.add_edge("P", "C", 10.0, 0.0);
    flow::maxflow(&mut net).unwrap();

    let p = net.find_vertex("P").unwrap();
    let vertex = net.vertex(p);
    let incoming: f64 = vertex.incoming().iter().map(|&e| net.edge(e).flow()).sum();
    let outgoing: f64 = vertex.outgoing().iter().map(|&e| net.edge(e).flow()).sum();
    assert!((incoming - outgoing).abs() < 1e-9);
}

#[test]
fn every_edge_flow_stays_within_capacity() {
    let mut net = Network::new();
    net.add_vertex("R", VertexKind::Reservoir { max_delivery: 7.0 });
    net.add_vertex("A", VertexKind::PumpingStation);
    net.add_vertex("C", VertexKind::City { demand: 100.0 });
    net.add_edge("R", "A", 3.0, 0.0);
    net.add_edge("A", "C", 100.0, 0.0);
    flow::maxflow(&mut net).unwrap();

    for edge_index in net.edge_indices() {
        let edge = net.edge(edge_index);
        assert!(edge.flow() >= -1e-9 && edge.flow() <= edge.capacity() + 1e-9);
    }
    let m = metrics::compute(&net);
    assert!(m.total_achieved_flow <= m.total_demand);
}
