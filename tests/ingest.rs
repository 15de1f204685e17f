//! CSV ingestion edge cases (§4.9): file discovery, blank key fields,
//! malformed numeric fields, and stray `\r` line endings.

use std::fs;

use water_network::ingest;
use water_network::network::VertexKind;

fn write(dir: &std::path::Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

#[test]
fn loads_a_minimal_network() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "Reservoir.csv", "Name,Municipality,X,Code,MaxDelivery\nLake,Town,0,R1,10\n");
    write(dir.path(), "Stations.csv", "Name,Code\nPump,S1\n");
    write(dir.path(), "Cities.csv", "Name,Code,Demand\nMetropolis,C1,5\n");
    write(
        dir.path(),
        "Pipes.csv",
        "A,B,Capacity,Direction\nR1,S1,10,1\nS1,C1,10,1\n",
    );

    let net = ingest::load_network(dir.path()).unwrap();
    assert_eq!(net.vertex_count(), 3);
    assert_eq!(net.edge_count(), 2);

    let r1 = net.vertex(net.find_vertex("R1").unwrap());
    assert!(matches!(r1.kind(), VertexKind::Reservoir { max_delivery } if (*max_delivery - 10.0).abs() < 1e-9));
}

#[test]
fn bidirectional_pipe_gets_paired_reverse_edges() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "Reservoir.csv", "Name,Municipality,X,Code,MaxDelivery\nLake,Town,0,R1,10\n");
    write(dir.path(), "Stations.csv", "Name,Code\nPump,S1\n");
    write(dir.path(), "Cities.csv", "Name,Code,Demand\nMetropolis,C1,5\n");
    write(
        dir.path(),
        "Pipes.csv",
        "A,B,Capacity,Direction\nR1,S1,10,1\nS1,C1,10,2\n",
    );

    let net = ingest::load_network(dir.path()).unwrap();
    assert_eq!(net.edge_count(), 3, "the bidirectional pipe contributes two edges");
    let s1 = net.find_vertex("S1").unwrap();
    let c1 = net.find_vertex("C1").unwrap();
    let forward = net.edges_between(s1, c1);
    assert_eq!(forward.len(), 1);
    let reverse = net.edge(forward[0]).reverse();
    assert!(reverse.is_some());
}

#[test]
fn blank_code_rows_are_skipped_not_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "Reservoir.csv",
        "Name,Municipality,X,Code,MaxDelivery\nLake,Town,0,R1,10\n,,,,\n",
    );
    write(dir.path(), "Stations.csv", "Name,Code\nPump,S1\n");
    write(dir.path(), "Cities.csv", "Name,Code,Demand\nMetropolis,C1,5\n");
    write(dir.path(), "Pipes.csv", "A,B,Capacity,Direction\nR1,C1,10,1\n");

    let net = ingest::load_network(dir.path()).unwrap();
    assert_eq!(net.vertex_count(), 3);
}

#[test]
fn malformed_numeric_field_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "Reservoir.csv",
        "Name,Municipality,X,Code,MaxDelivery\nLake,Town,0,R1,not-a-number\n",
    );
    write(dir.path(), "Stations.csv", "Name,Code\n");
    write(dir.path(), "Cities.csv", "Name,Code,Demand\nMetropolis,C1,5\n");
    write(dir.path(), "Pipes.csv", "A,B,Capacity,Direction\n");

    let err = ingest::load_network(dir.path()).unwrap_err();
    assert!(err.to_string().contains("max_delivery"));
}

#[test]
fn stray_carriage_returns_are_tolerated() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "Reservoir.csv", "Name,Municipality,X,Code,MaxDelivery\r\nLake,Town,0,R1,10\r\n");
    write(dir.path(), "Stations.csv", "Name,Code\r\n");
    write(dir.path(), "Cities.csv", "Name,Code,Demand\r\nMetropolis,C1,5\r\n");
    write(dir.path(), "Pipes.csv", "A,B,Capacity,Direction\r\nR1,C1,10,1\r\n");

    let net = ingest::load_network(dir.path()).unwrap();
    assert_eq!(net.vertex_count(), 2);
}

#[test]
fn duplicate_category_files_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "Reservoir.csv", "Name,Municipality,X,Code,MaxDelivery\n");
    write(dir.path(), "Reservoir_copy.csv", "Name,Municipality,X,Code,MaxDelivery\n");
    write(dir.path(), "Stations.csv", "Name,Code\n");
    write(dir.path(), "Cities.csv", "Name,Code,Demand\n");
    write(dir.path(), "Pipes.csv", "A,B,Capacity,Direction\n");

    let err = ingest::load_network(dir.path()).unwrap_err();
    assert!(err.to_string().contains("multiple files"));
}

#[test]
fn missing_category_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "Reservoir.csv", "Name,Municipality,X,Code,MaxDelivery\n");
    write(dir.path(), "Stations.csv", "Name,Code\n");
    write(dir.path(), "Cities.csv", "Name,Code,Demand\n");

    let err = ingest::load_network(dir.path()).unwrap_err();
    assert!(err.to_string().contains("Pipes"));
}
