//! CSV ingestion (§4.9, C9): discover the four category files in a directory
//! and populate a [`Network`] from them. Pure parsing — the caller runs the
//! baseline [`crate::flow::maxflow`] separately (§9, an open decision
//! recorded in DESIGN.md).

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, info_span, warn};

use crate::error::{Error, Result};
use crate::network::{Network, VertexKind};

/// Read the four category files (`Reservoir`, `Stations`, `Cities`, `Pipes`,
/// matched by filename substring) out of `dir` and build a fresh, unsolved
/// [`Network`] from them.
pub fn load_network(dir: &Path) -> Result<Network> {
    let span = info_span!("load_network", dir = %dir.display());
    let _enter = span.enter();

    let files = discover_files(dir)?;
    let mut net = Network::new();

    read_reservoirs(&mut net, &files.reservoirs)?;
    read_stations(&mut net, &files.stations)?;
    read_cities(&mut net, &files.cities)?;
    read_pipes(&mut net, &files.pipes)?;

    info!(
        vertices = net.vertex_count(),
        edges = net.edge_count(),
        "network ingested"
    );
    Ok(net)
}

struct CategoryFiles {
    reservoirs: PathBuf,
    stations: PathBuf,
    cities: PathBuf,
    pipes: PathBuf,
}

/// Scan `dir` for one file per category, matched by filename substring, the
/// way the original `Data::readFiles` does (§4.9). A duplicate or missing
/// category is a fatal [`Error::Ingestion`].
fn discover_files(dir: &Path) -> Result<CategoryFiles> {
    let mut reservoirs = None;
    let mut stations = None;
    let mut cities = None;
    let mut pipes = None;

    let entries = fs::read_dir(dir).map_err(|source| Error::Ingestion {
        file: dir.display().to_string(),
        reason: source.to_string(),
    })?;

    for entry in entries {
        let entry = entry.map_err(|source| Error::Ingestion {
            file: dir.display().to_string(),
            reason: source.to_string(),
        })?;
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let name = entry.file_name();
        let name = name.to_string_lossy();
        let slot = if name.contains("Reservoir") {
            &mut reservoirs
        } else if name.contains("Stations") {
            &mut stations
        } else if name.contains("Cities") {
            &mut cities
        } else if name.contains("Pipes") {
            &mut pipes
        } else {
            continue;
        };
        if slot.is_some() {
            return Err(Error::Ingestion {
                file: name.into_owned(),
                reason: "multiple files match this category".to_string(),
            });
        }
        *slot = Some(entry.path());
    }

    Ok(CategoryFiles {
        reservoirs: reservoirs.ok_or_else(|| Error::Ingestion {
            file: "Reservoir".to_string(),
            reason: "no matching file found in directory".to_string(),
        })?,
        stations: stations.ok_or_else(|| Error::Ingestion {
            file: "Stations".to_string(),
            reason: "no matching file found in directory".to_string(),
        })?,
        cities: cities.ok_or_else(|| Error::Ingestion {
            file: "Cities".to_string(),
            reason: "no matching file found in directory".to_string(),
        })?,
        pipes: pipes.ok_or_else(|| Error::Ingestion {
            file: "Pipes".to_string(),
            reason: "no matching file found in directory".to_string(),
        })?,
    })
}

/// A reader over a headered CSV file whose lines may carry a stray `\r`.
fn reader(path: &Path) -> Result<csv::Reader<std::io::BufReader<fs::File>>> {
    let file = fs::File::open(path).map_err(|source| Error::Ingestion {
        file: path.display().to_string(),
        reason: source.to_string(),
    })?;
    Ok(csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file)))
}

fn parse_number(file: &str, line: usize, field: &str, value: &str) -> Result<f64> {
    value.trim_end_matches('\r').trim().parse().map_err(|_| Error::Ingestion {
        file: file.to_string(),
        reason: format!("line {line}: malformed numeric field {field:?}: {value:?}"),
    })
}

fn read_reservoirs(net: &mut Network, path: &Path) -> Result<()> {
    let file = path.display().to_string();
    let mut rdr = reader(path)?;
    for (line, record) in rdr.records().enumerate() {
        let record = record.map_err(|source| Error::Ingestion {
            file: file.clone(),
            reason: source.to_string(),
        })?;
        let line = line + 2; // header is line 1
        let get = |i: usize| record.get(i).unwrap_or("").trim_end_matches('\r').trim();
        let (name, municipality, code) = (get(0), get(1), get(3));
        if code.is_empty() {
            continue;
        }
        if name.is_empty() || municipality.is_empty() {
            warn!(line, "reservoir record has a blank non-key field");
        }
        let max_delivery = parse_number(&file, line, "max_delivery", get(4))?;
        if !net.add_vertex(code, VertexKind::Reservoir { max_delivery }) {
            return Err(Error::Ingestion {
                file,
                reason: format!("line {line}: duplicate vertex code {code:?}"),
            });
        }
    }
    Ok(())
}

fn read_stations(net: &mut Network, path: &Path) -> Result<()> {
    let file = path.display().to_string();
    let mut rdr = reader(path)?;
    for (line, record) in rdr.records().enumerate() {
        let record = record.map_err(|source| Error::Ingestion {
            file: file.clone(),
            reason: source.to_string(),
        })?;
        let line = line + 2;
        let get = |i: usize| record.get(i).unwrap_or("").trim_end_matches('\r').trim();
        let code = get(1);
        if code.is_empty() {
            continue;
        }
        if !net.add_vertex(code, VertexKind::PumpingStation) {
            return Err(Error::Ingestion {
                file,
                reason: format!("line {line}: duplicate vertex code {code:?}"),
            });
        }
    }
    Ok(())
}

fn read_cities(net: &mut Network, path: &Path) -> Result<()> {
    let file = path.display().to_string();
    let mut rdr = reader(path)?;
    for (line, record) in rdr.records().enumerate() {
        let record = record.map_err(|source| Error::Ingestion {
            file: file.clone(),
            reason: source.to_string(),
        })?;
        let line = line + 2;
        let get = |i: usize| record.get(i).unwrap_or("").trim_end_matches('\r').trim();
        let (name, code) = (get(0), get(2));
        if code.is_empty() || name.is_empty() {
            continue;
        }
        let demand = parse_number(&file, line, "demand", get(3))?;
        if !net.add_vertex(code, VertexKind::City { demand }) {
            return Err(Error::Ingestion {
                file,
                reason: format!("line {line}: duplicate vertex code {code:?}"),
            });
        }
    }
    Ok(())
}

fn read_pipes(net: &mut Network, path: &Path) -> Result<()> {
    let file = path.display().to_string();
    let mut rdr = reader(path)?;
    for (line, record) in rdr.records().enumerate() {
        let record = record.map_err(|source| Error::Ingestion {
            file: file.clone(),
            reason: source.to_string(),
        })?;
        let line = line + 2;
        let get = |i: usize| record.get(i).unwrap_or("").trim_end_matches('\r').trim();
        let (a, b) = (get(0), get(1));
        if a.is_empty() || b.is_empty() {
            continue;
        }
        let capacity = parse_number(&file, line, "capacity", get(2))?;
        let direction = parse_number(&file, line, "direction", get(3))?;
        let unidirectional = (direction - 1.0).abs() < f64::EPSILON;

        let ok = if unidirectional {
            net.add_edge(a, b, capacity, 0.0)
        } else {
            net.add_bidirectional(a, b, capacity, 0.0, 0.0)
        };
        if !ok {
            return Err(Error::Ingestion {
                file,
                reason: format!("line {line}: pipe references unknown service point {a:?} or {b:?}"),
            });
        }
    }
    Ok(())
}
