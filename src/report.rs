//! CSV report emission (§4.10, C10): thin serialisation of the façade's
//! return types into `<output_dir>/<network_name>/<analysis>.csv`.

use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::analysis::{CityImpact, Deficit, PipelineCityImpact};
use crate::error::{Error, Result};
use crate::load_balance::LoadOptimizationReport;

fn write_csv<T: Serialize>(dir: &Path, name: &str, rows: impl IntoIterator<Item = T>) -> Result<()> {
    fs::create_dir_all(dir).map_err(|source| Error::Report {
        path: dir.display().to_string(),
        source,
    })?;
    let path = dir.join(format!("{name}.csv"));
    let mut writer = csv::Writer::from_path(&path).map_err(|err| Error::Report {
        path: path.display().to_string(),
        source: std::io::Error::other(err),
    })?;
    for row in rows {
        writer.serialize(row).map_err(|err| Error::Report {
            path: path.display().to_string(),
            source: std::io::Error::other(err),
        })?;
    }
    writer.flush().map_err(|source| Error::Report {
        path: path.display().to_string(),
        source,
    })?;
    info!(path = %path.display(), "report written");
    Ok(())
}

/// `deficits.csv`: `city,demand,deficit`.
pub fn write_deficits(dir: &Path, deficits: &[Deficit]) -> Result<()> {
    write_csv(dir, "deficits", deficits.iter().cloned())
}

/// `<label>_impact.csv`: `city,before,after`.
pub fn write_city_impacts(dir: &Path, label: &str, impacts: &[CityImpact]) -> Result<()> {
    write_csv(dir, &format!("{label}_impact"), impacts.iter().cloned())
}

#[derive(Clone, Serialize)]
struct NotEssentialRow {
    code: String,
}

/// `not_essential_<kind>.csv`: `code`.
pub fn write_not_essential(dir: &Path, kind: &str, codes: &[String]) -> Result<()> {
    write_csv(
        dir,
        &format!("not_essential_{kind}"),
        codes.iter().map(|code| NotEssentialRow { code: code.clone() }),
    )
}

#[derive(Clone, Serialize)]
struct EssentialPipelineRow {
    city: String,
    pipe_a: String,
    pipe_b: String,
}

/// `essential_pipelines.csv`: `city,pipe_a,pipe_b`, one row per affecting
/// pipeline rather than per city (flattens [`PipelineCityImpact`]).
pub fn write_essential_pipelines(dir: &Path, impacts: &[PipelineCityImpact]) -> Result<()> {
    let rows = impacts.iter().flat_map(|impact| {
        impact.affecting_pipelines.iter().map(move |(a, b)| EssentialPipelineRow {
            city: impact.city.clone(),
            pipe_a: a.clone(),
            pipe_b: b.clone(),
        })
    });
    write_csv(dir, "essential_pipelines", rows)
}

#[derive(Clone, Serialize)]
struct LoadOptimizationRow {
    metric: &'static str,
    before: f64,
    after: f64,
}

/// `load_optimization.csv`: `metric,before,after`.
pub fn write_load_optimization(dir: &Path, report: &LoadOptimizationReport) -> Result<()> {
    let rows = vec![
        LoadOptimizationRow {
            metric: "average_absolute_slack",
            before: report.before.average_absolute_slack,
            after: report.after.average_absolute_slack,
        },
        LoadOptimizationRow {
            metric: "average_relative_slack",
            before: report.before.average_relative_slack,
            after: report.after.average_relative_slack,
        },
        LoadOptimizationRow {
            metric: "variance_absolute_slack",
            before: report.before.variance_absolute_slack,
            after: report.after.variance_absolute_slack,
        },
        LoadOptimizationRow {
            metric: "variance_relative_slack",
            before: report.before.variance_relative_slack,
            after: report.after.variance_relative_slack,
        },
    ];
    write_csv(dir, "load_optimization", rows)
}
