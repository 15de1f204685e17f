//! Runtime configuration (§4.11, C11): the small set of knobs the distilled
//! spec names, plus the output directory the report writer needs. No
//! external config-file format is invented — CLI flags are the only source.

use std::path::PathBuf;

/// Runtime configuration for a single analysis run.
#[derive(Clone, Debug)]
pub struct Config {
    /// Label used as an output subdirectory (§6).
    pub network_name: String,
    /// Safety cap on load-balancer iterations (§4.5). Defaults to the
    /// network's edge count when unset.
    pub max_load_iterations: Option<usize>,
    /// Directory reports are written under, one subdirectory per
    /// `network_name`.
    pub output_dir: PathBuf,
}

impl Config {
    /// Resolve the effective load-balancer iteration cap for a network with
    /// `edge_count` edges.
    #[must_use]
    pub fn load_iterations_for(&self, edge_count: usize) -> usize {
        self.max_load_iterations.unwrap_or(edge_count)
    }

    /// The directory this run's reports should be written under.
    #[must_use]
    pub fn report_dir(&self) -> PathBuf {
        self.output_dir.join(&self.network_name)
    }
}
