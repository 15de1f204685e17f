//! The crate-wide error type.
//!
//! Every fallible public operation in the flow engine and its ambient stack
//! returns [`Result<T, Error>`]; internal invariant violations (broken
//! reverse-pairing, negative flow, flow exceeding capacity outside an
//! augmentation) are bugs, not user errors, and are raised with
//! `assert!`/`debug_assert!` instead of an `Error` variant (§7).

use thiserror::Error;

/// The crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong building or querying a [`crate::network::Network`].
#[derive(Debug, Error)]
pub enum Error {
    /// A CSV ingestion failure: a missing or duplicate category file, or a
    /// malformed row. Aborts the whole load before any vertex is added.
    #[error("ingestion error in {file}: {reason}")]
    Ingestion {
        /// The file (or file-category name) the error was found in.
        file: String,
        /// A human-readable description of the problem.
        reason: String,
    },

    /// A query named a vertex code that does not exist in the network.
    #[error("unknown entity: {code}")]
    UnknownEntity {
        /// The code that was looked up and not found.
        code: String,
    },

    /// The requested solve or query describes a degenerate topology: source
    /// equals target, no reservoirs, or no cities.
    #[error("degenerate topology: {reason}")]
    DegenerateTopology {
        /// A human-readable description of the degeneracy.
        reason: String,
    },

    /// A report could not be written to disk.
    #[error("failed to write report {path}: {source}")]
    Report {
        /// The path the report was being written to.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
