//! # Load Errors
//!
//! Everything that can stop a load. Missing credentials and unknown sources
//! are detected before any I/O and are kept distinct from failures reported
//! by the sources themselves.

use credgraph_core::CredError;
use std::path::PathBuf;
use thiserror::Error;

/// Error type returned by graph sources and solvers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced to the caller of the orchestrator and the CLI.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A configured source needs a credential that was not supplied.
    #[error("tried to load {plugin}, but no {credential} is set")]
    MissingCredential {
        /// The source that needed it.
        plugin: String,
        /// Name of the missing credential.
        credential: String,
    },

    /// The project configures a source that no registered plugin provides.
    #[error("project configures unknown source {0:?}")]
    UnknownSource(String),

    /// A source failed while loading its graph.
    #[error("{plugin} failed to load: {error}")]
    Source {
        /// The failing source.
        plugin: String,
        /// What it reported.
        #[source]
        error: BoxError,
    },

    /// The cred solver failed.
    #[error("cred computation failed: {0}")]
    Solver(#[source] BoxError),

    /// A load task panicked or was cancelled.
    #[error("load task failed: {0}")]
    Task(String),

    /// Malformed data, merge conflict, or codec failure from the core.
    #[error(transparent)]
    Core(#[from] CredError),

    /// Filesystem failure.
    #[error("I/O error at {}: {error}", .path.display())]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        error: std::io::Error,
    },

    /// Invalid configuration or command-line input.
    #[error("configuration error: {0}")]
    Config(String),
}

impl LoadError {
    /// Wrap an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            error,
        }
    }
}
