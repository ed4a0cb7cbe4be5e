//! # Collaborator Contracts
//!
//! The orchestrator does not fetch activity or compute cred itself. It talks
//! to two kinds of collaborators through these traits:
//!
//! - [`GraphSource`]: builds a [`Graph`] from one activity source (a version
//!   control host, a forum, ...). May do network I/O and caching.
//! - [`CredSolver`]: turns the merged graph into [`TimelineCred`].
//!
//! Everything a collaborator needs is passed explicitly: cache directory,
//! credential and source settings travel in [`SourceOptions`].

use crate::error::BoxError;
use crate::progress::ProgressReporter;
use async_trait::async_trait;
use credgraph_core::{CredConfig, Graph, TimelineCred, TimelineCredParameters};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

// =============================================================================
// CREDENTIALS
// =============================================================================

/// Named secrets available to sources (e.g. `GITHUB_TOKEN`).
///
/// `Debug` lists names only.
#[derive(Clone, Default)]
pub struct Credentials {
    secrets: BTreeMap<String, String>,
}

impl Credentials {
    /// No credentials.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, secret: impl Into<String>) -> Self {
        self.insert(name, secret);
        self
    }

    /// Insert or replace a credential.
    pub fn insert(&mut self, name: impl Into<String>, secret: impl Into<String>) {
        self.secrets.insert(name.into(), secret.into());
    }

    /// Look up a credential by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.secrets.get(name).map(String::as_str)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.secrets.keys()).finish()
    }
}

// =============================================================================
// GRAPH SOURCES
// =============================================================================

/// Per-load inputs handed to a [`GraphSource`].
#[derive(Clone)]
pub struct SourceOptions {
    /// Directory the source may use for caches. Shared by all sources of a
    /// load; sources namespace their own files.
    pub cache_directory: PathBuf,
    /// The credential named by [`GraphSource::required_credential`], if any.
    pub credential: Option<String>,
    /// The source's section of the project configuration.
    pub settings: toml::Table,
}

impl fmt::Debug for SourceOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceOptions")
            .field("cache_directory", &self.cache_directory)
            .field("credential", &self.credential.as_ref().map(|_| "<redacted>"))
            .field("settings", &self.settings)
            .finish()
    }
}

/// Builds the graph for one activity source.
#[async_trait]
pub trait GraphSource: Send + Sync {
    /// Name of the source; matches its section in the project configuration.
    fn name(&self) -> &str;

    /// Name of the credential this source cannot run without.
    fn required_credential(&self) -> Option<&str> {
        None
    }

    /// Fetch (or read from cache) and build this source's graph.
    async fn load_graph(
        &self,
        options: SourceOptions,
        reporter: Arc<dyn ProgressReporter>,
    ) -> Result<Graph, BoxError>;
}

// =============================================================================
// SOLVER
// =============================================================================

/// Computes timeline cred for a graph.
///
/// From the orchestrator's point of view this is a pure function of its
/// three inputs, awaited once.
#[async_trait]
pub trait CredSolver: Send + Sync {
    /// Distribute cred over the graph's nodes, per interval.
    async fn compute_cred(
        &self,
        graph: &Graph,
        params: &TimelineCredParameters,
        config: &CredConfig,
    ) -> Result<TimelineCred, BoxError>;
}
