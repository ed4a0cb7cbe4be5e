//! # Project Configuration
//!
//! A project is described by a TOML file:
//!
//! ```toml
//! id = "sourcecred/example"
//! format = "json"            # or "binary"
//!
//! [sources.github]
//! repositories = ["sourcecred/example"]
//!
//! [params]
//! alpha = 0.05
//! interval_decay = 0.5
//!
//! [[params.node_weights]]
//! prefix = ["sourcecred", "github", "PULL"]
//! weight = 4.0
//!
//! [[params.edge_weights]]
//! prefix = ["sourcecred", "github", "AUTHORS"]
//! forwards = 1.0
//! backwards = 0.5
//!
//! [cred]
//! score_node_prefix = ["sourcecred", "github", "USERLIKE"]
//! filter_node_prefixes = [["sourcecred", "github", "USERLIKE"]]
//! ```
//!
//! Addresses are written as part lists and converted to typed addresses here,
//! so a malformed part is reported as a configuration error before any load.
//!
//! Environment lookups (`CREDGRAPH_DIRECTORY`, `CREDGRAPH_<NAME>_TOKEN`) also
//! live here; the core never reads the environment.

use crate::error::LoadError;
use crate::load::LoadOptions;
use crate::plugin::Credentials;
use crate::project::{Project, ProjectDirectory};
use credgraph_core::{
    Address, AddressKind, ArtifactFormat, CredConfig, EdgeWeight, TimelineCredParameters, Weights,
    timeline::{DEFAULT_ALPHA, DEFAULT_INTERVAL_DECAY},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Environment variable overriding the credgraph root directory.
pub const DIRECTORY_VAR: &str = "CREDGRAPH_DIRECTORY";

const CREDENTIAL_PREFIX: &str = "CREDGRAPH_";
const CREDENTIAL_SUFFIX: &str = "_TOKEN";

// =============================================================================
// FILE SHAPE
// =============================================================================

/// Parsed project file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project identifier.
    pub id: String,
    /// Artifact encoding.
    #[serde(default)]
    pub format: ArtifactFormat,
    /// Source name → source settings.
    #[serde(default)]
    pub sources: BTreeMap<String, toml::Table>,
    /// Solver parameters.
    #[serde(default)]
    pub params: ParamsConfig,
    /// Scoring and presentation prefixes.
    #[serde(default)]
    pub cred: CredSection,
}

/// `[params]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamsConfig {
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default = "default_interval_decay")]
    pub interval_decay: f64,
    #[serde(default)]
    pub node_weights: Vec<NodeWeightEntry>,
    #[serde(default)]
    pub edge_weights: Vec<EdgeWeightEntry>,
}

impl Default for ParamsConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            interval_decay: DEFAULT_INTERVAL_DECAY,
            node_weights: Vec::new(),
            edge_weights: Vec::new(),
        }
    }
}

fn default_alpha() -> f64 {
    DEFAULT_ALPHA
}

fn default_interval_decay() -> f64 {
    DEFAULT_INTERVAL_DECAY
}

/// One `[[params.node_weights]]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeWeightEntry {
    pub prefix: Vec<String>,
    pub weight: f64,
}

/// One `[[params.edge_weights]]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeWeightEntry {
    pub prefix: Vec<String>,
    #[serde(default = "unit_weight")]
    pub forwards: f64,
    #[serde(default = "unit_weight")]
    pub backwards: f64,
}

fn unit_weight() -> f64 {
    1.0
}

/// `[cred]` section. Missing prefixes mean "everything".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CredSection {
    #[serde(default)]
    pub score_node_prefix: Vec<String>,
    #[serde(default)]
    pub filter_node_prefixes: Option<Vec<Vec<String>>>,
}

// =============================================================================
// LOADING
// =============================================================================

impl ProjectConfig {
    /// Parse a project file from a string.
    pub fn from_toml_str(contents: &str) -> Result<Self, LoadError> {
        let config: Self =
            toml::from_str(contents).map_err(|e| LoadError::Config(e.to_string()))?;
        if config.id.is_empty() {
            return Err(LoadError::Config("project id must not be empty".to_string()));
        }
        Ok(config)
    }

    /// Read and parse a project file.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let contents = std::fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
        Self::from_toml_str(&contents)
    }

    /// The project described by this file.
    #[must_use]
    pub fn project(&self) -> Project {
        Project {
            id: self.id.clone(),
            sources: self.sources.clone(),
        }
    }

    /// Solver parameters with addresses built from the configured parts.
    pub fn params(&self) -> Result<TimelineCredParameters, LoadError> {
        let node_weights = self
            .params
            .node_weights
            .iter()
            .map(|entry| Ok((address_from_config(&entry.prefix)?, entry.weight)))
            .collect::<Result<Vec<_>, LoadError>>()?;
        let edge_weights = self
            .params
            .edge_weights
            .iter()
            .map(|entry| {
                let weight = EdgeWeight {
                    forwards: entry.forwards,
                    backwards: entry.backwards,
                };
                Ok((address_from_config(&entry.prefix)?, weight))
            })
            .collect::<Result<Vec<_>, LoadError>>()?;

        Ok(TimelineCredParameters {
            alpha: self.params.alpha,
            interval_decay: self.params.interval_decay,
            weights: Weights {
                node_weights,
                edge_weights,
            },
        })
    }

    /// Scoring configuration with addresses built from the configured parts.
    pub fn cred_config(&self) -> Result<CredConfig, LoadError> {
        let defaults = CredConfig::default();
        let filter_node_prefixes = match &self.cred.filter_node_prefixes {
            Some(prefixes) => prefixes
                .iter()
                .map(|parts| address_from_config(parts))
                .collect::<Result<Vec<_>, _>>()?,
            None => defaults.filter_node_prefixes,
        };
        Ok(CredConfig {
            score_node_prefix: address_from_config(&self.cred.score_node_prefix)?,
            filter_node_prefixes,
        })
    }

    /// Everything [`crate::load::load`] needs, given where to put artifacts
    /// and which credentials are available.
    pub fn load_options(
        &self,
        directory: ProjectDirectory,
        credentials: Credentials,
    ) -> Result<LoadOptions, LoadError> {
        Ok(LoadOptions {
            project: self.project(),
            params: self.params()?,
            config: self.cred_config()?,
            directory,
            credentials,
            format: self.format,
        })
    }
}

fn address_from_config<K: AddressKind>(parts: &[String]) -> Result<Address<K>, LoadError> {
    Address::from_parts(parts.iter().map(String::as_str))
        .map_err(|e| LoadError::Config(format!("invalid address {parts:?}: {e}")))
}

// =============================================================================
// ENVIRONMENT
// =============================================================================

/// Root directory: `CREDGRAPH_DIRECTORY` if set, else `<tmp>/credgraph`.
#[must_use]
pub fn default_directory() -> PathBuf {
    directory_from(std::env::var_os(DIRECTORY_VAR).map(PathBuf::from))
}

fn directory_from(configured: Option<PathBuf>) -> PathBuf {
    match configured {
        Some(path) if !path.as_os_str().is_empty() => path,
        _ => std::env::temp_dir().join("credgraph"),
    }
}

/// Collect `CREDGRAPH_<NAME>_TOKEN=secret` pairs as credential
/// `<NAME>_TOKEN`. Empty values are skipped. Pass `std::env::vars()` to read
/// the process environment.
pub fn credentials_from_vars<I>(vars: I) -> Credentials
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut credentials = Credentials::new();
    for (key, value) in vars {
        if value.is_empty() || !key.ends_with(CREDENTIAL_SUFFIX) {
            continue;
        }
        if let Some(name) = key.strip_prefix(CREDENTIAL_PREFIX)
            && name.len() > CREDENTIAL_SUFFIX.len()
        {
            credentials.insert(name, value);
        }
    }
    credentials
}
