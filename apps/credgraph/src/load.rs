//! # Load Orchestration
//!
//! One load of one project:
//!
//! ```text
//! plan (credentials, unknown sources; no I/O)
//!   → cache directory
//!   → every configured source's load_graph, concurrently
//!   → Graph::merge in registration order
//!   → write graph artifact
//!   → solver.compute_cred
//!   → write cred artifact
//! ```
//!
//! Any failure ends the load with an error; nothing partial is merged or
//! persisted after the failing step. Outstanding source tasks are aborted on
//! the first source failure.

use crate::error::LoadError;
use crate::plugin::{CredSolver, Credentials, GraphSource, SourceOptions};
use crate::progress::ProgressReporter;
use crate::project::{Project, ProjectDirectory};
use credgraph_core::formats::{encode_graph, encode_timeline_cred};
use credgraph_core::{ArtifactFormat, CredConfig, Graph, TimelineCredParameters};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info};

/// Progress task name for the solver step.
pub const COMPUTE_CRED_TASK: &str = "compute-cred";

/// Progress task name covering the whole load of a project.
#[must_use]
pub fn load_task(project_id: &str) -> String {
    format!("load-{project_id}")
}

// =============================================================================
// OPTIONS & SUMMARY
// =============================================================================

/// Inputs of one load.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub project: Project,
    pub params: TimelineCredParameters,
    pub config: CredConfig,
    pub directory: ProjectDirectory,
    pub credentials: Credentials,
    pub format: ArtifactFormat,
}

/// What a successful load produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    pub graph_path: PathBuf,
    pub cred_path: PathBuf,
    pub node_count: usize,
    pub edge_count: usize,
    pub interval_count: usize,
}

/// A source selected for this load, with its inputs resolved.
struct PlannedSource {
    source: Arc<dyn GraphSource>,
    credential: Option<String>,
    settings: toml::Table,
}

// =============================================================================
// LOAD
// =============================================================================

/// Load every configured source, merge, compute cred and persist both
/// artifacts.
///
/// Sources are selected by the project: a registered plugin takes part iff
/// the project has settings for its name. Missing credentials and unknown
/// source names are reported before any filesystem or network access.
pub async fn load(
    options: LoadOptions,
    plugins: &[Arc<dyn GraphSource>],
    solver: &dyn CredSolver,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<LoadSummary, LoadError> {
    let LoadOptions {
        project,
        params,
        config,
        directory,
        credentials,
        format,
    } = options;

    let planned = plan_sources(&project, plugins, &credentials)?;

    let load_task = load_task(&project.id);
    reporter.start(&load_task);
    info!(project = %project.id, sources = planned.len(), "loading project");

    let cache_directory = directory.ensure_cache_directory().await?;
    let graphs = load_graphs(planned, &cache_directory, &reporter).await?;

    let graph = Graph::merge(&graphs)?;
    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "merged source graphs"
    );

    directory.setup(&project).await?;
    let graph_path = directory.graph_path(&project.id, format);
    write_artifact(&graph_path, encode_graph(&graph, format)?).await?;

    reporter.start(COMPUTE_CRED_TASK);
    let cred = solver
        .compute_cred(&graph, &params, &config)
        .await
        .map_err(LoadError::Solver)?;
    let cred_path = directory.cred_path(&project.id, format);
    write_artifact(&cred_path, encode_timeline_cred(&cred, format)?).await?;
    reporter.finish(COMPUTE_CRED_TASK);

    reporter.finish(&load_task);
    info!(
        project = %project.id,
        intervals = cred.interval_count(),
        "load finished"
    );

    Ok(LoadSummary {
        graph_path,
        cred_path,
        node_count: graph.node_count(),
        edge_count: graph.edge_count(),
        interval_count: cred.interval_count(),
    })
}

/// Select the plugins the project configures, resolving credentials.
///
/// Pure: touches neither the filesystem nor any source.
fn plan_sources(
    project: &Project,
    plugins: &[Arc<dyn GraphSource>],
    credentials: &Credentials,
) -> Result<Vec<PlannedSource>, LoadError> {
    if let Some(unknown) = project
        .sources
        .keys()
        .find(|name| !plugins.iter().any(|p| p.name() == name.as_str()))
    {
        return Err(LoadError::UnknownSource(unknown.clone()));
    }

    let mut planned = Vec::new();
    for plugin in plugins {
        let Some(settings) = project.sources.get(plugin.name()) else {
            continue;
        };
        let credential = match plugin.required_credential() {
            Some(name) => match credentials.get(name) {
                Some(secret) => Some(secret.to_owned()),
                None => {
                    return Err(LoadError::MissingCredential {
                        plugin: plugin.name().to_owned(),
                        credential: name.to_owned(),
                    });
                }
            },
            None => None,
        };
        planned.push(PlannedSource {
            source: Arc::clone(plugin),
            credential,
            settings: settings.clone(),
        });
    }
    Ok(planned)
}

/// Run every planned source concurrently. Results come back in plan order.
async fn load_graphs(
    planned: Vec<PlannedSource>,
    cache_directory: &Path,
    reporter: &Arc<dyn ProgressReporter>,
) -> Result<Vec<Graph>, LoadError> {
    let names: Vec<String> = planned
        .iter()
        .map(|p| p.source.name().to_owned())
        .collect();
    let mut slots: Vec<Option<Graph>> = vec![None; planned.len()];

    let mut tasks = JoinSet::new();
    for (index, planned) in planned.into_iter().enumerate() {
        let options = SourceOptions {
            cache_directory: cache_directory.to_path_buf(),
            credential: planned.credential,
            settings: planned.settings,
        };
        let reporter = Arc::clone(reporter);
        let source = planned.source;
        tasks.spawn(async move { (index, source.load_graph(options, reporter).await) });
    }

    while let Some(joined) = tasks.join_next().await {
        let (index, result) = match joined {
            Ok(done) => done,
            Err(e) => {
                tasks.abort_all();
                return Err(LoadError::Task(e.to_string()));
            }
        };
        let plugin = names.get(index).cloned().unwrap_or_default();
        match result {
            Ok(graph) => {
                debug!(
                    plugin = %plugin,
                    nodes = graph.node_count(),
                    edges = graph.edge_count(),
                    "source loaded"
                );
                if let Some(slot) = slots.get_mut(index) {
                    *slot = Some(graph);
                }
            }
            Err(error) => {
                tasks.abort_all();
                return Err(LoadError::Source { plugin, error });
            }
        }
    }

    slots
        .into_iter()
        .zip(names)
        .map(|(slot, name)| slot.ok_or_else(|| LoadError::Task(format!("{name} produced no graph"))))
        .collect()
}

async fn write_artifact(path: &Path, bytes: Vec<u8>) -> Result<(), LoadError> {
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| LoadError::io(path, e))?;
    debug!(path = %path.display(), "wrote artifact");
    Ok(())
}
