//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::{AddressKindArg, ClearTarget};
use credgraph::config::ProjectConfig;
use credgraph::error::LoadError;
use credgraph::project::{ClearScope, ProjectDirectory};
use credgraph_core::{
    AnyAddress, ArtifactFormat, CredError, Graph, Kind, NodeAddress, WireAddress,
    formats::{decode_graph, decode_timeline_cred, encode_graph, filtered_to_json},
    primitives::MAX_ARTIFACT_SIZE,
};
use std::path::{Path, PathBuf};
use tracing::info;

// =============================================================================
// FILE HELPERS
// =============================================================================

/// Artifact format implied by a file name: `.bin` is binary, anything else JSON.
fn format_for(path: &Path) -> ArtifactFormat {
    match path.extension().and_then(|e| e.to_str()) {
        Some("bin") => ArtifactFormat::Binary,
        _ => ArtifactFormat::Json,
    }
}

/// Read an artifact, refusing files over the artifact size limit.
async fn read_artifact(path: &Path) -> Result<Vec<u8>, LoadError> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| LoadError::io(path, e))?;
    if metadata.len() > MAX_ARTIFACT_SIZE as u64 {
        return Err(LoadError::Core(CredError::DeserializationError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            MAX_ARTIFACT_SIZE
        ))));
    }
    tokio::fs::read(path).await.map_err(|e| LoadError::io(path, e))
}

async fn write_output(path: &Path, bytes: Vec<u8>) -> Result<(), LoadError> {
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| LoadError::io(path, e))
}

/// Parse a `/`-separated prefix. The empty string is the empty prefix.
fn parse_prefix(raw: &str) -> Result<NodeAddress, CredError> {
    if raw.is_empty() {
        return Ok(NodeAddress::empty());
    }
    NodeAddress::from_parts(raw.split('/'))
}

// =============================================================================
// PROJECT COMMAND
// =============================================================================

/// Validate a project file and create its directory.
pub async fn cmd_project(
    directory: &ProjectDirectory,
    config_path: &Path,
    json_mode: bool,
) -> Result<(), LoadError> {
    let config = ProjectConfig::load(config_path)?;
    // Building these validates every configured address.
    let params = config.params()?;
    let cred_config = config.cred_config()?;

    let project = config.project();
    let project_dir = directory.setup(&project).await?;
    info!(project = %project.id, path = %project_dir.display(), "project ready");

    if json_mode {
        let output = serde_json::json!({
            "id": project.id,
            "directory": project_dir.display().to_string(),
            "format": config.format,
            "sources": project.sources.keys().collect::<Vec<_>>(),
            "alpha": params.alpha,
            "interval_decay": params.interval_decay,
            "filter_prefixes": cred_config.filter_node_prefixes.len(),
        });
        println!("{output}");
    } else {
        println!("Project:    {}", project.id);
        println!("Directory:  {}", project_dir.display());
        println!("Format:     {}", config.format.extension());
        println!(
            "Sources:    {}",
            project.sources.keys().cloned().collect::<Vec<_>>().join(", ")
        );
        println!("Alpha:      {}", params.alpha);
        println!("Decay:      {}", params.interval_decay);
    }
    Ok(())
}

// =============================================================================
// MERGE COMMAND
// =============================================================================

/// Merge graph files into one.
pub async fn cmd_merge(inputs: &[PathBuf], output: &Path, json_mode: bool) -> Result<(), LoadError> {
    let mut graphs = Vec::with_capacity(inputs.len());
    for input in inputs {
        let bytes = read_artifact(input).await?;
        graphs.push(decode_graph(&bytes, format_for(input))?);
    }

    let merged = Graph::merge(&graphs)?;
    write_output(output, encode_graph(&merged, format_for(output))?).await?;
    info!(
        inputs = inputs.len(),
        nodes = merged.node_count(),
        edges = merged.edge_count(),
        "merged graphs"
    );

    if json_mode {
        let summary = serde_json::json!({
            "output": output.display().to_string(),
            "nodes": merged.node_count(),
            "edges": merged.edge_count(),
        });
        println!("{summary}");
    } else {
        println!(
            "Merged {} graphs into {} ({} nodes, {} edges)",
            inputs.len(),
            output.display(),
            merged.node_count(),
            merged.edge_count()
        );
    }
    Ok(())
}

// =============================================================================
// FILTER COMMAND
// =============================================================================

/// Filter timeline cred by node prefixes.
pub async fn cmd_filter(
    cred_path: &Path,
    raw_prefixes: &[String],
    config_path: Option<&Path>,
    output: Option<&Path>,
    top: Option<usize>,
) -> Result<(), LoadError> {
    let prefixes = if !raw_prefixes.is_empty() {
        raw_prefixes
            .iter()
            .map(|raw| parse_prefix(raw))
            .collect::<Result<Vec<_>, _>>()?
    } else if let Some(config_path) = config_path {
        ProjectConfig::load(config_path)?
            .cred_config()?
            .filter_node_prefixes
    } else {
        return Err(LoadError::Config(
            "no prefixes: pass --prefix or --config".to_string(),
        ));
    };

    let bytes = read_artifact(cred_path).await?;
    let cred = decode_timeline_cred(&bytes, format_for(cred_path))?;
    let filtered = cred.filter(&prefixes)?;
    info!(
        prefixes = prefixes.len(),
        nodes = filtered.address_to_cred().len(),
        "filtered timeline cred"
    );

    if let Some(limit) = top {
        for (address, total) in filtered.cred_sorted().into_iter().take(limit) {
            println!("{total:>12.4}  {address}");
        }
        return Ok(());
    }

    let json = filtered_to_json(&filtered)?;
    match output {
        Some(path) => write_output(path, json).await,
        None => {
            println!("{}", String::from_utf8_lossy(&json));
            Ok(())
        }
    }
}

// =============================================================================
// CLEAR COMMAND
// =============================================================================

/// Remove data under the root directory.
pub async fn cmd_clear(
    directory: &ProjectDirectory,
    target: ClearTarget,
    id: Option<String>,
) -> Result<(), LoadError> {
    let scope = match (target, id) {
        (ClearTarget::All, _) => ClearScope::All,
        (ClearTarget::Cache, _) => ClearScope::Cache,
        (ClearTarget::Project, Some(id)) => ClearScope::Project(id),
        (ClearTarget::Project, None) => {
            return Err(LoadError::Config(
                "clearing a project requires --id".to_string(),
            ));
        }
    };
    directory.clear(&scope).await?;
    info!(root = %directory.root().display(), ?scope, "cleared");
    Ok(())
}

// =============================================================================
// ADDRESS COMMAND
// =============================================================================

/// Print the display form and wire form of an address.
pub fn cmd_address(kind: AddressKindArg, parts: &[String], json_mode: bool) -> Result<(), LoadError> {
    let kind = match kind {
        AddressKindArg::Node => Kind::Node,
        AddressKindArg::Edge => Kind::Edge,
    };
    let address = AnyAddress::make(kind, parts)?;
    let wire = WireAddress::from(&address);

    if json_mode {
        let json = serde_json::to_string(&wire)
            .map_err(|e| LoadError::Core(CredError::SerializationError(e.to_string())))?;
        println!("{json}");
    } else {
        println!("Address:  {}", address.to_display_string(kind)?);
        println!("Parts:    {}", address.to_parts().len());
        println!("Encoded:  {:?}", address.encoded());
    }
    Ok(())
}
