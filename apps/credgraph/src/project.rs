//! # Projects
//!
//! A project names the sources to load. Its artifacts live under a root
//! directory owned by credgraph:
//!
//! ```text
//! <root>/
//!   cache/                       shared by all sources
//!   projects/<base64url(id)>/
//!     project.json
//!     graph.json | graph.bin
//!     cred.json  | cred.bin
//! ```

use crate::error::LoadError;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use credgraph_core::ArtifactFormat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A project: an identifier plus the configured sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Stable identifier, e.g. `"sourcecred/example"`.
    pub id: String,
    /// Source name → source settings. A source is loaded iff it appears here.
    #[serde(default)]
    pub sources: BTreeMap<String, toml::Table>,
}

impl Project {
    /// A project with no sources.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sources: BTreeMap::new(),
        }
    }

    /// Builder-style source registration.
    #[must_use]
    pub fn with_source(mut self, name: impl Into<String>, settings: toml::Table) -> Self {
        self.sources.insert(name.into(), settings);
        self
    }
}

/// What [`ProjectDirectory::clear`] removes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClearScope {
    /// The whole root directory.
    All,
    /// Only the shared cache.
    Cache,
    /// One project's directory.
    Project(String),
}

/// Paths under a credgraph root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDirectory {
    root: PathBuf,
}

impl ProjectDirectory {
    /// Use `root` as the credgraph directory. Nothing is created yet.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The shared cache directory.
    #[must_use]
    pub fn cache_directory(&self) -> PathBuf {
        self.root.join("cache")
    }

    /// Directory of one project. Ids are base64url-encoded so any string is
    /// a safe directory name.
    #[must_use]
    pub fn project_directory(&self, project_id: &str) -> PathBuf {
        self.root
            .join("projects")
            .join(URL_SAFE_NO_PAD.encode(project_id))
    }

    /// Path of the merged graph artifact.
    #[must_use]
    pub fn graph_path(&self, project_id: &str, format: ArtifactFormat) -> PathBuf {
        self.project_directory(project_id)
            .join(format!("graph.{}", format.extension()))
    }

    /// Path of the timeline cred artifact.
    #[must_use]
    pub fn cred_path(&self, project_id: &str, format: ArtifactFormat) -> PathBuf {
        self.project_directory(project_id)
            .join(format!("cred.{}", format.extension()))
    }

    /// Create the cache directory if needed.
    pub async fn ensure_cache_directory(&self) -> Result<PathBuf, LoadError> {
        let cache = self.cache_directory();
        tokio::fs::create_dir_all(&cache)
            .await
            .map_err(|e| LoadError::io(&cache, e))?;
        Ok(cache)
    }

    /// Create the project directory and record the project in it.
    pub async fn setup(&self, project: &Project) -> Result<PathBuf, LoadError> {
        let directory = self.project_directory(&project.id);
        tokio::fs::create_dir_all(&directory)
            .await
            .map_err(|e| LoadError::io(&directory, e))?;

        let manifest = directory.join("project.json");
        let json = serde_json::to_vec_pretty(project)
            .map_err(|e| LoadError::Config(format!("cannot serialize project: {e}")))?;
        tokio::fs::write(&manifest, json)
            .await
            .map_err(|e| LoadError::io(&manifest, e))?;
        Ok(directory)
    }

    /// Remove data. Removing something that does not exist is not an error;
    /// an unknown project id is.
    pub async fn clear(&self, scope: &ClearScope) -> Result<(), LoadError> {
        let target = match scope {
            ClearScope::All => self.root.clone(),
            ClearScope::Cache => self.cache_directory(),
            ClearScope::Project(id) => {
                let directory = self.project_directory(id);
                if !tokio::fs::try_exists(&directory)
                    .await
                    .map_err(|e| LoadError::io(&directory, e))?
                {
                    return Err(LoadError::Config(format!("unknown project {id:?}")));
                }
                directory
            }
        };
        match tokio::fs::remove_dir_all(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(LoadError::io(&target, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_ids_become_safe_names() {
        let directory = ProjectDirectory::new("/data");
        let path = directory.project_directory("sourcecred/example");
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        assert!(!name.contains('/'));
        assert_eq!(URL_SAFE_NO_PAD.decode(name).ok(), Some(b"sourcecred/example".to_vec()));
    }

    #[test]
    fn artifact_paths_follow_format() {
        let directory = ProjectDirectory::new("/data");
        assert!(
            directory
                .graph_path("p", ArtifactFormat::Json)
                .ends_with("graph.json")
        );
        assert!(
            directory
                .cred_path("p", ArtifactFormat::Binary)
                .ends_with("cred.bin")
        );
    }

    #[tokio::test]
    async fn setup_and_clear_project() {
        let temp = tempfile::tempdir().expect("tempdir");
        let directory = ProjectDirectory::new(temp.path());
        let project = Project::new("example");

        let path = directory.setup(&project).await.expect("setup");
        assert!(path.join("project.json").exists());

        directory
            .clear(&ClearScope::Project("example".to_string()))
            .await
            .expect("clear project");
        assert!(!path.exists());

        let unknown = directory.clear(&ClearScope::Project("missing".to_string())).await;
        assert!(matches!(unknown, Err(LoadError::Config(_))));
    }

    #[tokio::test]
    async fn clear_cache_keeps_projects() {
        let temp = tempfile::tempdir().expect("tempdir");
        let directory = ProjectDirectory::new(temp.path());
        let cache = directory.ensure_cache_directory().await.expect("cache");
        let project_dir = directory.setup(&Project::new("kept")).await.expect("setup");

        directory.clear(&ClearScope::Cache).await.expect("clear cache");
        assert!(!cache.exists());
        assert!(project_dir.exists());

        directory.clear(&ClearScope::Cache).await.expect("clearing twice is fine");
    }
}
