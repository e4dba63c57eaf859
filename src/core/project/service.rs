//! Project creation service and the wizard completion handler that calls it.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex as StdMutex;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::{info, instrument};

use crate::core::wizard::CompletionHandler;

use super::draft::{NewProject, Project, ProjectDraft, ProjectError};

/// Backend that owns projects.
#[async_trait]
pub trait ProjectService: Send + Sync {
    async fn create_project(&self, project: NewProject) -> Result<Project, ProjectError>;

    async fn list_projects(&self) -> Result<Vec<Project>, ProjectError>;
}

// ============================================================================
// JSON File Registry
// ============================================================================

/// Projects kept in a single JSON array file.
///
/// Writes are serialized through an async mutex and replace the file
/// atomically. Project names are unique, compared case-insensitively.
#[derive(Debug)]
pub struct ProjectRegistry {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl ProjectRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Vec<Project>, ProjectError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) if raw.trim().is_empty() => Ok(Vec::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_all(&self, projects: &[Project]) -> Result<(), ProjectError> {
        let json = serde_json::to_string_pretty(projects)?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || replace_file(&path, json.as_bytes()))
            .await
            .map_err(io::Error::other)??;
        Ok(())
    }
}

/// Write beside the target, sync, then rename over it.
fn replace_file(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[async_trait]
impl ProjectService for ProjectRegistry {
    #[instrument(skip(self, project), fields(name = %project.name))]
    async fn create_project(&self, project: NewProject) -> Result<Project, ProjectError> {
        let _guard = self.write_lock.lock().await;

        let mut projects = self.read_all().await?;
        let duplicate = projects
            .iter()
            .any(|existing| same_name(&existing.details.name, &project.name));
        if duplicate {
            return Err(ProjectError::DuplicateName(project.name));
        }

        let created = Project::new(project);
        projects.push(created.clone());
        self.write_all(&projects).await?;

        info!(project_id = %created.id, "Project created");
        Ok(created)
    }

    async fn list_projects(&self) -> Result<Vec<Project>, ProjectError> {
        self.read_all().await
    }
}

// ============================================================================
// Completion Handler
// ============================================================================

/// Turns the finished draft into a project through a [`ProjectService`].
///
/// The host keeps an `Arc` to read back the created project after the wizard
/// reports completion.
pub struct CreateProjectHandler {
    service: Arc<dyn ProjectService>,
    created: StdMutex<Option<Project>>,
}

impl CreateProjectHandler {
    pub fn new(service: Arc<dyn ProjectService>) -> Self {
        Self {
            service,
            created: StdMutex::new(None),
        }
    }

    /// Take the project created by the last successful completion.
    pub fn take_created(&self) -> Option<Project> {
        self.created.lock().ok().and_then(|mut created| created.take())
    }
}

#[async_trait]
impl CompletionHandler<ProjectDraft> for CreateProjectHandler {
    async fn complete(&self, data: ProjectDraft) -> anyhow::Result<()> {
        let request = NewProject::try_from(&data).context("Project draft is incomplete or invalid")?;
        let project = self
            .service
            .create_project(request)
            .await
            .context("Failed to create project")?;

        if let Ok(mut created) = self.created.lock() {
            *created = Some(project);
        }
        Ok(())
    }
}
