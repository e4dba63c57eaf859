//! Mock implementations for testing
//!
//! mockall doubles for the two async seams: the wizard completion handler
//! and the project service behind it.

#![allow(dead_code)]

use async_trait::async_trait;
use mockall::mock;

use crate::core::project::{NewProject, Project, ProjectDraft, ProjectError, ProjectService};
use crate::core::wizard::CompletionHandler;

// ============================================================================
// Completion Handler Mock
// ============================================================================

mock! {
    pub Completion {}

    #[async_trait]
    impl CompletionHandler<ProjectDraft> for Completion {
        async fn complete(&self, data: ProjectDraft) -> anyhow::Result<()>;
    }
}

// ============================================================================
// Project Service Mock
// ============================================================================

mock! {
    pub Projects {}

    #[async_trait]
    impl ProjectService for Projects {
        async fn create_project(&self, project: NewProject) -> Result<Project, ProjectError>;
        async fn list_projects(&self) -> Result<Vec<Project>, ProjectError>;
    }
}
