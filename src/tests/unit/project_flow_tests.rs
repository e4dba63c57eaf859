//! Project Flow Tests
//!
//! The project wizard driving [`CreateProjectHandler`] against a mocked
//! [`ProjectService`](crate::core::project::ProjectService).

use std::sync::Arc;

use crate::core::project::{
    open_project_wizard, CreateProjectHandler, EngagementType, Project, ProjectDraft,
    ProjectError, STEP_DETAILS, STEP_REVIEW, STEP_SCHEDULE, STEP_SCOPE, STEP_TEAM,
};
use crate::core::wizard::{MemorySnapshotStore, Navigation, SnapshotStore, WizardError};
use crate::tests::common::fixtures::{complete_draft, details_only, scope_only};
use crate::tests::mocks::MockProjects;

const KEY: &str = "project-create";

fn store_entry(store: &MemorySnapshotStore) -> Option<(String, Arc<dyn SnapshotStore>)> {
    Some((KEY.to_string(), Arc::new(store.clone()) as Arc<dyn SnapshotStore>))
}

#[tokio::test]
async fn test_required_steps_then_skips_create_project() {
    let mut service = MockProjects::new();
    service
        .expect_create_project()
        .withf(|request| {
            request.name == "Acme external 2026"
                && request.engagement_type == EngagementType::WebApplication
                && request.start_date.is_none()
                && request.testers.is_empty()
        })
        .times(1)
        .returning(|request| Ok(Project::new(request)));

    let handler = Arc::new(CreateProjectHandler::new(Arc::new(service)));
    let store = MemorySnapshotStore::new();
    let mut wizard = open_project_wizard(handler.clone(), store_entry(&store), true).unwrap();

    wizard.update_data(details_only());
    assert!(wizard.go_to_next().await.unwrap().is_moved());
    assert_eq!(wizard.current_step().id, STEP_SCOPE);

    wizard.update_data(scope_only());
    assert!(wizard.go_to_next().await.unwrap().is_moved());
    assert_eq!(wizard.current_step().id, STEP_SCHEDULE);

    assert!(wizard.skip().is_moved());
    assert_eq!(wizard.current_step().id, STEP_TEAM);
    assert!(wizard.skip().is_moved());
    assert_eq!(wizard.current_step().id, STEP_REVIEW);
    assert_eq!(wizard.next_label(), "Create project");

    assert_eq!(wizard.go_to_next().await.unwrap(), Navigation::Completed);
    let project = handler.take_created().expect("project recorded");
    assert_eq!(project.details.client, "Acme Corp");
    assert!(store.get(KEY).unwrap().is_none());
}

#[tokio::test]
async fn test_service_failure_surfaces_with_context() {
    let mut service = MockProjects::new();
    service
        .expect_create_project()
        .times(1)
        .returning(|request| Err(ProjectError::DuplicateName(request.name)));

    let handler = Arc::new(CreateProjectHandler::new(Arc::new(service)));
    let mut wizard = open_project_wizard(handler.clone(), None, true).unwrap();
    wizard.update_data(complete_draft());
    while !wizard.is_last_step() {
        wizard.go_to_next().await.unwrap();
    }

    let err = match wizard.go_to_next().await {
        Err(WizardError::Completion(e)) => e,
        other => panic!("expected completion error, got {other:?}"),
    };
    let chain = format!("{err:#}");
    assert!(chain.contains("Failed to create project"), "{chain}");
    assert!(chain.contains("already exists"), "{chain}");
    assert!(handler.take_created().is_none());
    assert_eq!(wizard.current_step().id, STEP_REVIEW);
}

#[tokio::test]
async fn test_cancelled_flow_resumes_where_it_stopped() {
    let service = MockProjects::new();
    let handler = Arc::new(CreateProjectHandler::new(Arc::new(service)));
    let store = MemorySnapshotStore::new();

    let mut wizard = open_project_wizard(handler.clone(), store_entry(&store), true).unwrap();
    wizard.update_data(details_only());
    wizard.go_to_next().await.unwrap();
    wizard.cancel();

    let resumed = open_project_wizard(handler.clone(), store_entry(&store), true).unwrap();
    assert_eq!(resumed.current_step().id, STEP_SCOPE);
    assert_eq!(resumed.data().name.as_deref(), Some("Acme external 2026"));

    let fresh = open_project_wizard(handler, store_entry(&store), false).unwrap();
    assert_eq!(fresh.current_step_index(), 0);
    assert_eq!(fresh.data(), &ProjectDraft::default());
    assert!(store.get(KEY).unwrap().is_none());
}

#[tokio::test]
async fn test_values_edited_after_jumping_back_are_checked_on_submit() {
    let mut service = MockProjects::new();
    service.expect_create_project().never();

    let handler = Arc::new(CreateProjectHandler::new(Arc::new(service)));
    let mut wizard = open_project_wizard(handler.clone(), None, true).unwrap();
    wizard.update_data(complete_draft());
    while !wizard.is_last_step() {
        wizard.go_to_next().await.unwrap();
    }

    // Edit an earlier step, then jump past it without revalidating
    assert!(wizard.go_to_step(STEP_DETAILS).is_moved());
    wizard.update_data(ProjectDraft {
        name: Some("x".repeat(300)),
        targets: Some(vec!["<script>".into()]),
        ..Default::default()
    });
    assert!(wizard.go_to_step(STEP_TEAM).is_moved());
    assert!(wizard.go_to_next().await.unwrap().is_moved());

    let err = match wizard.go_to_next().await {
        Err(WizardError::Completion(e)) => e,
        other => panic!("expected completion error, got {other:?}"),
    };
    assert!(matches!(
        err.downcast_ref::<ProjectError>(),
        Some(ProjectError::InvalidValue { field, .. }) if field == "name"
    ));
    assert!(handler.take_created().is_none());
    assert_eq!(wizard.current_step().id, STEP_REVIEW);
}
