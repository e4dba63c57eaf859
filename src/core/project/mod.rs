//! Engagement Project Creation
//!
//! The concrete flow driven by the wizard engine: a [`ProjectDraft`] filled in
//! over five steps, then handed to a [`ProjectService`] by
//! [`CreateProjectHandler`].

mod draft;
mod service;
mod steps;

pub use draft::*;
pub use service::*;
pub use steps::*;

use std::sync::Arc;

use crate::core::wizard::{
    PersistedSnapshot, SnapshotSlot, SnapshotStore, Wizard, WizardError, WizardOptions,
};

/// Open the project creation wizard.
pub fn open_project_wizard(
    handler: Arc<CreateProjectHandler>,
    store: Option<(String, Arc<dyn SnapshotStore>)>,
    resume: bool,
) -> Result<Wizard<ProjectDraft>, WizardError> {
    let mut options = WizardOptions::default().with_resume(resume);
    if let Some((key, store)) = store {
        options = options.with_persistence(SnapshotSlot::new(key, store));
    }
    Wizard::open(project_steps(), ProjectDraft::default(), handler, options)
}

/// One-line description of a stored project wizard, for listing.
pub fn describe_snapshot(snapshot: &PersistedSnapshot<ProjectDraft>) -> String {
    let steps = project_steps();
    let index = snapshot.current_step_index.min(steps.len() - 1);
    let saved = snapshot
        .saved_at
        .map(|at| at.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "unknown time".to_string());
    let name = snapshot.data.name.as_deref().unwrap_or("unnamed");
    format!(
        "{name:?} at step {} of {} ({}), {} completed, saved {saved}",
        index + 1,
        steps.len(),
        steps[index].title,
        snapshot.completed_step_ids.len()
    )
}
