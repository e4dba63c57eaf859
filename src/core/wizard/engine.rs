//! Wizard engine: state store, navigation controller and completion.
//!
//! A [`Wizard`] owns its steps, its [`WizardState`], an optional
//! [`SnapshotSlot`] and the [`CompletionHandler`]. All mutation goes through
//! `&mut self`, so while the completion handler runs nothing else can touch
//! the state.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use super::completion::{CompletionHandler, SubmittingFlag};
use super::persistence::{PersistedSnapshot, SnapshotSlot};
use super::types::{
    FieldErrors, Navigation, WizardData, WizardError, WizardState, WizardStep, WizardSummary,
};

const DEFAULT_NEXT_LABEL: &str = "Next";
const DEFAULT_FINISH_LABEL: &str = "Create";
const DEFAULT_BACK_LABEL: &str = "Back";

/// Options for opening a wizard.
#[derive(Clone)]
pub struct WizardOptions {
    /// Where snapshots are kept. `None` disables persistence.
    pub persistence: Option<SnapshotSlot>,
    /// Restore an existing snapshot on open. When false it is discarded.
    pub resume: bool,
}

impl Default for WizardOptions {
    fn default() -> Self {
        Self {
            persistence: None,
            resume: true,
        }
    }
}

impl WizardOptions {
    pub fn with_persistence(mut self, slot: SnapshotSlot) -> Self {
        self.persistence = Some(slot);
        self
    }

    pub fn with_resume(mut self, resume: bool) -> Self {
        self.resume = resume;
        self
    }
}

/// One open multi-step flow.
pub struct Wizard<D: WizardData> {
    steps: Vec<WizardStep<D>>,
    state: WizardState<D>,
    initial_data: D,
    slot: Option<SnapshotSlot>,
    completion: Arc<dyn CompletionHandler<D>>,
}

impl<D: WizardData> Wizard<D> {
    /// Open a wizard, resuming from the configured snapshot if one exists.
    pub fn open(
        steps: Vec<WizardStep<D>>,
        initial_data: D,
        completion: Arc<dyn CompletionHandler<D>>,
        options: WizardOptions,
    ) -> Result<Self, WizardError> {
        if steps.is_empty() {
            return Err(WizardError::NoSteps);
        }
        let mut seen = HashSet::new();
        for step in &steps {
            if !seen.insert(step.id.as_str()) {
                return Err(WizardError::DuplicateStep(step.id.clone()));
            }
        }

        let mut state = WizardState::new(initial_data.clone());
        if let Some(slot) = &options.persistence {
            if !options.resume {
                debug!(key = slot.key(), "Discarding wizard snapshot, resume disabled");
                slot.clear();
            } else if let Some(snapshot) = slot.load::<D>() {
                if snapshot.current_step_index < steps.len() {
                    state.data.merge(snapshot.data);
                    state.current_step_index = snapshot.current_step_index;
                    state.completed_step_ids = snapshot
                        .completed_step_ids
                        .into_iter()
                        .filter(|id| steps.iter().any(|step| &step.id == id))
                        .collect();
                    info!(
                        key = slot.key(),
                        step = state.current_step_index,
                        "Resumed wizard from snapshot"
                    );
                } else {
                    warn!(
                        key = slot.key(),
                        step = snapshot.current_step_index,
                        step_count = steps.len(),
                        "Wizard snapshot points past the last step, starting fresh"
                    );
                }
            }
        }

        Ok(Self {
            steps,
            state,
            initial_data,
            slot: options.persistence,
            completion,
        })
    }

    // ------------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------------

    pub fn steps(&self) -> &[WizardStep<D>] {
        &self.steps
    }

    pub fn state(&self) -> &WizardState<D> {
        &self.state
    }

    pub fn data(&self) -> &D {
        &self.state.data
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.state.errors
    }

    pub fn current_step_index(&self) -> usize {
        self.state.current_step_index
    }

    pub fn current_step(&self) -> &WizardStep<D> {
        &self.steps[self.state.current_step_index]
    }

    pub fn completed_step_ids(&self) -> &BTreeSet<String> {
        &self.state.completed_step_ids
    }

    pub fn is_submitting(&self) -> bool {
        self.state.is_submitting
    }

    pub fn is_first_step(&self) -> bool {
        self.state.current_step_index == 0
    }

    pub fn is_last_step(&self) -> bool {
        self.state.current_step_index + 1 == self.steps.len()
    }

    pub fn persistence_key(&self) -> Option<&str> {
        self.slot.as_ref().map(SnapshotSlot::key)
    }

    /// Whether `go_to_step` would accept this id right now.
    pub fn can_go_to_step(&self, step_id: &str) -> bool {
        match self.index_of(step_id) {
            Some(index) => {
                index <= self.state.current_step_index || self.state.is_step_completed(step_id)
            }
            None => false,
        }
    }

    pub fn can_skip_current(&self) -> bool {
        self.current_step().optional && !self.is_last_step()
    }

    pub fn next_label(&self) -> &str {
        match &self.current_step().next_label {
            Some(label) => label,
            None if self.is_last_step() => DEFAULT_FINISH_LABEL,
            None => DEFAULT_NEXT_LABEL,
        }
    }

    pub fn back_label(&self) -> &str {
        self.current_step()
            .back_label
            .as_deref()
            .unwrap_or(DEFAULT_BACK_LABEL)
    }

    /// Get progress percentage (0-100)
    pub fn progress_percent(&self) -> u8 {
        let completed = self.state.completed_step_ids.len();
        ((completed as f32 / self.steps.len() as f32) * 100.0) as u8
    }

    pub fn summary(&self) -> WizardSummary {
        WizardSummary {
            persistence_key: self.persistence_key().map(str::to_string),
            current_step_title: self.current_step().title.clone(),
            current_step_index: self.state.current_step_index,
            step_count: self.steps.len(),
            progress_percent: self.progress_percent(),
        }
    }

    /// Borrow the step-facing contract for the displayed step.
    pub fn context(&mut self) -> StepContext<'_, D> {
        StepContext { wizard: self }
    }

    // ------------------------------------------------------------------------
    // State store
    // ------------------------------------------------------------------------

    /// Shallow-merge `patch` into the accumulated data.
    pub fn update_data(&mut self, patch: D) {
        self.state.data.merge(patch);
        self.persist();
    }

    pub fn clear_error(&mut self, field: &str) {
        self.state.errors.remove(field);
    }

    pub fn clear_all_errors(&mut self) {
        self.state.errors.clear();
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    /// Validate the current step and move forward, completing the wizard on
    /// the last step.
    #[instrument(skip(self), fields(step = %self.current_step().id))]
    pub async fn go_to_next(&mut self) -> Result<Navigation, WizardError> {
        if self.state.is_submitting {
            return Ok(Navigation::Stayed);
        }

        let from = self.state.current_step_index;
        let step = &self.steps[from];
        let step_id = step.id.clone();
        let errors = step.validate(&self.state.data);
        if !errors.is_empty() {
            debug!(fields = errors.len(), "Step validation failed");
            self.state.errors = errors.clone();
            return Ok(Navigation::Blocked(errors));
        }
        self.state.errors.clear();
        self.state.completed_step_ids.insert(step_id);

        if from + 1 == self.steps.len() {
            // Not persisted: a failed completion leaves the snapshot as it was
            return self.complete().await;
        }

        self.state.current_step_index = from + 1;
        self.persist();
        Ok(Navigation::Moved { from, to: from + 1 })
    }

    /// Move back one step. No validation is required.
    pub fn go_to_previous(&mut self) -> Navigation {
        let from = self.state.current_step_index;
        if self.state.is_submitting || from == 0 {
            return Navigation::Stayed;
        }
        self.move_to(from - 1)
    }

    /// Jump to an earlier or already completed step.
    pub fn go_to_step(&mut self, step_id: &str) -> Navigation {
        if self.state.is_submitting || !self.can_go_to_step(step_id) {
            return Navigation::Stayed;
        }
        match self.index_of(step_id) {
            Some(index) => self.move_to(index),
            None => Navigation::Stayed,
        }
    }

    /// Complete an optional step without validating it and advance one step.
    pub fn skip(&mut self) -> Navigation {
        if self.state.is_submitting || !self.can_skip_current() {
            return Navigation::Stayed;
        }
        let from = self.state.current_step_index;
        let step_id = self.steps[from].id.clone();
        debug!(step = %step_id, "Skipping optional step");
        self.state.completed_step_ids.insert(step_id);
        self.move_to(from + 1)
    }

    /// Close without completing. The snapshot stays so a later open resumes.
    pub fn cancel(self) {
        info!(
            key = ?self.persistence_key(),
            step = self.state.current_step_index,
            "Wizard cancelled"
        );
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn index_of(&self, step_id: &str) -> Option<usize> {
        self.steps.iter().position(|step| step.id == step_id)
    }

    fn move_to(&mut self, to: usize) -> Navigation {
        let from = self.state.current_step_index;
        self.state.current_step_index = to;
        self.state.errors.clear();
        self.persist();
        Navigation::Moved { from, to }
    }

    fn persist(&self) {
        if let Some(slot) = &self.slot {
            let snapshot = PersistedSnapshot::new(
                self.state.data.clone(),
                self.state.current_step_index,
                self.state.completed_step_ids.clone(),
            );
            slot.save(&snapshot);
        }
    }

    async fn complete(&mut self) -> Result<Navigation, WizardError> {
        let data = self.state.data.clone();
        let result = {
            let _submitting = SubmittingFlag::raise(&mut self.state.is_submitting);
            self.completion.complete(data).await
        };

        match result {
            Ok(()) => {
                if let Some(slot) = &self.slot {
                    slot.clear();
                }
                self.state = WizardState::new(self.initial_data.clone());
                info!(key = ?self.persistence_key(), "Wizard completed");
                Ok(Navigation::Completed)
            }
            Err(e) => {
                warn!(error = %e, "Wizard completion failed");
                Err(WizardError::Completion(e))
            }
        }
    }
}

// ============================================================================
// Step Context
// ============================================================================

/// What a step screen may see and do.
pub struct StepContext<'a, D: WizardData> {
    wizard: &'a mut Wizard<D>,
}

impl<D: WizardData> StepContext<'_, D> {
    pub fn step(&self) -> &WizardStep<D> {
        self.wizard.current_step()
    }

    pub fn data(&self) -> &D {
        self.wizard.data()
    }

    pub fn update_data(&mut self, patch: D) {
        self.wizard.update_data(patch);
    }

    pub fn errors(&self) -> &FieldErrors {
        self.wizard.errors()
    }

    pub fn clear_error(&mut self, field: &str) {
        self.wizard.clear_error(field);
    }

    pub fn clear_all_errors(&mut self) {
        self.wizard.clear_all_errors();
    }

    pub fn is_submitting(&self) -> bool {
        self.wizard.is_submitting()
    }

    pub async fn go_to_next(&mut self) -> Result<Navigation, WizardError> {
        self.wizard.go_to_next().await
    }

    pub fn go_to_previous(&mut self) -> Navigation {
        self.wizard.go_to_previous()
    }

    pub fn go_to_step(&mut self, step_id: &str) -> Navigation {
        self.wizard.go_to_step(step_id)
    }
}
