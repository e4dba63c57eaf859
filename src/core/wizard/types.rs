//! Wizard Domain Types
//!
//! Defines the building blocks shared by every wizard:
//! - [`WizardData`]: accumulated draft data with shallow per-field merge
//! - [`WizardStep`]: one entry of the step registry
//! - [`StepValidator`]: optional per-step validation capability
//! - [`WizardState`]: mutable state owned by a single wizard
//! - [`Navigation`]: outcome of a navigation request
//! - [`WizardError`]: errors surfaced to the host
//!
//! # Usage
//!
//! ```rust,ignore
//! use engagement_wizard::core::wizard::{FieldErrors, WizardStep};
//!
//! let step = WizardStep::<serde_json::Map<String, serde_json::Value>>::new("details", "Details")
//!     .with_description("Name the engagement")
//!     .with_validator(|data: &serde_json::Map<_, _>| {
//!         let mut errors = FieldErrors::new();
//!         if data.get("name").and_then(|v| v.as_str()).unwrap_or("").is_empty() {
//!             errors.insert("name".into(), "Name is required".into());
//!         }
//!         errors
//!     });
//! assert!(step.has_validator());
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

// ============================================================================
// Accumulated Data
// ============================================================================

/// Field name to user-facing message, for the currently displayed step.
pub type FieldErrors = BTreeMap<String, String>;

/// Data accumulated across wizard steps.
///
/// `merge` is a shallow merge: every field present in `patch` overwrites the
/// same field in `self`, fields absent from `patch` are left alone.
pub trait WizardData:
    Clone + Default + Serialize + DeserializeOwned + Send + Sync + 'static
{
    fn merge(&mut self, patch: Self);
}

/// Dynamic objects merge on their top-level keys.
impl WizardData for serde_json::Map<String, serde_json::Value> {
    fn merge(&mut self, patch: Self) {
        for (key, value) in patch {
            self.insert(key, value);
        }
    }
}

// ============================================================================
// Step Registry
// ============================================================================

/// Validation capability of a step.
///
/// Returns an empty map when the data is acceptable for leaving the step.
pub trait StepValidator<D>: Send + Sync {
    fn validate(&self, data: &D) -> FieldErrors;
}

impl<D, F> StepValidator<D> for F
where
    F: Fn(&D) -> FieldErrors + Send + Sync,
{
    fn validate(&self, data: &D) -> FieldErrors {
        self(data)
    }
}

/// One screen of a guided flow.
pub struct WizardStep<D> {
    /// Unique within a wizard
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    /// Optional steps can be skipped without validation
    pub optional: bool,
    /// Overrides the forward button label
    pub next_label: Option<String>,
    /// Overrides the backward button label
    pub back_label: Option<String>,
    validator: Option<Arc<dyn StepValidator<D>>>,
}

impl<D> WizardStep<D> {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            optional: false,
            next_label: None,
            back_label: None,
            validator: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_validator(mut self, validator: impl StepValidator<D> + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn with_next_label(mut self, label: impl Into<String>) -> Self {
        self.next_label = Some(label.into());
        self
    }

    pub fn with_back_label(mut self, label: impl Into<String>) -> Self {
        self.back_label = Some(label.into());
        self
    }

    /// Mark the step as skippable.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn has_validator(&self) -> bool {
        self.validator.is_some()
    }

    /// Run the validator, if any. Steps without one always pass.
    pub fn validate(&self, data: &D) -> FieldErrors {
        match &self.validator {
            Some(validator) => validator.validate(data),
            None => FieldErrors::new(),
        }
    }
}

impl<D> Clone for WizardStep<D> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            optional: self.optional,
            next_label: self.next_label.clone(),
            back_label: self.back_label.clone(),
            validator: self.validator.clone(),
        }
    }
}

impl<D> fmt::Debug for WizardStep<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WizardStep")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("optional", &self.optional)
            .field("has_validator", &self.has_validator())
            .finish()
    }
}

// ============================================================================
// WizardState
// ============================================================================

/// Mutable state of one open wizard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardState<D> {
    /// Accumulated user input
    pub data: D,
    /// Errors of the currently displayed step
    pub errors: FieldErrors,
    pub current_step_index: usize,
    pub completed_step_ids: BTreeSet<String>,
    /// True while the completion handler runs
    pub is_submitting: bool,
}

impl<D> WizardState<D> {
    pub fn new(data: D) -> Self {
        Self {
            data,
            errors: FieldErrors::new(),
            current_step_index: 0,
            completed_step_ids: BTreeSet::new(),
            is_submitting: false,
        }
    }

    pub fn is_step_completed(&self, step_id: &str) -> bool {
        self.completed_step_ids.contains(step_id)
    }
}

/// Summary of a wizard for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardSummary {
    pub persistence_key: Option<String>,
    pub current_step_title: String,
    pub current_step_index: usize,
    pub step_count: usize,
    pub progress_percent: u8,
}

// ============================================================================
// Navigation Outcome
// ============================================================================

/// Result of a navigation request. Navigation never fails fatally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Nothing changed
    Stayed,
    /// Current step changed
    Moved { from: usize, to: usize },
    /// Validation of the current step failed
    Blocked(FieldErrors),
    /// Completion succeeded; the host should close the wizard
    Completed,
}

impl Navigation {
    pub fn is_moved(&self) -> bool {
        matches!(self, Navigation::Moved { .. })
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during wizard operations
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("Wizard has no steps")]
    NoSteps,

    #[error("Duplicate step id: {0}")]
    DuplicateStep(String),

    #[error("Completion failed: {0}")]
    Completion(#[source] anyhow::Error),
}
