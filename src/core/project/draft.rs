//! Engagement project draft and the finished project record.
//!
//! [`ProjectDraft`] accumulates raw form input across wizard steps. Every
//! field is optional so a patch can carry just the fields one screen edits.
//! [`NewProject`] is the checked form handed to a [`super::ProjectService`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::wizard::{FieldErrors, WizardData};

use super::steps::{validate_details, validate_schedule, validate_scope, validate_team};

/// Date format accepted by the schedule step
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// Engagement Types
// ============================================================================

/// Kind of engagement being scoped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementType {
    /// Internet-facing infrastructure
    External,
    /// Internal network, assumed breach
    Internal,
    WebApplication,
    Mobile,
    Cloud,
}

impl EngagementType {
    pub const ALL: [EngagementType; 5] = [
        EngagementType::External,
        EngagementType::Internal,
        EngagementType::WebApplication,
        EngagementType::Mobile,
        EngagementType::Cloud,
    ];

    pub fn label(self) -> &'static str {
        match self {
            EngagementType::External => "External network",
            EngagementType::Internal => "Internal network",
            EngagementType::WebApplication => "Web application",
            EngagementType::Mobile => "Mobile application",
            EngagementType::Cloud => "Cloud configuration",
        }
    }
}

// ============================================================================
// ProjectDraft - Accumulated Input
// ============================================================================

/// Draft state of a project being created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProjectDraft {
    // Details step
    pub name: Option<String>,
    pub client: Option<String>,
    pub description: Option<String>,

    // Scope step
    pub engagement_type: Option<EngagementType>,
    pub targets: Option<Vec<String>>,

    // Schedule step, raw `YYYY-MM-DD` input
    pub start_date: Option<String>,
    pub end_date: Option<String>,

    // Team step
    pub lead: Option<String>,
    pub testers: Option<Vec<String>>,
}

macro_rules! merge_fields {
    ($target:ident, $patch:ident; $($field:ident),+ $(,)?) => {
        $(
            if $patch.$field.is_some() {
                $target.$field = $patch.$field;
            }
        )+
    };
}

impl WizardData for ProjectDraft {
    fn merge(&mut self, patch: Self) {
        merge_fields!(
            self, patch;
            name, client, description, engagement_type, targets,
            start_date, end_date, lead, testers,
        );
    }
}

/// Trimmed, non-empty text or `None`.
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

/// Split comma or newline separated input into trimmed entries.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split([',', '\n'])
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

// ============================================================================
// NewProject / Project
// ============================================================================

/// Errors raised while building or storing a project
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("Missing required field: {0}")]
    Incomplete(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("A project named {0:?} already exists")]
    DuplicateName(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A complete, checked request to create a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    pub client: String,
    pub description: Option<String>,
    pub engagement_type: EngagementType,
    pub targets: Vec<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub lead: Option<String>,
    pub testers: Vec<String>,
}

impl TryFrom<&ProjectDraft> for NewProject {
    type Error = ProjectError;

    fn try_from(draft: &ProjectDraft) -> Result<Self, Self::Error> {
        let name = present(&draft.name).ok_or_else(|| ProjectError::Incomplete("name".into()))?;
        let client =
            present(&draft.client).ok_or_else(|| ProjectError::Incomplete("client".into()))?;
        let engagement_type = draft
            .engagement_type
            .ok_or_else(|| ProjectError::Incomplete("engagement_type".into()))?;
        let targets = draft.targets.clone().unwrap_or_default();
        if targets.is_empty() {
            return Err(ProjectError::Incomplete("targets".into()));
        }

        // Jumps can revisit completed steps, so the step rules run again here
        let rules: [fn(&ProjectDraft) -> FieldErrors; 4] =
            [validate_details, validate_scope, validate_schedule, validate_team];
        if let Some((field, reason)) = rules
            .iter()
            .find_map(|rule| rule(draft).into_iter().next())
        {
            return Err(ProjectError::InvalidValue { field, reason });
        }

        let start_date = optional_date("start_date", &draft.start_date)?;
        let end_date = optional_date("end_date", &draft.end_date)?;

        Ok(Self {
            name: name.to_string(),
            client: client.to_string(),
            description: present(&draft.description).map(str::to_string),
            engagement_type,
            targets,
            start_date,
            end_date,
            lead: present(&draft.lead).map(str::to_string),
            testers: draft.testers.clone().unwrap_or_default(),
        })
    }
}

fn optional_date(field: &str, raw: &Option<String>) -> Result<Option<NaiveDate>, ProjectError> {
    match present(raw) {
        None => Ok(None),
        Some(raw) => parse_date(raw)
            .map(Some)
            .ok_or_else(|| ProjectError::InvalidValue {
                field: field.to_string(),
                reason: format!("expected {DATE_FORMAT}, got {raw:?}"),
            }),
    }
}

/// A stored engagement project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    #[serde(flatten)]
    pub details: NewProject,
    pub created_at: DateTime<Utc>,
}

impl Project {
    pub fn new(details: NewProject) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            details,
            created_at: Utc::now(),
        }
    }
}
