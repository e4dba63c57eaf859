//! Step list of the project creation wizard.
//!
//! 1. Details - name, client, description
//! 2. Scope - engagement type and targets
//! 3. Schedule - optional testing window
//! 4. Team - optional lead and testers
//! 5. Review - final confirmation

use crate::core::wizard::{FieldErrors, WizardStep};

use super::draft::{parse_date, present, ProjectDraft};

pub const STEP_DETAILS: &str = "details";
pub const STEP_SCOPE: &str = "scope";
pub const STEP_SCHEDULE: &str = "schedule";
pub const STEP_TEAM: &str = "team";
pub const STEP_REVIEW: &str = "review";

pub const MAX_NAME_LEN: usize = 120;

/// Build the ordered step registry for creating a project.
pub fn project_steps() -> Vec<WizardStep<ProjectDraft>> {
    vec![
        WizardStep::new(STEP_DETAILS, "Project details")
            .with_description("Name the engagement and the client it is for.")
            .with_validator(validate_details),
        WizardStep::new(STEP_SCOPE, "Scope")
            .with_description("What kind of test, and which hosts, ranges or URLs are in scope.")
            .with_validator(validate_scope),
        WizardStep::new(STEP_SCHEDULE, "Schedule")
            .with_description("Testing window, dates as YYYY-MM-DD.")
            .with_validator(validate_schedule)
            .optional(),
        WizardStep::new(STEP_TEAM, "Team")
            .with_description("Who leads the engagement and who tests.")
            .with_validator(validate_team)
            .optional(),
        WizardStep::new(STEP_REVIEW, "Review")
            .with_description("Check everything before the project is created.")
            .with_next_label("Create project"),
    ]
}

fn error(errors: &mut FieldErrors, field: &str, message: impl Into<String>) {
    errors.insert(field.to_string(), message.into());
}

pub fn validate_details(draft: &ProjectDraft) -> FieldErrors {
    let mut errors = FieldErrors::new();
    match present(&draft.name) {
        None => error(&mut errors, "name", "Project name is required"),
        Some(name) if name.chars().count() > MAX_NAME_LEN => error(
            &mut errors,
            "name",
            format!("Project name must be at most {MAX_NAME_LEN} characters"),
        ),
        Some(_) => {}
    }
    if present(&draft.client).is_none() {
        error(&mut errors, "client", "Client is required");
    }
    errors
}

pub fn validate_scope(draft: &ProjectDraft) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if draft.engagement_type.is_none() {
        error(&mut errors, "engagement_type", "Choose an engagement type");
    }

    let targets = draft.targets.as_deref().unwrap_or_default();
    if targets.is_empty() {
        error(&mut errors, "targets", "Add at least one target");
    } else if let Some(bad) = targets.iter().find(|target| !is_valid_target(target)) {
        error(&mut errors, "targets", format!("Invalid target: {bad}"));
    }
    errors
}

/// Hosts, IPs, CIDR ranges and URLs: printable, no whitespace.
fn is_valid_target(target: &str) -> bool {
    !target.is_empty()
        && target
            .chars()
            .all(|c| c.is_ascii_graphic() && !matches!(c, '"' | '\'' | '<' | '>' | '`'))
}

pub fn validate_schedule(draft: &ProjectDraft) -> FieldErrors {
    let mut errors = FieldErrors::new();
    let start = present(&draft.start_date);
    let end = present(&draft.end_date);

    let start_date = start.and_then(parse_date);
    let end_date = end.and_then(parse_date);
    if start.is_some() && start_date.is_none() {
        error(&mut errors, "start_date", "Use the YYYY-MM-DD format");
    }
    if end.is_some() && end_date.is_none() {
        error(&mut errors, "end_date", "Use the YYYY-MM-DD format");
    }
    if let (Some(start_date), Some(end_date)) = (start_date, end_date) {
        if end_date < start_date {
            error(&mut errors, "end_date", "End date must not be before start date");
        }
    }
    errors
}

pub fn validate_team(draft: &ProjectDraft) -> FieldErrors {
    let mut errors = FieldErrors::new();
    let has_testers = draft
        .testers
        .as_ref()
        .is_some_and(|testers| !testers.is_empty());
    if has_testers && present(&draft.lead).is_none() {
        error(&mut errors, "lead", "Choose a lead for the assigned testers");
    }
    errors
}
