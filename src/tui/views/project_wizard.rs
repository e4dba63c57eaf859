use std::collections::HashMap;
use std::sync::Arc;

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::core::project::{
    parse_list, CreateProjectHandler, EngagementType, Project, ProjectDraft, STEP_DETAILS,
    STEP_REVIEW, STEP_SCHEDULE, STEP_SCOPE, STEP_TEAM,
};
use crate::core::wizard::{Navigation, Wizard, WizardError};
use crate::tui::events::WizardAction;
use crate::tui::theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Comma separated values
    List,
    /// Cycled with Left/Right
    Choice,
}

#[derive(Debug, Clone, Copy)]
pub struct FormField {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

const fn field(key: &'static str, label: &'static str, kind: FieldKind) -> FormField {
    FormField { key, label, kind }
}

const DETAILS_FIELDS: [FormField; 3] = [
    field("name", "Project name", FieldKind::Text),
    field("client", "Client", FieldKind::Text),
    field("description", "Description", FieldKind::Text),
];
const SCOPE_FIELDS: [FormField; 2] = [
    field("engagement_type", "Engagement type", FieldKind::Choice),
    field("targets", "Targets (comma separated)", FieldKind::List),
];
const SCHEDULE_FIELDS: [FormField; 2] = [
    field("start_date", "Start date (YYYY-MM-DD)", FieldKind::Text),
    field("end_date", "End date (YYYY-MM-DD)", FieldKind::Text),
];
const TEAM_FIELDS: [FormField; 2] = [
    field("lead", "Engagement lead", FieldKind::Text),
    field("testers", "Testers (comma separated)", FieldKind::List),
];

/// Form fields shown for a step.
pub fn form_fields(step_id: &str) -> &'static [FormField] {
    match step_id {
        STEP_DETAILS => &DETAILS_FIELDS,
        STEP_SCOPE => &SCOPE_FIELDS,
        STEP_SCHEDULE => &SCHEDULE_FIELDS,
        STEP_TEAM => &TEAM_FIELDS,
        _ => &[],
    }
}

/// Build a single-field patch from raw input.
pub fn patch_for(key: &str, raw: &str) -> ProjectDraft {
    let text = Some(raw.to_string());
    let mut patch = ProjectDraft::default();
    match key {
        "name" => patch.name = text,
        "client" => patch.client = text,
        "description" => patch.description = text,
        "targets" => patch.targets = Some(parse_list(raw)),
        "start_date" => patch.start_date = text,
        "end_date" => patch.end_date = text,
        "lead" => patch.lead = text,
        "testers" => patch.testers = Some(parse_list(raw)),
        _ => {}
    }
    patch
}

/// Current draft value of a field as editable text.
pub fn buffer_from_draft(key: &str, draft: &ProjectDraft) -> String {
    let text = |value: &Option<String>| value.clone().unwrap_or_default();
    let list = |value: &Option<Vec<String>>| value.as_ref().map(|v| v.join(", ")).unwrap_or_default();
    match key {
        "name" => text(&draft.name),
        "client" => text(&draft.client),
        "description" => text(&draft.description),
        "engagement_type" => draft
            .engagement_type
            .map(|kind| kind.label().to_string())
            .unwrap_or_default(),
        "targets" => list(&draft.targets),
        "start_date" => text(&draft.start_date),
        "end_date" => text(&draft.end_date),
        "lead" => text(&draft.lead),
        "testers" => list(&draft.testers),
        _ => String::new(),
    }
}

fn cycle_engagement_type(current: Option<EngagementType>, forward: bool) -> EngagementType {
    let all = EngagementType::ALL;
    let Some(current) = current else {
        return if forward { all[0] } else { all[all.len() - 1] };
    };
    let index = all.iter().position(|kind| *kind == current).unwrap_or(0);
    if forward {
        all[(index + 1) % all.len()]
    } else {
        all[(index + all.len() - 1) % all.len()]
    }
}

/// How the view ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardOutcome {
    Created(Project),
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum StatusLevel {
    Info,
    Error,
}

/// Project creation wizard screen.
pub struct ProjectWizardView {
    wizard: Option<Wizard<ProjectDraft>>,
    handler: Arc<CreateProjectHandler>,
    focus_index: usize,
    buffers: HashMap<&'static str, String>,
    status: Option<(StatusLevel, String)>,
    outcome: Option<WizardOutcome>,
}

impl ProjectWizardView {
    pub fn new(wizard: Wizard<ProjectDraft>, handler: Arc<CreateProjectHandler>) -> Self {
        let mut view = Self {
            wizard: Some(wizard),
            handler,
            focus_index: 0,
            buffers: HashMap::new(),
            status: None,
            outcome: None,
        };
        if let Some(wizard) = &view.wizard {
            if wizard.current_step_index() > 0 || !wizard.completed_step_ids().is_empty() {
                view.status = Some((
                    StatusLevel::Info,
                    format!("Resumed at step {}.", wizard.current_step_index() + 1),
                ));
            }
        }
        view.load_buffers();
        view
    }

    /// Set once the wizard closed.
    pub fn outcome(&self) -> Option<&WizardOutcome> {
        self.outcome.as_ref()
    }

    fn fields(&self) -> &'static [FormField] {
        match &self.wizard {
            Some(wizard) => form_fields(&wizard.current_step().id),
            None => &[],
        }
    }

    fn focused_field(&self) -> Option<FormField> {
        self.fields().get(self.focus_index).copied()
    }

    /// Refill edit buffers from the draft after the displayed step changed.
    fn load_buffers(&mut self) {
        self.focus_index = 0;
        self.buffers.clear();
        let Some(wizard) = &self.wizard else { return };
        for field in form_fields(&wizard.current_step().id) {
            self.buffers
                .insert(field.key, buffer_from_draft(field.key, wizard.data()));
        }
    }

    pub async fn handle_action(&mut self, action: WizardAction) {
        let Some(wizard) = self.wizard.as_mut() else { return };
        if wizard.is_submitting() {
            return;
        }

        match action {
            WizardAction::Next => self.next().await,
            WizardAction::Back => {
                if wizard.is_first_step() {
                    self.cancel();
                } else if wizard.go_to_previous().is_moved() {
                    self.status = None;
                    self.load_buffers();
                }
            }
            WizardAction::Skip => {
                if wizard.skip().is_moved() {
                    self.status = Some((StatusLevel::Info, "Step skipped.".to_string()));
                    self.load_buffers();
                } else {
                    self.status = Some((
                        StatusLevel::Error,
                        "This step is required and cannot be skipped.".to_string(),
                    ));
                }
            }
            WizardAction::JumpTo(index) => {
                let target = wizard.steps().get(index).map(|step| step.id.clone());
                let moved = match target {
                    Some(step_id) => wizard.go_to_step(&step_id).is_moved(),
                    None => false,
                };
                if moved {
                    self.status = None;
                    self.load_buffers();
                } else {
                    self.status = Some((
                        StatusLevel::Error,
                        "Finish the current step before jumping ahead.".to_string(),
                    ));
                }
            }
            WizardAction::Cancel => self.cancel(),
            WizardAction::FocusNext => {
                let len = self.fields().len();
                if len > 0 {
                    self.focus_index = (self.focus_index + 1) % len;
                }
            }
            WizardAction::FocusPrev => {
                let len = self.fields().len();
                if len > 0 {
                    self.focus_index = (self.focus_index + len - 1) % len;
                }
            }
            WizardAction::ChoicePrev | WizardAction::ChoiceNext => {
                if let Some(field) = self.focused_field() {
                    if field.kind == FieldKind::Choice {
                        let forward = action == WizardAction::ChoiceNext;
                        self.set_engagement_type(forward);
                    }
                }
            }
            WizardAction::Input(c) => self.edit_focused(|buffer| buffer.push(c)),
            WizardAction::DeleteChar => self.edit_focused(|buffer| {
                buffer.pop();
            }),
        }
    }

    async fn next(&mut self) {
        let Some(wizard) = self.wizard.as_mut() else { return };
        let result = wizard.go_to_next().await;
        match result {
            Ok(Navigation::Blocked(errors)) => {
                self.status = Some((
                    StatusLevel::Error,
                    format!("{} field(s) need attention.", errors.len()),
                ));
                if let Some(index) = self
                    .fields()
                    .iter()
                    .position(|field| errors.contains_key(field.key))
                {
                    self.focus_index = index;
                }
            }
            Ok(Navigation::Moved { .. }) => {
                self.status = None;
                self.load_buffers();
            }
            Ok(Navigation::Completed) => {
                self.wizard = None;
                self.outcome = Some(match self.handler.take_created() {
                    Some(project) => WizardOutcome::Created(project),
                    None => WizardOutcome::Cancelled,
                });
            }
            Ok(Navigation::Stayed) => {}
            Err(WizardError::Completion(e)) => {
                self.status = Some((
                    StatusLevel::Error,
                    format!("Could not create project: {e:#}"),
                ));
            }
            Err(e) => {
                self.status = Some((StatusLevel::Error, e.to_string()));
            }
        }
    }

    fn cancel(&mut self) {
        if let Some(wizard) = self.wizard.take() {
            wizard.cancel();
        }
        self.outcome = Some(WizardOutcome::Cancelled);
    }

    fn edit_focused(&mut self, edit: impl FnOnce(&mut String)) {
        let Some(field) = self.focused_field() else { return };
        if field.kind == FieldKind::Choice {
            return;
        }
        let Some(buffer) = self.buffers.get_mut(field.key) else { return };
        edit(buffer);
        let patch = patch_for(field.key, buffer);
        if let Some(wizard) = self.wizard.as_mut() {
            let mut ctx = wizard.context();
            ctx.update_data(patch);
            ctx.clear_error(field.key);
        }
    }

    fn set_engagement_type(&mut self, forward: bool) {
        let Some(wizard) = self.wizard.as_mut() else { return };
        let kind = cycle_engagement_type(wizard.data().engagement_type, forward);
        let mut ctx = wizard.context();
        ctx.update_data(ProjectDraft {
            engagement_type: Some(kind),
            ..Default::default()
        });
        ctx.clear_error("engagement_type");
        self.buffers
            .insert("engagement_type", kind.label().to_string());
    }

    // ── Rendering ───────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let Some(wizard) = &self.wizard else { return };

        let rows = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

        let summary = wizard.summary();
        let header = Paragraph::new(Line::from(vec![
            Span::styled(" New engagement project ", theme::title()),
            Span::styled(
                format!(
                    "step {} of {} | {}% complete",
                    summary.current_step_index + 1,
                    summary.step_count,
                    summary.progress_percent
                ),
                theme::muted(),
            ),
        ]))
        .block(Block::default().borders(Borders::ALL).border_style(theme::border_default()));
        frame.render_widget(header, rows[0]);

        let columns =
            Layout::horizontal([Constraint::Length(26), Constraint::Min(20)]).split(rows[1]);
        self.render_step_list(wizard, frame, columns[0]);
        if wizard.current_step().id == STEP_REVIEW {
            self.render_review(wizard, frame, columns[1]);
        } else {
            self.render_form(wizard, frame, columns[1]);
        }

        self.render_hints(wizard, frame, rows[2]);
        if let Some((level, message)) = &self.status {
            let style = match level {
                StatusLevel::Info => Style::default().fg(theme::SUCCESS),
                StatusLevel::Error => theme::error(),
            };
            frame.render_widget(Paragraph::new(Span::styled(format!(" {message}"), style)), rows[3]);
        }
    }

    fn render_step_list(&self, wizard: &Wizard<ProjectDraft>, frame: &mut Frame, area: Rect) {
        let lines: Vec<Line> = wizard
            .steps()
            .iter()
            .enumerate()
            .map(|(index, step)| {
                let current = index == wizard.current_step_index();
                let completed = wizard.completed_step_ids().contains(&step.id);
                let (marker, style) = if current {
                    ("▸", theme::title())
                } else if completed {
                    ("✓", Style::default().fg(theme::SUCCESS))
                } else if wizard.can_go_to_step(&step.id) {
                    (" ", Style::default().fg(theme::TEXT))
                } else {
                    (" ", theme::dim())
                };
                let optional = if step.optional { " (optional)" } else { "" };
                Line::from(vec![
                    Span::styled(format!("{marker} {}. ", index + 1), style),
                    Span::styled(step.title.clone(), style),
                    Span::styled(optional, theme::dim()),
                ])
            })
            .collect();

        frame.render_widget(
            Paragraph::new(lines).block(theme::block_default("Steps")),
            area,
        );
    }

    fn render_form(&self, wizard: &Wizard<ProjectDraft>, frame: &mut Frame, area: Rect) {
        let step = wizard.current_step();
        let block = theme::block_focused(&step.title);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut lines = Vec::new();
        if let Some(description) = &step.description {
            lines.push(Line::styled(description.clone(), theme::muted()));
            lines.push(Line::raw(""));
        }

        for (index, field) in form_fields(&step.id).iter().enumerate() {
            let focused = index == self.focus_index;
            let label_style = if focused { theme::heading() } else { theme::muted() };
            lines.push(Line::styled(field.label, label_style));

            let value = self.buffers.get(field.key).cloned().unwrap_or_default();
            let value_line = match field.kind {
                FieldKind::Choice => {
                    let shown = if value.is_empty() { "(none)".to_string() } else { value };
                    Line::from(vec![
                        Span::styled("  ◂ ", theme::key_hint()),
                        Span::styled(shown, Style::default().fg(theme::TEXT)),
                        Span::styled(" ▸", theme::key_hint()),
                    ])
                }
                FieldKind::Text | FieldKind::List => {
                    let cursor = if focused { "█" } else { "" };
                    Line::from(vec![
                        Span::raw("  "),
                        Span::styled(value, Style::default().fg(theme::TEXT)),
                        Span::styled(cursor, Style::default().fg(theme::PRIMARY)),
                    ])
                }
            };
            lines.push(value_line);

            if let Some(message) = wizard.errors().get(field.key) {
                lines.push(Line::styled(format!("  {message}"), theme::error()));
            }
            lines.push(Line::raw(""));
        }

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
    }

    fn render_review(&self, wizard: &Wizard<ProjectDraft>, frame: &mut Frame, area: Rect) {
        let draft = wizard.data();
        let row = |label: &str, value: String| {
            let shown = if value.is_empty() { "-".to_string() } else { value };
            Line::from(vec![
                Span::styled(format!("  {label:<18}"), theme::muted()),
                Span::styled(shown, Style::default().fg(theme::TEXT)),
            ])
        };

        let mut lines = vec![Line::styled(
            "Confirm the engagement before it is created.",
            Style::default().fg(theme::WARNING).add_modifier(Modifier::BOLD),
        )];
        lines.push(Line::raw(""));
        for key in [
            "name",
            "client",
            "description",
            "engagement_type",
            "targets",
            "start_date",
            "end_date",
            "lead",
            "testers",
        ] {
            lines.push(row(key, buffer_from_draft(key, draft)));
        }

        frame.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .block(theme::block_focused("Review")),
            area,
        );
    }

    fn render_hints(&self, wizard: &Wizard<ProjectDraft>, frame: &mut Frame, area: Rect) {
        let back = if wizard.is_first_step() {
            "Cancel".to_string()
        } else {
            wizard.back_label().to_string()
        };
        let mut spans = vec![
            Span::styled(" [Enter] ", theme::key_hint()),
            Span::raw(wizard.next_label().to_string()),
            Span::styled("  [Esc] ", theme::key_hint()),
            Span::raw(back),
        ];
        if wizard.can_skip_current() {
            spans.push(Span::styled("  [Ctrl+S] ", theme::key_hint()));
            spans.push(Span::raw("Skip"));
        }
        spans.push(Span::styled("  [Tab] ", theme::key_hint()));
        spans.push(Span::raw("Field"));
        spans.push(Span::styled("  [Alt+N] ", theme::key_hint()));
        spans.push(Span::raw("Go to step"));
        spans.push(Span::styled("  [Ctrl+C] ", theme::key_hint()));
        spans.push(Span::raw("Quit"));
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}
