//! Terminal host for the project creation wizard.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{Event, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Frame, Terminal};

use super::events::wizard_action_from_key;
use super::views::{ProjectWizardView, WizardOutcome};

pub type Term = Terminal<CrosstermBackend<io::Stdout>>;

/// Root application state.
pub struct AppState {
    view: ProjectWizardView,
    ticks: u64,
}

impl AppState {
    pub fn new(view: ProjectWizardView) -> Self {
        Self { view, ticks: 0 }
    }

    // ── Elm event loop ──────────────────────────────────────────────────

    /// Main event loop: render → select → update → loop, until the wizard
    /// closes or the input stream ends.
    pub async fn run(&mut self, terminal: &mut Term, tick_rate: Duration) -> io::Result<WizardOutcome> {
        let mut tick_interval = tokio::time::interval(tick_rate);
        let mut event_stream = EventStream::new();

        loop {
            if let Some(outcome) = self.view.outcome() {
                tracing::debug!(ticks = self.ticks, "Wizard closed");
                return Ok(outcome.clone());
            }

            terminal.draw(|frame| self.render(frame))?;

            tokio::select! {
                _ = tick_interval.tick() => {
                    self.ticks += 1;
                }
                event = event_stream.next() => match event {
                    Some(Ok(event)) => self.handle_event(event).await,
                    Some(Err(e)) => return Err(e),
                    None => return Ok(WizardOutcome::Cancelled),
                },
            }
        }
    }

    async fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            if let Some(action) = wizard_action_from_key(key) {
                self.view.handle_action(action).await;
            }
        }
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        self.view.render(frame, area);
    }
}

/// Put the terminal into raw mode on the alternate screen.
pub fn setup_terminal() -> io::Result<Term> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

pub fn restore_terminal(terminal: &mut Term) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

/// Run the wizard view full-screen and restore the terminal afterwards,
/// also when the loop fails.
pub async fn run(view: ProjectWizardView, tick_rate: Duration) -> io::Result<WizardOutcome> {
    let mut terminal = setup_terminal()?;
    let mut app = AppState::new(view);
    let result = app.run(&mut terminal, tick_rate).await;
    restore_terminal(&mut terminal)?;
    result
}
