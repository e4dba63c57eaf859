use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Actions the wizard view understands, resolved from raw key events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardAction {
    Next,
    Back,
    Skip,
    Cancel,
    /// Jump to the step at this zero-based index
    JumpTo(usize),
    FocusNext,
    FocusPrev,
    ChoicePrev,
    ChoiceNext,
    Input(char),
    DeleteChar,
}

/// Map a key press to a wizard action. Key releases are ignored.
pub fn wizard_action_from_key(key: KeyEvent) -> Option<WizardAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(WizardAction::Cancel),
            KeyCode::Char('s') => Some(WizardAction::Skip),
            _ => None,
        };
    }

    if key.modifiers.contains(KeyModifiers::ALT) {
        return match key.code {
            KeyCode::Char(c @ '1'..='9') => c
                .to_digit(10)
                .map(|digit| WizardAction::JumpTo(digit as usize - 1)),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Enter => Some(WizardAction::Next),
        KeyCode::Esc => Some(WizardAction::Back),
        KeyCode::Tab | KeyCode::Down => Some(WizardAction::FocusNext),
        KeyCode::BackTab | KeyCode::Up => Some(WizardAction::FocusPrev),
        KeyCode::Left => Some(WizardAction::ChoicePrev),
        KeyCode::Right => Some(WizardAction::ChoiceNext),
        KeyCode::Backspace => Some(WizardAction::DeleteChar),
        KeyCode::Char(c) => Some(WizardAction::Input(c)),
        _ => None,
    }
}
