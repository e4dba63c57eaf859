pub mod project_wizard;

pub use project_wizard::{ProjectWizardView, WizardOutcome};
