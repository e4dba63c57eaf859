//! Multi-Step Wizard Engine
//!
//! Drives guided object creation through an ordered list of steps, gating
//! forward progress on per-step validation and resuming abandoned flows from
//! a stored snapshot.
//!
//! # Overview
//!
//! - **Step registry**: [`WizardStep`] values with optional validation
//! - **State store**: [`WizardState`] owned by one [`Wizard`]
//! - **Navigation**: next / previous / jump / skip, see [`Navigation`]
//! - **Persistence**: [`SnapshotStore`] backends behind a [`SnapshotSlot`]
//! - **Completion**: a [`CompletionHandler`] run once on the last step
//!
//! # Lifecycle
//!
//! ```text
//! Step[0] --valid--> Step[1] --valid--> ... Step[n-1] --valid + created--> Closed
//!    ^                  |                      |
//!    +------ back ------+      completion fails: stays on Step[n-1]
//! ```
//!
//! Cancelling keeps the snapshot; completing removes it.

mod completion;
mod engine;
mod persistence;
mod types;

pub use completion::*;
pub use engine::*;
pub use persistence::*;
pub use types::*;
