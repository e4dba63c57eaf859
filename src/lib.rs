//! Engagement Wizard
//!
//! Guided, resumable multi-step creation of penetration-testing engagement
//! projects: a generic wizard engine, the project flow built on it and a
//! terminal host.

pub mod config;
pub mod core;
pub mod tui;

#[cfg(test)]
mod tests;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
