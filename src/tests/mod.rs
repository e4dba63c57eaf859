//! Crate-level tests
//!
//! - `common`: shared fixtures
//! - `mocks`: mockall doubles for the completion and project service seams
//! - `property`: proptest invariants of the wizard engine
//! - `unit`: scenario tests across engine, stores and the project flow

mod mocks;
