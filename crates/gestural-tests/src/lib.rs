//! Gestural Score End-to-End Test Infrastructure
//!
//! This crate provides integration tests for the score engine and the CLI:
//!
//! - Editing: contiguity and clamping under random edit sequences
//! - Persistence: `.ges` round trips and clamp reporting
//! - Rendering: curve dynamics and the synthesis worker
//! - CLI: every command through the real binary
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p gestural-tests
//! ```

pub mod fixtures;
pub mod harness;

pub use fixtures::{ScoreFixture, CLAMPED_GES, MINIMAL_GES};
pub use harness::{CliResult, TestHarness};
