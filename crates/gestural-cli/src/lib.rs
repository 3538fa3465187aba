//! Gestural CLI library.
//!
//! This crate provides the core functionality for the `gestural` command-line
//! tool: score loading with provenance hashes, and the commands for
//! inspecting, validating, editing, transforming and rendering scores.

pub mod commands;
pub mod input;
