//! Internal test utilities for the ESF crates.

pub mod fixtures;
pub mod scripted;

pub use scripted::{CompileCall, ScriptedCompiler, declared_resources};
