//! Error Types
//!
//! This module defines the error type shared by every stage of a conversion.
//!
//! # Overview
//!
//! [`EsfError`] mirrors the failure taxonomy of the compiler pipeline:
//! - I/O failures (source unreadable, destination unwritable)
//! - Malformed syntax trees handed over by the frontend
//! - Native compiler diagnostics
//! - Internal consistency violations (binding tables, technique references)
//! - On-disk format limits (name capacity, region size)
//!
//! Any error aborts the whole conversion. Diagnostics are carried as plain
//! text so callers can display them verbatim.
//!
//! # Usage
//!
//! ```rust,ignore
//! use esf_core::errors::{EsfError, Result};
//!
//! fn convert() -> Result<()> {
//!     Err(EsfError::Consistency("technique has no vertex unit".into()))
//! }
//! ```

use std::path::PathBuf;

use thiserror::Error;

use crate::stage::ShaderStage;

/// The error type for the ESF compiler.
#[derive(Error, Debug)]
pub enum EsfError {
    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File I/O error with the offending path attached.
    #[error("IO error at {path}: {source}")]
    IoAt {
        /// File that could not be read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    // ========================================================================
    // Frontend Errors
    // ========================================================================
    /// The syntax tree is missing or malformed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Target source generation failed.
    #[error("Code generation error: {0}")]
    Codegen(String),

    // ========================================================================
    // Backend Errors
    // ========================================================================
    /// The native compiler rejected a unit. `diagnostic` is the verbatim
    /// compiler output.
    #[error("{diagnostic}")]
    Compile {
        /// Entry point of the failing unit
        entry_point: String,
        /// Stage of the failing unit
        stage: ShaderStage,
        /// Diagnostic text, unmodified
        diagnostic: String,
    },

    // ========================================================================
    // Layout & Format Errors
    // ========================================================================
    /// Internal consistency violation (binding table divergence, unresolved
    /// technique reference).
    #[error("Consistency error: {0}")]
    Consistency(String),

    /// A value does not fit the fixed on-disk layout.
    #[error("Format error: {0}")]
    Format(String),
}

impl EsfError {
    /// Wraps an I/O error together with the path it happened on.
    #[must_use]
    pub fn io_at(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoAt {
            path: path.into(),
            source,
        }
    }

    /// Returns the native compiler diagnostic if this is a compile failure.
    #[must_use]
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Self::Compile { diagnostic, .. } => Some(diagnostic),
            _ => None,
        }
    }
}

/// Alias for `Result<T, EsfError>`.
pub type Result<T> = std::result::Result<T, EsfError>;
