//! Error types for Tandem operations.
//!
//! This module provides the main error type [`TandemError`] which wraps
//! the error conditions that can occur while compiling, laying out and
//! exporting a diagram.

use std::io;

use thiserror::Error;

use tandem_parser::ParseError;

/// The main error type for Tandem operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant keeps the source text next to the error so the CLI
/// can point at the offending line.
#[derive(Debug, Error)]
pub enum TandemError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Layout error: {0}")]
    Layout(String),

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error + Send + Sync>),
}

impl From<crate::export::Error> for TandemError {
    fn from(error: crate::export::Error) -> Self {
        Self::Export(Box::new(error))
    }
}

impl TandemError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
