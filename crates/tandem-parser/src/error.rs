//! Structural errors of a parse pass.
//!
//! Unrecognized lines are never errors; they are skipped. A [`ParseError`]
//! means the builder reached an inconsistent state, and callers keep their
//! previous graph when they see one.

use thiserror::Error;

use tandem_core::{identifier::Id, source_map::SourceMapConflict};

/// A type alias for `Result<T, ParseError>`.
pub type Result<T> = std::result::Result<T, ParseError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("edge `{edge}` on line {line} references unknown node `{endpoint}`")]
    DanglingEdge { line: usize, edge: Id, endpoint: Id },

    #[error("source map conflict: {0}")]
    SourceMap(#[from] SourceMapConflict),
}

impl ParseError {
    /// The 0-based source line the error points at.
    pub fn line(&self) -> usize {
        match self {
            ParseError::DanglingEdge { line, .. } => *line,
            ParseError::SourceMap(conflict) => conflict.line(),
        }
    }
}
