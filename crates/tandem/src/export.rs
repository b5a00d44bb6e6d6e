//! Output backends for a routed [`RenderGraph`].
//!
//! Export runs after layout and routing; it never moves nodes or reroutes
//! edges. The only backend is [`svg`], built through [`svg::SvgBuilder`].
//!
//! Failures surface as [`Error`] and become [`TandemError::Export`] once
//! they leave the crate.
//!
//! [`TandemError::Export`]: crate::TandemError::Export

/// SVG export backend.
pub mod svg;

use crate::surface::RenderGraph;

/// Abstraction for diagram export backends.
pub trait Exporter {
    /// Exports a positioned graph to the backend's output format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if the graph cannot be converted to the
    /// target format, or [`Error::Io`] if writing the output fails.
    fn export_graph(&mut self, graph: &RenderGraph) -> Result<(), Error>;
}

/// Errors that can occur during diagram export.
#[derive(Debug)]
pub enum Error {
    /// A rendering or conversion failure described by `message`.
    Render(String),
    /// An I/O error encountered while writing output.
    Io(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Render(msg) => write!(f, "Render error: {msg}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Render(_) => None,
            Self::Io(err) => Some(err),
        }
    }
}
