//! Error adapter for converting TandemError to miette diagnostics.
//!
//! Parse errors point at a source line; they are rendered with a label
//! spanning that line. Every other error is rendered as a plain report with
//! a code.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use tandem::TandemError;
use tandem_parser::ParseError;

/// Adapter for a parse error and the source it came from.
pub struct ParseErrorAdapter<'a> {
    err: &'a ParseError,
    src: &'a str,
}

impl<'a> ParseErrorAdapter<'a> {
    pub fn new(err: &'a ParseError, src: &'a str) -> Self {
        Self { err, src }
    }
}

impl fmt::Debug for ParseErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseErrorAdapter")
            .field("err", &self.err)
            .finish()
    }
}

impl fmt::Display for ParseErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.err, f)
    }
}

impl std::error::Error for ParseErrorAdapter<'_> {}

impl MietteDiagnostic for ParseErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self.err {
            ParseError::DanglingEdge { .. } => "tandem::parse::dangling_edge",
            ParseError::SourceMap(_) => "tandem::parse::source_map",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new("the previous diagram is kept until this line is fixed"))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = line_span(self.src, self.err.line())?;
        let label = LabeledSpan::new_primary_with_span(Some("here".to_string()), span);
        Some(Box::new(std::iter::once(label)))
    }
}

/// Adapter for non-parse [`TandemError`] variants.
pub struct ErrorAdapter<'a>(pub &'a TandemError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            TandemError::Io(_) => "tandem::io",
            TandemError::Parse { .. } => "tandem::parse",
            TandemError::Layout(_) => "tandem::layout",
            TandemError::Export(_) => "tandem::export",
        };
        Some(Box::new(code))
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A parse error with its source line.
    Parse(ParseErrorAdapter<'a>),
    /// An error without source location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Parse(p) => fmt::Display::fmt(p, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Parse(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Parse(p) => p.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Parse(p) => p.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Parse(p) => p.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Parse(p) => p.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Byte span of the 0-based `line` in `src`, without its line break.
fn line_span(src: &str, line: usize) -> Option<SourceSpan> {
    let mut offset = 0;
    for (index, text) in src.split_inclusive('\n').enumerate() {
        if index == line {
            let content = text.trim_end_matches(['\n', '\r']);
            return Some(SourceSpan::new(offset.into(), content.len()));
        }
        offset += text.len();
    }
    None
}

/// Convert a [`TandemError`] into a reportable error.
pub fn to_reportable(err: &TandemError) -> Reportable<'_> {
    match err {
        TandemError::Parse { err, src } => Reportable::Parse(ParseErrorAdapter::new(err, src)),
        _ => Reportable::Error(ErrorAdapter(err)),
    }
}
