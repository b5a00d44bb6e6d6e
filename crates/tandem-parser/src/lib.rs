//! # Tandem Parser
//!
//! Parser for the Tandem diagram-as-code language. This crate turns source
//! text into a [`Document`]: the node and edge lists plus the source map
//! linking every entity back to its line.
//!
//! ## Usage
//!
//! ```
//! # use tandem_parser::{parse, ParseError};
//! # use tandem_core::identifier::Id;
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = "Client > Server: API Call\nServer > Database: Query";
//!
//!     let document = parse(source)?;
//!     assert_eq!(document.nodes().len(), 3);
//!     assert_eq!(document.edges().len(), 2);
//!     assert_eq!(
//!         document.source_map().resolve_line_for_entity(Id::new("edge_Server_Database_1")),
//!         Some(1)
//!     );
//!     Ok(())
//! }
//! ```

mod builder;
pub mod classify;
mod error;
pub mod line;
pub mod statement;

pub use error::{ParseError, Result};

use log::{info, trace};

use tandem_core::model::Document;

use builder::GraphBuilder;

/// Parse source text into a document.
///
/// This is the main entry point. Each line goes through:
///
/// 1. **Classify** - Decide whether the line is a comment, directive, edge or node
/// 2. **Parse** - Extract the statement's parts
/// 3. **Build** - Reserve every node name, then apply the statements in order
///
/// Lines that fit no statement are skipped, so the same text always yields
/// the same document.
///
/// # Errors
///
/// Returns a [`ParseError`] only when the assembled graph is structurally
/// inconsistent.
pub fn parse(source: &str) -> Result<Document> {
    info!(bytes = source.len(); "Parsing source");

    let mut statements = Vec::new();
    for line in line::lines(source) {
        match statement::parse_line(&line) {
            Some(statement) => statements.push((line.index(), statement)),
            None => trace!(line = line.index(); "Skipping line"),
        }
    }

    let mut builder = GraphBuilder::new();
    for (_, statement) in &statements {
        builder.reserve(statement);
    }
    for (index, statement) in statements {
        builder.apply(index, statement)?;
    }
    builder.finish()
}
