//! Lexical classification of single lines.
//!
//! Classification only decides what a line *is*; extracting its parts is
//! the job of the [`statement`](crate::statement) parser. The order of the
//! checks matters: comments and blanks first, then directive keywords, then
//! connectors, and everything else is a node declaration.

use tandem_core::model::EdgeKind;

/// Line comment marker.
pub const COMMENT_MARKER: &str = "//";

/// Keyword of the direction directive.
pub const DIRECTION_KEYWORD: &str = "direction";

/// Keywords of the style directives.
pub const STYLE_KEYWORDS: [&str; 3] = ["colorMode", "styleMode", "typeface"];

/// The class of a trimmed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    Blank,
    Comment,
    Direction,
    Style,
    Edge(EdgeKind),
    Node,
}

impl LineClass {
    /// Returns true for classes that can never produce an entity.
    pub fn is_ignorable(self) -> bool {
        matches!(self, LineClass::Blank | LineClass::Comment)
    }
}

/// Classifies one trimmed line.
///
/// # Examples
///
/// ```
/// use tandem_core::model::EdgeKind;
/// use tandem_parser::classify::{LineClass, classify};
///
/// assert_eq!(classify("// comment"), LineClass::Comment);
/// assert_eq!(classify("direction down"), LineClass::Direction);
/// assert_eq!(classify("X --> Y"), LineClass::Edge(EdgeKind::DashedArrow));
/// assert_eq!(classify("Web [icon: browser]"), LineClass::Node);
/// ```
pub fn classify(trimmed: &str) -> LineClass {
    if trimmed.is_empty() {
        return LineClass::Blank;
    }
    if trimmed.starts_with(COMMENT_MARKER) {
        return LineClass::Comment;
    }

    let keyword = first_word(trimmed);
    if keyword == DIRECTION_KEYWORD {
        return LineClass::Direction;
    }
    if STYLE_KEYWORDS.contains(&keyword) {
        return LineClass::Style;
    }

    match find_connector(trimmed) {
        Some(kind) => LineClass::Edge(kind),
        None => LineClass::Node,
    }
}

/// Returns the highest-precedence connector contained anywhere in `text`.
pub fn find_connector(text: &str) -> Option<EdgeKind> {
    EdgeKind::PRECEDENCE
        .into_iter()
        .find(|kind| text.contains(kind.connector()))
}

fn first_word(text: &str) -> &str {
    text.split_whitespace().next().unwrap_or_default()
}
