//! Graph model produced by one parse pass.
//!
//! # Pipeline Position
//!
//! ```text
//! Source Text
//!     ↓ classify (per line)
//! Line classes
//!     ↓ statement parser
//! Statements
//!     ↓ graph builder
//! Document (these types) + SourceMap
//!     ↓ layout + routing
//! Rendered graph
//! ```
//!
//! A [`Document`] is rebuilt wholesale on every successful parse and is never
//! patched afterwards. Edits made on the rendered diagram mutate the
//! rendering model instead.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{identifier::Id, source_map::SourceMap};

/// Line number reported for entities that were created on the diagram and
/// have no source line.
pub const SYNTHETIC_LINE: isize = -1;

/// Where an entity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Declared (or implicitly created) on this 0-based source line.
    Line(usize),
    /// Created by direct manipulation of the rendered diagram.
    Diagram,
}

impl Origin {
    /// Returns the origin as a signed line number, [`SYNTHETIC_LINE`] for
    /// diagram-created entities.
    ///
    /// # Examples
    ///
    /// ```
    /// use tandem_core::model::{Origin, SYNTHETIC_LINE};
    ///
    /// assert_eq!(Origin::Line(3).line_number(), 3);
    /// assert_eq!(Origin::Diagram.line_number(), SYNTHETIC_LINE);
    /// ```
    pub fn line_number(self) -> isize {
        match self {
            Origin::Line(line) => isize::try_from(line).unwrap_or(isize::MAX),
            Origin::Diagram => SYNTHETIC_LINE,
        }
    }

    /// Returns the source line, if any.
    pub fn line(self) -> Option<usize> {
        match self {
            Origin::Line(line) => Some(line),
            Origin::Diagram => None,
        }
    }
}

/// Flow direction of the whole diagram, set by `direction <value>`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Right,
    Left,
    Up,
    Down,
}

impl FromStr for Direction {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "right" => Ok(Self::Right),
            "left" => Ok(Self::Left),
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            _ => Err("Invalid direction"),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Right => "right",
            Self::Left => "left",
            Self::Up => "up",
            Self::Down => "down",
        };
        write!(f, "{name}")
    }
}

/// Fill palette selected by `colorMode`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Pastel,
    Bold,
    Outline,
}

impl FromStr for ColorMode {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pastel" => Ok(Self::Pastel),
            "bold" => Ok(Self::Bold),
            "outline" => Ok(Self::Outline),
            _ => Err("Invalid color mode"),
        }
    }
}

/// Box decoration selected by `styleMode`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleMode {
    #[default]
    Shadow,
    Plain,
    Watercolor,
}

impl FromStr for StyleMode {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shadow" => Ok(Self::Shadow),
            "plain" => Ok(Self::Plain),
            "watercolor" => Ok(Self::Watercolor),
            _ => Err("Invalid style mode"),
        }
    }
}

/// Label font family selected by `typeface`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Typeface {
    #[default]
    Rough,
    Clean,
    Mono,
}

impl FromStr for Typeface {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rough" => Ok(Self::Rough),
            "clean" => Ok(Self::Clean),
            "mono" => Ok(Self::Mono),
            _ => Err("Invalid typeface"),
        }
    }
}

/// Style defaults in effect while parsing; explicit node declarations take a
/// snapshot of them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeStyle {
    pub color_mode: ColorMode,
    pub style_mode: StyleMode,
    pub typeface: Typeface,
}

/// The kind of a connection, determined by its connector token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// `-->`
    DashedArrow,
    /// `--`
    Dashed,
    /// `<>`
    Bidirectional,
    /// `>`
    Arrow,
    /// `<`
    ReverseArrow,
    /// `-`
    Plain,
}

impl EdgeKind {
    /// Connector tokens in the order they are tested against a line.
    ///
    /// Longer tokens come before their prefixes, so `-->` is never read as
    /// `--` or `-`.
    pub const PRECEDENCE: [EdgeKind; 6] = [
        EdgeKind::DashedArrow,
        EdgeKind::Dashed,
        EdgeKind::Bidirectional,
        EdgeKind::Arrow,
        EdgeKind::ReverseArrow,
        EdgeKind::Plain,
    ];

    /// Returns the connector token of this kind.
    pub fn connector(self) -> &'static str {
        match self {
            EdgeKind::DashedArrow => "-->",
            EdgeKind::Dashed => "--",
            EdgeKind::Bidirectional => "<>",
            EdgeKind::Arrow => ">",
            EdgeKind::ReverseArrow => "<",
            EdgeKind::Plain => "-",
        }
    }

    /// Returns true when the stroke is dashed.
    pub fn is_dashed(self) -> bool {
        matches!(self, EdgeKind::DashedArrow | EdgeKind::Dashed)
    }

    /// Returns true when an arrowhead is drawn at the source end.
    pub fn has_start_marker(self) -> bool {
        matches!(self, EdgeKind::Bidirectional | EdgeKind::ReverseArrow)
    }

    /// Returns true when an arrowhead is drawn at the target end.
    pub fn has_end_marker(self) -> bool {
        matches!(
            self,
            EdgeKind::DashedArrow | EdgeKind::Bidirectional | EdgeKind::Arrow
        )
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EdgeKind::DashedArrow => "dashed-arrow",
            EdgeKind::Dashed => "dashed",
            EdgeKind::Bidirectional => "bidirectional",
            EdgeKind::Arrow => "arrow",
            EdgeKind::ReverseArrow => "reverse-arrow",
            EdgeKind::Plain => "plain",
        };
        write!(f, "{name}")
    }
}

/// A diagram entity.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedNode {
    id: Id,
    label: String,
    icon: Option<String>,
    color: Option<String>,
    parent: Option<Id>,
    is_group: bool,
    style: Option<NodeStyle>,
    origin: Origin,
}

impl ParsedNode {
    /// Creates a node with `label = id` and no attributes.
    ///
    /// This is exactly what an implicit reference from an edge produces.
    pub fn new(id: Id, origin: Origin) -> Self {
        Self {
            id,
            label: id.to_string(),
            icon: None,
            color: None,
            parent: None,
            is_group: false,
            style: None,
            origin,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_icon(mut self, icon: Option<String>) -> Self {
        self.icon = icon;
        self
    }

    pub fn with_color(mut self, color: Option<String>) -> Self {
        self.color = color;
        self
    }

    pub fn with_parent(mut self, parent: Option<Id>) -> Self {
        self.parent = parent;
        self
    }

    pub fn with_group(mut self, is_group: bool) -> Self {
        self.is_group = is_group;
        self
    }

    pub fn with_style(mut self, style: NodeStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    pub fn parent(&self) -> Option<Id> {
        self.parent
    }

    pub fn is_group(&self) -> bool {
        self.is_group
    }

    /// Style snapshot taken at declaration. `None` for implicit nodes.
    pub fn style(&self) -> Option<NodeStyle> {
        self.style
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }
}

/// A directed, optionally labelled connection between two nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEdge {
    id: Id,
    source: Id,
    target: Id,
    label: Option<String>,
    kind: EdgeKind,
    color: Option<String>,
    origin: Origin,
}

impl ParsedEdge {
    /// Creates an edge declared on `line`; the id is derived from the
    /// endpoints and the line.
    pub fn new(source: Id, target: Id, kind: EdgeKind, line: usize) -> Self {
        Self {
            id: Id::edge(source, target, line),
            source,
            target,
            label: None,
            kind,
            color: None,
            origin: Origin::Line(line),
        }
    }

    /// Replaces the derived id.
    pub fn with_id(mut self, id: Id) -> Self {
        self.id = id;
        self
    }

    /// Sets the label; empty labels are stored as `None`.
    pub fn with_label(mut self, label: Option<String>) -> Self {
        self.label = label.filter(|label| !label.is_empty());
        self
    }

    pub fn with_color(mut self, color: Option<String>) -> Self {
        self.color = color;
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn source(&self) -> Id {
        self.source
    }

    pub fn target(&self) -> Id {
        self.target
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn kind(&self) -> EdgeKind {
        self.kind
    }

    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }
}

/// Result of parsing one source text.
#[derive(Debug, Clone, Default)]
pub struct Document {
    nodes: Vec<ParsedNode>,
    edges: Vec<ParsedEdge>,
    direction: Direction,
    style: NodeStyle,
    source_map: SourceMap,
}

impl Document {
    pub fn new(
        nodes: Vec<ParsedNode>,
        edges: Vec<ParsedEdge>,
        direction: Direction,
        style: NodeStyle,
        source_map: SourceMap,
    ) -> Self {
        Self {
            nodes,
            edges,
            direction,
            style,
            source_map,
        }
    }

    /// Nodes in first-seen order.
    pub fn nodes(&self) -> &[ParsedNode] {
        &self.nodes
    }

    /// Edges in line order.
    pub fn edges(&self) -> &[ParsedEdge] {
        &self.edges
    }

    pub fn node(&self, id: Id) -> Option<&ParsedNode> {
        self.nodes.iter().find(|node| node.id() == id)
    }

    pub fn edge(&self, id: Id) -> Option<&ParsedEdge> {
        self.edges.iter().find(|edge| edge.id() == id)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Style defaults in effect at the end of the text.
    pub fn style(&self) -> NodeStyle {
        self.style
    }

    pub fn source_map(&self) -> &SourceMap {
        &self.source_map
    }
}
