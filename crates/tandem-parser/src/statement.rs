//! Statement parser.
//!
//! Turns one classified line into at most one [`Statement`]. Parsing is
//! total: a line that does not fit its class yields `None` and is skipped by
//! the graph builder without an error.

use winnow::{
    Parser as _,
    ascii::space0,
    combinator::{alt, opt, preceded},
    error::{ContextError, ErrMode},
    token::{rest, take_till, take_until},
};

use tandem_core::model::{ColorMode, Direction, EdgeKind, StyleMode, Typeface};

use crate::{
    classify::{DIRECTION_KEYWORD, LineClass, classify},
    line::SourceLine,
};

type Input<'src> = &'src str;
type IResult<O> = std::result::Result<O, ErrMode<ContextError>>;

/// A parsed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement<'src> {
    /// `direction <value>`; `None` when the value is not a known direction.
    Direction(Option<Direction>),
    Style(StyleDirective),
    Edge(EdgeStatement<'src>),
    Node(NodeStatement<'src>),
}

/// A style directive; the value is `None` when unrecognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleDirective {
    ColorMode(Option<ColorMode>),
    StyleMode(Option<StyleMode>),
    Typeface(Option<Typeface>),
}

/// `<source> <connector> <target>[: <label> [[color: <value>]]]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeStatement<'src> {
    pub kind: EdgeKind,
    pub source: &'src str,
    pub target: &'src str,
    pub label: Option<String>,
    pub color: Option<&'src str>,
}

/// `<name> [key: value, ...]`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeStatement<'src> {
    pub name: &'src str,
    pub icon: Option<&'src str>,
    pub color: Option<&'src str>,
    pub parent: Option<&'src str>,
    pub is_group: bool,
}

/// Classifies and parses one line.
///
/// # Examples
///
/// ```
/// use tandem_core::model::EdgeKind;
/// use tandem_parser::{line::SourceLine, statement::{Statement, parse_line}};
///
/// let line = SourceLine::new(0, "Client > Server: API Call");
/// let Some(Statement::Edge(edge)) = parse_line(&line) else {
///     panic!("expected an edge");
/// };
/// assert_eq!(edge.kind, EdgeKind::Arrow);
/// assert_eq!(edge.source, "Client");
/// assert_eq!(edge.target, "Server");
/// assert_eq!(edge.label.as_deref(), Some("API Call"));
/// ```
pub fn parse_line<'src>(line: &SourceLine<'src>) -> Option<Statement<'src>> {
    let mut input = line.trimmed();
    match classify(input) {
        LineClass::Blank | LineClass::Comment => None,
        LineClass::Direction => direction_directive
            .parse_next(&mut input)
            .ok()
            .map(Statement::Direction),
        LineClass::Style => style_directive
            .parse_next(&mut input)
            .ok()
            .map(Statement::Style),
        LineClass::Edge(kind) => edge_statement(&mut input, kind).ok().map(Statement::Edge),
        LineClass::Node => node_statement(&mut input).ok().map(Statement::Node),
    }
}

/// First whitespace-delimited word after the keyword, possibly empty.
fn directive_value<'src>(input: &mut Input<'src>) -> IResult<&'src str> {
    preceded(space0, take_till(0.., char::is_whitespace)).parse_next(input)
}

fn direction_directive(input: &mut Input<'_>) -> IResult<Option<Direction>> {
    preceded(DIRECTION_KEYWORD, directive_value)
        .map(|value: &str| value.parse().ok())
        .parse_next(input)
}

fn style_directive(input: &mut Input<'_>) -> IResult<StyleDirective> {
    alt((
        preceded("colorMode", directive_value)
            .map(|value: &str| StyleDirective::ColorMode(value.parse().ok())),
        preceded("styleMode", directive_value)
            .map(|value: &str| StyleDirective::StyleMode(value.parse().ok())),
        preceded("typeface", directive_value)
            .map(|value: &str| StyleDirective::Typeface(value.parse().ok())),
    ))
    .parse_next(input)
}

fn backtrack() -> ErrMode<ContextError> {
    ErrMode::Backtrack(ContextError::new())
}

/// Splits once at the first occurrence of the connector.
fn edge_statement<'src>(input: &mut Input<'src>, kind: EdgeKind) -> IResult<EdgeStatement<'src>> {
    let connector = kind.connector();
    let (source, _, right) = (take_until(0.., connector), connector, rest).parse_next(input)?;

    let (target, label_part) = match right.split_once(':') {
        Some((target, label_part)) => (target, Some(label_part)),
        None => (right, None),
    };

    let source = source.trim();
    let target = target.trim();
    if source.is_empty() || target.is_empty() {
        return Err(backtrack());
    }

    let (label, color) = match label_part {
        Some(label_part) => split_label(label_part),
        None => (None, None),
    };

    Ok(EdgeStatement {
        kind,
        source,
        target,
        label,
        color,
    })
}

/// Separates an edge label from its first `[...]` block; the block only
/// contributes a color.
fn split_label(label_part: &str) -> (Option<String>, Option<&str>) {
    let block = label_part.find('[').and_then(|open| {
        label_part[open..]
            .find(']')
            .map(|close| (open, open + close))
    });

    let Some((open, close)) = block else {
        let label = label_part.trim();
        return ((!label.is_empty()).then(|| label.to_string()), None);
    };

    let color = properties(&label_part[open + 1..close])
        .find(|(key, _)| *key == "color")
        .map(|(_, value)| value);
    let label = format!("{}{}", &label_part[..open], &label_part[close + 1..]);
    let label = label.trim();
    ((!label.is_empty()).then(|| label.to_string()), color)
}

fn node_statement<'src>(input: &mut Input<'src>) -> IResult<NodeStatement<'src>> {
    let name = take_till(1.., '[')
        .map(str::trim)
        .verify(|name: &str| !name.is_empty())
        .parse_next(input)?;
    let body = opt(property_block).parse_next(input)?;

    let mut statement = NodeStatement {
        name,
        ..NodeStatement::default()
    };
    for (key, value) in body.into_iter().flat_map(properties) {
        let value = (!value.is_empty()).then_some(value);
        match key {
            "icon" => statement.icon = value,
            "color" => statement.color = value,
            "parent" => statement.parent = value,
            "type" => statement.is_group = value == Some("group"),
            _ => {}
        }
    }
    Ok(statement)
}

/// `[` up to the last `]` on the line. A block that is never closed is not
/// a block.
fn property_block<'src>(input: &mut Input<'src>) -> IResult<&'src str> {
    preceded('[', rest)
        .verify_map(|body: &'src str| body.rfind(']').map(|end| &body[..end]))
        .parse_next(input)
}

/// `key: value` pairs separated by commas; entries without `:` are dropped.
fn properties(body: &str) -> impl Iterator<Item = (&str, &str)> {
    body.split(',')
        .filter_map(|entry| entry.split_once(':'))
        .map(|(key, value)| (key.trim(), value.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Option<Statement<'_>> {
        parse_line(&SourceLine::new(0, text))
    }

    fn edge(text: &str) -> EdgeStatement<'_> {
        match parse(text) {
            Some(Statement::Edge(edge)) => edge,
            other => panic!("expected edge for {text:?}, got {other:?}"),
        }
    }

    fn node(text: &str) -> NodeStatement<'_> {
        match parse(text) {
            Some(Statement::Node(node)) => node,
            other => panic!("expected node for {text:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_and_comment_produce_nothing() {
        assert_eq!(parse("   "), None);
        assert_eq!(parse("// Client > Server"), None);
    }

    #[test]
    fn test_direction_directive() {
        assert_eq!(parse("direction down"), Some(Statement::Direction(Some(Direction::Down))));
        assert_eq!(parse("direction   left"), Some(Statement::Direction(Some(Direction::Left))));
        assert_eq!(parse("direction horizontal"), Some(Statement::Direction(None)));
        assert_eq!(parse("direction"), Some(Statement::Direction(None)));
    }

    #[test]
    fn test_style_directives() {
        assert_eq!(
            parse("colorMode bold"),
            Some(Statement::Style(StyleDirective::ColorMode(Some(ColorMode::Bold))))
        );
        assert_eq!(
            parse("styleMode watercolor"),
            Some(Statement::Style(StyleDirective::StyleMode(Some(StyleMode::Watercolor))))
        );
        assert_eq!(
            parse("typeface clean"),
            Some(Statement::Style(StyleDirective::Typeface(Some(Typeface::Clean))))
        );
        assert_eq!(
            parse("typeface comic"),
            Some(Statement::Style(StyleDirective::Typeface(None)))
        );
    }

    #[test]
    fn test_edge_with_label() {
        let statement = edge("Client > Server: API Call");
        assert_eq!(statement.kind, EdgeKind::Arrow);
        assert_eq!(statement.source, "Client");
        assert_eq!(statement.target, "Server");
        assert_eq!(statement.label.as_deref(), Some("API Call"));
        assert_eq!(statement.color, None);
    }

    #[test]
    fn test_edge_label_color_block() {
        let statement = edge("Api --> Queue: publish [color: orange]");
        assert_eq!(statement.kind, EdgeKind::DashedArrow);
        assert_eq!(statement.label.as_deref(), Some("publish"));
        assert_eq!(statement.color, Some("orange"));
    }

    #[test]
    fn test_edge_color_only_label() {
        let statement = edge("A > B: [color: red]");
        assert_eq!(statement.label, None);
        assert_eq!(statement.color, Some("red"));
    }

    #[test]
    fn test_edge_splits_once_at_first_connector() {
        let statement = edge("A > B > C");
        assert_eq!(statement.source, "A");
        assert_eq!(statement.target, "B > C");
    }

    #[test]
    fn test_edge_label_split_at_first_colon() {
        let statement = edge("Web > Api: GET http://api/v1");
        assert_eq!(statement.target, "Api");
        assert_eq!(statement.label.as_deref(), Some("GET http://api/v1"));
    }

    #[test]
    fn test_edge_with_empty_operand_is_skipped() {
        assert_eq!(parse("> Server"), None);
        assert_eq!(parse("Client >"), None);
        assert_eq!(parse("Client > : label"), None);
    }

    #[test]
    fn test_each_connector_kind() {
        for kind in EdgeKind::PRECEDENCE {
            let text = format!("Left {} Right", kind.connector());
            let statement = edge(&text);
            assert_eq!(statement.kind, kind, "{text}");
            assert_eq!(statement.source, "Left");
            assert_eq!(statement.target, "Right");
        }
    }

    #[test]
    fn test_node_plain() {
        let statement = node("Database");
        assert_eq!(statement.name, "Database");
        assert_eq!(statement.icon, None);
        assert!(!statement.is_group);
    }

    #[test]
    fn test_node_properties() {
        let statement = node("Cache [icon: redis, color: red, parent: Backend]");
        assert_eq!(statement.name, "Cache");
        assert_eq!(statement.icon, Some("redis"));
        assert_eq!(statement.color, Some("red"));
        assert_eq!(statement.parent, Some("Backend"));
        assert!(!statement.is_group);
    }

    #[test]
    fn test_node_group_and_unknown_keys() {
        let statement = node("Backend [type: group, shape: cloud, nonsense]");
        assert!(statement.is_group);
        assert_eq!(statement.icon, None);

        let statement = node("Backend [type: box]");
        assert!(!statement.is_group);
    }

    #[test]
    fn test_node_unclosed_block_ignored() {
        let statement = node("Queue [icon: sqs");
        assert_eq!(statement.name, "Queue");
        assert_eq!(statement.icon, None);
    }

    #[test]
    fn test_node_without_name_is_skipped() {
        assert_eq!(parse("[icon: server]"), None);
    }

    #[test]
    fn test_node_empty_value_is_none() {
        let statement = node("Worker [icon: , color:]");
        assert_eq!(statement.icon, None);
        assert_eq!(statement.color, None);
    }
}
