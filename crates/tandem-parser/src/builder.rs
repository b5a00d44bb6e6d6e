//! Graph builder.
//!
//! Consumes statements in line order and assembles a [`Document`]. The
//! first time an identifier is seen decides its node: an edge that names an
//! undeclared identifier creates a bare node on the spot, and no later
//! declaration replaces it.
//!
//! Generated ids (`edge_A_B_2`, `style_0`) are valid node names too. Every
//! node name is reserved before the first statement is applied, and a
//! generated id that hits one is primed (`edge_A_B_2'`) until it is free,
//! so an id names at most one entity.

use std::collections::HashSet;

use indexmap::IndexMap;
use log::{debug, trace};

use tandem_core::{
    identifier::Id,
    model::{Direction, Document, NodeStyle, Origin, ParsedEdge, ParsedNode},
    source_map::{EntityKind, EntityRef, SourceMap, SourceMapBuilder},
};

use crate::{
    error::{ParseError, Result},
    statement::{EdgeStatement, NodeStatement, Statement, StyleDirective},
};

#[derive(Debug, Default)]
pub(crate) struct GraphBuilder {
    nodes: IndexMap<Id, ParsedNode>,
    edges: Vec<ParsedEdge>,
    direction: Direction,
    style: NodeStyle,
    source_map: SourceMapBuilder,
    reserved: HashSet<Id>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            source_map: SourceMap::builder(),
            ..Self::default()
        }
    }

    /// Reserves the names of the nodes a statement declares or implies.
    pub fn reserve(&mut self, statement: &Statement<'_>) {
        match statement {
            Statement::Edge(edge) => {
                self.reserved.insert(Id::new(edge.source));
                self.reserved.insert(Id::new(edge.target));
            }
            Statement::Node(node) => {
                self.reserved.insert(Id::new(node.name));
            }
            Statement::Direction(_) | Statement::Style(_) => {}
        }
    }

    /// Primes `candidate` until it is not a node name.
    fn unclaimed(&self, candidate: Id) -> Id {
        let mut id = candidate;
        while self.reserved.contains(&id) {
            id = Id::new(&format!("{id}'"));
        }
        if id != candidate {
            debug!(generated:% = candidate, id:%; "Generated id is a node name");
        }
        id
    }

    /// Applies the statement parsed from `line`.
    pub fn apply(&mut self, line: usize, statement: Statement<'_>) -> Result<()> {
        match statement {
            Statement::Direction(direction) => {
                if let Some(direction) = direction {
                    self.direction = direction;
                }
                let id = self.unclaimed(Id::numbered("direction", line));
                self.map(line, EntityKind::Direction, id)
            }
            Statement::Style(directive) => {
                self.apply_style(directive);
                let id = self.unclaimed(Id::numbered("style", line));
                self.map(line, EntityKind::Style, id)
            }
            Statement::Edge(edge) => self.add_edge(line, edge),
            Statement::Node(node) => self.declare_node(line, node),
        }
    }

    fn apply_style(&mut self, directive: StyleDirective) {
        match directive {
            StyleDirective::ColorMode(Some(value)) => self.style.color_mode = value,
            StyleDirective::StyleMode(Some(value)) => self.style.style_mode = value,
            StyleDirective::Typeface(Some(value)) => self.style.typeface = value,
            _ => trace!(directive:?; "Ignoring unrecognized style value"),
        }
    }

    fn add_edge(&mut self, line: usize, statement: EdgeStatement<'_>) -> Result<()> {
        let source = self.ensure_node(statement.source, line);
        let target = self.ensure_node(statement.target, line);

        let edge = ParsedEdge::new(source, target, statement.kind, line);
        let id = self.unclaimed(edge.id());
        let edge = edge
            .with_id(id)
            .with_label(statement.label)
            .with_color(statement.color.map(str::to_string));
        self.edges.push(edge);
        self.map(line, EntityKind::Edge, id)
    }

    /// Returns the node for `name`, creating a bare one if it is new.
    fn ensure_node(&mut self, name: &str, line: usize) -> Id {
        let id = Id::new(name);
        self.nodes.entry(id).or_insert_with(|| {
            trace!(node:% = id, line; "Creating implicit node");
            ParsedNode::new(id, Origin::Line(line))
        });
        id
    }

    fn declare_node(&mut self, line: usize, statement: NodeStatement<'_>) -> Result<()> {
        let id = Id::new(statement.name);

        if self.nodes.contains_key(&id) {
            debug!(node:% = id, line; "Keeping first declaration of node");
        } else {
            let node = ParsedNode::new(id, Origin::Line(line))
                .with_icon(statement.icon.map(str::to_string))
                .with_color(statement.color.map(str::to_string))
                .with_parent(statement.parent.map(Id::new))
                .with_group(statement.is_group)
                .with_style(self.style);
            self.nodes.insert(id, node);
        }

        // The first declaring line is the node's line even if an earlier
        // edge created it.
        if self
            .source_map
            .contains_entity(EntityRef::new(EntityKind::Node, id))
        {
            return Ok(());
        }
        self.map(line, EntityKind::Node, id)
    }

    fn map(&mut self, line: usize, kind: EntityKind, id: Id) -> Result<()> {
        self.source_map.insert(line, EntityRef::new(kind, id))?;
        Ok(())
    }

    /// Checks edge endpoints and produces the document.
    pub fn finish(self) -> Result<Document> {
        for edge in &self.edges {
            for endpoint in [edge.source(), edge.target()] {
                if !self.nodes.contains_key(&endpoint) {
                    return Err(ParseError::DanglingEdge {
                        line: edge.origin().line().unwrap_or_default(),
                        edge: edge.id(),
                        endpoint,
                    });
                }
            }
        }

        let source_map = self.source_map.build();
        debug!(
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            mapped_lines = source_map.len(),
            direction:% = self.direction;
            "Built document"
        );

        Ok(Document::new(
            self.nodes.into_values().collect(),
            self.edges,
            self.direction,
            self.style,
            source_map,
        ))
    }
}

#[cfg(test)]
mod tests {
    use tandem_core::model::EdgeKind;

    use super::*;

    fn node_statement(name: &str) -> NodeStatement<'_> {
        NodeStatement {
            name,
            ..NodeStatement::default()
        }
    }

    fn arrow<'a>(source: &'a str, target: &'a str) -> EdgeStatement<'a> {
        EdgeStatement {
            kind: EdgeKind::Arrow,
            source,
            target,
            label: None,
            color: None,
        }
    }

    #[test]
    fn test_implicit_nodes_created_in_order() {
        let mut builder = GraphBuilder::new();
        builder.apply(0, Statement::Edge(arrow("B", "A"))).unwrap();
        let doc = builder.finish().unwrap();

        let ids: Vec<_> = doc.nodes().iter().map(|n| n.id().to_string()).collect();
        assert_eq!(ids, vec!["B", "A"]);
        assert_eq!(doc.nodes()[0].origin(), Origin::Line(0));
    }

    #[test]
    fn test_first_explicit_declaration_wins() {
        let mut builder = GraphBuilder::new();
        let first = NodeStatement {
            icon: Some("server"),
            ..node_statement("Api")
        };
        let second = NodeStatement {
            icon: Some("lambda"),
            ..node_statement("Api")
        };
        builder.apply(0, Statement::Node(first)).unwrap();
        builder.apply(1, Statement::Node(second)).unwrap();
        let doc = builder.finish().unwrap();

        assert_eq!(doc.nodes().len(), 1);
        assert_eq!(doc.nodes()[0].icon(), Some("server"));
        assert_eq!(doc.source_map().resolve_line_for_entity(Id::new("Api")), Some(0));
        assert_eq!(doc.source_map().resolve_entity_for_line(1), None);
    }

    #[test]
    fn test_style_snapshot_taken_at_declaration() {
        let mut builder = GraphBuilder::new();
        builder.apply(0, Statement::Node(node_statement("Early"))).unwrap();
        builder
            .apply(
                1,
                Statement::Style(StyleDirective::ColorMode(Some(
                    tandem_core::model::ColorMode::Bold,
                ))),
            )
            .unwrap();
        builder.apply(2, Statement::Node(node_statement("Late"))).unwrap();
        let doc = builder.finish().unwrap();

        let early = doc.node(Id::new("Early")).unwrap().style().unwrap();
        let late = doc.node(Id::new("Late")).unwrap().style().unwrap();
        assert_eq!(early.color_mode, tandem_core::model::ColorMode::Pastel);
        assert_eq!(late.color_mode, tandem_core::model::ColorMode::Bold);
        assert_eq!(doc.style().color_mode, tandem_core::model::ColorMode::Bold);
    }

    #[test]
    fn test_unrecognized_direction_still_mapped() {
        let mut builder = GraphBuilder::new();
        builder.apply(0, Statement::Direction(Some(Direction::Down))).unwrap();
        builder.apply(1, Statement::Direction(None)).unwrap();
        let doc = builder.finish().unwrap();

        assert_eq!(doc.direction(), Direction::Down);
        let entity = doc.source_map().resolve_entity_for_line(1).unwrap();
        assert_eq!(entity.kind(), EntityKind::Direction);
        assert_eq!(entity.id(), "direction_1");
    }

    #[test]
    fn test_generated_ids_avoid_node_names() {
        let mut builder = GraphBuilder::new();
        let statements = [
            Statement::Node(node_statement("style_1")),
            Statement::Style(StyleDirective::ColorMode(None)),
            Statement::Node(node_statement("edge_A_B_3")),
            Statement::Edge(arrow("A", "B")),
        ];
        for statement in &statements {
            builder.reserve(statement);
        }
        for (line, statement) in statements.into_iter().enumerate() {
            builder.apply(line, statement).unwrap();
        }
        let doc = builder.finish().unwrap();
        let map = doc.source_map();

        assert_eq!(map.resolve_entity_for_line(1).unwrap().id(), "style_1'");
        assert_eq!(map.resolve_entity_for_line(3).unwrap().id(), "edge_A_B_3'");
        assert_eq!(doc.edges()[0].id(), "edge_A_B_3'");
        for (line, id) in [(0, "style_1"), (1, "style_1'"), (2, "edge_A_B_3"), (3, "edge_A_B_3'")] {
            assert_eq!(map.resolve_line_for_entity(Id::new(id)), Some(line));
        }
    }

    #[test]
    fn test_primes_until_free() {
        let mut builder = GraphBuilder::new();
        builder.reserve(&Statement::Node(node_statement("direction_0")));
        builder.reserve(&Statement::Node(node_statement("direction_0'")));

        assert_eq!(builder.unclaimed(Id::numbered("direction", 0)), "direction_0''");
        assert_eq!(builder.unclaimed(Id::numbered("direction", 1)), "direction_1");
    }

    #[test]
    fn test_parent_does_not_create_node() {
        let mut builder = GraphBuilder::new();
        let child = NodeStatement {
            parent: Some("Missing"),
            ..node_statement("Child")
        };
        builder.apply(0, Statement::Node(child)).unwrap();
        let doc = builder.finish().unwrap();

        assert_eq!(doc.nodes().len(), 1);
        assert_eq!(doc.nodes()[0].parent(), Some(Id::new("Missing")));
    }
}
