//! Rendering-surface model.
//!
//! A [`RenderGraph`] is what a rendering surface displays: positioned,
//! sized nodes with their connection handles, the edges between them and
//! the routed edge paths. It is built from a parsed [`Document`] and then
//! patched in place by direct manipulation on the diagram. Positions are the
//! top-left corner of each node box.
//!
//! The surface reports user interaction back as [`DiagramEvent`]s.

use std::{collections::HashMap, fmt};

use indexmap::IndexMap;
use log::{debug, trace};

use tandem_core::{
    geometry::{Bounds, Point, Side, Size},
    identifier::Id,
    model::{Direction, Document, EdgeKind, NodeStyle, Origin, ParsedEdge, ParsedNode},
};

use crate::{
    config::StyleConfig,
    layout::{GraphIdentity, LayoutNode, LayoutResult},
    measure,
    routing::{self, EdgeRoute},
};

/// Kind tag the surface uses to pick a node renderer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    #[default]
    Default,
    Group,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Group => "group",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which end of an edge a handle accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    Source,
    Target,
}

/// A connection point reported by the surface after measuring a node.
///
/// `bounds` are relative to the node's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    side: Side,
    kind: HandleKind,
    bounds: Bounds,
}

impl Handle {
    pub fn new(side: Side, kind: HandleKind, bounds: Bounds) -> Self {
        Self { side, kind, bounds }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn kind(&self) -> HandleKind {
        self.kind
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Center of the handle's outer edge, in absolute coordinates for a
    /// node placed at `node_position`.
    pub fn outer_edge_center(&self, node_position: Point) -> Point {
        let bounds = self.bounds.translate(node_position);
        let center = bounds.center();
        match self.side {
            Side::Top => Point::new(center.x(), bounds.min_y()),
            Side::Right => Point::new(bounds.max_x(), center.y()),
            Side::Bottom => Point::new(center.x(), bounds.max_y()),
            Side::Left => Point::new(bounds.min_x(), center.y()),
        }
    }
}

/// A node as displayed on the diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderNode {
    id: Id,
    kind: NodeKind,
    position: Point,
    size: Size,
    label: String,
    icon: Option<String>,
    color: Option<String>,
    parent: Option<Id>,
    style: Option<NodeStyle>,
    origin: Origin,
    handles: Vec<Handle>,
}

impl RenderNode {
    pub fn new(id: Id, kind: NodeKind, label: impl Into<String>, origin: Origin) -> Self {
        Self {
            id,
            kind,
            position: Point::default(),
            size: Size::default(),
            label: label.into(),
            icon: None,
            color: None,
            parent: None,
            style: None,
            origin,
            handles: Vec::new(),
        }
    }

    fn from_parsed(node: &ParsedNode, size: Size) -> Self {
        let kind = if node.is_group() {
            NodeKind::Group
        } else {
            NodeKind::Default
        };
        Self {
            icon: node.icon().map(str::to_string),
            color: node.color().map(str::to_string),
            parent: node.parent(),
            style: node.style(),
            size,
            ..Self::new(node.id(), kind, node.label(), node.origin())
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_group(&self) -> bool {
        self.kind == NodeKind::Group
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new_from_top_left(self.position, self.size)
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

    /// Style snapshot taken when the node was declared. Implicit and
    /// diagram-created nodes have none and use the graph defaults.
    pub fn style(&self) -> Option<NodeStyle> {
        self.style
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn handles(&self) -> &[Handle] {
        &self.handles
    }

    /// Returns the first handle of `kind` on `side`.
    pub fn handle(&self, side: Side, kind: HandleKind) -> Option<&Handle> {
        self.handles
            .iter()
            .find(|handle| handle.side == side && handle.kind == kind)
    }
}

/// An edge as displayed on the diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderEdge {
    id: Id,
    source: Id,
    target: Id,
    kind: EdgeKind,
    label: Option<String>,
    color: Option<String>,
    origin: Origin,
}

impl RenderEdge {
    pub fn new(id: Id, source: Id, target: Id, kind: EdgeKind, origin: Origin) -> Self {
        Self {
            id,
            source,
            target,
            kind,
            label: None,
            color: None,
            origin,
        }
    }

    fn from_parsed(edge: &ParsedEdge) -> Self {
        Self {
            label: edge.label().map(str::to_string),
            color: edge.color().map(str::to_string),
            ..Self::new(
                edge.id(),
                edge.source(),
                edge.target(),
                edge.kind(),
                edge.origin(),
            )
        }
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

    pub fn kind(&self) -> EdgeKind {
        self.kind
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// User interaction reported by the rendering surface.
#[derive(Debug, Clone, PartialEq)]
pub enum DiagramEvent {
    /// A node was dragged to a new top-left position.
    MoveNode { id: Id, position: Point },
    /// The user drew a new connection.
    Connect { source: Id, target: Id },
    /// An existing edge was dragged onto other endpoints.
    Reconnect { edge: Id, source: Id, target: Id },
    AddNode { position: Point },
    AddGroup { position: Point },
    /// The surface measured a node's rendered box and handles.
    Measured {
        id: Id,
        size: Size,
        handles: Vec<Handle>,
    },
    SelectNode(Id),
    SelectEdge(Id),
}

/// Positioned graph shown on the rendering surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderGraph {
    nodes: IndexMap<Id, RenderNode>,
    edges: IndexMap<Id, RenderEdge>,
    routes: IndexMap<Id, EdgeRoute>,
    direction: Direction,
    style: NodeStyle,
}

impl RenderGraph {
    /// Builds the unpositioned graph for a parsed document, measuring every
    /// node's label.
    pub fn from_document(document: &Document, style: &StyleConfig) -> Self {
        let nodes = document
            .nodes()
            .iter()
            .map(|node| {
                let typeface = node.style().unwrap_or(document.style()).typeface;
                let size = measure::node_size(
                    node.label(),
                    node.icon().is_some(),
                    node.is_group(),
                    typeface,
                    style,
                );
                (node.id(), RenderNode::from_parsed(node, size))
            })
            .collect();
        let edges = document
            .edges()
            .iter()
            .map(|edge| (edge.id(), RenderEdge::from_parsed(edge)))
            .collect();

        let graph = Self {
            nodes,
            edges,
            routes: IndexMap::new(),
            direction: document.direction(),
            style: document.style(),
        };
        debug!(
            nodes = graph.nodes.len(),
            edges = graph.edges.len();
            "Built render graph"
        );
        graph
    }

    pub fn nodes(&self) -> impl Iterator<Item = &RenderNode> {
        self.nodes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &RenderEdge> {
        self.edges.values()
    }

    pub fn node(&self, id: Id) -> Option<&RenderNode> {
        self.nodes.get(&id)
    }

    pub fn edge(&self, id: Id) -> Option<&RenderEdge> {
        self.edges.get(&id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn contains(&self, id: Id) -> bool {
        self.nodes.contains_key(&id) || self.edges.contains_key(&id)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Document-level style defaults.
    pub fn style(&self) -> NodeStyle {
        self.style
    }

    pub fn routes(&self) -> impl Iterator<Item = &EdgeRoute> {
        self.routes.values()
    }

    pub fn route(&self, edge: Id) -> Option<&EdgeRoute> {
        self.routes.get(&edge)
    }

    /// Identity of the node and edge id sets.
    pub fn identity(&self) -> GraphIdentity {
        GraphIdentity::new(self.nodes.keys().copied(), self.edges.keys().copied())
    }

    /// Inputs for the layout engines, in document order.
    pub fn layout_nodes(&self) -> Vec<LayoutNode> {
        self.nodes
            .values()
            .map(|node| LayoutNode::new(node.id, node.size, node.parent, node.is_group()))
            .collect()
    }

    pub fn positions(&self) -> HashMap<Id, Point> {
        self.nodes
            .values()
            .map(|node| (node.id, node.position))
            .collect()
    }

    /// Snapshot of the current positions and routes.
    pub fn layout_result(&self) -> LayoutResult {
        LayoutResult::new(
            self.nodes
                .values()
                .map(|node| (node.id, node.position))
                .collect(),
            self.routes.clone(),
        )
    }

    /// Moves the listed nodes and reroutes all edges.
    ///
    /// Unknown ids and non-finite positions are ignored.
    pub fn apply_positions<'a>(&mut self, positions: impl IntoIterator<Item = (&'a Id, &'a Point)>) {
        for (id, position) in positions {
            match self.nodes.get_mut(id) {
                Some(node) if position.is_finite() => node.position = *position,
                Some(_) => debug!(node:% = id, position:%; "Ignoring non-finite position"),
                None => trace!(node:% = id; "Ignoring position of unknown node"),
            }
        }
        self.reroute();
    }

    /// Moves one node. Returns false if the node does not exist or the
    /// position is not finite.
    pub fn move_node(&mut self, id: Id, position: Point) -> bool {
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        if !position.is_finite() {
            return false;
        }
        node.position = position;
        self.reroute();
        true
    }

    /// Records the measured size and handles of a node.
    pub fn measure_node(&mut self, id: Id, size: Size, handles: Vec<Handle>) -> bool {
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        if !size.is_zero() {
            node.size = size;
        }
        node.handles = handles;
        self.reroute();
        true
    }

    pub fn insert_node(&mut self, node: RenderNode) {
        self.nodes.insert(node.id, node);
    }

    /// Adds an edge between existing nodes. Returns false if an endpoint is
    /// missing.
    pub fn insert_edge(&mut self, edge: RenderEdge) -> bool {
        if !self.nodes.contains_key(&edge.source) || !self.nodes.contains_key(&edge.target) {
            return false;
        }
        self.edges.insert(edge.id, edge);
        self.reroute();
        true
    }

    /// Points an existing edge at new endpoints.
    pub fn reconnect_edge(&mut self, id: Id, source: Id, target: Id) -> bool {
        if !self.nodes.contains_key(&source) || !self.nodes.contains_key(&target) {
            return false;
        }
        let Some(edge) = self.edges.get_mut(&id) else {
            return false;
        };
        edge.source = source;
        edge.target = target;
        self.reroute();
        true
    }

    /// Copies positions and handles of nodes that also exist in `previous`.
    pub fn inherit_geometry(&mut self, previous: &RenderGraph) {
        for node in self.nodes.values_mut() {
            if let Some(old) = previous.nodes.get(&node.id) {
                node.position = old.position;
                node.handles = old.handles.clone();
            }
        }
        self.reroute();
    }

    /// Recomputes every edge route from the current geometry.
    pub fn reroute(&mut self) {
        self.routes = routing::route_edges(self);
    }

    /// Bounding box of all nodes and routed paths.
    pub fn bounds(&self) -> Bounds {
        let nodes = self.nodes.values().map(RenderNode::bounds);
        let routes = self.routes.values().map(EdgeRoute::bounds);
        nodes
            .chain(routes)
            .reduce(|acc, bounds| acc.merge(&bounds))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_for(source: &str) -> RenderGraph {
        let document = tandem_parser::parse(source).unwrap();
        RenderGraph::from_document(&document, &StyleConfig::default())
    }

    #[test]
    fn test_node_kind_tags() {
        let graph = graph_for("Cluster [type: group]\nApp [parent: Cluster]");

        let cluster = graph.node(Id::new("Cluster")).unwrap();
        assert_eq!(cluster.kind().as_str(), "group");
        assert_eq!(cluster.size(), measure::GROUP_SIZE);

        let app = graph.node(Id::new("App")).unwrap();
        assert_eq!(app.kind(), NodeKind::Default);
        assert_eq!(app.parent(), Some(Id::new("Cluster")));
        assert!(app.size().width() >= measure::MIN_NODE_SIZE.width());
    }

    #[test]
    fn test_move_node() {
        let mut graph = graph_for("A > B");

        assert!(graph.move_node(Id::new("A"), Point::new(10.0, 20.0)));
        assert_eq!(graph.node(Id::new("A")).unwrap().position(), Point::new(10.0, 20.0));
        assert!(!graph.move_node(Id::new("Missing"), Point::new(0.0, 0.0)));
        assert!(!graph.move_node(Id::new("A"), Point::new(f32::NAN, 0.0)));
        assert_eq!(graph.routes().count(), 1);
    }

    #[test]
    fn test_insert_edge_requires_endpoints() {
        let mut graph = graph_for("A\nB");
        let edge = RenderEdge::new(
            Id::new("A-C-1"),
            Id::new("A"),
            Id::new("C"),
            EdgeKind::Arrow,
            Origin::Diagram,
        );
        assert!(!graph.insert_edge(edge));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_identity_ignores_positions() {
        let mut graph = graph_for("A > B");
        let before = graph.identity();
        graph.move_node(Id::new("B"), Point::new(400.0, 0.0));
        assert_eq!(graph.identity(), before);

        graph.insert_node(RenderNode::new(
            Id::new("node_1"),
            NodeKind::Default,
            "Asset 1",
            Origin::Diagram,
        ));
        assert_ne!(graph.identity(), before);
    }

    #[test]
    fn test_inherit_geometry() {
        let mut old = graph_for("A > B");
        old.move_node(Id::new("A"), Point::new(300.0, 40.0));

        let mut new = graph_for("A > B\nB > C");
        new.inherit_geometry(&old);

        assert_eq!(new.node(Id::new("A")).unwrap().position(), Point::new(300.0, 40.0));
        assert_eq!(new.node(Id::new("C")).unwrap().position(), Point::default());
    }

    #[test]
    fn test_handle_outer_edge_center() {
        let handle = Handle::new(
            Side::Right,
            HandleKind::Source,
            Bounds::new_from_top_left(Point::new(145.0, 20.0), Size::new(10.0, 10.0)),
        );
        let anchor = handle.outer_edge_center(Point::new(100.0, 100.0));
        assert_eq!(anchor, Point::new(255.0, 125.0));
    }
}
