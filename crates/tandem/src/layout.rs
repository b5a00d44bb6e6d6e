//! Node placement.
//!
//! Two engines are available, selected by [`LayoutEngine`]:
//!
//! - [`grid`] - deterministic grid placement, always available and used for
//!   every freshly built graph.
//! - [`hierarchical`] - layered placement delegated to a
//!   [`LayoutService`](hierarchical::LayoutService); when the service fails
//!   the grid positions stand.
//!
//! Edge routes are not produced here. They are recomputed by
//! [`routing`](crate::routing) whenever positions change.

pub mod grid;
pub mod hierarchical;

use std::{
    collections::{HashMap, hash_map::DefaultHasher},
    fmt,
    hash::{Hash, Hasher},
};

use indexmap::IndexMap;
use log::{debug, info};

use tandem_core::{
    geometry::{Point, Size},
    identifier::Id,
};

use crate::{
    config::{LayoutConfig, LayoutEngine},
    routing::EdgeRoute,
    surface::RenderGraph,
};

use hierarchical::{LayoutRequest, LayoutService};

/// Fingerprint of a graph's node and edge id sets.
///
/// Two graphs with the same nodes and edges have the same identity no matter
/// where their nodes sit or in which order they were declared. Layout results
/// are only applied to the identity they were computed for.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GraphIdentity(u64);

impl GraphIdentity {
    pub fn new(nodes: impl IntoIterator<Item = Id>, edges: impl IntoIterator<Item = Id>) -> Self {
        let mut nodes: Vec<String> = nodes.into_iter().map(|id| id.to_string()).collect();
        let mut edges: Vec<String> = edges.into_iter().map(|id| id.to_string()).collect();
        nodes.sort_unstable();
        edges.sort_unstable();

        let mut hasher = DefaultHasher::new();
        nodes.hash(&mut hasher);
        edges.hash(&mut hasher);
        Self(hasher.finish())
    }
}

impl fmt::Display for GraphIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// What the engines need to know about a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutNode {
    id: Id,
    size: Size,
    parent: Option<Id>,
    is_group: bool,
}

impl LayoutNode {
    pub fn new(id: Id, size: Size, parent: Option<Id>, is_group: bool) -> Self {
        Self {
            id,
            size,
            parent,
            is_group,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn parent(&self) -> Option<Id> {
        self.parent
    }

    pub fn is_group(&self) -> bool {
        self.is_group
    }
}

/// Positioned graph: node id to top-left position, edge id to routed path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutResult {
    positions: IndexMap<Id, Point>,
    routes: IndexMap<Id, EdgeRoute>,
}

impl LayoutResult {
    pub fn new(positions: IndexMap<Id, Point>, routes: IndexMap<Id, EdgeRoute>) -> Self {
        Self { positions, routes }
    }

    pub fn position(&self, id: Id) -> Option<Point> {
        self.positions.get(&id).copied()
    }

    pub fn positions(&self) -> &IndexMap<Id, Point> {
        &self.positions
    }

    pub fn route(&self, id: Id) -> Option<&EdgeRoute> {
        self.routes.get(&id)
    }

    pub fn routes(&self) -> &IndexMap<Id, EdgeRoute> {
        &self.routes
    }
}

/// Computes node positions for a graph with the configured engine.
///
/// The grid always runs first; the hierarchical engine refines its result
/// and leaves it in place for any node the service did not place.
pub fn compute_positions(
    graph: &RenderGraph,
    config: &LayoutConfig,
    service: &dyn LayoutService,
) -> HashMap<Id, Point> {
    info!(engine:? = config.engine(), nodes = graph.node_count(); "Computing layout");

    let nodes = graph.layout_nodes();
    let positions = grid::layout(&nodes, config.grid());

    match config.engine() {
        LayoutEngine::Grid => positions,
        LayoutEngine::Hierarchical => {
            let request = LayoutRequest::from_graph(graph, config.hierarchical());
            let result = service.layout(&request);
            let positions = hierarchical::merge(positions, result);
            debug!(positioned = positions.len(); "Hierarchical layout merged");
            positions
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_order_independent() {
        let a = Id::new("A");
        let b = Id::new("B");
        let edge = Id::new("edge_A_B_0");

        assert_eq!(
            GraphIdentity::new([a, b], [edge]),
            GraphIdentity::new([b, a], [edge])
        );
        assert_ne!(
            GraphIdentity::new([a, b], [edge]),
            GraphIdentity::new([a, b], Vec::<Id>::new())
        );
    }

    #[test]
    fn test_identity_separates_nodes_and_edges() {
        let x = Id::new("x");
        let none: Vec<Id> = Vec::new();
        assert_ne!(
            GraphIdentity::new([x], none.clone()),
            GraphIdentity::new(none, [x])
        );
    }
}
