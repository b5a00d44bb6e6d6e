//! Hierarchical layout engine.
//!
//! Layered placement is delegated to a [`LayoutService`]: node sizes and
//! edges go in, positions come out. The bundled [`SugiyamaService`] runs the
//! rust-sugiyama crate in process; hosts may plug in anything else, including
//! a service that runs on another thread and reports back later.
//!
//! A failing service never breaks the diagram. [`merge`] keeps the input
//! positions for every node the service did not place.

use std::collections::{BTreeMap, HashMap};

use log::{debug, warn};
use rust_sugiyama::configure::Config;
use thiserror::Error;

use tandem_core::{
    geometry::{Point, Size},
    identifier::Id,
    model::Direction,
};

use crate::{config::HierarchicalConfig, surface::RenderGraph};

/// Errors reported by a layout service.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutServiceError {
    #[error("Layout service panicked: {0}")]
    Panicked(String),

    #[error("Layout service returned no layout")]
    Empty,

    #[error("Layout service returned positions for unknown nodes")]
    Unmapped,

    #[error("Layout service unavailable: {0}")]
    Unavailable(String),
}

/// One node of a layout request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestNode {
    id: Id,
    size: Size,
}

impl RequestNode {
    pub fn new(id: Id, size: Size) -> Self {
        Self { id, size }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn size(&self) -> Size {
        self.size
    }
}

/// Everything a layout service needs to place a graph.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutRequest {
    direction: Direction,
    layer_spacing: f32,
    node_spacing: f32,
    nodes: Vec<RequestNode>,
    edges: Vec<(Id, Id)>,
}

impl LayoutRequest {
    pub fn new(
        direction: Direction,
        layer_spacing: f32,
        node_spacing: f32,
        nodes: Vec<RequestNode>,
        edges: Vec<(Id, Id)>,
    ) -> Self {
        Self {
            direction,
            layer_spacing,
            node_spacing,
            nodes,
            edges,
        }
    }

    /// Builds the request for a graph. Nodes that have not been measured get
    /// the configured default size.
    pub fn from_graph(graph: &RenderGraph, config: &HierarchicalConfig) -> Self {
        let nodes = graph
            .nodes()
            .map(|node| {
                let size = if node.size().is_zero() {
                    config.default_node_size()
                } else {
                    node.size()
                };
                RequestNode::new(node.id(), size)
            })
            .collect();
        let edges = graph
            .edges()
            .map(|edge| (edge.source(), edge.target()))
            .collect();

        Self::new(
            graph.direction(),
            config.layer_spacing(),
            config.node_spacing(),
            nodes,
            edges,
        )
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn layer_spacing(&self) -> f32 {
        self.layer_spacing
    }

    pub fn node_spacing(&self) -> f32 {
        self.node_spacing
    }

    pub fn nodes(&self) -> &[RequestNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[(Id, Id)] {
        &self.edges
    }
}

/// Computes positions for a layout request.
pub trait LayoutService {
    /// Returns the top-left position of every node the service placed.
    ///
    /// # Errors
    ///
    /// Returns a [`LayoutServiceError`] when no layout could be produced.
    fn layout(&self, request: &LayoutRequest) -> Result<HashMap<Id, Point>, LayoutServiceError>;
}

/// Combines service output with the input positions.
///
/// On failure the input positions are returned unchanged. On success, nodes
/// the service did not place (and non-finite results) keep their input
/// position.
pub fn merge(
    mut positions: HashMap<Id, Point>,
    result: Result<HashMap<Id, Point>, LayoutServiceError>,
) -> HashMap<Id, Point> {
    let placed = match result {
        Ok(placed) => placed,
        Err(err) => {
            warn!(err:%; "Layout service failed, keeping previous positions");
            return positions;
        }
    };

    for (id, position) in placed {
        if !position.is_finite() {
            warn!(node:% = id; "Layout service produced a non-finite position");
            continue;
        }
        if let Some(slot) = positions.get_mut(&id) {
            *slot = position;
        }
    }
    positions
}

/// Layered layout computed with the rust-sugiyama crate.
///
/// Each connected component is laid out separately and the components are
/// placed side by side across the flow. Nodes without edges follow in one
/// extra rank-0 row.
#[derive(Debug, Default, Clone, Copy)]
pub struct SugiyamaService;

impl LayoutService for SugiyamaService {
    fn layout(&self, request: &LayoutRequest) -> Result<HashMap<Id, Point>, LayoutServiceError> {
        let nodes = request.nodes();
        if nodes.is_empty() {
            return Ok(HashMap::new());
        }

        // Map node IDs to u32 IDs for rust-sugiyama
        let node_ids: HashMap<Id, u32> = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id(), i as u32))
            .collect();
        let id_to_node: HashMap<u32, Id> = node_ids.iter().map(|(&node, &id)| (id, node)).collect();

        let mut edges: Vec<(u32, u32)> = request
            .edges()
            .iter()
            .filter_map(|(source, target)| Some((*node_ids.get(source)?, *node_ids.get(target)?)))
            // Skip self-loops
            .filter(|(source, target)| source != target)
            .collect();
        edges.sort_unstable();
        edges.dedup();

        let sizes: Vec<Size> = nodes.iter().map(RequestNode::size).collect();
        let avg_node_size = sizes
            .iter()
            .map(|s| (s.width() + s.height()) / 2.0)
            .sum::<f32>()
            / sizes.len() as f32;
        let horizontal = matches!(request.direction(), Direction::Right | Direction::Left);
        // Extent of a node along the flow and across it.
        let (max_main, max_cross) = sizes.iter().fold((0.0_f32, 0.0_f32), |(main, cross), s| {
            if horizontal {
                (main.max(s.width()), cross.max(s.height()))
            } else {
                (main.max(s.height()), cross.max(s.width()))
            }
        });

        let mut ranks: HashMap<Id, (usize, usize)> = HashMap::new();
        let mut cross_offset = 0;
        if !edges.is_empty() {
            debug!(nodes = nodes.len(), edges = edges.len(); "Running sugiyama layout");
            let layouts = std::panic::catch_unwind(move || {
                // Configure with adaptive vertex spacing based on average node size
                let config = Config {
                    minimum_length: 1,
                    vertex_spacing: (avg_node_size / 50.0).clamp(2.0, 5.0) as f64,
                    ..Default::default()
                };
                rust_sugiyama::from_edges(&edges, &config)
            });

            let layouts = match layouts {
                Ok(layouts) if layouts.is_empty() => return Err(LayoutServiceError::Empty),
                Ok(layouts) => layouts,
                Err(err) => {
                    let message = if let Some(panic_msg) = err.downcast_ref::<String>() {
                        panic_msg.clone()
                    } else if let Some(panic_msg) = err.downcast_ref::<&str>() {
                        (*panic_msg).to_string()
                    } else {
                        "unknown error".to_string()
                    };
                    return Err(LayoutServiceError::Panicked(message));
                }
            };

            for (coords, _, _) in &layouts {
                let component: Vec<(Id, (f64, f64))> = coords
                    .iter()
                    .filter_map(|&(id, coords)| {
                        let id = u32::try_from(id).ok()?;
                        Some((*id_to_node.get(&id)?, coords))
                    })
                    .collect();
                cross_offset +=
                    rank_component(&component, request.edges(), cross_offset, &mut ranks);
            }
            if ranks.is_empty() {
                return Err(LayoutServiceError::Unmapped);
            }
        }

        // Nodes the algorithm never saw share one extra row.
        for node in nodes {
            if !ranks.contains_key(&node.id()) {
                ranks.insert(node.id(), (0, cross_offset));
                cross_offset += 1;
            }
        }

        let layer_count = ranks.values().map(|&(layer, _)| layer).max().unwrap_or(0);
        let main_step = request.layer_spacing() + max_main;
        let cross_step = request.node_spacing() + max_cross;

        let positions = ranks
            .into_iter()
            .map(|(id, (layer, slot))| {
                let layer = match request.direction() {
                    Direction::Right | Direction::Down => layer,
                    Direction::Left | Direction::Up => layer_count - layer,
                };
                let main = layer as f32 * main_step;
                let cross = slot as f32 * cross_step;
                let position = if horizontal {
                    Point::new(main, cross)
                } else {
                    Point::new(cross, main)
                };
                (id, position)
            })
            .collect();
        Ok(positions)
    }
}

/// Turns one component's raw coordinates into `(layer, slot)` pairs.
///
/// Layers are the distinct y values and slots the distinct x values, both in
/// order. Layers are flipped when most edges would point against the flow.
/// Slots are offset by `cross_offset`. Returns the number of slots used.
fn rank_component(
    component: &[(Id, (f64, f64))],
    edges: &[(Id, Id)],
    cross_offset: usize,
    ranks: &mut HashMap<Id, (usize, usize)>,
) -> usize {
    let mut layers: BTreeMap<i64, usize> = BTreeMap::new();
    let mut slots: BTreeMap<i64, usize> = BTreeMap::new();
    for &(_, (x, y)) in component {
        layers.insert(y.round() as i64, 0);
        slots.insert(x.round() as i64, 0);
    }
    for (i, layer) in layers.values_mut().enumerate() {
        *layer = i;
    }
    for (i, slot) in slots.values_mut().enumerate() {
        *slot = i;
    }

    let local: HashMap<Id, (usize, usize)> = component
        .iter()
        .map(|&(id, (x, y))| {
            let layer = layers[&(y.round() as i64)];
            let slot = slots[&(x.round() as i64)];
            (id, (layer, slot))
        })
        .collect();

    let (forward, backward) = edges
        .iter()
        .filter_map(|(source, target)| Some((local.get(source)?.0, local.get(target)?.0)))
        .fold((0, 0), |(forward, backward), (source, target)| {
            match source.cmp(&target) {
                std::cmp::Ordering::Less => (forward + 1, backward),
                std::cmp::Ordering::Greater => (forward, backward + 1),
                std::cmp::Ordering::Equal => (forward, backward),
            }
        });
    let last_layer = layers.len().saturating_sub(1);

    for (id, (layer, slot)) in local {
        let layer = if backward > forward {
            last_layer - layer
        } else {
            layer
        };
        ranks.insert(id, (layer, cross_offset + slot));
    }
    slots.len()
}
