//! Edge geometry.
//!
//! Routes are pure functions of node geometry and edge topology:
//!
//! - Each end attaches to the side of its node facing the other node, at a
//!   measured handle on that side when there is one, else at the side's
//!   midpoint.
//! - A regular edge is a cubic Bézier whose control points leave each anchor
//!   perpendicular to its side.
//! - An edge whose reverse also exists is drawn as a quadratic curve bowed
//!   to one side of the line between the nodes, and its reverse to the other
//!   side, so the pair never overlaps.
//! - Further edges between the same ordered endpoints fan out with growing
//!   offsets. Self-loops leave the top of the node and come back on the right.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use log::trace;

use tandem_core::{
    geometry::{Bounds, Point, Side, Size},
    identifier::Id,
};

use crate::surface::{HandleKind, RenderEdge, RenderGraph, RenderNode};

/// Upper bound of the perpendicular offset of curved edges.
pub const MAX_BOW_OFFSET: f32 = 50.0;

/// Floor of the perpendicular offset, so nearly touching nodes still get
/// two distinct curves.
const MIN_BOW_OFFSET: f32 = 1.0;

/// Share of the anchor distance used as perpendicular offset.
const BOW_RATIO: f32 = 0.3;

const CURVATURE: f32 = 0.25;

/// Reach of a self-loop beyond the node box.
const LOOP_REACH: f32 = 50.0;

/// A routed edge path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgePath {
    Quadratic {
        start: Point,
        control: Point,
        end: Point,
    },
    Cubic {
        start: Point,
        control1: Point,
        control2: Point,
        end: Point,
    },
}

impl EdgePath {
    pub fn start(&self) -> Point {
        match *self {
            Self::Quadratic { start, .. } | Self::Cubic { start, .. } => start,
        }
    }

    pub fn end(&self) -> Point {
        match *self {
            Self::Quadratic { end, .. } | Self::Cubic { end, .. } => end,
        }
    }

    /// Evaluates the curve at `t` in `[0, 1]`.
    pub fn point_at(&self, t: f32) -> Point {
        let u = 1.0 - t;
        match *self {
            Self::Quadratic {
                start,
                control,
                end,
            } => start
                .scale(u * u)
                .add_point(control.scale(2.0 * u * t))
                .add_point(end.scale(t * t)),
            Self::Cubic {
                start,
                control1,
                control2,
                end,
            } => start
                .scale(u * u * u)
                .add_point(control1.scale(3.0 * u * u * t))
                .add_point(control2.scale(3.0 * u * t * t))
                .add_point(end.scale(t * t * t)),
        }
    }

    /// Box around the end and control points; it contains the whole curve.
    pub fn bounds(&self) -> Bounds {
        let points = match *self {
            Self::Quadratic {
                start,
                control,
                end,
            } => vec![start, control, end],
            Self::Cubic {
                start,
                control1,
                control2,
                end,
            } => vec![start, control1, control2, end],
        };
        points
            .into_iter()
            .map(|p| Bounds::new_from_top_left(p, Size::default()))
            .reduce(|acc, b| acc.merge(&b))
            .unwrap_or_default()
    }

    /// Returns the SVG path data string for this path.
    ///
    /// # Examples
    ///
    /// ```
    /// # use tandem::routing::EdgePath;
    /// # use tandem_core::geometry::Point;
    /// let path = EdgePath::Quadratic {
    ///     start: Point::new(0.0, 0.0),
    ///     control: Point::new(50.0, 30.0),
    ///     end: Point::new(100.0, 0.0),
    /// };
    /// assert_eq!(path.to_svg_path_data(), "M 0 0 Q 50 30, 100 0");
    /// ```
    pub fn to_svg_path_data(&self) -> String {
        match *self {
            Self::Quadratic {
                start,
                control,
                end,
            } => format!(
                "M {} {} Q {} {}, {} {}",
                start.x(),
                start.y(),
                control.x(),
                control.y(),
                end.x(),
                end.y()
            ),
            Self::Cubic {
                start,
                control1,
                control2,
                end,
            } => format!(
                "M {} {} C {} {}, {} {}, {} {}",
                start.x(),
                start.y(),
                control1.x(),
                control1.y(),
                control2.x(),
                control2.y(),
                end.x(),
                end.y()
            ),
        }
    }
}

/// Geometry of one edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeRoute {
    edge: Id,
    source_side: Side,
    target_side: Side,
    path: EdgePath,
    label_position: Point,
}

impl EdgeRoute {
    pub fn edge(&self) -> Id {
        self.edge
    }

    pub fn source_side(&self) -> Side {
        self.source_side
    }

    pub fn target_side(&self) -> Side {
        self.target_side
    }

    pub fn path(&self) -> &EdgePath {
        &self.path
    }

    pub fn label_position(&self) -> Point {
        self.label_position
    }

    pub fn bounds(&self) -> Bounds {
        self.path.bounds()
    }
}

/// Picks the side of a node centered at `from` that faces `to`.
///
/// # Examples
///
/// ```
/// # use tandem::routing::choose_side;
/// # use tandem_core::geometry::{Point, Side};
/// let origin = Point::new(0.0, 0.0);
/// assert_eq!(choose_side(origin, Point::new(100.0, 20.0)), Side::Right);
/// assert_eq!(choose_side(origin, Point::new(-100.0, 20.0)), Side::Left);
/// assert_eq!(choose_side(origin, Point::new(20.0, 100.0)), Side::Bottom);
/// assert_eq!(choose_side(origin, Point::new(50.0, -50.0)), Side::Top);
/// ```
pub fn choose_side(from: Point, to: Point) -> Side {
    let delta = to.sub_point(from);
    if delta.x().abs() > delta.y().abs() {
        if delta.x() > 0.0 { Side::Right } else { Side::Left }
    } else if delta.y() > 0.0 {
        Side::Bottom
    } else {
        Side::Top
    }
}

/// Attachment point of an edge end on `side` of `node`.
pub fn anchor(node: &RenderNode, side: Side, kind: HandleKind) -> Point {
    match node.handle(side, kind) {
        Some(handle) => handle.outer_edge_center(node.position()),
        None => node.bounds().side_midpoint(side),
    }
}

/// Routes every edge of the graph whose endpoints exist.
pub fn route_edges(graph: &RenderGraph) -> IndexMap<Id, EdgeRoute> {
    let pairs: HashSet<(Id, Id)> = graph
        .edges()
        .filter(|edge| !edge.is_self_loop())
        .map(|edge| (edge.source(), edge.target()))
        .collect();
    let ranks = parallel_ranks(graph);

    graph
        .edges()
        .filter_map(|edge| {
            let source = graph.node(edge.source())?;
            let target = graph.node(edge.target())?;
            let rank = ranks.get(&edge.id()).copied().unwrap_or(0);

            let route = if edge.is_self_loop() {
                self_loop(edge, source, rank)
            } else if pairs.contains(&(edge.target(), edge.source())) {
                bowed(edge, source, target, rank + 1)
            } else if rank > 0 {
                bowed(edge, source, target, rank)
            } else {
                bezier(edge, source, target)
            };
            trace!(edge:% = edge.id(), path:? = route.path; "Routed edge");
            Some((edge.id(), route))
        })
        .collect()
}

/// Position of each edge among the edges sharing its ordered endpoints,
/// ordered by edge id.
fn parallel_ranks(graph: &RenderGraph) -> HashMap<Id, usize> {
    let mut siblings: HashMap<(Id, Id), Vec<Id>> = HashMap::new();
    for edge in graph.edges() {
        siblings
            .entry((edge.source(), edge.target()))
            .or_default()
            .push(edge.id());
    }

    let mut ranks = HashMap::new();
    for mut ids in siblings.into_values() {
        ids.sort();
        ranks.extend(ids.into_iter().enumerate().map(|(rank, id)| (id, rank)));
    }
    ranks
}

fn sides(source: &RenderNode, target: &RenderNode) -> (Side, Side) {
    let source_center = source.bounds().center();
    let target_center = target.bounds().center();
    (
        choose_side(source_center, target_center),
        choose_side(target_center, source_center),
    )
}

/// Cubic Bézier between the two facing sides.
fn bezier(edge: &RenderEdge, source: &RenderNode, target: &RenderNode) -> EdgeRoute {
    let (source_side, target_side) = sides(source, target);
    let start = anchor(source, source_side, HandleKind::Source);
    let end = anchor(target, target_side, HandleKind::Target);

    EdgeRoute {
        edge: edge.id(),
        source_side,
        target_side,
        path: EdgePath::Cubic {
            start,
            control1: control_point(source_side, start, end),
            control2: control_point(target_side, end, start),
            end,
        },
        label_position: start.midpoint(end),
    }
}

/// Control point leaving `from` perpendicular to `side`, reaching further
/// when `to` lies behind the side.
fn control_point(side: Side, from: Point, to: Point) -> Point {
    match side {
        Side::Left => Point::new(from.x() - control_offset(from.x() - to.x()), from.y()),
        Side::Right => Point::new(from.x() + control_offset(to.x() - from.x()), from.y()),
        Side::Top => Point::new(from.x(), from.y() - control_offset(from.y() - to.y())),
        Side::Bottom => Point::new(from.x(), from.y() + control_offset(to.y() - from.y())),
    }
}

fn control_offset(distance: f32) -> f32 {
    if distance >= 0.0 {
        0.5 * distance
    } else {
        CURVATURE * 25.0 * (-distance).sqrt()
    }
}

/// Quadratic curve bowed `multiple` times the base offset away from the
/// line between the nodes.
///
/// The side is fixed by the id order of the endpoints, so an edge and its
/// reverse always bow to opposite sides.
fn bowed(edge: &RenderEdge, source: &RenderNode, target: &RenderNode, multiple: usize) -> EdgeRoute {
    let (source_side, target_side) = sides(source, target);
    let start = anchor(source, source_side, HandleKind::Source);
    let end = anchor(target, target_side, HandleKind::Target);

    // Canonical direction runs from the smaller id to the larger one.
    let (sign, from, to) = if edge.source() <= edge.target() {
        (1.0, source, target)
    } else {
        (-1.0, target, source)
    };
    let axis = to.bounds().center().sub_point(from.bounds().center());
    let axis = if axis.hypot() > f32::EPSILON {
        axis
    } else {
        end.sub_point(start)
    };
    let normal = if axis.hypot() > f32::EPSILON {
        Point::new(-axis.y(), axis.x()).scale(1.0 / axis.hypot())
    } else {
        Point::new(0.0, -1.0)
    };

    let length = end.sub_point(start).hypot();
    let base = if length > f32::EPSILON {
        (BOW_RATIO * length).clamp(MIN_BOW_OFFSET, MAX_BOW_OFFSET)
    } else {
        MAX_BOW_OFFSET
    };
    let offset = base * multiple as f32 * sign;
    let control = start.midpoint(end).add_point(normal.scale(offset));

    EdgeRoute {
        edge: edge.id(),
        source_side,
        target_side,
        path: EdgePath::Quadratic {
            start,
            control,
            end,
        },
        label_position: control,
    }
}

/// Loop from the top side around to the right side of the node.
fn self_loop(edge: &RenderEdge, node: &RenderNode, rank: usize) -> EdgeRoute {
    let reach = LOOP_REACH * (rank + 1) as f32;
    let start = anchor(node, Side::Top, HandleKind::Source);
    let end = anchor(node, Side::Right, HandleKind::Target);
    let path = EdgePath::Cubic {
        start,
        control1: start.add_point(Point::new(0.0, -reach)),
        control2: end.add_point(Point::new(reach, 0.0)),
        end,
    };

    EdgeRoute {
        edge: edge.id(),
        source_side: Side::Top,
        target_side: Side::Right,
        label_position: path.point_at(0.5),
        path,
    }
}
