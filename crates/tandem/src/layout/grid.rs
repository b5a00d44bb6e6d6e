//! Grid layout engine.
//!
//! Top-level nodes fill two square-ish grids: groups first on a wide cell,
//! then regular nodes on a smaller cell starting below the group band.
//! Nodes with a resolvable parent are laid out on a finer grid inside their
//! parent, scoped to their siblings.

use std::collections::{HashMap, HashSet, VecDeque};

use indexmap::IndexMap;
use log::{debug, trace};

use tandem_core::{geometry::Point, identifier::Id};

use crate::{config::GridConfig, layout::LayoutNode};

/// Horizontal shift applied when two nodes land on the same position.
const COLLISION_NUDGE: f32 = 10.0;

/// Places every node and returns its top-left position.
///
/// The result has exactly one finite position per input node, and no two
/// nodes share a position.
pub fn layout(nodes: &[LayoutNode], config: &GridConfig) -> HashMap<Id, Point> {
    let index: HashMap<Id, &LayoutNode> = nodes.iter().map(|node| (node.id(), node)).collect();

    let mut children: IndexMap<Id, Vec<Id>> = IndexMap::new();
    let mut groups = Vec::new();
    let mut regular = Vec::new();
    for node in nodes {
        match resolve_parent(node, &index) {
            Some(parent) => children.entry(parent).or_default().push(node.id()),
            None if node.is_group() => groups.push(node.id()),
            None => regular.push(node.id()),
        }
    }

    let origin = Point::new(config.origin(), config.origin());
    let mut positions = HashMap::with_capacity(nodes.len());

    let group_columns = columns(groups.len());
    for (i, &id) in groups.iter().enumerate() {
        let cell = cell(i, group_columns, config.group_spacing(), config.group_spacing());
        positions.insert(id, origin.add_point(cell));
    }

    let band = groups.len().div_ceil(group_columns) as f32 * config.group_spacing();
    let regular_origin = origin.add_point(Point::new(0.0, band));
    let regular_columns = columns(regular.len());
    for (i, &id) in regular.iter().enumerate() {
        let cell = cell(i, regular_columns, config.node_spacing(), config.node_spacing());
        positions.insert(id, regular_origin.add_point(cell));
    }

    // Parents are always placed before their children.
    let mut queue: VecDeque<Id> = groups.iter().chain(regular.iter()).copied().collect();
    while let Some(parent) = queue.pop_front() {
        let (Some(siblings), Some(&parent_position)) = (children.get(&parent), positions.get(&parent))
        else {
            continue;
        };
        let inset = parent_position.add_point(Point::new(config.child_offset(), config.child_offset()));
        let sibling_columns = columns(siblings.len());
        for (i, &child) in siblings.iter().enumerate() {
            let cell = cell(
                i,
                sibling_columns,
                config.child_column_spacing(),
                config.child_row_spacing(),
            );
            positions.insert(child, inset.add_point(cell));
            queue.push_back(child);
        }
    }

    separate(nodes, &mut positions);

    debug!(
        groups = groups.len(),
        regular = regular.len(),
        children = nodes.len() - groups.len() - regular.len();
        "Grid layout computed"
    );
    positions
}

/// Number of columns for `count` cells: `ceil(sqrt(count))`, at least one.
fn columns(count: usize) -> usize {
    ((count as f64).sqrt().ceil() as usize).max(1)
}

fn cell(index: usize, columns: usize, column_spacing: f32, row_spacing: f32) -> Point {
    let column = index % columns;
    let row = index / columns;
    Point::new(column as f32 * column_spacing, row as f32 * row_spacing)
}

/// Returns the parent a node is laid out in, if it has a usable one.
///
/// Missing parents, self-parents and parents on a cycle through the node
/// itself do not count.
fn resolve_parent(node: &LayoutNode, index: &HashMap<Id, &LayoutNode>) -> Option<Id> {
    let parent = node.parent()?;
    if !index.contains_key(&parent) || is_cyclic(node.id(), index) {
        trace!(node:% = node.id(), parent:%; "Treating node as top-level");
        return None;
    }
    Some(parent)
}

/// True if following parent links from `start` leads back to `start`.
fn is_cyclic(start: Id, index: &HashMap<Id, &LayoutNode>) -> bool {
    let mut current = start;
    for _ in 0..index.len() {
        match index.get(&current).and_then(|node| node.parent()) {
            Some(parent) if parent == start => return true,
            Some(parent) if index.contains_key(&parent) => current = parent,
            _ => return false,
        }
    }
    false
}

/// Nudges nodes that share a position until every position is unique.
fn separate(nodes: &[LayoutNode], positions: &mut HashMap<Id, Point>) {
    let mut occupied = HashSet::with_capacity(nodes.len());
    for node in nodes {
        let Some(position) = positions.get_mut(&node.id()) else {
            continue;
        };
        while !occupied.insert(key(*position)) {
            *position = position.add_point(Point::new(COLLISION_NUDGE, 0.0));
        }
    }
}

fn key(point: Point) -> (u32, u32) {
    (point.x().to_bits(), point.y().to_bits())
}
