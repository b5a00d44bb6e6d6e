//! Edge paths, arrowhead markers and edge labels.

use indexmap::IndexSet;
use svg::node::element as svg_element;

use tandem_core::{color::Color, model::Typeface};

use super::Svg;
use crate::{
    measure,
    routing::EdgeRoute,
    surface::{RenderEdge, RenderGraph},
};

const STROKE_WIDTH: f32 = 1.5;
const LABEL_PADDING: f32 = 5.0;

fn marker_right_id(color: Color) -> String {
    format!("arrow-right-{}", color.to_id_safe_string())
}

fn marker_left_id(color: Color) -> String {
    format!("arrow-left-{}", color.to_id_safe_string())
}

fn arrow_marker(id: String, ref_x: u8, path: &str, color: Color) -> svg_element::Marker {
    svg_element::Marker::new()
        .set("id", id)
        .set("viewBox", "0 0 10 10")
        .set("refX", ref_x)
        .set("refY", 5)
        .set("markerWidth", 6)
        .set("markerHeight", 6)
        .set("orient", "auto")
        .add(
            svg_element::Path::new()
                .set("d", path)
                .set("fill", color.to_string())
                .set("fill-opacity", color.alpha()),
        )
}

impl Svg {
    fn edge_color(&self, edge: &RenderEdge) -> Color {
        Color::resolve(edge.color(), self.edge_color)
    }

    /// One marker per color and direction actually used by the graph.
    pub(super) fn marker_definitions(&self, graph: &RenderGraph) -> svg_element::Definitions {
        let mut heads = IndexSet::new();
        let mut tails = IndexSet::new();
        for edge in graph.edges() {
            let color = self.edge_color(edge);
            if edge.kind().has_start_marker() {
                heads.insert(color);
            }
            if edge.kind().has_end_marker() {
                tails.insert(color);
            }
        }

        let mut defs = svg_element::Definitions::new();
        for color in heads {
            defs = defs.add(arrow_marker(
                marker_left_id(color),
                1,
                "M 10 0 L 0 5 L 10 10 z",
                color,
            ));
        }
        for color in tails {
            defs = defs.add(arrow_marker(
                marker_right_id(color),
                9,
                "M 0 0 L 10 5 L 0 10 z",
                color,
            ));
        }
        defs
    }

    pub(super) fn render_edge_path(&self, edge: &RenderEdge, route: &EdgeRoute) -> svg_element::Path {
        let color = self.edge_color(edge);
        let mut path = svg_element::Path::new()
            .set("class", "edge")
            .set("data-edge", edge.id().to_string())
            .set("d", route.path().to_svg_path_data())
            .set("fill", "none")
            .set("stroke", color.to_string())
            .set("stroke-opacity", color.alpha())
            .set("stroke-width", STROKE_WIDTH);

        if edge.kind().is_dashed() {
            path = path.set("stroke-dasharray", "5,5");
        }
        if edge.kind().has_start_marker() {
            path = path.set("marker-start", format!("url(#{})", marker_left_id(color)));
        }
        if edge.kind().has_end_marker() {
            path = path.set("marker-end", format!("url(#{})", marker_right_id(color)));
        }
        path
    }

    /// Label centered on the route's label point over a translucent plate.
    pub(super) fn render_edge_label(
        &self,
        label: &str,
        route: &EdgeRoute,
        typeface: Typeface,
    ) -> svg_element::Group {
        let at = route.label_position();
        let text_size = measure::measure_label(label, typeface, &self.style);

        let plate = svg_element::Rectangle::new()
            .set("x", at.x() - text_size.width() / 2.0 - LABEL_PADDING)
            .set("y", at.y() - text_size.height() / 2.0 - LABEL_PADDING)
            .set("width", text_size.width() + LABEL_PADDING * 2.0)
            .set("height", text_size.height() + LABEL_PADDING * 2.0)
            .set("fill", "white")
            .set("fill-opacity", 0.8)
            .set("rx", 3.0);

        let text = svg_element::Text::new(label)
            .set("x", at.x())
            .set("y", at.y())
            .set("text-anchor", "middle")
            .set("dominant-baseline", "middle")
            .set("font-family", self.font_family(typeface))
            .set("font-size", self.style.font_size());

        svg_element::Group::new()
            .set("class", "edge-label")
            .add(plate)
            .add(text)
    }
}
