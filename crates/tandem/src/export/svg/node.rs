//! Node and group boxes.

use log::trace;
use svg::node::element as svg_element;

use tandem_core::{
    color::Color,
    model::{ColorMode, NodeStyle, StyleMode},
};

use super::Svg;
use crate::surface::RenderNode;

const NODE_FALLBACK_COLOR: &str = "#4a90d9";
const GROUP_FALLBACK_COLOR: &str = "gray";
const CORNER_RADIUS: f32 = 8.0;
const SHADOW_OFFSET: f32 = 4.0;
const GROUP_LABEL_INSET: f32 = 12.0;

/// Fill and stroke derived from a node color and the color mode.
struct Palette {
    fill: String,
    fill_opacity: f32,
    stroke: Color,
    text: String,
}

impl Palette {
    fn new(base: Color, mode: ColorMode) -> Self {
        match mode {
            ColorMode::Pastel => Self {
                fill: base.to_string(),
                fill_opacity: 0.2,
                stroke: base,
                text: "black".to_string(),
            },
            ColorMode::Bold => Self {
                fill: base.to_string(),
                fill_opacity: base.alpha(),
                stroke: base,
                text: "white".to_string(),
            },
            ColorMode::Outline => Self {
                fill: "white".to_string(),
                fill_opacity: 1.0,
                stroke: base,
                text: base.to_string(),
            },
        }
    }
}

fn fallback_color(value: &str) -> Color {
    Color::new(value).unwrap_or_default()
}

impl Svg {
    /// Draws one node; nodes without their own style use `graph_style`.
    pub(super) fn render_node(&self, node: &RenderNode, graph_style: NodeStyle) -> svg_element::Group {
        let style = node.style().unwrap_or(graph_style);
        let fallback = if node.is_group() {
            fallback_color(GROUP_FALLBACK_COLOR)
        } else {
            fallback_color(NODE_FALLBACK_COLOR)
        };
        let palette = Palette::new(Color::resolve(node.color(), fallback), style.color_mode);
        let bounds = node.bounds();
        trace!(node:% = node.id(), bounds:?; "Rendering node");

        let mut group = svg_element::Group::new()
            .set("class", "node")
            .set("data-node", node.id().to_string())
            .set("data-kind", node.kind().as_str());

        if style.style_mode == StyleMode::Shadow && !node.is_group() {
            group = group.add(
                svg_element::Rectangle::new()
                    .set("x", bounds.min_x() + SHADOW_OFFSET)
                    .set("y", bounds.min_y() + SHADOW_OFFSET)
                    .set("width", bounds.width())
                    .set("height", bounds.height())
                    .set("rx", CORNER_RADIUS)
                    .set("fill", "black")
                    .set("fill-opacity", 0.15),
            );
        }

        let mut rect = svg_element::Rectangle::new()
            .set("x", bounds.min_x())
            .set("y", bounds.min_y())
            .set("width", bounds.width())
            .set("height", bounds.height())
            .set("rx", CORNER_RADIUS)
            .set("fill", palette.fill)
            .set("stroke", palette.stroke.to_string())
            .set("stroke-width", 1.5);

        rect = match (node.is_group(), style.style_mode) {
            (true, _) => rect
                .set("fill-opacity", palette.fill_opacity * 0.4)
                .set("stroke-dasharray", "8,4"),
            (false, StyleMode::Watercolor) => rect
                .set("fill-opacity", palette.fill_opacity * 0.7)
                .set("stroke-opacity", 0.5),
            (false, _) => rect.set("fill-opacity", palette.fill_opacity),
        };
        group = group.add(rect);

        let family = self.font_family(style.typeface);
        let font_size = self.style.font_size();

        if node.is_group() {
            let label = svg_element::Text::new(node.label())
                .set("x", bounds.min_x() + GROUP_LABEL_INSET)
                .set("y", bounds.min_y() + GROUP_LABEL_INSET + f32::from(font_size))
                .set("font-family", family)
                .set("font-size", font_size)
                .set("font-weight", "bold")
                .set("fill", palette.stroke.to_string());
            return group.add(label);
        }

        let center = bounds.center();
        let mut label = svg_element::Text::new(node.label())
            .set("x", center.x())
            .set("text-anchor", "middle")
            .set("dominant-baseline", "middle")
            .set("font-family", family.clone())
            .set("font-size", font_size)
            .set("fill", palette.text.clone());

        match node.icon() {
            Some(icon) => {
                let caption_size = (f32::from(font_size) * 0.8).round();
                let caption = svg_element::Text::new(icon)
                    .set("class", "icon")
                    .set("x", center.x())
                    .set("y", center.y() - caption_size / 2.0 - 2.0)
                    .set("text-anchor", "middle")
                    .set("dominant-baseline", "middle")
                    .set("font-family", family)
                    .set("font-size", caption_size)
                    .set("font-style", "italic")
                    .set("fill", palette.text);
                label = label.set("y", center.y() + caption_size / 2.0 + 2.0);
                group.add(caption).add(label)
            }
            None => group.add(label.set("y", center.y())),
        }
    }
}

#[cfg(test)]
mod tests {
    use tandem_core::{
        geometry::{Point, Size},
        identifier::Id,
        model::{Origin, Typeface},
    };

    use super::*;
    use crate::{
        config::StyleConfig,
        export::svg::SvgBuilder,
        surface::{NodeKind, RenderGraph},
    };

    fn svg() -> Svg {
        SvgBuilder::new("unused.svg").build().unwrap()
    }

    fn node(kind: NodeKind) -> RenderNode {
        RenderNode::new(Id::new("Api"), kind, "Api", Origin::Line(0))
            .with_position(Point::new(10.0, 20.0))
            .with_size(Size::new(150.0, 50.0))
    }

    fn style(color_mode: ColorMode, style_mode: StyleMode) -> NodeStyle {
        NodeStyle {
            color_mode,
            style_mode,
            typeface: Typeface::Clean,
        }
    }

    #[test]
    fn test_shadow_mode_adds_offset_rect() {
        let output = svg()
            .render_node(&node(NodeKind::Default), style(ColorMode::Pastel, StyleMode::Shadow))
            .to_string();
        assert_eq!(output.matches("<rect").count(), 2);
        assert!(output.contains("x=\"14\""));

        let output = svg()
            .render_node(&node(NodeKind::Default), style(ColorMode::Pastel, StyleMode::Plain))
            .to_string();
        assert_eq!(output.matches("<rect").count(), 1);
    }

    #[test]
    fn test_bold_mode_uses_white_text() {
        let output = svg()
            .render_node(&node(NodeKind::Default), style(ColorMode::Bold, StyleMode::Plain))
            .to_string();
        assert!(output.contains("fill=\"white\""));
    }

    #[test]
    fn test_group_box_is_dashed() {
        let output = svg()
            .render_node(&node(NodeKind::Group), NodeStyle::default())
            .to_string();
        assert!(output.contains("stroke-dasharray=\"8,4\""));
        assert!(output.contains("font-weight=\"bold\""));
    }

    #[test]
    fn test_icon_caption_above_label() {
        let document = tandem_parser::parse("Db [icon: database]\nCache").unwrap();
        let graph = RenderGraph::from_document(&document, &StyleConfig::default());

        let db = svg()
            .render_node(graph.node(Id::new("Db")).unwrap(), graph.style())
            .to_string();
        assert!(db.contains("class=\"icon\""));
        assert!(db.contains("database"));

        let cache = svg()
            .render_node(graph.node(Id::new("Cache")).unwrap(), graph.style())
            .to_string();
        assert!(!cache.contains("class=\"icon\""));
    }
}
