//! SVG rendering of a positioned [`RenderGraph`].
//!
//! Drawing order is groups, edge paths, regular nodes, then edge labels, so
//! labels stay readable on top of crossing connectors and nodes sit above
//! their group boxes.

mod edge;
mod node;

use std::{fs::File, io::Write};

use log::{debug, error, info};
use svg::{self, node::element as svg_element};

use tandem_core::{color::Color, geometry::Size, model::Typeface};

use crate::{config::StyleConfig, export, surface::RenderGraph};

/// Space around the diagram content.
const MARGIN: f32 = 50.0;

/// Builder for [`Svg`] exporters.
#[derive(Debug, Default)]
pub struct SvgBuilder {
    file_name: String,
    style: StyleConfig,
}

impl SvgBuilder {
    pub fn new(file_name: &str) -> Self {
        Self {
            file_name: file_name.to_string(),
            style: StyleConfig::default(),
        }
    }

    pub fn with_style(mut self, style: StyleConfig) -> Self {
        self.style = style;
        self
    }

    /// Resolves the configured colors and creates the exporter.
    ///
    /// # Errors
    ///
    /// Returns [`export::Error::Render`] if a configured color is invalid.
    pub fn build(self) -> Result<Svg, export::Error> {
        let background = self.style.background_color().map_err(export::Error::Render)?;
        let edge_color = self.style.edge_color().map_err(export::Error::Render)?;
        Ok(Svg {
            file_name: self.file_name,
            background,
            edge_color,
            style: self.style,
        })
    }
}

/// SVG exporter.
#[derive(Debug)]
pub struct Svg {
    file_name: String,
    background: Option<Color>,
    edge_color: Color,
    style: StyleConfig,
}

impl Svg {
    /// Renders the graph to an SVG document.
    pub fn render(&self, graph: &RenderGraph) -> svg::Document {
        let content_bounds = graph.bounds();
        let svg_size = self.calculate_svg_dimensions(content_bounds.to_size());

        let mut doc = svg::Document::new()
            .set(
                "viewBox",
                format!("0 0 {} {}", svg_size.width(), svg_size.height()),
            )
            .set("width", svg_size.width())
            .set("height", svg_size.height());

        if let Some(background) = self.background {
            doc = doc.add(
                svg_element::Rectangle::new()
                    .set("width", "100%")
                    .set("height", "100%")
                    .set("fill", background.to_string())
                    .set("fill-opacity", background.alpha()),
            );
        }

        doc = doc.add(self.marker_definitions(graph));

        let mut main_group = svg_element::Group::new().set(
            "transform",
            format!(
                "translate({}, {})",
                MARGIN - content_bounds.min_x(),
                MARGIN - content_bounds.min_y()
            ),
        );

        for group in graph.nodes().filter(|node| node.is_group()) {
            main_group = main_group.add(self.render_node(group, graph.style()));
        }
        for edge in graph.edges() {
            if let Some(route) = graph.route(edge.id()) {
                main_group = main_group.add(self.render_edge_path(edge, route));
            }
        }
        for node in graph.nodes().filter(|node| !node.is_group()) {
            main_group = main_group.add(self.render_node(node, graph.style()));
        }
        for edge in graph.edges() {
            if let (Some(label), Some(route)) = (edge.label(), graph.route(edge.id())) {
                main_group = main_group.add(self.render_edge_label(label, route, graph.style().typeface));
            }
        }

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            width = svg_size.width(),
            height = svg_size.height();
            "SVG document rendered"
        );
        doc.add(main_group)
    }

    /// Content size plus the margin on every side.
    fn calculate_svg_dimensions(&self, content_size: Size) -> Size {
        Size::new(
            MARGIN.mul_add(2.0, content_size.width()),
            MARGIN.mul_add(2.0, content_size.height()),
        )
    }

    fn font_family(&self, typeface: Typeface) -> String {
        if let Some(family) = self.style.font_family() {
            return family.to_string();
        }
        match typeface {
            Typeface::Rough => "'Comic Sans MS', 'Segoe Print', cursive",
            Typeface::Clean => "Helvetica, Arial, sans-serif",
            Typeface::Mono => "'Courier New', monospace",
        }
        .to_string()
    }

    /// Writes an SVG document to the configured file.
    fn write_document(&self, doc: &svg::Document) -> Result<(), export::Error> {
        info!(file_name = self.file_name; "Creating SVG file");
        let mut file = File::create(&self.file_name).map_err(|err| {
            error!(file_name = self.file_name, err:%; "Failed to create SVG file");
            export::Error::Io(err)
        })?;

        write!(file, "{doc}").map_err(|err| {
            error!(file_name = self.file_name, err:%; "Failed to write SVG content");
            export::Error::Io(err)
        })
    }
}

impl export::Exporter for Svg {
    fn export_graph(&mut self, graph: &RenderGraph) -> Result<(), export::Error> {
        let doc = self.render(graph);
        self.write_document(&doc)
    }
}
