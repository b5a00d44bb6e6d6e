//! Tandem - a diagram-as-code engine for system architecture diagrams
//!
//! This library compiles the Tandem line DSL into a positioned, routed graph
//! and keeps the text and the diagram synchronized while either one is
//! edited.
//!
//! - [`DiagramBuilder`] runs the one-shot pipeline: parse, lay out, route
//!   and render to SVG.
//! - [`sync::SyncController`] is the interactive entry point, reconciling
//!   text edits and diagram edits without feedback loops.

pub mod config;
mod error;
pub mod export;
pub mod layout;
pub mod measure;
pub mod routing;
pub mod surface;
pub mod sync;

pub use tandem_core::{color, geometry, identifier, model, source_map};

pub use error::TandemError;

use log::{debug, info, trace};

use config::AppConfig;
use layout::hierarchical::SugiyamaService;
use surface::RenderGraph;

/// Builder for parsing and rendering Tandem diagrams.
///
/// # Examples
///
/// ```rust,no_run
/// use tandem::{DiagramBuilder, config::AppConfig};
///
/// let source = "Client > Server: API Call\nServer > Database: Query";
///
/// let builder = DiagramBuilder::new(AppConfig::default());
/// let document = builder.parse(source).expect("Failed to parse");
/// let graph = builder.layout(&document).expect("Failed to lay out");
/// let svg = builder.render_svg(&graph).expect("Failed to render");
///
/// println!("{svg}");
/// ```
#[derive(Default)]
pub struct DiagramBuilder {
    config: AppConfig,
}

impl DiagramBuilder {
    /// Create a new diagram builder with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse source text into a document and its source map.
    ///
    /// # Errors
    ///
    /// Returns [`TandemError::Parse`] when the text yields a structurally
    /// inconsistent graph. Unrecognized lines are skipped, not errors.
    pub fn parse(&self, source: &str) -> Result<model::Document, TandemError> {
        info!("Building document");
        let document = tandem_parser::parse(source)
            .map_err(|err| TandemError::new_parse_error(err, source))?;
        debug!(
            nodes = document.nodes().len(),
            edges = document.edges().len();
            "Document built successfully"
        );
        trace!(document:?; "Parsed document");
        Ok(document)
    }

    /// Measure, position and route every entity of a document.
    ///
    /// The configured layout engine decides the placement; a failing
    /// hierarchical layout falls back to the grid.
    ///
    /// # Errors
    ///
    /// Returns [`TandemError::Layout`] if a node ends up without a finite
    /// position.
    pub fn layout(&self, document: &model::Document) -> Result<RenderGraph, TandemError> {
        let mut graph = RenderGraph::from_document(document, self.config.style());
        let positions = layout::compute_positions(&graph, self.config.layout(), &SugiyamaService);

        if let Some(node) = graph
            .nodes()
            .find(|node| !positions.get(&node.id()).is_some_and(|p| p.is_finite()))
        {
            return Err(TandemError::Layout(format!(
                "node `{}` has no finite position",
                node.id()
            )));
        }

        graph.apply_positions(&positions);
        info!(
            nodes = graph.node_count(),
            routes = graph.routes().count();
            "Layout calculated"
        );
        Ok(graph)
    }

    /// Render a positioned graph to an SVG string.
    ///
    /// # Errors
    ///
    /// Returns [`TandemError::Export`] if the configured style is invalid.
    pub fn render_svg(&self, graph: &RenderGraph) -> Result<String, TandemError> {
        let svg = export::svg::SvgBuilder::default()
            .with_style(self.config.style().clone())
            .build()?;
        let rendered = svg.render(graph).to_string();
        info!(bytes = rendered.len(); "SVG rendered successfully");
        Ok(rendered)
    }
}
