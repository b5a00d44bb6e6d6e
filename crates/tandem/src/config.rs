//! Configuration types for Tandem.
//!
//! All types implement [`serde::Deserialize`] so the CLI can load them from
//! TOML; every section and field is optional and falls back to the defaults
//! listed on each type.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining the sections below.
//! - [`LayoutConfig`] - Which [`LayoutEngine`] runs and its spacing.
//! - [`StyleConfig`] - Visual options used by measurement and SVG export.
//! - [`SyncConfig`] - Sync controller behavior.
//!
//! # Example
//!
//! ```
//! # use tandem::config::{AppConfig, LayoutEngine};
//! let config = AppConfig::default();
//! assert_eq!(config.layout().engine(), LayoutEngine::Grid);
//! assert_eq!(config.layout().grid().node_spacing(), 200.0);
//! assert!(config.style().background_color().is_ok());
//! ```

use serde::Deserialize;

use tandem_core::{color::Color, geometry::Size};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    layout: LayoutConfig,

    #[serde(default)]
    style: StyleConfig,

    #[serde(default)]
    sync: SyncConfig,
}

impl AppConfig {
    pub fn new(layout: LayoutConfig, style: StyleConfig, sync: SyncConfig) -> Self {
        Self {
            layout,
            style,
            sync,
        }
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    pub fn sync(&self) -> &SyncConfig {
        &self.sync
    }

    /// Overrides the configured layout engine.
    pub fn set_layout_engine(&mut self, engine: LayoutEngine) {
        self.layout.engine = engine;
    }

    /// Overrides text regeneration for diagram edits.
    pub fn set_regenerate_text(&mut self, enabled: bool) {
        self.sync.regenerate_text = enabled;
    }
}

/// Which layout strategy positions nodes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutEngine {
    /// Deterministic grid placement, always available.
    #[default]
    Grid,
    /// Layered placement delegated to a layout service, falling back to the
    /// grid positions when the service fails.
    Hierarchical,
}

impl std::str::FromStr for LayoutEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "grid" => Ok(Self::Grid),
            "hierarchical" => Ok(Self::Hierarchical),
            _ => Err(format!("unknown layout engine `{s}`")),
        }
    }
}

/// Layout configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    engine: LayoutEngine,
    grid: GridConfig,
    hierarchical: HierarchicalConfig,
}

impl LayoutConfig {
    pub fn new(engine: LayoutEngine, grid: GridConfig, hierarchical: HierarchicalConfig) -> Self {
        Self {
            engine,
            grid,
            hierarchical,
        }
    }

    pub fn engine(&self) -> LayoutEngine {
        self.engine
    }

    pub fn grid(&self) -> &GridConfig {
        &self.grid
    }

    pub fn hierarchical(&self) -> &HierarchicalConfig {
        &self.hierarchical
    }
}

/// Grid placement spacing.
///
/// Defaults: regular cell 200, group cell 300, origin offset 50; children
/// start 50 inside their parent on a 100 × 80 sub-grid.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    node_spacing: f32,
    group_spacing: f32,
    origin: f32,
    child_offset: f32,
    child_column_spacing: f32,
    child_row_spacing: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            node_spacing: 200.0,
            group_spacing: 300.0,
            origin: 50.0,
            child_offset: 50.0,
            child_column_spacing: 100.0,
            child_row_spacing: 80.0,
        }
    }
}

impl GridConfig {
    pub fn node_spacing(&self) -> f32 {
        self.node_spacing
    }

    pub fn group_spacing(&self) -> f32 {
        self.group_spacing
    }

    pub fn origin(&self) -> f32 {
        self.origin
    }

    pub fn child_offset(&self) -> f32 {
        self.child_offset
    }

    pub fn child_column_spacing(&self) -> f32 {
        self.child_column_spacing
    }

    pub fn child_row_spacing(&self) -> f32 {
        self.child_row_spacing
    }
}

/// Options handed to the layout service.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HierarchicalConfig {
    layer_spacing: f32,
    node_spacing: f32,
    default_node_width: f32,
    default_node_height: f32,
}

impl Default for HierarchicalConfig {
    fn default() -> Self {
        Self {
            layer_spacing: 100.0,
            node_spacing: 80.0,
            default_node_width: 150.0,
            default_node_height: 50.0,
        }
    }
}

impl HierarchicalConfig {
    /// Space between consecutive layers.
    pub fn layer_spacing(&self) -> f32 {
        self.layer_spacing
    }

    /// Space between nodes of one layer.
    pub fn node_spacing(&self) -> f32 {
        self.node_spacing
    }

    /// Size reported for nodes that were never measured.
    pub fn default_node_size(&self) -> Size {
        Size::new(self.default_node_width, self.default_node_height)
    }
}

/// Visual styling configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    background_color: Option<String>,
    edge_color: String,
    font_size: u16,
    font_family: Option<String>,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            background_color: None,
            edge_color: String::from("#555555"),
            font_size: 14,
            font_family: None,
        }
    }
}

impl StyleConfig {
    /// Returns the parsed background [`Color`], or `None` if no color is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn background_color(&self) -> Result<Option<Color>, String> {
        self.background_color
            .as_ref()
            .map(|color| Color::new(color))
            .transpose()
            .map_err(|err| format!("Invalid background color in config: {err}"))
    }

    /// Returns the stroke color of edges without an explicit color.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn edge_color(&self) -> Result<Color, String> {
        Color::new(&self.edge_color).map_err(|err| format!("Invalid edge color in config: {err}"))
    }

    /// Label font size in points.
    pub fn font_size(&self) -> u16 {
        self.font_size
    }

    /// Font family overriding the per-node typeface, if configured.
    pub fn font_family(&self) -> Option<&str> {
        self.font_family.as_deref()
    }
}

/// Sync controller behavior.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    regenerate_text: bool,
}

impl SyncConfig {
    /// Whether diagram edits append matching statements to the text.
    pub fn regenerate_text(&self) -> bool {
        self.regenerate_text
    }
}
