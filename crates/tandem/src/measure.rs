//! Node size measurement.
//!
//! Labels are shaped with cosmic-text to find their rendered width; node
//! boxes are the padded label size, never smaller than [`MIN_NODE_SIZE`].
//! Groups have a fixed size.

use std::sync::{Mutex, OnceLock};

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping};
use log::info;

use tandem_core::{geometry::Size, model::Typeface};

use crate::config::StyleConfig;

/// Smallest box a regular node is drawn with.
pub const MIN_NODE_SIZE: Size = Size::new(150.0, 50.0);

/// Box size of group nodes.
pub const GROUP_SIZE: Size = Size::new(300.0, 200.0);

const LABEL_PADDING_X: f32 = 32.0;
const LABEL_PADDING_Y: f32 = 24.0;

/// Extra height reserved for an icon caption line.
const ICON_LINE: f32 = 18.0;

/// Measures label text with a shared FontSystem.
struct TextManager {
    font_system: Mutex<FontSystem>,
}

impl TextManager {
    fn new() -> Self {
        info!("Initializing FontSystem");
        Self {
            font_system: Mutex::new(FontSystem::new()),
        }
    }

    fn calculate_text_size(&self, text: &str, font_size: u16, family: Family<'_>) -> Size {
        if text.is_empty() {
            return Size::default();
        }

        let font_size_px = f32::from(font_size) * 1.33;
        let metrics = Metrics::new(font_size_px, font_size_px * 1.15);

        let Ok(mut font_system) = self.font_system.lock() else {
            return estimate(text, font_size_px, metrics.line_height);
        };

        let mut buffer = Buffer::new(&mut font_system, metrics);
        let mut buffer = buffer.borrow_with(&mut font_system);
        let attrs = Attrs::new().family(family);
        buffer.set_size(None, None);
        buffer.set_text(text, &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(true);

        let mut max_width: f32 = 0.0;
        let mut total_height: f32 = 0.0;
        for run in buffer.layout_runs() {
            if let Some(last) = run.glyphs.last() {
                max_width = max_width.max(last.x + last.w);
            }
            total_height += metrics.line_height;
        }

        // No usable fonts on this system.
        if max_width == 0.0 || total_height == 0.0 {
            return estimate(text, font_size_px, metrics.line_height);
        }
        Size::new(max_width, total_height)
    }
}

fn estimate(text: &str, font_size_px: f32, line_height: f32) -> Size {
    let longest = text.lines().map(|line| line.chars().count()).max().unwrap_or(0);
    let lines = text.lines().count().max(1);
    Size::new(
        longest as f32 * font_size_px * 0.55,
        lines as f32 * line_height,
    )
}

static TEXT_MANAGER: OnceLock<TextManager> = OnceLock::new();

fn family_for(typeface: Typeface) -> Family<'static> {
    match typeface {
        Typeface::Rough => Family::Cursive,
        Typeface::Clean => Family::SansSerif,
        Typeface::Mono => Family::Monospace,
    }
}

/// Measures a label with the configured font.
pub fn measure_label(text: &str, typeface: Typeface, style: &StyleConfig) -> Size {
    let family = match style.font_family() {
        Some(name) => Family::Name(name),
        None => family_for(typeface),
    };
    TEXT_MANAGER
        .get_or_init(TextManager::new)
        .calculate_text_size(text, style.font_size(), family)
}

/// Returns the box size of a node.
pub fn node_size(
    label: &str,
    has_icon: bool,
    is_group: bool,
    typeface: Typeface,
    style: &StyleConfig,
) -> Size {
    if is_group {
        return GROUP_SIZE;
    }
    let text = measure_label(label, typeface, style);
    let icon = if has_icon { ICON_LINE } else { 0.0 };
    Size::new(
        text.width() + LABEL_PADDING_X,
        text.height() + LABEL_PADDING_Y + icon,
    )
    .max(MIN_NODE_SIZE)
}
