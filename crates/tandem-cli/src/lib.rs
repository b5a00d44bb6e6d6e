//! Tandem CLI library
//!
//! This module contains the core CLI logic for the Tandem diagram tool.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{
    fs,
    io::{self, Write},
};

use log::info;

use tandem::{DiagramBuilder, TandemError, model::Document};

/// Run the Tandem CLI application
///
/// This function processes the input file through the Tandem pipeline
/// and writes the resulting SVG to the output file.
///
/// # Errors
///
/// Returns `TandemError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Parsing errors
/// - Layout errors
/// - Rendering errors
pub fn run(args: &Args) -> Result<(), TandemError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing diagram"
    );

    let mut app_config = config::load_config(args.config.as_ref())?;
    if let Some(engine) = args.engine {
        app_config.set_layout_engine(engine);
    }

    let source = fs::read_to_string(&args.input)?;

    let builder = DiagramBuilder::new(app_config);
    let document = builder.parse(&source)?;
    if args.print_source_map {
        write_source_map(&document, &mut io::stdout().lock())?;
    }

    let graph = builder.layout(&document)?;
    let svg = builder.render_svg(&graph)?;

    fs::write(&args.output, svg)?;

    info!(output_file = args.output; "SVG exported successfully");

    Ok(())
}

/// Writes one `line<TAB>kind<TAB>id` row per mapped line, 1-based.
pub fn write_source_map(document: &Document, out: &mut impl Write) -> io::Result<()> {
    for (line, entity) in document.source_map().entries() {
        writeln!(out, "{}\t{}\t{}", line + 1, entity.kind(), entity.id())?;
    }
    Ok(())
}
