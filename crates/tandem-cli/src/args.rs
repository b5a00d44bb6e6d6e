//! Command-line argument definitions for the Tandem CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, configuration file
//! selection, the layout engine, source map output and logging verbosity.

use clap::Parser;

use tandem::config::LayoutEngine;

/// Command-line arguments for the Tandem diagram tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input Tandem file
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Path to the output SVG file
    #[arg(short, long, default_value = "out.svg")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Layout engine overriding the configuration (grid, hierarchical)
    #[arg(long)]
    pub engine: Option<LayoutEngine>,

    /// Print the line-to-entity source map to stdout
    #[arg(long)]
    pub print_source_map: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
