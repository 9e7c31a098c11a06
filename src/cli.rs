//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use bibkeys_core::render::{DEFAULT_DPI, DEFAULT_HEIGHT_IN, DEFAULT_MAX_WORDS, DEFAULT_WIDTH_IN};
use bibkeys_core::{Color, Palette, SelectionMode};

/// Consolidate bibliography keywords and browse records by keyword.
///
/// Reads a BibTeX file, merges synonymous keywords through an alias table,
/// prints a frequency report and optionally renders a bar chart and a word
/// layout that can be clicked to open matching records.
#[derive(Parser, Debug)]
#[command(name = "bibkeys")]
#[command(author, version, about)]
pub struct Args {
    /// BibTeX bibliography to analyse
    #[arg(value_name = "BIB_FILE")]
    pub bib_file: PathBuf,

    /// JSON alias table ({"canonical": ["alias", ...]})
    #[arg(short, long, value_name = "FILE")]
    pub aliases: Option<PathBuf>,

    /// Browsing mode after rendering: none, open (keep records) or pop (remove opened records)
    #[arg(short, long, value_enum, default_value_t = InteractiveArg::Pop)]
    pub interactive: InteractiveArg,

    /// Seed for record selection and word placement
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log featured links instead of launching a browser
    #[arg(long)]
    pub no_browser: bool,

    /// Write the keyword frequency bar chart as SVG
    #[arg(long, value_name = "SVG")]
    pub bar_chart: Option<PathBuf>,

    /// Write the word layout as SVG
    #[arg(long, value_name = "SVG")]
    pub cloud: Option<PathBuf>,

    /// Write the word layout hit-test raster as PNG
    #[arg(long, value_name = "PNG")]
    pub cloud_png: Option<PathBuf>,

    /// Figure width in inches
    #[arg(long, default_value_t = DEFAULT_WIDTH_IN, value_parser = parse_inches)]
    pub width: f64,

    /// Figure height in inches
    #[arg(long, default_value_t = DEFAULT_HEIGHT_IN, value_parser = parse_inches)]
    pub height: f64,

    /// Pixels per inch (10-600)
    #[arg(long, default_value_t = DEFAULT_DPI, value_parser = clap::value_parser!(u32).range(10..=600))]
    pub dpi: u32,

    /// Background colour (name or #rrggbb)
    #[arg(long, default_value = "white")]
    pub background: Color,

    /// Colour map for words (viridis, plasma, inferno, magma, cividis)
    #[arg(long, default_value = "viridis")]
    pub palette: Palette,

    /// Maximum number of words in the layout
    #[arg(long, default_value_t = DEFAULT_MAX_WORDS, value_parser = parse_max_words)]
    pub max_words: usize,

    /// Print near-duplicate keywords that could be added as aliases
    #[arg(long)]
    pub suggest_aliases: bool,

    /// Print the active alias table as JSON
    #[arg(long)]
    pub dump_aliases: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

/// `--interactive` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InteractiveArg {
    None,
    Open,
    Pop,
}

impl InteractiveArg {
    pub fn mode(self) -> Option<SelectionMode> {
        match self {
            Self::None => None,
            Self::Open => Some(SelectionMode::Open),
            Self::Pop => Some(SelectionMode::Pop),
        }
    }
}

fn parse_inches(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("'{raw}' is not a number"))?;
    if value.is_finite() && (0.5..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not in 0.5..=100 inches"))
    }
}

fn parse_max_words(raw: &str) -> Result<usize, String> {
    let value: usize = raw
        .parse()
        .map_err(|_| format!("'{raw}' is not a whole number"))?;
    if value == 0 {
        Err("must be at least 1".to_string())
    } else {
        Ok(value)
    }
}
