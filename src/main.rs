//! CLI entry point for the bibkeys tool.

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use bibkeys_core::keywords::DEFAULT_SIMILARITY_THRESHOLD;
use bibkeys_core::render::{bar_chart, write_svg};
use bibkeys_core::{
    EventOutcome, KeywordMap, LinkOpener, LogOnly, PointerEvent, RenderConfig, SelectorSession,
    SystemBrowser, WordCloud, load_bibliography, suggest_aliases,
};

mod cli;
mod config;

use cli::Args;

fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // stdout carries the report and listings; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let aliases = config::load_aliases(args.aliases.as_deref())?;
    debug!(source = %aliases.source, canonicals = aliases.table.len(), "Alias table ready");

    let mut stdout = io::stdout().lock();
    if args.dump_aliases {
        let json = aliases
            .table
            .to_json_pretty()
            .context("failed to serialize alias table")?;
        writeln!(stdout, "{json}")?;
    }

    let records = load_bibliography(&args.bib_file)
        .with_context(|| format!("failed to load bibliography {}", args.bib_file.display()))?;

    let keyword_map = KeywordMap::build(&records, &aliases.table);
    let series = keyword_map.frequency_series();
    series.write_report(&mut stdout, records.len())?;

    if args.suggest_aliases {
        let suggestions =
            suggest_aliases(&keyword_map, &aliases.table, DEFAULT_SIMILARITY_THRESHOLD);
        writeln!(stdout)?;
        if suggestions.is_empty() {
            writeln!(stdout, "No alias suggestions")?;
        } else {
            writeln!(stdout, "Alias suggestions")?;
            for suggestion in &suggestions {
                writeln!(
                    stdout,
                    "  {} -> {} ({:.3})",
                    suggestion.alias, suggestion.canonical, suggestion.similarity
                )?;
            }
        }
    }
    stdout.flush()?;
    drop(stdout);

    let render_config = RenderConfig {
        width_in: args.width,
        height_in: args.height,
        dpi: args.dpi,
        background: args.background,
        palette: args.palette,
        max_words: args.max_words,
    };

    if let Some(path) = &args.bar_chart {
        write_svg(path, &bar_chart::render_svg(&series, &render_config))
            .context("failed to write bar chart")?;
    }

    let mode = args.interactive.mode();
    if mode.is_none() && args.cloud.is_none() && args.cloud_png.is_none() {
        return Ok(());
    }

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let cloud = WordCloud::generate(&series, &render_config, &mut rng);
    if let Some(path) = &args.cloud {
        write_svg(path, &cloud.to_svg()).context("failed to write word layout")?;
    }
    if let Some(path) = &args.cloud_png {
        cloud
            .save_png(path)
            .context("failed to write word layout PNG")?;
    }

    let Some(mode) = mode else {
        return Ok(());
    };
    let opener: Box<dyn LinkOpener> = if args.no_browser {
        Box::new(LogOnly)
    } else {
        Box::new(SystemBrowser)
    };
    let session = SelectorSession::new(&records, keyword_map, mode, rng, opener);
    run_click_loop(session, &cloud)
}

/// Feeds stdin lines to the session until `q`, `quit` or end of input.
fn run_click_loop<O: LinkOpener>(
    mut session: SelectorSession<'_, StdRng, O>,
    surface: &WordCloud,
) -> Result<()> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        info!(
            mode = ?session.mode(),
            "Enter clicks as 'x y' pixel coordinates, 'q' to quit"
        );
    }

    let mut stdout = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read click from stdin")?;
        let event = match parse_event(&line) {
            Ok(Some(event)) => event,
            Ok(None) => continue,
            Err(reason) => {
                warn!(input = %line, reason, "Ignoring input");
                continue;
            }
        };
        let outcome = session.handle_event(event, surface);
        write!(stdout, "{outcome}")?;
        stdout.flush()?;
        if outcome == EventOutcome::Closed {
            break;
        }
    }
    session.handle_event(PointerEvent::Close, surface);

    let remaining = session.keyword_map().total_mentions();
    debug!(remaining, "Browsing session ended");
    Ok(())
}

/// Parses one stdin line: `x y` is a click, `q`/`quit` closes, blank is skipped.
fn parse_event(line: &str) -> Result<Option<PointerEvent>, &'static str> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    if line.eq_ignore_ascii_case("q") || line.eq_ignore_ascii_case("quit") {
        return Ok(Some(PointerEvent::Close));
    }

    let mut parts = line.split(|c: char| c.is_whitespace() || c == ',').filter(|p| !p.is_empty());
    let (Some(x), Some(y), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err("expected 'x y' or 'q'");
    };
    let x: f64 = x.parse().map_err(|_| "x is not a number")?;
    let y: f64 = y.parse().map_err(|_| "y is not a number")?;
    Ok(Some(PointerEvent::Click { x, y }))
}
