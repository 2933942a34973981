// code-ideation-core/src/lib.rs

// declare modules
pub mod config;
pub mod excerpt;
pub mod feedback;
pub mod ignore;
pub mod render;
pub mod source;
pub mod utils;

// re-export key structs/functions for external use by other crates
pub use anyhow::{Context, Result}; // re-export for convenience
pub use clap::Parser; // re-export Parser for CLI crate
pub use console::style; // re-export for the CLI's error output

pub use crate::config::Config;
pub use crate::feedback::{parse_feedback, ReportBuffer, Segment, SegmentBody};
pub use crate::ignore::{compile_pattern, compile_patterns, is_ignored, Matcher, PatternCache};
pub use crate::source::{load_source_tree, AnalysisSource, SourceFile};

use clap::{Args, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

use crate::feedback::{kind_counts, Utf8Chunker};
use crate::render::{render_segments, RenderOptions};
use crate::source::{decode_file_content, LoadReport};
use crate::utils::{display_path, plural};

// argument parsing struct - shared with the CLI crate
#[derive(Parser, Debug, Clone)]
#[command(name = "code-ideation")]
#[command(version, about = "filter source trees and render streamed ai ideation reports", long_about = None)]
pub struct CoreCliArgs {
    /// show debug logging and per-file details
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// list which files under a path would be sent for analysis
    Filter(FilterArgs),
    /// render an ideation report streamed from a file or stdin
    Render(RenderArgs),
}

#[derive(Args, Debug, Clone)]
pub struct IgnoreArgs {
    /// extra ignore pattern, e.g. `target/` or `*.lock` (repeatable)
    #[arg(short, long = "ignore", value_name = "PATTERN")]
    pub ignore: Vec<String>,

    /// file with one ignore pattern per line
    #[arg(long, value_name = "FILE")]
    pub ignore_file: Option<PathBuf>,

    /// start from an empty pattern list instead of the configured defaults
    #[arg(long)]
    pub no_defaults: bool,
}

#[derive(Args, Debug, Clone)]
pub struct FilterArgs {
    /// file or folder to load
    pub path: PathBuf,

    #[command(flatten)]
    pub ignore: IgnoreArgs,
}

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// report file to read (defaults to stdin)
    #[arg(short, long)]
    pub report: Option<PathBuf>,

    /// code the report was generated from, used for suggestion excerpts
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    #[command(flatten)]
    pub ignore: IgnoreArgs,

    /// print the parsed segments as json instead of rendering them
    #[arg(long)]
    pub json: bool,

    /// lines of context around suggestion excerpts
    #[arg(short, long)]
    pub context: Option<usize>,
}

/// run the selected subcommand
pub async fn execute_ideation_flow(args: CoreCliArgs) -> Result<()> {
    let config = Config::load()?;
    if !config.render.color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    match args.command {
        Command::Filter(filter) => run_filter(&filter, &config, args.verbose),
        Command::Render(render) => run_render(&render, &config, args.verbose).await,
    }
}

/// collect pattern lines from config defaults, a pattern file and flags
pub fn pattern_lines(config: &Config, args: &IgnoreArgs) -> Result<Vec<String>> {
    let mut lines = if args.no_defaults {
        Vec::new()
    } else {
        config.ignore.patterns.clone()
    };

    if let Some(path) = &args.ignore_file {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read ignore file {}", path.display()))?;
        lines.extend(text.lines().map(str::to_string));
    }

    lines.extend(args.ignore.iter().cloned());
    Ok(lines)
}

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

fn load_with_spinner(path: &Path, config: &Config, matchers: &[Matcher]) -> Result<LoadReport> {
    let spinner = spinner("📂 loading files...");
    let report = load_source_tree(path, config.source.max_file_size_bytes(), matchers);
    spinner.finish_and_clear();
    report
}

fn run_filter(args: &FilterArgs, config: &Config, verbose: bool) -> Result<()> {
    let lines = pattern_lines(config, &args.ignore)?;
    let mut cache = PatternCache::new();
    let matchers = cache.compile_patterns(&lines);

    if verbose {
        println!("{}", style("ignore patterns:").cyan().bold());
        for matcher in &matchers {
            println!("  - {}", matcher.source());
        }
        println!();
    }

    let report = load_with_spinner(&args.path, config, &matchers)?;

    let mut listing: Vec<(&str, bool)> = report
        .files
        .iter()
        .map(|f| (f.path.as_str(), false))
        .chain(report.ignored.iter().map(|p| (p.as_str(), true)))
        .collect();
    listing.sort();

    for (path, ignored) in listing {
        let shown = if verbose { path.to_string() } else { display_path(path) };
        if ignored {
            println!("  {} {}", style(shown).dim().strikethrough(), style("(ignored)").dim());
        } else {
            println!("  {}", style(shown).green());
        }
    }

    for error in &report.errors {
        eprintln!("{} {}", style("⚠️ ").yellow(), style(error).yellow());
    }

    println!(
        "\n{}",
        style(format!(
            "loaded {}. filtered to {} for analysis.",
            plural(report.total(), "file"),
            report.files.len()
        ))
        .cyan()
    );

    if report.total() == 0 {
        println!("{}", style("no files found to analyse").yellow().bold());
    } else if report.files.is_empty() {
        println!(
            "{}",
            style("all loaded files were filtered out by the ignore patterns. adjust the patterns or load different files.")
                .yellow()
                .bold()
        );
    }

    Ok(())
}

async fn run_render(args: &RenderArgs, config: &Config, verbose: bool) -> Result<()> {
    let source = match &args.source {
        Some(path) => Some(load_analysis_source(path, args, config)?),
        None => None,
    };

    let reader: Box<dyn AsyncRead + Unpin> = match &args.report {
        Some(path) => Box::new(
            tokio::fs::File::open(path)
                .await
                .with_context(|| format!("failed to open report {}", path.display()))?,
        ),
        None => Box::new(tokio::io::stdin()),
    };

    let buffer = stream_report(reader).await?;
    if buffer.is_empty() {
        return Err(anyhow::anyhow!("no report text received"));
    }

    if verbose {
        println!(
            "received {} in {}, parsed into {}",
            plural(buffer.text().len(), "byte"),
            plural(buffer.updates(), "chunk"),
            plural(buffer.segments().len(), "segment")
        );
        for (kind, count) in kind_counts(buffer.segments()) {
            println!("  {} {}", style(format!("{count:>4}")).dim(), kind);
        }
    }

    if args.json {
        let json = serde_json::to_string_pretty(buffer.segments())
            .context("failed to serialise report segments")?;
        println!("{json}");
        return Ok(());
    }

    let options = RenderOptions {
        source: source.as_ref(),
        context_lines: args.context.unwrap_or(config.render.context_lines),
    };
    println!("{}", style("✨ ai insights & ideation report").cyan().bold());
    println!("{}", render_segments(buffer.segments(), &options));
    Ok(())
}

/// a folder becomes a file set, a single file is treated like pasted code
fn load_analysis_source(
    path: &Path,
    args: &RenderArgs,
    config: &Config,
) -> Result<AnalysisSource> {
    if path.is_file() {
        let bytes = fs::read(path)
            .with_context(|| format!("failed to read source file {}", path.display()))?;
        return Ok(AnalysisSource::Snippet(decode_file_content(&bytes)));
    }

    let lines = pattern_lines(config, &args.ignore)?;
    let matchers = PatternCache::new().compile_patterns(&lines);
    let report = load_with_spinner(path, config, &matchers)?;
    for error in &report.errors {
        eprintln!("{} {}", style("⚠️ ").yellow(), style(error).yellow());
    }
    debug!(
        "loaded {} for excerpts ({} ignored)",
        plural(report.files.len(), "file"),
        report.ignored.len()
    );
    Ok(AnalysisSource::Files(report.files))
}

/// read the report chunk by chunk, re-parsing after each one
pub async fn stream_report<R: AsyncRead + Unpin>(mut reader: R) -> Result<ReportBuffer> {
    let spinner = spinner("🧙 waiting for report...");
    let mut buffer = ReportBuffer::new();
    let mut chunker = Utf8Chunker::new();
    let mut chunk = vec![0u8; 4096];

    loop {
        let read = reader
            .read(&mut chunk)
            .await
            .context("failed to read report stream")?;
        if read == 0 {
            break;
        }

        let text = chunker.feed(&chunk[..read]);
        if !text.is_empty() {
            let segments = buffer.push_str(&text);
            spinner.set_message(format!(
                "🧙 receiving report... {}",
                plural(segments.len(), "segment")
            ));
        }
    }

    let tail = chunker.finish();
    if !tail.is_empty() {
        buffer.push_str(&tail);
    }

    spinner.finish_and_clear();
    Ok(buffer)
}
