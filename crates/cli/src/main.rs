//! markscan CLI
//!
//! Scans source trees for comment marks (TODO, FIXME, SECTION, MARK, ...)
//! and prints outlines, summaries, and navigation targets.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use markscan_core::{
    find_neighbor, format_document, format_output, ContentType, Direction, DocumentMarks,
    MarkConfig, MarkEntity, MarkScanner, OutputFormat,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI for comment-mark scanning and navigation
#[derive(Parser)]
#[command(name = "markscan")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Comment-mark scanning - TODO/FIXME/SECTION outlines for source code")]
#[command(long_about = r#"
markscan: Comment-Mark Scanning and Navigation

Extracts typed comment marks (TODO, FIXME, NOTE, INFO, SECTION, MARK, BUG,
HACK, or your own tags) from source code, line by line. SECTION and MARK
group subsequent function/method definitions as children in JS/TS files.

Recognition modes:
  - Tag mode (default): a flat list of tag names after //, # or /*
  - Pattern mode: per-category regex lists with (?P<heading>),
    (?P<description>) and (?P<writer>) named captures

Output formats:
  - JSON (default) - Structured JSON for programmatic use
  - YAML - Human-readable YAML format
  - ANSI - Colorful terminal output
  - Summary - Plain-text counts (sections / todos / notes)

Examples:
  markscan .                              # Scan current directory
  markscan --format ansi                  # Colorful terminal output
  markscan --tag TODO --tag XXX           # Custom tag list
  markscan file src/app.ts                # Single file, with hierarchy
  markscan jump src/app.ts --line 15      # Next mark after line 15
"#)]
pub struct Args {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to scan (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormatArg::Json)]
    pub format: OutputFormatArg,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Config file (JSON) with the full option set
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Tag names to recognize (can be specified multiple times)
    #[arg(long, action = clap::ArgAction::Append)]
    pub tag: Vec<String>,

    /// Section patterns (pattern mode, can be specified multiple times)
    #[arg(long, action = clap::ArgAction::Append)]
    pub section_pattern: Vec<String>,

    /// Todo patterns (pattern mode, can be specified multiple times)
    #[arg(long, action = clap::ArgAction::Append)]
    pub todo_pattern: Vec<String>,

    /// Note patterns (pattern mode, can be specified multiple times)
    #[arg(long, action = clap::ArgAction::Append)]
    pub note_pattern: Vec<String>,

    /// Include globs for workspace scans (can be specified multiple times)
    #[arg(long, action = clap::ArgAction::Append)]
    pub include: Vec<String>,

    /// Exclude globs for workspace scans (can be specified multiple times)
    #[arg(long, action = clap::ArgAction::Append)]
    pub exclude: Vec<String>,

    /// Maximum number of files per workspace scan
    #[arg(long)]
    pub limit: Option<usize>,

    /// Disable method-signature children in JS/TS files
    #[arg(long)]
    pub no_methods: bool,

    /// Number of threads for parallel processing (default: auto)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Scan a directory for marks
    Scan {
        /// Path to scan
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Scan a single file, with hierarchy and method children
    File {
        /// Path to file
        path: PathBuf,
    },

    /// Find the neighboring mark relative to a cursor line
    Jump {
        /// Path to file
        path: PathBuf,

        /// Cursor line number (1-indexed)
        #[arg(short, long)]
        line: usize,

        /// Navigation direction
        #[arg(short, long, value_enum, default_value_t = DirectionArg::Next)]
        direction: DirectionArg,
    },
}

/// Output format argument
#[derive(ValueEnum, Clone, Debug)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Ansi,
    Summary,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Yaml => OutputFormat::Yaml,
            OutputFormatArg::Ansi => OutputFormat::Ansi,
            OutputFormatArg::Summary => OutputFormat::Summary,
        }
    }
}

/// Navigation direction argument
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum DirectionArg {
    Next,
    Previous,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Next => Direction::Next,
            DirectionArg::Previous => Direction::Previous,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    match &args.command {
        Some(Commands::Scan { path }) => run_scan(path, &args),
        Some(Commands::File { path }) => run_file(path, &args),
        Some(Commands::Jump {
            path,
            line,
            direction,
        }) => run_jump(path, *line, *direction, &args),
        None => run_scan(&args.path, &args),
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "markscan=debug,markscan_core=debug"
    } else {
        "markscan=warn,markscan_core=warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Build the scanner configuration from args (and an optional config file)
fn build_config(path: &Path, args: &Args) -> Result<MarkConfig> {
    let mut config = match &args.config {
        Some(config_path) => {
            let text = fs::read_to_string(config_path).with_context(|| {
                format!("Failed to read config file: {}", config_path.display())
            })?;
            serde_json::from_str::<MarkConfig>(&text).with_context(|| {
                format!("Failed to parse config file: {}", config_path.display())
            })?
        }
        None => MarkConfig::default(),
    };

    config.root = path.to_path_buf();

    if !args.tag.is_empty() {
        config = config.with_tags(args.tag.clone());
    }
    if !args.section_pattern.is_empty() {
        config = config.with_section_patterns(args.section_pattern.clone());
    }
    if !args.todo_pattern.is_empty() {
        config = config.with_todo_patterns(args.todo_pattern.clone());
    }
    if !args.note_pattern.is_empty() {
        config = config.with_note_patterns(args.note_pattern.clone());
    }
    if !args.include.is_empty() {
        config = config.with_include_patterns(args.include.clone());
    }
    if !args.exclude.is_empty() {
        config = config.with_exclude_patterns(args.exclude.clone());
    }
    if args.limit.is_some() {
        config = config.with_limit(args.limit);
    }
    if args.no_methods {
        config = config.with_scan_methods(false);
    }
    if let Some(threads) = args.threads {
        config = config.with_threads(threads);
    }

    Ok(config)
}

fn run_scan(path: &Path, args: &Args) -> Result<()> {
    let config = build_config(path, args)?;

    // Show progress spinner
    let spinner = if args.verbose && atty::is(atty::Stream::Stderr) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Scanning for marks...");
        Some(pb)
    } else {
        None
    };

    let scanner = MarkScanner::new(config).context("Failed to create scanner")?;
    let result = scanner.scan().context("Failed to scan directory")?;

    if let Some(ref pb) = spinner {
        pb.finish_with_message(format!(
            "Scanned {} files in {}ms",
            result.stats.total_files, result.metadata.scan_duration_ms
        ));
    }

    let format: OutputFormat = args.format.clone().into();
    let output = format_output(&result, format)?;

    write_output(&output, args.output.as_ref())
}

fn run_file(path: &Path, args: &Args) -> Result<()> {
    let config = build_config(path, args)?;
    let scanner = MarkScanner::new(config).context("Failed to create scanner")?;

    let document = scan_single_file(&scanner, path)?;

    let format: OutputFormat = args.format.clone().into();
    let output = format_document(&document, format)?;

    write_output(&output, args.output.as_ref())
}

fn run_jump(path: &Path, line: usize, direction: DirectionArg, args: &Args) -> Result<()> {
    let config = build_config(path, args)?;
    let scanner = MarkScanner::new(config).context("Failed to create scanner")?;

    let document = scan_single_file(&scanner, path)?;
    let flat = document.flatten();

    // Cursor is 1-indexed on the command line, marks are 0-indexed
    let cursor = line.saturating_sub(1);
    let target = find_neighbor(&flat, cursor, direction.into());

    let output = match target {
        Some(mark) => format_jump_target(mark, &args.format),
        None => {
            println!("{}", "No marks found".dimmed());
            return Ok(());
        }
    }?;

    write_output(&output, args.output.as_ref())
}

/// Read a file (host-side I/O) and scan its content with hierarchy
fn scan_single_file(scanner: &MarkScanner, path: &Path) -> Result<DocumentMarks> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    let marks = scanner.scan_document(path, &text);

    Ok(DocumentMarks {
        path: path.to_path_buf(),
        absolute_path: path.canonicalize().unwrap_or_else(|_| path.to_path_buf()),
        content_type: ContentType::from_path(path),
        total_lines: text.lines().count(),
        marks,
    })
}

fn format_jump_target(mark: &MarkEntity, format: &OutputFormatArg) -> Result<String> {
    let output = match format {
        OutputFormatArg::Json => serde_json::to_string_pretty(mark)?,
        OutputFormatArg::Yaml => serde_yaml::to_string(mark)?,
        OutputFormatArg::Ansi => {
            let mut line = format!(
                "{} {} {}",
                mark.kind.as_tag().bold().blue(),
                mark.label.bold(),
                format!("({})", mark.description).dimmed()
            );
            if let Some(ref writer) = mark.writer {
                line.push_str(&format!(" {}", format!("by {writer}").yellow()));
            }
            line
        }
        OutputFormatArg::Summary => {
            format!("{}: {} ({})", mark.kind.as_tag(), mark.label, mark.description)
        }
    };
    Ok(output)
}

fn write_output(output: &str, path: Option<&PathBuf>) -> Result<()> {
    if let Some(path) = path {
        fs::write(path, output).context("Failed to write output file")?;
    } else {
        println!("{}", output);
    }
    Ok(())
}
