//! LUMIRA CLI
//!
//! Usage:
//!   lumira --all analyze --text "your text here"    # Single sample
//!   lumira --all analyze --input samples.jsonl      # One sample per line
//!   lumira trend --days 7                           # Downhill trend check
//!   lumira stats                                    # Store statistics
//!   lumira report --days 7 --outdir reports         # Markdown / JSON report
//!   lumira status                                   # Active layers

use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use lumira::config::{FeatureFlags, LumiraConfig, ENV_LOG_LEVEL};
use lumira::core::{render_json, render_markdown, summarize, summarize_records, LumiraEngine, SignalStore, TrendAnalyzer};
use lumira::types::{AnalysisReport, Severity, TextSample, TrendWindow};
use lumira::{ADVISORY_NOTICE, DEFAULT_WINDOW_DAYS, VERSION};

#[derive(Parser, Debug)]
#[command(
    name = "lumira",
    version = VERSION,
    about = "LUMIRA - offline emotion, incongruence and safety-signal analysis",
    long_about = "LUMIRA scores emotions, flags incongruent phrasing and risk language,\n\
                  stores reduced signals per sample and reports trends over time.\n\n\
                  Layers are switched by LUMIRA_SEMANTICS_ENABLED, LUMIRA_SAFETY_ENABLED\n\
                  and LUMIRA_SIGNALS_ENABLED, or all at once with --all.\n\n\
                  LUMIRA is not a medical device. Output is a non-diagnostic heuristic."
)]
struct Args {
    /// Signal store path (overrides LUMIRA_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Enable every layer regardless of environment
    #[arg(long, global = true)]
    all: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze text from --text, --input or stdin
    Analyze {
        /// Text to analyze
        #[arg(short, long)]
        text: Option<String>,

        /// File with one sample per line (JSON object or plain text)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Source tag for samples without one
        #[arg(long, default_value = "cli")]
        source: String,

        /// Output as JSON lines
        #[arg(long)]
        json: bool,

        /// Show excerpts and integrity details
        #[arg(long)]
        verbose: bool,
    },

    /// Check the downhill trend over a window
    Trend {
        #[arg(short, long, default_value_t = DEFAULT_WINDOW_DAYS)]
        days: u32,

        #[arg(long)]
        json: bool,
    },

    /// Signal store statistics
    Stats {
        #[arg(long)]
        json: bool,
    },

    /// Write a window report
    Report {
        #[arg(short, long, default_value_t = DEFAULT_WINDOW_DAYS)]
        days: u32,

        /// Output directory
        #[arg(long, default_value = "reports")]
        outdir: PathBuf,

        #[arg(long, value_enum, default_value_t = ReportFormat::Both)]
        format: ReportFormat,
    },

    /// Show which layers are active
    Status,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Md,
    Json,
    Both,
}

/// One line of an --input file
#[derive(Debug, Deserialize)]
struct InputSample {
    id: Option<String>,
    timestamp: Option<DateTime<Utc>>,
    source: Option<String>,
    text: String,
    #[serde(default)]
    meta: std::collections::BTreeMap<String, serde_json::Value>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing();

    if args.no_color {
        colored::control::set_override(false);
    }

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            return ExitCode::from(2);
        }
    };

    let result = match &args.command {
        Command::Analyze { text, input, source, json, verbose } => {
            run_analyze(config, text.as_deref(), input.as_deref(), source, *json, *verbose)
        }
        Command::Trend { days, json } => run_trend(&config, *days, *json),
        Command::Stats { json } => run_stats(&config, *json),
        Command::Report { days, outdir, format } => run_report(&config, *days, outdir, *format),
        Command::Status => run_status(config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(std::env::var(ENV_LOG_LEVEL).unwrap_or_else(|_| "warn".to_string())))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_config(args: &Args) -> Result<LumiraConfig, Box<dyn std::error::Error>> {
    let mut config = LumiraConfig::from_env()?;
    if args.all {
        config = config.with_flags(FeatureFlags::all());
    }
    if let Some(db) = &args.db {
        config = config.with_store_path(db);
    }
    Ok(config)
}

/// Run analysis over --text, --input or stdin lines
fn run_analyze(
    config: LumiraConfig,
    text: Option<&str>,
    input: Option<&Path>,
    source: &str,
    json: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let samples = match (text, input) {
        (Some(text), _) => vec![TextSample::new("sample-001", source, text)],
        (None, Some(path)) => {
            let file = fs::File::open(path)
                .map_err(|e| format!("cannot open {}: {}", path.display(), e))?;
            read_samples(BufReader::new(file), source)?
        }
        (None, None) => read_samples(io::stdin().lock(), source)?,
    };

    let engine = LumiraEngine::new(config);
    let status = engine.module_status();
    if !status.semantics_enabled && !status.safety_enabled && !json {
        eprintln!("{}", "No analysis layers enabled; pass --all or set LUMIRA_*_ENABLED.".yellow());
    }

    for sample in &samples {
        let report = engine.process_sample(sample);
        if json {
            println!("{}", serde_json::to_string(&report)?);
        } else if verbose {
            print_verbose(&report);
        } else {
            print_report_line(&report);
        }
    }

    Ok(())
}

fn read_samples(reader: impl BufRead, source: &str) -> Result<Vec<TextSample>, Box<dyn std::error::Error>> {
    let mut samples = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let default_id = format!("sample-{:03}", i + 1);
        let sample = match serde_json::from_str::<InputSample>(trimmed) {
            Ok(parsed) => {
                let mut sample = TextSample::new(
                    parsed.id.unwrap_or(default_id),
                    parsed.source.unwrap_or_else(|| source.to_string()),
                    parsed.text,
                );
                if let Some(ts) = parsed.timestamp {
                    sample = sample.with_timestamp(ts);
                }
                for (key, value) in parsed.meta {
                    sample = sample.with_meta(key, value);
                }
                sample
            }
            Err(_) => TextSample::new(default_id, source, trimmed),
        };
        samples.push(sample);
    }

    Ok(samples)
}

fn print_report_line(report: &AnalysisReport) {
    let line = report.to_parseable_string();
    match report.risks.iter().map(|r| r.severity).max() {
        Some(s) if s.is_severe() => println!("{}", line.red()),
        Some(_) => println!("{}", line.yellow()),
        None => println!("{}", line),
    }
}

fn print_verbose(report: &AnalysisReport) {
    println!("{}", format!("── {} ──", report.sample_id).bold());

    if report.emotions.is_empty() {
        println!("  emotions: none");
    }
    for emotion in &report.emotions {
        println!("  {:<13} {:.3}", emotion.name.to_string(), emotion.score);
    }

    for signal in &report.integrity {
        println!(
            "  {} {} ({:.2}) \"{}\"",
            "integrity".cyan(),
            signal.kind,
            signal.confidence,
            signal.span.snippet
        );
    }

    for risk in &report.risks {
        let label = format!("{} [{}]", risk.kind, risk.severity);
        let label = if risk.severity.is_severe() { label.red().bold() } else { label.yellow() };
        println!("  {} {} \"{}\"", label, risk.matched_pattern.dimmed(), risk.excerpt);
    }

    if !report.risks.is_empty() {
        let summary = summarize(&report.risks);
        println!("  risks: {} total, highest {}", summary.total, summary.highest.unwrap_or(Severity::Low));
    }

    for diagnostic in &report.diagnostics {
        println!("  {} {}: {}", "diagnostic".magenta(), diagnostic.layer, diagnostic.message);
    }

    println!();
}

fn run_trend(config: &LumiraConfig, days: u32, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let analyzer = TrendAnalyzer::new(SignalStore::new(&config.store_path));

    match analyzer.analyze_window(days)? {
        Some(window) if json => println!("{}", serde_json::to_string_pretty(&window)?),
        Some(window) => print_trend(&window),
        None if json => println!("null"),
        None => println!("Not enough data for a {}-day trend (need records on at least two days).", days),
    }

    Ok(())
}

fn print_trend(window: &TrendWindow) {
    println!("{}", format!("Trend over {} days", window.window_days).bold());
    println!("  records: {} across {} days", window.record_count, window.distinct_days);
    println!(
        "  joy:     {:.3} -> {:.3} ({:+.3})",
        window.first_half.joy_average,
        window.second_half.joy_average,
        window.joy_delta()
    );
    println!(
        "  risk:    {:.3} -> {:.3} ({:+.3})",
        window.first_half.risk_rate,
        window.second_half.risk_rate,
        window.risk_delta()
    );

    let reason = window.reason.to_string();
    if window.downhill_alert {
        println!("  {}", reason.red().bold());
    } else {
        println!("  {}", reason.green());
    }
    println!("{}", ADVISORY_NOTICE.dimmed());
}

fn run_stats(config: &LumiraConfig, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let stats = SignalStore::new(&config.store_path).stats()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("{}", format!("Signal store {}", stats.path.display()).bold());
    println!("  records:           {}", stats.total_records);
    println!("  records with risk: {}", stats.records_with_risk);
    println!("  skipped lines:     {}", stats.skipped_lines);
    for (kind, n) in &stats.risks_by_kind {
        println!("  {:<18} {}", format!("{}:", kind), n);
    }
    if let (Some(from), Some(to)) = (stats.earliest, stats.latest) {
        println!("  span:              {} .. {}", from.format("%Y-%m-%d"), to.format("%Y-%m-%d"));
    }

    Ok(())
}

fn run_report(
    config: &LumiraConfig,
    days: u32,
    outdir: &Path,
    format: ReportFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let now = Utc::now();
    let records = SignalStore::new(&config.store_path).read_window_at(days, now)?;
    let summary = summarize_records(&records, days, now);

    fs::create_dir_all(outdir)?;
    let stem = format!("lumira_report_{}", now.format("%Y%m%d_%H%M%S"));

    if matches!(format, ReportFormat::Md | ReportFormat::Both) {
        let path = outdir.join(format!("{}.md", stem));
        fs::write(&path, render_markdown(&summary))?;
        println!("{} {}", "wrote".green(), path.display());
    }
    if matches!(format, ReportFormat::Json | ReportFormat::Both) {
        let path = outdir.join(format!("{}.json", stem));
        fs::write(&path, render_json(&summary)?)?;
        println!("{} {}", "wrote".green(), path.display());
    }

    if summary.downhill_alert {
        println!("{}", "Downhill trend detected in this window.".red().bold());
    }

    Ok(())
}

fn run_status(config: LumiraConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store_path = config.store_path.clone();
    let status = LumiraEngine::new(config).module_status();

    let mark = |on: bool| if on { "on".green() } else { "off".dimmed() };
    println!("{}", format!("LUMIRA v{}", VERSION).bold());
    println!("  lumira:    {}", mark(status.lumira_enabled));
    println!("  semantics: {}", mark(status.semantics_enabled));
    println!("  safety:    {}", mark(status.safety_enabled));
    println!("  signals:   {}", mark(status.signals_enabled));
    println!("  store:     {}", store_path.display());

    Ok(())
}
