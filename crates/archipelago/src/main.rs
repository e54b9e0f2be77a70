use std::env;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use archipelago_core::config::{Config, CONFIG_FILE_NAME};
use archipelago_core::report::{self, AnalysisReport, CheckGate};
use archipelago_core::verdict::Verdict;
use archipelago_report::{json, markdown, text};

#[derive(Parser)]
#[command(name = "archipelago")]
#[command(about = "Coupling and layer-violation analysis for island-layered architectures")]
#[command(version)]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze an architecture definition and print a full report
    Analyze {
        /// Config file (defaults to archipelago.toml in the current directory or an ancestor)
        config: Option<PathBuf>,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Compact JSON output
        #[arg(long)]
        compact: bool,
    },
    /// Analyze and exit with code 0 (pass) or 1 (fail)
    Check {
        /// Config file (defaults to archipelago.toml in the current directory or an ancestor)
        config: Option<PathBuf>,
        /// Fail when the verdict is this level or worse
        #[arg(long, default_value = "warning")]
        fail_on: String,
        /// Fail when there are more layer violations than this
        #[arg(long)]
        max_violations: Option<usize>,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Compact JSON output
        #[arg(long)]
        compact: bool,
    },
    /// Create an archipelago.toml with a sample architecture
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Markdown,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(!cli.no_color);

    if cli.no_color {
        colored::control::set_override(false);
    }

    let result = match cli.command {
        Commands::Analyze {
            config,
            format,
            compact,
        } => cmd_analyze(config.as_deref(), format, compact),
        Commands::Check {
            config,
            fail_on,
            max_violations,
            format,
            compact,
        } => cmd_check(config.as_deref(), &fail_on, max_violations, format, compact),
        Commands::Init { force } => cmd_init(force),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(2);
    }
}

fn init_tracing(ansi: bool) {
    let filter = EnvFilter::try_from_env("ARCHIPELAGO_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "archipelago=debug,warn"
        } else {
            "archipelago=warn"
        })
    });

    let format = env::var("ARCHIPELAGO_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries the report
    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(
                    fmt::layer()
                        .compact()
                        .with_ansi(ansi)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }
}

fn cmd_analyze(config_path: Option<&Path>, format: OutputFormat, compact: bool) -> Result<()> {
    let report = run_analysis(config_path)?;
    let output = match format {
        OutputFormat::Text => text::format_report(&report),
        OutputFormat::Json => json::format_report(&report, compact),
        OutputFormat::Markdown => markdown::format_report(&report),
    };
    println!("{output}");
    Ok(())
}

fn cmd_check(
    config_path: Option<&Path>,
    fail_on_str: &str,
    max_violations: Option<usize>,
    format: OutputFormat,
    compact: bool,
) -> Result<()> {
    let fail_on: Verdict = fail_on_str.parse()?;
    let gate = CheckGate {
        fail_on,
        max_violations,
    };
    let report = run_analysis(config_path)?;
    let (output, passed) = match format {
        OutputFormat::Text => text::format_check(&report, &gate),
        OutputFormat::Json => json::format_check(&report, &gate, compact),
        OutputFormat::Markdown => markdown::format_check(&report, &gate),
    };
    println!("{output}");
    if !passed {
        process::exit(1);
    }
    Ok(())
}

fn cmd_init(force: bool) -> Result<()> {
    let target = PathBuf::from(CONFIG_FILE_NAME);
    if target.exists() && !force {
        anyhow::bail!("{CONFIG_FILE_NAME} already exists. Use --force to overwrite.");
    }
    std::fs::write(&target, Config::default_toml())
        .with_context(|| format!("failed to write {CONFIG_FILE_NAME}"))?;
    println!("Created {CONFIG_FILE_NAME} with a sample architecture.");
    Ok(())
}

fn load_config(config_path: Option<&Path>) -> Result<Config> {
    match config_path {
        Some(p) => Config::load(p),
        None => {
            let cwd = env::current_dir().context("failed to read current directory")?;
            Config::discover(&cwd)
        }
    }
}

fn run_analysis(config_path: Option<&Path>) -> Result<AnalysisReport> {
    let config = load_config(config_path)?;
    debug!(
        islands = config.islands.len(),
        edges = config.edges.len(),
        "loaded configuration"
    );
    let report = report::analyze_config(&config).context("invalid architecture definition")?;
    info!(verdict = %report.verdict, violations = report.violations.len(), "analysis complete");
    Ok(report)
}
