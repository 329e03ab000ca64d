use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use semester_planner::calendar::{HolidayPolicy, weekday_name};
use semester_planner::export::{
    load_request_from_json, plan_tables_as_text, save_placeholders_to_json, save_plan_to_csv,
    save_plan_to_json, write_plan_csv,
};
use semester_planner::report::{placeholder_map, render_text_report};
use semester_planner::scheduler::{TestAlignment, schedule};
use semester_planner::unit::parse_syllabus;
use semester_planner::{KeywordExtractor, PlannerConfig, Planner, SeededChooser};
use tracing::info;

/// Semester planner: schedule 17 sessions and derive a lesson plan per class.
#[derive(Debug, Parser)]
#[command(name = "cli", version, about = "Semester schedule and lesson planner")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// TOML configuration file (PLANNER_* variables override it)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a full semester plan from a JSON request
    Generate {
        /// Generation request (JSON)
        #[arg(short, long)]
        request: PathBuf,
        /// Seed for verb and phrase selection
        #[arg(short, long)]
        seed: Option<u64>,
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        holiday_policy: Option<HolidayPolicy>,
        #[arg(long)]
        test_alignment: Option<TestAlignment>,
    },
    /// Print only the 17-session calendar for a request
    Schedule {
        #[arg(short, long)]
        request: PathBuf,
        #[arg(long)]
        holiday_policy: Option<HolidayPolicy>,
        #[arg(long)]
        test_alignment: Option<TestAlignment>,
    },
    /// Print the effective taxonomy table as JSON
    Taxonomy,
    /// Split a syllabus text into units ("Unidad ..." headings) as JSON
    ParseSyllabus {
        /// Plain-text syllabus file
        path: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Csv,
    Placeholders,
    Table,
}

fn init_tracing(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_env("PLANNER_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let mut config = PlannerConfig::load(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Command::Generate {
            request,
            seed,
            format,
            output,
            holiday_policy,
            test_alignment,
        } => {
            apply_overrides(&mut config, holiday_policy, test_alignment);
            if seed.is_some() {
                config.seed = seed;
            }
            generate(&config, &request, format, output.as_deref())
        }
        Command::Schedule {
            request,
            holiday_policy,
            test_alignment,
        } => {
            apply_overrides(&mut config, holiday_policy, test_alignment);
            print_schedule(&config, &request)
        }
        Command::Taxonomy => {
            let taxonomy = config.taxonomy()?;
            println!("{}", serde_json::to_string_pretty(&taxonomy)?);
            Ok(())
        }
        Command::ParseSyllabus { path } => {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let units = parse_syllabus(&text);
            if units.is_empty() {
                anyhow::bail!("no 'Unidad' headings found in {}", path.display());
            }
            println!("{}", serde_json::to_string_pretty(&units)?);
            Ok(())
        }
    }
}

fn apply_overrides(
    config: &mut PlannerConfig,
    holiday_policy: Option<HolidayPolicy>,
    test_alignment: Option<TestAlignment>,
) {
    if let Some(policy) = holiday_policy {
        config.holiday_policy = policy;
    }
    if let Some(alignment) = test_alignment {
        config.test_alignment = alignment;
    }
}

fn generate(
    config: &PlannerConfig,
    request_path: &Path,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let request = load_request_from_json(request_path)
        .with_context(|| format!("reading request {}", request_path.display()))?;
    let taxonomy = config.taxonomy()?;
    let extractor = KeywordExtractor::default();
    let seed = config.seed.unwrap_or_else(rand::random);
    let planner = Planner::new(&taxonomy, &extractor).with_options(config.planner_options());
    let plan = planner.generate(&request, &mut SeededChooser::new(seed))?;
    info!(seed, warnings = plan.warnings.len(), "plan ready");

    for warning in &plan.warnings {
        eprintln!("warning: {warning}");
    }

    match (format, output) {
        (OutputFormat::Json, Some(path)) => save_plan_to_json(&plan, path)?,
        (OutputFormat::Csv, Some(path)) => save_plan_to_csv(&plan, path)?,
        (OutputFormat::Placeholders, Some(path)) => save_placeholders_to_json(&plan, path)?,
        (OutputFormat::Text, Some(path)) => fs::write(path, render_text_report(&plan))?,
        (OutputFormat::Table, Some(path)) => fs::write(path, plan_tables_as_text(&plan)?)?,
        (OutputFormat::Json, None) => println!("{}", serde_json::to_string_pretty(&plan)?),
        (OutputFormat::Csv, None) => write_plan_csv(&plan, io::stdout().lock())?,
        (OutputFormat::Placeholders, None) => {
            println!("{}", serde_json::to_string_pretty(&placeholder_map(&plan))?)
        }
        (OutputFormat::Text, None) => print!("{}", render_text_report(&plan)),
        (OutputFormat::Table, None) => print!("{}", plan_tables_as_text(&plan)?),
    }
    Ok(())
}

fn print_schedule(config: &PlannerConfig, request_path: &Path) -> Result<()> {
    let request = load_request_from_json(request_path)
        .with_context(|| format!("reading request {}", request_path.display()))?;
    let options = config.planner_options();
    let dates = request
        .dates()
        .with_recurring_holidays(&options.recurring_holidays);
    let outcome = schedule(&dates, &options.scheduler)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "Día de clase: {}", weekday_name(request.weekday))?;
    for session in &outcome.sessions {
        let marker = if session.holiday_overlap { " (feriado)" } else { "" };
        let label = match session.test_number {
            Some(n) => format!("{} {n}", session.event.label()),
            None => session.event.label().to_string(),
        };
        writeln!(
            out,
            "{:02} | {} | {label}{marker}",
            session.ordinal,
            session.date.format("%d/%m/%Y")
        )?;
    }
    for warning in &outcome.warnings {
        eprintln!("warning: {warning}");
    }
    Ok(())
}
