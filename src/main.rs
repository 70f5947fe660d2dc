//! CLI entry point for the nutrition dashboard.
//!
//! Loads the food-intake table once, then either serves the JSON API or
//! prints a single derived view and exits.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use nutrition_dashboard::{
    aggregate::{DateRange, daily_totals},
    clock::{ReferenceClock, SINGAPORE_UTC_OFFSET_HOURS, utc_offset},
    config::{ColumnOverrides, SourceConfig},
    dashboard::{DEFAULT_TOP_LIMIT, DashboardQuery, DashboardView},
    nutrients::Nutrient,
    output::{print_json, print_ranking, write_daily_csv},
    server::{AppState, serve},
    snapshot::Session,
};
use chrono::{NaiveDate, Utc};
use std::ffi::OsStr;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SourceKind {
    /// Local CSV export
    Csv,
    /// Airtable table (credentials from AIRTABLE_* variables)
    Airtable,
}

#[derive(Parser)]
#[command(name = "nutrition_dashboard")]
#[command(about = "Daily nutrition totals, averages and top foods", long_about = None)]
struct Cli {
    /// Where to read the food log from
    #[arg(long, value_enum, env = "NUTRITION_SOURCE", default_value = "csv", global = true)]
    source: SourceKind,

    /// CSV export to read when --source=csv
    #[arg(long, env = "NUTRITION_CSV_PATH", default_value = "Table 1-Grid view.csv", global = true)]
    csv_path: PathBuf,

    /// JSON file overriding source column names
    #[arg(long, env = "COLUMN_MAP_PATH", global = true)]
    columns: Option<PathBuf>,

    /// Hours east of UTC used to decide what "today" is
    #[arg(long, env = "REFERENCE_UTC_OFFSET_HOURS", default_value_t = SINGAPORE_UTC_OFFSET_HOURS, allow_negative_numbers = true, global = true)]
    utc_offset_hours: i32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Clone)]
struct RangeArgs {
    /// First date to include (YYYY-MM-DD); defaults to the earliest record
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last date to include (YYYY-MM-DD); defaults to the latest record
    #[arg(long)]
    end: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the dashboard JSON API
    Serve {
        /// Address to listen on
        #[arg(long, env = "DASHBOARD_ADDR", default_value = "127.0.0.1:8501")]
        addr: SocketAddr,
    },
    /// Log today's intake, averages, trends and top foods as JSON
    Summary {
        #[command(flatten)]
        range: RangeArgs,

        /// Nutrient to rank foods by
        #[arg(short, long, default_value = "calories")]
        nutrient: Nutrient,
    },
    /// Write per-day totals as CSV to stdout
    Daily {
        #[command(flatten)]
        range: RangeArgs,
    },
    /// List the foods contributing most to a nutrient
    Top {
        #[command(flatten)]
        range: RangeArgs,

        /// Nutrient to rank foods by (key or column label)
        #[arg(short, long, default_value = "calories")]
        nutrient: Nutrient,

        /// Number of foods to show
        #[arg(short, long, default_value_t = DEFAULT_TOP_LIMIT)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/nutrition_dashboard.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("nutrition_dashboard.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let zone = utc_offset(cli.utc_offset_hours)?;
    let clock = ReferenceClock::system(zone);
    let session = open_session(&cli, zone).await?;

    match cli.command {
        Commands::Serve { addr } => {
            serve(addr, Arc::new(AppState { session, clock })).await?;
        }
        Commands::Summary { range, nutrient } => {
            let query = DashboardQuery {
                start: range.start,
                end: range.end,
                nutrient: Some(nutrient),
                limit: None,
            };
            let view = DashboardView::build(&session, &query, clock.now());
            print_json(&view)?;
        }
        Commands::Daily { range } => {
            let totals = resolve_range(&session, &range)
                .map(|r| daily_totals(session.snapshot.records(), &r))
                .unwrap_or_default();
            write_daily_csv(std::io::stdout().lock(), &totals)?;
        }
        Commands::Top {
            range,
            nutrient,
            limit,
        } => {
            let query = DashboardQuery {
                start: range.start,
                end: range.end,
                nutrient: Some(nutrient),
                limit: Some(limit),
            };
            match DashboardView::build(&session, &query, clock.now()).top {
                Some(ranking) => print_ranking(&ranking),
                None => warn!("No records to rank"),
            }
        }
    }

    Ok(())
}

/// Builds the configured source and loads the session snapshot from it.
#[tracing::instrument(skip_all, fields(source = ?cli.source))]
async fn open_session(cli: &Cli, zone: chrono::FixedOffset) -> Result<Session> {
    let overrides = match &cli.columns {
        Some(path) => ColumnOverrides::load(path)?,
        None => ColumnOverrides::default(),
    };

    let config = match cli.source {
        SourceKind::Csv => SourceConfig::Csv {
            path: cli.csv_path.clone(),
        },
        SourceKind::Airtable => SourceConfig::airtable_from_env()?,
    };

    let source = config
        .build(&overrides, zone)
        .context("failed to set up data source")?;
    info!(source = %source.name(), "Loading nutrition table");

    Ok(Session::open(source.as_ref(), Utc::now()).await)
}

fn resolve_range(session: &Session, range: &RangeArgs) -> Option<DateRange> {
    DashboardQuery {
        start: range.start,
        end: range.end,
        ..Default::default()
    }
    .range(session)
}
