//! CLI entry point for the stuck-shipments dashboard.
//!
//! Provides subcommands for the ageing overview, a preview of the cleaned
//! data, the justification grid round trip, and saving justified rows to the
//! Google Sheets log.

mod infra;

use crate::infra::google::GoogleSheetsSink;
use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use dash_stuck::annotate::{EditableGrid, StationSelection, export_rows};
use dash_stuck::config::Settings;
use dash_stuck::export::{CsvSink, RowSink};
use dash_stuck::output::{render_table, to_json, write_csv};
use dash_stuck::record::{RawShipment, export_headers};
use dash_stuck::session::{Action, Notice, Session, merge_notices};
use std::ffi::OsStr;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "dash_stuck")]
#[command(about = "Ageing report and justification log for stuck shipments", long_about = None)]
struct Cli {
    /// Source CSV export (overrides DASH_STUCK_CSV)
    #[arg(long, global = true, value_name = "PATH")]
    csv: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Station x ageing pivot with grand totals
    Overview {
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Preview the first rows of the cleaned data
    Table {
        /// Number of rows to show
        #[arg(short, long, default_value_t = 10)]
        rows: usize,

        /// Write the whole cleaned data set to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the justification and loss reason options
    Vocabulary,
    /// List the distinct stations
    Stations,
    /// Write the editable justification grid for the selected stations
    Justify {
        /// Station to include (repeatable; "Todas" or none selects all)
        #[arg(short, long = "station")]
        stations: Vec<String>,

        /// Grid CSV to write
        #[arg(short, long)]
        grid: PathBuf,
    },
    /// Validate an edited grid and append the justified rows to the log
    Save {
        /// Edited grid CSV
        #[arg(short, long)]
        grid: PathBuf,

        /// Station selection the grid was written for
        #[arg(short, long = "station")]
        stations: Vec<String>,

        /// Append to this local CSV instead of Google Sheets
        #[arg(long)]
        local: Option<PathBuf>,

        /// Print the batch without saving it
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        /// Spreadsheet id (overrides DASH_STUCK_SPREADSHEET_ID)
        #[arg(long)]
        spreadsheet_id: Option<String>,

        /// Worksheet tab (overrides DASH_STUCK_WORKSHEET)
        #[arg(long)]
        worksheet: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/dash_stuck.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("dash_stuck.log"));

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
    let mut settings = Settings::from_env();
    if let Some(csv) = cli.csv {
        settings.csv_path = csv;
    }

    let (mut session, notices) = match Session::open(&settings.csv_path, Local::now().date_naive())
    {
        Ok(opened) => opened,
        Err(e) => {
            Notice::error(e.to_string()).emit();
            return Ok(ExitCode::FAILURE);
        }
    };
    emit_all(&notices);

    let mut failed = false;

    match cli.command {
        Commands::Overview { format } => {
            let pivot = session.pivot();
            if pivot.is_empty() {
                Notice::warning("No rows left to aggregate").emit();
            }
            match format {
                Format::Text => print!("{}", render_table(&pivot.header(), &pivot.rows())),
                Format::Json => println!("{}", to_json(&pivot.report())?),
                Format::Csv => write_csv(std::io::stdout(), &pivot.header(), &pivot.rows())?,
            }
        }
        Commands::Table { rows, output } => {
            let head: Vec<Vec<String>> =
                session.head(rows).iter().map(|s| s.to_export_row()).collect();
            print!("{}", render_table(&export_headers(), &head));

            if let Some(path) = output {
                write_cleaned(&path, &session)?;
                Notice::success(format!(
                    "{} cleaned rows written to '{}'",
                    session.shipments().len(),
                    path.display()
                ))
                .emit();
            }
        }
        Commands::Vocabulary => {
            let vocabulary = session.vocabulary();
            println!("Justificativa:");
            for label in vocabulary.justifications() {
                println!("  {label}");
            }
            println!("Motivo Lost:");
            for label in vocabulary.loss_reasons() {
                println!("  {label}");
            }
        }
        Commands::Stations => {
            for station in session.stations() {
                println!("{station}");
            }
        }
        Commands::Justify { stations, grid } => {
            emit_all(&session.dispatch(Action::SelectStations(selection(stations))));

            let file = File::create(&grid)
                .with_context(|| format!("Failed to create grid file '{}'", grid.display()))?;
            session.view().write_csv(file)?;
            Notice::success(format!(
                "Grid with {} rows written to '{}'",
                session.view().len(),
                grid.display()
            ))
            .emit();
        }
        Commands::Save {
            grid,
            stations,
            local,
            dry_run,
            spreadsheet_id,
            worksheet,
        } => {
            if spreadsheet_id.is_some() {
                settings.spreadsheet_id = spreadsheet_id;
            }
            if let Some(worksheet) = worksheet {
                settings.worksheet = worksheet;
            }

            emit_all(&session.dispatch(Action::SelectStations(selection(stations))));

            let file = File::open(&grid)
                .with_context(|| format!("Failed to open grid file '{}'", grid.display()))?;
            let edited = EditableGrid::read_csv(file)
                .with_context(|| format!("Invalid grid file '{}'", grid.display()))?;
            debug!(rows = edited.len(), "Edited grid read");
            emit_all(&session.dispatch(Action::ApplyEdits(edited)));

            let notices = if dry_run {
                dry_run_notices(&session)
            } else if let Some(path) = local {
                session.save(&CsvSink::new(path)).await
            } else {
                let sink = GoogleSheetsSink::from_settings(&settings)?;
                info!(target_sheet = %sink.describe(), "Saving justified rows");
                session.save(&sink).await
            };
            emit_all(&notices);
            failed = notices.iter().any(Notice::is_error);
        }
    }

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn emit_all(notices: &[Notice]) {
    for notice in notices {
        notice.emit();
    }
}

/// No stations, or the "Todas" entry, selects everything.
fn selection(stations: Vec<String>) -> StationSelection {
    if stations.is_empty() {
        StationSelection::All
    } else {
        StationSelection::from_names(stations)
    }
}

/// Writes every cleaned shipment with the source column names.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
fn write_cleaned(path: &Path, session: &Session) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create '{}'", path.display()))?;
    for shipment in session.shipments() {
        wtr.serialize(RawShipment::from(shipment))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Prints the batch a save would send, without sending it.
fn dry_run_notices(session: &Session) -> Vec<Notice> {
    let batch = session.export_batch();
    let mut notices = merge_notices(&batch);

    print!(
        "{}",
        render_table(&export_headers(), &export_rows(&batch.shipments))
    );
    notices.push(Notice::info(format!(
        "Dry run: {} rows would be saved; nothing was sent",
        batch.shipments.len()
    )));
    notices
}
