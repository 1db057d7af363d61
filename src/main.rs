//! CLI entry point for the fleet report tool.
//!
//! Provides subcommands for building the fleet-wide dependency report,
//! building per-device sheets, and checking how device names classify.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use fleet_report::{
    config::ReportSettings,
    fetch::{
        BasicClient, FileTelemetrySource, HttpTelemetrySource, TelemetrySource, auth::ApiKey,
    },
    output::{print_json, write_json, write_report_csv},
    pipeline::{ReportRequest, build_device_sheets, build_fleet_report},
    report::classify::{GroupDescriptor, classify_name},
    report::types::VehicleType,
};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "fleet_report")]
#[command(about = "Aggregates fleet telemetry into dependency reports", long_about = None)]
struct Cli {
    /// Optional JSON settings file (defaults to environment variables)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the fleet report grouped by dependency and vehicle type
    Report {
        /// JSON file holding the report request
        #[arg(short, long)]
        request: String,

        /// Telemetry bundle file or API base URL (defaults to FLEET_API_URL)
        #[arg(short, long)]
        source: Option<String>,

        /// JSON file to write the report to
        #[arg(short, long, default_value = "report.json")]
        output: String,

        /// Optional CSV file for the flat report table
        #[arg(long)]
        csv: Option<String>,
    },
    /// Build one sheet per device (route, alerts, fuel summary)
    Sheets {
        /// JSON file holding the report request
        #[arg(short, long)]
        request: String,

        /// Telemetry bundle file or API base URL (defaults to FLEET_API_URL)
        #[arg(short, long)]
        source: Option<String>,

        /// JSON file to write the sheets to
        #[arg(short, long, default_value = "sheets.json")]
        output: String,
    },
    /// Show the dependency and vehicle type assigned to device names
    Classify {
        /// Group id the devices belong to
        #[arg(long, default_value_t = 16)]
        group_id: i64,

        /// Group display name
        #[arg(long, default_value = "")]
        group_name: String,

        /// Device names to classify
        #[arg(required = true)]
        names: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/fleet_report.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("fleet_report.log"));

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

    let settings = match &cli.config {
        Some(path) => ReportSettings::load(path)?,
        None => ReportSettings::from_env()?,
    };

    match cli.command {
        Commands::Report {
            request,
            source,
            output,
            csv,
        } => {
            let request = load_request(&request)?;
            let source = telemetry_source(source.as_deref(), &request, &settings)?;

            let report = build_fleet_report(source.as_ref(), &request, &settings)
                .await
                .inspect_err(|e| error!(code = e.code(), error = %e, "Report failed"))?;

            write_json(&output, &report)?;
            if let Some(csv) = csv {
                write_report_csv(&csv, &report)?;
            }
            info!(output = %output, "Report written");
        }
        Commands::Sheets {
            request,
            source,
            output,
        } => {
            let request = load_request(&request)?;
            let source = telemetry_source(source.as_deref(), &request, &settings)?;

            let sheets = build_device_sheets(source.as_ref(), &request)
                .await
                .inspect_err(|e| error!(code = e.code(), error = %e, "Sheets failed"))?;

            write_json(&output, &sheets)?;
            info!(output = %output, sheets = sheets.sheets.len(), "Sheets written");
        }
        Commands::Classify {
            group_id,
            group_name,
            names,
        } => {
            let group = GroupDescriptor {
                group_id,
                group_name,
            };
            let classifier = settings.classifier();

            let rows: Vec<serde_json::Value> = names
                .iter()
                .map(|name| {
                    let (dependency, vehicle_type) = if classifier.is_coded(&group) {
                        classify_name(name, &classifier.table)
                    } else {
                        (group.group_name.as_str(), VehicleType::Vehicle)
                    };
                    serde_json::json!({
                        "name": name,
                        "dependency": dependency,
                        "vehicleType": vehicle_type.label(),
                    })
                })
                .collect();

            print_json(&rows)?;
        }
    }

    Ok(())
}

fn load_request(path: &str) -> Result<ReportRequest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read request file '{path}'"))?;
    let request =
        serde_json::from_str(&content).with_context(|| format!("Invalid request file '{path}'"))?;
    Ok(request)
}

/// Picks a bundle file or the HTTP API, authenticated with the request token.
#[tracing::instrument(skip(request, settings))]
fn telemetry_source(
    source: Option<&str>,
    request: &ReportRequest,
    settings: &ReportSettings,
) -> Result<Box<dyn TelemetrySource>> {
    let source = match source.or(settings.api_url.as_deref()) {
        Some(source) => source,
        None => bail!("No telemetry source given and FLEET_API_URL is not set"),
    };

    if !source.starts_with("http") {
        return Ok(Box::new(FileTelemetrySource::new(source)));
    }

    let client = ApiKey::bearer(BasicClient::new(settings.http_timeout())?, &request.token)?;
    let http = HttpTelemetrySource::new(client, source, settings.paths.clone())?;
    Ok(Box::new(http))
}
