use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::process::ExitCode;

use passwatch::config::Config;
use passwatch::predict::{PassService, PassSummary, MAX_TRACK_SAMPLES};
use passwatch::web::run_server;

#[derive(Parser)]
#[command(name = "passwatch")]
#[command(about = "Weather satellite pass predictions")]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List upcoming passes
    Passes,
    /// Show the pass starting next, if any
    Next {
        /// Reference time (RFC3339), defaults to now
        #[arg(long, value_parser = parse_datetime)]
        start: Option<DateTime<Utc>>,
    },
    /// Print the ground track of the next pass
    Track {
        #[arg(long, value_parser = parse_datetime)]
        start: Option<DateTime<Utc>>,
        #[arg(long, default_value_t = 20)]
        samples: usize,
    },
    /// Serve the HTTP API
    Serve,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = match Config::from_file(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading {}: {}", cli.config, e);
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Passes => passes(&config).await,
        Commands::Next { start } => next(&config, start.unwrap_or_else(Utc::now)).await,
        Commands::Track { start, samples } => {
            track(&config, start.unwrap_or_else(Utc::now), samples).await
        }
        Commands::Serve => run_server(config).await.map_err(|e| e.to_string()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn service(config: &Config) -> Result<PassService, String> {
    PassService::from_config(config).map_err(|e| e.to_string())
}

async fn passes(config: &Config) -> Result<(), String> {
    let station = config.ground_station().map_err(|e| e.to_string())?;
    let rows = service(config)?
        .list_passes(&station)
        .await
        .map_err(|e| e.to_string())?;

    if rows.is_empty() {
        println!("No passes above {} degrees", config.predict.min_max_elevation_deg);
        return Ok(());
    }

    print_table(&rows);
    Ok(())
}

async fn next(config: &Config, start: DateTime<Utc>) -> Result<(), String> {
    let station = config.ground_station().map_err(|e| e.to_string())?;
    let service = service(config)?;
    let pass = service
        .determine_pass(&station, start)
        .await
        .map_err(|e| e.to_string())?;

    match pass {
        Some(pass) => print_table(&service.summarize(&[pass], Utc::now())),
        None => println!(
            "No pass within {} of {}",
            humantime::format_duration(
                config.predict.next_pass_window.to_std().unwrap_or_default()
            ),
            start.to_rfc3339()
        ),
    }
    Ok(())
}

async fn track(config: &Config, start: DateTime<Utc>, samples: usize) -> Result<(), String> {
    if samples > MAX_TRACK_SAMPLES {
        return Err(format!("--samples must not exceed {}", MAX_TRACK_SAMPLES));
    }
    let station = config.ground_station().map_err(|e| e.to_string())?;
    let service = service(config)?;

    let Some(pass) = service
        .determine_pass(&station, start)
        .await
        .map_err(|e| e.to_string())?
    else {
        println!("No pass to track");
        return Ok(());
    };

    println!("{} from {}", pass.satellite, pass.start.to_rfc3339());
    let points = service
        .satellite_positions(&pass, samples)
        .await
        .map_err(|e| e.to_string())?;
    for point in points {
        println!(
            "  {}  {:>9.4}  {:>10.4}",
            point.timestamp.format("%H:%M:%S%.3f"),
            point.latitude_deg,
            point.longitude_deg
        );
    }
    Ok(())
}

fn print_table(rows: &[PassSummary]) {
    println!(
        "{:<10} {:>9} {:>3} {:>7} {:>9} {:>14} {:>8}",
        "Satellite", "Freq", "Dir", "Max El", "Countdown", "Start Time", "Duration"
    );
    for row in rows {
        println!(
            "{:<10} {:>9} {:>3} {:>7} {:>9} {:>14} {:>8}",
            row.satellite,
            row.frequency,
            row.direction,
            row.max_elevation,
            row.countdown,
            row.start_time,
            row.duration
        );
    }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| e.to_string())
}
