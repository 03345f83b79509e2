use clap::Parser;
use polygon_localities::config::{self, Config, Pacing};
use polygon_localities::error::{ConfigError, PipelineError};
use polygon_localities::google::GoogleMapsClient;
use polygon_localities::pipeline::{Outcome, Pipeline};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Polygon Localities: every locality inside a drawn map boundary,
/// with driving distance and time from a fixed origin.
///
/// Reads the first coordinate list of a KML file, asks Google Places which
/// localities lie inside it, and writes an .xlsx report.
///
/// Examples:
///   localities
///   localities --kml area.kml --output area.xlsx
///   localities --origin "Moss Vale, NSW, Australia" --batch-size 10
#[derive(Parser)]
#[command(name = "localities", version, about, long_about = None)]
struct Cli {
    /// Google Maps Platform API key. Also read from .env.
    #[arg(long, env = "GOOGLE_MAPS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Boundary file (KML).
    #[arg(long, default_value = config::DEFAULT_BOUNDARY_PATH)]
    kml: PathBuf,

    /// Report file (.xlsx). Overwritten if it exists.
    #[arg(long, short = 'o', default_value = config::DEFAULT_OUTPUT_PATH)]
    output: PathBuf,

    /// Address distances are measured from.
    #[arg(long, default_value = config::DEFAULT_ORIGIN)]
    origin: String,

    /// Destinations per Distance Matrix request (1-25).
    #[arg(long, default_value_t = config::MAX_BATCH_SIZE)]
    batch_size: usize,

    /// Pause before each Place Details lookup, in milliseconds.
    #[arg(long, default_value_t = 50)]
    detail_delay_ms: u64,

    /// Pause after each Distance Matrix batch, in milliseconds.
    #[arg(long, default_value_t = 200)]
    batch_delay_ms: u64,

    /// Debug logging (overridden by RUST_LOG).
    #[arg(long, short = 'v')]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> Result<Config, ConfigError> {
        let mut config = Config::from_api_key(self.api_key.as_deref())?;
        config.boundary_path = self.kml;
        config.output_path = self.output;
        config.origin = self.origin;
        config.pacing = Pacing {
            detail_delay: Duration::from_millis(self.detail_delay_ms),
            batch_delay: Duration::from_millis(self.batch_delay_ms),
            batch_size: self.batch_size,
            ..Pacing::default()
        };
        config.validate()?;
        Ok(config)
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .with_target(false)
        .without_time()
        .init();
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.into_config().unwrap_or_else(|e| {
        match e {
            ConfigError::MissingApiKey => println!("{}", e),
            _ => eprintln!("Error: {}", e),
        }
        std::process::exit(1);
    });

    let client = GoogleMapsClient::new(&config);
    match Pipeline::new(&config, &client).run() {
        Ok(Outcome::NoPlaces) => {
            println!("No localities found inside {}. Nothing written.", config.boundary_path.display());
        }
        Ok(Outcome::Written { path, rows, distances_annotated }) => {
            if !distances_annotated {
                println!("  Distance columns are blank: origin could not be geocoded.");
            }
            println!("Wrote {} rows to {}", rows.len(), path.display());
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            if let PipelineError::Service(_) = e {
                eprintln!("  No report written.");
            }
            std::process::exit(1);
        }
    }
}
