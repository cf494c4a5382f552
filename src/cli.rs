use chrono::{DateTime, Duration, Utc};
use clap::{Args, Subcommand};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::{AnalysisConfig, Config, ConfigError};
use crate::debris::{screen, CatalogLoadReport, DebrisCatalog, ElementCatalog, ScreeningParams};
use crate::orbit::{
    sample, step_count, AltitudeBand, BandFilter, Ephemeris, OrbitError, OrbitalElementSet,
    Propagator, TrajectoryPoint,
};
use crate::predict::{predict_passes, GroundStation, PassSearch, PredictError, WindowEdges};
use crate::web::server::AppState;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Orbit(#[from] OrbitError),
    #[error(transparent)]
    Predict(#[from] PredictError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
    #[error("{0}")]
    InvalidArgument(String),
}

#[derive(Subcommand)]
pub enum Commands {
    /// Position of one object at an instant
    Position {
        #[command(flatten)]
        object: ObjectArgs,
        /// RFC 3339 instant, defaults to now
        #[arg(long, value_parser = parse_time)]
        at: Option<DateTime<Utc>>,
    },
    /// Sample the trajectory of one object
    Trajectory {
        #[command(flatten)]
        object: ObjectArgs,
        #[command(flatten)]
        sampling: SamplingArgs,
    },
    /// Snapshot a debris catalog
    Debris {
        #[command(flatten)]
        catalog: CatalogArgs,
        /// Altitude band index 0-4
        #[arg(long)]
        band: Option<i64>,
        /// RFC 3339 instant, defaults to now
        #[arg(long, value_parser = parse_time)]
        at: Option<DateTime<Utc>>,
        /// Print per-band counts instead of records
        #[arg(long)]
        summary: bool,
    },
    /// Screen one object against a debris catalog
    Collision {
        #[command(flatten)]
        object: ObjectArgs,
        #[command(flatten)]
        catalog: CatalogArgs,
        #[command(flatten)]
        sampling: SamplingArgs,
        #[arg(long, default_value_t = 5.0)]
        threshold_km: f64,
        /// Only compare against debris in the object's starting band
        #[arg(long)]
        same_band: bool,
    },
    /// Visibility passes over a ground station
    Passes {
        #[command(flatten)]
        object: ObjectArgs,
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        #[arg(long, default_value_t = 0.0)]
        elevation_m: f64,
        #[arg(long, default_value_t = 10.0, allow_negative_numbers = true)]
        min_elevation: f64,
        /// RFC 3339 instant, defaults to now
        #[arg(long, value_parser = parse_time)]
        start: Option<DateTime<Utc>>,
        #[arg(long, default_value = "24h", value_parser = parse_duration)]
        duration: Duration,
        /// Report passes cut by the window edges instead of dropping them
        #[arg(long)]
        clip_edges: bool,
    },
    /// Run the HTTP API
    Serve {
        #[arg(long)]
        config: PathBuf,
    },
}

#[derive(Args)]
pub struct ObjectArgs {
    /// File holding a 2- or 3-line element set
    #[arg(long)]
    tle: PathBuf,
}

#[derive(Args)]
pub struct CatalogArgs {
    /// File of concatenated 3-line element sets
    #[arg(long)]
    catalog: PathBuf,
}

#[derive(Args)]
pub struct SamplingArgs {
    #[arg(long, default_value_t = 5)]
    periods: u32,
    #[arg(long, default_value = "1m", value_parser = parse_duration)]
    step: Duration,
    /// RFC 3339 instant, defaults to now
    #[arg(long, value_parser = parse_time)]
    start: Option<DateTime<Utc>>,
}

impl SamplingArgs {
    fn step_minutes(&self) -> f64 {
        minutes(self.step)
    }

    /// Refuse sampling runs larger than the analysis limit.
    fn check_steps(&self, period_minutes: f64, limits: &AnalysisConfig) -> Result<(), CliError> {
        let steps = step_count(period_minutes, self.periods, self.step_minutes())?;
        if steps > limits.max_trajectory_steps {
            return Err(CliError::InvalidArgument(format!(
                "{} trajectory samples requested, at most {} allowed",
                steps, limits.max_trajectory_steps
            )));
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct CatalogDump<'a> {
    report: &'a CatalogLoadReport,
    catalog: &'a DebrisCatalog,
}

fn parse_time(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| e.to_string())
}

fn parse_duration(s: &str) -> Result<Duration, String> {
    humantime::parse_duration(s.trim())
        .map_err(|e| e.to_string())
        .and_then(|d| Duration::from_std(d).map_err(|e| e.to_string()))
}

/// End of a pass search window, refusing windows past the analysis limit.
fn search_end(
    start: DateTime<Utc>,
    duration: Duration,
    limits: &AnalysisConfig,
) -> Result<DateTime<Utc>, CliError> {
    let hours = minutes(duration) / 60.0;
    if hours > limits.max_search_hours {
        return Err(CliError::InvalidArgument(format!(
            "search window of {} h exceeds {} h",
            hours, limits.max_search_hours
        )));
    }
    start.checked_add_signed(duration).ok_or_else(|| {
        CliError::InvalidArgument(format!("search window from {} is out of range", start))
    })
}

fn minutes(d: Duration) -> f64 {
    d.num_milliseconds() as f64 / 60_000.0
}

fn read(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn load_object(args: &ObjectArgs) -> Result<OrbitalElementSet, CliError> {
    Ok(OrbitalElementSet::parse_text(&read(&args.tle)?)?)
}

fn print_json(value: &impl Serialize) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn execute(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Position { object, at } => {
            let elements = load_object(&object)?;
            let at = at.unwrap_or_else(Utc::now);
            let state = Propagator::new(&elements)?.propagate(at)?;
            print_json(&TrajectoryPoint::from_state(state)?)
        }
        Commands::Trajectory { object, sampling } => {
            let elements = load_object(&object)?;
            let propagator = Propagator::new(&elements)?;
            sampling.check_steps(propagator.period_minutes(), &AnalysisConfig::default())?;
            let start = sampling.start.unwrap_or_else(Utc::now);
            let trajectory = sample(
                &propagator,
                start,
                sampling.periods,
                sampling.step_minutes(),
            )?;
            print_json(&trajectory)
        }
        Commands::Debris {
            catalog,
            band,
            at,
            summary,
        } => {
            let filter = match band {
                None => BandFilter::AllBands,
                Some(index) => AltitudeBand::from_index(index)
                    .map(BandFilter::SpecificBand)
                    .ok_or_else(|| {
                        CliError::InvalidArgument(format!("band must be 0-4, got {}", index))
                    })?,
            };
            let at = at.unwrap_or_else(Utc::now);
            let (snapshot, report) = DebrisCatalog::load(&read(&catalog.catalog)?, at, filter);
            if summary {
                print_json(&snapshot.band_summary())
            } else {
                print_json(&CatalogDump {
                    report: &report,
                    catalog: &snapshot,
                })
            }
        }
        Commands::Collision {
            object,
            catalog,
            sampling,
            threshold_km,
            same_band,
        } => {
            let elements = load_object(&object)?;
            let catalog = ElementCatalog::parse(&read(&catalog.catalog)?);
            let params = ScreeningParams {
                num_periods: sampling.periods,
                step_minutes: sampling.step_minutes(),
                threshold_km,
                same_band,
                max_steps: AnalysisConfig::default().max_trajectory_steps,
            };
            let start = sampling.start.unwrap_or_else(Utc::now);
            print_json(&screen(&elements, &catalog, start, &params)?)
        }
        Commands::Passes {
            object,
            lat,
            lon,
            elevation_m,
            min_elevation,
            start,
            duration,
            clip_edges,
        } => {
            let elements = load_object(&object)?;
            if !(-90.0..=90.0).contains(&lat) || !(-180.0..=360.0).contains(&lon) {
                return Err(CliError::InvalidArgument(format!(
                    "observer position {}, {} is out of range",
                    lat, lon
                )));
            }
            let station = GroundStation::new(lat, lon, elevation_m);
            let start = start.unwrap_or_else(Utc::now);
            let search = PassSearch {
                min_elevation_deg: min_elevation,
                edges: if clip_edges {
                    WindowEdges::Clip
                } else {
                    WindowEdges::Discard
                },
            };
            let end = search_end(start, duration, &AnalysisConfig::default())?;
            let passes = predict_passes(&elements, station, start, end, &search)?;
            print_json(&passes)
        }
        Commands::Serve { config } => {
            let state = AppState::new(Config::from_file(&config)?)?;
            crate::web::run_server(state).await?;
            Ok(())
        }
    }
}
