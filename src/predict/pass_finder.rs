use chrono::{DateTime, Duration, Utc};

use crate::orbit::{OrbitalElementSet, Propagator};
use crate::predict::discrete::find_discrete;
use crate::predict::{
    Crossing, ElevationSource, GroundStation, PassSearch, PassWindow, PredictError, Topocentric,
    Transition, WindowEdges,
};

/// Coarse samples per orbital period.
const STEPS_PER_PERIOD: f64 = 20.0;
/// Samples between AOS and LOS, both included, when looking for the peak.
const PEAK_SAMPLES: usize = 20;

/// Find all passes of one object above `search.min_elevation_deg` seen
/// from `station` during `[start, end]`.
pub fn predict_passes(
    elements: &OrbitalElementSet,
    station: GroundStation,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    search: &PassSearch,
) -> Result<Vec<PassWindow>, PredictError> {
    let propagator = Propagator::new(elements)?;
    let source = Topocentric::new(&propagator, station);
    let passes = find_passes(&source, start, end, search)?;

    log::info!(
        "Found {} passes of {} above {} deg between {} and {}",
        passes.len(),
        elements.display_name(),
        search.min_elevation_deg,
        start,
        end
    );
    Ok(passes)
}

/// Scan `source` for horizon crossings and pair them into passes.
pub fn find_passes(
    source: &impl ElevationSource,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    search: &PassSearch,
) -> Result<Vec<PassWindow>, PredictError> {
    if start >= end {
        return Err(PredictError::InvalidWindow { start, end });
    }
    let min_elevation = search.min_elevation_deg;
    if !(-90.0..=90.0).contains(&min_elevation) {
        return Err(PredictError::InvalidElevation(min_elevation));
    }

    let step_us = source.period_minutes() * 60_000_000.0 / STEPS_PER_PERIOD;
    if !(step_us >= 1.0 && step_us.is_finite()) {
        return Err(PredictError::InvalidStep);
    }
    let step = Duration::microseconds(step_us as i64);

    let scan = find_discrete(start, end, step, |t| {
        Ok(source.look_angles(t)?.elevation_deg >= min_elevation)
    })?;

    let windows = pair_crossings(scan.initially_true, &scan.crossings, start, end, search.edges);

    windows
        .into_iter()
        .map(|(aos, los, truncated)| build_pass(source, aos, los, truncated))
        .collect()
}

enum PairState {
    AwaitingRise,
    AwaitingSet {
        rise: DateTime<Utc>,
        truncated: bool,
    },
}

/// Turn a sequence of crossings into `(aos, los, truncated)` triples.
fn pair_crossings(
    initially_visible: bool,
    crossings: &[Crossing],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    edges: WindowEdges,
) -> Vec<(DateTime<Utc>, DateTime<Utc>, bool)> {
    let mut windows = Vec::new();
    let mut state = match (initially_visible, edges) {
        (true, WindowEdges::Clip) => PairState::AwaitingSet {
            rise: start,
            truncated: true,
        },
        _ => PairState::AwaitingRise,
    };

    for crossing in crossings {
        state = match (state, crossing.transition) {
            (PairState::AwaitingRise, Transition::Rise) => PairState::AwaitingSet {
                rise: crossing.time,
                truncated: false,
            },
            (PairState::AwaitingRise, Transition::Set) => {
                log::debug!("Ignoring set at {} without a rise", crossing.time);
                PairState::AwaitingRise
            }
            (PairState::AwaitingSet { .. }, Transition::Rise) => PairState::AwaitingSet {
                rise: crossing.time,
                truncated: false,
            },
            (PairState::AwaitingSet { rise, truncated }, Transition::Set) => {
                windows.push((rise, crossing.time, truncated));
                PairState::AwaitingRise
            }
        };
    }

    if let PairState::AwaitingSet { rise, .. } = state {
        match edges {
            WindowEdges::Clip => windows.push((rise, end, true)),
            WindowEdges::Discard => {
                log::debug!("Dropping pass rising at {} still in progress at {}", rise, end)
            }
        }
    }

    windows
}

fn build_pass(
    source: &impl ElevationSource,
    aos: DateTime<Utc>,
    los: DateTime<Utc>,
    truncated: bool,
) -> Result<PassWindow, PredictError> {
    let span_us = (los - aos).num_microseconds().unwrap_or(i64::MAX) as f64;

    let mut peak = source.look_angles(aos)?;
    for i in 1..PEAK_SAMPLES {
        let offset = span_us * i as f64 / (PEAK_SAMPLES - 1) as f64;
        let angles = source.look_angles(aos + Duration::microseconds(offset as i64))?;
        if angles.elevation_deg > peak.elevation_deg {
            peak = angles;
        }
    }

    Ok(PassWindow {
        aos,
        los,
        peak_time: peak.timestamp,
        peak_elevation_deg: peak.elevation_deg,
        peak_azimuth_deg: peak.azimuth_deg,
        duration_minutes: span_us / 60_000_000.0,
        truncated,
    })
}
