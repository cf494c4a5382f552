use chrono::{DateTime, Duration, Utc};

use crate::predict::{Crossing, PredictError, Transition};

/// Crossings are refined until the bracketing interval is this short.
pub const CROSSING_PRECISION: Duration = Duration::milliseconds(1);

/// Result of scanning a boolean predicate over a window.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscreteScan {
    pub initially_true: bool,
    pub crossings: Vec<Crossing>,
}

/// Sample `predicate` every `step` over `[start, end]` and bisect every
/// interval whose end samples disagree.
///
/// The last sample is taken exactly at `end`. Two crossings closer
/// together than `step` can be missed.
pub fn find_discrete<F>(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    step: Duration,
    mut predicate: F,
) -> Result<DiscreteScan, PredictError>
where
    F: FnMut(DateTime<Utc>) -> Result<bool, PredictError>,
{
    if start >= end {
        return Err(PredictError::InvalidWindow { start, end });
    }
    if step <= Duration::zero() {
        return Err(PredictError::InvalidStep);
    }

    let initially_true = predicate(start)?;
    let mut crossings = Vec::new();
    let mut prev_time = start;
    let mut prev_value = initially_true;

    while prev_time < end {
        let time = prev_time
            .checked_add_signed(step)
            .map_or(end, |t| t.min(end));
        let value = predicate(time)?;

        if value != prev_value {
            let refined = refine(prev_time, time, value, &mut predicate)?;
            crossings.push(Crossing {
                time: refined,
                transition: if value {
                    Transition::Rise
                } else {
                    Transition::Set
                },
            });
        }

        prev_time = time;
        prev_value = value;
    }

    Ok(DiscreteScan {
        initially_true,
        crossings,
    })
}

/// Binary search for the first instant in `(low, high]` where the
/// predicate reads `target`.
fn refine<F>(
    mut low: DateTime<Utc>,
    mut high: DateTime<Utc>,
    target: bool,
    predicate: &mut F,
) -> Result<DateTime<Utc>, PredictError>
where
    F: FnMut(DateTime<Utc>) -> Result<bool, PredictError>,
{
    while high - low > CROSSING_PRECISION {
        let mid = low + (high - low) / 2;
        if predicate(mid)? == target {
            high = mid;
        } else {
            low = mid;
        }
    }
    Ok(high)
}
