use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::debris::{analyze, CatalogLoadReport, ElementCatalog, ProximityResult};
use crate::orbit::{
    sample, step_count, AltitudeBand, BandFilter, ElementSummary, Ephemeris, OrbitError,
    OrbitalElementSet, Propagator,
};

/// Trajectory samples one screening may take unless configured otherwise.
pub const DEFAULT_MAX_STEPS: usize = 100_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreeningParams {
    pub num_periods: u32,
    pub step_minutes: f64,
    pub threshold_km: f64,
    /// Only compare against debris in the band the object starts in.
    pub same_band: bool,
    /// Upper bound on trajectory samples.
    pub max_steps: usize,
}

impl Default for ScreeningParams {
    fn default() -> Self {
        Self {
            num_periods: 5,
            step_minutes: 1.0,
            threshold_km: 5.0,
            same_band: false,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

/// Outcome of screening one object against a debris catalog.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Screening {
    pub object: ElementSummary,
    pub start: DateTime<Utc>,
    /// Band of the first trajectory point, absent when nothing propagated.
    pub start_band: Option<AltitudeBand>,
    pub trajectory_points: usize,
    pub dropped_samples: usize,
    pub catalog: CatalogLoadReport,
    pub result: ProximityResult,
}

/// Sample the object's trajectory from `start`, snapshot the catalog at
/// `start` and run the proximity analysis.
pub fn screen(
    elements: &OrbitalElementSet,
    catalog: &ElementCatalog,
    start: DateTime<Utc>,
    params: &ScreeningParams,
) -> Result<Screening, OrbitError> {
    let propagator = Propagator::new(elements)?;
    let steps = step_count(
        propagator.period_minutes(),
        params.num_periods,
        params.step_minutes,
    )?;
    if steps > params.max_steps {
        return Err(OrbitError::InvalidParameter(format!(
            "{} trajectory samples requested, at most {} allowed",
            steps, params.max_steps
        )));
    }
    let trajectory = sample(&propagator, start, params.num_periods, params.step_minutes)?;

    let start_band = trajectory.points.first().map(|p| p.band);
    let filter = match (params.same_band, start_band) {
        (true, Some(band)) => BandFilter::same_band_as(band),
        _ => BandFilter::AllBands,
    };

    let (snapshot, report) = catalog.snapshot(start, filter);
    let result = analyze(&trajectory.points, &snapshot, params.threshold_km)?;

    if result.collision {
        log::warn!(
            "{}: {} approaches under {} km, closest {:.3} km",
            elements.display_name(),
            result.collision_count,
            params.threshold_km,
            result.min_distance_km
        );
    } else {
        log::info!(
            "{}: no approach under {} km, closest {:.3} km",
            elements.display_name(),
            params.threshold_km,
            result.min_distance_km
        );
    }

    Ok(Screening {
        object: elements.summary(),
        start,
        start_band,
        trajectory_points: trajectory.len(),
        dropped_samples: trajectory.dropped,
        catalog: report,
        result,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debris::catalog::tests::{catalog_epoch, DEBRIS_TEXT};
    use crate::orbit::elements::tests::iss;

    #[test]
    fn screens_against_every_band_by_default() {
        let catalog = ElementCatalog::parse(DEBRIS_TEXT);
        let params = ScreeningParams {
            num_periods: 1,
            step_minutes: 5.0,
            threshold_km: 100_000.0,
            ..Default::default()
        };
        let screening = screen(&iss(), &catalog, catalog_epoch(), &params).unwrap();

        assert_eq!(screening.catalog.loaded, 3);
        assert_eq!(screening.catalog.skipped_count(), 1);
        assert_eq!(screening.start_band, Some(AltitudeBand::Band160To528));
        assert_eq!(screening.dropped_samples, 0);
        // floor(92.9 / 5)
        assert_eq!(screening.trajectory_points, 18);
        assert_eq!(
            screening.result.collision_count,
            screening.trajectory_points * 3
        );
        assert!(screening.result.min_distance_km > 0.0);
    }

    #[test]
    fn same_band_excludes_other_altitudes() {
        let catalog = ElementCatalog::parse(DEBRIS_TEXT);
        let params = ScreeningParams {
            same_band: true,
            ..Default::default()
        };
        let screening = screen(&iss(), &catalog, catalog_epoch(), &params).unwrap();

        assert_eq!(screening.catalog.loaded, 0);
        assert_eq!(screening.catalog.filtered_out, 3);
        assert!(!screening.result.collision);
        assert!(screening.result.closest.is_none());
        assert!(screening.result.min_distance_km.is_infinite());
    }

    #[test]
    fn bad_parameters_are_errors() {
        let catalog = ElementCatalog::parse(DEBRIS_TEXT);
        let params = ScreeningParams {
            threshold_km: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            screen(&iss(), &catalog, catalog_epoch(), &params),
            Err(OrbitError::InvalidParameter(_))
        ));
    }

    #[test]
    fn oversized_sampling_is_refused_before_propagating() {
        let catalog = ElementCatalog::parse(DEBRIS_TEXT);
        let params = ScreeningParams {
            num_periods: 1,
            step_minutes: 1e-9,
            ..Default::default()
        };
        assert!(matches!(
            screen(&iss(), &catalog, catalog_epoch(), &params),
            Err(OrbitError::InvalidParameter(_))
        ));

        let params = ScreeningParams {
            num_periods: 1,
            step_minutes: 1.0,
            max_steps: 50,
            ..Default::default()
        };
        // About 93 one-minute samples per ISS orbit.
        assert!(matches!(
            screen(&iss(), &catalog, catalog_epoch(), &params),
            Err(OrbitError::InvalidParameter(_))
        ));
    }
}
