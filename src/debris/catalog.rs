use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::orbit::{
    position_to_geodetic, AltitudeBand, BandFilter, GeodeticPosition, OrbitError,
    OrbitalElementSet, PropagationStatus, Propagator, StateVector,
};

/// One catalog object snapshotted at the catalog instant.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DebrisRecord {
    pub name: String,
    pub norad_id: u64,
    pub state: StateVector,
    pub geodetic: GeodeticPosition,
    pub band: AltitudeBand,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    Malformed { message: String },
    PropagationFailed { status: PropagationStatus, message: String },
    DegenerateRadius,
}

impl From<OrbitError> for SkipReason {
    fn from(err: OrbitError) -> Self {
        match err {
            OrbitError::PropagationFailure { status, message } => {
                SkipReason::PropagationFailed { status, message }
            }
            OrbitError::DegenerateRadius => SkipReason::DegenerateRadius,
            other => SkipReason::Malformed {
                message: other.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SkippedRecord {
    /// Zero-based position of the 3-line group in the input.
    pub index: usize,
    pub name: String,
    pub reason: SkipReason,
}

/// What happened to every group of a catalog load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct CatalogLoadReport {
    pub groups: usize,
    pub loaded: usize,
    pub filtered_out: usize,
    pub skipped: Vec<SkippedRecord>,
}

impl CatalogLoadReport {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

struct CatalogEntry {
    index: usize,
    name: String,
    norad_id: u64,
    propagator: Propagator,
}

/// Parsed element sets of a catalog file, ready to be snapshotted at any
/// instant.
pub struct ElementCatalog {
    entries: Vec<CatalogEntry>,
    groups: usize,
    malformed: Vec<SkippedRecord>,
}

impl ElementCatalog {
    pub fn parse(content: &str) -> Self {
        let groups = group_records(content);
        let mut entries = Vec::with_capacity(groups.len());
        let mut malformed = Vec::new();

        for (index, (name, line1, line2)) in groups.iter().enumerate() {
            let parsed = OrbitalElementSet::parse(Some(name), line1, line2)
                .and_then(|set| Propagator::new(&set).map(|p| (set, p)));
            match parsed {
                Ok((set, propagator)) => entries.push(CatalogEntry {
                    index,
                    name: set.display_name(),
                    norad_id: set.norad_id(),
                    propagator,
                }),
                Err(e) => {
                    log::debug!("Skipping catalog record {} ({}): {}", index, name, e);
                    malformed.push(SkippedRecord {
                        index,
                        name: name.to_string(),
                        reason: e.into(),
                    });
                }
            }
        }

        Self {
            entries,
            groups: groups.len(),
            malformed,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Propagate every parsed record to `at` and keep those `filter` admits.
    pub fn snapshot(
        &self,
        at: DateTime<Utc>,
        filter: BandFilter,
    ) -> (DebrisCatalog, CatalogLoadReport) {
        let mut report = CatalogLoadReport {
            groups: self.groups,
            ..Default::default()
        };
        let mut skipped = Vec::new();
        let mut records = Vec::with_capacity(self.entries.len());

        for entry in &self.entries {
            match snapshot_entry(entry, at) {
                Ok(record) if filter.admits(record.band) => records.push(record),
                Ok(_) => report.filtered_out += 1,
                Err(reason) => skipped.push(SkippedRecord {
                    index: entry.index,
                    name: entry.name.clone(),
                    reason,
                }),
            }
        }

        skipped.extend(self.malformed.iter().cloned());
        skipped.sort_by_key(|s| s.index);
        report.skipped = skipped;
        report.loaded = records.len();

        log::info!(
            "Catalog snapshot at {}: {} loaded, {} filtered out, {} skipped",
            at,
            report.loaded,
            report.filtered_out,
            report.skipped_count()
        );

        (
            DebrisCatalog {
                at,
                filter,
                records,
            },
            report,
        )
    }
}

fn snapshot_entry(entry: &CatalogEntry, at: DateTime<Utc>) -> Result<DebrisRecord, SkipReason> {
    let state = entry.propagator.propagate(at)?;
    let geodetic = position_to_geodetic(&state.position)?;
    Ok(DebrisRecord {
        name: entry.name.clone(),
        norad_id: entry.norad_id,
        state,
        geodetic,
        band: AltitudeBand::classify(geodetic.altitude_km),
    })
}

/// Debris population at a single shared instant.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DebrisCatalog {
    at: DateTime<Utc>,
    filter: BandFilter,
    records: Vec<DebrisRecord>,
}

impl DebrisCatalog {
    /// Parse `content` and snapshot every record at `at`.
    pub fn load(
        content: &str,
        at: DateTime<Utc>,
        filter: BandFilter,
    ) -> (Self, CatalogLoadReport) {
        ElementCatalog::parse(content).snapshot(at, filter)
    }

    pub fn from_records(at: DateTime<Utc>, records: Vec<DebrisRecord>) -> Self {
        Self {
            at,
            filter: BandFilter::AllBands,
            records,
        }
    }

    pub fn at(&self) -> DateTime<Utc> {
        self.at
    }

    pub fn filter(&self) -> BandFilter {
        self.filter
    }

    pub fn records(&self) -> &[DebrisRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn band_summary(&self) -> BandSummary {
        let bands = AltitudeBand::IN_RANGE
            .iter()
            .map(|&band| {
                let altitudes: Vec<f64> = self
                    .records
                    .iter()
                    .filter(|r| r.band == band)
                    .map(|r| r.geodetic.altitude_km)
                    .collect();
                let mean_altitude_km = if altitudes.is_empty() {
                    None
                } else {
                    Some(altitudes.iter().sum::<f64>() / altitudes.len() as f64)
                };
                BandCount {
                    band,
                    label: band.label(),
                    index: band.index(),
                    count: altitudes.len(),
                    mean_altitude_km,
                }
            })
            .collect();

        BandSummary {
            total: self.records.len(),
            out_of_range: self
                .records
                .iter()
                .filter(|r| r.band == AltitudeBand::OutOfRange)
                .count(),
            bands,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BandCount {
    pub band: AltitudeBand,
    pub label: String,
    pub index: i8,
    pub count: usize,
    pub mean_altitude_km: Option<f64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BandSummary {
    pub total: usize,
    pub out_of_range: usize,
    pub bands: Vec<BandCount>,
}

/// Split catalog content into (name, line1, line2) groups. A trailing
/// incomplete group is dropped.
///
/// Blank lines are removed before grouping, so a stray empty line between
/// records does not shift every following group by one. On files without
/// blank lines this is the same as counting raw lines in threes.
fn group_records(content: &str) -> Vec<(&str, &str, &str)> {
    let lines: Vec<&str> = content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    let chunks = lines.chunks_exact(3);
    if !chunks.remainder().is_empty() {
        log::debug!(
            "Ignoring {} trailing catalog line(s)",
            chunks.remainder().len()
        );
    }

    chunks
        .map(|group| {
            let name = group[0].strip_prefix("0 ").unwrap_or(group[0]);
            (name, group[1], group[2])
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::orbit::elements::tests::{DECAYING_LINE1, DECAYING_LINE2};
    use chrono::Duration;

    pub const DEBRIS_TEXT: &str = "\
FENGYUN 1C DEB A
1 31001U 99025A   25277.85315669  .00000579  00000-0  49569-3 0  9993
2 31001  98.7000  10.0000 0015000 100.0000 200.0000 14.20000000 12348
FENGYUN 1C DEB B
1 31002U 99025A   25277.85315669  .00000579  00000-0  49569-3 0  9994
2 31002  98.7000  40.0000 0002500  50.0000  10.0000 14.60000000 12340
BROKEN RECORD
1 this line is not an element set
2 neither is this one
FENGYUN 1C DEB C
1 31003U 99025A   25277.85315669  .00000579  00000-0  49569-3 0  9995
2 31003  99.1000 300.0000 0120000  80.0000  30.0000 12.50000000 12343

TRAILING PARTIAL
1 31004U 99025A   25277.85315669  .00000579  00000-0  49569-3 0  9996
";

    pub fn catalog_epoch() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-10-04T20:28:32Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn groups_ignore_blank_lines_and_partial_tail() {
        let groups = group_records(DEBRIS_TEXT);
        assert_eq!(groups.len(), 4);
        assert_eq!(groups[0].0, "FENGYUN 1C DEB A");
        assert_eq!(groups[3].0, "FENGYUN 1C DEB C");
    }

    #[test]
    fn load_skips_bad_records_without_aborting() {
        let (catalog, report) =
            DebrisCatalog::load(DEBRIS_TEXT, catalog_epoch(), BandFilter::AllBands);

        assert_eq!(report.groups, 4);
        assert_eq!(report.loaded, 3);
        assert_eq!(report.filtered_out, 0);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.skipped[0].index, 2);
        assert_eq!(report.skipped[0].name, "BROKEN RECORD");
        assert!(matches!(
            report.skipped[0].reason,
            SkipReason::Malformed { .. }
        ));

        let names: Vec<&str> = catalog.records().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            ["FENGYUN 1C DEB A", "FENGYUN 1C DEB B", "FENGYUN 1C DEB C"]
        );
        assert!(catalog.records().iter().all(|r| r.state.timestamp == catalog_epoch()));
    }

    fn decaying_text() -> String {
        format!("REENTRY DEB\n{}\n{}\n", DECAYING_LINE1, DECAYING_LINE2)
    }

    #[test]
    fn failed_propagation_is_skipped_without_aborting() {
        let later = catalog_epoch() + Duration::days(10);
        let (catalog, report) = DebrisCatalog::load(&decaying_text(), later, BandFilter::AllBands);

        assert!(catalog.is_empty());
        assert_eq!(report.groups, 1);
        assert_eq!(report.loaded, 0);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.skipped[0].name, "REENTRY DEB");
        assert!(matches!(
            report.skipped[0].reason,
            SkipReason::PropagationFailed { .. }
        ));

        // The same record still propagates at its epoch.
        let (fresh, _) = DebrisCatalog::load(&decaying_text(), catalog_epoch(), BandFilter::AllBands);
        assert_eq!(fresh.len(), 1);
    }

    #[test]
    fn good_records_survive_a_failing_neighbour() {
        let text = format!("{}{}", decaying_text(), DEBRIS_TEXT);
        let later = catalog_epoch() + Duration::days(10);
        let (catalog, report) = DebrisCatalog::load(&text, later, BandFilter::AllBands);

        assert_eq!(report.groups, 5);
        assert_eq!(report.loaded, 3);
        assert_eq!(report.skipped_count(), 2);
        assert_eq!(report.skipped[0].index, 0);
        assert!(matches!(
            report.skipped[0].reason,
            SkipReason::PropagationFailed { .. }
        ));
        assert!(matches!(
            report.skipped[1].reason,
            SkipReason::Malformed { .. }
        ));
        assert_eq!(catalog.records()[0].name, "FENGYUN 1C DEB A");
        assert!(catalog.records().iter().all(|r| r.state.timestamp == later));
    }

    #[test]
    fn band_filter_keeps_only_matching_records() {
        let (catalog, report) = DebrisCatalog::load(
            DEBRIS_TEXT,
            catalog_epoch(),
            BandFilter::SpecificBand(AltitudeBand::Band528To896),
        );
        assert_eq!(catalog.len(), 2);
        assert_eq!(report.filtered_out, 1);
        assert!(catalog
            .records()
            .iter()
            .all(|r| r.band == AltitudeBand::Band528To896));

        let (high, _) = DebrisCatalog::load(
            DEBRIS_TEXT,
            catalog_epoch(),
            BandFilter::SpecificBand(AltitudeBand::Band1264To1632),
        );
        assert_eq!(high.len(), 1);
        assert_eq!(high.records()[0].norad_id, 31003);
    }

    #[test]
    fn snapshots_share_one_instant() {
        let elements = ElementCatalog::parse(DEBRIS_TEXT);
        assert_eq!(elements.len(), 3);

        let later = catalog_epoch() + Duration::minutes(45);
        let (catalog, _) = elements.snapshot(later, BandFilter::AllBands);
        assert_eq!(catalog.at(), later);
        assert!(catalog.records().iter().all(|r| r.state.timestamp == later));
    }

    #[test]
    fn band_summary_counts_and_averages() {
        let (catalog, _) = DebrisCatalog::load(DEBRIS_TEXT, catalog_epoch(), BandFilter::AllBands);
        let summary = catalog.band_summary();

        assert_eq!(summary.total, 3);
        assert_eq!(summary.out_of_range, 0);
        assert_eq!(summary.bands.len(), 5);
        assert_eq!(summary.bands[1].count, 2);
        assert_eq!(summary.bands[3].count, 1);
        assert_eq!(summary.bands[0].mean_altitude_km, None);
        let mean = summary.bands[1].mean_altitude_km.unwrap();
        assert!(mean > 528.0 && mean < 896.0);
    }

    #[test]
    fn empty_content_yields_empty_catalog() {
        let (catalog, report) = DebrisCatalog::load("", catalog_epoch(), BandFilter::AllBands);
        assert!(catalog.is_empty());
        assert_eq!(report, CatalogLoadReport::default());
    }
}
