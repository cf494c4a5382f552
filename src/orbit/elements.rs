use chrono::{DateTime, Utc};
use serde::Serialize;
use sgp4::Elements;
use utoipa::ToSchema;

use crate::orbit::{OrbitError, EARTH_RADIUS_KM, MU_KM3_S2};

pub const MINUTES_PER_DAY: f64 = 1440.0;

// Line 2 columns 53-63 (1-indexed), revolutions per day.
const MEAN_MOTION_COLUMNS: std::ops::Range<usize> = 52..63;
const MEAN_MOTION_TOLERANCE: f64 = 1e-8;

/// Mean elements of one object, as read from a two-line element set.
#[derive(Debug, Clone)]
pub struct OrbitalElementSet {
    name: Option<String>,
    line1: String,
    line2: String,
    elements: Elements,
}

/// Serializable view of an element set and the quantities derived from it.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ElementSummary {
    pub name: Option<String>,
    pub norad_id: u64,
    pub epoch: DateTime<Utc>,
    pub eccentricity: f64,
    pub inclination_deg: f64,
    pub right_ascension_deg: f64,
    pub argument_of_perigee_deg: f64,
    pub mean_anomaly_deg: f64,
    pub mean_motion_rev_per_day: f64,
    pub period_minutes: f64,
    pub semi_major_axis_km: f64,
    pub perigee_altitude_km: f64,
    pub apogee_altitude_km: f64,
    pub line1: String,
    pub line2: String,
}

impl OrbitalElementSet {
    /// Parse the two element lines, with an optional object name.
    pub fn parse(name: Option<&str>, line1: &str, line2: &str) -> Result<Self, OrbitError> {
        let line1 = line1.trim();
        let line2 = line2.trim();

        if !line1.starts_with("1 ") {
            return Err(OrbitError::MalformedElementSet(
                "line 1 must start with \"1 \"".into(),
            ));
        }
        if !line2.starts_with("2 ") {
            return Err(OrbitError::MalformedElementSet(
                "line 2 must start with \"2 \"".into(),
            ));
        }

        let column_mean_motion = mean_motion_field(line2)?;
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(String::from);

        let elements = Elements::from_tle(name.clone(), line1.as_bytes(), line2.as_bytes())?;

        if (elements.mean_motion - column_mean_motion).abs() > MEAN_MOTION_TOLERANCE {
            return Err(OrbitError::MalformedElementSet(format!(
                "mean motion mismatch: columns 53-63 read {}, propagator read {}",
                column_mean_motion, elements.mean_motion
            )));
        }
        if elements.mean_motion <= 0.0 {
            return Err(OrbitError::MalformedElementSet(
                "mean motion must be positive".into(),
            ));
        }

        Ok(Self {
            name,
            line1: line1.to_string(),
            line2: line2.to_string(),
            elements,
        })
    }

    /// Parse a 2-line block, or a 3-line block whose first line is the name.
    pub fn parse_text(text: &str) -> Result<Self, OrbitError> {
        let lines: Vec<&str> = text
            .lines()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .collect();

        match lines.as_slice() {
            [line1, line2] => Self::parse(None, line1, line2),
            [name, line1, line2] => Self::parse(Some(name), line1, line2),
            _ => Err(OrbitError::MalformedElementSet(format!(
                "expected 2 or 3 lines, found {}",
                lines.len()
            ))),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("NORAD {}", self.elements.norad_id))
    }

    pub fn norad_id(&self) -> u64 {
        self.elements.norad_id
    }

    pub fn epoch(&self) -> DateTime<Utc> {
        self.elements.datetime.and_utc()
    }

    pub fn eccentricity(&self) -> f64 {
        self.elements.eccentricity
    }

    pub fn inclination_deg(&self) -> f64 {
        self.elements.inclination
    }

    pub fn right_ascension_deg(&self) -> f64 {
        self.elements.right_ascension
    }

    pub fn argument_of_perigee_deg(&self) -> f64 {
        self.elements.argument_of_perigee
    }

    pub fn mean_anomaly_deg(&self) -> f64 {
        self.elements.mean_anomaly
    }

    /// Revolutions per day.
    pub fn mean_motion(&self) -> f64 {
        self.elements.mean_motion
    }

    pub fn period_minutes(&self) -> f64 {
        period_from_mean_motion(self.elements.mean_motion)
    }

    /// Kepler's third law on the mean motion.
    pub fn semi_major_axis_km(&self) -> f64 {
        let n_rad_s = self.elements.mean_motion * std::f64::consts::TAU / 86_400.0;
        (MU_KM3_S2 / (n_rad_s * n_rad_s)).cbrt()
    }

    pub fn perigee_altitude_km(&self) -> f64 {
        self.semi_major_axis_km() * (1.0 - self.eccentricity()) - EARTH_RADIUS_KM
    }

    pub fn apogee_altitude_km(&self) -> f64 {
        self.semi_major_axis_km() * (1.0 + self.eccentricity()) - EARTH_RADIUS_KM
    }

    pub fn lines(&self) -> (&str, &str) {
        (&self.line1, &self.line2)
    }

    pub(crate) fn sgp4_elements(&self) -> &Elements {
        &self.elements
    }

    /// Re-emit line 2 from the parsed values, checksum included.
    pub fn to_line2(&self) -> String {
        let e = &self.elements;
        let body = format!(
            "2 {:05} {:8.4} {:8.4} {:07} {:8.4} {:8.4} {:11.8}{:5}",
            e.norad_id % 100_000,
            e.inclination,
            e.right_ascension,
            (e.eccentricity * 1e7).round() as u64,
            e.argument_of_perigee,
            e.mean_anomaly,
            e.mean_motion,
            e.revolution_number % 100_000,
        );
        let sum = checksum(&body);
        format!("{}{}", body, sum)
    }

    pub fn summary(&self) -> ElementSummary {
        ElementSummary {
            name: self.name.clone(),
            norad_id: self.norad_id(),
            epoch: self.epoch(),
            eccentricity: self.eccentricity(),
            inclination_deg: self.inclination_deg(),
            right_ascension_deg: self.right_ascension_deg(),
            argument_of_perigee_deg: self.argument_of_perigee_deg(),
            mean_anomaly_deg: self.mean_anomaly_deg(),
            mean_motion_rev_per_day: self.mean_motion(),
            period_minutes: self.period_minutes(),
            semi_major_axis_km: self.semi_major_axis_km(),
            perigee_altitude_km: self.perigee_altitude_km(),
            apogee_altitude_km: self.apogee_altitude_km(),
            line1: self.lines().0.to_string(),
            line2: self.lines().1.to_string(),
        }
    }
}

pub fn period_from_mean_motion(mean_motion: f64) -> f64 {
    MINUTES_PER_DAY / mean_motion
}

fn mean_motion_field(line2: &str) -> Result<f64, OrbitError> {
    let field = line2.get(MEAN_MOTION_COLUMNS).ok_or_else(|| {
        OrbitError::MalformedElementSet("line 2 too short for mean motion field".into())
    })?;
    field.trim().parse::<f64>().map_err(|e| {
        OrbitError::MalformedElementSet(format!("mean motion {:?}: {}", field.trim(), e))
    })
}

/// Modulo-10 sum of digits, with '-' counting as one.
pub fn checksum(line: &str) -> u32 {
    line.chars()
        .take(68)
        .map(|c| match c {
            '0'..='9' => c.to_digit(10).unwrap_or(0),
            '-' => 1,
            _ => 0,
        })
        .sum::<u32>()
        % 10
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub const ISS_NAME: &str = "ISS (ZARYA)";
    pub const ISS_LINE1: &str =
        "1 25544U 98067A   25277.85315669  .00012686  00000+0  23245-3 0  9997";
    pub const ISS_LINE2: &str =
        "2 25544  51.6326 123.5365 0000933 203.2133 156.8813 15.49682341532172";

    /// Low, high-drag object; SGP4 leaves its valid range within days of epoch.
    pub const DECAYING_LINE1: &str =
        "1 39999U 98067ZZ  25277.85315669  .00500000  00000-0  50000-0 0  9995";
    pub const DECAYING_LINE2: &str =
        "2 39999  51.6000  10.0000 0005000 100.0000 200.0000 16.40000000 12343";

    const FIFTEEN_REV_LINE1: &str =
        "1 00001U 99025A   25277.85315669  .00000579  00000-0  49569-3 0  9999";
    const FIFTEEN_REV_LINE2: &str =
        "2 00001  51.6326 123.5365 0000933 203.2133 156.8813 15.00000000 12348";

    pub fn iss() -> OrbitalElementSet {
        OrbitalElementSet::parse(Some(ISS_NAME), ISS_LINE1, ISS_LINE2).unwrap()
    }

    #[test]
    fn parses_iss_elements() {
        let set = iss();
        assert_eq!(set.name(), Some(ISS_NAME));
        assert_eq!(set.norad_id(), 25544);
        assert!((set.inclination_deg() - 51.6326).abs() < 1e-9);
        assert!((set.eccentricity() - 0.0000933).abs() < 1e-12);
        assert!((set.mean_motion() - 15.49682341).abs() < 1e-9);
    }

    #[test]
    fn period_is_minutes_per_day_over_mean_motion() {
        let set = OrbitalElementSet::parse(None, FIFTEEN_REV_LINE1, FIFTEEN_REV_LINE2).unwrap();
        assert_eq!(set.period_minutes(), 96.0);
        assert_eq!(period_from_mean_motion(15.0), 96.0);
    }

    #[test]
    fn iss_orbit_sits_in_low_earth_orbit() {
        let set = iss();
        let a = set.semi_major_axis_km();
        assert!(a > 6700.0 && a < 6850.0, "semi-major axis {}", a);
        assert!(set.perigee_altitude_km() <= set.apogee_altitude_km());
    }

    #[test]
    fn rejects_wrong_line_prefixes() {
        let err = OrbitalElementSet::parse(None, ISS_LINE2, ISS_LINE1).unwrap_err();
        assert!(matches!(err, OrbitError::MalformedElementSet(_)));
    }

    #[test]
    fn rejects_truncated_line() {
        let err = OrbitalElementSet::parse(None, ISS_LINE1, &ISS_LINE2[..40]).unwrap_err();
        assert!(matches!(err, OrbitError::MalformedElementSet(_)));
    }

    #[test]
    fn rejects_garbage_mean_motion() {
        let mut line2 = ISS_LINE2.to_string();
        line2.replace_range(52..63, "15.4x682341");
        let err = OrbitalElementSet::parse(None, ISS_LINE1, &line2).unwrap_err();
        assert!(matches!(err, OrbitError::MalformedElementSet(_)));
    }

    #[test]
    fn parses_three_line_text_block() {
        let text = format!("{}\n{}\n{}\n", ISS_NAME, ISS_LINE1, ISS_LINE2);
        let set = OrbitalElementSet::parse_text(&text).unwrap();
        assert_eq!(set.display_name(), ISS_NAME);

        let unnamed = OrbitalElementSet::parse_text(&format!("{}\n{}", ISS_LINE1, ISS_LINE2))
            .unwrap();
        assert_eq!(unnamed.display_name(), "NORAD 25544");

        assert!(OrbitalElementSet::parse_text(ISS_LINE1).is_err());
    }

    #[test]
    fn line2_round_trip_preserves_derived_quantities() {
        let set = iss();
        let line2 = set.to_line2();
        assert_eq!(line2.len(), 69);
        assert_eq!(line2, ISS_LINE2);

        let reparsed = OrbitalElementSet::parse(None, ISS_LINE1, &line2).unwrap();
        let rel = |a: f64, b: f64| ((a - b) / b).abs();
        assert!(rel(reparsed.period_minutes(), set.period_minutes()) < 1e-6);
        assert!(rel(reparsed.semi_major_axis_km(), set.semi_major_axis_km()) < 1e-6);
    }

    #[test]
    fn checksum_counts_minus_signs() {
        assert_eq!(checksum(ISS_LINE1), 7);
        assert_eq!(checksum(ISS_LINE2), 2);
    }
}
