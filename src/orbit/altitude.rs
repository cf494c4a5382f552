use serde::{Deserialize, Serialize};
use strum_macros::Display;
use utoipa::ToSchema;

/// Fixed low-Earth-orbit altitude bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AltitudeBand {
    #[strum(to_string = "160-528 km")]
    Band160To528,
    #[strum(to_string = "528-896 km")]
    Band528To896,
    #[strum(to_string = "896-1264 km")]
    Band896To1264,
    #[strum(to_string = "1264-1632 km")]
    Band1264To1632,
    #[strum(to_string = "1632-2000 km")]
    Band1632To2000,
    #[strum(to_string = "Out of range")]
    OutOfRange,
}

impl AltitudeBand {
    pub const IN_RANGE: [AltitudeBand; 5] = [
        AltitudeBand::Band160To528,
        AltitudeBand::Band528To896,
        AltitudeBand::Band896To1264,
        AltitudeBand::Band1264To1632,
        AltitudeBand::Band1632To2000,
    ];

    /// Lower bounds are inclusive; upper bounds are exclusive except 2000 km.
    pub fn classify(altitude_km: f64) -> Self {
        match altitude_km {
            a if (160.0..528.0).contains(&a) => AltitudeBand::Band160To528,
            a if (528.0..896.0).contains(&a) => AltitudeBand::Band528To896,
            a if (896.0..1264.0).contains(&a) => AltitudeBand::Band896To1264,
            a if (1264.0..1632.0).contains(&a) => AltitudeBand::Band1264To1632,
            a if (1632.0..=2000.0).contains(&a) => AltitudeBand::Band1632To2000,
            _ => AltitudeBand::OutOfRange,
        }
    }

    /// 0-4 for the bands, -1 when out of range.
    pub fn index(self) -> i8 {
        match self {
            AltitudeBand::Band160To528 => 0,
            AltitudeBand::Band528To896 => 1,
            AltitudeBand::Band896To1264 => 2,
            AltitudeBand::Band1264To1632 => 3,
            AltitudeBand::Band1632To2000 => 4,
            AltitudeBand::OutOfRange => -1,
        }
    }

    pub fn from_index(index: i64) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::IN_RANGE.get(i).copied())
    }

    pub fn label(self) -> String {
        self.to_string()
    }

    pub fn is_in_range(self) -> bool {
        self != AltitudeBand::OutOfRange
    }
}

/// Which debris a catalog load keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BandFilter {
    #[default]
    AllBands,
    SpecificBand(AltitudeBand),
}

impl BandFilter {
    pub fn admits(self, band: AltitudeBand) -> bool {
        match self {
            BandFilter::AllBands => true,
            BandFilter::SpecificBand(wanted) => wanted == band,
        }
    }

    /// Filter matching the band an object currently flies in. Objects
    /// outside every band get compared against the whole catalog.
    pub fn same_band_as(band: AltitudeBand) -> Self {
        if band.is_in_range() {
            BandFilter::SpecificBand(band)
        } else {
            BandFilter::AllBands
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_boundaries() {
        let cases = [
            (159.999, -1),
            (160.0, 0),
            (527.999, 0),
            (528.0, 1),
            (895.999, 1),
            (896.0, 2),
            (1263.999, 2),
            (1264.0, 3),
            (1632.0, 4),
            (2000.0, 4),
            (2000.001, -1),
        ];
        for (alt, index) in cases {
            assert_eq!(AltitudeBand::classify(alt).index(), index, "altitude {}", alt);
        }
    }

    #[test]
    fn nan_and_negative_are_out_of_range() {
        assert_eq!(AltitudeBand::classify(f64::NAN), AltitudeBand::OutOfRange);
        assert_eq!(AltitudeBand::classify(-50.0), AltitudeBand::OutOfRange);
    }

    #[test]
    fn labels() {
        assert_eq!(AltitudeBand::Band528To896.label(), "528-896 km");
        assert_eq!(AltitudeBand::OutOfRange.label(), "Out of range");
    }

    #[test]
    fn index_round_trip() {
        for band in AltitudeBand::IN_RANGE {
            assert_eq!(AltitudeBand::from_index(band.index() as i64), Some(band));
        }
        assert_eq!(AltitudeBand::from_index(-1), None);
        assert_eq!(AltitudeBand::from_index(5), None);
    }

    #[test]
    fn filter_admission() {
        let filter = BandFilter::SpecificBand(AltitudeBand::Band160To528);
        assert!(filter.admits(AltitudeBand::Band160To528));
        assert!(!filter.admits(AltitudeBand::OutOfRange));
        assert!(BandFilter::AllBands.admits(AltitudeBand::OutOfRange));
        assert_eq!(
            BandFilter::same_band_as(AltitudeBand::OutOfRange),
            BandFilter::AllBands
        );
    }
}
