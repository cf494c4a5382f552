pub(crate) mod catalog;
mod proximity;
mod screening;

pub use catalog::{
    BandCount, BandSummary, CatalogLoadReport, DebrisCatalog, DebrisRecord, ElementCatalog,
    SkipReason, SkippedRecord,
};
pub use proximity::{analyze, ClosestApproach, CollisionEvent, ProximityResult};
pub use screening::{screen, Screening, ScreeningParams, DEFAULT_MAX_STEPS};
