pub mod collision;
pub mod debris;
pub mod error;
pub mod passes;
pub mod position;

use crate::orbit::OrbitalElementSet;
use error::{ApiError, ApiResult};

/// Element set from the two request lines, both required.
fn element_set(name: Option<&str>, line1: &str, line2: &str) -> ApiResult<OrbitalElementSet> {
    let (line1, line2) = (line1.trim(), line2.trim());
    if line1.is_empty() || line2.is_empty() {
        return Err(ApiError::Validation("TLE lines required".into()));
    }
    Ok(OrbitalElementSet::parse(name, line1, line2)?)
}
