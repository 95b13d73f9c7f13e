use crate::domain::model::VolumeResult;
use crate::utils::error::{ApiError, Result};

/// Lowest pressure for which the linear approximation holds.
pub const MIN_PRESSURE: f64 = 0.05;
/// Highest pressure for which the linear approximation holds. Both phases
/// share the same specific volume here.
pub const MAX_PRESSURE: f64 = 10.0;

const LIQUID_SLOPE: f64 = 2450.0;
const LIQUID_INTERCEPT: f64 = 10325.0;
const VAPOR_SLOPE: f64 = 29_996_500.0;
const VAPOR_INTERCEPT: f64 = 299_999_825.0;
const DENOMINATOR: f64 = 9_950_000.0;

/// Parses the raw `pressure` query value.
pub fn parse_pressure(raw: Option<&str>) -> Result<f64> {
    raw.filter(|s| !s.is_empty())
        .ok_or(ApiError::InvalidPressureFormat)?
        .parse::<f64>()
        .map_err(|_| ApiError::InvalidPressureFormat)
}

/// Evaluates the liquid and vapor specific volumes at `pressure`.
///
/// Fails with [`ApiError::InvalidPressure`] outside `[MIN_PRESSURE, MAX_PRESSURE]`.
/// NaN and infinities are never inside the range.
pub fn get_volumes(pressure: f64) -> Result<VolumeResult> {
    if !(MIN_PRESSURE..=MAX_PRESSURE).contains(&pressure) {
        return Err(ApiError::InvalidPressure { value: pressure });
    }

    Ok(VolumeResult {
        specific_volume_liquid: (LIQUID_SLOPE * pressure + LIQUID_INTERCEPT) / DENOMINATOR,
        specific_volume_vapor: (VAPOR_INTERCEPT - VAPOR_SLOPE * pressure) / DENOMINATOR,
    })
}
