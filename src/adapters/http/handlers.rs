use axum::extract::rejection::QueryRejection;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::Json;

use crate::core::formula::{get_volumes, parse_pressure};
use crate::domain::model::VolumeResult;
use crate::utils::error::{ApiError, Result};

pub const PRESSURE_PARAM: &str = "pressure";

/// `GET /phase-change-diagram?pressure=<value>`
pub async fn phase_change_diagram(
    query: std::result::Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<VolumeResult>> {
    let Query(params) = query.map_err(|e| {
        tracing::debug!("Unreadable query string: {}", e);
        ApiError::InvalidPressureFormat
    })?;

    // first occurrence wins when the parameter is repeated
    let raw = params
        .iter()
        .find(|(key, _)| key == PRESSURE_PARAM)
        .map(|(_, value)| value.as_str());

    let pressure = parse_pressure(raw)?;
    let volumes = get_volumes(pressure)?;

    tracing::debug!(
        pressure,
        liquid = volumes.specific_volume_liquid,
        vapor = volumes.specific_volume_vapor,
        "Computed specific volumes"
    );
    Ok(Json(volumes))
}

pub async fn method_not_allowed() -> StatusCode {
    StatusCode::METHOD_NOT_ALLOWED
}
