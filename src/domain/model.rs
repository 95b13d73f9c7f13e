use serde::{Deserialize, Serialize};

/// Specific volumes of the saturated liquid and vapor phases at one pressure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeResult {
    pub specific_volume_liquid: f64,
    pub specific_volume_vapor: f64,
}
