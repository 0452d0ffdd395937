use serde::{Deserialize, Serialize};
use tracing::warn;

/// A caller-supplied option that was structurally invalid and got replaced.
///
/// Bad tuning never fails a run; it is corrected to the nearest valid value
/// and reported here so calibration runs can spot it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfigAdjustment {
    pub option: String,
    pub requested: String,
    pub applied: String,
    pub reason: String,
}

impl ConfigAdjustment {
    /// Build an adjustment and log it.
    pub fn record(
        option: &str,
        requested: impl ToString,
        applied: impl ToString,
        reason: &str,
    ) -> Self {
        let adjustment = Self {
            option: option.to_string(),
            requested: requested.to_string(),
            applied: applied.to_string(),
            reason: reason.to_string(),
        };
        warn!(
            option = %adjustment.option,
            requested = %adjustment.requested,
            applied = %adjustment.applied,
            "{}",
            adjustment.reason
        );
        adjustment
    }
}

impl std::fmt::Display for ConfigAdjustment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} -> {} ({})",
            self.option, self.requested, self.applied, self.reason
        )
    }
}
