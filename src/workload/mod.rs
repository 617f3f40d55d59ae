//! Who is doing what, by when, and whether it fits.

pub mod allocator;
pub mod capacity;
pub mod timeline;

use serde::{Deserialize, Serialize};

pub use allocator::{
    allocate, rank_unassigned, AssigneeBucket, AssigneeKey, WorkItem, Workload, UNASSIGNED_LABEL,
};
pub use capacity::{AssigneeSummary, CapacityGauge, OverloadWarning};
pub use timeline::{apply_feature_update, feature_for_order, overload_markers, scheduled_features};

/// Capacity assumptions for [`allocate`] and the analyses on [`Workload`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AllocatorConfig {
    pub daily_capacity_hours: f64,
    pub working_days_per_week: u32,
    /// Used for line items with no estimate.
    pub default_estimate_minutes: u32,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            daily_capacity_hours: 8.0,
            working_days_per_week: 5,
            default_estimate_minutes: 60,
        }
    }
}
