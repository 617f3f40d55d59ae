use chrono::NaiveDate;
use serde::Serialize;

use super::allocator::{minutes_to_hours, AssigneeKey, Workload};
use super::AllocatorConfig;

/// A day on which one assignee has more work due than fits in a day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverloadWarning {
    pub assignee: AssigneeKey,
    pub assignee_label: String,
    pub date: NaiveDate,
    pub hours: f64,
    pub overage: f64,
}

/// Shop-wide utilization of the theoretical weekly capacity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CapacityGauge {
    pub weekly_capacity_hours: f64,
    pub assigned_hours: f64,
    pub utilization_percent: f64,
}

/// Read model for one row of the workload table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssigneeSummary {
    pub key: AssigneeKey,
    pub label: String,
    pub total_hours: f64,
    pub item_count: usize,
    /// Against one person's weekly capacity. `None` for the unassigned row.
    pub utilization_percent: Option<f64>,
}

fn percent_of(hours: f64, capacity: f64) -> f64 {
    if capacity > 0.0 {
        (hours / capacity * 100.0).min(100.0)
    } else {
        0.0
    }
}

impl AllocatorConfig {
    pub fn weekly_hours_per_person(&self) -> f64 {
        self.daily_capacity_hours * self.working_days_per_week as f64
    }
}

impl Workload {
    /// Every `(assignee, date)` whose hours strictly exceed the daily
    /// capacity, in display order and by date within an assignee.
    pub fn overload_warnings(&self, config: &AllocatorConfig) -> Vec<OverloadWarning> {
        let capacity = config.daily_capacity_hours;
        let capacity_minutes = capacity * 60.0;
        self.ordered_buckets()
            .into_iter()
            .flat_map(|bucket| {
                bucket
                    .daily_minutes
                    .iter()
                    .filter(move |(_, minutes)| **minutes as f64 > capacity_minutes)
                    .map(move |(date, minutes)| {
                        let hours = minutes_to_hours(*minutes);
                        OverloadWarning {
                            assignee: bucket.key,
                            assignee_label: bucket.label.clone(),
                            date: *date,
                            hours,
                            overage: hours - capacity,
                        }
                    })
            })
            .collect()
    }

    pub fn capacity(&self, config: &AllocatorConfig) -> CapacityGauge {
        let weekly_capacity_hours =
            config.weekly_hours_per_person() * self.roster_size().max(1) as f64;
        let assigned_hours = self.assigned_hours();
        CapacityGauge {
            weekly_capacity_hours,
            assigned_hours,
            utilization_percent: percent_of(assigned_hours, weekly_capacity_hours),
        }
    }

    pub fn summaries(&self, config: &AllocatorConfig) -> Vec<AssigneeSummary> {
        let per_person = config.weekly_hours_per_person();
        self.ordered_buckets()
            .into_iter()
            .map(|bucket| AssigneeSummary {
                key: bucket.key,
                label: bucket.label.clone(),
                total_hours: bucket.total_hours(),
                item_count: bucket.items.len(),
                utilization_percent: match bucket.key {
                    AssigneeKey::Unassigned => None,
                    AssigneeKey::Staff(_) => Some(percent_of(bucket.total_hours(), per_person)),
                },
            })
            .collect()
    }
}
