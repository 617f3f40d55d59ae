use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use super::AllocatorConfig;
use crate::model::{Order, StaffMember};

pub const UNASSIGNED_LABEL: &str = "Unassigned";

/// Bucket key. `Unassigned` is the reserved bucket for work nobody owns yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum AssigneeKey {
    Unassigned,
    Staff(Uuid),
}

impl AssigneeKey {
    pub fn staff_id(self) -> Option<Uuid> {
        match self {
            AssigneeKey::Unassigned => None,
            AssigneeKey::Staff(id) => Some(id),
        }
    }
}

impl From<Option<Uuid>> for AssigneeKey {
    fn from(id: Option<Uuid>) -> Self {
        id.map_or(AssigneeKey::Unassigned, AssigneeKey::Staff)
    }
}

/// One line item flattened out of its order, with its estimate resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkItem {
    pub item_id: Uuid,
    pub parent_order_id: Uuid,
    pub order_reference: String,
    pub label: String,
    pub estimated_minutes: u32,
    pub due_date: Option<NaiveDate>,
    pub assignee_id: Option<Uuid>,
    pub assignee_label: String,
}

/// Everything attributed to one assignee.
#[derive(Debug, Clone, PartialEq)]
pub struct AssigneeBucket {
    pub key: AssigneeKey,
    pub label: String,
    pub total_minutes: u64,
    pub items: Vec<WorkItem>,
    /// Minutes keyed by the owning order's due date.
    pub daily_minutes: BTreeMap<NaiveDate, u64>,
}

impl AssigneeBucket {
    pub fn new(key: AssigneeKey, label: impl Into<String>) -> Self {
        Self {
            key,
            label: label.into(),
            total_minutes: 0,
            items: Vec::new(),
            daily_minutes: BTreeMap::new(),
        }
    }

    pub fn total_hours(&self) -> f64 {
        minutes_to_hours(self.total_minutes)
    }

    pub fn hours_on(&self, date: NaiveDate) -> f64 {
        self.daily_minutes
            .get(&date)
            .map_or(0.0, |m| minutes_to_hours(*m))
    }

    fn add(&mut self, item: WorkItem, due: NaiveDate) {
        let minutes = u64::from(item.estimated_minutes);
        self.total_minutes += minutes;
        *self.daily_minutes.entry(due).or_insert(0) += minutes;
        self.items.push(item);
    }
}

pub(crate) fn minutes_to_hours(minutes: u64) -> f64 {
    minutes as f64 / 60.0
}

/// Result of [`allocate`]: one bucket per roster member, per unknown
/// assignee encountered, and the unassigned bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct Workload {
    pub buckets: BTreeMap<AssigneeKey, AssigneeBucket>,
    roster_order: Vec<Uuid>,
}

impl Workload {
    pub fn bucket(&self, key: AssigneeKey) -> Option<&AssigneeBucket> {
        self.buckets.get(&key)
    }

    pub fn roster_size(&self) -> usize {
        self.roster_order.len()
    }

    /// Unassigned work, most urgent first.
    pub fn unassigned(&self) -> &[WorkItem] {
        self.buckets
            .get(&AssigneeKey::Unassigned)
            .map(|b| b.items.as_slice())
            .unwrap_or(&[])
    }

    /// Hours across every bucket, unassigned included.
    pub fn total_hours(&self) -> f64 {
        minutes_to_hours(self.buckets.values().map(|b| b.total_minutes).sum())
    }

    /// Hours owned by somebody.
    pub fn assigned_hours(&self) -> f64 {
        minutes_to_hours(
            self.buckets
                .values()
                .filter(|b| b.key != AssigneeKey::Unassigned)
                .map(|b| b.total_minutes)
                .sum(),
        )
    }

    /// Roster order first, then assignees missing from the roster, then
    /// the unassigned bucket.
    pub fn ordered_buckets(&self) -> Vec<&AssigneeBucket> {
        let mut ordered: Vec<&AssigneeBucket> = self
            .roster_order
            .iter()
            .filter_map(|id| self.buckets.get(&AssigneeKey::Staff(*id)))
            .collect();
        ordered.extend(self.buckets.values().filter(|b| match b.key {
            AssigneeKey::Staff(id) => !self.roster_order.contains(&id),
            AssigneeKey::Unassigned => false,
        }));
        ordered.extend(self.buckets.get(&AssigneeKey::Unassigned));
        ordered
    }
}

pub(crate) fn unknown_staff_label(id: Uuid) -> String {
    let short: String = id.to_string().chars().take(8).collect();
    format!("Unknown staff ({short})")
}

/// Bucket every line item of every open, dated order by assignee.
///
/// Orders in a terminal status or without a due date contribute nothing.
/// Missing estimates fall back to `config.default_estimate_minutes`.
pub fn allocate(orders: &[Order], roster: &[StaffMember], config: &AllocatorConfig) -> Workload {
    let mut buckets = BTreeMap::new();
    buckets.insert(
        AssigneeKey::Unassigned,
        AssigneeBucket::new(AssigneeKey::Unassigned, UNASSIGNED_LABEL),
    );
    for staff in roster {
        let key = AssigneeKey::Staff(staff.id);
        buckets
            .entry(key)
            .or_insert_with(|| AssigneeBucket::new(key, staff.name.clone()));
    }

    for order in orders.iter().filter(|o| o.counts_toward_workload()) {
        let Some(due) = order.due_date else {
            continue;
        };
        for line in &order.line_items {
            let key = AssigneeKey::from(line.assignee_id);
            let bucket = buckets.entry(key).or_insert_with(|| {
                let id = key.staff_id().unwrap_or_default();
                warn!(order = %order.reference, staff = %id, "line item assigned to staff not on the roster");
                AssigneeBucket::new(key, unknown_staff_label(id))
            });
            let item = WorkItem {
                item_id: line.id,
                parent_order_id: order.id,
                order_reference: order.reference.clone(),
                label: line.label.clone(),
                estimated_minutes: line
                    .estimated_minutes
                    .unwrap_or(config.default_estimate_minutes),
                due_date: Some(due),
                assignee_id: line.assignee_id,
                assignee_label: bucket.label.clone(),
            };
            bucket.add(item, due);
        }
    }

    if let Some(unassigned) = buckets.get_mut(&AssigneeKey::Unassigned) {
        rank_unassigned(&mut unassigned.items);
    }

    let workload = Workload {
        buckets,
        roster_order: roster.iter().map(|s| s.id).collect(),
    };
    debug!(
        buckets = workload.buckets.len(),
        total_hours = workload.total_hours(),
        unassigned = workload.unassigned().len(),
        "workload allocated"
    );
    workload
}

/// Most urgent first: dated items ascending, undated items after them in
/// their original order.
pub fn rank_unassigned(items: &mut [WorkItem]) {
    items.sort_by(|a, b| match (a.due_date, b.due_date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
