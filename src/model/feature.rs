use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::calendar::{add_days, days_between};

/// The core of anything drawn as a bar on the timeline.
///
/// `end_at` is always at least one day after `start_at`; every constructor
/// and mutator clamps rather than rejects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ItemRecord")]
pub struct TimelineItem {
    pub id: String,
    pub label: String,
    start_at: NaiveDate,
    end_at: NaiveDate,
}

/// Unchecked wire shape; normalized on the way in.
#[derive(Deserialize)]
struct ItemRecord {
    id: String,
    label: String,
    start_at: NaiveDate,
    end_at: NaiveDate,
}

impl From<ItemRecord> for TimelineItem {
    fn from(record: ItemRecord) -> Self {
        TimelineItem::new(record.id, record.label, record.start_at, record.end_at)
    }
}

impl TimelineItem {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        start_at: NaiveDate,
        end_at: NaiveDate,
    ) -> Self {
        let mut item = Self {
            id: id.into(),
            label: label.into(),
            start_at,
            end_at,
        };
        item.set_span(start_at, end_at);
        item
    }

    pub fn start_at(&self) -> NaiveDate {
        self.start_at
    }

    pub fn end_at(&self) -> NaiveDate {
        self.end_at
    }

    /// Length in days, never less than one.
    pub fn duration_days(&self) -> i64 {
        days_between(self.start_at, self.end_at)
    }

    /// Replace both dates; a degenerate span keeps the start and gets a
    /// one-day end.
    pub fn set_span(&mut self, start_at: NaiveDate, end_at: NaiveDate) {
        self.start_at = start_at;
        self.end_at = end_at.max(add_days(start_at, 1));
    }
}

/// Colored status pill shown on a bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBadge {
    pub color: [u8; 3],
    pub label: String,
}

/// Who the feature belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: String,
    pub label: String,
}

/// A renderable, draggable timeline row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledFeature {
    #[serde(flatten)]
    pub item: TimelineItem,
    #[serde(default)]
    pub status: Option<StatusBadge>,
    #[serde(default)]
    pub owner: Option<Owner>,
}

impl ScheduledFeature {
    pub fn new(item: TimelineItem) -> Self {
        Self {
            item,
            status: None,
            owner: None,
        }
    }

    pub fn with_status(mut self, status: StatusBadge) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_owner(mut self, owner: Owner) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn id(&self) -> &str {
        &self.item.id
    }

    pub fn label(&self) -> &str {
        &self.item.label
    }

    pub fn start_at(&self) -> NaiveDate {
        self.item.start_at()
    }

    pub fn end_at(&self) -> NaiveDate {
        self.item.end_at()
    }
}

/// A non-interactive vertical line on the timeline, e.g. "Today".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub id: String,
    pub date: NaiveDate,
    pub label: String,
}

impl Marker {
    pub fn today(date: NaiveDate) -> Self {
        Self {
            id: "today".to_string(),
            date,
            label: "Today".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_item_enforces_one_day_minimum() {
        let same_day = TimelineItem::new("a", "A", date(2024, 1, 5), date(2024, 1, 5));
        assert_eq!(same_day.end_at(), date(2024, 1, 6));

        let inverted = TimelineItem::new("b", "B", date(2024, 1, 5), date(2024, 1, 1));
        assert_eq!(inverted.start_at(), date(2024, 1, 5));
        assert_eq!(inverted.duration_days(), 1);
    }

    #[test]
    fn deserializing_normalizes_degenerate_spans() {
        let json = r#"{"id":"x","label":"Hem","start_at":"2024-03-02","end_at":"2024-03-01","status":null}"#;
        let feature: ScheduledFeature = serde_json::from_str(json).unwrap();
        assert_eq!(feature.start_at(), date(2024, 3, 2));
        assert_eq!(feature.end_at(), date(2024, 3, 3));
        assert!(feature.owner.is_none());
    }
}
