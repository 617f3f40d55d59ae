//! Bridges between shop orders and timeline features.

use std::collections::BTreeMap;

use uuid::Uuid;

use super::allocator::unknown_staff_label;
use super::capacity::OverloadWarning;
use crate::model::calendar::add_days;
use crate::model::{Marker, Order, Owner, ScheduledFeature, StaffMember, StatusBadge, TimelineItem};

/// One bar per open, dated order, ordered by due date (ties keep input
/// order). Orders without a start date get a one-day bar ending on the
/// due date.
pub fn scheduled_features(orders: &[Order], roster: &[StaffMember]) -> Vec<ScheduledFeature> {
    let mut open: Vec<&Order> = orders.iter().filter(|o| o.counts_toward_workload()).collect();
    open.sort_by_key(|o| o.due_date);
    open.into_iter()
        .filter_map(|order| feature_for_order(order, roster))
        .collect()
}

pub fn feature_for_order(order: &Order, roster: &[StaffMember]) -> Option<ScheduledFeature> {
    let due = order.due_date?;
    let start = order
        .start_date
        .filter(|start| *start < due)
        .unwrap_or_else(|| add_days(due, -1));
    let item = TimelineItem::new(
        order.id.to_string(),
        format!("{} · {}", order.reference, order.customer),
        start,
        due,
    );
    let mut feature = ScheduledFeature::new(item).with_status(StatusBadge {
        color: order.status.color(),
        label: order.status.label().to_string(),
    });
    if let Some(staff_id) = order.line_items.iter().find_map(|line| line.assignee_id) {
        let label = roster
            .iter()
            .find(|staff| staff.id == staff_id)
            .map(|staff| staff.name.clone())
            .unwrap_or_else(|| unknown_staff_label(staff_id));
        feature = feature.with_owner(Owner {
            id: staff_id.to_string(),
            label,
        });
    }
    Some(feature)
}

/// One marker per overloaded date, naming everyone over capacity that day.
pub fn overload_markers(warnings: &[OverloadWarning]) -> Vec<Marker> {
    let mut by_date: BTreeMap<_, Vec<&str>> = BTreeMap::new();
    for warning in warnings {
        by_date
            .entry(warning.date)
            .or_default()
            .push(warning.assignee_label.as_str());
    }
    by_date
        .into_iter()
        .map(|(date, names)| Marker {
            id: format!("overload-{date}"),
            date,
            label: format!("Over capacity: {}", names.join(", ")),
        })
        .collect()
}

/// Write a committed drag back onto its order. Returns the order's id when
/// one matched.
pub fn apply_feature_update(orders: &mut [Order], feature: &ScheduledFeature) -> Option<Uuid> {
    let id = Uuid::parse_str(feature.id()).ok()?;
    let order = orders.iter_mut().find(|order| order.id == id)?;
    order.start_date = Some(feature.start_at());
    order.due_date = Some(feature.end_at());
    Some(order.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LineItem, OrderStatus};
    use crate::workload::allocator::AssigneeKey;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn features_are_ordered_by_due_date_and_skip_closed_orders() {
        let orders = vec![
            Order::new("ORD-3", "C").due(date(2024, 3, 1)),
            Order::new("ORD-1", "A").due(date(2024, 1, 5)).starting(date(2024, 1, 2)),
            Order::new("ORD-2", "B")
                .due(date(2024, 2, 1))
                .with_status(OrderStatus::Delivered),
            Order::new("ORD-4", "D"),
        ];
        let features = scheduled_features(&orders, &[]);
        let labels: Vec<_> = features.iter().map(|f| f.label()).collect();
        assert_eq!(labels, ["ORD-1 · A", "ORD-3 · C"]);
        assert_eq!(features[0].start_at(), date(2024, 1, 2));
        assert_eq!(features[1].start_at(), date(2024, 2, 29));
        assert_eq!(features[1].end_at(), date(2024, 3, 1));
    }

    #[test]
    fn start_on_or_after_due_falls_back_to_one_day() {
        let order = Order::new("ORD-1", "A")
            .due(date(2024, 1, 5))
            .starting(date(2024, 1, 9));
        let feature = feature_for_order(&order, &[]).unwrap();
        assert_eq!(feature.start_at(), date(2024, 1, 4));
        assert_eq!(feature.end_at(), date(2024, 1, 5));
    }

    #[test]
    fn owner_and_status_come_from_the_order() {
        let staff = StaffMember::new("Mara");
        let order = Order::new("ORD-1", "A")
            .with_status(OrderStatus::Fitting)
            .due(date(2024, 1, 5))
            .with_item(LineItem::new("cut"))
            .with_item(LineItem::new("sew").assigned_to(staff.id));
        let feature = feature_for_order(&order, &[staff.clone()]).unwrap();
        let owner = feature.owner.unwrap();
        assert_eq!(owner.label, "Mara");
        assert_eq!(owner.id, staff.id.to_string());
        assert_eq!(feature.status.unwrap().label, OrderStatus::Fitting.label());
    }

    #[test]
    fn overload_markers_merge_assignees_on_the_same_day() {
        let warning = |label: &str, d: u32| OverloadWarning {
            assignee: AssigneeKey::Unassigned,
            assignee_label: label.into(),
            date: date(2024, 1, d),
            hours: 9.0,
            overage: 1.0,
        };
        let markers = overload_markers(&[warning("A", 12), warning("B", 10), warning("C", 12)]);
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].date, date(2024, 1, 10));
        assert_eq!(markers[1].label, "Over capacity: A, C");
    }

    #[test]
    fn committed_drag_is_written_back() {
        let mut orders = vec![Order::new("ORD-1", "A").due(date(2024, 1, 5))];
        let mut feature = feature_for_order(&orders[0], &[]).unwrap();
        feature.item.set_span(date(2024, 1, 8), date(2024, 1, 11));
        assert_eq!(apply_feature_update(&mut orders, &feature), Some(orders[0].id));
        assert_eq!(orders[0].start_date, Some(date(2024, 1, 8)));
        assert_eq!(orders[0].due_date, Some(date(2024, 1, 11)));

        let stranger = ScheduledFeature::new(TimelineItem::new(
            "not-a-uuid",
            "x",
            date(2024, 1, 1),
            date(2024, 1, 2),
        ));
        assert_eq!(apply_feature_update(&mut orders, &stranger), None);
    }
}
