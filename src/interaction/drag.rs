use std::time::Duration;

use chrono::NaiveDate;
use tracing::debug;

use super::throttle::Throttle;
use crate::model::calendar::add_days;
use crate::model::ScheduledFeature;

/// Which part of a bar the pointer grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragEdge {
    /// Start-date handle.
    Leading,
    /// End-date handle.
    Trailing,
    /// The bar body; moves both dates.
    Whole,
}

/// Snapshot taken when a drag starts. Every move is computed against it,
/// never against the previous move.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub feature_id: String,
    pub edge: DragEdge,
    pub anchor_pointer_x: f32,
    pub anchor_start_at: NaiveDate,
    pub anchor_end_at: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

/// Whole days covered by a horizontal pointer delta.
pub fn day_delta(delta_x: f32, day_width: f32) -> i64 {
    if !delta_x.is_finite() || !day_width.is_finite() || day_width <= 0.0 {
        return 0;
    }
    (delta_x / day_width).round() as i64
}

/// New `(start, end)` for a drag of `delta` days on `edge`.
///
/// Resizing never produces less than one day: a leading edge pushed onto
/// or past the end stops at `end - 1 day`, a trailing edge stops at
/// `start + 1 day`. A whole drag is a pure translation.
pub fn propose(
    edge: DragEdge,
    anchor_start: NaiveDate,
    anchor_end: NaiveDate,
    delta: i64,
) -> (NaiveDate, NaiveDate) {
    match edge {
        DragEdge::Leading => {
            let start = add_days(anchor_start, delta).min(add_days(anchor_end, -1));
            (start, anchor_end)
        }
        DragEdge::Trailing => {
            let end = add_days(anchor_end, delta).max(add_days(anchor_start, 1));
            (anchor_start, end)
        }
        DragEdge::Whole => (add_days(anchor_start, delta), add_days(anchor_end, delta)),
    }
}

/// Drag state machine for a single feature.
///
/// Holds an optimistic copy of the feature that follows the pointer while a
/// drag is active. Releasing hands that copy back to the caller to commit;
/// the copy itself is kept as-is whatever the host then does with it.
#[derive(Debug, Clone)]
pub struct DragController {
    feature: ScheduledFeature,
    state: DragState,
    throttle: Throttle<f32>,
}

impl DragController {
    pub fn new(feature: ScheduledFeature) -> Self {
        Self {
            feature,
            state: DragState::Idle,
            throttle: Throttle::default(),
        }
    }

    /// The locally displayed feature, including any in-flight drag.
    pub fn feature(&self) -> &ScheduledFeature {
        &self.feature
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            DragState::Dragging(session) => Some(session),
            DragState::Idle => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Take a fresh copy from the host. While dragging, the local dates win
    /// and only the other fields are refreshed.
    pub fn sync(&mut self, feature: ScheduledFeature) {
        if self.is_dragging() {
            let (start, end) = (self.feature.start_at(), self.feature.end_at());
            self.feature = feature;
            self.feature.item.set_span(start, end);
        } else {
            self.feature = feature;
        }
    }

    /// Start a drag. Ignored (returns `false`) if one is already running.
    pub fn begin(&mut self, edge: DragEdge, pointer_x: f32) -> bool {
        if self.is_dragging() {
            return false;
        }
        let session = DragSession {
            feature_id: self.feature.id().to_string(),
            edge,
            anchor_pointer_x: pointer_x,
            anchor_start_at: self.feature.start_at(),
            anchor_end_at: self.feature.end_at(),
        };
        debug!(feature = %session.feature_id, ?edge, "drag started");
        self.throttle.cancel();
        self.state = DragState::Dragging(session);
        true
    }

    /// Throttled pointer move. Returns `true` when the local dates changed.
    pub fn drag_to(&mut self, pointer_x: f32, day_width: f32, now: Duration) -> bool {
        if !self.is_dragging() {
            return false;
        }
        match self.throttle.offer(pointer_x, now) {
            Some(x) => self.apply(x, day_width),
            None => false,
        }
    }

    /// Apply a parked move once the throttle interval has passed.
    pub fn flush(&mut self, day_width: f32, now: Duration) -> bool {
        if !self.is_dragging() {
            return false;
        }
        match self.throttle.poll(now) {
            Some(x) => self.apply(x, day_width),
            None => false,
        }
    }

    pub fn has_pending_move(&self) -> bool {
        self.throttle.has_pending()
    }

    /// End the drag at `pointer_x` and return the feature to commit.
    ///
    /// Always returns the feature when a drag was active, even when it ends
    /// where it started.
    pub fn release(&mut self, pointer_x: f32, day_width: f32) -> Option<ScheduledFeature> {
        if !self.is_dragging() {
            return None;
        }
        self.throttle.cancel();
        self.apply(pointer_x, day_width);
        self.state = DragState::Idle;
        debug!(
            feature = %self.feature.id(),
            start = %self.feature.start_at(),
            end = %self.feature.end_at(),
            "drag committed"
        );
        Some(self.feature.clone())
    }

    /// Abandon the drag and put the dates back where they were.
    pub fn cancel(&mut self) -> bool {
        self.throttle.cancel();
        match std::mem::take(&mut self.state) {
            DragState::Dragging(session) => {
                self.feature
                    .item
                    .set_span(session.anchor_start_at, session.anchor_end_at);
                debug!(feature = %session.feature_id, "drag cancelled");
                true
            }
            DragState::Idle => false,
        }
    }

    fn apply(&mut self, pointer_x: f32, day_width: f32) -> bool {
        let DragState::Dragging(session) = &self.state else {
            return false;
        };
        let delta = day_delta(pointer_x - session.anchor_pointer_x, day_width);
        let (start, end) = propose(
            session.edge,
            session.anchor_start_at,
            session.anchor_end_at,
            delta,
        );
        if start == self.feature.start_at() && end == self.feature.end_at() {
            return false;
        }
        self.feature.item.set_span(start, end);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::calendar::days_between;
    use crate::model::TimelineItem;
    use proptest::prelude::*;

    const DAY: f32 = 40.0;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn feature() -> ScheduledFeature {
        ScheduledFeature::new(TimelineItem::new(
            "ord-1",
            "Wedding suit",
            date(2024, 1, 5),
            date(2024, 1, 7),
        ))
    }

    fn edge_strategy() -> impl Strategy<Value = DragEdge> {
        prop_oneof![
            Just(DragEdge::Leading),
            Just(DragEdge::Trailing),
            Just(DragEdge::Whole),
        ]
    }

    #[test]
    fn day_delta_rounds_to_nearest_day() {
        assert_eq!(day_delta(0.0, DAY), 0);
        assert_eq!(day_delta(19.0, DAY), 0);
        assert_eq!(day_delta(21.0, DAY), 1);
        assert_eq!(day_delta(-61.0, DAY), -2);
        assert_eq!(day_delta(100.0, 0.0), 0);
    }

    #[test]
    fn leading_edge_crossing_the_end_clamps_to_one_day() {
        let (start, end) = propose(DragEdge::Leading, date(2024, 1, 5), date(2024, 1, 7), 10);
        assert_eq!(start, date(2024, 1, 6));
        assert_eq!(end, date(2024, 1, 7));
    }

    #[test]
    fn trailing_edge_crossing_the_start_clamps_to_one_day() {
        let (start, end) = propose(DragEdge::Trailing, date(2024, 1, 5), date(2024, 1, 7), -9);
        assert_eq!(start, date(2024, 1, 5));
        assert_eq!(end, date(2024, 1, 6));
    }

    #[test]
    fn whole_drag_keeps_duration_and_is_not_clamped_to_any_range() {
        let (start, end) = propose(DragEdge::Whole, date(2024, 1, 5), date(2024, 1, 7), -400);
        assert_eq!(days_between(start, end), 2);
        assert_eq!(start, date(2022, 12, 1));
    }

    #[test]
    fn release_commits_the_dragged_dates() {
        let mut drag = DragController::new(feature());
        assert!(drag.begin(DragEdge::Trailing, 100.0));
        assert!(drag.drag_to(180.0, DAY, ms(0)));
        let committed = drag.release(220.0, DAY).unwrap();
        assert_eq!(committed.id(), "ord-1");
        assert_eq!(committed.label(), "Wedding suit");
        assert_eq!(committed.end_at(), date(2024, 1, 10));
        assert!(!drag.is_dragging());
        // optimistic copy stays put
        assert_eq!(drag.feature().end_at(), date(2024, 1, 10));
    }

    #[test]
    fn zero_delta_release_still_commits() {
        let mut drag = DragController::new(feature());
        drag.begin(DragEdge::Whole, 50.0);
        let committed = drag.release(55.0, DAY).unwrap();
        assert_eq!(committed, feature());
    }

    #[test]
    fn second_begin_while_dragging_is_ignored() {
        let mut drag = DragController::new(feature());
        assert!(drag.begin(DragEdge::Leading, 0.0));
        assert!(!drag.begin(DragEdge::Whole, 500.0));
        assert_eq!(drag.session().unwrap().edge, DragEdge::Leading);
    }

    #[test]
    fn moves_inside_the_throttle_window_wait_for_flush() {
        let mut drag = DragController::new(feature());
        drag.begin(DragEdge::Whole, 0.0);
        assert!(drag.drag_to(40.0, DAY, ms(0)));
        assert!(!drag.drag_to(120.0, DAY, ms(5)));
        assert_eq!(drag.feature().start_at(), date(2024, 1, 6));
        assert!(drag.has_pending_move());
        assert!(!drag.flush(DAY, ms(10)));
        assert!(drag.flush(DAY, ms(16)));
        assert_eq!(drag.feature().start_at(), date(2024, 1, 8));
    }

    #[test]
    fn release_drops_any_parked_move() {
        let mut drag = DragController::new(feature());
        drag.begin(DragEdge::Whole, 0.0);
        drag.drag_to(40.0, DAY, ms(0));
        drag.drag_to(400.0, DAY, ms(1));
        let committed = drag.release(80.0, DAY).unwrap();
        assert_eq!(committed.start_at(), date(2024, 1, 7));
        assert!(!drag.has_pending_move());
        assert!(!drag.flush(DAY, ms(1_000)));
        assert_eq!(drag.feature().start_at(), date(2024, 1, 7));
    }

    #[test]
    fn cancel_restores_the_anchor_dates() {
        let mut drag = DragController::new(feature());
        drag.begin(DragEdge::Leading, 0.0);
        drag.drag_to(-80.0, DAY, ms(0));
        assert_eq!(drag.feature().start_at(), date(2024, 1, 3));
        assert!(drag.cancel());
        assert_eq!(drag.feature(), &feature());
        assert!(drag.release(0.0, DAY).is_none());
    }

    #[test]
    fn sync_during_drag_keeps_local_dates() {
        let mut drag = DragController::new(feature());
        drag.begin(DragEdge::Whole, 0.0);
        drag.drag_to(40.0, DAY, ms(0));
        let mut refreshed = feature();
        refreshed.item.label = "Wedding suit (rush)".into();
        drag.sync(refreshed);
        assert_eq!(drag.feature().label(), "Wedding suit (rush)");
        assert_eq!(drag.feature().start_at(), date(2024, 1, 6));
    }

    proptest! {
        #[test]
        fn span_stays_at_least_one_day_through_any_drag(
            drags in proptest::collection::vec(
                (edge_strategy(), proptest::collection::vec(-2_000.0f32..2_000.0, 1..12)),
                1..8,
            ),
        ) {
            let mut drag = DragController::new(feature());
            let mut now = 0u64;
            for (edge, moves) in drags {
                drag.begin(edge, 0.0);
                for x in &moves {
                    now += 7;
                    drag.drag_to(*x, DAY, ms(now));
                    drag.flush(DAY, ms(now));
                    let f = drag.feature();
                    prop_assert!(days_between(f.start_at(), f.end_at()) >= 1);
                }
                let last = *moves.last().unwrap();
                let committed = drag.release(last, DAY).unwrap();
                prop_assert!(days_between(committed.start_at(), committed.end_at()) >= 1);
            }
        }

        #[test]
        fn whole_drag_shifts_both_dates_by_exactly_n_days(n in -3_000i64..3_000) {
            let (start, end) = propose(DragEdge::Whole, date(2024, 1, 5), date(2024, 1, 7), n);
            prop_assert_eq!(days_between(date(2024, 1, 5), start), n);
            prop_assert_eq!(days_between(date(2024, 1, 7), end), n);
        }

        #[test]
        fn leading_drag_never_inverts(n in -500i64..500) {
            let (start, end) = propose(DragEdge::Leading, date(2024, 1, 5), date(2024, 1, 7), n);
            prop_assert!(start < end);
            if n >= 2 {
                prop_assert_eq!(start, date(2024, 1, 6));
            }
        }
    }
}
