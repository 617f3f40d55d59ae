use std::collections::HashMap;
use std::time::Duration;

use chrono::NaiveDate;
use tracing::debug;

use super::layout::{feature_rows, hit_test, LayoutMetrics, TimelineLayout};
use crate::interaction::{
    DragController, DragEdge, LongPress, PointerEvent, PointerKind, PressOutcome,
};
use crate::model::{CalendarGrid, DateRange, Marker, ScheduledFeature};

/// What the view asks of its host.
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineEvent {
    /// A plain click or tap, or "Open" from the long-press menu.
    Select(String),
    /// A drag finished; persist the new dates.
    Update(ScheduledFeature),
    /// A long press landed on a bar; show a menu at the touch point.
    ContextMenu { feature_id: String, x: f32, y: f32 },
}

/// An open long-press menu.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextMenu {
    pub feature_id: String,
    pub x: f32,
    pub y: f32,
}

/// One press-to-release interaction on one bar.
#[derive(Debug, Clone)]
struct Gesture {
    feature_id: String,
    kind: PointerKind,
    edge: DragEdge,
    origin_x: f32,
    origin_y: f32,
    /// Travel went past the click slop.
    dragged: bool,
    /// Armed for touches on the bar body only.
    press: Option<LongPress>,
    long_pressed: bool,
}

/// The stateful timeline: one drag controller per feature plus the gesture
/// currently in flight.
///
/// Range and zoom are owned by the host and handed in; nothing here is
/// global. Input goes in through [`TimelineView::handle`] (or the
/// per-event methods) and [`TimelineView::tick`]; what the host should do
/// about it comes back as [`TimelineEvent`]s.
#[derive(Debug, Clone)]
pub struct TimelineView {
    grid: CalendarGrid,
    metrics: LayoutMetrics,
    controllers: Vec<DragController>,
    markers: Vec<Marker>,
    gesture: Option<Gesture>,
    context_menu: Option<ContextMenu>,
}

impl TimelineView {
    pub fn new(features: Vec<ScheduledFeature>, grid: CalendarGrid) -> Self {
        Self {
            grid,
            metrics: LayoutMetrics::default(),
            controllers: features.into_iter().map(DragController::new).collect(),
            markers: Vec::new(),
            gesture: None,
            context_menu: None,
        }
    }

    pub fn with_markers(mut self, markers: Vec<Marker>) -> Self {
        self.markers = markers;
        self
    }

    pub fn grid(&self) -> &CalendarGrid {
        &self.grid
    }

    pub fn metrics(&self) -> &LayoutMetrics {
        &self.metrics
    }

    pub fn set_zoom(&mut self, zoom: u32) {
        self.grid.zoom = zoom;
    }

    pub fn set_range(&mut self, range: DateRange) {
        self.grid.range = range;
    }

    pub fn set_markers(&mut self, markers: Vec<Marker>) {
        self.markers = markers;
    }

    /// Features as currently displayed, mid-drag dates included.
    pub fn features(&self) -> Vec<ScheduledFeature> {
        self.controllers.iter().map(|c| c.feature().clone()).collect()
    }

    pub fn feature(&self, id: &str) -> Option<&ScheduledFeature> {
        self.controllers
            .iter()
            .map(DragController::feature)
            .find(|f| f.id() == id)
    }

    /// Replace the features after a host refresh. Controllers are matched
    /// by id; a feature being dragged keeps its local dates until release.
    pub fn set_features(&mut self, features: Vec<ScheduledFeature>) {
        let mut existing: HashMap<String, DragController> = self
            .controllers
            .drain(..)
            .map(|c| (c.feature().id().to_string(), c))
            .collect();
        self.controllers = features
            .into_iter()
            .map(|feature| match existing.remove(feature.id()) {
                Some(mut controller) => {
                    controller.sync(feature);
                    controller
                }
                None => DragController::new(feature),
            })
            .collect();

        let gone = self
            .gesture
            .as_ref()
            .is_some_and(|g| self.controller_index(&g.feature_id).is_none());
        if gone {
            debug!("dragged feature disappeared on refresh; gesture dropped");
            self.gesture = None;
        }
    }

    pub fn layout(&self, today: NaiveDate) -> TimelineLayout {
        TimelineLayout::compute(
            &self.features(),
            &self.grid,
            &self.markers,
            self.metrics,
            today,
        )
    }

    /// A press is in flight; the host should keep calling [`Self::tick`].
    pub fn is_interacting(&self) -> bool {
        self.gesture.is_some()
    }

    /// Id of the feature under an active drag, if any.
    pub fn dragging(&self) -> Option<&str> {
        self.gesture
            .as_ref()
            .filter(|g| g.dragged && !g.long_pressed)
            .map(|g| g.feature_id.as_str())
    }

    pub fn context_menu(&self) -> Option<&ContextMenu> {
        self.context_menu.as_ref()
    }

    pub fn handle(&mut self, event: PointerEvent) -> Vec<TimelineEvent> {
        match event {
            PointerEvent::Down { kind, x, y, at } => self.pointer_down(kind, x, y, at),
            PointerEvent::Move { x, y, at } => self.pointer_move(x, y, at),
            PointerEvent::Up { x, y, at } => self.pointer_up(x, y, at),
            PointerEvent::Cancel { .. } => {
                self.pointer_cancel();
                Vec::new()
            }
        }
    }

    pub fn pointer_down(
        &mut self,
        kind: PointerKind,
        x: f32,
        y: f32,
        at: Duration,
    ) -> Vec<TimelineEvent> {
        // Only one interaction stream is tracked at a time.
        if self.gesture.is_some() {
            return Vec::new();
        }
        self.context_menu = None;

        let features = self.features();
        let rows = feature_rows(&features, &self.grid, &self.metrics);
        let Some((index, edge)) = hit_test(&rows, x, y) else {
            return Vec::new();
        };
        let controller = &mut self.controllers[index];
        if !controller.begin(edge, x) {
            return Vec::new();
        }

        let press = (kind == PointerKind::Touch && edge == DragEdge::Whole)
            .then(|| LongPress::start(x, y, at));
        self.gesture = Some(Gesture {
            feature_id: controller.feature().id().to_string(),
            kind,
            edge,
            origin_x: x,
            origin_y: y,
            dragged: false,
            press,
            long_pressed: false,
        });
        Vec::new()
    }

    pub fn pointer_move(&mut self, x: f32, y: f32, at: Duration) -> Vec<TimelineEvent> {
        let mut events = Vec::new();
        let Some(mut gesture) = self.gesture.take() else {
            return events;
        };

        if let Some(press) = gesture.press.as_mut() {
            press.poll(at);
            match press.on_move(x, y) {
                PressOutcome::Pending => {
                    self.gesture = Some(gesture);
                    return events;
                }
                PressOutcome::LongPress { x, y } => {
                    if !gesture.long_pressed {
                        events.push(self.open_context_menu(&mut gesture, x, y));
                    }
                    self.gesture = Some(gesture);
                    return events;
                }
                PressOutcome::Drag => {}
            }
        }

        let slop = gesture.kind.click_slop();
        if !gesture.dragged
            && ((x - gesture.origin_x).abs() > slop || (y - gesture.origin_y).abs() > slop)
        {
            gesture.dragged = true;
        }
        if gesture.dragged {
            let day_width = self.grid.day_width();
            if let Some(controller) = self.controller_mut(&gesture.feature_id) {
                controller.drag_to(x, day_width, at);
            }
        }
        self.gesture = Some(gesture);
        events
    }

    pub fn pointer_up(&mut self, x: f32, y: f32, at: Duration) -> Vec<TimelineEvent> {
        let mut events = Vec::new();
        let Some(mut gesture) = self.gesture.take() else {
            return events;
        };

        if let Some(press) = gesture.press.as_mut() {
            if let PressOutcome::LongPress { x, y } = press.poll(at) {
                if !gesture.long_pressed {
                    events.push(self.open_context_menu(&mut gesture, x, y));
                }
            }
        }
        if gesture.long_pressed {
            return events;
        }

        let day_width = self.grid.day_width();
        let Some(controller) = self.controller_mut(&gesture.feature_id) else {
            return events;
        };
        if gesture.dragged {
            if let Some(feature) = controller.release(x, day_width) {
                events.push(TimelineEvent::Update(feature));
            }
        } else {
            controller.cancel();
            debug!(feature = %gesture.feature_id, ?gesture.edge, x, y, "bar clicked");
            events.push(TimelineEvent::Select(gesture.feature_id));
        }
        events
    }

    /// Abandon the current press without selecting or committing.
    pub fn pointer_cancel(&mut self) {
        if let Some(gesture) = self.gesture.take() {
            if let Some(controller) = self.controller_mut(&gesture.feature_id) {
                controller.cancel();
            }
        }
    }

    /// Advance timers: flushes throttled moves and fires a due long press.
    pub fn tick(&mut self, now: Duration) -> Vec<TimelineEvent> {
        let mut events = Vec::new();
        let Some(mut gesture) = self.gesture.take() else {
            return events;
        };

        if let Some(press) = gesture.press.as_mut() {
            if let PressOutcome::LongPress { x, y } = press.poll(now) {
                if !gesture.long_pressed {
                    events.push(self.open_context_menu(&mut gesture, x, y));
                }
            }
        }
        if gesture.dragged && !gesture.long_pressed {
            let day_width = self.grid.day_width();
            if let Some(controller) = self.controller_mut(&gesture.feature_id) {
                controller.flush(day_width, now);
            }
        }
        self.gesture = Some(gesture);
        events
    }

    /// "Open" picked from the long-press menu.
    pub fn select_from_context_menu(&mut self) -> Option<TimelineEvent> {
        self.context_menu
            .take()
            .map(|menu| TimelineEvent::Select(menu.feature_id))
    }

    pub fn dismiss_context_menu(&mut self) {
        self.context_menu = None;
    }

    /// Drop every in-flight press, parked move and timer.
    pub fn teardown(&mut self) {
        self.gesture = None;
        self.context_menu = None;
        for controller in &mut self.controllers {
            controller.cancel();
        }
    }

    fn open_context_menu(&mut self, gesture: &mut Gesture, x: f32, y: f32) -> TimelineEvent {
        gesture.long_pressed = true;
        if let Some(controller) = self.controller_mut(&gesture.feature_id) {
            controller.cancel();
        }
        debug!(feature = %gesture.feature_id, "long press");
        self.context_menu = Some(ContextMenu {
            feature_id: gesture.feature_id.clone(),
            x,
            y,
        });
        TimelineEvent::ContextMenu {
            feature_id: gesture.feature_id.clone(),
            x,
            y,
        }
    }

    fn controller_index(&self, id: &str) -> Option<usize> {
        self.controllers.iter().position(|c| c.feature().id() == id)
    }

    fn controller_mut(&mut self, id: &str) -> Option<&mut DragController> {
        self.controllers.iter_mut().find(|c| c.feature().id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TimelineItem;

    // Default metrics put row 0's bar at y 6..30 and row 1's at 42..66.
    const ROW0: f32 = 15.0;
    const ROW1: f32 = 50.0;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn view() -> TimelineView {
        let grid = CalendarGrid::new(DateRange::new(date(2024, 1, 1), date(2024, 1, 31)), 100);
        TimelineView::new(
            vec![
                ScheduledFeature::new(TimelineItem::new(
                    "a",
                    "Alter coat",
                    date(2024, 1, 5),
                    date(2024, 1, 10),
                )),
                ScheduledFeature::new(TimelineItem::new(
                    "b",
                    "Hem trousers",
                    date(2024, 1, 12),
                    date(2024, 1, 14),
                )),
            ],
            grid,
        )
    }

    fn feature_a(view: &TimelineView) -> (NaiveDate, NaiveDate) {
        let f = view.feature("a").unwrap();
        (f.start_at(), f.end_at())
    }

    #[test]
    fn plain_click_selects_without_updating() {
        let mut view = view();
        assert!(view.pointer_down(PointerKind::Mouse, 200.0, ROW0, ms(0)).is_empty());
        view.pointer_move(201.0, ROW0, ms(20));
        let events = view.pointer_up(201.0, ROW0, ms(40));
        assert_eq!(events, vec![TimelineEvent::Select("a".into())]);
        assert_eq!(feature_a(&view), (date(2024, 1, 5), date(2024, 1, 10)));
        assert!(!view.is_interacting());
    }

    #[test]
    fn body_drag_moves_both_dates_and_commits_on_release() {
        let mut view = view();
        view.pointer_down(PointerKind::Mouse, 200.0, ROW0, ms(0));
        view.pointer_move(240.0, ROW0, ms(20));
        assert_eq!(view.dragging(), Some("a"));
        assert_eq!(feature_a(&view), (date(2024, 1, 6), date(2024, 1, 11)));
        let events = view.pointer_up(280.0, ROW0, ms(40));
        match events.as_slice() {
            [TimelineEvent::Update(f)] => {
                assert_eq!(f.id(), "a");
                assert_eq!((f.start_at(), f.end_at()), (date(2024, 1, 7), date(2024, 1, 12)));
            }
            other => panic!("unexpected events {other:?}"),
        }
        assert_eq!(feature_a(&view), (date(2024, 1, 7), date(2024, 1, 12)));
    }

    #[test]
    fn drag_back_to_start_still_commits() {
        let mut view = view();
        view.pointer_down(PointerKind::Mouse, 200.0, ROW0, ms(0));
        view.pointer_move(300.0, ROW0, ms(20));
        let events = view.pointer_up(200.0, ROW0, ms(40));
        assert!(matches!(events.as_slice(), [TimelineEvent::Update(f)] if f.start_at() == date(2024, 1, 5)));
    }

    #[test]
    fn leading_handle_resize_clamps_at_one_day() {
        let mut view = view();
        view.pointer_down(PointerKind::Mouse, 161.0, ROW0, ms(0));
        view.pointer_move(900.0, ROW0, ms(20));
        assert_eq!(feature_a(&view), (date(2024, 1, 9), date(2024, 1, 10)));
        view.pointer_up(900.0, ROW0, ms(40));
    }

    #[test]
    fn drag_continues_when_pointer_leaves_the_bar() {
        let mut view = view();
        view.pointer_down(PointerKind::Mouse, 200.0, ROW0, ms(0));
        view.pointer_move(280.0, 900.0, ms(20));
        let events = view.pointer_up(280.0, 900.0, ms(40));
        assert!(matches!(events.as_slice(), [TimelineEvent::Update(f)] if f.start_at() == date(2024, 1, 7)));
    }

    #[test]
    fn press_during_active_drag_is_ignored() {
        let mut view = view();
        view.pointer_down(PointerKind::Mouse, 200.0, ROW0, ms(0));
        view.pointer_move(240.0, ROW0, ms(20));
        assert!(view.pointer_down(PointerKind::Mouse, 500.0, ROW1, ms(30)).is_empty());
        let events = view.pointer_up(240.0, ROW0, ms(40));
        assert!(matches!(events.as_slice(), [TimelineEvent::Update(f)] if f.id() == "a"));
        assert!(!events.iter().any(|e| matches!(e, TimelineEvent::Select(_))));
    }

    #[test]
    fn rapid_moves_are_throttled_until_tick() {
        let mut view = view();
        view.pointer_down(PointerKind::Mouse, 200.0, ROW0, ms(0));
        view.pointer_move(240.0, ROW0, ms(100));
        view.pointer_move(320.0, ROW0, ms(105));
        assert_eq!(feature_a(&view).0, date(2024, 1, 6));
        view.tick(ms(110));
        assert_eq!(feature_a(&view).0, date(2024, 1, 6));
        view.tick(ms(116));
        assert_eq!(feature_a(&view).0, date(2024, 1, 8));
    }

    #[test]
    fn long_press_opens_menu_without_moving_the_bar() {
        let mut view = view();
        view.pointer_down(PointerKind::Touch, 200.0, ROW0, ms(1_000));
        // jitter inside tolerance would be a one-day nudge if it were applied
        view.pointer_move(209.0, ROW0, ms(1_100));
        assert!(view.tick(ms(1_499)).is_empty());
        let events = view.tick(ms(1_500));
        assert_eq!(
            events,
            vec![TimelineEvent::ContextMenu {
                feature_id: "a".into(),
                x: 200.0,
                y: ROW0
            }]
        );
        view.pointer_move(400.0, ROW0, ms(1_600));
        assert!(view.pointer_up(400.0, ROW0, ms(1_700)).is_empty());
        assert_eq!(feature_a(&view), (date(2024, 1, 5), date(2024, 1, 10)));

        assert_eq!(view.context_menu().map(|m| m.feature_id.as_str()), Some("a"));
        assert_eq!(
            view.select_from_context_menu(),
            Some(TimelineEvent::Select("a".into()))
        );
        assert!(view.context_menu().is_none());
    }

    #[test]
    fn touch_moving_past_tolerance_drags_instead_of_long_pressing() {
        let mut view = view();
        view.pointer_down(PointerKind::Touch, 200.0, ROW0, ms(0));
        view.pointer_move(215.0, ROW0, ms(100));
        view.pointer_move(280.0, ROW0, ms(200));
        assert!(view.tick(ms(700)).is_empty());
        let events = view.pointer_up(280.0, ROW0, ms(800));
        assert!(matches!(events.as_slice(), [TimelineEvent::Update(f)] if f.start_at() == date(2024, 1, 7)));
        assert!(view.context_menu().is_none());
    }

    #[test]
    fn short_tap_selects() {
        let mut view = view();
        view.pointer_down(PointerKind::Touch, 500.0, ROW1, ms(0));
        let events = view.pointer_up(502.0, ROW1, ms(120));
        assert_eq!(events, vec![TimelineEvent::Select("b".into())]);
    }

    #[test]
    fn release_after_the_timer_without_tick_is_still_a_long_press() {
        let mut view = view();
        view.pointer_down(PointerKind::Touch, 200.0, ROW0, ms(0));
        let events = view.pointer_up(200.0, ROW0, ms(650));
        assert!(matches!(events.as_slice(), [TimelineEvent::ContextMenu { .. }]));
    }

    #[test]
    fn touch_on_edge_handle_resizes_without_long_press() {
        let mut view = view();
        view.pointer_down(PointerKind::Touch, 358.0, ROW0, ms(0));
        assert!(view.tick(ms(600)).is_empty());
        view.pointer_move(438.0, ROW0, ms(700));
        let events = view.pointer_up(438.0, ROW0, ms(800));
        assert!(matches!(events.as_slice(), [TimelineEvent::Update(f)] if f.end_at() == date(2024, 1, 12)));
    }

    #[test]
    fn cancel_discards_the_drag() {
        let mut view = view();
        view.pointer_down(PointerKind::Touch, 200.0, ROW0, ms(0));
        view.pointer_move(320.0, ROW0, ms(50));
        assert!(view.handle(PointerEvent::Cancel { at: ms(60) }).is_empty());
        assert_eq!(feature_a(&view), (date(2024, 1, 5), date(2024, 1, 10)));
        assert!(view.tick(ms(2_000)).is_empty());
        assert!(view.pointer_up(320.0, ROW0, ms(2_100)).is_empty());
    }

    #[test]
    fn refresh_mid_drag_keeps_local_dates_and_drops_missing_features() {
        let mut view = view();
        view.pointer_down(PointerKind::Mouse, 200.0, ROW0, ms(0));
        view.pointer_move(240.0, ROW0, ms(20));
        let refreshed = vec![
            ScheduledFeature::new(TimelineItem::new(
                "a",
                "Alter coat (rush)",
                date(2024, 1, 5),
                date(2024, 1, 10),
            )),
        ];
        view.set_features(refreshed);
        assert_eq!(view.feature("a").unwrap().label(), "Alter coat (rush)");
        assert_eq!(feature_a(&view).0, date(2024, 1, 6));
        assert!(view.feature("b").is_none());

        view.set_features(Vec::new());
        assert!(!view.is_interacting());
    }

    #[test]
    fn teardown_clears_pending_timers() {
        let mut view = view();
        view.pointer_down(PointerKind::Touch, 200.0, ROW0, ms(0));
        view.teardown();
        assert!(!view.is_interacting());
        assert!(view.tick(ms(5_000)).is_empty());
        assert!(view.context_menu().is_none());
    }

    #[test]
    fn zoom_changes_flow_into_layout() {
        let mut view = view();
        view.set_zoom(200);
        let layout = view.layout(date(2024, 1, 1));
        assert_eq!(layout.grid.day_width(), 80.0);
        assert_eq!(layout.rows[0].bar.x, 320.0);
    }
}
