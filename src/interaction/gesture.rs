use std::time::Duration;

/// How long a touch must be held still to open the context menu.
pub const LONG_PRESS_DELAY: Duration = Duration::from_millis(500);
/// Movement allowed on either axis before a press turns into a drag.
pub const LONG_PRESS_TOLERANCE: f32 = 10.0;

/// Result of the long-press / drag race.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PressOutcome {
    /// Neither the timer nor the movement threshold has won yet.
    Pending,
    /// The finger moved too far; treat the gesture as a drag.
    Drag,
    /// The timer fired first, at the original touch point.
    LongPress { x: f32, y: f32 },
}

/// Race between a hold timer and a movement threshold for one touch.
///
/// The first condition to trip decides the outcome and it never changes
/// afterwards. Time only advances through [`LongPress::poll`], so the race
/// is fully deterministic for a given sequence of calls.
#[derive(Debug, Clone)]
pub struct LongPress {
    origin_x: f32,
    origin_y: f32,
    started_at: Duration,
    outcome: PressOutcome,
}

impl LongPress {
    pub fn start(x: f32, y: f32, at: Duration) -> Self {
        Self {
            origin_x: x,
            origin_y: y,
            started_at: at,
            outcome: PressOutcome::Pending,
        }
    }

    pub fn outcome(&self) -> PressOutcome {
        self.outcome
    }

    pub fn is_pending(&self) -> bool {
        self.outcome == PressOutcome::Pending
    }

    pub fn on_move(&mut self, x: f32, y: f32) -> PressOutcome {
        if self.is_pending()
            && ((x - self.origin_x).abs() > LONG_PRESS_TOLERANCE
                || (y - self.origin_y).abs() > LONG_PRESS_TOLERANCE)
        {
            self.outcome = PressOutcome::Drag;
        }
        self.outcome
    }

    pub fn poll(&mut self, now: Duration) -> PressOutcome {
        if self.is_pending() && now.saturating_sub(self.started_at) >= LONG_PRESS_DELAY {
            self.outcome = PressOutcome::LongPress {
                x: self.origin_x,
                y: self.origin_y,
            };
        }
        self.outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn holding_still_fires_after_the_delay() {
        let mut press = LongPress::start(100.0, 50.0, ms(1_000));
        assert_eq!(press.poll(ms(1_499)), PressOutcome::Pending);
        assert_eq!(press.on_move(104.0, 47.0), PressOutcome::Pending);
        assert_eq!(
            press.poll(ms(1_500)),
            PressOutcome::LongPress { x: 100.0, y: 50.0 }
        );
        assert!(!press.is_pending());
    }

    #[test]
    fn moving_past_tolerance_on_either_axis_cancels_the_timer() {
        let mut horizontal = LongPress::start(0.0, 0.0, ms(0));
        assert_eq!(horizontal.on_move(10.0, 0.0), PressOutcome::Pending);
        assert_eq!(horizontal.on_move(10.5, 0.0), PressOutcome::Drag);
        assert_eq!(horizontal.poll(ms(10_000)), PressOutcome::Drag);

        let mut vertical = LongPress::start(0.0, 0.0, ms(0));
        assert_eq!(vertical.on_move(0.0, -11.0), PressOutcome::Drag);
    }

    #[test]
    fn first_resolution_wins() {
        let mut press = LongPress::start(0.0, 0.0, ms(0));
        press.poll(ms(600));
        assert_eq!(press.on_move(300.0, 0.0), PressOutcome::LongPress { x: 0.0, y: 0.0 });
    }
}
