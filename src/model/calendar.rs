use chrono::{Datelike, NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};

/// Width of one day column at 100% zoom.
pub const BASE_DAY_WIDTH: f32 = 40.0;
/// Narrowest a day column may get, whatever the zoom.
pub const MIN_DAY_WIDTH: f32 = 20.0;

pub const DEFAULT_ZOOM: u32 = 100;
pub const MIN_ZOOM: u32 = 25;
pub const MAX_ZOOM: u32 = 400;
const ZOOM_STEP: u32 = 25;

/// Pixel width of one day column for a zoom percentage.
pub fn day_width(zoom: u32) -> f32 {
    (BASE_DAY_WIDTH * zoom as f32 / 100.0).max(MIN_DAY_WIDTH)
}

/// Next zoom level up, clamped to [`MAX_ZOOM`].
pub fn zoom_in(zoom: u32) -> u32 {
    zoom.saturating_add(ZOOM_STEP).clamp(MIN_ZOOM, MAX_ZOOM)
}

/// Next zoom level down, clamped to [`MIN_ZOOM`].
pub fn zoom_out(zoom: u32) -> u32 {
    zoom.saturating_sub(ZOOM_STEP).clamp(MIN_ZOOM, MAX_ZOOM)
}

/// Shift a date by whole days, saturating at the ends of the calendar.
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    TimeDelta::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .unwrap_or(if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

/// Whole days from `from` to `to` (negative when `to` is earlier).
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    let first = first_of_month(date);
    add_days(add_months(first, 1), -1)
}

/// Move a first-of-month date forward by `months`.
fn add_months(first: NaiveDate, months: u32) -> NaiveDate {
    let index = first.year() as i64 * 12 + first.month0() as i64 + months as i64;
    let year = index.div_euclid(12) as i32;
    let month = index.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MAX)
}

/// A run of days belonging to one calendar month, clipped to a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthSpan {
    pub year: i32,
    pub month: u32,
    /// First day of the span inside the range (not necessarily the 1st).
    pub first_day: NaiveDate,
    pub day_count: u32,
}

/// An inclusive span of calendar days. `to < from` is treated as empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    /// Current month plus the two that follow.
    pub fn default_for(today: NaiveDate) -> Self {
        let from = first_of_month(today);
        Self {
            from,
            to: last_of_month(add_months(from, 2)),
        }
    }

    /// Whole months covering every `(start, end)` span, or the default
    /// window when there are none.
    pub fn covering<I>(spans: I, today: NaiveDate) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, NaiveDate)>,
    {
        let bounds = spans.into_iter().fold(None, |acc, (start, end)| match acc {
            None => Some((start.min(end), start.max(end))),
            Some((lo, hi)) => Some((start.min(lo), end.max(hi))),
        });
        match bounds {
            Some((lo, hi)) => Self {
                from: first_of_month(lo),
                to: last_of_month(hi),
            },
            None => Self::default_for(today),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to < self.from
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        !self.is_empty() && self.from <= date && date <= self.to
    }

    pub fn day_count(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            days_between(self.from, self.to) as usize + 1
        }
    }

    /// Every day from `from` to `to`, inclusive.
    pub fn days(&self) -> Vec<NaiveDate> {
        let mut days = Vec::with_capacity(self.day_count());
        let mut date = self.from;
        while date <= self.to {
            days.push(date);
            if date == NaiveDate::MAX {
                break;
            }
            date = add_days(date, 1);
        }
        days
    }

    /// Month spans clipped to the range, in order.
    pub fn months(&self) -> Vec<MonthSpan> {
        let mut spans = Vec::new();
        if self.is_empty() {
            return spans;
        }
        let mut cursor = self.from;
        loop {
            let month_end = last_of_month(cursor);
            let span_end = month_end.min(self.to);
            spans.push(MonthSpan {
                year: cursor.year(),
                month: cursor.month(),
                first_day: cursor,
                day_count: days_between(cursor, span_end) as u32 + 1,
            });
            if span_end >= self.to || month_end == NaiveDate::MAX {
                break;
            }
            cursor = add_days(month_end, 1);
        }
        spans
    }
}

/// Maps dates to pixels for one range at one zoom level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalendarGrid {
    pub range: DateRange,
    pub zoom: u32,
}

impl CalendarGrid {
    pub fn new(range: DateRange, zoom: u32) -> Self {
        Self { range, zoom }
    }

    pub fn day_width(&self) -> f32 {
        day_width(self.zoom)
    }

    /// X offset of a date's column from the left edge of the grid.
    pub fn position_of(&self, date: NaiveDate) -> f32 {
        days_between(self.range.from, date) as f32 * self.day_width()
    }

    /// The date whose column contains `x`.
    pub fn date_at(&self, x: f32) -> NaiveDate {
        let offset = (x / self.day_width()).floor();
        add_days(self.range.from, offset as i64)
    }

    pub fn total_width(&self) -> f32 {
        self.range.day_count() as f32 * self.day_width()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn day_width_scales_with_zoom_and_floors_at_twenty() {
        assert_eq!(day_width(100), 40.0);
        assert_eq!(day_width(200), 80.0);
        assert_eq!(day_width(50), 20.0);
        assert_eq!(day_width(10), 20.0);
        assert_eq!(day_width(0), 20.0);
    }

    #[test]
    fn january_grid_matches_expected_geometry() {
        let grid = CalendarGrid::new(DateRange::new(date(2024, 1, 1), date(2024, 1, 31)), 100);
        assert_eq!(grid.day_width(), 40.0);
        assert_eq!(grid.range.days().len(), 31);
        assert_eq!(grid.total_width(), 1240.0);
        assert_eq!(grid.position_of(date(2024, 1, 5)), 160.0);
    }

    #[test]
    fn date_at_floors_into_the_containing_column() {
        let grid = CalendarGrid::new(DateRange::new(date(2024, 1, 1), date(2024, 1, 31)), 100);
        assert_eq!(grid.date_at(0.0), date(2024, 1, 1));
        assert_eq!(grid.date_at(39.9), date(2024, 1, 1));
        assert_eq!(grid.date_at(40.0), date(2024, 1, 2));
        assert_eq!(grid.date_at(-1.0), date(2023, 12, 31));
    }

    #[test]
    fn months_are_clipped_to_the_range() {
        let range = DateRange::new(date(2024, 1, 20), date(2024, 3, 10));
        let months = range.months();
        assert_eq!(months.len(), 3);
        assert_eq!(months[0].first_day, date(2024, 1, 20));
        assert_eq!(months[0].day_count, 12);
        assert_eq!(months[1].month, 2);
        assert_eq!(months[1].day_count, 29); // leap year
        assert_eq!(months[2].day_count, 10);
        let total: u32 = months.iter().map(|m| m.day_count).sum();
        assert_eq!(total as usize, range.day_count());
    }

    #[test]
    fn inverted_range_is_empty_not_an_error() {
        let range = DateRange::new(date(2024, 2, 1), date(2024, 1, 1));
        assert!(range.is_empty());
        assert!(range.days().is_empty());
        assert!(range.months().is_empty());
        assert_eq!(CalendarGrid::new(range, 100).total_width(), 0.0);
    }

    #[test]
    fn default_range_spans_three_months() {
        let range = DateRange::default_for(date(2024, 11, 17));
        assert_eq!(range.from, date(2024, 11, 1));
        assert_eq!(range.to, date(2025, 1, 31));
        assert_eq!(range.months().len(), 3);
    }

    #[test]
    fn covering_rounds_out_to_whole_months() {
        let spans = vec![
            (date(2024, 3, 10), date(2024, 3, 12)),
            (date(2024, 2, 27), date(2024, 4, 2)),
        ];
        let range = DateRange::covering(spans, date(2020, 1, 1));
        assert_eq!(range, DateRange::new(date(2024, 2, 1), date(2024, 4, 30)));

        let empty = DateRange::covering(Vec::new(), date(2024, 6, 3));
        assert_eq!(empty, DateRange::default_for(date(2024, 6, 3)));
    }

    #[test]
    fn zoom_steps_stay_in_bounds() {
        assert_eq!(zoom_in(100), 125);
        assert_eq!(zoom_in(MAX_ZOOM), MAX_ZOOM);
        assert_eq!(zoom_out(MIN_ZOOM), MIN_ZOOM);
        assert_eq!(zoom_out(10), MIN_ZOOM);
    }

    proptest! {
        #[test]
        fn day_width_never_below_minimum(zoom in 0u32..10_000) {
            prop_assert!(day_width(zoom) >= MIN_DAY_WIDTH);
        }

        #[test]
        fn position_of_date_at_round_trips_within_a_column(
            zoom in 0u32..1_000,
            x in -2_000.0f32..20_000.0,
        ) {
            let grid = CalendarGrid::new(DateRange::new(date(2024, 1, 1), date(2024, 12, 31)), zoom);
            let back = grid.position_of(grid.date_at(x));
            prop_assert!(back <= x + 0.05);
            prop_assert!(x - back < grid.day_width() + 0.05);
        }
    }
}
