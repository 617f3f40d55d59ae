use chrono::{Datelike, NaiveDate};

use crate::interaction::DragEdge;
use crate::model::calendar::days_between;
use crate::model::{CalendarGrid, Marker, ScheduledFeature};

/// Fixed sizes of the timeline chrome, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMetrics {
    pub row_height: f32,
    /// Gap above and below each bar inside its row.
    pub row_padding: f32,
    /// Two-tier header (month over day-of-month) drawn by the host.
    pub header_height: f32,
    /// Grab area for the start/end handles, centered on the bar edge.
    pub handle_width: f32,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            row_height: 36.0,
            row_padding: 6.0,
            header_height: 48.0,
            handle_width: 8.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BarRect {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayColumn {
    pub date: NaiveDate,
    pub x: f32,
    pub width: f32,
    pub is_weekend: bool,
    pub is_today: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthHeader {
    pub label: String,
    pub x: f32,
    pub width: f32,
}

/// One feature's row. Index is the feature's position in the input list.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub feature_id: String,
    pub index: usize,
    pub bar: BarRect,
    pub leading: BarRect,
    pub trailing: BarRect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerLine {
    pub id: String,
    pub label: String,
    pub date: NaiveDate,
    pub x: f32,
}

/// Everything the host needs to paint a frame of the timeline.
///
/// X is measured from the left edge of the grid (`range.from`), Y from the
/// top of the row area, just under the header. Rows are stacked strictly in
/// input order, one per feature, overlaps and all.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineLayout {
    pub grid: CalendarGrid,
    pub metrics: LayoutMetrics,
    pub days: Vec<DayColumn>,
    pub months: Vec<MonthHeader>,
    pub rows: Vec<FeatureRow>,
    pub markers: Vec<MarkerLine>,
    pub total_width: f32,
    pub total_height: f32,
}

impl TimelineLayout {
    pub fn compute(
        features: &[ScheduledFeature],
        grid: &CalendarGrid,
        markers: &[Marker],
        metrics: LayoutMetrics,
        today: NaiveDate,
    ) -> Self {
        let day_width = grid.day_width();

        let days = grid
            .range
            .days()
            .into_iter()
            .map(|date| DayColumn {
                date,
                x: grid.position_of(date),
                width: day_width,
                is_weekend: date.weekday().num_days_from_monday() >= 5,
                is_today: date == today,
            })
            .collect();

        let months = grid
            .range
            .months()
            .into_iter()
            .map(|span| MonthHeader {
                label: span.first_day.format("%B %Y").to_string(),
                x: grid.position_of(span.first_day),
                width: span.day_count as f32 * day_width,
            })
            .collect();

        let rows = feature_rows(features, grid, &metrics);

        // Columns outside the range are never drawn, so neither are markers there.
        let markers = markers
            .iter()
            .filter(|marker| grid.range.contains(marker.date))
            .map(|marker| MarkerLine {
                id: marker.id.clone(),
                label: marker.label.clone(),
                date: marker.date,
                x: grid.position_of(marker.date),
            })
            .collect();

        let total_height = rows.len() as f32 * metrics.row_height + metrics.row_padding;

        Self {
            grid: *grid,
            metrics,
            days,
            months,
            rows,
            markers,
            total_width: grid.total_width(),
            total_height,
        }
    }

    /// The feature and grab region under a point. Handles win over the body.
    pub fn hit_test(&self, x: f32, y: f32) -> Option<(usize, DragEdge)> {
        hit_test(&self.rows, x, y)
    }
}

/// Bars and handles for each feature, one row per feature in list order.
pub fn feature_rows(
    features: &[ScheduledFeature],
    grid: &CalendarGrid,
    metrics: &LayoutMetrics,
) -> Vec<FeatureRow> {
    features
        .iter()
        .enumerate()
        .map(|(index, feature)| feature_row(index, feature, grid, metrics))
        .collect()
}

pub fn hit_test(rows: &[FeatureRow], x: f32, y: f32) -> Option<(usize, DragEdge)> {
    rows.iter().find_map(|row| {
        if row.leading.contains(x, y) {
            Some((row.index, DragEdge::Leading))
        } else if row.trailing.contains(x, y) {
            Some((row.index, DragEdge::Trailing))
        } else if row.bar.contains(x, y) {
            Some((row.index, DragEdge::Whole))
        } else {
            None
        }
    })
}

fn feature_row(
    index: usize,
    feature: &ScheduledFeature,
    grid: &CalendarGrid,
    metrics: &LayoutMetrics,
) -> FeatureRow {
    let day_width = grid.day_width();
    let x = grid.position_of(feature.start_at());
    let span_days = days_between(feature.start_at(), feature.end_at()).max(1);
    let bar = BarRect {
        x,
        y: index as f32 * metrics.row_height + metrics.row_padding,
        width: span_days as f32 * day_width,
        height: (metrics.row_height - metrics.row_padding * 2.0).max(1.0),
    };
    let half = metrics.handle_width / 2.0;
    let leading = BarRect {
        x: bar.x - half,
        width: metrics.handle_width,
        ..bar
    };
    let trailing = BarRect {
        x: bar.right() - half,
        width: metrics.handle_width,
        ..bar
    };
    FeatureRow {
        feature_id: feature.id().to_string(),
        index,
        bar,
        leading,
        trailing,
    }
}
