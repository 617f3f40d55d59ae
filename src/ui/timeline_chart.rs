use std::time::Duration;

use chrono::NaiveDate;
use egui::{Align2, Color32, Event, Pos2, Rect, Rounding, Sense, Stroke, TouchId, TouchPhase, Ui, Vec2};

use shop_timeline::interaction::throttle::MOVE_THROTTLE;
use shop_timeline::interaction::{DragEdge, PointerEvent, PointerKind};
use shop_timeline::model::ScheduledFeature;
use shop_timeline::timeline::{FeatureRow, TimelineEvent, TimelineLayout, TimelineView};

use crate::ui::theme;

/// Input bookkeeping that has to survive between frames.
#[derive(Debug, Default)]
pub struct ChartState {
    /// The touch driving the view. egui also emits pointer events for the
    /// primary touch; those are ignored while this is set.
    active_touch: Option<TouchId>,
    mouse_down: bool,
}

#[derive(Debug, Default)]
pub struct ChartOutput {
    pub events: Vec<TimelineEvent>,
    /// Ctrl+scroll steps, positive zooms in.
    pub zoom_steps: i32,
}

/// Render the timeline and feed this frame's pointer input to the view.
pub fn show_timeline_chart(
    view: &mut TimelineView,
    state: &mut ChartState,
    selected: Option<&str>,
    today: NaiveDate,
    ui: &mut Ui,
) -> ChartOutput {
    let mut output = ChartOutput::default();
    let now = Duration::from_secs_f64(ui.input(|i| i.time).max(0.0));
    let metrics = *view.metrics();
    let available = ui.available_size();

    if ui.rect_contains_pointer(ui.max_rect()) {
        let zoom = ui.input(|i| i.zoom_delta());
        if zoom > 1.0 {
            output.zoom_steps += 1;
        } else if zoom < 1.0 {
            output.zoom_steps -= 1;
        }
    }

    let layout = view.layout(today);
    let features = view.features();
    let chart_width = layout.total_width.max(available.x);
    let chart_height = metrics.header_height + layout.total_height + 40.0;

    egui::ScrollArea::both()
        .auto_shrink([false, false])
        .drag_to_scroll(false)
        .show(ui, |ui| {
            let (response, painter) = ui.allocate_painter(
                Vec2::new(chart_width, chart_height.max(available.y)),
                Sense::hover(),
            );
            let origin = response.rect.min;
            let body = origin + Vec2::new(0.0, metrics.header_height);
            let canvas = response.rect.intersect(ui.clip_rect());

            painter.rect_filled(response.rect, 0.0, theme::BG_DARK);
            draw_columns(&painter, &layout, origin, response.rect.height());
            draw_rows(&painter, &layout, body, chart_width);
            let dragging = view.dragging().map(str::to_string);
            for row in &layout.rows {
                if let Some(feature) = features.get(row.index) {
                    let is_selected = selected == Some(row.feature_id.as_str());
                    let is_dragging = dragging.as_deref() == Some(row.feature_id.as_str());
                    draw_bar(&painter, body, row, feature, is_selected, is_dragging);
                }
            }
            draw_markers(&painter, &layout, origin, response.rect.height());
            draw_header(&painter, &layout, origin, chart_width);

            let layer = ui.layer_id();
            let ctx = ui.ctx().clone();
            let accepts_press = |pos: Pos2| canvas.contains(pos) && ctx.layer_id_at(pos) == Some(layer);
            output
                .events
                .extend(route_input(view, state, ui, body, accepts_press, now));

            if let Some(pos) = response.hover_pos() {
                let x = pos.x - body.x;
                let hit = layout.hit_test(x, pos.y - body.y);
                let day = (x >= 0.0 && x < layout.total_width).then(|| layout.grid.date_at(x));
                show_hover(ui, view, &features, hit, day, response.id);
            }

            show_context_menu(ui, view, body, &mut output.events);
        });

    if view.is_interacting() {
        ui.ctx().request_repaint_after(MOVE_THROTTLE);
    }

    output
}

/// Translate raw egui events into view input, in content coordinates.
fn route_input(
    view: &mut TimelineView,
    state: &mut ChartState,
    ui: &Ui,
    body: Pos2,
    accepts_press: impl Fn(Pos2) -> bool,
    now: Duration,
) -> Vec<TimelineEvent> {
    let local = |pos: Pos2| (pos.x - body.x, pos.y - body.y);
    let menu_open = view.context_menu().is_some();
    let mut out = Vec::new();

    for event in ui.input(|i| i.events.clone()) {
        let pointer = match event {
            Event::Touch { id, phase, pos, .. } => {
                let (x, y) = local(pos);
                match phase {
                    TouchPhase::Start
                        if state.active_touch.is_none() && !menu_open && accepts_press(pos) =>
                    {
                        state.active_touch = Some(id);
                        Some(PointerEvent::Down {
                            kind: PointerKind::Touch,
                            x,
                            y,
                            at: now,
                        })
                    }
                    TouchPhase::Move if state.active_touch == Some(id) => {
                        Some(PointerEvent::Move { x, y, at: now })
                    }
                    TouchPhase::End if state.active_touch == Some(id) => {
                        state.active_touch = None;
                        Some(PointerEvent::Up { x, y, at: now })
                    }
                    TouchPhase::Cancel if state.active_touch == Some(id) => {
                        state.active_touch = None;
                        Some(PointerEvent::Cancel { at: now })
                    }
                    _ => None,
                }
            }
            _ if state.active_touch.is_some() => None,
            Event::PointerButton {
                pos,
                button: egui::PointerButton::Primary,
                pressed,
                ..
            } => {
                let (x, y) = local(pos);
                if pressed && !state.mouse_down && !menu_open && accepts_press(pos) {
                    state.mouse_down = true;
                    Some(PointerEvent::Down {
                        kind: PointerKind::Mouse,
                        x,
                        y,
                        at: now,
                    })
                } else if !pressed && state.mouse_down {
                    state.mouse_down = false;
                    Some(PointerEvent::Up { x, y, at: now })
                } else {
                    None
                }
            }
            Event::PointerMoved(pos) if state.mouse_down => {
                let (x, y) = local(pos);
                Some(PointerEvent::Move { x, y, at: now })
            }
            Event::PointerGone | Event::WindowFocused(false) if state.mouse_down => {
                state.mouse_down = false;
                Some(PointerEvent::Cancel { at: now })
            }
            _ => None,
        };
        if let Some(pointer) = pointer {
            out.extend(view.handle(pointer));
        }
    }

    out.extend(view.tick(now));
    out
}

fn show_hover(
    ui: &Ui,
    view: &TimelineView,
    features: &[ScheduledFeature],
    hit: Option<(usize, DragEdge)>,
    day: Option<NaiveDate>,
    id: egui::Id,
) {
    let show_day = |ui: &Ui| {
        if let Some(day) = day {
            egui::show_tooltip_at_pointer(ui.ctx(), ui.layer_id(), id.with("day"), |ui| {
                ui.label(format!(
                    "{} {}",
                    egui_phosphor::regular::CALENDAR_BLANK,
                    day.format("%a %d/%m/%Y"),
                ));
            });
        }
    };
    if view.dragging().is_some() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
        show_day(ui);
        return;
    }
    let Some((index, edge)) = hit else {
        show_day(ui);
        return;
    };
    ui.ctx().set_cursor_icon(match edge {
        DragEdge::Whole => egui::CursorIcon::Grab,
        DragEdge::Leading | DragEdge::Trailing => egui::CursorIcon::ResizeHorizontal,
    });
    let Some(feature) = features.get(index) else {
        return;
    };
    egui::show_tooltip_at_pointer(ui.ctx(), ui.layer_id(), id.with(feature.id()), |ui| {
        ui.strong(feature.label());
        ui.label(format!(
            "{} {} {}",
            feature.start_at().format("%d/%m/%Y"),
            egui_phosphor::regular::ARROW_RIGHT,
            feature.end_at().format("%d/%m/%Y"),
        ));
        if let Some(status) = &feature.status {
            ui.colored_label(theme::status_color(status.color), &status.label);
        }
        if let Some(owner) = &feature.owner {
            ui.label(format!("{} {}", egui_phosphor::regular::USER, owner.label));
        }
    });
}

fn show_context_menu(
    ui: &Ui,
    view: &mut TimelineView,
    body: Pos2,
    events: &mut Vec<TimelineEvent>,
) {
    let Some(menu) = view.context_menu().cloned() else {
        return;
    };
    let title = view
        .feature(&menu.feature_id)
        .map(|f| f.label().to_string())
        .unwrap_or_default();

    let mut open = false;
    let mut dismiss = ui.input(|i| i.key_pressed(egui::Key::Escape));
    egui::Area::new(egui::Id::new("timeline-context-menu"))
        .order(egui::Order::Foreground)
        .fixed_pos(body + Vec2::new(menu.x, menu.y))
        .show(ui.ctx(), |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.label(egui::RichText::new(title).strong());
                ui.separator();
                if ui
                    .button(format!("{}  Open", egui_phosphor::regular::ARROW_RIGHT))
                    .clicked()
                {
                    open = true;
                }
                if ui
                    .button(format!("{}  Dismiss", egui_phosphor::regular::X))
                    .clicked()
                {
                    dismiss = true;
                }
            });
        });

    if open {
        events.extend(view.select_from_context_menu());
    } else if dismiss {
        view.dismiss_context_menu();
    }
}

fn draw_columns(painter: &egui::Painter, layout: &TimelineLayout, origin: Pos2, height: f32) {
    let top = origin.y + layout.metrics.header_height;
    for day in &layout.days {
        let x = origin.x + day.x;
        let column = Rect::from_min_size(Pos2::new(x, top), Vec2::new(day.width, height));
        if day.is_today {
            painter.rect_filled(column, 0.0, theme::BG_TODAY);
        } else if day.is_weekend {
            painter.rect_filled(column, 0.0, theme::BG_WEEKEND);
        }
        painter.line_segment(
            [Pos2::new(x, top), Pos2::new(x, origin.y + height)],
            Stroke::new(0.5, theme::GRID_LINE),
        );
    }
}

fn draw_rows(painter: &egui::Painter, layout: &TimelineLayout, body: Pos2, width: f32) {
    let row_height = layout.metrics.row_height;
    for row in &layout.rows {
        let y = body.y + row.index as f32 * row_height;
        if row.index % 2 == 0 {
            painter.rect_filled(
                Rect::from_min_size(Pos2::new(body.x, y), Vec2::new(width, row_height)),
                0.0,
                Color32::from_white_alpha(4),
            );
        }
        painter.line_segment(
            [
                Pos2::new(body.x, y + row_height),
                Pos2::new(body.x + width, y + row_height),
            ],
            Stroke::new(0.5, theme::BORDER_SUBTLE),
        );
    }
}

fn draw_header(painter: &egui::Painter, layout: &TimelineLayout, origin: Pos2, width: f32) {
    let header_height = layout.metrics.header_height;
    painter.rect_filled(
        Rect::from_min_size(origin, Vec2::new(width, header_height)),
        0.0,
        theme::BG_HEADER,
    );
    painter.line_segment(
        [
            Pos2::new(origin.x, origin.y + header_height),
            Pos2::new(origin.x + width, origin.y + header_height),
        ],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );

    for month in &layout.months {
        let x = origin.x + month.x;
        painter.line_segment(
            [Pos2::new(x, origin.y), Pos2::new(x, origin.y + header_height)],
            Stroke::new(1.0, theme::BORDER_SUBTLE),
        );
        let clipped = painter.with_clip_rect(Rect::from_min_size(
            Pos2::new(x, origin.y),
            Vec2::new(month.width, header_height / 2.0),
        ));
        clipped.text(
            Pos2::new(x + 5.0, origin.y + header_height * 0.25),
            Align2::LEFT_CENTER,
            &month.label,
            theme::font_header(),
            theme::TEXT_PRIMARY,
        );
    }

    for day in &layout.days {
        let color = if day.is_today {
            theme::TODAY_LINE
        } else if day.is_weekend {
            theme::TEXT_DIM
        } else {
            theme::TEXT_SECONDARY
        };
        painter.text(
            Pos2::new(origin.x + day.x + day.width / 2.0, origin.y + header_height * 0.72),
            Align2::CENTER_CENTER,
            day.date.format("%d").to_string(),
            theme::font_sub(),
            color,
        );
    }
}

fn draw_bar(
    painter: &egui::Painter,
    body: Pos2,
    row: &FeatureRow,
    feature: &ScheduledFeature,
    is_selected: bool,
    is_dragging: bool,
) {
    let bar = Rect::from_min_size(
        body + Vec2::new(row.bar.x, row.bar.y),
        Vec2::new(row.bar.width, row.bar.height),
    );
    let rounding = Rounding::same(theme::BAR_ROUNDING);
    let color = feature
        .status
        .as_ref()
        .map(|s| theme::status_color(s.color))
        .unwrap_or(theme::BAR_DEFAULT);

    painter.rect_filled(bar.translate(Vec2::new(1.0, 2.0)), rounding, Color32::from_black_alpha(35));
    painter.rect_filled(bar, rounding, color);
    if is_dragging {
        painter.rect_filled(bar, rounding, Color32::from_white_alpha(30));
    }
    if is_selected || is_dragging {
        painter.rect_stroke(
            bar.expand(1.5),
            Rounding::same(theme::BAR_ROUNDING + 1.5),
            Stroke::new(2.0, theme::BORDER_ACCENT),
        );
    }

    for handle in [row.leading, row.trailing] {
        let grip = Rect::from_center_size(
            body + Vec2::new(handle.x + handle.width / 2.0, handle.y + handle.height / 2.0),
            Vec2::new(2.0, (handle.height * 0.5).max(4.0)),
        );
        painter.rect_filled(grip, Rounding::same(1.0), theme::HANDLE_COLOR);
    }

    if bar.width() > 30.0 {
        let galley = painter.layout_no_wrap(
            feature.label().to_string(),
            theme::font_bar(),
            theme::TEXT_ON_BAR,
        );
        let text_y = bar.top() + (bar.height() - galley.size().y) / 2.0;
        painter
            .with_clip_rect(bar.shrink2(Vec2::new(6.0, 0.0)))
            .galley(Pos2::new(bar.left() + 8.0, text_y), galley, Color32::TRANSPARENT);
    }

    if let Some(owner) = &feature.owner {
        painter.text(
            Pos2::new(bar.right() + 8.0, bar.center().y),
            Align2::LEFT_CENTER,
            &owner.label,
            theme::font_small(),
            theme::TEXT_SECONDARY,
        );
    }
}

fn draw_markers(painter: &egui::Painter, layout: &TimelineLayout, origin: Pos2, height: f32) {
    let header_height = layout.metrics.header_height;
    let half_day = layout.grid.day_width() / 2.0;
    for marker in &layout.markers {
        let x = origin.x + marker.x + half_day;
        let color = if marker.id.starts_with("overload-") {
            theme::OVERLOAD_LINE
        } else {
            theme::TODAY_LINE
        };
        painter.line_segment(
            [
                Pos2::new(x, origin.y + header_height),
                Pos2::new(x, origin.y + height),
            ],
            Stroke::new(1.5, color),
        );

        let galley = painter.layout_no_wrap(marker.label.clone(), theme::font_small(), Color32::WHITE);
        let badge = Rect::from_min_size(
            Pos2::new(x - galley.size().x / 2.0 - 4.0, origin.y + header_height - 1.0),
            Vec2::new(galley.size().x + 8.0, 14.0),
        );
        painter.rect_filled(badge, Rounding::same(3.0), color);
        painter.galley(
            Pos2::new(badge.left() + 4.0, badge.center().y - galley.size().y / 2.0),
            galley,
            Color32::WHITE,
        );
    }
}
