use egui::{RichText, Ui};
use egui_phosphor::regular as icons;

use shop_timeline::model::Order;
use shop_timeline::workload::{AllocatorConfig, Workload};

use crate::ui::theme;

/// Render the workload side panel. Returns the id of an order the user
/// picked from one of the lists.
pub fn show_workload_panel(
    workload: &Workload,
    config: &AllocatorConfig,
    orders: &[Order],
    selected: Option<&str>,
    ui: &mut Ui,
) -> Option<String> {
    let mut picked = None;

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            if let Some(order) = selected.and_then(|id| orders.iter().find(|o| o.id.to_string() == id)) {
                show_order_details(order, workload, ui);
                ui.add_space(6.0);
                ui.separator();
            }

            let gauge = workload.capacity(config);
            ui.label(RichText::new(format!("{} Capacity", icons::GAUGE)).font(theme::font_header()));
            ui.add(
                egui::ProgressBar::new((gauge.utilization_percent / 100.0) as f32)
                    .fill(theme::load_color(gauge.utilization_percent))
                    .text(format!(
                        "{:.1} h of {:.0} h per week ({:.0}%)",
                        gauge.assigned_hours, gauge.weekly_capacity_hours, gauge.utilization_percent
                    )),
            );
            ui.add_space(8.0);

            ui.label(RichText::new(format!("{} Staff", icons::USERS)).font(theme::font_header()));
            egui::Grid::new("workload_summaries")
                .num_columns(4)
                .spacing([10.0, 4.0])
                .show(ui, |ui| {
                    for summary in workload.summaries(config) {
                        ui.label(&summary.label);
                        ui.label(RichText::new(format!("{:.1} h", summary.total_hours)).color(theme::TEXT_SECONDARY));
                        ui.label(RichText::new(format!("{} items", summary.item_count)).color(theme::TEXT_DIM));
                        match summary.utilization_percent {
                            Some(percent) => {
                                ui.add(
                                    egui::ProgressBar::new((percent / 100.0) as f32)
                                        .desired_width(70.0)
                                        .fill(theme::load_color(percent))
                                        .text(format!("{percent:.0}%")),
                                );
                            }
                            None => {
                                ui.label("");
                            }
                        }
                        ui.end_row();
                    }
                });
            ui.add_space(8.0);

            let warnings = workload.overload_warnings(config);
            ui.label(
                RichText::new(format!("{} Overloaded days ({})", icons::WARNING, warnings.len()))
                    .font(theme::font_header()),
            );
            if warnings.is_empty() {
                ui.label(RichText::new("Nobody is over capacity.").color(theme::TEXT_DIM));
            }
            for warning in &warnings {
                ui.label(
                    RichText::new(format!(
                        "{}  {}: {:.1} h (+{:.1} h)",
                        warning.date.format("%a %d %b"),
                        warning.assignee_label,
                        warning.hours,
                        warning.overage
                    ))
                    .color(theme::OVERLOAD_LINE),
                );
            }
            ui.add_space(8.0);

            let unassigned = workload.unassigned();
            ui.label(
                RichText::new(format!("{} Unassigned ({})", icons::TRAY, unassigned.len()))
                    .font(theme::font_header()),
            );
            for item in unassigned {
                let due = item
                    .due_date
                    .map(|d| d.format("%d/%m").to_string())
                    .unwrap_or_else(|| "no date".to_string());
                let text = format!("{due}  {} · {}", item.order_reference, item.label);
                let order_id = item.parent_order_id.to_string();
                let is_selected = selected == Some(order_id.as_str());
                if ui.selectable_label(is_selected, text).clicked() {
                    picked = Some(order_id);
                }
            }
        });

    picked
}

fn show_order_details(order: &Order, workload: &Workload, ui: &mut Ui) {
    ui.label(
        RichText::new(format!("{} · {}", order.reference, order.customer))
            .strong()
            .size(14.0),
    );
    ui.colored_label(theme::status_color(order.status.color()), order.status.label());
    let format_date = |d: Option<chrono::NaiveDate>| {
        d.map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| "-".to_string())
    };
    ui.label(format!(
        "{} {} {} {}",
        icons::CALENDAR_BLANK,
        format_date(order.start_date),
        icons::ARROW_RIGHT,
        format_date(order.due_date)
    ));

    let items = workload
        .buckets
        .values()
        .flat_map(|bucket| &bucket.items)
        .filter(|item| item.parent_order_id == order.id);
    for item in items {
        ui.label(
            RichText::new(format!(
                "{}  {} ({} min) · {}",
                icons::SCISSORS,
                item.label,
                item.estimated_minutes,
                item.assignee_label
            ))
            .color(theme::TEXT_SECONDARY),
        );
    }
}
