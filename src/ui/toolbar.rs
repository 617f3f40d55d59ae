use egui::{menu, RichText, Ui};
use egui_phosphor::regular as icons;

use crate::app::ScheduleApp;
use crate::ui::theme;

/// Render the top toolbar / menu bar.
pub fn show_toolbar(app: &mut ScheduleApp, ui: &mut Ui) {
    menu::bar(ui, |ui| {
        ui.menu_button(RichText::new("  File  ").font(theme::font_menu()), |ui| {
            if ui.button("  New Shop").clicked() {
                app.new_snapshot();
                ui.close_menu();
            }
            if ui.button("  Open...").clicked() {
                app.open_snapshot();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Save          Ctrl+S").clicked() {
                app.save_snapshot();
                ui.close_menu();
            }
            if ui.button("  Save As...").clicked() {
                app.save_snapshot_as();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Import Orders CSV...").clicked() {
                app.import_csv();
                ui.close_menu();
            }
            if ui.button("  Export Workload CSV...").clicked() {
                app.export_workload();
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  View  ").font(theme::font_menu()), |ui| {
            if ui.button("  Zoom In        Ctrl+Scroll ↑").clicked() {
                app.zoom_in();
                ui.close_menu();
            }
            if ui.button("  Zoom Out      Ctrl+Scroll ↓").clicked() {
                app.zoom_out();
                ui.close_menu();
            }
            if ui.button("  Reset Zoom").clicked() {
                app.reset_zoom();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Fit Range to Orders").clicked() {
                app.fit_range();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Open Settings Folder").clicked() {
                app.open_settings_folder();
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  Help  ").font(theme::font_menu()), |ui| {
            if ui.button("About").clicked() {
                app.show_about = true;
                ui.close_menu();
            }
        });

        ui.separator();

        if ui
            .button(icons::MAGNIFYING_GLASS_MINUS)
            .on_hover_text("Zoom out")
            .clicked()
        {
            app.zoom_out();
        }
        ui.label(RichText::new(format!("{}%", app.zoom())).color(theme::TEXT_SECONDARY));
        if ui
            .button(icons::MAGNIFYING_GLASS_PLUS)
            .on_hover_text("Zoom in")
            .clicked()
        {
            app.zoom_in();
        }

        ui.separator();

        let mut range = app.range();
        ui.label(RichText::new(icons::CALENDAR_BLANK).color(theme::TEXT_SECONDARY));
        let from_changed = ui
            .add(egui_extras::DatePickerButton::new(&mut range.from).id_salt("range_from"))
            .changed();
        ui.label(RichText::new(icons::ARROW_RIGHT).color(theme::TEXT_DIM));
        let to_changed = ui
            .add(egui_extras::DatePickerButton::new(&mut range.to).id_salt("range_to"))
            .changed();
        if from_changed || to_changed {
            app.set_range(range);
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(RichText::new(app.title()).size(11.0).weak());
        });
    });
}
