use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::{info, warn};

use shop_timeline::config::Settings;
use shop_timeline::io::{self, ShopSnapshot};
use shop_timeline::model::calendar::{add_days, zoom_in, zoom_out, DEFAULT_ZOOM};
use shop_timeline::model::{CalendarGrid, DateRange, LineItem, Marker, Order, OrderStatus, StaffMember};
use shop_timeline::timeline::{TimelineEvent, TimelineView};
use shop_timeline::workload::{self, Workload};

use crate::ui;

/// Main application state.
pub struct ScheduleApp {
    pub snapshot: ShopSnapshot,
    pub snapshot_path: Option<PathBuf>,
    pub settings: Settings,
    pub workload: Workload,
    pub view: TimelineView,
    pub chart: ui::timeline_chart::ChartState,
    /// Id of the selected order, as used for its timeline feature.
    pub selected: Option<String>,
    pub status_message: String,
    pub show_about: bool,
    today: NaiveDate,
}

impl ScheduleApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        // Register Phosphor icon font as a fallback so icons render inline with text
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        let today = chrono::Local::now().date_naive();
        let settings = Settings::load();

        let mut status_message = "Ready".to_string();
        let (snapshot, snapshot_path) = match settings.last_snapshot.clone() {
            Some(path) => match io::load_snapshot(&path) {
                Ok(snapshot) => (snapshot, Some(path)),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "could not reopen last snapshot");
                    status_message = format!("Could not reopen {}: {}", path.display(), e);
                    (Self::sample_snapshot(today), None)
                }
            },
            None => (Self::sample_snapshot(today), None),
        };

        let config = settings.allocator_config();
        let workload = workload::allocate(&snapshot.orders, &snapshot.roster, &config);
        let features = workload::scheduled_features(&snapshot.orders, &snapshot.roster);
        let range = DateRange::covering(features.iter().map(|f| (f.start_at(), f.end_at())), today);
        let view = TimelineView::new(features, CalendarGrid::new(range, settings.zoom));

        let mut app = Self {
            snapshot,
            snapshot_path,
            settings,
            workload,
            view,
            chart: Default::default(),
            selected: None,
            status_message,
            show_about: false,
            today,
        };
        app.view.set_markers(app.markers());
        app
    }

    /// A small shop to play with on first launch.
    fn sample_snapshot(today: NaiveDate) -> ShopSnapshot {
        let mara = StaffMember::new("Mara");
        let jonas = StaffMember::new("Jonas");
        let priya = StaffMember::new("Priya");
        let day = |offset: i64| add_days(today, offset);

        let orders = vec![
            Order::new("ORD-1041", "E. Lindqvist")
                .with_status(OrderStatus::InProgress)
                .starting(day(-2))
                .due(day(3))
                .with_item(LineItem::new("Shorten trousers").with_estimate(45).assigned_to(mara.id))
                .with_item(LineItem::new("Take in jacket waist").with_estimate(150).assigned_to(mara.id)),
            Order::new("ORD-1042", "R. Okafor")
                .with_status(OrderStatus::Fitting)
                .starting(day(0))
                .due(day(3))
                .with_item(LineItem::new("Wedding dress bustle").with_estimate(240).assigned_to(mara.id))
                .with_item(LineItem::new("Hem veil").with_estimate(90).assigned_to(mara.id)),
            Order::new("ORD-1043", "T. Moreau")
                .with_status(OrderStatus::New)
                .due(day(6))
                .with_item(LineItem::new("Replace coat lining").with_estimate(300).assigned_to(jonas.id))
                .with_item(LineItem::new("Sew buttons")),
            Order::new("ORD-1044", "S. Haddad")
                .with_status(OrderStatus::InProgress)
                .starting(day(1))
                .due(day(9))
                .with_item(LineItem::new("Bespoke shirt").with_estimate(420).assigned_to(priya.id)),
            Order::new("ORD-1045", "K. Watanabe")
                .with_status(OrderStatus::New)
                .due(day(12))
                .with_item(LineItem::new("Taper jeans").with_estimate(60)),
            Order::new("ORD-1046", "A. Novak")
                .with_status(OrderStatus::New)
                .with_item(LineItem::new("Patch elbow").with_estimate(30)),
            Order::new("ORD-1038", "J. Byrne")
                .with_status(OrderStatus::Delivered)
                .due(day(-4))
                .with_item(LineItem::new("Let out waistcoat").with_estimate(60).assigned_to(jonas.id)),
        ];

        ShopSnapshot {
            orders,
            roster: vec![mara, jonas, priya],
        }
    }

    fn markers(&self) -> Vec<Marker> {
        let config = self.settings.allocator_config();
        let mut markers = vec![Marker::today(self.today)];
        markers.extend(workload::overload_markers(
            &self.workload.overload_warnings(&config),
        ));
        markers
    }

    /// Recompute workload and timeline items from the current orders.
    fn refresh(&mut self) {
        let config = self.settings.allocator_config();
        self.workload = workload::allocate(&self.snapshot.orders, &self.snapshot.roster, &config);
        self.view.set_features(workload::scheduled_features(
            &self.snapshot.orders,
            &self.snapshot.roster,
        ));
        self.view.set_markers(self.markers());
    }

    fn replace_snapshot(&mut self, snapshot: ShopSnapshot, path: Option<PathBuf>) {
        self.view.teardown();
        self.snapshot = snapshot;
        self.snapshot_path = path;
        self.selected = None;
        self.refresh();
        self.fit_range();
    }

    pub fn title(&self) -> String {
        match &self.snapshot_path {
            Some(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            None => "Untitled shop (unsaved)".to_string(),
        }
    }

    // --- File operations ---

    pub fn new_snapshot(&mut self) {
        self.replace_snapshot(ShopSnapshot::default(), None);
        self.status_message = "New shop created".to_string();
    }

    pub fn open_snapshot(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Shop Snapshot", &["json"])
            .pick_file()
        {
            match io::load_snapshot(&path) {
                Ok(snapshot) => {
                    self.replace_snapshot(snapshot, Some(path.clone()));
                    self.remember_snapshot(path);
                    self.status_message = "Shop loaded".to_string();
                }
                Err(e) => {
                    self.status_message = format!("Error loading: {}", e);
                }
            }
        }
    }

    pub fn save_snapshot(&mut self) {
        if let Some(path) = self.snapshot_path.clone() {
            match io::save_snapshot(&self.snapshot, &path) {
                Ok(()) => self.status_message = "Shop saved".to_string(),
                Err(e) => self.status_message = format!("Error saving: {}", e),
            }
        } else {
            self.save_snapshot_as();
        }
    }

    pub fn save_snapshot_as(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Shop Snapshot", &["json"])
            .set_file_name("shop.json")
            .save_file()
        {
            match io::save_snapshot(&self.snapshot, &path) {
                Ok(()) => {
                    self.snapshot_path = Some(path.clone());
                    self.remember_snapshot(path);
                    self.status_message = "Shop saved".to_string();
                }
                Err(e) => self.status_message = format!("Error saving: {}", e),
            }
        }
    }

    pub fn import_csv(&mut self) {
        if !self.snapshot.orders.is_empty() {
            let confirm = rfd::MessageDialog::new()
                .set_title("Import CSV")
                .set_description("This will replace the current orders. The roster is kept. Continue?")
                .set_buttons(rfd::MessageButtons::YesNo)
                .show();
            if confirm != rfd::MessageDialogResult::Yes {
                return;
            }
        }

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv", "txt"])
            .pick_file()
        {
            match io::import_orders(&path, &self.snapshot.roster) {
                Ok((orders, skipped)) => {
                    let count = orders.len();
                    let snapshot = ShopSnapshot {
                        orders,
                        roster: std::mem::take(&mut self.snapshot.roster),
                    };
                    self.replace_snapshot(snapshot, None);
                    self.status_message = if skipped > 0 {
                        format!("Imported {} orders ({} rows skipped)", count, skipped)
                    } else {
                        format!("Imported {} orders", count)
                    };
                }
                Err(e) => {
                    self.status_message = format!("CSV import failed: {}", e);
                }
            }
        }
    }

    pub fn export_workload(&mut self) {
        let config = self.settings.allocator_config();
        let summaries = self.workload.summaries(&config);
        let warnings = self.workload.overload_warnings(&config);

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .set_file_name("workload.csv")
            .save_file()
        {
            match io::export_workload(&summaries, &warnings, &path) {
                Ok(rows) => {
                    self.status_message = format!("Exported {} rows to CSV", rows);
                }
                Err(e) => {
                    self.status_message = format!("CSV export failed: {}", e);
                }
            }
        }
    }

    fn remember_snapshot(&mut self, path: PathBuf) {
        self.settings.last_snapshot = Some(path);
        self.save_settings();
    }

    fn save_settings(&self) {
        if let Err(e) = self.settings.save() {
            warn!(error = %e, "could not save settings");
        }
    }

    pub fn open_settings_folder(&mut self) {
        let result = Settings::config_dir().and_then(|dir| {
            std::fs::create_dir_all(&dir)?;
            Ok(dir)
        });
        match result {
            Ok(dir) => {
                if let Err(e) = open::that(&dir) {
                    self.status_message = format!("Could not open {}: {}", dir.display(), e);
                }
            }
            Err(e) => self.status_message = e.to_string(),
        }
    }

    // --- View ---

    pub fn zoom(&self) -> u32 {
        self.settings.zoom
    }

    fn set_zoom(&mut self, zoom: u32) {
        if zoom != self.settings.zoom {
            self.settings.zoom = zoom;
            self.view.set_zoom(zoom);
            self.save_settings();
        }
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(zoom_in(self.settings.zoom));
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(zoom_out(self.settings.zoom));
    }

    pub fn reset_zoom(&mut self) {
        self.set_zoom(DEFAULT_ZOOM);
    }

    pub fn range(&self) -> DateRange {
        self.view.grid().range
    }

    pub fn set_range(&mut self, range: DateRange) {
        self.view.set_range(range);
        if range.is_empty() {
            self.status_message = "The range ends before it starts; nothing to show".to_string();
        }
    }

    /// Whole months around every scheduled order.
    pub fn fit_range(&mut self) {
        let spans: Vec<_> = self
            .view
            .features()
            .iter()
            .map(|f| (f.start_at(), f.end_at()))
            .collect();
        self.view.set_range(DateRange::covering(spans, self.today));
    }

    fn order_reference(&self, id: &str) -> String {
        self.snapshot
            .orders
            .iter()
            .find(|order| order.id.to_string() == id)
            .map(|order| order.reference.clone())
            .unwrap_or_else(|| id.to_string())
    }

    fn handle_timeline_events(&mut self, events: Vec<TimelineEvent>) {
        for event in events {
            match event {
                TimelineEvent::Select(id) => {
                    self.status_message = format!("Selected {}", self.order_reference(&id));
                    self.selected = Some(id);
                }
                TimelineEvent::Update(feature) => {
                    if workload::apply_feature_update(&mut self.snapshot.orders, &feature).is_none() {
                        warn!(feature = feature.id(), "update for an order that no longer exists");
                        continue;
                    }
                    self.status_message = format!(
                        "Rescheduled {} ({} → {})",
                        self.order_reference(feature.id()),
                        feature.start_at().format("%Y-%m-%d"),
                        feature.end_at().format("%Y-%m-%d"),
                    );
                    // Shown dates stay as dropped even when the write fails.
                    if let Some(path) = self.snapshot_path.clone() {
                        if let Err(e) = io::save_snapshot(&self.snapshot, &path) {
                            warn!(error = %e, "could not persist rescheduled order");
                            self.status_message = format!("Rescheduled, but saving failed: {}", e);
                        }
                    }
                    self.refresh();
                }
                TimelineEvent::ContextMenu { feature_id, .. } => {
                    info!(feature = %feature_id, "context menu opened");
                }
            }
        }
    }
}

impl eframe::App for ScheduleApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ui::theme::apply_theme(ctx);

        let today = chrono::Local::now().date_naive();
        if today != self.today {
            self.today = today;
            self.view.set_markers(self.markers());
        }

        if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::S)) {
            self.save_snapshot();
        }

        // Top panel: toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::toolbar::show_toolbar(self, ui);
        });

        // Bottom panel: status bar
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(ui::theme::STATUS_BAR_HEIGHT)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_STATUS_BAR)
                    .inner_margin(egui::Margin::symmetric(10.0, 0.0)),
            )
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new(&self.status_message)
                            .font(ui::theme::font_sub())
                            .color(ui::theme::TEXT_SECONDARY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            egui::RichText::new(format!(
                                "Orders: {} · Staff: {} · Zoom: {}%",
                                self.snapshot.orders.len(),
                                self.snapshot.roster.len(),
                                self.settings.zoom
                            ))
                            .size(10.5)
                            .color(ui::theme::TEXT_DIM),
                        );
                    });
                });
            });

        // Left panel: workload
        let config = self.settings.allocator_config();
        let mut picked = None;
        egui::SidePanel::left("workload_panel")
            .default_width(ui::theme::SIDE_PANEL_WIDTH)
            .resizable(true)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_PANEL)
                    .inner_margin(egui::Margin::same(8.0))
                    .stroke(egui::Stroke::new(1.0, ui::theme::BORDER_SUBTLE)),
            )
            .show(ctx, |ui| {
                picked = ui::workload_panel::show_workload_panel(
                    &self.workload,
                    &config,
                    &self.snapshot.orders,
                    self.selected.as_deref(),
                    ui,
                );
            });
        if let Some(id) = picked {
            self.status_message = format!("Selected {}", self.order_reference(&id));
            self.selected = Some(id);
        }

        // Central panel: timeline
        let chart_frame = egui::Frame::default()
            .fill(ui::theme::BG_DARK)
            .inner_margin(egui::Margin::ZERO);
        let output = egui::CentralPanel::default()
            .frame(chart_frame)
            .show(ctx, |ui| {
                ui::timeline_chart::show_timeline_chart(
                    &mut self.view,
                    &mut self.chart,
                    self.selected.as_deref(),
                    self.today,
                    ui,
                )
            })
            .inner;

        match output.zoom_steps.signum() {
            1 => self.zoom_in(),
            -1 => self.zoom_out(),
            _ => {}
        }
        self.handle_timeline_events(output.events);

        if self.show_about {
            ui::dialogs::show_about_dialog(self, ctx);
        }
    }
}
