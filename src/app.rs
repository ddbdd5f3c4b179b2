use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};

use gantt_planner::config::Settings;
use gantt_planner::error::ParseError;
use gantt_planner::io::{FilePlanSource, PlanSource};
use gantt_planner::layout::LabelLocale;
use gantt_planner::{LoadOutcome, LoadTicket, PlanSession};
use tracing::{info, warn};

use crate::ui;
use crate::ui::task_editor::EditorDraft;

/// A file read running on a background thread.
struct PendingLoad {
    ticket: LoadTicket,
    path: PathBuf,
    name: String,
    receiver: Receiver<Result<String, ParseError>>,
}

/// Main application state.
pub struct PlannerApp {
    pub session: PlanSession,
    pub settings: Settings,
    plan_path: Option<PathBuf>,
    pending_loads: Vec<PendingLoad>,
    ctx: egui::Context,

    pub selected_task: Option<String>,
    editor: Option<EditorDraft>,
    refit_requested: bool,

    pub show_about: bool,
    pub error_message: Option<String>,
    pub status_message: String,
}

impl PlannerApp {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: Settings, initial_plan: Option<PathBuf>) -> Self {
        // Register Phosphor icon font as a fallback so icons render inline with text
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);
        ui::theme::apply_theme(&cc.egui_ctx);

        let session = PlanSession::new(
            settings.view_state(),
            settings.layout_engine(),
            settings.parse_options(),
        );
        let plan = initial_plan.or_else(|| settings.last_plan.clone());

        let mut app = Self {
            session,
            settings,
            plan_path: None,
            pending_loads: Vec::new(),
            ctx: cc.egui_ctx.clone(),
            selected_task: None,
            editor: None,
            refit_requested: false,
            show_about: false,
            error_message: None,
            status_message: "Open a .gan plan to begin".to_string(),
        };
        if let Some(path) = plan {
            app.start_load(path);
        }
        app
    }

    pub fn plan_path(&self) -> Option<&Path> {
        self.plan_path.as_deref()
    }

    // --- Loading ---

    pub fn open_plan_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("GanttProject", &["gan", "xml"])
            .pick_file()
        {
            self.start_load(path);
        }
    }

    pub fn reload_plan(&mut self) {
        if let Some(path) = self.plan_path.clone() {
            self.start_load(path);
        }
    }

    /// Read `path` off the UI thread. Parsing happens when the text arrives.
    fn start_load(&mut self, path: PathBuf) {
        let ticket = self.session.begin_load();
        let source = FilePlanSource::new(&path);
        let name = source.describe();
        let (sender, receiver) = mpsc::channel();
        let ctx = self.ctx.clone();
        std::thread::spawn(move || {
            // The receiver is gone if the app closed first.
            let _ = sender.send(source.fetch());
            ctx.request_repaint();
        });

        info!(path = %path.display(), "loading plan");
        self.status_message = format!("Loading {name}…");
        self.pending_loads.push(PendingLoad { ticket, path, name, receiver });
    }

    fn poll_loads(&mut self) {
        let mut still_pending = Vec::new();
        for pending in std::mem::take(&mut self.pending_loads) {
            match pending.receiver.try_recv() {
                Ok(fetched) => self.finish_load(pending, fetched),
                Err(TryRecvError::Empty) => still_pending.push(pending),
                Err(TryRecvError::Disconnected) => {
                    warn!(path = %pending.path.display(), "plan reader exited without a result");
                }
            }
        }
        self.pending_loads = still_pending;
    }

    fn finish_load(&mut self, pending: PendingLoad, fetched: Result<String, ParseError>) {
        let today = chrono::Local::now().date_naive();
        match self.session.finish_load(pending.ticket, fetched, &pending.name, today) {
            Ok(LoadOutcome::Replaced) => {
                let count = self.session.project().map_or(0, |p| p.tasks.len());
                self.status_message = format!("Loaded {} ({count} tasks)", pending.name);
                self.selected_task = None;
                self.editor = None;
                self.settings.last_plan = Some(pending.path.clone());
                self.plan_path = Some(pending.path);
                self.persist_settings();
            }
            Ok(LoadOutcome::Stale) => {}
            Err(e) => {
                self.status_message = format!("Could not load {}", pending.name);
                self.error_message = Some(e.to_string());
            }
        }
    }

    // --- View ---

    pub fn request_refit(&mut self) {
        self.refit_requested = true;
    }

    pub fn set_locale(&mut self, locale: LabelLocale) {
        self.settings.locale = locale;
        self.session.engine_mut().locale = locale;
        self.persist_settings();
    }

    pub fn persist_settings(&self) {
        if let Err(e) = self.settings.save() {
            warn!(error = %e, "could not save settings");
        }
    }

    // --- Editing ---

    fn select_task(&mut self, id: Option<String>) {
        self.editor = match (&id, self.session.project()) {
            (Some(id), Some(project)) => project.task(id).map(|t| EditorDraft::from_task(t, project)),
            _ => None,
        };
        self.selected_task = id;
    }

    fn apply_editor(&mut self) {
        let Some(draft) = self.editor.as_ref() else {
            return;
        };
        let id = draft.task_id.clone();
        let Some(baseline) = self
            .session
            .project()
            .and_then(|p| p.task(&id).map(|t| EditorDraft::from_task(t, p)))
        else {
            self.select_task(None);
            return;
        };
        let update = draft.to_update(&baseline);
        if update.is_empty() {
            self.status_message = "No changes to apply".to_string();
            return;
        }
        match self.session.update_task(&id, update) {
            Ok(Some(task)) => {
                self.status_message = format!(
                    "Updated '{}' ({} → {})",
                    task.name,
                    task.start().format("%Y-%m-%d"),
                    task.end().format("%Y-%m-%d")
                );
                self.select_task(Some(id));
            }
            Ok(None) => self.select_task(None),
            Err(e) => self.error_message = Some(e.to_string()),
        }
    }
}

impl eframe::App for PlannerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_loads();

        // Handle keyboard shortcuts outside closures to avoid borrow issues
        let (open, zoom_in, zoom_out, fit) = ctx.input(|i| {
            let ctrl = i.modifiers.ctrl;
            (
                ctrl && i.key_pressed(egui::Key::O),
                ctrl && (i.key_pressed(egui::Key::Equals) || i.key_pressed(egui::Key::Plus)),
                ctrl && i.key_pressed(egui::Key::Minus),
                ctrl && i.key_pressed(egui::Key::Num0),
            )
        });
        if open {
            self.open_plan_dialog();
        }
        if zoom_in {
            self.session.zoom_in();
        }
        if zoom_out {
            self.session.zoom_out();
        }
        if fit {
            self.request_refit();
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::toolbar::show_toolbar(self, ui);
        });

        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(ui::theme::STATUS_BAR_HEIGHT)
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new(&self.status_message)
                            .size(11.0)
                            .color(ui::theme::TEXT_SECONDARY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let view = self.session.view();
                        ui.label(
                            egui::RichText::new(format!(
                                "{} · {:.1} px/day",
                                view.scale.label(),
                                view.pixels_per_day()
                            ))
                            .size(10.5)
                            .color(ui::theme::TEXT_DIM),
                        );
                    });
                });
            });

        // Left panel: editor + task table
        let mut editor_action = ui::task_editor::EditorAction::None;
        let mut table_action = ui::task_table::TaskTableAction::None;
        let mut filter = self.session.view().filter_query.clone();
        egui::SidePanel::left("task_panel")
            .default_width(ui::theme::SIDE_PANEL_WIDTH)
            .resizable(true)
            .show(ctx, |ui| {
                if let Some(draft) = self.editor.as_mut() {
                    editor_action = ui::task_editor::show_task_editor(draft, ui);
                    ui.add_space(4.0);
                    ui.separator();
                }
                let visible = self.session.visible_tasks();
                let total = self.session.project().map_or(0, |p| p.tasks.len());
                table_action = ui::task_table::show_task_table(
                    &visible,
                    self.session.project(),
                    total,
                    self.selected_task.as_deref(),
                    &mut filter,
                    ui,
                );
            });

        match editor_action {
            ui::task_editor::EditorAction::Apply => self.apply_editor(),
            ui::task_editor::EditorAction::Close => self.select_task(None),
            ui::task_editor::EditorAction::None => {}
        }
        match table_action {
            ui::task_table::TaskTableAction::Select(id) => self.select_task(Some(id)),
            ui::task_table::TaskTableAction::FilterChanged => self.session.set_filter(filter),
            ui::task_table::TaskTableAction::None => {}
        }

        // Central panel: Gantt chart
        let chart_frame = egui::Frame::default()
            .fill(ui::theme::BG_DARK)
            .inner_margin(egui::Margin::ZERO);
        egui::CentralPanel::default().frame(chart_frame).show(ctx, |ui| {
            let viewport_width = ui.available_width();
            let today = chrono::Local::now().date_naive();
            if self.session.take_fit_request() {
                self.session.fit(viewport_width);
            }
            if std::mem::take(&mut self.refit_requested) {
                self.session.refit(viewport_width, today);
            }

            let layout = self.session.layout(today);
            let row_height = self.settings.metrics.row_height;
            let interaction = ui::gantt_chart::show_gantt_chart(
                &layout,
                self.session.project(),
                row_height,
                self.selected_task.as_deref(),
                ui,
            );

            if let Some(id) = interaction.selected {
                self.select_task(Some(id));
            } else if interaction.cleared {
                self.select_task(None);
            }
            match interaction.zoom {
                Some(ui::gantt_chart::ZoomRequest::In) => self.session.zoom_in(),
                Some(ui::gantt_chart::ZoomRequest::Out) => self.session.zoom_out(),
                None => {}
            }
        });

        if self.show_about {
            ui::dialogs::show_about_dialog(self, ctx);
        }
        if self.error_message.is_some() {
            ui::dialogs::show_error_dialog(self, ctx);
        }
    }
}
