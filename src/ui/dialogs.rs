use crate::app::PlannerApp;
use crate::ui::theme;
use egui::{Context, RichText, Window};

/// Render the "About" dialog.
pub fn show_about_dialog(app: &mut PlannerApp, ctx: &Context) {
    let mut should_close = false;
    Window::new("About")
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([320.0, 180.0])
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(12.0);
                ui.heading(RichText::new("Gantt Planner").strong());
                ui.add_space(2.0);
                ui.label(
                    RichText::new(format!("Version {}", env!("CARGO_PKG_VERSION")))
                        .color(theme::TEXT_SECONDARY),
                );
                ui.add_space(10.0);
                ui.label("Timeline viewer for GanttProject plans");
                ui.label("built with Rust and egui.");
                ui.add_space(14.0);
                if ui.add_sized([100.0, 28.0], egui::Button::new("Close")).clicked() {
                    should_close = true;
                }
            });
        });
    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.show_about = false;
    }
}

/// Render the modal for a failed load or a rejected edit.
pub fn show_error_dialog(app: &mut PlannerApp, ctx: &Context) {
    let Some(message) = app.error_message.clone() else {
        return;
    };
    let mut should_close = false;
    Window::new(RichText::new("Something went wrong").strong().size(14.0))
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .default_width(420.0)
        .show(ctx, |ui| {
            ui.add_space(4.0);
            ui.label(RichText::new(message).color(theme::ERROR));
            ui.add_space(10.0);
            if ui.add_sized([80.0, 28.0], egui::Button::new("OK")).clicked() {
                should_close = true;
            }
        });
    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.error_message = None;
    }
}
