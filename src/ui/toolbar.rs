use crate::app::PlannerApp;
use crate::ui::theme;
use egui::{menu, RichText, Ui};
use egui_phosphor::regular as icons;
use gantt_planner::layout::LabelLocale;
use gantt_planner::model::TimelineScale;

/// Render the top toolbar / menu bar.
pub fn show_toolbar(app: &mut PlannerApp, ui: &mut Ui) {
    menu::bar(ui, |ui| {
        ui.menu_button(RichText::new("  File  ").font(theme::font_menu()), |ui| {
            if ui.button(format!("{} Open Plan...   Ctrl+O", icons::FOLDER_OPEN)).clicked() {
                app.open_plan_dialog();
                ui.close_menu();
            }
            let reload = ui.add_enabled(
                app.plan_path().is_some(),
                egui::Button::new(format!("{} Reload", icons::ARROW_CLOCKWISE)),
            );
            if reload.clicked() {
                app.reload_plan();
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  View  ").font(theme::font_menu()), |ui| {
            if ui.button("  Zoom In        Ctrl+=").clicked() {
                app.session.zoom_in();
                ui.close_menu();
            }
            if ui.button("  Zoom Out      Ctrl+-").clicked() {
                app.session.zoom_out();
                ui.close_menu();
            }
            if ui.button("  Fit to Window  Ctrl+0").clicked() {
                app.request_refit();
                ui.close_menu();
            }
            ui.separator();
            let mut weekends = app.session.view().show_weekends;
            if ui.checkbox(&mut weekends, "Shade weekends").changed() {
                app.session.toggle_weekends();
                app.settings.show_weekends = weekends;
                app.persist_settings();
            }
            ui.separator();
            ui.label(RichText::new("Labels").small().weak());
            for (locale, name) in [(LabelLocale::En, "English"), (LabelLocale::Fr, "Français")] {
                if ui.radio(app.settings.locale == locale, name).clicked() {
                    app.set_locale(locale);
                    ui.close_menu();
                }
            }
        });

        ui.menu_button(RichText::new("  Help  ").font(theme::font_menu()), |ui| {
            if ui.button("About").clicked() {
                app.show_about = true;
                ui.close_menu();
            }
        });

        ui.separator();

        // Scale switcher
        let current = app.session.view().scale;
        for &scale in TimelineScale::all() {
            if ui.selectable_label(current == scale, scale.label()).clicked() && current != scale {
                app.session.set_scale(scale);
            }
        }

        ui.separator();
        if ui.button(icons::MAGNIFYING_GLASS_MINUS).on_hover_text("Zoom out").clicked() {
            app.session.zoom_out();
        }
        if ui.button(icons::MAGNIFYING_GLASS_PLUS).on_hover_text("Zoom in").clicked() {
            app.session.zoom_in();
        }
        if ui.button(icons::ARROWS_OUT_LINE_HORIZONTAL).on_hover_text("Fit to window").clicked() {
            app.request_refit();
        }

        // Right-aligned project name
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let name = app
                .session
                .project()
                .map(|p| p.name.as_str())
                .unwrap_or("No plan loaded");
            ui.label(RichText::new(name).size(11.0).weak());
        });
    });
}
