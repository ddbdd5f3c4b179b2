use crate::ui::theme;
use egui::{Color32, RichText, Ui};
use egui_phosphor::regular as icons;
use gantt_planner::model::{Project, Task};

use super::gantt_chart::task_details;

/// Actions that the task table can request.
pub enum TaskTableAction {
    None,
    Select(String),
    FilterChanged,
}

/// Render the filter box and the filtered task list.
///
/// `tasks` is already filtered; `total` is the unfiltered count.
pub fn show_task_table(
    tasks: &[&Task],
    project: Option<&Project>,
    total: usize,
    selected_task: Option<&str>,
    filter: &mut String,
    ui: &mut Ui,
) -> TaskTableAction {
    let mut action = TaskTableAction::None;

    ui.add_space(2.0);
    ui.horizontal(|ui| {
        ui.label(RichText::new("Tasks").strong().size(15.0).color(theme::TEXT_PRIMARY));
        ui.add_space(4.0);
        let count = if tasks.len() == total {
            format!("({total})")
        } else {
            format!("({} of {total})", tasks.len())
        };
        ui.label(RichText::new(count).size(11.0).color(theme::TEXT_DIM));
    });
    ui.add_space(4.0);

    ui.horizontal(|ui| {
        ui.label(RichText::new(icons::MAGNIFYING_GLASS).color(theme::TEXT_DIM));
        let edit = egui::TextEdit::singleline(filter)
            .hint_text("Filter by name, phase or id")
            .desired_width(f32::INFINITY);
        if ui.add(edit).changed() {
            action = TaskTableAction::FilterChanged;
        }
    });

    ui.add_space(6.0);
    ui.separator();

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            egui::Grid::new("task_table_grid")
                .num_columns(6)
                .spacing([8.0, 6.0])
                .show(ui, |ui| {
                    for header in ["#", "ID", "PHASE", "TASK", "RESP", "DAYS"] {
                        ui.label(RichText::new(header).size(9.0).color(theme::TEXT_DIM).strong());
                    }
                    ui.end_row();

                    for (i, task) in tasks.iter().enumerate() {
                        let is_selected = selected_task == Some(task.id.as_str());
                        let text_color = if is_selected { Color32::WHITE } else { theme::TEXT_PRIMARY };

                        ui.label(RichText::new((i + 1).to_string()).size(10.0).color(theme::TEXT_DIM));
                        ui.label(RichText::new(&task.id).size(10.0).color(theme::TEXT_SECONDARY));
                        ui.label(
                            RichText::new(&task.phase)
                                .size(10.0)
                                .color(theme::bar_color(&task.color)),
                        );
                        let mut name =
                            ui.selectable_label(is_selected, RichText::new(&task.name).size(12.0).color(text_color));
                        if let Some(project) = project {
                            name = name.on_hover_text(task_details(task, project));
                        }
                        if name.clicked() {
                            action = TaskTableAction::Select(task.id.clone());
                        }
                        ui.label(RichText::new(&task.responsible_role).size(10.0).color(theme::TEXT_SECONDARY));
                        ui.label(RichText::new(task.duration().to_string()).size(10.0).color(theme::TEXT_SECONDARY));
                        ui.end_row();
                    }
                });
        });

    action
}
