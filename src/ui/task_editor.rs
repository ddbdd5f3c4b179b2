use crate::ui::theme;
use chrono::NaiveDate;
use egui::{Color32, RichText, Ui};
use gantt_planner::edit::TaskUpdate;
use gantt_planner::model::{Project, Task};

/// Actions the editor can request.
pub enum EditorAction {
    None,
    Apply,
    Close,
}

/// One resource row in the editor.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRow {
    pub resource_id: String,
    pub label: String,
    pub load: f64,
}

/// Editable copy of the selected task's fields.
///
/// Edits go to the draft; only "Apply" turns it into a [`TaskUpdate`].
#[derive(Debug, Clone, PartialEq)]
pub struct EditorDraft {
    pub task_id: String,
    pub name: String,
    pub start: NaiveDate,
    pub duration: i64,
    pub completion: i64,
    pub cost: f64,
    pub loads: Vec<LoadRow>,
}

impl EditorDraft {
    pub fn from_task(task: &Task, project: &Project) -> Self {
        let loads = project
            .resources
            .iter()
            .map(|r| LoadRow {
                resource_id: r.id.clone(),
                label: format!("{} ({})", r.name, r.role_name),
                load: task
                    .resource_assignments
                    .iter()
                    .find(|a| a.resource_id == r.id)
                    .map_or(0.0, |a| a.load),
            })
            .collect();
        Self {
            task_id: task.id.clone(),
            name: task.name.clone(),
            start: task.start(),
            duration: task.duration().max(0),
            completion: i64::from(task.completion),
            cost: task.cost,
            loads,
        }
    }

    /// The fields that differ from `baseline`, as an update.
    pub fn to_update(&self, baseline: &EditorDraft) -> TaskUpdate {
        fn changed<T: PartialEq + Clone>(now: &T, before: &T) -> Option<T> {
            (now != before).then(|| now.clone())
        }
        TaskUpdate {
            name: changed(&self.name, &baseline.name),
            start: changed(&self.start, &baseline.start),
            duration: changed(&self.duration, &baseline.duration),
            completion: changed(&self.completion, &baseline.completion),
            cost: changed(&self.cost, &baseline.cost),
            resource_loads: (self.loads != baseline.loads).then(|| {
                self.loads
                    .iter()
                    .map(|row| (row.resource_id.clone(), row.load))
                    .collect()
            }),
        }
    }
}

/// Render the inline editor for the selected task.
pub fn show_task_editor(draft: &mut EditorDraft, ui: &mut Ui) -> EditorAction {
    let mut action = EditorAction::None;

    ui.add_space(6.0);
    ui.horizontal(|ui| {
        ui.label(RichText::new("Edit Task").strong().size(13.0).color(theme::TEXT_PRIMARY));
        ui.label(RichText::new(format!("#{}", draft.task_id)).size(11.0).color(theme::TEXT_DIM));
    });
    ui.add_space(4.0);

    egui::Grid::new("task_editor_grid")
        .num_columns(2)
        .spacing([12.0, 6.0])
        .show(ui, |ui| {
            ui.label(RichText::new("Name").color(theme::TEXT_SECONDARY));
            ui.text_edit_singleline(&mut draft.name);
            ui.end_row();

            ui.label(RichText::new("Start").color(theme::TEXT_SECONDARY));
            ui.add(egui_extras::DatePickerButton::new(&mut draft.start).id_salt("editor_dp_start"));
            ui.end_row();

            // Ranges are left open so out-of-range input reaches validation.
            ui.label(RichText::new("Duration (days)").color(theme::TEXT_SECONDARY));
            ui.add(egui::DragValue::new(&mut draft.duration).speed(0.2));
            ui.end_row();

            ui.label(RichText::new("Complete (%)").color(theme::TEXT_SECONDARY));
            ui.add(egui::DragValue::new(&mut draft.completion).speed(0.5).suffix("%"));
            ui.end_row();

            ui.label(RichText::new("Cost").color(theme::TEXT_SECONDARY));
            ui.add(egui::DragValue::new(&mut draft.cost).speed(10.0));
            ui.end_row();
        });

    if !draft.loads.is_empty() {
        ui.add_space(6.0);
        ui.label(RichText::new("Resource load (%)").small().color(theme::TEXT_DIM).strong());
        egui::Grid::new("task_editor_loads")
            .num_columns(2)
            .spacing([12.0, 4.0])
            .show(ui, |ui| {
                for row in &mut draft.loads {
                    ui.label(RichText::new(&row.label).size(11.0));
                    ui.add(egui::DragValue::new(&mut row.load).speed(1.0).suffix("%"));
                    ui.end_row();
                }
            });
    }

    ui.add_space(6.0);
    ui.horizontal(|ui| {
        let apply = egui::Button::new(RichText::new("Apply").color(Color32::WHITE))
            .fill(theme::ACCENT)
            .rounding(egui::Rounding::same(4.0));
        if ui.add_sized([80.0, 26.0], apply).clicked() {
            action = EditorAction::Apply;
        }
        if ui.add_sized([80.0, 26.0], egui::Button::new("Close")).clicked() {
            action = EditorAction::Close;
        }
    });

    action
}
