use crate::ui::theme;
use egui::{Color32, Painter, Pos2, Rect, Rounding, Sense, Stroke, Ui, Vec2};
use gantt_planner::layout::{Bar, ConnectorPath, Layout, Point, TickRow};
use gantt_planner::model::{Project, Task};

const HEADER_HEIGHT: f32 = theme::HEADER_HEIGHT;
const TICK_ROW_HEIGHT: f32 = HEADER_HEIGHT / 2.0;
/// Narrower ticks are drawn without a label.
const MIN_LABEL_WIDTH: f32 = 14.0;

pub enum ZoomRequest {
    In,
    Out,
}

/// Result details from interactions in the Gantt chart.
#[derive(Default)]
pub struct ChartInteraction {
    /// A bar was clicked.
    pub selected: Option<String>,
    /// Empty canvas was clicked.
    pub cleared: bool,
    pub zoom: Option<ZoomRequest>,
}

/// Paint a computed [`Layout`] and report clicks on it.
pub fn show_gantt_chart(
    layout: &Layout,
    project: Option<&Project>,
    row_height: f32,
    selected_task: Option<&str>,
    ui: &mut Ui,
) -> ChartInteraction {
    let mut interaction = ChartInteraction::default();
    let available = ui.available_size();
    let chart_width = layout.canvas_width.max(available.x);
    let chart_height = (HEADER_HEIGHT + layout.canvas_height).max(available.y);

    // Ctrl + scroll zooms
    if ui.rect_contains_pointer(ui.max_rect()) && ui.input(|i| i.modifiers.ctrl) {
        let scroll = ui.input(|i| i.smooth_scroll_delta.y);
        if scroll > 0.0 {
            interaction.zoom = Some(ZoomRequest::In);
        } else if scroll < 0.0 {
            interaction.zoom = Some(ZoomRequest::Out);
        }
    }

    egui::ScrollArea::both()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let (response, painter) =
                ui.allocate_painter(Vec2::new(chart_width, chart_height), Sense::click());
            let origin = response.rect.min;
            let body_top = origin.y + HEADER_HEIGHT;
            let mut consumed_click = false;

            painter.rect_filled(response.rect, 0.0, theme::BG_DARK);

            for column in &layout.grid {
                let x = origin.x + column.x;
                if column.weekend {
                    painter.rect_filled(
                        Rect::from_min_size(Pos2::new(x, body_top), Vec2::new(column.width, chart_height)),
                        0.0,
                        theme::BG_WEEKEND,
                    );
                }
                painter.line_segment(
                    [Pos2::new(x, body_top), Pos2::new(x, origin.y + chart_height)],
                    Stroke::new(0.5, theme::GRID_LINE),
                );
            }

            let rows = (layout.canvas_height / row_height).round() as usize;
            for row in 1..=rows {
                let y = body_top + row as f32 * row_height;
                painter.line_segment(
                    [Pos2::new(origin.x, y), Pos2::new(origin.x + chart_width, y)],
                    Stroke::new(0.5, theme::BORDER_SUBTLE),
                );
            }

            draw_header(&painter, origin, layout, chart_width);

            if let Some(x) = layout.today_marker_x {
                let x = origin.x + x;
                painter.line_segment(
                    [Pos2::new(x, origin.y), Pos2::new(x, origin.y + chart_height)],
                    Stroke::new(1.5, theme::TODAY_LINE),
                );
            }

            let to_screen = |p: Point| Pos2::new(origin.x + p.x, body_top + p.y);
            for path in &layout.dependency_paths {
                draw_connector(&painter, path, to_screen);
            }

            for bar in &layout.bars {
                let is_selected = selected_task == Some(bar.id.as_str());
                let rect = draw_bar(&painter, Pos2::new(origin.x, body_top), bar, is_selected);
                let hover = match project.and_then(|p| p.task(&bar.id).map(|t| (p, t))) {
                    Some((project, task)) => task_details(task, project),
                    None => format!("{} · {}", bar.id, bar.label),
                };
                let bar_response = ui
                    .interact(rect, ui.make_persistent_id(("task-bar", &bar.id)), Sense::click())
                    .on_hover_text(hover);
                if bar_response.clicked() {
                    interaction.selected = Some(bar.id.clone());
                    consumed_click = true;
                }
            }

            if response.clicked() && !consumed_click {
                interaction.cleared = true;
            }
        });

    interaction
}

/// Multi-line summary of a task for hover text.
pub fn task_details(task: &Task, project: &Project) -> String {
    let resources = project.assignment_labels(task);
    format!(
        "{}\nPhase: {}\nStart: {}\nEnd: {}\nDuration: {} days\nCompletion: {}%\nResponsible: {}\nResources: {}",
        task.name,
        task.phase,
        task.start().format("%d/%m/%Y"),
        task.end().format("%d/%m/%Y"),
        task.duration(),
        task.completion,
        task.responsible_role,
        if resources.is_empty() { "-".to_string() } else { resources.join(", ") },
    )
}

fn draw_header(painter: &Painter, origin: Pos2, layout: &Layout, width: f32) {
    painter.rect_filled(
        Rect::from_min_size(origin, Vec2::new(width, HEADER_HEIGHT)),
        0.0,
        theme::BG_HEADER,
    );
    painter.line_segment(
        [
            Pos2::new(origin.x, origin.y + HEADER_HEIGHT),
            Pos2::new(origin.x + width, origin.y + HEADER_HEIGHT),
        ],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );

    for tick in &layout.ticks {
        let (top, font, color) = match tick.row {
            TickRow::Primary => (origin.y, theme::font_header(), theme::TEXT_PRIMARY),
            TickRow::Secondary => (
                origin.y + TICK_ROW_HEIGHT,
                theme::font_sub(),
                if tick.weekend { theme::TEXT_DIM } else { theme::TEXT_SECONDARY },
            ),
        };
        let cell = Rect::from_min_size(
            Pos2::new(origin.x + tick.x, top),
            Vec2::new(tick.width, TICK_ROW_HEIGHT),
        );
        painter.line_segment(
            [cell.left_top(), cell.left_bottom()],
            Stroke::new(0.5, theme::BORDER_SUBTLE),
        );
        if tick.width >= MIN_LABEL_WIDTH {
            painter.with_clip_rect(cell).text(
                Pos2::new(cell.left() + 4.0, cell.center().y),
                egui::Align2::LEFT_CENTER,
                &tick.label,
                font,
                color,
            );
        }
    }
}

fn draw_bar(painter: &Painter, origin: Pos2, bar: &Bar, is_selected: bool) -> Rect {
    let bar_rect = Rect::from_min_size(
        Pos2::new(origin.x + bar.x, origin.y + bar.y),
        Vec2::new(bar.width, bar.height),
    );
    let rounding = Rounding::same(theme::BAR_ROUNDING.min(bar.width / 2.0));

    painter.rect_filled(bar_rect.translate(Vec2::new(1.0, 2.0)), rounding, Color32::from_black_alpha(35));
    painter.rect_filled(bar_rect, rounding, theme::bar_color(&bar.color));

    if bar.completion_width > 0.0 {
        let progress_rect = Rect::from_min_size(bar_rect.min, Vec2::new(bar.completion_width, bar.height));
        painter.rect_filled(progress_rect, rounding, theme::PROGRESS_OVERLAY);
    }

    if is_selected {
        painter.rect_stroke(
            bar_rect.expand(1.5),
            Rounding::same(theme::BAR_ROUNDING + 1.5),
            Stroke::new(2.0, theme::BORDER_ACCENT),
        );
    }

    // Responsible role, clipped to the bar
    if bar.width > 30.0 {
        let galley = painter.layout_no_wrap(bar.label.clone(), theme::font_bar(), theme::TEXT_ON_BAR);
        let text_y = bar_rect.top() + (bar.height - galley.size().y) / 2.0;
        painter
            .with_clip_rect(bar_rect)
            .galley(Pos2::new(bar_rect.left() + 6.0, text_y), galley, Color32::TRANSPARENT);
    }

    bar_rect
}

fn draw_connector(painter: &Painter, path: &ConnectorPath, to_screen: impl Fn(Point) -> Pos2) {
    let stroke = Stroke::new(1.5, theme::CONNECTOR);
    for segment in path.segments.iter().filter(|s| s.length() > 0.0) {
        painter.line_segment([to_screen(segment.start), to_screen(segment.end)], stroke);
    }
    painter.add(egui::Shape::convex_polygon(
        path.arrow.points.iter().map(|p| to_screen(*p)).collect(),
        theme::CONNECTOR,
        Stroke::NONE,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use gantt_planner::model::{Resource, ResourceAssignment};

    #[test]
    fn details_list_schedule_role_and_loads() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let mut task = Task::new("2", "Hardware", "Routing", start, 10);
        task.completion = 40;
        task.responsible_role = "Engineer".into();
        task.resource_assignments = vec![
            ResourceAssignment { resource_id: "1".into(), load: 80.0, is_responsible: true },
            ResourceAssignment { resource_id: "0".into(), load: 20.0, is_responsible: false },
        ];
        let resources = vec![Resource::new("0", "Claire", "Lead"), Resource::new("1", "Marc", "Engineer")];
        let project = Project::new("p", vec![task], resources, start);

        let details = task_details(&project.tasks[0], &project);
        assert_eq!(
            details,
            "Routing\nPhase: Hardware\nStart: 06/01/2025\nEnd: 16/01/2025\nDuration: 10 days\n\
             Completion: 40%\nResponsible: Engineer\nResources: Marc (80%), Claire (20%)"
        );
    }

    #[test]
    fn details_without_assignments_show_a_dash() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let project = Project::new("p", vec![Task::new("1", "Plan", "Kickoff", start, 0)], Vec::new(), start);
        assert!(task_details(&project.tasks[0], &project).ends_with("Responsible: -\nResources: -"));
    }
}
