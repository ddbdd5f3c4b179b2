//! Timeline layout: turns a project and a view state into pixel geometry.
//!
//! Nothing here paints. A rendering surface consumes [`Layout`] as-is.

pub mod fit;
pub mod routing;
pub mod ticks;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::edit::filter_tasks;
use crate::error::LayoutDegenerate;
use crate::model::{Project, ProjectBounds, Task, ViewState};

pub use fit::fit_view;
pub use routing::{route_connector, Arrowhead, ConnectorPath, Segment, SegmentAxis};
pub use ticks::{GridColumn, LabelLocale, Tick, TickRow};

/// A position in timeline pixel space (origin at the range start, top row).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in timeline pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right_center(&self) -> Point {
        Point::new(self.x + self.width, self.y + self.height / 2.0)
    }

    pub fn left_center(&self) -> Point {
        Point::new(self.x, self.y + self.height / 2.0)
    }
}

/// Row and bar sizing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutMetrics {
    pub row_height: f32,
    /// Gap between the top of a row and the top of its bar.
    pub bar_inset: f32,
    pub bar_height: f32,
    /// Bars never get narrower than this, so zero-length tasks stay clickable.
    pub min_bar_width: f32,
}

impl LayoutMetrics {
    /// Positive row and bar heights, non-negative inset and minimum width.
    pub fn is_valid(&self) -> bool {
        let finite = [self.row_height, self.bar_inset, self.bar_height, self.min_bar_width]
            .iter()
            .all(|v| v.is_finite());
        finite
            && self.row_height > 0.0
            && self.bar_height > 0.0
            && self.bar_inset >= 0.0
            && self.min_bar_width >= 0.0
    }
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            row_height: 44.0,
            bar_inset: 10.0,
            bar_height: 24.0,
            min_bar_width: 4.0,
        }
    }
}

/// One laid-out task bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub id: String,
    /// Position in the filtered task list.
    pub row: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: String,
    pub completion_width: f32,
    /// Text drawn on the bar (the responsible role).
    pub label: String,
}

impl Bar {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Everything a rendering surface needs to draw one frame of the timeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Layout {
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub pixels_per_day: f32,
    pub ticks: Vec<Tick>,
    pub grid: Vec<GridColumn>,
    pub bars: Vec<Bar>,
    pub today_marker_x: Option<f32>,
    pub dependency_paths: Vec<ConnectorPath>,
}

impl Layout {
    pub fn bar(&self, id: &str) -> Option<&Bar> {
        self.bars.iter().find(|b| b.id == id)
    }
}

/// Computes [`Layout`]s. Stateless apart from sizing and label settings.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    pub metrics: LayoutMetrics,
    pub locale: LabelLocale,
}

impl LayoutEngine {
    pub fn new(metrics: LayoutMetrics, locale: LabelLocale) -> Self {
        Self { metrics, locale }
    }

    /// Lay out the visible tasks of `project` under `view`.
    ///
    /// A range with no positive extent yields an empty layout.
    pub fn layout(&self, project: &Project, view: &ViewState, today: NaiveDate) -> Layout {
        match self.try_layout(project, view, today) {
            Ok(layout) => layout,
            Err(degenerate) => {
                debug!(error = %degenerate, "returning empty layout");
                Layout::default()
            }
        }
    }

    fn try_layout(
        &self,
        project: &Project,
        view: &ViewState,
        today: NaiveDate,
    ) -> Result<Layout, LayoutDegenerate> {
        let bounds = &project.bounds;
        let total_days = bounds.total_days();
        let pixels_per_day = view.pixels_per_day();
        if total_days <= 0 || !(pixels_per_day > 0.0 && pixels_per_day.is_finite()) {
            return Err(LayoutDegenerate { total_days });
        }

        let visible = filter_tasks(&project.tasks, &view.filter_query);
        let bars: Vec<Bar> = visible
            .iter()
            .enumerate()
            .map(|(row, task)| self.bar(task, row, bounds, pixels_per_day))
            .collect();
        let dependency_paths = routing::route_all(&visible, &bars);

        let canvas_width = total_days as f32 * pixels_per_day;
        let today_marker_x = bounds
            .contains(today)
            .then(|| bounds.days_from_start(today) as f32 * pixels_per_day);

        debug!(
            visible = bars.len(),
            connectors = dependency_paths.len(),
            pixels_per_day,
            "laid out timeline"
        );

        Ok(Layout {
            canvas_width,
            canvas_height: visible.len() as f32 * self.metrics.row_height,
            pixels_per_day,
            ticks: ticks::header_ticks(bounds, view.scale, pixels_per_day, self.locale),
            grid: ticks::grid_columns(bounds, view, pixels_per_day),
            bars,
            today_marker_x,
            dependency_paths,
        })
    }

    fn bar(&self, task: &Task, row: usize, bounds: &ProjectBounds, pixels_per_day: f32) -> Bar {
        let x = bounds.days_from_start(task.start()) as f32 * pixels_per_day;
        let width = (task.duration() as f32 * pixels_per_day).max(self.metrics.min_bar_width);
        Bar {
            id: task.id.clone(),
            row,
            x,
            y: row as f32 * self.metrics.row_height + self.metrics.bar_inset,
            width,
            height: self.metrics.bar_height,
            color: task.color.clone(),
            completion_width: width * f32::from(task.completion) / 100.0,
            label: task.responsible_role.clone(),
        }
    }
}
