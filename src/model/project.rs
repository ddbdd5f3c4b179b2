use chrono::{Duration, NaiveDate};
use serde::Serialize;

use super::resource::Resource;
use super::task::Task;

/// Days of empty timeline kept before the earliest task.
pub const LEAD_BUFFER_DAYS: i64 = 7;
/// Days of empty timeline kept after the latest task end.
pub const TRAIL_BUFFER_DAYS: i64 = 14;

/// The buffered date range the timeline covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProjectBounds {
    pub range_start: NaiveDate,
    pub range_end: NaiveDate,
}

impl ProjectBounds {
    /// Buffer the raw `[earliest start, latest end]` span of a set of tasks.
    pub fn around(earliest: NaiveDate, latest: NaiveDate) -> Self {
        Self {
            range_start: earliest - Duration::days(LEAD_BUFFER_DAYS),
            range_end: latest + Duration::days(TRAIL_BUFFER_DAYS),
        }
    }

    /// Bounds used when a plan has no schedulable tasks.
    pub fn empty_from(today: NaiveDate) -> Self {
        Self {
            range_start: today,
            range_end: today + Duration::days(TRAIL_BUFFER_DAYS),
        }
    }

    pub fn total_days(&self) -> i64 {
        (self.range_end - self.range_start).num_days()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.range_start <= date && date <= self.range_end
    }

    /// Whole days from the range start to `date` (negative before it).
    pub fn days_from_start(&self, date: NaiveDate) -> i64 {
        (date - self.range_start).num_days()
    }
}

/// A loaded plan: tasks in start order, the resource pool, and the range.
#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub name: String,
    pub tasks: Vec<Task>,
    pub resources: Vec<Resource>,
    pub bounds: ProjectBounds,
}

impl Project {
    pub fn new(name: impl Into<String>, tasks: Vec<Task>, resources: Vec<Resource>, today: NaiveDate) -> Self {
        let mut project = Self {
            name: name.into(),
            tasks,
            resources,
            bounds: ProjectBounds::empty_from(today),
        };
        project.refresh_bounds(today);
        project
    }

    /// Recompute the range from the current tasks.
    ///
    /// Edits never call this on their own; a moved task stays outside the
    /// range until the caller asks for a re-fit.
    pub fn refresh_bounds(&mut self, today: NaiveDate) {
        let earliest = self.tasks.iter().map(|t| t.start()).min();
        let latest = self.tasks.iter().map(|t| t.end()).max();
        self.bounds = match (earliest, latest) {
            (Some(earliest), Some(latest)) => ProjectBounds::around(earliest, latest),
            _ => ProjectBounds::empty_from(today),
        };
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn resource(&self, id: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id == id)
    }

    /// `"name (load%)"` for each of the task's assignments. A resource missing
    /// from the pool shows its id.
    pub fn assignment_labels(&self, task: &Task) -> Vec<String> {
        task.resource_assignments
            .iter()
            .map(|a| {
                let name = self.resource(&a.resource_id).map_or(a.resource_id.as_str(), |r| r.name.as_str());
                format!("{name} ({}%)", a.load)
            })
            .collect()
    }

    /// Distinct phase names, in first-seen order.
    pub fn phases(&self) -> Vec<&str> {
        let mut phases: Vec<&str> = Vec::new();
        for task in &self.tasks {
            if !phases.contains(&task.phase.as_str()) {
                phases.push(&task.phase);
            }
        }
        phases
    }
}
