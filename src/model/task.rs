use chrono::{Duration, NaiveDate};
use serde::Serialize;

/// Fallback bar color when neither the task nor its phase names one.
pub const DEFAULT_TASK_COLOR: &str = "#3b82f6";

/// Display label used for tasks nobody is assigned to.
pub const NO_RESPONSIBLE_ROLE: &str = "-";

/// One resource's share of a task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceAssignment {
    pub resource_id: String,
    /// Percent of the resource's capacity, 0–100.
    pub load: f64,
    pub is_responsible: bool,
}

/// A single scheduled task in the plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub id: String,
    /// Name of the enclosing phase container.
    pub phase: String,
    pub name: String,
    start: NaiveDate,
    /// Calendar days; 0 for milestones. Plan files may carry negative values,
    /// which edits never produce.
    duration: i64,
    end: NaiveDate,
    /// Percent complete, 0–100.
    pub completion: u8,
    /// Resolved display color (`#rrggbb`).
    pub color: String,
    pub resource_assignments: Vec<ResourceAssignment>,
    /// Role name of the responsible resource, or [`NO_RESPONSIBLE_ROLE`].
    pub responsible_role: String,
    /// Predecessor task ids. May name tasks that do not exist.
    pub depends_on: Vec<String>,
    pub cost: f64,
}

impl Task {
    /// Create a task with no assignments, dependencies or cost.
    pub fn new(
        id: impl Into<String>,
        phase: impl Into<String>,
        name: impl Into<String>,
        start: NaiveDate,
        duration: i64,
    ) -> Self {
        Self {
            id: id.into(),
            phase: phase.into(),
            name: name.into(),
            start,
            duration,
            end: start + Duration::days(duration),
            completion: 0,
            color: DEFAULT_TASK_COLOR.to_string(),
            resource_assignments: Vec::new(),
            responsible_role: NO_RESPONSIBLE_ROLE.to_string(),
            depends_on: Vec::new(),
            cost: 0.0,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn duration(&self) -> i64 {
        self.duration
    }

    /// Always `start + duration` days.
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Move the task and/or change its length, keeping `end` in step.
    pub fn reschedule(&mut self, start: NaiveDate, duration: i64) {
        self.start = start;
        self.duration = duration;
        self.end = start + Duration::days(duration);
    }

    /// Pick the responsible role from the current assignments: the first one
    /// flagged responsible, else the first one.
    pub fn refresh_responsible_role<'a>(&mut self, role_of: impl Fn(&str) -> Option<&'a str>) {
        let primary = self
            .resource_assignments
            .iter()
            .find(|a| a.is_responsible)
            .or_else(|| self.resource_assignments.first());
        self.responsible_role = match primary {
            Some(a) => role_of(&a.resource_id).unwrap_or_default().to_string(),
            None => NO_RESPONSIBLE_ROLE.to_string(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn end_is_start_plus_duration() {
        let task = Task::new("1", "Design", "Sketch", date(2025, 1, 30), 5);
        assert_eq!(task.end(), date(2025, 2, 4));
    }

    #[test]
    fn reschedule_recomputes_end() {
        let mut task = Task::new("1", "Design", "Sketch", date(2025, 1, 1), 5);
        task.reschedule(date(2025, 3, 1), 0);
        assert_eq!(task.start(), date(2025, 3, 1));
        assert_eq!(task.end(), date(2025, 3, 1));
    }

    #[test]
    fn negative_duration_ends_before_start() {
        let task = Task::new("1", "Design", "Sketch", date(2025, 1, 10), -2);
        assert_eq!(task.duration(), -2);
        assert_eq!(task.end(), date(2025, 1, 8));
    }

    #[test]
    fn responsible_role_prefers_flagged_assignment() {
        let mut task = Task::new("1", "Design", "Sketch", date(2025, 1, 1), 1);
        task.resource_assignments = vec![
            ResourceAssignment { resource_id: "a".into(), load: 50.0, is_responsible: false },
            ResourceAssignment { resource_id: "b".into(), load: 50.0, is_responsible: true },
        ];
        task.refresh_responsible_role(|id| match id {
            "a" => Some("Engineer"),
            "b" => Some("Lead"),
            _ => None,
        });
        assert_eq!(task.responsible_role, "Lead");

        task.resource_assignments.clear();
        task.refresh_responsible_role(|_| None);
        assert_eq!(task.responsible_role, NO_RESPONSIBLE_ROLE);
    }
}
