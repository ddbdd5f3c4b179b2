//! Task edits and the task filter.

use chrono::NaiveDate;
use tracing::debug;

use crate::error::ValidationError;
use crate::model::{Project, ResourceAssignment, Task};

/// Tasks whose name, phase or id contains `query`, ignoring case.
///
/// Model order is kept. A blank query matches everything.
pub fn filter_tasks<'a>(tasks: &'a [Task], query: &str) -> Vec<&'a Task> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return tasks.iter().collect();
    }
    tasks
        .iter()
        .filter(|t| {
            t.name.to_lowercase().contains(&needle)
                || t.phase.to_lowercase().contains(&needle)
                || t.id.to_lowercase().contains(&needle)
        })
        .collect()
}

/// A partial edit of one task. `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskUpdate {
    pub name: Option<String>,
    pub start: Option<NaiveDate>,
    /// Signed so that a negative value from the caller can be rejected.
    pub duration: Option<i64>,
    pub completion: Option<i64>,
    pub cost: Option<f64>,
    /// Full replacement of the task's assignments as `(resource id, load)`.
    /// Entries with a load of 0 are dropped.
    pub resource_loads: Option<Vec<(String, f64)>>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// An update that passed validation.
struct CheckedUpdate {
    name: Option<String>,
    start: Option<NaiveDate>,
    duration: Option<i64>,
    completion: Option<u8>,
    cost: Option<f64>,
    loads: Option<Vec<(String, f64)>>,
}

/// Apply `update` to the task with id `id`.
///
/// Returns `Ok(None)` and changes nothing when no task has that id. An invalid
/// field rejects the whole update before anything is touched. Project bounds
/// are not widened; call `Project::refresh_bounds` (or re-fit) for that.
pub fn update_task<'a>(
    project: &'a mut Project,
    id: &str,
    update: TaskUpdate,
) -> Result<Option<&'a Task>, ValidationError> {
    let Project { tasks, resources, .. } = project;
    let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
        debug!(task = id, "update for unknown task ignored");
        return Ok(None);
    };

    let checked = validate(id, update, |rid| resources.iter().any(|r| r.id == rid))?;

    if let Some(name) = checked.name {
        task.name = name;
    }
    if checked.start.is_some() || checked.duration.is_some() {
        let start = checked.start.unwrap_or(task.start());
        let duration = checked.duration.unwrap_or(task.duration());
        task.reschedule(start, duration);
    }
    if let Some(completion) = checked.completion {
        task.completion = completion;
    }
    if let Some(cost) = checked.cost {
        task.cost = cost;
    }
    if let Some(loads) = checked.loads {
        let previous = std::mem::take(&mut task.resource_assignments);
        task.resource_assignments = loads
            .into_iter()
            .map(|(resource_id, load)| {
                let is_responsible = previous
                    .iter()
                    .any(|a| a.resource_id == resource_id && a.is_responsible);
                ResourceAssignment { resource_id, load, is_responsible }
            })
            .collect();
        task.refresh_responsible_role(|rid| {
            resources
                .iter()
                .find(|r| r.id == rid)
                .map(|r| r.role_name.as_str())
        });
    }

    debug!(task = id, start = %task.start(), duration = task.duration(), "task updated");
    Ok(Some(task))
}

fn validate(
    id: &str,
    update: TaskUpdate,
    resource_exists: impl Fn(&str) -> bool,
) -> Result<CheckedUpdate, ValidationError> {
    let name = match update.name {
        Some(name) if name.trim().is_empty() => {
            return Err(ValidationError::for_task(id, "name", "must not be empty"));
        }
        other => other,
    };

    let duration = update
        .duration
        .map(|d| {
            if d < 0 {
                Err(ValidationError::for_task(id, "duration", format!("must be a non-negative day count (got {d})")))
            } else {
                Ok(d)
            }
        })
        .transpose()?;

    let completion = update
        .completion
        .map(|c| match u8::try_from(c) {
            Ok(c) if c <= 100 => Ok(c),
            _ => Err(ValidationError::for_task(id, "completion", format!("must be within 0-100 (got {c})"))),
        })
        .transpose()?;

    if let Some(cost) = update.cost {
        if !cost.is_finite() {
            return Err(ValidationError::for_task(id, "cost", "must be a finite number"));
        }
    }

    let loads = match update.resource_loads {
        Some(entries) => {
            let mut kept: Vec<(String, f64)> = Vec::new();
            for (resource_id, load) in entries {
                if !(0.0..=100.0).contains(&load) {
                    return Err(ValidationError::for_task(
                        id,
                        "load",
                        format!("load for resource {resource_id} must be within 0-100 (got {load})"),
                    ));
                }
                if !resource_exists(&resource_id) {
                    return Err(ValidationError::for_task(
                        id,
                        "load",
                        format!("unknown resource {resource_id}"),
                    ));
                }
                kept.retain(|(rid, _)| *rid != resource_id);
                if load > 0.0 {
                    kept.push((resource_id, load));
                }
            }
            Some(kept)
        }
        None => None,
    };

    Ok(CheckedUpdate {
        name,
        start: update.start,
        duration,
        completion,
        cost: update.cost,
        loads,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Resource;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn project() -> Project {
        let mut task = Task::new("1", "Hardware", "PCB layout", date(2025, 1, 1), 5);
        task.resource_assignments = vec![ResourceAssignment {
            resource_id: "r1".into(),
            load: 100.0,
            is_responsible: true,
        }];
        task.responsible_role = "Engineer".into();
        let other = Task::new("2", "Software", "Bootloader", date(2025, 1, 3), 2);
        Project::new(
            "p",
            vec![task, other],
            vec![
                Resource::new("r1", "Alice", "Engineer"),
                Resource::new("r2", "Bob", "Tester"),
            ],
            date(2025, 1, 1),
        )
    }

    #[test]
    fn filter_matches_name_phase_and_id() {
        let project = project();
        let ids = |q: &str| -> Vec<String> {
            filter_tasks(&project.tasks, q).iter().map(|t| t.id.clone()).collect()
        };
        assert_eq!(ids("pcb"), vec!["1"]);
        assert_eq!(ids("  SOFTWARE "), vec!["2"]);
        assert_eq!(ids("2"), vec!["2"]);
        assert_eq!(ids(""), vec!["1", "2"]);
        assert!(ids("nothing").is_empty());
    }

    #[test]
    fn reschedule_keeps_end_in_step_and_bounds_stale() {
        let mut project = project();
        let bounds = project.bounds;
        let update = TaskUpdate {
            start: Some(date(2025, 6, 1)),
            duration: Some(10),
            ..Default::default()
        };
        let task = update_task(&mut project, "1", update).unwrap().unwrap();
        assert_eq!(task.end(), date(2025, 6, 11));
        assert_eq!(project.bounds, bounds);
    }

    #[test]
    fn zero_load_removes_and_new_load_adds() {
        let mut project = project();
        let update = TaskUpdate {
            resource_loads: Some(vec![("r1".into(), 0.0), ("r2".into(), 50.0)]),
            ..Default::default()
        };
        let task = update_task(&mut project, "1", update).unwrap().unwrap();
        assert_eq!(
            task.resource_assignments,
            vec![ResourceAssignment { resource_id: "r2".into(), load: 50.0, is_responsible: false }]
        );
        assert_eq!(task.responsible_role, "Tester");
    }

    #[test]
    fn responsible_flag_survives_load_change() {
        let mut project = project();
        let update = TaskUpdate {
            resource_loads: Some(vec![("r2".into(), 20.0), ("r1".into(), 40.0)]),
            ..Default::default()
        };
        let task = update_task(&mut project, "1", update).unwrap().unwrap();
        assert!(task.resource_assignments[1].is_responsible);
        assert_eq!(task.responsible_role, "Engineer");
    }

    #[test]
    fn invalid_update_changes_nothing() {
        let mut project = project();
        let before = project.task("1").cloned();
        let update = TaskUpdate {
            name: Some("Renamed".into()),
            duration: Some(-1),
            ..Default::default()
        };
        let err = update_task(&mut project, "1", update).unwrap_err();
        assert_eq!(err.field, "duration");
        assert_eq!(err.task_id.as_deref(), Some("1"));
        assert_eq!(project.task("1").cloned(), before);

        for update in [
            TaskUpdate { completion: Some(101), ..Default::default() },
            TaskUpdate { cost: Some(f64::NAN), ..Default::default() },
            TaskUpdate { name: Some("  ".into()), ..Default::default() },
            TaskUpdate { resource_loads: Some(vec![("r2".into(), 120.0)]), ..Default::default() },
            TaskUpdate { resource_loads: Some(vec![("ghost".into(), 10.0)]), ..Default::default() },
        ] {
            assert!(update_task(&mut project, "1", update).is_err());
        }
        assert_eq!(project.task("1").cloned(), before);
    }

    #[test]
    fn unknown_task_is_a_no_op() {
        let mut project = project();
        let update = TaskUpdate { name: Some("x".into()), ..Default::default() };
        assert!(update_task(&mut project, "missing", update).unwrap().is_none());
        assert_eq!(project.task("1").unwrap().name, "PCB layout");
    }
}
