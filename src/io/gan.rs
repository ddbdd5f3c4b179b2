//! GanttProject (`.gan`) plan document parser.
//!
//! The XML is read in one pass into a raw tree (roles, resources,
//! allocations, nested task containers). The raw tree is then resolved into
//! a [`Project`]: roles are looked up, allocations attached, phases derived
//! from the top-level containers and tasks sorted by start date.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, info};

use crate::error::ParseError;
use crate::model::resource::DEFAULT_ROLE_NAME;
use crate::model::task::DEFAULT_TASK_COLOR;
use crate::model::{Project, Resource, ResourceAssignment, Task};

const DEFAULT_DURATION: i64 = 1;
const DEFAULT_COMPLETION: u8 = 0;
const DEFAULT_LOAD: f64 = 100.0;

/// Phase names with a conventional bar color.
pub fn conventional_phase_colors() -> BTreeMap<String, String> {
    [
        ("Conception", "#3b82f6"),
        ("Hardware", "#10b981"),
        ("Software", "#8b5cf6"),
        ("Indus & Certif", "#f59e0b"),
    ]
    .into_iter()
    .map(|(phase, color)| (phase.to_string(), color.to_string()))
    .collect()
}

/// Inputs to parsing that do not come from the document itself.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub project_name: String,
    /// Bar colors for tasks that do not carry their own.
    pub phase_colors: BTreeMap<String, String>,
    /// Anchor for the bounds of a plan without schedulable tasks.
    pub today: NaiveDate,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            project_name: "Untitled Project".to_string(),
            phase_colors: conventional_phase_colors(),
            today: chrono::Local::now().date_naive(),
        }
    }
}

/// Parse a `.gan` document into a project.
pub fn parse_plan(text: &str, options: &ParseOptions) -> Result<Project, ParseError> {
    let raw = RawPlan::read(text)?;
    let project = raw.resolve(options)?;
    info!(
        project = %project.name,
        tasks = project.tasks.len(),
        resources = project.resources.len(),
        "parsed plan document"
    );
    Ok(project)
}

// ── Raw document tree ───────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct TaskNode {
    id: String,
    name: String,
    start: Option<String>,
    duration: Option<String>,
    complete: Option<String>,
    color: Option<String>,
    depends: Vec<String>,
    children: Vec<TaskNode>,
}

impl TaskNode {
    fn from_attributes(attrs: &Attributes) -> Result<Self, ParseError> {
        Ok(Self {
            id: attrs.require("task", "id")?.to_string(),
            name: attrs.get("name").unwrap_or_default().to_string(),
            start: attrs.owned("start"),
            duration: attrs.owned("duration"),
            complete: attrs.owned("complete"),
            color: attrs.owned("color"),
            depends: Vec::new(),
            children: Vec::new(),
        })
    }

    /// All nested tasks, depth first, in document order.
    fn descendants<'a>(&'a self, out: &mut Vec<&'a TaskNode>) {
        for child in &self.children {
            out.push(child);
            child.descendants(out);
        }
    }
}

#[derive(Debug)]
struct RawResource {
    id: String,
    name: String,
    function: Option<String>,
}

#[derive(Debug)]
struct RawAllocation {
    task_id: String,
    resource_id: String,
    load: f64,
    responsible: bool,
}

#[derive(Debug, Default)]
struct RawPlan {
    saw_root: bool,
    in_tasks: bool,
    roles: HashMap<String, String>,
    resources: Vec<RawResource>,
    allocations: Vec<RawAllocation>,
    containers: Vec<TaskNode>,
    open_tasks: Vec<TaskNode>,
}

impl RawPlan {
    fn read(text: &str) -> Result<Self, ParseError> {
        let mut reader = Reader::from_str(text);
        reader.trim_text(true);
        let mut raw = RawPlan::default();

        loop {
            let event = reader.read_event().map_err(|source| ParseError::Xml {
                position: reader.buffer_position(),
                source,
            })?;
            let position = reader.buffer_position();
            match event {
                Event::Start(ref e) => raw.open(e, false, position)?,
                Event::Empty(ref e) => raw.open(e, true, position)?,
                Event::End(ref e) => match e.name().as_ref() {
                    b"tasks" => raw.in_tasks = false,
                    b"task" if raw.in_tasks => {
                        if let Some(node) = raw.open_tasks.pop() {
                            raw.attach(node);
                        }
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }

        if !raw.saw_root {
            return Err(ParseError::MissingRoot);
        }
        if !raw.open_tasks.is_empty() {
            return Err(ParseError::UnexpectedEof {
                element: "task".to_string(),
            });
        }
        Ok(raw)
    }

    fn open(&mut self, e: &BytesStart<'_>, empty: bool, position: usize) -> Result<(), ParseError> {
        let name = e.name();
        if !self.saw_root {
            if name.as_ref() != b"project" {
                return Err(ParseError::MissingRoot);
            }
            self.saw_root = true;
            return Ok(());
        }

        match name.as_ref() {
            b"tasks" if !empty => self.in_tasks = true,
            b"task" if self.in_tasks => {
                let node = TaskNode::from_attributes(&Attributes::read(e, position)?)?;
                if empty {
                    self.attach(node);
                } else {
                    self.open_tasks.push(node);
                }
            }
            b"depend" => {
                let attrs = Attributes::read(e, position)?;
                if let (Some(task), Some(id)) = (self.open_tasks.last_mut(), attrs.get("id")) {
                    task.depends.push(id.to_string());
                }
            }
            b"role" => {
                let attrs = Attributes::read(e, position)?;
                let id = attrs.require("role", "id")?;
                let role_name = attrs.get("name").unwrap_or_default();
                self.roles.insert(id.to_string(), role_name.to_string());
            }
            b"resource" => {
                let attrs = Attributes::read(e, position)?;
                self.resources.push(RawResource {
                    id: attrs.require("resource", "id")?.to_string(),
                    name: attrs.get("name").unwrap_or_default().to_string(),
                    function: attrs.owned("function"),
                });
            }
            b"allocation" => {
                let attrs = Attributes::read(e, position)?;
                let task_id = attrs.require("allocation", "task-id")?.to_string();
                let load = match attrs.get("load") {
                    Some(raw) => parse_percent(&task_id, "load", raw)?,
                    None => DEFAULT_LOAD,
                };
                self.allocations.push(RawAllocation {
                    resource_id: attrs.require("allocation", "resource-id")?.to_string(),
                    responsible: attrs.get("responsible") == Some("true"),
                    task_id,
                    load,
                });
            }
            _ => {}
        }
        Ok(())
    }

    fn attach(&mut self, node: TaskNode) {
        match self.open_tasks.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.containers.push(node),
        }
    }

    // ── Resolution ──────────────────────────────────────────────────────────

    fn resolve(&self, options: &ParseOptions) -> Result<Project, ParseError> {
        let resources: Vec<Resource> = self
            .resources
            .iter()
            .map(|r| Resource::new(&r.id, &r.name, self.role_name(r.function.as_deref())))
            .collect();

        let mut tasks = Vec::new();
        for container in &self.containers {
            let mut members = Vec::new();
            container.descendants(&mut members);
            if members.is_empty() {
                members.push(container);
            }
            for node in members {
                if let Some(task) = self.build_task(node, &container.name, &resources, options)? {
                    tasks.push(task);
                }
            }
        }

        // Stable: tasks starting the same day keep document order.
        tasks.sort_by_key(|t| t.start());

        Ok(Project::new(
            options.project_name.clone(),
            tasks,
            resources,
            options.today,
        ))
    }

    /// Resolve a `"<kind>:<roleId>"` function reference.
    fn role_name(&self, function: Option<&str>) -> String {
        function
            .map(|f| f.rsplit_once(':').map_or(f, |(_, role_id)| role_id))
            .and_then(|role_id| self.roles.get(role_id.trim()))
            .cloned()
            .unwrap_or_else(|| DEFAULT_ROLE_NAME.to_string())
    }

    fn build_task(
        &self,
        node: &TaskNode,
        phase: &str,
        resources: &[Resource],
        options: &ParseOptions,
    ) -> Result<Option<Task>, ParseError> {
        let Some(start_raw) = node.start.as_deref().filter(|s| !s.trim().is_empty()) else {
            debug!(task = %node.id, "skipping task without a start date");
            return Ok(None);
        };
        let start = parse_date(start_raw).ok_or_else(|| invalid(&node.id, "start", start_raw))?;

        let duration = match node.duration.as_deref() {
            Some(raw) => raw.trim().parse::<i64>().map_err(|_| invalid(&node.id, "duration", raw))?,
            None => DEFAULT_DURATION,
        };
        let completion = match node.complete.as_deref() {
            Some(raw) => raw
                .trim()
                .parse::<u8>()
                .ok()
                .filter(|c| *c <= 100)
                .ok_or_else(|| invalid(&node.id, "complete", raw))?,
            None => DEFAULT_COMPLETION,
        };
        let color = node
            .color
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .or_else(|| options.phase_colors.get(phase).cloned())
            .unwrap_or_else(|| DEFAULT_TASK_COLOR.to_string());

        let mut task = Task::new(&node.id, phase, &node.name, start, duration);
        task.completion = completion;
        task.color = color;
        task.depends_on = node.depends.clone();
        task.resource_assignments = self
            .allocations
            .iter()
            .filter(|a| a.task_id == node.id)
            .map(|a| ResourceAssignment {
                resource_id: a.resource_id.clone(),
                load: a.load,
                is_responsible: a.responsible,
            })
            .collect();
        task.refresh_responsible_role(|id| {
            resources
                .iter()
                .find(|r| r.id == id)
                .map(|r| r.role_name.as_str())
        });
        Ok(Some(task))
    }
}

// ── Attribute helpers ───────────────────────────────────────────────────────

struct Attributes(Vec<(String, String)>);

impl Attributes {
    fn read(e: &BytesStart<'_>, position: usize) -> Result<Self, ParseError> {
        let mut pairs = Vec::new();
        for attr in e.attributes() {
            let attr = attr.map_err(|err| ParseError::Xml {
                position,
                source: quick_xml::Error::InvalidAttr(err),
            })?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            let value = attr
                .unescape_value()
                .map_err(|source| ParseError::Xml { position, source })?
                .to_string();
            pairs.push((key, value));
        }
        Ok(Self(pairs))
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn owned(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_string)
    }

    fn require(&self, element: &'static str, attribute: &'static str) -> Result<&str, ParseError> {
        self.get(attribute)
            .ok_or(ParseError::MissingAttribute { element, attribute })
    }
}

fn invalid(task_id: &str, attribute: &'static str, value: &str) -> ParseError {
    ParseError::InvalidAttribute {
        task_id: task_id.to_string(),
        attribute,
        value: value.to_string(),
    }
}

fn parse_percent(task_id: &str, attribute: &'static str, raw: &str) -> Result<f64, ParseError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| (0.0..=100.0).contains(v))
        .ok_or_else(|| invalid(task_id, attribute, raw))
}

/// Parse a start date, discarding any time of day.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let date_part = s.split(['T', ' ']).next().unwrap_or(s);
    ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d", "%d.%m.%Y", "%d-%m-%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<project name="Smartcool" version="3.2">
  <roles roleset-name="Default"/>
  <roles>
    <role id="1" name="Chef de projet"/>
    <role id="2" name="Ingénieur"/>
  </roles>
  <tasks empty-milestones="true">
    <taskproperties>
      <taskproperty id="tpd0" name="type" type="default" valuetype="icon"/>
    </taskproperties>
    <task id="10" name="Conception" start="2025-01-01" duration="20">
      <task id="11" name="Specs" start="2025-01-06" duration="5" complete="40"/>
      <task id="12" name="Review" start="2025-01-02" duration="2" color="#ff0000">
        <depend id="11" type="2"/>
      </task>
      <task id="13" name="Placeholder"/>
    </task>
    <task id="20" name="Launch" start="2025-02-01T09:30:00" duration="0"/>
  </tasks>
  <resources>
    <resource id="0" name="Alice" function="Default:1"/>
    <resource id="1" name="Bob" function="Default:9"/>
  </resources>
  <allocations>
    <allocation task-id="11" resource-id="1" load="50.0" responsible="false"/>
    <allocation task-id="11" resource-id="0" load="25" responsible="true"/>
    <allocation task-id="12" resource-id="1"/>
  </allocations>
</project>"##;

    fn options() -> ParseOptions {
        ParseOptions {
            project_name: "sample".into(),
            phase_colors: conventional_phase_colors(),
            today: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn resolves_roles_with_default_for_unknown() {
        let project = parse_plan(SAMPLE, &options()).unwrap();
        assert_eq!(project.resource("0").unwrap().role_name, "Chef de projet");
        assert_eq!(project.resource("1").unwrap().role_name, DEFAULT_ROLE_NAME);
    }

    #[test]
    fn children_take_container_phase_and_placeholders_are_skipped() {
        let project = parse_plan(SAMPLE, &options()).unwrap();
        let ids: Vec<&str> = project.tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["12", "11", "20"]);
        assert_eq!(project.task("11").unwrap().phase, "Conception");
        assert_eq!(project.task("20").unwrap().phase, "Launch");
    }

    #[test]
    fn applies_defaults_and_time_is_discarded() {
        let project = parse_plan(SAMPLE, &options()).unwrap();
        let launch = project.task("20").unwrap();
        assert_eq!(launch.start(), date(2025, 2, 1));
        assert_eq!(launch.duration(), 0);
        assert_eq!(launch.completion, 0);
        assert_eq!(launch.color, DEFAULT_TASK_COLOR);
        assert_eq!(launch.responsible_role, "-");

        let specs = project.task("11").unwrap();
        assert_eq!(specs.end(), date(2025, 1, 11));
        assert_eq!(specs.completion, 40);
    }

    #[test]
    fn explicit_color_beats_phase_convention() {
        let project = parse_plan(SAMPLE, &options()).unwrap();
        assert_eq!(project.task("12").unwrap().color, "#ff0000");
        assert_eq!(project.task("11").unwrap().color, "#3b82f6");
    }

    #[test]
    fn attaches_allocations_and_picks_responsible() {
        let project = parse_plan(SAMPLE, &options()).unwrap();
        let specs = project.task("11").unwrap();
        assert_eq!(specs.resource_assignments.len(), 2);
        assert_eq!(specs.resource_assignments[0].load, 50.0);
        assert_eq!(specs.responsible_role, "Chef de projet");

        let review = project.task("12").unwrap();
        assert_eq!(review.resource_assignments[0].load, DEFAULT_LOAD);
        assert_eq!(review.responsible_role, DEFAULT_ROLE_NAME);
    }

    #[test]
    fn collects_dependencies_and_bounds() {
        let project = parse_plan(SAMPLE, &options()).unwrap();
        assert_eq!(project.task("12").unwrap().depends_on, vec!["11".to_string()]);
        assert_eq!(project.bounds.range_start, date(2024, 12, 26));
        assert_eq!(project.bounds.range_end, date(2025, 2, 15));
    }

    #[test]
    fn same_day_tasks_keep_document_order() {
        let doc = r#"<project><tasks>
            <task id="b" name="B" start="2025-01-01"/>
            <task id="a" name="A" start="2025-01-01"/>
            <task id="c" name="C" start="2024-12-31"/>
        </tasks></project>"#;
        let project = parse_plan(doc, &options()).unwrap();
        let ids: Vec<&str> = project.tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[test]
    fn plan_without_tasks_uses_today_bounds() {
        let project = parse_plan("<project/>", &options()).unwrap();
        assert!(project.tasks.is_empty());
        assert_eq!(project.bounds.range_start, date(2030, 1, 1));
        assert_eq!(project.bounds.total_days(), 14);
    }

    #[test]
    fn malformed_xml_is_a_parse_error() {
        let err = parse_plan("<project><tasks><task id=\"1\"></tasks></project>", &options()).unwrap_err();
        assert!(matches!(err, ParseError::Xml { .. }), "{err:?}");
    }

    #[test]
    fn unclosed_task_is_a_parse_error() {
        let err = parse_plan("<project><tasks><task id=\"1\">", &options()).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { .. }), "{err:?}");
    }

    #[test]
    fn non_plan_documents_are_rejected() {
        assert!(matches!(parse_plan("", &options()), Err(ParseError::MissingRoot)));
        assert!(matches!(parse_plan("<html/>", &options()), Err(ParseError::MissingRoot)));
    }

    #[test]
    fn bad_numbers_name_the_task() {
        let doc = r#"<project><tasks><task id="7" start="2025-01-01" duration="two"/></tasks></project>"#;
        match parse_plan(doc, &options()) {
            Err(ParseError::InvalidAttribute { task_id, attribute, .. }) => {
                assert_eq!(task_id, "7");
                assert_eq!(attribute, "duration");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn negative_duration_loads_and_keeps_a_visible_bar() {
        let doc = r#"<project><tasks>
            <task id="1" name="Frame" start="2025-01-01" duration="5"/>
            <task id="2" name="Backdated" start="2025-01-10" duration="-2"/>
        </tasks></project>"#;
        let project = parse_plan(doc, &options()).unwrap();
        let backdated = project.task("2").unwrap();
        assert_eq!(backdated.duration(), -2);
        assert_eq!(backdated.end(), date(2025, 1, 8));
        assert_eq!(project.bounds.range_end, date(2025, 1, 22));

        let engine = crate::layout::LayoutEngine::default();
        let layout = engine.layout(&project, &crate::model::ViewState::new(10.0), date(2025, 1, 1));
        let bar = layout.bar("2").unwrap();
        assert_eq!(layout.bars.len(), 2);
        assert_eq!(bar.x, 160.0);
        assert_eq!(bar.width, engine.metrics.min_bar_width);
    }

    #[test]
    fn accepts_day_first_dates() {
        assert_eq!(parse_date("15/03/2025"), Some(date(2025, 3, 15)));
        assert_eq!(parse_date("2025-03-15 08:00"), Some(date(2025, 3, 15)));
        assert_eq!(parse_date("yesterday"), None);
    }
}
