//! The planning session: the one Project Model plus its view state.
//!
//! All operations run on the caller's thread. Only fetching the document text
//! may happen elsewhere; its result comes back through [`PlanSession::finish_load`]
//! with the [`LoadTicket`] taken when the load began, and only the newest
//! ticket may replace the model.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::edit::{self, TaskUpdate};
use crate::error::{ParseError, ValidationError};
use crate::io::{parse_plan, ParseOptions, PlanSource};
use crate::layout::{fit_view, Layout, LayoutEngine};
use crate::model::{Project, Task, TimelineScale, ViewState};

/// Identifies one load request. Later tickets supersede earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

/// What became of a finished load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Replaced,
    /// A newer load was started; the result was thrown away.
    Stale,
}

pub struct PlanSession {
    project: Option<Project>,
    view: ViewState,
    engine: LayoutEngine,
    options: ParseOptions,
    generation: u64,
    fit_requested: bool,
}

impl PlanSession {
    pub fn new(view: ViewState, engine: LayoutEngine, options: ParseOptions) -> Self {
        Self {
            project: None,
            view,
            engine,
            options,
            generation: 0,
            fit_requested: false,
        }
    }

    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn engine_mut(&mut self) -> &mut LayoutEngine {
        &mut self.engine
    }

    // ── Loading ─────────────────────────────────────────────────────

    /// Start a load. Any load begun earlier becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        LoadTicket(self.generation)
    }

    /// Complete the load identified by `ticket` with the fetched text.
    ///
    /// The previous model is kept on any error and when the ticket is stale.
    /// `today` anchors the range of a plan without schedulable tasks.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        fetched: Result<String, ParseError>,
        name: &str,
        today: NaiveDate,
    ) -> Result<LoadOutcome, ParseError> {
        if ticket.0 != self.generation {
            warn!(ticket = ticket.0, latest = self.generation, "discarding stale plan load");
            return Ok(LoadOutcome::Stale);
        }

        let text = fetched?;
        let mut options = self.options.clone();
        options.project_name = name.to_string();
        options.today = today;
        let project = parse_plan(&text, &options)?;

        info!(
            project = %project.name,
            tasks = project.tasks.len(),
            resources = project.resources.len(),
            "plan loaded"
        );
        self.project = Some(project);
        self.fit_requested = true;
        Ok(LoadOutcome::Replaced)
    }

    /// Fetch and load in one step.
    pub fn load(&mut self, source: &dyn PlanSource, today: NaiveDate) -> Result<LoadOutcome, ParseError> {
        let ticket = self.begin_load();
        let fetched = source.fetch();
        self.finish_load(ticket, fetched, &source.describe(), today)
    }

    /// Whether a fit was asked for since the last call. Clears the request.
    pub fn take_fit_request(&mut self) -> bool {
        std::mem::take(&mut self.fit_requested)
    }

    // ── Edits ───────────────────────────────────────────────────────

    /// Apply a partial task update. `Ok(None)` when no model or no such task.
    pub fn update_task(&mut self, id: &str, update: TaskUpdate) -> Result<Option<&Task>, ValidationError> {
        match self.project.as_mut() {
            Some(project) => edit::update_task(project, id, update),
            None => Ok(None),
        }
    }

    pub fn visible_tasks(&self) -> Vec<&Task> {
        match &self.project {
            Some(project) => edit::filter_tasks(&project.tasks, &self.view.filter_query),
            None => Vec::new(),
        }
    }

    // ── View ────────────────────────────────────────────────────────

    pub fn set_filter(&mut self, query: impl Into<String>) {
        self.view.filter_query = query.into();
    }

    pub fn set_scale(&mut self, scale: TimelineScale) {
        self.view.set_scale(scale);
    }

    pub fn set_zoom(&mut self, factor: f32) -> Result<(), ValidationError> {
        self.view.set_zoom(factor)
    }

    pub fn zoom_in(&mut self) {
        self.view.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.view.zoom_out();
    }

    pub fn toggle_weekends(&mut self) {
        self.view.show_weekends = !self.view.show_weekends;
    }

    /// Fit the current range into `viewport_width` pixels.
    pub fn fit(&mut self, viewport_width: f32) -> bool {
        match &self.project {
            Some(project) => fit_view(&mut self.view, project.bounds.total_days(), viewport_width),
            None => false,
        }
    }

    /// Recompute the range from the current tasks, then fit.
    pub fn refit(&mut self, viewport_width: f32, today: NaiveDate) -> bool {
        match self.project.as_mut() {
            Some(project) => {
                project.refresh_bounds(today);
                debug!(start = %project.bounds.range_start, end = %project.bounds.range_end, "bounds refreshed");
                fit_view(&mut self.view, project.bounds.total_days(), viewport_width)
            }
            None => false,
        }
    }

    /// Lay out the current model, or an empty layout before the first load.
    pub fn layout(&self, today: NaiveDate) -> Layout {
        match &self.project {
            Some(project) => self.engine.layout(project, &self.view, today),
            None => Layout::default(),
        }
    }
}

impl Default for PlanSession {
    fn default() -> Self {
        Self::new(ViewState::default(), LayoutEngine::default(), ParseOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const PLAN_A: &str = r#"<project><tasks>
        <task id="1" name="Alpha" start="2025-01-01" duration="5"/>
    </tasks></project>"#;
    const PLAN_B: &str = r#"<project><tasks>
        <task id="9" name="Beta" start="2025-03-01" duration="2"/>
    </tasks></project>"#;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn session() -> PlanSession {
        let options = ParseOptions {
            today: date(2025, 1, 1),
            ..ParseOptions::default()
        };
        PlanSession::new(ViewState::default(), LayoutEngine::default(), options)
    }

    fn task_ids(session: &PlanSession) -> Vec<String> {
        session.visible_tasks().iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn load_replaces_model_and_requests_fit() {
        let mut session = session();
        let ticket = session.begin_load();
        let outcome = session.finish_load(ticket, Ok(PLAN_A.into()), "alpha", date(2025, 1, 1)).unwrap();
        assert_eq!(outcome, LoadOutcome::Replaced);
        assert_eq!(session.project().unwrap().name, "alpha");
        assert!(session.take_fit_request());
        assert!(!session.take_fit_request());
    }

    #[test]
    fn failed_load_keeps_previous_model() {
        let mut session = session();
        let ticket = session.begin_load();
        session.finish_load(ticket, Ok(PLAN_A.into()), "alpha", date(2025, 1, 1)).unwrap();

        let ticket = session.begin_load();
        assert!(session.finish_load(ticket, Ok(r#"<project><tasks><task id="5" start="2025-01-01">"#.into()), "broken", date(2025, 1, 1)).is_err());
        assert_eq!(task_ids(&session), vec!["1"]);
    }

    #[test]
    fn latest_load_wins() {
        let mut session = session();
        let first = session.begin_load();
        let second = session.begin_load();

        let outcome = session.finish_load(second, Ok(PLAN_B.into()), "b", date(2025, 1, 1)).unwrap();
        assert_eq!(outcome, LoadOutcome::Replaced);
        let outcome = session.finish_load(first, Ok(PLAN_A.into()), "a", date(2025, 1, 1)).unwrap();
        assert_eq!(outcome, LoadOutcome::Stale);
        assert_eq!(task_ids(&session), vec!["9"]);
    }

    #[test]
    fn filter_changes_layout_rows() {
        let mut session = session();
        let ticket = session.begin_load();
        let plan = r#"<project><tasks>
            <task id="1" name="Alpha" start="2025-01-01" duration="5"/>
            <task id="2" name="Beta" start="2025-01-02" duration="5"/>
        </tasks></project>"#;
        session.finish_load(ticket, Ok(plan.into()), "p", date(2025, 1, 1)).unwrap();

        session.set_filter("beta");
        let layout = session.layout(date(2025, 1, 1));
        assert_eq!(layout.bars.len(), 1);
        assert_eq!(layout.bars[0].row, 0);
    }

    #[test]
    fn refit_widens_range_after_edit() {
        let mut session = session();
        let ticket = session.begin_load();
        session.finish_load(ticket, Ok(PLAN_A.into()), "a", date(2025, 1, 1)).unwrap();
        let before = session.project().unwrap().bounds;

        let update = TaskUpdate {
            start: Some(date(2025, 12, 1)),
            ..Default::default()
        };
        session.update_task("1", update).unwrap();
        assert_eq!(session.project().unwrap().bounds, before);

        assert!(session.refit(1000.0, date(2025, 1, 1)));
        let bounds = session.project().unwrap().bounds;
        assert_eq!(bounds.range_start, date(2025, 11, 24));
        assert_relative_eq!(session.view().zoom_factor, 1.0);
    }

    #[test]
    fn empty_plan_range_starts_at_the_given_day() {
        let mut session = session();
        let ticket = session.begin_load();
        session.finish_load(ticket, Ok("<project/>".into()), "empty", date(2025, 6, 2)).unwrap();
        assert_eq!(session.project().unwrap().bounds.range_start, date(2025, 6, 2));

        assert!(session.refit(700.0, date(2025, 6, 9)));
        let bounds = session.project().unwrap().bounds;
        assert_eq!(bounds.range_start, date(2025, 6, 9));
        assert_eq!(bounds.total_days(), 14);
    }

    #[test]
    fn operations_before_first_load_are_harmless() {
        let mut session = session();
        assert!(!session.fit(800.0));
        assert!(session.update_task("1", TaskUpdate::default()).unwrap().is_none());
        assert_eq!(session.layout(date(2025, 1, 1)), Layout::default());
    }
}
