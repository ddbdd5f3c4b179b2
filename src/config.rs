//! Persisted user settings.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::io::{conventional_phase_colors, ParseOptions};
use crate::layout::{LabelLocale, LayoutEngine, LayoutMetrics};
use crate::model::timeline::DEFAULT_PIXELS_PER_UNIT;
use crate::model::ViewState;

const APPLICATION: &str = "GanttPlanner";
const SETTINGS_FILE: &str = "settings.json";

/// Everything the planner remembers between runs.
///
/// Every field has a default, so older or hand-trimmed files still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Pixels per scale unit that `set_scale` returns to.
    pub base_pixels_per_unit: f32,
    pub metrics: LayoutMetrics,
    pub locale: LabelLocale,
    pub show_weekends: bool,
    /// Bar colors keyed by phase name.
    pub phase_colors: BTreeMap<String, String>,
    pub last_plan: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_pixels_per_unit: DEFAULT_PIXELS_PER_UNIT,
            metrics: LayoutMetrics::default(),
            locale: LabelLocale::default(),
            show_weekends: true,
            phase_colors: conventional_phase_colors(),
            last_plan: None,
        }
    }
}

impl Settings {
    /// Location of the settings file in the OS config directory.
    pub fn default_path() -> PathBuf {
        match directories::ProjectDirs::from("", "", APPLICATION) {
            Some(dirs) => dirs.config_dir().join(SETTINGS_FILE),
            None => PathBuf::from(".").join(SETTINGS_FILE),
        }
    }

    pub fn load() -> Self {
        Self::load_from(&Self::default_path())
    }

    /// Read settings from `path`, falling back to defaults on any problem.
    pub fn load_from(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no settings file, using defaults");
                return Self::default();
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read settings");
                return Self::default();
            }
        };
        match serde_json::from_str::<Settings>(&contents) {
            Ok(settings) => settings.sanitized(path),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring malformed settings");
                Self::default()
            }
        }
    }

    /// Replace values the layout cannot work with by their defaults.
    fn sanitized(mut self, path: &Path) -> Self {
        if !self.metrics.is_valid() {
            warn!(path = %path.display(), metrics = ?self.metrics, "ignoring unusable layout metrics");
            self.metrics = LayoutMetrics::default();
        }
        if !self.base_pixels_per_unit.is_finite() {
            warn!(path = %path.display(), "ignoring non-finite base density");
            self.base_pixels_per_unit = DEFAULT_PIXELS_PER_UNIT;
        }
        self
    }

    pub fn save(&self) -> std::io::Result<()> {
        self.save_to(&Self::default_path())
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
    }

    pub fn view_state(&self) -> ViewState {
        let mut view = ViewState::new(self.base_pixels_per_unit);
        view.show_weekends = self.show_weekends;
        view
    }

    pub fn layout_engine(&self) -> LayoutEngine {
        LayoutEngine::new(self.metrics, self.locale)
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            phase_colors: self.phase_colors.clone(),
            ..ParseOptions::default()
        }
    }
}
