use serde::Serialize;

use crate::error::ValidationError;

/// Default pixels per scale unit before zooming.
pub const DEFAULT_PIXELS_PER_UNIT: f32 = 40.0;
/// Zoom never takes a scale unit below this many pixels.
pub const MIN_PIXELS_PER_UNIT: f32 = 10.0;
/// Zoom never takes a scale unit above this many pixels.
pub const MAX_PIXELS_PER_UNIT: f32 = 200.0;
/// Auto-fit never picks a density above this.
pub const MAX_FIT_PIXELS_PER_UNIT: f32 = 100.0;

const ZOOM_IN_STEP: f32 = 1.2;
const ZOOM_OUT_STEP: f32 = 0.8;

/// Controls what scale the timeline displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TimelineScale {
    Days,
    Weeks,
    Months,
}

impl TimelineScale {
    /// Calendar days covered by one scale unit.
    pub fn days_per_unit(self) -> u32 {
        match self {
            TimelineScale::Days => 1,
            TimelineScale::Weeks => 7,
            TimelineScale::Months => 30,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimelineScale::Days => "Days",
            TimelineScale::Weeks => "Weeks",
            TimelineScale::Months => "Months",
        }
    }

    pub fn all() -> &'static [TimelineScale] {
        &[TimelineScale::Days, TimelineScale::Weeks, TimelineScale::Months]
    }
}

/// Everything about how the timeline is viewed, separate from the plan itself.
///
/// The layout engine is a pure function of a project and one of these.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub scale: TimelineScale,
    /// Pixels per scale unit (a day, a 7-day week or a 30-day month).
    pub pixels_per_unit: f32,
    pub zoom_factor: f32,
    pub filter_query: String,
    /// Shade Saturday and Sunday columns on the day scale.
    pub show_weekends: bool,
    /// What `set_scale` resets `pixels_per_unit` to.
    pub base_pixels_per_unit: f32,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(DEFAULT_PIXELS_PER_UNIT)
    }
}

impl ViewState {
    pub fn new(base_pixels_per_unit: f32) -> Self {
        let base = base_pixels_per_unit.clamp(MIN_PIXELS_PER_UNIT, MAX_PIXELS_PER_UNIT);
        Self {
            scale: TimelineScale::Days,
            pixels_per_unit: base,
            zoom_factor: 1.0,
            filter_query: String::new(),
            show_weekends: true,
            base_pixels_per_unit: base,
        }
    }

    /// Horizontal pixels for one calendar day at the current scale and zoom.
    pub fn pixels_per_day(&self) -> f32 {
        self.pixels_per_unit * self.zoom_factor / self.scale.days_per_unit() as f32
    }

    /// Pixels per scale unit after the zoom multiplier.
    pub fn effective_pixels_per_unit(&self) -> f32 {
        self.pixels_per_unit * self.zoom_factor
    }

    /// Switch scale and go back to the base density.
    pub fn set_scale(&mut self, scale: TimelineScale) {
        self.scale = scale;
        self.set_effective(self.base_pixels_per_unit * self.zoom_factor);
    }

    /// Zoom in (increase pixels per unit).
    pub fn zoom_in(&mut self) {
        self.set_effective(self.effective_pixels_per_unit() * ZOOM_IN_STEP);
    }

    /// Zoom out (decrease pixels per unit).
    pub fn zoom_out(&mut self) {
        self.set_effective(self.effective_pixels_per_unit() * ZOOM_OUT_STEP);
    }

    /// Clamp `effective` to the zoom limits and store it through `pixels_per_unit`.
    fn set_effective(&mut self, effective: f32) {
        let effective = effective.clamp(MIN_PIXELS_PER_UNIT, MAX_PIXELS_PER_UNIT);
        self.pixels_per_unit = effective / self.zoom_factor;
    }

    /// Set the zoom multiplier; the effective density stays within the zoom limits.
    pub fn set_zoom(&mut self, factor: f32) -> Result<(), ValidationError> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(ValidationError::for_view(
                "zoom",
                format!("must be a positive number (got {factor})"),
            ));
        }
        let effective = (self.pixels_per_unit * factor).clamp(MIN_PIXELS_PER_UNIT, MAX_PIXELS_PER_UNIT);
        self.zoom_factor = effective / self.pixels_per_unit;
        Ok(())
    }
}
