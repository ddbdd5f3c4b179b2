use tracing::debug;

use crate::model::timeline::{MAX_FIT_PIXELS_PER_UNIT, MIN_PIXELS_PER_UNIT};
use crate::model::{TimelineScale, ViewState};

/// Below this many pixels per day the range is shown in months.
const MONTH_THRESHOLD: f32 = 20.0;
/// Below this many pixels per day the range is shown in weeks.
const WEEK_THRESHOLD: f32 = 50.0;

/// Pick a scale and density so `total_days` fill `viewport_width` pixels.
///
/// Resets the zoom factor to 1 and clamps the chosen pixels-per-unit to
/// `[10, 100]`. Returns `false` and leaves `view` untouched when either input
/// is not positive.
pub fn fit_view(view: &mut ViewState, total_days: i64, viewport_width: f32) -> bool {
    if total_days <= 0 || !(viewport_width > 0.0 && viewport_width.is_finite()) {
        debug!(total_days, viewport_width, "skipping fit");
        return false;
    }

    let days = total_days as f32;
    let candidate = viewport_width / days;
    let scale = if candidate < MONTH_THRESHOLD {
        TimelineScale::Months
    } else if candidate < WEEK_THRESHOLD {
        TimelineScale::Weeks
    } else {
        TimelineScale::Days
    };
    let units = days / scale.days_per_unit() as f32;
    let pixels_per_unit = (viewport_width / units).clamp(MIN_PIXELS_PER_UNIT, MAX_FIT_PIXELS_PER_UNIT);

    view.scale = scale;
    view.pixels_per_unit = pixels_per_unit;
    view.zoom_factor = 1.0;

    debug!(?scale, pixels_per_unit, total_days, viewport_width, "fitted timeline");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn short_range_stays_on_days() {
        let mut view = ViewState::default();
        assert!(fit_view(&mut view, 10, 1000.0));
        assert_eq!(view.scale, TimelineScale::Days);
        assert_relative_eq!(view.pixels_per_unit, 100.0);
    }

    #[test]
    fn medium_range_switches_to_weeks() {
        let mut view = ViewState::default();
        view.zoom_factor = 3.0;
        assert!(fit_view(&mut view, 35, 1000.0));
        assert_eq!(view.scale, TimelineScale::Weeks);
        assert_relative_eq!(view.pixels_per_unit, 100.0);
        assert_relative_eq!(view.zoom_factor, 1.0);
    }

    #[test]
    fn long_range_switches_to_months() {
        let mut view = ViewState::default();
        assert!(fit_view(&mut view, 600, 1200.0));
        assert_eq!(view.scale, TimelineScale::Months);
        assert_relative_eq!(view.pixels_per_unit, 60.0);
        assert_relative_eq!(view.pixels_per_day() * 600.0, 1200.0);
    }

    #[test]
    fn very_long_range_is_floored() {
        let mut view = ViewState::default();
        assert!(fit_view(&mut view, 3650, 300.0));
        assert_relative_eq!(view.pixels_per_unit, MIN_PIXELS_PER_UNIT);
    }

    #[test]
    fn degenerate_inputs_leave_view_alone() {
        let mut view = ViewState::default();
        let before = view.clone();
        assert!(!fit_view(&mut view, 0, 800.0));
        assert!(!fit_view(&mut view, 30, 0.0));
        assert!(!fit_view(&mut view, 30, f32::NAN));
        assert_eq!(view, before);
    }
}
