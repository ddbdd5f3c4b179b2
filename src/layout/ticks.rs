//! Timeline header ticks and background grid columns.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::model::{ProjectBounds, TimelineScale, ViewState};

/// Language used for month names and the week prefix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelLocale {
    #[default]
    En,
    Fr,
}

const MONTHS_EN: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];
const MONTHS_EN_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
const MONTHS_FR: [&str; 12] = [
    "janvier", "février", "mars", "avril", "mai", "juin", "juillet", "août", "septembre",
    "octobre", "novembre", "décembre",
];
const MONTHS_FR_SHORT: [&str; 12] = [
    "janv.", "févr.", "mars", "avr.", "mai", "juin", "juil.", "août", "sept.", "oct.", "nov.",
    "déc.",
];

impl LabelLocale {
    pub fn month_name(self, date: NaiveDate) -> &'static str {
        let idx = date.month0() as usize;
        match self {
            LabelLocale::En => MONTHS_EN[idx],
            LabelLocale::Fr => MONTHS_FR[idx],
        }
    }

    pub fn month_short(self, date: NaiveDate) -> &'static str {
        let idx = date.month0() as usize;
        match self {
            LabelLocale::En => MONTHS_EN_SHORT[idx],
            LabelLocale::Fr => MONTHS_FR_SHORT[idx],
        }
    }

    /// Prefix before an ISO week number ("W12", "S12").
    pub fn week_prefix(self) -> &'static str {
        match self {
            LabelLocale::En => "W",
            LabelLocale::Fr => "S",
        }
    }

    pub fn month_year(self, date: NaiveDate) -> String {
        format!("{} {}", self.month_name(date), date.year())
    }
}

/// Which header row a tick belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TickRow {
    /// Months (day/week scale) or years (month scale).
    Primary,
    /// Days, ISO weeks or months.
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    pub row: TickRow,
    pub x: f32,
    pub width: f32,
    pub label: String,
    pub weekend: bool,
}

/// One background column of the timeline grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridColumn {
    pub x: f32,
    pub width: f32,
    pub weekend: bool,
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Build both header rows for the whole project range.
pub fn header_ticks(
    bounds: &ProjectBounds,
    scale: TimelineScale,
    pixels_per_day: f32,
    locale: LabelLocale,
) -> Vec<Tick> {
    let total_days = bounds.total_days();
    let step = i64::from(scale.days_per_unit());
    let unit_width = step as f32 * pixels_per_day;
    let mut secondary = Vec::new();
    let mut primary: Vec<Tick> = Vec::new();
    let mut current_month = None;

    let mut i = 0;
    while i < total_days {
        let date = bounds.range_start + Duration::days(i);
        let x = i as f32 * pixels_per_day;

        match scale {
            TimelineScale::Days | TimelineScale::Weeks => {
                let (label, weekend) = if scale == TimelineScale::Days {
                    (date.day().to_string(), is_weekend(date))
                } else {
                    (format!("{}{}", locale.week_prefix(), date.iso_week().week()), false)
                };
                secondary.push(Tick { row: TickRow::Secondary, x, width: unit_width, label, weekend });

                let month = (date.year(), date.month());
                if current_month != Some(month) {
                    current_month = Some(month);
                    primary.push(Tick {
                        row: TickRow::Primary,
                        x,
                        width: 0.0,
                        label: locale.month_year(date),
                        weekend: false,
                    });
                }
            }
            TimelineScale::Months => {
                secondary.push(Tick {
                    row: TickRow::Secondary,
                    x,
                    width: unit_width,
                    label: locale.month_short(date).to_string(),
                    weekend: false,
                });
                primary.push(Tick {
                    row: TickRow::Primary,
                    x,
                    width: unit_width,
                    label: date.year().to_string(),
                    weekend: false,
                });
            }
        }
        i += step;
    }

    // Month labels stretch to the next month label or the canvas edge.
    if scale != TimelineScale::Months {
        let canvas_width = total_days as f32 * pixels_per_day;
        let next_xs: Vec<f32> = primary.iter().skip(1).map(|t| t.x).chain([canvas_width]).collect();
        for (tick, next_x) in primary.iter_mut().zip(next_xs) {
            tick.width = next_x - tick.x;
        }
    }

    primary.extend(secondary);
    primary
}

/// Background columns, one per scale unit.
pub fn grid_columns(bounds: &ProjectBounds, view: &ViewState, pixels_per_day: f32) -> Vec<GridColumn> {
    let step = i64::from(view.scale.days_per_unit());
    let shade_weekends = view.scale == TimelineScale::Days && view.show_weekends;
    (0..bounds.total_days())
        .step_by(step as usize)
        .map(|i| GridColumn {
            x: i as f32 * pixels_per_day,
            width: step as f32 * pixels_per_day,
            weekend: shade_weekends && is_weekend(bounds.range_start + Duration::days(i)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bounds(start: NaiveDate, days: i64) -> ProjectBounds {
        ProjectBounds {
            range_start: start,
            range_end: start + Duration::days(days),
        }
    }

    fn row(ticks: &[Tick], row: TickRow) -> Vec<&Tick> {
        ticks.iter().filter(|t| t.row == row).collect()
    }

    #[test]
    fn day_scale_marks_weekends_and_month_boundaries() {
        // 2025-01-30 is a Thursday.
        let ticks = header_ticks(&bounds(date(2025, 1, 30), 5), TimelineScale::Days, 10.0, LabelLocale::En);
        let days = row(&ticks, TickRow::Secondary);
        let labels: Vec<&str> = days.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["30", "31", "1", "2", "3"]);
        let weekends: Vec<bool> = days.iter().map(|t| t.weekend).collect();
        assert_eq!(weekends, vec![false, false, true, true, false]);

        let months = row(&ticks, TickRow::Primary);
        assert_eq!(months.len(), 2);
        assert_eq!(months[0].label, "January 2025");
        assert_eq!(months[1].label, "February 2025");
        assert_relative_eq!(months[1].x, 20.0);
        assert_relative_eq!(months[0].width, 20.0);
        assert_relative_eq!(months[1].width, 30.0);
    }

    #[test]
    fn week_scale_uses_iso_week_numbers() {
        // 2024-12-30 belongs to ISO week 1 of 2025.
        let ticks = header_ticks(&bounds(date(2024, 12, 30), 14), TimelineScale::Weeks, 2.0, LabelLocale::Fr);
        let weeks = row(&ticks, TickRow::Secondary);
        let labels: Vec<&str> = weeks.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["S1", "S2"]);
        assert_relative_eq!(weeks[1].x, 14.0);
        assert_relative_eq!(weeks[0].width, 14.0);
        assert_eq!(row(&ticks, TickRow::Primary)[0].label, "décembre 2024");
    }

    #[test]
    fn month_scale_has_parallel_year_row() {
        let ticks = header_ticks(&bounds(date(2025, 11, 15), 60), TimelineScale::Months, 1.0, LabelLocale::En);
        let months: Vec<&str> = row(&ticks, TickRow::Secondary).iter().map(|t| t.label.as_str()).collect();
        let years: Vec<&str> = row(&ticks, TickRow::Primary).iter().map(|t| t.label.as_str()).collect();
        assert_eq!(months, vec!["Nov", "Dec"]);
        assert_eq!(years, vec!["2025", "2025"]);
    }

    #[test]
    fn weekend_columns_only_shaded_on_day_scale() {
        let b = bounds(date(2025, 2, 1), 14);
        let mut view = ViewState::default();
        let columns = grid_columns(&b, &view, 10.0);
        assert_eq!(columns.len(), 14);
        assert!(columns[0].weekend);

        view.show_weekends = false;
        assert!(grid_columns(&b, &view, 10.0).iter().all(|c| !c.weekend));

        view.show_weekends = true;
        view.scale = TimelineScale::Weeks;
        let weekly = grid_columns(&b, &view, 10.0);
        assert_eq!(weekly.len(), 2);
        assert!(weekly.iter().all(|c| !c.weekend));
    }
}
