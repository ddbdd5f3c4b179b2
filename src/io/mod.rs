pub mod file;
pub mod gan;

pub use file::{FilePlanSource, PlanSource};
pub use gan::{conventional_phase_colors, parse_plan, ParseOptions};
