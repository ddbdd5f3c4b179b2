//! Gantt planning engine.
//!
//! Reads a GanttProject plan document into a [`model::Project`], lays it out
//! on a day, week or month timeline and routes dependency connectors between
//! the bars. The desktop binary in this package is one rendering surface for
//! the resulting [`layout::Layout`].

pub mod config;
pub mod edit;
pub mod error;
pub mod io;
pub mod layout;
pub mod model;
pub mod session;

pub use error::{LayoutDegenerate, ParseError, ValidationError};
pub use layout::{Layout, LayoutEngine};
pub use model::{Project, Task, TimelineScale, ViewState};
pub use session::{LoadOutcome, LoadTicket, PlanSession};
