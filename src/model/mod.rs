pub mod project;
pub mod resource;
pub mod task;
pub mod timeline;

pub use project::{Project, ProjectBounds};
pub use resource::Resource;
pub use task::{ResourceAssignment, Task};
pub use timeline::{TimelineScale, ViewState};
