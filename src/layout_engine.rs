pub mod bounds;
mod full_layout;
mod organizer;
mod reflow;

pub use bounds::{DesktopTask, TaskBounds, TaskId};
pub use full_layout::compute_full_layout;
pub use organizer::organize_desktop_tasks;
pub use reflow::reflow_after_dismiss;
