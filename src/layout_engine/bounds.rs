use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// Stable identifier for a desktop task, as reported by the window tracker.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct TaskId(pub u32);

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

/// Per-task layout result.
///
/// Every layout call produces exactly one entry per input task. A task is
/// either `Rendered` with a non-empty on-screen rectangle, or `Hidden`
/// because it did not fit, had empty natural bounds, or was excluded by the
/// caller. Consumers match on the variant; there is no behavior here.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskBounds {
    Rendered { task_id: TaskId, bounds: Rect },
    Hidden { task_id: TaskId },
}

impl TaskBounds {
    /// Builds a `Rendered` entry, degrading to `Hidden` when `bounds` is
    /// empty so that a zero-area rendered tile is unrepresentable.
    pub fn rendered(task_id: TaskId, bounds: Rect) -> TaskBounds {
        if bounds.is_empty() {
            TaskBounds::Hidden { task_id }
        } else {
            TaskBounds::Rendered { task_id, bounds }
        }
    }

    pub fn task_id(&self) -> TaskId {
        match self {
            TaskBounds::Rendered { task_id, .. } => *task_id,
            TaskBounds::Hidden { task_id } => *task_id,
        }
    }

    pub fn bounds(&self) -> Option<Rect> {
        match self {
            TaskBounds::Rendered { bounds, .. } => Some(*bounds),
            TaskBounds::Hidden { .. } => None,
        }
    }

    pub fn is_rendered(&self) -> bool { matches!(self, TaskBounds::Rendered { .. }) }
}

/// One task as presented to the orchestrator.
///
/// `natural_bounds` is the window's pre-layout free-form rectangle; only its
/// aspect ratio feeds the grid. `fully_transparent` marks windows whose
/// content is invisible; they are kept out of the layout math entirely and
/// always come back `Hidden`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct DesktopTask {
    pub id: TaskId,
    pub natural_bounds: Rect,
    pub fully_transparent: bool,
}

impl DesktopTask {
    pub fn new(id: TaskId, natural_bounds: Rect) -> Self {
        Self {
            id,
            natural_bounds,
            fully_transparent: false,
        }
    }
}
