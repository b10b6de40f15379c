use tracing::debug;

use crate::common::collections::{HashMap, HashSet};
use crate::common::config::LayoutConfig;
use crate::geometry::Rect;
use crate::layout_engine::bounds::{DesktopTask, TaskBounds, TaskId};
use crate::layout_engine::full_layout::compute_full_layout;
use crate::layout_engine::reflow::reflow_after_dismiss;

/// Lays out the current desktop tasks, preferring the incremental reflow
/// over a full recompute when a single dismissal cannot have changed which
/// tasks fit.
///
/// `previous_layout` is the hint from the last call for the same desktop;
/// it is only read, never mutated. `dismissed_task` names the task being
/// removed by this event, if any. The result has exactly one entry per
/// surviving input task.
pub fn organize_desktop_tasks(
    tasks: &[DesktopTask],
    config: &LayoutConfig,
    previous_layout: Option<&[TaskBounds]>,
    dismissed_task: Option<TaskId>,
) -> Vec<TaskBounds> {
    let remaining: Vec<DesktopTask> = tasks
        .iter()
        .filter(|task| Some(task.id) != dismissed_task)
        .copied()
        .collect();

    let result = match (dismissed_task, previous_layout) {
        (None, _) => {
            debug!(tasks = remaining.len(), "full layout: no dismissal");
            full_pass(&remaining, config)
        }
        (Some(_), _) if remaining.is_empty() => Vec::new(),
        (Some(removed), None) => {
            debug!(%removed, "full layout: no previous layout to reflow");
            full_pass(&remaining, config)
        }
        (Some(removed), Some(hint)) => incremental_pass(&remaining, removed, hint, config),
    };

    hide_transparent(result, tasks)
}

/// Runs the full-layout engine over every non-transparent task and emits
/// results in input order.
fn full_pass(tasks: &[DesktopTask], config: &LayoutConfig) -> Vec<TaskBounds> {
    let input: Vec<(TaskId, Rect)> = tasks
        .iter()
        .filter(|task| !task.fully_transparent)
        .map(|task| (task.id, task.natural_bounds))
        .collect();
    let by_id: HashMap<TaskId, TaskBounds> = compute_full_layout(&input, config)
        .into_iter()
        .map(|entry| (entry.task_id(), entry))
        .collect();

    tasks
        .iter()
        .map(|task| {
            by_id
                .get(&task.id)
                .copied()
                .unwrap_or(TaskBounds::Hidden { task_id: task.id })
        })
        .collect()
}

fn incremental_pass(
    remaining: &[DesktopTask],
    removed: TaskId,
    hint: &[TaskBounds],
    config: &LayoutConfig,
) -> Vec<TaskBounds> {
    let hint_without_removed =
        || -> Vec<TaskBounds> { hint.iter().filter(|b| b.task_id() != removed).copied().collect() };

    match hint.iter().find(|b| b.task_id() == removed) {
        None => {
            // Stale dismissal; nothing in the visible layout can change.
            debug!(%removed, "dismissed task not in previous layout, reusing it");
            return hint_without_removed();
        }
        Some(TaskBounds::Hidden { .. }) => {
            // Removing a hidden task cannot affect the visible grid.
            debug!(%removed, "dismissed task was hidden, reusing previous layout");
            return hint_without_removed();
        }
        Some(TaskBounds::Rendered { .. }) => {}
    }

    // If some tasks did not fit before, the removal may have freed enough
    // room to change which tasks are visible; only a full recompute can
    // tell. When the visible set is unchanged, the cheap reflow suffices.
    let hint_has_hidden = hint
        .iter()
        .any(|b| !b.is_rendered() && b.task_id() != removed);
    if hint_has_hidden {
        let full = full_pass(remaining, config);
        let full_visible: HashSet<TaskId> =
            full.iter().filter(|b| b.is_rendered()).map(|b| b.task_id()).collect();
        let hint_visible: HashSet<TaskId> = hint
            .iter()
            .filter(|b| b.is_rendered() && b.task_id() != removed)
            .map(|b| b.task_id())
            .collect();
        if full_visible != hint_visible {
            debug!(%removed, "visible set changed, using full relayout");
            return full;
        }
    }

    debug!(%removed, "reflowing previous layout");
    let current: Vec<(TaskId, Rect)> = hint
        .iter()
        .filter_map(|b| b.bounds().map(|bounds| (b.task_id(), bounds)))
        .collect();
    let reflowed: HashMap<TaskId, Rect> =
        reflow_after_dismiss(&current, removed, config).into_iter().collect();

    hint.iter()
        .filter(|b| b.task_id() != removed)
        .map(|b| match b {
            TaskBounds::Rendered { task_id, bounds } => {
                let bounds = reflowed.get(task_id).copied().unwrap_or(*bounds);
                TaskBounds::rendered(*task_id, bounds)
            }
            TaskBounds::Hidden { .. } => *b,
        })
        .collect()
}

/// Transparent tasks never take part in the grid; whatever an engine said,
/// they come back `Hidden`.
fn hide_transparent(result: Vec<TaskBounds>, tasks: &[DesktopTask]) -> Vec<TaskBounds> {
    let transparent: HashSet<TaskId> = tasks
        .iter()
        .filter(|task| task.fully_transparent)
        .map(|task| task.id)
        .collect();
    if transparent.is_empty() {
        return result;
    }
    result
        .into_iter()
        .map(|entry| {
            if transparent.contains(&entry.task_id()) {
                TaskBounds::Hidden { task_id: entry.task_id() }
            } else {
                entry
            }
        })
        .collect()
}
