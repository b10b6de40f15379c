use std::collections::BTreeMap;

use tracing::debug;

use crate::common::config::LayoutConfig;
use crate::geometry::Rect;
use crate::layout_engine::bounds::TaskId;

/// Incrementally relayouts `current` after dismissing one task, touching
/// only the rows the removal affects.
///
/// When the dismissed task shared its row, the remaining row members close
/// ranks and re-center around the horizontal center of the original grid;
/// every other row passes through untouched. When the dismissed task was
/// alone in its row, the row disappears and the surviving rows re-stack
/// around the original grid's vertical center, keeping their horizontal
/// positions.
///
/// A `removed` id that is not present is a benign no-op: the input comes
/// back unchanged. Callers must not read success out of that.
pub fn reflow_after_dismiss(
    current: &[(TaskId, Rect)],
    removed: TaskId,
    config: &LayoutConfig,
) -> Vec<(TaskId, Rect)> {
    let Some(pos) = current.iter().position(|&(id, _)| id == removed) else {
        debug!(%removed, "dismissed task not in layout, keeping bounds unchanged");
        return current.to_vec();
    };

    let grid = current
        .iter()
        .fold(Rect::default(), |acc, (_, bounds)| acc.union(bounds));
    let removed_top = current[pos].1.top;

    let mut out: Vec<(TaskId, Rect)> = current
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != pos)
        .map(|(_, &entry)| entry)
        .collect();

    // Rows are keyed by exact top equality; integer bounds make this sound,
    // but sub-pixel bounds would need tolerance bucketing here.
    let row_mates: Vec<usize> = out
        .iter()
        .enumerate()
        .filter(|(_, (_, bounds))| bounds.top == removed_top)
        .map(|(i, _)| i)
        .collect();

    if row_mates.is_empty() {
        restack_rows(&mut out, grid, config.padding.vertical);
    } else {
        recenter_row(&mut out, &row_mates, grid, config.padding.horizontal);
    }
    out
}

/// Re-stacks all rows contiguously, centered on the original grid's
/// vertical center. Horizontal positions are untouched.
fn restack_rows(entries: &mut [(TaskId, Rect)], grid: Rect, vertical_padding: i32) {
    let mut rows: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
    for (i, (_, bounds)) in entries.iter().enumerate() {
        rows.entry(bounds.top).or_default().push(i);
    }
    if rows.is_empty() {
        return;
    }

    let row_heights: Vec<i32> = rows
        .values()
        .map(|members| {
            members
                .iter()
                .map(|&i| entries[i].1.height())
                .max()
                .unwrap_or(0)
        })
        .collect();
    let total: i32 =
        row_heights.iter().sum::<i32>() + (rows.len() as i32 - 1) * vertical_padding;

    let mut new_top = grid.center_y() - total / 2;
    for ((row_top, members), height) in rows.iter().zip(&row_heights) {
        let dy = new_top - row_top;
        if dy != 0 {
            for &i in members {
                entries[i].1 = entries[i].1.offset(0, dy);
            }
        }
        new_top += height + vertical_padding;
    }
}

/// Closes the gap in one row and re-centers it on the original grid's
/// horizontal center, preserving the members' input order.
fn recenter_row(
    entries: &mut [(TaskId, Rect)],
    members: &[usize],
    grid: Rect,
    horizontal_padding: i32,
) {
    let total: i32 = members.iter().map(|&i| entries[i].1.width()).sum::<i32>()
        + (members.len() as i32 - 1) * horizontal_padding;

    let mut x = grid.center_x() - total / 2;
    for &i in members {
        let bounds = entries[i].1;
        entries[i].1 = Rect::new(x, bounds.top, x + bounds.width(), bounds.bottom);
        x += bounds.width() + horizontal_padding;
    }
}
