use std::collections::BTreeMap;

use tracing::trace;

use crate::common::config::LayoutConfig;
use crate::geometry::Rect;
use crate::layout_engine::bounds::{TaskBounds, TaskId};

/// Computes a full grid layout for `tasks` inside `config.desktop_bounds`.
///
/// Tasks keep their input order as row-fill order. Each task contributes its
/// natural aspect ratio; all tiles in the grid share one row height found by
/// the balancing search. Tasks with empty natural bounds, and tasks the
/// search cannot place, come back as `Hidden`. The output always has one
/// entry per input task, in input order.
pub fn compute_full_layout(tasks: &[(TaskId, Rect)], config: &LayoutConfig) -> Vec<TaskBounds> {
    let area = config.grid_area();
    if area.is_empty() || config.max_rows < 1 {
        return tasks.iter().map(|&(id, _)| TaskBounds::Hidden { task_id: id }).collect();
    }

    let naturals: Vec<Rect> = tasks
        .iter()
        .filter(|(_, natural)| !natural.is_empty())
        .map(|&(_, natural)| natural)
        .collect();
    if naturals.is_empty() {
        return tasks.iter().map(|&(id, _)| TaskBounds::Hidden { task_id: id }).collect();
    }

    // Single-row attempt: each of the rows a multi-row layout would get is
    // granted an equal share of the width, and packing may not wrap. Only if
    // every task fits one row under that share do we keep the result.
    let single_row_area = Rect::new(
        area.left,
        area.top,
        area.left + area.width() / config.max_rows,
        area.bottom,
    );
    let mut attempt = balance_search(&naturals, single_row_area, 1, config);
    if !attempt.all_fit {
        trace!(tasks = naturals.len(), "single-row attempt failed, packing multi-row");
        attempt = balance_search(&naturals, area, config.max_rows, config);
    }

    // If anything was left unplaced, rerun the search over the placed subset
    // so its shared height is optimal for exactly that set.
    if !attempt.all_fit {
        let placed: Vec<usize> =
            (0..naturals.len()).filter(|&i| attempt.rects[i].is_some()).collect();
        if !placed.is_empty() && placed.len() < naturals.len() {
            trace!(
                placed = placed.len(),
                total = naturals.len(),
                "re-balancing the placed subset"
            );
            let subset: Vec<Rect> = placed.iter().map(|&i| naturals[i]).collect();
            let second = balance_search(&subset, area, config.max_rows, config);
            let mut rects = vec![None; naturals.len()];
            for (j, &i) in placed.iter().enumerate() {
                rects[i] = second.rects[j];
            }
            attempt.rects = rects;
        }
    }

    center_grid(&mut attempt.rects, area);

    let mut out = Vec::with_capacity(tasks.len());
    let mut next_valid = 0;
    for &(id, natural) in tasks {
        if natural.is_empty() {
            out.push(TaskBounds::Hidden { task_id: id });
            continue;
        }
        let rect = attempt.rects[next_valid];
        next_valid += 1;
        out.push(match rect {
            Some(bounds) => TaskBounds::rendered(id, bounds),
            None => TaskBounds::Hidden { task_id: id },
        });
    }
    out
}

struct PackAttempt {
    /// One slot per task, `None` when the task could not be placed.
    rects: Vec<Option<Rect>>,
    all_fit: bool,
    /// Right edge of each packed row, in row order.
    row_rights: Vec<i32>,
}

impl PackAttempt {
    fn width_diff(&self) -> i32 {
        match (self.row_rights.iter().max(), self.row_rights.iter().min()) {
            (Some(max), Some(min)) => max - min,
            _ => 0,
        }
    }

    fn max_right(&self) -> Option<i32> { self.row_rights.iter().max().copied() }
}

/// Finds the largest uniform row height at which every task packs into
/// `area` with at most `rows_cap` rows, then tightens the packing's right
/// edge to balance row widths.
///
/// Height is bisected between the minimum implied by `min_task_width` and
/// the full area height. After the height is fixed, the right edge used for
/// wrapping shrinks one pixel at a time for as long as every task still fits
/// and the spread between the narrowest and widest row does not grow; the
/// last accepted packing wins. The returned attempt may have unplaced tasks
/// when no height in range fits everything.
fn balance_search(
    naturals: &[Rect],
    area: Rect,
    rows_cap: i32,
    config: &LayoutConfig,
) -> PackAttempt {
    let mut low = min_height_for_min_width(naturals, config.min_task_width);
    let mut high = (area.height() + 1).max(low + 1);
    while high - low > 1 {
        let mid = low + (high - low) / 2;
        let trial = pack_rows(naturals, area, mid, area.right, rows_cap, config);
        if trial.all_fit {
            low = mid;
        } else {
            high = mid;
        }
    }
    let height = low;

    let mut best = pack_rows(naturals, area, height, area.right, rows_cap, config);
    if best.all_fit && best.row_rights.len() > 1 {
        let mut width_diff = best.width_diff();
        // Any edge right of the widest row packs identically, so the shrink
        // can begin at that row's edge.
        let mut right_edge = best.max_right().unwrap_or(area.right);
        while right_edge > area.left {
            right_edge -= 1;
            let trial = pack_rows(naturals, area, height, right_edge, rows_cap, config);
            if !trial.all_fit || trial.width_diff() > width_diff {
                break;
            }
            width_diff = trial.width_diff();
            best = trial;
        }
    }
    best
}

/// The smallest row height at which every task's scaled width still reaches
/// `min_width`.
fn min_height_for_min_width(naturals: &[Rect], min_width: i32) -> i32 {
    naturals
        .iter()
        .map(|natural| {
            let w = natural.width() as i64;
            let h = natural.height() as i64;
            ((min_width as i64 * h + w - 1) / w) as i32
        })
        .max()
        .unwrap_or(1)
        .max(1)
}

fn scaled_width(natural: &Rect, height: i32) -> i32 {
    let w = natural.width() as i64;
    let h = natural.height() as i64;
    (((w * height as i64) + h / 2) / h).max(1) as i32
}

/// Packs tasks left to right, top to bottom, at one uniform row height.
///
/// A task wraps to the next row when it would cross `right_edge`. A task
/// whose scaled width alone exceeds the row is skipped and clears
/// `all_fit`; a wrap past `rows_cap` or the area bottom leaves the rest of
/// the tasks unplaced.
fn pack_rows(
    naturals: &[Rect],
    area: Rect,
    row_height: i32,
    right_edge: i32,
    rows_cap: i32,
    config: &LayoutConfig,
) -> PackAttempt {
    let mut rects: Vec<Option<Rect>> = vec![None; naturals.len()];
    let mut row_rights = Vec::new();
    let mut all_fit = true;

    if row_height > area.height() {
        return PackAttempt {
            rects,
            all_fit: naturals.is_empty(),
            row_rights,
        };
    }

    let hpad = config.padding.horizontal;
    let vpad = config.padding.vertical;
    let mut cursor = area.left;
    let mut top = area.top;
    let mut row_index = 0;
    let mut row_occupied = false;

    for (i, natural) in naturals.iter().enumerate() {
        let width = scaled_width(natural, row_height);
        if width > right_edge - area.left {
            // Too wide for any row at this height.
            all_fit = false;
            continue;
        }
        let mut x = if row_occupied { cursor + hpad } else { cursor };
        if row_occupied && x + width > right_edge {
            row_rights.push(cursor);
            row_index += 1;
            top += row_height + vpad;
            if row_index >= rows_cap || top + row_height > area.bottom {
                // No room for another row; the rest stays unplaced.
                all_fit = false;
                break;
            }
            x = area.left;
        }
        rects[i] = Some(Rect::new(x, top, x + width, top + row_height));
        cursor = x + width;
        row_occupied = true;
    }
    if row_occupied {
        row_rights.push(cursor);
    }

    PackAttempt { rects, all_fit, row_rights }
}

/// Centers the packed grid inside `area`: each row is shifted right so its
/// span is centered on the area's horizontal center (rows never move left of
/// where they were packed), then one uniform vertical offset centers the
/// union of all rows between the area's top and bottom edges.
fn center_grid(rects: &mut [Option<Rect>], area: Rect) {
    let mut rows: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
    for (i, rect) in rects.iter().enumerate() {
        if let Some(rect) = rect {
            rows.entry(rect.top).or_default().push(i);
        }
    }
    if rows.is_empty() {
        return;
    }

    let mut max_bottom = area.top;
    for members in rows.values() {
        let mut row_left = i32::MAX;
        let mut row_right = i32::MIN;
        for &i in members {
            let rect = rects[i].as_ref().unwrap();
            row_left = row_left.min(rect.left);
            row_right = row_right.max(rect.right);
            max_bottom = max_bottom.max(rect.bottom);
        }
        let dx = (area.center_x() - (row_left + row_right) / 2).max(0);
        if dx != 0 {
            for &i in members {
                let rect = rects[i].take().unwrap();
                rects[i] = Some(rect.offset(dx, 0));
            }
        }
    }

    let dy = ((area.bottom - max_bottom) / 2).max(0);
    if dy != 0 {
        for rect in rects.iter_mut().flatten() {
            *rect = rect.offset(0, dy);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::common::config::{MarginSettings, PaddingSettings};

    fn config(desktop: Rect, min_task_width: i32, max_rows: i32, pad: i32) -> LayoutConfig {
        LayoutConfig {
            desktop_bounds: desktop,
            min_task_width,
            max_rows,
            padding: PaddingSettings { horizontal: pad, vertical: pad },
            margins: MarginSettings::default(),
        }
    }

    fn rendered(result: &[TaskBounds]) -> Vec<(TaskId, Rect)> {
        result
            .iter()
            .filter_map(|b| b.bounds().map(|bounds| (b.task_id(), bounds)))
            .collect()
    }

    #[test]
    fn three_wide_tasks_fill_a_single_centered_row() {
        let cfg = config(Rect::new(0, 0, 1000, 1000), 100, 2, 10);
        let natural = Rect::new(0, 0, 200, 100);
        let tasks = vec![(TaskId(1), natural), (TaskId(2), natural), (TaskId(3), natural)];

        let result = compute_full_layout(&tasks, &cfg);

        assert_eq!(result, vec![
            TaskBounds::rendered(TaskId(1), Rect::new(250, 460, 410, 540)),
            TaskBounds::rendered(TaskId(2), Rect::new(420, 460, 580, 540)),
            TaskBounds::rendered(TaskId(3), Rect::new(590, 460, 750, 540)),
        ]);
    }

    #[test]
    fn five_square_tasks_split_three_then_two() {
        let cfg = config(Rect::new(0, 0, 1000, 1000), 100, 2, 10);
        let natural = Rect::new(0, 0, 100, 100);
        let tasks: Vec<_> = (1..=5).map(|i| (TaskId(i), natural)).collect();

        let result = compute_full_layout(&tasks, &cfg);

        assert_eq!(result, vec![
            TaskBounds::rendered(TaskId(1), Rect::new(1, 169, 327, 495)),
            TaskBounds::rendered(TaskId(2), Rect::new(337, 169, 663, 495)),
            TaskBounds::rendered(TaskId(3), Rect::new(673, 169, 999, 495)),
            TaskBounds::rendered(TaskId(4), Rect::new(169, 505, 495, 831)),
            TaskBounds::rendered(TaskId(5), Rect::new(505, 505, 831, 831)),
        ]);
    }

    #[test]
    fn empty_natural_bounds_are_always_hidden() {
        let cfg = config(Rect::new(0, 0, 1000, 1000), 100, 2, 10);
        let tasks = vec![
            (TaskId(1), Rect::new(0, 0, 200, 100)),
            (TaskId(2), Rect::new(0, 0, 0, 0)),
            (TaskId(3), Rect::new(0, 0, 200, 100)),
        ];

        let result = compute_full_layout(&tasks, &cfg);

        assert_eq!(result.len(), 3);
        assert_eq!(result[1], TaskBounds::Hidden { task_id: TaskId(2) });
        assert!(result[0].is_rendered());
        assert!(result[2].is_rendered());
    }

    #[test]
    fn empty_container_hides_everything() {
        let cfg = config(Rect::new(0, 0, 0, 0), 100, 2, 10);
        let tasks = vec![
            (TaskId(1), Rect::new(0, 0, 200, 100)),
            (TaskId(2), Rect::new(0, 0, 100, 100)),
        ];

        let result = compute_full_layout(&tasks, &cfg);

        assert_eq!(result, vec![
            TaskBounds::Hidden { task_id: TaskId(1) },
            TaskBounds::Hidden { task_id: TaskId(2) },
        ]);
    }

    #[test]
    fn unplaceable_task_does_not_shrink_the_rest() {
        // The middle task's aspect ratio is so wide it can never reach the
        // minimum width inside the container; the two squares should still
        // get the full-size tiles they would get on their own.
        let cfg = config(Rect::new(0, 0, 1000, 400), 50, 2, 0);
        let tasks = vec![
            (TaskId(1), Rect::new(0, 0, 100, 100)),
            (TaskId(2), Rect::new(0, 0, 10000, 100)),
            (TaskId(3), Rect::new(0, 0, 100, 100)),
        ];

        let result = compute_full_layout(&tasks, &cfg);

        assert_eq!(result, vec![
            TaskBounds::rendered(TaskId(1), Rect::new(100, 0, 500, 400)),
            TaskBounds::Hidden { task_id: TaskId(2) },
            TaskBounds::rendered(TaskId(3), Rect::new(500, 0, 900, 400)),
        ]);
    }

    #[test]
    fn full_layout_is_idempotent() {
        let cfg = config(Rect::new(0, 0, 1280, 800), 120, 3, 12);
        let tasks = vec![
            (TaskId(1), Rect::new(0, 0, 300, 200)),
            (TaskId(2), Rect::new(50, 50, 150, 150)),
            (TaskId(3), Rect::new(0, 0, 400, 100)),
            (TaskId(4), Rect::new(0, 0, 200, 300)),
        ];

        assert_eq!(compute_full_layout(&tasks, &cfg), compute_full_layout(&tasks, &cfg));
    }

    #[test]
    fn output_preserves_cardinality_stays_inside_and_never_overlaps() {
        let desktop = Rect::new(0, 0, 1920, 1080);
        let cfg = LayoutConfig {
            desktop_bounds: desktop,
            min_task_width: 100,
            max_rows: 3,
            padding: PaddingSettings { horizontal: 16, vertical: 16 },
            margins: MarginSettings { left: 24, top: 24, right: 24, bottom: 24 },
        };
        let tasks = vec![
            (TaskId(1), Rect::new(0, 0, 300, 200)),
            (TaskId(2), Rect::new(0, 0, 100, 100)),
            (TaskId(3), Rect::new(0, 0, 400, 100)),
            (TaskId(4), Rect::new(0, 0, 200, 300)),
            (TaskId(5), Rect::new(0, 0, 150, 150)),
            (TaskId(6), Rect::new(0, 0, 320, 240)),
            (TaskId(7), Rect::new(0, 0, 640, 480)),
        ];

        let result = compute_full_layout(&tasks, &cfg);

        assert_eq!(result.len(), tasks.len());
        let input_ids: Vec<_> = tasks.iter().map(|&(id, _)| id).collect();
        let output_ids: Vec<_> = result.iter().map(|b| b.task_id()).collect();
        assert_eq!(input_ids, output_ids);

        let placed = rendered(&result);
        for (id, bounds) in &placed {
            assert!(desktop.contains(bounds), "{id} escapes the container: {bounds:?}");
        }
        for (i, (a_id, a)) in placed.iter().enumerate() {
            for (b_id, b) in &placed[i + 1..] {
                assert!(!a.intersects(b), "{a_id} overlaps {b_id}");
            }
        }
    }

    #[test]
    fn single_task_is_centered() {
        let cfg = config(Rect::new(0, 0, 1000, 1000), 100, 2, 10);
        let result =
            compute_full_layout(&[(TaskId(9), Rect::new(0, 0, 200, 100))], &cfg);

        let (_, bounds) = rendered(&result)[0];
        // 2:1 tile capped by the single-row width share (1000 / 2).
        assert_eq!(bounds.width(), 500);
        assert_eq!(bounds.height(), 250);
        assert_eq!(bounds.center_x(), 500);
        assert_eq!(bounds.center_y(), 500);
    }
}
