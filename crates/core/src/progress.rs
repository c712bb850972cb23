//! Checklist progress.

use crate::task::TaskItem;

/// Percentage of done tasks, rounded to the nearest integer with ties
/// rounding up. An empty checklist is 0%.
pub fn progress(tasks: &[TaskItem]) -> u8 {
    let total = tasks.len();
    if total == 0 {
        return 0;
    }
    let done = tasks.iter().filter(|t| t.done).count();
    // round(100 * done / total) for non-negative values
    ((200 * done + total) / (2 * total)) as u8
}
