//! The queued-task descriptor shared by `TaskList` and the `Z`-function
//! construction algorithm.

use crate::time::Time;

/// Sentinel id for the hypothetical "new task" appended while constructing
/// a `Z`-function from a queue.
pub const NEW_TASK_ID: u32 = u32::MAX;

/// A lightweight descriptor of a queued task.
///
/// Invariant: `t >= 0`; for the running (first) task `t` is the remaining
/// execution time, for all others `t = a / power`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TaskProxy {
    pub id: u32,
    /// Task length, in units of work.
    pub a: f64,
    /// Remaining execution time on this node.
    pub t: f64,
    /// Release delay relative to `now`, seconds; negative once released.
    pub r: f64,
    pub rabs: Time,
    /// Cumulative execution-time prefix, recomputed while sorting.
    pub tsum: f64,
}

impl TaskProxy {
    pub fn new(id: u32, a: f64, t: f64, r: f64, rabs: Time) -> Self {
        TaskProxy { id, a, t, r, rabs, tsum: 0.0 }
    }

    /// The synthetic "new task" proxy used while constructing a `Z`-function:
    /// length `a`, running on a node of the given `power`, released now.
    pub fn new_task(a: f64, power: f64, now: Time) -> Self {
        TaskProxy { id: NEW_TASK_ID, a, t: a / power, r: 0.0, rabs: now, tsum: 0.0 }
    }

    pub fn is_new_task(&self) -> bool {
        self.id == NEW_TASK_ID
    }

    /// The latest cumulative end time (relative to release) that still
    /// meets a target `slowness`: `r + slowness * a`.
    pub fn deadline(&self, slowness: f64) -> f64 {
        self.r + slowness * self.a
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadline_scales_with_length() {
        let p = TaskProxy::new(1, 10000.0, 10.0, -5.0, Time::from_secs(0.0));
        assert_eq!(p.deadline(1.0), -5.0 + 10000.0);
        assert_eq!(p.deadline(2.0), -5.0 + 20000.0);
    }

    #[test]
    fn new_task_has_sentinel_id() {
        let p = TaskProxy::new_task(1000.0, 1000.0, Time::from_secs(0.0));
        assert!(p.is_new_task());
        assert_eq!(p.t, 1.0);
    }
}
