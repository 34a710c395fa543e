//! A local task-queue model supporting min-slowness ordering and an
//! incrementally-maintained boundary cache.
//!
//! Mirrors the construction in `FSPTaskList`: the first element is the
//! running task and is never reordered; `sortMinSlowness` finds, by
//! binary search over `boundaries`, the slowness value at which every
//! queued task still meets its deadline while minimizing the worst one.

use crate::proxy::TaskProxy;
use crate::time::{Clock, Duration, Time};

#[derive(Debug, Clone, Default)]
pub struct TaskList {
    tasks: Vec<TaskProxy>,
    boundaries: Vec<f64>,
    dirty: bool,
}

impl TaskList {
    pub fn new() -> Self {
        TaskList { tasks: Vec::new(), boundaries: Vec::new(), dirty: false }
    }

    pub fn from_tasks(tasks: Vec<TaskProxy>) -> Self {
        TaskList { tasks, boundaries: Vec::new(), dirty: true }
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn tasks(&self) -> &[TaskProxy] {
        &self.tasks
    }

    /// Incrementally extends `boundaries` with the new task's candidate
    /// switch points against the existing (non-first) tasks, without
    /// rebuilding from scratch.
    pub fn add_tasks(&mut self, task: TaskProxy, n: usize, clock: &dyn Clock) {
        if !self.tasks.is_empty() {
            let first_boundary = *self.boundaries.first().unwrap_or(&f64::NEG_INFINITY);
            for other in self.tasks.iter().skip(1) {
                if other.a != task.a {
                    let l = (task.rabs - other.rabs).seconds() / (other.a - task.a);
                    if l > first_boundary {
                        self.boundaries.push(l);
                    }
                }
            }
            self.boundaries.sort_by(|a, b| a.partial_cmp(b).unwrap());
            self.boundaries.dedup_by(|a, b| a == b);
        } else {
            let first_task_end = clock.now() + Duration::from_secs(task.t);
            self.boundaries = vec![(first_task_end - task.rabs).seconds() / task.a];
        }
        for _ in 0..n {
            self.tasks.push(task);
        }
    }

    /// Updates the running (head) task's remaining duration in place,
    /// without disturbing its position at index 0. A no-op on an empty
    /// queue. The head's boundary is `(now + t - rabs) / a` (see
    /// `compute_boundaries`), so changing `t` invalidates the cache.
    pub fn set_running_remaining(&mut self, t: f64) {
        if let Some(first) = self.tasks.first_mut() {
            first.t = t;
            self.dirty = true;
        }
    }

    /// Idempotent: removing an id that is not present is a no-op.
    pub fn remove_task(&mut self, id: u32) {
        if let Some(pos) = self.tasks.iter().position(|p| p.id == id) {
            self.tasks.remove(pos);
            self.dirty = true;
        }
    }

    /// The max-slowness the current order would produce if started at `now`.
    pub fn slowness(&self, clock: &dyn Clock) -> f64 {
        let mut e = clock.now();
        let mut max_slowness = 0.0f64;
        for task in &self.tasks {
            e = e + Duration::from_secs(task.t);
            let slowness = (e - task.rabs).seconds() / task.a;
            if slowness > max_slowness {
                max_slowness = slowness;
            }
        }
        max_slowness
    }

    /// Sorts tasks `2..N` by `deadline(slowness)` ascending, leaving the
    /// first (running) task pinned.
    pub fn sort_by_slowness(&mut self, slowness: f64) {
        if self.tasks.len() > 1 {
            let first = self.tasks.remove(0);
            self.tasks.sort_by(|a, b| {
                a.deadline(slowness)
                    .partial_cmp(&b.deadline(slowness))
                    .unwrap()
            });
            self.tasks.insert(0, first);
        }
    }

    /// True if sorting by `slowness` and starting at `start`, every task
    /// meets `deadline(slowness)`.
    pub fn meet_deadlines(&self, slowness: f64, start: Time) -> bool {
        let mut e = start;
        for task in &self.tasks {
            e = e + Duration::from_secs(task.t);
            if (e - start).seconds() > task.deadline(slowness) {
                return false;
            }
        }
        true
    }

    fn compute_boundaries(&mut self, clock: &dyn Clock) {
        if !self.dirty {
            return;
        }
        self.dirty = false;
        self.boundaries.clear();
        if self.tasks.is_empty() {
            return;
        }
        let first = &self.tasks[0];
        let first_task_end = clock.now() + Duration::from_secs(first.t);
        self.boundaries
            .push((first_task_end - first.rabs).seconds() / first.a);
        let first_boundary = self.boundaries[0];
        for i in 1..self.tasks.len() {
            for j in i..self.tasks.len() {
                let (it, jt) = (&self.tasks[i], &self.tasks[j]);
                if it.a != jt.a {
                    let l = (jt.rabs - it.rabs).seconds() / (it.a - jt.a);
                    if l > first_boundary {
                        self.boundaries.push(l);
                    }
                }
            }
        }
        self.boundaries.sort_by(|a, b| a.partial_cmp(b).unwrap());
        self.boundaries.dedup_by(|a, b| a == b);
    }

    /// The slowness values at which the min-slowness-sort order changes.
    pub fn boundaries(&mut self, clock: &dyn Clock) -> &[f64] {
        self.compute_boundaries(clock);
        &self.boundaries
    }

    /// Sorts the queue to minimize the maximum slowness, by binary search
    /// over the boundary intervals.
    pub fn sort_min_slowness(&mut self, clock: &dyn Clock) {
        self.compute_boundaries(clock);
        let boundaries = self.boundaries.clone();
        self.sort_min_slowness_with(&boundaries, clock);
    }

    /// Same as `sort_min_slowness`, but against a caller-supplied boundary
    /// vector (used when probing an already-sorted alternative).
    pub fn sort_min_slowness_with(&mut self, alt_boundaries: &[f64], clock: &dyn Clock) {
        if self.tasks.is_empty() {
            return;
        }
        let now = clock.now();
        if alt_boundaries.len() == 1 {
            self.sort_by_slowness(alt_boundaries[0] + 1.0);
            return;
        }
        let mut min_li = 0usize;
        let mut max_li = alt_boundaries.len() - 1;
        while max_li > min_li + 1 {
            let med_li = (min_li + max_li) / 2;
            self.sort_by_slowness((alt_boundaries[med_li] + alt_boundaries[med_li + 1]) / 2.0);
            if self.meet_deadlines(alt_boundaries[med_li], now) {
                max_li = med_li;
            } else {
                min_li = med_li;
            }
        }
        self.sort_by_slowness((alt_boundaries[min_li] + alt_boundaries[min_li + 1]) / 2.0);
        if max_li == alt_boundaries.len() - 1 && !self.meet_deadlines(alt_boundaries[max_li], now) {
            self.sort_by_slowness(alt_boundaries[max_li] + 1.0);
        }
    }

    /// Recomputes each task's release delay relative to `now`.
    pub fn update_release_time(&mut self, clock: &dyn Clock) {
        let now = clock.now();
        for task in &mut self.tasks {
            task.r = (task.rabs - now).seconds();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::FixedClock;

    fn clock() -> FixedClock {
        FixedClock(Time::from_secs(0.0))
    }

    #[test]
    fn empty_list_has_no_boundaries() {
        let mut list = TaskList::new();
        assert!(list.boundaries(&clock()).is_empty());
    }

    #[test]
    fn single_running_task_min_slowness() {
        // P12 scenario 2: a=10000, r=-5 (already released), t=5 remaining.
        let mut list = TaskList::from_tasks(vec![TaskProxy::new(
            1,
            10000.0,
            5.0,
            -5.0,
            Time::from_secs(-5.0),
        )]);
        let clock = clock();
        list.sort_min_slowness(&clock);
        assert!((list.slowness(&clock) - 5.0 / 10000.0).abs() < 1e-9);
    }

    #[test]
    fn two_task_reorder_minimizes_max_slowness() {
        // P12 scenario 3.
        let mut list = TaskList::from_tasks(vec![
            TaskProxy::new(1, 10000.0, 5.0, -5.0, Time::from_secs(-5.0)),
            TaskProxy::new(2, 5000.0, 5.0, 0.0, Time::from_secs(0.0)),
        ]);
        let clock = clock();
        list.sort_min_slowness(&clock);
        let expected = (5.0 + 5.0) / 5000.0;
        assert!((list.slowness(&clock) - expected).abs() < 1e-9);
    }

    #[test]
    fn remove_task_is_idempotent_no_op_for_unknown_id() {
        let mut list = TaskList::from_tasks(vec![TaskProxy::new(
            1,
            10000.0,
            5.0,
            -5.0,
            Time::from_secs(-5.0),
        )]);
        list.remove_task(999);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn remove_task_deletes_matching_id() {
        let mut list = TaskList::from_tasks(vec![
            TaskProxy::new(1, 10000.0, 5.0, -5.0, Time::from_secs(-5.0)),
            TaskProxy::new(2, 5000.0, 5.0, 0.0, Time::from_secs(0.0)),
        ]);
        list.remove_task(1);
        assert_eq!(list.len(), 1);
        assert_eq!(list.tasks()[0].id, 2);
    }
}
