//! The Fair Slowness Policy local scheduler: consumes a `TaskList` and the
//! node's backend metrics, and emits an availability summary while
//! admitting new tasks into the queue.

use crate::config::{CoreConfig, SchedulerConfig};
use crate::proxy::TaskProxy;
use crate::summary::AvailabilityInfo;
use crate::tasklist::TaskList;
use crate::time::{Clock, Time};
use crate::za::Z;

/// The node-local resource metrics FSP reads from the execution backend.
/// Out of core scope to obtain these values (network, sensors, OS); the
/// scheduler only consumes them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackendMetrics {
    pub available_memory: i32,
    pub available_disk: i32,
    pub average_power: f64,
    /// Remaining execution time of the currently-running task, if any.
    pub running_task_remaining: Option<f64>,
}

/// A bag-of-tasks admission request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskBagRequest {
    pub first_task: u32,
    pub last_task: u32,
}

impl TaskBagRequest {
    pub fn count(&self) -> u32 {
        self.last_task - self.first_task + 1
    }
}

/// Emitted by `reschedule` when the running task transitions from
/// `Prepared` to running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartedTask {
    pub id: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Prepared,
    Running,
    Paused,
}

pub struct FspScheduler {
    queue: TaskList,
    states: Vec<(u32, TaskState)>,
}

impl FspScheduler {
    pub fn new() -> Self {
        FspScheduler { queue: TaskList::new(), states: Vec::new() }
    }

    pub fn queue(&self) -> &TaskList {
        &self.queue
    }

    pub fn admit(&mut self, task: TaskProxy, clock: &dyn Clock) {
        self.queue.add_tasks(task, 1, clock);
        self.states.push((task.id, TaskState::Prepared));
    }

    /// Always accepts the entire bag: `last - first + 1`.
    pub fn acceptable(&self, bag: &TaskBagRequest) -> u32 {
        bag.count()
    }

    /// Reorders the queue to minimize the maximum slowness, starts the
    /// head task if it was only `Prepared`, and reports the next
    /// self-reschedule deadline.
    pub fn reschedule(
        &mut self,
        metrics: &BackendMetrics,
        clock: &dyn Clock,
        cfg: &SchedulerConfig,
    ) -> (Option<StartedTask>, Time) {
        if let Some(remaining) = metrics.running_task_remaining {
            self.queue.set_running_remaining(remaining);
        }
        self.queue.sort_min_slowness(clock);

        let mut started = None;
        if let Some(first) = self.queue.tasks().first() {
            for (id, state) in self.states.iter_mut() {
                if *id == first.id && *state == TaskState::Prepared {
                    *state = TaskState::Running;
                    started = Some(StartedTask { id: *id });
                } else if *id != first.id && *state == TaskState::Running {
                    *state = TaskState::Paused;
                }
            }
        }

        let next = clock.now() + crate::time::Duration::from_secs(cfg.reschedule_timeout_secs);
        (started, next)
    }

    /// Builds the single-cluster availability summary this node would
    /// report for its current queue and backend state.
    pub fn availability(&self, metrics: &BackendMetrics, cfg: &CoreConfig, clock: &dyn Clock) -> AvailabilityInfo {
        let z = Z::from_task_list(&self.queue, metrics.average_power, clock);
        let mut summary = AvailabilityInfo::default();
        summary.add_node(metrics.available_memory, metrics.available_disk, z);
        summary.reduce(&cfg.clustering);
        summary
    }
}

impl Default for FspScheduler {
    fn default() -> Self {
        Self::new()
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
    fn acceptable_always_accepts_full_bag() {
        let sched = FspScheduler::new();
        let bag = TaskBagRequest { first_task: 10, last_task: 19 };
        assert_eq!(sched.acceptable(&bag), 10);
    }

    #[test]
    fn reschedule_starts_the_head_task_once() {
        let clock = clock();
        let mut sched = FspScheduler::new();
        sched.admit(TaskProxy::new(1, 10000.0, 10.0, 0.0, Time::from_secs(0.0)), &clock);
        let metrics = BackendMetrics {
            available_memory: 4096,
            available_disk: 16384,
            average_power: 1000.0,
            running_task_remaining: None,
        };
        let cfg = SchedulerConfig::default();
        let (started, _) = sched.reschedule(&metrics, &clock, &cfg);
        assert_eq!(started, Some(StartedTask { id: 1 }));
        let (started_again, _) = sched.reschedule(&metrics, &clock, &cfg);
        assert_eq!(started_again, None);
    }

    #[test]
    fn reschedule_updates_running_remaining_without_losing_pin() {
        let clock = clock();
        let mut sched = FspScheduler::new();
        sched.admit(TaskProxy::new(1, 10000.0, 10.0, 0.0, Time::from_secs(0.0)), &clock);
        sched.admit(TaskProxy::new(2, 5000.0, 10.0, 0.0, Time::from_secs(0.0)), &clock);
        let cfg = SchedulerConfig::default();
        sched.reschedule(
            &BackendMetrics {
                available_memory: 4096,
                available_disk: 16384,
                average_power: 1000.0,
                running_task_remaining: None,
            },
            &clock,
            &cfg,
        );
        let metrics = BackendMetrics {
            available_memory: 4096,
            available_disk: 16384,
            average_power: 1000.0,
            running_task_remaining: Some(3.0),
        };
        sched.reschedule(&metrics, &clock, &cfg);
        assert_eq!(sched.queue().tasks()[0].id, 1);
        assert_eq!(sched.queue().tasks()[0].t, 3.0);
    }

    #[test]
    fn availability_reflects_empty_queue() {
        let clock = clock();
        let sched = FspScheduler::new();
        let metrics = BackendMetrics {
            available_memory: 4096,
            available_disk: 16384,
            average_power: 1000.0,
            running_task_remaining: None,
        };
        let cfg = CoreConfig::default();
        let summary = sched.availability(&metrics, &cfg, &clock);
        assert_eq!(summary.clusters().len(), 1);
        assert_eq!(summary.clusters()[0].value, 1);
    }
}
