//! The IBP-variant dispatcher: consumes child summaries and partitions a
//! task-bag request across the overlay tree's branches.

use crate::clustering::{MDZCluster, Requirements};
use crate::config::DispatchConfig;
use crate::summary::AvailabilityInfo;

/// A candidate allocation target: one cluster from one child branch.
#[derive(Debug, Clone)]
struct DecisionInfo {
    branch: String,
    cluster: MDZCluster,
    availability: f64,
    distance: f64,
}

/// A task-bag request arriving at a node, to be routed to children or
/// forwarded to the parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskBag {
    pub requester: u32,
    pub request_id: u32,
    pub first_task: u32,
    pub last_task: u32,
    pub requirements: Requirements,
}

impl TaskBag {
    pub fn count(&self) -> u32 {
        self.last_task - self.first_task + 1
    }

    fn slice(&self, first: u32, last: u32) -> TaskBag {
        TaskBag { first_task: first, last_task: last, ..*self }
    }
}

/// One child branch's outgoing allocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Allocation {
    pub first_task: u32,
    pub last_task: u32,
}

/// The outcome of dispatching one request: per-branch allocations plus
/// whatever could not be placed locally and must go to the parent.
#[derive(Debug, Clone, Default)]
pub struct DispatchResult {
    pub allocations: Vec<(String, Allocation)>,
    pub forwarded_upward: u32,
}

/// A child branch's known summary, or `None` if no summary has arrived yet
/// (the `MissingChildSummary` case — the branch is simply skipped).
pub struct ChildBranch<'a> {
    pub id: String,
    pub summary: Option<&'a AvailabilityInfo>,
    /// Network distance from the requester to this branch's covered range.
    pub distance: f64,
}

/// Partitions `bag` across `children`, excluding the branch the request
/// arrived from (to avoid bounce-back), and reports the residual that
/// must be forwarded to the parent.
///
/// Invariant: `sum(allocations) + forwarded_upward == bag.count()`.
pub fn dispatch(
    bag: &TaskBag,
    children: &[ChildBranch],
    source_branch: Option<&str>,
    cfg: &DispatchConfig,
) -> DispatchResult {
    let mut candidates = Vec::new();
    for child in children {
        if source_branch == Some(child.id.as_str()) {
            continue;
        }
        let Some(summary) = child.summary else {
            tracing::warn!(branch = %child.id, "missing child summary, skipping branch");
            continue;
        };
        for cluster in summary.clusters_fulfilling(&bag.requirements) {
            let availability = (cluster.min_m - bag.requirements.max_memory) as f64 * cfg.alpha_mem
                + (cluster.min_d - bag.requirements.max_disk) as f64 * cfg.alpha_disk;
            candidates.push(DecisionInfo {
                branch: child.id.clone(),
                cluster: cluster.clone(),
                availability,
                distance: child.distance,
            });
        }
    }

    candidates.sort_by(|a, b| {
        a.availability
            .partial_cmp(&b.availability)
            .unwrap()
            .then(a.distance.partial_cmp(&b.distance).unwrap())
    });

    let mut remaining = bag.count();
    let mut next_first = bag.first_task;
    let mut allocations: Vec<(String, Allocation)> = Vec::new();
    for decision in candidates.iter_mut() {
        if remaining == 0 {
            break;
        }
        let take = remaining.min(decision.cluster.value);
        if take == 0 {
            continue;
        }
        let allocation = Allocation { first_task: next_first, last_task: next_first + take - 1 };
        allocations.push((decision.branch.clone(), allocation));
        decision.cluster.value -= take;
        next_first += take;
        remaining -= take;
    }

    if remaining > 0 {
        tracing::warn!(remaining, "could not place all tasks locally, forwarding upward");
    }

    DispatchResult { allocations, forwarded_upward: remaining }
}

/// Builds the outgoing `TaskBag` for a given allocation, adjusting its
/// task range.
pub fn sub_bag(bag: &TaskBag, allocation: &Allocation) -> TaskBag {
    bag.slice(allocation.first_task, allocation.last_task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::za::{SubFunction, MIN_A};
    use crate::za::Z;

    fn summary_with(value: u32, mem: i32, disk: i32) -> AvailabilityInfo {
        let mut s = AvailabilityInfo::default();
        let z = Z::from_pieces(vec![SubFunction::new(MIN_A, 0.0, 0.0, 0.0, 0.0)]);
        s.add_node(mem, disk, z);
        // Pad value by merging identical single-node clusters together.
        for _ in 1..value {
            s.add_node(mem, disk, Z::from_pieces(vec![SubFunction::new(MIN_A, 0.0, 0.0, 0.0, 0.0)]));
        }
        s
    }

    #[test]
    fn p10_dispatch_conserves_tasks() {
        // End-to-end scenario 6: free left child absorbs everything.
        let left = summary_with(500, 4096, 16384);
        let right = summary_with(300, 0, 0);
        let bag = TaskBag {
            requester: 1,
            request_id: 1,
            first_task: 0,
            last_task: 399,
            requirements: Requirements { max_memory: 256, max_disk: 1024 },
        };
        let children = vec![
            ChildBranch { id: "left".into(), summary: Some(&left), distance: 1.0 },
            ChildBranch { id: "right".into(), summary: Some(&right), distance: 1.0 },
        ];
        let result = dispatch(&bag, &children, None, &DispatchConfig::default());
        let total: u32 = result.allocations.iter().map(|(_, a)| a.last_task - a.first_task + 1).sum();
        assert_eq!(total + result.forwarded_upward, bag.count());
        assert_eq!(result.forwarded_upward, 0);
        assert!(result.allocations.iter().all(|(branch, _)| branch == "left"));
    }

    #[test]
    fn missing_summary_branch_is_skipped_not_errored() {
        let bag = TaskBag {
            requester: 1,
            request_id: 1,
            first_task: 0,
            last_task: 9,
            requirements: Requirements { max_memory: 256, max_disk: 1024 },
        };
        let children = vec![ChildBranch { id: "left".into(), summary: None, distance: 1.0 }];
        let result = dispatch(&bag, &children, None, &DispatchConfig::default());
        assert_eq!(result.forwarded_upward, bag.count());
    }

    #[test]
    fn source_branch_is_excluded_to_avoid_bounce_back() {
        let left = summary_with(100, 4096, 16384);
        let bag = TaskBag {
            requester: 1,
            request_id: 1,
            first_task: 0,
            last_task: 9,
            requirements: Requirements { max_memory: 256, max_disk: 1024 },
        };
        let children = vec![ChildBranch { id: "left".into(), summary: Some(&left), distance: 1.0 }];
        let result = dispatch(&bag, &children, Some("left"), &DispatchConfig::default());
        assert_eq!(result.forwarded_upward, bag.count());
    }
}
