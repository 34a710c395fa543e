//! `AvailabilityInfo`: the message exchanged between overlay nodes,
//! wrapping a bounded `ClusteringList<MDZCluster>` plus the axis ranges
//! clusters are measured against.

use crate::clustering::{ClusterContext, ClusteringList, MDZCluster, Requirements};
use crate::config::ClusteringConfig;
use crate::za::Z;

/// Holds a `ClusteringList<MDZCluster>`, interval bounds on memory, disk,
/// and slowness, plus the globally observed `Z` envelope.
///
/// Invariant: `summary.len() <= numClusters` after `reduce()`.
#[derive(Debug, Clone)]
pub struct AvailabilityInfo {
    summary: ClusteringList,
    min_m: i32,
    max_m: i32,
    min_d: i32,
    max_d: i32,
    min_slowness: f64,
    max_slowness: f64,
}

impl Default for AvailabilityInfo {
    fn default() -> Self {
        AvailabilityInfo {
            summary: ClusteringList::new(),
            min_m: 0,
            max_m: 0,
            min_d: 0,
            max_d: 0,
            min_slowness: 0.0,
            max_slowness: 0.0,
        }
    }
}

impl AvailabilityInfo {
    pub fn is_empty(&self) -> bool {
        self.summary.is_empty()
    }

    pub fn clusters(&self) -> &[MDZCluster] {
        self.summary.clusters()
    }

    pub fn context(&self) -> ClusterContext {
        ClusterContext {
            min_m: self.min_m,
            max_m: self.max_m,
            min_d: self.min_d,
            max_d: self.max_d,
            min_slowness: self.min_slowness,
            max_slowness: self.max_slowness,
        }
    }

    /// Adds a single leaf node's availability to the summary.
    pub fn add_node(&mut self, mem: i32, disk: i32, z: Z) {
        let slowness = z.get_slowness(z.horizon().max(crate::za::MIN_A));
        if self.summary.is_empty() {
            self.min_m = mem;
            self.max_m = mem;
            self.min_d = disk;
            self.max_d = disk;
            self.min_slowness = slowness;
            self.max_slowness = slowness;
        } else {
            self.min_m = self.min_m.min(mem);
            self.max_m = self.max_m.max(mem);
            self.min_d = self.min_d.min(disk);
            self.max_d = self.max_d.max(disk);
            self.min_slowness = self.min_slowness.min(slowness);
            self.max_slowness = self.max_slowness.max(slowness);
        }
        self.summary.push(MDZCluster::single(mem, disk, z));
    }

    /// Merges another summary's clusters into this one, then reduces back
    /// down to `cfg.num_clusters`.
    pub fn join(&mut self, other: &AvailabilityInfo, cfg: &ClusteringConfig) {
        if other.summary.is_empty() {
            return;
        }
        if self.summary.is_empty() {
            self.min_m = other.min_m;
            self.max_m = other.max_m;
            self.min_d = other.min_d;
            self.max_d = other.max_d;
            self.min_slowness = other.min_slowness;
            self.max_slowness = other.max_slowness;
        } else {
            self.min_m = self.min_m.min(other.min_m);
            self.max_m = self.max_m.max(other.max_m);
            self.min_d = self.min_d.min(other.min_d);
            self.max_d = self.max_d.max(other.max_d);
            self.min_slowness = self.min_slowness.min(other.min_slowness);
            self.max_slowness = self.max_slowness.max(other.max_slowness);
        }
        let ctx = self.context();
        self.summary.add(&other.summary, &ctx, cfg);
    }

    pub fn reduce(&mut self, cfg: &ClusteringConfig) {
        let ctx = self.context();
        self.summary.clusterize(&ctx, cfg);
    }

    pub fn clusters_fulfilling(&self, req: &Requirements) -> Vec<&MDZCluster> {
        self.summary.fulfilling(req).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::za::{SubFunction, MIN_A};

    fn z() -> Z {
        Z::from_pieces(vec![SubFunction::new(MIN_A, 0.0, 0.0, 0.001, 0.0)])
    }

    #[test]
    fn join_tracks_global_minimum() {
        let mut a = AvailabilityInfo::default();
        a.add_node(512, 4096, z());
        let mut b = AvailabilityInfo::default();
        b.add_node(256, 2048, z());
        a.join(&b, &ClusteringConfig::default());
        assert_eq!(a.context().min_m, 256);
        assert_eq!(a.context().min_d, 2048);
    }

    #[test]
    fn reduce_bounds_cluster_count() {
        let mut a = AvailabilityInfo::default();
        for i in 0..50i32 {
            a.add_node(512 + i, 2048 + i, z());
        }
        let cfg = ClusteringConfig { num_clusters: 10, ..Default::default() };
        a.reduce(&cfg);
        assert!(a.clusters().len() <= 10);
    }
}
