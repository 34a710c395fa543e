//! Tunables that the original source keeps as process-wide statics
//! (`ZAFunction::numPieces`, `BasicAvailabilityInfo::numClusters`, ...).
//! Grouped into explicit configuration structs passed at construction,
//! per the "migrate global tunables" redesign note.

/// Tunables for the `Z`/`D` function algebra.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunctionConfig {
    /// Target piece count for `reduceMax`/`reduceMin`.
    pub num_pieces: usize,
    /// Beam width kept while searching for the lowest-loss merge.
    pub reduction_quality: usize,
    /// Tolerance below which a negative `sqdiff`/clamp is treated as
    /// floating-point noise rather than a real domain violation.
    pub sqdiff_epsilon: f64,
}

impl Default for FunctionConfig {
    fn default() -> Self {
        FunctionConfig {
            num_pieces: 10,
            reduction_quality: 10,
            sqdiff_epsilon: 0.001,
        }
    }
}

/// Tunables for the clustering aggregator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusteringConfig {
    /// Maximum number of clusters a summary retains after `clusterize`.
    pub num_clusters: usize,
    /// Per-axis grid-cell penalty added to `distance` when two clusters
    /// fall in different coarse cells.
    pub far_penalty: f64,
}

impl ClusteringConfig {
    /// `⌊num_clusters^(1/axes)⌋`, the coarse grid cell count per axis.
    pub fn grid_cells(&self, axes: u32) -> usize {
        (self.num_clusters as f64).powf(1.0 / axes as f64).floor().max(1.0) as usize
    }
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        ClusteringConfig {
            num_clusters: 25,
            far_penalty: 100.0,
        }
    }
}

/// Tunables for the local FSP scheduler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerConfig {
    /// Seconds between self-reschedule timer firings.
    pub reschedule_timeout_secs: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig { reschedule_timeout_secs: 600.0 }
    }
}

/// Tunables for the IBP dispatcher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispatchConfig {
    pub alpha_mem: f64,
    pub alpha_disk: f64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        DispatchConfig { alpha_mem: 10.0, alpha_disk: 1.0 }
    }
}

/// The full set of tunables for a node, threaded through the operations
/// that need them instead of living as process-wide statics.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CoreConfig {
    pub functions: FunctionConfig,
    pub clustering: ClusteringConfig,
    pub scheduler: SchedulerConfig,
    pub dispatch: DispatchConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_cells_matches_floor_sqrt_for_two_axes() {
        let cfg = ClusteringConfig { num_clusters: 25, ..Default::default() };
        assert_eq!(cfg.grid_cells(2), 5);
    }

    #[test]
    fn grid_cells_never_zero() {
        let cfg = ClusteringConfig { num_clusters: 1, ..Default::default() };
        assert_eq!(cfg.grid_cells(2), 1);
    }
}
