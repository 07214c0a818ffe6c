//! Results of a grid clustering run and their report form.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use crate::types::{GridCell, Label, LabelledPoint};

/// Per-point membership entries: one `(cell, label)` pair for every
/// partition the point was copied into. A point deep inside a cell has one
/// entry; a point near a seam or corner has up to four.
pub type PointMemberships = SmallVec<[(GridCell, Label); 4]>;

/// The clustered copy of one partition.
#[derive(Debug, Clone)]
pub struct PartitionResult {
    pub cell: GridCell,
    pub cluster_count: usize,
    pub points: Vec<LabelledPoint>,
}

impl PartitionResult {
    pub fn summary(&self) -> PartitionSummary {
        PartitionSummary {
            cell: self.cell,
            cluster_count: self.cluster_count,
            point_count: self.points.len(),
        }
    }
}

/// Per-partition report line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionSummary {
    pub cell: GridCell,
    pub cluster_count: usize,
    pub point_count: usize,
}

impl fmt::Display for PartitionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Partition {} : [{:4},{:6}]",
            self.cell, self.cluster_count, self.point_count
        )
    }
}

/// Everything a clustering run produced, ordered by grid cell.
///
/// This is also the interface a cross-partition merge step would consume:
/// per-partition labels plus duplicated boundary points sharing a point
/// identifier. The merge step itself is deliberately not implemented here.
#[derive(Debug, Clone, Default)]
pub struct ClusterOutcome {
    partitions: Vec<PartitionResult>,
}

impl ClusterOutcome {
    /// `partitions` must already be sorted by cell; `cluster_grid` takes
    /// care of that.
    pub(crate) fn new(partitions: Vec<PartitionResult>) -> Self {
        Self { partitions }
    }

    pub fn partitions(&self) -> &[PartitionResult] {
        &self.partitions
    }

    /// Total clusters found across all partitions, before any merge.
    pub fn total_clusters(&self) -> usize {
        self.partitions.iter().map(|p| p.cluster_count).sum()
    }

    /// Total partition memberships; seam points are counted once per
    /// partition that holds a copy.
    pub fn total_memberships(&self) -> usize {
        self.partitions.iter().map(|p| p.points.len()).sum()
    }

    /// One report line per partition, in cell order.
    pub fn summaries(&self) -> Vec<PartitionSummary> {
        self.partitions.iter().map(|p| p.summary()).collect()
    }

    /// Group every per-partition label by stable point id.
    ///
    /// Entries for a given point are in cell order. Duplicated boundary
    /// points surface here with one entry per owning partition, which is
    /// exactly the pairing a merge step would reconcile.
    pub fn label_index(&self) -> FxHashMap<usize, PointMemberships> {
        let mut index: FxHashMap<usize, PointMemberships> = FxHashMap::default();
        for partition in &self.partitions {
            for point in &partition.points {
                index
                    .entry(point.id)
                    .or_default()
                    .push((partition.cell, point.label));
            }
        }
        index
    }
}
