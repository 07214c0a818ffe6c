//! Core types: labelled points, cluster identifiers, and run parameters.

use geo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{GridscanError, Result};

/// Grid coordinates of a partition inside the N×N decomposition.
///
/// Ordered row-major so partition results can be reported in a stable
/// order regardless of which worker finished first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    pub row: usize,
    pub col: usize,
}

impl GridCell {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Structured cluster identifier: the owning partition's grid coordinates
/// plus a 1-based sequence number local to that partition.
///
/// Identifiers assigned in different partitions can never collide, without
/// any arithmetic offset scheme, and remain comparable across a full run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClusterId {
    pub cell: GridCell,
    pub seq: u32,
}

impl ClusterId {
    pub fn new(cell: GridCell, seq: u32) -> Self {
        Self { cell, seq }
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.cell, self.seq)
    }
}

/// Classification state of a point during and after clustering.
///
/// `Noise` is provisional while a partition is being clustered: a point
/// first seen in a sparse neighborhood may later be reclassified when it
/// turns out to be reachable from a core point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    /// Not yet visited by the clusterer.
    #[default]
    Unprocessed,
    /// Not density-reachable from any core point.
    Noise,
    /// Member of the identified cluster.
    Cluster(ClusterId),
}

impl Label {
    pub fn is_unprocessed(&self) -> bool {
        matches!(self, Label::Unprocessed)
    }

    pub fn is_noise(&self) -> bool {
        matches!(self, Label::Noise)
    }

    /// The cluster this point belongs to, if it was assigned one.
    pub fn cluster_id(&self) -> Option<ClusterId> {
        match self {
            Label::Cluster(id) => Some(*id),
            _ => None,
        }
    }
}

/// A geographic point with a stable identifier and a mutable cluster label.
///
/// The identifier is assigned once at ingestion and survives duplication
/// into overlapping partitions; it is the key a downstream merge step would
/// use to reconcile the copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelledPoint {
    pub id: usize,
    pub coord: Point,
    pub label: Label,
}

impl LabelledPoint {
    /// Create an unprocessed point. Coordinates are planar (x = longitude,
    /// y = latitude).
    pub fn new(id: usize, coord: Point) -> Self {
        Self {
            id,
            coord,
            label: Label::Unprocessed,
        }
    }
}

/// Parameters for a clustering run.
///
/// Serializable so a run can be configured from JSON:
///
/// ```rust
/// use gridscan::ClusterParams;
///
/// let json = r#"{
///     "eps": 0.0003,
///     "min_pts": 5,
///     "grid_resolution": 4,
///     "workers": 4
/// }"#;
/// let params: ClusterParams = serde_json::from_str(json).unwrap();
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterParams {
    /// Neighborhood radius, in the same planar units as the coordinates.
    #[serde(default = "ClusterParams::default_eps")]
    pub eps: f64,

    /// Minimum neighborhood size (the point itself included) for a point
    /// to count as a core point.
    #[serde(default = "ClusterParams::default_min_pts")]
    pub min_pts: usize,

    /// Grid resolution N; the bounding rectangle is split into N×N cells.
    #[serde(default = "ClusterParams::default_grid_resolution")]
    pub grid_resolution: usize,

    /// Number of worker threads clustering partitions concurrently.
    #[serde(default = "ClusterParams::default_workers")]
    pub workers: usize,
}

impl ClusterParams {
    const fn default_eps() -> f64 {
        0.0003
    }

    const fn default_min_pts() -> usize {
        5
    }

    const fn default_grid_resolution() -> usize {
        4
    }

    const fn default_workers() -> usize {
        4
    }

    pub fn with_eps(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }

    pub fn with_min_pts(mut self, min_pts: usize) -> Self {
        self.min_pts = min_pts;
        self
    }

    pub fn with_grid_resolution(mut self, resolution: usize) -> Self {
        self.grid_resolution = resolution;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Validate parameter values.
    ///
    /// Degenerate parameters would not crash the kernel but would silently
    /// produce meaningless output, so they are rejected at the boundary.
    pub fn validate(&self) -> Result<()> {
        if !self.eps.is_finite() || self.eps < 0.0 {
            return Err(GridscanError::InvalidParameter(format!(
                "eps must be finite and >= 0, got: {}",
                self.eps
            )));
        }

        if self.min_pts == 0 {
            return Err(GridscanError::InvalidParameter(
                "min_pts must be greater than zero".to_string(),
            ));
        }

        if self.grid_resolution == 0 {
            return Err(GridscanError::InvalidParameter(
                "grid_resolution must be greater than zero".to_string(),
            ));
        }

        if self.workers == 0 {
            return Err(GridscanError::InvalidParameter(
                "workers must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            eps: Self::default_eps(),
            min_pts: Self::default_min_pts(),
            grid_resolution: Self::default_grid_resolution(),
            workers: Self::default_workers(),
        }
    }
}
