//! Parallel grid-partitioned DBSCAN for geo-tagged point sets.
//!
//! The bounding rectangle of the input is split into an N×N grid of cells,
//! each expanded by the neighborhood radius `eps` so that density counts
//! stay correct at cell seams; every cell is then clustered independently
//! by a fixed pool of worker threads. Coordinates are treated as planar,
//! with Euclidean distance over (longitude, latitude).
//!
//! ```rust
//! use geo::Point;
//! use gridscan::{ClusterParams, cluster_grid, ingest};
//!
//! let coords = vec![
//!     Point::new(-73.9800, 40.7500),
//!     Point::new(-73.9801, 40.7501),
//!     Point::new(-73.9799, 40.7502),
//!     Point::new(-73.9300, 40.8000),
//! ];
//! let points = ingest::labelled_points(&coords);
//! let bounds = ingest::bounding_rect(&points).unwrap();
//!
//! let params = ClusterParams::default()
//!     .with_eps(0.001)
//!     .with_min_pts(3)
//!     .with_grid_resolution(2);
//! let outcome = cluster_grid(&points, &bounds, &params)?;
//!
//! assert_eq!(outcome.total_clusters(), 1);
//! for summary in outcome.summaries() {
//!     println!("{summary}");
//! }
//! # Ok::<(), gridscan::GridscanError>(())
//! ```
//!
//! Clusters found in different partitions are never merged; the
//! [`ClusterOutcome::label_index`] view exposes the duplicated boundary
//! points a downstream merge step would reconcile.

pub mod cluster;
pub mod error;
pub mod ingest;
pub mod outcome;
pub mod partition;
pub mod pool;
pub mod types;

pub use error::{GridscanError, Result};

pub use cluster::{cluster_partition, neighbourhood};
pub use outcome::{ClusterOutcome, PartitionResult, PartitionSummary, PointMemberships};
pub use partition::{Partition, cell_bounds, partition_points};
pub use pool::{Job, JobQueue, WorkerPool, cluster_grid};
pub use types::{ClusterId, ClusterParams, GridCell, Label, LabelledPoint};

pub use geo::{Point, Rect};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{ClusterParams, GridscanError, Result, cluster_grid};

    pub use crate::{ClusterId, GridCell, Label, LabelledPoint};

    pub use crate::{ClusterOutcome, PartitionSummary};

    pub use crate::ingest::{bounding_rect, labelled_points, read_pickups_csv};

    pub use geo::{Point, Rect};
}
