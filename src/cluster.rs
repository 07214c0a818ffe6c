//! Partition-local DBSCAN and its neighborhood-query primitive.
//!
//! Distances are planar Euclidean over (longitude, latitude); the
//! algorithm deliberately does not use geodesic distance.

use geo::{Distance, Euclidean, Point};
use std::collections::VecDeque;

use crate::types::{ClusterId, GridCell, Label, LabelledPoint};

/// Indices of every point within `eps` of `center`.
///
/// The comparison is inclusive, so a point is always a member of its own
/// neighborhood (distance 0). Linear scan over the partition; cluster
/// expansion calls this repeatedly, making the clusterer up to quadratic
/// in partition size.
pub fn neighbourhood(points: &[LabelledPoint], center: Point, eps: f64) -> Vec<usize> {
    points
        .iter()
        .enumerate()
        .filter(|(_, p)| Euclidean.distance(center, p.coord) <= eps)
        .map(|(idx, _)| idx)
        .collect()
}

/// Cluster one partition's points in place with DBSCAN and return the
/// number of clusters found.
///
/// Cluster identifiers are `ClusterId { cell, seq }` with `seq` counting
/// from 1 in this partition, so labels assigned by concurrent partitions
/// never collide. A point first labelled noise is reclassified when it
/// turns out to be density-reachable from a core point, but is never
/// expanded itself (border point).
///
/// Postcondition: no point keeps `Label::Unprocessed`.
pub fn cluster_partition(
    points: &mut [LabelledPoint],
    cell: GridCell,
    min_pts: usize,
    eps: f64,
) -> usize {
    let mut clusters: u32 = 0;

    for idx in 0..points.len() {
        if !points[idx].label.is_unprocessed() {
            continue;
        }

        let seeds = neighbourhood(points, points[idx].coord, eps);
        if seeds.len() < min_pts {
            // Provisional: may be overwritten during expansion below.
            points[idx].label = Label::Noise;
            continue;
        }

        clusters += 1;
        let id = ClusterId::new(cell, clusters);
        points[idx].label = Label::Cluster(id);

        let mut queue: VecDeque<usize> = seeds.into();
        while let Some(reached) = queue.pop_front() {
            match points[reached].label {
                Label::Noise => {
                    // Border point: joins the cluster but is not expanded.
                    points[reached].label = Label::Cluster(id);
                }
                Label::Cluster(_) => {}
                Label::Unprocessed => {
                    points[reached].label = Label::Cluster(id);
                    let reachable = neighbourhood(points, points[reached].coord, eps);
                    if reachable.len() >= min_pts {
                        queue.extend(reachable);
                    }
                }
            }
        }
    }

    clusters as usize
}
