//! Overlap-aware partitioning of a point set into an N×N grid of cells.
//!
//! Every cell is expanded by `eps` on all sides before membership is
//! tested, so a point close to a seam lands in both adjacent partitions.
//! The duplication is deliberate: it keeps density estimates correct right
//! up to the nominal cell boundary. Each partition receives its own copy
//! of the points it contains, so concurrent clusterers never touch shared
//! label state; duplicates are reconciled downstream via the point id.

use geo::{Coord, Rect, coord};
use log::debug;
use rstar::primitives::GeomWithData;
use rstar::{AABB, RTree};

use crate::error::{GridscanError, Result};
use crate::types::{GridCell, LabelledPoint};

type IndexedCoord = GeomWithData<[f64; 2], usize>;

/// One grid cell: its expanded rectangle plus owned copies of every point
/// whose coordinates fall inside it.
#[derive(Debug, Clone)]
pub struct Partition {
    pub cell: GridCell,
    pub bounds: Rect,
    pub points: Vec<LabelledPoint>,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Expanded bounds of cell `(row, col)` inside `bounds` at the given grid
/// resolution.
///
/// Rows index latitude (y), columns longitude (x). The returned rectangle
/// spans `[min + i·inc − eps, min + (i+1)·inc + eps)` on each axis;
/// membership against it is half-open (see [`partition_points`]).
pub fn cell_bounds(bounds: &Rect, resolution: usize, cell: GridCell, eps: f64) -> Rect {
    let inc_x = bounds.width() / resolution as f64;
    let inc_y = bounds.height() / resolution as f64;

    Rect::new(
        coord! {
            x: bounds.min().x + cell.col as f64 * inc_x - eps,
            y: bounds.min().y + cell.row as f64 * inc_y - eps,
        },
        coord! {
            x: bounds.min().x + (cell.col + 1) as f64 * inc_x + eps,
            y: bounds.min().y + (cell.row + 1) as f64 * inc_y + eps,
        },
    )
}

/// Half-open membership test: min sides inclusive, max sides exclusive.
///
/// A point sitting exactly at `cell_max + eps` belongs to the next cell
/// over, never to both.
fn contains_half_open(rect: &Rect, c: Coord) -> bool {
    c.x >= rect.min().x && c.x < rect.max().x && c.y >= rect.min().y && c.y < rect.max().y
}

/// Split `points` into `resolution`² partitions over `bounds`, each cell
/// expanded by `eps`.
///
/// Returns every partition, empty ones included, in row-major cell order.
/// A point is copied into every partition whose expanded rectangle
/// contains it under the half-open test; a point exactly on the outer
/// max edge of `bounds` is excluded from all partitions when `eps` is 0.
///
/// Candidate lookup goes through a bulk-loaded R-tree instead of testing
/// every point against every cell; the half-open filter afterwards keeps
/// membership semantics identical to the naive scan.
pub fn partition_points(
    points: &[LabelledPoint],
    bounds: &Rect,
    resolution: usize,
    eps: f64,
) -> Result<Vec<Partition>> {
    if resolution == 0 {
        return Err(GridscanError::InvalidParameter(
            "grid resolution must be greater than zero".to_string(),
        ));
    }
    if !eps.is_finite() || eps < 0.0 {
        return Err(GridscanError::InvalidParameter(format!(
            "eps must be finite and >= 0, got: {}",
            eps
        )));
    }

    let tree = RTree::bulk_load(
        points
            .iter()
            .enumerate()
            .map(|(idx, p)| IndexedCoord::new([p.coord.x(), p.coord.y()], idx))
            .collect(),
    );

    let mut partitions = Vec::with_capacity(resolution * resolution);
    for row in 0..resolution {
        for col in 0..resolution {
            let cell = GridCell::new(row, col);
            let cell_rect = cell_bounds(bounds, resolution, cell, eps);
            let envelope = AABB::from_corners(
                [cell_rect.min().x, cell_rect.min().y],
                [cell_rect.max().x, cell_rect.max().y],
            );

            // The envelope query is inclusive on every side; the exact
            // half-open test decides actual membership.
            let mut member_indices: Vec<usize> = tree
                .locate_in_envelope(&envelope)
                .filter(|entry| {
                    let [x, y] = *entry.geom();
                    contains_half_open(&cell_rect, coord! { x: x, y: y })
                })
                .map(|entry| entry.data)
                .collect();

            // Partition-local DBSCAN iterates in point order; keep it tied
            // to the input order, not to R-tree traversal order.
            member_indices.sort_unstable();

            let members: Vec<LabelledPoint> = member_indices
                .into_iter()
                .map(|idx| points[idx].clone())
                .collect();

            debug!("cell {}: {} points", cell, members.len());
            partitions.push(Partition {
                cell,
                bounds: cell_rect,
                points: members,
            });
        }
    }

    Ok(partitions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Point;

    fn labelled(coords: &[(f64, f64)]) -> Vec<LabelledPoint> {
        coords
            .iter()
            .enumerate()
            .map(|(idx, &(x, y))| LabelledPoint::new(idx + 1, Point::new(x, y)))
            .collect()
    }

    fn unit_bounds(side: f64) -> Rect {
        Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: side, y: side })
    }

    fn cells_containing(partitions: &[Partition], id: usize) -> Vec<GridCell> {
        partitions
            .iter()
            .filter(|p| p.points.iter().any(|pt| pt.id == id))
            .map(|p| p.cell)
            .collect()
    }

    #[test]
    fn test_interior_points_land_in_one_partition() {
        let points = labelled(&[(0.5, 0.5), (1.5, 0.5), (0.5, 1.5), (1.5, 1.5)]);
        let partitions = partition_points(&points, &unit_bounds(2.0), 2, 0.1).unwrap();

        assert_eq!(partitions.len(), 4);
        assert_eq!(cells_containing(&partitions, 1), vec![GridCell::new(0, 0)]);
        assert_eq!(cells_containing(&partitions, 2), vec![GridCell::new(0, 1)]);
        assert_eq!(cells_containing(&partitions, 3), vec![GridCell::new(1, 0)]);
        assert_eq!(cells_containing(&partitions, 4), vec![GridCell::new(1, 1)]);
    }

    #[test]
    fn test_seam_points_duplicated_into_both_partitions() {
        // Vertical seam at x = 1; the point is within eps on either side.
        let points = labelled(&[(1.05, 0.5)]);
        let partitions = partition_points(&points, &unit_bounds(2.0), 2, 0.1).unwrap();

        assert_eq!(
            cells_containing(&partitions, 1),
            vec![GridCell::new(0, 0), GridCell::new(0, 1)]
        );
    }

    #[test]
    fn test_corner_point_duplicated_into_four_partitions() {
        let points = labelled(&[(1.0, 1.0)]);
        let partitions = partition_points(&points, &unit_bounds(2.0), 2, 0.1).unwrap();

        assert_eq!(cells_containing(&partitions, 1).len(), 4);
    }

    #[test]
    fn test_point_at_expanded_max_excluded() {
        // Cell (0, 0) spans x in [-0.25, 1.25); a point exactly at the
        // expanded max belongs only to the next cell over.
        let points = labelled(&[(1.25, 0.5)]);
        let partitions = partition_points(&points, &unit_bounds(2.0), 2, 0.25).unwrap();

        assert_eq!(cells_containing(&partitions, 1), vec![GridCell::new(0, 1)]);
    }

    #[test]
    fn test_point_on_outer_max_edge_excluded_without_eps() {
        // With eps = 0 the last cell is half-open at the outer bounding
        // rectangle edge, so a point exactly on it lands nowhere.
        let points = labelled(&[(2.0, 0.5), (0.5, 2.0)]);
        let partitions = partition_points(&points, &unit_bounds(2.0), 2, 0.0).unwrap();

        assert!(cells_containing(&partitions, 1).is_empty());
        assert!(cells_containing(&partitions, 2).is_empty());
    }

    #[test]
    fn test_point_on_outer_max_edge_included_with_eps() {
        let points = labelled(&[(2.0, 0.5)]);
        let partitions = partition_points(&points, &unit_bounds(2.0), 2, 0.1).unwrap();

        assert_eq!(cells_containing(&partitions, 1), vec![GridCell::new(0, 1)]);
    }

    #[test]
    fn test_min_edges_inclusive() {
        let points = labelled(&[(0.0, 0.0)]);
        let partitions = partition_points(&points, &unit_bounds(2.0), 2, 0.0).unwrap();

        assert_eq!(cells_containing(&partitions, 1), vec![GridCell::new(0, 0)]);
    }

    #[test]
    fn test_empty_partitions_still_reported() {
        let points = labelled(&[(0.1, 0.1)]);
        let partitions = partition_points(&points, &unit_bounds(4.0), 4, 0.0).unwrap();

        assert_eq!(partitions.len(), 16);
        assert_eq!(partitions.iter().filter(|p| !p.is_empty()).count(), 1);
    }

    #[test]
    fn test_partition_preserves_input_order() {
        let points = labelled(&[(0.3, 0.3), (0.1, 0.1), (0.2, 0.2)]);
        let partitions = partition_points(&points, &unit_bounds(1.0), 1, 0.0).unwrap();

        let ids: Vec<usize> = partitions[0].points.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_copies_are_independent() {
        let points = labelled(&[(1.05, 0.5)]);
        let mut partitions = partition_points(&points, &unit_bounds(2.0), 2, 0.1).unwrap();

        // Mutating one partition's copy must not leak into the other.
        let first = partitions
            .iter_mut()
            .find(|p| !p.is_empty())
            .unwrap();
        first.points[0].label = crate::types::Label::Noise;

        let untouched = partitions
            .iter()
            .filter(|p| !p.is_empty())
            .filter(|p| p.points[0].label.is_unprocessed())
            .count();
        assert_eq!(untouched, 1);
    }

    #[test]
    fn test_zero_resolution_rejected() {
        let points = labelled(&[(0.5, 0.5)]);
        assert!(partition_points(&points, &unit_bounds(1.0), 0, 0.1).is_err());
    }

    #[test]
    fn test_negative_eps_rejected() {
        let points = labelled(&[(0.5, 0.5)]);
        assert!(partition_points(&points, &unit_bounds(1.0), 2, -1.0).is_err());
    }

    #[test]
    fn test_cell_bounds_expansion() {
        let bounds = unit_bounds(2.0);
        let rect = cell_bounds(&bounds, 2, GridCell::new(0, 1), 0.25);

        assert_eq!(rect.min().x, 0.75);
        assert_eq!(rect.max().x, 2.25);
        assert_eq!(rect.min().y, -0.25);
        assert_eq!(rect.max().y, 1.25);
    }
}
