//! Ingestion of taxi trip records and point-set construction helpers.

use csv::ReaderBuilder;
use geo::{Point, Rect, coord};
use log::info;
use std::path::Path;

use crate::error::{GridscanError, Result};
use crate::types::LabelledPoint;

// Column positions of the pickup location in the yellow-cab trip format.
const PICKUP_LONGITUDE_FIELD: usize = 8;
const PICKUP_LATITUDE_FIELD: usize = 9;

/// Read pickup locations from a yellow-cab trip CSV.
///
/// The header row is skipped; ids are assigned sequentially starting at 1
/// in file order. Returns the points together with their bounding
/// rectangle.
///
/// A missing file, a file with no data records, or a malformed coordinate
/// field aborts the whole read with [`GridscanError::Ingestion`]; there is
/// no partial-result recovery.
pub fn read_pickups_csv<P: AsRef<Path>>(path: P) -> Result<(Vec<LabelledPoint>, Rect)> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| {
            GridscanError::Ingestion(format!("cannot open {}: {}", path.display(), e))
        })?;

    let mut points = Vec::new();
    let mut min = coord! { x: f64::INFINITY, y: f64::INFINITY };
    let mut max = coord! { x: f64::NEG_INFINITY, y: f64::NEG_INFINITY };

    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let long = parse_coordinate(&record, PICKUP_LONGITUDE_FIELD, "pickup longitude", row)?;
        let lat = parse_coordinate(&record, PICKUP_LATITUDE_FIELD, "pickup latitude", row)?;

        min.x = min.x.min(long);
        min.y = min.y.min(lat);
        max.x = max.x.max(long);
        max.y = max.y.max(lat);

        points.push(LabelledPoint::new(points.len() + 1, Point::new(long, lat)));
    }

    if points.is_empty() {
        return Err(GridscanError::Ingestion(format!(
            "{} contains no data records",
            path.display()
        )));
    }

    info!("read {} pickup points from {}", points.len(), path.display());
    Ok((points, Rect::new(min, max)))
}

fn parse_coordinate(
    record: &csv::StringRecord,
    field: usize,
    name: &str,
    row: usize,
) -> Result<f64> {
    let raw = record.get(field).ok_or_else(|| {
        GridscanError::Ingestion(format!("record {}: missing {} (field {})", row + 1, name, field))
    })?;

    let value: f64 = raw.trim().parse().map_err(|_| {
        GridscanError::Ingestion(format!("record {}: invalid {}: {:?}", row + 1, name, raw))
    })?;

    if !value.is_finite() {
        return Err(GridscanError::Ingestion(format!(
            "record {}: non-finite {}: {}",
            row + 1,
            name,
            value
        )));
    }

    Ok(value)
}

/// Turn raw coordinates into labelled points with sequential ids from 1.
pub fn labelled_points(coords: &[Point]) -> Vec<LabelledPoint> {
    coords
        .iter()
        .enumerate()
        .map(|(idx, &coord)| LabelledPoint::new(idx + 1, coord))
        .collect()
}

/// Bounding rectangle of a point set, or `None` if the set is empty.
pub fn bounding_rect(points: &[LabelledPoint]) -> Option<Rect> {
    let first = points.first()?;

    let mut min = coord! { x: first.coord.x(), y: first.coord.y() };
    let mut max = min;
    for point in &points[1..] {
        min.x = min.x.min(point.coord.x());
        min.y = min.y.min(point.coord.y());
        max.x = max.x.max(point.coord.x());
        max.y = max.y.max(point.coord.y());
    }

    Some(Rect::new(min, max))
}
