use std::fs;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::{DocumentPoint, Point3D, QueryPoint};

/// Label the backend writes next to the query coordinates.
pub const QUERY_POINT_LABEL: &str = "New_query";

#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decodes the document points resource: a JSON array of
/// `{x, y, z, doc}` objects. Any element missing a field fails the whole set.
pub fn parse_document_points(bytes: &[u8]) -> Result<Vec<DocumentPoint>, DataError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Decodes the query point resource. Missing coordinates are not an error.
pub fn parse_query_point(bytes: &[u8]) -> Result<QueryPoint, DataError> {
    Ok(serde_json::from_slice(bytes)?)
}

pub fn read_document_points_from_file<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<DocumentPoint>, DataError> {
    let bytes = fs::read(path)?;
    parse_document_points(&bytes)
}

pub fn read_query_point_from_file<P: AsRef<Path>>(path: P) -> Result<QueryPoint, DataError> {
    let bytes = fs::read(path)?;
    parse_query_point(&bytes)
}

#[derive(Serialize)]
struct QueryPointRecord<'a> {
    x: f64,
    y: f64,
    z: f64,
    doc: &'a str,
}

pub fn write_document_points_to_file<P: AsRef<Path>>(
    points: &[DocumentPoint],
    path: P,
) -> Result<(), DataError> {
    fs::write(path, serde_json::to_vec_pretty(points)?)?;
    Ok(())
}

/// Writes the query point in the shape the viewer polls for.
pub fn write_query_point_to_file<P: AsRef<Path>>(point: Point3D, path: P) -> Result<(), DataError> {
    let record = QueryPointRecord {
        x: point.x,
        y: point.y,
        z: point.z,
        doc: QUERY_POINT_LABEL,
    };
    fs::write(path, serde_json::to_vec_pretty(&record)?)?;
    Ok(())
}
