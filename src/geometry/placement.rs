use std::collections::HashMap;

use crate::{DocumentPoint, Point3D};

/// Places a query among the documents it matched: the centroid of the
/// matched documents' positions, weighted by ranking score.
///
/// Ranked documents that have no point are skipped. Returns the origin when
/// nothing matches or the matched scores sum to zero.
pub fn place_query(points: &[DocumentPoint], ranked: &[(String, f64)]) -> Point3D {
    let by_doc: HashMap<&str, &DocumentPoint> =
        points.iter().map(|p| (p.doc.as_str(), p)).collect();

    let matched: Vec<(&DocumentPoint, f64)> = ranked
        .iter()
        .filter_map(|(doc, score)| by_doc.get(doc.as_str()).map(|p| (*p, *score)))
        .collect();

    let total: f64 = matched.iter().map(|(_, score)| score).sum();
    if matched.is_empty() || total == 0.0 {
        return Point3D::ORIGIN;
    }

    matched
        .iter()
        .fold(Point3D::ORIGIN, |acc, (p, score)| {
            let w = score / total;
            Point3D::new(acc.x + p.x * w, acc.y + p.y * w, acc.z + p.z * w)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn corpus() -> Vec<DocumentPoint> {
        vec![
            DocumentPoint::new("a", 1.0, 0.0, 0.0),
            DocumentPoint::new("b", 0.0, 2.0, 0.0),
            DocumentPoint::new("c", 0.0, 0.0, 4.0),
        ]
    }

    #[test]
    fn weighted_centroid_of_matches() {
        let ranked = vec![("a".to_string(), 0.75), ("b".to_string(), 0.25)];
        let q = place_query(&corpus(), &ranked);
        assert_approx_eq!(q.x, 0.75, 1e-12);
        assert_approx_eq!(q.y, 0.5, 1e-12);
        assert_approx_eq!(q.z, 0.0, 1e-12);
    }

    #[test]
    fn unknown_documents_are_skipped() {
        let ranked = vec![("missing".to_string(), 10.0), ("c".to_string(), 1.0)];
        let q = place_query(&corpus(), &ranked);
        assert_eq!(q, Point3D::new(0.0, 0.0, 4.0));
    }

    #[test]
    fn no_matches_yields_origin() {
        assert_eq!(place_query(&corpus(), &[]), Point3D::ORIGIN);
        assert_eq!(
            place_query(&[], &[("a".to_string(), 1.0)]),
            Point3D::ORIGIN
        );
    }
}
