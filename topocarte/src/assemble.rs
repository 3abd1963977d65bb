//! Assemblage des géométries à partir des arcs décodés
//!
//! Les objets référencent les arcs partagés par index; un index
//! négatif `~i` désigne l'arc `i` parcouru en sens inverse. Les arcs
//! consécutifs d'un ring partagent leur point de jonction, qui est
//! dédoublonné au raccord.

use geo::{Coord, Geometry, LineString, MultiPolygon, Polygon};
use tracing::warn;

use crate::parser::document::TopoGeometry;
use crate::TopoError;

/// Construit la géométrie d'un objet topologique (Polygon ou MultiPolygon)
pub fn build_geometry(geom: &TopoGeometry, arcs: &[Vec<Coord>]) -> Result<Geometry, TopoError> {
    let id = geom.describe();

    match geom.kind.as_str() {
        "Polygon" => {
            let rings = geom.polygon_rings()?;
            Ok(Geometry::Polygon(build_polygon(&rings, arcs, &id)?))
        }
        "MultiPolygon" => {
            let polygons = geom.multi_polygon_rings()?;
            let polygons: Result<Vec<Polygon>, TopoError> = polygons
                .iter()
                .map(|rings| build_polygon(rings, arcs, &id))
                .collect();
            Ok(Geometry::MultiPolygon(MultiPolygon::new(polygons?)))
        }
        other => Err(TopoError::UnsupportedGeometry {
            id,
            kind: other.to_string(),
        }),
    }
}

/// Construit un polygone: premier ring extérieur, suivants intérieurs
fn build_polygon(
    rings: &[Vec<i64>],
    arcs: &[Vec<Coord>],
    id: &str,
) -> Result<Polygon, TopoError> {
    let mut assembled = rings
        .iter()
        .map(|ring| stitch_ring(ring, arcs, id))
        .collect::<Result<Vec<LineString>, TopoError>>()?;

    if assembled.is_empty() {
        return Err(TopoError::invalid_ring(id, "polygon has no rings"));
    }

    let exterior = assembled.remove(0);
    Ok(Polygon::new(exterior, assembled))
}

/// Raccorde une suite d'index d'arcs en un ring fermé
fn stitch_ring(indices: &[i64], arcs: &[Vec<Coord>], id: &str) -> Result<LineString, TopoError> {
    if indices.is_empty() {
        return Err(TopoError::invalid_ring(id, "empty arc list"));
    }

    let mut ring: Vec<Coord> = Vec::new();

    for &index in indices {
        let arc = resolve_arc(index, arcs)?;

        // Dédoublonner le point de jonction entre arcs consécutifs
        if let (Some(&last), Some(&first)) = (ring.last(), arc.first()) {
            if coords_equal(last, first) {
                ring.pop();
            }
        }
        ring.extend(arc);
    }

    let is_closed = ring.len() > 1 && coords_equal(ring[0], ring[ring.len() - 1]);

    if !is_closed {
        let first = ring[0];
        let last = ring[ring.len() - 1];
        let gap = ((first.x - last.x).powi(2) + (first.y - last.y).powi(2)).sqrt();
        warn!(id = id, points = ring.len(), gap = gap, "Auto-closing unclosed ring");
        ring.push(first);
    }

    // LinearRing: >= 4 points, premier == dernier
    if ring.len() < 4 {
        return Err(TopoError::invalid_ring(
            id,
            format!("ring has only {} points", ring.len()),
        ));
    }

    Ok(LineString::new(ring))
}

/// Résout un index d'arc: `i` → arc direct, `~i` (négatif) → arc inversé
fn resolve_arc(index: i64, arcs: &[Vec<Coord>]) -> Result<Vec<Coord>, TopoError> {
    let out_of_range = || TopoError::ArcOutOfRange {
        index,
        available: arcs.len(),
    };

    if index >= 0 {
        arcs.get(index as usize).cloned().ok_or_else(out_of_range)
    } else {
        let i = !index as usize;
        arcs.get(i)
            .map(|arc| arc.iter().rev().copied().collect())
            .ok_or_else(out_of_range)
    }
}

fn coords_equal(a: Coord, b: Coord) -> bool {
    (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: f64, y: f64) -> Coord {
        Coord { x, y }
    }

    /// Carré unitaire en un seul arc fermé
    fn square_arc() -> Vec<Coord> {
        vec![c(0.0, 0.0), c(1.0, 0.0), c(1.0, 1.0), c(0.0, 1.0), c(0.0, 0.0)]
    }

    #[test]
    fn test_stitch_single_closed_arc() {
        let arcs = vec![square_arc()];
        let ring = stitch_ring(&[0], &arcs, "test").unwrap();
        assert_eq!(ring.0.len(), 5);
        assert_eq!(ring.0[0], ring.0[4]);
    }

    #[test]
    fn test_stitch_two_arcs_deduplicates_junction() {
        // Deux demi-carrés partageant leurs extrémités
        let arcs = vec![
            vec![c(0.0, 0.0), c(1.0, 0.0), c(1.0, 1.0)],
            vec![c(1.0, 1.0), c(0.0, 1.0), c(0.0, 0.0)],
        ];
        let ring = stitch_ring(&[0, 1], &arcs, "test").unwrap();
        // 3 + 3 points - 1 jonction = 5, fermé
        assert_eq!(ring.0.len(), 5);
        assert_eq!(ring.0[0], ring.0[4]);
    }

    #[test]
    fn test_stitch_reversed_arc() {
        // Le second arc est stocké dans l'autre sens, référencé par ~1
        let arcs = vec![
            vec![c(0.0, 0.0), c(1.0, 0.0), c(1.0, 1.0)],
            vec![c(0.0, 0.0), c(0.0, 1.0), c(1.0, 1.0)],
        ];
        let ring = stitch_ring(&[0, -2], &arcs, "test").unwrap();
        assert_eq!(ring.0.len(), 5);
        assert_eq!(ring.0[0], ring.0[4]);
    }

    #[test]
    fn test_stitch_auto_closes_open_ring() {
        let arcs = vec![vec![c(0.0, 0.0), c(1.0, 0.0), c(1.0, 1.0), c(0.0, 1.0)]];
        let ring = stitch_ring(&[0], &arcs, "test").unwrap();
        assert_eq!(ring.0.len(), 5);
        assert_eq!(ring.0[0], ring.0[4]);
    }

    #[test]
    fn test_stitch_short_ring_is_error() {
        let arcs = vec![vec![c(0.0, 0.0), c(1.0, 1.0)]];
        let result = stitch_ring(&[0], &arcs, "test");
        assert!(matches!(result, Err(TopoError::InvalidRing { .. })));
    }

    #[test]
    fn test_resolve_arc_out_of_range() {
        let arcs = vec![square_arc()];
        assert!(matches!(
            resolve_arc(3, &arcs),
            Err(TopoError::ArcOutOfRange { index: 3, available: 1 })
        ));
        assert!(matches!(
            resolve_arc(-5, &arcs),
            Err(TopoError::ArcOutOfRange { .. })
        ));
    }

    #[test]
    fn test_build_polygon_with_hole() {
        let arcs = vec![
            square_arc(),
            vec![
                c(0.25, 0.25),
                c(0.75, 0.25),
                c(0.75, 0.75),
                c(0.25, 0.75),
                c(0.25, 0.25),
            ],
        ];
        let polygon = build_polygon(&[vec![0], vec![1]], &arcs, "test").unwrap();
        assert_eq!(polygon.exterior().0.len(), 5);
        assert_eq!(polygon.interiors().len(), 1);
    }

    #[test]
    fn test_build_geometry_unsupported_kind() {
        let geom: TopoGeometry =
            serde_json::from_str(r#"{"type":"Point","id":"X","coordinates":[0,0]}"#).unwrap();
        let result = build_geometry(&geom, &[]);
        assert!(matches!(result, Err(TopoError::UnsupportedGeometry { .. })));
    }
}
