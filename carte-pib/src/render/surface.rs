//! Surface d'interaction: hit-testing écran → pays
//!
//! Les géométries sont projetées une fois en coordonnées écran; `pick`
//! retrouve le pays sous un point (survol ou clic) et expose le couple
//! (code ISO, valeur) aux panneaux de détail externes. Préfiltre par
//! bounding box avant le test de contenance.

use geo::algorithm::bounding_rect::BoundingRect;
use geo::algorithm::contains::Contains;
use geo::{Coord, Geometry, LineString, MultiPolygon, Point, Polygon, Rect};

use crate::reconcile::ResolvedEntry;
use super::projection::Viewport;

/// Pays sélectionné par un survol ou un clic
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub display_name: String,
    pub iso_code: Option<String>,
    pub value: Option<f64>,
    pub matched: bool,
}

struct Shape {
    selection: Selection,
    bbox: Rect<f64>,
    polygon: MultiPolygon<f64>,
}

/// Géométries projetées en espace écran, prêtes pour le hit-testing
pub struct MapSurface {
    shapes: Vec<Shape>,
}

impl MapSurface {
    /// Projette les features et leur jointure en espace écran.
    ///
    /// `entries` doit être parallèle à `features` (sortie de
    /// `resolve_entries`).
    pub fn build(
        features: &[topocarte::Feature],
        entries: &[ResolvedEntry],
        viewport: &Viewport,
    ) -> Self {
        let mut shapes = Vec::with_capacity(entries.len());

        for entry in entries {
            let Some(feature) = features.get(entry.feature) else {
                continue;
            };
            let Some(polygon) = project_geometry(&feature.geometry, viewport) else {
                continue;
            };
            let Some(bbox) = polygon.bounding_rect() else {
                continue;
            };

            shapes.push(Shape {
                selection: Selection {
                    display_name: entry.display_name.clone(),
                    iso_code: entry.iso_code.clone(),
                    value: entry.value,
                    matched: entry.matched,
                },
                bbox,
                polygon,
            });
        }

        Self { shapes }
    }

    /// Pays sous le point écran (x, y), premier trouvé dans l'ordre du
    /// document. Les régions non appariées restent sélectionnables.
    pub fn pick(&self, x: f64, y: f64) -> Option<Selection> {
        let point = Point::new(x, y);

        self.shapes
            .iter()
            .find(|shape| shape.bbox.contains(&point) && shape.polygon.contains(&point))
            .map(|shape| shape.selection.clone())
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

/// Projette une géométrie en espace écran
fn project_geometry(geometry: &Geometry, viewport: &Viewport) -> Option<MultiPolygon<f64>> {
    match geometry {
        Geometry::Polygon(p) => Some(MultiPolygon::new(vec![project_polygon(p, viewport)])),
        Geometry::MultiPolygon(mp) => Some(MultiPolygon::new(
            mp.0.iter().map(|p| project_polygon(p, viewport)).collect(),
        )),
        _ => None,
    }
}

fn project_polygon(polygon: &Polygon, viewport: &Viewport) -> Polygon<f64> {
    let project_ring = |ring: &LineString| -> LineString {
        LineString::new(
            ring.0
                .iter()
                .map(|c| {
                    let (x, y) = viewport.project(c.x, c.y);
                    Coord { x, y }
                })
                .collect(),
        )
    };

    Polygon::new(
        project_ring(polygon.exterior()),
        polygon.interiors().iter().map(project_ring).collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias::AliasMap;
    use crate::dataset::IndicatorDataset;
    use crate::reconcile::{resolve_entries, CountryIndex};

    fn build_surface() -> MapSurface {
        let topology = r#"{
            "type": "Topology",
            "objects": {
                "countries": {
                    "type": "GeometryCollection",
                    "geometries": [
                        {"type": "Polygon", "properties": {"name": "France"}, "arcs": [[0]]},
                        {"type": "Polygon", "properties": {"name": "Atlantis"}, "arcs": [[1]]}
                    ]
                }
            },
            "arcs": [
                [[-5, 42], [8, 42], [8, 51], [-5, 51], [-5, 42]],
                [[-40, -10], [-30, -10], [-30, 0], [-40, 0], [-40, -10]]
            ]
        }"#;
        let features = topocarte::parse_str(topology, None).unwrap().features;

        let dataset = IndicatorDataset::from_str(
            r#"{
                "countries": {
                    "FRA": {"name": "France", "code": "FRA", "gdp_by_year": {"2023": 3.05e12}}
                }
            }"#,
        )
        .unwrap();
        let index = CountryIndex::build(&dataset);
        let entries = resolve_entries(&features, &AliasMap::empty(), &index, &dataset, 2023);

        MapSurface::build(&features, &entries, &Viewport::new(960, 500))
    }

    #[test]
    fn test_pick_matched_country() {
        let surface = build_surface();
        assert_eq!(surface.len(), 2);

        // Centre de la France (~1.5°E, 46.5°N) projeté
        let (x, y) = Viewport::new(960, 500).project(1.5, 46.5);
        let selection = surface.pick(x, y).expect("France should be under cursor");

        assert_eq!(selection.display_name, "France");
        assert_eq!(selection.iso_code.as_deref(), Some("FRA"));
        assert_eq!(selection.value, Some(3.05e12));
        assert!(selection.matched);
    }

    #[test]
    fn test_pick_unmatched_country_is_selectable() {
        let surface = build_surface();

        let (x, y) = Viewport::new(960, 500).project(-35.0, -5.0);
        let selection = surface.pick(x, y).expect("Atlantis should be under cursor");

        assert_eq!(selection.display_name, "Atlantis");
        assert_eq!(selection.iso_code, None);
        assert_eq!(selection.value, None);
        assert!(!selection.matched);
    }

    #[test]
    fn test_pick_open_ocean_is_none() {
        let surface = build_surface();
        // Coin du viewport: aucune géométrie
        assert_eq!(surface.pick(1.0, 1.0), None);
        assert_eq!(surface.pick(900.0, 480.0), None);
    }
}
