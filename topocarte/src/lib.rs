//! # topocarte
//!
//! Parser pour les documents topologiques (TopoJSON) décrivant des
//! frontières de pays, utilisé pour les cartes choroplèthes.
//!
//! ## Features
//!
//! - Décodage des arcs quantifiés (delta-encoding + transform)
//! - Assemblage des rings à partir des arcs partagés (`~i` = inversé)
//! - Fermeture automatique des rings ouverts
//! - Types `geo` pour l'interopérabilité avec l'écosystème Rust géospatial
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::path::Path;
//! use topocarte::parse;
//!
//! let result = parse(Path::new("countries-110m.json"), None)?;
//! println!("Objet: {}", result.object);
//!
//! for feature in &result.features {
//!     println!("{} ({:?})", feature.display_name, feature.numeric_id);
//! }
//! ```

pub mod assemble;
pub mod error;
pub mod parser;
pub mod types;

pub use error::TopoError;
pub use types::{Feature, ParseResult, Transform};

use std::path::Path;

use parser::document::{TopoGeometry, TopologyDoc};

/// Objet décodé par défaut quand aucun nom n'est demandé
const DEFAULT_OBJECT: &str = "countries";

/// Sélectionne l'objet à décoder: le nom demandé, sinon "countries",
/// sinon l'unique objet du document
fn select_object<'a>(
    doc: &'a TopologyDoc,
    object: Option<&'a str>,
) -> Result<(&'a str, &'a TopoGeometry), TopoError> {
    if let Some(name) = object {
        let geom = doc
            .objects
            .get(name)
            .ok_or_else(|| TopoError::MissingObject(name.to_string()))?;
        return Ok((name, geom));
    }

    if let Some((name, geom)) = doc.objects.get_key_value(DEFAULT_OBJECT) {
        return Ok((name.as_str(), geom));
    }

    if doc.objects.len() == 1 {
        let (name, geom) = doc.objects.iter().next().unwrap();
        return Ok((name.as_str(), geom));
    }

    Err(TopoError::MissingObject(DEFAULT_OBJECT.to_string()))
}

/// Aplati les GeometryCollection imbriquées en géométries feuilles
fn collect_leaves<'a>(geom: &'a TopoGeometry, leaves: &mut Vec<&'a TopoGeometry>) {
    if geom.kind == "GeometryCollection" {
        for child in &geom.geometries {
            collect_leaves(child, leaves);
        }
    } else {
        leaves.push(geom);
    }
}

/// Parse un document topologique et retourne les features géographiques.
///
/// # Arguments
///
/// * `input` - Contenu JSON du document
/// * `object` - Nom de l'objet à décoder (défaut: "countries", sinon
///   l'unique objet du document)
///
/// # Returns
///
/// Un `ParseResult` contenant les features dans l'ordre du document et
/// les erreurs non fatales (géométries invalides ou non supportées).
///
/// # Errors
///
/// Retourne `TopoError` si le JSON est invalide, si le document n'est
/// pas une topologie, si l'objet demandé est absent ou si la table
/// d'arcs est mal formée.
pub fn parse_str(input: &str, object: Option<&str>) -> Result<ParseResult, TopoError> {
    let doc: TopologyDoc = serde_json::from_str(input)?;

    if !doc.kind.eq_ignore_ascii_case("Topology") {
        return Err(TopoError::NotATopology(doc.kind.clone()));
    }

    // 1. Décoder la table d'arcs partagés
    let arcs = parser::arcs::decode(&doc.arcs, doc.transform.as_ref())?;

    // 2. Sélectionner l'objet et aplatir ses collections
    let (object_name, root) = select_object(&doc, object)?;
    let mut leaves = Vec::new();
    collect_leaves(root, &mut leaves);

    // 3. Assembler chaque géométrie; les échecs sont non fatals
    let mut features = Vec::with_capacity(leaves.len());
    let mut errors = Vec::new();

    for leaf in leaves {
        match assemble::build_geometry(leaf, &arcs) {
            Ok(geometry) => features.push(Feature {
                display_name: leaf.display_name(),
                numeric_id: leaf.numeric_id(),
                geometry,
            }),
            Err(e) => errors.push(e),
        }
    }

    Ok(ParseResult {
        features,
        object: object_name.to_string(),
        errors,
    })
}

/// Parse un document topologique depuis un fichier.
///
/// # Errors
///
/// Retourne `TopoError::Io` si le fichier est illisible, sinon les
/// mêmes erreurs que [`parse_str`].
pub fn parse(path: &Path, object: Option<&str>) -> Result<ParseResult, TopoError> {
    let content = std::fs::read_to_string(path)?;
    parse_str(&content, object)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINI_TOPOLOGY: &str = r#"{
        "type": "Topology",
        "transform": {"scale": [1.0, 1.0], "translate": [0.0, 0.0]},
        "objects": {
            "countries": {
                "type": "GeometryCollection",
                "geometries": [
                    {
                        "type": "Polygon",
                        "id": 840,
                        "properties": {"name": "United States of America"},
                        "arcs": [[0]]
                    },
                    {
                        "type": "Polygon",
                        "id": 250,
                        "properties": {"name": "France"},
                        "arcs": [[1]]
                    }
                ]
            }
        },
        "arcs": [
            [[0, 0], [4, 0], [0, 4], [-4, 0], [0, -4]],
            [[10, 10], [2, 0], [0, 2], [-2, 0], [0, -2]]
        ]
    }"#;

    #[test]
    fn test_parse_str_mini_topology() {
        let result = parse_str(MINI_TOPOLOGY, None).unwrap();

        assert_eq!(result.object, "countries");
        assert_eq!(result.features.len(), 2);
        assert!(result.errors.is_empty());

        let usa = &result.features[0];
        assert_eq!(usa.display_name, "United States of America");
        assert_eq!(usa.numeric_id.as_deref(), Some("840"));
        assert!(matches!(usa.geometry, geo::Geometry::Polygon(_)));
    }

    #[test]
    fn test_parse_str_named_object() {
        let result = parse_str(MINI_TOPOLOGY, Some("countries")).unwrap();
        assert_eq!(result.features.len(), 2);
    }

    #[test]
    fn test_parse_str_missing_object() {
        let result = parse_str(MINI_TOPOLOGY, Some("land"));
        assert!(matches!(result, Err(TopoError::MissingObject(_))));
    }

    #[test]
    fn test_parse_str_not_a_topology() {
        let result = parse_str(r#"{"type":"FeatureCollection","objects":{}}"#, None);
        assert!(matches!(result, Err(TopoError::NotATopology(_))));
    }

    #[test]
    fn test_parse_str_invalid_json() {
        let result = parse_str("not json", None);
        assert!(matches!(result, Err(TopoError::Json(_))));
    }
}
