//! Modèle serde du document topologique
//!
//! Le document contient un `transform` optionnel, une table d'arcs
//! partagés et des objets géométriques qui référencent ces arcs par
//! index. Les attributs (`id`, `properties`) restent en JSON brut car
//! leur forme varie selon le producteur du document.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::types::Transform;
use crate::TopoError;

/// Document topologique complet
#[derive(Debug, Deserialize)]
pub struct TopologyDoc {
    /// Doit valoir "Topology"
    #[serde(rename = "type")]
    pub kind: String,

    /// Transform de quantification (absent pour les coordonnées absolues)
    #[serde(default)]
    pub transform: Option<Transform>,

    /// Table d'arcs: listes de positions (delta-encodées si transform)
    #[serde(default)]
    pub arcs: Vec<Vec<Vec<f64>>>,

    /// Objets géométriques, par nom
    #[serde(default)]
    pub objects: BTreeMap<String, TopoGeometry>,
}

/// Géométrie topologique (récursive pour les GeometryCollection)
#[derive(Debug, Deserialize)]
pub struct TopoGeometry {
    /// Type de géométrie ("Polygon", "MultiPolygon", "GeometryCollection", ...)
    #[serde(rename = "type")]
    pub kind: String,

    /// Identifiant (chaîne ou nombre selon le producteur)
    #[serde(default)]
    pub id: Option<Value>,

    /// Propriétés libres (dont le nom d'affichage)
    #[serde(default)]
    pub properties: Option<serde_json::Map<String, Value>>,

    /// Index d'arcs: `[[i]]` pour Polygon, `[[[i]]]` pour MultiPolygon
    #[serde(default)]
    pub arcs: Option<Value>,

    /// Sous-géométries (GeometryCollection)
    #[serde(default)]
    pub geometries: Vec<TopoGeometry>,
}

impl TopoGeometry {
    /// Nom d'affichage: `properties.name`, sinon `properties.NAME`,
    /// sinon "Unknown" (les deux orthographes existent selon la source)
    pub fn display_name(&self) -> String {
        self.properties
            .as_ref()
            .and_then(|p| p.get("name").or_else(|| p.get("NAME")))
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_string()
    }

    /// Identifiant numérique stringifié ("840", 840 → "840")
    pub fn numeric_id(&self) -> Option<String> {
        match self.id.as_ref()? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Décode `arcs` comme liste de rings (Polygon)
    pub fn polygon_rings(&self) -> Result<Vec<Vec<i64>>, TopoError> {
        let value = self.arcs.as_ref().ok_or_else(|| {
            TopoError::invalid_ring(self.describe(), "missing arcs member")
        })?;
        parse_rings(value, &self.describe())
    }

    /// Décode `arcs` comme liste de polygones (MultiPolygon)
    pub fn multi_polygon_rings(&self) -> Result<Vec<Vec<Vec<i64>>>, TopoError> {
        let value = self.arcs.as_ref().ok_or_else(|| {
            TopoError::invalid_ring(self.describe(), "missing arcs member")
        })?;
        let polygons = value.as_array().ok_or_else(|| {
            TopoError::invalid_ring(self.describe(), "arcs is not an array of polygons")
        })?;

        polygons
            .iter()
            .map(|p| parse_rings(p, &self.describe()))
            .collect()
    }

    /// Libellé pour les messages d'erreur (id, sinon nom)
    pub fn describe(&self) -> String {
        self.numeric_id().unwrap_or_else(|| self.display_name())
    }
}

/// Parse un tableau de rings `[[i, j, ...], ...]` en indices d'arcs
fn parse_rings(value: &Value, id: &str) -> Result<Vec<Vec<i64>>, TopoError> {
    let rings = value
        .as_array()
        .ok_or_else(|| TopoError::invalid_ring(id, "rings is not an array"))?;

    rings
        .iter()
        .map(|ring| {
            let indices = ring
                .as_array()
                .ok_or_else(|| TopoError::invalid_ring(id, "ring is not an array"))?;
            indices
                .iter()
                .map(|idx| {
                    idx.as_i64()
                        .ok_or_else(|| TopoError::invalid_ring(id, "arc index is not an integer"))
                })
                .collect()
        })
        .collect()
}
