//! Types de données pour le crate topocarte

use geo::Geometry;
use serde::Deserialize;

use crate::TopoError;

/// Résultat du parsing d'un document topologique
#[derive(Debug)]
pub struct ParseResult {
    /// Features extraites de l'objet décodé, dans l'ordre du document
    pub features: Vec<Feature>,

    /// Nom de l'objet décodé (ex: "countries")
    pub object: String,

    /// Erreurs non fatales rencontrées pendant le parsing
    pub errors: Vec<TopoError>,
}

/// Une entité géographique (pays) avec sa géométrie et son identité
#[derive(Debug, Clone)]
pub struct Feature {
    /// Nom d'affichage issu des propriétés (`name` ou `NAME`)
    pub display_name: String,

    /// Identifiant numérique de la topologie (code ISO numérique legacy)
    pub numeric_id: Option<String>,

    /// Géométrie (Polygon ou MultiPolygon)
    pub geometry: Geometry,
}

/// Transform de quantification (positions delta-encodées)
///
/// `position = delta_cumulée * scale + translate`
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Transform {
    /// Facteurs d'échelle [sx, sy]
    pub scale: [f64; 2],

    /// Translation [tx, ty]
    pub translate: [f64; 2],
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: [1.0, 1.0],
            translate: [0.0, 0.0],
        }
    }
}
