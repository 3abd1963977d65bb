//! Types d'erreurs pour le crate topocarte

use thiserror::Error;

/// Erreurs pouvant survenir lors du parsing d'une topologie
#[derive(Debug, Error)]
pub enum TopoError {
    /// Erreur d'I/O lors de la lecture du document
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON invalide
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Le document n'est pas une topologie
    #[error("Not a topology document: {0}")]
    NotATopology(String),

    /// Objet demandé absent du document
    #[error("Missing object '{0}' in topology")]
    MissingObject(String),

    /// Arc mal formé (position incomplète, etc.)
    #[error("Malformed arc {index}: {reason}")]
    MalformedArc { index: usize, reason: String },

    /// Index d'arc hors limites
    #[error("Arc index {index} out of range ({available} arcs)")]
    ArcOutOfRange { index: i64, available: usize },

    /// Ring invalide (trop court, impossible à fermer)
    #[error("Invalid ring for {id}: {reason}")]
    InvalidRing { id: String, reason: String },

    /// Type de géométrie non supporté
    #[error("Unsupported geometry type '{kind}' for {id}")]
    UnsupportedGeometry { id: String, kind: String },
}

impl TopoError {
    /// Crée une erreur de ring invalide avec contexte
    pub fn invalid_ring(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRing {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Crée une erreur d'arc mal formé
    pub fn malformed_arc(index: usize, reason: impl Into<String>) -> Self {
        Self::MalformedArc {
            index,
            reason: reason.into(),
        }
    }
}
