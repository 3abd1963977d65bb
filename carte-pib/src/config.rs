//! Configuration du rendu et des sources de données
//!
//! Les préférences (schéma de couleurs, dimensions, couleur neutre)
//! forment un petit objet de configuration injecté, pas d'état global.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::scale::{ColorScheme, Rgb, NO_DATA_COLOR};

/// Options de rendu de la carte
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Largeur du SVG en pixels
    pub width: u32,

    /// Hauteur du SVG en pixels
    pub height: u32,

    /// Schéma de couleurs du gradient
    pub scheme: ColorScheme,

    /// Couleur des régions sans données
    pub neutral: Rgb,

    /// Couleur de trait des frontières
    pub stroke: Rgb,

    /// Épaisseur de trait
    pub stroke_width: f64,

    /// Afficher la légende
    pub legend: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 960,
            height: 500,
            scheme: ColorScheme::default(),
            neutral: NO_DATA_COLOR,
            stroke: Rgb {
                r: 0xff,
                g: 0xff,
                b: 0xff,
            },
            stroke_width: 0.5,
            legend: true,
        }
    }
}

/// Emplacements des trois documents sources
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Sources {
    /// Document topologique (TopoJSON ou GeoJSON)
    pub topology: Option<PathBuf>,

    /// Dataset d'indicateur (gdp_by_country.json)
    pub dataset: Option<PathBuf>,

    /// Table d'alias (country_name_mapping.json)
    pub aliases: Option<PathBuf>,

    /// Nom de l'objet topologique à décoder (défaut: "countries")
    pub object: Option<String>,
}

impl Sources {
    /// Charge les emplacements depuis les variables d'environnement
    pub fn from_env() -> Self {
        Self {
            topology: std::env::var("CARTE_TOPOLOGY").ok().map(PathBuf::from),
            dataset: std::env::var("CARTE_DATASET").ok().map(PathBuf::from),
            aliases: std::env::var("CARTE_ALIASES").ok().map(PathBuf::from),
            object: std::env::var("CARTE_OBJECT").ok(),
        }
    }

    /// Applique les overrides de la ligne de commande
    pub fn apply_overrides(
        &mut self,
        topology: Option<PathBuf>,
        dataset: Option<PathBuf>,
        aliases: Option<PathBuf>,
        object: Option<String>,
    ) {
        if let Some(topology) = topology {
            self.topology = Some(topology);
        }
        if let Some(dataset) = dataset {
            self.dataset = Some(dataset);
        }
        if let Some(aliases) = aliases {
            self.aliases = Some(aliases);
        }
        if let Some(object) = object {
            self.object = Some(object);
        }
    }
}
