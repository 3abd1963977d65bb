//! Dataset d'indicateur économique (PIB par pays et par année)
//!
//! Format wire: `metadata.statistics.{min_gdp,max_gdp,median_gdp,quartiles}`,
//! `countries[code] = { name, code, gdp_by_year: { "année": valeur } }`.
//! Les années manquantes sont simplement absentes: un trou se résout en
//! "pas de données", jamais en zéro.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Dataset de démonstration embarqué (fallback hors-ligne)
const DEMO_DATASET: &str = include_str!("presets/demo_gdp.json");

/// Erreurs de chargement du dataset
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Erreur d'I/O lors de la lecture du document
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON invalide
    #[error("Invalid dataset JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Aucune valeur strictement positive dans le dataset
    #[error("Dataset has no positive values")]
    Empty,
}

/// Un pays du dataset: nom canonique, code ISO, série temporelle
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndicatorRecord {
    /// Nom canonique (clé d'affichage du dataset)
    pub name: String,

    /// Code ISO (alpha-3 pour la Banque mondiale)
    pub code: String,

    /// Valeurs par année; les trous restent des trous
    #[serde(default)]
    pub gdp_by_year: BTreeMap<i32, f64>,
}

impl IndicatorRecord {
    /// Valeur la plus récente disponible
    pub fn latest(&self) -> Option<(i32, f64)> {
        self.gdp_by_year.iter().next_back().map(|(&y, &v)| (y, v))
    }
}

/// Statistiques du dataset, pour le domaine de l'échelle de couleurs
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DatasetStatistics {
    pub min_gdp: f64,
    pub max_gdp: f64,
    pub median_gdp: f64,

    /// Percentiles 25/50/75
    #[serde(default)]
    pub quartiles: Vec<f64>,

    #[serde(default)]
    pub total_countries: usize,

    /// [première année, dernière année]
    #[serde(default)]
    pub data_years_range: Vec<i32>,
}

/// Métadonnées du document
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DatasetMetadata {
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub source: String,

    #[serde(default)]
    pub indicator: String,

    #[serde(default)]
    pub last_updated: String,

    /// Statistiques précalculées par le producteur (optionnelles)
    #[serde(default)]
    pub statistics: Option<DatasetStatistics>,
}

/// Dataset complet, immuable après chargement.
///
/// Les pays sont indexés par code ISO dans un `BTreeMap`: l'itération
/// en ordre ISO croissant est l'ordre déterministe requis par la règle
/// de résolution par sous-chaîne.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndicatorDataset {
    #[serde(default)]
    pub metadata: DatasetMetadata,

    pub countries: BTreeMap<String, IndicatorRecord>,
}

impl IndicatorDataset {
    /// Parse un dataset depuis son contenu JSON.
    ///
    /// Les valeurs non positives ou non finies sont éliminées au
    /// chargement (le log d'une valeur non positive est indéfini).
    pub fn from_str(input: &str) -> Result<Self, DatasetError> {
        let mut dataset: IndicatorDataset = serde_json::from_str(input)?;

        let mut dropped = 0usize;
        for record in dataset.countries.values_mut() {
            let before = record.gdp_by_year.len();
            record.gdp_by_year.retain(|_, v| *v > 0.0 && v.is_finite());
            dropped += before - record.gdp_by_year.len();
        }
        if dropped > 0 {
            debug!(dropped = dropped, "Dropped non-positive indicator values");
        }

        Ok(dataset)
    }

    /// Charge un dataset depuis un fichier
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Dataset de démonstration embarqué
    pub fn demo() -> Self {
        Self::from_str(DEMO_DATASET).expect("embedded demo dataset is valid")
    }

    /// Valeur d'un pays pour une année; trou → `None`, jamais zéro
    pub fn value_for(&self, code: &str, year: i32) -> Option<f64> {
        self.countries.get(code)?.gdp_by_year.get(&year).copied()
    }

    /// Valeur la plus récente d'un pays
    pub fn latest(&self, code: &str) -> Option<(i32, f64)> {
        self.countries.get(code)?.latest()
    }

    /// Bornes [min, max] des années disponibles, tous pays confondus
    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        let mut bounds: Option<(i32, i32)> = None;
        for record in self.countries.values() {
            let (Some((&first, _)), Some((&last, _))) = (
                record.gdp_by_year.iter().next(),
                record.gdp_by_year.iter().next_back(),
            ) else {
                continue;
            };
            bounds = Some(match bounds {
                Some((lo, hi)) => (lo.min(first), hi.max(last)),
                None => (first, last),
            });
        }
        bounds
    }

    /// Statistiques pour le domaine de l'échelle: celles du producteur
    /// si présentes, sinon recalculées sur l'historique complet
    pub fn statistics(&self) -> Result<DatasetStatistics, DatasetError> {
        if let Some(stats) = &self.metadata.statistics {
            if stats.min_gdp > 0.0 && stats.max_gdp > 0.0 {
                return Ok(stats.clone());
            }
        }
        self.compute_statistics()
    }

    /// Recalcule min/max/médiane/quartiles sur toutes les valeurs
    /// positives de l'historique complet
    pub fn compute_statistics(&self) -> Result<DatasetStatistics, DatasetError> {
        let mut values: Vec<f64> = self
            .countries
            .values()
            .flat_map(|r| r.gdp_by_year.values().copied())
            .collect();

        if values.is_empty() {
            return Err(DatasetError::Empty);
        }

        values.sort_by(|a, b| a.partial_cmp(b).expect("values are finite"));

        let total_countries = self
            .countries
            .values()
            .filter(|r| !r.gdp_by_year.is_empty())
            .count();

        let data_years_range = match self.year_bounds() {
            Some((lo, hi)) => vec![lo, hi],
            None => Vec::new(),
        };

        Ok(DatasetStatistics {
            min_gdp: values[0],
            max_gdp: values[values.len() - 1],
            median_gdp: median(&values),
            quartiles: vec![
                percentile(&values, 25.0),
                percentile(&values, 50.0),
                percentile(&values, 75.0),
            ],
            total_countries,
            data_years_range,
        })
    }
}

/// Médiane d'une liste triée (moyenne des deux centraux si pair)
fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Percentile `p` d'une liste triée, interpolation linéaire
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    let k = (n - 1) as f64 * p / 100.0;
    let f = k.floor() as usize;
    let c = k - f as f64;

    if f == n - 1 {
        sorted[f]
    } else {
        sorted[f] * (1.0 - c) + sorted[f + 1] * c
    }
}
