//! # carte-pib
//!
//! Carte choroplèthe du PIB mondial: jointure entre un document
//! topologique (frontières de pays) et un dataset d'indicateur,
//! échelle de couleurs logarithmique, rendu SVG et export GeoJSON.
//!
//! ## Features
//!
//! - Réconciliation d'identité pays par chaîne de règles déterministe
//!   (alias, id numérique, nom exact, casse, sous-chaîne)
//! - Échelle log10 → gradient HSL avec couleur neutre "pas de données"
//! - Rendu SVG avec légende, surface de hit-testing pour l'interaction
//! - Fallback sur des documents de démonstration embarqués
//!
//! ## Usage CLI
//!
//! ```bash
//! # Rendu SVG de la carte
//! carte-pib render --topology countries-110m.json --dataset gdp_by_country.json
//!
//! # Export GeoJSON de la jointure (sans rendu)
//! carte-pib export --dataset gdp_by_country.json --output resolved.geojson
//! ```

pub mod alias;
pub mod config;
pub mod dataset;
pub mod export;
pub mod reconcile;
pub mod render;
pub mod report;
pub mod scale;
pub mod sources;

pub use alias::AliasMap;
pub use config::{RenderOptions, Sources};
pub use dataset::{DatasetStatistics, IndicatorDataset, IndicatorRecord};
pub use reconcile::{resolve, resolve_entries, CountryIndex, Resolution, ResolvedEntry};
pub use report::ReconcileReport;
pub use scale::{ColorScheme, GdpScale, Rgb, ScaleError};
