//! Chargement des documents sources (topologie, dataset, alias)
//!
//! Les trois documents sont indépendants et chargés en parallèle. En
//! cas d'échec d'une source, on retombe sur les documents de
//! démonstration embarqués: la carte n'est jamais laissée vide.

use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use crate::alias::AliasMap;
use crate::config::Sources;
use crate::dataset::IndicatorDataset;

/// Topologie de démonstration embarquée (fallback hors-ligne)
const DEMO_TOPOLOGY: &str = include_str!("presets/demo_topology.json");

/// Les trois documents chargés, prêts pour la réconciliation
pub struct LoadedSources {
    pub features: Vec<topocarte::Feature>,
    pub dataset: IndicatorDataset,
    pub aliases: AliasMap,

    /// `true` si une source demandée a échoué et a été remplacée par
    /// la version de démonstration
    pub degraded: bool,
}

/// Charge les trois documents en parallèle avec fallback de démo
pub async fn load(sources: &Sources) -> LoadedSources {
    let topology = sources.topology.clone();
    let object = sources.object.clone();
    let dataset_path = sources.dataset.clone();
    let aliases_path = sources.aliases.clone();

    let (features_res, dataset_res, aliases_res) = futures::join!(
        tokio::task::spawn_blocking(move || {
            topology
                .as_deref()
                .map(|path| load_geometry(path, object.as_deref()))
        }),
        tokio::task::spawn_blocking(move || dataset_path.as_deref().map(load_dataset)),
        tokio::task::spawn_blocking(move || aliases_path.as_deref().map(load_aliases)),
    );

    let mut degraded = false;

    let features = match flatten(features_res) {
        Some(Ok(features)) => features,
        Some(Err(e)) => {
            warn!("Failed to load topology, using demo geometry: {:#}", e);
            degraded = true;
            demo_features()
        }
        None => {
            info!("No topology source configured, using demo geometry");
            demo_features()
        }
    };

    let dataset = match flatten(dataset_res) {
        Some(Ok(dataset)) => dataset,
        Some(Err(e)) => {
            warn!("Failed to load dataset, using demo dataset: {:#}", e);
            degraded = true;
            IndicatorDataset::demo()
        }
        None => {
            info!("No dataset source configured, using demo dataset");
            IndicatorDataset::demo()
        }
    };

    let aliases = match flatten(aliases_res) {
        Some(Ok(aliases)) => aliases,
        Some(Err(e)) => {
            warn!("Failed to load aliases, using embedded table: {:#}", e);
            degraded = true;
            AliasMap::default_embedded()
        }
        None => AliasMap::default_embedded(),
    };

    LoadedSources {
        features,
        dataset,
        aliases,
        degraded,
    }
}

/// Ramène `Result<Option<Result<T>>>` (join + source optionnelle) à
/// `Option<Result<T>>`; un échec de join devient un échec de source
fn flatten<T>(
    joined: std::result::Result<Option<Result<T>>, tokio::task::JoinError>,
) -> Option<Result<T>> {
    match joined {
        Ok(inner) => inner,
        Err(e) => Some(Err(anyhow::anyhow!("load task failed: {}", e))),
    }
}

/// Features de démonstration embarquées
pub fn demo_features() -> Vec<topocarte::Feature> {
    topocarte::parse_str(DEMO_TOPOLOGY, None)
        .expect("embedded demo topology is valid")
        .features
}

/// Charge la géométrie: topologie TopoJSON, avec repli GeoJSON
/// FeatureCollection si le document n'est pas une topologie
pub fn load_geometry(path: &Path, object: Option<&str>) -> Result<Vec<topocarte::Feature>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read geometry file: {}", path.display()))?;

    match topocarte::parse_str(&content, object) {
        Ok(result) => {
            if !result.errors.is_empty() {
                warn!(
                    skipped = result.errors.len(),
                    "Some topology geometries were skipped"
                );
            }
            info!(
                features = result.features.len(),
                object = result.object.as_str(),
                "Loaded topology"
            );
            Ok(result.features)
        }
        // Pas une topologie: certains producteurs publient directement
        // la FeatureCollection convertie
        Err(topocarte::TopoError::NotATopology(_)) => geojson_features(&content),
        Err(e) => Err(e).context(format!("Failed to parse topology: {}", path.display())),
    }
}

/// Charge une FeatureCollection GeoJSON comme liste de features
fn geojson_features(content: &str) -> Result<Vec<topocarte::Feature>> {
    let geojson: geojson::GeoJson = content.parse().context("Failed to parse GeoJSON")?;

    let collection = match geojson {
        geojson::GeoJson::FeatureCollection(fc) => fc,
        _ => bail!("GeoJSON geometry source must be a FeatureCollection"),
    };

    let mut features = Vec::new();

    for feature in collection.features {
        let display_name = feature
            .properties
            .as_ref()
            .and_then(|p| p.get("name").or_else(|| p.get("NAME")))
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown")
            .to_string();

        let numeric_id = match &feature.id {
            Some(geojson::feature::Id::String(s)) => Some(s.clone()),
            Some(geojson::feature::Id::Number(n)) => Some(n.to_string()),
            None => None,
        };

        let Some(geometry) = feature.geometry else {
            continue;
        };
        let geometry: geo::Geometry<f64> = geometry
            .value
            .try_into()
            .map_err(|e| anyhow::anyhow!("Failed to convert GeoJSON geometry: {:?}", e))?;

        // Seuls les (Multi)Polygon sont rendus
        match geometry {
            geo::Geometry::Polygon(_) | geo::Geometry::MultiPolygon(_) => {
                features.push(topocarte::Feature {
                    display_name,
                    numeric_id,
                    geometry,
                });
            }
            _ => continue,
        }
    }

    info!(features = features.len(), "Loaded GeoJSON feature collection");
    Ok(features)
}

fn load_dataset(path: &Path) -> Result<IndicatorDataset> {
    let dataset = IndicatorDataset::load(path)
        .with_context(|| format!("Failed to load dataset: {}", path.display()))?;
    info!(countries = dataset.countries.len(), "Loaded indicator dataset");
    Ok(dataset)
}

fn load_aliases(path: &Path) -> Result<AliasMap> {
    let aliases = AliasMap::load(path)
        .with_context(|| format!("Failed to load alias map: {}", path.display()))?;
    info!(entries = aliases.len(), "Loaded alias map");
    Ok(aliases)
}
