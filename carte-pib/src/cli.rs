//! Définition et implémentation des commandes CLI
//!
//! CLI simplifiée:
//! - `render`: topologie + dataset → carte choroplèthe SVG
//! - `export`: jointure résolue → GeoJSON (sans rendu)
//! - `stats`: statistiques du dataset et premières économies

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use tracing::info;

use crate::config::{RenderOptions, Sources};
use crate::dataset::IndicatorDataset;
use crate::reconcile::{resolve_entries, CountryIndex};
use crate::report::ReconcileReport;
use crate::scale::{ColorScheme, GdpScale};

#[derive(Subcommand)]
pub enum Commands {
    /// Render the choropleth map to an SVG file
    Render {
        /// Path to the topology document (TopoJSON or GeoJSON)
        #[arg(short, long)]
        topology: Option<PathBuf>,

        /// Path to the indicator dataset (gdp_by_country.json)
        #[arg(short, long)]
        dataset: Option<PathBuf>,

        /// Path to the alias map (country_name_mapping.json)
        #[arg(short, long)]
        aliases: Option<PathBuf>,

        /// Topology object to decode (défaut: "countries")
        #[arg(long)]
        object: Option<String>,

        /// Year to display (default: latest available)
        #[arg(short, long)]
        year: Option<i32>,

        /// Color scheme: red-blue, green-yellow, purple-pink, blue-cyan, orange-red, classic
        #[arg(long, default_value = "red-blue")]
        scheme: String,

        /// SVG width in pixels
        #[arg(long, default_value_t = 960)]
        width: u32,

        /// SVG height in pixels
        #[arg(long, default_value_t = 500)]
        height: u32,

        /// Hide the gradient legend
        #[arg(long)]
        no_legend: bool,

        /// Output SVG file
        #[arg(short, long, default_value = "world.svg")]
        output: PathBuf,

        /// Write the reconciliation report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Export the resolved join as GeoJSON (no rendering)
    Export {
        /// Path to the topology document (TopoJSON or GeoJSON)
        #[arg(short, long)]
        topology: Option<PathBuf>,

        /// Path to the indicator dataset
        #[arg(short, long)]
        dataset: Option<PathBuf>,

        /// Path to the alias map
        #[arg(short, long)]
        aliases: Option<PathBuf>,

        /// Topology object to decode (défaut: "countries")
        #[arg(long)]
        object: Option<String>,

        /// Year to join (default: latest available)
        #[arg(short, long)]
        year: Option<i32>,

        /// Output GeoJSON file
        #[arg(short, long, default_value = "resolved.geojson")]
        output: PathBuf,
    },

    /// Display dataset statistics and top economies
    Stats {
        /// Path to the indicator dataset
        #[arg(short, long)]
        dataset: Option<PathBuf>,

        /// Year to rank (default: latest available)
        #[arg(short, long)]
        year: Option<i32>,

        /// Number of top economies to display
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
}

/// Exécute la commande render
#[allow(clippy::too_many_arguments)]
pub async fn cmd_render(
    topology: Option<PathBuf>,
    dataset: Option<PathBuf>,
    aliases: Option<PathBuf>,
    object: Option<String>,
    year: Option<i32>,
    scheme: &str,
    width: u32,
    height: u32,
    no_legend: bool,
    output: &PathBuf,
    report_path: Option<PathBuf>,
) -> Result<()> {
    let scheme: ColorScheme = scheme.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let mut sources = Sources::from_env();
    sources.apply_overrides(topology, dataset, aliases, object);

    let loaded = crate::sources::load(&sources).await;
    let year = resolve_year(year, &loaded.dataset)?;

    info!(
        features = loaded.features.len(),
        countries = loaded.dataset.countries.len(),
        year = year,
        "Starting render"
    );

    // Jointure + échelle
    let index = CountryIndex::build(&loaded.dataset);
    let entries = resolve_entries(&loaded.features, &loaded.aliases, &index, &loaded.dataset, year);

    let stats = loaded
        .dataset
        .statistics()
        .context("Dataset statistics unavailable")?;
    let scale = GdpScale::new(stats.min_gdp, stats.max_gdp, scheme)
        .context("Cannot build color scale from dataset statistics")?;

    let options = RenderOptions {
        width,
        height,
        scheme,
        legend: !no_legend,
        ..RenderOptions::default()
    };

    let svg = crate::render::render_svg(&loaded.features, &entries, &scale, &stats, &options, year);
    std::fs::write(output, &svg)
        .context(format!("Failed to write SVG: {}", output.display()))?;

    let reconcile_report = ReconcileReport::from_entries(year, &entries);
    reconcile_report.display();

    if let Some(path) = report_path {
        reconcile_report.save_to_file(&path)?;
        println!("Report saved to {}", path.display());
    }

    println!("\n=== Render {} ===", year);
    println!("Features: {}", loaded.features.len());
    println!("Scheme: {}", scheme.name());
    println!("Size: {}x{}", width, height);
    if loaded.degraded {
        println!("Sources: DEGRADED (demo fallback in use)");
    }
    println!("Output: {}", output.display());

    Ok(())
}

/// Exécute la commande export
pub async fn cmd_export(
    topology: Option<PathBuf>,
    dataset: Option<PathBuf>,
    aliases: Option<PathBuf>,
    object: Option<String>,
    year: Option<i32>,
    output: &PathBuf,
) -> Result<()> {
    let mut sources = Sources::from_env();
    sources.apply_overrides(topology, dataset, aliases, object);

    let loaded = crate::sources::load(&sources).await;
    let year = resolve_year(year, &loaded.dataset)?;

    let index = CountryIndex::build(&loaded.dataset);
    let entries = resolve_entries(&loaded.features, &loaded.aliases, &index, &loaded.dataset, year);

    crate::export::export_resolved(&loaded.features, &entries, year, output)?;

    let report = ReconcileReport::from_entries(year, &entries);
    println!("Export complete: {}", report.summary());
    println!("Output: {}", output.display());

    Ok(())
}

/// Exécute la commande stats
pub async fn cmd_stats(dataset: Option<PathBuf>, year: Option<i32>, top: usize) -> Result<()> {
    let mut sources = Sources::from_env();
    sources.apply_overrides(None, dataset, None, None);

    let loaded = crate::sources::load(&sources).await;
    let year = resolve_year(year, &loaded.dataset)?;

    let stats = loaded
        .dataset
        .statistics()
        .context("Dataset statistics unavailable")?;

    println!("=== Dataset statistics ===");
    if !loaded.dataset.metadata.source.is_empty() {
        println!("Source: {}", loaded.dataset.metadata.source);
    }
    println!("Countries: {}", loaded.dataset.countries.len());
    if let Some((first, last)) = loaded.dataset.year_bounds() {
        println!("Years: {} - {}", first, last);
    }
    println!("Min GDP: ${}", format_usd(stats.min_gdp));
    println!("Max GDP: ${}", format_usd(stats.max_gdp));
    println!("Median GDP: ${}", format_usd(stats.median_gdp));
    if stats.quartiles.len() == 3 {
        println!(
            "Quartiles: ${} / ${} / ${}",
            format_usd(stats.quartiles[0]),
            format_usd(stats.quartiles[1]),
            format_usd(stats.quartiles[2])
        );
    }

    println!("\n=== Top {} economies ({}) ===", top, year);
    for (rank, (code, name, value)) in top_economies(&loaded.dataset, year, top).iter().enumerate()
    {
        println!("{:>3}. {} ({}): ${}", rank + 1, name, code, format_usd(*value));
    }

    Ok(())
}

/// Classement décroissant des économies pour une année
fn top_economies(
    dataset: &IndicatorDataset,
    year: i32,
    top: usize,
) -> Vec<(String, String, f64)> {
    let mut ranking: Vec<(String, String, f64)> = dataset
        .countries
        .values()
        .filter_map(|record| {
            record
                .gdp_by_year
                .get(&year)
                .map(|&v| (record.code.clone(), record.name.clone(), v))
        })
        .collect();

    // Tri décroissant par valeur, code croissant pour les égalités
    ranking.sort_by(|a, b| {
        b.2.partial_cmp(&a.2)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    ranking.truncate(top);
    ranking
}

/// Année effective: celle demandée si elle est couverte, sinon la
/// dernière disponible
fn resolve_year(requested: Option<i32>, dataset: &IndicatorDataset) -> Result<i32> {
    let Some((min_year, max_year)) = dataset.year_bounds() else {
        anyhow::bail!("Dataset has no usable years");
    };

    match requested {
        None => Ok(max_year),
        Some(y) if (min_year..=max_year).contains(&y) => Ok(y),
        Some(y) => anyhow::bail!(
            "Year {} out of range: dataset covers {} - {}",
            y,
            min_year,
            max_year
        ),
    }
}

/// Formate un montant USD avec séparateurs de milliers
fn format_usd(value: f64) -> String {
    let whole = value.round() as i128;
    let digits = whole.abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    if whole < 0 {
        format!("-{}", out)
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> IndicatorDataset {
        IndicatorDataset::from_str(
            r#"{
                "countries": {
                    "FRA": {"name": "France", "code": "FRA",
                            "gdp_by_year": {"2021": 2.96e12, "2023": 3.05e12}},
                    "USA": {"name": "United States", "code": "USA",
                            "gdp_by_year": {"2021": 2.37e13, "2023": 2.74e13}}
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_year_defaults_to_latest() {
        assert_eq!(resolve_year(None, &dataset()).unwrap(), 2023);
    }

    #[test]
    fn test_resolve_year_in_range() {
        assert_eq!(resolve_year(Some(2021), &dataset()).unwrap(), 2021);
        // 2022 est dans les bornes même si certains pays ont un trou
        assert_eq!(resolve_year(Some(2022), &dataset()).unwrap(), 2022);
    }

    #[test]
    fn test_resolve_year_out_of_range() {
        assert!(resolve_year(Some(1800), &dataset()).is_err());
        assert!(resolve_year(Some(2100), &dataset()).is_err());
    }

    #[test]
    fn test_resolve_year_empty_dataset() {
        let empty = IndicatorDataset::from_str(r#"{"countries": {}}"#).unwrap();
        assert!(resolve_year(None, &empty).is_err());
    }

    #[test]
    fn test_top_economies_ranking() {
        let ranking = top_economies(&dataset(), 2023, 10);
        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking[0].0, "USA");
        assert_eq!(ranking[1].0, "FRA");

        let only_one = top_economies(&dataset(), 2023, 1);
        assert_eq!(only_one.len(), 1);
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(1234567.0), "1,234,567");
        assert_eq!(format_usd(3.05e12), "3,050,000,000,000");
        assert_eq!(format_usd(999.0), "999");
    }
}
