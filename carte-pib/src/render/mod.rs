//! Rendu SVG de la carte choroplèthe
//!
//! Un `<path>` par feature, rempli par l'échelle de couleurs (neutre
//! pour les régions non appariées ou sans valeur), plus une légende à
//! gradient avec repères min / médiane / max. Le SVG produit est aussi
//! le format d'export de la carte.

pub mod projection;
pub mod surface;

use std::fmt::Write as _;

use geo::{Geometry, LineString, Polygon};

use crate::config::RenderOptions;
use crate::dataset::DatasetStatistics;
use crate::reconcile::ResolvedEntry;
use crate::scale::GdpScale;
use projection::Viewport;

/// Rend la carte complète en SVG.
///
/// `entries` doit être parallèle à `features` (sortie de
/// `resolve_entries`). Une feature non appariée est rendue en couleur
/// neutre, jamais en erreur.
pub fn render_svg(
    features: &[topocarte::Feature],
    entries: &[ResolvedEntry],
    scale: &GdpScale,
    stats: &DatasetStatistics,
    options: &RenderOptions,
    year: i32,
) -> String {
    let viewport = Viewport::new(options.width, options.height);
    let mut svg = String::with_capacity(features.len() * 256);

    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = options.width,
        h = options.height
    );
    svg.push('\n');

    for entry in entries {
        let Some(feature) = features.get(entry.feature) else {
            continue;
        };

        let path = geometry_path(&feature.geometry, &viewport);
        if path.is_empty() {
            continue;
        }

        let fill = if entry.matched {
            scale.color_opt(entry.value)
        } else {
            options.neutral
        };

        let _ = write!(
            svg,
            r#"<path class="country" d="{}" fill="{}" stroke="{}" stroke-width="{}">"#,
            path,
            fill.to_hex(),
            options.stroke.to_hex(),
            options.stroke_width
        );
        let _ = write!(svg, "<title>{}</title>", tooltip(entry));
        svg.push_str("</path>\n");
    }

    if options.legend {
        render_legend(&mut svg, scale, stats, options, year);
    }

    svg.push_str("</svg>\n");
    svg
}

/// Infobulle native SVG: nom, code et valeur formatée
fn tooltip(entry: &ResolvedEntry) -> String {
    match (&entry.iso_code, entry.value) {
        (Some(code), Some(value)) => format!(
            "{} ({}): ${}",
            escape_xml(&entry.display_name),
            escape_xml(code),
            format_value_short(value)
        ),
        (Some(code), None) => format!(
            "{} ({}): no data",
            escape_xml(&entry.display_name),
            escape_xml(code)
        ),
        _ => format!("{}: no data", escape_xml(&entry.display_name)),
    }
}

/// Légende: gradient 10 crans + repères min / médiane / max
fn render_legend(
    svg: &mut String,
    scale: &GdpScale,
    stats: &DatasetStatistics,
    options: &RenderOptions,
    year: i32,
) {
    const LEGEND_WIDTH: f64 = 200.0;

    let _ = write!(
        svg,
        r#"<defs><linearGradient id="legend-gradient" x1="0%" x2="100%">"#
    );
    for i in 0..=10 {
        let t = i as f64 / 10.0;
        let _ = write!(
            svg,
            r#"<stop offset="{}%" stop-color="{}"/>"#,
            i * 10,
            scale.color_at(t).to_hex()
        );
    }
    svg.push_str("</linearGradient></defs>\n");

    let x0 = options.width as f64 - 250.0;
    let y0 = options.height as f64 - 120.0;
    let _ = write!(svg, r#"<g class="legend" transform="translate({}, {})">"#, x0, y0);
    let _ = write!(
        svg,
        r##"<rect width="{}" height="20" fill="url(#legend-gradient)" stroke="#333" stroke-width="1"/>"##,
        LEGEND_WIDTH
    );

    // Repères aux valeurs remarquables du dataset
    for &value in &[stats.min_gdp, stats.median_gdp, stats.max_gdp] {
        let Some(t) = scale.position(value) else {
            continue;
        };
        let x = t * LEGEND_WIDTH;
        let _ = write!(
            svg,
            r##"<line x1="{x:.1}" x2="{x:.1}" y1="20" y2="25" stroke="#333" stroke-width="1"/>"##
        );
        let _ = write!(
            svg,
            r##"<text x="{x:.1}" y="38" text-anchor="middle" font-size="11" fill="#333">{}</text>"##,
            format_value_short(value)
        );
    }

    let _ = write!(
        svg,
        r##"<text x="100" y="-8" text-anchor="middle" font-size="14" font-weight="bold" fill="#333">PIB (USD)</text>"##
    );
    let _ = write!(
        svg,
        r##"<text x="100" y="55" text-anchor="middle" font-size="10" fill="#666">{} pays &#8226; {}</text>"##,
        stats.total_countries, year
    );
    svg.push_str("</g>\n");
}

/// Chemin SVG d'une géométrie projetée
fn geometry_path(geometry: &Geometry, viewport: &Viewport) -> String {
    match geometry {
        Geometry::Polygon(polygon) => polygon_path(polygon, viewport),
        Geometry::MultiPolygon(mp) => {
            let mut path = String::new();
            for polygon in &mp.0 {
                path.push_str(&polygon_path(polygon, viewport));
            }
            path
        }
        // Le parser topologique ne produit que des (Multi)Polygon
        _ => String::new(),
    }
}

fn polygon_path(polygon: &Polygon, viewport: &Viewport) -> String {
    let mut path = ring_path(polygon.exterior(), viewport);
    for interior in polygon.interiors() {
        path.push_str(&ring_path(interior, viewport));
    }
    path
}

fn ring_path(ring: &LineString, viewport: &Viewport) -> String {
    let mut path = String::with_capacity(ring.0.len() * 16);

    for (i, coord) in ring.0.iter().enumerate() {
        let (x, y) = viewport.project(coord.x, coord.y);
        let command = if i == 0 { 'M' } else { 'L' };
        let _ = write!(path, "{}{:.2},{:.2}", command, x, y);
    }
    path.push('Z');
    path
}

/// Formate une valeur en USD courts: 4.5e11 → "450B", 2.5e13 → "25T"
fn format_value_short(value: f64) -> String {
    let billions = value / 1e9;
    if billions >= 1000.0 {
        format!("{:.0}T", billions / 1000.0)
    } else if billions >= 1.0 {
        format!("{:.0}B", billions)
    } else {
        format!("{:.0}M", billions * 1000.0)
    }
}

/// Échappe un texte pour un attribut ou un nœud XML
fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}
