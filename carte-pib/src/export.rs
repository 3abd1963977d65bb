//! Export de la jointure résolue vers GeoJSON avec geozero (streaming)

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use geozero::geojson::GeoJsonWriter;
use geozero::GeozeroGeometry;

use crate::reconcile::ResolvedEntry;

/// Exporte les features et leur jointure en GeoJSON (streaming).
///
/// `entries` doit être parallèle à `features` (sortie de
/// `resolve_entries`).
pub fn export_resolved(
    features: &[topocarte::Feature],
    entries: &[ResolvedEntry],
    year: i32,
    output_path: &Path,
) -> Result<()> {
    let file = File::create(output_path)
        .context(format!("Failed to create file: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);

    // Header FeatureCollection avec CRS (les données sont en WGS84)
    write!(
        writer,
        r#"{{"type":"FeatureCollection","crs":{{"type":"name","properties":{{"name":"urn:ogc:def:crs:EPSG::4326"}}}},"features":["#
    )?;

    let mut first = true;
    for entry in entries {
        let Some(feature) = features.get(entry.feature) else {
            continue;
        };
        if !first {
            write!(writer, ",")?;
        }
        first = false;
        write_feature(&mut writer, feature, entry, year)?;
    }

    write!(writer, "]}}")?;
    writer.flush()?;

    Ok(())
}

/// Écrit une feature résolue en GeoJSON
fn write_feature<W: Write>(
    writer: &mut W,
    feature: &topocarte::Feature,
    entry: &ResolvedEntry,
    year: i32,
) -> Result<()> {
    write!(writer, r#"{{"type":"Feature","#)?;

    // Geometry via geozero (streaming, zero-copy)
    write!(writer, r#""geometry":"#)?;
    let mut geom_buf = Vec::new();
    let mut geom_writer = GeoJsonWriter::new(&mut geom_buf);
    feature.geometry.process_geom(&mut geom_writer)?;
    writer.write_all(&geom_buf)?;

    // Properties de la jointure
    write!(
        writer,
        r#","properties":{{"name":"{}""#,
        escape_json(&feature.display_name)
    )?;

    match &entry.iso_code {
        Some(code) => write!(writer, r#","iso_code":"{}""#, escape_json(code))?,
        None => write!(writer, r#","iso_code":null"#)?,
    }

    write!(writer, r#","matched":{}"#, entry.matched)?;

    match entry.value {
        Some(value) => write!(writer, r#","gdp":{}"#, value)?,
        None => write!(writer, r#","gdp":null"#)?,
    }

    write!(writer, r#","year":{}}}}}"#, year)?;

    Ok(())
}

/// Échappe une chaîne pour JSON
fn escape_json(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => {
                result.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::MatchRule;
    use geo::{Coord, Geometry, LineString, Polygon};
    use std::io::Cursor;

    fn square_feature(name: &str) -> topocarte::Feature {
        let ring = LineString::new(vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 1.0, y: 0.0 },
            Coord { x: 1.0, y: 1.0 },
            Coord { x: 0.0, y: 1.0 },
            Coord { x: 0.0, y: 0.0 },
        ]);
        topocarte::Feature {
            display_name: name.to_string(),
            numeric_id: None,
            geometry: Geometry::Polygon(Polygon::new(ring, vec![])),
        }
    }

    #[test]
    fn test_write_feature_matched() {
        let feature = square_feature("France");
        let entry = ResolvedEntry {
            feature: 0,
            display_name: "France".to_string(),
            iso_code: Some("FRA".to_string()),
            value: Some(3.05e12),
            matched: true,
            rule: Some(MatchRule::ExactName),
        };

        let mut buffer = Cursor::new(Vec::new());
        write_feature(&mut buffer, &feature, &entry, 2023).unwrap();

        let json = String::from_utf8(buffer.into_inner()).unwrap();
        assert!(json.contains(r#""type":"Feature""#));
        assert!(json.contains(r#""iso_code":"FRA""#));
        assert!(json.contains(r#""matched":true"#));
        assert!(json.contains(r#""gdp":3050000000000"#));
        assert!(json.contains(r#""year":2023"#));
        assert!(json.contains("coordinates"));
    }

    #[test]
    fn test_write_feature_unmatched_has_nulls() {
        let feature = square_feature("Atlantis");
        let entry = ResolvedEntry {
            feature: 0,
            display_name: "Atlantis".to_string(),
            iso_code: None,
            value: None,
            matched: false,
            rule: None,
        };

        let mut buffer = Cursor::new(Vec::new());
        write_feature(&mut buffer, &feature, &entry, 2023).unwrap();

        let json = String::from_utf8(buffer.into_inner()).unwrap();
        assert!(json.contains(r#""iso_code":null"#));
        assert!(json.contains(r#""matched":false"#));
        assert!(json.contains(r#""gdp":null"#));
    }

    #[test]
    fn test_escape_json() {
        assert_eq!(escape_json("hello"), "hello");
        assert_eq!(escape_json("hello\"world"), "hello\\\"world");
        assert_eq!(escape_json("line\nbreak"), "line\\nbreak");
    }

    #[test]
    fn test_export_resolved_writes_collection() {
        let features = vec![square_feature("France")];
        let entries = vec![ResolvedEntry {
            feature: 0,
            display_name: "France".to_string(),
            iso_code: Some("FRA".to_string()),
            value: Some(3.05e12),
            matched: true,
            rule: Some(MatchRule::ExactName),
        }];

        let temp_dir = std::env::temp_dir();
        let output_path = temp_dir.join("test_carte_pib_export.geojson");

        export_resolved(&features, &entries, 2023, &output_path).unwrap();

        let content = std::fs::read_to_string(&output_path).unwrap();
        assert!(content.contains(r#""type":"FeatureCollection""#));
        assert!(content.contains("EPSG::4326"));
        assert!(content.contains(r#""iso_code":"FRA""#));

        // Le document produit doit être du JSON valide
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["features"].as_array().unwrap().len(), 1);

        std::fs::remove_file(output_path).ok();
    }
}
