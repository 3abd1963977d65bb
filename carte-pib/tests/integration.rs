//! Tests d'intégration: chaîne complète topologie → jointure → rendu

use carte_pib::{
    resolve, resolve_entries, AliasMap, ColorScheme, CountryIndex, GdpScale, IndicatorDataset,
    ReconcileReport, RenderOptions,
};

const TOPOLOGY: &str = r#"{
    "type": "Topology",
    "objects": {
        "countries": {
            "type": "GeometryCollection",
            "geometries": [
                {
                    "type": "Polygon",
                    "id": "840",
                    "properties": {"name": "United States of America"},
                    "arcs": [[0]]
                },
                {
                    "type": "Polygon",
                    "properties": {"name": "Atlantis"},
                    "arcs": [[1]]
                }
            ]
        }
    },
    "arcs": [
        [[-125, 25], [-70, 25], [-70, 49], [-125, 49], [-125, 25]],
        [[-40, -10], [-30, -10], [-30, 0], [-40, 0], [-40, -10]]
    ]
}"#;

const DATASET: &str = r#"{
    "metadata": {
        "statistics": {
            "min_gdp": 1e9,
            "max_gdp": 3e13,
            "median_gdp": 5e11,
            "quartiles": [1e10, 5e11, 4e12],
            "total_countries": 1
        }
    },
    "countries": {
        "US": {
            "name": "United States",
            "code": "US",
            "gdp_by_year": {"2023": 2.5e13}
        }
    }
}"#;

/// Exemple de bout en bout de la chaîne: alias → code → valeur → couleur
#[test]
fn test_usa_resolves_and_colors_near_high_end() {
    let features = topocarte::parse_str(TOPOLOGY, None).unwrap().features;
    let dataset = IndicatorDataset::from_str(DATASET).unwrap();
    let aliases = AliasMap::from_str(r#"{"United States of America": "US"}"#).unwrap();
    let index = CountryIndex::build(&dataset);

    // Réconciliation
    let resolution = resolve(&features[0], &aliases, &index);
    assert_eq!(resolution.iso_code.as_deref(), Some("US"));
    assert!(resolution.matched);

    // Jointure pour 2023
    let entries = resolve_entries(&features, &aliases, &index, &dataset, 2023);
    assert_eq!(entries[0].value, Some(2.5e13));

    // Échelle sur les statistiques du dataset: 2.5e13 dans [1e9, 3e13]
    // doit tomber près de l'extrémité haute du gradient
    let stats = dataset.statistics().unwrap();
    let scale = GdpScale::new(stats.min_gdp, stats.max_gdp, ColorScheme::Classic).unwrap();

    let t = scale.position(2.5e13).unwrap();
    assert!(t > 0.9, "t={}", t);

    let color = scale.color(2.5e13);
    assert!(color.b > color.r, "expected blue-dominant, got {:?}", color);
}

/// "Atlantis": sans alias, sans dataset, sans sous-chaîne → résultat
/// "pas de données" normal, rendu neutre, aucune panique
#[test]
fn test_atlantis_renders_neutral_without_error() {
    let features = topocarte::parse_str(TOPOLOGY, None).unwrap().features;
    let dataset = IndicatorDataset::from_str(DATASET).unwrap();
    let aliases = AliasMap::from_str(r#"{"United States of America": "US"}"#).unwrap();
    let index = CountryIndex::build(&dataset);

    let resolution = resolve(&features[1], &aliases, &index);
    assert_eq!(resolution.iso_code, None);
    assert!(!resolution.matched);

    let entries = resolve_entries(&features, &aliases, &index, &dataset, 2023);
    let stats = dataset.statistics().unwrap();
    let scale = GdpScale::new(stats.min_gdp, stats.max_gdp, ColorScheme::Classic).unwrap();

    let svg = carte_pib::render::render_svg(
        &features,
        &entries,
        &scale,
        &stats,
        &RenderOptions::default(),
        2023,
    );

    assert!(svg.contains(&format!(r#"fill="{}""#, scale.neutral().to_hex())));

    let report = ReconcileReport::from_entries(2023, &entries);
    assert_eq!(report.matched, 1);
    assert_eq!(report.unmatched, 1);
    assert_eq!(report.unmatched_names, vec!["Atlantis".to_string()]);
}

/// Dataset dégénéré (min == max): toutes les valeurs valides prennent
/// la couleur de départ du gradient
#[test]
fn test_degenerate_statistics_render_start_color() {
    let dataset = IndicatorDataset::from_str(
        r#"{
            "metadata": {
                "statistics": {"min_gdp": 1e9, "max_gdp": 1e9, "median_gdp": 1e9}
            },
            "countries": {
                "AAA": {"name": "Alpha", "code": "AAA", "gdp_by_year": {"2023": 1e9}},
                "BBB": {"name": "Beta", "code": "BBB", "gdp_by_year": {"2023": 1e9}}
            }
        }"#,
    )
    .unwrap();

    let stats = dataset.statistics().unwrap();
    let scale = GdpScale::new(stats.min_gdp, stats.max_gdp, ColorScheme::RedBlue).unwrap();

    let (start, _) = ColorScheme::RedBlue.endpoints();
    assert_eq!(scale.color(1e9), start);
    assert_eq!(scale.color(5e12), start);
}

/// La surface d'interaction expose (code, valeur) au survol
#[test]
fn test_surface_pick_exposes_selection() {
    use carte_pib::render::projection::Viewport;
    use carte_pib::render::surface::MapSurface;

    let features = topocarte::parse_str(TOPOLOGY, None).unwrap().features;
    let dataset = IndicatorDataset::from_str(DATASET).unwrap();
    let aliases = AliasMap::from_str(r#"{"United States of America": "US"}"#).unwrap();
    let index = CountryIndex::build(&dataset);
    let entries = resolve_entries(&features, &aliases, &index, &dataset, 2023);

    let viewport = Viewport::new(960, 500);
    let surface = MapSurface::build(&features, &entries, &viewport);

    // Milieu des États-Unis (~97°W, 38°N)
    let (x, y) = viewport.project(-97.0, 38.0);
    let selection = surface.pick(x, y).expect("USA under cursor");
    assert_eq!(selection.iso_code.as_deref(), Some("US"));
    assert_eq!(selection.value, Some(2.5e13));

    // Océan: aucune sélection
    assert!(surface.pick(5.0, 5.0).is_none());
}

/// L'année sélectionnée contrôle la jointure: un trou dans la série se
/// résout en "pas de données", jamais en zéro
#[test]
fn test_year_change_recomputes_join() {
    let features = topocarte::parse_str(TOPOLOGY, None).unwrap().features;
    let dataset = IndicatorDataset::from_str(DATASET).unwrap();
    let aliases = AliasMap::from_str(r#"{"United States of America": "US"}"#).unwrap();
    let index = CountryIndex::build(&dataset);

    let entries_2023 = resolve_entries(&features, &aliases, &index, &dataset, 2023);
    assert_eq!(entries_2023[0].value, Some(2.5e13));

    let entries_1990 = resolve_entries(&features, &aliases, &index, &dataset, 1990);
    assert!(entries_1990[0].matched);
    assert_eq!(entries_1990[0].value, None);
}
