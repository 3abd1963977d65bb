//! Réconciliation d'identité entre géométries et dataset
//!
//! Chaque feature de la topologie est résolue vers un code ISO du
//! dataset par une chaîne de règles ordonnée et déterministe: la
//! première règle qui produit un code gagne, sans retour en arrière.
//! L'absence de correspondance est un résultat normal ("pas de
//! données"), pas une erreur.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::alias::AliasMap;
use crate::dataset::IndicatorDataset;

/// Règle ayant produit une résolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchRule {
    /// Entrée exacte de la table d'alias
    Alias,
    /// Id numérique de la feature présent comme clé du dataset
    NumericId,
    /// Nom canonique exact (sensible à la casse)
    ExactName,
    /// Nom canonique insensible à la casse
    CaseInsensitiveName,
    /// Inclusion de sous-chaîne, premier match en ordre ISO croissant
    Substring,
}

impl MatchRule {
    /// Libellé pour le rapport
    pub fn label(self) -> &'static str {
        match self {
            MatchRule::Alias => "alias",
            MatchRule::NumericId => "numeric_id",
            MatchRule::ExactName => "exact_name",
            MatchRule::CaseInsensitiveName => "case_insensitive",
            MatchRule::Substring => "substring",
        }
    }
}

/// Résultat de la résolution d'une feature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Code ISO résolu, `None` si aucune règle ne matche
    pub iso_code: Option<String>,

    /// `true` dès qu'une règle a produit un code
    pub matched: bool,

    /// Règle gagnante (pour le rapport)
    pub rule: Option<MatchRule>,
}

impl Resolution {
    fn unmatched() -> Self {
        Self {
            iso_code: None,
            matched: false,
            rule: None,
        }
    }

    fn matched(code: impl Into<String>, rule: MatchRule) -> Self {
        Self {
            iso_code: Some(code.into()),
            matched: true,
            rule: Some(rule),
        }
    }
}

/// Jointure feature ↔ dataset pour une année donnée, recalculée à
/// chaque changement d'année
#[derive(Debug, Clone)]
pub struct ResolvedEntry {
    /// Index de la feature dans la liste d'entrée
    pub feature: usize,

    /// Nom d'affichage de la feature
    pub display_name: String,

    /// Code ISO résolu
    pub iso_code: Option<String>,

    /// Valeur pour l'année sélectionnée; trou → `None`
    pub value: Option<f64>,

    pub matched: bool,

    /// Règle gagnante
    pub rule: Option<MatchRule>,
}

/// Index des pays du dataset, construit une fois par dataset.
///
/// L'ordre interne suit les codes ISO croissants (itération du
/// `BTreeMap` source): c'est ce qui rend la règle de sous-chaîne
/// déterministe quand plusieurs noms canoniques pourraient matcher.
#[derive(Debug)]
pub struct CountryIndex {
    /// Codes ISO en ordre croissant
    codes: Vec<String>,

    /// Noms canoniques, parallèles à `codes`
    names: Vec<String>,

    /// Noms canoniques en minuscules, parallèles à `codes`
    names_lower: Vec<String>,

    by_name: HashMap<String, usize>,
    by_name_lower: HashMap<String, usize>,
    by_code: HashMap<String, usize>,
}

impl CountryIndex {
    /// Construit l'index depuis un dataset
    pub fn build(dataset: &IndicatorDataset) -> Self {
        let n = dataset.countries.len();
        let mut index = CountryIndex {
            codes: Vec::with_capacity(n),
            names: Vec::with_capacity(n),
            names_lower: Vec::with_capacity(n),
            by_name: HashMap::with_capacity(n),
            by_name_lower: HashMap::with_capacity(n),
            by_code: HashMap::with_capacity(n),
        };

        // BTreeMap: itération en ordre ISO croissant
        for (code, record) in &dataset.countries {
            let i = index.codes.len();
            index.codes.push(code.clone());
            index.names.push(record.name.clone());
            index.names_lower.push(record.name.to_lowercase());
            index.by_name.entry(record.name.clone()).or_insert(i);
            index
                .by_name_lower
                .entry(record.name.to_lowercase())
                .or_insert(i);
            index.by_code.insert(code.clone(), i);
        }

        index
    }

    /// Le code est-il une clé du dataset?
    pub fn contains_code(&self, code: &str) -> bool {
        self.by_code.contains_key(code)
    }

    /// Nombre de pays indexés
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Premier pays (ordre ISO croissant) dont le nom contient la
    /// sous-chaîne, ou l'inverse
    fn scan_substring(&self, needle: &str) -> Option<usize> {
        self.names_lower
            .iter()
            .position(|name| name.contains(needle) || needle.contains(name.as_str()))
    }
}

/// Résout l'identité d'une feature par la chaîne de règles ordonnée.
///
/// Pure et idempotente: deux appels sur les mêmes entrées produisent
/// le même résultat.
pub fn resolve(
    feature: &topocarte::Feature,
    aliases: &AliasMap,
    index: &CountryIndex,
) -> Resolution {
    // 1. Alias curé exact (seul un code non vide engage la résolution)
    if let Some(code) = aliases.resolve(&feature.display_name) {
        if !code.is_empty() {
            return Resolution::matched(code, MatchRule::Alias);
        }
    }

    // 2. Id numérique présent comme clé legacy du dataset
    if let Some(id) = &feature.numeric_id {
        if index.contains_code(id) {
            return Resolution::matched(id.clone(), MatchRule::NumericId);
        }
    }

    // 3. Nom canonique exact
    if let Some(&i) = index.by_name.get(&feature.display_name) {
        return Resolution::matched(index.codes[i].clone(), MatchRule::ExactName);
    }

    // 4. Nom canonique insensible à la casse
    let lowered = feature.display_name.to_lowercase();
    if let Some(&i) = index.by_name_lower.get(&lowered) {
        return Resolution::matched(index.codes[i].clone(), MatchRule::CaseInsensitiveName);
    }

    // 5. Inclusion de sous-chaîne, volontairement laxiste: premier
    // match en ordre ISO croissant (ambigu pour "Congo" par exemple,
    // comportement documenté et conservé tel quel)
    let trimmed = lowered.trim();
    if !trimmed.is_empty() {
        if let Some(i) = index.scan_substring(trimmed) {
            return Resolution::matched(index.codes[i].clone(), MatchRule::Substring);
        }
    }

    Resolution::unmatched()
}

/// Joint toutes les features au dataset pour une année donnée.
///
/// L'ordre de sortie suit l'ordre des features; le calcul par feature
/// est indépendant et parallélisé.
pub fn resolve_entries(
    features: &[topocarte::Feature],
    aliases: &AliasMap,
    index: &CountryIndex,
    dataset: &IndicatorDataset,
    year: i32,
) -> Vec<ResolvedEntry> {
    features
        .par_iter()
        .enumerate()
        .map(|(i, feature)| {
            let resolution = resolve(feature, aliases, index);
            let value = resolution
                .iso_code
                .as_deref()
                .and_then(|code| dataset.value_for(code, year));

            ResolvedEntry {
                feature: i,
                display_name: feature.display_name.clone(),
                iso_code: resolution.iso_code,
                value,
                matched: resolution.matched,
                rule: resolution.rule,
            }
        })
        .collect()
}
