//! Table d'alias: noms de la source géométrique → codes ISO
//!
//! Les overrides curés pour les noms qui diffèrent entre la topologie
//! et le dataset ("United States of America" → "USA"). La recherche
//! est exacte et sensible à la casse; statique après chargement.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dataset::DatasetError;

/// Table d'alias embarquée par défaut
const DEFAULT_ALIASES: &str = include_str!("presets/aliases.json");

/// Mapping plat nom d'affichage → code ISO
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct AliasMap {
    entries: BTreeMap<String, String>,
}

impl AliasMap {
    /// Table vide (aucun override)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse une table d'alias depuis son contenu JSON
    pub fn from_str(input: &str) -> Result<Self, DatasetError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Charge une table d'alias depuis un fichier
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Table curée embarquée par défaut
    pub fn default_embedded() -> Self {
        Self::from_str(DEFAULT_ALIASES).expect("embedded alias map is valid")
    }

    /// Résolution exacte, sensible à la casse
    pub fn resolve(&self, display_name: &str) -> Option<&str> {
        self.entries.get(display_name).map(String::as_str)
    }

    /// Ajoute ou remplace un alias
    pub fn insert(&mut self, display_name: impl Into<String>, code: impl Into<String>) {
        self.entries.insert(display_name.into(), code.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
