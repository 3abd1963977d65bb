//! Rapport de réconciliation
//!
//! Ce module fournit des structures pour collecter et afficher le
//! résultat de la jointure géométrie ↔ dataset: combien de pays
//! appariés, par quelle règle, et lesquels restent sans données.
//! Une feature non appariée n'est pas une erreur.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::reconcile::ResolvedEntry;

/// Rapport complet d'une passe de réconciliation
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileReport {
    /// Année sélectionnée
    pub year: i32,

    /// Nombre total de features de la topologie
    pub total_features: usize,

    /// Features appariées à un code ISO
    pub matched: usize,

    /// Features sans correspondance (rendues en neutre)
    pub unmatched: usize,

    /// Features appariées mais sans valeur pour l'année (trou)
    pub missing_value: usize,

    /// Nombre de matches par règle de résolution
    pub by_rule: HashMap<String, usize>,

    /// Noms d'affichage restés sans correspondance
    pub unmatched_names: Vec<String>,
}

impl ReconcileReport {
    /// Crée un rapport vide pour une année
    pub fn new(year: i32) -> Self {
        Self {
            year,
            ..Default::default()
        }
    }

    /// Construit le rapport d'une passe complète
    pub fn from_entries(year: i32, entries: &[ResolvedEntry]) -> Self {
        let mut report = Self::new(year);
        for entry in entries {
            report.record(entry);
        }
        report
    }

    /// Enregistre une entrée résolue
    pub fn record(&mut self, entry: &ResolvedEntry) {
        self.total_features += 1;

        if entry.matched {
            self.matched += 1;
            if let Some(rule) = entry.rule {
                *self.by_rule.entry(rule.label().to_string()).or_default() += 1;
            }
            if entry.value.is_none() {
                self.missing_value += 1;
            }
        } else {
            self.unmatched += 1;
            self.unmatched_names.push(entry.display_name.clone());
        }
    }

    /// Taux d'appariement, entre 0 et 1
    pub fn match_ratio(&self) -> f64 {
        if self.total_features == 0 {
            return 0.0;
        }
        self.matched as f64 / self.total_features as f64
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("RECONCILE REPORT - Year {}", self.year);
        println!("{}", "=".repeat(60));

        println!(
            "\nMatched: {}/{} features ({:.0}%)",
            self.matched,
            self.total_features,
            self.match_ratio() * 100.0
        );
        if self.missing_value > 0 {
            println!("Matched without value for {}: {}", self.year, self.missing_value);
        }

        if !self.by_rule.is_empty() {
            println!("\n--- BY RULE ---");
            let mut rules: Vec<_> = self.by_rule.iter().collect();
            rules.sort_by_key(|(k, _)| k.as_str());
            for (rule, count) in rules {
                println!("  {}: {}", rule, count);
            }
        }

        if !self.unmatched_names.is_empty() {
            println!("\n--- UNMATCHED ({}) ---", self.unmatched_names.len());
            for name in self.unmatched_names.iter().take(20) {
                println!("  {}", name);
            }
            if self.unmatched_names.len() > 20 {
                println!("  ... and {} more", self.unmatched_names.len() - 20);
            }
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{}: {}/{} matched, {} unmatched, {} without value",
            self.year, self.matched, self.total_features, self.unmatched, self.missing_value
        )
    }
}
