//! Extraction configuration.
//!
//! Most extraction rules are fixed pattern tables. The parts that are known to
//! be incomplete (which capitalized words may never be taken as a patient name,
//! narrative size cap, whether header heuristics run at all) live here so they
//! can be tuned per installation without touching the tables.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "laudo-ocr";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum characters kept for a narrative section (findings, conclusions).
pub const DEFAULT_SECTION_MAX_CHARS: usize = 2000;

/// Words that show up capitalized on ultrasound overlays and form headers and
/// must never be mistaken for the patient name.
const DEFAULT_NAME_DENYLIST: &[&str] = &[
    // Instrument header / vendor
    "PDA", "BLESS", "GTG", "AFFINITI", "PHILIPS", "HGEN", "DIST", "IND",
    // Measurement abbreviations
    "LA", "IVS", "LV", "EDV", "ESV", "FS", "EF", "PV", "MV", "TV", "AV",
    "TAPSE", "FAC", "RAP", "MM", "TEICH", "SIMPSON", "AORTIC", "LEFT", "RIGHT",
    "LVIDD", "LVIDS", "IVSD", "IVSS", "LVPWD", "LVPWS", "LVFWD", "LVFWS",
    "EPSS", "MAPSE", "TRIV", "VMAX", "VEL", "MAX", "ATRIAL", "AREA", "LENGTH",
    "VOLUME", "BPM",
    // Form and report words
    "EXAME", "DATA", "LAUDO", "NOME", "PACIENTE", "ANIMAL", "TUTOR", "DONO",
    "TELEFONE", "CELULAR", "WHATSAPP", "FONE", "EMAIL", "SEXO", "IDADE", "PESO",
    "TIPO", "BREED", "AGE", "WEIGHT", "MACHO", "FEMEA", "FEMALE", "MALE",
    "CANINO", "FELINO", "CAN", "FEL", "FELINE", "GATO", "ACHADOS", "FINDINGS",
    "CONCLUSION", "CONCLUSOES",
];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error reading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tunable parts of the extraction rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Capitalized words that the name heuristic must skip (case-insensitive).
    pub name_denylist: Vec<String>,
    /// Words accepted as a name even when they are also denylisted.
    pub name_allowlist: Vec<String>,
    /// Character cap for each narrative section.
    pub section_max_chars: usize,
    /// Run the instrument-header heuristics for fields still empty.
    pub fallback_heuristics: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            name_denylist: DEFAULT_NAME_DENYLIST.iter().map(|s| s.to_string()).collect(),
            name_allowlist: Vec::new(),
            section_max_chars: DEFAULT_SECTION_MAX_CHARS,
            fallback_heuristics: true,
        }
    }
}

impl ExtractionConfig {
    /// Load a config from a JSON file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&raw)?;
        tracing::debug!(
            path = %path.display(),
            denylist = config.name_denylist.len(),
            allowlist = config.name_allowlist.len(),
            "Loaded extraction config"
        );
        Ok(config)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Extend the denylist.
    pub fn with_denied_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.name_denylist.extend(names.into_iter().map(Into::into));
        self
    }

    /// Extend the allowlist.
    pub fn with_allowed_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.name_allowlist.extend(names.into_iter().map(Into::into));
        self
    }

    /// Build the case-folded lookup table used by the name heuristic.
    pub fn name_filter(&self) -> NameFilter {
        NameFilter {
            denied: self.name_denylist.iter().map(|w| w.to_uppercase()).collect(),
            allowed: self.name_allowlist.iter().map(|w| w.to_uppercase()).collect(),
        }
    }

    pub fn is_name_denied(&self, word: &str) -> bool {
        self.name_filter().is_denied(word)
    }
}

/// Upper-cased deny/allow sets, built once per extractor.
#[derive(Debug, Clone, Default)]
pub struct NameFilter {
    denied: HashSet<String>,
    allowed: HashSet<String>,
}

impl NameFilter {
    /// Add words to the denied set. The allowlist still takes precedence.
    pub fn deny<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.denied
            .extend(words.into_iter().map(|w| w.as_ref().to_uppercase()));
    }

    pub fn is_denied(&self, word: &str) -> bool {
        let upper = word.to_uppercase();
        self.denied.contains(&upper) && !self.allowed.contains(&upper)
    }
}

/// Default `tracing` filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> String {
    "info,laudo_ocr=debug".to_string()
}
