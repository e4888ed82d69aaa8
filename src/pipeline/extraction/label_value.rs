//! Label → number extraction.
//!
//! Ultrasound overlays and typed reports print a label followed by a value
//! ("LVIDd 3,21 cm", "IVSd: 0.45cm", "FS (MM-Teich) 38 %"). OCR frequently
//! mangles the decimal separator, so after a label match the value is tried
//! against an ordered cascade of number shapes. Label order is priority order:
//! the first label that yields a number wins.

use regex::Regex;

use super::normalize::normalize_number;

/// Number shapes tried after a label, in priority order:
/// decimal point or comma ("0.409", "2,01"), space/comma/dot between two digit
/// runs ("0 409"), then a bare integer ("38").
pub const NUMERIC_CASCADE: [&str; 3] = [
    r"(\d+[,.]\d*)",
    r"(\d+[\s,.]\d+)",
    r"(\d+[,.]?\d*)",
];

/// Separator allowed between a label and its value.
const LABEL_SEPARATOR: &str = r"[\s:=\-]*";

/// Unit tokens that may trail a measurement.
pub const DEFAULT_UNIT_SUFFIX: &str = r"(?:cm|mm|%|ml|cm²|cm/s|mmHg|m/s|g)?";

/// Unit suffix for pressure gradients.
pub const GRADIENT_UNIT_SUFFIX: &str = r"(?:mmHg)?";

/// One label synonym with its compiled cascade.
#[derive(Debug, Clone)]
struct LabelCascade {
    label: String,
    patterns: Vec<Regex>,
}

/// Compiled extractor for one field: every synonym crossed with every cascade
/// shape, kept in priority order.
#[derive(Debug, Clone)]
pub struct LabelValueExtractor {
    cascades: Vec<LabelCascade>,
}

impl LabelValueExtractor {
    /// Compile with the default unit suffix.
    pub fn new<S: AsRef<str>>(labels: &[S]) -> Result<Self, regex::Error> {
        Self::with_units(labels, DEFAULT_UNIT_SUFFIX)
    }

    /// Compile with a caller-chosen unit suffix regex.
    pub fn with_units<S: AsRef<str>>(labels: &[S], unit_suffix: &str) -> Result<Self, regex::Error> {
        let cascades = labels
            .iter()
            .map(|label| {
                let label = label.as_ref();
                let patterns = NUMERIC_CASCADE
                    .iter()
                    .map(|number| Regex::new(&label_pattern(label, number, unit_suffix)))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(LabelCascade {
                    label: label.to_string(),
                    patterns,
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;

        Ok(Self { cascades })
    }

    /// Synonyms in priority order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.cascades.iter().map(|c| c.label.as_str())
    }

    /// Value for the first label/shape combination that matches, normalized to
    /// dot-decimal. Empty string when nothing matches.
    pub fn extract(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return String::new();
        }
        self.extract_flat(&flatten_lines(text))
    }

    /// Same as [`extract`](Self::extract) for text whose line breaks are
    /// already flattened to spaces.
    pub(crate) fn extract_flat(&self, flat: &str) -> String {
        for cascade in &self.cascades {
            for pattern in &cascade.patterns {
                let captured = pattern
                    .captures(flat)
                    .and_then(|caps| caps.get(1))
                    .map(|m| m.as_str())
                    .filter(|value| !value.is_empty());

                if let Some(value) = captured {
                    return normalize_number(value);
                }
            }
        }
        String::new()
    }
}

/// One-shot extraction without a precompiled table.
/// `units` defaults to [`DEFAULT_UNIT_SUFFIX`]. An invalid unit regex is
/// treated as "no match" rather than an error.
pub fn extract_number_after_labels(text: &str, labels: &[&str], units: Option<&str>) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    match LabelValueExtractor::with_units(labels, units.unwrap_or(DEFAULT_UNIT_SUFFIX)) {
        Ok(extractor) => extractor.extract(text),
        Err(e) => {
            tracing::warn!(error = %e, "Rejected label/unit pattern, skipping field");
            String::new()
        }
    }
}

pub(crate) fn flatten_lines(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

/// `(?i)` + label + separator + number shape + optional unit.
/// Labels starting with a word character are anchored on a word boundary so a
/// short label ("AE", "E:") never matches inside a longer word.
fn label_pattern(label: &str, number: &str, unit_suffix: &str) -> String {
    let boundary = match label.chars().next() {
        Some(c) if c.is_alphanumeric() || c == '_' => r"\b",
        _ => "",
    };
    format!(
        r"(?i){boundary}{}{LABEL_SEPARATOR}{number}\s*{unit_suffix}",
        regex::escape(label)
    )
}
