//! Patient identity fields from scanned forms and instrument headers.
//!
//! Each field is an ordered list of patterns run against a lower-cased copy of
//! the text; the first non-empty capture wins. When a field is still empty,
//! header heuristics look at the original-cased text: ultrasound overlays print
//! compact tokens such as `PDA, BLESS, CAN, F, N... 11738`.

use std::sync::LazyLock;

use regex::Regex;

use super::measurements::MeasurementCategory;
use super::normalize::{collapse_whitespace, normalize_number, title_case};
use super::sections::NarrativeSection;
use super::types::PatientRecord;
use crate::config::{ExtractionConfig, NameFilter};

/// Letters admitted in Portuguese names and free-text values.
const LETTERS: &str = "a-záàâãéêíóôõúüç";

/// Age units, longest alternatives first.
const AGE_UNITS: &str = r"(?:anos?|meses|m[eê]s|years?|months?)";

fn compile<S: AsRef<str>>(patterns: &[S]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p.as_ref()).expect("Invalid patient field pattern"))
        .collect()
}

// ═══════════════════════════════════════════════════════════
// Primary patterns (lower-cased text)
// ═══════════════════════════════════════════════════════════

static NAME_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        format!(
            r"(?i)\b(?:nome\s+do\s+paciente|paciente|animal|nome)[\s:]+([{l}\s]+?)(?:\n|$|responsável|telefone|espécie)",
            l = LETTERS
        ),
        format!(r"(?i)\b(?:paciente|animal)[\s:]+([{l}\s]+?)(?:\n|$)", l = LETTERS),
    ])
});

static GUARDIAN_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        format!(
            r"(?i)\b(?:responsável|tutor|proprietário|dono|nome\s+do\s+responsável)[\s:]+([{l}\s]+?)(?:\n|$|telefone|e-?mail)",
            l = LETTERS
        ),
        format!(r"(?i)\b(?:responsável|tutor)[\s:]+([{l}\s]+?)(?:\n|$)", l = LETTERS),
    ])
});

/// Labelled digit run first, then any phone-shaped token.
static PHONE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)\b(?:telefone|whatsapp|celular|tel\.?|fone)[\s:]*([\d \t().\-]+)",
        r"\(?\d{2}\)?[ \-.]{0,2}\d{4,5}[ \-.]?\d{4}",
    ])
});

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\be-?mail[\s:]*([a-z0-9._%+\-]+@[a-z0-9.\-]+\.[a-z]{2,})")
        .expect("Invalid patient field pattern")
});

static SPECIES_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        format!(r"(?i)\b(?:espécie|especie|tipo)[\s:]*([{l}]+)", l = LETTERS),
        r"(?i)\b(canino|cão|cachorro|felino|gato)\b".to_string(),
    ])
});

static BREED_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:raça|raca|breed)[\s:]*([{l}\s]+?)(?:\n|$|sexo|idade|peso)",
        l = LETTERS
    ))
    .expect("Invalid patient field pattern")
});

/// Castrated forms come first so "macho castrado" is not cut to "macho".
static SEX_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        format!(
            r"(?i)\b(?:sexo|gênero|genero)[\s:]*([{l}]+(?:\s+castrad[oa])?)",
            l = LETTERS
        ),
        r"(?i)\b(macho\s+castrado|f[êe]mea\s+castrada|macho|f[êe]mea)\b".to_string(),
    ])
});

static AGE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        format!(r"(?i)\b(?:idade|age)[\s:]*(\d+\s*{AGE_UNITS})"),
        format!(r"(?i)\b(\d+\s*{AGE_UNITS})\b"),
    ])
});

static WEIGHT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)\b(?:peso|weight)[\s:]*(\d[\d,.]*)\s*(?:kg|kilogramas?)?",
        r"(?i)(\d+[,.]\d+)\s*kg\b",
    ])
});

// ═══════════════════════════════════════════════════════════
// Header heuristics (original-cased text)
// ═══════════════════════════════════════════════════════════

static HEADER_CANINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bCAN\b").expect("valid regex"));

static HEADER_FELINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:FEL|FELINE|GATO)\b").expect("valid regex"));

static HEADER_FEMALE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i),\s*F\s*,|\bF\s+[MN]\b|\bfemale\b").expect("valid regex")
});

static HEADER_MALE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i),\s*M\s*,|\bM\s+[FN]\b|\bmale\b").expect("valid regex")
});

static CAPITALIZED_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z][A-Za-z]{2,}\b").expect("valid regex"));

/// Words of three or more ASCII letters taken from measurement labels and
/// section headings. Report vocabulary is never a patient name.
static REPORT_VOCABULARY: LazyLock<Vec<String>> = LazyLock::new(|| {
    let labels = MeasurementCategory::ALL
        .iter()
        .flat_map(|c| c.fields())
        .flat_map(|f| f.labels.iter().copied());
    let headings = NarrativeSection::ALL
        .iter()
        .flat_map(|s| s.headings().iter().copied());

    let mut words: Vec<String> = labels
        .chain(headings)
        .flat_map(|label| label.split(|c: char| !c.is_ascii_alphabetic()))
        .filter(|w| w.len() >= 3)
        .map(str::to_uppercase)
        .collect();
    words.sort_unstable();
    words.dedup();
    words
});

// ═══════════════════════════════════════════════════════════
// Extractor
// ═══════════════════════════════════════════════════════════

/// Runs the nine patient field pipelines plus header fallbacks.
#[derive(Debug, Clone)]
pub struct PatientFieldExtractor {
    names: NameFilter,
    fallback_heuristics: bool,
}

impl Default for PatientFieldExtractor {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}

impl PatientFieldExtractor {
    pub fn new(config: &ExtractionConfig) -> Self {
        let mut names = config.name_filter();
        names.deny(REPORT_VOCABULARY.iter());
        Self {
            names,
            fallback_heuristics: config.fallback_heuristics,
        }
    }

    pub fn extract(&self, text: &str) -> PatientRecord {
        if text.trim().is_empty() {
            return PatientRecord::default();
        }

        let lower = text.trim().to_lowercase();
        let mut record = PatientRecord {
            name: first_capture(&NAME_PATTERNS, &lower)
                .map(|n| title_case(&n))
                .unwrap_or_default(),
            guardian: first_capture(&GUARDIAN_PATTERNS, &lower)
                .map(|n| title_case(&n))
                .unwrap_or_default(),
            guardian_phone: phone(&lower).unwrap_or_default(),
            guardian_email: capture(&EMAIL_PATTERN, &lower).unwrap_or_default(),
            species: first_capture(&SPECIES_PATTERNS, &lower)
                .map(|s| canonical_species(&s))
                .unwrap_or_default(),
            breed: capture(&BREED_PATTERN, &lower)
                .map(|b| title_case(&b))
                .unwrap_or_default(),
            sex: sex(&lower).unwrap_or_default().to_string(),
            age: first_capture(&AGE_PATTERNS, &lower).unwrap_or_default(),
            weight: first_capture(&WEIGHT_PATTERNS, &lower)
                .map(|w| normalize_number(&w))
                .unwrap_or_default(),
        };

        if self.fallback_heuristics {
            self.apply_header_fallbacks(text, &mut record);
        }

        record
    }

    /// Fill species, sex and name from instrument-header tokens. Only empty
    /// fields are touched.
    fn apply_header_fallbacks(&self, text: &str, record: &mut PatientRecord) {
        if record.species.is_empty() {
            if HEADER_CANINE.is_match(text) {
                record.species = "canino".into();
            } else if HEADER_FELINE.is_match(text) {
                record.species = "felino".into();
            }
        }

        if record.sex.is_empty() {
            if HEADER_FEMALE.is_match(text) {
                record.sex = "femea".into();
            } else if HEADER_MALE.is_match(text) {
                record.sex = "macho".into();
            }
        }

        if record.name.is_empty() {
            if let Some(word) = CAPITALIZED_WORD
                .find_iter(text)
                .map(|m| m.as_str())
                .find(|w| !self.names.is_denied(w))
            {
                record.name = title_case(word);
            }
        }
    }
}

/// Group 1 of the first pattern that yields a non-blank capture,
/// whitespace-collapsed.
fn first_capture(patterns: &[Regex], text: &str) -> Option<String> {
    patterns.iter().find_map(|p| capture(p, text))
}

fn capture(pattern: &Regex, text: &str) -> Option<String> {
    let caps = pattern.captures(text)?;
    let value = collapse_whitespace(caps.get(1)?.as_str());
    (!value.is_empty()).then_some(value)
}

fn phone(lower: &str) -> Option<String> {
    PHONE_PATTERNS.iter().find_map(|p| {
        let caps = p.captures(lower)?;
        let raw = caps.get(1).or_else(|| caps.get(0))?;
        format_phone(raw.as_str())
    })
}

fn sex(lower: &str) -> Option<&'static str> {
    SEX_PATTERNS
        .iter()
        .find_map(|p| capture(p, lower).and_then(|v| canonical_sex(&v)))
}

/// Format a Brazilian phone number: keep up to 11 digits, require 10.
/// `(DD) DDDDD-DDDD` for mobile numbers, `(DD) DDDD-DDDD` for landlines.
pub fn format_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).take(11).collect();
    if digits.len() < 10 {
        return None;
    }
    let tail = digits.len() - 4;
    Some(format!("({}) {}-{}", &digits[..2], &digits[2..tail], &digits[tail..]))
}

/// Map species wording to `canino` / `felino`; anything else passes through.
pub fn canonical_species(raw: &str) -> String {
    let value = raw.trim().to_lowercase();
    if ["canino", "cão", "cachorro"].iter().any(|k| value.contains(k)) {
        "canino".to_string()
    } else if ["felino", "gato"].iter().any(|k| value.contains(k)) {
        "felino".to_string()
    } else {
        value
    }
}

/// Map sex wording to `macho`, `macho-castrado`, `femea` or `femea-castrada`.
pub fn canonical_sex(raw: &str) -> Option<&'static str> {
    let value = raw.to_lowercase();
    let castrated = value.contains("castrad");

    if value.contains("macho") {
        Some(if castrated { "macho-castrado" } else { "macho" })
    } else if value.contains("fêmea") || value.contains("femea") {
        Some(if castrated { "femea-castrada" } else { "femea" })
    } else {
        None
    }
}
