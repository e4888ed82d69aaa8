//! Narrative sections (findings, conclusions) bounded by heading words.

use std::sync::LazyLock;

use regex::Regex;

use super::normalize::truncate_chars;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrativeSection {
    Findings,
    Conclusions,
}

impl NarrativeSection {
    pub const ALL: [NarrativeSection; 2] = [NarrativeSection::Findings, NarrativeSection::Conclusions];

    /// Heading synonyms, highest priority first.
    pub fn headings(self) -> &'static [&'static str] {
        match self {
            NarrativeSection::Findings => &["achados", "findings", "observações", "observacoes"],
            NarrativeSection::Conclusions => &["conclusão", "conclusoes", "conclusion", "diagnóstico"],
        }
    }
}

/// Compiled heading patterns per section, in priority order.
static SECTION_PATTERNS: LazyLock<Vec<(NarrativeSection, Vec<Regex>)>> = LazyLock::new(|| {
    let stops = NarrativeSection::ALL
        .iter()
        .flat_map(|s| s.headings())
        .map(|h| regex::escape(h))
        .collect::<Vec<_>>()
        .join("|");

    NarrativeSection::ALL
        .iter()
        .map(|&section| {
            let patterns = section
                .headings()
                .iter()
                .map(|heading| {
                    let pattern = format!(
                        r"(?is){}[ \t]*[:\-]?[ \t]*(.+?)(?:\r?\n\r?\n|{stops}|$)",
                        regex::escape(heading)
                    );
                    Regex::new(&pattern).expect("Invalid section heading pattern")
                })
                .collect();
            (section, patterns)
        })
        .collect()
});

/// Extracted narrative snippets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sections {
    pub findings: Option<String>,
    pub conclusions: Option<String>,
}

impl Sections {
    fn slot(&mut self, section: NarrativeSection) -> &mut Option<String> {
        match section {
            NarrativeSection::Findings => &mut self.findings,
            NarrativeSection::Conclusions => &mut self.conclusions,
        }
    }
}

/// Capture each section after its first matching heading, up to a blank line,
/// the next known heading word, or end of text. Snippets are trimmed and
/// capped at `max_chars` characters; a captured section is never replaced.
pub fn extract_sections(text: &str, max_chars: usize) -> Sections {
    let mut sections = Sections::default();
    if text.trim().is_empty() {
        return sections;
    }

    for (section, patterns) in SECTION_PATTERNS.iter() {
        for pattern in patterns {
            let snippet = pattern
                .captures(text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim())
                .filter(|s| !s.is_empty());

            if let Some(snippet) = snippet {
                let snippet = truncate_chars(snippet, max_chars).trim_end();
                let slot = sections.slot(*section);
                if slot.is_none() && !snippet.is_empty() {
                    *slot = Some(snippet.to_string());
                }
                break;
            }
        }
    }

    sections
}
