/// Normalize a captured number to dot-decimal form.
/// OCR output uses comma or a stray space as decimal separator ("2,01", "1 98");
/// both become a dot. Surrounding whitespace is trimmed first, so the
/// operation is idempotent.
pub fn normalize_number(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| if c == ',' || c.is_whitespace() { '.' } else { c })
        .collect()
}

/// Capitalize the first letter of every alphabetic run, lowercase the rest.
/// "joão da silva" → "João Da Silva".
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;

    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }

    out
}

/// Trim and collapse internal whitespace runs (including line breaks) to one space.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keep at most `max_chars` characters, never splitting a UTF-8 sequence.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_and_dot_agree() {
        assert_eq!(normalize_number("0,409"), "0.409");
        assert_eq!(normalize_number("0.409"), "0.409");
    }

    #[test]
    fn space_decimal_becomes_dot() {
        assert_eq!(normalize_number("1 98"), "1.98");
        assert_eq!(normalize_number(" 38 "), "38");
    }

    #[test]
    fn normalization_is_idempotent() {
        for raw in ["0,409", "1 98", "38", " 2,01 ", "12.5", "3,", ""] {
            let once = normalize_number(raw);
            assert_eq!(normalize_number(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn title_case_handles_accents() {
        assert_eq!(title_case("joão silva"), "João Silva");
        assert_eq!(title_case("REX"), "Rex");
        assert_eq!(title_case("golden retriever"), "Golden Retriever");
        assert_eq!(title_case("shih-tzu"), "Shih-Tzu");
    }

    #[test]
    fn collapse_whitespace_joins_lines() {
        assert_eq!(collapse_whitespace("  joão \n  silva\t"), "joão silva");
        assert_eq!(collapse_whitespace("   "), "");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("coração", 5), "coraç");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }
}
