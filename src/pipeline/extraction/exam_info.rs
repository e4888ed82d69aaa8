use std::sync::LazyLock;

use regex::Regex;

use super::types::ExamInfo;

static DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})[/\-](\d{1,2})[/\-](\d{4})").expect("valid regex"));

static HEART_RATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d{2,3})\s*bpm").expect("valid regex"));

/// Exam date (`D/M/YYYY` or `D-M-YYYY` → `YYYY-MM-DD`) and heart rate
/// (`143bpm`, `155 BPM`). Dates are reformatted only; impossible calendar
/// days pass through as printed.
pub fn extract_exam_info(text: &str) -> ExamInfo {
    if text.trim().is_empty() {
        return ExamInfo::default();
    }

    let date = DATE.captures(text).map(|caps| {
        format!("{}-{:0>2}-{:0>2}", &caps[3], &caps[2], &caps[1])
    });

    let heart_rate = HEART_RATE
        .captures(text)
        .map(|caps| caps[1].to_string());

    ExamInfo { date, heart_rate }
}
