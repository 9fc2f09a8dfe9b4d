//! Text helpers shared by the name index and the knowledge-base checks.

/// Normalizes a test name for lookup.
///
/// Lowercases, turns every non-alphanumeric character into a separator and
/// collapses runs of separators into a single space.
pub fn normalize_name(raw: &str) -> String {
    let mut normalized = String::with_capacity(raw.len());
    for word in raw
        .split(|ch: char| !ch.is_alphanumeric())
        .filter(|word| !word.is_empty())
    {
        if !normalized.is_empty() {
            normalized.push(' ');
        }
        normalized.extend(word.chars().flat_map(char::to_lowercase));
    }
    normalized
}

/// Returns the trimmed value when it is present and not blank.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Case-insensitive comparison of two trimmed strings.
pub fn eq_ignore_case_trimmed(left: &str, right: &str) -> bool {
    left.trim().to_lowercase() == right.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_case_whitespace_and_punctuation() {
        assert_eq!(normalize_name("  Hemoglobin   A1c "), "hemoglobin a1c");
        assert_eq!(normalize_name("HEMOGLOBIN-A1C"), "hemoglobin a1c");
        assert_eq!(normalize_name("C-Reactive Protein (CRP)"), "c reactive protein crp");
        assert_eq!(normalize_name("T4, free"), "t4 free");
    }

    #[test]
    fn normalize_keeps_non_ascii_letters() {
        assert_eq!(normalize_name("β-HCG"), "β hcg");
    }

    #[test]
    fn normalize_of_punctuation_only_is_empty() {
        assert_eq!(normalize_name(" -- / "), "");
    }

    #[test]
    fn non_blank_filters_whitespace() {
        assert_eq!(non_blank(Some("  fasting ")), Some("fasting"));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn eq_ignore_case_trimmed_matches_text_references() {
        assert!(eq_ignore_case_trimmed(" Negative", "NEGATIVE "));
        assert!(!eq_ignore_case_trimmed("Positive", "Negative"));
    }
}
