//! Identifier normalization.
//!
//! Canonical identifiers are one letter, seven digits and one letter, all
//! uppercase (`S1234567A`). Raw values in the source workbook may be lower
//! case or carry stray separators (`s-1234567 a`); normalization keeps the
//! first seven-digit run and the only two letters.

use std::sync::LazyLock;

use cohort_model::{ModelError, Result};
use regex::Regex;

static CANONICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][0-9]{7}[A-Z]$").expect("canonical identifier pattern"));
static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{7}").expect("digit run pattern"));
static LETTER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Z]").expect("letter pattern"));

/// Returns true if `value` is already in canonical form.
pub fn is_canonical(value: &str) -> bool {
    CANONICAL.is_match(value)
}

/// Rewrite a raw identifier into canonical form.
///
/// # Errors
///
/// Returns [`ModelError::MalformedIdentifier`] when the upper-cased value has
/// no run of seven digits or does not contain exactly two letters.
///
/// # Examples
///
/// ```
/// use cohort_transform::normalize_identifier;
///
/// assert_eq!(normalize_identifier("s1234567a").unwrap(), "S1234567A");
/// assert_eq!(normalize_identifier("S 1234567 / a").unwrap(), "S1234567A");
/// assert!(normalize_identifier("1234567").is_err());
/// ```
pub fn normalize_identifier(raw: &str) -> Result<String> {
    let upper = raw.to_uppercase();
    if is_canonical(&upper) {
        return Ok(upper);
    }
    let malformed = || ModelError::MalformedIdentifier {
        value: raw.to_string(),
    };
    let digits = DIGIT_RUN.find(&upper).ok_or_else(malformed)?;
    let letters: Vec<&str> = LETTER.find_iter(&upper).map(|m| m.as_str()).collect();
    let [first, last] = letters.as_slice() else {
        return Err(malformed());
    };
    Ok(format!("{first}{}{last}", digits.as_str()))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn canonical_input_is_unchanged() {
        assert_eq!(normalize_identifier("S1234567A").unwrap(), "S1234567A");
    }

    #[test]
    fn lower_case_is_upper_cased() {
        assert_eq!(normalize_identifier("t7654321b").unwrap(), "T7654321B");
    }

    #[test]
    fn separators_are_dropped() {
        assert_eq!(normalize_identifier(" S-1234567-A ").unwrap(), "S1234567A");
        assert_eq!(normalize_identifier("1234567SA").unwrap(), "S1234567A");
    }

    #[test]
    fn first_digit_run_wins() {
        assert_eq!(normalize_identifier("F12345678Z").unwrap(), "F1234567Z");
        assert_eq!(
            normalize_identifier("A1234567 7654321B").unwrap(),
            "A1234567B"
        );
    }

    #[test]
    fn missing_letters_is_malformed() {
        let err = normalize_identifier("1234567").unwrap_err();
        assert_eq!(
            err,
            ModelError::MalformedIdentifier {
                value: "1234567".to_string()
            }
        );
    }

    #[test]
    fn wrong_letter_count_is_malformed() {
        assert!(normalize_identifier("S1234567").is_err());
        assert!(normalize_identifier("SX1234567AB").is_err());
    }

    #[test]
    fn short_digit_run_is_malformed() {
        assert!(normalize_identifier("S123456A").is_err());
        assert!(normalize_identifier("").is_err());
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(id in "[A-Za-z][0-9]{7}[A-Za-z]") {
            let once = normalize_identifier(&id).unwrap();
            let twice = normalize_identifier(&once).unwrap();
            prop_assert!(is_canonical(&once));
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn separated_identifiers_normalize(
            lead in "[a-z]",
            digits in "[0-9]{7}",
            trail in "[A-Z]",
            sep in "[ /-]{0,3}",
        ) {
            let raw = format!("{lead}{sep}{digits}{sep}{trail}");
            let expected = format!("{}{digits}{trail}", lead.to_uppercase());
            prop_assert_eq!(normalize_identifier(&raw).unwrap(), expected);
        }
    }
}
