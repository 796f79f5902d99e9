//! ISSN (International Standard Serial Number) validation
//!
//! An ISSN has 8 characters, usually written as two groups of four
//! separated by a hyphen. The last character is a mod-11 check digit
//! and may be `0`-`9` or `X`.

use std::collections::BTreeSet;
use thiserror::Error;

/// Reasons an ISSN fails validation
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssnError {
    #[error("contains non-digit characters")]
    InvalidFormat,

    #[error("must be exactly 8 characters")]
    InvalidLength,

    #[error("check digit does not match")]
    InvalidChecksum,
}

/// Strip separators and surrounding whitespace, uppercase the check digit
pub fn compact(number: &str) -> String {
    number
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .collect::<String>()
        .trim()
        .to_uppercase()
}

/// Compute the check digit for the first seven digits of an ISSN.
/// Digits past the seventh are ignored.
pub fn check_digit(first_seven: &str) -> char {
    let sum: u32 = first_seven
        .chars()
        .filter_map(|c| c.to_digit(10))
        .take(7)
        .enumerate()
        .map(|(i, d)| (8 - i as u32) * d)
        .sum();

    match (11 - sum % 11) % 11 {
        10 => 'X',
        n => char::from_digit(n, 10).unwrap_or('0'),
    }
}

/// Validate an ISSN, returning its compact form
pub fn validate(number: &str) -> Result<String, IssnError> {
    let number = compact(number);

    let (body, last) = match number.char_indices().last() {
        Some((idx, last)) => (&number[..idx], last),
        None => return Err(IssnError::InvalidFormat),
    };

    if body.is_empty() || !body.chars().all(|c| c.is_ascii_digit()) {
        return Err(IssnError::InvalidFormat);
    }
    if number.len() != 8 {
        return Err(IssnError::InvalidLength);
    }
    if check_digit(body) != last {
        return Err(IssnError::InvalidChecksum);
    }

    Ok(number)
}

/// Check if the number is a valid ISSN
pub fn is_valid(number: &str) -> bool {
    validate(number).is_ok()
}

/// Reformat to the standard `XXXX-XXXX` presentation
pub fn format(number: &str) -> String {
    let number = compact(number);
    if number.len() < 4 || !number.is_ascii() {
        return number;
    }
    format!("{}-{}", &number[..4], &number[4..])
}

/// Convert to the 13-digit EAN used on serial barcodes: `977`, the first
/// seven ISSN digits, a two-digit issue code, and the EAN check digit
pub fn to_ean(number: &str, issue_code: &str) -> Result<String, IssnError> {
    let issn = validate(number)?;
    if issue_code.len() != 2 || !issue_code.chars().all(|c| c.is_ascii_digit()) {
        return Err(IssnError::InvalidFormat);
    }

    let body = format!("977{}{}", &issn[..7], issue_code);
    let sum: u32 = body
        .chars()
        .filter_map(|c| c.to_digit(10))
        .enumerate()
        .map(|(i, d)| if i % 2 == 0 { d } else { 3 * d })
        .sum();
    let check = (10 - sum % 10) % 10;
    Ok(format!("{}{}", body, check))
}

/// ISSNs parsed from a whitespace separated record field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedField {
    /// Valid ISSNs in compact form, deduplicated
    pub valid: Vec<String>,
    /// Tokens that failed validation, as written
    pub rejected: Vec<String>,
}

/// Split a record's ISSN field and validate each entry
pub fn parse_field(raw: &str) -> ParsedField {
    let mut seen = BTreeSet::new();
    let mut parsed = ParsedField::default();

    for token in raw.split_whitespace() {
        match validate(token) {
            Ok(issn) => {
                if seen.insert(issn.clone()) {
                    parsed.valid.push(issn);
                }
            }
            Err(_) => parsed.rejected.push(token.to_string()),
        }
    }

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_known_issns() {
        assert_eq!(validate("0024-9319"), Ok("00249319".to_string()));
        assert_eq!(validate("0317-8471"), Ok("03178471".to_string()));
        assert_eq!(validate(" 0000-006x "), Ok("0000006X".to_string()));
    }

    #[test]
    fn rejects_bad_checksum() {
        assert_eq!(validate("0032147X"), Err(IssnError::InvalidChecksum));
        assert_eq!(validate("1234-5678"), Err(IssnError::InvalidChecksum));
    }

    #[test]
    fn rejects_bad_length_and_format() {
        assert_eq!(validate("003214712"), Err(IssnError::InvalidLength));
        assert_eq!(validate("0032-14"), Err(IssnError::InvalidLength));
        assert_eq!(validate("00A2-1478"), Err(IssnError::InvalidFormat));
        assert_eq!(validate(""), Err(IssnError::InvalidFormat));
        assert_eq!(validate("-"), Err(IssnError::InvalidFormat));
    }

    #[test]
    fn compact_and_format() {
        assert_eq!(compact("0032-1478"), "00321478");
        assert_eq!(format("00249319"), "0024-9319");
        assert_eq!(format("12"), "12");
    }

    #[test]
    fn check_digit_x() {
        assert_eq!(check_digit("0000006"), 'X');
        assert_eq!(check_digit("0024931"), '9');
    }

    #[test]
    fn check_digit_ignores_extra_digits() {
        assert_eq!(check_digit("123456789012"), check_digit("1234567"));
        assert_eq!(check_digit("00249319"), '9');
    }

    #[test]
    fn ean_conversion() {
        assert_eq!(to_ean("0264-3596", "00"), Ok("9770264359008".to_string()));
        assert_eq!(to_ean("0024-9319", "00").map(|e| e.len()), Ok(13));
        assert_eq!(to_ean("1234-5678", "00"), Err(IssnError::InvalidChecksum));
        assert_eq!(to_ean("0264-3596", "7"), Err(IssnError::InvalidFormat));
    }

    #[test]
    fn parse_field_splits_and_dedups() {
        let parsed = parse_field("0024-9319 00249319 bogus 0317-8471");
        assert_eq!(parsed.valid, vec!["00249319", "03178471"]);
        assert_eq!(parsed.rejected, vec!["bogus"]);
        assert!(is_valid("0317-8471"));
    }

    #[test]
    fn parse_field_empty() {
        assert_eq!(parse_field("   "), ParsedField::default());
    }
}
