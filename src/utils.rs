// Utility functions
use chrono::{DateTime, Utc};

/// Parses an RFC 3339 timestamp into `DateTime<Utc>`, if possible.
pub fn parse_datetime(date_str: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(date_str)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Zero-based column index to its spreadsheet letter (0 -> "A", 26 -> "AA").
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Spreadsheet letter to zero-based column index ("C" -> 2).
pub fn parse_column_letter(text: &str) -> Option<usize> {
    let text = text.trim();
    if text.is_empty() || text.len() > 3 || !text.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let n = text
        .chars()
        .fold(0usize, |acc, c| acc * 26 + (c.to_ascii_uppercase() as usize - 'A' as usize + 1));
    Some(n - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_round_trip_through_indices() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(2), "C");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(parse_column_letter("c"), Some(2));
        assert_eq!(parse_column_letter("AA"), Some(26));
        assert_eq!(parse_column_letter("상품명"), None);
        assert_eq!(parse_column_letter("A1"), None);
    }

    #[test]
    fn parses_rfc3339() {
        assert!(parse_datetime("2025-06-02T10:00:00+09:00").is_some());
        assert!(parse_datetime("yesterday").is_none());
    }
}
