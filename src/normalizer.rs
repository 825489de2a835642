use crate::model::{CleanedRow, ColumnMapping, Row};
use lazy_static::lazy_static;
use regex::Regex;

/// Boilerplate words that procurement sheets put in name/maker cells and that
/// only hurt search relevance.
pub const NOISE_TOKENS: &[&str] = &[
    "supplier-name-placeholder",
    "miscellaneous",
    "unspecified",
    "no-brand",
    "노브랜드",
    "자체제작",
    "미지정",
    "업체명",
    "공급사",
    "기타",
    "없음",
];

/// Cell texts spreadsheet tools emit for an empty cell.
const ABSENCE_MARKERS: &[&str] = &["nan", "none", "null"];

const STRUCTURAL_PUNCTUATION: &[char] = &['/', '\\', '_', '[', ']', '(', ')', '{', '}', '+', '-', '*'];

lazy_static! {
    static ref PART_NUMBER: Regex = Regex::new(r"[A-Za-z]+-?[0-9]+").unwrap();
    static ref LETTER_RUN: Regex = Regex::new(r"[A-Za-z]{2,}").unwrap();
}

/// Cleans a raw cell for use in a search query.
///
/// Removes noise tokens, turns structural punctuation into spaces and
/// collapses whitespace. The steps repeat until nothing changes, so the
/// result is a fixpoint and `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(raw: &str) -> String {
    let mut current = raw.to_string();
    loop {
        let next = normalize_pass(&current);
        if next == current {
            return next;
        }
        current = next;
    }
}

fn normalize_pass(value: &str) -> String {
    if is_absent(value) {
        return String::new();
    }
    let mut text = value.to_string();
    for token in NOISE_TOKENS {
        text = remove_ignoring_ascii_case(&text, token);
    }
    let text: String = text
        .chars()
        .map(|c| if STRUCTURAL_PUNCTUATION.contains(&c) { ' ' } else { c })
        .collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// True for empty cells and for the textual absence markers (`nan`, `None`, ...).
pub fn is_absent(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || ABSENCE_MARKERS
            .iter()
            .any(|m| trimmed.eq_ignore_ascii_case(m))
}

// ASCII lowercasing keeps byte offsets, so matches found in the lowered copy
// index the original string.
fn remove_ignoring_ascii_case(text: &str, token: &str) -> String {
    let lowered = text.to_ascii_lowercase();
    let needle = token.to_ascii_lowercase();
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (start, _) in lowered.match_indices(&needle) {
        out.push_str(&text[last..start]);
        last = start + needle.len();
    }
    out.push_str(&text[last..]);
    out
}

/// Best-effort part-number extraction: a letter run followed by optional
/// hyphen and digits, else any run of two or more letters, else empty.
pub fn extract_model_code(raw: &str) -> String {
    if is_absent(raw) {
        return String::new();
    }
    PART_NUMBER
        .find(raw)
        .or_else(|| LETTER_RUN.find(raw))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Model code of a spec cell. A bare letter run only counts when it is the
/// whole cell, so unit suffixes such as the `ml` of `500ml` are not codes.
fn spec_model_code(raw: &str) -> String {
    let code = extract_model_code(raw);
    if code.chars().any(|c| c.is_ascii_digit()) || code == normalize(raw) {
        code
    } else {
        String::new()
    }
}

impl CleanedRow {
    /// Normalizes the mapped cells of `row`. The model code is taken from the
    /// raw spec cell because the hyphen in a part number matters.
    pub fn from_row(row: &Row, mapping: &ColumnMapping) -> Self {
        let optional = |index: Option<usize>| index.map(|i| normalize(row.cell(i))).unwrap_or_default();
        Self {
            name: normalize(row.cell(mapping.name)),
            spec: normalize(row.cell(mapping.spec)),
            maker: optional(mapping.maker),
            model: optional(mapping.model),
            model_code: spec_model_code(row.cell(mapping.spec)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_punctuation_and_collapses_spaces() {
        assert_eq!(normalize("  A4 용지/80g (500매) "), "A4 용지 80g 500매");
        assert_eq!(normalize("pen_black+red"), "pen black red");
    }

    #[test]
    fn removes_noise_tokens() {
        assert_eq!(normalize("노브랜드 볼펜"), "볼펜");
        assert_eq!(normalize("Stapler No-Brand"), "Stapler");
        assert_eq!(normalize("기타 부품 (미지정)"), "부품");
    }

    #[test]
    fn only_noise_and_punctuation_becomes_empty() {
        for raw in ["no-brand", "(기타)", "/-_*+", "[미지정] / 없음", "miscellaneous - unspecified"] {
            assert_eq!(normalize(raw), "", "input {:?}", raw);
        }
    }

    #[test]
    fn absence_markers_read_as_empty() {
        assert_eq!(normalize("nan"), "");
        assert_eq!(normalize(" None "), "");
        assert_eq!(normalize("NULL"), "");
        assert_eq!(normalize("nan-"), "");
    }

    #[test]
    fn is_idempotent() {
        let samples = [
            "Post-it Note",
            "기기타타 볼펜",
            "no-no-brandbrand cable",
            "  3M (Scotch) 810 ",
            "nan",
            "supplier-name-placeholder / 업체명",
        ];
        for raw in samples {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "input {:?}", raw);
        }
    }

    #[test]
    fn extracts_part_number_first() {
        assert_eq!(extract_model_code("N686F-2"), "N686");
        assert_eq!(extract_model_code("규격: XB-300 블랙"), "XB-300");
        assert_eq!(extract_model_code("흰색 KF94"), "KF94");
    }

    #[test]
    fn falls_back_to_letter_run() {
        assert_eq!(extract_model_code("대형 XL 사이즈"), "XL");
        assert_eq!(extract_model_code("500ml"), "ml");
    }

    #[test]
    fn no_code_is_empty() {
        assert_eq!(extract_model_code("검정 12개입"), "");
        assert_eq!(extract_model_code("nan"), "");
        assert_eq!(extract_model_code("A"), "");
    }

    #[test]
    fn cleaned_row_reads_mapped_columns() {
        let row = Row::new(vec![
            "1".into(),
            "노브랜드 Post-it Note".into(),
            "N686F-2".into(),
            "nan".into(),
        ]);
        let mapping = ColumnMapping { name: 1, spec: 2, maker: Some(3), model: Some(9) };
        let cleaned = CleanedRow::from_row(&row, &mapping);
        assert_eq!(cleaned.name, "Post it Note");
        assert_eq!(cleaned.spec, "N686F 2");
        assert_eq!(cleaned.maker, "");
        assert_eq!(cleaned.model, "");
        assert_eq!(cleaned.model_code, "N686");
    }

    #[test]
    fn unit_suffix_in_spec_is_not_a_code() {
        let mapping = ColumnMapping { name: 0, spec: 1, maker: None, model: None };
        for spec in ["500ml", "10cm", "0.5mm", "검정 12 EA"] {
            let row = Row::new(vec!["생수".into(), spec.into()]);
            assert_eq!(CleanedRow::from_row(&row, &mapping).model_code, "", "spec {:?}", spec);
        }
        let row = Row::new(vec!["케이블".into(), "USB".into()]);
        assert_eq!(CleanedRow::from_row(&row, &mapping).model_code, "USB");
        let row = Row::new(vec!["마스크".into(), "흰색 KF94".into()]);
        assert_eq!(CleanedRow::from_row(&row, &mapping).model_code, "KF94");
    }
}
