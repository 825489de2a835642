use crate::model::{ColumnMapping, SheetError};
use crate::utils::{column_letter, parse_column_letter};
use tracing::info;

const NAME_KEYWORDS: &[&str] = &["상품명", "품목명", "제품명", "품명", "product", "item", "name"];
const SPEC_KEYWORDS: &[&str] = &["규격", "사양", "spec", "specification"];
const MAKER_KEYWORDS: &[&str] = &["제조사", "메이커", "브랜드", "maker", "manufacturer", "brand"];
const MODEL_KEYWORDS: &[&str] = &["모델", "품번", "model"];

/// Headers of numbering columns ("Item No", "품목코드"), never the item name.
const IDENTIFIER_WORDS: &[&str] = &["no", "number", "id", "code", "번호", "코드"];

/// Column fallback when no header names the item or its spec (columns C and D).
const FALLBACK_NAME: usize = 2;
const FALLBACK_SPEC: usize = 3;

/// User-chosen columns, each a header text or a column letter.
#[derive(Debug, Clone, Default)]
pub struct ColumnOverrides {
    pub name: Option<String>,
    pub spec: Option<String>,
    pub maker: Option<String>,
    pub model: Option<String>,
}

/// Works out which columns hold name, spec, maker and model.
///
/// Explicit overrides win. The remaining roles are matched by header keyword,
/// maker and model first so a header like "Model Name" is not taken for the
/// item name. Name and spec fall back to columns C and D.
pub fn detect_mapping(headers: &[String], overrides: &ColumnOverrides) -> Result<ColumnMapping, SheetError> {
    let mut taken: Vec<usize> = Vec::new();

    let mut pick = |role: &'static str,
                    choice: &Option<String>,
                    keywords: &[&str],
                    rejected: &[&str]|
     -> Result<Option<usize>, SheetError> {
        let index = match choice {
            Some(text) => Some(resolve_override(headers, role, text)?),
            None => find_by_keyword(headers, keywords, rejected, &taken),
        };
        if let Some(i) = index {
            taken.push(i);
        }
        Ok(index)
    };

    let maker = pick("maker", &overrides.maker, MAKER_KEYWORDS, &[])?;
    let model = pick("model", &overrides.model, MODEL_KEYWORDS, &[])?;
    let spec = pick("spec", &overrides.spec, SPEC_KEYWORDS, &[])?;
    let name = pick("name", &overrides.name, NAME_KEYWORDS, IDENTIFIER_WORDS)?;

    let name = match name {
        Some(i) => i,
        None => fallback(headers, "name", FALLBACK_NAME, &taken)?,
    };
    taken.push(name);
    let spec = match spec {
        Some(i) => i,
        None => fallback(headers, "spec", FALLBACK_SPEC, &taken)?,
    };

    let mapping = ColumnMapping { name, spec, maker, model };
    info!(
        "Columns: name={} spec={} maker={} model={}",
        describe(headers, Some(mapping.name)),
        describe(headers, Some(mapping.spec)),
        describe(headers, mapping.maker),
        describe(headers, mapping.model)
    );
    Ok(mapping)
}

fn find_by_keyword(headers: &[String], keywords: &[&str], rejected: &[&str], taken: &[usize]) -> Option<usize> {
    keywords.iter().find_map(|keyword| {
        headers.iter().enumerate().find_map(|(i, header)| {
            let usable = !taken.contains(&i) && !rejected.iter().any(|word| header_mentions(header, word));
            (usable && header_mentions(header, keyword)).then_some(i)
        })
    })
}

/// English keywords must be a whole word of the header ("part" is not in
/// "Department"); Korean keywords may sit inside a compound like "모델명".
fn header_mentions(header: &str, keyword: &str) -> bool {
    let header = header.to_lowercase();
    if keyword.is_ascii() {
        header
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| word == keyword)
    } else {
        header.contains(keyword)
    }
}

fn resolve_override(headers: &[String], role: &'static str, text: &str) -> Result<usize, SheetError> {
    let wanted = text.trim();
    if let Some(i) = headers.iter().position(|h| h.trim() == wanted) {
        return Ok(i);
    }
    match parse_column_letter(wanted) {
        Some(i) if i < headers.len() => Ok(i),
        _ => Err(SheetError::Column {
            role,
            detail: format!("no header or column letter '{}'", wanted),
        }),
    }
}

fn fallback(headers: &[String], role: &'static str, index: usize, taken: &[usize]) -> Result<usize, SheetError> {
    if index < headers.len() && !taken.contains(&index) {
        Ok(index)
    } else {
        Err(SheetError::Column {
            role,
            detail: format!(
                "no matching header and column {} is unavailable",
                column_letter(index)
            ),
        })
    }
}

fn describe(headers: &[String], index: Option<usize>) -> String {
    match index {
        Some(i) => format!("{} ({})", column_letter(i), headers.get(i).map(String::as_str).unwrap_or("")),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn detects_korean_headers() {
        let h = headers(&["순번", "품목명", "규격", "제조사", "모델명", "수량"]);
        let mapping = detect_mapping(&h, &ColumnOverrides::default()).unwrap();
        assert_eq!(mapping, ColumnMapping { name: 1, spec: 2, maker: Some(3), model: Some(4) });
    }

    #[test]
    fn model_name_header_is_not_the_item_name() {
        let h = headers(&["Item", "Spec", "Model Name"]);
        let mapping = detect_mapping(&h, &ColumnOverrides::default()).unwrap();
        assert_eq!(mapping.model, Some(2));
        assert_eq!(mapping.name, 0);
        assert_eq!(mapping.spec, 1);
    }

    #[test]
    fn falls_back_to_columns_c_and_d() {
        let h = headers(&["No", "Date", "Col3", "Col4", "Qty"]);
        let mapping = detect_mapping(&h, &ColumnOverrides::default()).unwrap();
        assert_eq!(mapping, ColumnMapping { name: 2, spec: 3, maker: None, model: None });
    }

    #[test]
    fn english_keywords_match_whole_words() {
        let h = headers(&["Department", "Item No", "Item Name", "Specification", "Maker"]);
        let mapping = detect_mapping(&h, &ColumnOverrides::default()).unwrap();
        assert_eq!(mapping, ColumnMapping { name: 2, spec: 3, maker: Some(4), model: None });
    }

    #[test]
    fn numbering_column_is_not_the_name() {
        let h = headers(&["품명코드", "품명", "규격"]);
        let mapping = detect_mapping(&h, &ColumnOverrides::default()).unwrap();
        assert_eq!(mapping.name, 1);
        assert_eq!(mapping.spec, 2);
    }

    #[test]
    fn narrow_sheet_without_headers_fails() {
        let h = headers(&["A", "B"]);
        let err = detect_mapping(&h, &ColumnOverrides::default()).unwrap_err();
        assert!(matches!(err, SheetError::Column { role: "name", .. }));
    }

    #[test]
    fn overrides_by_header_or_letter() {
        let h = headers(&["상품명", "규격", "비고", "메모"]);
        let overrides = ColumnOverrides {
            name: Some("C".into()),
            spec: Some("메모".into()),
            ..ColumnOverrides::default()
        };
        let mapping = detect_mapping(&h, &overrides).unwrap();
        assert_eq!(mapping.name, 2);
        assert_eq!(mapping.spec, 3);
    }

    #[test]
    fn unknown_override_is_an_error() {
        let h = headers(&["상품명", "규격"]);
        let overrides = ColumnOverrides { maker: Some("Z".into()), ..ColumnOverrides::default() };
        let err = detect_mapping(&h, &overrides).unwrap_err();
        assert!(matches!(err, SheetError::Column { role: "maker", .. }));
    }
}
