use crate::model::CleanedRow;
use crate::normalizer::normalize;

/// Builds the candidate search strings for a row, most specific first.
///
/// 1. maker + model
/// 2. model
/// 3. extracted model code, when it differs from the model once normalized
/// 4. maker + extracted model code
/// 5. maker + name (spec left out, it is mostly noisy free text)
/// 6. name + spec, always present as the last resort
///
/// Steps 1-5 appear only when their fields are non-empty, so the list is
/// never empty and always ends with name + spec.
pub fn build_queries(cleaned: &CleanedRow) -> Vec<String> {
    let maker = cleaned.maker.as_str();
    let model = cleaned.model.as_str();
    let code = cleaned.model_code.as_str();
    let name = cleaned.name.as_str();

    let mut queries = Vec::with_capacity(6);
    if !maker.is_empty() && !model.is_empty() {
        queries.push(join(&[maker, model]));
    }
    if !model.is_empty() {
        queries.push(model.to_string());
    }
    if !code.is_empty() && code != model && normalize(code) != model {
        queries.push(code.to_string());
    }
    if !maker.is_empty() && !code.is_empty() {
        queries.push(join(&[maker, code]));
    }
    if !maker.is_empty() && !name.is_empty() {
        queries.push(join(&[maker, name]));
    }
    queries.push(join(&[name, cleaned.spec.as_str()]));
    queries
}

fn join(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleaned(name: &str, spec: &str, maker: &str, model: &str, code: &str) -> CleanedRow {
        CleanedRow {
            name: name.into(),
            spec: spec.into(),
            maker: maker.into(),
            model: model.into(),
            model_code: code.into(),
        }
    }

    #[test]
    fn full_row_follows_priority_order() {
        let row = cleaned("Widget", "steel 10cm", "Acme", "X200", "XB-300");
        assert_eq!(
            build_queries(&row),
            vec![
                "Acme X200",
                "X200",
                "XB-300",
                "Acme XB-300",
                "Acme Widget",
                "Widget steel 10cm",
            ]
        );
    }

    #[test]
    fn code_equal_to_model_is_not_repeated_alone() {
        let row = cleaned("Widget", "X200", "", "X200", "X200");
        assert_eq!(build_queries(&row), vec!["X200", "Widget X200"]);
    }

    #[test]
    fn hyphenated_code_matching_model_is_not_repeated() {
        let row = cleaned("Widget", "XB 300", "Acme", "XB 300", "XB-300");
        assert_eq!(
            build_queries(&row),
            vec!["Acme XB 300", "XB 300", "Acme XB-300", "Acme Widget", "Widget XB 300"]
        );
    }

    #[test]
    fn name_and_spec_only() {
        let row = cleaned("Post it Note", "N686F 2", "", "", "");
        assert_eq!(build_queries(&row), vec!["Post it Note N686F 2"]);
    }

    #[test]
    fn empty_row_still_yields_last_resort() {
        let queries = build_queries(&CleanedRow::default());
        assert_eq!(queries, vec![String::new()]);
    }

    #[test]
    fn always_ends_with_name_and_spec() {
        let rows = [
            cleaned("a", "b", "c", "d", "e"),
            cleaned("", "", "Acme", "", ""),
            cleaned("name", "", "", "M1", ""),
            cleaned("", "spec", "", "", "SP10"),
        ];
        for row in rows {
            let queries = build_queries(&row);
            assert!(!queries.is_empty());
            assert_eq!(queries.last(), Some(&join(&[row.name.as_str(), row.spec.as_str()])));
        }
    }

    #[test]
    fn maker_model_precedes_maker_name() {
        let row = cleaned("Widget", "", "Acme", "X200", "");
        let queries = build_queries(&row);
        let structured = queries.iter().position(|q| q == "Acme X200");
        let by_name = queries.iter().position(|q| q == "Acme Widget");
        assert!(structured.is_some() && by_name.is_some());
        assert!(structured < by_name);
    }
}
