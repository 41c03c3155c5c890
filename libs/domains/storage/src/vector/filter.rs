//! Boolean filter expressions in the vector store's expression language.

use crate::models::Fields;
use crate::value::TypedValue;

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

fn literal(value: &TypedValue) -> String {
    match value {
        TypedValue::Int(_) | TypedValue::Double(_) | TypedValue::Bool(_) => value.as_string(),
        other => quote(&other.as_string()),
    }
}

/// The raw expression when given, otherwise `field == value` clauses joined
/// by `&&`. Empty when neither is present.
pub fn filter_expression(filter: &Fields, raw: &str) -> String {
    if !raw.trim().is_empty() {
        return raw.to_string();
    }
    filter
        .iter()
        .map(|(field, value)| format!("{} == {}", field, literal(value)))
        .collect::<Vec<_>>()
        .join(" && ")
}

/// `id in ["a","b"]`
pub fn ids_expression(ids: &[String]) -> String {
    let quoted: Vec<String> = ids.iter().map(|id| quote(id)).collect();
    format!("{} in [{}]", super::ID_FIELD, quoted.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_expression_wins() {
        let mut filter = Fields::new();
        filter.insert("user_id".to_string(), "u1".into());
        assert_eq!(filter_expression(&filter, "score > 3"), "score > 3");
    }

    #[test]
    fn test_map_is_joined_in_field_order() {
        let mut filter = Fields::new();
        filter.insert("user_id".to_string(), "u1".into());
        filter.insert("archived".to_string(), false.into());
        filter.insert("level".to_string(), 2i64.into());
        filter.insert("created".to_string(), TypedValue::Timestamp(100));

        assert_eq!(
            filter_expression(&filter, ""),
            "archived == false && created == \"100\" && level == 2 && user_id == \"u1\""
        );
    }

    #[test]
    fn test_empty_filter() {
        assert_eq!(filter_expression(&Fields::new(), "  "), "");
    }

    #[test]
    fn test_strings_are_escaped() {
        let mut filter = Fields::new();
        filter.insert("title".to_string(), "say \"hi\" \\o/".into());
        assert_eq!(
            filter_expression(&filter, ""),
            r#"title == "say \"hi\" \\o/""#
        );
    }

    #[test]
    fn test_ids_expression() {
        let ids = vec!["a".to_string(), "b\"c".to_string()];
        assert_eq!(ids_expression(&ids), r#"id in ["a","b\"c"]"#);
    }
}
