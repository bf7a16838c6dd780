//! Text normalization shared by identities and policy documents.

use serde_json::Value;

/// Lower-case `s`, trim it, and collapse every internal whitespace run to a
/// single space.
#[must_use]
pub fn normalize_str(s: &str) -> String {
    s.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Type name of a JSON value, as reported in validation errors
#[must_use]
pub fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_trims_and_lowercases() {
        assert_eq!(normalize_str("  Alice  "), "alice");
        assert_eq!(normalize_str("ORG:Site"), "org:site");
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize_str("not \t  org:Site\n"), "not org:site");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize_str(""), "");
        assert_eq!(normalize_str("   "), "");
    }

    proptest! {
        #[test]
        fn prop_normalize_idempotent(s in "\\PC*") {
            let once = normalize_str(&s);
            prop_assert_eq!(normalize_str(&once), once.clone());
        }

        #[test]
        fn prop_normalize_has_no_edge_whitespace(s in "\\PC*") {
            let n = normalize_str(&s);
            prop_assert_eq!(n.trim(), n.as_str());
            prop_assert!(!n.contains("  "));
        }
    }
}
