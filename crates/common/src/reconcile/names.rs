//! Free-text name handling

use std::collections::BTreeSet;

use crate::errors::{AppError, Result};

/// Split a comma-separated list into a set of trimmed, non-empty names.
///
/// Order is not significant and duplicates collapse. Matching stays
/// case-sensitive: `"ML"` and `"ml"` are different names.
pub fn parse_name_list(input: &str) -> BTreeSet<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Trim a name, rejecting it when nothing is left
pub fn require_name<'a>(field: &str, name: &'a str) -> Result<&'a str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::MissingField { field: field.to_string() });
    }
    Ok(name)
}

/// Trim an optional free-text field, mapping blank input to `None`
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_variants_stay_distinct() {
        let names = parse_name_list("ML, ml , ML");
        assert_eq!(names.len(), 2);
        assert!(names.contains("ML"));
        assert!(names.contains("ml"));
    }

    #[test]
    fn test_empty_tokens_dropped() {
        let names = parse_name_list(" , AI,, Robotics ,");
        assert_eq!(names.into_iter().collect::<Vec<_>>(), vec!["AI", "Robotics"]);
        assert!(parse_name_list("").is_empty());
        assert!(parse_name_list(" ,  , ").is_empty());
    }

    #[test]
    fn test_require_name() {
        assert_eq!(require_name("university_name", " MIT ").unwrap(), "MIT");
        let err = require_name("university_name", "   ").unwrap_err();
        assert!(matches!(err, AppError::MissingField { ref field } if field == "university_name"));
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(optional_text(Some("  ".into())), None);
        assert_eq!(optional_text(Some(" lab ".into())), Some("lab".into()));
        assert_eq!(optional_text(None), None);
    }
}
