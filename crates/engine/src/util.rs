//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::Validation(format!("invalid {label} id")))
}

/// Validate that a required name field is non-empty after trimming.
pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(format!("{label} must not be empty")));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional free-text field, collapsing blank strings to `None`.
pub(crate) fn normalize_optional_text(value: Option<String>) -> Option<String> {
    value.and_then(|text| {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Validate that an amount in minor units is strictly positive.
pub(crate) fn ensure_positive_amount(amount_minor: i64, label: &str) -> ResultEngine<()> {
    if amount_minor <= 0 {
        return Err(EngineError::Validation(format!(
            "{label} must be > 0, got {amount_minor}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_name_trims_and_rejects_blank() {
        assert_eq!(
            normalize_required_name("  Groceries ", "name").unwrap(),
            "Groceries"
        );
        assert!(normalize_required_name("   ", "name").is_err());
    }

    #[test]
    fn optional_text_collapses_blank_to_none() {
        assert_eq!(normalize_optional_text(Some("  ".to_string())), None);
        assert_eq!(
            normalize_optional_text(Some(" note ".to_string())),
            Some("note".to_string())
        );
        assert_eq!(normalize_optional_text(None), None);
    }
}
