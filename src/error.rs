use serde::Serialize;
use thiserror::Error;

/// Why a single raw record was dropped from the batch.
///
/// Never fatal: the batch carries on without the record and the reason is
/// reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordError {
    #[error("missing required field '{field}'")]
    MissingRequiredField { field: &'static str },

    #[error("invalid value for '{field}': {reason}")]
    InvalidFieldValue { field: &'static str, reason: String },
}

/// Errors that stop a batch before any computation happens.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid configuration:\n  - {}", .0.join("\n  - "))]
    InvalidConfiguration(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_error_messages() {
        let err = RecordError::MissingRequiredField { field: "price" };
        assert_eq!(err.to_string(), "missing required field 'price'");

        let err = RecordError::InvalidFieldValue {
            field: "floor",
            reason: "floor 7 is above total_floors 5".to_string(),
        };
        assert!(err.to_string().contains("floor 7 is above"));
    }

    #[test]
    fn test_invalid_configuration_lists_every_error() {
        let err = EngineError::InvalidConfiguration(vec![
            "weights.price: must be non-negative".to_string(),
            "filters.max_rooms: must be positive".to_string(),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("weights.price"));
        assert!(msg.contains("filters.max_rooms"));
    }

    #[test]
    fn test_record_error_serializes_with_kind() {
        let err = RecordError::MissingRequiredField { field: "address" };
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, r#"{"kind":"missing_required_field","field":"address"}"#);
    }
}
