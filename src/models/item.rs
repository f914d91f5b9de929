use serde::Deserialize;
use serde_json::Value;
use validator::{Validate, ValidationErrors};

use crate::utils::http_helpers::RelayError;

/// Body of `POST /add`. Unknown fields are ignored.
#[derive(Deserialize, Validate, Debug, Clone, PartialEq, Eq)]
pub struct AddItemRequest {
    /// Free text naming the grocery item. Length is checked on the raw
    /// string, so whitespace-only items pass.
    #[validate(length(min = 1, message = "must contain at least 1 character"))]
    pub item: String,
}

impl AddItemRequest {
    /// Parse and validate a raw request body. Malformed JSON is a validation
    /// failure like any other.
    pub fn from_body(body: &[u8]) -> Result<Self, RelayError> {
        let value: Value = serde_json::from_slice(body).map_err(invalid_body)?;
        if !value.is_object() {
            return Err(RelayError::Validation(
                "Invalid request body: expected a JSON object".to_string(),
            ));
        }
        let request: AddItemRequest = serde_json::from_value(value).map_err(invalid_body)?;
        request
            .validate()
            .map_err(|errors| RelayError::Validation(describe(&errors)))?;
        Ok(request)
    }
}

fn invalid_body(e: serde_json::Error) -> RelayError {
    RelayError::Validation(format!("Invalid request body: {}", e))
}

/// One line per violation, `field: message`, sorted for stable output.
fn describe(errors: &ValidationErrors) -> String {
    let mut lines: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, field_errors)| {
            field_errors.iter().map(move |error| {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                format!("{}: {}", field, message)
            })
        })
        .collect();
    lines.sort();
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejection(body: &str) -> String {
        match AddItemRequest::from_body(body.as_bytes()) {
            Err(RelayError::Validation(message)) => message,
            other => panic!("expected a validation error, got {:?}", other),
        }
    }

    #[test]
    fn accepts_an_item() {
        let request = AddItemRequest::from_body(br#"{"item": "eggs"}"#).unwrap();
        assert_eq!(request.item, "eggs");
    }

    #[test]
    fn keeps_whitespace_and_ignores_extra_fields() {
        let request = AddItemRequest::from_body(br#"{"item": "  ", "qty": 2}"#).unwrap();
        assert_eq!(request.item, "  ");
    }

    #[test]
    fn empty_item_is_rejected() {
        assert_eq!(rejection(r#"{"item": ""}"#), "item: must contain at least 1 character");
    }

    #[test]
    fn missing_item_is_rejected() {
        assert!(rejection("{}").contains("missing field `item`"));
    }

    #[test]
    fn non_string_item_is_rejected() {
        assert!(rejection(r#"{"item": 42}"#).contains("invalid type"));
        assert!(rejection(r#"{"item": null}"#).contains("invalid type"));
    }

    #[test]
    fn malformed_json_is_a_validation_error() {
        assert!(rejection("{\"item\": ").starts_with("Invalid request body"));
        assert!(rejection("").starts_with("Invalid request body"));
        assert!(rejection("[\"eggs\"]").starts_with("Invalid request body"));
    }
}
