use actix_web::{
    error::{InternalError, JsonPayloadError},
    HttpResponse,
};
use serde::{Deserialize, Serialize};

/// Error body shared by every failing endpoint
#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
    pub fields: serde_json::Value,
}

fn bad_request(error: &str, fields: serde_json::Map<String, serde_json::Value>) -> actix_web::Error {
    let body = ErrorResponse {
        error: error.to_string(),
        fields: serde_json::Value::Object(fields),
    };
    InternalError::from_response("", HttpResponse::BadRequest().json(body)).into()
}

fn payload_too_large(limit: usize) -> actix_web::Error {
    let body = ErrorResponse {
        error: "Payload too large".to_string(),
        fields: serde_json::json!({
            "message": format!("Request body exceeds the {} byte limit", limit)
        }),
    };
    InternalError::from_response("", HttpResponse::PayloadTooLarge().json(body)).into()
}

/// Human-readable reason for a body that failed to deserialize
fn deserialize_message(err: &str) -> String {
    if err.contains("EOF while parsing") {
        "Request body is empty. Expected JSON payload".to_string()
    } else if err.contains("unknown variant") {
        "Invalid status. Expected one of: Applied, Interview, Offer, Rejected".to_string()
    } else if err.contains("invalid date") {
        "Invalid dateApplied. Expected YYYY-MM-DD".to_string()
    } else if err.contains("invalid type") {
        "Invalid field type in JSON payload".to_string()
    } else {
        "Invalid JSON format".to_string()
    }
}

/// JSON extractor config with the project's standard 400 and 413 responses
pub fn json_config(limit: usize) -> actix_web_validator::JsonConfig {
    actix_web_validator::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| {
            let mut fields = serde_json::Map::new();

            match err {
                actix_web_validator::Error::Validate(validation_errors) => {
                    for (field, errors) in validation_errors.field_errors() {
                        let messages: Vec<String> = errors
                            .iter()
                            .map(|e| {
                                e.message
                                    .as_ref()
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| format!("Validation error in field: {}", field))
                            })
                            .collect();
                        fields.insert(field.to_string(), serde_json::json!({"errors": messages}));
                    }
                    bad_request("Validation failed", fields)
                }
                actix_web_validator::Error::Deserialize(de_err) => {
                    fields.insert(
                        "message".to_string(),
                        serde_json::json!(deserialize_message(&de_err.to_string())),
                    );
                    bad_request("Request validation failed", fields)
                }
                actix_web_validator::Error::JsonPayloadError(
                    JsonPayloadError::Overflow { limit }
                    | JsonPayloadError::OverflowKnownLength { limit, .. },
                ) => payload_too_large(limit),
                actix_web_validator::Error::JsonPayloadError(payload_err) => {
                    fields.insert(
                        "message".to_string(),
                        serde_json::json!(deserialize_message(&payload_err.to_string())),
                    );
                    bad_request("Request validation failed", fields)
                }
                _ => {
                    fields.insert("message".to_string(), serde_json::json!("Validation error"));
                    bad_request("Validation failed", fields)
                }
            }
        })
}
