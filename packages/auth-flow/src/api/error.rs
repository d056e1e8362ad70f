//! API error types and server error-body extraction.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Shown when nothing usable can be extracted from an error body.
pub const FALLBACK_MESSAGE: &str = "An unexpected error occurred. Please try again.";

/// Shown for transport failures.
pub const NETWORK_MESSAGE: &str = "Network error. Please check your connection and try again.";

/// Errors from the account API. All of them are locally recoverable; flows
/// surface them as field or toast errors and stay retryable.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure (connection refused, timeout, bad TLS).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response with the parsed error body.
    #[error("API error ({status}): {}", .payload.message())]
    Api {
        status: StatusCode,
        payload: ErrorPayload,
    },

    /// No refresh credential at the session boundary.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The server rejected the refresh credential; sign in again.
    #[error("session expired")]
    SessionExpired,
}

impl ApiError {
    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        self.user_message_or(FALLBACK_MESSAGE)
    }

    /// Like [`Self::user_message`] but with a caller-chosen fallback for
    /// error bodies that carry nothing extractable.
    pub fn user_message_or(&self, fallback: &str) -> String {
        match self {
            ApiError::Network(_) => NETWORK_MESSAGE.to_string(),
            ApiError::Api { payload, .. } => payload.message_or(fallback),
            other => other.to_string(),
        }
    }

    /// Remaining resend cooldown carried by a throttling response, if any.
    pub fn cooldown_remaining_seconds(&self) -> Option<u64> {
        match self {
            ApiError::Api { payload, .. } => payload.cooldown_remaining_seconds(),
            _ => None,
        }
    }

    /// Field-targeted server error, if the body names one.
    pub fn named_field(&self) -> Option<(String, String)> {
        match self {
            ApiError::Api { payload, .. } => payload.named_field(),
            _ => None,
        }
    }
}

/// A parsed (or unparseable, then null) server error body.
///
/// Extraction priority:
/// 1. a `detail` string;
/// 2. the first element of a `non_field_errors` array;
/// 3. the first element if the whole payload is an array;
/// 4. the first error array found on a named field (field name preserved);
/// 5. otherwise the fallback message.
#[derive(Debug, Clone, Default)]
pub struct ErrorPayload {
    body: Value,
}

impl ErrorPayload {
    pub fn new(body: Value) -> Self {
        Self { body }
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Best human-readable message, with the standard fallback.
    pub fn message(&self) -> String {
        self.message_or(FALLBACK_MESSAGE)
    }

    /// Best human-readable message, with a caller-chosen fallback.
    pub fn message_or(&self, fallback: &str) -> String {
        self.extract().unwrap_or_else(|| fallback.to_string())
    }

    fn extract(&self) -> Option<String> {
        if let Some(detail) = self.body.get("detail").and_then(Value::as_str) {
            return Some(detail.to_string());
        }
        if let Some(first) = self
            .body
            .get("non_field_errors")
            .and_then(Value::as_array)
            .and_then(|errors| errors.first())
            .and_then(Value::as_str)
        {
            return Some(first.to_string());
        }
        if let Some(first) = self
            .body
            .as_array()
            .and_then(|errors| errors.first())
            .and_then(Value::as_str)
        {
            return Some(first.to_string());
        }
        self.named_field().map(|(_, message)| message)
    }

    /// First error array found on a named field, as `(field, message)`, so
    /// controllers can attach the message to that field.
    pub fn named_field(&self) -> Option<(String, String)> {
        let object = self.body.as_object()?;
        for (name, value) in object {
            if name == "detail" || name == "non_field_errors" {
                continue;
            }
            if let Some(message) = value
                .as_array()
                .and_then(|errors| errors.first())
                .and_then(Value::as_str)
            {
                return Some((name.clone(), message.to_string()));
            }
        }
        None
    }

    /// Error attached to a specific field, accepting both array and bare
    /// string shapes.
    pub fn field_message(&self, name: &str) -> Option<String> {
        let value = self.body.get(name)?;
        value
            .as_array()
            .and_then(|errors| errors.first())
            .and_then(Value::as_str)
            .or_else(|| value.as_str())
            .map(str::to_string)
    }

    /// Remaining cooldown seconds on a throttled OTP request, used to
    /// resynchronize the client resend timer with server-side throttling.
    pub fn cooldown_remaining_seconds(&self) -> Option<u64> {
        self.body
            .get("cooldown_remaining_seconds")
            .and_then(Value::as_u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ===== Extraction priority =====

    #[test]
    fn detail_string_wins() {
        let payload = ErrorPayload::new(json!({
            "detail": "Too many attempts.",
            "non_field_errors": ["ignored"],
            "code": ["also ignored"],
        }));
        assert_eq!(payload.message(), "Too many attempts.");
    }

    #[test]
    fn non_field_errors_beat_named_fields() {
        let payload = ErrorPayload::new(json!({
            "non_field_errors": ["Account is disabled.", "second"],
            "code": ["ignored"],
        }));
        assert_eq!(payload.message(), "Account is disabled.");
    }

    #[test]
    fn bare_list_payload_uses_its_first_element() {
        let payload = ErrorPayload::new(json!(["First problem.", "Second problem."]));
        assert_eq!(payload.message(), "First problem.");
    }

    #[test]
    fn named_field_errors_keep_the_field_name() {
        let payload = ErrorPayload::new(json!({ "code": ["Invalid or expired code."] }));
        assert_eq!(payload.message(), "Invalid or expired code.");
        assert_eq!(
            payload.named_field(),
            Some(("code".to_string(), "Invalid or expired code.".to_string()))
        );
    }

    #[test]
    fn unusable_bodies_fall_back() {
        for body in [json!(null), json!({}), json!({ "weird": 42 }), json!([])] {
            let payload = ErrorPayload::new(body);
            assert_eq!(payload.message(), FALLBACK_MESSAGE);
        }
        let payload = ErrorPayload::new(json!({}));
        assert_eq!(payload.message_or("Invalid code."), "Invalid code.");
    }

    // ===== Field targeting =====

    #[test]
    fn field_message_accepts_array_and_string_shapes() {
        let payload = ErrorPayload::new(json!({
            "code": ["Invalid code."],
            "password": "Too weak.",
        }));
        assert_eq!(payload.field_message("code").as_deref(), Some("Invalid code."));
        assert_eq!(payload.field_message("password").as_deref(), Some("Too weak."));
        assert_eq!(payload.field_message("identifier"), None);
    }

    // ===== Throttling =====

    #[test]
    fn throttle_bodies_expose_the_remaining_cooldown() {
        let payload = ErrorPayload::new(json!({
            "detail": "OTP was requested too recently.",
            "cooldown_remaining_seconds": 42,
        }));
        assert_eq!(payload.cooldown_remaining_seconds(), Some(42));
        assert_eq!(ErrorPayload::new(json!({})).cooldown_remaining_seconds(), None);
    }

    #[test]
    fn api_error_surfaces_payload_helpers() {
        let err = ApiError::Api {
            status: StatusCode::TOO_MANY_REQUESTS,
            payload: ErrorPayload::new(json!({
                "detail": "Slow down.",
                "cooldown_remaining_seconds": 30,
            })),
        };
        assert_eq!(err.user_message(), "Slow down.");
        assert_eq!(err.cooldown_remaining_seconds(), Some(30));

        let empty = ApiError::Api {
            status: StatusCode::BAD_REQUEST,
            payload: ErrorPayload::default(),
        };
        assert_eq!(empty.user_message_or("Incorrect password."), "Incorrect password.");
    }
}
