//! Anonymous HTTP gateway for the account API.

use reqwest::header;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::error::{ApiError, ErrorPayload};
use super::types::{AccessToken, Detail, IdentifierStatus, LoginTokens, OtpIssued, OtpLogin};

/// Default base URL for local development.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Thin typed client for the endpoints that need no bearer credential.
/// Cheap to clone; one `reqwest::Client` is shared across clones.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create from `KAVIR_API_BASE_URL`, defaulting to the local server.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("KAVIR_API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ===== Anonymous endpoints =====

    /// Does an account exist for this identifier, and does it have a password?
    pub async fn identifier_status(&self, identifier: &str) -> Result<IdentifierStatus, ApiError> {
        self.post("public/auth/status/", &json!({ "identifier": identifier }))
            .await
    }

    /// Issue an OTP to a phone number. A throttled request comes back as a
    /// 4xx whose body carries `cooldown_remaining_seconds`.
    pub async fn request_otp(&self, phone_number: &str) -> Result<OtpIssued, ApiError> {
        self.post("public/auth/otp/request/", &json!({ "phone_number": phone_number }))
            .await
    }

    /// Verify an OTP; a success is also a login and returns tokens.
    pub async fn verify_otp(&self, phone_number: &str, code: &str) -> Result<OtpLogin, ApiError> {
        self.post(
            "public/auth/otp/verify/",
            &json!({ "phone_number": phone_number, "code": code }),
        )
        .await
    }

    pub async fn login(&self, identifier: &str, password: &str) -> Result<LoginTokens, ApiError> {
        self.post(
            "public/auth/login/",
            &json!({ "identifier": identifier, "password": password }),
        )
        .await
    }

    /// Ask for a password reset. The response is a generic acknowledgement
    /// regardless of whether the account exists.
    pub async fn request_password_reset(&self, identifier: &str) -> Result<Detail, ApiError> {
        self.post("public/password-reset/request/", &json!({ "identifier": identifier }))
            .await
    }

    /// Email-link reset confirmation.
    pub async fn confirm_password_reset(
        &self,
        uid: &str,
        token: &str,
        password: &str,
    ) -> Result<Detail, ApiError> {
        self.post(
            "public/password-reset/confirm/",
            &json!({ "uid": uid, "token": token, "password": password }),
        )
        .await
    }

    /// OTP reset confirmation.
    pub async fn confirm_password_reset_otp(
        &self,
        phone_number: &str,
        code: &str,
        password: &str,
    ) -> Result<Detail, ApiError> {
        self.post(
            "public/password-reset/confirm-otp/",
            &json!({ "phone_number": phone_number, "code": code, "password": password }),
        )
        .await
    }

    /// Exchange the refresh credential for a fresh access credential.
    pub async fn refresh_access(&self, refresh: &str) -> Result<AccessToken, ApiError> {
        self.post("auth/token/refresh/", &json!({ "refresh": refresh }))
            .await
    }

    // ===== Request plumbing =====

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        debug!(path, "POST");
        let response = self
            .http
            .post(format!("{}/{}", self.base_url, path))
            .json(body)
            .send()
            .await?;
        Self::parse(path, response).await
    }

    pub(crate) async fn get_bearer<T: DeserializeOwned>(
        &self,
        path: &str,
        access: &str,
    ) -> Result<T, ApiError> {
        debug!(path, "GET (bearer)");
        let response = self
            .http
            .get(format!("{}/{}", self.base_url, path))
            .header(header::AUTHORIZATION, format!("Bearer {access}"))
            .send()
            .await?;
        Self::parse(path, response).await
    }

    pub(crate) async fn post_bearer<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        access: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        debug!(path, "POST (bearer)");
        let response = self
            .http
            .post(format!("{}/{}", self.base_url, path))
            .header(header::AUTHORIZATION, format!("Bearer {access}"))
            .json(body)
            .send()
            .await?;
        Self::parse(path, response).await
    }

    pub(crate) async fn patch_bearer<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        access: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        debug!(path, "PATCH (bearer)");
        let response = self
            .http
            .patch(format!("{}/{}", self.base_url, path))
            .header(header::AUTHORIZATION, format!("Bearer {access}"))
            .json(body)
            .send()
            .await?;
        Self::parse(path, response).await
    }

    async fn parse<T: DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        warn!(path, %status, body = %body, "API request rejected");
        Err(ApiError::Api {
            status,
            payload: ErrorPayload::new(body),
        })
    }
}
