//! The session boundary between anonymous and bearer-authenticated calls.
//!
//! A [`Session`] holds the long-lived refresh credential and exchanges it
//! for a fresh access credential before every bearer call. Route-level
//! gating keys off credential *presence* only; validity is the server's
//! verdict, surfaced as [`ApiError::SessionExpired`] when the exchange is
//! rejected.

use serde_json::json;
use tracing::warn;

use super::client::ApiClient;
use super::error::ApiError;
use super::types::{Detail, Profile, ProfileUpdate, SessionTokens};

pub struct Session {
    client: ApiClient,
    refresh_token: Option<String>,
}

impl Session {
    pub fn new(client: ApiClient, refresh_token: Option<String>) -> Self {
        Self {
            client,
            refresh_token,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Presence of the refresh credential, not its validity.
    pub fn is_authenticated(&self) -> bool {
        self.refresh_token.is_some()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Install credentials after a successful login.
    pub fn login(&mut self, tokens: &SessionTokens) {
        self.refresh_token = Some(tokens.refresh.clone());
    }

    pub fn logout(&mut self) {
        self.refresh_token = None;
    }

    /// Exchange the refresh credential for an access credential. Runs before
    /// every bearer call so the short-lived credential is never stored.
    async fn authorize(&self) -> Result<String, ApiError> {
        let refresh = self.refresh_token.as_deref().ok_or(ApiError::NotAuthenticated)?;
        match self.client.refresh_access(refresh).await {
            Ok(token) => Ok(token.access),
            Err(ApiError::Api { status, .. }) => {
                warn!(%status, "refresh credential rejected");
                Err(ApiError::SessionExpired)
            }
            Err(other) => Err(other),
        }
    }

    // ===== Bearer endpoints =====

    pub async fn profile(&self) -> Result<Profile, ApiError> {
        let access = self.authorize().await?;
        self.client.get_bearer("secure/profile/me/", &access).await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Profile, ApiError> {
        let access = self.authorize().await?;
        self.client
            .patch_bearer("secure/profile/me/", &access, update)
            .await
    }

    /// Set the initial password on a passwordless (OTP-only) account.
    pub async fn set_password(&self, password: &str, password2: &str) -> Result<Detail, ApiError> {
        let access = self.authorize().await?;
        self.client
            .post_bearer(
                "secure/profile/set-password/",
                &access,
                &json!({ "password": password, "password2": password2 }),
            )
            .await
    }

    pub async fn change_password(
        &self,
        old_password: &str,
        new_password: &str,
        new_password2: &str,
    ) -> Result<Detail, ApiError> {
        let access = self.authorize().await?;
        self.client
            .post_bearer(
                "secure/profile/change-password/",
                &access,
                &json!({
                    "old_password": old_password,
                    "new_password1": new_password,
                    "new_password2": new_password2,
                }),
            )
            .await
    }

    /// Attach a secondary email address; the server sends a verification
    /// code to it.
    pub async fn add_email(&self, email: &str) -> Result<Detail, ApiError> {
        let access = self.authorize().await?;
        self.client
            .post_bearer("secure/profile/email/add/", &access, &json!({ "email": email }))
            .await
    }

    /// Confirm the emailed verification code, OTP-style.
    pub async fn verify_email(&self, code: &str) -> Result<Detail, ApiError> {
        let access = self.authorize().await?;
        self.client
            .post_bearer("secure/profile/email/verify/", &access, &json!({ "code": code }))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        // Never reached by the tests below.
        ApiClient::new("http://localhost:1")
    }

    #[test]
    fn authentication_is_credential_presence() {
        let mut session = Session::new(client(), None);
        assert!(!session.is_authenticated());

        session.login(&SessionTokens {
            access: "a".into(),
            refresh: "r".into(),
        });
        assert!(session.is_authenticated());
        assert_eq!(session.refresh_token(), Some("r"));

        session.logout();
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn bearer_calls_without_a_credential_never_touch_the_network() {
        let session = Session::new(client(), None);
        let err = session.profile().await.unwrap_err();
        assert!(matches!(err, ApiError::NotAuthenticated));

        let err = session.set_password("Abcdef12", "Abcdef12").await.unwrap_err();
        assert!(matches!(err, ApiError::NotAuthenticated));
    }
}
