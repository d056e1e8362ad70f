//! Wire types for the account API.

use serde::{Deserialize, Serialize};

/// Response to an identifier status check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierStatus {
    pub user_exists: bool,
    pub has_password: bool,
}

/// A freshly issued OTP. The lifetime doubles as the resend cooldown.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct OtpIssued {
    pub otp_lifetime_seconds: u64,
}

/// A successful OTP verification, which is also a login.
#[derive(Debug, Clone, Deserialize)]
pub struct OtpLogin {
    pub access_token: String,
    pub refresh_token: String,
    pub is_new_user: bool,
}

impl OtpLogin {
    pub fn into_tokens(self) -> SessionTokens {
        SessionTokens {
            access: self.access_token,
            refresh: self.refresh_token,
        }
    }
}

/// A successful password login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginTokens {
    pub access_token: String,
    pub refresh_token: String,
}

impl LoginTokens {
    pub fn into_tokens(self) -> SessionTokens {
        SessionTokens {
            access: self.access_token,
            refresh: self.refresh_token,
        }
    }
}

/// The bearer credential pair maintaining a session. The refresh credential
/// is long-lived; the access credential is re-derived transparently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTokens {
    pub access: String,
    pub refresh: String,
}

/// Generic acknowledgement body.
#[derive(Debug, Clone, Deserialize)]
pub struct Detail {
    pub detail: String,
}

/// Response to a refresh-credential exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub access: String,
}

/// The account profile, server-derived and read-only to the client; drives
/// the post-login redirect gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub phone_number: String,
    pub is_phone_number_verified: bool,
    pub email: Option<String>,
    pub is_email_verified: bool,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub has_password: bool,
    pub is_profile_complete: bool,
}

impl Profile {
    /// Display name for greetings: first name, else username, else the
    /// phone number.
    pub fn display_name(&self) -> &str {
        self.first_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.username.as_deref())
            .unwrap_or(&self.phone_number)
    }
}

/// PATCH body for profile updates; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_update_skips_absent_fields() {
        let update = ProfileUpdate {
            first_name: Some("Sara".into()),
            last_name: None,
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "first_name": "Sara" }));
    }

    #[test]
    fn otp_login_splits_into_tokens() {
        let login = OtpLogin {
            access_token: "a".into(),
            refresh_token: "r".into(),
            is_new_user: true,
        };
        let tokens = login.into_tokens();
        assert_eq!(tokens.access, "a");
        assert_eq!(tokens.refresh, "r");
    }

    #[test]
    fn display_name_falls_back_to_phone_number() {
        let mut profile = Profile {
            phone_number: "+989123456789".into(),
            is_phone_number_verified: true,
            email: None,
            is_email_verified: false,
            username: None,
            first_name: None,
            last_name: None,
            has_password: false,
            is_profile_complete: false,
        };
        assert_eq!(profile.display_name(), "+989123456789");
        profile.username = Some("sara".into());
        assert_eq!(profile.display_name(), "sara");
        profile.first_name = Some("Sara".into());
        assert_eq!(profile.display_name(), "Sara");
    }
}
