//! Environment-driven configuration.

use crate::api::client::DEFAULT_BASE_URL;
use crate::gate::GateConfig;

/// Client configuration. `dotenvy` loading is the binary's job; this only
/// reads the process environment.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    /// Whether the redirect gate sends accounts with incomplete profiles to
    /// the welcome screen. Off by default.
    pub require_complete_profile: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            require_complete_profile: false,
        }
    }
}

impl ApiConfig {
    /// Read `KAVIR_API_BASE_URL` and `KAVIR_REQUIRE_COMPLETE_PROFILE`, with
    /// local-development defaults.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("KAVIR_API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let require_complete_profile = std::env::var("KAVIR_REQUIRE_COMPLETE_PROFILE")
            .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
            .unwrap_or(false);
        Self {
            base_url,
            require_complete_profile,
        }
    }

    pub fn gate(&self) -> GateConfig {
        GateConfig {
            require_complete_profile: self.require_complete_profile,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_the_local_server_with_the_gate_off() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(!config.require_complete_profile);
        assert!(!config.gate().require_complete_profile);
    }
}
