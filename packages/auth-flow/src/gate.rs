//! Session and redirect gating, as pure rules.
//!
//! Two layers: [`entry_redirect`] keys solely off refresh-credential
//! presence and keeps guests out of protected routes (and signed-in users
//! off guest-only ones); [`account_redirect`] consumes the server-derived
//! profile and decides where an authenticated user belongs. Both are
//! evaluated on every navigation and on every status refetch.

use crate::api::types::Profile;

/// The routes the gate can reason about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    ForgotPassword,
    Dashboard,
    SetPassword,
    Welcome { from_set_password: bool },
}

impl Route {
    /// Pages only meaningful when signed out.
    pub fn is_guest_only(&self) -> bool {
        matches!(self, Route::Login | Route::ForgotPassword)
    }

    /// Pages requiring a session.
    pub fn is_protected(&self) -> bool {
        matches!(
            self,
            Route::Dashboard | Route::SetPassword | Route::Welcome { .. }
        )
    }
}

/// Route-level gate: where to send a visitor, based only on whether a
/// refresh credential is present (not whether it is still valid).
pub fn entry_redirect(route: Route, has_refresh_credential: bool) -> Option<Route> {
    if has_refresh_credential && route.is_guest_only() {
        Some(Route::Dashboard)
    } else if !has_refresh_credential && route.is_protected() {
        Some(Route::Login)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GateConfig {
    /// Send accounts with incomplete profiles to the welcome screen. The
    /// product has not committed to enforcing this, so it ships off.
    pub require_complete_profile: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Account status not loaded yet; render a blocking loading state.
    Loading,
    Stay,
    Redirect(Route),
}

/// Post-login gate over the account profile.
///
/// Passwordless accounts are parked on the set-password screen first; once
/// a password exists that screen redirects onward. The welcome screen is
/// skipped for complete profiles unless the user just arrived from
/// set-password.
pub fn account_redirect(config: GateConfig, status: Option<&Profile>, route: Route) -> GateDecision {
    let Some(profile) = status else {
        return GateDecision::Loading;
    };

    if !profile.has_password {
        if route != Route::SetPassword {
            return GateDecision::Redirect(Route::SetPassword);
        }
        return GateDecision::Stay;
    }

    if route == Route::SetPassword {
        return GateDecision::Redirect(Route::Dashboard);
    }

    if let Route::Welcome { from_set_password } = route {
        if profile.is_profile_complete && !from_set_password {
            return GateDecision::Redirect(Route::Dashboard);
        }
        return GateDecision::Stay;
    }

    if config.require_complete_profile && !profile.is_profile_complete {
        return GateDecision::Redirect(Route::Welcome {
            from_set_password: false,
        });
    }

    GateDecision::Stay
}
