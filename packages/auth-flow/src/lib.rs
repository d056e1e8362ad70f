//! # auth-flow
//!
//! Client-side authentication and onboarding flows for the Kavir Market
//! account API: identifier resolution, OTP and password login, password
//! reset, and post-login redirect gating.
//!
//! ## Core Concepts
//!
//! Each flow is split into a **machine** and a **controller**:
//! - The machine is a pure state machine. It interprets an event (a user
//!   submission or an API outcome), updates its step and form state, and
//!   optionally decides on a command. No IO, no async.
//! - The controller owns the machine plus an [`ApiClient`]. It executes
//!   decided commands against the gateway and feeds the outcomes back in as
//!   events until the machine settles, then hands the views a snapshot.
//!
//! ```text
//! view input
//!     │
//!     ▼ submit_*()
//! Controller ──► Machine.handle(event) ─► Some(command)
//!     │                                        │
//!     │          Machine.handle(outcome) ◄─────┤ execute()
//!     │                 │                      ▼
//!     ▼                 └────◄───────────── ApiClient
//! Snapshot (step, field error, cooldown, completion)
//! ```
//!
//! ## Key Invariants
//!
//! 1. **One active step per flow** - transitions are forward-only except the
//!    explicit "back to identifier" / "try a different address" resets
//! 2. **Machines are pure** - every branch is testable without a network
//! 3. **Errors are recoverable** - server rejections become field or global
//!    errors in flow state; nothing is fatal to a flow
//! 4. **The resend cooldown resynchronizes** - throttled OTP requests re-arm
//!    the countdown from the server's remaining seconds
//!
//! The [`gate`] module holds the pure redirect rules (credential presence,
//! account status, current route), and [`api::Session`] is the boundary
//! between anonymous and bearer-authenticated calls, refreshing the access
//! credential transparently.

pub mod api;
pub mod config;
pub mod flow;
pub mod gate;
pub mod identifier;
pub mod validate;

pub use api::client::ApiClient;
pub use api::error::{ApiError, ErrorPayload};
pub use api::session::Session;
pub use api::types::SessionTokens;
pub use config::ApiConfig;
pub use flow::login::{LoginCompletion, LoginController, LoginFlow, LoginSnapshot, LoginStep};
pub use flow::reset::{ResetController, ResetFlow, ResetSnapshot, ResetStep};
pub use gate::{account_redirect, entry_redirect, GateConfig, GateDecision, Route};
pub use identifier::{classify, normalize_phone, Identifier, IdentifierKind};
pub use validate::{Field, FieldError};
