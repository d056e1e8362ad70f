//! Typed gateway to the account API.
//!
//! [`client::ApiClient`] wraps the anonymous endpoints; [`session::Session`]
//! is the boundary in front of the bearer-authenticated ones, exchanging the
//! long-lived refresh credential for a fresh access credential before each
//! call. Non-2xx responses are parsed into [`error::ErrorPayload`] so flow
//! controllers can attach server messages to the right form field.

pub mod client;
pub mod error;
pub mod session;
pub mod types;
