//! Flow state machines and their async controllers.
//!
//! Each flow is a pure machine (`handle(event) -> Option<command>`, no IO)
//! plus a controller that owns it, executes decided commands against the
//! API gateway, and feeds the outcomes back in as events. Views only ever
//! see snapshots.

pub mod cooldown;
pub mod login;
pub mod reset;

use std::sync::{Mutex, MutexGuard};

/// Lock a flow mutex, recovering from poisoning. Critical sections are
/// short and never held across an await.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
