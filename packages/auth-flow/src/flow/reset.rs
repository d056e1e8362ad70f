//! The forgot-password flow.
//!
//! Phone identifiers confirm with an OTP plus a new password; email
//! identifiers only get an "info sent" acknowledgement so account existence
//! never leaks. [`ResetFlow`] is the pure machine, [`ResetController`] the
//! IO shell.

use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use super::lock;
use crate::api::client::ApiClient;
use crate::identifier::{Identifier, IdentifierKind};
use crate::validate::{self, Field, FieldError};

const CONFIRM_FALLBACK: &str = "Invalid code or password issue.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetStep {
    Request,
    ConfirmOtp,
    InfoSent,
}

#[derive(Debug, Clone)]
pub enum ResetEvent {
    // User events
    IdentifierSubmitted {
        input: String,
    },
    ConfirmSubmitted {
        code: String,
        password: String,
        confirmation: String,
    },
    TryDifferentAddress,
    // API outcomes
    RequestAccepted,
    RequestFailed {
        message: String,
    },
    ConfirmAccepted,
    ConfirmRejected {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetCommand {
    SendRequest {
        identifier: String,
    },
    ConfirmOtp {
        phone_number: String,
        code: String,
        password: String,
    },
}

/// Pure reset state machine.
pub struct ResetFlow {
    step: ResetStep,
    identifier: Option<Identifier>,
    in_flight: bool,
    field_error: Option<FieldError>,
    /// Toast-level error; request failures are not tied to a field.
    global_error: Option<String>,
    completed: bool,
}

impl Default for ResetFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl ResetFlow {
    pub fn new() -> Self {
        Self {
            step: ResetStep::Request,
            identifier: None,
            in_flight: false,
            field_error: None,
            global_error: None,
            completed: false,
        }
    }

    pub fn handle(&mut self, event: ResetEvent) -> Option<ResetCommand> {
        match event {
            ResetEvent::IdentifierSubmitted { input } => self.on_identifier_submitted(&input),
            ResetEvent::ConfirmSubmitted {
                code,
                password,
                confirmation,
            } => self.on_confirm_submitted(&code, &password, &confirmation),
            ResetEvent::TryDifferentAddress => {
                self.field_error = None;
                self.global_error = None;
                self.in_flight = false;
                self.set_step(ResetStep::Request);
                None
            }
            ResetEvent::RequestAccepted => {
                self.in_flight = false;
                let kind = self.identifier.as_ref().map(Identifier::kind);
                match kind {
                    Some(IdentifierKind::PhoneNumber) => self.set_step(ResetStep::ConfirmOtp),
                    // The acknowledgement is the same whether or not the
                    // account exists.
                    Some(IdentifierKind::Email) => self.set_step(ResetStep::InfoSent),
                    _ => {}
                }
                None
            }
            ResetEvent::RequestFailed { message } => {
                self.in_flight = false;
                self.global_error = Some(message);
                None
            }
            ResetEvent::ConfirmAccepted => {
                self.in_flight = false;
                info!("password reset complete");
                self.completed = true;
                None
            }
            ResetEvent::ConfirmRejected { message } => {
                self.in_flight = false;
                self.field_error = Some(FieldError::new(Field::Code, message));
                None
            }
        }
    }

    fn on_identifier_submitted(&mut self, input: &str) -> Option<ResetCommand> {
        if self.in_flight || self.step != ResetStep::Request {
            return None;
        }
        self.field_error = None;
        self.global_error = None;
        if let Err(err) = validate::identifier(input) {
            self.field_error = Some(err);
            return None;
        }
        let identifier = Identifier::parse(input)?;
        let normalized = identifier.normalized().to_string();
        self.identifier = Some(identifier);
        self.in_flight = true;
        Some(ResetCommand::SendRequest {
            identifier: normalized,
        })
    }

    fn on_confirm_submitted(
        &mut self,
        code: &str,
        password: &str,
        confirmation: &str,
    ) -> Option<ResetCommand> {
        if self.in_flight || self.step != ResetStep::ConfirmOtp {
            return None;
        }
        self.field_error = None;
        self.global_error = None;
        if let Err(err) = validate::otp_code(code) {
            self.field_error = Some(err);
            return None;
        }
        if let Err(err) = validate::password_pair(password, confirmation, true) {
            self.field_error = Some(err);
            return None;
        }
        let phone_number = self.identifier.as_ref()?.normalized().to_string();
        self.in_flight = true;
        Some(ResetCommand::ConfirmOtp {
            phone_number,
            code: code.trim().to_string(),
            password: password.to_string(),
        })
    }

    fn set_step(&mut self, step: ResetStep) {
        debug!(from = ?self.step, to = ?step, "reset step transition");
        self.step = step;
    }

    // ===== Accessors =====

    pub fn step(&self) -> ResetStep {
        self.step
    }

    pub fn identifier(&self) -> Option<&Identifier> {
        self.identifier.as_ref()
    }

    pub fn field_error(&self) -> Option<&FieldError> {
        self.field_error.as_ref()
    }

    pub fn global_error(&self) -> Option<&str> {
        self.global_error.as_deref()
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }
}

/// What a view needs to render the current reset step.
#[derive(Debug, Clone)]
pub struct ResetSnapshot {
    pub step: ResetStep,
    pub identifier: Option<String>,
    pub field_error: Option<FieldError>,
    pub global_error: Option<String>,
    pub completed: bool,
}

/// Owns a [`ResetFlow`] and executes its commands against the gateway.
pub struct ResetController {
    machine: Arc<Mutex<ResetFlow>>,
    client: ApiClient,
}

impl ResetController {
    pub fn new(client: ApiClient) -> Self {
        Self {
            machine: Arc::new(Mutex::new(ResetFlow::new())),
            client,
        }
    }

    pub async fn submit_request(&self, input: &str) -> ResetSnapshot {
        self.drive(ResetEvent::IdentifierSubmitted {
            input: input.to_string(),
        })
        .await
    }

    pub async fn submit_confirmation(
        &self,
        code: &str,
        password: &str,
        confirmation: &str,
    ) -> ResetSnapshot {
        self.drive(ResetEvent::ConfirmSubmitted {
            code: code.to_string(),
            password: password.to_string(),
            confirmation: confirmation.to_string(),
        })
        .await
    }

    pub async fn try_different_address(&self) -> ResetSnapshot {
        self.drive(ResetEvent::TryDifferentAddress).await
    }

    pub fn snapshot(&self) -> ResetSnapshot {
        let flow = lock(&self.machine);
        ResetSnapshot {
            step: flow.step(),
            identifier: flow.identifier().map(|id| id.raw().to_string()),
            field_error: flow.field_error().cloned(),
            global_error: flow.global_error().map(str::to_string),
            completed: flow.is_completed(),
        }
    }

    async fn drive(&self, event: ResetEvent) -> ResetSnapshot {
        let mut next = lock(&self.machine).handle(event);
        while let Some(command) = next {
            let outcome = self.execute(command).await;
            next = lock(&self.machine).handle(outcome);
        }
        self.snapshot()
    }

    async fn execute(&self, command: ResetCommand) -> ResetEvent {
        match command {
            ResetCommand::SendRequest { identifier } => {
                match self.client.request_password_reset(&identifier).await {
                    Ok(_) => ResetEvent::RequestAccepted,
                    Err(err) => ResetEvent::RequestFailed {
                        message: err.user_message(),
                    },
                }
            }
            ResetCommand::ConfirmOtp {
                phone_number,
                code,
                password,
            } => {
                match self
                    .client
                    .confirm_password_reset_otp(&phone_number, &code, &password)
                    .await
                {
                    Ok(_) => ResetEvent::ConfirmAccepted,
                    Err(err) => ResetEvent::ConfirmRejected {
                        message: err.user_message_or(CONFIRM_FALLBACK),
                    },
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submit_phone(flow: &mut ResetFlow) -> Option<ResetCommand> {
        flow.handle(ResetEvent::IdentifierSubmitted {
            input: "09123456789".into(),
        })
    }

    // ===== Request step =====

    #[test]
    fn invalid_identifier_never_reaches_the_network() {
        let mut flow = ResetFlow::new();
        let cmd = flow.handle(ResetEvent::IdentifierSubmitted {
            input: "nope".into(),
        });
        assert_eq!(cmd, None);
        assert_eq!(flow.field_error().unwrap().field, Field::Identifier);
    }

    #[test]
    fn phone_request_moves_to_otp_confirmation() {
        let mut flow = ResetFlow::new();
        let cmd = submit_phone(&mut flow);
        assert_eq!(
            cmd,
            Some(ResetCommand::SendRequest {
                identifier: "+989123456789".into()
            })
        );
        flow.handle(ResetEvent::RequestAccepted);
        assert_eq!(flow.step(), ResetStep::ConfirmOtp);
    }

    #[test]
    fn email_request_moves_to_info_sent_regardless_of_account_existence() {
        let mut flow = ResetFlow::new();
        flow.handle(ResetEvent::IdentifierSubmitted {
            input: "user@x.com".into(),
        });
        flow.handle(ResetEvent::RequestAccepted);
        assert_eq!(flow.step(), ResetStep::InfoSent);
    }

    #[test]
    fn request_failure_is_a_toast_not_a_step_change() {
        let mut flow = ResetFlow::new();
        submit_phone(&mut flow);
        flow.handle(ResetEvent::RequestFailed {
            message: "Service unavailable.".into(),
        });
        assert_eq!(flow.step(), ResetStep::Request);
        assert_eq!(flow.global_error(), Some("Service unavailable."));
        assert!(flow.field_error().is_none());
    }

    #[test]
    fn duplicate_request_while_in_flight_decides_nothing() {
        let mut flow = ResetFlow::new();
        submit_phone(&mut flow);
        assert_eq!(submit_phone(&mut flow), None);
    }

    // ===== Confirm step =====

    fn to_confirm_step(flow: &mut ResetFlow) {
        submit_phone(flow);
        flow.handle(ResetEvent::RequestAccepted);
    }

    #[test]
    fn mismatched_passwords_attach_to_the_confirmation_field() {
        let mut flow = ResetFlow::new();
        to_confirm_step(&mut flow);
        let cmd = flow.handle(ResetEvent::ConfirmSubmitted {
            code: "123456".into(),
            password: "Abcdef1!".into(),
            confirmation: "Abcdef2!".into(),
        });
        assert_eq!(cmd, None);
        assert_eq!(flow.field_error().unwrap().field, Field::PasswordConfirm);
    }

    #[test]
    fn new_password_must_meet_the_strict_rule() {
        let mut flow = ResetFlow::new();
        to_confirm_step(&mut flow);
        // No special character
        let cmd = flow.handle(ResetEvent::ConfirmSubmitted {
            code: "123456".into(),
            password: "Abcdef12".into(),
            confirmation: "Abcdef12".into(),
        });
        assert_eq!(cmd, None);
        assert_eq!(flow.field_error().unwrap().field, Field::Password);
    }

    #[test]
    fn valid_confirmation_completes_the_flow() {
        let mut flow = ResetFlow::new();
        to_confirm_step(&mut flow);
        let cmd = flow.handle(ResetEvent::ConfirmSubmitted {
            code: "123456".into(),
            password: "Abcdef1!".into(),
            confirmation: "Abcdef1!".into(),
        });
        assert_eq!(
            cmd,
            Some(ResetCommand::ConfirmOtp {
                phone_number: "+989123456789".into(),
                code: "123456".into(),
                password: "Abcdef1!".into(),
            })
        );
        flow.handle(ResetEvent::ConfirmAccepted);
        assert!(flow.is_completed());
    }

    #[test]
    fn rejected_confirmation_attaches_to_the_code_field() {
        let mut flow = ResetFlow::new();
        to_confirm_step(&mut flow);
        flow.handle(ResetEvent::ConfirmSubmitted {
            code: "123456".into(),
            password: "Abcdef1!".into(),
            confirmation: "Abcdef1!".into(),
        });
        flow.handle(ResetEvent::ConfirmRejected {
            message: "Invalid code or password issue.".into(),
        });
        assert_eq!(flow.step(), ResetStep::ConfirmOtp);
        assert_eq!(flow.field_error().unwrap().field, Field::Code);
        assert!(!flow.is_completed());
    }

    // ===== Try a different address =====

    #[test]
    fn try_different_address_resets_from_info_sent() {
        let mut flow = ResetFlow::new();
        flow.handle(ResetEvent::IdentifierSubmitted {
            input: "user@x.com".into(),
        });
        flow.handle(ResetEvent::RequestAccepted);
        assert_eq!(flow.step(), ResetStep::InfoSent);

        flow.handle(ResetEvent::TryDifferentAddress);
        assert_eq!(flow.step(), ResetStep::Request);
        assert!(flow.field_error().is_none());
        assert!(flow.global_error().is_none());
    }

    #[test]
    fn try_different_address_resets_from_otp_confirmation() {
        let mut flow = ResetFlow::new();
        to_confirm_step(&mut flow);
        flow.handle(ResetEvent::ConfirmRejected {
            message: "Invalid code or password issue.".into(),
        });

        flow.handle(ResetEvent::TryDifferentAddress);
        assert_eq!(flow.step(), ResetStep::Request);
        assert!(flow.field_error().is_none());
    }
}
