//! The login flow: identifier resolution, then OTP or password.
//!
//! [`LoginFlow`] is the pure machine; [`LoginController`] executes its
//! commands against the gateway and runs the resend ticker.

use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use super::cooldown::{Cooldown, ResendTicker};
use super::lock;
use crate::api::client::ApiClient;
use crate::api::types::{IdentifierStatus, SessionTokens};
use crate::identifier::{Identifier, IdentifierKind};
use crate::validate::{self, Field, FieldError};

pub const NO_EMAIL_ACCOUNT_MESSAGE: &str =
    "No account found with this email. Please register by phone number.";
const INVALID_CODE_FALLBACK: &str = "Invalid code.";
const INCORRECT_PASSWORD_FALLBACK: &str = "Incorrect password.";

/// The single active step of the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStep {
    IdentifierInput,
    OtpInput,
    PasswordInput,
}

/// Facts the machine interprets: user submissions and API outcomes.
#[derive(Debug, Clone)]
pub enum LoginEvent {
    // User events
    IdentifierSubmitted { input: String },
    OtpSubmitted { code: String },
    PasswordSubmitted { password: String },
    ResendRequested,
    BackToIdentifier,
    UseOtpInstead,
    // API outcomes
    StatusReceived { status: IdentifierStatus },
    StatusFailed { message: String },
    OtpIssued { lifetime_seconds: u64 },
    OtpThrottled { cooldown_seconds: u64 },
    OtpIssueFailed { message: String },
    OtpVerified { tokens: SessionTokens, is_new_user: bool },
    OtpRejected { message: String },
    LoginSucceeded { tokens: SessionTokens },
    LoginRejected { message: String },
    // Ticker
    Tick,
}

/// IO the machine asks for; the controller executes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginCommand {
    CheckStatus { identifier: String },
    RequestOtp { phone_number: String },
    VerifyOtp { phone_number: String, code: String },
    LoginWithPassword { identifier: String, password: String },
}

/// Successful authentication. The caller installs the session and
/// navigates; the flow is done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCompletion {
    pub tokens: SessionTokens,
    pub is_new_user: bool,
}

/// Pure login state machine. No IO; every branch is testable directly.
pub struct LoginFlow {
    step: LoginStep,
    identifier: Option<Identifier>,
    cooldown: Cooldown,
    in_flight: bool,
    field_error: Option<FieldError>,
    completion: Option<LoginCompletion>,
}

impl Default for LoginFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginFlow {
    pub fn new() -> Self {
        Self {
            step: LoginStep::IdentifierInput,
            identifier: None,
            cooldown: Cooldown::default(),
            in_flight: false,
            field_error: None,
            completion: None,
        }
    }

    /// Interpret one event, update state, optionally decide on a command.
    /// Duplicate submissions while a request is in flight decide nothing.
    pub fn handle(&mut self, event: LoginEvent) -> Option<LoginCommand> {
        match event {
            LoginEvent::IdentifierSubmitted { input } => self.on_identifier_submitted(&input),
            LoginEvent::OtpSubmitted { code } => self.on_otp_submitted(&code),
            LoginEvent::PasswordSubmitted { password } => self.on_password_submitted(&password),
            LoginEvent::ResendRequested => self.on_resend_requested(),
            LoginEvent::BackToIdentifier => {
                // Dependent form state is cleared; the identifier is kept so
                // the user does not have to retype it.
                self.cooldown.reset();
                self.field_error = None;
                self.in_flight = false;
                self.set_step(LoginStep::IdentifierInput);
                None
            }
            LoginEvent::UseOtpInstead => self.on_use_otp_instead(),
            LoginEvent::StatusReceived { status } => self.on_status_received(status),
            LoginEvent::StatusFailed { message } => {
                self.in_flight = false;
                self.field_error = Some(FieldError::new(Field::Identifier, message));
                None
            }
            LoginEvent::OtpIssued { lifetime_seconds } => {
                self.in_flight = false;
                self.cooldown.arm(lifetime_seconds);
                None
            }
            LoginEvent::OtpThrottled { cooldown_seconds } => {
                // Resynchronize with server-side throttling state; the step
                // still advances so an earlier code can be entered.
                self.in_flight = false;
                self.cooldown.arm(cooldown_seconds);
                None
            }
            LoginEvent::OtpIssueFailed { message } => {
                self.in_flight = false;
                self.field_error = Some(FieldError::new(Field::Code, message));
                None
            }
            LoginEvent::OtpVerified { tokens, is_new_user } => {
                self.in_flight = false;
                info!(is_new_user, "login flow complete (otp)");
                self.completion = Some(LoginCompletion { tokens, is_new_user });
                None
            }
            LoginEvent::OtpRejected { message } => {
                self.in_flight = false;
                self.field_error = Some(FieldError::new(Field::Code, message));
                None
            }
            LoginEvent::LoginSucceeded { tokens } => {
                self.in_flight = false;
                info!("login flow complete (password)");
                self.completion = Some(LoginCompletion {
                    tokens,
                    is_new_user: false,
                });
                None
            }
            LoginEvent::LoginRejected { message } => {
                self.in_flight = false;
                self.field_error = Some(FieldError::new(Field::Password, message));
                None
            }
            LoginEvent::Tick => {
                self.cooldown.tick();
                None
            }
        }
    }

    fn on_identifier_submitted(&mut self, input: &str) -> Option<LoginCommand> {
        if self.in_flight || self.step != LoginStep::IdentifierInput {
            return None;
        }
        self.field_error = None;
        if let Err(err) = validate::identifier(input) {
            self.field_error = Some(err);
            return None;
        }
        let identifier = Identifier::parse(input)?;
        let normalized = identifier.normalized().to_string();
        self.identifier = Some(identifier);
        self.in_flight = true;
        Some(LoginCommand::CheckStatus {
            identifier: normalized,
        })
    }

    fn on_status_received(&mut self, status: IdentifierStatus) -> Option<LoginCommand> {
        self.in_flight = false;
        let identifier = self.identifier.as_ref()?;
        match identifier.kind() {
            IdentifierKind::PhoneNumber if status.has_password => {
                self.set_step(LoginStep::PasswordInput);
                None
            }
            IdentifierKind::PhoneNumber => {
                // Passwordless phone account (or no account yet): OTP login.
                let phone_number = identifier.normalized().to_string();
                self.set_step(LoginStep::OtpInput);
                self.in_flight = true;
                Some(LoginCommand::RequestOtp { phone_number })
            }
            IdentifierKind::Email if status.user_exists => {
                self.set_step(LoginStep::PasswordInput);
                None
            }
            IdentifierKind::Email => {
                self.field_error =
                    Some(FieldError::new(Field::Identifier, NO_EMAIL_ACCOUNT_MESSAGE));
                None
            }
            IdentifierKind::Invalid => None,
        }
    }

    fn on_otp_submitted(&mut self, code: &str) -> Option<LoginCommand> {
        if self.in_flight || self.step != LoginStep::OtpInput {
            return None;
        }
        self.field_error = None;
        if let Err(err) = validate::otp_code(code) {
            self.field_error = Some(err);
            return None;
        }
        let phone_number = self.identifier.as_ref()?.normalized().to_string();
        self.in_flight = true;
        Some(LoginCommand::VerifyOtp {
            phone_number,
            code: code.trim().to_string(),
        })
    }

    fn on_password_submitted(&mut self, password: &str) -> Option<LoginCommand> {
        if self.in_flight || self.step != LoginStep::PasswordInput {
            return None;
        }
        self.field_error = None;
        if let Err(err) = validate::login_password(password) {
            self.field_error = Some(err);
            return None;
        }
        let identifier = self.identifier.as_ref()?.normalized().to_string();
        self.in_flight = true;
        Some(LoginCommand::LoginWithPassword {
            identifier,
            password: password.to_string(),
        })
    }

    fn on_resend_requested(&mut self) -> Option<LoginCommand> {
        if self.step != LoginStep::OtpInput || self.in_flight || self.cooldown.is_active() {
            return None;
        }
        self.field_error = None;
        let phone_number = self.identifier.as_ref()?.normalized().to_string();
        self.in_flight = true;
        Some(LoginCommand::RequestOtp { phone_number })
    }

    /// Opt into OTP login from the password step; phone identifiers only.
    fn on_use_otp_instead(&mut self) -> Option<LoginCommand> {
        if self.step != LoginStep::PasswordInput || self.in_flight {
            return None;
        }
        let identifier = self.identifier.as_ref()?;
        if !identifier.is_phone() {
            return None;
        }
        let phone_number = identifier.normalized().to_string();
        self.field_error = None;
        self.set_step(LoginStep::OtpInput);
        if self.cooldown.is_active() {
            // A code from earlier in this flow may still be valid.
            return None;
        }
        self.in_flight = true;
        Some(LoginCommand::RequestOtp { phone_number })
    }

    fn set_step(&mut self, step: LoginStep) {
        debug!(from = ?self.step, to = ?step, "login step transition");
        self.step = step;
    }

    // ===== Accessors for controllers and tests =====

    pub fn step(&self) -> LoginStep {
        self.step
    }

    pub fn identifier(&self) -> Option<&Identifier> {
        self.identifier.as_ref()
    }

    pub fn field_error(&self) -> Option<&FieldError> {
        self.field_error.as_ref()
    }

    pub fn cooldown_remaining(&self) -> u64 {
        self.cooldown.remaining()
    }

    pub fn cooldown_is_active(&self) -> bool {
        self.cooldown.is_active()
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Whether the resend action is currently enabled.
    pub fn can_resend(&self) -> bool {
        self.step == LoginStep::OtpInput && !self.in_flight && !self.cooldown.is_active()
    }

    pub fn completion(&self) -> Option<&LoginCompletion> {
        self.completion.as_ref()
    }
}

/// What a view needs to render the current step.
#[derive(Debug, Clone)]
pub struct LoginSnapshot {
    pub step: LoginStep,
    /// The trimmed identifier as the user typed it, once accepted.
    pub identifier: Option<String>,
    pub is_phone: bool,
    pub field_error: Option<FieldError>,
    pub cooldown_remaining: u64,
    pub can_resend: bool,
    pub completion: Option<LoginCompletion>,
}

/// Owns a [`LoginFlow`] and an [`ApiClient`]; executes decided commands and
/// feeds the outcomes back until the machine settles. Dropping the
/// controller cancels the resend ticker.
pub struct LoginController {
    machine: Arc<Mutex<LoginFlow>>,
    client: ApiClient,
    ticker: Mutex<Option<ResendTicker>>,
}

impl LoginController {
    pub fn new(client: ApiClient) -> Self {
        Self {
            machine: Arc::new(Mutex::new(LoginFlow::new())),
            client,
            ticker: Mutex::new(None),
        }
    }

    pub async fn submit_identifier(&self, input: &str) -> LoginSnapshot {
        self.drive(LoginEvent::IdentifierSubmitted {
            input: input.to_string(),
        })
        .await
    }

    pub async fn submit_otp(&self, code: &str) -> LoginSnapshot {
        self.drive(LoginEvent::OtpSubmitted {
            code: code.to_string(),
        })
        .await
    }

    pub async fn submit_password(&self, password: &str) -> LoginSnapshot {
        self.drive(LoginEvent::PasswordSubmitted {
            password: password.to_string(),
        })
        .await
    }

    pub async fn resend_otp(&self) -> LoginSnapshot {
        self.drive(LoginEvent::ResendRequested).await
    }

    pub async fn back_to_identifier(&self) -> LoginSnapshot {
        self.drive(LoginEvent::BackToIdentifier).await
    }

    pub async fn use_otp_instead(&self) -> LoginSnapshot {
        self.drive(LoginEvent::UseOtpInstead).await
    }

    pub fn snapshot(&self) -> LoginSnapshot {
        let flow = lock(&self.machine);
        LoginSnapshot {
            step: flow.step(),
            identifier: flow.identifier().map(|id| id.raw().to_string()),
            is_phone: flow.identifier().is_some_and(Identifier::is_phone),
            field_error: flow.field_error().cloned(),
            cooldown_remaining: flow.cooldown_remaining(),
            can_resend: flow.can_resend(),
            completion: flow.completion().cloned(),
        }
    }

    async fn drive(&self, event: LoginEvent) -> LoginSnapshot {
        let mut next = lock(&self.machine).handle(event);
        while let Some(command) = next {
            let outcome = self.execute(command).await;
            next = lock(&self.machine).handle(outcome);
        }
        self.sync_ticker();
        self.snapshot()
    }

    async fn execute(&self, command: LoginCommand) -> LoginEvent {
        match command {
            LoginCommand::CheckStatus { identifier } => {
                match self.client.identifier_status(&identifier).await {
                    Ok(status) => LoginEvent::StatusReceived { status },
                    Err(err) => LoginEvent::StatusFailed {
                        message: err.user_message(),
                    },
                }
            }
            LoginCommand::RequestOtp { phone_number } => {
                match self.client.request_otp(&phone_number).await {
                    Ok(issued) => LoginEvent::OtpIssued {
                        lifetime_seconds: issued.otp_lifetime_seconds,
                    },
                    Err(err) => match err.cooldown_remaining_seconds() {
                        Some(cooldown_seconds) => LoginEvent::OtpThrottled { cooldown_seconds },
                        None => LoginEvent::OtpIssueFailed {
                            message: err.user_message(),
                        },
                    },
                }
            }
            LoginCommand::VerifyOtp { phone_number, code } => {
                match self.client.verify_otp(&phone_number, &code).await {
                    Ok(login) => LoginEvent::OtpVerified {
                        is_new_user: login.is_new_user,
                        tokens: login.into_tokens(),
                    },
                    Err(err) => LoginEvent::OtpRejected {
                        message: err.user_message_or(INVALID_CODE_FALLBACK),
                    },
                }
            }
            LoginCommand::LoginWithPassword { identifier, password } => {
                match self.client.login(&identifier, &password).await {
                    Ok(tokens) => LoginEvent::LoginSucceeded {
                        tokens: tokens.into_tokens(),
                    },
                    Err(err) => LoginEvent::LoginRejected {
                        message: err.user_message_or(INCORRECT_PASSWORD_FALLBACK),
                    },
                }
            }
        }
    }

    /// Keep the one-second ticker in step with the cooldown: running while
    /// the countdown is nonzero, gone otherwise.
    fn sync_ticker(&self) {
        let active = lock(&self.machine).cooldown_is_active();
        let mut ticker = lock(&self.ticker);
        if active {
            let needs_spawn = ticker.as_ref().map_or(true, ResendTicker::is_finished);
            if needs_spawn {
                let machine = Arc::clone(&self.machine);
                *ticker = Some(ResendTicker::spawn(move || {
                    let mut flow = lock(&machine);
                    flow.handle(LoginEvent::Tick);
                    flow.cooldown_is_active()
                }));
            }
        } else {
            *ticker = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> SessionTokens {
        SessionTokens {
            access: "access".into(),
            refresh: "refresh".into(),
        }
    }

    fn submit_phone(flow: &mut LoginFlow) -> Option<LoginCommand> {
        flow.handle(LoginEvent::IdentifierSubmitted {
            input: "09123456789".into(),
        })
    }

    // ===== Identifier step =====

    #[test]
    fn invalid_identifier_is_rejected_before_any_network_call() {
        let mut flow = LoginFlow::new();
        let cmd = flow.handle(LoginEvent::IdentifierSubmitted {
            input: "not-an-identifier".into(),
        });
        assert_eq!(cmd, None);
        assert_eq!(flow.step(), LoginStep::IdentifierInput);
        assert_eq!(flow.field_error().unwrap().field, Field::Identifier);
        assert!(!flow.in_flight());
    }

    #[test]
    fn identifier_submission_checks_status_with_the_normalized_form() {
        let mut flow = LoginFlow::new();
        let cmd = submit_phone(&mut flow);
        assert_eq!(
            cmd,
            Some(LoginCommand::CheckStatus {
                identifier: "+989123456789".into()
            })
        );
        assert!(flow.in_flight());
    }

    #[test]
    fn duplicate_submission_while_in_flight_decides_nothing() {
        let mut flow = LoginFlow::new();
        submit_phone(&mut flow);
        assert_eq!(submit_phone(&mut flow), None);
    }

    #[test]
    fn phone_without_password_goes_to_otp_and_requests_a_code() {
        let mut flow = LoginFlow::new();
        submit_phone(&mut flow);
        let cmd = flow.handle(LoginEvent::StatusReceived {
            status: IdentifierStatus {
                user_exists: true,
                has_password: false,
            },
        });
        assert_eq!(flow.step(), LoginStep::OtpInput);
        assert_eq!(
            cmd,
            Some(LoginCommand::RequestOtp {
                phone_number: "+989123456789".into()
            })
        );
    }

    #[test]
    fn phone_with_password_goes_to_password_without_an_otp_request() {
        let mut flow = LoginFlow::new();
        submit_phone(&mut flow);
        let cmd = flow.handle(LoginEvent::StatusReceived {
            status: IdentifierStatus {
                user_exists: true,
                has_password: true,
            },
        });
        assert_eq!(flow.step(), LoginStep::PasswordInput);
        assert_eq!(cmd, None);
    }

    #[test]
    fn known_email_goes_to_password() {
        let mut flow = LoginFlow::new();
        flow.handle(LoginEvent::IdentifierSubmitted {
            input: "user@x.com".into(),
        });
        let cmd = flow.handle(LoginEvent::StatusReceived {
            status: IdentifierStatus {
                user_exists: true,
                has_password: true,
            },
        });
        assert_eq!(flow.step(), LoginStep::PasswordInput);
        assert_eq!(cmd, None);
    }

    #[test]
    fn unknown_email_stays_put_with_a_field_error() {
        let mut flow = LoginFlow::new();
        flow.handle(LoginEvent::IdentifierSubmitted {
            input: "user@x.com".into(),
        });
        let cmd = flow.handle(LoginEvent::StatusReceived {
            status: IdentifierStatus {
                user_exists: false,
                has_password: false,
            },
        });
        assert_eq!(cmd, None); // Never a login or OTP command
        assert_eq!(flow.step(), LoginStep::IdentifierInput);
        let err = flow.field_error().unwrap();
        assert_eq!(err.field, Field::Identifier);
        assert_eq!(err.message, NO_EMAIL_ACCOUNT_MESSAGE);
    }

    #[test]
    fn status_failure_surfaces_on_the_identifier_field() {
        let mut flow = LoginFlow::new();
        submit_phone(&mut flow);
        flow.handle(LoginEvent::StatusFailed {
            message: "Service unavailable.".into(),
        });
        assert_eq!(flow.step(), LoginStep::IdentifierInput);
        assert_eq!(flow.field_error().unwrap().message, "Service unavailable.");
        assert!(!flow.in_flight());
    }

    // ===== OTP step =====

    fn to_otp_step(flow: &mut LoginFlow) {
        submit_phone(flow);
        flow.handle(LoginEvent::StatusReceived {
            status: IdentifierStatus {
                user_exists: true,
                has_password: false,
            },
        });
        flow.handle(LoginEvent::OtpIssued {
            lifetime_seconds: 120,
        });
    }

    #[test]
    fn issuance_arms_the_cooldown_and_disables_resend_until_it_runs_out() {
        let mut flow = LoginFlow::new();
        to_otp_step(&mut flow);
        assert_eq!(flow.cooldown_remaining(), 120);
        assert!(!flow.can_resend());
        assert_eq!(flow.handle(LoginEvent::ResendRequested), None);

        for _ in 0..120 {
            flow.handle(LoginEvent::Tick);
        }
        assert_eq!(flow.cooldown_remaining(), 0);
        assert!(flow.can_resend());
        assert!(matches!(
            flow.handle(LoginEvent::ResendRequested),
            Some(LoginCommand::RequestOtp { .. })
        ));
    }

    #[test]
    fn throttled_issuance_rearms_from_the_server_cooldown() {
        let mut flow = LoginFlow::new();
        submit_phone(&mut flow);
        flow.handle(LoginEvent::StatusReceived {
            status: IdentifierStatus {
                user_exists: true,
                has_password: false,
            },
        });
        flow.handle(LoginEvent::OtpThrottled {
            cooldown_seconds: 42,
        });
        assert_eq!(flow.step(), LoginStep::OtpInput);
        assert_eq!(flow.cooldown_remaining(), 42);
        assert!(!flow.can_resend());
    }

    #[test]
    fn malformed_code_never_reaches_the_network() {
        let mut flow = LoginFlow::new();
        to_otp_step(&mut flow);
        assert_eq!(
            flow.handle(LoginEvent::OtpSubmitted { code: "12a".into() }),
            None
        );
        assert_eq!(flow.field_error().unwrap().field, Field::Code);
    }

    #[test]
    fn verified_code_completes_the_flow() {
        let mut flow = LoginFlow::new();
        to_otp_step(&mut flow);
        let cmd = flow.handle(LoginEvent::OtpSubmitted {
            code: "123456".into(),
        });
        assert_eq!(
            cmd,
            Some(LoginCommand::VerifyOtp {
                phone_number: "+989123456789".into(),
                code: "123456".into(),
            })
        );
        flow.handle(LoginEvent::OtpVerified {
            tokens: tokens(),
            is_new_user: true,
        });
        let completion = flow.completion().unwrap();
        assert!(completion.is_new_user);
        assert_eq!(completion.tokens, tokens());
    }

    #[test]
    fn rejected_code_attaches_to_the_code_field_and_stays() {
        let mut flow = LoginFlow::new();
        to_otp_step(&mut flow);
        flow.handle(LoginEvent::OtpSubmitted {
            code: "123456".into(),
        });
        flow.handle(LoginEvent::OtpRejected {
            message: "Invalid code.".into(),
        });
        assert_eq!(flow.step(), LoginStep::OtpInput);
        assert_eq!(flow.field_error().unwrap().field, Field::Code);
        assert!(flow.completion().is_none());
    }

    // ===== Password step =====

    fn to_password_step(flow: &mut LoginFlow) {
        submit_phone(flow);
        flow.handle(LoginEvent::StatusReceived {
            status: IdentifierStatus {
                user_exists: true,
                has_password: true,
            },
        });
    }

    #[test]
    fn password_submission_logs_in_with_the_normalized_identifier() {
        let mut flow = LoginFlow::new();
        to_password_step(&mut flow);
        let cmd = flow.handle(LoginEvent::PasswordSubmitted {
            password: "hunter2hunter2".into(),
        });
        assert_eq!(
            cmd,
            Some(LoginCommand::LoginWithPassword {
                identifier: "+989123456789".into(),
                password: "hunter2hunter2".into(),
            })
        );
        flow.handle(LoginEvent::LoginSucceeded { tokens: tokens() });
        assert!(!flow.completion().unwrap().is_new_user);
    }

    #[test]
    fn short_password_is_rejected_client_side() {
        let mut flow = LoginFlow::new();
        to_password_step(&mut flow);
        assert_eq!(
            flow.handle(LoginEvent::PasswordSubmitted {
                password: "short".into()
            }),
            None
        );
        assert_eq!(flow.field_error().unwrap().field, Field::Password);
    }

    #[test]
    fn rejected_password_attaches_to_the_password_field() {
        let mut flow = LoginFlow::new();
        to_password_step(&mut flow);
        flow.handle(LoginEvent::PasswordSubmitted {
            password: "hunter2hunter2".into(),
        });
        flow.handle(LoginEvent::LoginRejected {
            message: "Incorrect password.".into(),
        });
        assert_eq!(flow.step(), LoginStep::PasswordInput);
        assert_eq!(flow.field_error().unwrap().field, Field::Password);
    }

    // ===== Resets and opt-ins =====

    #[test]
    fn back_to_identifier_clears_cooldown_and_errors_but_keeps_the_identifier() {
        let mut flow = LoginFlow::new();
        to_otp_step(&mut flow);
        flow.handle(LoginEvent::OtpRejected {
            message: "Invalid code.".into(),
        });

        flow.handle(LoginEvent::BackToIdentifier);
        assert_eq!(flow.step(), LoginStep::IdentifierInput);
        assert_eq!(flow.cooldown_remaining(), 0);
        assert!(flow.field_error().is_none());
        assert_eq!(flow.identifier().unwrap().raw(), "09123456789");
    }

    #[test]
    fn phone_user_can_opt_into_otp_from_the_password_step() {
        let mut flow = LoginFlow::new();
        to_password_step(&mut flow);
        let cmd = flow.handle(LoginEvent::UseOtpInstead);
        assert_eq!(flow.step(), LoginStep::OtpInput);
        assert_eq!(
            cmd,
            Some(LoginCommand::RequestOtp {
                phone_number: "+989123456789".into()
            })
        );
    }

    #[test]
    fn email_user_cannot_opt_into_otp() {
        let mut flow = LoginFlow::new();
        flow.handle(LoginEvent::IdentifierSubmitted {
            input: "user@x.com".into(),
        });
        flow.handle(LoginEvent::StatusReceived {
            status: IdentifierStatus {
                user_exists: true,
                has_password: true,
            },
        });
        assert_eq!(flow.handle(LoginEvent::UseOtpInstead), None);
        assert_eq!(flow.step(), LoginStep::PasswordInput);
    }

    #[test]
    fn opting_into_otp_can_still_hit_the_server_throttle() {
        let mut flow = LoginFlow::new();
        to_password_step(&mut flow);
        flow.handle(LoginEvent::UseOtpInstead);
        flow.handle(LoginEvent::OtpThrottled {
            cooldown_seconds: 42,
        });
        assert_eq!(flow.step(), LoginStep::OtpInput);
        assert_eq!(flow.cooldown_remaining(), 42);
        assert!(!flow.can_resend());
    }
}
