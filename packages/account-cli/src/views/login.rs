//! The sign-in screen: one prompt loop per flow step.

use anyhow::Result;
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Input, Password, Select};

use auth_flow::{ApiClient, ApiConfig, LoginController, LoginSnapshot, LoginStep, Session};

use super::{print_field_error, profile, reset};
use crate::session::StoredSession;

pub async fn run(client: &ApiClient, config: &ApiConfig, store: &mut StoredSession) -> Result<()> {
    let theme = ColorfulTheme::default();
    let controller = LoginController::new(client.clone());
    let mut snapshot = controller.snapshot();

    loop {
        if let Some(completion) = snapshot.completion.clone() {
            store.refresh_token = Some(completion.tokens.refresh.clone());
            store.save()?;
            println!("{}", "✓ Signed in.".green());

            let session = Session::new(client.clone(), store.refresh_token.clone());
            profile::post_login_walk(&session, config, completion.is_new_user).await?;
            return Ok(());
        }

        snapshot = match snapshot.step {
            LoginStep::IdentifierInput => identifier_step(&theme, &controller, &snapshot).await?,
            LoginStep::OtpInput => otp_step(&theme, &controller, &snapshot).await?,
            LoginStep::PasswordInput => {
                match password_step(&theme, &controller, &snapshot).await? {
                    Some(next) => next,
                    // The user bailed out to the reset flow.
                    None => {
                        reset::run(client).await?;
                        return Ok(());
                    }
                }
            }
        };
    }
}

async fn identifier_step(
    theme: &ColorfulTheme,
    controller: &LoginController,
    snapshot: &LoginSnapshot,
) -> Result<LoginSnapshot> {
    print_field_error(&snapshot.field_error);
    let mut input = Input::with_theme(theme).with_prompt("Email or phone number");
    if let Some(identifier) = &snapshot.identifier {
        input = input.with_initial_text(identifier.clone());
    }
    let value: String = input.interact_text()?;
    Ok(controller.submit_identifier(&value).await)
}

async fn otp_step(
    theme: &ColorfulTheme,
    controller: &LoginController,
    snapshot: &LoginSnapshot,
) -> Result<LoginSnapshot> {
    print_field_error(&snapshot.field_error);

    let resend_label = if snapshot.can_resend {
        "Resend code".to_string()
    } else {
        format!("Resend code (wait {}s)", snapshot.cooldown_remaining)
    };
    let options = ["Enter the code", resend_label.as_str(), "Back"];
    let selection = Select::with_theme(theme)
        .with_prompt("A code was sent to your phone")
        .items(&options)
        .default(0)
        .interact()?;

    match selection {
        0 => {
            let code: String = Input::with_theme(theme)
                .with_prompt("6-digit code")
                .interact_text()?;
            Ok(controller.submit_otp(&code).await)
        }
        1 => Ok(controller.resend_otp().await),
        _ => Ok(controller.back_to_identifier().await),
    }
}

/// Returns `None` when the user chooses the forgot-password exit.
async fn password_step(
    theme: &ColorfulTheme,
    controller: &LoginController,
    snapshot: &LoginSnapshot,
) -> Result<Option<LoginSnapshot>> {
    print_field_error(&snapshot.field_error);

    let mut options = vec!["Enter your password", "Forgot password", "Back"];
    if snapshot.is_phone {
        options.insert(1, "Use a code instead");
    }
    let selection = Select::with_theme(theme)
        .with_prompt("This account has a password")
        .items(&options)
        .default(0)
        .interact()?;

    match options[selection] {
        "Enter your password" => {
            let password = Password::with_theme(theme)
                .with_prompt("Password")
                .interact()?;
            Ok(Some(controller.submit_password(&password).await))
        }
        "Use a code instead" => Ok(Some(controller.use_otp_instead().await)),
        "Forgot password" => Ok(None),
        _ => Ok(Some(controller.back_to_identifier().await)),
    }
}
