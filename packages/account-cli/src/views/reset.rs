//! The forgot-password screen.

use anyhow::Result;
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Input, Password, Select};

use auth_flow::{ApiClient, ResetController, ResetSnapshot, ResetStep};

use super::{print_field_error, print_toast};

pub async fn run(client: &ApiClient) -> Result<()> {
    let theme = ColorfulTheme::default();
    let controller = ResetController::new(client.clone());
    let mut snapshot = controller.snapshot();

    loop {
        if snapshot.completed {
            println!(
                "{}",
                "✓ Password reset. Sign in with your new password.".green()
            );
            return Ok(());
        }
        if let Some(message) = &snapshot.global_error {
            print_toast(message);
        }

        snapshot = match snapshot.step {
            ResetStep::Request => request_step(&theme, &controller, &snapshot).await?,
            ResetStep::ConfirmOtp => match confirm_step(&theme, &controller, &snapshot).await? {
                Some(next) => next,
                None => return Ok(()),
            },
            ResetStep::InfoSent => {
                println!("If an account exists for that address, a reset email is on its way.");
                let selection = Select::with_theme(&theme)
                    .items(&["Try a different address", "Done"])
                    .default(1)
                    .interact()?;
                if selection == 0 {
                    controller.try_different_address().await
                } else {
                    return Ok(());
                }
            }
        };
    }
}

async fn request_step(
    theme: &ColorfulTheme,
    controller: &ResetController,
    snapshot: &ResetSnapshot,
) -> Result<ResetSnapshot> {
    print_field_error(&snapshot.field_error);
    let mut input = Input::with_theme(theme).with_prompt("Email or phone number");
    if let Some(identifier) = &snapshot.identifier {
        input = input.with_initial_text(identifier.clone());
    }
    let value: String = input.interact_text()?;
    Ok(controller.submit_request(&value).await)
}

/// Returns `None` when the user abandons the flow.
async fn confirm_step(
    theme: &ColorfulTheme,
    controller: &ResetController,
    snapshot: &ResetSnapshot,
) -> Result<Option<ResetSnapshot>> {
    print_field_error(&snapshot.field_error);

    let selection = Select::with_theme(theme)
        .with_prompt("A code was sent to your phone")
        .items(&["Enter the code and a new password", "Try a different address", "Cancel"])
        .default(0)
        .interact()?;
    match selection {
        0 => {
            let code: String = Input::with_theme(theme)
                .with_prompt("6-digit code")
                .interact_text()?;
            let password = Password::with_theme(theme)
                .with_prompt("New password")
                .interact()?;
            let confirmation = Password::with_theme(theme)
                .with_prompt("Confirm new password")
                .interact()?;
            Ok(Some(
                controller
                    .submit_confirmation(&code, &password, &confirmation)
                    .await,
            ))
        }
        1 => Ok(Some(controller.try_different_address().await)),
        _ => Ok(None),
    }
}
