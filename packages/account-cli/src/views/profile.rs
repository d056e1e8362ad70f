//! Authenticated screens: dashboard, profile completion, password and
//! email management, and the post-login gate walk.

use anyhow::Result;
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Input, Password};

use auth_flow::api::types::{Profile, ProfileUpdate};
use auth_flow::{account_redirect, validate, ApiConfig, GateDecision, Route, Session};

use super::print_field_error;

/// Walk the redirect gate after a successful login: refetch the profile,
/// apply the rules, render the screen the gate settles on, and repeat
/// until the user lands on the dashboard.
pub async fn post_login_walk(
    session: &Session,
    config: &ApiConfig,
    is_new_user: bool,
) -> Result<()> {
    let mut route = if is_new_user {
        Route::Welcome {
            from_set_password: false,
        }
    } else {
        Route::Dashboard
    };

    loop {
        // Refetched on every pass; the profile is never mutated locally.
        let profile = session.profile().await?;
        match account_redirect(config.gate(), Some(&profile), route) {
            GateDecision::Loading => unreachable!("profile is always present here"),
            GateDecision::Redirect(next) => {
                route = next;
                continue;
            }
            GateDecision::Stay => {}
        }

        route = match route {
            Route::SetPassword => {
                set_password(session).await?;
                Route::Welcome {
                    from_set_password: true,
                }
            }
            Route::Welcome { .. } => {
                welcome(session, &profile).await?;
                Route::Dashboard
            }
            _ => {
                show(session).await?;
                return Ok(());
            }
        };
    }
}

/// Dashboard summary.
pub async fn show(session: &Session) -> Result<()> {
    let profile = session.profile().await?;
    println!();
    println!("{}", format!("Welcome back, {}.", profile.display_name()).bold());
    println!("  Phone: {} {}", profile.phone_number, verified_mark(profile.is_phone_number_verified));
    match &profile.email {
        Some(email) => println!("  Email: {} {}", email, verified_mark(profile.is_email_verified)),
        None => println!("  Email: {}", "not set".dimmed()),
    }
    println!(
        "  Name:  {}",
        full_name(&profile).unwrap_or_else(|| "not set".dimmed().to_string())
    );
    if !profile.is_profile_complete {
        println!("  {}", "Your profile is incomplete.".yellow());
    }
    Ok(())
}

/// The welcome / profile-completion screen for new accounts.
async fn welcome(session: &Session, profile: &Profile) -> Result<()> {
    println!();
    println!("{}", "Welcome! Let's finish setting up your account.".bold());
    if profile.is_profile_complete {
        return Ok(());
    }
    update(session).await
}

/// Prompt for profile fields and PATCH the changed ones.
pub async fn update(session: &Session) -> Result<()> {
    let theme = ColorfulTheme::default();
    let profile = session.profile().await?;

    let first_name: String = Input::with_theme(&theme)
        .with_prompt("First name")
        .with_initial_text(profile.first_name.clone().unwrap_or_default())
        .allow_empty(true)
        .interact_text()?;
    let last_name: String = Input::with_theme(&theme)
        .with_prompt("Last name")
        .with_initial_text(profile.last_name.clone().unwrap_or_default())
        .allow_empty(true)
        .interact_text()?;

    let update = ProfileUpdate {
        first_name: changed(profile.first_name.as_deref(), &first_name),
        last_name: changed(profile.last_name.as_deref(), &last_name),
    };
    if update.first_name.is_none() && update.last_name.is_none() {
        println!("{}", "Nothing to update.".dimmed());
        return Ok(());
    }

    match session.update_profile(&update).await {
        Ok(_) => println!("{}", "✓ Profile updated.".green()),
        Err(err) => println!("{}", format!("✗ {}", err.user_message()).red()),
    }
    Ok(())
}

/// Set the initial password on a passwordless account.
pub async fn set_password(session: &Session) -> Result<()> {
    let theme = ColorfulTheme::default();
    println!();
    println!("{}", "Set a password for your account.".bold());
    print_criteria(false);

    loop {
        let password = Password::with_theme(&theme)
            .with_prompt("New password")
            .interact()?;
        let confirmation = Password::with_theme(&theme)
            .with_prompt("Confirm password")
            .interact()?;
        if let Err(err) = validate::password_pair(&password, &confirmation, false) {
            print_field_error(&Some(err));
            continue;
        }
        match session.set_password(&password, &confirmation).await {
            Ok(_) => {
                println!("{}", "✓ Password set.".green());
                return Ok(());
            }
            Err(err) => println!("{}", format!("✗ {}", err.user_message()).red()),
        }
    }
}

pub async fn change_password(session: &Session) -> Result<()> {
    let theme = ColorfulTheme::default();
    print_criteria(true);

    let old_password = Password::with_theme(&theme)
        .with_prompt("Current password")
        .interact()?;
    loop {
        let password = Password::with_theme(&theme)
            .with_prompt("New password")
            .interact()?;
        let confirmation = Password::with_theme(&theme)
            .with_prompt("Confirm new password")
            .interact()?;
        if let Err(err) = validate::password_pair(&password, &confirmation, true) {
            print_field_error(&Some(err));
            continue;
        }
        match session
            .change_password(&old_password, &password, &confirmation)
            .await
        {
            Ok(_) => {
                println!("{}", "✓ Password changed.".green());
                return Ok(());
            }
            Err(err) => println!("{}", format!("✗ {}", err.user_message()).red()),
        }
    }
}

/// Attach an email address, then verify the emailed code.
pub async fn add_email(session: &Session) -> Result<()> {
    let theme = ColorfulTheme::default();

    let email: String = loop {
        let value: String = Input::with_theme(&theme)
            .with_prompt("Email address")
            .interact_text()?;
        match validate::email(&value) {
            Ok(()) => break value.trim().to_string(),
            Err(err) => print_field_error(&Some(err)),
        }
    };

    if let Err(err) = session.add_email(&email).await {
        println!("{}", format!("✗ {}", err.user_message()).red());
        return Ok(());
    }
    println!("A verification code was sent to {email}.");

    loop {
        let code: String = Input::with_theme(&theme)
            .with_prompt("Verification code")
            .interact_text()?;
        if let Err(err) = validate::otp_code(&code) {
            print_field_error(&Some(err));
            continue;
        }
        match session.verify_email(code.trim()).await {
            Ok(_) => {
                println!("{}", "✓ Email verified.".green());
                return Ok(());
            }
            Err(err) => println!("{}", format!("✗ {}", err.user_message_or("Invalid code.")).red()),
        }
    }
}

fn print_criteria(strict: bool) {
    for criterion in validate::password_criteria(strict) {
        println!("  {} {}", "·".dimmed(), criterion.label.dimmed());
    }
}

fn verified_mark(verified: bool) -> String {
    if verified {
        "(verified)".green().to_string()
    } else {
        "(unverified)".yellow().to_string()
    }
}

fn full_name(profile: &Profile) -> Option<String> {
    let first = profile.first_name.as_deref().unwrap_or_default();
    let last = profile.last_name.as_deref().unwrap_or_default();
    let name = format!("{first} {last}").trim().to_string();
    (!name.is_empty()).then_some(name)
}

fn changed(current: Option<&str>, entered: &str) -> Option<String> {
    let entered = entered.trim();
    if entered.is_empty() || Some(entered) == current {
        None
    } else {
        Some(entered.to_string())
    }
}
