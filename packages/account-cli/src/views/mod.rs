//! Step views: prompt loops rendering flow steps and delegating every
//! submission to the controllers.

pub mod login;
pub mod profile;
pub mod reset;

use colored::Colorize;

use auth_flow::FieldError;

/// Render a field-level error against its field, in red.
pub fn print_field_error(error: &Option<FieldError>) {
    if let Some(err) = error {
        println!("{}", format!("✗ {}", err.message).red());
    }
}

/// Render a toast-level (global) error.
pub fn print_toast(message: &str) {
    println!("{}", format!("⚠ {message}").yellow());
}
