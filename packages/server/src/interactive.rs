//! Interactive mode for the server.
//!
//! Prompts the user for bind address, port and reports directory before
//! starting the server.

use dialoguer::{Confirm, Input};

use crate::{ServerConfig, ServerError};

/// Runs the server in interactive mode, prompting for configuration.
///
/// Starts from [`ServerConfig::from_env`] and lets the user override the
/// bind address, port and reports directory, then delegates to
/// [`super::run_server_with`].
///
/// # Errors
///
/// Returns [`ServerError`] if the underlying server fails to start.
#[allow(clippy::future_not_send)]
pub async fn run() -> Result<(), ServerError> {
    println!("Neighborhood Analysis Server");
    println!();

    let mut config = ServerConfig::from_env();

    config.bind_addr = Input::new()
        .with_prompt("Bind address")
        .default(config.bind_addr.clone())
        .interact_text()
        .unwrap_or(config.bind_addr);

    config.port = Input::new()
        .with_prompt("Port")
        .default(config.port)
        .interact_text()
        .unwrap_or(config.port);

    let reports_dir: String = Input::new()
        .with_prompt("Reports directory")
        .default(config.reports_dir.display().to_string())
        .interact_text()
        .unwrap_or_else(|_| config.reports_dir.display().to_string());
    config.reports_dir = reports_dir.into();

    if !Confirm::new()
        .with_prompt(format!(
            "Start server on {}:{}?",
            config.bind_addr, config.port
        ))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    super::run_server_with(config).await
}
