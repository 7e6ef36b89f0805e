use serde_json::json;

use super::{CommandOutput, load_session};
use crate::cli::OutputOptions;
use crate::commands::interactive::prompt_text;
use crate::config::Config;
use crate::error::{AdminError, Result};
use crate::remote::AuthClient;
use crate::utils::{is_stdin_tty, validate_login};

/// Log in and persist the session token
pub async fn cmd_login(email: &str, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None if is_stdin_tty() => {
            // Reject a bad email before asking for the password
            validate_login(email, "-")?;
            prompt_text("Password", None)?
        }
        None => {
            let err = validate_login(email, "").err();
            return Err(err.unwrap_or_else(|| {
                AdminError::Validation("Password is required".to_string())
            }));
        }
    };

    let config = Config::load()?;
    let client = AuthClient::new(&config.base_url(), config.request_timeout())?;
    let response = client.login(email, &password).await?;

    let mut session = load_session()?;
    let user = email.trim().to_string();
    session.login(response.token, Some(user.clone()))?;

    let mut text = format!("Logged in as {user}");
    if let Some(message) = response.message.as_deref().filter(|m| !m.is_empty()) {
        text.push_str(&format!(" ({message})"));
    }
    CommandOutput::new(json!({
        "action": "login",
        "user": user,
        "success": true,
    }))
    .with_text(text)
    .print(OutputOptions::default())
}

/// Remove the stored session token
pub fn cmd_logout() -> Result<()> {
    let mut session = load_session()?;
    let was_authenticated = session.is_authenticated();
    session.logout()?;

    let text = if was_authenticated {
        "Logged out"
    } else {
        "Not logged in"
    };
    CommandOutput::new(json!({
        "action": "logout",
        "success": true,
    }))
    .with_text(text)
    .print(OutputOptions::default())
}
