//! Credential commands

use std::sync::Arc;

use colored::Colorize;
use dialoguer::{Input, Password, theme::ColorfulTheme};
use serde::Serialize;

use crate::auth::{AuthSessionManager, CredentialSet};
use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::client::DriveClient;
use crate::config::Config;
use crate::error::Result;
use crate::output::json;

/// Store credentials, prompting for missing values, then verify them.
///
/// Credentials are saved before verification so a flaky network doesn't
/// lose what the user typed.
pub async fn set(
    opts: &GlobalOptions,
    client_id: Option<String>,
    client_secret: Option<String>,
    refresh_token: Option<String>,
) -> Result<()> {
    let theme = ColorfulTheme::default();

    let client_id = match client_id {
        Some(id) => id,
        None => Input::<String>::with_theme(&theme)
            .with_prompt("OAuth client ID")
            .interact_text()?,
    };
    let client_secret = match client_secret {
        Some(secret) => secret,
        None => Password::with_theme(&theme)
            .with_prompt("OAuth client secret")
            .interact()?,
    };
    let refresh_token = match refresh_token {
        Some(token) => token,
        None => Password::with_theme(&theme)
            .with_prompt("Refresh token")
            .interact()?,
    };
    let credentials = CredentialSet::new(client_id, client_secret, refresh_token);

    let mut config = Config::load_or_default(opts.config_ref())?;
    config.credentials = Some(credentials.clone());
    config.save_at(opts.config_ref())?;

    let config_path = Config::resolve_path(opts.config_ref())?;
    println!(
        "{} Credentials saved to: {}",
        "✓".green(),
        config_path.display()
    );

    println!("{}", "Verifying...".cyan());
    let api_host = opts.api_host.clone().or(config.api_host);
    let auth = AuthSessionManager::new(Arc::new(DriveClient::with_host(api_host)?));
    if auth.is_auth_valid(&credentials).await {
        println!("{} Credentials accepted", "✓".green());
    } else {
        println!("{} Credentials were rejected", "✗".red());
        println!("  → Check the values and run 'shotlog auth set' again");
    }

    Ok(())
}

#[derive(Debug, Serialize)]
struct AuthStatus {
    config_path: String,
    credentials_set: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_host: Option<String>,
}

/// Show stored credentials without contacting the server.
pub fn status(opts: &GlobalOptions) -> Result<()> {
    let config_path = Config::resolve_path(opts.config_ref())?;
    let config = Config::load_at(opts.config_ref())?;

    if opts.format == OutputFormat::Json {
        let status = AuthStatus {
            config_path: config_path.display().to_string(),
            credentials_set: config.credentials.is_some(),
            client_id: config.credentials.as_ref().map(|c| c.client_id.clone()),
            api_host: config.api_host.clone(),
        };
        println!("{}", json::format_json(&status)?);
        return Ok(());
    }

    println!("{}\n", "shotlog Credentials".bold());
    println!("Config file: {}", config_path.display().to_string().cyan());

    match config.credentials {
        Some(ref creds) => {
            println!("{} Client ID: {}", "✓".green(), creds.client_id);
            println!("{} Client secret: {}", "✓".green(), mask(&creds.client_secret));
            println!("{} Refresh token: {}", "✓".green(), mask(&creds.refresh_token));
        }
        None => {
            println!("{} Credentials not configured", "✗".red());
            println!("  → Run 'shotlog auth set' to configure");
        }
    }

    if let Some(ref host) = config.api_host {
        println!("{} API host: {}", "○".dimmed(), host);
    }

    Ok(())
}

/// Remove stored credentials wholesale.
pub fn purge(opts: &GlobalOptions) -> Result<()> {
    let mut config = Config::load_or_default(opts.config_ref())?;

    if config.credentials.take().is_none() {
        println!("No credentials stored");
        return Ok(());
    }

    config.save_at(opts.config_ref())?;
    println!("{} Credentials removed", "✓".green());
    Ok(())
}

/// Show only the last four characters of a secret.
fn mask(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 4 {
        return "****".to_string();
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("****{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_mask() {
        assert_eq!(mask("abc"), "****");
        assert_eq!(mask("1//0abcdefWXYZ"), "****WXYZ");
    }

    #[test]
    fn test_purge_removes_credentials() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        Config {
            credentials: Some(CredentialSet::new("id", "secret", "refresh")),
            api_host: Some("http://localhost:1".to_string()),
            ..Config::default()
        }
        .save_to(path.clone())
        .unwrap();
        let opts = GlobalOptions {
            format: OutputFormat::Table,
            config: path.to_str().map(str::to_string),
            api_host: None,
        };

        purge(&opts).unwrap();

        let config = Config::load_from(path).unwrap();
        assert!(config.credentials.is_none());
        assert_eq!(config.api_host.as_deref(), Some("http://localhost:1"));
    }
}
