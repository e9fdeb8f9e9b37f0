//! Global CLI options shared across all commands
//!
//! Collects the global flags once so handlers take a single argument.

use crate::cli::{Cli, OutputFormat};

/// Global CLI options passed to all command handlers.
///
/// Precedence: CLI flag > environment variable > config file > default.
/// This struct captures the CLI/env layer; config file values are applied in
/// `CommandContext`.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    /// Output format (pretty, table, json)
    pub format: OutputFormat,

    /// Custom config file path (defaults to ~/.shotlog/config.yaml)
    pub config: Option<String>,

    /// Custom storage API host for development/testing
    pub api_host: Option<String>,
}

impl GlobalOptions {
    /// Create GlobalOptions from a parsed CLI struct.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format,
            config: cli.config.clone(),
            api_host: cli.api_host.clone(),
        }
    }

    /// Get config path as `Option<&str>`.
    pub fn config_ref(&self) -> Option<&str> {
        self.config.as_deref()
    }
}
