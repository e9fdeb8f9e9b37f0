//! CLI command definitions and handlers

use clap::{Args, Parser, Subcommand};
pub use clap_complete::Shell;

pub mod args;
pub mod auth;
pub mod completions;
pub mod context;
pub mod diagnostics;
pub mod goto;
pub mod shots;

pub use args::{OutputFormat, SortDir};
pub use context::CommandContext;

/// shotlog - browse espresso shot logs kept in Google Drive
#[derive(Parser, Debug)]
#[command(name = "shotlog")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (pretty, table, json)
    #[arg(
        long,
        global = true,
        env = "SHOTLOG_FORMAT",
        default_value = "pretty",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: OutputFormat,

    /// Override config file location
    #[arg(long, global = true, env = "SHOTLOG_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "SHOTLOG_DEBUG", hide_env = true)]
    pub debug: bool,

    /// Storage API host (development/testing)
    #[arg(long, global = true, env = "SHOTLOG_API_HOST", hide = true)]
    pub api_host: Option<String>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage stored credentials
    #[command(subcommand)]
    Auth(AuthCommands),

    /// List shots, newest first by default
    #[command(
        visible_alias = "ls",
        after_help = "EXAMPLES:\n  \
            shotlog list                                  # Newest 1000 shots\n  \
            shotlog list --limit 20                       # Newest 20\n  \
            shotlog list --earliest 201903 --order asc    # From March 2019 on\n  \
            shotlog list --continue 'latest=20190301T075959&...'"
    )]
    List(ListArgs),

    /// Show one shot's metadata and contents
    Get {
        /// Shot file ID
        shot_id: String,

        /// Print only the raw file contents
        #[arg(long)]
        raw: bool,
    },

    /// Jump to a shot by position
    #[command(subcommand)]
    Goto(GotoCommands),

    /// Check credentials and count shot files
    Diagnostics,

    /// Display version information
    Version,

    /// Generate shell completions
    #[command(after_help = "\
Install:
  bash:   shotlog completion bash > /etc/bash_completion.d/shotlog
  zsh:    shotlog completion zsh > \"${fpath[1]}/_shotlog\"
  fish:   shotlog completion fish > ~/.config/fish/completions/shotlog.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Credential management subcommands
#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Store credentials, prompting for any not given, then verify them
    Set {
        /// OAuth client ID
        #[arg(long)]
        client_id: Option<String>,

        /// OAuth client secret
        #[arg(long)]
        client_secret: Option<String>,

        /// Long-lived refresh token
        #[arg(long)]
        refresh_token: Option<String>,
    },

    /// Show stored credentials (offline)
    Status,

    /// Remove stored credentials
    Purge,
}

/// Shot listing filters and view options
#[derive(Debug, Clone, Args, Default)]
pub struct ListArgs {
    /// Only shots in this folder (repeatable)
    #[arg(long = "parent", short = 'p')]
    pub parents: Vec<String>,

    /// Earliest capture time, any prefix of YYYYMMDDTHHMMSS (inclusive)
    #[arg(long)]
    pub earliest: Option<String>,

    /// Latest capture time, any prefix of YYYYMMDDTHHMMSS (inclusive)
    #[arg(long)]
    pub latest: Option<String>,

    /// Sort order (default from config, otherwise desc)
    #[arg(long, short = 'o', value_enum)]
    pub order: Option<SortDir>,

    /// Maximum shots to show
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Continuation token from a previous listing
    #[arg(long = "continue", short = 'c')]
    pub continuation: Option<String>,
}

/// Navigation subcommands
#[derive(Subcommand, Debug)]
pub enum GotoCommands {
    /// Shot OFFSET steps from SHOT_ID (positive is newer, negative older)
    #[command(allow_negative_numbers = true)]
    Relative {
        /// Reference shot ID
        shot_id: String,

        /// Steps to move
        offset: i64,
    },

    /// Shot at position N (0 is the oldest, -1 the newest)
    #[command(allow_negative_numbers = true)]
    Index {
        /// Position
        index: i64,
    },

    /// Newest shot from yesterday or before
    Yesterday,
}
