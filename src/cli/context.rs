//! Command execution context
//!
//! Loads config, validates credentials and builds the listing engine so
//! handlers don't repeat the setup.

use std::sync::Arc;

use log::debug;

use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::client::DriveClient;
use crate::config::Config;
use crate::error::Result;
use crate::remote::RemoteFileClient;
use crate::shots::ShotListing;

/// Context for command execution containing config, engine, and runtime options.
pub struct CommandContext {
    /// Loaded and validated configuration
    pub config: Config,
    /// Shot listing engine over the cached remote client
    pub listing: ShotListing<DriveClient>,
    /// Output format preference
    pub format: OutputFormat,
}

impl CommandContext {
    /// Create a new command context with full initialization.
    ///
    /// # Errors
    /// Returns error if config cannot be loaded or holds no credentials.
    pub fn new(opts: &GlobalOptions) -> Result<Self> {
        let config = Config::load_at(opts.config_ref())?;
        let credentials = config.require_credentials()?.clone();

        let api_host = opts.api_host.clone().or_else(|| config.api_host.clone());
        if let Some(ref host) = api_host {
            debug!("Using storage API host {}", host);
        }

        let remote = RemoteFileClient::new(DriveClient::with_host(api_host)?);
        remote.set_credentials(credentials);

        let listing =
            ShotListing::new(Arc::new(remote)).with_page_size(config.preferences.page_size);

        Ok(Self {
            config,
            listing,
            format: opts.format,
        })
    }

    pub fn remote(&self) -> &RemoteFileClient<DriveClient> {
        self.listing.remote()
    }

    /// Log per-category cache usage for this invocation.
    pub fn log_cache_stats(&self) {
        for stats in self.remote().cache_stats() {
            debug!(
                "Cache {}: {} entries (capacity {})",
                stats.name,
                stats.entries,
                stats
                    .capacity
                    .map_or_else(|| "unbounded".to_string(), |c| c.to_string())
            );
        }
    }
}
