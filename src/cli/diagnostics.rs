//! Diagnostics command

use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, OutputFormat};
use crate::error::{ConfigError, Error, Result};
use crate::models::DiagnosticDisplay;
use crate::output::{self, json};
use crate::shots::DiagnosticsReport;

/// Run the diagnostics command.
///
/// Missing credentials are a finding here, not an error.
pub async fn run(opts: &GlobalOptions) -> Result<()> {
    let report = match CommandContext::new(opts) {
        Ok(ctx) => {
            let report = ctx.listing.diagnostics().await?;
            ctx.log_cache_stats();
            report
        }
        Err(Error::Config(ConfigError::MissingCredentials | ConfigError::NotFound)) => {
            DiagnosticsReport::default()
        }
        Err(err) => return Err(err),
    };

    match opts.format {
        OutputFormat::Json => println!("{}", json::format_json(&report)?),
        format => output::print_rows(&DiagnosticDisplay::rows(&report), format, None)?,
    }

    Ok(())
}
