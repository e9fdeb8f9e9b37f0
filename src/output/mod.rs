//! Output formatting for CLI results

use serde::Serialize;
use tabled::Tabled;

use crate::cli::OutputFormat;
use crate::error::Result;

pub mod json;
pub mod table;

/// Print rows as a table or JSON envelope.
///
/// `Pretty` is handled by each command; here it falls back to the table.
pub fn print_rows<T: Tabled + Serialize>(
    rows: &[T],
    format: OutputFormat,
    continuation: Option<&str>,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", json::format_json_page(rows, continuation)?);
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("{}", table::format_table(rows));
            if let Some(token) = continuation {
                println!("\nMore results: --continue '{}'", token);
            }
        }
    }
    Ok(())
}
