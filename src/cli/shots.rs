//! Shot listing and retrieval commands

use colored::Colorize;

use crate::cli::{CommandContext, ListArgs, OutputFormat};
use crate::error::Result;
use crate::models::ShotDisplay;
use crate::models::display::format_capture_time;
use crate::output::{self, json};
use crate::shots::{RawShotDecoder, ShotFilter, ShotMetadata, ShotPage, ViewParams};

/// Run the list command
pub async fn list(ctx: &CommandContext, args: ListArgs) -> Result<()> {
    let filter = ShotFilter {
        parent_ids: args.parents,
        earliest: args.earliest,
        latest: args.latest,
    };

    let prefs = &ctx.config.preferences;
    let view = ViewParams::default()
        .order(args.order.map(Into::into).unwrap_or(prefs.order))
        .num_results(args.limit.unwrap_or(prefs.num_results));

    let page = ctx
        .listing
        .list_shots(&filter, &view, args.continuation.as_deref())
        .await?;

    render_page(ctx.format, &page)
}

/// Print a listing page in the requested format
pub fn render_page(format: OutputFormat, page: &ShotPage) -> Result<()> {
    match format {
        OutputFormat::Pretty => {
            if page.results.is_empty() {
                println!("No shots found.");
            }
            for shot in &page.results {
                println!("{}", pretty_line(shot));
            }
            if let Some(ref token) = page.continuation {
                println!(
                    "\n{} shotlog list --continue '{}'",
                    "More:".dimmed(),
                    token
                );
            }
            Ok(())
        }
        _ => {
            let rows: Vec<ShotDisplay> = page.results.iter().map(ShotDisplay::from).collect();
            output::print_rows(&rows, format, page.continuation.as_deref())
        }
    }
}

fn pretty_line(shot: &ShotMetadata) -> String {
    let folder = shot.parent_path.as_deref().unwrap_or("-");
    format!(
        "{}  {}  {}",
        format_capture_time(shot.datetime).cyan(),
        shot.id.bold(),
        folder.dimmed()
    )
}

/// Run the get command
pub async fn get(ctx: &CommandContext, shot_id: &str, raw: bool) -> Result<()> {
    let shot = ctx.listing.get_shot(shot_id, &RawShotDecoder).await?;

    if raw {
        print!("{}", shot.contents);
        return Ok(());
    }

    match ctx.format {
        OutputFormat::Json => println!("{}", json::format_json(&shot)?),
        _ => {
            let meta = &shot.metadata;
            println!("{} {}", "Shot".bold(), meta.id.cyan());
            println!("  Name:     {}", meta.name);
            println!("  Captured: {}", format_capture_time(meta.datetime));
            println!("  Folder:   {}", meta.parent_path.as_deref().unwrap_or("-"));
            println!();
            print!("{}", shot.contents);
        }
    }

    Ok(())
}
