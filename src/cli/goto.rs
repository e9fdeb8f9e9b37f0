//! Navigation commands
//!
//! A navigation that finds nothing, or fails, falls back to the default
//! listing instead of erroring.

use colored::Colorize;
use serde::Serialize;

use crate::cli::{CommandContext, ListArgs, OutputFormat, shots};
use crate::error::Result;
use crate::output::json;
use crate::shots::Redirect;

#[derive(Serialize)]
struct Target<'a> {
    shot_id: &'a str,
}

pub async fn relative(ctx: &CommandContext, shot_id: &str, offset: i64) -> Result<()> {
    let redirect = ctx.listing.redirect_relative(shot_id, offset).await;
    follow(ctx, redirect).await
}

pub async fn index(ctx: &CommandContext, index: i64) -> Result<()> {
    let redirect = ctx.listing.redirect_absolute(index).await;
    follow(ctx, redirect).await
}

pub async fn yesterday(ctx: &CommandContext) -> Result<()> {
    let redirect = ctx.listing.redirect_yesterday().await;
    follow(ctx, redirect).await
}

async fn follow(ctx: &CommandContext, redirect: Redirect) -> Result<()> {
    match redirect {
        Redirect::Shot(ref id) => {
            match ctx.format {
                OutputFormat::Json => println!("{}", json::format_json(&Target { shot_id: id })?),
                _ => println!("{}", id),
            }
            Ok(())
        }
        Redirect::DefaultListing => {
            if ctx.format != OutputFormat::Json {
                eprintln!("{}", "No matching shot; showing the default listing".yellow());
            }
            shots::list(ctx, ListArgs::default()).await
        }
    }
}
