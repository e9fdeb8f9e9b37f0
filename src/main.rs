//! shotlog - browse espresso shot logs kept in Google Drive

use clap::Parser;
use env_logger::Env;
use log::debug;

mod auth;
mod cache;
mod cli;
mod client;
mod config;
mod error;
mod models;
mod output;
mod remote;
mod shots;

use cli::args::GlobalOptions;
use cli::{AuthCommands, Cli, CommandContext, Commands, GotoCommands};
use error::Result;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or(default_level));
    if debug {
        builder.filter_module("shotlog", log::LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let opts = GlobalOptions::from_cli(&cli);
    debug!("Global options: {:?}", opts);

    match cli.command {
        Commands::Version => {
            println!("shotlog version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Completion { shell } => {
            cli::completions::run(shell);
            Ok(())
        }
        Commands::Auth(cmd) => match cmd {
            AuthCommands::Set {
                client_id,
                client_secret,
                refresh_token,
            } => cli::auth::set(&opts, client_id, client_secret, refresh_token).await,
            AuthCommands::Status => cli::auth::status(&opts),
            AuthCommands::Purge => cli::auth::purge(&opts),
        },
        Commands::Diagnostics => cli::diagnostics::run(&opts).await,
        Commands::List(args) => {
            let ctx = CommandContext::new(&opts)?;
            let outcome = cli::shots::list(&ctx, args).await;
            ctx.log_cache_stats();
            outcome
        }
        Commands::Get { shot_id, raw } => {
            let ctx = CommandContext::new(&opts)?;
            cli::shots::get(&ctx, &shot_id, raw).await
        }
        Commands::Goto(cmd) => {
            let ctx = CommandContext::new(&opts)?;
            let outcome = match cmd {
                GotoCommands::Relative { shot_id, offset } => {
                    cli::goto::relative(&ctx, &shot_id, offset).await
                }
                GotoCommands::Index { index } => cli::goto::index(&ctx, index).await,
                GotoCommands::Yesterday => cli::goto::yesterday(&ctx).await,
            };
            ctx.log_cache_stats();
            outcome
        }
    }
}
