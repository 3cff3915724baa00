//! Ahimè CLI - browse the catalog and manage a visitor's cart and favorites.
//!
//! Commands:
//! - `ahime catalog` - List and show products
//! - `ahime cart` - Show and edit the cart
//! - `ahime favorites` - Show and edit favorites
//! - `ahime session` - Start, inspect or discard sessions
//! - `ahime config` - Show or create the configuration file

mod commands;
mod config;
mod context;
mod output;

use std::path::PathBuf;

use ahime_observability::{init_tracing, LogLevel};
use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{CartArgs, CatalogArgs, ConfigArgs, FavoritesArgs, SessionArgs};

/// Ahimè storefront from the terminal
#[derive(Parser)]
#[command(name = "ahime")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Session to act on instead of the current one
    #[arg(short, long, global = true)]
    session: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the product catalog
    Catalog(CatalogArgs),

    /// Manage the shopping cart
    Cart(CartArgs),

    /// Manage favorite products
    #[command(alias = "favs")]
    Favorites(FavoritesArgs),

    /// Manage storefront sessions
    Session(SessionArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let output = output::Output::new(cli.verbose, cli.json);

    let ctx = match context::Context::load(cli.config.as_deref(), cli.session, output.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            output.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        ctx.config.logging.level
    };
    init_tracing(level, ctx.config.logging.format);

    let result = match cli.command {
        Commands::Catalog(args) => commands::catalog::run(args, &ctx),
        Commands::Cart(args) => commands::cart::run(args, &ctx),
        Commands::Favorites(args) => commands::favorites::run(args, &ctx),
        Commands::Session(args) => commands::session::run(args, &ctx),
        Commands::Config(args) => commands::config::run(args, &ctx),
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
