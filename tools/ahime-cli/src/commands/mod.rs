//! CLI command implementations.

pub mod cart;
pub mod catalog;
pub mod config;
pub mod favorites;
pub mod session;

use clap::{Args, Subcommand};

/// Arguments for the catalog command.
#[derive(Args)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: CatalogCommand,
}

#[derive(Subcommand)]
pub enum CatalogCommand {
    /// List products.
    List {
        /// Only this category.
        #[arg(short, long)]
        category: Option<String>,

        /// Only products with an active promotion.
        #[arg(long)]
        on_sale: bool,

        /// Only products in stock.
        #[arg(long)]
        in_stock: bool,

        /// Text to look for in names and descriptions.
        #[arg(short, long)]
        search: Option<String>,

        /// featured, price-asc, price-desc, name-asc, name-desc or rating.
        #[arg(long, default_value = "featured")]
        sort: String,

        /// Page number (1-based).
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Products per page (1-100).
        #[arg(long, default_value = "12")]
        per_page: usize,
    },
    /// Show one product.
    Show {
        /// Product ID.
        id: String,
    },
}

/// Arguments for the cart command.
#[derive(Args)]
pub struct CartArgs {
    #[command(subcommand)]
    pub command: Option<CartCommand>,
}

#[derive(Subcommand)]
pub enum CartCommand {
    /// Show cart lines and totals.
    Show,
    /// Add a product.
    Add {
        /// Product ID.
        id: String,

        /// Units to add.
        #[arg(short, long, default_value = "1", allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a product's line.
    Remove {
        /// Product ID.
        id: String,
    },
    /// Set a line's quantity; 0 removes it.
    Set {
        /// Product ID.
        id: String,

        /// New quantity.
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the cart.
    Clear {
        /// Skip confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the favorites command.
#[derive(Args)]
pub struct FavoritesArgs {
    #[command(subcommand)]
    pub command: Option<FavoritesCommand>,
}

#[derive(Subcommand)]
pub enum FavoritesCommand {
    /// List favorite products.
    List,
    /// Like a product.
    Add {
        /// Product ID.
        id: String,
    },
    /// Unlike a product.
    Remove {
        /// Product ID.
        id: String,
    },
    /// Like or unlike a product.
    Toggle {
        /// Product ID.
        id: String,
    },
    /// Remove every favorite.
    Clear {
        /// Skip confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
    /// Put a favorite in the cart and drop it from favorites.
    MoveToCart {
        /// Product ID.
        id: String,

        /// Units to add.
        #[arg(short, long, default_value = "1")]
        quantity: i64,
    },
}

/// Arguments for the session command.
#[derive(Args)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub command: SessionCommand,
}

#[derive(Subcommand)]
pub enum SessionCommand {
    /// Start a fresh session and make it current.
    New,
    /// Show the current session.
    Show,
    /// Delete the current session's saved state.
    Discard {
        /// Skip confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
    /// List saved sessions.
    List,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration.
    Show,
    /// Write a default ahime.toml in the current directory.
    Init {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,

        /// Write ahime.json instead.
        #[arg(long = "as-json")]
        json: bool,
    },
}

/// Ask before a destructive action unless `--yes` was given.
pub(crate) fn confirm(prompt: &str, yes: bool) -> anyhow::Result<bool> {
    if yes {
        return Ok(true);
    }
    Ok(dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::fs;
    use std::path::Path;

    use ahime_cache::SessionId;
    use ahime_commerce::snapshot::StorefrontSnapshot;

    use crate::context::Context;
    use crate::output::Output;

    pub const SESSION: &str = "sess_test";

    /// Context over the demo catalog, storing sessions under `dir`.
    pub fn demo_context(dir: &Path, session: Option<&str>) -> Context {
        let catalog = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/catalog.json");
        let config = dir.join("ahime.toml");
        fs::write(&config, format!("[catalog]\npath = '{}'\n", catalog.display())).unwrap();
        Context::load(
            Some(&config),
            session.map(str::to_string),
            Output::new(false, true),
        )
        .unwrap()
    }

    /// Saved snapshot of [`SESSION`], if any.
    pub fn saved(ctx: &Context) -> Option<StorefrontSnapshot> {
        ctx.store().unwrap().snapshot(&SessionId::new(SESSION)).unwrap()
    }

    pub fn cart_lines(snapshot: &StorefrontSnapshot) -> Vec<(&str, i64)> {
        snapshot
            .cart
            .iter()
            .map(|l| (l.product_id.as_str(), l.quantity))
            .collect()
    }
}
