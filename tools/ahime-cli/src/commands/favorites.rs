//! Favorites commands.

use ahime_commerce::ProductId;
use anyhow::Result;

use super::{confirm, FavoritesArgs, FavoritesCommand};
use crate::context::{Context, Visit};
use crate::output::{price_tag, stock_badge};

/// Run the favorites command.
pub fn run(args: FavoritesArgs, ctx: &Context) -> Result<()> {
    let mut visit = ctx.open_visit()?;

    match args.command.unwrap_or(FavoritesCommand::List) {
        FavoritesCommand::List => {
            list(&visit, ctx);
            return Ok(());
        }
        FavoritesCommand::Add { id } => {
            let id = ProductId::new(id);
            let product = visit.catalog.require(&id)?;
            if visit.storefront.add_to_favorites(product) {
                ctx.output.success(&format!("{} ajouté aux favoris", id));
            } else {
                ctx.output.info(&format!("{} est déjà un favori", id));
            }
        }
        FavoritesCommand::Remove { id } => {
            let id = ProductId::new(id);
            if visit.storefront.remove_from_favorites(&id) {
                ctx.output.success(&format!("{} retiré des favoris", id));
            } else {
                ctx.output.warn(&format!("{} n'est pas un favori", id));
            }
        }
        FavoritesCommand::Toggle { id } => {
            let id = ProductId::new(id);
            if visit.storefront.toggle_favorite_by_id(&visit.catalog, &id)? {
                ctx.output.success(&format!("{} ajouté aux favoris", id));
            } else {
                ctx.output.success(&format!("{} retiré des favoris", id));
            }
        }
        FavoritesCommand::Clear { yes } => {
            if visit.storefront.favorites().is_empty() {
                ctx.output.info("Aucun favori");
                return Ok(());
            }
            if !confirm("Supprimer tous les favoris ?", yes)? {
                ctx.output.warn("Annulé");
                return Ok(());
            }
            visit.storefront.clear_favorites();
            ctx.output.success("Favoris supprimés");
        }
        FavoritesCommand::MoveToCart { id, quantity } => {
            let id = ProductId::new(id);
            if visit.storefront.move_favorite_to_cart(&id, quantity)? {
                ctx.output.success(&format!("{} déplacé dans le panier", id));
            } else {
                ctx.output.warn(&format!("{} n'est pas un favori", id));
            }
        }
    }

    ctx.save_visit(&visit)?;
    if ctx.output.is_json() {
        ctx.output.json(&visit.storefront.summary());
    } else {
        ctx.output.kv(
            "favoris",
            &visit.storefront.total_favorites().to_string(),
        );
    }
    Ok(())
}

fn list(visit: &Visit, ctx: &Context) {
    let favorites = visit.storefront.favorites();

    if ctx.output.is_json() {
        ctx.output.json(&favorites.entries());
        return;
    }

    ctx.output
        .header(&format!("Favoris ({})", favorites.total_favorites()));
    if favorites.is_empty() {
        ctx.output.info("Aucun favori pour le moment.");
        return;
    }

    for product in favorites.entries() {
        // Favorites keep the copy taken when liked; show current stock.
        let stock = visit
            .catalog
            .get(&product.id)
            .map(|p| p.stock)
            .unwrap_or(product.stock);
        ctx.output.table_row(
            &[
                product.id.as_str(),
                &product.name,
                &price_tag(product),
                &stock_badge(stock),
            ],
            &[18, 28, 24, 16],
        );
    }
}
