//! Cart commands.

use ahime_commerce::ProductId;
use anyhow::Result;
use serde_json::json;

use super::{confirm, CartArgs, CartCommand};
use crate::context::{Context, Visit};

/// Run the cart command.
pub fn run(args: CartArgs, ctx: &Context) -> Result<()> {
    let mut visit = ctx.open_visit()?;

    match args.command.unwrap_or(CartCommand::Show) {
        CartCommand::Show => return show(&visit, ctx),
        CartCommand::Add { id, quantity } => {
            let id = ProductId::new(id);
            let line_quantity = visit
                .storefront
                .add_to_cart_by_id(&visit.catalog, &id, quantity)?;
            ctx.output
                .success(&format!("{} × {} dans le panier", line_quantity, id));
        }
        CartCommand::Remove { id } => {
            let id = ProductId::new(id);
            if visit.storefront.remove_from_cart(&id) {
                ctx.output.success(&format!("{} retiré du panier", id));
            } else {
                ctx.output.warn(&format!("{} n'est pas dans le panier", id));
            }
        }
        CartCommand::Set { id, quantity } => {
            let id = ProductId::new(id);
            if !visit.storefront.update_quantity(&id, quantity)? {
                ctx.output.warn(&format!("{} n'est pas dans le panier", id));
            } else if quantity <= 0 {
                ctx.output.success(&format!("{} retiré du panier", id));
            } else {
                ctx.output.success(&format!("{} × {}", quantity, id));
            }
        }
        CartCommand::Clear { yes } => {
            if visit.storefront.cart().is_empty() {
                ctx.output.info("Le panier est déjà vide");
                return Ok(());
            }
            if !confirm("Vider le panier ?", yes)? {
                ctx.output.warn("Annulé");
                return Ok(());
            }
            visit.storefront.clear_cart();
            ctx.output.success("Panier vidé");
        }
    }

    ctx.save_visit(&visit)?;
    summary(&visit, ctx);
    Ok(())
}

fn show(visit: &Visit, ctx: &Context) -> Result<()> {
    let cart = visit.storefront.cart();
    let pricing = cart.pricing()?;

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "session": visit.session_id.as_str(),
            "lines": cart.lines(),
            "pricing": pricing,
            "totalItems": cart.total_items(),
        }));
        return Ok(());
    }

    ctx.output.header("Panier");
    if cart.is_empty() {
        ctx.output.info("Votre panier est vide.");
        return Ok(());
    }

    for (line, priced) in cart.lines().iter().zip(&pricing.lines) {
        ctx.output.table_row(
            &[
                line.product.id.as_str(),
                &line.product.name,
                &format!("{} × {}", line.quantity, priced.unit_price),
                &priced.total.display(),
            ],
            &[18, 28, 20, 14],
        );
    }

    ctx.output.info("");
    if pricing.has_savings() {
        ctx.output.kv("sous-total", &pricing.subtotal.display());
        ctx.output.kv("économies", &pricing.savings.display());
    }
    ctx.output.kv("total", &pricing.grand_total.display());
    ctx.output
        .kv("articles", &cart.total_items().to_string());

    Ok(())
}

fn summary(visit: &Visit, ctx: &Context) {
    let summary = visit.storefront.summary();
    if ctx.output.is_json() {
        ctx.output.json(&summary);
        return;
    }
    ctx.output.kv(
        "panier",
        &format!("{} article(s), {}", summary.total_items, summary.total_price),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{cart_lines, demo_context, saved, SESSION};
    use ahime_cache::SessionId;

    fn cart(command: CartCommand) -> CartArgs {
        CartArgs {
            command: Some(command),
        }
    }

    fn add(id: &str, quantity: i64) -> CartArgs {
        cart(CartCommand::Add {
            id: id.to_string(),
            quantity,
        })
    }

    #[test]
    fn test_add_persists_lines() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = demo_context(dir.path(), Some(SESSION));

        run(add("pagne-wax", 2), &ctx).unwrap();
        run(add("sac-raphia", 1), &ctx).unwrap();
        run(add("pagne-wax", 1), &ctx).unwrap();

        let snapshot = saved(&ctx).unwrap();
        assert_eq!(cart_lines(&snapshot), vec![("pagne-wax", 3), ("sac-raphia", 1)]);
        let version = ctx.store().unwrap().version(&SessionId::new(SESSION)).unwrap();
        assert_eq!(version, 3);
    }

    #[test]
    fn test_rejected_add_saves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = demo_context(dir.path(), Some(SESSION));

        // Only 3 in stock.
        assert!(run(add("robe-bazin", 4), &ctx).is_err());
        assert!(run(add("inconnu", 1), &ctx).is_err());
        assert!(saved(&ctx).is_none());
    }

    #[test]
    fn test_set_remove_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = demo_context(dir.path(), Some(SESSION));
        run(add("panier-osier", 1), &ctx).unwrap();
        run(add("sac-raphia", 2), &ctx).unwrap();

        run(
            cart(CartCommand::Set {
                id: "panier-osier".to_string(),
                quantity: 4,
            }),
            &ctx,
        )
        .unwrap();
        assert_eq!(
            cart_lines(&saved(&ctx).unwrap()),
            vec![("panier-osier", 4), ("sac-raphia", 2)]
        );

        run(
            cart(CartCommand::Set {
                id: "panier-osier".to_string(),
                quantity: 0,
            }),
            &ctx,
        )
        .unwrap();
        assert_eq!(cart_lines(&saved(&ctx).unwrap()), vec![("sac-raphia", 2)]);

        run(
            cart(CartCommand::Remove {
                id: "absent".to_string(),
            }),
            &ctx,
        )
        .unwrap();
        run(cart(CartCommand::Clear { yes: true }), &ctx).unwrap();
        assert!(saved(&ctx).unwrap().cart.is_empty());
    }

    #[test]
    fn test_show_does_not_write() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = demo_context(dir.path(), Some(SESSION));

        run(CartArgs { command: None }, &ctx).unwrap();
        assert!(saved(&ctx).is_none());
    }
}
