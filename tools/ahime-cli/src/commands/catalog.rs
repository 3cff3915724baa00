//! Catalog browsing commands.

use ahime_commerce::search::{Filter, SearchQuery, SortOption};
use ahime_commerce::ProductId;
use anyhow::{anyhow, Result};

use super::{CatalogArgs, CatalogCommand};
use crate::context::Context;
use crate::output::{price_tag, stock_badge};

/// Run the catalog command.
pub fn run(args: CatalogArgs, ctx: &Context) -> Result<()> {
    match args.command {
        CatalogCommand::List {
            category,
            on_sale,
            in_stock,
            search,
            sort,
            page,
            per_page,
        } => {
            let sort = SortOption::from_name(&sort)
                .ok_or_else(|| anyhow!("Unknown sort option: {}", sort))?;

            let mut query = SearchQuery::new()
                .with_sort(sort)
                .with_pagination(page, per_page);
            if let Some(category) = category {
                query = query.with_filter(Filter::category(category));
            }
            if on_sale {
                query = query.with_filter(Filter::on_sale());
            }
            if in_stock {
                query = query.with_filter(Filter::in_stock());
            }
            if let Some(text) = search {
                query = query.with_query(text);
            }

            list(&query, ctx)
        }
        CatalogCommand::Show { id } => show(&ProductId::new(id), ctx),
    }
}

fn list(query: &SearchQuery, ctx: &Context) -> Result<()> {
    let catalog = ctx.catalog()?;
    let results = query.run(&catalog);

    if ctx.output.is_json() {
        ctx.output.json(&results);
        return Ok(());
    }

    let pagination = &results.pagination;
    ctx.output.header(&format!(
        "Produits ({}) · {}",
        pagination.total,
        query.sort.display_name()
    ));

    if results.is_empty() {
        ctx.output.info("Aucun produit ne correspond.");
        return Ok(());
    }

    for product in &results.items {
        ctx.output.table_row(
            &[
                product.id.as_str(),
                &product.name,
                &price_tag(product),
                &stock_badge(product.stock),
            ],
            &[18, 28, 24, 16],
        );
    }

    ctx.output.info(&format!(
        "{}-{} sur {} · page {}/{}",
        pagination.start_item(),
        pagination.end_item(),
        pagination.total,
        pagination.page,
        pagination.total_pages
    ));

    Ok(())
}

fn show(id: &ProductId, ctx: &Context) -> Result<()> {
    let catalog = ctx.catalog()?;
    let product = catalog.require(id)?;

    if ctx.output.is_json() {
        ctx.output.json(product);
        return Ok(());
    }

    ctx.output.header(&product.name);
    ctx.output.kv("id", product.id.as_str());
    ctx.output.kv("prix", &price_tag(product));
    ctx.output.kv("stock", &stock_badge(product.stock));
    if let Some(category) = product
        .category
        .as_ref()
        .and_then(|c| catalog.category(c))
    {
        ctx.output.kv("catégorie", &category.name);
    }
    if let Some(rating) = product.rating {
        ctx.output.kv("note", &format!("{rating:.1}/5"));
    }
    if !product.colors.is_empty() {
        ctx.output.kv("couleurs", &product.colors.join(", "));
    }
    if !product.sizes.is_empty() {
        ctx.output.kv("tailles", &product.sizes.join(", "));
    }
    if let Some(description) = &product.description {
        ctx.output.info("");
        ctx.output.info(description);
    }

    Ok(())
}
