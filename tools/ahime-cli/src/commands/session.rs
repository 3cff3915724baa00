//! Session commands.

use ahime_cache::SessionId;
use ahime_commerce::storefront::Storefront;
use anyhow::Result;
use serde_json::json;

use super::{confirm, SessionArgs, SessionCommand};
use crate::context::Context;

/// Run the session command.
pub fn run(args: SessionArgs, ctx: &Context) -> Result<()> {
    match args.command {
        SessionCommand::New => new_session(ctx),
        SessionCommand::Show => show_session(ctx),
        SessionCommand::Discard { yes } => discard_session(yes, ctx),
        SessionCommand::List => list_sessions(ctx),
    }
}

fn new_session(ctx: &Context) -> Result<()> {
    let id = SessionId::generate();
    ctx.store()?
        .save(&id, &Storefront::new(ctx.config.storefront))?;
    ctx.remember_session(&id)?;

    if ctx.output.is_json() {
        ctx.output.json(&json!({ "session": id.as_str() }));
    } else {
        ctx.output.success(&format!("Session {} started", id));
    }
    Ok(())
}

fn show_session(ctx: &Context) -> Result<()> {
    let id = ctx.require_session()?;
    let catalog = ctx.catalog()?;
    let store = ctx.store()?;
    let saved = store.exists(&id)?;
    let (storefront, report) = store.load_or_default(&id, &catalog)?;
    ctx.report_restore(&report);
    let summary = storefront.summary();

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "session": id.as_str(),
            "saved": saved,
            "summary": summary,
            "report": report,
        }));
        return Ok(());
    }

    ctx.output.header("Session");
    ctx.output.kv("id", id.as_str());
    ctx.output.kv("saved", &saved.to_string());
    ctx.output.kv("articles", &summary.total_items.to_string());
    ctx.output.kv("total", &summary.total_price.display());
    ctx.output.kv("favoris", &summary.total_favorites.to_string());
    Ok(())
}

fn discard_session(yes: bool, ctx: &Context) -> Result<()> {
    let id = ctx.require_session()?;
    if !confirm(&format!("Discard session {}?", id), yes)? {
        ctx.output.warn("Cancelled");
        return Ok(());
    }

    ctx.store()?.discard(&id)?;
    if ctx.current_session()?.as_ref() == Some(&id) {
        ctx.forget_session()?;
    }
    ctx.output.success(&format!("Session {} discarded", id));
    Ok(())
}

fn list_sessions(ctx: &Context) -> Result<()> {
    let sessions = ctx.store()?.sessions()?;
    let current = ctx.current_session()?;

    if ctx.output.is_json() {
        let ids: Vec<&str> = sessions.iter().map(SessionId::as_str).collect();
        ctx.output.json(&json!({
            "current": current.as_ref().map(SessionId::as_str),
            "sessions": ids,
        }));
        return Ok(());
    }

    ctx.output.header(&format!("Sessions ({})", sessions.len()));
    for id in &sessions {
        let marker = if current.as_ref() == Some(id) { " (current)" } else { "" };
        ctx.output.list_item(&format!("{}{}", id, marker));
    }
    Ok(())
}
