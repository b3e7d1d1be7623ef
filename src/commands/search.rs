//! Search command handler: .search query [#page]

use babel_core::{message::TextFormat, settings::Settings, text::escape_html};
use babel_engines::{candidates, EngineRef, Invoke, RetryPolicy};
use babel_search::{format_results, summary_prompt, SearchResult, SUMMARY_TEMPERATURE};
use tracing::{info, warn};

use super::{CommandContext, Reply};
use crate::context::AppContext;

/// Split a trailing `#n` page marker off the query.
pub(super) fn parse_query(arg: &str) -> (String, usize) {
    let arg = arg.trim();
    if let Some((query, last)) = arg.rsplit_once(char::is_whitespace) {
        if let Some(page) = last.strip_prefix('#').and_then(|n| n.parse::<usize>().ok()) {
            return (query.trim().to_string(), page.max(1));
        }
    }
    (arg.to_string(), 1)
}

pub(super) async fn search(ctx: &CommandContext<'_>, arg: &str) -> Reply {
    let (query, page) = parse_query(arg);
    if query.is_empty() {
        return Reply::usage("Usage: <code>.search query</code> or <code>.search query #2</code>");
    }
    if !ctx.app.search.is_enabled() {
        return Reply::usage("❌ Search is disabled");
    }

    if let Err(e) = ctx
        .channel
        .edit(
            ctx.working,
            &format!("🔍 Searching <i>{}</i>...", escape_html(&query)),
            TextFormat::Html,
        )
        .await
    {
        warn!("could not show search progress: {e}");
    }

    let results = ctx.app.search.search(&query, page).await;
    let mut out = format_results(&results, &query);
    if results.page == 1 && !results.results.is_empty() {
        let settings = ctx.app.settings.get();
        match summarize(ctx.app, &query, &results.results, &settings).await {
            Some(summary) => {
                out.push_str(&format!("\n\n💡 <b>Summary</b>\n{}", escape_html(&summary)));
            }
            None => out.push_str("\n\n⚠️ Summary unavailable"),
        }
    }
    Reply::html(out)
}

/// Summarize with the current engine, or the first LLM in its fallback
/// chain when the current engine cannot take free-form prompts.
async fn summarize(
    app: &AppContext,
    query: &str,
    results: &[SearchResult],
    settings: &Settings,
) -> Option<String> {
    let engine = candidates(&settings.engine, settings)
        .iter()
        .filter_map(|name| EngineRef::resolve(name, settings).ok())
        .find(EngineRef::is_llm)?;
    let prompt = summary_prompt(query, results, &settings.home_lang);

    let result = RetryPolicy::default()
        .run(engine.name(), || {
            app.invoker
                .complete(&engine, &prompt, SUMMARY_TEMPERATURE, settings)
        })
        .await;
    match result {
        Ok(summary) => {
            info!("search summary from {}", engine.name());
            Some(summary)
        }
        Err(e) => {
            warn!("search summary failed: {e}");
            None
        }
    }
}
