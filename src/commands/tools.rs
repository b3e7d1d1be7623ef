//! Tool command handlers: .help .status .ping .detect .copy .len

use babel_core::{
    settings::BUILTIN_ENGINES,
    text::{escape_html, preview, truncate_chars},
};
use babel_engines::{EngineRef, Invoke};
use futures_util::future::join_all;
use std::time::{Duration, Instant};

use super::{CommandContext, Reply};
use crate::{context::AppContext, gateway::auto::AutoMode};

const STATUS_DELETE: Duration = Duration::from_secs(15);
const PING_DELETE: Duration = Duration::from_secs(20);
const DETECT_DELETE: Duration = Duration::from_secs(8);
const LEN_DELETE: Duration = Duration::from_secs(10);

const PING_TEXT: &str = "Hello";
const PING_TARGET: &str = "zh-CN";

pub(super) fn help() -> Reply {
    Reply::html(
        "🌐 <b>Babel</b>\n\n\
         <b>Translate</b>\n\
         <code>.tr text</code> append the default language\n\
         <code>.rr text</code> replace with the default language\n\
         <code>.t ja,en text</code> append the listed languages\n\
         <code>.r ko text</code> replace with the listed languages\n\
         <code>.tl</code> (reply) translate into the home language\n\
         <code>.auto swap|tr|rr|t langs|r langs|off</code>\n\n\
         <b>Settings</b>\n\
         <code>.setlang</code> <code>.sethome</code> <code>.setengine</code> <code>.setmodel</code>\n\
         <code>.setkey openai|gemini key</code>\n\
         <code>.addapi name url key model</code> <code>.editapi</code> <code>.delapi name</code>\n\n\
         <b>Tools</b>\n\
         <code>.status</code> <code>.ping</code> <code>.detect</code> <code>.copy</code> <code>.len</code>\n\n\
         <b>Learn</b>\n\
         <code>.vocab add word | translation | example</code>\n\
         <code>.vocab list</code> <code>.vocab del id</code> <code>.vocab review</code> <code>.vocab stats</code>\n\
         <code>.quiz 5</code> <code>.write lang text</code>\n\n\
         <b>Search</b>\n\
         <code>.search query #page</code>",
    )
}

fn format_uptime(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
}

pub(super) fn status(app: &AppContext) -> Reply {
    let settings = app.settings.get();
    let model = match settings.engine.as_str() {
        "google" => String::new(),
        builtin @ ("gemini" | "openai") => settings.model(builtin).unwrap_or("default").to_string(),
        custom => settings
            .custom_engine(custom)
            .map(|c| c.model.clone())
            .unwrap_or_default(),
    };
    let auto = match AutoMode::from_settings(&settings).setting_value() {
        v if v.is_empty() => "off".to_string(),
        v => v,
    };
    let customs: Vec<&str> = settings.custom_engines.keys().map(String::as_str).collect();
    let report = app.vocab.stats();

    let mut out = format!(
        "📊 <b>Babel status</b>\n\
         ⏱ Uptime: {}\n\
         🔧 Engine: <b>{}</b>",
        format_uptime(app.started.elapsed()),
        escape_html(&settings.engine.to_uppercase()),
    );
    if !model.is_empty() {
        out.push_str(&format!(" (<code>{}</code>)", escape_html(&model)));
    }
    out.push_str(&format!(
        "\n🌐 Default: <code>{}</code> · Home: <code>{}</code>\n\
         🔁 Auto: <code>{}</code>\n\
         🧩 Custom engines: {}\n\
         🔌 Open clients: {}\n\
         📚 Vocabulary: {} words, {} due\n\
         🔍 Search: {}",
        escape_html(&settings.default_lang),
        escape_html(&settings.home_lang),
        escape_html(&auto),
        if customs.is_empty() {
            "none".to_string()
        } else {
            escape_html(&customs.join(", "))
        },
        app.registry.cached(),
        report.stats.total_words,
        report.due_words,
        if app.search.is_enabled() { "on" } else { "off" },
    ));
    Reply::html(out).deleted_after(STATUS_DELETE)
}

/// Time one translation on every engine, without retries or fallback.
pub(super) async fn ping(ctx: &CommandContext<'_>) -> Reply {
    let settings = ctx.app.settings.get();
    let names: Vec<String> = BUILTIN_ENGINES
        .iter()
        .map(|s| s.to_string())
        .chain(settings.custom_engines.keys().cloned())
        .collect();

    let checks = names.iter().map(|name| {
        let settings = &settings;
        async move {
            let start = Instant::now();
            let result = match EngineRef::resolve(name, settings) {
                Ok(engine) => {
                    ctx.app
                        .invoker
                        .invoke(PING_TEXT, PING_TARGET, &engine, settings)
                        .await
                }
                Err(e) => Err(e),
            };
            (name, start.elapsed(), result)
        }
    });

    let mut out = String::from("🏓 <b>Engine latency</b>\n");
    for (name, elapsed, result) in join_all(checks).await {
        let label = escape_html(&name.to_uppercase());
        match result {
            Ok(text) => out.push_str(&format!(
                "\n✅ {label} {}ms: {}",
                elapsed.as_millis(),
                escape_html(truncate_chars(&text, 12))
            )),
            Err(e) => out.push_str(&format!(
                "\n❌ {label}: {}",
                escape_html(truncate_chars(&e.to_string(), 35))
            )),
        }
    }
    Reply::html(out).deleted_after(PING_DELETE)
}

pub(super) async fn detect(ctx: &CommandContext<'_>, arg: &str) -> Reply {
    let Some(text) = ctx.arg_or_reply(arg) else {
        return Reply::usage("Usage: <code>.detect text</code>, or reply to a message");
    };
    let code = ctx.app.detector.detect_async(text).await;
    Reply::html(format!(
        "🔍 Detected: <code>{}</code>\n<i>{}</i>",
        escape_html(&code),
        escape_html(&preview(text, 40))
    ))
    .deleted_after(DETECT_DELETE)
}

pub(super) fn copy(ctx: &CommandContext<'_>) -> Reply {
    match ctx.incoming.reply_text() {
        Some(text) => Reply::plain(text),
        None => Reply::usage("Reply to a message with <code>.copy</code>"),
    }
}

/// Character, word and line counts.
pub(crate) fn count(text: &str) -> (usize, usize, usize, usize) {
    let chars = text.chars().count();
    let visible = text.chars().filter(|c| *c != ' ' && *c != '\n').count();
    let words = text.split_whitespace().count();
    let lines = text.lines().count();
    (chars, visible, words, lines)
}

pub(super) fn len(ctx: &CommandContext<'_>, arg: &str) -> Reply {
    let Some(text) = ctx.arg_or_reply(arg) else {
        return Reply::usage("Usage: <code>.len text</code>, or reply to a message");
    };
    let (chars, visible, words, lines) = count(text);
    Reply::html(format!(
        "📏 <b>Length</b>\n\
         Characters: {chars}\n\
         Without spaces: {visible}\n\
         Words: {words}\n\
         Lines: {lines}"
    ))
    .deleted_after(LEN_DELETE)
}
