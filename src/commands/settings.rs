//! Settings command handlers: .auto .setlang .sethome .setengine .setmodel
//! .setkey .addapi .editapi .delapi

use babel_core::{
    language,
    settings::{CustomEngine, Settings, BUILTIN_ENGINES},
    text::escape_html,
};
use std::time::Duration;
use tracing::{info, warn};

use super::Reply;
use crate::{context::AppContext, gateway::auto::AutoMode};

const CONFIRM_DELETE: Duration = Duration::from_secs(3);

/// Apply `f` and confirm with `done`, or report the write failure.
fn save<F>(app: &AppContext, f: F, done: String) -> Reply
where
    F: FnOnce(&mut Settings),
{
    match app.settings.update(f) {
        Ok(_) => Reply::html(done).deleted_after(CONFIRM_DELETE),
        Err(e) => {
            warn!("settings write failed: {e}");
            Reply::usage(format!("⚠️ Could not save settings: {}", escape_html(&e.to_string())))
        }
    }
}

pub(super) fn auto(app: &AppContext, arg: &str) -> Reply {
    let Some(mode) = AutoMode::parse(arg) else {
        return Reply::usage(
            "Usage: <code>.auto swap|tr|rr|t langs|r langs|off</code>",
        );
    };
    let value = mode.setting_value();
    let done = if value.is_empty() {
        "✅ Auto mode off".to_string()
    } else {
        format!("✅ Auto mode: <code>{}</code>", escape_html(&value))
    };
    save(app, |s| s.auto_cmd = value, done)
}

pub(super) fn set_lang(app: &AppContext, arg: &str) -> Reply {
    let Some(lang) = arg.split_whitespace().next() else {
        return Reply::usage("Usage: <code>.setlang ja</code>");
    };
    let lang = language::normalize(lang);
    let done = format!("✅ Default language: <code>{}</code>", escape_html(&lang));
    save(app, |s| s.default_lang = lang, done)
}

pub(super) fn set_home(app: &AppContext, arg: &str) -> Reply {
    let Some(lang) = arg.split_whitespace().next() else {
        return Reply::usage("Usage: <code>.sethome zh-CN</code>");
    };
    let lang = language::normalize(lang);
    let done = format!("✅ Home language: <code>{}</code>", escape_html(&lang));
    save(app, |s| s.home_lang = lang, done)
}

fn engine_list(settings: &Settings) -> String {
    BUILTIN_ENGINES
        .iter()
        .map(|s| s.to_string())
        .chain(settings.custom_engines.keys().cloned())
        .collect::<Vec<_>>()
        .join(", ")
}

pub(super) fn set_engine(app: &AppContext, arg: &str) -> Reply {
    let settings = app.settings.get();
    let Some(name) = arg.split_whitespace().next().map(str::to_lowercase) else {
        return Reply::usage(format!(
            "Usage: <code>.setengine name</code>\nAvailable: {}",
            escape_html(&engine_list(&settings))
        ));
    };
    if !settings.knows_engine(&name) {
        return Reply::usage(format!(
            "❌ Unknown engine <code>{}</code>\nAvailable: {}",
            escape_html(&name),
            escape_html(&engine_list(&settings))
        ));
    }
    info!("engine switched to {name}");
    let done = format!("✅ Engine: <b>{}</b>", escape_html(&name.to_uppercase()));
    save(app, |s| s.engine = name, done)
}

pub(super) fn set_model(app: &AppContext, arg: &str) -> Reply {
    let Some(model) = arg.split_whitespace().next().map(str::to_string) else {
        return Reply::usage("Usage: <code>.setmodel model-name</code>");
    };
    let engine = app.settings.get().engine;
    let done = format!(
        "✅ {} model: <code>{}</code>",
        escape_html(&engine.to_uppercase()),
        escape_html(&model)
    );
    match engine.as_str() {
        "gemini" | "openai" => save(
            app,
            |s| {
                s.models.insert(engine.clone(), model);
            },
            done,
        ),
        "google" => Reply::usage("❌ Google Translate has no model to choose"),
        custom => {
            if app.settings.get().custom_engine(custom).is_none() {
                return Reply::usage(format!(
                    "❌ Unknown engine <code>{}</code>",
                    escape_html(custom)
                ));
            }
            save(
                app,
                |s| {
                    if let Some(c) = s.custom_engines.get_mut(custom) {
                        c.model = model;
                    }
                },
                done,
            )
        }
    }
}

pub(super) fn set_key(app: &AppContext, arg: &str) -> Reply {
    let mut parts = arg.split_whitespace();
    let (Some(provider), Some(key)) = (parts.next(), parts.next()) else {
        return Reply::usage("Usage: <code>.setkey openai|gemini key</code>");
    };
    let provider = provider.to_lowercase();
    if provider != "openai" && provider != "gemini" {
        return Reply::usage("❌ Keys can only be set for <code>openai</code> or <code>gemini</code>");
    }
    let key = key.to_string();
    let done = format!("✅ {} key updated", provider.to_uppercase());
    let reply = save(
        app,
        |s| {
            s.api_keys.insert(provider, key);
        },
        done,
    );
    app.registry.clear();
    reply
}

/// `.addapi` / `.editapi name url key model`.
pub(super) fn add_api(app: &AppContext, arg: &str, must_exist: bool) -> Reply {
    let parts: Vec<&str> = arg.split_whitespace().collect();
    let [name, url, key, model] = parts[..] else {
        let cmd = if must_exist { "editapi" } else { "addapi" };
        return Reply::usage(format!(
            "Usage: <code>.{cmd} name base_url api_key model</code>"
        ));
    };
    let name = name.to_lowercase();
    if Settings::is_builtin(&name) {
        return Reply::usage(format!(
            "❌ <code>{}</code> is a built-in engine",
            escape_html(&name)
        ));
    }
    let exists = app.settings.get().custom_engine(&name).is_some();
    if must_exist && !exists {
        return Reply::usage(format!(
            "❌ No custom engine named <code>{}</code>",
            escape_html(&name)
        ));
    }

    let engine = CustomEngine {
        base_url: url.trim_end_matches('/').to_string(),
        api_key: key.to_string(),
        model: model.to_string(),
    };
    let verb = if exists { "updated" } else { "added" };
    let done = format!("✅ Engine <b>{}</b> {verb}", escape_html(&name.to_uppercase()));
    info!("custom engine {name} {verb}");
    let reply = save(
        app,
        |s| {
            s.custom_engines.insert(name, engine);
        },
        done,
    );
    app.registry.clear();
    reply
}

pub(super) fn del_api(app: &AppContext, arg: &str) -> Reply {
    let Some(name) = arg.split_whitespace().next().map(str::to_lowercase) else {
        return Reply::usage("Usage: <code>.delapi name</code>");
    };
    if app.settings.get().custom_engine(&name).is_none() {
        return Reply::usage(format!(
            "❌ No custom engine named <code>{}</code>",
            escape_html(&name)
        ));
    }
    let done = format!("✅ Engine <b>{}</b> removed", escape_html(&name.to_uppercase()));
    let reply = save(
        app,
        |s| {
            s.custom_engines.remove(&name);
            if s.engine == name {
                s.engine = "gemini".to_string();
            }
        },
        done,
    );
    app.registry.clear();
    reply
}
