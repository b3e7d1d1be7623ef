//! Result Composer: translate into every requested language at once and
//! rewrite the working message with the outcome.
//!
//! A request moves through `loading -> composed`. When any language failed,
//! the composed message stays up for the revert delay and then goes back to
//! the original text. An error from the channel itself ends in an annotated
//! message that deletes itself.

use babel_core::{
    error::BabelError,
    message::{MessageRef, TextFormat},
    text::{escape_html, truncate_chars},
    traits::Channel,
};
use babel_engines::is_failure;
use futures_util::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{cleanup::delete_later, context::AppContext};

const ERROR_SUMMARY_CHARS: usize = 50;

/// Where the translated blocks go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Keep the original text and add the blocks below it.
    Append,
    /// Show only the blocks.
    Replace,
}

/// One translation job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub text: String,
    pub targets: Vec<String>,
    pub mode: Mode,
    /// Do nothing when the single target is already the source language.
    pub skip_if_target: bool,
}

impl TranslationRequest {
    /// `langs` is a comma-separated list; blank entries are dropped.
    pub fn new(text: impl Into<String>, langs: &str, mode: Mode) -> Self {
        Self {
            text: text.into(),
            targets: parse_langs(langs),
            mode,
            skip_if_target: false,
        }
    }

    pub fn skip_if_target(mut self) -> Self {
        self.skip_if_target = true;
        self
    }
}

/// Split a comma-separated language list.
pub fn parse_langs(langs: &str) -> Vec<String> {
    langs
        .split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// How a request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The text was already in the target language; nothing was touched.
    Skipped,
    /// Every language translated.
    Composed,
    /// At least one language failed; the message went back to the original.
    Reverted,
    /// The channel failed; the message was annotated and scheduled for deletion.
    Failed(String),
}

/// Placeholder shown while the engines work.
pub fn render_loading(original: &str, engine: &str, mode: Mode) -> String {
    let loading = format!(
        "<blockquote>⏳ Translating ({})...</blockquote>",
        escape_html(&engine.to_uppercase())
    );
    match mode {
        Mode::Append => format!("{}\n{loading}", escape_html(original)),
        Mode::Replace => loading,
    }
}

/// Render the final message. `results` pairs each target with the gateway
/// output, in request order. Returns the text and whether any language failed.
pub fn render(original: &str, results: &[(String, String)], mode: Mode) -> (String, bool) {
    let tagged = results.len() > 1;
    let mut failed = false;
    let blocks: Vec<String> = results
        .iter()
        .map(|(lang, result)| {
            let tag = lang.to_uppercase();
            if is_failure(result) {
                failed = true;
                format!("<blockquote>❌ [{}] translation failed</blockquote>", escape_html(&tag))
            } else if tagged {
                format!(
                    "<blockquote><b>[{}]</b> {}</blockquote>",
                    escape_html(&tag),
                    escape_html(result)
                )
            } else {
                format!("<blockquote>{}</blockquote>", escape_html(result))
            }
        })
        .collect();

    let text = match mode {
        Mode::Append => format!("{}\n{}", escape_html(original), blocks.join("\n")),
        Mode::Replace => blocks.join("\n\n"),
    };
    (text, failed)
}

/// Run `request` against `working`, editing it through every state.
pub async fn translate_and_edit(
    app: &AppContext,
    channel: &Arc<dyn Channel>,
    working: &MessageRef,
    request: &TranslationRequest,
) -> Outcome {
    if request.targets.is_empty() {
        return Outcome::Skipped;
    }
    if request.skip_if_target && request.targets.len() == 1 {
        if app
            .detector
            .is_same_language(&request.text, &request.targets[0])
            .await
        {
            info!("skipping translation: text already in {}", request.targets[0]);
            return Outcome::Skipped;
        }
    }

    match compose(app, channel.as_ref(), working, request).await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!("translation request failed: {e}");
            let summary = e.to_string();
            let annotated = format!(
                "{}\n\n⚠️ System error: {}",
                request.text,
                truncate_chars(&summary, ERROR_SUMMARY_CHARS)
            );
            if let Err(e) = channel.edit(working, &annotated, TextFormat::Plain).await {
                warn!("could not annotate failed request: {e}");
            }
            delete_later(Arc::clone(channel), working.clone(), app.cleanup_delay());
            Outcome::Failed(summary)
        }
    }
}

async fn compose(
    app: &AppContext,
    channel: &dyn Channel,
    working: &MessageRef,
    request: &TranslationRequest,
) -> Result<Outcome, BabelError> {
    let settings = app.settings.get();
    let engine = settings.engine.clone();

    channel
        .edit(
            working,
            &render_loading(&request.text, &engine, request.mode),
            TextFormat::Html,
        )
        .await?;

    let calls = request.targets.iter().map(|target| {
        app.translator
            .translate_with_settings(&request.text, target, &engine, &settings)
    });
    let outputs = join_all(calls).await;
    let results: Vec<(String, String)> = request.targets.iter().cloned().zip(outputs).collect();

    let (text, failed) = render(&request.text, &results, request.mode);
    channel.edit(working, &text, TextFormat::Html).await?;
    if !failed {
        return Ok(Outcome::Composed);
    }

    for (lang, result) in results.iter().filter(|(_, r)| is_failure(r)) {
        warn!("translation to {lang} failed: {result}");
    }
    tokio::time::sleep(app.revert_delay()).await;
    channel
        .edit(working, &request.text, TextFormat::Plain)
        .await?;
    Ok(Outcome::Reverted)
}
