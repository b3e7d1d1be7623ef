//! Operator commands: `.name args` (or `/name args` from the bot menu).

mod search;
mod settings;
mod tools;
mod translate;
mod vocab;


pub use vocab::answer_prompt;

use babel_core::{
    message::{IncomingMessage, MessageRef, TextFormat},
    traits::Channel,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::{cleanup::delete_later, composer::Mode, context::AppContext, pending::Prompt};

const USAGE_DELETE: Duration = Duration::from_secs(5);

/// Everything a command handler needs.
pub struct CommandContext<'a> {
    pub app: &'a AppContext,
    pub channel: &'a Arc<dyn Channel>,
    pub incoming: &'a IncomingMessage,
    /// The message the reply is written into.
    pub working: &'a MessageRef,
}

impl CommandContext<'_> {
    /// The command argument, or the replied-to text when the argument is empty.
    fn arg_or_reply<'s>(&'s self, arg: &'s str) -> Option<&'s str> {
        if arg.is_empty() {
            self.incoming.reply_text()
        } else {
            Some(arg)
        }
    }
}

/// Known commands. Arguments are kept raw and validated by the handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `.tr`/`.rr` (no `langs`) and `.t`/`.r` (explicit `langs`).
    Translate {
        mode: Mode,
        langs: Option<String>,
        text: String,
    },
    /// `.tl`: the replied message into the home language.
    TranslateReply,
    Auto(String),
    SetLang(String),
    SetHome(String),
    SetEngine(String),
    SetModel(String),
    SetKey(String),
    AddApi(String),
    EditApi(String),
    DelApi(String),
    Help,
    Status,
    Ping,
    Detect(String),
    Copy,
    Len(String),
    Vocab(String),
    Quiz(String),
    Write(String),
    Search(String),
}

impl Command {
    /// Parse a command from message text. Returns `None` for anything that is
    /// not a known command, which then goes through auto mode.
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim_start();
        let body = trimmed
            .strip_prefix('.')
            .or_else(|| trimmed.strip_prefix('/'))?;
        let (head, rest) = match body.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (body, ""),
        };
        // Telegram appends the bot name to menu commands: /status@babel_bot.
        let head = head.split('@').next().unwrap_or(head).to_lowercase();
        let arg = rest.to_string();

        let cmd = match head.as_str() {
            "tr" => Self::Translate {
                mode: Mode::Append,
                langs: None,
                text: arg,
            },
            "rr" => Self::Translate {
                mode: Mode::Replace,
                langs: None,
                text: arg,
            },
            "t" | "r" => {
                let mode = if head == "t" { Mode::Append } else { Mode::Replace };
                let (langs, text) = match rest.split_once(char::is_whitespace) {
                    Some((langs, text)) => (langs.to_string(), text.trim().to_string()),
                    None => (rest.to_string(), String::new()),
                };
                Self::Translate {
                    mode,
                    langs: Some(langs),
                    text,
                }
            }
            "tl" => Self::TranslateReply,
            "auto" => Self::Auto(arg),
            "setlang" => Self::SetLang(arg),
            "sethome" => Self::SetHome(arg),
            "setengine" => Self::SetEngine(arg),
            "setmodel" => Self::SetModel(arg),
            "setkey" => Self::SetKey(arg),
            "addapi" => Self::AddApi(arg),
            "editapi" => Self::EditApi(arg),
            "delapi" => Self::DelApi(arg),
            "help" | "start" => Self::Help,
            "status" => Self::Status,
            "ping" => Self::Ping,
            "detect" => Self::Detect(arg),
            "copy" => Self::Copy,
            "len" => Self::Len(arg),
            "vocab" => Self::Vocab(arg),
            "quiz" => Self::Quiz(arg),
            "write" => Self::Write(arg),
            "search" => Self::Search(arg),
            _ => return None,
        };
        Some(cmd)
    }
}

/// A command's answer, written into the working message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub format: TextFormat,
    pub delete_after: Option<Duration>,
    /// Registered against the working message once delivered.
    pub prompt: Option<Prompt>,
}

impl Reply {
    pub fn html(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: TextFormat::Html,
            delete_after: None,
            prompt: None,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            format: TextFormat::Plain,
            ..Self::html(text)
        }
    }

    /// An error or usage hint that cleans itself up.
    pub fn usage(text: impl Into<String>) -> Self {
        Self::html(text).deleted_after(USAGE_DELETE)
    }

    pub fn deleted_after(mut self, delay: Duration) -> Self {
        self.delete_after = Some(delay);
        self
    }

    pub fn with_prompt(mut self, prompt: Prompt) -> Self {
        self.prompt = Some(prompt);
        self
    }
}

/// Run a command. Translation commands edit through the composer; every
/// other command produces a [`Reply`].
pub async fn handle(cmd: Command, ctx: &CommandContext<'_>) {
    let reply = match cmd {
        Command::Translate { mode, langs, text } => {
            translate::translate(ctx, mode, langs.as_deref(), &text).await
        }
        Command::TranslateReply => translate::translate_reply(ctx).await,
        Command::Auto(arg) => Some(settings::auto(ctx.app, &arg)),
        Command::SetLang(arg) => Some(settings::set_lang(ctx.app, &arg)),
        Command::SetHome(arg) => Some(settings::set_home(ctx.app, &arg)),
        Command::SetEngine(arg) => Some(settings::set_engine(ctx.app, &arg)),
        Command::SetModel(arg) => Some(settings::set_model(ctx.app, &arg)),
        Command::SetKey(arg) => Some(settings::set_key(ctx.app, &arg)),
        Command::AddApi(arg) => Some(settings::add_api(ctx.app, &arg, false)),
        Command::EditApi(arg) => Some(settings::add_api(ctx.app, &arg, true)),
        Command::DelApi(arg) => Some(settings::del_api(ctx.app, &arg)),
        Command::Help => Some(tools::help()),
        Command::Status => Some(tools::status(ctx.app)),
        Command::Ping => Some(tools::ping(ctx).await),
        Command::Detect(arg) => Some(tools::detect(ctx, &arg).await),
        Command::Copy => Some(tools::copy(ctx)),
        Command::Len(arg) => Some(tools::len(ctx, &arg)),
        Command::Vocab(arg) => Some(vocab::vocab(ctx, &arg).await),
        Command::Quiz(arg) => Some(vocab::quiz(ctx.app, &arg)),
        Command::Write(arg) => Some(vocab::write(ctx.app, &arg)),
        Command::Search(arg) => Some(search::search(ctx, &arg).await),
    };
    if let Some(reply) = reply {
        deliver(ctx, reply).await;
    }
}

/// Write `reply` into the working message and schedule what follows it.
pub(crate) async fn deliver(ctx: &CommandContext<'_>, reply: Reply) {
    if let Err(e) = ctx.channel.edit(ctx.working, &reply.text, reply.format).await {
        warn!("could not deliver command reply: {e}");
        return;
    }
    if let Some(prompt) = reply.prompt {
        ctx.app.pending.insert(ctx.working, prompt);
    }
    if let Some(delay) = reply.delete_after {
        delete_later(Arc::clone(ctx.channel), ctx.working.clone(), delay);
    }
}
