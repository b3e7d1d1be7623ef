mod cleanup;
mod commands;
mod composer;
mod context;
mod gateway;
mod pending;
#[cfg(test)]
mod testing;

use babel_channels::TelegramChannel;
use babel_core::{config, language::LanguageDetector, traits::Channel};
use babel_engines::is_failure;
use clap::{Parser, Subcommand};
use futures_util::future::join_all;
use std::path::Path;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use composer::parse_langs;
use context::AppContext;

#[derive(Parser)]
#[command(
    name = "babel",
    version,
    about = "Babel: translate your own chat messages in place"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the chat gateway.
    Start,
    /// Show configuration, channel and engine key status.
    Status,
    /// Translate once through the fallback chain and print the result.
    Translate {
        /// Comma-separated target languages, e.g. `ja,en`.
        langs: String,
        /// The text to translate.
        #[arg(trailing_var_arg = true, required = true)]
        text: Vec<String>,
    },
    /// Print the detected language of some text.
    Detect {
        #[arg(trailing_var_arg = true, required = true)]
        text: Vec<String>,
    },
}

/// Console logging, plus a daily log file when `log_dir` is given. The
/// returned guard flushes the file writer on drop.
fn init_logging(level: &str, log_dir: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("babel")
                .filename_suffix("log")
                .build(dir)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();
    Ok(guard)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli.config)?;

    match cli.command {
        Commands::Start => {
            let _guard = init_logging(&cfg.babel.log_level, Some(cfg.babel.logs_path().as_path()))?;

            let tg = match cfg.channel.telegram.as_ref() {
                Some(tg) if tg.enabled => tg.clone(),
                _ => anyhow::bail!(
                    "Telegram is not enabled. Enable [channel.telegram] in config.toml."
                ),
            };
            if tg.bot_token.is_empty() {
                anyhow::bail!(
                    "Telegram is enabled but bot_token is empty. \
                     Set it in config.toml or TELEGRAM_BOT_TOKEN env var."
                );
            }
            let channel: Arc<dyn Channel> = Arc::new(TelegramChannel::new(tg));

            let app = Arc::new(AppContext::new(cfg)?);
            println!("Babel: starting gateway...");
            gateway::Gateway::new(app, channel).run().await?;
        }
        Commands::Status => {
            init_logging("warn", None)?;
            let app = AppContext::new(cfg)?;
            let cfg = &app.config;
            let settings = app.settings.get();

            println!("Babel: status\n");
            println!("Config: {}", cli.config);
            println!("Data dir: {}", cfg.babel.data_path().display());
            println!("Settings: {}", app.settings.path().display());
            println!("Vocabulary: {}", app.vocab.path().display());
            println!();

            match cfg.channel.telegram.as_ref() {
                Some(tg) if tg.enabled && !tg.bot_token.is_empty() && tg.owner_id != 0 => {
                    println!("  telegram: configured (owner {})", tg.owner_id)
                }
                Some(tg) if tg.enabled && tg.bot_token.is_empty() => {
                    println!("  telegram: enabled but missing bot_token")
                }
                Some(tg) if tg.enabled => println!("  telegram: enabled but missing owner_id"),
                Some(_) => println!("  telegram: disabled"),
                None => println!("  telegram: not configured"),
            }
            println!();

            let key_state = |engine: &str, fallback: &str| {
                if !settings.api_key(engine).is_empty() {
                    "set"
                } else if !fallback.is_empty() {
                    "fallback"
                } else {
                    "missing"
                }
            };
            println!("Engine: {}", settings.engine);
            println!(
                "  gemini key: {}",
                key_state("gemini", &cfg.engines.fallback_gemini_key)
            );
            println!(
                "  openai key: {}",
                key_state("openai", &cfg.engines.fallback_openai_key)
            );
            for (name, custom) in &settings.custom_engines {
                println!("  {name}: {} ({})", custom.base_url, custom.model);
            }
            println!(
                "Search: {}",
                if app.search.is_enabled() { "enabled" } else { "disabled" }
            );
        }
        Commands::Translate { langs, text } => {
            init_logging(&cfg.babel.log_level, None)?;
            let targets = parse_langs(&langs);
            if targets.is_empty() {
                anyhow::bail!("no target language given. Usage: babel translate ja,en <text>");
            }
            let text = text.join(" ");
            let app = AppContext::new(cfg)?;
            let engine = app.settings.get().engine;

            let calls = targets
                .iter()
                .map(|t| app.translator.translate_with_fallback(&text, t, &engine));
            let results = join_all(calls).await;

            let mut failed = false;
            for (lang, result) in targets.iter().zip(results) {
                failed |= is_failure(&result);
                println!("[{}] {result}", lang.to_uppercase());
            }
            if failed {
                anyhow::bail!("some translations failed");
            }
        }
        Commands::Detect { text } => {
            init_logging(&cfg.babel.log_level, None)?;
            println!("{}", LanguageDetector::new().detect(&text.join(" ")));
        }
    }

    Ok(())
}
