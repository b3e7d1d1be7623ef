//! Auto mode: what happens to operator messages that are not commands.

use babel_core::{language::LanguageDetector, settings::Settings};
use std::sync::Arc;

use crate::composer::{Mode, TranslationRequest};

/// The stored auto-translation policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoMode {
    Off,
    /// Home-language text goes to the default foreign language, anything else
    /// comes back home.
    Swap,
    /// Append the default foreign language.
    Tr,
    /// Replace with the default foreign language.
    Rr,
    /// Append the listed languages.
    T(String),
    /// Replace with the listed languages.
    R(String),
}

impl AutoMode {
    /// Parse an `.auto` argument or a stored setting. A leading dot is
    /// accepted. Returns `None` for anything unrecognized.
    pub fn parse(arg: &str) -> Option<Self> {
        let arg = arg.trim();
        let arg = arg.strip_prefix('.').unwrap_or(arg);
        let (head, rest) = match arg.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (arg, ""),
        };
        match head.to_lowercase().as_str() {
            "" | "off" | "stop" => Some(Self::Off),
            "swap" => Some(Self::Swap),
            "tr" => Some(Self::Tr),
            "rr" => Some(Self::Rr),
            "t" if !rest.is_empty() => Some(Self::T(rest.to_string())),
            "r" if !rest.is_empty() => Some(Self::R(rest.to_string())),
            _ => None,
        }
    }

    /// Read the mode out of the settings; an unparseable value is off.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::parse(&settings.auto_cmd).unwrap_or(Self::Off)
    }

    /// Value stored in `auto_cmd`.
    pub fn setting_value(&self) -> String {
        match self {
            Self::Off => String::new(),
            Self::Swap => "swap".into(),
            Self::Tr => "tr".into(),
            Self::Rr => "rr".into(),
            Self::T(langs) => format!("t {langs}"),
            Self::R(langs) => format!("r {langs}"),
        }
    }

    /// The translation to run for `text`, if any. Swap mode detects on the
    /// blocking pool.
    pub async fn request(
        &self,
        text: &str,
        settings: &Settings,
        detector: &Arc<LanguageDetector>,
    ) -> Option<TranslationRequest> {
        let request = match self {
            Self::Off => return None,
            Self::Swap => {
                let target = detector
                    .detect_swap_target(text, &settings.home_lang, &settings.default_lang)
                    .await;
                return Some(TranslationRequest::new(text, target, Mode::Append));
            }
            Self::Tr => TranslationRequest::new(text, &settings.default_lang, Mode::Append),
            Self::Rr => TranslationRequest::new(text, &settings.default_lang, Mode::Replace),
            Self::T(langs) => TranslationRequest::new(text, langs, Mode::Append),
            Self::R(langs) => TranslationRequest::new(text, langs, Mode::Replace),
        };
        Some(request.skip_if_target())
    }
}
