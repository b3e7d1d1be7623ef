//! Language detection for skip and swap decisions.
//!
//! Script ranges decide first because they are unambiguous for short chat
//! messages. Everything else goes to the statistical detector, and a CJK
//! ratio check catches Han text it cannot classify.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Returned when no heuristic matches.
pub const UNKNOWN: &str = "unknown";

const CACHE_SIZE: usize = 512;

/// Ordered script checks: the first range family that occurs wins.
const SCRIPTS: &[(&str, &[(u32, u32)])] = &[
    (
        "ko",
        &[(0xAC00, 0xD7AF), (0x1100, 0x11FF), (0x3130, 0x318F)],
    ),
    ("ja", &[(0x3040, 0x30FF)]),
    ("ar", &[(0x0600, 0x06FF)]),
    ("ru", &[(0x0400, 0x04FF)]),
    ("th", &[(0x0E00, 0x0E7F)]),
    ("he", &[(0x0590, 0x05FF)]),
];

const CJK_RANGE: (u32, u32) = (0x4E00, 0x9FFF);
const CJK_THRESHOLD: f64 = 0.3;

/// Normalize a language code through the alias table.
///
/// `zh` and `zh-cn` become `zh-CN`, `zh-tw` becomes `zh-TW`, `jp` becomes
/// `ja`; every other code is lower-cased.
pub fn normalize(lang: &str) -> String {
    let lower = lang.trim().to_lowercase();
    match lower.as_str() {
        "zh" | "zh-cn" => "zh-CN".to_string(),
        "zh-tw" => "zh-TW".to_string(),
        "jp" => "ja".to_string(),
        _ => lower,
    }
}

/// Whether an already-detected code matches `target` after normalization.
pub fn same_language(detected: &str, target: &str) -> bool {
    same(detected, &normalize(target))
}

/// Pick the translation direction for swap mode from an already-detected
/// code: text in the home language goes to `foreign`, anything else comes
/// back `home`.
pub fn swap_target<'a>(detected: &str, home: &'a str, foreign: &'a str) -> &'a str {
    if same_language(detected, home) {
        foreign
    } else {
        home
    }
}

/// Whether two normalized codes denote the same language (any `zh*` pair matches).
fn same(detected: &str, normalized_target: &str) -> bool {
    if detected.starts_with("zh") && normalized_target.starts_with("zh") {
        return true;
    }
    detected == normalized_target
}

fn in_ranges(c: char, ranges: &[(u32, u32)]) -> bool {
    let code = c as u32;
    ranges.iter().any(|(lo, hi)| (*lo..=*hi).contains(&code))
}

fn script_language(text: &str) -> Option<&'static str> {
    SCRIPTS
        .iter()
        .find(|(_, ranges)| text.chars().any(|c| in_ranges(c, ranges)))
        .map(|(code, _)| *code)
}

fn statistical_language(text: &str) -> Option<String> {
    let info = whatlang::detect(text)?;
    let code = whatlang_code(info.lang())?;
    Some(normalize(code))
}

fn cjk_ratio(text: &str) -> f64 {
    let total = text.chars().filter(|c| *c != ' ').count().max(1);
    let cjk = text
        .chars()
        .filter(|c| in_ranges(*c, &[CJK_RANGE]))
        .count();
    cjk as f64 / total as f64
}

/// Uncached detection pipeline.
fn detect_uncached(text: &str) -> String {
    if let Some(code) = script_language(text) {
        return code.to_string();
    }
    if let Some(code) = statistical_language(text) {
        return code;
    }
    if cjk_ratio(text) > CJK_THRESHOLD {
        return "zh-CN".to_string();
    }
    UNKNOWN.to_string()
}

/// Memoizing language detector.
pub struct LanguageDetector {
    cache: Mutex<LruCache<String, String>>,
}

impl Default for LanguageDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageDetector {
    pub fn new() -> Self {
        let size = NonZeroUsize::new(CACHE_SIZE).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(size)),
        }
    }

    /// Detect the language code of `text`.
    pub fn detect(&self, text: &str) -> String {
        {
            let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(code) = cache.get(text) {
                return code.clone();
            }
        }
        let code = detect_uncached(text);
        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .put(text.to_string(), code.clone());
        code
    }

    /// Detect on the blocking pool so the statistical step never stalls the runtime.
    pub async fn detect_async(self: &Arc<Self>, text: &str) -> String {
        let detector = Arc::clone(self);
        let text = text.to_string();
        match tokio::task::spawn_blocking(move || detector.detect(&text)).await {
            Ok(code) => code,
            Err(e) => {
                warn!("language detection task failed: {e}");
                UNKNOWN.to_string()
            }
        }
    }

    /// Whether `text` is already written in `target`.
    pub async fn is_same_language(self: &Arc<Self>, text: &str, target: &str) -> bool {
        same_language(&self.detect_async(text).await, target)
    }

    /// Swap-mode direction for `text`; see [`swap_target`].
    pub async fn detect_swap_target<'a>(
        self: &Arc<Self>,
        text: &str,
        home: &'a str,
        foreign: &'a str,
    ) -> &'a str {
        swap_target(&self.detect_async(text).await, home, foreign)
    }
}

/// Map a whatlang language to the ISO 639-1 style code used everywhere else.
fn whatlang_code(lang: whatlang::Lang) -> Option<&'static str> {
    use whatlang::Lang::*;
    let code = match lang {
        Afr => "af",
        Ara => "ar",
        Bel => "be",
        Ben => "bn",
        Bul => "bg",
        Cat => "ca",
        Ces => "cs",
        Cmn => "zh",
        Dan => "da",
        Deu => "de",
        Ell => "el",
        Eng => "en",
        Epo => "eo",
        Est => "et",
        Fin => "fi",
        Fra => "fr",
        Heb => "he",
        Hin => "hi",
        Hrv => "hr",
        Hun => "hu",
        Ind => "id",
        Ita => "it",
        Jpn => "ja",
        Kat => "ka",
        Kor => "ko",
        Lat => "la",
        Lav => "lv",
        Lit => "lt",
        Mkd => "mk",
        Nld => "nl",
        Nob => "no",
        Pol => "pl",
        Por => "pt",
        Ron => "ro",
        Rus => "ru",
        Slk => "sk",
        Slv => "sl",
        Spa => "es",
        Srp => "sr",
        Swe => "sv",
        Tam => "ta",
        Tha => "th",
        Tgl => "tl",
        Tur => "tr",
        Ukr => "uk",
        Urd => "ur",
        Vie => "vi",
        _ => return None,
    };
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_aliases() {
        assert_eq!(normalize("zh"), "zh-CN");
        assert_eq!(normalize("ZH-cn"), "zh-CN");
        assert_eq!(normalize("zh-TW"), "zh-TW");
        assert_eq!(normalize("jp"), "ja");
        assert_eq!(normalize("EN"), "en");
        assert_eq!(normalize(" ko "), "ko");
    }

    #[test]
    fn test_script_heuristics() {
        let d = LanguageDetector::new();
        assert_eq!(d.detect("안녕하세요"), "ko");
        assert_eq!(d.detect("ありがとう"), "ja");
        assert_eq!(d.detect("مرحبا"), "ar");
        assert_eq!(d.detect("привет"), "ru");
        assert_eq!(d.detect("สวัสดี"), "th");
        assert_eq!(d.detect("שלום"), "he");
    }

    #[test]
    fn test_hangul_wins_over_everything() {
        let d = LanguageDetector::new();
        // Hangul mixed with kana and Cyrillic still resolves to Korean.
        assert_eq!(d.detect("한국어 テスト привет"), "ko");
        for text in ["가", "ㄱㄴㄷ", "사랑해요 사랑해요", "ᄀᄁᄂ"] {
            assert_eq!(d.detect(text), "ko", "{text}");
        }
    }

    #[test]
    fn test_kana_beats_kanji() {
        let d = LanguageDetector::new();
        assert_eq!(d.detect("多分風邪です"), "ja");
    }

    #[test]
    fn test_english_is_detected_statistically() {
        let d = LanguageDetector::new();
        assert_eq!(
            d.detect("The quick brown fox jumps over the lazy dog and keeps running"),
            "en"
        );
    }

    #[test]
    fn test_digits_only_is_unknown() {
        let d = LanguageDetector::new();
        assert_eq!(d.detect("12345 678"), UNKNOWN);
        assert_eq!(d.detect(""), UNKNOWN);
    }

    #[test]
    fn test_cjk_ratio() {
        assert!(cjk_ratio("你好世界") > CJK_THRESHOLD);
        assert!(cjk_ratio("abc 你") < 0.3);
    }

    #[test]
    fn test_chinese_detected_as_zh() {
        let d = LanguageDetector::new();
        assert!(d.detect("今天天气真好，我们去公园散步吧").starts_with("zh"));
    }

    #[tokio::test]
    async fn test_same_language_zh_aliases_agree() {
        let d = Arc::new(LanguageDetector::new());
        let text = "今天天气真好，我们去公园散步吧";
        assert_eq!(
            d.is_same_language(text, "zh").await,
            d.is_same_language(text, "zh-CN").await
        );
        assert!(d.is_same_language(text, "zh-TW").await);
        assert!(d.is_same_language("ありがとう", "jp").await);
        assert!(!d.is_same_language("ありがとう", "en").await);
    }

    #[tokio::test]
    async fn test_swap_target_only_returns_home_or_foreign() {
        let d = Arc::new(LanguageDetector::new());
        let inputs = [
            "你好世界",
            "こんにちは",
            "hello there my friend",
            "",
            "123",
            "안녕",
            "🙂",
        ];
        for text in inputs {
            let t = d.detect_swap_target(text, "zh-CN", "ja").await;
            assert!(t == "zh-CN" || t == "ja", "{text} -> {t}");
        }
    }

    #[tokio::test]
    async fn test_swap_direction() {
        let d = Arc::new(LanguageDetector::new());
        assert_eq!(
            d.detect_swap_target("こんにちは、元気ですか", "zh-CN", "ja").await,
            "zh-CN"
        );
        assert_eq!(d.detect_swap_target("안녕하세요", "ko", "en").await, "en");
        assert_eq!(swap_target("zh-TW", "zh", "ja"), "ja");
        assert_eq!(swap_target(UNKNOWN, "zh-CN", "ja"), "zh-CN");
    }

    #[test]
    fn test_cache_returns_same_answer() {
        let d = LanguageDetector::new();
        let first = d.detect("ありがとう");
        assert_eq!(d.detect("ありがとう"), first);
        assert_eq!(d.cache.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_detect_async() {
        let d = Arc::new(LanguageDetector::new());
        assert_eq!(d.detect_async("привет").await, "ru");
    }
}
