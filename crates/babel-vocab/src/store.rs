//! JSON-backed vocabulary store.
//!
//! The whole notebook lives in memory behind one mutex and is rewritten to
//! disk after every mutation.

use babel_core::error::BabelError;
use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

use crate::quiz::{self, QuizQuestion, WritingReport};
use crate::srs;

/// One notebook entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordEntry {
    /// Millisecond timestamp of creation, unique within the notebook.
    pub id: i64,
    pub word: String,
    pub translation: String,
    #[serde(default)]
    pub example: String,
    #[serde(default)]
    pub lang: String,
    pub created_at: DateTime<Utc>,
    pub next_review: DateTime<Utc>,
    /// Days until the next review.
    pub interval: u32,
    pub ease_factor: f64,
    pub repetitions: u32,
}

impl WordEntry {
    pub fn new(
        id: i64,
        word: &str,
        translation: &str,
        example: &str,
        lang: &str,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            word: word.trim().to_string(),
            translation: translation.trim().to_string(),
            example: example.trim().to_string(),
            lang: lang.to_string(),
            created_at: now,
            next_review: now,
            interval: 1,
            ease_factor: srs::DEFAULT_EASE,
            repetitions: 0,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review <= now
    }
}

/// Lifetime study counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabStats {
    pub total_words: usize,
    pub words_learned: usize,
    pub quiz_correct: u32,
    pub quiz_total: u32,
    pub streak_days: u32,
    pub last_study_date: Option<NaiveDate>,
    pub total_reviews: u32,
}

/// Stats plus figures computed at read time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsReport {
    pub stats: VocabStats,
    pub due_words: usize,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct VocabFile {
    words: Vec<WordEntry>,
    stats: VocabStats,
}

impl VocabFile {
    fn touch_streak(&mut self, today: NaiveDate) {
        self.stats.streak_days =
            srs::next_streak(self.stats.streak_days, self.stats.last_study_date, today);
        self.stats.last_study_date = Some(today);
    }

    fn refresh_counts(&mut self) {
        self.stats.total_words = self.words.len();
        self.stats.words_learned = self.words.iter().filter(|w| w.repetitions > 0).count();
    }
}

/// Vocabulary notebook persisted at one JSON path.
pub struct VocabStore {
    path: PathBuf,
    state: Mutex<VocabFile>,
}

impl VocabStore {
    /// Open the notebook at `path`. A missing file starts empty; an unreadable
    /// one is logged and replaced on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file = read_file(&path);
        info!(
            "Vocabulary loaded from {} ({} words)",
            path.display(),
            file.words.len()
        );
        Self {
            path,
            state: Mutex::new(file),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, VocabFile> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Add a word at the front of the notebook.
    pub fn add_word(
        &self,
        word: &str,
        translation: &str,
        example: &str,
        lang: &str,
    ) -> Result<WordEntry, BabelError> {
        self.add_word_at(word, translation, example, lang, Utc::now())
    }

    pub(crate) fn add_word_at(
        &self,
        word: &str,
        translation: &str,
        example: &str,
        lang: &str,
        now: DateTime<Utc>,
    ) -> Result<WordEntry, BabelError> {
        if word.trim().is_empty() {
            return Err(BabelError::Vocab("word must not be empty".into()));
        }
        let mut file = self.lock();
        let mut id = now.timestamp_millis();
        while file.words.iter().any(|w| w.id == id) {
            id += 1;
        }
        let entry = WordEntry::new(id, word, translation, example, lang, now);
        file.words.insert(0, entry.clone());
        file.touch_streak(now.date_naive());
        file.refresh_counts();
        write_file(&self.path, &file)?;
        Ok(entry)
    }

    /// Remove a word by id. Returns whether it existed.
    pub fn delete_word(&self, id: i64) -> Result<bool, BabelError> {
        let mut file = self.lock();
        let before = file.words.len();
        file.words.retain(|w| w.id != id);
        if file.words.len() == before {
            return Ok(false);
        }
        file.refresh_counts();
        write_file(&self.path, &file)?;
        Ok(true)
    }

    pub fn get(&self, id: i64) -> Option<WordEntry> {
        self.lock().words.iter().find(|w| w.id == id).cloned()
    }

    /// Newest-first listing, optionally restricted to one language.
    pub fn words(&self, limit: usize, lang: Option<&str>) -> Vec<WordEntry> {
        self.lock()
            .words
            .iter()
            .filter(|w| lang.map_or(true, |l| w.lang == l))
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn due_words(&self) -> Vec<WordEntry> {
        self.due_words_at(Utc::now())
    }

    pub(crate) fn due_words_at(&self, now: DateTime<Utc>) -> Vec<WordEntry> {
        self.lock()
            .words
            .iter()
            .filter(|w| w.is_due(now))
            .cloned()
            .collect()
    }

    /// Grade a review (0 to 5). `None` when the id is unknown.
    pub fn review_word(&self, id: i64, quality: u8) -> Result<Option<WordEntry>, BabelError> {
        self.review_word_at(id, quality, Utc::now())
    }

    pub(crate) fn review_word_at(
        &self,
        id: i64,
        quality: u8,
        now: DateTime<Utc>,
    ) -> Result<Option<WordEntry>, BabelError> {
        if quality > srs::MAX_QUALITY {
            return Err(BabelError::Vocab(format!(
                "quality must be 0-{}, got {quality}",
                srs::MAX_QUALITY
            )));
        }
        let mut file = self.lock();
        file.touch_streak(now.date_naive());
        let Some(entry) = file.words.iter_mut().find(|w| w.id == id) else {
            return Ok(None);
        };
        srs::review(entry, quality, now);
        let reviewed = entry.clone();
        file.stats.total_reviews += 1;
        file.refresh_counts();
        write_file(&self.path, &file)?;
        Ok(Some(reviewed))
    }

    pub fn stats(&self) -> StatsReport {
        self.stats_at(Utc::now())
    }

    pub(crate) fn stats_at(&self, now: DateTime<Utc>) -> StatsReport {
        let file = self.lock();
        let mut stats = file.stats.clone();
        stats.total_words = file.words.len();
        stats.words_learned = file.words.iter().filter(|w| w.repetitions > 0).count();
        StatsReport {
            due_words: file.words.iter().filter(|w| w.is_due(now)).count(),
            stats,
        }
    }

    /// Multiple-choice questions over reviewed words. Empty when fewer than
    /// four words have been reviewed.
    pub fn quiz(&self, questions: usize) -> Vec<QuizQuestion> {
        self.quiz_with(questions, &mut rand::thread_rng())
    }

    pub fn quiz_with<R: Rng + ?Sized>(&self, questions: usize, rng: &mut R) -> Vec<QuizQuestion> {
        quiz::generate(&self.lock().words, questions, rng)
    }

    pub fn record_quiz_result(&self, correct: bool) -> Result<(), BabelError> {
        let mut file = self.lock();
        file.stats.quiz_total += 1;
        if correct {
            file.stats.quiz_correct += 1;
        }
        write_file(&self.path, &file)
    }

    /// Check `text` against the notebook's words in `lang`.
    pub fn check_writing(&self, text: &str, lang: &str) -> WritingReport {
        quiz::check_writing(&self.lock().words, text, lang)
    }
}

fn read_file(path: &Path) -> VocabFile {
    if !path.exists() {
        return VocabFile::default();
    }
    match std::fs::read_to_string(path)
        .map_err(BabelError::from)
        .and_then(|s| serde_json::from_str::<VocabFile>(&s).map_err(BabelError::from))
    {
        Ok(file) => file,
        Err(e) => {
            warn!("could not load vocabulary, starting empty: {e}");
            VocabFile::default()
        }
    }
}

fn write_file(path: &Path, file: &VocabFile) -> Result<(), BabelError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(file)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_path() -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!(
            "__babel_vocab_test_{}_{}__",
            std::process::id(),
            id
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir.join("vocab.json")
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, d, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_add_puts_newest_first_and_persists() {
        let path = temp_path();
        let store = VocabStore::open(&path);
        store.add_word_at("犬", "dog", "", "ja", day(1)).unwrap();
        store.add_word_at("猫", "cat", "猫が好き", "ja", day(1)).unwrap();

        let reopened = VocabStore::open(&path);
        let words = reopened.words(10, None);
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].word, "猫");
        assert_eq!(words[0].example, "猫が好き");
        assert_eq!(reopened.stats_at(day(1)).stats.total_words, 2);
    }

    #[test]
    fn test_ids_never_collide() {
        let store = VocabStore::open(temp_path());
        let a = store.add_word_at("a", "1", "", "en", day(1)).unwrap();
        let b = store.add_word_at("b", "2", "", "en", day(1)).unwrap();
        let c = store.add_word_at("c", "3", "", "en", day(1)).unwrap();
        assert_ne!(a.id, b.id);
        assert_ne!(b.id, c.id);
        assert_ne!(a.id, c.id);
    }

    #[test]
    fn test_empty_word_rejected() {
        let store = VocabStore::open(temp_path());
        assert!(store.add_word_at("  ", "x", "", "en", day(1)).is_err());
    }

    #[test]
    fn test_delete() {
        let store = VocabStore::open(temp_path());
        let w = store.add_word_at("hund", "dog", "", "de", day(1)).unwrap();
        assert!(store.delete_word(w.id).unwrap());
        assert!(!store.delete_word(w.id).unwrap());
        assert!(store.words(10, None).is_empty());
    }

    #[test]
    fn test_filter_by_language_and_limit() {
        let store = VocabStore::open(temp_path());
        store.add_word_at("犬", "dog", "", "ja", day(1)).unwrap();
        store.add_word_at("개", "dog", "", "ko", day(1)).unwrap();
        store.add_word_at("猫", "cat", "", "ja", day(1)).unwrap();
        assert_eq!(store.words(10, Some("ja")).len(), 2);
        assert_eq!(store.words(1, Some("ja"))[0].word, "猫");
        assert!(store.words(10, Some("fr")).is_empty());
    }

    #[test]
    fn test_review_schedules_and_counts() {
        let store = VocabStore::open(temp_path());
        let w = store.add_word_at("犬", "dog", "", "ja", day(1)).unwrap();
        assert_eq!(store.due_words_at(day(1)).len(), 1);

        let reviewed = store.review_word_at(w.id, 4, day(1)).unwrap().unwrap();
        assert_eq!(reviewed.interval, 1);
        assert_eq!(reviewed.next_review, day(1) + Duration::days(1));
        assert!(store.due_words_at(day(1)).is_empty());
        assert_eq!(store.due_words_at(day(2)).len(), 1);

        let report = store.stats_at(day(1));
        assert_eq!(report.stats.total_reviews, 1);
        assert_eq!(report.stats.words_learned, 1);
        assert_eq!(report.due_words, 0);
    }

    #[test]
    fn test_review_validation() {
        let store = VocabStore::open(temp_path());
        assert!(store.review_word_at(1, 6, day(1)).is_err());
        assert_eq!(store.review_word_at(12345, 3, day(1)).unwrap(), None);
    }

    #[test]
    fn test_streak_across_days() {
        let store = VocabStore::open(temp_path());
        let w = store.add_word_at("a", "b", "", "en", day(1)).unwrap();
        store.review_word_at(w.id, 5, day(2)).unwrap();
        store.review_word_at(w.id, 5, day(2)).unwrap();
        assert_eq!(store.stats_at(day(2)).stats.streak_days, 2);
        store.review_word_at(w.id, 5, day(5)).unwrap();
        let stats = store.stats_at(day(5)).stats;
        assert_eq!(stats.streak_days, 1);
        assert_eq!(stats.last_study_date, Some(day(5).date_naive()));
    }

    #[test]
    fn test_quiz_requires_reviewed_words() {
        let store = VocabStore::open(temp_path());
        let mut rng = StdRng::seed_from_u64(7);
        for (w, t) in [("a", "1"), ("b", "2"), ("c", "3"), ("d", "4"), ("e", "5")] {
            store.add_word_at(w, t, "", "en", day(1)).unwrap();
        }
        assert!(store.quiz_with(5, &mut rng).is_empty());

        for w in store.words(10, None).into_iter().take(4) {
            store.review_word_at(w.id, 4, day(1)).unwrap();
        }
        // 4 reviewed words allow 4 / 3 = 1 question.
        assert_eq!(store.quiz_with(5, &mut rng).len(), 1);
    }

    #[test]
    fn test_quiz_results_are_counted() {
        let path = temp_path();
        let store = VocabStore::open(&path);
        store.record_quiz_result(true).unwrap();
        store.record_quiz_result(false).unwrap();
        let stats = VocabStore::open(&path).stats().stats;
        assert_eq!((stats.quiz_correct, stats.quiz_total), (1, 2));
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let path = temp_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[oops").unwrap();
        let store = VocabStore::open(&path);
        assert!(store.words(10, None).is_empty());
        store.add_word_at("x", "y", "", "en", day(1)).unwrap();
        assert_eq!(VocabStore::open(&path).words(10, None).len(), 1);
    }
}
