//! Multiple-choice quizzes and the writing check.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::store::WordEntry;

const MIN_REVIEWED: usize = 4;
const DISTRACTORS: usize = 3;

/// One multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    pub word: String,
    pub correct: String,
    /// Shuffled translations, `correct` among them.
    pub options: Vec<String>,
}

impl QuizQuestion {
    /// Index of the correct option.
    pub fn answer_index(&self) -> Option<usize> {
        self.options.iter().position(|o| *o == self.correct)
    }

    /// Whether option letter `letter` (`a`, `b`, ...) is correct.
    pub fn is_correct(&self, letter: char) -> bool {
        let idx = (letter.to_ascii_lowercase() as usize).wrapping_sub('a' as usize);
        self.options.get(idx).is_some_and(|o| *o == self.correct)
    }
}

/// Build up to `min(requested, reviewed / 3)` questions over reviewed words.
pub fn generate<R: Rng + ?Sized>(
    words: &[WordEntry],
    requested: usize,
    rng: &mut R,
) -> Vec<QuizQuestion> {
    let mut pool: Vec<&WordEntry> = words.iter().filter(|w| w.repetitions > 0).collect();
    if pool.len() < MIN_REVIEWED {
        return Vec::new();
    }

    let count = requested.min(pool.len() / 3);
    let mut questions = Vec::with_capacity(count);
    for _ in 0..count {
        let idx = rng.gen_range(0..pool.len());
        let correct = pool.swap_remove(idx);

        let others: Vec<&WordEntry> = words.iter().filter(|w| w.id != correct.id).collect();
        let mut options: Vec<String> = others
            .choose_multiple(rng, DISTRACTORS.min(others.len()))
            .map(|w| w.translation.clone())
            .collect();
        options.push(correct.translation.clone());
        options.shuffle(rng);

        questions.push(QuizQuestion {
            word: correct.word.clone(),
            correct: correct.translation.clone(),
            options,
        });
    }
    questions
}

/// Parse an answer sheet such as `"abca"`, `"a b c"`, `"A,B"` or `"1 2 3"`.
///
/// Only option letters `a`-`d` and digits `1`-`4` are accepted, with digits
/// mapped to letters. Anything else yields an empty sheet.
pub fn parse_answers(text: &str) -> Vec<char> {
    let mut answers = Vec::new();
    for c in text.trim().chars() {
        if c.is_whitespace() || c == ',' {
            continue;
        }
        match option_letter(c) {
            Some(letter) => answers.push(letter),
            None => return Vec::new(),
        }
    }
    answers
}

fn option_letter(c: char) -> Option<char> {
    let letter = match c.to_ascii_lowercase() {
        l @ 'a'..='d' => l,
        d @ '1'..='4' => (b'a' + (d as u8 - b'1')) as char,
        _ => return None,
    };
    Some(letter)
}

/// A notebook word found in a writing sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WritingMatch {
    pub word: String,
    pub translation: String,
    pub example: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WritingReport {
    pub checked: String,
    pub target_lang: String,
    pub total_vocab: usize,
    pub matches: Vec<WritingMatch>,
}

/// Compare `text` with the notebook words of `lang` (exact, case-insensitive).
pub fn check_writing(words: &[WordEntry], text: &str, lang: &str) -> WritingReport {
    let needle = text.trim().to_lowercase();
    let matches = words
        .iter()
        .filter(|w| w.lang == lang && w.word.to_lowercase() == needle)
        .map(|w| WritingMatch {
            word: w.word.clone(),
            translation: w.translation.clone(),
            example: w.example.clone(),
        })
        .collect();
    WritingReport {
        checked: text.to_string(),
        target_lang: lang.to_string(),
        total_vocab: words.len(),
        matches,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn notebook(n: usize, reviewed: usize) -> Vec<WordEntry> {
        (0..n)
            .map(|i| {
                let mut w = WordEntry::new(
                    i as i64,
                    &format!("word{i}"),
                    &format!("tr{i}"),
                    "",
                    "en",
                    Utc::now(),
                );
                if i < reviewed {
                    w.repetitions = 1;
                }
                w
            })
            .collect()
    }

    #[test]
    fn test_too_few_reviewed() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(generate(&notebook(10, 3), 5, &mut rng).is_empty());
    }

    #[test]
    fn test_question_count_is_capped() {
        let mut rng = StdRng::seed_from_u64(2);
        assert_eq!(generate(&notebook(20, 9), 5, &mut rng).len(), 3);
        assert_eq!(generate(&notebook(20, 20), 5, &mut rng).len(), 5);
        assert_eq!(generate(&notebook(20, 20), 2, &mut rng).len(), 2);
    }

    #[test]
    fn test_questions_are_well_formed() {
        let mut rng = StdRng::seed_from_u64(3);
        let questions = generate(&notebook(12, 12), 4, &mut rng);
        let mut seen = Vec::new();
        for q in &questions {
            assert_eq!(q.options.len(), 4);
            assert!(q.options.contains(&q.correct));
            let idx = q.answer_index().unwrap();
            let letter = (b'a' + idx as u8) as char;
            assert!(q.is_correct(letter));
            assert!(q.is_correct(letter.to_ascii_uppercase()));
            assert!(!seen.contains(&q.word), "words are not repeated");
            seen.push(q.word.clone());
        }
    }

    #[test]
    fn test_is_correct_out_of_range() {
        let q = QuizQuestion {
            word: "w".into(),
            correct: "x".into(),
            options: vec!["x".into(), "y".into()],
        };
        assert!(q.is_correct('a'));
        assert!(!q.is_correct('b'));
        assert!(!q.is_correct('z'));
        assert!(!q.is_correct('1'));
    }

    #[test]
    fn test_parse_answers() {
        assert_eq!(parse_answers("a b, C"), vec!['a', 'b', 'c']);
        assert_eq!(parse_answers("ABD"), vec!['a', 'b', 'd']);
        assert_eq!(parse_answers(" a,b,,d "), vec!['a', 'b', 'd']);
    }

    #[test]
    fn test_parse_answers_digits_map_to_letters() {
        assert_eq!(parse_answers("1 2 3"), vec!['a', 'b', 'c']);
        assert_eq!(parse_answers("4321"), vec!['d', 'c', 'b', 'a']);
        assert_eq!(parse_answers("a 2, D"), vec!['a', 'b', 'd']);
    }

    #[test]
    fn test_parse_answers_rejects_chatter() {
        assert!(parse_answers("nice one thanks").is_empty());
        assert!(parse_answers("abe").is_empty());
        assert!(parse_answers("1 5").is_empty());
        assert!(parse_answers("a; b").is_empty());
        assert!(parse_answers("   ").is_empty());
        assert!(parse_answers("ok!").is_empty());
    }

    #[test]
    fn test_check_writing() {
        let mut words = notebook(3, 0);
        words[1].word = "Hund".into();
        words[1].lang = "de".into();
        let report = check_writing(&words, "hund", "de");
        assert_eq!(report.matches.len(), 1);
        assert_eq!(report.matches[0].word, "Hund");
        assert_eq!(report.total_vocab, 3);
        assert!(check_writing(&words, "hund", "en").matches.is_empty());
        assert!(check_writing(&words, "hunde", "de").matches.is_empty());
    }
}
