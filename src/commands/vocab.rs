//! Vocabulary command handlers: .vocab .quiz .write, and replies to review
//! and quiz prompts.

use babel_core::{language, text::escape_html};
use babel_engines::is_failure;
use babel_vocab::{quiz::parse_answers, QuizQuestion, WordEntry};
use tracing::warn;

use super::{CommandContext, Reply};
use crate::{context::AppContext, pending::Prompt};

const LIST_LIMIT: usize = 20;
const DEFAULT_QUIZ: usize = 5;
const MAX_QUIZ: usize = 20;

const VOCAB_USAGE: &str = "Usage:\n\
    <code>.vocab add word | translation | example</code>\n\
    <code>.vocab list [lang]</code>\n\
    <code>.vocab del id</code>\n\
    <code>.vocab review</code>\n\
    <code>.vocab stats</code>";

pub(super) async fn vocab(ctx: &CommandContext<'_>, arg: &str) -> Reply {
    let (sub, rest) = match arg.split_once(char::is_whitespace) {
        Some((sub, rest)) => (sub.to_lowercase(), rest.trim()),
        None => (arg.to_lowercase(), ""),
    };
    match sub.as_str() {
        "" | "stats" => stats(ctx.app),
        "add" => add(ctx.app, rest).await,
        "list" => list(ctx.app, rest),
        "del" | "delete" => delete(ctx.app, rest),
        "review" => review(ctx.app),
        _ => Reply::usage(VOCAB_USAGE),
    }
}

fn stats(app: &AppContext) -> Reply {
    let report = app.vocab.stats();
    let s = &report.stats;
    let accuracy = if s.quiz_total > 0 {
        format!("{:.0}%", f64::from(s.quiz_correct) * 100.0 / f64::from(s.quiz_total))
    } else {
        "-".to_string()
    };
    Reply::html(format!(
        "📚 <b>Vocabulary</b>\n\
         Words: {}\n\
         Learned: {}\n\
         Due now: {}\n\
         Reviews: {}\n\
         Quiz: {}/{} ({accuracy})\n\
         🔥 Streak: {} days",
        s.total_words,
        s.words_learned,
        report.due_words,
        s.total_reviews,
        s.quiz_correct,
        s.quiz_total,
        s.streak_days,
    ))
}

async fn add(app: &AppContext, rest: &str) -> Reply {
    let mut fields = rest.splitn(3, '|').map(str::trim);
    let word = fields.next().unwrap_or_default();
    let mut translation = fields.next().unwrap_or_default().to_string();
    let example = fields.next().unwrap_or_default();
    if word.is_empty() {
        return Reply::usage(VOCAB_USAGE);
    }

    let settings = app.settings.get();
    if translation.is_empty() {
        let result = app
            .translator
            .translate_with_settings(word, &settings.home_lang, &settings.engine, &settings)
            .await;
        if is_failure(&result) {
            return Reply::usage(format!(
                "❌ Could not translate <b>{}</b>, add a translation after <code>|</code>",
                escape_html(word)
            ));
        }
        translation = result;
    }

    let detected = app.detector.detect_async(word).await;
    let lang = if detected == language::UNKNOWN {
        settings.default_lang.clone()
    } else {
        detected
    };

    match app.vocab.add_word(word, &translation, example, &lang) {
        Ok(entry) => Reply::html(format!(
            "✅ Saved <b>{}</b> → {} <code>[{}]</code> #{}",
            escape_html(&entry.word),
            escape_html(&entry.translation),
            escape_html(&entry.lang),
            entry.id
        )),
        Err(e) => {
            warn!("vocab add failed: {e}");
            Reply::usage(format!("❌ {}", escape_html(&e.to_string())))
        }
    }
}

fn list(app: &AppContext, rest: &str) -> Reply {
    let lang = rest.split_whitespace().next().map(language::normalize);
    let words = app.vocab.words(LIST_LIMIT, lang.as_deref());
    if words.is_empty() {
        return Reply::html("📭 No words yet. Add one with <code>.vocab add</code>");
    }
    let mut out = String::from("📚 <b>Recent words</b>\n");
    for w in &words {
        out.push_str(&format!(
            "\n• <b>{}</b> → {} <code>#{}</code>",
            escape_html(&w.word),
            escape_html(&w.translation),
            w.id
        ));
    }
    Reply::html(out)
}

fn delete(app: &AppContext, rest: &str) -> Reply {
    let Some(id) = rest.trim_start_matches('#').parse::<i64>().ok() else {
        return Reply::usage("Usage: <code>.vocab del id</code>");
    };
    match app.vocab.delete_word(id) {
        Ok(true) => Reply::html(format!("🗑 Deleted #{id}")),
        Ok(false) => Reply::usage(format!("❌ No word #{id}")),
        Err(e) => {
            warn!("vocab delete failed: {e}");
            Reply::usage(format!("❌ {}", escape_html(&e.to_string())))
        }
    }
}

fn review_card(entry: &WordEntry, due: usize) -> String {
    let mut card = format!(
        "🧠 <b>Review</b> ({due} due)\n\n<b>{}</b>\n<tg-spoiler>{}</tg-spoiler>",
        escape_html(&entry.word),
        escape_html(&entry.translation)
    );
    if !entry.example.is_empty() {
        card.push_str(&format!("\n<i>{}</i>", escape_html(&entry.example)));
    }
    card.push_str("\n\nReply 1-5: 1 = forgot, 5 = perfect");
    card
}

fn review(app: &AppContext) -> Reply {
    let due = app.vocab.due_words();
    match due.first() {
        Some(entry) => Reply::html(review_card(entry, due.len()))
            .with_prompt(Prompt::Review { word_id: entry.id }),
        None => Reply::html("🎉 Nothing to review right now"),
    }
}

fn render_quiz(questions: &[QuizQuestion]) -> String {
    let mut out = String::from("📝 <b>Quiz</b>\n");
    for (i, q) in questions.iter().enumerate() {
        out.push_str(&format!("\n{}. <b>{}</b>\n", i + 1, escape_html(&q.word)));
        let options: Vec<String> = q
            .options
            .iter()
            .zip('a'..='z')
            .map(|(o, letter)| format!("{letter}) {}", escape_html(o)))
            .collect();
        out.push_str(&format!("   {}\n", options.join("   ")));
    }
    let example: String = ('a'..='z').take(questions.len()).collect();
    out.push_str(&format!(
        "\nReply with your answers, e.g. <code>{example}</code>"
    ));
    out
}

pub(super) fn quiz(app: &AppContext, arg: &str) -> Reply {
    let requested = match arg.split_whitespace().next() {
        None => DEFAULT_QUIZ,
        Some(n) => match n.parse::<usize>() {
            Ok(n) if n > 0 => n.min(MAX_QUIZ),
            _ => return Reply::usage("Usage: <code>.quiz [count]</code>"),
        },
    };
    let questions = app.vocab.quiz(requested);
    if questions.is_empty() {
        return Reply::usage(
            "❌ A quiz needs at least 4 reviewed words. Try <code>.vocab review</code> first",
        );
    }
    Reply::html(render_quiz(&questions)).with_prompt(Prompt::Quiz { questions })
}

pub(super) fn write(app: &AppContext, arg: &str) -> Reply {
    let Some((lang, text)) = arg
        .split_once(char::is_whitespace)
        .map(|(lang, text)| (language::normalize(lang), text.trim()))
        .filter(|(_, text)| !text.is_empty())
    else {
        return Reply::usage("Usage: <code>.write lang text</code>");
    };
    let report = app.vocab.check_writing(text, &lang);
    let mut out = format!(
        "✍️ <b>Writing check</b> <code>[{}]</code>\n<i>{}</i>\n",
        escape_html(&report.target_lang),
        escape_html(&report.checked)
    );
    if report.matches.is_empty() {
        out.push_str(&format!(
            "\nNo match among your {} words",
            report.total_vocab
        ));
    } else {
        for m in &report.matches {
            out.push_str(&format!(
                "\n✅ <b>{}</b> → {}",
                escape_html(&m.word),
                escape_html(&m.translation)
            ));
            if !m.example.is_empty() {
                out.push_str(&format!("\n   <i>{}</i>", escape_html(&m.example)));
            }
        }
    }
    Reply::html(out)
}

/// Grade a reply to a pending prompt. `None` when `text` is not an answer,
/// in which case the prompt stays open.
pub fn answer_prompt(app: &AppContext, prompt: &Prompt, text: &str) -> Option<Reply> {
    match prompt {
        Prompt::Review { word_id } => {
            let quality = text.trim().parse::<u8>().ok().filter(|q| (1..=5).contains(q))?;
            Some(grade_review(app, *word_id, quality))
        }
        Prompt::Quiz { questions } => {
            let answers = parse_answers(text);
            if answers.is_empty() {
                return None;
            }
            Some(grade_quiz(app, questions, &answers))
        }
    }
}

fn grade_review(app: &AppContext, word_id: i64, quality: u8) -> Reply {
    let entry = match app.vocab.review_word(word_id, quality) {
        Ok(Some(entry)) => entry,
        Ok(None) => return Reply::usage("❌ That word is no longer in the notebook"),
        Err(e) => {
            warn!("review failed: {e}");
            return Reply::usage(format!("❌ {}", escape_html(&e.to_string())));
        }
    };
    let mut out = format!(
        "✅ <b>{}</b>: next review in {} day(s)",
        escape_html(&entry.word),
        entry.interval
    );

    let due = app.vocab.due_words();
    match due.first() {
        Some(next) => {
            out.push_str("\n\n");
            out.push_str(&review_card(next, due.len()));
            Reply::html(out).with_prompt(Prompt::Review { word_id: next.id })
        }
        None => {
            out.push_str("\n\n🎉 All caught up");
            Reply::html(out)
        }
    }
}

fn grade_quiz(app: &AppContext, questions: &[QuizQuestion], answers: &[char]) -> Reply {
    let mut correct = 0;
    let mut misses = Vec::new();
    for (i, q) in questions.iter().enumerate() {
        let ok = answers.get(i).is_some_and(|a| q.is_correct(*a));
        if ok {
            correct += 1;
        } else {
            misses.push(q);
        }
        if let Err(e) = app.vocab.record_quiz_result(ok) {
            warn!("could not record quiz result: {e}");
        }
    }

    let mut out = format!("🎯 <b>{correct}/{}</b> correct", questions.len());
    for q in misses {
        out.push_str(&format!(
            "\n❌ <b>{}</b> → {}",
            escape_html(&q.word),
            escape_html(&q.correct)
        ));
    }
    Reply::html(out)
}
