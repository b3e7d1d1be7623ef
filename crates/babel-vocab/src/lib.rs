//! # babel-vocab
//!
//! JSON-backed vocabulary notebook with SM-2 style reviews, quizzes, and a
//! writing check.

pub mod quiz;
pub mod srs;
pub mod store;

pub use quiz::{QuizQuestion, WritingMatch, WritingReport};
pub use store::{StatsReport, VocabStats, VocabStore, WordEntry};
