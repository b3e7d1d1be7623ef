//! # babel-core
//!
//! Core types, traits, configuration, runtime settings, and language detection for Babel.

pub mod config;
pub mod error;
pub mod language;
pub mod message;
pub mod settings;
pub mod text;
pub mod traits;

pub use config::shellexpand;
