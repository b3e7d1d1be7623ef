//! # babel-channels
//!
//! Chat transport integrations for Babel.

pub mod telegram;
pub mod utils;

pub use telegram::TelegramChannel;
