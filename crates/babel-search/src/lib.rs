//! # babel-search
//!
//! Web search behind a cooperative rate limiter: DuckDuckGo's HTML endpoint
//! first, Tavily as the fallback, results cached per normalized query.

pub mod client;
pub mod ddg;
pub mod format;
pub mod tavily;

pub use client::{SearchClient, SearchPage, SearchResult, PAGE_SIZE};
pub use format::{format_results, summary_prompt, SUMMARY_TEMPERATURE};
