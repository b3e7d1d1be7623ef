//! Rate-limited, cached search client.

use babel_core::config::SearchConfig;
use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::{ddg, tavily};

/// Results per page.
pub const PAGE_SIZE: usize = 5;

const CACHE_ENTRIES: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// One page of results for a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPage {
    /// 1-based page number.
    pub page: usize,
    /// Number of results across all pages.
    pub total: usize,
    pub results: Vec<SearchResult>,
}

impl SearchPage {
    pub fn total_pages(&self) -> usize {
        self.total.div_ceil(PAGE_SIZE)
    }

    /// 1-based index of the first result on this page.
    pub fn first_index(&self) -> usize {
        (self.page - 1) * PAGE_SIZE + 1
    }
}

fn paginate(all: &[SearchResult], page: usize) -> SearchPage {
    let page = page.max(1);
    let start = (page - 1).saturating_mul(PAGE_SIZE).min(all.len());
    let end = (start + PAGE_SIZE).min(all.len());
    SearchPage {
        page,
        total: all.len(),
        results: all[start..end].to_vec(),
    }
}

/// Cache key for a query.
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Web search client.
///
/// Outbound searches are serialized through `last_search`, which enforces
/// the minimum interval between two requests. Sustained rate limiting from
/// DuckDuckGo opens a cooldown window during which uncached queries return
/// nothing.
pub struct SearchClient {
    http: reqwest::Client,
    config: SearchConfig,
    ddg_url: String,
    tavily_url: String,
    cache: Mutex<LruCache<String, (Instant, Vec<SearchResult>)>>,
    last_search: tokio::sync::Mutex<Option<Instant>>,
    cooldown_until: Mutex<Option<Instant>>,
}

impl SearchClient {
    pub fn new(http: reqwest::Client, config: SearchConfig) -> Self {
        let size = NonZeroUsize::new(CACHE_ENTRIES).unwrap_or(NonZeroUsize::MIN);
        Self {
            http,
            config,
            ddg_url: ddg::DEFAULT_URL.to_string(),
            tavily_url: tavily::DEFAULT_URL.to_string(),
            cache: Mutex::new(LruCache::new(size)),
            last_search: tokio::sync::Mutex::new(None),
            cooldown_until: Mutex::new(None),
        }
    }

    /// Point the client at other endpoints.
    pub fn with_endpoints(mut self, ddg_url: &str, tavily_url: &str) -> Self {
        self.ddg_url = ddg_url.to_string();
        self.tavily_url = tavily_url.to_string();
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Fetch one page of results. Never fails; problems yield an empty page.
    pub async fn search(&self, query: &str, page: usize) -> SearchPage {
        let key = normalize_query(query);
        if let Some(all) = self.cached(&key) {
            return paginate(&all, page);
        }

        if let Some(remaining) = self.cooldown_remaining() {
            warn!("search cooldown active, {}s remaining", remaining.as_secs());
            return paginate(&[], page);
        }

        self.wait_for_slot().await;

        let mut results = self.search_ddg(query).await;
        if results.is_empty() && !self.config.tavily_api_key.is_empty() {
            info!("duckduckgo returned nothing, trying tavily");
            results =
                tavily::fetch(&self.http, &self.tavily_url, &self.config.tavily_api_key, query)
                    .await;
        }

        if !results.is_empty() {
            self.store(key, results.clone());
        }
        paginate(&results, page)
    }

    /// Every cached result for a query, if still fresh.
    pub fn cached(&self, query: &str) -> Option<Vec<SearchResult>> {
        let key = normalize_query(query);
        let ttl = Duration::from_secs(self.config.cache_ttl_secs);
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        match cache.get(&key) {
            Some((at, results)) if at.elapsed() < ttl => Some(results.clone()),
            Some(_) => {
                cache.pop(&key);
                None
            }
            None => None,
        }
    }

    pub(crate) fn store(&self, key: String, results: Vec<SearchResult>) {
        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .put(key, (Instant::now(), results));
    }

    fn cooldown_remaining(&self) -> Option<Duration> {
        let until = (*self.cooldown_until.lock().unwrap_or_else(|e| e.into_inner()))?;
        let now = Instant::now();
        (until > now).then(|| until - now)
    }

    pub(crate) fn start_cooldown(&self) {
        let until = Instant::now() + Duration::from_secs(self.config.cooldown_secs);
        *self.cooldown_until.lock().unwrap_or_else(|e| e.into_inner()) = Some(until);
    }

    /// Wait until the minimum interval since the previous search has passed.
    async fn wait_for_slot(&self) {
        let min_interval = Duration::from_secs(self.config.min_interval_secs);
        let mut last = self.last_search.lock().await;
        if let Some(prev) = *last {
            let since = prev.elapsed();
            if since < min_interval {
                let wait = min_interval - since;
                info!("rate limiting: waiting {:.2}s before search", wait.as_secs_f64());
                tokio::time::sleep(wait).await;
            }
        }
        *last = Some(Instant::now());
    }

    /// DuckDuckGo with the exponential backoff ladder. Opens the cooldown
    /// after the last rate-limited attempt.
    async fn search_ddg(&self, query: &str) -> Vec<SearchResult> {
        let attempts = self.config.max_retries.max(1);
        for attempt in 0..attempts {
            match ddg::fetch(&self.http, &self.ddg_url, query).await {
                ddg::DdgOutcome::Results(results) => return results,
                ddg::DdgOutcome::Failed(e) => {
                    warn!("duckduckgo search failed: {e}");
                    return Vec::new();
                }
                ddg::DdgOutcome::RateLimited(status) if attempt + 1 < attempts => {
                    let delay = Duration::from_secs(self.config.initial_retry_delay_secs)
                        * 2u32.saturating_pow(attempt);
                    warn!(
                        "rate limited by duckduckgo ({status}), waiting {}s (attempt {}/{attempts})",
                        delay.as_secs(),
                        attempt + 1
                    );
                    tokio::time::sleep(delay).await;
                }
                ddg::DdgOutcome::RateLimited(status) => {
                    error!("duckduckgo still rate limited ({status}) after {attempts} attempts");
                    self.start_cooldown();
                }
            }
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results(n: usize) -> Vec<SearchResult> {
        (1..=n)
            .map(|i| SearchResult {
                title: format!("t{i}"),
                url: format!("https://example.com/{i}"),
                snippet: format!("s{i}"),
            })
            .collect()
    }

    fn client() -> SearchClient {
        // Unroutable endpoints: any test that reaches the network fails fast.
        SearchClient::new(reqwest::Client::new(), SearchConfig::default())
            .with_endpoints("http://127.0.0.1:9/ddg", "http://127.0.0.1:9/tavily")
    }

    #[test]
    fn test_paginate() {
        let all = results(12);
        let p1 = paginate(&all, 1);
        assert_eq!(p1.results.len(), 5);
        assert_eq!(p1.total_pages(), 3);
        assert_eq!(p1.first_index(), 1);
        let p3 = paginate(&all, 3);
        assert_eq!(p3.results.len(), 2);
        assert_eq!(p3.results[0].title, "t11");
        assert_eq!(p3.first_index(), 11);
        assert!(paginate(&all, 9).results.is_empty());
        assert_eq!(paginate(&all, 0).page, 1);
    }

    #[test]
    fn test_normalize_query() {
        assert_eq!(normalize_query("  Rust Lang "), "rust lang");
    }

    #[tokio::test]
    async fn test_cache_hit_skips_network() {
        let c = client();
        c.store(normalize_query("Rust"), results(7));
        let page = c.search("  rust ", 2).await;
        assert_eq!(page.total, 7);
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[0].title, "t6");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_expires() {
        let c = client();
        c.store("rust".into(), results(1));
        assert!(c.cached("rust").is_some());
        tokio::time::advance(Duration::from_secs(301)).await;
        assert!(c.cached("rust").is_none());
    }

    #[tokio::test]
    async fn test_cooldown_returns_empty() {
        let c = client();
        c.start_cooldown();
        let page = c.search("anything", 1).await;
        assert!(page.results.is_empty());
        assert_eq!(page.total, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_min_interval_between_searches() {
        let c = client();
        let start = Instant::now();
        c.wait_for_slot().await;
        c.wait_for_slot().await;
        assert!(start.elapsed() >= Duration::from_secs(3));
    }
}
