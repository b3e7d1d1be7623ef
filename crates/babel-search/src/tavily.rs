//! Tavily search API (fallback backend).

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

use crate::client::SearchResult;

pub const DEFAULT_URL: &str = "https://api.tavily.com/search";
const TIMEOUT: Duration = Duration::from_secs(30);
const MAX_RESULTS: u32 = 30;

#[derive(Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    max_results: u32,
}

#[derive(Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

impl From<TavilyResult> for SearchResult {
    fn from(r: TavilyResult) -> Self {
        Self {
            title: r.title,
            url: r.url,
            snippet: r.content,
        }
    }
}

/// Query Tavily. Any failure is logged and yields no results.
pub(crate) async fn fetch(
    client: &reqwest::Client,
    url: &str,
    api_key: &str,
    query: &str,
) -> Vec<SearchResult> {
    info!("searching tavily");
    let resp = client
        .post(url)
        .bearer_auth(api_key)
        .timeout(TIMEOUT)
        .json(&TavilyRequest {
            query,
            max_results: MAX_RESULTS,
        })
        .send()
        .await;
    let resp = match resp {
        Ok(r) if r.status().is_success() => r,
        Ok(r) => {
            warn!("tavily returned {}", r.status());
            return Vec::new();
        }
        Err(e) => {
            warn!("tavily search failed: {e}");
            return Vec::new();
        }
    };
    match resp.json::<TavilyResponse>().await {
        Ok(parsed) => parsed.results.into_iter().map(SearchResult::from).collect(),
        Err(e) => {
            warn!("tavily response unreadable: {e}");
            Vec::new()
        }
    }
}
