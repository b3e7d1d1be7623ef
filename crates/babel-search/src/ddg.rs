//! DuckDuckGo HTML endpoint.

use babel_core::error::BabelError;
use scraper::{Html, Selector};
use tracing::debug;

use crate::client::SearchResult;

pub const DEFAULT_URL: &str = "https://html.duckduckgo.com/html/";

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Result of one DuckDuckGo request.
#[derive(Debug)]
pub(crate) enum DdgOutcome {
    Results(Vec<SearchResult>),
    /// HTTP 202, 403 or 429: DuckDuckGo is throttling us.
    RateLimited(u16),
    Failed(String),
}

pub(crate) async fn fetch(client: &reqwest::Client, url: &str, query: &str) -> DdgOutcome {
    let resp = match client
        .post(url)
        .header("User-Agent", USER_AGENT)
        .form(&[("q", query)])
        .send()
        .await
    {
        Ok(r) => r,
        Err(e) => return DdgOutcome::Failed(format!("duckduckgo request failed: {e}")),
    };

    let status = resp.status().as_u16();
    if matches!(status, 202 | 403 | 429) {
        return DdgOutcome::RateLimited(status);
    }
    if !resp.status().is_success() {
        return DdgOutcome::Failed(format!("duckduckgo returned {status}"));
    }
    let body = match resp.text().await {
        Ok(b) => b,
        Err(e) => return DdgOutcome::Failed(format!("duckduckgo body read failed: {e}")),
    };
    match parse_results(&body) {
        Ok(results) => {
            debug!("duckduckgo: {} results", results.len());
            DdgOutcome::Results(results)
        }
        Err(e) => DdgOutcome::Failed(e.to_string()),
    }
}

fn selector(css: &str) -> Result<Selector, BabelError> {
    Selector::parse(css).map_err(|e| BabelError::Search(format!("bad selector {css}: {e}")))
}

/// Extract organic results from a DuckDuckGo HTML page.
pub fn parse_results(html: &str) -> Result<Vec<SearchResult>, BabelError> {
    let item = selector("div.result")?;
    let title = selector("a.result__a")?;
    let snippet = selector(".result__snippet")?;

    let doc = Html::parse_document(html);
    let results = doc
        .select(&item)
        .filter(|el| {
            !el.value()
                .attr("class")
                .is_some_and(|c| c.contains("result--ad"))
        })
        .filter_map(|el| {
            let link = el.select(&title).next()?;
            let href = link.attr("href")?;
            let snippet = el
                .select(&snippet)
                .next()
                .map(|s| collapse(&s.text().collect::<String>()))
                .unwrap_or_default();
            Some(SearchResult {
                title: collapse(&link.text().collect::<String>()),
                url: resolve_link(href),
                snippet,
            })
        })
        .collect();
    Ok(results)
}

/// Unwrap DuckDuckGo's `/l/?uddg=<target>` redirect links.
pub fn resolve_link(href: &str) -> String {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else if href.starts_with('/') {
        format!("https://duckduckgo.com{href}")
    } else {
        href.to_string()
    };
    reqwest::Url::parse(&absolute)
        .ok()
        .and_then(|u| {
            u.query_pairs()
                .find(|(k, _)| k == "uddg")
                .map(|(_, v)| v.into_owned())
        })
        .unwrap_or(absolute)
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
