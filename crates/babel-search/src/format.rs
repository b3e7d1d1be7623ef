//! Rendering of result pages and the summary prompt.

use babel_core::text::{escape_html, truncate_chars};

use crate::client::{SearchPage, SearchResult, PAGE_SIZE};

/// Sampling temperature for search summaries.
pub const SUMMARY_TEMPERATURE: f32 = 0.7;

const TITLE_CHARS: usize = 60;
const SNIPPET_CHARS: usize = 120;
const PROMPT_SNIPPET_CHARS: usize = 200;

/// Render a results page as Telegram HTML.
pub fn format_results(page: &SearchPage, query: &str) -> String {
    if page.results.is_empty() {
        return "❌ No results found".to_string();
    }

    let mut out = format!("🔍 <b>Search results</b> for <i>{}</i>", escape_html(query));
    if page.total > PAGE_SIZE {
        let first = page.first_index();
        let last = first + page.results.len() - 1;
        out.push_str(&format!(
            "\n📄 Page {}/{} ({first}-{last})",
            page.page,
            page.total_pages()
        ));
    }
    out.push('\n');

    for (i, r) in page.results.iter().enumerate() {
        let title = if r.title.is_empty() { "(untitled)" } else { r.title.as_str() };
        out.push_str(&format!(
            "\n<b>{}. {}</b>\n",
            page.first_index() + i,
            escape_html(truncate_chars(title, TITLE_CHARS))
        ));
        if !r.snippet.is_empty() {
            out.push_str(&format!(
                "   {}\n",
                escape_html(truncate_chars(&r.snippet, SNIPPET_CHARS))
            ));
        }
        out.push_str(&format!("   🔗 {}\n", escape_html(&r.url)));
    }

    if page.page < page.total_pages() {
        out.push_str(&format!(
            "\nNext page: <code>.search {} #{}</code>",
            escape_html(query),
            page.page + 1
        ));
    }
    out
}

/// Prompt asking an LLM to summarize `results` in `lang`.
pub fn summary_prompt(query: &str, results: &[SearchResult], lang: &str) -> String {
    let mut prompt = format!(
        "Summarize the following web search results for the user.\n\
         Give the main answer to the query and a brief overview of the key facts.\n\
         Answer in the language with code [{lang}], in under 100 words.\n\n\
         Query: {query}\n\nResults:\n"
    );
    for (i, r) in results.iter().enumerate() {
        prompt.push_str(&format!(
            "{}. {}\n   {}\n   Source: {}\n",
            i + 1,
            r.title,
            truncate_chars(&r.snippet, PROMPT_SNIPPET_CHARS),
            r.url
        ));
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(n: usize, total: usize, page_no: usize) -> SearchPage {
        SearchPage {
            page: page_no,
            total,
            results: (0..n)
                .map(|i| SearchResult {
                    title: format!("Title <{i}>"),
                    url: format!("https://example.com/?a={i}&b=2"),
                    snippet: "snippet".into(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_empty_page() {
        assert_eq!(format_results(&page(0, 0, 1), "q"), "❌ No results found");
    }

    #[test]
    fn test_single_page_has_no_pager() {
        let text = format_results(&page(3, 3, 1), "rust");
        assert!(text.contains("<b>1. Title &lt;0&gt;</b>"));
        assert!(text.contains("a=0&amp;b=2"));
        assert!(!text.contains("Page "));
        assert!(!text.contains("Next page"));
    }

    #[test]
    fn test_multi_page_numbering() {
        let text = format_results(&page(5, 12, 2), "rust");
        assert!(text.contains("📄 Page 2/3 (6-10)"));
        assert!(text.contains("<b>6. "));
        assert!(text.contains(".search rust #3"));

        let last = format_results(&page(2, 12, 3), "rust");
        assert!(last.contains("(11-12)"));
        assert!(!last.contains("Next page"));
    }

    #[test]
    fn test_summary_prompt() {
        let results = page(2, 2, 1).results;
        let p = summary_prompt("what is rust", &results, "zh-CN");
        assert!(p.contains("[zh-CN]"));
        assert!(p.contains("100 words"));
        assert!(p.contains("Query: what is rust"));
        assert!(p.contains("2. Title <1>"));
    }
}
