//! Stack Exchange search, used both for prompt augmentation and as a raw proxy.
//!
//! The two entry points handle failure differently on purpose: [`SearchClient::search`]
//! fails open to an empty list, [`SearchClient::fetch_raw`] returns the error.

use anyhow::{Context, Result};
use reqwest::Client;
use scraper::Html;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::data_models::SearchResult;

const USER_AGENT: &str = concat!("llm-faq/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Post {
    title: String,
    link: String,
    is_answered: bool,
}

#[derive(Debug, Clone)]
pub struct SearchClient {
    client: Client,
    api_url: String,
    site: String,
}

impl SearchClient {
    pub fn new(api_url: &str, site: &str, timeout: Duration) -> Result<SearchClient> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Failed to build search HTTP client")?;
        Ok(SearchClient {
            client,
            api_url: api_url.to_string(),
            site: site.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<SearchClient> {
        Self::new(
            &config.search_api_url,
            &config.search_site,
            config.search_timeout,
        )
    }

    /// Upstream JSON body, verbatim.
    #[instrument(skip(self))]
    pub async fn fetch_raw(&self, keywords: &str, max_results: usize) -> Result<serde_json::Value> {
        let pagesize = max_results.to_string();
        let res = self
            .client
            .get(&self.api_url)
            .query(&[
                ("order", "desc"),
                ("sort", "relevance"),
                ("q", keywords),
                ("site", self.site.as_str()),
                ("pagesize", pagesize.as_str()),
            ])
            .send()
            .await
            .context("Search request failed")?
            .error_for_status()
            .context("Search backend returned an error status")?;

        res.json::<serde_json::Value>()
            .await
            .context("Search backend returned invalid JSON")
    }

    /// Ranked post summaries for `keywords`. Never fails: any error yields an empty list.
    pub async fn search(&self, keywords: &str, max_results: usize) -> Vec<SearchResult> {
        match self.fetch_raw(keywords, max_results).await {
            Ok(body) => {
                let results = parse_results(body, max_results);
                debug!(count = results.len(), "search results");
                results
            }
            Err(e) => {
                warn!("search failed, continuing without it: {:#}", e);
                Vec::new()
            }
        }
    }
}

/// Items missing a field are skipped; at most `max_results` are kept, in upstream order.
pub fn parse_results(body: serde_json::Value, max_results: usize) -> Vec<SearchResult> {
    let page = match serde_json::from_value::<SearchPage>(body) {
        Ok(page) => page,
        Err(e) => {
            warn!(error = %e, "unexpected search response shape");
            return Vec::new();
        }
    };

    page.items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<Post>(item).ok())
        .take(max_results)
        .map(|post| SearchResult::new(decode_title(&post.title), post.link, post.is_answered))
        .collect()
}

/// Decode HTML entities and fold whitespace so a title fits on one line.
pub fn decode_title(raw: &str) -> String {
    let fragment = Html::parse_fragment(raw);
    let text = fragment.root_element().text().collect::<String>();
    text.split_whitespace().collect::<Vec<&str>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, timeout: Duration) -> SearchClient {
        SearchClient::new(
            &format!("{}/2.3/search/advanced", server.uri()),
            "stackoverflow",
            timeout,
        )
        .unwrap()
    }

    fn sample_body() -> serde_json::Value {
        json!({
            "items": [
                {"title": "How to sort a list in Python?", "link": "https://so/q/1", "is_answered": true},
                {"title": "What&#39;s &quot;self&quot; for?", "link": "https://so/q/2", "is_answered": false},
                {"title": "Missing link", "is_answered": true},
                {"title": "Iterating &amp; mutating", "link": "https://so/q/3", "is_answered": true},
                {"title": "Fourth", "link": "https://so/q/4", "is_answered": false}
            ],
            "has_more": true
        })
    }

    #[test]
    fn test_decode_title_entities() {
        assert_eq!(decode_title("What&#39;s &quot;self&quot;?"), "What's \"self\"?");
        assert_eq!(decode_title("&lt;div&gt; &amp; &lt;span&gt;"), "<div> & <span>");
        assert_eq!(decode_title("plain title"), "plain title");
    }

    #[test]
    fn test_decode_title_folds_whitespace() {
        assert_eq!(decode_title("  line one\nline   two "), "line one line two");
    }

    #[test]
    fn test_parse_results_skips_incomplete_items_and_caps() {
        let results = parse_results(sample_body(), 3);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].title, "How to sort a list in Python?");
        assert!(results[0].is_answered);
        assert_eq!(results[1].title, "What's \"self\" for?");
        assert!(!results[1].is_answered);
        assert_eq!(results[2].url, "https://so/q/3");
    }

    #[test]
    fn test_parse_results_unexpected_shape_is_empty() {
        assert!(parse_results(json!(["not", "an", "object"]), 3).is_empty());
        assert!(parse_results(json!({}), 3).is_empty());
    }

    #[tokio::test]
    async fn test_search_sends_expected_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2.3/search/advanced"))
            .and(query_param("q", "python list"))
            .and(query_param("site", "stackoverflow"))
            .and(query_param("sort", "relevance"))
            .and(query_param("order", "desc"))
            .and(query_param("pagesize", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
            .expect(1)
            .mount(&server)
            .await;

        let results = client_for(&server, Duration::from_secs(5))
            .search("python list", 3)
            .await;
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn test_search_fails_open_on_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        assert!(client.search("anything", 3).await.is_empty());
        assert!(client.fetch_raw("anything", 3).await.is_err());
    }

    #[tokio::test]
    async fn test_search_fails_open_on_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(sample_body())
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let results = client_for(&server, Duration::from_millis(200))
            .search("slow", 3)
            .await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_raw_returns_body_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
            .mount(&server)
            .await;

        let body = client_for(&server, Duration::from_secs(5))
            .fetch_raw("python", 3)
            .await
            .unwrap();
        assert_eq!(body, sample_body());
    }
}
