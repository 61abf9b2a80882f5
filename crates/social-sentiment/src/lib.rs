pub mod lexicon;

pub use lexicon::LexiconAnalyzer;

use async_trait::async_trait;
use sentinel_core::{SentimentProvider, SentimentSummary};

/// Collects recent social posts for a search term and scores them with the
/// lexicon analyzer. Every failure path degrades to the neutral empty
/// summary; this provider never surfaces an error to its caller.
pub struct SocialScanner {
    client: reqwest::Client,
    search_url: Option<String>,
    analyzer: LexiconAnalyzer,
}

impl SocialScanner {
    /// `search_url` is the post-search endpoint; `None` disables collection
    /// and every scan returns the neutral summary.
    pub fn new(search_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(15))
                .build()
                .expect("Failed to build HTTP client"),
            search_url: search_url.filter(|u| !u.is_empty()),
            analyzer: LexiconAnalyzer::new(),
        }
    }

    /// Fetch post texts mentioning `query`. The endpoint returns a JSON
    /// array of posts, each carrying a `content` (or `text`) field.
    async fn fetch_posts(&self, query: &str, max_items: usize) -> Option<Vec<String>> {
        let base = self.search_url.as_deref()?;
        let url = format!("{base}?q={}&limit={max_items}", urlencode(query));

        let response = match self.client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => resp,
            Ok(resp) => {
                tracing::warn!(query, status = %resp.status(), "social search returned error status");
                return None;
            }
            Err(e) => {
                tracing::warn!(query, error = %e, "social search unreachable");
                return None;
            }
        };

        let json: serde_json::Value = match response.json().await {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(query, error = %e, "social search returned invalid payload");
                return None;
            }
        };

        let posts = json.as_array()?;
        let texts = posts
            .iter()
            .take(max_items)
            .filter_map(|post| {
                post.get("content")
                    .or_else(|| post.get("text"))
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
            })
            .filter(|t| !t.is_empty())
            .collect();

        Some(texts)
    }
}

#[async_trait]
impl SentimentProvider for SocialScanner {
    async fn scan(&self, query: &str, max_items: usize) -> SentimentSummary {
        let Some(texts) = self.fetch_posts(query, max_items).await else {
            return SentimentSummary::default();
        };

        let scores: Vec<f64> = texts.iter().map(|t| self.analyzer.score(t)).collect();
        let summary = SentimentSummary::from_scores(scores);
        tracing::debug!(
            query,
            count = summary.sample_count,
            avg = summary.average_score,
            "scored social sentiment"
        );
        summary
    }
}

fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
