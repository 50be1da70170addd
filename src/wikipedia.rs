//! Wikipedia REST summary lookup used to find a representative photo per university.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

pub const SUMMARY_API_BASE: &str = "https://en.wikipedia.org/api/rest_v1/page/summary";

/// Same unreserved set as JavaScript's `encodeURIComponent`.
const TITLE_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Finds a thumbnail image for a page title. Every failure is a miss.
pub trait PhotoLookup {
    async fn thumbnail(&self, title: &str) -> Option<String>;
}

/// Response from `GET /page/summary/{title}`. Only the thumbnail is read.
#[derive(Deserialize, Debug)]
struct PageSummary {
    thumbnail: Option<Thumbnail>,
}

#[derive(Deserialize, Debug)]
struct Thumbnail {
    source: String,
}

#[derive(Clone, Debug)]
pub struct WikipediaClient {
    http: Client,
    base_url: String,
}

impl WikipediaClient {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `Ok(None)` for a non-2xx status, `Err` for transport or decode failures.
    async fn fetch_summary(&self, title: &str) -> Result<Option<PageSummary>, reqwest::Error> {
        let url = format!("{}/{}", self.base_url, encode_title(title));
        let response = self
            .http
            .get(&url)
            .header("User-Agent", crate::USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            debug!(title, status = status.as_u16(), "summary not found");
            return Ok(None);
        }
        Ok(Some(response.json().await?))
    }
}

impl PhotoLookup for WikipediaClient {
    async fn thumbnail(&self, title: &str) -> Option<String> {
        match self.fetch_summary(title).await {
            Ok(summary) => summary
                .and_then(|s| s.thumbnail)
                .map(|t| t.source)
                .filter(|source| !source.trim().is_empty()),
            Err(e) => {
                warn!(title, error = %e, "summary lookup failed");
                None
            }
        }
    }
}

pub(crate) fn encode_title(title: &str) -> String {
    utf8_percent_encode(title, TITLE_ENCODE_SET).to_string()
}


#[cfg(test)]
mod http_tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn thumbnail_source_is_returned() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/McGill%20University"))
            .and(header_exists("user-agent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "title": "McGill University",
                "thumbnail": {"source": "https://upload.wikimedia.org/mcgill.jpg", "width": 320}
            })))
            .mount(&server)
            .await;

        let client = WikipediaClient::new(Client::new(), &server.uri());
        assert_eq!(
            client.thumbnail("McGill University").await.as_deref(),
            Some("https://upload.wikimedia.org/mcgill.jpg")
        );
    }

    #[tokio::test]
    async fn not_found_is_a_miss() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = WikipediaClient::new(Client::new(), &server.uri());
        assert!(client.thumbnail("Nowhere U").await.is_none());
    }

    #[tokio::test]
    async fn missing_thumbnail_is_a_miss() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"title": "Plain"})))
            .mount(&server)
            .await;

        let client = WikipediaClient::new(Client::new(), &server.uri());
        assert!(client.thumbnail("Plain").await.is_none());
    }

    #[tokio::test]
    async fn undecodable_body_is_a_miss() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = WikipediaClient::new(Client::new(), &server.uri());
        assert!(client.thumbnail("Broken").await.is_none());
    }

    #[tokio::test]
    async fn transport_failure_is_a_miss() {
        let client = WikipediaClient::new(Client::new(), "http://127.0.0.1:1");
        assert!(client.thumbnail("Unreachable").await.is_none());
    }
}
