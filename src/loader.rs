use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use reqwest::header::{CACHE_CONTROL, PRAGMA};
use reqwest::{Client, Url};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::models::EventRecord;
use crate::utils;

const USER_AGENT: &str = "EventBoard/0.1";
const BODY_SNIPPET: usize = 200;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid events endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("http error: {0}")]
    Http(String),
    #[error("HTTP {status} {reason}: {body}")]
    Status {
        status: u16,
        reason: String,
        body: String,
    },
    #[error("unexpected events payload: {0}")]
    Decode(String),
}

/// Fetches the event list, defeating every HTTP cache on the way.
pub struct Loader {
    client: Client,
    endpoint: Url,
    last_stamp: AtomicU64,
}

impl Loader {
    pub fn new(endpoint: &str, timeout: Option<Duration>) -> Result<Self, LoadError> {
        let endpoint = Url::parse(endpoint.trim())
            .map_err(|err| LoadError::InvalidEndpoint(format!("{endpoint}: {err}")))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(LoadError::InvalidEndpoint(endpoint.to_string()));
        }

        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| LoadError::Http(err.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            last_stamp: AtomicU64::new(0),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, LoadError> {
        let endpoint = config
            .data_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| LoadError::InvalidEndpoint("no data_url configured".to_string()))?;
        Self::new(endpoint, config.request_timeout_secs.map(Duration::from_secs))
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Epoch milliseconds, bumped when the clock has not moved since the last call.
    fn next_stamp(&self) -> u64 {
        let now = utils::now_millis();
        let prev = self
            .last_stamp
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        now.max(prev + 1)
    }

    /// The endpoint with a fresh `v=` parameter appended to its query.
    pub fn request_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("v", &self.next_stamp().to_string());
        url
    }

    pub async fn fetch(&self) -> Result<Vec<EventRecord>, LoadError> {
        let url = self.request_url();
        debug!(%url, "requesting events");

        let response = self
            .client
            .get(url)
            .header(CACHE_CONTROL, "no-store")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(|err| LoadError::Http(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| LoadError::Http(err.to_string()))?;
        if !status.is_success() {
            return Err(LoadError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
                body,
            });
        }

        let records: Vec<EventRecord> = serde_json::from_str(&body).map_err(|err| {
            LoadError::Decode(format!("{err} (body starts {:?})", snippet(&body)))
        })?;
        info!(count = records.len(), "events loaded");
        Ok(records)
    }
}

fn snippet(body: &str) -> &str {
    match body.char_indices().nth(BODY_SNIPPET) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[test]
    fn stamps_strictly_increase() {
        let loader = Loader::new("https://feed.test/exec", None).expect("loader");
        let stamps: Vec<u64> = (0..5).map(|_| loader.next_stamp()).collect();
        assert!(stamps.windows(2).all(|pair| pair[0] < pair[1]), "{stamps:?}");
    }

    #[test]
    fn request_url_keeps_existing_query() {
        let loader = Loader::new("https://feed.test/exec?sheet=agenda", None).expect("loader");
        let url = loader.request_url();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs[0], ("sheet".to_string(), "agenda".to_string()));
        assert_eq!(pairs[1].0, "v");
        assert!(pairs[1].1.parse::<u64>().is_ok());
    }

    #[test]
    fn rejects_unusable_endpoints() {
        assert!(matches!(
            Loader::new("not a url", None),
            Err(LoadError::InvalidEndpoint(_))
        ));
        assert!(matches!(
            Loader::new("ftp://feed.test/events", None),
            Err(LoadError::InvalidEndpoint(_))
        ));
        assert!(matches!(
            Loader::from_config(&AppConfig::default()),
            Err(LoadError::InvalidEndpoint(_))
        ));
    }

    #[tokio::test]
    async fn fetches_records_without_cache() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/exec")
            .match_query(Matcher::Regex(r"^v=\d+$".to_string()))
            .match_header("cache-control", "no-store")
            .match_header("pragma", "no-cache")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"date": "2025-12-05", "title": "A", "status": "warn"}]"#)
            .create_async()
            .await;

        let loader = Loader::new(&format!("{}/exec", server.url()), None).expect("loader");
        let records = loader.fetch().await.expect("fetch");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title.as_deref(), Some("A"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/exec")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let loader = Loader::new(&format!("{}/exec", server.url()), None).expect("loader");
        let err = loader.fetch().await.expect_err("should fail");
        match err {
            LoadError::Status { status, body, .. } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_array_payload_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/exec")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"error": "sheet not found"}"#)
            .create_async()
            .await;

        let loader = Loader::new(&format!("{}/exec", server.url()), None).expect("loader");
        assert!(matches!(loader.fetch().await, Err(LoadError::Decode(_))));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_an_http_error() {
        let loader = Loader::new("http://127.0.0.1:9/exec", Some(Duration::from_secs(2)))
            .expect("loader");
        assert!(matches!(loader.fetch().await, Err(LoadError::Http(_))));
    }
}
