//! Save transports: where the autosave synchronizer writes documents.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::Instant;

use crate::document::model::Document;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("storage endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("save rejected: {0}")]
    Rejected(String),
}

/// What the storage endpoint reports back for a successful write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedDocument {
    pub updated_at: String,
}

#[async_trait]
pub trait SaveTransport: Send + Sync + 'static {
    /// Persist the whole document. Dropping the returned future abandons
    /// the write.
    async fn save(&self, document: &Document) -> Result<SavedDocument, SyncError>;
}

/// `PUT {base_url}/v1/site` with the document as JSON.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/v1/site", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SaveTransport for HttpTransport {
    async fn save(&self, document: &Document) -> Result<SavedDocument, SyncError> {
        let response = self.client.put(&self.endpoint).json(document).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<SavedDocument>().await?)
    }
}

/// Keeps the last saved document in memory. Useful offline and in tests:
/// latency and failures can be injected, and every attempt is recorded.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    latency: Duration,
    log: Mutex<MemoryLog>,
}

#[derive(Debug, Default)]
struct MemoryLog {
    attempts: Vec<Instant>,
    completed: usize,
    abandoned: usize,
    fail_next: usize,
    last_saved: Option<Document>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    /// Make the next `n` saves fail.
    pub fn fail_next(&self, n: usize) {
        self.log.lock().fail_next = n;
    }

    /// When each save started.
    pub fn attempt_times(&self) -> Vec<Instant> {
        self.log.lock().attempts.clone()
    }

    pub fn attempts(&self) -> usize {
        self.log.lock().attempts.len()
    }

    /// Saves that ran to completion, successful or not.
    pub fn completed(&self) -> usize {
        self.log.lock().completed
    }

    /// Saves dropped before completing.
    pub fn abandoned(&self) -> usize {
        self.log.lock().abandoned
    }

    pub fn last_saved(&self) -> Option<Document> {
        self.log.lock().last_saved.clone()
    }
}

/// Counts the write as abandoned unless it finished.
struct Attempt<'a> {
    log: &'a Mutex<MemoryLog>,
    finished: bool,
}

impl Drop for Attempt<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.log.lock().abandoned += 1;
        }
    }
}

#[async_trait]
impl SaveTransport for MemoryTransport {
    async fn save(&self, document: &Document) -> Result<SavedDocument, SyncError> {
        self.log.lock().attempts.push(Instant::now());
        let mut attempt = Attempt {
            log: &self.log,
            finished: false,
        };
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        attempt.finished = true;

        let mut log = self.log.lock();
        log.completed += 1;
        if log.fail_next > 0 {
            log.fail_next -= 1;
            return Err(SyncError::Rejected("injected failure".into()));
        }
        let updated_at = Utc::now().to_rfc3339();
        let mut stored = document.clone();
        stored.updated_at = updated_at.clone();
        log.last_saved = Some(stored);
        Ok(SavedDocument { updated_at })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::factory::create_empty_document;
    use serde_json::Value;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn http_transport_puts_whole_document() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v1/site"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "updatedAt": "2026-10-19T08:00:00Z",
                "version": 2,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(&format!("{}/", server.uri()));
        assert_eq!(transport.endpoint(), format!("{}/v1/site", server.uri()));

        let document = create_empty_document();
        let saved = transport.save(&document).await.unwrap();
        assert_eq!(saved.updated_at, "2026-10-19T08:00:00Z");

        let request = &server.received_requests().await.unwrap()[0];
        let body = request.body_json::<Value>().unwrap();
        assert_eq!(body, serde_json::to_value(&document).unwrap());
        assert_eq!(body["pages"][0]["isHomePage"], true);
    }

    #[tokio::test]
    async fn http_transport_reports_status_failures() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v1/site"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(&server.uri());
        let err = transport.save(&create_empty_document()).await.unwrap_err();
        match err {
            SyncError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn http_transport_rejects_unexpected_reply() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v1/site"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(&server.uri());
        let err = transport.save(&create_empty_document()).await.unwrap_err();
        assert!(matches!(err, SyncError::Request(_)));
    }

    #[tokio::test]
    async fn memory_transport_records_attempts() {
        let transport = MemoryTransport::new();
        transport.fail_next(1);

        assert!(transport.save(&create_empty_document()).await.is_err());
        let saved = transport.save(&create_empty_document()).await.unwrap();

        assert_eq!(transport.attempts(), 2);
        assert_eq!(transport.completed(), 2);
        assert_eq!(transport.abandoned(), 0);
        assert_eq!(transport.last_saved().unwrap().updated_at, saved.updated_at);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_memory_save_counts_as_abandoned() {
        let transport = MemoryTransport::with_latency(Duration::from_secs(1));
        let doc = create_empty_document();
        let result =
            tokio::time::timeout(Duration::from_millis(10), transport.save(&doc)).await;
        assert!(result.is_err());
        assert_eq!(transport.abandoned(), 1);
        assert_eq!(transport.completed(), 0);
    }
}
