#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use leadform::config::{Config, StoreConfig};
use leadform::models::{PersistedSubmission, SubmissionDraft};
use leadform::state::SharedState;
use leadform::store::{
    DEFAULT_RETENTION, JournalStore, MemorySlots, StorageError, SubmissionStore,
};
use leadform::submission::identifier;

/// A running test server backed by an in-memory journal.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub state: SharedState,
    pub journal: Option<Arc<JournalStore>>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Journal entries, oldest first. Panics for apps spawned with another store.
    pub async fn journal_entries(&self) -> Vec<PersistedSubmission> {
        self.journal
            .as_ref()
            .expect("app was not spawned with a journal store")
            .entries()
            .await
    }

    /// Submit a JSON draft, return (body, status).
    pub async fn submit_json(&self, data: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/v1/contact"))
            .json(data)
            .send()
            .await
            .expect("submit json failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Submit form-urlencoded data, return (body, status).
    pub async fn submit_form(&self, data: &[(&str, &str)]) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/v1/contact"))
            .form(data)
            .send()
            .await
            .expect("submit form failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Ask the server to validate a JSON draft, return (body, status).
    pub async fn validate_json(&self, data: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/v1/contact/validate"))
            .json(data)
            .send()
            .await
            .expect("validate request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }
}

pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        log_level: "warn".to_string(),
        store: StoreConfig::Journal {
            dir: "unused".into(),
            quota_bytes: 0,
            retention: DEFAULT_RETENTION,
        },
        submit_delay: Duration::ZERO,
        max_body_size: 65_536,
        trusted_proxies: vec![],
        cors_origins: vec![],
        redirect_url: None,
        rate_limit: 100,
        rate_limit_window_secs: 60,
    }
}

/// Spawn a test app writing to an unbounded in-memory journal.
pub async fn spawn_app() -> TestApp {
    spawn_app_with_config(test_config()).await
}

pub async fn spawn_app_with_config(config: Config) -> TestApp {
    let journal = Arc::new(JournalStore::new(Arc::new(MemorySlots::new())));
    let mut app = spawn_app_with_store(journal.clone(), config).await;
    app.journal = Some(journal);
    app
}

pub async fn spawn_app_with_store(store: Arc<dyn SubmissionStore>, config: Config) -> TestApp {
    let (app, state) = leadform::build_app(store, config);

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        client,
        state,
        journal: None,
    }
}

/// A draft that passes every validation rule.
pub fn valid_draft() -> SubmissionDraft {
    SubmissionDraft {
        name: "Jo Homeowner".to_string(),
        phone: "(555) 123-4567".to_string(),
        email: "jo@example.com".to_string(),
        property_address: "1 Main St, Springfield".to_string(),
        message: "Inherited the house, need to sell quickly.".to_string(),
    }
}

pub fn valid_draft_json() -> Value {
    serde_json::to_value(valid_draft()).unwrap()
}

/// A persisted record with a whole-second timestamp, `seq` seconds past a fixed instant.
pub fn stored_record(seq: u32) -> PersistedSubmission {
    let base: DateTime<Utc> = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
    PersistedSubmission::from_draft(
        &valid_draft(),
        identifier::generate(),
        base + chrono::Duration::seconds(seq as i64),
    )
}

/// Store whose writes always fail with a non-capacity database error.
pub struct FailingStore;

#[async_trait]
impl SubmissionStore for FailingStore {
    fn name(&self) -> &str {
        "failing"
    }

    async fn append(&self, _record: PersistedSubmission) -> Result<(), StorageError> {
        Err(StorageError::Database(sqlx::Error::PoolTimedOut))
    }
}

/// Store that accepts everything and counts the writes.
#[derive(Default)]
pub struct CountingStore {
    appends: AtomicUsize,
}

impl CountingStore {
    pub fn appends(&self) -> usize {
        self.appends.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SubmissionStore for CountingStore {
    fn name(&self) -> &str {
        "counting"
    }

    async fn append(&self, _record: PersistedSubmission) -> Result<(), StorageError> {
        self.appends.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
