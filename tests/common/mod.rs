// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared test helpers: app construction and in-process fake upstreams.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use async_trait::async_trait;
use biasbounty_gateway::config::Config;
use biasbounty_gateway::db::{MarketplaceStore, MongoMarketplace, SupabaseDb};
use biasbounty_gateway::error::AppError;
use biasbounty_gateway::models::marketplace::SubmissionPatch;
use biasbounty_gateway::models::{now_rfc3339, FileDoc, NewFile, NewSubmission, Submission};
use biasbounty_gateway::routes::create_router;
use biasbounty_gateway::AppState;
use mongodb::bson::oid::ObjectId;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with(Config::test_default(), SupabaseDb::new_mock())
}

/// Create a test app from explicit config and database, with an offline
/// marketplace.
#[allow(dead_code)]
pub fn create_test_app_with(config: Config, db: SupabaseDb) -> (axum::Router, Arc<AppState>) {
    build_app(config, db, Arc::new(MongoMarketplace::new_mock()))
}

/// Create a test app whose marketplace is backed by `store`.
#[allow(dead_code)]
pub fn create_marketplace_test_app(store: FakeMarketplace) -> (axum::Router, Arc<AppState>) {
    build_app(Config::test_default(), SupabaseDb::new_mock(), Arc::new(store))
}

fn build_app(
    config: Config,
    db: SupabaseDb,
    marketplace: Arc<dyn MarketplaceStore>,
) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(config, db, marketplace));
    (create_router(state.clone()), state)
}

/// Serve `router` on an ephemeral local port and return its base URL.
#[allow(dead_code)]
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Test server failed");
    });
    format!("http://{}", addr)
}

/// Collect a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&body).expect("Body is not JSON")
}

// ─── Multipart ───────────────────────────────────────────────

pub const BOUNDARY: &str = "gateway-test-boundary";

/// Minimal multipart/form-data encoder for request bodies.
#[derive(Default)]
#[allow(dead_code)]
pub struct MultipartBody {
    body: Vec<u8>,
}

#[allow(dead_code)]
impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                .as_bytes(),
        );
        self
    }

    pub fn content_type() -> String {
        format!("multipart/form-data; boundary={BOUNDARY}")
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}

// ─── Fake PostgREST ──────────────────────────────────────────

/// In-memory stand-in for Supabase's PostgREST API.
///
/// Supports the subset the gateway uses: `eq.` filters, `order=col.asc|desc`,
/// `limit`, `offset`, inserts returning representation and patches.
/// `select` is ignored, so embedded relations are never returned.
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct FakePostgrest {
    tables: Arc<Mutex<HashMap<String, Vec<Value>>>>,
    next_id: Arc<AtomicU64>,
}

#[allow(dead_code)]
impl FakePostgrest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .extend(rows);
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Serve the fake and return a database client connected to it.
    pub async fn spawn(&self) -> SupabaseDb {
        let router = Router::new()
            .route(
                "/rest/v1/{table}",
                get(select_rows).post(insert_rows).patch(update_rows),
            )
            .with_state(self.clone());
        let url = spawn_server(router).await;
        SupabaseDb::new(&url, "test_supabase_key").expect("Failed to create client")
    }
}

const RESERVED_PARAMS: [&str; 4] = ["select", "order", "limit", "offset"];

fn authorized(headers: &HeaderMap) -> bool {
    headers.get("apikey").is_some_and(|v| v == "test_supabase_key")
        && headers
            .get("authorization")
            .is_some_and(|v| v == "Bearer test_supabase_key")
}

fn unauthorized() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({"message": "No API key found in request"})),
    )
        .into_response()
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn matches(row: &Value, params: &[(String, String)]) -> bool {
    params
        .iter()
        .filter(|(key, _)| !RESERVED_PARAMS.contains(&key.as_str()))
        .all(|(key, filter)| match filter.strip_prefix("eq.") {
            Some(expected) => row.get(key).is_some_and(|v| as_text(v) == expected),
            None => false,
        })
}

fn compare(a: &Value, b: &Value) -> Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => as_text(a).cmp(&as_text(b)),
    }
}

fn param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, v)| v.as_str())
}

async fn select_rows(
    State(fake): State<FakePostgrest>,
    Path(table): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> axum::response::Response {
    if !authorized(&headers) {
        return unauthorized();
    }

    let mut rows: Vec<Value> = fake
        .rows(&table)
        .into_iter()
        .filter(|row| matches(row, &params))
        .collect();

    if let Some(order) = param(&params, "order") {
        let (column, direction) = order.split_once('.').unwrap_or((order, "asc"));
        rows.sort_by(|a, b| {
            let ord = compare(&a[column], &b[column]);
            if direction == "desc" {
                ord.reverse()
            } else {
                ord
            }
        });
    }

    let offset = param(&params, "offset")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let limit = param(&params, "limit")
        .and_then(|v| v.parse().ok())
        .unwrap_or(usize::MAX);
    let rows: Vec<Value> = rows.into_iter().skip(offset).take(limit).collect();

    Json(rows).into_response()
}

async fn insert_rows(
    State(fake): State<FakePostgrest>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> axum::response::Response {
    if !authorized(&headers) {
        return unauthorized();
    }

    let incoming = match body {
        Value::Array(rows) => rows,
        row => vec![row],
    };

    let mut inserted = Vec::new();
    for mut row in incoming {
        if row.get("id").is_none() {
            let id = fake.next_id.fetch_add(1, AtomicOrdering::SeqCst) + 1;
            row["id"] = Value::String(format!("{table}-{id}"));
        }
        inserted.push(row);
    }
    fake.seed(&table, inserted.clone());

    (StatusCode::CREATED, Json(inserted)).into_response()
}

async fn update_rows(
    State(fake): State<FakePostgrest>,
    Path(table): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    Json(patch): Json<Value>,
) -> axum::response::Response {
    if !authorized(&headers) {
        return unauthorized();
    }

    let mut tables = fake.tables.lock().unwrap();
    let mut updated = Vec::new();
    for row in tables.entry(table).or_default().iter_mut() {
        if !matches(row, &params) {
            continue;
        }
        if let (Some(target), Some(fields)) = (row.as_object_mut(), patch.as_object()) {
            for (key, value) in fields {
                target.insert(key.clone(), value.clone());
            }
        }
        updated.push(row.clone());
    }

    Json(updated).into_response()
}

// ─── Fake Marketplace ────────────────────────────────────────

/// In-memory marketplace store with Mongo-style hex ObjectId keys.
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct FakeMarketplace {
    files: Arc<Mutex<Vec<FileDoc>>>,
    submissions: Arc<Mutex<Vec<Submission>>>,
}

#[allow(dead_code)]
impl FakeMarketplace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_files(&self, files: Vec<Value>) {
        let mut stored = self.files.lock().unwrap();
        for file in files {
            stored.push(serde_json::from_value(file).expect("Invalid file fixture"));
        }
    }

    pub fn seed_submissions(&self, submissions: Vec<Value>) {
        let mut stored = self.submissions.lock().unwrap();
        for submission in submissions {
            stored.push(serde_json::from_value(submission).expect("Invalid submission fixture"));
        }
    }

    pub fn files(&self) -> Vec<FileDoc> {
        self.files.lock().unwrap().clone()
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }

    fn submissions_matching(&self, keep: impl Fn(&Submission) -> bool) -> Vec<Submission> {
        let mut found: Vec<Submission> = self
            .submissions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| keep(*s))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        found
    }
}

#[async_trait]
impl MarketplaceStore for FakeMarketplace {
    async fn insert_file(&self, file: &NewFile) -> Result<FileDoc, AppError> {
        let now = now_rfc3339();
        let stored = FileDoc {
            id: ObjectId::new().to_hex(),
            user_id: file.user_id.clone(),
            email: file.email.clone(),
            username: file.username.clone(),
            title: file.title.clone(),
            description: file.description.clone(),
            filename: file.filename.clone(),
            file_size: file.file_size,
            file_type: file.file_type.clone(),
            reward: file.reward.unwrap_or(0.0),
            deadline: file.deadline,
            created_at: now.clone(),
            updated_at: now,
        };
        self.files.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn recent_files(&self, limit: u32) -> Result<Vec<FileDoc>, AppError> {
        let mut files = self.files();
        files.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        files.truncate(limit as usize);
        Ok(files)
    }

    async fn insert_submission(
        &self,
        submission: &NewSubmission,
    ) -> Result<Submission, AppError> {
        let now = now_rfc3339();
        let stored = Submission {
            id: ObjectId::new().to_hex(),
            worker_id: submission.worker_id.clone(),
            worker_username: submission.worker_username.clone(),
            dataset_id: submission.dataset_id.clone(),
            client_id: submission.client_id.clone(),
            status: submission.status,
            submission_link: submission.submission_link.clone(),
            notes: submission.notes.clone(),
            reward_claimed: submission.reward_claimed,
            approved_at: submission.approved_at,
            created_at: now.clone(),
            updated_at: now,
        };
        self.submissions.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn update_submission(
        &self,
        submission_id: &str,
        patch: &SubmissionPatch,
    ) -> Result<Option<Submission>, AppError> {
        let mut submissions = self.submissions.lock().unwrap();
        let Some(stored) = submissions.iter_mut().find(|s| s.id == submission_id) else {
            return Ok(None);
        };
        if let Some(status) = patch.status {
            stored.status = status;
        }
        if let Some(link) = &patch.submission_link {
            stored.submission_link = Some(link.clone());
        }
        if let Some(notes) = &patch.notes {
            stored.notes = Some(notes.clone());
        }
        if let Some(claimed) = patch.reward_claimed {
            stored.reward_claimed = claimed;
        }
        stored.updated_at = now_rfc3339();
        Ok(Some(stored.clone()))
    }

    async fn submissions_by_worker(&self, worker_id: &str) -> Result<Vec<Submission>, AppError> {
        Ok(self.submissions_matching(|s| s.worker_id == worker_id))
    }

    async fn submissions_by_client(&self, client_id: &str) -> Result<Vec<Submission>, AppError> {
        Ok(self.submissions_matching(|s| s.client_id == client_id))
    }
}
