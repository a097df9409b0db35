//! In-process stand-in for the remote entry API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use serde_json::Value;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct FakeBackend {
    records: Arc<Mutex<HashMap<String, Vec<Value>>>>,
    next_id: Arc<AtomicU64>,
    failing: Arc<AtomicBool>,
    requests: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl FakeBackend {
    /// Serves on an ephemeral port inside the current runtime.
    pub async fn spawn() -> (Self, String) {
        let backend = Self::default();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake backend");
        let addr = listener.local_addr().unwrap();
        let app = backend.router();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (backend, base_url(addr))
    }

    /// Serves from a dedicated thread so it outlives any single test runtime.
    pub fn spawn_detached() -> (Self, String) {
        let backend = Self::default();
        let app = backend.router();
        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("backend runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind fake backend");
                tx.send(listener.local_addr().unwrap()).unwrap();
                axum::serve(listener, app).await.unwrap();
            });
        });
        let addr = rx.recv().expect("backend address");
        (backend, base_url(addr))
    }

    fn router(&self) -> Router {
        Router::new()
            .route("/:resource", get(list).post(create))
            .route("/:resource/:id", delete(remove))
            .with_state(self.clone())
    }

    /// Makes every subsequent request answer 500.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Inserts a record directly, bypassing any client.
    pub fn seed(&self, resource: &str, mut record: Value) -> String {
        let id = self.assign_id(&mut record);
        self.records
            .lock()
            .unwrap()
            .entry(resource.to_string())
            .or_default()
            .push(record);
        id
    }

    pub fn ids(&self, resource: &str) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .get(resource)
            .map(|records| {
                records
                    .iter()
                    .filter_map(|record| record["id"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn assign_id(&self, record: &mut Value) -> String {
        let id = format!("rec-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        record["id"] = Value::String(id.clone());
        id
    }

    fn begin(&self) -> Result<(), StatusCode> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
        Ok(())
    }
}

fn base_url(addr: SocketAddr) -> String {
    format!("http://{addr}")
}

async fn list(
    State(backend): State<FakeBackend>,
    Path(resource): Path<String>,
) -> Result<Json<Vec<Value>>, StatusCode> {
    backend.begin()?;
    let records = backend.records.lock().unwrap();
    Ok(Json(records.get(&resource).cloned().unwrap_or_default()))
}

async fn create(
    State(backend): State<FakeBackend>,
    Path(resource): Path<String>,
    Json(mut record): Json<Value>,
) -> Result<impl IntoResponse, StatusCode> {
    backend.begin()?;
    if record.get("id").is_some() {
        return Err(StatusCode::BAD_REQUEST);
    }
    backend.assign_id(&mut record);
    backend
        .records
        .lock()
        .unwrap()
        .entry(resource)
        .or_default()
        .push(record.clone());
    Ok((StatusCode::CREATED, Json(record)))
}

async fn remove(
    State(backend): State<FakeBackend>,
    Path((resource, id)): Path<(String, String)>,
) -> StatusCode {
    if let Err(status) = backend.begin() {
        return status;
    }
    let mut records = backend.records.lock().unwrap();
    let Some(collection) = records.get_mut(&resource) else {
        return StatusCode::NOT_FOUND;
    };
    let before = collection.len();
    collection.retain(|record| record["id"] != id.as_str());
    if collection.len() == before {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::NO_CONTENT
    }
}
