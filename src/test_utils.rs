// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking Kubernetes API responses and HTTP endpoints.

use bytes::Bytes;
use futures::StreamExt;
use http::{Request, Response};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use kube::client::Body;
use kube::Client;
use kube::core::ErrorResponse;
use kube::runtime::watcher;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::net::TcpListener;
use tower::Service;
use url::Url;

use crate::config::{HttpConfig, NotifyConfig, NotifyMethod};
use crate::error::Result as SyncResult;
use crate::kubernetes::{EventStream, ResourceSource};
use crate::notify::{Notifier, RetryingClient};
use crate::sync::{ContentResolver, MaterializeSettings, Materializer};
use crate::types::{ResourceEvent, ResourceKind, ResourceSnapshot};

/// A mock HTTP service that returns predefined responses based on request paths.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(("GET".to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let responses = self.responses.lock().unwrap();
        responses.get(&(method.to_string(), path.to_string())).cloned()
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        let (status, body) = self
            .find_response(&method, &path)
            .unwrap_or_else(|| (404, status_json(404, "NotFound")));

        Box::pin(async move {
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// A `v1` list response wrapping `items`
pub fn list_json(kind: &str, items: Vec<serde_json::Value>) -> String {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": format!("{}List", kind),
        "metadata": { "resourceVersion": "1" },
        "items": items
    })
    .to_string()
}

/// A config map object with the given labels and string data
pub fn configmap_json(
    namespace: &str,
    name: &str,
    labels: &[(&str, &str)],
    data: &[(&str, &str)],
) -> serde_json::Value {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "ConfigMap",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "labels": to_map(labels),
        },
        "data": to_map(data)
    })
}

/// A secret object; `data` values are base64-encoded as the API server does
pub fn secret_json(
    namespace: &str,
    name: &str,
    labels: &[(&str, &str)],
    data: &[(&str, &str)],
) -> serde_json::Value {
    use base64::Engine;
    let encoded: Vec<(&str, String)> = data
        .iter()
        .map(|(k, v)| (*k, base64::engine::general_purpose::STANDARD.encode(v)))
        .collect();
    let data: BTreeMap<&str, &str> = encoded.iter().map(|(k, v)| (*k, v.as_str())).collect();
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Secret",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "labels": to_map(labels),
        },
        "data": data
    })
}

/// A `Status` failure body with the given code
pub fn status_json(code: u16, reason: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("request failed: {}", reason),
        "reason": reason,
        "code": code
    })
    .to_string()
}

fn to_map<'a>(pairs: &[(&'a str, &'a str)]) -> BTreeMap<&'a str, &'a str> {
    pairs.iter().copied().collect()
}

/// Build a snapshot for in-memory tests
pub fn snapshot(
    name: &str,
    labels: &[(&str, &str)],
    annotations: &[(&str, &str)],
    data: &[(&str, &str)],
) -> ResourceSnapshot {
    let owned = |pairs: &[(&str, &str)]| -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    };
    ResourceSnapshot {
        namespace: Some("default".to_string()),
        name: name.to_string(),
        labels: Some(owned(labels)),
        annotations: owned(annotations),
        data: data
            .iter()
            .map(|(k, v)| (k.to_string(), v.as_bytes().to_vec()))
            .collect(),
    }
}

/// A request received by [`TestServer`]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

struct ServerState {
    responses: Vec<(u16, String)>,
    hits: AtomicUsize,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Local HTTP server replaying a fixed sequence of responses.
/// Once the sequence is used up the last response repeats.
pub struct TestServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
}

impl TestServer {
    pub async fn start(responses: Vec<(u16, &str)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(ServerState {
            responses: responses
                .into_iter()
                .map(|(status, body)| (status, body.to_string()))
                .collect(),
            hits: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        });

        let server_state = state.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let state = server_state.clone();
                tokio::spawn(async move {
                    let service = service_fn(move |req| {
                        let state = state.clone();
                        async move { respond(state, req).await }
                    });
                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                });
            }
        });

        Self { addr, state }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }
}

async fn respond(
    state: Arc<ServerState>,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let body = match req.into_body().collect().await {
        Ok(collected) => String::from_utf8_lossy(&collected.to_bytes()).into_owned(),
        Err(_) => String::new(),
    };

    let n = state.hits.fetch_add(1, Ordering::SeqCst);
    let (status, text) = state
        .responses
        .get(n)
        .or(state.responses.last())
        .cloned()
        .unwrap_or((200, String::new()));
    state
        .requests
        .lock()
        .unwrap()
        .push(RecordedRequest { method, path, body });

    Ok(Response::builder()
        .status(status)
        .body(Full::new(Bytes::from(text)))
        .unwrap())
}

/// URL of a local port that nothing listens on
pub async fn unused_local_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/", addr)
}

/// Materializer writing under `folder` for label `sync`, POSTing to `notify_url` if given.
/// HTTP requests are not retried.
pub fn materializer(folder: &Path, notify_url: Option<String>) -> Materializer {
    let http = RetryingClient::new(HttpConfig {
        retry_total: 0,
        retry_connect: 0,
        retry_read: 0,
        backoff_factor: 0.0,
        timeout: Duration::from_secs(5),
    })
    .unwrap();
    let notifier = Notifier::new(
        NotifyConfig {
            url: notify_url.map(|u| Url::parse(&u).unwrap()),
            method: NotifyMethod::Post,
            payload: None,
        },
        http.clone(),
        None,
    );
    Materializer::new(
        MaterializeSettings {
            label: "sync".to_string(),
            folder_annotation: "k8s-sidecar-target-directory".to_string(),
            folder: folder.to_path_buf(),
        },
        ContentResolver::new(http),
        notifier,
    )
}

/// A watch stream error carrying the given API status code
pub fn watch_error(code: u16) -> watcher::Error {
    watcher::Error::WatchError(ErrorResponse {
        status: "Failure".to_string(),
        message: format!("watch failed with {}", code),
        reason: "Test".to_string(),
        code,
    })
}

type Batch = Vec<std::result::Result<ResourceEvent, watcher::Error>>;

/// In-memory source. Each `watch()` call replays the next queued batch and
/// ends; once the queue is empty the stream stays open forever.
pub struct FakeSource {
    kind: ResourceKind,
    snapshots: Vec<ResourceSnapshot>,
    batches: Mutex<VecDeque<Batch>>,
    opens: Arc<AtomicUsize>,
}

impl FakeSource {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            snapshots: Vec::new(),
            batches: Mutex::new(VecDeque::new()),
            opens: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_snapshots(mut self, snapshots: Vec<ResourceSnapshot>) -> Self {
        self.snapshots = snapshots;
        self
    }

    pub fn with_batch(self, batch: Batch) -> Self {
        self.batches.lock().unwrap().push_back(batch);
        self
    }

    /// Counter of `watch()` calls, usable after the source has been moved
    pub fn opens(&self) -> Arc<AtomicUsize> {
        self.opens.clone()
    }
}

impl ResourceSource for FakeSource {
    fn kind(&self) -> ResourceKind {
        self.kind
    }

    async fn list(&self) -> SyncResult<Vec<ResourceSnapshot>> {
        Ok(self.snapshots.clone())
    }

    fn watch(&self) -> EventStream {
        self.opens.fetch_add(1, Ordering::SeqCst);
        match self.batches.lock().unwrap().pop_front() {
            Some(batch) => futures::stream::iter(batch).boxed(),
            None => futures::stream::pending().boxed(),
        }
    }
}

/// Poll `condition` until it holds, panicking after two seconds
pub async fn wait_until<F: Fn() -> bool>(condition: F) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not met in time");
}
