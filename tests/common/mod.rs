//! Mock embedding, vector index and completion providers served over real HTTP

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;

use axum::extract::Path;
use axum::extract::State;
use axum::http::header;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use axum::Json;
use axum::Router;
use profrag::config::AppConfig;
use profrag::config::Credentials;
use serde_json::json;
use serde_json::Value;

/// What each mocked provider answers
pub struct MockBehavior {
    pub embedding_status: StatusCode,
    pub embedding_body: Value,
    pub query_status: StatusCode,
    pub query_body: Value,
    pub completion_status: StatusCode,
    pub completion_body: String,
    pub completion_content_type: &'static str,
}

impl Default for MockBehavior {
    fn default() -> Self {
        Self {
            embedding_status: StatusCode::OK,
            embedding_body: json!({
                "object": "list",
                "data": [{"object": "embedding", "index": 0, "embedding": [0.1, 0.2, 0.3]}],
                "model": "text-embedding-3-small"
            }),
            query_status: StatusCode::OK,
            query_body: two_matches(),
            completion_status: StatusCode::OK,
            completion_body: sse_body(&["Prof", " A is great.", "", ""]),
            completion_content_type: "text/event-stream",
        }
    }
}

/// Requests observed by the mock providers
#[derive(Default)]
pub struct Recorded {
    pub embedding_requests: Mutex<Vec<Value>>,
    pub query_requests: Mutex<Vec<Value>>,
    pub completion_requests: Mutex<Vec<Value>>,
    pub describe_calls: AtomicUsize,
}

struct MockState {
    behavior: MockBehavior,
    recorded: Arc<Recorded>,
}

pub struct MockProviders {
    pub addr: SocketAddr,
    pub recorded: Arc<Recorded>,
}

impl MockProviders {
    pub async fn spawn(behavior: MockBehavior) -> Self {
        let recorded = Arc::new(Recorded::default());
        let state = Arc::new(MockState {
            behavior,
            recorded: recorded.clone(),
        });

        let app = Router::new()
            .route("/v1/embeddings", post(embeddings))
            .route("/v1/chat/completions", post(completions))
            .route("/query", post(query))
            .route("/indexes/:name", get(describe_index))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, recorded }
    }

    /// Configuration pointing every provider at this mock
    pub fn config(&self) -> AppConfig {
        let mut config = AppConfig::default().with_credentials(Credentials {
            openai_api_key: "sk-test".to_string(),
            pinecone_api_key: "pc-test".to_string(),
        });
        config.embeddings.endpoint = format!("http://{}/v1", self.addr);
        config.llm.llm_endpoint = format!("http://{}/v1", self.addr);
        config.retrieval.index_host = Some(format!("http://{}", self.addr));
        config.retrieval.control_plane = format!("http://{}", self.addr);
        config
    }

    pub fn embedding_requests(&self) -> Vec<Value> {
        self.recorded.embedding_requests.lock().unwrap().clone()
    }

    pub fn query_requests(&self) -> Vec<Value> {
        self.recorded.query_requests.lock().unwrap().clone()
    }

    pub fn completion_requests(&self) -> Vec<Value> {
        self.recorded.completion_requests.lock().unwrap().clone()
    }

    pub fn describe_calls(&self) -> usize {
        self.recorded.describe_calls.load(Ordering::SeqCst)
    }
}

async fn embeddings(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    state.recorded.embedding_requests.lock().unwrap().push(body);
    (
        state.behavior.embedding_status,
        Json(state.behavior.embedding_body.clone()),
    )
        .into_response()
}

async fn query(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    state.recorded.query_requests.lock().unwrap().push(body);
    (
        state.behavior.query_status,
        Json(state.behavior.query_body.clone()),
    )
        .into_response()
}

async fn completions(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    state.recorded.completion_requests.lock().unwrap().push(body);
    (
        state.behavior.completion_status,
        [(header::CONTENT_TYPE, state.behavior.completion_content_type)],
        state.behavior.completion_body.clone(),
    )
        .into_response()
}

async fn describe_index(
    State(state): State<Arc<MockState>>,
    Path(name): Path<String>,
    headers: axum::http::HeaderMap,
) -> Response {
    state.recorded.describe_calls.fetch_add(1, Ordering::SeqCst);
    if name != "rag" || headers.get("Api-Key").is_none() {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "not found"}))).into_response();
    }
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default()
        .to_string();
    Json(json!({"name": "rag", "dimension": 3, "host": format!("http://{host}")})).into_response()
}

pub fn two_matches() -> Value {
    json!({
        "matches": [
            {
                "id": "prof_A",
                "score": 0.93,
                "metadata": {"review": "Makes algorithms click.", "subject": "Algorithms", "stars": 5}
            },
            {
                "id": "prof_B",
                "score": 0.88,
                "metadata": {"review": "Fair but fast-paced.", "subject": "Algorithms", "stars": 3}
            }
        ],
        "namespace": "ns1"
    })
}

/// OpenAI-style stream: a role-only opener, one chunk per delta, then `[DONE]`
pub fn sse_body(deltas: &[&str]) -> String {
    let mut body = sse_chunk(&json!({"choices": [{"index": 0, "delta": {"role": "assistant"}}]}));
    for delta in deltas {
        body.push_str(&sse_chunk(
            &json!({"choices": [{"index": 0, "delta": {"content": delta}}]}),
        ));
    }
    body.push_str(&sse_chunk(
        &json!({"choices": [{"index": 0, "delta": {}, "finish_reason": "stop"}]}),
    ));
    body.push_str("data: [DONE]\n\n");
    body
}

pub fn sse_chunk(value: &Value) -> String {
    format!("data: {value}\n\n")
}
