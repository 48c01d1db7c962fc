//! In-process fake of the coaching backend, served by axum on an ephemeral port.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use futures::StreamExt;
use serde_json::Value;

use crate::backend_client::BackendClient;

/// What the fake `/chat` endpoint replies with.
#[derive(Clone)]
pub enum ChatScript {
    /// Body pieces, each sent as its own write after `delay`.
    Pieces { pieces: Vec<Vec<u8>>, delay: Duration },
    Status(StatusCode),
}

#[derive(Clone)]
pub enum AnalyzeScript {
    Ok { archetype: String, analysis: String },
    Status(StatusCode),
}

#[derive(Clone)]
struct MockState {
    chat: ChatScript,
    analyze: AnalyzeScript,
    chat_requests: Arc<Mutex<Vec<Value>>>,
    analyze_requests: Arc<Mutex<Vec<Value>>>,
}

pub struct MockBackend {
    pub addr: SocketAddr,
    pub chat_requests: Arc<Mutex<Vec<Value>>>,
    pub analyze_requests: Arc<Mutex<Vec<Value>>>,
}

impl MockBackend {
    pub async fn start(chat: ChatScript, analyze: AnalyzeScript) -> Self {
        let chat_requests = Arc::new(Mutex::new(Vec::new()));
        let analyze_requests = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            chat,
            analyze,
            chat_requests: chat_requests.clone(),
            analyze_requests: analyze_requests.clone(),
        };
        let app = Router::new()
            .route("/chat", post(chat_handler))
            .route("/analyze-profile", post(analyze_handler))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            chat_requests,
            analyze_requests,
        }
    }

    pub async fn chat(pieces: Vec<Vec<u8>>, delay: Duration) -> Self {
        Self::start(
            ChatScript::Pieces { pieces, delay },
            AnalyzeScript::Status(StatusCode::NOT_FOUND),
        )
        .await
    }

    pub fn client(&self) -> BackendClient {
        BackendClient::new(format!("http://{}", self.addr)).unwrap()
    }

    pub fn chat_requests(&self) -> Vec<Value> {
        self.chat_requests.lock().unwrap().clone()
    }

    pub fn analyze_requests(&self) -> Vec<Value> {
        self.analyze_requests.lock().unwrap().clone()
    }
}

/// One NDJSON answer line.
pub fn answer_line(content: &str, session_id: Option<&str>) -> Vec<u8> {
    let mut record = serde_json::json!({ "type": "answer", "content": content });
    if let Some(id) = session_id {
        record["session_id"] = Value::String(id.to_string());
    }
    format!("{record}\n").into_bytes()
}

async fn chat_handler(State(state): State<MockState>, Json(body): Json<Value>) -> Response {
    state.chat_requests.lock().unwrap().push(body);
    match state.chat {
        ChatScript::Status(status) => (status, "backend unavailable").into_response(),
        ChatScript::Pieces { pieces, delay } => {
            let stream = futures::stream::iter(pieces).then(move |piece| async move {
                tokio::time::sleep(delay).await;
                Ok::<_, Infallible>(Bytes::from(piece))
            });
            Response::builder()
                .header("content-type", "application/x-ndjson")
                .body(Body::from_stream(stream))
                .unwrap()
        }
    }
}

async fn analyze_handler(State(state): State<MockState>, Json(body): Json<Value>) -> Response {
    state.analyze_requests.lock().unwrap().push(body);
    match state.analyze {
        AnalyzeScript::Status(status) => (status, "Internal Server Error").into_response(),
        AnalyzeScript::Ok { archetype, analysis } => Json(serde_json::json!({
            "archetype": archetype,
            "analysis": analysis,
        }))
        .into_response(),
    }
}
