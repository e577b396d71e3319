use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// one request as seen by the mock backend
#[derive(Debug, Clone)]
pub struct Received {
    pub at: Instant,
    pub body: Value,
}

type Log = Arc<Mutex<Vec<Received>>>;

/// stand-in for the traffic backend, answers every post with `status`
pub struct MockBackend {
    pub url: String,
    received: Log,
}

impl MockBackend {
    pub async fn start(status: StatusCode) -> Self {
        let received: Log = Arc::new(Mutex::new(Vec::new()));

        let app = Router::new()
            .route("/api/vehicles", post(accept))
            .with_state((received.clone(), status));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{}/api/vehicles", addr),
            received,
        }
    }

    pub fn received(&self) -> Vec<Received> {
        self.received.lock().unwrap().clone()
    }
}

async fn accept(
    State((received, status)): State<(Log, StatusCode)>,
    Json(body): Json<Value>,
) -> (StatusCode, &'static str) {
    received.lock().unwrap().push(Received {
        at: Instant::now(),
        body,
    });
    (status, "mock response")
}
