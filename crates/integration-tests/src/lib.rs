//! Integration test harness for Vitrine.
//!
//! Everything runs in-process: the storefront router, a mock payment gateway
//! and a mock `ViaCEP` directory are each served on an ephemeral localhost
//! port and exercised over real HTTP with `reqwest`.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p vitrine-integration-tests
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    Router,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use vitrine_storefront::config::StorefrontConfig;
use vitrine_storefront::state::AppState;

/// Gateway token accepted by the storefront's secret validation.
pub const TEST_TOKEN: &str = "fk_test_7Hq2Wn9cLx4Rb8Kd3Vm6Tz1P";

/// Store id sent as `Store-Id`.
pub const TEST_STORE_ID: &str = "store-vitrine-01";

/// Bind an ephemeral localhost port and return the listener with its URL.
///
/// Lets a caller know a server's URL before building what it serves.
///
/// # Panics
///
/// Panics if no local port can be bound.
pub async fn listen() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no address");
    (listener, format!("http://{addr}"))
}

/// Serve `router` on `listener` in the background.
pub fn serve_on(listener: TcpListener, router: Router) {
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
}

/// Serve `router` on an ephemeral localhost port and return its base URL.
///
/// # Panics
///
/// Panics if no local port can be bound.
pub async fn serve(router: Router) -> String {
    let (listener, url) = listen().await;
    serve_on(listener, router);
    url
}

/// A localhost URL nothing is listening on.
///
/// # Panics
///
/// Panics if no local port can be bound.
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no address");
    drop(listener);
    format!("http://{addr}")
}

// =============================================================================
// Storefront
// =============================================================================

/// Storefront configuration pointing at `gateway_url`.
///
/// `extra` entries override or add environment variables.
///
/// # Panics
///
/// Panics if the resulting configuration is invalid.
#[must_use]
pub fn storefront_config(gateway_url: &str, extra: &[(&str, &str)]) -> StorefrontConfig {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("PIX_GATEWAY_URL".to_string(), gateway_url.to_string()),
        ("PIX_GATEWAY_TOKEN".to_string(), TEST_TOKEN.to_string()),
        ("PIX_GATEWAY_STORE_ID".to_string(), TEST_STORE_ID.to_string()),
    ]);
    for (key, value) in extra {
        vars.insert((*key).to_string(), (*value).to_string());
    }

    StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
        .expect("Invalid test configuration")
}

/// Build the application state for `config`.
///
/// # Panics
///
/// Panics if the application state cannot be built.
#[must_use]
pub fn app_state(config: &StorefrontConfig) -> AppState {
    AppState::new(config).expect("Failed to build application state")
}

/// Serve the storefront with `config` and return its base URL.
///
/// # Panics
///
/// Panics if the application state cannot be built.
pub async fn spawn_storefront(config: StorefrontConfig) -> String {
    serve(vitrine_storefront::app(app_state(&config))).await
}

// =============================================================================
// Mock payment gateway
// =============================================================================

/// What the mock gateway answers with.
#[derive(Debug, Clone)]
pub struct CannedReply {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: String,
}

impl CannedReply {
    /// A JSON answer.
    #[must_use]
    pub fn json(status: StatusCode, body: &Value) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: body.to_string(),
        }
    }

    /// A plain-text answer.
    #[must_use]
    pub fn text(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: body.to_string(),
        }
    }

    /// A successful charge in the gateway's current shape.
    #[must_use]
    pub fn pix_created(code: &str) -> Self {
        Self::json(
            StatusCode::OK,
            &json!({
                "success": true,
                "message": "Cobrança criada",
                "data": {
                    "order_id": "9b2c4f1e-6a3d-4e8b-b1f0-2d7c5a9e8f10",
                    "status": "waiting_payment",
                    "pix": {
                        "code": code,
                        "expires_at": "2026-10-19T18:30:00Z",
                    },
                },
            }),
        )
    }
}

/// A charge request as received by the mock gateway.
#[derive(Debug, Clone)]
pub struct RecordedCharge {
    pub headers: HeaderMap,
    pub body: Value,
}

impl RecordedCharge {
    /// Header value as a string, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Clone)]
struct GatewayState {
    reply: CannedReply,
    recorded: Arc<Mutex<Vec<RecordedCharge>>>,
}

/// A running mock gateway.
pub struct MockGateway {
    pub url: String,
    recorded: Arc<Mutex<Vec<RecordedCharge>>>,
}

impl MockGateway {
    /// Start a gateway that answers every charge with `reply`.
    pub async fn spawn(reply: CannedReply) -> Self {
        let recorded = Arc::new(Mutex::new(Vec::new()));
        let state = GatewayState {
            reply,
            recorded: Arc::clone(&recorded),
        };

        let router = Router::new()
            .route("/api/pix/charge", post(gateway_charge))
            .with_state(state);

        Self {
            url: serve(router).await,
            recorded,
        }
    }

    /// Charges received so far.
    ///
    /// # Panics
    ///
    /// Panics if the recording lock is poisoned.
    #[must_use]
    pub fn charges(&self) -> Vec<RecordedCharge> {
        self.recorded.lock().expect("Recording lock poisoned").clone()
    }
}

async fn gateway_charge(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
    if let Ok(mut recorded) = state.recorded.lock() {
        recorded.push(RecordedCharge { headers, body });
    }

    let reply = state.reply;
    (
        reply.status,
        [(header::CONTENT_TYPE, reply.content_type)],
        reply.body,
    )
        .into_response()
}

// =============================================================================
// Mock CEP directory
// =============================================================================

#[derive(Clone)]
struct DirectoryState {
    entries: Arc<HashMap<String, Value>>,
    hits: Arc<Mutex<usize>>,
}

/// A running mock `ViaCEP` directory, served under `/ws`.
pub struct MockDirectory {
    pub url: String,
    hits: Arc<Mutex<usize>>,
}

impl MockDirectory {
    /// Start a directory knowing `entries` (8-digit CEP to `ViaCEP` body).
    /// Unknown CEPs answer `{"erro": true}`.
    pub async fn spawn(entries: HashMap<String, Value>) -> Self {
        let hits = Arc::new(Mutex::new(0));
        let state = DirectoryState {
            entries: Arc::new(entries),
            hits: Arc::clone(&hits),
        };

        let router = Router::new()
            .route("/ws/{cep}/json/", get(directory_lookup))
            .with_state(state);

        Self {
            url: format!("{}/ws", serve(router).await),
            hits,
        }
    }

    /// Number of lookups served so far.
    ///
    /// # Panics
    ///
    /// Panics if the counter lock is poisoned.
    #[must_use]
    pub fn hits(&self) -> usize {
        *self.hits.lock().expect("Counter lock poisoned")
    }
}

async fn directory_lookup(
    State(state): State<DirectoryState>,
    Path(cep): Path<String>,
) -> axum::Json<Value> {
    if let Ok(mut hits) = state.hits.lock() {
        *hits += 1;
    }
    axum::Json(
        state
            .entries
            .get(&cep)
            .cloned()
            .unwrap_or_else(|| json!({"erro": true})),
    )
}

/// `ViaCEP` body for Praça da Sé, São Paulo.
#[must_use]
pub fn praca_da_se() -> Value {
    json!({
        "cep": "01001-000",
        "logradouro": "Praça da Sé",
        "complemento": "lado ímpar",
        "bairro": "Sé",
        "localidade": "São Paulo",
        "uf": "SP",
        "ibge": "3550308",
    })
}
