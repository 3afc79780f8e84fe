//! In-process stand-in for the El Tetu backend.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use el_tetu_api::{ApiClient, ApiConfig, InMemoryTokenStore, TokenStore};

pub const EMAIL: &str = "ana@tetu.py";
pub const PASSWORD: &str = "secreto";
pub const REFRESH_TOKEN: &str = "refresh-1";

/// Assert a `Result` is `Ok` and unwrap it (fails the test otherwise).
#[macro_export]
macro_rules! require_ok {
    ($expr:expr $(,)?) => {{
        let res = $expr;
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Producto {
    pub id: u32,
    pub nombre: String,
}

/// Shared server state, inspected by the tests.
#[derive(Clone)]
pub struct Backend {
    /// The only access token the server currently accepts.
    pub valid_access: Arc<Mutex<String>>,
    pub list_queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
    pub refresh_calls: Arc<AtomicUsize>,
    pub flaky_calls: Arc<AtomicUsize>,
}

impl Backend {
    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub async fn list_queries(&self) -> Vec<HashMap<String, String>> {
        self.list_queries.lock().await.clone()
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Given token not valid for any token type"})),
    )
        .into_response()
}

async fn authorized(state: &Backend, headers: &HeaderMap) -> bool {
    let expected = format!("Bearer {}", state.valid_access.lock().await);
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected)
}

fn user() -> Value {
    json!({
        "id": 7,
        "email": EMAIL,
        "nombre": "Ana",
        "apellido": "Benítez",
        "full_name": "Ana Benítez",
        "rol": "vendedor",
        "telefono": null,
        "is_active": true,
        "date_joined": "2024-03-01T10:00:00Z"
    })
}

async fn login(State(state): State<Backend>, Json(body): Json<Value>) -> Response {
    if body["email"] == EMAIL && body["password"] == PASSWORD {
        let access = state.valid_access.lock().await.clone();
        Json(json!({"user": user(), "access": access, "refresh": REFRESH_TOKEN})).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "No active account found with the given credentials"})),
        )
            .into_response()
    }
}

async fn refresh(State(state): State<Backend>, Json(body): Json<Value>) -> Response {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);
    if body["refresh"] == REFRESH_TOKEN {
        let access = state.valid_access.lock().await.clone();
        Json(json!({"access": access})).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Token is invalid or expired"})),
        )
            .into_response()
    }
}

async fn me(State(state): State<Backend>, headers: HeaderMap) -> Response {
    if !authorized(&state, &headers).await {
        return unauthorized();
    }
    Json(user()).into_response()
}

/// Five products served in DRF pages.
async fn productos(
    State(state): State<Backend>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&state, &headers).await {
        return unauthorized();
    }
    state.list_queries.lock().await.push(query.clone());

    let page: usize = query.get("page").and_then(|v| v.parse().ok()).unwrap_or(1);
    let size: usize = query
        .get("page_size")
        .and_then(|v| v.parse().ok())
        .unwrap_or(20);
    let total = 5;
    let start = (page - 1) * size;
    let results: Vec<Value> = (start..total.min(start + size))
        .map(|i| json!({"id": i + 1, "nombre": format!("Producto {}", i + 1)}))
        .collect();
    let next = (start + size < total).then(|| format!("/api/productos/?page={}", page + 1));
    let previous = (page > 1).then(|| format!("/api/productos/?page={}", page - 1));
    Json(json!({"count": total, "next": next, "previous": previous, "results": results}))
        .into_response()
}

async fn pedidos() -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({"error": "Zona inválida"}))).into_response()
}

/// 503 on the first call, then a normal answer.
async fn inestable(State(state): State<Backend>) -> Response {
    if state.flaky_calls.fetch_add(1, Ordering::SeqCst) == 0 {
        return (StatusCode::SERVICE_UNAVAILABLE, "mantenimiento").into_response();
    }
    Json(json!({"estado": "ok"})).into_response()
}

/// 503 with a JSON error body, on every call.
async fn mantenimiento() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({"error": "Sistema en mantenimiento"})),
    )
        .into_response()
}

/// Start the backend on an ephemeral port and return its API base URL.
pub async fn spawn_backend(valid_access: &str) -> (String, Backend) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = Backend {
        valid_access: Arc::new(Mutex::new(valid_access.to_string())),
        list_queries: Arc::default(),
        refresh_calls: Arc::default(),
        flaky_calls: Arc::default(),
    };
    let app = Router::new()
        .route("/api/auth/login/", post(login))
        .route("/api/auth/refresh/", post(refresh))
        .route("/api/auth/me/", get(me))
        .route("/api/productos/", get(productos))
        .route("/api/pedidos/", get(pedidos))
        .route("/api/inestable/", get(inestable))
        .route("/api/mantenimiento/", get(mantenimiento))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}/api"), state)
}

/// Client that talks to `base_url` directly, ignoring proxy variables.
pub fn client(config: ApiConfig, tokens: Arc<InMemoryTokenStore>) -> Arc<ApiClient> {
    let http = reqwest::Client::builder()
        .no_proxy()
        .timeout(config.timeout)
        .build()
        .unwrap();
    let tokens: Arc<dyn TokenStore> = tokens;
    Arc::new(ApiClient::with_http_client(config, http, tokens))
}
