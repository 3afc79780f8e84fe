//! # el-tetu-api
//!
//! `reqwest` client for the El Tetu REST API, plus data sources that plug
//! its endpoints into the `el-tetu-core` controllers.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use el_tetu_api::{ApiClient, ApiConfig};
//! use el_tetu_core::{FetchHandlers, PaginatedFetch, PaginatedFetchOptions};
//!
//! #[derive(Clone, serde::Deserialize)]
//! struct Producto {
//!     id: u64,
//!     nombre: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), el_tetu_api::ApiError> {
//!     let client = Arc::new(ApiClient::new(ApiConfig::from_env())?);
//!     client.login("vendedor@tetu.py", "secreto").await?;
//!
//!     let productos = client.list::<Producto>("productos/").filter("activo", true);
//!     let list = PaginatedFetch::new(
//!         Arc::new(productos),
//!         PaginatedFetchOptions::default(),
//!         FetchHandlers::new(),
//!     );
//!     list.idle().await;
//!     println!("{} productos", list.snapshot().total_count);
//!     Ok(())
//! }
//! ```
//!
//! ## TLS Backend
//!
//! - `native-tls` (default)
//! - `rustls`
//!
//! ## Error Handling
//!
//! Client calls return [`ApiResult`]. Inside the controllers, [`ApiError`]
//! is converted into `el_tetu_core::FetchError`, keeping the HTTP status and
//! JSON error body so `{"error": ...}` / `{"detail": ...}` messages reach
//! the UI.

mod client;
mod config;
mod endpoint;
mod error;
mod http_client;
mod token_store;
mod types;
mod utils;

pub use client::ApiClient;
pub use config::{ApiConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use endpoint::{ListEndpoint, MAX_PAGE_SIZE, ResourceEndpoint};
pub use error::{ApiError, ApiResult};
pub use token_store::{InMemoryTokenStore, TokenStore};
pub use types::{AuthResponse, LoginRequest, User, UserRole};
