//! Authenticated JSON client for the El Tetu API

use std::sync::Arc;

use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::ApiConfig;
use crate::endpoint::{ListEndpoint, ResourceEndpoint};
use crate::error::{ApiError, ApiResult};
use crate::http_client::HttpUtils;
use crate::token_store::{InMemoryTokenStore, TokenStore};
use crate::types::{AuthResponse, LoginRequest, RefreshRequest, RefreshResponse, User};
use crate::utils::log_sanitizer::mask_token;

const LOGIN_PATH: &str = "auth/login/";
const REFRESH_PATH: &str = "auth/refresh/";
const ME_PATH: &str = "auth/me/";

/// Requests to these paths never trigger a token refresh.
fn is_auth_path(path: &str) -> bool {
    let path = path.trim_start_matches('/');
    path.starts_with("auth/login") || path.starts_with("auth/refresh")
}

/// JSON client with bearer auth and transparent access-token refresh.
///
/// Every request carries `Authorization: Bearer <access>` when the token
/// store holds one. A 401 on any non-auth path triggers one
/// `POST auth/refresh/` and a single retry of the original request; when
/// the refresh itself fails the session is cleared and that failure is
/// returned.
pub struct ApiClient {
    http: reqwest::Client,
    config: ApiConfig,
    tokens: Arc<dyn TokenStore>,
}

impl ApiClient {
    /// Client with a fresh in-memory session.
    pub fn new(config: ApiConfig) -> ApiResult<Self> {
        Self::with_token_store(config, Arc::new(InMemoryTokenStore::new()))
    }

    pub fn with_token_store(config: ApiConfig, tokens: Arc<dyn TokenStore>) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::ClientError {
                detail: format!("Failed to build HTTP client: {e}"),
            })?;
        Ok(Self::with_http_client(config, http, tokens))
    }

    /// Use a preconfigured `reqwest::Client` (proxy, TLS roots, ...).
    ///
    /// `config.timeout` is not applied; configure it on `http`.
    pub fn with_http_client(
        config: ApiConfig,
        http: reqwest::Client,
        tokens: Arc<dyn TokenStore>,
    ) -> Self {
        Self {
            http,
            config,
            tokens,
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// `GET path?query` decoded as `T`.
    pub async fn get_json<T, Q>(&self, path: &str, query: &Q) -> ApiResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized + Sync,
    {
        self.request(Method::GET, path, |req| req.query(query)).await
    }

    /// `POST path` with a JSON body, answer decoded as `T`.
    pub async fn post_json<T, B>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized + Sync,
    {
        self.request(Method::POST, path, |req| req.json(body)).await
    }

    /// Exchange credentials for a token pair, store it and return the user.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<User> {
        let auth: AuthResponse = self
            .post_json(LOGIN_PATH, &LoginRequest { email, password })
            .await?;
        log::info!("[api] Logged in as {}", auth.user.email);
        self.tokens.set_tokens(auth.access, auth.refresh).await;
        Ok(auth.user)
    }

    /// The account behind the current session.
    pub async fn me(&self) -> ApiResult<User> {
        self.get_json(ME_PATH, &()).await
    }

    /// Forget the session locally.
    pub async fn logout(&self) {
        self.tokens.clear().await;
    }

    /// Paged DRF collection at `path`, usable as a `PageSource`.
    pub fn list<T>(self: &Arc<Self>, path: impl Into<String>) -> ListEndpoint<T> {
        ListEndpoint::new(Arc::clone(self), path)
    }

    /// Single resource at `path`, usable as a `Source`.
    pub fn resource<T>(self: &Arc<Self>, path: impl Into<String>) -> ResourceEndpoint<T> {
        ResourceEndpoint::new(Arc::clone(self), path)
    }

    async fn request<T, F>(&self, method: Method, path: &str, build: F) -> ApiResult<T>
    where
        T: DeserializeOwned,
        F: Fn(RequestBuilder) -> RequestBuilder + Sync,
    {
        let text = match self.execute(&method, path, &build).await {
            Err(e) if e.is_unauthorized() && !is_auth_path(path) => {
                self.refresh_access(e).await?;
                self.execute(&method, path, &build).await?
            }
            other => other?,
        };
        HttpUtils::parse_json(&text, path)
    }

    /// One authorized attempt; non-2xx answers become [`ApiError::Http`].
    async fn execute<F>(&self, method: &Method, path: &str, build: &F) -> ApiResult<String>
    where
        F: Fn(RequestBuilder) -> RequestBuilder + Sync,
    {
        let mut request = build(self.http.request(method.clone(), self.config.url(path)));
        if let Some(access) = self.tokens.access_token().await {
            request = request.bearer_auth(access);
        }

        let (status, text) = HttpUtils::execute_request_with_retry(
            request,
            method.as_str(),
            path,
            self.config.max_retries,
        )
        .await?;

        if (200..300).contains(&status) {
            Ok(text)
        } else {
            let error = ApiError::http(status, &text);
            if error.is_expected() {
                log::warn!("[api] {method} {path}: {error}");
            } else {
                log::error!("[api] {method} {path}: {error}");
            }
            Err(error)
        }
    }

    /// Trade the refresh token for a new access token.
    ///
    /// Without a refresh token the original 401 is handed back.
    async fn refresh_access(&self, unauthorized: ApiError) -> ApiResult<()> {
        let Some(refresh) = self.tokens.refresh_token().await else {
            return Err(unauthorized);
        };
        log::debug!(
            "[api] Access token rejected, refreshing with {}",
            mask_token(&refresh)
        );

        let request = self
            .http
            .post(self.config.url(REFRESH_PATH))
            .json(&RefreshRequest { refresh: &refresh });
        let result = match HttpUtils::execute_request(request, "POST", REFRESH_PATH).await {
            Ok((status, text)) if (200..300).contains(&status) => {
                HttpUtils::parse_json::<RefreshResponse>(&text, REFRESH_PATH)
            }
            Ok((status, text)) => Err(ApiError::http(status, &text)),
            Err(e) => Err(e),
        };

        match result {
            Ok(RefreshResponse { access }) => {
                self.tokens.set_access_token(access).await;
                Ok(())
            }
            Err(e) => {
                log::warn!("[api] Token refresh failed, clearing session: {e}");
                self.tokens.clear().await;
                Err(e)
            }
        }
    }
}
