//! Session token persistence

use async_trait::async_trait;
use tokio::sync::RwLock;

/// Storage for the JWT pair issued by `auth/login/`.
///
/// The client reads the access token before every request and rewrites it
/// after a refresh. Implementations backed by a keychain or a file only need
/// these five operations.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn access_token(&self) -> Option<String>;

    async fn refresh_token(&self) -> Option<String>;

    /// Store a freshly issued pair.
    async fn set_tokens(&self, access: String, refresh: String);

    /// Replace only the access token, keeping the refresh token.
    async fn set_access_token(&self, access: String);

    /// Forget both tokens (logout, failed refresh).
    async fn clear(&self);
}

#[derive(Debug, Default)]
struct Tokens {
    access: Option<String>,
    refresh: Option<String>,
}

/// Process-local [`TokenStore`].
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    tokens: RwLock<Tokens>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing session.
    pub fn with_tokens(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            tokens: RwLock::new(Tokens {
                access: Some(access.into()),
                refresh: Some(refresh.into()),
            }),
        }
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn access_token(&self) -> Option<String> {
        self.tokens.read().await.access.clone()
    }

    async fn refresh_token(&self) -> Option<String> {
        self.tokens.read().await.refresh.clone()
    }

    async fn set_tokens(&self, access: String, refresh: String) {
        let mut tokens = self.tokens.write().await;
        tokens.access = Some(access);
        tokens.refresh = Some(refresh);
    }

    async fn set_access_token(&self, access: String) {
        self.tokens.write().await.access = Some(access);
    }

    async fn clear(&self) {
        *self.tokens.write().await = Tokens::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn refresh_keeps_refresh_token() {
        let store = InMemoryTokenStore::with_tokens("a1", "r1");
        store.set_access_token("a2".into()).await;
        assert_eq!(store.access_token().await.as_deref(), Some("a2"));
        assert_eq!(store.refresh_token().await.as_deref(), Some("r1"));
    }

    #[tokio::test]
    async fn clear_forgets_both() {
        let store = InMemoryTokenStore::new();
        store.set_tokens("a".into(), "r".into()).await;
        store.clear().await;
        assert_eq!(store.access_token().await, None);
        assert_eq!(store.refresh_token().await, None);
    }
}
