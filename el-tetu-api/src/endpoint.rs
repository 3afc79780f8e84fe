//! Data sources backed by REST endpoints

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use el_tetu_core::{FetchResult, Page, PageSource, PaginationParams, Source};

use crate::client::ApiClient;

/// Largest page size requested from the server.
pub const MAX_PAGE_SIZE: u32 = 100;

/// A DRF list endpoint (`{count, next, previous, results}` pages).
///
/// Fixed filters are sent on every page request next to `page` and
/// `page_size`.
pub struct ListEndpoint<T> {
    client: Arc<ApiClient>,
    path: String,
    filters: Vec<(String, String)>,
    _item: PhantomData<fn() -> T>,
}

impl<T> ListEndpoint<T> {
    pub fn new(client: Arc<ApiClient>, path: impl Into<String>) -> Self {
        Self {
            client,
            path: path.into(),
            filters: Vec::new(),
            _item: PhantomData,
        }
    }

    /// Add a query filter such as `("categoria", "3")`.
    #[must_use]
    pub fn filter(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.filters.push((key.into(), value.to_string()));
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn query(&self, params: &PaginationParams) -> Vec<(String, String)> {
        let mut query = self.filters.clone();
        query.push(("page".to_string(), params.page.to_string()));
        query.push(("page_size".to_string(), params.page_size.to_string()));
        query
    }
}

impl<T> Clone for ListEndpoint<T> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            path: self.path.clone(),
            filters: self.filters.clone(),
            _item: PhantomData,
        }
    }
}

impl<T> fmt::Debug for ListEndpoint<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListEndpoint")
            .field("path", &self.path)
            .field("filters", &self.filters)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<T> PageSource<T> for ListEndpoint<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    async fn fetch_page(&self, params: &PaginationParams) -> FetchResult<Page<T>> {
        let params = params.validated(MAX_PAGE_SIZE);
        let query = self.query(&params);
        Ok(self.client.get_json(&self.path, &query).await?)
    }
}

/// A single-resource endpoint, e.g. `auth/me/` or `pedidos/12/`.
pub struct ResourceEndpoint<T> {
    client: Arc<ApiClient>,
    path: String,
    _item: PhantomData<fn() -> T>,
}

impl<T> ResourceEndpoint<T> {
    pub fn new(client: Arc<ApiClient>, path: impl Into<String>) -> Self {
        Self {
            client,
            path: path.into(),
            _item: PhantomData,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl<T> Clone for ResourceEndpoint<T> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            path: self.path.clone(),
            _item: PhantomData,
        }
    }
}

impl<T> fmt::Debug for ResourceEndpoint<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceEndpoint")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<T> Source<T> for ResourceEndpoint<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    async fn fetch(&self) -> FetchResult<T> {
        Ok(self.client.get_json(&self.path, &()).await?)
    }
}
