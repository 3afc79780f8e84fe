//! Data source Traits
//!
//! Controllers call through these traits and never see the transport behind
//! them. The HTTP client implements them for list and detail endpoints;
//! tests and callers can plug plain async closures in with
//! [`page_source_fn`] / [`source_fn`].

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::FetchResult;
use crate::types::{Page, PaginationParams};

/// Paged data source Trait
#[async_trait]
pub trait PageSource<T>: Send + Sync {
    /// Fetch one page
    ///
    /// # Arguments
    /// * `params` - page number (1-indexed) and advisory page size
    async fn fetch_page(&self, params: &PaginationParams) -> FetchResult<Page<T>>;
}

/// Single-resource data source Trait
#[async_trait]
pub trait Source<T>: Send + Sync {
    /// Fetch the resource
    async fn fetch(&self) -> FetchResult<T>;
}

/// [`PageSource`] backed by an async closure.
pub struct FnPageSource<F> {
    f: F,
}

impl<F> FnPageSource<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<T, F, Fut> PageSource<T> for FnPageSource<F>
where
    T: Send + 'static,
    F: Fn(PaginationParams) -> Fut + Send + Sync,
    Fut: Future<Output = FetchResult<Page<T>>> + Send,
{
    async fn fetch_page(&self, params: &PaginationParams) -> FetchResult<Page<T>> {
        (self.f)(*params).await
    }
}

/// [`Source`] backed by an async closure.
pub struct FnSource<F> {
    f: F,
}

impl<F> FnSource<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<T, F, Fut> Source<T> for FnSource<F>
where
    T: Send + 'static,
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = FetchResult<T>> + Send,
{
    async fn fetch(&self) -> FetchResult<T> {
        (self.f)().await
    }
}

/// Wrap an async closure `|params| async { ... }` as a shared page source.
///
/// # Arguments
/// * `f` - called once per page request with the requested `PaginationParams`
///
/// # Returns
/// * `Arc<dyn PageSource<T>>` - ready to hand to `PaginatedFetch::new` or
///   `PaginatedFetch::set_source`
pub fn page_source_fn<T, F, Fut>(f: F) -> Arc<dyn PageSource<T>>
where
    T: Send + 'static,
    F: Fn(PaginationParams) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = FetchResult<Page<T>>> + Send + 'static,
{
    Arc::new(FnPageSource::new(f))
}

/// Wrap an async closure `|| async { ... }` as a shared single-resource source.
///
/// # Arguments
/// * `f` - called once per fetch or refetch
///
/// # Returns
/// * `Arc<dyn Source<T>>` - ready to hand to `SingleFetch::new` or
///   `SingleFetch::set_source`
pub fn source_fn<T, F, Fut>(f: F) -> Arc<dyn Source<T>>
where
    T: Send + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = FetchResult<T>> + Send + 'static,
{
    Arc::new(FnSource::new(f))
}
