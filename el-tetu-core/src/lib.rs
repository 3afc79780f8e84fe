//! # el-tetu-core
//!
//! Data-fetching controllers for the El Tetu client, independent of any UI
//! toolkit and of the HTTP transport.
//!
//! - [`PaginatedFetch`]: incremental list loading with load-more,
//!   pull-to-refresh and reset, guarded so that at most one page request is
//!   in flight per list.
//! - [`SingleFetch`]: one resource with loading/error state and refetch.
//!
//! Controllers call through the [`PageSource`] / [`Source`] traits and
//! publish immutable snapshots over a `tokio::sync::watch` channel, so a
//! rendering layer can either poll [`PaginatedFetch::snapshot`] or await
//! changes on [`PaginatedFetch::subscribe`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use el_tetu_core::{page_source_fn, FetchHandlers, Page, PaginatedFetch, PaginatedFetchOptions};
//!
//! #[tokio::main]
//! async fn main() {
//!     let source = page_source_fn(|params| async move {
//!         let first = (params.page - 1) * params.page_size;
//!         let items: Vec<u32> = (first..first + params.page_size).collect();
//!         Ok(Page::new(items, 100).with_next("next"))
//!     });
//!
//!     let handlers = FetchHandlers::new()
//!         .on_error(|e| eprintln!("load failed: {e}"));
//!     let list = PaginatedFetch::new(source, PaginatedFetchOptions::default(), handlers);
//!
//!     list.idle().await;          // initial page
//!     list.load_more().await;     // bound to "end of list reached"
//!     list.refresh().await;       // bound to pull-to-refresh
//!
//!     let state = list.snapshot();
//!     println!("{} of {} items", state.items.len(), state.total_count);
//! }
//! ```
//!
//! ## Error Handling
//!
//! Commands never return errors. Source failures are turned into a display
//! message (error-body `error` field, then `detail`, then the error's own
//! message, then a generic fallback) stored in the snapshot, and the raw
//! [`FetchError`] is handed to the `on_error` handler.

pub mod controllers;
pub mod error;
pub mod traits;
pub mod types;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use controllers::{ErrorHandler, FetchHandlers, PaginatedFetch, SingleFetch};
pub use error::{FetchError, FetchResult, FALLBACK_MESSAGE};
pub use traits::{page_source_fn, source_fn, FnPageSource, FnSource, PageSource, Source};
pub use types::{
    FetchKind, FetchOutcome, Page, PaginatedFetchOptions, PaginatedState, PaginationParams,
    SingleState,
};
