//! Type definition module

mod options;
mod page;
mod state;

pub use options::{FetchKind, FetchOutcome, PaginatedFetchOptions};
pub use page::{Page, PaginationParams};
pub use state::{PaginatedState, SingleState};
