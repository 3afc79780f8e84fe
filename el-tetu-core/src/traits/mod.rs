//! Data source abstraction trait definition

mod source;

pub use source::{page_source_fn, source_fn, FnPageSource, FnSource, PageSource, Source};
