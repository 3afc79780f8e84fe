use serde::{Deserialize, Serialize};

/// Construction options for a paginated fetch controller.
///
/// # Default
///
/// The default is `page_size = 20, auto_fetch = true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaginatedFetchOptions {
    /// Items per page, passed through to the source.
    pub page_size: u32,
    /// Fetch page 1 as soon as the controller is created.
    pub auto_fetch: bool,
}

impl Default for PaginatedFetchOptions {
    fn default() -> Self {
        Self {
            page_size: 20,
            auto_fetch: true,
        }
    }
}

/// Flavor of a fetch, deciding which loading flag it raises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchKind {
    /// First page, or the fetch issued by a reset
    Initial,
    /// Next page appended to the accumulated list
    LoadMore,
    /// Page 1 reloaded by pull-to-refresh
    Refresh,
}

impl FetchKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::LoadMore => "load_more",
            Self::Refresh => "refresh",
        }
    }
}

impl std::fmt::Display for FetchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a controller command ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchOutcome {
    /// Rejected up front (fetch in flight, no more pages, closed); nothing changed
    Skipped,
    /// The source answered and the result was applied
    Loaded,
    /// The source failed; the error was recorded
    Failed,
    /// Aborted or superseded before the result could be applied
    Cancelled,
}

impl FetchOutcome {
    /// Whether the command actually reached the source.
    pub fn ran(self) -> bool {
        !matches!(self, Self::Skipped)
    }
}
