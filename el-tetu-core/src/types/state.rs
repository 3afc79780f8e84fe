use serde::Serialize;

/// Read-only snapshot of a paginated fetch controller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedState<T> {
    /// Every item loaded in the current pagination session, in page order.
    pub items: Vec<T>,
    /// First page (or reset reload) in flight.
    pub loading: bool,
    /// A subsequent page in flight.
    pub loading_more: bool,
    /// Pull-to-refresh reload of page 1 in flight.
    pub refreshing: bool,
    /// Display message of the last failure.
    pub error: Option<String>,
    /// Whether another page is expected to exist.
    pub has_more: bool,
    /// Last `count` reported by the source.
    pub total_count: u64,
    /// Last successfully fetched page.
    pub current_page: u32,
}

impl<T> PaginatedState<T> {
    /// State of a fresh controller; `loading` starts raised when an initial
    /// fetch is about to run.
    pub fn initial(loading: bool) -> Self {
        Self {
            items: Vec::new(),
            loading,
            loading_more: false,
            refreshing: false,
            error: None,
            has_more: true,
            total_count: 0,
            current_page: 1,
        }
    }

    /// Any of the three loading flags is raised.
    pub fn is_busy(&self) -> bool {
        self.loading || self.loading_more || self.refreshing
    }

    pub(crate) fn clear_flags(&mut self) {
        self.loading = false;
        self.loading_more = false;
        self.refreshing = false;
    }
}

impl<T> Default for PaginatedState<T> {
    fn default() -> Self {
        Self::initial(false)
    }
}

/// Read-only snapshot of a single-resource fetch controller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SingleState<T> {
    /// Last successfully fetched value, or the initial data.
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> SingleState<T> {
    pub fn initial(data: Option<T>) -> Self {
        Self {
            data,
            loading: true,
            error: None,
        }
    }
}
