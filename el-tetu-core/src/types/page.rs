use serde::{Deserialize, Deserializer, Serialize};

// ============ Pagination ============

/// Pagination parameters handed to a page source.
///
/// Pages are 1-indexed. `page_size` is advisory: the controller never slices
/// results itself and trusts the source to honor it.
///
/// # Default
///
/// The default is `page = 1, page_size = 20`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationParams {
    /// Page number (1-indexed).
    pub page: u32,
    /// Number of items per page.
    pub page_size: u32,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 20,
        }
    }
}

impl PaginationParams {
    /// Params for `page` with the given size.
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    /// Clamp pagination values to valid ranges.
    ///
    /// - `page` is clamped to `>= 1`
    /// - `page_size` is clamped to `1..=max_page_size`
    #[must_use]
    pub fn validated(&self, max_page_size: u32) -> Self {
        Self {
            page: self.page.max(1),
            page_size: self.page_size.clamp(1, max_page_size),
        }
    }
}

/// One server-returned batch of items plus pagination metadata.
///
/// Mirrors the list envelope of the backend:
/// `{"count": 9, "next": "...?page=2", "previous": null, "results": [...]}`.
/// Missing or null `results` decode as an empty page and missing or null
/// `count` as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    /// Total number of items across all pages.
    #[serde(default, deserialize_with = "null_as_default")]
    pub count: u64,
    /// Link to the next page, absent on the last page.
    #[serde(default)]
    pub next: Option<String>,
    /// Link to the previous page, absent on the first page.
    #[serde(default)]
    pub previous: Option<String>,
    /// Items on this page, in server order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// A last page (no `next` link).
    pub fn new(results: Vec<T>, count: u64) -> Self {
        Self {
            count,
            next: None,
            previous: None,
            results,
        }
    }

    /// Set the `next` link.
    #[must_use]
    pub fn with_next(mut self, next: impl Into<String>) -> Self {
        self.next = Some(next.into());
        self
    }

    /// Whether a further page exists. An empty link counts as absent.
    pub fn has_next(&self) -> bool {
        self.next.as_deref().is_some_and(|next| !next.is_empty())
    }
}

fn null_as_default<'de, D, V>(deserializer: D) -> Result<V, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de> + Default,
{
    Ok(Option::<V>::deserialize(deserializer)?.unwrap_or_default())
}
