//! Success/error callbacks shared by the controllers

use std::sync::Arc;

use crate::error::FetchError;

/// Callback invoked with the raw failure of a fetch.
pub type ErrorHandler = Arc<dyn Fn(&FetchError) + Send + Sync>;

/// Optional callbacks fired after every settled fetch.
///
/// `P` is the success payload: `[T]` for paginated lists, `T` for single
/// resources. Handlers are cheap to clone; controllers keep them in a mutable
/// cell and always invoke the latest set.
pub struct FetchHandlers<P: ?Sized> {
    on_success: Option<Arc<dyn Fn(&P) + Send + Sync>>,
    on_error: Option<ErrorHandler>,
}

impl<P: ?Sized> FetchHandlers<P> {
    /// No callbacks.
    pub fn new() -> Self {
        Self {
            on_success: None,
            on_error: None,
        }
    }

    #[must_use]
    pub fn on_success(mut self, f: impl Fn(&P) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn on_error(mut self, f: impl Fn(&FetchError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(f));
        self
    }

    pub(crate) fn notify_success(&self, payload: &P) {
        if let Some(f) = &self.on_success {
            f(payload);
        }
    }

    pub(crate) fn notify_error(&self, error: &FetchError) {
        if let Some(f) = &self.on_error {
            f(error);
        }
    }
}

impl<P: ?Sized> Default for FetchHandlers<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: ?Sized> Clone for FetchHandlers<P> {
    fn clone(&self) -> Self {
        Self {
            on_success: self.on_success.clone(),
            on_error: self.on_error.clone(),
        }
    }
}

impl<P: ?Sized> std::fmt::Debug for FetchHandlers<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchHandlers")
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}
