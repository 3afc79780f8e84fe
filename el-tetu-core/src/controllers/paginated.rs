//! Paginated fetch controller
//!
//! Owns the state of an incrementally loaded list: accumulated items, the
//! page cursor, three loading flags and the last error. At most one fetch is
//! live per controller; overlapping commands are rejected up front, except
//! [`PaginatedFetch::reset`], which aborts the fetch in flight and starts over.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use futures::future::{AbortHandle, AbortRegistration, Abortable};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::handlers::FetchHandlers;
use super::{lock, read_cell, write_cell};
use crate::error::{FetchError, PAGINATED_MESSAGE_FIELDS};
use crate::traits::PageSource;
use crate::types::{
    FetchKind, FetchOutcome, Page, PaginatedFetchOptions, PaginatedState, PaginationParams,
};

/// The fetch currently holding the in-flight guard.
struct InFlight {
    generation: u64,
    abort: AbortHandle,
}

/// Permission to run one fetch, handed out together with the guard.
struct Ticket {
    generation: u64,
    registration: AbortRegistration,
    page: u32,
}

/// Releases the in-flight guard and lowers the loading flags when a fetch
/// settles, is aborted, or its future is dropped.
struct FetchGuard<'a, T> {
    owner: &'a PaginatedFetch<T>,
    generation: u64,
}

impl<T> Drop for FetchGuard<'_, T> {
    fn drop(&mut self) {
        let mut slot = lock(&self.owner.in_flight);
        if slot
            .as_ref()
            .is_some_and(|current| current.generation == self.generation)
        {
            *slot = None;
            if !self.owner.closed.load(Ordering::SeqCst) {
                self.owner.state.send_modify(PaginatedState::clear_flags);
            }
        }
    }
}

/// Incremental list loader with load-more, pull-to-refresh and reset.
///
/// Commands never fail: source errors are recorded in the snapshot and
/// reported to the `on_error` handler. Each command returns a
/// [`FetchOutcome`] describing what happened.
///
/// ```rust,no_run
/// use el_tetu_core::{page_source_fn, FetchHandlers, Page, PaginatedFetch, PaginatedFetchOptions};
///
/// # async fn example() {
/// let source = page_source_fn(|params| async move {
///     Ok(Page::new(vec![params.page], 1))
/// });
/// let list = PaginatedFetch::new(source, PaginatedFetchOptions::default(), FetchHandlers::new());
/// list.idle().await;
/// list.load_more().await;
/// println!("{:?}", list.snapshot().items);
/// # }
/// ```
pub struct PaginatedFetch<T> {
    source: RwLock<Arc<dyn PageSource<T>>>,
    handlers: RwLock<FetchHandlers<[T]>>,
    options: PaginatedFetchOptions,
    state: watch::Sender<PaginatedState<T>>,
    in_flight: Mutex<Option<InFlight>>,
    generation: AtomicU64,
    /// The spawned initial fetch has not started and no command ran yet.
    auto_pending: AtomicBool,
    closed: AtomicBool,
}

impl<T> PaginatedFetch<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a controller.
    ///
    /// With `options.auto_fetch` the first page is requested right away on
    /// the current Tokio runtime.
    pub fn new(
        source: Arc<dyn PageSource<T>>,
        options: PaginatedFetchOptions,
        handlers: FetchHandlers<[T]>,
    ) -> Arc<Self> {
        let (state, _) = watch::channel(PaginatedState::initial(options.auto_fetch));
        let controller = Arc::new(Self {
            source: RwLock::new(source),
            handlers: RwLock::new(handlers),
            options,
            state,
            in_flight: Mutex::new(None),
            generation: AtomicU64::new(0),
            auto_pending: AtomicBool::new(options.auto_fetch),
            closed: AtomicBool::new(false),
        });

        if options.auto_fetch {
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    let this = Arc::clone(&controller);
                    handle.spawn(async move { this.initial_fetch().await });
                }
                Err(_) => {
                    log::warn!("[paginated] No Tokio runtime, initial fetch skipped");
                    controller.auto_pending.store(false, Ordering::SeqCst);
                    controller.state.send_modify(PaginatedState::clear_flags);
                }
            }
        }

        controller
    }

    // ===== Commands =====

    /// Request the next page.
    ///
    /// Skipped when no more pages are expected, a fetch is in flight, or
    /// either `loading` or `loading_more` is raised.
    pub async fn load_more(&self) -> FetchOutcome {
        let ticket = self.try_begin(FetchKind::LoadMore, |state| {
            (state.has_more && !state.loading_more && !state.loading)
                .then(|| state.current_page + 1)
        });
        match ticket {
            Some(ticket) => self.run(ticket, FetchKind::LoadMore).await,
            None => FetchOutcome::Skipped,
        }
    }

    /// Reload page 1, replacing the accumulated list (pull-to-refresh).
    ///
    /// Skipped when a fetch is in flight. `has_more` is raised again before
    /// the request goes out.
    pub async fn refresh(&self) -> FetchOutcome {
        match self.try_begin(FetchKind::Refresh, |_| Some(1)) {
            Some(ticket) => self.run(ticket, FetchKind::Refresh).await,
            None => FetchOutcome::Skipped,
        }
    }

    /// Clear all state and fetch page 1 again.
    ///
    /// Used when the caller changed a filter and pagination restarts from
    /// scratch. A fetch still in flight is aborted and its result discarded.
    pub async fn reset(&self) -> FetchOutcome {
        match self.begin_reset() {
            Some(ticket) => self.run(ticket, FetchKind::Initial).await,
            None => FetchOutcome::Skipped,
        }
    }

    /// The auto-fetch spawned by [`new`](Self::new). Skipped once any
    /// command started first.
    async fn initial_fetch(&self) -> FetchOutcome {
        let pending =
            |_: &PaginatedState<T>| self.auto_pending.load(Ordering::SeqCst).then_some(1);
        match self.try_begin(FetchKind::Initial, pending) {
            Some(ticket) => self.run(ticket, FetchKind::Initial).await,
            None => FetchOutcome::Skipped,
        }
    }

    /// [`load_more`](Self::load_more) on a spawned task, for event bindings.
    pub fn spawn_load_more(self: &Arc<Self>) -> JoinHandle<FetchOutcome> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.load_more().await })
    }

    /// [`refresh`](Self::refresh) on a spawned task.
    pub fn spawn_refresh(self: &Arc<Self>) -> JoinHandle<FetchOutcome> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.refresh().await })
    }

    /// [`reset`](Self::reset) on a spawned task.
    pub fn spawn_reset(self: &Arc<Self>) -> JoinHandle<FetchOutcome> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.reset().await })
    }

    /// Abort the fetch in flight, if any.
    ///
    /// Cancellation is not a failure: the loading flags drop and the guard is
    /// released, but `error` and the handlers are left alone.
    pub fn cancel(&self) -> bool {
        let mut slot = lock(&self.in_flight);
        self.abort_locked(&mut slot)
    }

    /// Tear the controller down: abort the fetch in flight and ignore every
    /// later command. No state is published and no handler fires afterwards.
    pub fn close(&self) {
        let mut slot = lock(&self.in_flight);
        self.abort_locked(&mut slot);
        self.closed.store(true, Ordering::SeqCst);
    }

    fn abort_locked(&self, slot: &mut Option<InFlight>) -> bool {
        let Some(current) = slot.take() else {
            return false;
        };
        current.abort.abort();
        log::debug!("[paginated] Fetch #{} cancelled", current.generation);
        if !self.is_closed() {
            self.state.send_modify(PaginatedState::clear_flags);
        }
        true
    }

    // ===== Configuration =====

    /// Swap the data source; the next fetch uses it.
    pub fn set_source(&self, source: Arc<dyn PageSource<T>>) {
        write_cell(&self.source, source);
    }

    /// Swap the callbacks; the next settled fetch uses them.
    pub fn set_handlers(&self, handlers: FetchHandlers<[T]>) {
        write_cell(&self.handlers, handlers);
    }

    pub fn options(&self) -> PaginatedFetchOptions {
        self.options
    }

    // ===== Observation =====

    /// Clone of the current state.
    pub fn snapshot(&self) -> PaginatedState<T> {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<PaginatedState<T>> {
        self.state.subscribe()
    }

    /// Whether a fetch currently holds the in-flight guard.
    pub fn is_fetching(&self) -> bool {
        lock(&self.in_flight).is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Wait until no loading flag is raised.
    pub async fn idle(&self) {
        let mut rx = self.state.subscribe();
        let _ = rx.wait_for(|state| !state.is_busy()).await;
    }

    // ===== Fetch execution =====

    /// Acquire the guard if free and `admit` accepts the current state,
    /// raising the flag for `kind` in the same critical section.
    fn try_begin(
        &self,
        kind: FetchKind,
        admit: impl FnOnce(&PaginatedState<T>) -> Option<u32>,
    ) -> Option<Ticket> {
        let mut slot = lock(&self.in_flight);
        if self.is_closed() || slot.is_some() {
            return None;
        }
        let page = {
            let state = self.state.borrow();
            admit(&state)?
        };

        let (generation, registration) = self.install(&mut slot);
        self.state.send_modify(|state| raise(state, kind));
        Some(Ticket {
            generation,
            registration,
            page,
        })
    }

    /// Take the guard unconditionally for a reset, aborting whatever held it.
    fn begin_reset(&self) -> Option<Ticket> {
        let mut slot = lock(&self.in_flight);
        if self.is_closed() {
            return None;
        }
        if let Some(previous) = slot.take() {
            previous.abort.abort();
            log::debug!(
                "[paginated] Reset supersedes fetch #{}",
                previous.generation
            );
        }

        let (generation, registration) = self.install(&mut slot);
        self.state.send_modify(|state| {
            *state = PaginatedState::initial(false);
            raise(state, FetchKind::Initial);
        });
        Some(Ticket {
            generation,
            registration,
            page: 1,
        })
    }

    fn install(&self, slot: &mut Option<InFlight>) -> (u64, AbortRegistration) {
        self.auto_pending.store(false, Ordering::SeqCst);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let (abort, registration) = AbortHandle::new_pair();
        *slot = Some(InFlight { generation, abort });
        (generation, registration)
    }

    async fn run(&self, ticket: Ticket, kind: FetchKind) -> FetchOutcome {
        let Ticket {
            generation,
            registration,
            page,
        } = ticket;
        let _guard = FetchGuard {
            owner: self,
            generation,
        };

        let params = PaginationParams::new(page, self.options.page_size);
        let source = read_cell(&self.source);
        log::debug!("[paginated] Fetch #{generation}: page {page} ({kind})");

        match Abortable::new(source.fetch_page(&params), registration).await {
            Err(_aborted) => {
                log::debug!("[paginated] Fetch #{generation} aborted");
                FetchOutcome::Cancelled
            }
            Ok(Ok(data)) => self.apply_page(generation, page, kind, data),
            Ok(Err(error)) => self.apply_failure(generation, page, kind, &error),
        }
    }

    fn apply_page(&self, generation: u64, page: u32, kind: FetchKind, data: Page<T>) -> FetchOutcome {
        let has_next = data.has_next();
        let Page { count, results, .. } = data;
        let replace = kind == FetchKind::Refresh || page == 1;

        // Page-1 and refresh callers receive the new page only, load-more
        // callers the whole accumulated list.
        let mut payload = Vec::new();
        let applied = self.publish_if_current(generation, |state| {
            if replace {
                payload.clone_from(&results);
                state.items = results;
            } else {
                state.items.extend(results);
                payload.clone_from(&state.items);
            }
            state.total_count = count;
            state.has_more = has_next;
            state.current_page = page;
        });
        if !applied {
            return FetchOutcome::Cancelled;
        }

        log::debug!(
            "[paginated] Fetch #{generation}: page {page} loaded, {} items, total {count}, has_more={has_next}",
            payload.len()
        );
        read_cell(&self.handlers).notify_success(&payload);
        FetchOutcome::Loaded
    }

    fn apply_failure(
        &self,
        generation: u64,
        page: u32,
        kind: FetchKind,
        error: &FetchError,
    ) -> FetchOutcome {
        let message = error.display_message(PAGINATED_MESSAGE_FIELDS);
        let applied = self.publish_if_current(generation, |state| {
            state.error = Some(message);
            // Only failures past page 1 stop pagination
            if page > 1 {
                state.has_more = false;
            }
        });
        if !applied {
            return FetchOutcome::Cancelled;
        }

        if error.is_expected() {
            log::warn!("[paginated] Fetch #{generation}: page {page} ({kind}) failed: {error}");
        } else {
            log::error!("[paginated] Fetch #{generation}: page {page} ({kind}) failed: {error}");
        }
        read_cell(&self.handlers).notify_error(error);
        FetchOutcome::Failed
    }

    /// Apply `modify` only if `generation` still holds the guard and the
    /// controller is open.
    fn publish_if_current(
        &self,
        generation: u64,
        modify: impl FnOnce(&mut PaginatedState<T>),
    ) -> bool {
        let slot = lock(&self.in_flight);
        let current = slot
            .as_ref()
            .is_some_and(|in_flight| in_flight.generation == generation);
        if !current || self.is_closed() {
            return false;
        }
        self.state.send_modify(modify);
        true
    }
}

fn raise<T>(state: &mut PaginatedState<T>, kind: FetchKind) {
    match kind {
        FetchKind::Initial => state.loading = true,
        FetchKind::LoadMore => state.loading_more = true,
        FetchKind::Refresh => {
            state.refreshing = true;
            state.has_more = true;
        }
    }
    state.error = None;
}
