//! Single-resource fetch controller

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::handlers::FetchHandlers;
use super::{read_cell, write_cell};
use crate::error::SINGLE_MESSAGE_FIELDS;
use crate::traits::Source;
use crate::types::{FetchOutcome, SingleState};

/// Loads one resource with loading/error state and caller-driven refetch.
///
/// Overlapping refetches are allowed; only the most recent one is applied.
pub struct SingleFetch<T> {
    source: RwLock<Arc<dyn Source<T>>>,
    handlers: RwLock<FetchHandlers<T>>,
    state: watch::Sender<SingleState<T>>,
    generation: AtomicU64,
    closed: AtomicBool,
}

impl<T> SingleFetch<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a controller. `loading` starts raised; call
    /// [`start`](Self::start) or [`refetch`](Self::refetch) to load.
    pub fn new(
        source: Arc<dyn Source<T>>,
        initial_data: Option<T>,
        handlers: FetchHandlers<T>,
    ) -> Arc<Self> {
        let (state, _) = watch::channel(SingleState::initial(initial_data));
        Arc::new(Self {
            source: RwLock::new(source),
            handlers: RwLock::new(handlers),
            state,
            generation: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        })
    }

    /// Spawn the initial fetch.
    pub fn start(self: &Arc<Self>) -> JoinHandle<FetchOutcome> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.refetch().await })
    }

    /// Fetch the resource again.
    pub async fn refetch(&self) -> FetchOutcome {
        if self.is_closed() {
            return FetchOutcome::Skipped;
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });

        let source = read_cell(&self.source);
        match source.fetch().await {
            Ok(data) => {
                let payload = data.clone();
                let applied = self.publish_if_latest(generation, |state| {
                    state.data = Some(data);
                    state.loading = false;
                });
                if !applied {
                    return FetchOutcome::Cancelled;
                }
                read_cell(&self.handlers).notify_success(&payload);
                FetchOutcome::Loaded
            }
            Err(error) => {
                let message = error.display_message(SINGLE_MESSAGE_FIELDS);
                let applied = self.publish_if_latest(generation, |state| {
                    state.error = Some(message);
                    state.loading = false;
                });
                if !applied {
                    return FetchOutcome::Cancelled;
                }
                if error.is_expected() {
                    log::warn!("[single] Fetch #{generation} failed: {error}");
                } else {
                    log::error!("[single] Fetch #{generation} failed: {error}");
                }
                read_cell(&self.handlers).notify_error(&error);
                FetchOutcome::Failed
            }
        }
    }

    pub fn set_source(&self, source: Arc<dyn Source<T>>) {
        write_cell(&self.source, source);
    }

    pub fn set_handlers(&self, handlers: FetchHandlers<T>) {
        write_cell(&self.handlers, handlers);
    }

    pub fn snapshot(&self) -> SingleState<T> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SingleState<T>> {
        self.state.subscribe()
    }

    /// Stop publishing; later refetches are skipped and results of running
    /// ones are dropped.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn publish_if_latest(&self, generation: u64, modify: impl FnOnce(&mut SingleState<T>)) -> bool {
        self.state.send_if_modified(|state| {
            if self.is_closed() || self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            modify(state);
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::test_utils::MockSource;
    use serde_json::json;
    use std::sync::Mutex;

    #[tokio::test]
    async fn start_loads_resource() {
        let source = Arc::new(MockSource::new());
        source.respond(Ok("perfil".to_string())).await;
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handlers = FetchHandlers::new().on_success(move |data: &String| {
            sink.lock().unwrap().push(data.clone());
        });
        let fetch = SingleFetch::new(source.clone(), None, handlers);
        assert!(fetch.snapshot().loading);

        assert_eq!(fetch.start().await.unwrap(), FetchOutcome::Loaded);

        let state = fetch.snapshot();
        assert_eq!(state.data.as_deref(), Some("perfil"));
        assert!(!state.loading);
        assert_eq!(state.error, None);
        assert_eq!(seen.lock().unwrap().clone(), vec!["perfil".to_string()]);
    }

    #[tokio::test]
    async fn initial_data_is_kept_on_failure() {
        let source = Arc::new(MockSource::new());
        source
            .respond(Err(FetchError::status(400, Some(json!({"error": "Zona inválida"})))))
            .await;
        let fetch = SingleFetch::new(source.clone(), Some(7_u32), FetchHandlers::new());
        assert_eq!(fetch.snapshot().data, Some(7));

        assert_eq!(fetch.refetch().await, FetchOutcome::Failed);

        let state = fetch.snapshot();
        assert_eq!(state.data, Some(7));
        assert_eq!(state.error.as_deref(), Some("Zona inválida"));
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn detail_field_is_not_consulted() {
        let source = Arc::new(MockSource::<u32>::new());
        source
            .respond(Err(FetchError::status(404, Some(json!({"detail": "No encontrado."})))))
            .await;
        let fetch = SingleFetch::new(source.clone(), None, FetchHandlers::new());

        fetch.refetch().await;

        assert_eq!(
            fetch.snapshot().error.as_deref(),
            Some("Request failed with status code 404")
        );
    }

    #[tokio::test]
    async fn latest_refetch_wins() {
        let source = Arc::new(MockSource::gated());
        source.respond(Ok("viejo".to_string())).await;
        source.respond(Ok("nuevo".to_string())).await;
        let fetch = SingleFetch::new(source.clone(), None, FetchHandlers::new());

        let older = fetch.start();
        source.wait_for_calls(1).await;
        let newer = fetch.start();
        source.wait_for_calls(2).await;

        source.release(1);
        assert_eq!(older.await.unwrap(), FetchOutcome::Cancelled);
        assert!(fetch.snapshot().loading);

        source.release(1);
        assert_eq!(newer.await.unwrap(), FetchOutcome::Loaded);
        assert_eq!(fetch.snapshot().data.as_deref(), Some("nuevo"));
    }

    #[tokio::test]
    async fn uses_latest_source() {
        let first = Arc::new(MockSource::new());
        let second = Arc::new(MockSource::new());
        second.respond(Ok(2_u32)).await;
        let fetch = SingleFetch::new(first.clone(), None, FetchHandlers::new());

        fetch.set_source(second.clone());
        fetch.refetch().await;

        assert_eq!(fetch.snapshot().data, Some(2));
        assert_eq!(first.call_count(), 0);
        assert_eq!(second.call_count(), 1);
    }

    #[tokio::test]
    async fn closed_fetch_is_skipped() {
        let source = Arc::new(MockSource::<u32>::new());
        let fetch = SingleFetch::new(source.clone(), None, FetchHandlers::new());

        fetch.close();

        assert_eq!(fetch.refetch().await, FetchOutcome::Skipped);
        assert_eq!(source.call_count(), 0);
    }
}
