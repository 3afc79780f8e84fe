//! Test helper module
//!
//! Scripted sources and callback recorders for the controller tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use tokio::sync::{watch, Mutex, Semaphore};

use crate::controllers::FetchHandlers;
use crate::error::{FetchError, FetchResult};
use crate::traits::{PageSource, Source};
use crate::types::{Page, PaginationParams};

/// Counts calls and optionally holds each one until released.
struct CallGate {
    calls: watch::Sender<usize>,
    gate: Option<Semaphore>,
}

impl CallGate {
    fn new(gated: bool) -> Self {
        Self {
            calls: watch::channel(0).0,
            gate: gated.then(|| Semaphore::new(0)),
        }
    }

    async fn pass(&self) {
        self.calls.send_modify(|n| *n += 1);
        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
    }

    fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    async fn wait_for(&self, n: usize) {
        let mut rx = self.calls.subscribe();
        let _ = rx.wait_for(|calls| *calls >= n).await;
    }

    fn count(&self) -> usize {
        *self.calls.borrow()
    }
}

// ===== MockPageSource =====

pub struct MockPageSource<T> {
    responses: Mutex<HashMap<u32, VecDeque<FetchResult<Page<T>>>>>,
    calls: Mutex<Vec<PaginationParams>>,
    gate: CallGate,
}

impl<T> MockPageSource<T> {
    pub fn new() -> Self {
        Self::with_gate(false)
    }

    /// Every fetch blocks after being recorded until [`release`](Self::release).
    pub fn gated() -> Self {
        Self::with_gate(true)
    }

    fn with_gate(gated: bool) -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            gate: CallGate::new(gated),
        }
    }

    /// Queue the answer for the next fetch of `page`.
    pub async fn respond(&self, page: u32, result: FetchResult<Page<T>>) {
        self.responses
            .lock()
            .await
            .entry(page)
            .or_default()
            .push_back(result);
    }

    pub async fn respond_ok(&self, page: u32, data: Page<T>) {
        self.respond(page, Ok(data)).await;
    }

    pub fn release(&self, n: usize) {
        self.gate.release(n);
    }

    pub async fn wait_for_calls(&self, n: usize) {
        self.gate.wait_for(n).await;
    }

    pub async fn calls(&self) -> Vec<PaginationParams> {
        self.calls.lock().await.clone()
    }

    pub async fn requested_pages(&self) -> Vec<u32> {
        self.calls.lock().await.iter().map(|p| p.page).collect()
    }
}

#[async_trait]
impl<T: Send + Sync + 'static> PageSource<T> for MockPageSource<T> {
    async fn fetch_page(&self, params: &PaginationParams) -> FetchResult<Page<T>> {
        self.calls.lock().await.push(*params);
        self.gate.pass().await;
        self.responses
            .lock()
            .await
            .get_mut(&params.page)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(FetchError::Message(format!(
                    "no scripted response for page {}",
                    params.page
                )))
            })
    }
}

// ===== MockSource =====

pub struct MockSource<T> {
    responses: Mutex<VecDeque<FetchResult<T>>>,
    gate: CallGate,
}

impl<T> MockSource<T> {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            gate: CallGate::new(false),
        }
    }

    pub fn gated() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            gate: CallGate::new(true),
        }
    }

    pub async fn respond(&self, result: FetchResult<T>) {
        self.responses.lock().await.push_back(result);
    }

    pub fn release(&self, n: usize) {
        self.gate.release(n);
    }

    pub async fn wait_for_calls(&self, n: usize) {
        self.gate.wait_for(n).await;
    }

    pub fn call_count(&self) -> usize {
        self.gate.count()
    }
}

#[async_trait]
impl<T: Send + Sync + 'static> Source<T> for MockSource<T> {
    async fn fetch(&self) -> FetchResult<T> {
        self.gate.pass().await;
        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(FetchError::Message("no scripted response".into())))
    }
}

// ===== Callback recorders =====

pub type Recorded<V> = Arc<StdMutex<Vec<V>>>;

/// Handlers that record every success payload and error they receive.
pub fn recording_handlers<T>() -> (FetchHandlers<[T]>, Recorded<Vec<T>>, Recorded<FetchError>)
where
    T: Clone + Send + Sync + 'static,
{
    let successes: Recorded<Vec<T>> = Arc::default();
    let errors: Recorded<FetchError> = Arc::default();
    let success_sink = Arc::clone(&successes);
    let error_sink = Arc::clone(&errors);
    let handlers = FetchHandlers::new()
        .on_success(move |items: &[T]| {
            if let Ok(mut calls) = success_sink.lock() {
                calls.push(items.to_vec());
            }
        })
        .on_error(move |error| {
            if let Ok(mut calls) = error_sink.lock() {
                calls.push(error.clone());
            }
        });
    (handlers, successes, errors)
}
