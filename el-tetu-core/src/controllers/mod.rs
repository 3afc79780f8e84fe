//! Fetch controllers

mod handlers;
mod paginated;
mod single;

pub use handlers::{ErrorHandler, FetchHandlers};
pub use paginated::PaginatedFetch;
pub use single::SingleFetch;

use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};

/// Lock a mutex, recovering the data if a panicking callback poisoned it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clone the current value out of a configuration cell.
fn read_cell<T: Clone>(cell: &RwLock<T>) -> T {
    cell.read().unwrap_or_else(PoisonError::into_inner).clone()
}

/// Replace the value of a configuration cell.
fn write_cell<T>(cell: &RwLock<T>, value: T) {
    *cell.write().unwrap_or_else(PoisonError::into_inner) = value;
}
