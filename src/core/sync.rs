//! Lock helpers
//!
//! Poisoned locks are either converted into a caller-supplied error (for
//! mutating operations) or recovered with a warning (for read-only queries
//! that must always answer).

use std::sync::{
    LockResult, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
};

fn poison_message(kind: &str, what: &str) -> String {
    format!(
        "Internal synchronisation error ({kind} for {what} poisoned). A thread panicked while holding the lock."
    )
}

fn map_poison<T, E>(
    result: LockResult<T>,
    kind: &str,
    what: &str,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<T, E> {
    result.map_err(|_| error_constructor(poison_message(kind, what)))
}

/// Lock a mutex, mapping poisoning into an application error
pub fn lock_mutex<'a, T, E>(
    mutex: &'a Mutex<T>,
    what: &str,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<MutexGuard<'a, T>, E> {
    map_poison(mutex.lock(), "mutex", what, error_constructor)
}

/// Acquire a write guard, mapping poisoning into an application error
pub fn write_lock<'a, T, E>(
    lock: &'a RwLock<T>,
    what: &str,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<RwLockWriteGuard<'a, T>, E> {
    map_poison(lock.write(), "write lock", what, error_constructor)
}

/// Lock a mutex for a query that cannot fail.
///
/// The guarded data is only ever mutated by short, non-panicking critical
/// sections, so a poisoned guard still holds consistent data.
pub fn lock_recovering<'a, T>(mutex: &'a Mutex<T>, what: &str) -> MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
        log::warn!("{}; recovering", poison_message("mutex", what));
        poisoned.into_inner()
    })
}

/// Read-lock variant of [`lock_recovering`]
pub fn read_recovering<'a, T>(lock: &'a RwLock<T>, what: &str) -> RwLockReadGuard<'a, T> {
    lock.read().unwrap_or_else(|poisoned| {
        log::warn!("{}; recovering", poison_message("read lock", what));
        poisoned.into_inner()
    })
}
