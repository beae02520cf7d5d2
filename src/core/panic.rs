//! Panic containment for calls into component code
//!
//! Component hooks, factories and stop actions are user code. A panic in any
//! of them must be reported like an ordinary failure instead of unwinding
//! through the lifecycle machinery.

use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Boxed error type returned by component code
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A panic captured while running component code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanicError {
    message: String,
}

impl PanicError {
    pub fn message(&self) -> &str {
        &self.message
    }

    fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self { message }
    }
}

impl fmt::Display for PanicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "panicked: {}", self.message)
    }
}

impl std::error::Error for PanicError {}

/// Run `f`, converting a panic into a [`PanicError`]
pub fn contain<T>(f: impl FnOnce() -> T) -> Result<T, PanicError> {
    catch_unwind(AssertUnwindSafe(f)).map_err(PanicError::from_payload)
}

/// Run a fallible hook, folding panics into the error channel
pub fn contain_fallible<T>(f: impl FnOnce() -> Result<T, BoxError>) -> Result<T, BoxError> {
    match contain(f) {
        Ok(result) => result,
        Err(panic) => Err(Box::new(panic)),
    }
}
