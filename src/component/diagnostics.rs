//! Diagnostic channel
//!
//! Failures that are isolated rather than propagated (a type that cannot be
//! resolved, a stop action that fails) still have to reach the operator. They
//! are reported as message-coded entries to a [`DiagnosticSink`]; the default
//! sink forwards them to the `log` facade.

use crate::component::error::ComponentError;
use crate::component::types::ModuleId;
use crate::core::error_handling::error_chain;
use crate::core::sync::lock_recovering;
use std::fmt;
use std::sync::Mutex;

/// Stable message codes. The suffix gives the severity (`E`rror, `W`arning, `I`nfo).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::AsRefStr, strum_macros::Display)]
pub enum MessageCode {
    #[strum(serialize = "LCM0001E")]
    StopActionFailed,
    #[strum(serialize = "LCM0002E")]
    InitializeFailed,
    #[strum(serialize = "LCM0003E")]
    StartFailed,
    #[strum(serialize = "LCM0007E")]
    ResolutionFailed,
    #[strum(serialize = "LCM0008E")]
    InstantiationFailed,
    #[strum(serialize = "LCM0009W")]
    DuplicateModule,
    #[strum(serialize = "LCM0010I")]
    ProcessTypeMismatch,
    #[strum(serialize = "LCM0011E")]
    TeardownFailed,
    /// Registry misuse or a poisoned lock, not caused by any one module
    #[strum(serialize = "LCM0012E")]
    InternalFailure,
}

impl MessageCode {
    pub fn level(self) -> log::Level {
        match self {
            MessageCode::ProcessTypeMismatch => log::Level::Debug,
            MessageCode::DuplicateModule => log::Level::Warn,
            _ => log::Level::Error,
        }
    }

    /// Code for an error surfaced while building or starting a module
    pub fn for_error(error: &ComponentError) -> Self {
        match error {
            ComponentError::Configuration { .. } => MessageCode::InitializeFailed,
            ComponentError::Runtime { .. } | ComponentError::Publication { .. } => {
                MessageCode::StartFailed
            }
            ComponentError::Resolution { .. } => MessageCode::ResolutionFailed,
            ComponentError::Instantiation { .. } => MessageCode::InstantiationFailed,
            ComponentError::StopAction { .. } => MessageCode::StopActionFailed,
            ComponentError::Teardown { .. } => MessageCode::TeardownFailed,
            ComponentError::IllegalState { state, .. } if state.is_stopping_or_later() => {
                MessageCode::TeardownFailed
            }
            ComponentError::IllegalState { .. } => MessageCode::StartFailed,
            ComponentError::DuplicateType { .. } | ComponentError::Synchronization { .. } => {
                MessageCode::InternalFailure
            }
        }
    }
}

/// One entry on the diagnostic channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: MessageCode,
    pub module: Option<ModuleId>,
    pub component: Option<String>,
    pub type_id: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(code: MessageCode, message: impl Into<String>) -> Self {
        Self {
            code,
            module: None,
            component: None,
            type_id: None,
            message: message.into(),
        }
    }

    /// Build an entry from an error, keeping its whole source chain in the message
    pub fn from_error(module: Option<ModuleId>, error: &ComponentError) -> Self {
        Self {
            code: MessageCode::for_error(error),
            module,
            component: error.component().map(str::to_string),
            type_id: error.type_id().map(str::to_string),
            message: error_chain(error),
        }
    }

    pub fn with_module(mut self, module: ModuleId) -> Self {
        self.module = Some(module);
        self
    }

    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    pub fn with_type_id(mut self, type_id: impl Into<String>) -> Self {
        self.type_id = Some(type_id.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// Receiver of diagnostic entries
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Forwards every entry to the `log` facade at its code's level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&self, diagnostic: Diagnostic) {
        log::log!(diagnostic.code.level(), "{}", diagnostic);
    }
}

/// Keeps every entry in memory and forwards it to the log as well
#[derive(Debug, Default)]
pub struct RecordingSink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far
    pub fn entries(&self) -> Vec<Diagnostic> {
        lock_recovering(&self.entries, "diagnostic entries").clone()
    }

    pub fn count(&self, code: MessageCode) -> usize {
        lock_recovering(&self.entries, "diagnostic entries")
            .iter()
            .filter(|entry| entry.code == code)
            .count()
    }

    pub fn clear(&self) {
        lock_recovering(&self.entries, "diagnostic entries").clear();
    }
}

impl DiagnosticSink for RecordingSink {
    fn report(&self, diagnostic: Diagnostic) {
        LogSink.report(diagnostic.clone());
        lock_recovering(&self.entries, "diagnostic entries").push(diagnostic);
    }
}
