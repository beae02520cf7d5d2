//! Error reporting shared by the subsystems
//!
//! Errors that an operator can act on (a bad configuration value, a missing
//! config file) are shown verbatim. Everything else is reported under the
//! operation that failed, with the full error kept at debug level.

/// Errors that know whether their message is meant for the operator
///
/// When `is_user_actionable()` returns `true`, `user_message()` must return
/// `Some(message)`; otherwise it returns `None`.
pub trait ContextualError: std::error::Error {
    /// True if the message can be shown to the operator as-is
    fn is_user_actionable(&self) -> bool;

    /// The operator-facing message, present only for actionable errors
    fn user_message(&self) -> Option<&str>;
}

/// Log a fatal error with a level of detail suited to its kind
///
/// ```rust,no_run
/// # use modlife::core::error_handling::log_error_with_context;
/// # use modlife::module::api::ConfigError;
/// let error = ConfigError::Invalid { message: "process_type must not be empty".into() };
/// log_error_with_context(&error, "Loading host configuration");
/// // Logs: "FATAL: process_type must not be empty"
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Display + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message() {
        Some(message) if error.is_user_actionable() => log::error!("FATAL: {}", message),
        _ => log::error!("FATAL: {}", operation_context),
    }
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}

/// Render an error followed by its `source()` chain, separated by `: `
pub fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut rendered = error.to_string();
    let mut current = error.source();
    while let Some(source) = current {
        let text = source.to_string();
        if !rendered.ends_with(&text) {
            rendered.push_str(": ");
            rendered.push_str(&text);
        }
        current = source.source();
    }
    rendered
}
