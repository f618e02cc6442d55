//! Logging helpers for results that are reported rather than propagated.
//!
//! Several session queries swallow failures by contract (`get_current_user`,
//! `get_token`). These helpers keep the failure visible in the logs together
//! with the call site.

use std::fmt::Display;
use tracing::{error, warn};

/// Extension trait for logging errors with context.
pub trait ResultExt<T, E> {
    /// Log the error with context if this is an `Err` variant.
    ///
    /// Returns the original `Result` unchanged.
    ///
    /// ```ignore
    /// use ragdesk_client::result_ext::ResultExt;
    ///
    /// let user = backend.get_user(token).await.log("resolving current user");
    /// ```
    fn log<S: ToString>(self, context: S) -> Result<T, E>;

    /// Log the error as a warning and discard it.
    fn warn_ok<S: ToString>(self, context: S) -> Option<T>;
}

impl<T, E: Display> ResultExt<T, E> for Result<T, E> {
    #[track_caller]
    fn log<S: ToString>(self, context: S) -> Result<T, E> {
        if let Err(ref e) = self {
            let caller_location = std::panic::Location::caller();
            error!(
                target: "ragdesk_client",
                error = %e,
                file = %format!("{}:{}", caller_location.file(), caller_location.line()),
                context = %context.to_string(),
                "Operation failed"
            );
        }
        self
    }

    #[track_caller]
    fn warn_ok<S: ToString>(self, context: S) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(e) => {
                let caller_location = std::panic::Location::caller();
                warn!(
                    target: "ragdesk_client",
                    error = %e,
                    file = %format!("{}:{}", caller_location.file(), caller_location.line()),
                    context = %context.to_string(),
                    "Operation failed, continuing without a value"
                );
                None
            }
        }
    }
}

/// Extension trait for logging absent values.
pub trait OptionResultExt<T> {
    /// Log at debug level if this is a `None` variant.
    fn log_none<S: ToString>(self, context: S) -> Option<T>;
}

impl<T> OptionResultExt<T> for Option<T> {
    #[track_caller]
    fn log_none<S: ToString>(self, context: S) -> Option<T> {
        if self.is_none() {
            let caller_location = std::panic::Location::caller();
            tracing::debug!(
                target: "ragdesk_client",
                file = %format!("{}:{}", caller_location.file(), caller_location.line()),
                context = %context.to_string(),
                "Expected value was None"
            );
        }
        self
    }
}
