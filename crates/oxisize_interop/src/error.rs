use thiserror::Error;

use crate::BoxError;

#[derive(Debug, Error)]
pub enum InteropError {
    /// The analytics client could not be obtained while wiring up the
    /// internal interop component.
    #[error("analytics interop component failed to instantiate: {source}")]
    InteropComponentRegistrationFailed {
        #[source]
        source: BoxError,
    },
}

impl InteropError {
    /// Stable code for the error, as reported to callers outside Rust.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InteropComponentRegistrationFailed { .. } => "analytics/interop-component-reg-failed",
        }
    }
}
