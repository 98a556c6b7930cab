use std::ffi::NulError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures on the registration and bootstrap surface.
///
/// The marshaling paths themselves never produce one of these: a failed
/// script call is reported through [`crate::Invoker::pcall`]'s log-and-default
/// contract instead, keeping the call boundary allocation-free.
#[derive(Error, Debug)]
pub enum Error {
    /// A name or source string carried an interior nul byte and cannot
    /// cross the C boundary.
    #[error("string contains an interior nul byte: {0}")]
    InvalidName(#[from] NulError),

    /// The runtime rejected a module registration.
    #[error("failed to register module {0:?}")]
    Registration(String),

    /// Script source handed to [`crate::runtime::run`] raised.
    #[error("script execution failed")]
    Execution,
}
