//! Error types for the text engine.
//!
//! Only two conditions are real errors: running out of memory while growing
//! a store, and touching a buffer or view after it has been destroyed.
//! Everything else (out-of-range offsets, rows, columns, wrap widths) is
//! clamped at the call site and malformed UTF-8 decodes to U+FFFD.

use std::collections::TryReserveError;
use std::fmt;

/// Result type alias for text engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for text engine operations.
#[derive(Debug)]
pub enum Error {
    /// Allocation failure while growing a store. No partial state is
    /// committed; the operation that failed left the buffer unchanged.
    Alloc {
        /// The store that failed to grow (e.g. "byte store", "line index").
        what: &'static str,
        source: TryReserveError,
    },
    /// Operation on a buffer or view after its `destroy` call.
    Destroyed {
        /// The object that was already destroyed.
        what: &'static str,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alloc { what, source } => {
                write!(f, "allocation failure growing {what}: {source}")
            }
            Self::Destroyed { what } => write!(f, "use after destroy: {what}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Alloc { source, .. } => Some(source),
            Self::Destroyed { .. } => None,
        }
    }
}

impl Error {
    /// Wrap a failed reservation on a named store.
    #[must_use]
    pub fn alloc(what: &'static str, source: TryReserveError) -> Self {
        Self::Alloc { what, source }
    }

    /// Build the use-after-destroy error for a named object.
    #[must_use]
    pub fn destroyed(what: &'static str) -> Self {
        Self::Destroyed { what }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::destroyed("text buffer");
        assert!(err.to_string().contains("use after destroy"));
        assert!(err.to_string().contains("text buffer"));
    }

    #[test]
    fn test_alloc_error_carries_source() {
        let mut v: Vec<u8> = Vec::new();
        let reserve_err = v.try_reserve(usize::MAX).unwrap_err();
        let err = Error::alloc("byte store", reserve_err);
        assert!(err.to_string().contains("byte store"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
