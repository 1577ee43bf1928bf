//! Access Errors
//!
//! Reading or writing a cell outside its `Ready` state fails immediately.
//! Nothing is retried and no default value is substituted. Builder and
//! cleanup failures are not represented here: panics inside those closures
//! propagate to the phase that invoked them.

use thiserror::Error;

/// Why a cell access was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccessError {
    /// The cell holds no value yet: either its first commit has not
    /// completed, or a rebuild is in flight.
    #[error("cell accessed before its first commit completed")]
    Uninitialized,

    /// The owning scope was torn down. Terminal; the cell is never rebuilt.
    #[error("cell accessed after its owning scope was torn down")]
    Disposed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_display_their_cause() {
        assert!(AccessError::Uninitialized.to_string().contains("first commit"));
        assert!(AccessError::Disposed.to_string().contains("torn down"));
    }
}
