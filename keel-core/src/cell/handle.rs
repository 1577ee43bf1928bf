//! Cell Handles
//!
//! A `CellRef` is the public face of a slot. Cloning a handle shares the
//! slot, so every handle minted for a call site observes the same storage;
//! identity is compared with [`CellRef::same_cell`].

use std::fmt::Debug;
use std::sync::Arc;

use super::error::AccessError;
use super::slot::Slot;

/// Handle to an identity-stable reference cell.
///
/// Reads clone the stored value; both reads and writes are checked against
/// the cell's lifecycle state on every access.
pub struct CellRef<T> {
    slot: Arc<Slot<T>>,
}

impl<T> CellRef<T>
where
    T: Clone + Send + 'static,
{
    pub(crate) fn new(slot: Arc<Slot<T>>) -> Self {
        Self { slot }
    }

    /// The cell's unique ID, stable for the lifetime of the call site.
    pub fn id(&self) -> u64 {
        self.slot.id()
    }

    /// Get the current value.
    ///
    /// Fails with [`AccessError::Uninitialized`] before the first build
    /// completes and with [`AccessError::Disposed`] after teardown.
    pub fn get(&self) -> Result<T, AccessError> {
        self.slot.read()
    }

    /// Replace the current value, subject to the same lifecycle gate as
    /// [`get`](Self::get).
    pub fn set(&self, value: T) -> Result<(), AccessError> {
        self.slot.write(value)
    }

    /// True once a first value has been committed and the cell is readable.
    pub fn is_initialized(&self) -> bool {
        self.slot.is_initialized()
    }

    /// True when both handles point at the same underlying slot.
    pub fn same_cell(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }
}

impl<T> Clone for CellRef<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> Debug for CellRef<T>
where
    T: Clone + Send + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CellRef")
            .field("id", &self.id())
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
