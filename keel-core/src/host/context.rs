//! Bind Context
//!
//! The cursor over a scope's slot table during one compute pass. The first
//! pass appends a slot per `bind` call; later passes walk the table in the
//! same order and hand back the same slots, which is what makes cell
//! identity stable across cycles.

use std::any::type_name;
use std::sync::Arc;

use crate::cell::slot::{AnySlot, Slot};
use crate::cell::{Binding, CellRef, Deps};

/// Per-compute-pass cursor over a scope's slots.
///
/// Obtained from [`Scope::compute`](crate::host::Scope::compute); cannot
/// outlive the pass.
pub struct BindContext<'a> {
    slots: &'a mut Vec<Arc<dyn AnySlot>>,
    cursor: usize,
    sealed: bool,
}

impl<'a> BindContext<'a> {
    pub(crate) fn new(slots: &'a mut Vec<Arc<dyn AnySlot>>, sealed: bool) -> Self {
        Self {
            slots,
            cursor: 0,
            sealed,
        }
    }

    /// Bind the next cell in call-site order.
    ///
    /// On the first compute pass this creates the slot; on every later pass
    /// it returns the existing one and applies the binding per its mode.
    ///
    /// # Panics
    ///
    /// Panics if this pass binds more cells than the first pass established,
    /// or rebinds a slot with a different mode or value type.
    pub fn bind<T>(&mut self, binding: Binding<T>) -> CellRef<T>
    where
        T: Clone + Send + 'static,
    {
        let index = self.cursor;
        self.cursor += 1;
        let mode = binding.mode();

        let slot: Arc<Slot<T>> = if index == self.slots.len() {
            if self.sealed {
                panic!("slot {index}: more cells bound than the first compute pass established");
            }
            let slot = Slot::new(mode);
            tracing::trace!(cell = slot.id(), ?mode, "cell slot created");
            self.slots.push(slot.clone() as Arc<dyn AnySlot>);
            slot
        } else {
            let existing = &self.slots[index];
            if existing.mode() != mode {
                panic!(
                    "slot {index}: rebound as {:?}, created as {:?}",
                    mode,
                    existing.mode()
                );
            }
            Arc::clone(existing)
                .as_any_arc()
                .downcast::<Slot<T>>()
                .unwrap_or_else(|_| {
                    panic!(
                        "slot {index}: rebound with value type {}, created with a different type",
                        type_name::<T>()
                    )
                })
        };

        match binding {
            Binding::Value(value) => slot.put_value(value),
            Binding::Build { mut builder, deps } => slot.rebuild_eager(&mut *builder, deps),
            Binding::Managed {
                builder,
                cleanup,
                deps,
            } => slot.stage_deferred(builder, cleanup, deps),
        }

        CellRef::new(slot)
    }

    /// Passthrough shape: `bind(value)`.
    pub fn bind_value<T>(&mut self, value: T) -> CellRef<T>
    where
        T: Clone + Send + 'static,
    {
        self.bind(Binding::value(value))
    }

    /// Eager shape: `bind(builder, deps)`.
    pub fn bind_with<T, F>(&mut self, builder: F, deps: Deps) -> CellRef<T>
    where
        T: Clone + Send + 'static,
        F: FnMut() -> T + Send + 'static,
    {
        self.bind(Binding::build(builder, deps))
    }

    /// Deferred shape: `bind(builder, cleanup, deps)`.
    pub fn bind_managed<T, F, C>(&mut self, builder: F, cleanup: C, deps: Deps) -> CellRef<T>
    where
        T: Clone + Send + 'static,
        F: FnMut() -> T + Send + 'static,
        C: FnMut(T) + Send + 'static,
    {
        self.bind(Binding::managed(builder, cleanup, deps))
    }

    /// End-of-pass check: a sealed table must have been walked in full.
    pub(crate) fn finish(self) {
        if self.sealed && self.cursor != self.slots.len() {
            panic!(
                "compute pass bound {} cells but the scope has {}",
                self.cursor,
                self.slots.len()
            );
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
