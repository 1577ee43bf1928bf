//! Scope Implementation
//!
//! A Scope owns the slot table for one mounted call-site tree and drives the
//! three phases: compute (stage), commit (flush deferred work, in binding
//! order), and teardown (dispose every slot, in binding order, exactly
//! once). Dropping a scope tears it down, so cleanup survives early returns
//! and panics in the host.

use std::fmt::Debug;
use std::sync::Arc;

use crate::cell::slot::AnySlot;
use crate::host::BindContext;

/// Owner of the ordered slot table for one call-site tree.
pub struct Scope {
    slots: Vec<Arc<dyn AnySlot>>,
    sealed: bool,
    torn_down: bool,
}

impl Scope {
    /// An empty scope; the first compute pass establishes its slot table.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            sealed: false,
            torn_down: false,
        }
    }

    /// Run one compute pass.
    ///
    /// May be called repeatedly before a commit; deferred cells stage work
    /// without executing it, and each pass replaces the previous staging
    /// wholesale. Returns the closure's output.
    pub fn compute<R>(&mut self, f: impl FnOnce(&mut BindContext<'_>) -> R) -> R {
        let sealed = self.sealed;
        let mut cx = BindContext::new(&mut self.slots, sealed);
        let out = f(&mut cx);
        cx.finish();
        self.sealed = true;
        out
    }

    /// Run the commit phase: flush each deferred cell's pending record, in
    /// binding order. Cells with nothing staged are untouched.
    pub fn commit(&mut self) {
        let mut flushed = 0usize;
        for slot in &self.slots {
            if slot.flush_pending() {
                flushed += 1;
            }
        }
        if flushed > 0 {
            tracing::debug!(slots = self.slots.len(), flushed, "scope committed");
        }
    }

    /// One full logical cycle: compute, then commit. Returns the compute
    /// closure's output.
    pub fn cycle<R>(&mut self, f: impl FnOnce(&mut BindContext<'_>) -> R) -> R {
        let out = self.compute(f);
        self.commit();
        out
    }

    /// Permanently unmount the scope, disposing every slot in binding order.
    /// Outstanding cell handles remain valid but fail all further access.
    pub fn teardown(mut self) {
        self.dispose_all();
    }

    /// Number of slots in the table.
    pub fn cell_count(&self) -> usize {
        self.slots.len()
    }

    fn dispose_all(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        for slot in &self.slots {
            slot.dispose();
        }
        tracing::debug!(slots = self.slots.len(), "scope torn down");
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        self.dispose_all();
    }
}

impl Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("cell_count", &self.cell_count())
            .field("sealed", &self.sealed)
            .field("torn_down", &self.torn_down)
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::AccessError;
    use crate::deps;
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Mutex;

    #[test]
    fn compute_without_commit_stages_nothing() {
        let mut scope = Scope::new();
        let builds = Arc::new(AtomicI32::new(0));

        // Three compute passes, no commit: the deferred builder never runs.
        let mut cell = None;
        for _ in 0..3 {
            let builds_clone = builds.clone();
            cell = Some(scope.compute(|cx| {
                cx.bind_managed(
                    move || {
                        builds_clone.fetch_add(1, Ordering::SeqCst);
                        1
                    },
                    |_old| {},
                    deps![],
                )
            }));
        }
        assert_eq!(builds.load(Ordering::SeqCst), 0);
        assert_eq!(cell.unwrap().get(), Err(AccessError::Uninitialized));

        scope.commit();
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn commit_processes_cells_in_binding_order() {
        let mut scope = Scope::new();
        let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

        let first = order.clone();
        let second = order.clone();
        scope.cycle(|cx| {
            cx.bind_managed(
                move || first.lock().unwrap().push("first"),
                |_old| {},
                deps![],
            );
            cx.bind_managed(
                move || second.lock().unwrap().push("second"),
                |_old| {},
                deps![],
            );
        });

        assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn teardown_disposes_in_binding_order() {
        let mut scope = Scope::new();
        let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

        let first = order.clone();
        let second = order.clone();
        scope.cycle(|cx| {
            cx.bind_managed(
                || 1,
                move |_old| first.lock().unwrap().push("first"),
                deps![],
            );
            cx.bind_managed(
                || 2,
                move |_old| second.lock().unwrap().push("second"),
                deps![],
            );
        });

        scope.teardown();
        assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn dropping_a_scope_is_teardown() {
        let cleanups = Arc::new(AtomicI32::new(0));
        let cell = {
            let mut scope = Scope::new();
            let cleanups_clone = cleanups.clone();
            scope.cycle(|cx| {
                cx.bind_managed(
                    || 5,
                    move |_old| {
                        cleanups_clone.fetch_add(1, Ordering::SeqCst);
                    },
                    deps![],
                )
            })
            // Scope dropped here without an explicit teardown.
        };
        assert_eq!(cleanups.load(Ordering::SeqCst), 1);
        assert_eq!(cell.get(), Err(AccessError::Disposed));
    }

    #[test]
    fn commit_on_empty_scope_is_noop() {
        let mut scope = Scope::new();
        scope.commit();
        assert_eq!(scope.cell_count(), 0);
    }

    #[test]
    fn noop_commit_emits_no_debug_event() {
        use std::sync::atomic::AtomicUsize;
        use tracing::span;

        struct DebugCounter {
            commits: Arc<AtomicUsize>,
        }

        impl tracing::Subscriber for DebugCounter {
            fn enabled(&self, _metadata: &tracing::Metadata<'_>) -> bool {
                true
            }
            fn new_span(&self, _span: &span::Attributes<'_>) -> span::Id {
                span::Id::from_u64(1)
            }
            fn record(&self, _span: &span::Id, _values: &span::Record<'_>) {}
            fn record_follows_from(&self, _span: &span::Id, _follows: &span::Id) {}
            fn event(&self, event: &tracing::Event<'_>) {
                let meta = event.metadata();
                if meta.level() == &tracing::Level::DEBUG
                    && meta.target() == "keel_core::host::scope"
                {
                    self.commits.fetch_add(1, Ordering::SeqCst);
                }
            }
            fn enter(&self, _span: &span::Id) {}
            fn exit(&self, _span: &span::Id) {}
        }

        let commits = Arc::new(AtomicUsize::new(0));
        let subscriber = DebugCounter {
            commits: commits.clone(),
        };

        tracing::subscriber::with_default(subscriber, || {
            let mut scope = Scope::new();

            // Nothing staged: no commit event.
            scope.commit();
            assert_eq!(commits.load(Ordering::SeqCst), 0);

            let run = |scope: &mut Scope| {
                scope.cycle(|cx| cx.bind_managed(|| 1, |_old| {}, deps![]));
            };

            // First cycle flushes a rebuild and reports it.
            run(&mut scope);
            assert_eq!(commits.load(Ordering::SeqCst), 1);

            // Same deps: the commit flushes nothing and stays silent.
            run(&mut scope);
            assert_eq!(commits.load(Ordering::SeqCst), 1);

            scope.teardown();
        });
    }

    #[test]
    fn passthrough_and_eager_cells_dispose_too() {
        let mut scope = Scope::new();
        let (a, b) = scope.cycle(|cx| (cx.bind_value(1), cx.bind_with(|| 2, deps![])));
        assert_eq!(a.get(), Ok(1));
        assert_eq!(b.get(), Ok(2));

        scope.teardown();
        assert_eq!(a.get(), Err(AccessError::Disposed));
        assert_eq!(b.get(), Err(AccessError::Disposed));
    }
}
