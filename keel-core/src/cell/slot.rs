//! Slot Implementation
//!
//! A Slot is the identity-stable storage behind a cell handle. The host's
//! scope hands out the same slot for a given call site on every compute
//! pass, so handle identity is stable while the contents are rebuilt.
//!
//! # Lifecycle
//!
//! Every slot moves through a tagged state machine:
//!
//! 1. `Uninitialized`: no value has ever been committed. Reads fail.
//!
//! 2. `Building`: a deferred rebuild surrendered the prior value to its
//!    cleanup but the replacement is not installed yet. Reads fail as
//!    uninitialized; the slot genuinely holds nothing at that instant.
//!
//! 3. `Ready`: reads return the value, writes replace it.
//!
//! 4. `Disposed`: terminal. Entered at scope teardown; reads and writes fail
//!    permanently and no further builds occur.
//!
//! # Phase Rules
//!
//! Passthrough and eager slots mutate during the compute phase. Deferred
//! slots only record a pending build during compute; the builder and cleanup
//! run when the scope commits. Compute may re-enter any number of times
//! before a commit, and each pass replaces the pending record wholesale, so
//! superseded passes leave no trace and commit always dispatches to the most
//! recently staged closures.
//!
//! # Locking
//!
//! The slot core sits behind a `parking_lot` mutex so handles can cross
//! threads, but the lock is never held while a builder or cleanup closure
//! runs. The host is cooperative and single-threaded; the mutex is not a
//! synchronization protocol.

use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::binding::{BindMode, Builder, Cleanup};
use super::deps::{deps_unchanged, Deps};
use super::error::AccessError;

/// Counter for generating unique slot IDs.
static SLOT_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a new unique slot ID.
fn next_slot_id() -> u64 {
    SLOT_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Lifecycle tag plus payload. A tagged state instead of a sentinel value,
/// so no payload can collide with "absent".
pub(crate) enum Stage<T> {
    Uninitialized,
    Building,
    Ready(T),
    Disposed,
}

/// Pending record for a deferred slot: the latest staged builder and the
/// dependency sequence it was staged with. Consumed by commit.
struct Pending<T> {
    builder: Builder<T>,
    deps: Deps,
}

/// Mutable core of a slot.
struct CellCore<T> {
    stage: Stage<T>,
    prev_deps: Option<Deps>,
    pending: Option<Pending<T>>,
    cleanup: Option<Cleanup<T>>,
}

/// Identity-stable storage for one call site.
pub(crate) struct Slot<T> {
    id: u64,
    mode: BindMode,
    core: Mutex<CellCore<T>>,
}

impl<T> Slot<T> {
    pub(crate) fn new(mode: BindMode) -> Arc<Self> {
        Arc::new(Self {
            id: next_slot_id(),
            mode,
            core: Mutex::new(CellCore {
                stage: Stage::Uninitialized,
                prev_deps: None,
                pending: None,
                cleanup: None,
            }),
        })
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn mode(&self) -> BindMode {
        self.mode
    }

    /// Guarded read: `Ready` yields a clone of the value, anything else is an
    /// access error.
    pub(crate) fn read(&self) -> Result<T, AccessError>
    where
        T: Clone,
    {
        match &self.core.lock().stage {
            Stage::Ready(value) => Ok(value.clone()),
            Stage::Uninitialized | Stage::Building => Err(AccessError::Uninitialized),
            Stage::Disposed => Err(AccessError::Disposed),
        }
    }

    /// Guarded write, same lifecycle gate as reads. Writing into an unbuilt
    /// deferred cell would fabricate a value the first commit would clobber,
    /// so only `Ready` accepts the write.
    pub(crate) fn write(&self, value: T) -> Result<(), AccessError> {
        let mut core = self.core.lock();
        match core.stage {
            Stage::Ready(_) => {
                core.stage = Stage::Ready(value);
                Ok(())
            }
            Stage::Uninitialized | Stage::Building => Err(AccessError::Uninitialized),
            Stage::Disposed => Err(AccessError::Disposed),
        }
    }

    pub(crate) fn is_initialized(&self) -> bool {
        matches!(self.core.lock().stage, Stage::Ready(_))
    }

    /// Passthrough: overwrite unconditionally, no comparison, no cleanup.
    pub(crate) fn put_value(&self, value: T) {
        self.core.lock().stage = Stage::Ready(value);
    }

    /// Eager rebuild, run during compute. The builder runs only when the
    /// slot is unbuilt or the dependency sequence changed; the old value
    /// stays readable until the replacement is installed.
    pub(crate) fn rebuild_eager(&self, builder: &mut dyn FnMut() -> T, deps: Deps) {
        let needs_build = {
            let core = self.core.lock();
            !matches!(core.stage, Stage::Ready(_))
                || !deps_unchanged(core.prev_deps.as_ref(), &deps)
        };

        if needs_build {
            let value = builder();
            tracing::trace!(cell = self.id, "eager rebuild");
            let mut core = self.core.lock();
            core.stage = Stage::Ready(value);
            core.prev_deps = Some(deps);
        } else {
            self.core.lock().prev_deps = Some(deps);
        }
    }

    /// Deferred staging, run during compute. Records the latest builder,
    /// cleanup, and dependency sequence; invokes nothing. Each pass replaces
    /// the previous record wholesale.
    pub(crate) fn stage_deferred(&self, builder: Builder<T>, cleanup: Cleanup<T>, deps: Deps) {
        let mut core = self.core.lock();
        core.pending = Some(Pending { builder, deps });
        core.cleanup = Some(cleanup);
        tracing::trace!(cell = self.id, "deferred build staged");
    }

    /// Commit phase for a deferred slot: consume the pending record and, if
    /// the slot is unbuilt or its deps changed, run cleanup-of-old then
    /// build-of-new, in that order, outside the lock. Returns true when a
    /// rebuild was committed.
    pub(crate) fn flush_pending(&self) -> bool {
        let (mut builder, deps, prior, mut cleanup) = {
            let mut core = self.core.lock();
            let Some(pending) = core.pending.take() else {
                return false;
            };
            let unchanged = matches!(core.stage, Stage::Ready(_))
                && deps_unchanged(core.prev_deps.as_ref(), &pending.deps);
            if unchanged {
                // Only the committed cycle's sequence is acted upon.
                core.prev_deps = Some(pending.deps);
                return false;
            }
            let prior = match std::mem::replace(&mut core.stage, Stage::Building) {
                Stage::Ready(value) => Some(value),
                _ => None,
            };
            (pending.builder, pending.deps, prior, core.cleanup.take())
        };

        if let Some(old) = prior {
            if let Some(cb) = cleanup.as_mut() {
                tracing::trace!(cell = self.id, "cleanup before rebuild");
                cb(old);
            }
        }

        // A builder panic leaves the slot in `Building`: the prior value is
        // already gone, so later reads fail uninitialized rather than
        // exposing a half-built state.
        let value = builder();

        let mut core = self.core.lock();
        core.stage = Stage::Ready(value);
        core.prev_deps = Some(deps);
        core.cleanup = cleanup;
        tracing::debug!(cell = self.id, "deferred rebuild committed");
        true
    }

    /// Teardown: flip to `Disposed` and run cleanup on the current value, at
    /// most once. The `Disposed` tag guards re-entry, so calling this twice
    /// is a no-op.
    pub(crate) fn dispose(&self) {
        let (prior, mut cleanup) = {
            let mut core = self.core.lock();
            if matches!(core.stage, Stage::Disposed) {
                return;
            }
            let prior = match std::mem::replace(&mut core.stage, Stage::Disposed) {
                Stage::Ready(value) => Some(value),
                _ => None,
            };
            core.pending = None;
            (prior, core.cleanup.take())
        };

        if let Some(old) = prior {
            if let Some(cb) = cleanup.as_mut() {
                tracing::trace!(cell = self.id, "cleanup at teardown");
                cb(old);
            }
        }
        tracing::debug!(cell = self.id, "cell disposed");
    }
}

/// Type-erased view of a slot, used by the scope's ordered slot table for
/// commit and teardown.
pub(crate) trait AnySlot: Send + Sync {
    fn id(&self) -> u64;
    fn mode(&self) -> BindMode;
    fn flush_pending(&self) -> bool;
    fn dispose(&self);
    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T> AnySlot for Slot<T>
where
    T: Send + 'static,
{
    fn id(&self) -> u64 {
        Slot::id(self)
    }

    fn mode(&self) -> BindMode {
        Slot::mode(self)
    }

    fn flush_pending(&self) -> bool {
        Slot::flush_pending(self)
    }

    fn dispose(&self) {
        Slot::dispose(self)
    }

    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
