//! Bindings
//!
//! A `Binding` is what a call site hands the host each compute pass: one of
//! the three recognized call shapes. The shape is resolved to a mode once,
//! when the slot is created; rebinding a slot with a different mode later is
//! a host-contract violation, not a supported transition.

use super::deps::Deps;

/// Builder closure producing the cell's value.
pub type Builder<T> = Box<dyn FnMut() -> T + Send>;

/// Cleanup closure receiving the value being replaced or discarded.
pub type Cleanup<T> = Box<dyn FnMut(T) + Send>;

/// Operating mode of a slot, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindMode {
    /// No dependencies: the supplied value overwrites the cell every cycle.
    Passthrough,

    /// Dependency-gated builder, run synchronously during compute. The
    /// builder must be idempotent: compute may re-enter without committing.
    Eager,

    /// Dependency-gated builder plus cleanup, run only during commit.
    Deferred,
}

/// One call shape for [`bind`](crate::host::BindContext::bind).
///
/// The passthrough shape treats its argument as a concrete value even when
/// that value is callable.
pub enum Binding<T> {
    /// `bind(value)`
    Value(T),

    /// `bind(builder, deps)`
    Build { builder: Builder<T>, deps: Deps },

    /// `bind(builder, cleanup, deps)`
    Managed {
        builder: Builder<T>,
        cleanup: Cleanup<T>,
        deps: Deps,
    },
}

impl<T> Binding<T> {
    /// Passthrough shape.
    pub fn value(value: T) -> Self {
        Binding::Value(value)
    }

    /// Eager-rebuild shape.
    pub fn build<F>(builder: F, deps: Deps) -> Self
    where
        F: FnMut() -> T + Send + 'static,
    {
        Binding::Build {
            builder: Box::new(builder),
            deps,
        }
    }

    /// Deferred-rebuild-with-cleanup shape.
    pub fn managed<F, C>(builder: F, cleanup: C, deps: Deps) -> Self
    where
        F: FnMut() -> T + Send + 'static,
        C: FnMut(T) + Send + 'static,
    {
        Binding::Managed {
            builder: Box::new(builder),
            cleanup: Box::new(cleanup),
            deps,
        }
    }

    /// The mode this shape resolves to.
    pub fn mode(&self) -> BindMode {
        match self {
            Binding::Value(_) => BindMode::Passthrough,
            Binding::Build { .. } => BindMode::Eager,
            Binding::Managed { .. } => BindMode::Deferred,
        }
    }
}
