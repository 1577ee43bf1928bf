//! Reference Cells
//!
//! This module implements the stable reference cell: storage whose identity
//! survives recompute cycles while its contents are rebuilt only when an
//! associated dependency sequence changes.
//!
//! # Concepts
//!
//! ## Bindings
//!
//! A `Binding` describes what a call site wants from its cell this cycle.
//! There are three shapes: a plain value (overwritten every cycle), a builder
//! gated by dependencies (run synchronously during compute), and a builder
//! with a cleanup callback (run only during commit, with the cleanup invoked
//! on every value the builder replaces).
//!
//! ## Dependencies
//!
//! Rebuilds are gated by shallow, order-sensitive comparison of opaque `Dep`
//! values. Comparison is one level deep: either `PartialEq` on the supplied
//! value or pointer identity of a shared allocation. Nested mutation behind a
//! dependency is invisible; that is a documented limitation, not a bug.
//!
//! ## Lifecycle
//!
//! Each cell moves through `Uninitialized -> Building -> Ready -> Disposed`.
//! Reads and writes are checked against the current state on every access:
//! touching a cell before its first commit or after teardown is an
//! `AccessError`, never a silent default.

mod binding;
mod deps;
mod error;
mod handle;
pub(crate) mod slot;

pub use binding::{BindMode, Binding, Builder, Cleanup};
pub use deps::{deps_unchanged, Dep, Deps};
pub use error::AccessError;
pub use handle::CellRef;
