//! Cooperative Host
//!
//! The host drives cells through their phases. A `Scope` owns the ordered
//! slot table for one mounted call-site tree; a `BindContext` is the cursor
//! handed to the compute closure, dealing out identity-stable slots by
//! position.
//!
//! # Phase Discipline
//!
//! - `compute` may run any number of times before a commit. Deferred cells
//!   stage work; they never execute it here.
//! - `commit` runs at most once per committed cycle and flushes deferred
//!   cells in binding order.
//! - `teardown` runs at most once and disposes every slot in binding order.
//!   Dropping a scope without calling it behaves identically.
//!
//! # Call-Site Contract
//!
//! The first compute pass establishes the slot table. Every later pass must
//! bind the same number of cells, in the same order, with the same modes and
//! value types. Violations are programming errors and panic with the slot
//! index; they are not recoverable access errors.

mod context;
mod scope;

pub use context::BindContext;
pub use scope::Scope;
