//! Keel Core
//!
//! This crate provides identity-stable reference cells for a phase-based
//! reactive host. It implements:
//!
//! - Reference cells bound to fixed call sites (passthrough, eager rebuild,
//!   deferred rebuild with cleanup)
//! - Shallow, order-sensitive dependency comparison to gate rebuilds
//! - Lifecycle-gated read/write access (no silent defaults)
//! - A minimal cooperative host driving compute, commit, and teardown phases
//!
//! The primitive is designed for a single-threaded cooperative scheduler with
//! distinct "compute" and "commit" phases. The compute phase may run multiple
//! times per logical cycle without committing, so dependency-gated builders
//! are either idempotent (eager mode) or deferred to the commit phase
//! (managed mode).
//!
//! # Architecture
//!
//! The crate is organized into two modules:
//!
//! - `cell`: The reference cell itself: dependency comparison, bindings,
//!   lifecycle state machine, and the public cell handle
//! - `host`: The cooperative scope that owns cells and drives their phases
//!
//! # Example
//!
//! ```rust,ignore
//! use keel_core::deps;
//! use keel_core::host::Scope;
//!
//! let mut scope = Scope::new();
//!
//! // One full cycle: compute then commit.
//! let conn = scope.cycle(|cx| {
//!     cx.bind_managed(
//!         move || open_connection(&endpoint),
//!         |old| old.close(),
//!         deps![endpoint.clone()],
//!     )
//! });
//!
//! // After commit the cell holds the built value.
//! let c = conn.get()?;
//!
//! // Teardown closes the connection exactly once.
//! scope.teardown();
//! ```

pub mod cell;
pub mod host;
