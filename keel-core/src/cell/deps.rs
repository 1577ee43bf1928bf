//! Dependency Comparison
//!
//! Rebuild decisions are gated by comparing the dependency sequence supplied
//! this cycle against the one recorded at the last build.
//!
//! # Comparison Rules
//!
//! 1. An absent previous sequence (first cycle) never equals a present one.
//!
//! 2. Sequences of different lengths are never equal.
//!
//! 3. Otherwise, sequences are compared pairwise in order. Each pair is
//!    compared one level deep: `PartialEq` for value deps, allocation
//!    address for token deps. There is no deep comparison.
//!
//! 4. Deps of different dynamic types (or different kinds) are never equal.
//!
//! The comparator only gates rebuilds. Cell creation never consults it.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

/// Ordered dependency sequence. Sequences are short in practice, so a few
/// entries live inline.
pub type Deps = SmallVec<[Dep; 4]>;

/// Build a [`Deps`] sequence from value dependencies.
///
/// ```rust,ignore
/// let d = deps![user_id, page, query.clone()];
/// ```
#[macro_export]
macro_rules! deps {
    ($($dep:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut seq = $crate::cell::Deps::new();
        $(seq.push($crate::cell::Dep::value($dep));)*
        seq
    }};
}

/// Object-safe shallow equality over type-erased values.
trait DynEq: Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn dyn_eq(&self, other: &dyn DynEq) -> bool;
}

impl<T> DynEq for T
where
    T: PartialEq + Send + Sync + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn DynEq) -> bool {
        match other.as_any().downcast_ref::<T>() {
            Some(other) => self == other,
            None => false,
        }
    }
}

#[derive(Clone)]
enum DepRepr {
    /// Compared by `PartialEq` on the erased value.
    Value(Arc<dyn DynEq>),

    /// Compared by allocation address; the Arc keeps the allocation alive so
    /// the address cannot be reused while the dep is held.
    Token(Arc<dyn Any + Send + Sync>),
}

/// One opaque dependency in a sequence.
///
/// A `Dep` either wraps a value compared with `PartialEq` or a shared
/// allocation compared by identity. Identity deps mirror reference equality
/// for payloads that have no meaningful `PartialEq`.
#[derive(Clone)]
pub struct Dep(DepRepr);

impl Dep {
    /// A dependency compared by `PartialEq`.
    pub fn value<T>(value: T) -> Self
    where
        T: PartialEq + Send + Sync + 'static,
    {
        Dep(DepRepr::Value(Arc::new(value)))
    }

    /// A dependency compared by allocation identity.
    ///
    /// Two token deps are equal only when they share the same allocation,
    /// regardless of the pointee's contents.
    pub fn token<T>(shared: &Arc<T>) -> Self
    where
        T: Send + Sync + 'static,
    {
        Dep(DepRepr::Token(Arc::clone(shared) as Arc<dyn Any + Send + Sync>))
    }
}

impl PartialEq for Dep {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (DepRepr::Value(a), DepRepr::Value(b)) => a.dyn_eq(b.as_ref()),
            (DepRepr::Token(a), DepRepr::Token(b)) => {
                Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Dep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            DepRepr::Value(_) => f.write_str("Dep::value(..)"),
            DepRepr::Token(t) => write!(f, "Dep::token({:p})", Arc::as_ptr(t)),
        }
    }
}

/// Returns true when the new sequence should NOT trigger a rebuild.
///
/// `prev` is absent on the first cycle; absent vs present is never equal, so
/// the first cycle always builds.
pub fn deps_unchanged(prev: Option<&Deps>, next: &Deps) -> bool {
    match prev {
        None => false,
        Some(prev) => {
            prev.len() == next.len() && prev.iter().zip(next.iter()).all(|(a, b)| a == b)
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_value_sequences_are_unchanged() {
        let prev: Deps = deps![1, "a", 3.5];
        let next: Deps = deps![1, "a", 3.5];
        assert!(deps_unchanged(Some(&prev), &next));
    }

    #[test]
    fn absent_previous_always_changes() {
        let next: Deps = deps![1];
        assert!(!deps_unchanged(None, &next));

        // Even an empty sequence differs from an absent one.
        let empty: Deps = deps![];
        assert!(!deps_unchanged(None, &empty));
    }

    #[test]
    fn empty_sequences_are_unchanged() {
        let prev: Deps = deps![];
        let next: Deps = deps![];
        assert!(deps_unchanged(Some(&prev), &next));
    }

    #[test]
    fn length_mismatch_changes() {
        let prev: Deps = deps![1, 2];
        let next: Deps = deps![1, 2, 3];
        assert!(!deps_unchanged(Some(&prev), &next));
    }

    #[test]
    fn comparison_is_order_sensitive() {
        let prev: Deps = deps![1, 2];
        let next: Deps = deps![2, 1];
        assert!(!deps_unchanged(Some(&prev), &next));
    }

    #[test]
    fn element_change_is_detected() {
        let prev: Deps = deps![1, "a"];
        let next: Deps = deps![1, "b"];
        assert!(!deps_unchanged(Some(&prev), &next));
    }

    #[test]
    fn different_dynamic_types_never_equal() {
        let a = Dep::value(1u32);
        let b = Dep::value(1u64);
        assert_ne!(a, b);
    }

    #[test]
    fn token_deps_compare_by_allocation() {
        let shared = Arc::new(vec![1, 2, 3]);
        let same = Dep::token(&shared);
        let also_same = Dep::token(&shared);
        assert_eq!(same, also_same);

        // Equal contents, different allocation: not equal.
        let other = Arc::new(vec![1, 2, 3]);
        assert_ne!(same, Dep::token(&other));
    }

    #[test]
    fn value_and_token_kinds_never_equal() {
        let shared = Arc::new(7u32);
        assert_ne!(Dep::value(7u32), Dep::token(&shared));
    }
}
