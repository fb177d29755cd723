//! Thread-local stack guard for cyclic dependency detection.
//!
//! This module provides [`ResolveGuard`], a utility for tracking the chain of
//! type keys being resolved during a resolution call. It uses a thread-local
//! stack to detect and report cycles, returning the full ordered chain when
//! one is found.
//!
//! The guard pops on `Drop`, so the stack unwinds correctly on every exit
//! path; a resolution that fails deep in the graph never poisons a later,
//! independent `resolve` call. Resolution is synchronous all the way down,
//! which is what makes a thread-local stack equivalent to a per-call stack.
//!
//! # Example
//! ```
//! use bindery::{ErrorKind, ResolveGuard, TypeKey};
//!
//! struct A;
//! struct B;
//!
//! // Push a key onto the stack
//! let _g1 = ResolveGuard::push(TypeKey::of::<A>()).unwrap();
//! // Pushing a different key is fine
//! let _g2 = ResolveGuard::push(TypeKey::of::<B>()).unwrap();
//! // Pushing the same key again triggers a cyclic dependency error
//! let err = ResolveGuard::push(TypeKey::of::<A>()).unwrap_err();
//! assert!(matches!(err.kind, ErrorKind::CyclicDependency));
//! ```

use std::cell::RefCell;

use crate::error::Error;
use crate::key::TypeKey;

thread_local! {
    // Stack of type keys being resolved on this thread. Keys carry their
    // diagnostic names, so the chain can be reported without lookups.
    static RESOLVE_STACK: RefCell<Vec<TypeKey>> = const { RefCell::new(Vec::new()) };
}

/// Guard that pops the last pushed type key from the thread-local stack on
/// drop.
///
/// Used to track the current resolution chain for cycle detection.
#[cfg_attr(feature = "debug", derive(Debug))]
pub struct ResolveGuard {
    pub key: TypeKey,
}

impl ResolveGuard {
    /// Try to push a type key onto the thread-local stack.
    ///
    /// Returns `Err(Error::cyclic_dependency(..))` if the key is already on
    /// the stack, with the chain holding the ordered stack contents followed
    /// by the re-entrant key. Otherwise returns a guard that pops on drop.
    pub fn push(key: TypeKey) -> Result<Self, Error> {
        RESOLVE_STACK.with(|stack| {
            let mut v = stack.borrow_mut();
            if v.contains(&key) {
                let mut chain: Vec<&str> = v.iter().map(|k| k.name()).collect();
                chain.push(key.name());
                return Err(Error::cyclic_dependency(&chain));
            }
            v.push(key);
            Ok(ResolveGuard { key })
        })
    }

    /// Current depth of the resolution chain on this thread.
    pub fn depth() -> usize {
        RESOLVE_STACK.with(|stack| stack.borrow().len())
    }
}

impl Drop for ResolveGuard {
    fn drop(&mut self) {
        RESOLVE_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}
