//! Runtime type definitions for shared ownership and type-erased instances.
//!
//! The engine is unconditionally thread-safe: a [`Session`](crate::Session)
//! may be resolved from several threads at once, so shared ownership is
//! always [`Arc`] and interior mutability is always [`RwLock`].
//!
//! # Type Aliases
//!
//! - [`Shared<T>`]: smart pointer for shared ownership
//! - [`Store<T>`]: container providing interior mutability
//! - [`Object`]: a type-erased, shareable instance produced by resolution
//!
//! # Examples
//!
//! ```
//! use bindery::runtime::{Shared, Store};
//!
//! let value = Store::new(42);
//! let shared = Shared::new(value);
//! assert_eq!(*shared.read().unwrap(), 42);
//! ```

use std::any::Any;
use std::sync::{Arc, RwLock};

/// Type alias for shared ownership of data.
pub type Shared<T> = Arc<T>;

/// Type alias for interior mutability with reader/writer locking.
pub type Store<T> = RwLock<T>;

/// A type-erased instance as produced and consumed by the resolution engine.
///
/// Everything the engine builds, caches, or hands to listeners travels as an
/// `Object`; callers recover the concrete type with
/// [`Session::resolve`](crate::Session::resolve) or a manual downcast.
///
/// # Examples
///
/// ```
/// use bindery::runtime::{Object, Shared};
///
/// let obj: Object = Shared::new(7u32);
/// assert_eq!(*obj.downcast::<u32>().unwrap(), 7);
/// ```
pub type Object = Shared<dyn Any + Send + Sync>;
