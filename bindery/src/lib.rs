//! # Bindery - Binding registry and resolution sessions
//!
//! A dependency injection engine split into two halves: an append-only
//! [`BindingRegistry`] where bootstrap code declares *how* types are built,
//! and an immutable [`Session`] that turns those declarations into a wired
//! object graph on demand.
//!
//! ## Features
//!
//! - **Four binding forms**: class delegation, fixed instances, cached
//!   singletons (lazy or eager), and user provider functions
//! - **Last wins**: re-binding a key overrides earlier layers deterministically
//! - **Default construction**: unbound types are built through a pluggable
//!   introspection capability, parameters resolved in declared order
//! - **Cycle detection**: re-entrant requests fail with the full chain
//! - **Exactly-once singletons**: concurrent first requests for one key run
//!   one build; all callers share the instance
//! - **Session discovery**: already-built objects can locate their owning
//!   session for deferred injection points
//!
//! ## Basic Usage
//!
//! ```rust
//! use bindery::introspect::{arg, ConstructorParam, ConstructorRegistry};
//! use bindery::{BindingRegistry, Shared, TypeKey};
//!
//! struct Logger;
//!
//! struct Greeter {
//!     logger: Shared<Logger>,
//! }
//!
//! // Describe constructors to the introspector...
//! let mut ctors = ConstructorRegistry::new();
//! ctors.register::<Logger, _>(vec![], |_| Ok(Logger)).unwrap();
//! ctors
//!     .register::<Greeter, _>(
//!         vec![ConstructorParam::new("logger", TypeKey::of::<Logger>())],
//!         |args| Ok(Greeter { logger: arg::<Logger>(&args, 0)? }),
//!     )
//!     .unwrap();
//!
//! // ...declare construction policy...
//! let mut registry = BindingRegistry::with_introspector(Shared::new(ctors));
//! registry.bind::<Logger>().to_singleton();
//!
//! // ...and resolve against the finalized session.
//! let session = registry.new_session().unwrap();
//! let a = session.resolve::<Greeter>().unwrap();
//! let b = session.resolve::<Greeter>().unwrap();
//! assert!(Shared::ptr_eq(&a.logger, &b.logger));
//! ```
//!
//! ## Lifetimes
//!
//! A registry is a plain owned value: build it, layer overrides onto it,
//! then consume it with [`BindingRegistry::new_session`]. The session lives
//! for the scope of the application; singletons it caches live with it, while
//! non-singleton results are owned by whoever holds the returned reference.
//!
//! ## Thread Safety
//!
//! [`Session::resolve`] may be called concurrently. The singleton cache is
//! the only shared mutable state and guarantees at-most-one construction per
//! key; everything else in the session is immutable after creation.

pub mod binding;
pub mod discovery;
pub mod error;
pub mod introspect;
pub mod key;
pub mod listener;
mod macros;
pub mod overrides;
pub mod registry;
pub mod resolve_guard;
pub mod runtime;
pub mod session;

pub use binding::*;
pub use discovery::*;
pub use error::*;
pub use key::*;
pub use listener::*;
pub use overrides::*;
pub use registry::*;
pub use resolve_guard::*;
pub use runtime::*;
pub use session::*;
