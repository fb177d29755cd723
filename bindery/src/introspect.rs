//! Type-introspection capability consumed by default construction.
//!
//! The engine never inspects types itself. When a requested key has no
//! binding, it asks a [`TypeIntrospector`] for the type's primary constructor
//! signature, resolves each parameter in declared order, and hands the
//! arguments back for invocation.
//!
//! [`ConstructorRegistry`] is the in-crate implementation: an explicit map of
//! constructor descriptors, registered by bootstrap code. It enforces the
//! one-primary-constructor policy: a second registration for the same key is
//! refused rather than guessed between.
//!
//! # Examples
//!
//! ```
//! use bindery::introspect::{arg, ConstructorParam, ConstructorRegistry};
//! use bindery::{Shared, TypeKey};
//!
//! struct Logger;
//! struct Service { logger: Shared<Logger> }
//!
//! let mut ctors = ConstructorRegistry::new();
//! ctors.register::<Logger, _>(vec![], |_| Ok(Logger)).unwrap();
//! ctors
//!     .register::<Service, _>(
//!         vec![ConstructorParam::new("logger", TypeKey::of::<Logger>())],
//!         |args| Ok(Service { logger: arg::<Logger>(&args, 0)? }),
//!     )
//!     .unwrap();
//! ```

use std::collections::HashMap;

use crate::error::Error;
use crate::key::TypeKey;
use crate::runtime::{Object, Shared};

#[cfg(feature = "tracing")]
use tracing::trace;

/// One declared constructor parameter: a name for diagnostics and the key to
/// resolve for it.
#[derive(Clone, Copy)]
#[cfg_attr(feature = "debug", derive(Debug))]
pub struct ConstructorParam {
    pub name: &'static str,
    pub key: TypeKey,
}

impl ConstructorParam {
    pub fn new(name: &'static str, key: TypeKey) -> Self {
        Self { name, key }
    }
}

/// Reflection stand-in consumed by the resolution engine.
///
/// Both operations fail with
/// [`ErrorKind::UnresolvableType`](crate::ErrorKind::UnresolvableType) when
/// the key has no known constructor.
pub trait TypeIntrospector: Send + Sync {
    /// The primary constructor's parameter list, in declared order.
    fn describe_constructor(&self, key: TypeKey) -> Result<Vec<ConstructorParam>, Error>;

    /// Invoke the primary constructor with arguments in declared order.
    ///
    /// `args.len()` always equals the length of the described parameter
    /// list; the engine resolves every parameter before invoking.
    fn construct(&self, key: TypeKey, args: Vec<Object>) -> Result<Object, Error>;
}

/// Type-erased constructor body stored by [`ConstructorRegistry`].
pub type BuildFn = Box<dyn Fn(Vec<Object>) -> Result<Object, Error> + Send + Sync>;

struct ConstructorEntry {
    params: Vec<ConstructorParam>,
    build: BuildFn,
}

/// Explicit constructor registry: the [`TypeIntrospector`] used where no
/// reflection facility exists.
///
/// Exactly one primary constructor per key; registering a second fails with
/// [`ErrorKind::AmbiguousConstructor`](crate::ErrorKind::AmbiguousConstructor).
#[derive(Default)]
pub struct ConstructorRegistry {
    entries: HashMap<TypeKey, ConstructorEntry>,
}

impl ConstructorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the primary constructor for `T`.
    ///
    /// `build` receives the resolved arguments in declared parameter order.
    pub fn register<T, F>(&mut self, params: Vec<ConstructorParam>, build: F) -> Result<(), Error>
    where
        T: Send + Sync + 'static,
        F: Fn(Vec<Object>) -> Result<T, Error> + Send + Sync + 'static,
    {
        self.register_raw(
            TypeKey::of::<T>(),
            params,
            Box::new(move |args| Ok(Shared::new(build(args)?) as Object)),
        )
    }

    /// Register a pre-erased constructor under an explicit key.
    ///
    /// Used when the constructed value is already shared (for example a
    /// trait-object key whose builder returns `Shared<dyn Trait>` wrapped as
    /// an [`Object`]).
    pub fn register_raw(
        &mut self,
        key: TypeKey,
        params: Vec<ConstructorParam>,
        build: BuildFn,
    ) -> Result<(), Error> {
        if self.entries.contains_key(&key) {
            return Err(Error::ambiguous_constructor(key.name()));
        }

        #[cfg(feature = "tracing")]
        trace!(
            "Registered primary constructor for {} ({} parameters)",
            key,
            params.len()
        );

        self.entries.insert(key, ConstructorEntry { params, build });
        Ok(())
    }

    /// Whether a primary constructor is known for `key`.
    pub fn knows(&self, key: TypeKey) -> bool {
        self.entries.contains_key(&key)
    }
}

impl TypeIntrospector for ConstructorRegistry {
    fn describe_constructor(&self, key: TypeKey) -> Result<Vec<ConstructorParam>, Error> {
        self.entries
            .get(&key)
            .map(|entry| entry.params.clone())
            .ok_or_else(|| Error::unresolvable_type(key.name()))
    }

    fn construct(&self, key: TypeKey, args: Vec<Object>) -> Result<Object, Error> {
        let entry = self
            .entries
            .get(&key)
            .ok_or_else(|| Error::unresolvable_type(key.name()))?;

        (entry.build)(args)
    }
}

/// An introspector that knows no types at all.
///
/// Every unbound request resolved against it fails with
/// `UnresolvableType`, which makes a registry built without an explicit
/// introspector purely binding-driven.
pub struct NullIntrospector;

impl TypeIntrospector for NullIntrospector {
    fn describe_constructor(&self, key: TypeKey) -> Result<Vec<ConstructorParam>, Error> {
        Err(Error::unresolvable_type(key.name()))
    }

    fn construct(&self, key: TypeKey, _args: Vec<Object>) -> Result<Object, Error> {
        Err(Error::unresolvable_type(key.name()))
    }
}

/// Downcast the `index`-th constructor argument to `T`.
pub fn arg<T: Send + Sync + 'static>(args: &[Object], index: usize) -> Result<Shared<T>, Error> {
    args.get(index)
        .ok_or_else(|| Error::type_mismatch(std::any::type_name::<T>()))?
        .clone()
        .downcast::<T>()
        .map_err(|_| Error::type_mismatch(std::any::type_name::<T>()))
}
