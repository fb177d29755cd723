//! The finalized resolution session and its construction engine.
//!
//! A [`Session`] is the immutable view of a finalized registry plus the live
//! resolution state: the singleton cache and the listener list. It is created
//! once by [`BindingRegistry::new_session`](crate::BindingRegistry::new_session)
//! and lives for the scope of the application; cloning a session is cheap and
//! shares all state.
//!
//! # Resolution algorithm
//!
//! Per frame, against a thread-local cycle stack guarded by RAII:
//!
//! 1. Push the requested key; re-entrancy fails with `CyclicDependency`
//!    carrying the ordered chain.
//! 2. Consult the finalized table: no binding falls through to default
//!    construction; a class binding recurses on its target; an instance
//!    binding returns its value; a provider binding invokes its factory as a
//!    leaf; a singleton binding goes through the per-key cache with a
//!    single-flight build.
//! 3. Default construction asks the introspector for the primary constructor,
//!    resolves every parameter in declared order, invokes the constructor,
//!    and notifies listeners. The result is never cached.
//!
//! # Concurrency
//!
//! `resolve` may be called concurrently from any number of threads. The
//! singleton cache is the only shared mutable state: the map lock is held
//! only while looking up or inserting a per-key cell, never across a build;
//! the cell itself serializes first-time construction so concurrent callers
//! for one key observe exactly one build and the same instance, while
//! different keys never block each other.

use std::collections::HashMap;
use std::sync::Weak;

use once_cell::sync::OnceCell;

use crate::binding::Binding;
use crate::error::Error;
use crate::introspect::TypeIntrospector;
use crate::key::TypeKey;
use crate::listener::SessionListener;
use crate::registry::BindingTable;
use crate::resolve_guard::ResolveGuard;
use crate::runtime::{Object, Shared, Store};

#[cfg(feature = "tracing")]
use tracing::{debug, info, trace};

/// The live resolution context created from a finalized binding table.
pub struct Session {
    inner: Shared<SessionInner>,
}

pub(crate) struct SessionInner {
    table: BindingTable,
    singletons: Store<HashMap<TypeKey, Shared<OnceCell<Object>>>>,
    listeners: Vec<Shared<dyn SessionListener>>,
    introspector: Shared<dyn TypeIntrospector>,
}

impl Clone for Session {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

#[cfg(feature = "debug")]
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("bindings", &self.inner.table.len())
            .field(
                "cached_singletons",
                &self.inner.singletons.read().unwrap().len(),
            )
            .field("listeners", &self.inner.listeners.len())
            .finish()
    }
}

impl Session {
    /// Build a session over a finalized table, then run the eager pass.
    ///
    /// Eager singletons are built in finalized-table order, strictly before
    /// this returns; the first failure propagates and no session is handed
    /// out.
    pub(crate) fn create(
        table: BindingTable,
        listeners: Vec<Shared<dyn SessionListener>>,
        introspector: Shared<dyn TypeIntrospector>,
    ) -> Result<Self, Error> {
        let session = Self {
            inner: Shared::new(SessionInner {
                table,
                singletons: Store::new(HashMap::new()),
                listeners,
                introspector,
            }),
        };

        let eager: Vec<TypeKey> = session
            .inner
            .table
            .entries()
            .iter()
            .filter(|binding| binding.is_eager())
            .map(Binding::from)
            .collect();

        for key in eager {
            #[cfg(feature = "tracing")]
            info!("Eagerly building singleton {}", key);

            session.resolve_key(key)?;
        }

        Ok(session)
    }

    /// Resolve a key into a type-erased instance.
    pub fn resolve_key(&self, key: TypeKey) -> Result<Object, Error> {
        self.resolve_inner(key)
    }

    /// Resolve `T` and downcast the result.
    ///
    /// Fails with `TypeMismatch` when the binding for `T` produced a
    /// different concrete type (for example a class binding retrieved under
    /// its abstract key).
    pub fn resolve<T: Send + Sync + 'static>(&self) -> Result<Shared<T>, Error> {
        self.resolve_key(TypeKey::of::<T>())?
            .downcast::<T>()
            .map_err(|_| Error::type_mismatch(std::any::type_name::<T>()))
    }

    /// Whether the finalized table has a binding for `key`.
    pub fn contains(&self, key: TypeKey) -> bool {
        self.inner.table.contains(key)
    }

    /// A weak, non-owning handle for the discovery bridge.
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            inner: Shared::downgrade(&self.inner),
        }
    }

    fn resolve_inner(&self, key: TypeKey) -> Result<Object, Error> {
        let _guard = ResolveGuard::push(key)?;

        #[cfg(feature = "tracing")]
        trace!("Resolving {}", key);

        match self.inner.table.get(key) {
            None => self.construct_default(key),
            Some(Binding::Class { to, .. }) => {
                let to = *to;
                self.resolve_inner(to)
            }
            Some(Binding::Instance { value, .. }) => Ok(value.clone()),
            Some(Binding::Provider { factory, .. }) => factory(key),
            Some(Binding::Singleton { from, to, .. }) => {
                let (from, to) = (*from, *to);
                self.resolve_singleton(from, to)
            }
        }
    }

    /// Per-key get-or-create with a single-flight build.
    ///
    /// The cache key is always the originally requested `from`: two keys
    /// singleton-bound to the same target get independent instances.
    fn resolve_singleton(&self, from: TypeKey, to: TypeKey) -> Result<Object, Error> {
        let cell = {
            let mut singletons = self.inner.singletons.write().unwrap();
            singletons
                .entry(from)
                .or_insert_with(|| Shared::new(OnceCell::new()))
                .clone()
        };

        // The map lock is released; the cell serializes first-time builds
        // for this key only.
        cell.get_or_try_init(|| {
            #[cfg(feature = "tracing")]
            debug!("Building singleton {} (target {})", from, to);

            if to == from {
                // Self-singleton: re-entering resolve with the same key would
                // trip the cycle guard, so build the type directly.
                self.construct_default(from)
            } else {
                self.resolve_inner(to)
            }
        })
        .map(Object::clone)
    }

    /// No binding matched: build the type through the introspector.
    ///
    /// Parameters are resolved in declared order; the fresh instance is
    /// announced to listeners and never cached.
    fn construct_default(&self, key: TypeKey) -> Result<Object, Error> {
        let params = self.inner.introspector.describe_constructor(key)?;

        let mut args = Vec::with_capacity(params.len());
        for param in &params {
            args.push(self.resolve_inner(param.key)?);
        }

        let instance = self.inner.introspector.construct(key, args)?;

        #[cfg(feature = "tracing")]
        debug!("Constructed {} ({} arguments)", key, params.len());

        self.notify(key, &instance)?;
        Ok(instance)
    }

    fn notify(&self, key: TypeKey, instance: &Object) -> Result<(), Error> {
        for listener in &self.inner.listeners {
            listener.after_injection(key, instance)?;
        }
        Ok(())
    }
}

/// Weak handle recovering a [`Session`] without owning it.
///
/// Held by constructed objects that need deferred lookups; upgrading fails
/// once the session itself has been dropped.
pub struct SessionHandle {
    inner: Weak<SessionInner>,
}

impl Clone for SessionHandle {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl SessionHandle {
    /// The owning session, if it is still alive.
    pub fn upgrade(&self) -> Option<Session> {
        self.inner.upgrade().map(|inner| Session { inner })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspect::{arg, ConstructorParam, ConstructorRegistry};
    use crate::registry::BindingRegistry;
    use crate::ErrorKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Debug)]
    struct Logger {
        id: usize,
    }

    struct ServiceImpl {
        logger: Shared<Logger>,
    }

    #[derive(Debug)]
    struct Service;

    static LOGGER_BUILDS: AtomicUsize = AtomicUsize::new(0);

    fn wired_registry() -> BindingRegistry {
        let mut ctors = ConstructorRegistry::new();
        ctors
            .register::<Logger, _>(vec![], |_| {
                Ok(Logger {
                    id: LOGGER_BUILDS.fetch_add(1, Ordering::SeqCst),
                })
            })
            .unwrap();
        ctors
            .register::<ServiceImpl, _>(
                vec![ConstructorParam::new("logger", TypeKey::of::<Logger>())],
                |args| {
                    Ok(ServiceImpl {
                        logger: arg::<Logger>(&args, 0)?,
                    })
                },
            )
            .unwrap();
        BindingRegistry::with_introspector(Shared::new(ctors))
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<TypeKey>>,
    }

    impl SessionListener for Recorder {
        fn after_injection(&self, key: TypeKey, _instance: &Object) -> Result<(), Error> {
            self.events.lock().unwrap().push(key);
            Ok(())
        }
    }

    #[test]
    fn end_to_end_shared_singleton() {
        let mut registry = wired_registry();
        registry.bind::<Logger>().to_singleton();
        registry.bind::<Service>().to::<ServiceImpl>();

        let session = registry.new_session().unwrap();

        let first = session
            .resolve_key(TypeKey::of::<Service>())
            .unwrap()
            .downcast::<ServiceImpl>()
            .unwrap();
        let second = session
            .resolve_key(TypeKey::of::<Service>())
            .unwrap()
            .downcast::<ServiceImpl>()
            .unwrap();

        // Service is rebuilt each call, the injected logger is shared.
        assert!(!Shared::ptr_eq(&first, &second));
        assert!(Shared::ptr_eq(&first.logger, &second.logger));
        assert_eq!(first.logger.id, second.logger.id);
    }

    #[test]
    fn default_construction_is_never_cached() {
        let registry = wired_registry();
        let session = registry.new_session().unwrap();

        let a = session.resolve::<Logger>().unwrap();
        let b = session.resolve::<Logger>().unwrap();
        assert!(!Shared::ptr_eq(&a, &b));
    }

    #[test]
    fn singleton_built_exactly_once_under_contention() {
        struct Counted;

        let builds = Shared::new(AtomicUsize::new(0));
        let mut ctors = ConstructorRegistry::new();
        {
            let builds = builds.clone();
            ctors
                .register::<Counted, _>(vec![], move |_| {
                    builds.fetch_add(1, Ordering::SeqCst);
                    Ok(Counted)
                })
                .unwrap();
        }

        let mut registry = BindingRegistry::with_introspector(Shared::new(ctors));
        registry.bind::<Counted>().to_singleton();
        let session = registry.new_session().unwrap();

        let resolved: Vec<Shared<Counted>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let session = session.clone();
                    scope.spawn(move || session.resolve::<Counted>().unwrap())
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(builds.load(Ordering::SeqCst), 1);
        for other in &resolved[1..] {
            assert!(Shared::ptr_eq(&resolved[0], other));
        }
    }

    #[test]
    fn singleton_cache_is_keyed_by_requested_key() {
        struct Target;
        struct AliasA;
        struct AliasB;

        let builds = Shared::new(AtomicUsize::new(0));
        let mut ctors = ConstructorRegistry::new();
        {
            let builds = builds.clone();
            ctors
                .register::<Target, _>(vec![], move |_| {
                    builds.fetch_add(1, Ordering::SeqCst);
                    Ok(Target)
                })
                .unwrap();
        }

        let mut registry = BindingRegistry::with_introspector(Shared::new(ctors));
        registry.bind::<AliasA>().to_singleton_of::<Target>();
        registry.bind::<AliasB>().to_singleton_of::<Target>();
        let session = registry.new_session().unwrap();

        let a = session.resolve_key(TypeKey::of::<AliasA>()).unwrap();
        let b = session.resolve_key(TypeKey::of::<AliasB>()).unwrap();

        // Two caches, two builds, two instances.
        assert_eq!(builds.load(Ordering::SeqCst), 2);
        assert!(!Shared::ptr_eq(&a, &b));

        // Repeat requests stay cached per key.
        let a2 = session.resolve_key(TypeKey::of::<AliasA>()).unwrap();
        assert!(Shared::ptr_eq(&a, &a2));
        assert_eq!(builds.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn instance_binding_returns_the_same_reference() {
        struct Fixed;
        struct Consumer {
            fixed: Shared<Fixed>,
        }

        let mut ctors = ConstructorRegistry::new();
        ctors
            .register::<Consumer, _>(
                vec![ConstructorParam::new("fixed", TypeKey::of::<Fixed>())],
                |args| {
                    Ok(Consumer {
                        fixed: arg::<Fixed>(&args, 0)?,
                    })
                },
            )
            .unwrap();

        let value = Shared::new(Fixed);
        let mut registry = BindingRegistry::with_introspector(Shared::new(ctors));
        registry.bind::<Fixed>().to_instance(value.clone());

        let session = registry.new_session().unwrap();
        let resolved = session.resolve::<Fixed>().unwrap();
        assert!(Shared::ptr_eq(&value, &resolved));

        // Identity also holds when requested as a constructor dependency.
        let consumer = session.resolve::<Consumer>().unwrap();
        assert!(Shared::ptr_eq(&value, &consumer.fixed));
    }

    #[test]
    fn provider_binding_is_a_leaf() {
        struct FromProvider {
            key_name: &'static str,
        }

        let mut registry = BindingRegistry::new();
        registry.bind::<FromProvider>().to_provider(|key| {
            Ok(Shared::new(FromProvider {
                key_name: key.name(),
            }) as Object)
        });

        let session = registry.new_session().unwrap();
        let value = session.resolve::<FromProvider>().unwrap();
        assert!(value.key_name.contains("FromProvider"));
    }

    #[test]
    fn provider_errors_propagate() {
        #[derive(Debug)]
        struct Broken;

        let mut registry = BindingRegistry::new();
        registry
            .bind::<Broken>()
            .to_provider(|key| Err(Error::unresolvable_type(key.name())));

        let session = registry.new_session().unwrap();
        let err = session.resolve::<Broken>().unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnresolvableType));
    }

    #[test]
    fn direct_cycle_is_detected() {
        struct A;
        struct B;

        let mut registry = BindingRegistry::new();
        registry.bind::<A>().to::<B>();
        registry.bind::<B>().to::<A>();

        let session = registry.new_session().unwrap();
        let err = session.resolve_key(TypeKey::of::<A>()).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::CyclicDependency));
        assert!(err.message.contains(" -> "));
    }

    #[test]
    fn deep_cycle_is_detected() {
        struct S0;
        struct S1;
        struct S2;
        struct S3;
        struct S4;
        struct S5;
        struct S6;
        struct S7;
        struct S8;
        struct S9;

        let mut registry = BindingRegistry::new();
        registry.bind::<S0>().to::<S1>();
        registry.bind::<S1>().to::<S2>();
        registry.bind::<S2>().to::<S3>();
        registry.bind::<S3>().to::<S4>();
        registry.bind::<S4>().to::<S5>();
        registry.bind::<S5>().to::<S6>();
        registry.bind::<S6>().to::<S7>();
        registry.bind::<S7>().to::<S8>();
        registry.bind::<S8>().to::<S9>();
        registry.bind::<S9>().to::<S0>();

        let session = registry.new_session().unwrap();
        let err = session.resolve_key(TypeKey::of::<S0>()).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::CyclicDependency));
    }

    #[test]
    fn failed_resolution_does_not_poison_the_session() {
        struct Missing;

        let mut registry = wired_registry();
        registry.bind::<Service>().to::<Missing>();

        let session = registry.new_session().unwrap();
        assert!(session.resolve_key(TypeKey::of::<Service>()).is_err());

        // The cycle stack unwound; an independent resolve still works.
        assert!(session.resolve::<Logger>().is_ok());
        // And the failed key itself is not spuriously reported as a cycle.
        let err = session.resolve_key(TypeKey::of::<Service>()).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnresolvableType));
    }

    #[test]
    fn unbound_unknown_type_is_unresolvable() {
        #[derive(Debug)]
        struct Unknown;

        let registry = BindingRegistry::new();
        let session = registry.new_session().unwrap();
        let err = session.resolve::<Unknown>().unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnresolvableType));
        assert!(err.message.contains("Unknown"));
    }

    #[test]
    fn typed_resolve_reports_mismatch() {
        let mut registry = wired_registry();
        registry.bind::<Service>().to::<ServiceImpl>();

        let session = registry.new_session().unwrap();
        // The object under the Service key is a ServiceImpl.
        let err = session.resolve::<Service>().unwrap_err();
        assert!(matches!(err.kind, ErrorKind::TypeMismatch));
        assert!(session.resolve_key(TypeKey::of::<Service>()).is_ok());
    }

    #[test]
    fn eager_singletons_build_during_session_creation() {
        struct Eager1;
        struct Eager2;
        struct Lazy;

        let mut ctors = ConstructorRegistry::new();
        ctors.register::<Eager1, _>(vec![], |_| Ok(Eager1)).unwrap();
        ctors.register::<Eager2, _>(vec![], |_| Ok(Eager2)).unwrap();
        ctors.register::<Lazy, _>(vec![], |_| Ok(Lazy)).unwrap();

        let recorder = Shared::new(Recorder::default());
        let mut registry = BindingRegistry::with_introspector(Shared::new(ctors));
        registry.add_listener(recorder.clone());
        registry.bind::<Eager1>().to_eager_singleton();
        registry.bind::<Lazy>().to_singleton();
        registry.bind::<Eager2>().to_eager_singleton();

        let session = registry.new_session().unwrap();

        // Eager singletons fired during new_session, in declaration order.
        {
            let events = recorder.events.lock().unwrap();
            assert_eq!(*events, vec![TypeKey::of::<Eager1>(), TypeKey::of::<Eager2>()]);
        }

        // The lazy one fires on first use only, and only once.
        session.resolve::<Lazy>().unwrap();
        session.resolve::<Lazy>().unwrap();
        let events = recorder.events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                TypeKey::of::<Eager1>(),
                TypeKey::of::<Eager2>(),
                TypeKey::of::<Lazy>()
            ]
        );
    }

    #[test]
    fn eager_failure_fails_session_creation() {
        struct NoCtor;

        let mut registry = BindingRegistry::new();
        registry.bind::<NoCtor>().to_eager_singleton();

        let err = registry.new_session().unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnresolvableType));
    }

    #[test]
    fn listener_errors_propagate() {
        struct Failing;

        impl SessionListener for Failing {
            fn after_injection(&self, key: TypeKey, _instance: &Object) -> Result<(), Error> {
                Err(Error::type_mismatch(key.name()))
            }
        }

        let mut registry = wired_registry();
        registry.add_listener(Shared::new(Failing));

        let session = registry.new_session().unwrap();
        let err = session.resolve::<Logger>().unwrap_err();
        assert!(matches!(err.kind, ErrorKind::TypeMismatch));
    }

    #[test]
    fn cache_hits_do_not_fire_listeners() {
        let recorder = Shared::new(Recorder::default());
        let mut registry = wired_registry();
        registry.add_listener(recorder.clone());
        registry.bind::<Logger>().to_singleton();

        let session = registry.new_session().unwrap();
        session.resolve::<Logger>().unwrap();
        session.resolve::<Logger>().unwrap();
        session.resolve::<Logger>().unwrap();

        let events = recorder.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0], TypeKey::of::<Logger>());
    }

    #[test]
    fn override_law_holds_through_resolution() {
        struct Token;

        let x = Shared::new(1u32);
        let y = Shared::new(2u32);

        let mut registry = BindingRegistry::new();
        registry.bind::<Token>().to_instance(x);
        registry.bind::<Token>().to_instance(y.clone());

        let session = registry.new_session().unwrap();
        let resolved = session
            .resolve_key(TypeKey::of::<Token>())
            .unwrap()
            .downcast::<u32>()
            .unwrap();
        assert!(Shared::ptr_eq(&y, &resolved));
    }

    #[test]
    fn handle_upgrades_while_session_lives() {
        let registry = wired_registry();
        let session = registry.new_session().unwrap();
        let handle = session.handle();

        assert!(handle.upgrade().is_some());
        drop(session);
        assert!(handle.upgrade().is_none());
    }
}
