//! Binding registry and fluent builder.
//!
//! A [`BindingRegistry`] is an append-only, ordered sequence of bindings plus
//! the listener list and the introspection handle a session will carry. It is
//! an owned value threaded through bootstrap code; there is no ambient global
//! registry.
//!
//! Registration never deduplicates. Override resolution happens once, at
//! [`new_session`](BindingRegistry::new_session): for each distinct `from`
//! key only the **last** appended binding survives, so later configuration
//! layers deterministically override earlier defaults.
//!
//! # Examples
//!
//! ```
//! use bindery::BindingRegistry;
//!
//! struct Logger;
//! struct Service;
//! struct ServiceImpl;
//!
//! let mut registry = BindingRegistry::new();
//! registry.bind::<Logger>().to_singleton();
//! registry.bind::<Service>().to::<ServiceImpl>();
//! ```

use std::collections::HashMap;

use crate::binding::{Binding, ProviderFn};
use crate::error::Error;
use crate::introspect::{NullIntrospector, TypeIntrospector};
use crate::key::TypeKey;
use crate::listener::SessionListener;
use crate::runtime::{Object, Shared};
use crate::session::Session;

#[cfg(feature = "tracing")]
use tracing::{debug, trace, warn};

/// Append-only, ordered builder of bindings.
pub struct BindingRegistry {
    bindings: Vec<Binding>,
    listeners: Vec<Shared<dyn SessionListener>>,
    introspector: Shared<dyn TypeIntrospector>,
}

impl BindingRegistry {
    /// A registry with no introspection capability.
    ///
    /// Sessions built from it are purely binding-driven: any unbound request
    /// fails with `UnresolvableType`.
    pub fn new() -> Self {
        Self::with_introspector(Shared::new(NullIntrospector))
    }

    /// A registry whose sessions default-construct unbound keys through the
    /// given introspector.
    pub fn with_introspector(introspector: Shared<dyn TypeIntrospector>) -> Self {
        Self {
            bindings: Vec::new(),
            listeners: Vec::new(),
            introspector,
        }
    }

    /// Start a fluent binding declaration for `T`.
    ///
    /// Constructs no binding by itself; one of the builder's terminal calls
    /// appends the rule.
    pub fn bind<T: ?Sized + 'static>(&mut self) -> BindingBuilder<'_> {
        self.bind_key(TypeKey::of::<T>())
    }

    /// Start a fluent binding declaration for an explicit key.
    pub fn bind_key(&mut self, from: TypeKey) -> BindingBuilder<'_> {
        BindingBuilder {
            registry: self,
            from,
        }
    }

    /// Append a listener; sessions notify in registration order.
    pub fn add_listener(&mut self, listener: Shared<dyn SessionListener>) {
        self.listeners.push(listener);
    }

    /// Number of appended bindings (including ones a later append overrides).
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Keys with at least one appended binding, in registration order.
    pub fn bound_keys(&self) -> impl Iterator<Item = TypeKey> + '_ {
        self.bindings.iter().map(Binding::from)
    }

    /// Finalize the registry into an immutable session.
    ///
    /// Resolves overrides (last registration wins), then eagerly builds every
    /// eager singleton in finalized-table order, strictly before returning.
    /// An eager build failure fails session creation itself, not first use.
    pub fn new_session(self) -> Result<Session, Error> {
        let table = BindingTable::finalize(self.bindings);

        #[cfg(feature = "tracing")]
        debug!("Finalized binding table with {} entries", table.len());

        Session::create(table, self.listeners, self.introspector)
    }

    fn append(&mut self, binding: Binding) {
        #[cfg(feature = "tracing")]
        trace!("Appending {} binding for {}", binding.kind(), binding.from());

        self.bindings.push(binding);
    }

    // Warn-and-drop rule for explicit self-targets; the bare singleton forms
    // never pass through here.
    fn append_unless_self(&mut self, binding: Binding, to: TypeKey) {
        if binding.from() == to {
            #[cfg(feature = "tracing")]
            warn!(
                "Ignoring {} binding mapping {} to itself",
                binding.kind(),
                binding.from()
            );
            return;
        }
        self.append(binding);
    }
}

impl Default for BindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Fluent declaration for one `from` key.
///
/// Each terminal call appends exactly one binding, except the explicit
/// self-target forms (`to`, `to_singleton_of`, ...) which warn and add
/// nothing when the target equals `from`.
pub struct BindingBuilder<'a> {
    registry: &'a mut BindingRegistry,
    from: TypeKey,
}

impl BindingBuilder<'_> {
    /// Satisfy requests for `from` by recursively building `T`.
    pub fn to<T: ?Sized + 'static>(self) {
        self.to_key(TypeKey::of::<T>());
    }

    /// Key-level form of [`to`](Self::to).
    pub fn to_key(self, to: TypeKey) {
        let from = self.from;
        self.registry
            .append_unless_self(Binding::Class { from, to }, to);
    }

    /// Satisfy requests for `from` with a fixed pre-built value.
    pub fn to_instance<V: Send + Sync + 'static>(self, value: Shared<V>) {
        self.to_object(value as Object);
    }

    /// Instance binding over an already type-erased value.
    pub fn to_object(self, value: Object) {
        let from = self.from;
        self.registry.append(Binding::Instance { from, value });
    }

    /// Satisfy requests for `from` by invoking `factory(from)`.
    ///
    /// The factory is a leaf: the engine resolves none of its dependencies,
    /// the closure captures whatever it needs.
    pub fn to_provider<F>(self, factory: F)
    where
        F: Fn(TypeKey) -> Result<Object, Error> + Send + Sync + 'static,
    {
        let from = self.from;
        self.registry.append(Binding::Provider {
            from,
            factory: Box::new(factory) as ProviderFn,
        });
    }

    /// Mark `from` as a lazily built self-singleton.
    pub fn to_singleton(self) {
        let from = self.from;
        self.registry.append(Binding::Singleton {
            from,
            to: from,
            eager: false,
        });
    }

    /// Singleton under key `from`, built by resolving `T`.
    pub fn to_singleton_of<T: ?Sized + 'static>(self) {
        self.to_singleton_of_key(TypeKey::of::<T>());
    }

    /// Key-level form of [`to_singleton_of`](Self::to_singleton_of).
    pub fn to_singleton_of_key(self, to: TypeKey) {
        let from = self.from;
        self.registry.append_unless_self(
            Binding::Singleton {
                from,
                to,
                eager: false,
            },
            to,
        );
    }

    /// Self-singleton built during `new_session` rather than on first use.
    pub fn to_eager_singleton(self) {
        let from = self.from;
        self.registry.append(Binding::Singleton {
            from,
            to: from,
            eager: true,
        });
    }

    /// Eager singleton under key `from`, built by resolving `T`.
    pub fn to_eager_singleton_of<T: ?Sized + 'static>(self) {
        self.to_eager_singleton_of_key(TypeKey::of::<T>());
    }

    /// Key-level form of [`to_eager_singleton_of`](Self::to_eager_singleton_of).
    pub fn to_eager_singleton_of_key(self, to: TypeKey) {
        let from = self.from;
        self.registry.append_unless_self(
            Binding::Singleton {
                from,
                to,
                eager: true,
            },
            to,
        );
    }
}

/// The finalized, immutable binding table owned by a session.
///
/// For each distinct `from` key only the last appended binding survives;
/// entry order is the order of those surviving registrations, which is also
/// the eager construction schedule.
pub struct BindingTable {
    entries: Vec<Binding>,
    index: HashMap<TypeKey, usize>,
}

impl BindingTable {
    pub(crate) fn finalize(bindings: Vec<Binding>) -> Self {
        let mut slots: Vec<Option<Binding>> = Vec::with_capacity(bindings.len());
        let mut positions: HashMap<TypeKey, usize> = HashMap::new();

        for binding in bindings {
            if let Some(old) = positions.insert(binding.from(), slots.len()) {
                slots[old] = None;
            }
            slots.push(Some(binding));
        }

        let entries: Vec<Binding> = slots.into_iter().flatten().collect();
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, b)| (b.from(), i))
            .collect();

        Self { entries, index }
    }

    pub fn get(&self, key: TypeKey) -> Option<&Binding> {
        self.index.get(&key).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, key: TypeKey) -> bool {
        self.index.contains_key(&key)
    }

    /// Entries in finalized order.
    pub fn entries(&self) -> &[Binding] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
