//! Binding definitions: one immutable construction rule per value.
//!
//! A [`Binding`] describes how requests for its `from` key are satisfied.
//! Bindings are created once by the registry builder and never mutated; the
//! resolution engine only reads them out of the finalized table.
//!
//! # Variants
//!
//! - **Class**: delegate to recursive resolution of another key.
//! - **Instance**: return a fixed, pre-built value. No construction.
//! - **Singleton**: build the target at most once and cache the result under
//!   the *requested* key; optionally eagerly at session creation.
//! - **Provider**: invoke a user-supplied factory. The factory is a leaf:
//!   the engine performs no dependency walking on its behalf, the user
//!   closes over whatever the factory needs.

use core::fmt;

use crate::error::Error;
use crate::key::TypeKey;
use crate::runtime::Object;

/// A user-supplied factory for [`Binding::Provider`].
///
/// Receives the requested key (useful for factories registered under several
/// keys) and returns a finished instance. Failures propagate to the caller
/// of `resolve` unchanged.
pub type ProviderFn = Box<dyn Fn(TypeKey) -> Result<Object, Error> + Send + Sync>;

/// One construction rule for a `from` key.
pub enum Binding {
    /// Requests for `from` are satisfied by recursively building `to`.
    Class { from: TypeKey, to: TypeKey },
    /// Requests for `from` return the fixed value directly.
    Instance { from: TypeKey, value: Object },
    /// Requests for `from` build `to` at most once, cached under `from`.
    ///
    /// `to == from` is the intentional self-singleton form; `eager` schedules
    /// the build at session creation instead of first use.
    Singleton {
        from: TypeKey,
        to: TypeKey,
        eager: bool,
    },
    /// Requests for `from` invoke the factory; no further resolution.
    Provider { from: TypeKey, factory: ProviderFn },
}

impl Binding {
    /// The key this rule answers requests for.
    pub fn from(&self) -> TypeKey {
        match self {
            Binding::Class { from, .. }
            | Binding::Instance { from, .. }
            | Binding::Singleton { from, .. }
            | Binding::Provider { from, .. } => *from,
        }
    }

    /// Whether this is a singleton rule scheduled for session creation.
    pub fn is_eager(&self) -> bool {
        matches!(self, Binding::Singleton { eager: true, .. })
    }

    /// Short variant tag for log events.
    pub fn kind(&self) -> &'static str {
        match self {
            Binding::Class { .. } => "class",
            Binding::Instance { .. } => "instance",
            Binding::Singleton { eager: false, .. } => "singleton",
            Binding::Singleton { eager: true, .. } => "eager singleton",
            Binding::Provider { .. } => "provider",
        }
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Class { from, to } => write!(f, "Class({from} -> {to})"),
            Binding::Instance { from, .. } => write!(f, "Instance({from})"),
            Binding::Singleton { from, to, eager } => {
                write!(f, "Singleton({from} -> {to}, eager: {eager})")
            }
            Binding::Provider { from, .. } => write!(f, "Provider({from})"),
        }
    }
}
