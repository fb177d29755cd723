//! Opaque type identifiers for binding and resolution.
//!
//! A [`TypeKey`] names a requested or bound type. The engine only ever
//! compares and hashes keys; the attached type name exists for diagnostics
//! (error chains, log events) and never participates in identity.
//!
//! Keys can name unsized types, so trait objects work as binding tokens:
//!
//! ```
//! use bindery::key::TypeKey;
//!
//! trait Greeter {}
//! let key = TypeKey::of::<dyn Greeter>();
//! assert_eq!(key, TypeKey::of::<dyn Greeter>());
//! assert_ne!(key, TypeKey::of::<String>());
//! ```

use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identifier for a requested or bound type.
///
/// Equality and hashing consider the [`TypeId`] only; two keys for the same
/// type are always equal even if their display names differ across compiler
/// versions.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Key for the type `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// The diagnostic name of the keyed type.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The underlying [`TypeId`].
    pub fn id(&self) -> TypeId {
        self.id
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
