//! Construction notification sinks.

use crate::error::Error;
use crate::key::TypeKey;
use crate::runtime::Object;

/// A notification sink invoked after each successful construction.
///
/// Listeners fire once per freshly built object, at the frame that invoked
/// the constructor, in listener registration order. Cache hits, instance
/// returns, and provider returns do not fire. A listener error aborts the
/// enclosing resolution and propagates to its caller; the engine never
/// swallows it.
pub trait SessionListener: Send + Sync {
    /// Called with the key under which the instance was constructed.
    fn after_injection(&self, key: TypeKey, instance: &Object) -> Result<(), Error>;
}
