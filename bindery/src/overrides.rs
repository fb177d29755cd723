//! Applying externally supplied override values to a registry.
//!
//! Configuration layers (property files, environment diffs) materialize as a
//! list of `(key, value)` pairs. Applying them appends an instance binding
//! for every key the registry already knows, so last-wins finalization makes
//! the external value effective; keys the registry never bound are left
//! alone and reported back for audit.
//!
//! Parsing configuration sources is out of scope here: callers hand in
//! already-materialized values.

use std::collections::HashSet;

use crate::key::TypeKey;
use crate::registry::BindingRegistry;
use crate::runtime::Object;

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

/// Audit result of an override pass.
#[cfg_attr(feature = "debug", derive(Debug))]
#[derive(Default)]
pub struct OverrideReport {
    /// Keys whose registered default was overridden.
    pub consumed: Vec<TypeKey>,
    /// Supplied keys with no registered binding; left unbound.
    pub unused: Vec<TypeKey>,
}

/// Append instance bindings for every override targeting a bound key.
///
/// Overrides are applied in the order supplied; a key overridden twice ends
/// up with the later value (the registry's own override law).
pub fn apply_overrides(
    registry: &mut BindingRegistry,
    overrides: Vec<(TypeKey, Object)>,
) -> OverrideReport {
    let bound: HashSet<TypeKey> = registry.bound_keys().collect();
    let mut report = OverrideReport::default();

    for (key, value) in overrides {
        if bound.contains(&key) {
            #[cfg(feature = "tracing")]
            debug!("Overriding binding for {} with supplied instance", key);

            registry.bind_key(key).to_object(value);
            report.consumed.push(key);
        } else {
            #[cfg(feature = "tracing")]
            warn!("Override for {} matches no registered binding", key);

            report.unused.push(key);
        }
    }

    report
}
