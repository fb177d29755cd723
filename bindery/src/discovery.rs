//! Session discovery: recovering the owning session from a built object.
//!
//! Some injection points are resolved only after the enclosing object already
//! exists. The bridge locates the [`Session`](crate::Session) that built an
//! object so the deferred request can be resolved against it.
//!
//! Discovery is an explicit three-tier lookup over the [`SessionCarrier`]
//! capability trait, tried in order until one yields a live handle:
//!
//! 1. [`session_accessor`](SessionCarrier::session_accessor) — a public
//!    accessor method returning the session handle.
//! 2. [`session_field`](SessionCarrier::session_field) — a handle stored as a
//!    constructor parameter / field.
//! 3. [`embedded_session`](SessionCarrier::embedded_session) — the hidden
//!    accessor convention for generated carriers.
//!
//! The bridge caches nothing and never owns the session it finds: handles are
//! weak, so discovery cannot extend a session's lifetime. If every tier is
//! absent, or the found handle is dead, discovery fails with
//! `MissingSession` naming the carrier's type.

use crate::error::Error;
use crate::key::TypeKey;
use crate::runtime::Object;
use crate::session::{Session, SessionHandle};

#[cfg(feature = "tracing")]
use tracing::trace;

/// Capability of an object that may know the session that built it.
///
/// Every tier defaults to `None`; implementors provide whichever ones their
/// construction site supports.
pub trait SessionCarrier: Send + Sync {
    /// Tier 1: a dedicated accessor method.
    fn session_accessor(&self) -> Option<SessionHandle> {
        None
    }

    /// Tier 2: a handle held as a stored field.
    fn session_field(&self) -> Option<SessionHandle> {
        None
    }

    /// Tier 3: the hidden embedded-accessor convention.
    fn embedded_session(&self) -> Option<SessionHandle> {
        None
    }

    /// Type name reported by `MissingSession` failures.
    fn carrier_name(&self) -> &'static str {
        "<unknown carrier>"
    }
}

/// Locate the owning session of `carrier`, trying the three tiers in order.
///
/// A later tier is consulted only when the earlier ones yielded nothing or a
/// dead handle.
pub fn discover_session(carrier: &dyn SessionCarrier) -> Result<Session, Error> {
    type Tier = fn(&dyn SessionCarrier) -> Option<SessionHandle>;
    let tiers: [(&str, Tier); 3] = [
        ("accessor", |c| c.session_accessor()),
        ("field", |c| c.session_field()),
        ("embedded", |c| c.embedded_session()),
    ];

    for (_tier, lookup) in tiers {
        if let Some(session) = lookup(carrier).and_then(|handle| handle.upgrade()) {
            #[cfg(feature = "tracing")]
            trace!(
                "Discovered session via {} tier on {}",
                _tier,
                carrier.carrier_name()
            );

            return Ok(session);
        }
    }

    Err(Error::missing_session(carrier.carrier_name()))
}

/// Deferred injection point: discover the owning session, then resolve `key`
/// against it.
pub fn resolve_via(carrier: &dyn SessionCarrier, key: TypeKey) -> Result<Object, Error> {
    discover_session(carrier)?.resolve_key(key)
}
