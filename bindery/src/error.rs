//! Error types for the bindery resolution engine.
//!
//! This module defines a lightweight error model used across the crate to
//! describe failures during session creation, resolution, default
//! construction, and session discovery.
//!
//! # Design
//!
//! - `ErrorKind` captures the error category.
//! - `Error` stores the category and a human-readable message.
//!
//! The helpers in `Error` keep call sites concise and error messages
//! consistent. The engine never retries: construction is assumed
//! deterministic, so every error propagates to the immediate caller of
//! `resolve` / `new_session`.
//!
//! Note that a self-binding dropped by the builder is a warning event, not an
//! error value; it has no variant here.
//!
//! # Feature Flags
//!
//! - `tracing`: logs errors when they are created.
//! - `debug`: enables extra diagnostic formatting in `Display`.
//!
//! # Examples
//!
//! ```
//! use bindery::error::Error;
//!
//! let err = Error::unresolvable_type("MyService");
//! assert!(err.message.contains("MyService"));
//! ```

use core::fmt;

#[cfg(feature = "tracing")]
use tracing::error;

/// Error categories for the engine.
///
/// These variants are intentionally coarse-grained to keep error handling
/// straightforward while still expressive enough for diagnostics.
#[derive(Clone, PartialEq)]
#[cfg_attr(feature = "debug", derive(Debug))]
pub enum ErrorKind {
    /// A type depends on itself, directly or transitively, within one
    /// resolution call.
    CyclicDependency,
    /// No binding and no usable constructor for the requested type.
    UnresolvableType,
    /// The discovery bridge could not locate an owning session.
    MissingSession,
    /// Type mismatch during downcast of a resolved instance.
    TypeMismatch,
    /// More than one primary constructor registered for a type.
    AmbiguousConstructor,
}

/// Engine error structure.
///
/// `kind` enables programmatic handling, while `message` is human-readable.
#[derive(Clone)]
#[cfg_attr(feature = "debug", derive(Debug))]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
}

impl Error {
    /// Creates a new error with the given kind and message.
    ///
    /// If the `tracing` feature is enabled, the error is automatically logged.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let error = Self {
            kind,
            message: message.into(),
        };

        #[cfg(feature = "tracing")]
        error!("{}", error);

        error
    }

    /// A type directly or transitively depends on itself.
    ///
    /// `chain` is the ordered resolution stack at the point of detection,
    /// ending with the re-entrant type.
    pub fn cyclic_dependency(chain: &[&str]) -> Self {
        Self::new(
            ErrorKind::CyclicDependency,
            format!("Cyclic dependency detected: {}", chain.join(" -> ")),
        )
    }

    /// No binding and no usable constructor for the requested type.
    pub fn unresolvable_type(type_name: &str) -> Self {
        Self::new(
            ErrorKind::UnresolvableType,
            format!("No binding or constructor for type: {}", type_name),
        )
    }

    /// The discovery bridge found no owning session on the given object.
    pub fn missing_session(type_name: &str) -> Self {
        Self::new(
            ErrorKind::MissingSession,
            format!("No owning session reachable from instance of: {}", type_name),
        )
    }

    /// A resolved instance could not be downcast to the expected type.
    pub fn type_mismatch(type_name: &str) -> Self {
        Self::new(
            ErrorKind::TypeMismatch,
            format!("Type mismatch when resolving: {}", type_name),
        )
    }

    /// A second primary constructor was registered for a type.
    pub fn ambiguous_constructor(type_name: &str) -> Self {
        Self::new(
            ErrorKind::AmbiguousConstructor,
            format!("Primary constructor already registered for type: {}", type_name),
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        #[cfg(feature = "debug")]
        {
            write!(f, "({:?}) - {}", self.kind, self.message)
        }
        #[cfg(not(feature = "debug"))]
        {
            write!(f, "{}", self.message)
        }
    }
}

#[cfg(feature = "debug")]
impl std::error::Error for Error {}
