//! Macros for ergonomic binding declaration.
//!
//! - [`bindings!`]: shorthand for a block of builder calls against an
//!   existing registry.
//! - [`registry!`]: compose a fresh registry with multiple `bind` statements
//!   in one block.
//!
//! # Example
//! ```
//! use bindery::{registry, bindings, Shared};
//! use bindery::runtime::Object;
//!
//! struct Logger;
//! struct Service;
//! struct ServiceImpl;
//!
//! let reg = registry! {
//!     bind(Logger => singleton)
//!     bind(Service => to ServiceImpl)
//!     bind(u16 => instance Shared::new(8080u16))
//!     bind(String => provider |_key| Ok(Shared::new(String::from("hi")) as Object))
//! };
//! assert_eq!(reg.len(), 4);
//! ```

/// Shorthand for declaring bindings against an existing registry.
///
/// - `$from => to $target`: class binding.
/// - `$from => singleton`: lazy self-singleton.
/// - `$from => eager singleton`: eager self-singleton.
/// - `$from => singleton of $target`: lazy singleton with explicit target.
/// - `$from => eager singleton of $target`: eager variant.
/// - `$from => instance $value`: instance binding (`$value: Shared<V>`).
/// - `$from => provider $factory`: provider binding.
#[macro_export]
macro_rules! bindings {
    (@one $registry:expr, $from:ty => to $to:ty) => {
        $registry.bind::<$from>().to::<$to>()
    };

    (@one $registry:expr, $from:ty => eager singleton of $to:ty) => {
        $registry.bind::<$from>().to_eager_singleton_of::<$to>()
    };

    (@one $registry:expr, $from:ty => eager singleton) => {
        $registry.bind::<$from>().to_eager_singleton()
    };

    (@one $registry:expr, $from:ty => singleton of $to:ty) => {
        $registry.bind::<$from>().to_singleton_of::<$to>()
    };

    (@one $registry:expr, $from:ty => singleton) => {
        $registry.bind::<$from>().to_singleton()
    };

    (@one $registry:expr, $from:ty => instance $value:expr) => {
        $registry.bind::<$from>().to_instance($value)
    };

    (@one $registry:expr, $from:ty => provider $factory:expr) => {
        $registry.bind::<$from>().to_provider($factory)
    };

    ($registry:expr, $( bind( $($stmt:tt)* ) )*) => {{
        $(
            $crate::bindings!(@one $registry, $($stmt)*);
        )*
    }};
}

/// Compose a fresh [`BindingRegistry`](crate::BindingRegistry) with multiple
/// `bind` statements in one block.
#[macro_export]
macro_rules! registry {
    ( $( bind( $($stmt:tt)* ) )* ) => {{
        let mut registry = $crate::BindingRegistry::new();
        $crate::bindings!(registry, $( bind( $($stmt)* ) )*);
        registry
    }};
}
