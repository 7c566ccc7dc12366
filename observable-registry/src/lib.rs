//! Observable Registry Library
//!
//! A small, single-threaded publish/notify registry: an [`Observable`] subject holds a
//! bounded set of [`Observer`] subscribers and notifies one or all of them when its
//! state changes.
//!
//! # Architecture
//!
//! - [`Observer`] wraps a caller-supplied handler ([`Observe`]) and the id assigned at
//!   registration.
//! - [`Observable`] owns a fixed-capacity slot table, an id counter, a shared reference
//!   to the caller's subject value, a [`SubjectKind`] discriminant and an optional
//!   custom action.
//! - Handlers receive the subject as `&S`, so recovering the concrete subject is a
//!   type-checked operation. Subjects that come in several shapes use an enum for `S`.
//!
//! The library does NOT:
//! - Queue events or deliver them asynchronously
//! - Deliver across threads or processes
//! - Grow the slot table past its configured capacity
//!
//! # Example Usage
//!
//! ```
//! use observable_registry::{Observable, Observer, RegistryConfig, RegistryError, SubjectKind};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let temperature = Rc::new(Cell::new(21));
//! let mut observable: Observable<Cell<i32>> = Observable::new(
//!     Rc::clone(&temperature),
//!     SubjectKind::CustomFirst,
//!     RegistryConfig::new().with_capacity(1),
//! )
//! .unwrap();
//!
//! let thermostat = Observer::new(|kind: SubjectKind, value: &Cell<i32>| {
//!     if kind == SubjectKind::CustomFirst && value.get() > 25 {
//!         println!("too warm: {}", value.get());
//!     }
//! });
//! observable.register(&thermostat).unwrap();
//!
//! let spare = Observer::new(|_: SubjectKind, _: &Cell<i32>| {});
//! assert_eq!(
//!     observable.register(&spare),
//!     Err(RegistryError::CapacityExceeded { capacity: 1 })
//! );
//!
//! temperature.set(27);
//! assert!(observable.notify_all().is_complete());
//! ```

// Public modules
pub mod config;
pub mod observable;
pub mod observer;
pub mod types;

// Re-export main types for convenience
pub use config::{RegistryConfig, DEFAULT_CAPACITY};
pub use observable::{Broadcast, CustomAction, Observable};
pub use observer::{Observe, Observer, ObserverRef};
pub use types::{ObserverId, RegistryError, Result, SubjectKind};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
