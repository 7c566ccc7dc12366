//! Core types for the observable registry
//!
//! This module defines the identifiers, subject discriminants and errors shared by
//! the [`Observer`](crate::Observer) record and the [`Observable`](crate::Observable)
//! registry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Identity of a registered observer
///
/// Assigned by an [`Observable`](crate::Observable) at registration time. Ids start
/// at 1, only ever increase and are never handed out twice by the same registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObserverId(u64);

impl ObserverId {
    /// The first id a fresh registry hands out
    pub const FIRST: ObserverId = ObserverId(1);

    /// Wrap a raw id. Returns `None` for 0, which is never a valid id.
    pub fn new(raw: u64) -> Option<Self> {
        (raw != 0).then_some(Self(raw))
    }

    /// Raw numeric value
    pub fn get(self) -> u64 {
        self.0
    }

    /// The id following this one, or `None` once the id space is exhausted
    pub(crate) fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Family of subject a notification originates from
///
/// Observers switch on this to decide whether and how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
    /// Reserved for transactional subjects
    Transaction,
    /// Reserved for trigger subjects
    Trigger,
    /// Free for application use
    CustomFirst,
    /// Free for application use
    CustomSecond,
}

impl SubjectKind {
    /// All variants, in declaration order
    pub const ALL: [SubjectKind; 4] = [
        SubjectKind::Transaction,
        SubjectKind::Trigger,
        SubjectKind::CustomFirst,
        SubjectKind::CustomSecond,
    ];

    /// Snake-case name, as used in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectKind::Transaction => "transaction",
            SubjectKind::Trigger => "trigger",
            SubjectKind::CustomFirst => "custom_first",
            SubjectKind::CustomSecond => "custom_second",
        }
    }
}

impl fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubjectKind {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        SubjectKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| RegistryError::InvalidConfig(format!("unknown subject kind: {}", s)))
    }
}

/// Errors returned by registry and observer operations
///
/// Every variant is recoverable: callers branch on it and decide whether to retry,
/// report or ignore.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Observer capacity exceeded: all {capacity} slots are occupied")]
    CapacityExceeded { capacity: usize },

    #[error("Observer not found")]
    NotFound,

    #[error("Observer already released")]
    AlreadyReleased,

    #[error("Observer already registered as {0}")]
    AlreadyRegistered(ObserverId),

    #[error("Observer id space exhausted")]
    IdsExhausted,

    #[error("Invalid registry configuration: {0}")]
    InvalidConfig(String),

    #[error("Allocation failed: {0}")]
    AllocationFailed(String),

    #[error("No custom action configured")]
    NoCustomAction,

    #[error("Handler of observer {observer} panicked: {message}")]
    HandlerPanicked { observer: String, message: String },

    #[error("Custom action failed: {0}")]
    Action(String),
}
