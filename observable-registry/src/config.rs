//! Registry configuration types
//!
//! The registry only needs to know how many observers it may hold at once. The
//! slot table is sized from this value at construction and never grows.

use crate::types::{RegistryError, Result};
use serde::{Deserialize, Serialize};

/// Default number of observer slots
pub const DEFAULT_CAPACITY: usize = 10;

/// Configuration for an [`Observable`](crate::Observable)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Maximum number of simultaneously registered observers
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl RegistryConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the slot table capacity
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Check the configuration before building a registry from it
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(RegistryError::InvalidConfig(
                "capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
