//! Demo script loading and validation
//!
//! A script names the observers to create and the ordered steps to run against the
//! registry. Scripts are TOML files; [`DemoScript::builtin`] is the default run.

use anyhow::{Context, Result};
use observable_registry::{RegistryConfig, SubjectKind, DEFAULT_CAPACITY};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::notice::Severity;

/// Complete demo script (loaded from a .toml file)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DemoScript {
    #[serde(default)]
    pub registry: RegistrySection,
    #[serde(default)]
    pub observers: Vec<ObserverConfig>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegistrySection {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    #[serde(default = "default_kind")]
    pub kind: SubjectKind,
}

impl Default for RegistrySection {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            kind: default_kind(),
        }
    }
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_kind() -> SubjectKind {
    SubjectKind::CustomFirst
}

impl RegistrySection {
    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig::new().with_capacity(self.capacity)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObserverConfig {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: ObserverType,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ObserverType {
    #[default]
    Console,
    Tally,
}

/// One scripted operation against the registry
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Register {
        observer: String,
    },
    Unregister {
        observer: String,
    },
    /// Post a notice, then notify `target` only or every observer
    Publish {
        severity: Severity,
        message: String,
        #[serde(default)]
        target: Option<String>,
    },
    RunAction {
        #[serde(default)]
        payload: Option<String>,
    },
    Find {
        id: u64,
    },
}

impl Step {
    /// Observer this step refers to by name, if any
    pub fn observer(&self) -> Option<&str> {
        match self {
            Step::Register { observer } | Step::Unregister { observer } => Some(observer.as_str()),
            Step::Publish { target, .. } => target.as_deref(),
            Step::RunAction { .. } | Step::Find { .. } => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("Observer '{0}' is declared more than once")]
    DuplicateObserver(String),

    #[error("Step {step} refers to undeclared observer '{name}'")]
    UnknownObserver { step: usize, name: String },

    #[error("Invalid registry section: {0}")]
    Registry(#[from] observable_registry::RegistryError),
}

impl DemoScript {
    /// The default run: two console observers, a broadcast ERROR, a WARNING for the
    /// first observer only, the custom action without payload and a lookup of id 1.
    pub fn builtin() -> Self {
        Self {
            registry: RegistrySection::default(),
            observers: vec![
                ObserverConfig {
                    name: "first".to_string(),
                    kind: ObserverType::Console,
                },
                ObserverConfig {
                    name: "second".to_string(),
                    kind: ObserverType::Console,
                },
            ],
            steps: vec![
                Step::Register {
                    observer: "first".to_string(),
                },
                Step::Register {
                    observer: "second".to_string(),
                },
                Step::Publish {
                    severity: Severity::Error,
                    message: "THIS IS SOME ERROR FOR ALL OBSERVERS".to_string(),
                    target: None,
                },
                Step::Publish {
                    severity: Severity::Warning,
                    message: "THIS IS SOME WARNING FOR SPECIFIED OBSERVER".to_string(),
                    target: Some("first".to_string()),
                },
                Step::RunAction { payload: None },
                Step::Find { id: 1 },
            ],
        }
    }

    /// Check observer names and the registry section
    pub fn validate(&self) -> std::result::Result<(), ScriptError> {
        self.registry.registry_config().validate()?;

        let mut names = HashSet::new();
        for observer in &self.observers {
            if !names.insert(observer.name.as_str()) {
                return Err(ScriptError::DuplicateObserver(observer.name.clone()));
            }
        }

        for (index, step) in self.steps.iter().enumerate() {
            if let Some(name) = step.observer() {
                if !names.contains(name) {
                    return Err(ScriptError::UnknownObserver {
                        step: index + 1,
                        name: name.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Load a demo script from a TOML file
pub fn load_config(path: &Path) -> Result<DemoScript> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read script file: {:?}", path))?;

    let script: DemoScript = toml::from_str(&content)
        .with_context(|| format!("Failed to parse script file: {:?}", path))?;

    script
        .validate()
        .with_context(|| format!("Invalid script file: {:?}", path))?;

    Ok(script)
}
