//! Context-key store for conditional keybindings
//!
//! Focus tracking and the find widget write keys here as UI state changes;
//! preconditions read them when a chord is resolved.

use std::collections::HashMap;
use std::fmt;

/// Set while a webview editor is the active editor
pub const FEATURE_CONTEXT_ACTIVE: &str = "feature-context-active";
/// Set while the webview's find widget is shown
pub const FIND_WIDGET_VISIBLE: &str = "find-widget-visible";
/// Set while the webview's find widget has keyboard focus
pub const FIND_WIDGET_FOCUSED: &str = "find-widget-focused";
/// Set while a nested text input has keyboard focus
pub const INPUT_FOCUSED: &str = "input-focused";

/// A context-key value
///
/// Equality is type-sensitive: `Bool(true)` never equals `String("true")`.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextValue {
    Bool(bool),
    String(String),
    Number(f64),
}

impl ContextValue {
    /// Whether this value counts as set for a bare-key check
    pub fn is_truthy(&self) -> bool {
        match self {
            ContextValue::Bool(b) => *b,
            ContextValue::String(s) => !s.is_empty(),
            ContextValue::Number(n) => *n != 0.0 && !n.is_nan(),
        }
    }
}

impl fmt::Display for ContextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextValue::Bool(b) => write!(f, "{}", b),
            ContextValue::String(s) => {
                write!(f, "'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
            }
            ContextValue::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<bool> for ContextValue {
    fn from(value: bool) -> Self {
        ContextValue::Bool(value)
    }
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        ContextValue::String(value.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        ContextValue::String(value)
    }
}

impl From<f64> for ContextValue {
    fn from(value: f64) -> Self {
        ContextValue::Number(value)
    }
}

impl From<i64> for ContextValue {
    fn from(value: i64) -> Self {
        ContextValue::Number(value as f64)
    }
}

/// Mutable key/value snapshot used to evaluate preconditions
///
/// The version counts changes: it moves only when a mutation actually alters
/// the mapping, so callers can cache evaluation results per version.
#[derive(Debug, Clone, Default)]
pub struct ContextKeyStore {
    values: HashMap<String, ContextValue>,
    version: u64,
}

impl ContextKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a context key, returning whether the store changed
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> bool {
        let key = key.into();
        let value = value.into();
        if self.values.get(&key) == Some(&value) {
            return false;
        }
        tracing::trace!(key = %key, value = %value, "context key set");
        self.values.insert(key, value);
        self.version += 1;
        true
    }

    /// Remove a context key, returning whether it was present
    pub fn remove(&mut self, key: &str) -> bool {
        if self.values.remove(key).is_some() {
            tracing::trace!(key, "context key removed");
            self.version += 1;
            true
        } else {
            false
        }
    }

    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Unknown keys are falsy
    pub fn is_truthy(&self, key: &str) -> bool {
        self.values.get(key).is_some_and(ContextValue::is_truthy)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
