//! Shared key/value store for a single run.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde_json::Value;

/// Context key holding the run directory.
pub const RUN_DIRECTORY_KEY: &str = "run_directory";

/// Context key holding the current step's directory.
pub const STEP_DIRECTORY_KEY: &str = "step_directory";

/// Mutable key/value store shared by every step in a run.
///
/// The engine creates one context per run from the caller's initial
/// entries, sets [`RUN_DIRECTORY_KEY`] once, and overwrites
/// [`STEP_DIRECTORY_KEY`] before each step when step directories are
/// enabled. Steps may read and overwrite any key, including those two;
/// there is no isolation between steps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunContext {
    values: IndexMap<String, Value>,
}

impl RunContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the previous one for that key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    /// Get a value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Get a string value.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Get a boolean value.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    /// Get an integer value.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    /// Get a string value as a path.
    pub fn get_path(&self, key: &str) -> Option<PathBuf> {
        self.get_str(key).map(PathBuf::from)
    }

    /// Remove a value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.shift_remove(key)
    }

    /// Check whether a key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check whether the context is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Directory created for the current run.
    pub fn run_directory(&self) -> Option<PathBuf> {
        self.get_path(RUN_DIRECTORY_KEY)
    }

    /// Directory created for the step currently executing.
    pub fn step_directory(&self) -> Option<PathBuf> {
        self.get_path(STEP_DIRECTORY_KEY)
    }

    pub(crate) fn set_run_directory(&mut self, dir: &std::path::Path) {
        self.insert(RUN_DIRECTORY_KEY, dir.to_string_lossy().into_owned());
    }

    pub(crate) fn set_step_directory(&mut self, dir: &std::path::Path) {
        self.insert(STEP_DIRECTORY_KEY, dir.to_string_lossy().into_owned());
    }

    /// Consume the context, returning its entries.
    pub fn into_inner(self) -> IndexMap<String, Value> {
        self.values
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for RunContext {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl From<IndexMap<String, Value>> for RunContext {
    fn from(values: IndexMap<String, Value>) -> Self {
        Self { values }
    }
}
