//! Message bundles: the key tree of one (locale, namespace) pair.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::sync::Arc;

/// A read-only tree of translation keys.
///
/// Leaves are strings; inner nodes are objects. Clones share the same
/// immutable tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MessageBundle {
    root: Arc<Map<String, Value>>,
}

/// Why a bundle document was rejected.
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bundle root must be a JSON object")]
    NotAnObject,
}

impl MessageBundle {
    /// Parse a bundle from a JSON document.
    pub fn from_json(raw: &str) -> Result<Self, BundleError> {
        match serde_json::from_str::<Value>(raw)? {
            Value::Object(map) => Ok(Self::from_map(map)),
            _ => Err(BundleError::NotAnObject),
        }
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self { root: Arc::new(map) }
    }

    /// Resolve a dotted key path to its string leaf.
    ///
    /// Returns `None` for missing segments and for paths that stop on
    /// anything other than a string.
    pub fn lookup(&self, path: &str) -> Option<&str> {
        if path.is_empty() {
            return None;
        }

        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut node = self.root.get(first)?;
        for segment in segments {
            node = node.as_object()?.get(segment)?;
        }
        node.as_str()
    }

    /// Every dotted path that ends on a string leaf, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        collect_keys(&self.root, "", &mut keys);
        keys.sort();
        keys
    }

    /// Number of string leaves.
    pub fn len(&self) -> usize {
        self.keys().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Serialize for MessageBundle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.root.as_ref().serialize(serializer)
    }
}

fn collect_keys(map: &Map<String, Value>, prefix: &str, out: &mut Vec<String>) {
    for (key, value) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            Value::String(_) => out.push(path),
            Value::Object(child) => collect_keys(child, &path, out),
            _ => {}
        }
    }
}
