//! The resolved message set of one request.

use crate::i18n::{MessageBundle, Namespace};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Total mapping from every namespace to its bundle, if it loaded.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedMessageSet {
    slots: [Option<MessageBundle>; Namespace::COUNT],
}

impl ResolvedMessageSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a namespace's bundle, replacing any earlier one.
    pub fn insert(&mut self, namespace: Namespace, bundle: MessageBundle) {
        self.slots[namespace.index()] = Some(bundle);
    }

    pub fn get(&self, namespace: Namespace) -> Option<&MessageBundle> {
        self.slots[namespace.index()].as_ref()
    }

    pub fn is_loaded(&self, namespace: Namespace) -> bool {
        self.get(namespace).is_some()
    }

    pub fn loaded_namespaces(&self) -> Vec<Namespace> {
        Namespace::ALL
            .into_iter()
            .filter(|ns| self.is_loaded(*ns))
            .collect()
    }

    pub fn missing_namespaces(&self) -> Vec<Namespace> {
        Namespace::ALL
            .into_iter()
            .filter(|ns| !self.is_loaded(*ns))
            .collect()
    }

    /// Look up a dotted path inside one namespace.
    pub fn lookup(&self, namespace: Namespace, path: &str) -> Option<&str> {
        self.get(namespace)?.lookup(path)
    }
}

impl Serialize for ResolvedMessageSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let loaded = self.loaded_namespaces();
        let mut map = serializer.serialize_map(Some(loaded.len()))?;
        for ns in loaded {
            map.serialize_entry(ns.as_str(), &self.slots[ns.index()])?;
        }
        map.end()
    }
}
