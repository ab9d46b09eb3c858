//! Message namespaces.
//!
//! Each namespace is a group of related keys shipped as one bundle file per
//! locale. The set is fixed at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    Common,
    Landing,
    Auth,
    Courses,
    Categories,
    Marketplace,
}

impl Namespace {
    /// Every namespace, in load order.
    pub const ALL: [Namespace; 6] = [
        Namespace::Common,
        Namespace::Landing,
        Namespace::Auth,
        Namespace::Courses,
        Namespace::Categories,
        Namespace::Marketplace,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// Name used as key prefix and bundle file stem.
    pub const fn as_str(self) -> &'static str {
        match self {
            Namespace::Common => "common",
            Namespace::Landing => "landing",
            Namespace::Auth => "auth",
            Namespace::Courses => "courses",
            Namespace::Categories => "categories",
            Namespace::Marketplace => "marketplace",
        }
    }

    /// Slot of this namespace in `ALL`.
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown namespace: '{0}'")]
pub struct UnknownNamespace(pub String);

impl FromStr for Namespace {
    type Err = UnknownNamespace;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Namespace::ALL
            .into_iter()
            .find(|ns| ns.as_str() == s)
            .ok_or_else(|| UnknownNamespace(s.to_string()))
    }
}
