use std::fmt;

use serde::{Deserialize, Serialize};

use super::invocation::InvocationRequest;

/// Key used when a request carries no usable `path`.
pub const ROOT_ROUTE: &str = "/";

/// Identifier of a logical endpoint; indexes the hit counter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteKey(String);

impl RouteKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Derive the key for an invocation.
    ///
    /// Pure and total: the `path` field is used verbatim when it is a
    /// non-empty string, otherwise the root route is used.
    pub fn of(req: &InvocationRequest) -> Self {
        match req.path() {
            Some(p) if !p.is_empty() => Self(p.to_string()),
            _ => Self(ROOT_ROUTE.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RouteKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RouteKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for RouteKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
