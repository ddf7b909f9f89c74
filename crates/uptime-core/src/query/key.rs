// ── Query keys ──
//
// Structural identity for cache entries: a resource kind plus a sorted
// map of non-null parameters. Two keys built from the same logical
// request compare and hash equal no matter how they were assembled.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;
use strum::Display;
use tracing::warn;

/// Which remote collection a query reads from.
///
/// Mutations declare their invalidation targets in terms of this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ResourceKind {
    Endpoints,
    HealthLogs,
    Analytics,
    Alerts,
}

/// A single key parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl ParamValue {
    /// Convert a JSON value; `null` has no parameter form.
    fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(Self::Bool(b)),
            Value::Number(n) => Some(
                n.as_i64()
                    .map_or_else(|| Self::Str(n.to_string()), Self::Int),
            ),
            Value::String(s) => Some(Self::Str(s)),
            other @ (Value::Array(_) | Value::Object(_)) => Some(Self::Str(other.to_string())),
        }
    }
}

/// Identity of a cached remote read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    kind: ResourceKind,
    params: BTreeMap<String, ParamValue>,
}

impl QueryKey {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            params: BTreeMap::new(),
        }
    }

    /// Build a key from a serializable parameter struct. Fields that
    /// serialize to `null` (or are skipped) are left out.
    pub fn from_params<P: Serialize + ?Sized>(kind: ResourceKind, params: &P) -> Self {
        Self::new(kind).with_params(params)
    }

    /// Add or replace a parameter. `None` removes it, so an absent
    /// optional parameter and an omitted one produce the same key.
    pub fn with<V: Into<ParamValue>>(mut self, name: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => {
                self.params.insert(name.to_owned(), v.into());
            }
            None => {
                self.params.remove(name);
            }
        }
        self
    }

    /// Merge every non-null field of `params` into the key.
    pub fn with_params<P: Serialize + ?Sized>(mut self, params: &P) -> Self {
        match serde_json::to_value(params) {
            Ok(Value::Object(map)) => {
                for (name, value) in map {
                    match ParamValue::from_json(value) {
                        Some(v) => {
                            self.params.insert(name, v);
                        }
                        None => {
                            self.params.remove(&name);
                        }
                    }
                }
            }
            Ok(other) => warn!(kind = %self.kind, value = %other, "query params are not an object"),
            Err(e) => warn!(kind = %self.kind, error = %e, "query params failed to serialize"),
        }
        self
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    pub fn params(&self) -> &BTreeMap<String, ParamValue> {
        &self.params
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{", self.kind)?;
        for (i, (name, value)) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{name}={value}")?;
        }
        f.write_str("}")
    }
}
