use serde_json::Value;

use crate::error::MalformedPayload;

/// Read-only view over an untyped webhook body.
///
/// Every accessor takes a dotted path (`"release.author.login"`) and fails with a
/// [`MalformedPayload`] naming that path instead of panicking on a missing key.
#[derive(Debug, Clone, Copy)]
pub struct Payload<'a> {
    kind: &'static str,
    root: &'a Value,
}

impl<'a> Payload<'a> {
    pub fn new(kind: &'static str, root: &'a Value) -> Self {
        Self { kind, root }
    }

    fn lookup(&self, path: &str) -> Option<&'a Value> {
        path.split('.')
            .try_fold(self.root, |node, key| node.as_object()?.get(key))
    }

    fn malformed(&self, path: &str) -> MalformedPayload {
        MalformedPayload {
            kind: self.kind,
            field: path.to_string(),
        }
    }

    pub fn str_at(&self, path: &str) -> Result<&'a str, MalformedPayload> {
        self.lookup(path)
            .and_then(Value::as_str)
            .ok_or_else(|| self.malformed(path))
    }

    /// Absent and `null` both read as `None`; any other non-string is malformed.
    pub fn opt_str_at(&self, path: &str) -> Result<Option<&'a str>, MalformedPayload> {
        match self.lookup(path) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(self.malformed(path)),
        }
    }

    pub fn i64_at(&self, path: &str) -> Result<i64, MalformedPayload> {
        self.lookup(path)
            .and_then(Value::as_i64)
            .ok_or_else(|| self.malformed(path))
    }

    pub fn u64_at(&self, path: &str) -> Result<u64, MalformedPayload> {
        self.lookup(path)
            .and_then(Value::as_u64)
            .ok_or_else(|| self.malformed(path))
    }

    pub fn bool_at(&self, path: &str) -> Result<bool, MalformedPayload> {
        self.lookup(path)
            .and_then(Value::as_bool)
            .ok_or_else(|| self.malformed(path))
    }

    /// Absent and `null` read as `false`.
    pub fn opt_bool_at(&self, path: &str) -> Result<bool, MalformedPayload> {
        match self.lookup(path) {
            None | Some(Value::Null) => Ok(false),
            Some(Value::Bool(b)) => Ok(*b),
            Some(_) => Err(self.malformed(path)),
        }
    }

    pub fn array_at(&self, path: &str) -> Result<&'a [Value], MalformedPayload> {
        self.lookup(path)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .ok_or_else(|| self.malformed(path))
    }

    /// Scope to an array element, reporting fields as `path[index].field`.
    pub fn element(&self, path: &str, index: usize, value: &'a Value) -> Element<'a> {
        Element {
            kind: self.kind,
            prefix: format!("{path}[{index}]"),
            value,
        }
    }
}

/// One element of a payload array.
#[derive(Debug, Clone)]
pub struct Element<'a> {
    kind: &'static str,
    prefix: String,
    value: &'a Value,
}

impl<'a> Element<'a> {
    pub fn str_at(&self, key: &str) -> Result<&'a str, MalformedPayload> {
        self.value
            .as_object()
            .and_then(|obj| obj.get(key))
            .and_then(Value::as_str)
            .ok_or_else(|| MalformedPayload {
                kind: self.kind,
                field: format!("{}.{key}", self.prefix),
            })
    }
}
