//! Checked access to untrusted JSON documents.
//!
//! Every lookup verifies both the container and the leaf type. A missing key
//! and a mistyped key produce the same [`DocumentError::Field`], naming the
//! container the value was expected in.

use serde_json::{Map, Value};

use crate::error::{DocumentError, Expected, ParseError, ROOT, join_path};

pub fn parse_document(bytes: &[u8]) -> Result<Value, ParseError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Returns `value[key]` if `value` is an object holding `key`.
pub fn object_field<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.as_object()?.get(key)
}

/// A JSON object together with its path from the document root.
#[derive(Debug, Clone)]
pub struct Fields<'a> {
    path: String,
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    pub fn root(document: &'a Value) -> Result<Self, DocumentError> {
        let map = document.as_object().ok_or_else(|| DocumentError::NotAnObject {
            path: ROOT.to_string(),
        })?;
        Ok(Self {
            path: ROOT.to_string(),
            map,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key)
    }

    pub fn object(&self, key: &str) -> Result<Fields<'a>, DocumentError> {
        let map = self.expect(key, Expected::Object, Value::as_object)?;
        Ok(Fields {
            path: join_path(&self.path, key),
            map,
        })
    }

    pub fn number(&self, key: &str) -> Result<f64, DocumentError> {
        self.expect(key, Expected::Number, Value::as_f64)
    }

    /// Integral numbers only: `71` passes, `71.0` does not.
    pub fn integer(&self, key: &str) -> Result<i64, DocumentError> {
        self.expect(key, Expected::Integer, Value::as_i64)
    }

    pub fn string(&self, key: &str) -> Result<&'a str, DocumentError> {
        self.expect(key, Expected::String, Value::as_str)
    }

    /// First element of a numeric array, as used by per-day series.
    pub fn first_number(&self, key: &str) -> Result<f64, DocumentError> {
        self.expect(key, Expected::NumberArray, |value| {
            value.as_array()?.first()?.as_f64()
        })
    }

    fn expect<T>(
        &self,
        key: &str,
        expected: Expected,
        convert: impl FnOnce(&'a Value) -> Option<T>,
    ) -> Result<T, DocumentError> {
        self.get(key)
            .and_then(convert)
            .ok_or_else(|| DocumentError::Field {
                container: self.path.clone(),
                key: key.to_string(),
                expected,
            })
    }
}
