//! Read access to sparse JSON payloads
//!
//! [`Payload`] implements the merge rule shared by every state record: a key
//! that is missing, `null`, or of an unusable type leaves the current value
//! alone. Otherwise the raw value is converted and overwrites the field.

use serde_json::{Map, Value};
use tracing::debug;

/// Extraction of a typed value from a raw JSON value
pub trait FromWire<'a>: Sized {
    fn from_wire(value: &'a Value) -> Option<Self>;
}

impl<'a> FromWire<'a> for &'a Value {
    fn from_wire(value: &'a Value) -> Option<Self> {
        Some(value)
    }
}

impl FromWire<'_> for i64 {
    /// Integers, floats (rounded half to even) and numeric strings are accepted.
    fn from_wire(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f.round_ties_even() as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl FromWire<'_> for f64 {
    fn from_wire(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl FromWire<'_> for String {
    fn from_wire(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl FromWire<'_> for bool {
    fn from_wire(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

/// A borrowed JSON object received from the API
#[derive(Debug, Clone, Copy)]
pub struct Payload<'a> {
    map: Option<&'a Map<String, Value>>,
}

impl<'a> Payload<'a> {
    /// Wrap a JSON value. Anything other than an object behaves as an empty payload.
    pub fn new(value: &'a Value) -> Self {
        Self {
            map: value.as_object(),
        }
    }

    /// The value for `key` when present and not `null`
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.map?.get(key).filter(|value| !value.is_null())
    }

    /// Typed value for `key`
    pub fn value<W: FromWire<'a>>(&self, key: &str) -> Option<W> {
        let raw = self.get(key)?;
        let typed = W::from_wire(raw);
        if typed.is_none() {
            debug!(key, value = %raw, "Ignoring value of unexpected type");
        }
        typed
    }

    /// Convert `key` and overwrite `slot`, or leave `slot` untouched
    pub fn merge<W, T>(&self, key: &str, slot: &mut Option<T>, convert: impl FnOnce(Option<W>) -> Option<T>)
    where
        W: FromWire<'a>,
    {
        if let Some(raw) = self.value::<W>(key) {
            *slot = convert(Some(raw));
        }
    }

    /// Like [`merge`](Self::merge), but a conversion that yields nothing
    /// keeps the previous value
    pub fn merge_converted<W, T>(&self, key: &str, slot: &mut Option<T>, convert: impl FnOnce(Option<W>) -> Option<T>)
    where
        W: FromWire<'a>,
    {
        if let Some(converted) = self.value::<W>(key).and_then(|raw| convert(Some(raw))) {
            *slot = Some(converted);
        }
    }

    /// Like [`merge`](Self::merge) without a conversion
    pub fn merge_raw<W: FromWire<'a>>(&self, key: &str, slot: &mut Option<W>) {
        if let Some(raw) = self.value::<W>(key) {
            *slot = Some(raw);
        }
    }
}
