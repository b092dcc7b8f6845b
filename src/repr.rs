//! Plain-map views of the decoded entities.

use serde_json::{Map, Value};

use crate::error::Result;

/// Every entity renders to a compact map (essential fields) and an extended
/// map (adds identifiers, source markup, raw text and classification flags).
pub trait Representation {
    fn represent(&self, extended: bool) -> Result<Map<String, Value>>;

    fn compact(&self) -> Result<Value> {
        self.represent(false).map(Value::Object)
    }

    fn extended(&self) -> Result<Value> {
        self.represent(true).map(Value::Object)
    }

    fn to_json(&self, extended: bool) -> Result<String> {
        let map = self.represent(extended)?;
        Ok(serde_json::to_string_pretty(&map)?)
    }
}

/// Start a map, seeded with the source markup when extended.
pub(crate) fn base_map(html: &str, extended: bool) -> Map<String, Value> {
    let mut map = Map::new();
    if extended {
        map.insert("html".into(), Value::String(html.to_string()));
    }
    map
}

pub(crate) fn list<T: Representation>(items: &[T], extended: bool) -> Result<Value> {
    items
        .iter()
        .map(|item| item.represent(extended).map(Value::Object))
        .collect::<Result<Vec<_>>>()
        .map(Value::Array)
}

/// Whether every key of `compact` shows up in `extended`, recursively.
#[cfg(test)]
pub(crate) fn is_superset(extended: &Value, compact: &Value) -> bool {
    match (extended, compact) {
        (Value::Object(e), Value::Object(c)) => c
            .iter()
            .all(|(k, v)| e.get(k).map_or(false, |ev| is_superset(ev, v))),
        (Value::Array(e), Value::Array(c)) => {
            e.len() == c.len() && e.iter().zip(c).all(|(ev, cv)| is_superset(ev, cv))
        }
        (e, c) => e == c,
    }
}
