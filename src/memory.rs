use crate::client::{KeyValueRecord, KvClient, Reply};
use crate::Result;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// In-process key value client backed by a last-write-wins map.
///
/// Listing follows first-insertion order. Every trait call is counted so
/// callers can check whether the service was reached at all.
#[derive(Default, Debug)]
pub struct MemoryClient {
    data: HashMap<String, String>,
    order: Vec<String>,
    calls: usize,
    last_import: Option<Map<String, Value>>,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The mapping handed to the most recent nested import.
    pub fn last_import(&self) -> Option<&Map<String, Value>> {
        self.last_import.as_ref()
    }

    fn insert(&mut self, key: String, value: String) {
        if self.data.insert(key.clone(), value).is_none() {
            self.order.push(key);
        }
    }
}

impl KvClient for MemoryClient {
    fn set_key_value_pairs(
        &mut self,
        names: Vec<String>,
        values: Vec<String>,
    ) -> Result<Reply<()>> {
        self.calls += 1;
        if names.len() != values.len() {
            return Ok(Reply::Failed(format!(
                "{} names but {} values",
                names.len(),
                values.len()
            )));
        }
        for (k, v) in names.into_iter().zip(values) {
            self.insert(k, v);
        }
        Ok(Reply::Found(()))
    }

    fn get_key_value(&mut self, name: &str) -> Result<Reply<String>> {
        self.calls += 1;
        Ok(match self.data.get(name) {
            Some(value) => Reply::Found(value.to_string()),
            None => Reply::NotFound,
        })
    }

    fn delete_key_value(&mut self, name: &str) -> Result<Reply<()>> {
        self.calls += 1;
        if self.data.remove(name).is_none() {
            return Ok(Reply::NotFound);
        }
        self.order.retain(|k| k != name);
        Ok(Reply::Found(()))
    }

    fn list_key_values(&mut self) -> Result<Vec<KeyValueRecord>> {
        self.calls += 1;
        Ok(self
            .order
            .iter()
            .map(|k| KeyValueRecord::new(k.as_str(), self.data[k].as_str()))
            .collect())
    }

    fn set_key_value_pairs_from_nested_dict(
        &mut self,
        mapping: Map<String, Value>,
    ) -> Result<String> {
        self.calls += 1;
        let mut pairs = Vec::new();
        flatten("", &mapping, &mut pairs);

        let count = pairs.len();
        for (k, v) in pairs {
            self.insert(k, v);
        }
        self.last_import = Some(mapping);
        Ok(format!("Set {} key value pairs", count))
    }
}

/// Collects the leaves of `mapping` under dot-joined keys.
fn flatten(prefix: &str, mapping: &Map<String, Value>, out: &mut Vec<(String, String)>) {
    for (k, v) in mapping {
        let key = if prefix.is_empty() {
            k.clone()
        } else {
            format!("{}.{}", prefix, k)
        };
        match v {
            Value::Object(inner) => flatten(&key, inner, out),
            Value::String(s) => out.push((key, s.clone())),
            other => out.push((key, other.to_string())),
        }
    }
}
