//! Key/value form input.
//!
//! Mirrors an HTML form POST: scalar keys carry one value, repeated keys
//! (conventionally named `key[]`) carry one value per table row. The `[]`
//! suffix is stripped so `hotel_name[]` and `hotel_name` address the same
//! list.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

/// Raw form fields, keyed by normalized field name.
///
/// JSON keys are merged in sorted order, so `day` comes before `day[]` when
/// a body carries both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "BTreeMap<String, FormValue>")]
pub struct FormFields {
    fields: HashMap<String, Vec<String>>,
}

/// A JSON form value: a single string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    One(String),
    Many(Vec<String>),
}

impl From<BTreeMap<String, FormValue>> for FormFields {
    fn from(map: BTreeMap<String, FormValue>) -> Self {
        let mut form = FormFields::default();
        for (key, value) in map {
            let entry = form.fields.entry(normalize_key(&key)).or_default();
            match value {
                FormValue::One(v) => entry.push(v),
                FormValue::Many(vs) => entry.extend(vs),
            }
        }
        form
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().trim_end_matches("[]").to_string()
}

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(key, value)` pairs in submission order. Repeated keys
    /// accumulate.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut form = FormFields::default();
        for (key, value) in pairs {
            form.insert(&key, value);
        }
        form
    }

    /// Parse a JSON object whose values are strings or arrays of strings.
    pub fn from_json(json: &str) -> Result<Self, crate::error::VoucherError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.fields
            .entry(normalize_key(key))
            .or_default()
            .push(value.into());
    }

    /// First value for `key`, or `""` when absent.
    pub fn get(&self, key: &str) -> &str {
        self.fields
            .get(key)
            .and_then(|v| v.first())
            .map(String::as_str)
            .unwrap_or("")
    }

    /// All values for `key`, or an empty slice when absent.
    pub fn get_list(&self, key: &str) -> &[String] {
        self.fields.get(key).map(Vec::as_slice).unwrap_or(&[])
    }
}
