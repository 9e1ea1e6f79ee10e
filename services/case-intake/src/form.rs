// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Order-preserving multi-map of submitted fields.

/// Field name to values, keeping keys in first-seen order.
///
/// Forms are small, so lookups are a linear scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalForm {
    entries: Vec<(String, Vec<String>)>,
}

impl CanonicalForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` under `key`, creating the key if needed.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }

    /// All values for `key`, in insertion order.
    pub fn values(&self, key: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }

    /// First value for `key`, or `""` when absent.
    pub fn first(&self, key: &str) -> &str {
        self.values(key).first().map(String::as_str).unwrap_or("")
    }

    /// Append every entry of `other`, keeping values already present.
    pub fn merge(&mut self, other: CanonicalForm) {
        for (key, values) in other.entries {
            for value in values {
                self.add(key.clone(), value);
            }
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<K, V> FromIterator<(K, V)> for CanonicalForm
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut form = CanonicalForm::new();
        for (key, value) in iter {
            form.add(key, value);
        }
        form
    }
}
