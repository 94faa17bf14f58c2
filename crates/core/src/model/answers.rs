use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Answers collected during one survey session, keyed by question key.
///
/// A key holds exactly one value; single-choice questions store the checked
/// option and nothing else.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet(BTreeMap<String, String>);

impl AnswerSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Store a value, returning the previous one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Merge `other` into `self`; values from `other` win.
    pub fn merge(&mut self, other: AnswerSet) {
        self.0.extend(other.0);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AnswerSet {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_prefers_incoming_values() {
        let mut answers: AnswerSet = [("department", "営業部"), ("position", "シニア")]
            .into_iter()
            .collect();
        let incoming: AnswerSet = [("department", "人事部")].into_iter().collect();

        answers.merge(incoming);

        assert_eq!(answers.get("department"), Some("人事部"));
        assert_eq!(answers.get("position"), Some("シニア"));
        assert_eq!(answers.len(), 2);
    }

    #[test]
    fn set_replaces_single_value() {
        let mut answers = AnswerSet::new();
        assert_eq!(answers.set("age_group", "20代"), None);
        assert_eq!(answers.set("age_group", "30代").as_deref(), Some("20代"));
        assert_eq!(answers.get("age_group"), Some("30代"));
    }
}
