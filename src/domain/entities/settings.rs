use std::collections::HashMap;
use std::sync::Arc;

/// Opaque guild identifier as handed over by the chat platform
pub type GuildId = String;

/// Setting holding the guild's language code
pub const LANGUAGE_KEY: &str = "LANGUAGE";

/// Immutable snapshot of one guild's settings.
///
/// Keys are case-sensitive and an empty value is a present value, distinct
/// from an absent key. Cloning is cheap; later writes through the cache do
/// not change a snapshot already handed out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsView {
    values: Arc<HashMap<String, String>>,
}

impl SettingsView {
    pub fn new(values: Arc<HashMap<String, String>>) -> Self {
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn language(&self) -> Option<&str> {
        self.get(LANGUAGE_KEY)
    }
}

impl From<HashMap<String, String>> for SettingsView {
    fn from(values: HashMap<String, String>) -> Self {
        Self::new(Arc::new(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_value_is_present() {
        let mut values = HashMap::new();
        values.insert("PREFIX".to_string(), String::new());
        let view = SettingsView::from(values);

        assert!(view.contains("PREFIX"));
        assert_eq!(view.get("PREFIX"), Some(""));
        assert_eq!(view.get("prefix"), None);
    }
}
