use super::ordered::OrderedMap;
use serde::{Deserialize, Serialize};

/// A value stored under a key in a [`ConfigNode`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// Leaf written by `set <key> <value...>`
    Setting(String),
    /// Child context opened by `config ...` or `edit ...`
    Context(ConfigNode),
}

/// One level of the configuration tree.
///
/// Child contexts are keyed by their literal directive text (for example
/// `config firewall policy` or `edit "policy1"`); settings are keyed by the
/// bare setting name. Both share a single insertion-ordered namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigNode {
    entries: OrderedMap<ConfigValue>,
}

impl ConfigNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.get(key)
    }

    /// Setting value for `key`, if `key` holds a setting
    pub fn setting(&self, key: &str) -> Option<&str> {
        match self.entries.get(key) {
            Some(ConfigValue::Setting(value)) => Some(value),
            _ => None,
        }
    }

    /// Child context named `name`, if present
    pub fn context(&self, name: &str) -> Option<&ConfigNode> {
        match self.entries.get(name) {
            Some(ConfigValue::Context(node)) => Some(node),
            _ => None,
        }
    }

    /// Walk a path of context names from this node
    pub fn descend<S: AsRef<str>>(&self, path: &[S]) -> Option<&ConfigNode> {
        path.iter()
            .try_fold(self, |node, segment| node.context(segment.as_ref()))
    }

    /// Child contexts in insertion order
    pub fn contexts(&self) -> impl Iterator<Item = (&str, &ConfigNode)> {
        self.entries.iter().filter_map(|(k, v)| match v {
            ConfigValue::Context(node) => Some((k, node)),
            ConfigValue::Setting(_) => None,
        })
    }

    /// Settings in insertion order
    pub fn settings(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(|(k, v)| match v {
            ConfigValue::Setting(value) => Some((k, value.as_str())),
            ConfigValue::Context(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key, ConfigValue::Setting(value));
    }

    /// Child context `name`, created if missing. A setting stored under the
    /// same key is replaced by the new context.
    pub(crate) fn context_mut_or_insert(&mut self, name: &str) -> &mut ConfigNode {
        if !matches!(self.entries.get(name), Some(ConfigValue::Context(_))) {
            self.entries
                .insert(name, ConfigValue::Context(ConfigNode::new()));
        }
        match self.entries.get_mut(name) {
            Some(ConfigValue::Context(node)) => node,
            _ => unreachable!("context entry vanished during insertion"),
        }
    }

    /// Walk (creating as needed) a path of context names
    pub(crate) fn descend_mut_or_insert<S: AsRef<str>>(&mut self, path: &[S]) -> &mut ConfigNode {
        path.iter().fold(self, |node, segment| {
            node.context_mut_or_insert(segment.as_ref())
        })
    }
}
