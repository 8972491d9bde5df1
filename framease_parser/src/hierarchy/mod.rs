//! Parsed configuration hierarchy
//!
//! [`ConfigHierarchy`] is the typed result of parsing one configuration dump.
//! It is built once by [`crate::syntax::HierarchyParser`] and never mutated
//! afterwards. At plugin boundaries it travels as JSON through
//! [`ConfigHierarchy::to_capability_json`] and
//! [`ConfigHierarchy::from_capability`].

pub mod node;
pub mod ordered;

pub use node::{ConfigNode, ConfigValue};
pub use ordered::OrderedMap;

use serde::{Deserialize, Serialize};

/// Top-level context whose children become [`ConfigHierarchy::interfaces`]
pub const INTERFACE_CONTEXT: &str = "config system interface";
/// Top-level context whose children become [`ConfigHierarchy::admin_accounts`]
pub const ADMIN_CONTEXT: &str = "config system admin";
/// Separator used when joining a context path into a flat log key
pub const PATH_SEPARATOR: &str = "|";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigHierarchy {
    #[serde(rename = "hierarchy")]
    root: ConfigNode,

    /// Flat log of `context|context|set key -> value`
    #[serde(default)]
    config: OrderedMap<String>,

    #[serde(default)]
    interfaces: OrderedMap<ConfigNode>,

    #[serde(default)]
    admin_accounts: OrderedMap<ConfigNode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    fw_version: Option<String>,

    /// Contexts still open at end of input, outermost first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    unclosed_contexts: Vec<String>,
}

/// Flat log key for a setting written under `path`
pub fn flat_key<S: AsRef<str>>(path: &[S], setting: &str) -> String {
    let mut key = path
        .iter()
        .map(|segment| segment.as_ref())
        .collect::<Vec<_>>()
        .join(PATH_SEPARATOR);
    key.push_str(PATH_SEPARATOR);
    key.push_str("set ");
    key.push_str(setting);
    key
}

impl ConfigHierarchy {
    pub(crate) fn from_parts(
        root: ConfigNode,
        config: OrderedMap<String>,
        fw_version: Option<String>,
        unclosed_contexts: Vec<String>,
    ) -> Self {
        let interfaces = index_children(&root, INTERFACE_CONTEXT);
        let admin_accounts = index_children(&root, ADMIN_CONTEXT);
        Self {
            root,
            config,
            interfaces,
            admin_accounts,
            fw_version,
            unclosed_contexts,
        }
    }

    pub fn root(&self) -> &ConfigNode {
        &self.root
    }

    /// Context at `path` (a list of literal directive texts)
    pub fn node_at<S: AsRef<str>>(&self, path: &[S]) -> Option<&ConfigNode> {
        self.root.descend(path)
    }

    pub fn setting_at<S: AsRef<str>>(&self, path: &[S], key: &str) -> Option<&str> {
        self.node_at(path).and_then(|node| node.setting(key))
    }

    pub fn flat_config(&self) -> &OrderedMap<String> {
        &self.config
    }

    /// Direct lookup in the flat log
    pub fn flat_lookup(&self, key: &str) -> Option<&str> {
        self.config.get(key).map(String::as_str)
    }

    pub fn interfaces(&self) -> &OrderedMap<ConfigNode> {
        &self.interfaces
    }

    pub fn admin_accounts(&self) -> &OrderedMap<ConfigNode> {
        &self.admin_accounts
    }

    pub fn fw_version(&self) -> Option<&str> {
        self.fw_version.as_deref()
    }

    pub fn unclosed_contexts(&self) -> &[String] {
        &self.unclosed_contexts
    }

    pub fn is_complete(&self) -> bool {
        self.unclosed_contexts.is_empty()
    }

    /// JSON form published as the `fgt_cli_configuration` capability
    pub fn to_capability_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Rebuild from a capability value produced by [`Self::to_capability_json`]
    pub fn from_capability(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }
}

/// Re-key the child contexts of a top-level context by object name
fn index_children(root: &ConfigNode, context: &str) -> OrderedMap<ConfigNode> {
    let Some(parent) = root.context(context) else {
        return OrderedMap::new();
    };

    parent
        .contexts()
        .filter_map(|(directive, node)| {
            crate::tokens::tokenize(directive)
                .last()
                .map(|name| (crate::tokens::unquote(name), node.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ConfigHierarchy {
        let mut root = ConfigNode::new();
        root.descend_mut_or_insert(&[ADMIN_CONTEXT, "edit \"admin\""])
            .set("accprofile", "\"super_admin\"".to_string());
        root.descend_mut_or_insert(&[INTERFACE_CONTEXT, "edit \"port1\""])
            .set("ip", "10.0.0.1 255.255.255.0".to_string());

        let mut config = OrderedMap::new();
        config.insert(
            flat_key(&[ADMIN_CONTEXT, "edit \"admin\""], "accprofile"),
            "\"super_admin\"".to_string(),
        );

        ConfigHierarchy::from_parts(root, config, Some("7.2.5".to_string()), Vec::new())
    }

    #[test]
    fn test_flat_key_format() {
        assert_eq!(
            flat_key(&["config system admin", "edit \"admin\""], "accprofile"),
            "config system admin|edit \"admin\"|set accprofile"
        );
    }

    #[test]
    fn test_indices_are_keyed_by_unquoted_name() {
        let hierarchy = sample();
        assert!(hierarchy.admin_accounts().contains_key("admin"));
        assert_eq!(
            hierarchy.interfaces().get("port1").unwrap().setting("ip"),
            Some("10.0.0.1 255.255.255.0")
        );
    }

    #[test]
    fn test_missing_index_context_is_empty() {
        let hierarchy =
            ConfigHierarchy::from_parts(ConfigNode::new(), OrderedMap::new(), None, Vec::new());
        assert!(hierarchy.interfaces().is_empty());
        assert!(hierarchy.admin_accounts().is_empty());
    }

    #[test]
    fn test_capability_json_shape_and_round_trip() {
        let hierarchy = sample();
        let json = hierarchy.to_capability_json().unwrap();

        assert_eq!(
            json["hierarchy"]["config system admin"]["edit \"admin\""]["accprofile"],
            "\"super_admin\""
        );
        assert_eq!(
            json["config"]["config system admin|edit \"admin\"|set accprofile"],
            "\"super_admin\""
        );
        assert_eq!(json["fw_version"], "7.2.5");
        assert!(json.get("unclosed_contexts").is_none());

        let back = ConfigHierarchy::from_capability(&json).unwrap();
        assert_eq!(back, hierarchy);
    }

    #[test]
    fn test_lookups() {
        let hierarchy = sample();
        assert_eq!(
            hierarchy.setting_at(&[ADMIN_CONTEXT, "edit \"admin\""], "accprofile"),
            Some("\"super_admin\"")
        );
        assert_eq!(
            hierarchy.flat_lookup("config system admin|edit \"admin\"|set accprofile"),
            Some("\"super_admin\"")
        );
        assert_eq!(hierarchy.fw_version(), Some("7.2.5"));
        assert!(hierarchy.is_complete());
    }
}
