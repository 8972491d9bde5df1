//! Configuration hierarchy construction
//!
//! Turns logical lines of `config`/`edit`/`set`/`next`/`end` directives into a
//! [`ConfigHierarchy`]. Parsing is total over arbitrary text except for the
//! structural errors in [`ParseError`].

pub mod error;

pub use error::{ParseError, ParseResult};

use crate::config::compile_time::syntax::MAX_CONTEXT_DEPTH;
use crate::config::runtime::ParserPreferences;
use crate::hierarchy::{flat_key, ConfigHierarchy, ConfigNode, OrderedMap};
use crate::lexical::{self, LogicalLine};
use crate::logging::codes;
use crate::tokens::{tokenize, Directive};
use crate::{log_debug, log_error, log_success, log_warning};

/// Prefix of the version comment FortiOS writes on the first line of a dump
pub const VERSION_COMMENT_PREFIX: &str = "#config-version";

/// Counters collected while building a hierarchy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStatistics {
    pub logical_lines: usize,
    pub contexts_opened: usize,
    pub settings: usize,
    pub ignored_lines: usize,
    pub max_depth: usize,
}

pub struct HierarchyParser {
    preferences: ParserPreferences,
    statistics: ParseStatistics,
}

impl HierarchyParser {
    pub fn new() -> Self {
        Self::with_preferences(ParserPreferences::default())
    }

    pub fn with_preferences(preferences: ParserPreferences) -> Self {
        Self {
            preferences,
            statistics: ParseStatistics::default(),
        }
    }

    /// Statistics of the most recent parse
    pub fn statistics(&self) -> ParseStatistics {
        self.statistics
    }

    pub fn parse(&mut self, raw_text: &str) -> ParseResult<ConfigHierarchy> {
        let lines = lexical::logical_lines(raw_text)?;
        self.build(&lines)
    }

    /// Parse a dump already split into physical lines
    pub fn parse_lines<'a, I>(&mut self, physical: I) -> ParseResult<ConfigHierarchy>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let lines = lexical::assemble_lines(physical)?;
        self.build(&lines)
    }

    fn build(&mut self, lines: &[LogicalLine]) -> ParseResult<ConfigHierarchy> {
        self.statistics = ParseStatistics::default();

        let mut root = ConfigNode::new();
        let mut flat = OrderedMap::new();
        let mut path: Vec<String> = Vec::new();
        let mut fw_version = None;

        for line in lines {
            let text = line.text.trim();
            if text.is_empty() {
                continue;
            }
            self.statistics.logical_lines += 1;

            if text.starts_with(VERSION_COMMENT_PREFIX) {
                if let Some(version) = text.split('-').nth(2) {
                    fw_version = Some(version.to_string());
                }
            }

            let tokens = tokenize(text);
            let Some(first) = tokens.first() else {
                continue;
            };

            match Directive::classify(first) {
                Directive::Config | Directive::Edit => {
                    if path.len() >= MAX_CONTEXT_DEPTH {
                        let err = ParseError::ContextTooDeep {
                            line: line.number,
                            depth: MAX_CONTEXT_DEPTH,
                        };
                        log_error!(err.error_code(), &err.to_string(), line = line.number);
                        return Err(err);
                    }
                    path.push(text.to_string());
                    root.descend_mut_or_insert(&path);
                    self.statistics.contexts_opened += 1;
                    self.statistics.max_depth = self.statistics.max_depth.max(path.len());
                }
                directive @ (Directive::Next | Directive::End) => {
                    if path.pop().is_none() {
                        let err = ParseError::unbalanced_nesting(line.number, directive.as_str());
                        log_error!(err.error_code(), &err.to_string(), line = line.number);
                        return Err(err);
                    }
                }
                Directive::Set => {
                    if path.is_empty() {
                        let err = ParseError::set_outside_context(line.number);
                        log_error!(err.error_code(), &err.to_string(), line = line.number);
                        return Err(err);
                    }
                    let Some(key) = tokens.get(1) else {
                        log_warning!(
                            code = codes::parser::EMPTY_SET_DIRECTIVE,
                            "Skipping 'set' without a key",
                            line = line.number
                        );
                        self.statistics.ignored_lines += 1;
                        continue;
                    };
                    let value = tokens[2..].join(" ");

                    if self.preferences.keep_flat_log {
                        flat.insert(flat_key(&path, key), value.clone());
                    }
                    root.descend_mut_or_insert(&path).set(key, value);
                    self.statistics.settings += 1;
                }
                Directive::Other => {
                    log_debug!("Ignoring directive", "line" => line.number, "token" => first);
                    self.statistics.ignored_lines += 1;
                }
            }
        }

        if !path.is_empty() {
            if self.preferences.strict_unclosed_contexts {
                let err = ParseError::UnclosedContexts { contexts: path };
                log_error!(err.error_code(), &err.to_string());
                return Err(err);
            }
            log_warning!(
                code = codes::parser::UNCLOSED_CONTEXT,
                "Contexts left open at end of input",
                "depth" => path.len(),
                "innermost" => path.last().map(String::as_str).unwrap_or_default()
            );
        }

        log_success!(
            codes::success::PARSE_COMPLETE,
            "Configuration hierarchy parsed",
            "lines" => self.statistics.logical_lines,
            "contexts" => self.statistics.contexts_opened,
            "settings" => self.statistics.settings
        );

        Ok(ConfigHierarchy::from_parts(root, flat, fw_version, path))
    }
}

impl Default for HierarchyParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse raw dump text with default preferences
pub fn parse(raw_text: &str) -> ParseResult<ConfigHierarchy> {
    HierarchyParser::new().parse(raw_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn lenient() -> HierarchyParser {
        HierarchyParser::with_preferences(ParserPreferences {
            strict_unclosed_contexts: false,
            keep_flat_log: true,
        })
    }

    const ADMIN_DUMP: &str = "config system admin\nedit \"admin\"\nset accprofile \"super_admin\"\nnext\nend\n";

    #[test]
    fn test_admin_example_hierarchy() {
        let hierarchy = lenient().parse(ADMIN_DUMP).unwrap();
        let json = serde_json::to_value(hierarchy.root()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "config system admin": {"edit \"admin\"": {"accprofile": "\"super_admin\""}}
            })
        );
        assert!(hierarchy.admin_accounts().contains_key("admin"));
        assert!(hierarchy.is_complete());
    }

    #[test]
    fn test_set_value_is_space_joined_remainder() {
        let hierarchy = lenient()
            .parse("config system dns\n    set primary   v1    v2\nend")
            .unwrap();
        assert_eq!(
            hierarchy.setting_at(&["config system dns"], "primary"),
            Some("v1 v2")
        );
        assert_eq!(
            hierarchy.flat_lookup("config system dns|set primary"),
            Some("v1 v2")
        );
    }

    #[test]
    fn test_indented_contexts_are_trimmed() {
        let dump = "config firewall policy\n    edit 1\n        set action accept\n    next\nend";
        let hierarchy = lenient().parse(dump).unwrap();
        assert_eq!(
            hierarchy.setting_at(&["config firewall policy", "edit 1"], "action"),
            Some("accept")
        );
    }

    #[test]
    fn test_multiline_quoted_value_reassembled() {
        let dump = "config system global\nset post-login-banner \"line one\nline two\"\nend";
        let hierarchy = lenient().parse(dump).unwrap();
        assert_eq!(
            hierarchy.setting_at(&["config system global"], "post-login-banner"),
            Some("\"line one\\nline two\"")
        );
    }

    #[test]
    fn test_unbalanced_end_is_error() {
        let err = lenient().parse("config system admin\nend\nend").unwrap_err();
        assert_matches!(err, ParseError::UnbalancedNesting { line: 3, .. });
    }

    #[test]
    fn test_set_outside_context_is_error() {
        let err = lenient().parse("set hostname fw").unwrap_err();
        assert_matches!(err, ParseError::SetOutsideContext { line: 1 });
    }

    #[test]
    fn test_unclosed_contexts_tolerated_and_flagged() {
        let hierarchy = lenient()
            .parse("config system admin\nedit \"admin\"\nset a b")
            .unwrap();
        assert_eq!(
            hierarchy.unclosed_contexts(),
            &["config system admin".to_string(), "edit \"admin\"".to_string()]
        );
        assert!(!hierarchy.is_complete());
    }

    #[test]
    fn test_unclosed_contexts_strict_mode() {
        let mut parser = HierarchyParser::with_preferences(ParserPreferences {
            strict_unclosed_contexts: true,
            keep_flat_log: true,
        });
        let err = parser.parse("config system admin").unwrap_err();
        assert_matches!(err, ParseError::UnclosedContexts { ref contexts } if contexts.len() == 1);
    }

    #[test]
    fn test_fw_version_from_comment() {
        let dump = "#config-version=FGT60F-7.2.5-FW-build1517-230606:opmode=0:vdom=0\nconfig system global\nend";
        let hierarchy = lenient().parse(dump).unwrap();
        assert_eq!(hierarchy.fw_version(), Some("7.2.5"));
    }

    #[test]
    fn test_unknown_directives_and_blank_lines_ignored() {
        let mut parser = lenient();
        let hierarchy = parser
            .parse("\n\nconfig system global\n    unset timezone\n\n    set hostname fw\nend\n")
            .unwrap();
        assert_eq!(hierarchy.setting_at(&["config system global"], "hostname"), Some("fw"));
        let stats = parser.statistics();
        assert_eq!(stats.ignored_lines, 1);
        assert_eq!(stats.settings, 1);
        assert_eq!(stats.contexts_opened, 1);
    }

    #[test]
    fn test_set_without_key_is_skipped() {
        let hierarchy = lenient().parse("config system global\nset\nend").unwrap();
        assert!(hierarchy.node_at(&["config system global"]).unwrap().is_empty());
    }

    #[test]
    fn test_parsing_is_deterministic() {
        let dump = "config firewall address\nedit \"a\"\nset subnet 10.0.0.0 255.0.0.0\nnext\nedit \"b\"\nset fqdn x.example\nnext\nend";
        let first = lenient().parse(dump).unwrap();
        let second = lenient().parse(dump).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_depth_limit() {
        let mut dump = String::new();
        for i in 0..=MAX_CONTEXT_DEPTH {
            dump.push_str(&format!("edit {}\n", i));
        }
        let err = lenient().parse(&dump).unwrap_err();
        assert_matches!(err, ParseError::ContextTooDeep { .. });
    }

    #[test]
    fn test_flat_log_can_be_disabled() {
        let mut parser = HierarchyParser::with_preferences(ParserPreferences {
            strict_unclosed_contexts: false,
            keep_flat_log: false,
        });
        let hierarchy = parser.parse(ADMIN_DUMP).unwrap();
        assert!(hierarchy.flat_config().is_empty());
    }

    #[test]
    fn test_parse_lines_matches_parse() {
        let from_text = lenient().parse(ADMIN_DUMP).unwrap();
        let from_lines = lenient().parse_lines(ADMIN_DUMP.lines()).unwrap();
        assert_eq!(from_text, from_lines);
    }
}
