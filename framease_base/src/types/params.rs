//! Declared parameter shapes of check plugins

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed vocabulary of parameter kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    Str,
    List,
    Obj,
    Json,
}

impl ParamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKind::Str => "str",
            ParamKind::List => "list",
            ParamKind::Obj => "obj",
            ParamKind::Json => "json",
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `(kind, name, description)` entry of a check's parameter list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub kind: ParamKind,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl ParamSpec {
    pub fn new(kind: ParamKind, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            description: description.into(),
        }
    }
}
