//! File-typed input expansion
//!
//! A key `type:<name>` holding `"file"` marks `<name>` as a path. Expansion
//! reads that file through the parser's [`FileProcessor`] and stores its
//! lines under `filedata:<name>`, unless already present.

use crate::plugins::PluginError;
use crate::types::CapabilityData;
use framease_parser::log_debug;
use framease_parser::FileProcessor;
use serde_json::Value;

pub const FILE_TYPE_PREFIX: &str = "type:";
pub const FILE_DATA_PREFIX: &str = "filedata:";
pub const FILE_TYPE_MARKER: &str = "file";

pub fn file_data_key(name: &str) -> String {
    format!("{}{}", FILE_DATA_PREFIX, name)
}

/// Whether `name` is satisfied by its raw value or its expanded lines
pub fn has_input(bag: &CapabilityData, name: &str) -> bool {
    bag.contains_key(name) || bag.contains_key(&file_data_key(name))
}

/// Names marked as file-typed inputs
pub fn file_markers(bag: &CapabilityData) -> Vec<String> {
    bag.iter()
        .filter_map(|(key, value)| {
            let name = key.strip_prefix(FILE_TYPE_PREFIX)?;
            (value.as_str() == Some(FILE_TYPE_MARKER)).then(|| name.to_string())
        })
        .collect()
}

/// Expand every file marker in `bag`, returning the names expanded
pub fn expand_file_markers(
    bag: &mut CapabilityData,
    files: &FileProcessor,
) -> Result<Vec<String>, PluginError> {
    let mut expanded = Vec::new();
    for name in file_markers(bag) {
        let data_key = file_data_key(&name);
        if bag.contains_key(&data_key) {
            continue;
        }

        let path = match bag.get(&name) {
            Some(Value::String(path)) => path.clone(),
            Some(other) => {
                return Err(PluginError::FileExpansion {
                    name,
                    path: other.to_string(),
                    reason: "file input must be a path string".to_string(),
                })
            }
            None => {
                return Err(PluginError::FileExpansion {
                    name,
                    path: String::new(),
                    reason: "no path stored for file input".to_string(),
                })
            }
        };

        let lines = files
            .read_lines(&path)
            .map_err(|e| PluginError::FileExpansion {
                name: name.clone(),
                path: path.clone(),
                reason: e.to_string(),
            })?;
        log_debug!("Expanded file input", "name" => &name, "path" => &path, "lines" => lines.len());

        bag.insert(data_key, Value::Array(lines.into_iter().map(Value::String).collect()));
        expanded.push(name);
    }
    Ok(expanded)
}

/// Lines of a file-typed input: the expanded `filedata:<name>` array, an
/// inline array of strings, or an inline string split on newlines
pub fn input_lines(bag: &CapabilityData, name: &str) -> Option<Vec<String>> {
    let strings = |items: &Vec<Value>| -> Option<Vec<String>> {
        items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect()
    };
    if let Some(Value::Array(items)) = bag.get(&file_data_key(name)) {
        return strings(items);
    }
    match bag.get(name)? {
        Value::Array(items) => strings(items),
        Value::String(text) if !is_marked_file(bag, name) => {
            Some(text.lines().map(str::to_string).collect())
        }
        _ => None,
    }
}

fn is_marked_file(bag: &CapabilityData, name: &str) -> bool {
    bag.get(&format!("{}{}", FILE_TYPE_PREFIX, name))
        .and_then(Value::as_str)
        == Some(FILE_TYPE_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    fn bag(value: Value) -> CapabilityData {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_expand_marker() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fw.conf");
        fs::write(&path, "config system global\nend\n").unwrap();

        let mut data = bag(json!({
            "file": path.to_str().unwrap(),
            "type:file": "file",
            "type:other": "str"
        }));
        let expanded = expand_file_markers(&mut data, &FileProcessor::new()).unwrap();
        assert_eq!(expanded, vec!["file"]);
        assert_eq!(data["filedata:file"], json!(["config system global", "end"]));
        assert!(!data.contains_key("filedata:other"));
        assert_eq!(
            input_lines(&data, "file").unwrap(),
            vec!["config system global", "end"]
        );
    }

    #[test]
    fn test_existing_filedata_is_kept() {
        let mut data = bag(json!({
            "file": "/does/not/exist",
            "type:file": "file",
            "filedata:file": ["end"]
        }));
        let expanded = expand_file_markers(&mut data, &FileProcessor::new()).unwrap();
        assert!(expanded.is_empty());
        assert_eq!(data["filedata:file"], json!(["end"]));
    }

    #[test]
    fn test_missing_file_fails() {
        let mut data = bag(json!({"file": "/does/not/exist", "type:file": "file"}));
        let err = expand_file_markers(&mut data, &FileProcessor::new()).unwrap_err();
        assert_matches!(err, PluginError::FileExpansion { name, .. } if name == "file");

        let mut data = bag(json!({"type:file": "file"}));
        assert!(expand_file_markers(&mut data, &FileProcessor::new()).is_err());
    }

    #[test]
    fn test_inline_inputs() {
        let data = bag(json!({"file": ["a", "b"]}));
        assert_eq!(input_lines(&data, "file").unwrap(), vec!["a", "b"]);
        assert!(has_input(&data, "file"));

        let data = bag(json!({"file": "a\nb"}));
        assert_eq!(input_lines(&data, "file").unwrap(), vec!["a", "b"]);

        // A path that was never expanded is not treated as content
        let data = bag(json!({"file": "/tmp/x.conf", "type:file": "file"}));
        assert!(input_lines(&data, "file").is_none());
        assert!(input_lines(&data, "absent").is_none());
    }
}
