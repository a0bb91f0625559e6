// ── Configuration YAML validation ──
//
// Parses configuration files with the platform's custom tags accepted and
// reports where `!include`-style directives point. `serde_yaml` keeps any
// `!tag` as a tagged value, so recognised tags are only checked against a
// known list; nothing is resolved or loaded.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

/// Tags the platform's loader understands.
pub const KNOWN_TAGS: &[&str] = &[
    "include",
    "secret",
    "include_dir_list",
    "include_dir_named",
    "include_dir_merge_list",
    "include_dir_merge_named",
    "env_var",
    "input",
];

/// One tagged value found in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Directive {
    /// Dotted key path, list items as `[n]` (e.g. `automation[0].action`).
    pub path: String,
    /// Tag name without the `!`.
    pub tag: String,
    /// Scalar argument, or `None` for non-scalar tagged values.
    pub target: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    Valid {
        directives: Vec<Directive>,
        unknown_tags: Vec<Directive>,
    },
    ParseError {
        message: String,
    },
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub status: FileStatus,
}

impl FileReport {
    /// Missing files and parse errors fail validation. Unknown tags only
    /// warn.
    pub fn is_valid(&self) -> bool {
        matches!(self.status, FileStatus::Valid { .. })
    }
}

pub fn validate_file(path: &Path) -> FileReport {
    let status = match std::fs::read_to_string(path) {
        Ok(text) => validate_str(&text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => FileStatus::Missing,
        Err(e) => FileStatus::ParseError {
            message: e.to_string(),
        },
    };
    tracing::debug!(path = %path.display(), valid = matches!(status, FileStatus::Valid { .. }), "validated yaml");
    FileReport {
        path: path.to_path_buf(),
        status,
    }
}

pub fn validate_str(text: &str) -> FileStatus {
    let mut directives = Vec::new();
    let mut unknown_tags = Vec::new();
    // Multi-document files are rare but legal.
    for document in serde_yaml::Deserializer::from_str(text) {
        let value = match Value::deserialize(document) {
            Ok(v) => v,
            Err(e) => {
                return FileStatus::ParseError {
                    message: e.to_string(),
                };
            }
        };
        collect(&value, String::new(), &mut directives, &mut unknown_tags);
    }
    FileStatus::Valid {
        directives,
        unknown_tags,
    }
}

fn collect(value: &Value, path: String, known: &mut Vec<Directive>, unknown: &mut Vec<Directive>) {
    match value {
        Value::Tagged(tagged) => {
            let tag = tagged.tag.to_string();
            let tag = tag.trim_start_matches('!').to_owned();
            let directive = Directive {
                path: path.clone(),
                target: scalar(&tagged.value),
                tag,
            };
            if KNOWN_TAGS.contains(&directive.tag.as_str()) {
                known.push(directive);
            } else {
                unknown.push(directive);
            }
            collect(&tagged.value, path, known, unknown);
        }
        Value::Mapping(map) => {
            for (key, child) in map {
                let key = scalar(key).unwrap_or_else(|| "?".to_owned());
                let child_path = if path.is_empty() {
                    key
                } else {
                    format!("{path}.{key}")
                };
                collect(child, child_path, known, unknown);
            }
        }
        Value::Sequence(items) => {
            for (i, child) in items.iter().enumerate() {
                collect(child, format!("{path}[{i}]"), known, unknown);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
