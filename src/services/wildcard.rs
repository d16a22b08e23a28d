//! Wildcard tokens (`__name__`) for prompt text

use regex::Regex;
use serde_yaml::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Regex to match wildcard tokens such as `__hair/color__`
static WILDCARD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__[\w\-./*]+__").unwrap());

/// Byte ranges of wildcard tokens in `text`
pub fn find_wildcards(text: &str) -> Vec<(usize, usize)> {
    WILDCARD_REGEX
        .find_iter(text)
        .map(|m| (m.start(), m.end()))
        .collect()
}

/// Append `token`, separated by `", "` unless the text is empty or ends with a comma
pub fn insert_wildcard(text: &str, token: &str) -> String {
    if token.is_empty() {
        return text.to_string();
    }
    let mut result = text.to_string();
    let trimmed = text.trim();
    if !trimmed.is_empty() && !trimmed.ends_with(',') {
        result.push_str(", ");
    }
    result.push_str(token);
    result
}

/// Wildcards available under a directory, loaded once
#[derive(Debug, Clone)]
pub struct WildcardSet {
    root: PathBuf,
    tokens: Option<Vec<String>>,
}

impl WildcardSet {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            tokens: None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tokens(&mut self) -> &[String] {
        if self.tokens.is_none() {
            let tokens = load_tokens(&self.root);
            tracing::debug!(count = tokens.len(), "loaded wildcards");
            self.tokens = Some(tokens);
        }
        self.tokens.as_deref().unwrap_or_default()
    }

    /// Forget the loaded list so the next call rescans the directory
    pub fn reload(&mut self) {
        self.tokens = None;
    }
}

/// Scan `root` for `.txt` and `.yaml`/`.yml` wildcard files
pub fn load_tokens(root: &Path) -> Vec<String> {
    let mut tokens = BTreeSet::new();
    if root.is_dir() {
        collect(root, root, &mut tokens);
    }
    tokens.into_iter().collect()
}

fn collect(root: &Path, dir: &Path, tokens: &mut BTreeSet<String>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Failed to read wildcard dir {}: {}", dir.display(), e);
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect(root, &path, tokens);
            continue;
        }
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        let Some(stem) = relative_stem(root, &path) else {
            continue;
        };

        match ext.as_str() {
            "txt" => {
                tokens.insert(format!("__{}__", stem));
            }
            "yaml" | "yml" => {
                let value = fs::read_to_string(&path)
                    .ok()
                    .and_then(|s| serde_yaml::from_str::<Value>(&s).ok());
                match value {
                    Some(value) => yaml_tokens(&stem, &value, tokens),
                    None => tracing::warn!("Failed to parse wildcard file {}", path.display()),
                }
            }
            _ => {}
        }
    }
}

/// `dir/name` for `root/dir/name.ext`
fn relative_stem(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?.with_extension("");
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// One token per leaf key path of a YAML mapping
fn yaml_tokens(prefix: &str, value: &Value, tokens: &mut BTreeSet<String>) {
    let Value::Mapping(map) = value else {
        return;
    };
    for (key, child) in map {
        let key = match key {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => continue,
        };
        let path = format!("{}/{}", prefix, key);
        if matches!(child, Value::Mapping(_)) {
            yaml_tokens(&path, child, tokens);
        } else {
            tokens.insert(format!("__{}__", path));
        }
    }
}
