//! Prompt library - the directory of CSV prompt files
//!
//! Each CSV maps a label (first column) to an output prompt (second column).
//! Parsed files are cached by relative path and re-read when their
//! modification time changes.

use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use thiserror::Error;

const CSV_EXT: &str = ".csv";
const SNIFF_SAMPLE_BYTES: usize = 4096;
const SNIFF_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Errors raised by library and import operations
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Only .csv files are allowed")]
    NotCsv,
    #[error("Invalid filename")]
    InvalidName,
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("{filename} already exists with different content (suggested: {suggested})")]
    NameConflict { filename: String, suggested: String },
    #[error("Failed to parse {file}: {source}")]
    Parse { file: String, source: csv::Error },
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl LibraryError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        LibraryError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Parsed contents of one prompt file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptFile {
    /// Labels in first-seen order
    pub labels: Vec<String>,
    /// Label to output; the last row with a label wins
    pub map: HashMap<String, String>,
}

impl PromptFile {
    pub fn output(&self, label: &str) -> Option<&str> {
        self.map.get(label).map(String::as_str)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Name Sanitizing
// ═══════════════════════════════════════════════════════════════════════════════

fn has_csv_ext(name: &str) -> bool {
    name.to_lowercase().ends_with(CSV_EXT)
}

fn printable(s: &str) -> String {
    s.chars().filter(|c| !c.is_control()).collect()
}

/// Reduce an uploaded name to a bare `.csv` file name
pub fn sanitize_file_name(name: &str) -> Result<String, LibraryError> {
    let normalized = name.replace('\\', "/");
    let base = normalized.rsplit('/').next().unwrap_or("").trim();
    if !has_csv_ext(base) {
        return Err(LibraryError::NotCsv);
    }
    let cleaned = printable(base);
    if cleaned.is_empty() {
        return Err(LibraryError::InvalidName);
    }
    Ok(cleaned)
}

/// Validate a path relative to the library root
///
/// Rejects absolute paths, drive prefixes and parent components.
pub fn sanitize_rel_path(rel: &str) -> Result<String, LibraryError> {
    let rel = printable(rel.replace('\\', "/").trim());
    if rel.is_empty() || rel.starts_with('/') {
        return Err(LibraryError::InvalidName);
    }
    let head = rel.split('/').next().unwrap_or("");
    if head.contains(':') {
        return Err(LibraryError::InvalidName);
    }

    let parts: Vec<&str> = rel
        .split('/')
        .filter(|p| !p.is_empty() && *p != ".")
        .collect();
    if parts.is_empty() || parts.iter().any(|p| *p == "..") {
        return Err(LibraryError::InvalidName);
    }

    let cleaned = parts.join("/").trim().to_string();
    if !has_csv_ext(&cleaned) {
        return Err(LibraryError::NotCsv);
    }
    Ok(cleaned)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Parsing
// ═══════════════════════════════════════════════════════════════════════════════

/// Decode file bytes as UTF-8, dropping a BOM; invalid sequences are replaced
pub fn decode_bytes(data: &[u8]) -> String {
    let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
    match std::str::from_utf8(data) {
        Ok(text) => text.to_string(),
        Err(_) => String::from_utf8_lossy(data).into_owned(),
    }
}

/// Guess the delimiter from a sample of the file
///
/// Picks the candidate that appears the same number of times on the most
/// lines. Falls back to a comma.
pub fn sniff_delimiter(sample: &str) -> u8 {
    let lines: Vec<&str> = sample
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(20)
        .collect();

    let mut best = (b',', 0usize);
    for delim in SNIFF_DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|l| l.bytes().filter(|b| *b == delim).count())
            .collect();

        let mut freq: HashMap<usize, usize> = HashMap::new();
        for count in counts.iter().filter(|c| **c > 0) {
            *freq.entry(*count).or_default() += 1;
        }
        let consistent = freq.values().copied().max().unwrap_or(0);
        if consistent > best.1 {
            best = (delim, consistent);
        }
    }
    best.0
}

/// Parse label/output pairs from CSV text
pub fn parse_labels_map(text: &str) -> Result<PromptFile, csv::Error> {
    let mut end = text.len().min(SNIFF_SAMPLE_BYTES);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let delimiter = sniff_delimiter(&text[..end]);

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut file = PromptFile::default();
    for record in reader.records() {
        let record = record?;
        if record.len() < 2 {
            continue;
        }
        let label = record[0].trim();
        if label.is_empty() {
            continue;
        }
        if !file.map.contains_key(label) {
            file.labels.push(label.to_string());
        }
        file.map
            .insert(label.to_string(), record[1].trim().to_string());
    }
    Ok(file)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Library
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
struct CachedFile {
    modified: Option<SystemTime>,
    data: Arc<PromptFile>,
}

/// A directory of prompt files with a parse cache
#[derive(Debug)]
pub struct PromptLibrary {
    root: PathBuf,
    cache: HashMap<String, CachedFile>,
}

impl PromptLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: HashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root directory if needed
    pub fn ensure_root(&self) -> Result<&Path, LibraryError> {
        fs::create_dir_all(&self.root).map_err(|e| LibraryError::io(&self.root, e))?;
        Ok(&self.root)
    }

    pub fn path_of(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    /// All `.csv` files below the root, relative, sorted case-insensitively
    pub fn list_files(&self) -> Result<Vec<String>, LibraryError> {
        let root = self.ensure_root()?;
        let mut files = Vec::new();
        collect_csv_files(root, root, &mut files)?;
        files.sort_by_key(|f| f.to_lowercase());
        Ok(files)
    }

    /// Read and parse a file, reusing the cached parse while its mtime holds
    pub fn read(&mut self, name: &str) -> Result<Arc<PromptFile>, LibraryError> {
        let rel = sanitize_rel_path(name)?;
        let path = self.root.join(&rel);

        let metadata = fs::metadata(&path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                LibraryError::NotFound(rel.clone())
            } else {
                LibraryError::io(&path, e)
            }
        })?;
        let modified = metadata.modified().ok();

        if let Some(cached) = self.cache.get(&rel) {
            if cached.modified.is_some() && cached.modified == modified {
                return Ok(Arc::clone(&cached.data));
            }
        }

        let bytes = fs::read(&path).map_err(|e| LibraryError::io(&path, e))?;
        let parsed = parse_labels_map(&decode_bytes(&bytes)).map_err(|source| {
            LibraryError::Parse {
                file: rel.clone(),
                source,
            }
        })?;
        tracing::debug!(file = %rel, labels = parsed.labels.len(), "parsed prompt file");

        let data = Arc::new(parsed);
        self.cache.insert(
            rel,
            CachedFile {
                modified,
                data: Arc::clone(&data),
            },
        );
        Ok(data)
    }

    pub fn invalidate(&mut self, rel: &str) {
        self.cache.remove(rel);
    }
}

fn collect_csv_files(root: &Path, dir: &Path, out: &mut Vec<String>) -> Result<(), LibraryError> {
    let entries = fs::read_dir(dir).map_err(|e| LibraryError::io(dir, e))?;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_csv_files(root, &path, out)?;
            continue;
        }
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !has_csv_ext(name) {
            continue;
        }
        if let Ok(rel) = path.strip_prefix(root) {
            let rel = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if !rel.is_empty() {
                out.push(rel);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("C:\\tmp\\Styles.CSV").unwrap(), "Styles.CSV");
        assert_eq!(sanitize_file_name(" dir/a.csv ").unwrap(), "a.csv");
        assert!(matches!(sanitize_file_name("a.txt"), Err(LibraryError::NotCsv)));
        assert!(matches!(sanitize_file_name("dir/"), Err(LibraryError::NotCsv)));
    }

    #[test]
    fn test_sanitize_rel_path() {
        assert_eq!(sanitize_rel_path("sub\\./a.csv").unwrap(), "sub/a.csv");
        assert!(sanitize_rel_path("/etc/a.csv").is_err());
        assert!(sanitize_rel_path("../a.csv").is_err());
        assert!(sanitize_rel_path("c:/a.csv").is_err());
        assert!(sanitize_rel_path("").is_err());
        assert!(matches!(sanitize_rel_path("a.json"), Err(LibraryError::NotCsv)));
    }

    #[test]
    fn test_decode_strips_bom() {
        assert_eq!(decode_bytes(b"\xEF\xBB\xBFcat,a cat"), "cat,a cat");
        assert_eq!(decode_bytes(b"a\xFFb"), "a\u{FFFD}b");
    }

    #[test]
    fn test_sniff_delimiter() {
        assert_eq!(sniff_delimiter("a;b\nc;d\ne;f"), b';');
        assert_eq!(sniff_delimiter("a\tb, c\nd\te, f, g"), b'\t');
        assert_eq!(sniff_delimiter("no delimiters here"), b',');
    }

    #[test]
    fn test_parse_labels_map() {
        let text = "cat, a fluffy cat\n\nshort\n , empty label\ndog,\"a dog, barking\"\ncat,second cat\n";
        let file = parse_labels_map(text).unwrap();
        assert_eq!(file.labels, vec!["cat", "dog"]);
        assert_eq!(file.output("cat"), Some("second cat"));
        assert_eq!(file.output("dog"), Some("a dog, barking"));
        assert_eq!(file.output("short"), None);
    }

    #[test]
    fn test_list_files_recursive_sorted() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("Sub")).unwrap();
        fs::write(dir.path().join("b.csv"), "x,y").unwrap();
        fs::write(dir.path().join("A.CSV"), "x,y").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::write(dir.path().join("Sub").join("c.csv"), "x,y").unwrap();

        let library = PromptLibrary::new(dir.path());
        assert_eq!(library.list_files().unwrap(), vec!["A.CSV", "b.csv", "Sub/c.csv"]);
    }

    #[test]
    fn test_read_uses_cache_until_invalidated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("styles.csv");
        fs::write(&path, "cat,a cat\n").unwrap();

        let mut library = PromptLibrary::new(dir.path());
        let first = library.read("styles.csv").unwrap();
        let second = library.read("styles.csv").unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        library.invalidate("styles.csv");
        let third = library.read("styles.csv").unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(third.labels, vec!["cat"]);
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempdir().unwrap();
        let mut library = PromptLibrary::new(dir.path());
        assert!(matches!(
            library.read("missing.csv"),
            Err(LibraryError::NotFound(name)) if name == "missing.csv"
        ));
    }
}
