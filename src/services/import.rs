//! Importing CSV files into the library
//!
//! Content is deduplicated by SHA-256 across the whole library. A name clash
//! with different content is reported as `NameConflict` in `Auto` mode so the
//! caller can ask whether to overwrite or rename.

use super::library::{sanitize_file_name, LibraryError, PromptLibrary};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Read;
use std::path::Path;

/// How to handle an existing file with the same name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictMode {
    /// Write if the name is free, otherwise report a conflict
    Auto,
    Overwrite,
    /// Write under the given name (or the original), made unique
    Rename(Option<String>),
}

/// The user's answer to a name conflict
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictChoice {
    Overwrite,
    Rename(String),
    Cancel,
}

impl ConflictChoice {
    /// The import mode for this choice; `None` when cancelled
    pub fn into_mode(self) -> Option<ConflictMode> {
        match self {
            ConflictChoice::Overwrite => Some(ConflictMode::Overwrite),
            ConflictChoice::Rename(name) => {
                let name = name.trim().to_string();
                Some(ConflictMode::Rename((!name.is_empty()).then_some(name)))
            }
            ConflictChoice::Cancel => None,
        }
    }
}

/// Result of a successful import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOutcome {
    /// Library-relative name the content is available under
    pub filename: String,
    /// The content already existed; nothing was written
    pub deduped: bool,
    pub overwritten: bool,
}

pub fn sha256_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

pub fn sha256_file(path: &Path) -> std::io::Result<String> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let read = file.read(&mut buf)?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Find a library file with the given content hash
pub fn find_by_hash(library: &PromptLibrary, hash: &str) -> Option<String> {
    let files = library.list_files().ok()?;
    files.into_iter().find(|rel| {
        sha256_file(&library.path_of(rel))
            .map(|h| h == hash)
            .unwrap_or(false)
    })
}

/// First free `"base (n).ext"` name in the library root
pub fn suggest_copy_name(library: &PromptLibrary, filename: &str) -> String {
    let (base, ext) = match filename.rfind('.') {
        Some(dot) if dot > 0 => (&filename[..dot], &filename[dot..]),
        _ => (filename, ""),
    };
    let mut n = 1;
    loop {
        let candidate = format!("{} ({}){}", base, n, ext);
        if !library.path_of(&candidate).exists() {
            return candidate;
        }
        n += 1;
    }
}

fn ensure_unique_name(library: &PromptLibrary, preferred: &str) -> String {
    if library.path_of(preferred).exists() {
        suggest_copy_name(library, preferred)
    } else {
        preferred.to_string()
    }
}

/// Import `source` into the library
pub fn import_file(
    library: &mut PromptLibrary,
    source: &Path,
    mode: ConflictMode,
) -> Result<ImportOutcome, LibraryError> {
    let original = sanitize_file_name(&source.to_string_lossy())?;
    let data = fs::read(source).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            LibraryError::NotFound(source.display().to_string())
        } else {
            LibraryError::io(source, e)
        }
    })?;
    import_bytes(library, &original, &data, mode)
}

/// Import raw content under `original` (already a sanitized file name)
pub fn import_bytes(
    library: &mut PromptLibrary,
    original: &str,
    data: &[u8],
    mode: ConflictMode,
) -> Result<ImportOutcome, LibraryError> {
    library.ensure_root()?;
    let hash = sha256_bytes(data);

    if let Some(existing) = find_by_hash(library, &hash) {
        tracing::info!(file = %existing, "import deduplicated by content");
        return Ok(ImportOutcome {
            filename: existing,
            deduped: true,
            overwritten: false,
        });
    }

    let target = library.path_of(original);
    let outcome = match mode {
        ConflictMode::Auto => {
            if target.exists() {
                let same = sha256_file(&target).map(|h| h == hash).unwrap_or(false);
                if same {
                    return Ok(ImportOutcome {
                        filename: original.to_string(),
                        deduped: true,
                        overwritten: false,
                    });
                }
                return Err(LibraryError::NameConflict {
                    filename: original.to_string(),
                    suggested: suggest_copy_name(library, original),
                });
            }
            write_file(&target, data)?;
            ImportOutcome {
                filename: original.to_string(),
                deduped: false,
                overwritten: false,
            }
        }
        ConflictMode::Overwrite => {
            write_file(&target, data)?;
            ImportOutcome {
                filename: original.to_string(),
                deduped: false,
                overwritten: true,
            }
        }
        ConflictMode::Rename(rename_to) => {
            let preferred = rename_to
                .as_deref()
                .and_then(|name| sanitize_file_name(name).ok())
                .unwrap_or_else(|| original.to_string());
            let final_name = ensure_unique_name(library, &preferred);
            write_file(&library.path_of(&final_name), data)?;
            ImportOutcome {
                filename: final_name,
                deduped: false,
                overwritten: false,
            }
        }
    };

    library.invalidate(&outcome.filename);
    tracing::info!(file = %outcome.filename, overwritten = outcome.overwritten, "imported prompt file");
    Ok(outcome)
}

fn write_file(path: &Path, data: &[u8]) -> Result<(), LibraryError> {
    fs::write(path, data).map_err(|e| LibraryError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn setup() -> (tempfile::TempDir, PromptLibrary) {
        let dir = tempdir().unwrap();
        let library = PromptLibrary::new(dir.path().join("csv"));
        (dir, library)
    }

    #[test]
    fn test_auto_writes_new_file() {
        let (_dir, mut library) = setup();
        let outcome = import_bytes(&mut library, "a.csv", b"cat,a cat", ConflictMode::Auto).unwrap();
        assert_eq!(outcome.filename, "a.csv");
        assert!(!outcome.deduped);
        assert!(library.path_of("a.csv").exists());
    }

    #[test]
    fn test_same_content_is_deduped_anywhere() {
        let (_dir, mut library) = setup();
        library.ensure_root().unwrap();
        fs::create_dir_all(library.path_of("sub")).unwrap();
        fs::write(library.path_of("sub/existing.csv"), b"cat,a cat").unwrap();

        let outcome =
            import_bytes(&mut library, "new.csv", b"cat,a cat", ConflictMode::Auto).unwrap();
        assert_eq!(outcome.filename, "sub/existing.csv");
        assert!(outcome.deduped);
        assert!(!library.path_of("new.csv").exists());
    }

    #[test]
    fn test_auto_conflict_suggests_copy_name() {
        let (_dir, mut library) = setup();
        import_bytes(&mut library, "a.csv", b"one", ConflictMode::Auto).unwrap();
        fs::write(library.path_of("a (1).csv"), b"two").unwrap();

        let err = import_bytes(&mut library, "a.csv", b"three", ConflictMode::Auto).unwrap_err();
        match err {
            LibraryError::NameConflict {
                filename,
                suggested,
            } => {
                assert_eq!(filename, "a.csv");
                assert_eq!(suggested, "a (2).csv");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_overwrite_and_rename() {
        let (_dir, mut library) = setup();
        import_bytes(&mut library, "a.csv", b"one", ConflictMode::Auto).unwrap();

        let over = import_bytes(&mut library, "a.csv", b"two", ConflictMode::Overwrite).unwrap();
        assert!(over.overwritten);
        assert_eq!(fs::read(library.path_of("a.csv")).unwrap(), b"two");

        let renamed = import_bytes(
            &mut library,
            "a.csv",
            b"three",
            ConflictMode::Rename(Some("a.csv".to_string())),
        )
        .unwrap();
        assert_eq!(renamed.filename, "a (1).csv");

        let fallback = import_bytes(
            &mut library,
            "a.csv",
            b"four",
            ConflictMode::Rename(Some("bad.txt".to_string())),
        )
        .unwrap();
        assert_eq!(fallback.filename, "a (2).csv");
    }

    #[test]
    fn test_import_file_rejects_non_csv() {
        let (dir, mut library) = setup();
        let source = dir.path().join("notes.txt");
        fs::write(&source, "x").unwrap();
        assert!(matches!(
            import_file(&mut library, &source, ConflictMode::Auto),
            Err(LibraryError::NotCsv)
        ));
    }

    #[test]
    fn test_conflict_choice_modes() {
        assert_eq!(ConflictChoice::Cancel.into_mode(), None);
        assert_eq!(
            ConflictChoice::Rename("  ".to_string()).into_mode(),
            Some(ConflictMode::Rename(None))
        );
        assert_eq!(
            ConflictChoice::Overwrite.into_mode(),
            Some(ConflictMode::Overwrite)
        );
    }
}
