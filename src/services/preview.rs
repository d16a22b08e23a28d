//! Preview lookup for model files
//!
//! A model `dir/name.safetensors` may have a preview image or video beside
//! it. Candidates are tried in a fixed order and the first existing one wins.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const MODEL_EXTS: [&str; 4] = [".safetensors", ".pt", ".ckpt", ".gguf"];
const IMG_EXTS: [&str; 4] = [".png", ".webp", ".jpg", ".jpeg"];
const VID_EXTS: [&str; 2] = [".mp4", ".webm"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PreviewError {
    #[error("Missing model name")]
    MissingName,
    #[error("Invalid name")]
    InvalidName,
}

/// A preview file found for a model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub model: PathBuf,
    pub path: PathBuf,
    pub content_type: &'static str,
}

/// Use forward slashes and drop leading `./`
pub fn normalize_name(name: &str) -> String {
    let mut name = name.replace('\\', "/").trim().to_string();
    while let Some(rest) = name.strip_prefix("./") {
        name = rest.to_string();
    }
    name
}

pub fn is_safe_rel_path(name: &str) -> bool {
    if name.is_empty() || name.starts_with('/') {
        return false;
    }
    !name.split('/').any(|p| p == "..")
}

pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        _ => "application/octet-stream",
    }
}

fn has_model_ext(name: &str) -> bool {
    let lower = name.to_lowercase();
    MODEL_EXTS.iter().any(|ext| lower.ends_with(ext))
}

/// Preview locations for a model file, in lookup order
pub fn candidate_paths(model_file: &Path) -> Vec<PathBuf> {
    let parent = model_file.parent().unwrap_or_else(|| Path::new(""));
    let stem = model_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let exts = || IMG_EXTS.iter().chain(VID_EXTS.iter());

    let mut candidates = Vec::with_capacity(3 * (IMG_EXTS.len() + VID_EXTS.len()));
    candidates.extend(exts().map(|ext| parent.join(format!("{}.preview{}", stem, ext))));
    candidates.extend(exts().map(|ext| parent.join(format!("{}{}", stem, ext))));
    let folder = parent.join(&stem);
    candidates.extend(exts().map(|ext| folder.join(format!("preview{}", ext))));
    candidates
}

/// Find the model file for `name` in the first directory that has it
///
/// Names without a model extension are also tried with each one.
pub fn resolve_model(dirs: &[PathBuf], name: &str) -> Option<PathBuf> {
    let with_ext = has_model_ext(name);
    for dir in dirs {
        let full = dir.join(name);
        if full.is_file() {
            return Some(full);
        }
        if !with_ext {
            for ext in MODEL_EXTS {
                let full = dir.join(format!("{}{}", name, ext));
                if full.is_file() {
                    return Some(full);
                }
            }
        }
    }
    None
}

/// Resolve the preview for a model name; `Ok(None)` when there is none
pub fn find_preview(dirs: &[PathBuf], name: &str) -> Result<Option<Preview>, PreviewError> {
    let name = normalize_name(name);
    if name.is_empty() {
        return Err(PreviewError::MissingName);
    }
    if !is_safe_rel_path(&name) {
        return Err(PreviewError::InvalidName);
    }

    let Some(model) = resolve_model(dirs, &name) else {
        return Ok(None);
    };
    let preview = candidate_paths(&model)
        .into_iter()
        .find(|candidate| candidate.exists())
        .map(|path| Preview {
            content_type: content_type_for(&path),
            model: model.clone(),
            path,
        });
    Ok(preview)
}

/// All model files under `dirs`, relative to their directory, sorted and deduplicated
pub fn list_models(dirs: &[PathBuf]) -> Vec<String> {
    let mut names = Vec::new();
    for dir in dirs {
        if dir.is_dir() {
            collect_models(dir, dir, &mut names);
        }
    }
    names.sort_by_key(|n| n.to_lowercase());
    names.dedup();
    names
}

fn collect_models(root: &Path, dir: &Path, out: &mut Vec<String>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_models(root, &path, out);
            continue;
        }
        let Ok(rel) = path.strip_prefix(root) else {
            continue;
        };
        let rel = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if has_model_ext(&rel) {
            out.push(rel);
        }
    }
}
