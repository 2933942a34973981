// source module - loads candidate files from disk for analysis

use anyhow::{Context, Result};
use encoding_rs::{Encoding, WINDOWS_1252};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::ignore::{is_ignored, Matcher};

/// largest file loaded for analysis (10 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// a loaded file that may be sent for analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFile {
    /// file name without directories, e.g. "Button.tsx"
    pub name: String,
    /// forward-slash path relative to the loaded root's parent
    pub path: String,
    pub content: String,
}

/// what the report was generated from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisSource {
    /// pasted code
    Snippet(String),
    Files(Vec<SourceFile>),
}

/// outcome of loading a directory tree
#[derive(Debug, Default)]
pub struct LoadReport {
    /// files kept for analysis, in path order
    pub files: Vec<SourceFile>,
    /// paths excluded by ignore patterns (not read)
    pub ignored: Vec<String>,
    /// per-file problems that did not stop the walk
    pub errors: Vec<String>,
}

impl LoadReport {
    /// total number of files seen, kept or ignored
    pub fn total(&self) -> usize {
        self.files.len() + self.ignored.len()
    }
}

/// load every file under `root`, skipping ignored and oversized ones
///
/// paths keep the root's own name as their first segment, the way a folder
/// upload reports them (`project/src/main.rs`). a single file loads as its name.
pub fn load_source_tree(
    root: &Path,
    max_file_size: u64,
    matchers: &[Matcher],
) -> Result<LoadReport> {
    fs::metadata(root).with_context(|| format!("failed to read source path {}", root.display()))?;
    let base = root.parent().unwrap_or_else(|| Path::new(""));

    let mut report = LoadReport::default();
    let mut seen = HashSet::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("skipping unreadable entry: {e}");
                report.errors.push(format!("error reading entry: {e}"));
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = relative_path(entry.path(), base);
        if !seen.insert(path.clone()) {
            continue;
        }

        if is_ignored(&path, matchers) {
            debug!("ignoring {path}");
            report.ignored.push(path);
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        if size > max_file_size {
            report.errors.push(format!(
                "file {name} is too large ({:.1}MB). maximum size is {}MB.",
                size as f64 / 1024.0 / 1024.0,
                max_file_size / 1024 / 1024
            ));
            continue;
        }

        match fs::read(entry.path()) {
            Ok(bytes) => report.files.push(SourceFile {
                name,
                path,
                content: decode_file_content(&bytes),
            }),
            Err(e) => {
                warn!("failed to read {path}: {e}");
                report.errors.push(format!("error reading file {name}: {e}"));
            }
        }
    }

    Ok(report)
}

/// join path components below `base` with forward slashes
fn relative_path(path: &Path, base: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path);
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// split already-loaded files into (kept, ignored)
pub fn partition_ignored(
    files: Vec<SourceFile>,
    matchers: &[Matcher],
) -> (Vec<SourceFile>, Vec<SourceFile>) {
    files
        .into_iter()
        .partition(|file| !is_ignored(&file.path, matchers))
}

/// decode file bytes, honouring a BOM and falling back to windows-1252
pub fn decode_file_content(bytes: &[u8]) -> String {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return text.into_owned();
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            let (text, _, _) = WINDOWS_1252.decode(bytes);
            text.into_owned()
        }
    }
}
