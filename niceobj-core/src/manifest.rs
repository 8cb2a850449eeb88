//! `.project.gmx` manifest patching
//!
//! GameMaker only loads resources listed in the project file. New objects and
//! scripts get one line inserted before the closing tag of their section.

use std::path::{Path, PathBuf};

use crate::path_utils::write_atomic;

/// Extension of the project manifest
pub const MANIFEST_SUFFIX: &str = ".project.gmx";

/// Resource sections we register into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Object,
    Script,
}

impl ResourceKind {
    /// Closing tag of the top-level section
    pub fn anchor(self) -> &'static str {
        match self {
            ResourceKind::Object => "  </objects>",
            ResourceKind::Script => "  </scripts>",
        }
    }

    /// Manifest line for a resource
    ///
    /// Objects are listed by name, scripts by file name.
    pub fn entry(self, name: &str) -> String {
        match self {
            ResourceKind::Object => format!("    <object>objects\\{}</object>", name),
            ResourceKind::Script => format!("    <script>scripts\\{}</script>", name),
        }
    }
}

/// Error types for manifest patching
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("Failed to access project file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Project file {path} has no line {anchor:?}")]
    AnchorNotFound { path: PathBuf, anchor: &'static str },

    #[error("No .project.gmx file found in {0}")]
    NotFound(PathBuf),
}

/// Insert `line` before the first line equal to `anchor`
///
/// Keeps the text's line ending (`\r\n` if present anywhere, else `\n`).
/// Returns `None` when no line matches.
pub fn insert_line_before(text: &str, anchor: &str, line: &str) -> Option<String> {
    let ending = if text.contains("\r\n") { "\r\n" } else { "\n" };
    let mut lines: Vec<&str> = text.split(ending).collect();
    let at = lines.iter().position(|l| *l == anchor)?;
    lines.insert(at, line);
    Some(lines.join(ending))
}

/// Add a resource to the project file
///
/// Returns `false` without touching the file if the entry is already listed.
pub fn register_resource(
    manifest: &Path,
    kind: ResourceKind,
    name: &str,
) -> Result<bool, ManifestError> {
    let io_err = |source| ManifestError::Io {
        path: manifest.to_path_buf(),
        source,
    };

    let text = std::fs::read_to_string(manifest).map_err(io_err)?;
    let entry = kind.entry(name);
    if text.split(&['\r', '\n'][..]).any(|l| l == entry) {
        return Ok(false);
    }

    let patched =
        insert_line_before(&text, kind.anchor(), &entry).ok_or(ManifestError::AnchorNotFound {
            path: manifest.to_path_buf(),
            anchor: kind.anchor(),
        })?;
    write_atomic(manifest, patched.as_bytes()).map_err(io_err)?;

    tracing::debug!("Registered {} in {}", entry.trim(), manifest.display());
    Ok(true)
}

/// Find the `*.project.gmx` file in a GameMaker project directory
pub fn find_project_manifest(dir: &Path) -> Result<PathBuf, ManifestError> {
    // Prefer <dir name>.project.gmx, e.g. Bread.gmx/Bread.project.gmx
    if let Some(stem) = dir
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.strip_suffix(".gmx"))
    {
        let named = dir.join(format!("{}{}", stem, MANIFEST_SUFFIX));
        if named.is_file() {
            return Ok(named);
        }
    }

    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.ends_with(MANIFEST_SUFFIX) {
                    return Ok(path);
                }
            }
        }
    }

    Err(ManifestError::NotFound(dir.to_path_buf()))
}
