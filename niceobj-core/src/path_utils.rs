//! File naming and writing helpers
//!
//! GameMaker names resource files `<name>.<kind>.gmx`, the human side uses
//! `<name>.gmo`, and scripts are `<name>.gml` on both sides.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Extension of GameMaker object files, including the kind segment
pub const GMX_OBJECT_SUFFIX: &str = ".object.gmx";

/// Extension of script files on both sides
pub const SCRIPT_EXT: &str = "gml";

/// Resource name from a path: the file name up to its first dot
pub fn resource_name(path: &Path) -> Option<&str> {
    let file_name = path.file_name()?.to_str()?;
    let name = file_name.split('.').next().unwrap_or(file_name);
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Whether the file name ends in `.object.gmx`
pub fn is_gmx_object(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.len() > GMX_OBJECT_SUFFIX.len() && n.ends_with(GMX_OBJECT_SUFFIX))
        .unwrap_or(false)
}

/// Whether the path has the given extension
pub fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(ext)
}

/// Replace a file's content in one step
///
/// The data goes to a hidden sibling first and is renamed over `path`, so
/// readers see either the old or the new content.
pub fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let tmp = temp_sibling(path);
    if let Err(e) = fs::write(&tmp, data) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        e
    })
}

fn temp_sibling(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.niceobj-tmp", file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_name() {
        assert_eq!(resource_name(Path::new("objects/objBread.object.gmx")), Some("objBread"));
        assert_eq!(resource_name(Path::new("NiceObjects/objBread.gmo")), Some("objBread"));
        assert_eq!(resource_name(Path::new("scr_move.gml")), Some("scr_move"));
        assert_eq!(resource_name(Path::new(".hidden")), None);
    }

    #[test]
    fn test_is_gmx_object() {
        assert!(is_gmx_object(Path::new("objects/objBread.object.gmx")));
        assert!(!is_gmx_object(Path::new("objects/.object.gmx")));
        assert!(!is_gmx_object(Path::new("sprites/sprBread.sprite.gmx")));
        assert!(!is_gmx_object(Path::new("objects/objBread.gmo")));
    }

    #[test]
    fn test_has_extension() {
        assert!(has_extension(Path::new("a/b.gml"), SCRIPT_EXT));
        assert!(!has_extension(Path::new("a/b.gmo"), SCRIPT_EXT));
        assert!(!has_extension(Path::new("a/gml"), SCRIPT_EXT));
    }

    #[test]
    fn test_write_atomic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("objA.gmo");

        write_atomic(&path, b"first").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"first");

        write_atomic(&path, b"second").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"second");

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().ends_with(".niceobj-tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_write_atomic_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("objA.gmo");
        assert!(write_atomic(&path, b"data").is_err());
        assert!(!path.exists());
    }
}
