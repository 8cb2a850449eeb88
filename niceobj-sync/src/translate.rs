//! File-level translation between the two trees
//!
//! Every operation reads its source completely, builds the destination
//! content in memory and replaces the destination in one atomic write.
//! A failure anywhere leaves the destination as it was.

use std::fs;
use std::path::{Path, PathBuf};

use niceobj_core::{
    decode_gmx, encode_gmx, is_gmx_object, parse_human_object, register_resource, resource_name,
    write_atomic, write_human_object, EventError, EventRegistry, GmxError, ParseError,
    ResourceKind, WriteMode,
};
use niceobj_core::path_utils::{has_extension, SCRIPT_EXT};

use crate::coordinator::Dispatcher;
use crate::layout::{ProjectLayout, ResourceClass};

/// Error types for a single translation or copy
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("Error reading {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Error writing {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Error reading human object {path}: {source}")]
    Parse { path: PathBuf, source: ParseError },

    #[error("Error in GameMaker object {path}: {source}")]
    Gmx { path: PathBuf, source: GmxError },

    #[error("Error writing human object {path}: {source}")]
    Event { path: PathBuf, source: EventError },

    #[error("Not a resource file: {0}")]
    InvalidName(PathBuf),
}

/// What a successful dispatch did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatched {
    /// Resource name, e.g. `objBread`
    pub name: String,
    pub kind: DispatchKind,
    pub destination: PathBuf,
    /// The resource was newly added to the project file
    pub registered: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchKind {
    Translated,
    Copied,
}

/// Counts from the startup pass over the GameMaker project
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopulateStats {
    pub objects: usize,
    pub scripts: usize,
    pub skipped: usize,
}

/// Translates and copies files between the human and GameMaker trees
pub struct Translator<'r> {
    layout: ProjectLayout,
    registry: &'r EventRegistry,
}

impl<'r> Translator<'r> {
    pub fn new(layout: ProjectLayout, registry: &'r EventRegistry) -> Self {
        Self { layout, registry }
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// `.gmo` to `.object.gmx`
    ///
    /// Physics settings of an existing GameMaker object are kept. A new
    /// object is also added to the project file.
    pub fn human_object_to_gmx(&self, human_path: &Path) -> Result<Dispatched, TranslateError> {
        let name = name_of(human_path)?;
        let gmx_path = self.layout.gmx_object_path(&name);
        let existed = gmx_path.exists();

        let text = read_text(human_path)?;
        let mut obj = parse_human_object(&text, self.registry).map_err(|source| {
            TranslateError::Parse {
                path: human_path.to_path_buf(),
                source,
            }
        })?;

        if existed {
            match read_text(&gmx_path).map(|xml| decode_gmx(&xml)) {
                Ok(Ok(previous)) => obj.physics = previous.physics,
                Ok(Err(e)) => tracing::warn!("{}: physics settings reset: {}", name, e),
                Err(e) => tracing::warn!("{}: physics settings reset: {}", name, e),
            }
        }

        let xml = encode_gmx(&obj).map_err(|source| TranslateError::Gmx {
            path: gmx_path.clone(),
            source,
        })?;
        write_file(&gmx_path, xml.as_bytes())?;

        let registered = !existed && self.register(ResourceKind::Object, &name);
        Ok(Dispatched {
            name,
            kind: DispatchKind::Translated,
            destination: gmx_path,
            registered,
        })
    }

    /// `.object.gmx` to `.gmo`
    pub fn gmx_object_to_human(&self, gmx_path: &Path) -> Result<Dispatched, TranslateError> {
        let name = name_of(gmx_path)?;
        let human_path = self.layout.human_object_path(&name);

        let xml = read_text(gmx_path)?;
        let obj = decode_gmx(&xml).map_err(|source| TranslateError::Gmx {
            path: gmx_path.to_path_buf(),
            source,
        })?;
        let text = write_human_object(&obj, self.registry, WriteMode::Live).map_err(|source| {
            TranslateError::Event {
                path: gmx_path.to_path_buf(),
                source,
            }
        })?;
        write_file(&human_path, text.as_bytes())?;
        tracing::debug!(
            "{}: {} events, {} actions",
            name,
            obj.events.len(),
            obj.action_count()
        );

        Ok(Dispatched {
            name,
            kind: DispatchKind::Translated,
            destination: human_path,
            registered: false,
        })
    }

    /// Byte-for-byte script copy
    ///
    /// Scripts coming from the human side are added to the project file the
    /// first time they appear.
    pub fn copy_script(&self, class: ResourceClass, src: &Path) -> Result<Dispatched, TranslateError> {
        let name = name_of(src)?;
        let dest = self
            .layout
            .counterpart(class, src)
            .ok_or_else(|| TranslateError::InvalidName(src.to_path_buf()))?;
        let existed = dest.exists();

        let data = fs::read(src).map_err(|source| TranslateError::Read {
            path: src.to_path_buf(),
            source,
        })?;
        write_file(&dest, &data)?;

        let registered = class == ResourceClass::HumanScript
            && !existed
            && dest
                .file_name()
                .and_then(|n| n.to_str())
                .map(|file_name| self.register(ResourceKind::Script, file_name))
                .unwrap_or(false);

        Ok(Dispatched {
            name,
            kind: DispatchKind::Copied,
            destination: dest,
            registered,
        })
    }

    /// Fill the human directory from the GameMaker project
    ///
    /// Objects that cannot be translated (drag-and-drop actions, unknown
    /// events) are logged and skipped.
    pub fn populate_human_dir(&self) -> std::io::Result<PopulateStats> {
        let mut stats = PopulateStats::default();

        for path in sorted_entries(&self.layout.objects_dir)? {
            if !is_gmx_object(&path) {
                continue;
            }
            match self.gmx_object_to_human(&path) {
                Ok(_) => stats.objects += 1,
                Err(e) => {
                    tracing::warn!("Skipping {}", e);
                    stats.skipped += 1;
                }
            }
        }

        for path in sorted_entries(&self.layout.scripts_dir)? {
            if !has_extension(&path, SCRIPT_EXT) {
                continue;
            }
            match self.copy_script(ResourceClass::GmScript, &path) {
                Ok(_) => stats.scripts += 1,
                Err(e) => {
                    tracing::warn!("Skipping {}", e);
                    stats.skipped += 1;
                }
            }
        }

        Ok(stats)
    }

    /// Add to the project file, logging failures
    fn register(&self, kind: ResourceKind, name: &str) -> bool {
        match register_resource(&self.layout.manifest, kind, name) {
            Ok(added) => added,
            Err(e) => {
                tracing::error!("{}: {}", name, e);
                false
            }
        }
    }
}

impl Dispatcher for Translator<'_> {
    fn dispatch(&mut self, class: ResourceClass, path: &Path) -> Result<Dispatched, TranslateError> {
        match class {
            ResourceClass::HumanObject => self.human_object_to_gmx(path),
            ResourceClass::GmObject => self.gmx_object_to_human(path),
            ResourceClass::HumanScript | ResourceClass::GmScript => self.copy_script(class, path),
        }
    }
}

fn name_of(path: &Path) -> Result<String, TranslateError> {
    resource_name(path)
        .map(str::to_string)
        .ok_or_else(|| TranslateError::InvalidName(path.to_path_buf()))
}

fn read_text(path: &Path) -> Result<String, TranslateError> {
    fs::read_to_string(path).map_err(|source| TranslateError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, data: &[u8]) -> Result<(), TranslateError> {
    write_atomic(path, data).map_err(|source| TranslateError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn sorted_entries(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();
    paths.sort();
    Ok(paths)
}
