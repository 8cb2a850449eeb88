//! Where each side's files live
//!
//! A GameMaker: Studio project directory (`Bread.gmx/`) holds the manifest
//! `Bread.project.gmx` plus `objects/` and `scripts/`. The human side is one
//! flat directory holding `.gmo` objects and `.gml` scripts.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use niceobj_core::human::HUMAN_OBJECT_EXT;
use niceobj_core::path_utils::{has_extension, is_gmx_object, GMX_OBJECT_SUFFIX, SCRIPT_EXT};
use niceobj_core::{find_project_manifest, resource_name};

/// Which tree a file belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Human,
    Gm,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Human => Side::Gm,
            Side::Gm => Side::Human,
        }
    }
}

/// A file the sync cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceClass {
    HumanObject,
    HumanScript,
    GmObject,
    GmScript,
}

impl ResourceClass {
    pub fn side(self) -> Side {
        match self {
            ResourceClass::HumanObject | ResourceClass::HumanScript => Side::Human,
            ResourceClass::GmObject | ResourceClass::GmScript => Side::Gm,
        }
    }

    pub fn is_object(self) -> bool {
        matches!(self, ResourceClass::HumanObject | ResourceClass::GmObject)
    }
}

/// Directory layout of one sync session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub project_dir: PathBuf,
    pub manifest: PathBuf,
    pub objects_dir: PathBuf,
    pub scripts_dir: PathBuf,
    pub human_dir: PathBuf,
}

impl ProjectLayout {
    /// Layout from already-resolved paths
    pub fn new(project_dir: &Path, manifest: &Path, human_dir: &Path) -> Self {
        Self {
            project_dir: project_dir.to_path_buf(),
            manifest: manifest.to_path_buf(),
            objects_dir: project_dir.join("objects"),
            scripts_dir: project_dir.join("scripts"),
            human_dir: human_dir.to_path_buf(),
        }
    }

    /// Resolve a project directory and create the human directory
    ///
    /// Paths are canonicalized so they compare equal to the paths the file
    /// watcher reports.
    pub fn prepare(project_dir: &Path, human_dir: &Path) -> Result<Self> {
        let project_dir = project_dir
            .canonicalize()
            .with_context(|| format!("GameMaker project not found: {}", project_dir.display()))?;
        let manifest = find_project_manifest(&project_dir)?;

        std::fs::create_dir_all(human_dir)
            .with_context(|| format!("Failed to create {}", human_dir.display()))?;
        let human_dir = human_dir.canonicalize()?;

        if human_dir.starts_with(&project_dir) {
            anyhow::bail!(
                "Human directory {} must be outside the GameMaker project",
                human_dir.display()
            );
        }

        let layout = Self::new(&project_dir, &manifest, &human_dir);
        std::fs::create_dir_all(&layout.objects_dir)
            .with_context(|| format!("Failed to create {}", layout.objects_dir.display()))?;
        std::fs::create_dir_all(&layout.scripts_dir)
            .with_context(|| format!("Failed to create {}", layout.scripts_dir.display()))?;
        Ok(layout)
    }

    /// Classify a path by directory and extension
    pub fn classify(&self, path: &Path) -> Option<ResourceClass> {
        let dir = path.parent()?;
        resource_name(path)?;

        if dir == self.human_dir {
            if has_extension(path, HUMAN_OBJECT_EXT) {
                return Some(ResourceClass::HumanObject);
            }
            if has_extension(path, SCRIPT_EXT) {
                return Some(ResourceClass::HumanScript);
            }
        } else if dir == self.objects_dir && is_gmx_object(path) {
            return Some(ResourceClass::GmObject);
        } else if dir == self.scripts_dir && has_extension(path, SCRIPT_EXT) {
            return Some(ResourceClass::GmScript);
        }
        None
    }

    /// Path of the file on the other side
    pub fn counterpart(&self, class: ResourceClass, path: &Path) -> Option<PathBuf> {
        let name = resource_name(path)?;
        let file_name = path.file_name()?;
        Some(match class {
            ResourceClass::HumanObject => self.gmx_object_path(name),
            ResourceClass::GmObject => self.human_object_path(name),
            ResourceClass::HumanScript => self.scripts_dir.join(file_name),
            ResourceClass::GmScript => self.human_dir.join(file_name),
        })
    }

    pub fn gmx_object_path(&self, name: &str) -> PathBuf {
        self.objects_dir.join(format!("{}{}", name, GMX_OBJECT_SUFFIX))
    }

    pub fn human_object_path(&self, name: &str) -> PathBuf {
        self.human_dir.join(format!("{}.{}", name, HUMAN_OBJECT_EXT))
    }
}
