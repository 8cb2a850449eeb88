//! File watcher for live sync
//!
//! Watches the human directory and the project's `objects/` and `scripts/`
//! directories, and forwards changes to the coordinator over a channel.

use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::time::Duration;

use anyhow::Context;
use notify::event::ModifyKind;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::layout::ProjectLayout;

/// File change event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: PathBuf,
    pub kind: FileChangeKind,
}

impl FileChange {
    pub fn new(path: impl Into<PathBuf>, kind: FileChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// Kind of file change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileChangeKind {
    Create,
    Modify,
    Delete,
}

/// Map a notify event kind to a change kind
///
/// A rename onto an existing path counts as a modification, since editors
/// that save through a temporary file replace the target this way. A rename
/// away from a path counts as a delete. Metadata-only changes are dropped.
pub fn change_kind(kind: &EventKind, path: &Path) -> Option<FileChangeKind> {
    match kind {
        EventKind::Create(_) => path.exists().then_some(FileChangeKind::Create),
        EventKind::Remove(_) => Some(FileChangeKind::Delete),
        EventKind::Modify(ModifyKind::Name(_))
        | EventKind::Modify(ModifyKind::Data(_))
        | EventKind::Modify(ModifyKind::Any) => Some(if path.exists() {
            FileChangeKind::Modify
        } else {
            FileChangeKind::Delete
        }),
        _ => None,
    }
}

/// Start watching the three synced directories
///
/// The returned watcher stops when dropped.
pub fn start_watcher(
    layout: &ProjectLayout,
    tx: Sender<FileChange>,
) -> anyhow::Result<RecommendedWatcher> {
    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| match res {
            Ok(event) => {
                for path in &event.paths {
                    if let Some(kind) = change_kind(&event.kind, path) {
                        let _ = tx.send(FileChange::new(path.clone(), kind));
                    }
                }
            }
            Err(e) => tracing::warn!("Watch error: {}", e),
        },
        Config::default().with_poll_interval(Duration::from_millis(500)),
    )
    .context("Failed to create file watcher")?;

    for dir in [&layout.human_dir, &layout.objects_dir, &layout.scripts_dir] {
        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", dir.display()))?;
        tracing::debug!("Watching {}", dir.display());
    }

    Ok(watcher)
}
