//! NiceObjects live sync
//!
//! Populates the human directory from a GameMaker project, then watches
//! both trees and translates whichever side was edited until shut down.

pub mod clock;
pub mod coordinator;
pub mod layout;
pub mod translate;
pub mod watcher;

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use niceobj_core::{EventRegistry, SyncConfig};

pub use clock::{Clock, ManualClock, SystemClock};
pub use coordinator::{Coordinator, Dispatcher, Outcome, TimingWindows};
pub use layout::{ProjectLayout, ResourceClass, Side};
pub use translate::{DispatchKind, Dispatched, PopulateStats, TranslateError, Translator};
pub use watcher::{FileChange, FileChangeKind};

/// How often the consumer checks the stop flag while idle
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Settings for one sync session
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub layout: ProjectLayout,
    pub sync: SyncConfig,
    /// Leave the human directory in place on shutdown
    pub keep_human_dir: bool,
}

/// Run a sync session until `shutdown` resolves
pub async fn run_sync<F>(options: SyncOptions, shutdown: F) -> anyhow::Result<PopulateStats>
where
    F: Future<Output = ()>,
{
    let SyncOptions {
        layout,
        sync,
        keep_human_dir,
    } = options;
    let registry = EventRegistry::standard();

    let populate_layout = layout.clone();
    let stats = tokio::task::spawn_blocking(move || {
        Translator::new(populate_layout, registry).populate_human_dir()
    })
    .await?
    .context("Failed to populate the human directory")?;
    tracing::info!(
        "Translated {} objects and {} scripts into {}",
        stats.objects,
        stats.scripts,
        layout.human_dir.display()
    );
    if stats.skipped > 0 {
        tracing::warn!("{} files could not be translated", stats.skipped);
    }

    let (tx, rx) = std::sync::mpsc::channel();
    let watcher = watcher::start_watcher(&layout, tx)?;
    tracing::info!("Watching for changes. Press Ctrl-C to stop.");

    let stop = Arc::new(AtomicBool::new(false));
    let consumer = {
        let stop = stop.clone();
        let coordinator = Coordinator::new(layout.clone(), &sync);
        let mut translator = Translator::new(layout.clone(), registry);
        tokio::task::spawn_blocking(move || consume(rx, coordinator, &mut translator, &stop))
    };

    shutdown.await;
    tracing::info!("Shutting down");
    stop.store(true, Ordering::SeqCst);
    consumer.await?;
    drop(watcher);

    if !keep_human_dir {
        std::fs::remove_dir_all(&layout.human_dir)
            .with_context(|| format!("Failed to remove {}", layout.human_dir.display()))?;
        tracing::info!("Removed {}", layout.human_dir.display());
    }

    Ok(stats)
}

/// Process changes in arrival order until stopped or the watcher goes away
fn consume<C: Clock, D: Dispatcher>(
    rx: Receiver<FileChange>,
    mut coordinator: Coordinator<C>,
    dispatcher: &mut D,
    stop: &AtomicBool,
) {
    while !stop.load(Ordering::SeqCst) {
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(change) => {
                coordinator.handle(&change, dispatcher);
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                tracing::debug!("File watcher channel closed");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    struct Counter(usize);

    impl Dispatcher for Counter {
        fn dispatch(
            &mut self,
            _class: ResourceClass,
            path: &Path,
        ) -> Result<Dispatched, TranslateError> {
            self.0 += 1;
            Ok(Dispatched {
                name: "objBread".into(),
                kind: DispatchKind::Translated,
                destination: path.to_path_buf(),
                registered: false,
            })
        }
    }

    #[test]
    fn test_consume_drains_until_disconnect() {
        let layout = ProjectLayout::new(
            Path::new("/work/Bread.gmx"),
            Path::new("/work/Bread.gmx/Bread.project.gmx"),
            Path::new("/work/NiceObjects"),
        );
        let clock = ManualClock::new();
        let coordinator = Coordinator::with_clock(layout, &SyncConfig::default(), clock);

        let (tx, rx) = std::sync::mpsc::channel();
        for name in ["objA", "objB", "objC"] {
            let path = PathBuf::from(format!("/work/NiceObjects/{}.gmo", name));
            tx.send(FileChange::new(path, FileChangeKind::Modify)).unwrap();
        }
        drop(tx);

        let mut counter = Counter(0);
        let stop = AtomicBool::new(false);
        consume(rx, coordinator, &mut counter, &stop);
        assert_eq!(counter.0, 3);
    }

    #[tokio::test]
    async fn test_run_sync_populates_and_cleans_up() {
        let root = tempfile::tempdir().unwrap();
        let project = root.path().join("Bread.gmx");
        std::fs::create_dir_all(project.join("scripts")).unwrap();
        std::fs::write(
            project.join("Bread.project.gmx"),
            "<assets>\n  <objects name=\"objects\">\n  </objects>\n</assets>\n",
        )
        .unwrap();
        std::fs::write(project.join("scripts").join("scr_bake.gml"), "bake();").unwrap();

        let human_dir = root.path().join("NiceObjects");
        let layout = ProjectLayout::prepare(&project, &human_dir).unwrap();
        let options = SyncOptions {
            layout,
            sync: SyncConfig::default(),
            keep_human_dir: false,
        };

        let stats = run_sync(options, async {}).await.unwrap();
        assert_eq!(stats.scripts, 1);
        assert!(!human_dir.exists());
    }
}
