//! Debounced dispatch of file changes
//!
//! Every translation writes a file on the other side, which the watcher
//! reports back. The coordinator drops those echoes ("reverb") and the
//! duplicate notifications editors produce for a single save.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use niceobj_core::{SyncConfig, SyncMode};

use crate::clock::{Clock, SystemClock};
use crate::layout::{ProjectLayout, ResourceClass, Side};
use crate::translate::{DispatchKind, Dispatched, TranslateError};
use crate::watcher::{FileChange, FileChangeKind};

/// Something that carries out an accepted change
pub trait Dispatcher {
    fn dispatch(&mut self, class: ResourceClass, path: &Path) -> Result<Dispatched, TranslateError>;
}

/// Suppression windows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingWindows {
    /// Changes on one side are ignored for this long after the other side acted
    pub reverb: Duration,
    /// Repeat changes to the same path are ignored for this long
    pub dedup: Duration,
}

impl Default for TimingWindows {
    fn default() -> Self {
        Self::from(&SyncConfig::default())
    }
}

impl From<&SyncConfig> for TimingWindows {
    fn from(config: &SyncConfig) -> Self {
        Self {
            reverb: config.reverb_window(),
            dedup: config.dedup_window(),
        }
    }
}

#[derive(Debug, Default)]
struct SideState {
    last_time: Option<Instant>,
    last_path: Option<PathBuf>,
}

/// Result of handling one change
#[derive(Debug)]
pub enum Outcome {
    /// Not a synced file, or a kind of change that is not acted on
    Ignored,
    /// Inside a timing window
    Suppressed,
    Done(Dispatched),
    Failed(TranslateError),
}

pub struct Coordinator<C: Clock = SystemClock> {
    layout: ProjectLayout,
    windows: TimingWindows,
    mode: SyncMode,
    clock: C,
    human: SideState,
    gm: SideState,
}

impl Coordinator<SystemClock> {
    pub fn new(layout: ProjectLayout, config: &SyncConfig) -> Self {
        Self::with_clock(layout, config, SystemClock)
    }
}

impl<C: Clock> Coordinator<C> {
    pub fn with_clock(layout: ProjectLayout, config: &SyncConfig, clock: C) -> Self {
        Self {
            layout,
            windows: TimingWindows::from(config),
            mode: config.mode,
            clock,
            human: SideState::default(),
            gm: SideState::default(),
        }
    }

    pub fn windows(&self) -> TimingWindows {
        self.windows
    }

    fn state(&self, side: Side) -> &SideState {
        match side {
            Side::Human => &self.human,
            Side::Gm => &self.gm,
        }
    }

    fn state_mut(&mut self, side: Side) -> &mut SideState {
        match side {
            Side::Human => &mut self.human,
            Side::Gm => &mut self.gm,
        }
    }

    /// Apply the timing policy, recording the change when it is accepted
    pub fn accept(&mut self, side: Side, path: &Path) -> bool {
        let now = self.clock.now();
        let within = |last: Option<Instant>, window: Duration| {
            last.map_or(false, |t| now.saturating_duration_since(t) <= window)
        };

        if within(self.state(side.other()).last_time, self.windows.reverb) {
            return false;
        }

        let own = self.state(side);
        if own.last_path.as_deref() == Some(path) && within(own.last_time, self.windows.dedup) {
            return false;
        }

        let own = self.state_mut(side);
        own.last_time = Some(now);
        own.last_path = Some(path.to_path_buf());
        true
    }

    fn wants(&self, class: ResourceClass, kind: FileChangeKind) -> bool {
        let side = class.side();
        let direction = match side {
            Side::Human => self.mode.pushes(),
            Side::Gm => self.mode.pulls(),
        };
        let kind_ok = match kind {
            FileChangeKind::Modify => true,
            FileChangeKind::Create => side == Side::Human,
            FileChangeKind::Delete => false,
        };
        direction && kind_ok
    }

    /// Classify, filter and dispatch one change
    pub fn handle<D: Dispatcher>(&mut self, change: &FileChange, dispatcher: &mut D) -> Outcome {
        let class = match self.layout.classify(&change.path) {
            Some(class) if self.wants(class, change.kind) => class,
            _ => return Outcome::Ignored,
        };
        let side = class.side();

        if !self.accept(side, &change.path) {
            tracing::trace!("Suppressed {}", change.path.display());
            return Outcome::Suppressed;
        }

        let result = dispatcher.dispatch(class, &change.path);
        self.state_mut(side).last_time = Some(self.clock.now());

        match result {
            Ok(done) => {
                log_dispatched(side, &done);
                Outcome::Done(done)
            }
            Err(e) => {
                tracing::error!("{}", e);
                Outcome::Failed(e)
            }
        }
    }
}

fn log_dispatched(side: Side, done: &Dispatched) {
    let prefix = match side {
        Side::Human => "",
        Side::Gm => "(From GM) ",
    };
    match done.kind {
        DispatchKind::Translated => tracing::info!("{}Translated {}", prefix, done.name),
        DispatchKind::Copied => tracing::info!("{}Copied script {}", prefix, done.name),
    }
    if done.registered {
        tracing::info!("Project file updated with {}", done.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn layout() -> ProjectLayout {
        ProjectLayout::new(
            Path::new("/work/Bread.gmx"),
            Path::new("/work/Bread.gmx/Bread.project.gmx"),
            Path::new("/work/NiceObjects"),
        )
    }

    const HUMAN_OBJ: &str = "/work/NiceObjects/objBread.gmo";
    const HUMAN_OBJ_2: &str = "/work/NiceObjects/objToast.gmo";
    const GM_OBJ: &str = "/work/Bread.gmx/objects/objBread.object.gmx";
    const GM_SCRIPT: &str = "/work/Bread.gmx/scripts/scr_bake.gml";

    /// Records calls, optionally taking time or failing
    #[derive(Default)]
    struct Recorder {
        calls: Vec<(ResourceClass, PathBuf)>,
        takes: Option<(ManualClock, Duration)>,
        fail: bool,
    }

    impl Dispatcher for Recorder {
        fn dispatch(&mut self, class: ResourceClass, path: &Path) -> Result<Dispatched, TranslateError> {
            self.calls.push((class, path.to_path_buf()));
            if let Some((clock, by)) = &self.takes {
                clock.advance(*by);
            }
            if self.fail {
                return Err(TranslateError::InvalidName(path.to_path_buf()));
            }
            Ok(Dispatched {
                name: "objBread".into(),
                kind: DispatchKind::Translated,
                destination: PathBuf::new(),
                registered: false,
            })
        }
    }

    fn coordinator(mode: SyncMode) -> (Coordinator<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let config = SyncConfig {
            mode,
            ..SyncConfig::default()
        };
        (Coordinator::with_clock(layout(), &config, clock.clone()), clock)
    }

    fn modify(path: &str) -> FileChange {
        FileChange::new(path, FileChangeKind::Modify)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_duplicate_writes_dispatch_once() {
        let (mut c, clock) = coordinator(SyncMode::Bidirectional);
        let mut d = Recorder::default();

        assert!(matches!(c.handle(&modify(HUMAN_OBJ), &mut d), Outcome::Done(_)));
        clock.advance(ms(40));
        assert!(matches!(c.handle(&modify(HUMAN_OBJ), &mut d), Outcome::Suppressed));
        assert_eq!(d.calls.len(), 1);

        clock.advance(ms(100));
        assert!(matches!(c.handle(&modify(HUMAN_OBJ), &mut d), Outcome::Done(_)));
        assert_eq!(d.calls.len(), 2);
    }

    #[test]
    fn test_different_paths_same_side() {
        let (mut c, clock) = coordinator(SyncMode::Bidirectional);
        let mut d = Recorder::default();

        c.handle(&modify(HUMAN_OBJ), &mut d);
        clock.advance(ms(10));
        c.handle(&modify(HUMAN_OBJ_2), &mut d);
        assert_eq!(d.calls.len(), 2);
        assert_eq!(d.calls[1], (ResourceClass::HumanObject, PathBuf::from(HUMAN_OBJ_2)));
    }

    #[test]
    fn test_echo_from_other_side_is_suppressed() {
        let (mut c, clock) = coordinator(SyncMode::Bidirectional);
        let mut d = Recorder::default();

        c.handle(&modify(HUMAN_OBJ), &mut d);
        clock.advance(ms(200));
        assert!(matches!(c.handle(&modify(GM_OBJ), &mut d), Outcome::Suppressed));

        // The window boundary itself still counts as an echo
        clock.advance(ms(800));
        assert!(matches!(c.handle(&modify(GM_OBJ), &mut d), Outcome::Suppressed));

        clock.advance(ms(1));
        assert!(matches!(c.handle(&modify(GM_OBJ), &mut d), Outcome::Done(_)));
        assert_eq!(d.calls.len(), 2);
    }

    #[test]
    fn test_reverb_measured_from_completion() {
        let (mut c, clock) = coordinator(SyncMode::Bidirectional);
        let mut d = Recorder {
            takes: Some((clock.clone(), ms(700))),
            ..Default::default()
        };

        c.handle(&modify(HUMAN_OBJ), &mut d);
        // 900ms after the start but only 200ms after the translation finished
        clock.advance(ms(200));
        assert!(matches!(c.handle(&modify(GM_OBJ), &mut d), Outcome::Suppressed));
        assert_eq!(d.calls.len(), 1);
    }

    #[test]
    fn test_ignored_changes() {
        let (mut c, _clock) = coordinator(SyncMode::Bidirectional);
        let mut d = Recorder::default();

        let ignored = [
            modify("/work/NiceObjects/readme.txt"),
            modify("/work/Bread.gmx/Bread.project.gmx"),
            modify("/work/NiceObjects/.objBread.gmo.niceobj-tmp"),
            FileChange::new(HUMAN_OBJ, FileChangeKind::Delete),
            FileChange::new(GM_OBJ, FileChangeKind::Create),
        ];
        for change in &ignored {
            assert!(matches!(c.handle(change, &mut d), Outcome::Ignored), "{:?}", change);
        }
        assert!(d.calls.is_empty());

        let created = FileChange::new(HUMAN_OBJ, FileChangeKind::Create);
        assert!(matches!(c.handle(&created, &mut d), Outcome::Done(_)));
    }

    #[test]
    fn test_script_changes_are_dispatched() {
        let (mut c, _clock) = coordinator(SyncMode::Bidirectional);
        let mut d = Recorder::default();

        c.handle(&modify(GM_SCRIPT), &mut d);
        assert_eq!(d.calls, vec![(ResourceClass::GmScript, PathBuf::from(GM_SCRIPT))]);
    }

    #[test]
    fn test_failure_keeps_running() {
        let (mut c, clock) = coordinator(SyncMode::Bidirectional);
        let mut d = Recorder {
            fail: true,
            ..Default::default()
        };

        assert!(matches!(c.handle(&modify(HUMAN_OBJ), &mut d), Outcome::Failed(_)));
        clock.advance(ms(150));
        d.fail = false;
        assert!(matches!(c.handle(&modify(HUMAN_OBJ), &mut d), Outcome::Done(_)));
    }

    #[test]
    fn test_push_mode_ignores_gm_side() {
        let (mut c, _clock) = coordinator(SyncMode::Push);
        let mut d = Recorder::default();

        assert!(matches!(c.handle(&modify(GM_OBJ), &mut d), Outcome::Ignored));
        assert!(matches!(c.handle(&modify(HUMAN_OBJ), &mut d), Outcome::Done(_)));
    }

    #[test]
    fn test_pull_mode_ignores_human_side() {
        let (mut c, _clock) = coordinator(SyncMode::Pull);
        let mut d = Recorder::default();

        assert!(matches!(c.handle(&modify(HUMAN_OBJ), &mut d), Outcome::Ignored));
        assert!(matches!(c.handle(&modify(GM_OBJ), &mut d), Outcome::Done(_)));
    }

    #[test]
    fn test_first_change_is_accepted() {
        let (mut c, _clock) = coordinator(SyncMode::Bidirectional);
        assert!(c.accept(Side::Gm, Path::new(GM_OBJ)));
        assert!(!c.accept(Side::Human, Path::new(HUMAN_OBJ)));
    }
}
