//! In-memory GameMaker object
//!
//! One `GmObject` is built per translation and dropped afterwards.

use crate::events::EventCode;

/// A GameMaker object: properties plus its ordered event list
#[derive(Debug, Clone, PartialEq)]
pub struct GmObject {
    pub sprite: Option<String>,
    pub visible: bool,
    pub solid: bool,
    pub persistent: bool,
    pub depth: i32,
    pub parent: Option<String>,
    pub mask: Option<String>,

    /// Physics block, carried through untouched
    pub physics: Physics,

    pub events: Vec<Event>,
}

impl Default for GmObject {
    fn default() -> Self {
        Self {
            sprite: None,
            visible: true,
            solid: false,
            persistent: false,
            depth: 0,
            parent: None,
            mask: None,
            physics: Physics::default(),
            events: Vec::new(),
        }
    }
}

impl GmObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of actions across all events
    pub fn action_count(&self) -> usize {
        self.events.iter().map(|e| e.actions.len()).sum()
    }
}

/// One event and the code actions attached to it
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub code: EventCode,
    /// Colliding object, collision events only
    pub object: Option<String>,
    pub actions: Vec<Action>,
}

impl Event {
    /// Event with a single empty code action
    pub fn new(code: EventCode) -> Self {
        Self {
            code,
            object: None,
            actions: vec![Action::default()],
        }
    }

    pub fn with_code(code: EventCode, source: impl Into<String>) -> Self {
        Self {
            code,
            object: None,
            actions: vec![Action::new(source)],
        }
    }
}

/// An "Execute code" action
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Action {
    pub code: String,
}

impl Action {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

/// Physics properties of an object
///
/// Values are kept as the text GameMaker wrote so they survive a round trip
/// exactly. Defaults match a freshly created object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Physics {
    pub object: String,
    pub sensor: String,
    pub shape: String,
    pub density: String,
    pub restitution: String,
    pub group: String,
    pub linear_damping: String,
    pub angular_damping: String,
    pub friction: String,
    pub awake: String,
    pub kinematic: String,
    pub shape_points: Vec<String>,
}

impl Default for Physics {
    fn default() -> Self {
        Self {
            object: "0".to_string(),
            sensor: "0".to_string(),
            shape: "1".to_string(),
            density: "0.5".to_string(),
            restitution: "0.1".to_string(),
            group: "0".to_string(),
            linear_damping: "0.1".to_string(),
            angular_damping: "0.1".to_string(),
            friction: "0.2".to_string(),
            awake: "-1".to_string(),
            kinematic: "0".to_string(),
            shape_points: Vec::new(),
        }
    }
}
