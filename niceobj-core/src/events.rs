//! Event code registry
//!
//! GameMaker identifies an object event by a numeric `(eventtype, enumb)` pair.
//! The human format names events instead (`Create`, `Alarm 3`, `Collision objWall`).
//! This module maps between the two, including the ranged events whose
//! parameter is folded into the subcode.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::OnceLock;

/// Numeric event identifier as stored in `.object.gmx`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventCode {
    pub category: u32,
    pub subcode: u32,
}

impl EventCode {
    pub const fn new(category: u32, subcode: u32) -> Self {
        Self { category, subcode }
    }
}

impl fmt::Display for EventCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.category, self.subcode)
    }
}

/// What follows an event name in a title line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamRule {
    /// Name only
    None,
    /// Integer in `min..=max`, added to the base subcode
    Number { min: u32, max: u32 },
    /// Name of another object (collision events)
    Object,
}

/// One registered event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDescriptor {
    pub name: &'static str,
    pub code: EventCode,
    pub param: ParamRule,
}

impl EventDescriptor {
    const fn plain(name: &'static str, category: u32, subcode: u32) -> Self {
        Self {
            name,
            code: EventCode::new(category, subcode),
            param: ParamRule::None,
        }
    }

    const fn ranged(name: &'static str, category: u32, base: u32, max: u32) -> Self {
        Self {
            name,
            code: EventCode::new(category, base),
            param: ParamRule::Number { min: 0, max },
        }
    }

    const fn object(name: &'static str, category: u32) -> Self {
        Self {
            name,
            code: EventCode::new(category, 0),
            param: ParamRule::Object,
        }
    }

    /// Help-text suffix for the parameter
    pub fn param_hint(&self) -> &'static str {
        match self.param {
            ParamRule::None => "",
            ParamRule::Number { .. } => "[num]",
            ParamRule::Object => "[obj]",
        }
    }

    /// Whether `subcode` falls inside this entry's numbered range
    fn covers(&self, code: EventCode) -> bool {
        match self.param {
            ParamRule::Number { min, max } => {
                code.category == self.code.category
                    && code.subcode >= self.code.subcode + min
                    && code.subcode <= self.code.subcode + max
            }
            _ => false,
        }
    }
}

/// Error types for event lookups and title parameters
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventError {
    #[error("Unrecognized event code: {0}")]
    UnknownCode(EventCode),

    #[error("Unrecognized event title: {0}")]
    UnknownTitle(String),

    #[error("{event} event needs a number")]
    MissingNumber { event: &'static str },

    #[error("{event} event has invalid number {value}")]
    InvalidNumber { event: &'static str, value: String },

    #[error("{event} event needs an object name")]
    MissingObject { event: &'static str },

    #[error("{event} event does not take parameter {value}")]
    UnexpectedParameter { event: &'static str, value: String },
}

/// Events GameMaker: Studio 1.x exposes for code actions
const STANDARD_EVENTS: &[EventDescriptor] = &[
    EventDescriptor::plain("Create", 0, 0),
    EventDescriptor::plain("Destroy", 1, 0),
    EventDescriptor::ranged("Alarm", 2, 0, 11),
    EventDescriptor::plain("Step", 3, 0),
    EventDescriptor::plain("Begin Step", 3, 1),
    EventDescriptor::plain("End Step", 3, 2),
    EventDescriptor::object("Collision", 4),
    EventDescriptor::plain("Outside Room", 7, 0),
    EventDescriptor::plain("Intersect Boundary", 7, 1),
    EventDescriptor::plain("Game Start", 7, 2),
    EventDescriptor::plain("Game End", 7, 3),
    EventDescriptor::plain("Room Start", 7, 4),
    EventDescriptor::plain("Room End", 7, 5),
    EventDescriptor::plain("No More Lives", 7, 6),
    EventDescriptor::plain("Animation End", 7, 7),
    EventDescriptor::plain("End Of Path", 7, 8),
    EventDescriptor::plain("No More Health", 7, 9),
    EventDescriptor::ranged("User Defined", 7, 10, 15),
    EventDescriptor::ranged("Outside View", 7, 40, 7),
    EventDescriptor::ranged("Boundary View", 7, 50, 7),
    EventDescriptor::plain("Animation Update", 7, 58),
    EventDescriptor::plain("Image Loaded", 7, 60),
    EventDescriptor::plain("HTTP", 7, 62),
    EventDescriptor::plain("Dialog", 7, 63),
    EventDescriptor::plain("IAP", 7, 66),
    EventDescriptor::plain("Cloud", 7, 67),
    EventDescriptor::plain("Networking", 7, 68),
    EventDescriptor::plain("Steam", 7, 69),
    EventDescriptor::plain("Social", 7, 70),
    EventDescriptor::plain("Push Notification", 7, 71),
    EventDescriptor::plain("Save / Load", 7, 72),
    EventDescriptor::plain("Audio Recording", 7, 73),
    EventDescriptor::plain("Audio Playback", 7, 74),
    EventDescriptor::plain("System Event", 7, 75),
    EventDescriptor::plain("Draw", 8, 0),
    EventDescriptor::plain("Draw GUI", 8, 64),
    EventDescriptor::plain("Resize", 8, 65),
    EventDescriptor::plain("Draw Begin", 8, 72),
    EventDescriptor::plain("Draw End", 8, 73),
    EventDescriptor::plain("Draw GUI Begin", 8, 74),
    EventDescriptor::plain("Draw GUI End", 8, 75),
    EventDescriptor::plain("Pre Draw", 8, 76),
    EventDescriptor::plain("Post Draw", 8, 77),
];

/// Categories where every subcode is the parameter (alarms)
const WILDCARD_CATEGORIES: &[u32] = &[2];

/// Result of resolving a numeric code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedCode<'a> {
    pub descriptor: &'a EventDescriptor,
    /// Range-relative number for numbered events
    pub number: Option<u32>,
}

/// Result of resolving a title line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTitle<'a> {
    pub descriptor: &'a EventDescriptor,
    pub code: EventCode,
    pub object: Option<String>,
}

/// Immutable name <-> code table
#[derive(Debug)]
pub struct EventRegistry {
    entries: Vec<EventDescriptor>,
    by_code: HashMap<EventCode, usize>,
    by_name: HashMap<&'static str, usize>,
    wildcard_categories: HashSet<u32>,
}

impl EventRegistry {
    /// Build a registry from a descriptor table
    pub fn new(entries: Vec<EventDescriptor>, wildcard_categories: &[u32]) -> Self {
        let by_code = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.code, i))
            .collect();
        let by_name = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.name, i))
            .collect();
        Self {
            entries,
            by_code,
            by_name,
            wildcard_categories: wildcard_categories.iter().copied().collect(),
        }
    }

    /// The standard GameMaker event table, built on first use
    pub fn standard() -> &'static EventRegistry {
        static REGISTRY: OnceLock<EventRegistry> = OnceLock::new();
        REGISTRY.get_or_init(|| EventRegistry::new(STANDARD_EVENTS.to_vec(), WILDCARD_CATEGORIES))
    }

    pub fn entries(&self) -> &[EventDescriptor] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&EventDescriptor> {
        self.by_name.get(name).map(|&i| &self.entries[i])
    }

    /// Map a numeric code to its descriptor and range-relative number
    pub fn resolve_by_code(&self, code: EventCode) -> Result<ResolvedCode<'_>, EventError> {
        if let Some(&i) = self.by_code.get(&code) {
            let descriptor = &self.entries[i];
            let number = match descriptor.param {
                ParamRule::Number { .. } => Some(0),
                _ => None,
            };
            return Ok(ResolvedCode { descriptor, number });
        }

        if self.wildcard_categories.contains(&code.category) {
            if let Some(&i) = self.by_code.get(&EventCode::new(code.category, 0)) {
                return Ok(ResolvedCode {
                    descriptor: &self.entries[i],
                    number: Some(code.subcode),
                });
            }
        } else if let Some(descriptor) = self.entries.iter().find(|e| e.covers(code)) {
            return Ok(ResolvedCode {
                descriptor,
                number: Some(code.subcode - descriptor.code.subcode),
            });
        }

        Err(EventError::UnknownCode(code))
    }

    /// Parse an event title such as `Alarm 3` or `Collision objWall`
    ///
    /// The whole title is tried as a name first, then the first one and two
    /// whitespace-separated tokens. Remaining tokens are the parameter.
    pub fn resolve_by_name(&self, title: &str) -> Result<ResolvedTitle<'_>, EventError> {
        let title = title.trim();
        let tokens: Vec<&str> = title.split_whitespace().collect();

        let (descriptor, rest) = if let Some(d) = self.get(title) {
            (d, &tokens[tokens.len()..])
        } else {
            (1..=2usize)
                .filter(|&n| n <= tokens.len())
                .find_map(|n| self.get(&tokens[..n].join(" ")).map(|d| (d, &tokens[n..])))
                .ok_or_else(|| EventError::UnknownTitle(title.to_string()))?
        };

        let event = descriptor.name;
        match descriptor.param {
            ParamRule::None => {
                if !rest.is_empty() {
                    return Err(EventError::UnexpectedParameter {
                        event,
                        value: rest.join(" "),
                    });
                }
                Ok(ResolvedTitle {
                    descriptor,
                    code: descriptor.code,
                    object: None,
                })
            }
            ParamRule::Number { min, max } => {
                let raw = match rest {
                    [] => return Err(EventError::MissingNumber { event }),
                    [raw] => *raw,
                    [_, extra @ ..] => {
                        return Err(EventError::UnexpectedParameter {
                            event,
                            value: extra.join(" "),
                        })
                    }
                };
                let n: u32 = raw.parse().map_err(|_| EventError::InvalidNumber {
                    event,
                    value: raw.to_string(),
                })?;
                if n < min || n > max {
                    return Err(EventError::InvalidNumber {
                        event,
                        value: raw.to_string(),
                    });
                }
                Ok(ResolvedTitle {
                    descriptor,
                    code: EventCode::new(descriptor.code.category, descriptor.code.subcode + n),
                    object: None,
                })
            }
            ParamRule::Object => match rest {
                [] => Err(EventError::MissingObject { event }),
                [object] => Ok(ResolvedTitle {
                    descriptor,
                    code: descriptor.code,
                    object: Some(object.to_string()),
                }),
                [_, extra @ ..] => Err(EventError::UnexpectedParameter {
                    event,
                    value: extra.join(" "),
                }),
            },
        }
    }

    /// Title text (without the `---` marker) for a numeric code
    pub fn title_for(&self, code: EventCode, object: Option<&str>) -> Result<String, EventError> {
        let resolved = self.resolve_by_code(code)?;
        let name = resolved.descriptor.name;
        match resolved.descriptor.param {
            ParamRule::None => Ok(name.to_string()),
            ParamRule::Number { .. } => Ok(format!("{} {}", name, resolved.number.unwrap_or(0))),
            ParamRule::Object => match object {
                Some(object) if !object.is_empty() => Ok(format!("{} {}", name, object)),
                _ => Err(EventError::MissingObject { event: name }),
            },
        }
    }

    /// All names with their parameter hint, three per row in fixed-width columns
    pub fn help_listing(&self) -> String {
        let mut names: Vec<String> = self
            .entries
            .iter()
            .map(|e| match e.param_hint() {
                "" => e.name.to_string(),
                hint => format!("{} {}", e.name, hint),
            })
            .collect();
        names.sort();

        let mut out = String::new();
        for row in names.chunks(3) {
            let line: String = row.iter().map(|n| format!("{:<25}", n)).collect();
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> &'static EventRegistry {
        EventRegistry::standard()
    }

    #[test]
    fn test_exact_code() {
        let r = registry().resolve_by_code(EventCode::new(3, 1)).unwrap();
        assert_eq!(r.descriptor.name, "Begin Step");
        assert_eq!(r.number, None);
    }

    #[test]
    fn test_wildcard_alarm() {
        let r = registry().resolve_by_code(EventCode::new(2, 7)).unwrap();
        assert_eq!(r.descriptor.name, "Alarm");
        assert_eq!(r.number, Some(7));

        let t = registry().resolve_by_name("Alarm 7").unwrap();
        assert_eq!(t.code, EventCode::new(2, 7));
    }

    #[test]
    fn test_ranged_user_defined() {
        let r = registry().resolve_by_code(EventCode::new(7, 13)).unwrap();
        assert_eq!(r.descriptor.name, "User Defined");
        assert_eq!(r.number, Some(3));

        let t = registry().resolve_by_name("User Defined 3").unwrap();
        assert_eq!(t.code, EventCode::new(7, 13));

        let r = registry().resolve_by_code(EventCode::new(7, 57)).unwrap();
        assert_eq!(r.descriptor.name, "Boundary View");
        assert_eq!(r.number, Some(7));
    }

    #[test]
    fn test_unknown_code() {
        assert_eq!(
            registry().resolve_by_code(EventCode::new(7, 30)),
            Err(EventError::UnknownCode(EventCode::new(7, 30)))
        );
        assert!(registry().resolve_by_code(EventCode::new(5, 0)).is_err());
    }

    #[test]
    fn test_multi_word_names() {
        let t = registry().resolve_by_name("Draw GUI Begin").unwrap();
        assert_eq!(t.code, EventCode::new(8, 74));
        let t = registry().resolve_by_name("Save / Load").unwrap();
        assert_eq!(t.code, EventCode::new(7, 72));
        let t = registry().resolve_by_name("  Begin   Step ").unwrap();
        assert_eq!(t.code, EventCode::new(3, 1));
    }

    #[test]
    fn test_collision_object() {
        let t = registry().resolve_by_name("Collision objWall").unwrap();
        assert_eq!(t.code, EventCode::new(4, 0));
        assert_eq!(t.object.as_deref(), Some("objWall"));

        assert_eq!(
            registry().resolve_by_name("Collision"),
            Err(EventError::MissingObject { event: "Collision" })
        );
    }

    #[test]
    fn test_parameter_validation() {
        assert_eq!(
            registry().resolve_by_name("Alarm"),
            Err(EventError::MissingNumber { event: "Alarm" })
        );
        assert_eq!(
            registry().resolve_by_name("Alarm 12"),
            Err(EventError::InvalidNumber { event: "Alarm", value: "12".into() })
        );
        assert_eq!(
            registry().resolve_by_name("Outside View x"),
            Err(EventError::InvalidNumber { event: "Outside View", value: "x".into() })
        );
        assert!(matches!(
            registry().resolve_by_name("Create now"),
            Err(EventError::UnexpectedParameter { event: "Create", .. })
        ));
        assert!(matches!(
            registry().resolve_by_name("Alarm 1 2"),
            Err(EventError::UnexpectedParameter { event: "Alarm", .. })
        ));
        assert_eq!(
            registry().resolve_by_name("Keyboard 32"),
            Err(EventError::UnknownTitle("Keyboard 32".into()))
        );
    }

    #[test]
    fn test_bijection_over_registered_surface() {
        let r = registry();
        for entry in r.entries() {
            let params: Vec<String> = match entry.param {
                ParamRule::None => vec![String::new()],
                ParamRule::Number { min, max } => (min..=max).map(|n| n.to_string()).collect(),
                ParamRule::Object => vec!["objPlayer".to_string()],
            };
            for p in params {
                let title = if p.is_empty() {
                    entry.name.to_string()
                } else {
                    format!("{} {}", entry.name, p)
                };
                let resolved = r.resolve_by_name(&title).unwrap();
                let back = r
                    .title_for(resolved.code, resolved.object.as_deref())
                    .unwrap();
                assert_eq!(back, title);
            }
        }
    }

    #[test]
    fn test_help_listing() {
        let listing = registry().help_listing();
        assert!(listing.contains("Alarm [num]"));
        assert!(listing.contains("Collision [obj]"));
        assert!(listing.lines().all(|l| l.len() <= 75));
        assert_eq!(listing.lines().count(), (STANDARD_EVENTS.len() + 2) / 3);
    }
}
