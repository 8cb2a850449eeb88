//! Human-editable object format (`.gmo`)
//!
//! ```text
//! Sprite sprBread
//! Solid
//!
//! ---Create
//! x = 0;
//! ---Alarm 3
//! y += 1;
//! ```
//!
//! Property lines come first, then event blocks. A block starts with a
//! `---` title line and holds verbatim code up to the next title line.

mod parse;
mod write;

pub use parse::{parse_human_object, ParseError, ParseErrorKind};
pub use write::{write_human_object, WriteMode};

/// Prefix of an event title line
pub const TITLE_MARKER: &str = "---";

/// Extension of human object files
pub const HUMAN_OBJECT_EXT: &str = "gmo";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventCode, EventRegistry};
    use crate::types::{Action, Event, GmObject};

    const BREAD: &str = "Sprite sprBread\nSolid\n\n---Create\nx = 0;\n---Alarm 3\ny += 1;\n";

    #[test]
    fn test_bread_scenario() {
        let registry = EventRegistry::standard();
        let obj = parse_human_object(BREAD, registry).unwrap();

        assert_eq!(obj.sprite.as_deref(), Some("sprBread"));
        assert!(obj.solid);
        assert!(obj.visible);
        assert_eq!(obj.events.len(), 2);
        assert_eq!(obj.events[0].code, EventCode::new(0, 0));
        assert_eq!(obj.events[0].actions, vec![Action::new("x = 0;")]);
        assert_eq!(obj.events[1].code, EventCode::new(2, 3));
        assert_eq!(obj.events[1].actions, vec![Action::new("y += 1;")]);

        let text = write_human_object(&obj, registry, WriteMode::Live).unwrap();
        assert_eq!(text, BREAD);
    }

    #[test]
    fn test_round_trip_all_properties() {
        let registry = EventRegistry::standard();
        let obj = GmObject {
            sprite: Some("sprPlayer".into()),
            visible: false,
            solid: true,
            persistent: true,
            depth: -10,
            parent: Some("objActor".into()),
            mask: Some("sprPlayerMask".into()),
            events: vec![
                Event::with_code(EventCode::new(3, 1), "if (hp <= 0) {\n\n    instance_destroy();\n}"),
                Event {
                    code: EventCode::new(4, 0),
                    object: Some("objWall".into()),
                    actions: vec![Action::new("x = xprevious;")],
                },
                Event::with_code(EventCode::new(7, 25), "event_inherited();"),
                Event::with_code(EventCode::new(8, 64), ""),
            ],
            ..GmObject::default()
        };

        let text = write_human_object(&obj, registry, WriteMode::Live).unwrap();
        let parsed = parse_human_object(&text, registry).unwrap();
        assert_eq!(parsed, obj);
    }

    #[test]
    fn test_empty_object_round_trip() {
        let registry = EventRegistry::standard();
        let text = write_human_object(&GmObject::default(), registry, WriteMode::Live).unwrap();
        assert_eq!(text, "\n");
        assert_eq!(parse_human_object(&text, registry).unwrap(), GmObject::default());
    }
}
