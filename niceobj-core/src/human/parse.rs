//! `.gmo` text to `GmObject`

use crate::events::{EventError, EventRegistry};
use crate::types::{Event, GmObject};

use super::TITLE_MARKER;

/// A syntax error, tagged with its 1-based line number
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} on line {line}")]
pub struct ParseError {
    pub line: usize,
    pub kind: ParseErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("Empty event title")]
    EmptyTitle,

    #[error("Unrecognized object property {0}")]
    UnknownProperty(String),

    #[error("{property} property needs a value")]
    MissingValue { property: &'static str },

    #[error("Invalid {property} value {value}")]
    InvalidValue { property: &'static str, value: String },

    #[error("{property} property does not take value {value}")]
    UnexpectedValue { property: &'static str, value: String },

    #[error(transparent)]
    Event(#[from] EventError),
}

enum State {
    Properties,
    InEvent,
}

/// Parse a human object file
///
/// Every line after a title line, blank or not, belongs to that event's code.
/// Leading and trailing newlines and spaces are trimmed from each event's
/// code once the whole file has been read.
pub fn parse_human_object(text: &str, registry: &EventRegistry) -> Result<GmObject, ParseError> {
    let mut obj = GmObject::new();
    let mut state = State::Properties;

    for (idx, line) in text.lines().enumerate() {
        let line_num = idx + 1;
        let err = |kind: ParseErrorKind| ParseError { line: line_num, kind };

        if let Some(title) = line.strip_prefix(TITLE_MARKER) {
            let title = title.trim();
            if title.is_empty() {
                return Err(err(ParseErrorKind::EmptyTitle));
            }
            let resolved = registry
                .resolve_by_name(title)
                .map_err(|e| err(e.into()))?;

            let mut event = Event::new(resolved.code);
            event.object = resolved.object;
            obj.events.push(event);
            state = State::InEvent;
            continue;
        }

        match state {
            State::Properties => apply_property(&mut obj, line).map_err(err)?,
            State::InEvent => {
                // Title lines always push an event with one action
                if let Some(action) = obj.events.last_mut().and_then(|e| e.actions.last_mut()) {
                    action.code.push_str(line);
                    action.code.push('\n');
                }
            }
        }
    }

    for event in &mut obj.events {
        for action in &mut event.actions {
            let trimmed = action.code.trim_matches(|c| c == '\n' || c == ' ');
            if trimmed.len() != action.code.len() {
                action.code = trimmed.to_string();
            }
        }
    }

    Ok(obj)
}

/// Apply one property line; blank lines are ignored
fn apply_property(obj: &mut GmObject, line: &str) -> Result<(), ParseErrorKind> {
    let mut tokens = line.split_whitespace();
    let Some(keyword) = tokens.next() else {
        return Ok(());
    };
    let rest: Vec<&str> = tokens.collect();

    match keyword {
        "Sprite" => obj.sprite = Some(single_value("Sprite", &rest)?.to_string()),
        "Parent" => obj.parent = Some(single_value("Parent", &rest)?.to_string()),
        "Mask" => obj.mask = Some(single_value("Mask", &rest)?.to_string()),
        "Depth" => {
            let raw = single_value("Depth", &rest)?;
            obj.depth = raw.parse().map_err(|_| ParseErrorKind::InvalidValue {
                property: "Depth",
                value: raw.to_string(),
            })?;
        }
        "Invisible" => {
            no_value("Invisible", &rest)?;
            obj.visible = false;
        }
        "Solid" => {
            no_value("Solid", &rest)?;
            obj.solid = true;
        }
        "Persistent" => {
            no_value("Persistent", &rest)?;
            obj.persistent = true;
        }
        other => return Err(ParseErrorKind::UnknownProperty(other.to_string())),
    }
    Ok(())
}

fn single_value<'a>(property: &'static str, rest: &[&'a str]) -> Result<&'a str, ParseErrorKind> {
    match rest {
        [] => Err(ParseErrorKind::MissingValue { property }),
        [value] => Ok(value),
        [_, extra @ ..] => Err(ParseErrorKind::UnexpectedValue {
            property,
            value: extra.join(" "),
        }),
    }
}

fn no_value(property: &'static str, rest: &[&str]) -> Result<(), ParseErrorKind> {
    if rest.is_empty() {
        Ok(())
    } else {
        Err(ParseErrorKind::UnexpectedValue {
            property,
            value: rest.join(" "),
        })
    }
}
