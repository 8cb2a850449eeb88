//! `GmObject` to `.gmo` text

use std::fmt::Write as _;

use crate::events::{EventError, EventRegistry};
use crate::types::GmObject;

use super::TITLE_MARKER;

/// Output layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Events back to back, as used by live translation
    #[default]
    Live,

    /// Blank line between events, for reference listings
    Listing,
}

/// Serialize an object to the human format
///
/// Only properties that differ from a new object's defaults are written.
pub fn write_human_object(
    obj: &GmObject,
    registry: &EventRegistry,
    mode: WriteMode,
) -> Result<String, EventError> {
    let mut out = String::new();

    if let Some(sprite) = &obj.sprite {
        let _ = writeln!(out, "Sprite {}", sprite);
    }
    if !obj.visible {
        out.push_str("Invisible\n");
    }
    if obj.solid {
        out.push_str("Solid\n");
    }
    if obj.persistent {
        out.push_str("Persistent\n");
    }
    if obj.depth != 0 {
        let _ = writeln!(out, "Depth {}", obj.depth);
    }
    if let Some(parent) = &obj.parent {
        let _ = writeln!(out, "Parent {}", parent);
    }
    if let Some(mask) = &obj.mask {
        let _ = writeln!(out, "Mask {}", mask);
    }
    out.push('\n');

    for (i, event) in obj.events.iter().enumerate() {
        if mode == WriteMode::Listing && i > 0 {
            out.push('\n');
        }
        let title = registry.title_for(event.code, event.object.as_deref())?;
        let _ = writeln!(out, "{}{}", TITLE_MARKER, title);

        for (j, action) in event.actions.iter().enumerate() {
            if j > 0 {
                out.push('\n');
            }
            out.push_str(&action.code);
            out.push('\n');
        }
    }

    Ok(out)
}
