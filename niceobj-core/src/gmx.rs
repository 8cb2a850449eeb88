//! GameMaker `.object.gmx` adapter
//!
//! Decoding and encoding go through quick-xml's serde support. On top of the
//! codec this module owns three GameMaker-specific rules:
//! - objects containing drag-and-drop actions are rejected
//! - output uses literal `\r\n` newlines, including inside code
//! - an empty `<PhysicsShapePoints/>` element is always written

use serde::{Deserialize, Serialize};

use crate::events::EventCode;
use crate::manifest::insert_line_before;
use crate::types::{Action, Event, GmObject, Physics};

/// Marker GameMaker writes for an unset resource reference
pub const UNDEFINED: &str = "<undefined>";

/// `exetype` of an "Execute code" action
const EXE_CODE: i32 = 2;

/// Error types for the structured format
#[derive(Debug, thiserror::Error)]
pub enum GmxError {
    #[error("Error decoding XML: {0}")]
    Decode(String),

    #[error("Error encoding XML: {0}")]
    Encode(String),

    #[error("Unsupported visual action in event {0}")]
    VisualAction(EventCode),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename = "object", default)]
struct GmxObject {
    #[serde(rename = "spriteName")]
    sprite_name: String,
    solid: i32,
    visible: i32,
    depth: i32,
    persistent: i32,
    #[serde(rename = "parentName")]
    parent_name: String,
    #[serde(rename = "maskName")]
    mask_name: String,
    events: GmxEvents,
    #[serde(rename = "PhysicsObject")]
    physics_object: String,
    #[serde(rename = "PhysicsObjectSensor")]
    physics_sensor: String,
    #[serde(rename = "PhysicsObjectShape")]
    physics_shape: String,
    #[serde(rename = "PhysicsObjectDensity")]
    physics_density: String,
    #[serde(rename = "PhysicsObjectRestitution")]
    physics_restitution: String,
    #[serde(rename = "PhysicsObjectGroup")]
    physics_group: String,
    #[serde(rename = "PhysicsObjectLinearDamping")]
    physics_linear_damping: String,
    #[serde(rename = "PhysicsObjectAngularDamping")]
    physics_angular_damping: String,
    #[serde(rename = "PhysicsObjectFriction")]
    physics_friction: String,
    #[serde(rename = "PhysicsObjectAwake")]
    physics_awake: String,
    #[serde(rename = "PhysicsObjectKinematic")]
    physics_kinematic: String,
    // Written by `encode_gmx` when empty
    #[serde(rename = "PhysicsShapePoints", skip_serializing_if = "GmxShapePoints::is_empty")]
    physics_shape_points: GmxShapePoints,
}

impl Default for GmxObject {
    fn default() -> Self {
        GmxObject::from(&GmObject::default())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct GmxEvents {
    #[serde(rename = "event", default)]
    events: Vec<GmxEvent>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct GmxEvent {
    #[serde(rename = "@eventtype")]
    category: u32,
    // Collision events carry `ename` and no `enumb`
    #[serde(rename = "@enumb", default, skip_serializing_if = "Option::is_none")]
    subcode: Option<u32>,
    #[serde(rename = "@ename", default, skip_serializing_if = "Option::is_none")]
    object: Option<String>,
    #[serde(rename = "action", default)]
    actions: Vec<GmxAction>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct GmxAction {
    libid: i32,
    id: i32,
    kind: i32,
    userelative: i32,
    isquestion: i32,
    useapplyto: i32,
    exetype: i32,
    functionname: String,
    codestring: String,
    #[serde(rename = "whoName")]
    who_name: String,
    relative: i32,
    isnot: i32,
    arguments: GmxArguments,
}

impl GmxAction {
    /// GameMaker's "Execute code" action (library 1, action 603)
    fn execute_code(code: &str) -> Self {
        Self {
            libid: 1,
            id: 603,
            kind: 7,
            useapplyto: -1,
            exetype: EXE_CODE,
            who_name: "self".to_string(),
            arguments: GmxArguments {
                arguments: vec![GmxArgument {
                    kind: 1,
                    string: code.to_string(),
                }],
            },
            ..Self::default()
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct GmxArguments {
    #[serde(rename = "argument", default)]
    arguments: Vec<GmxArgument>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct GmxArgument {
    kind: i32,
    string: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct GmxShapePoints {
    #[serde(rename = "point", default)]
    points: Vec<String>,
}

impl GmxShapePoints {
    fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

fn reference(name: &str) -> Option<String> {
    if name.is_empty() || name == UNDEFINED {
        None
    } else {
        Some(name.to_string())
    }
}

fn gm_bool(value: bool) -> i32 {
    if value {
        -1
    } else {
        0
    }
}

impl From<&GmObject> for GmxObject {
    fn from(obj: &GmObject) -> Self {
        let undefined = |r: &Option<String>| r.clone().unwrap_or_else(|| UNDEFINED.to_string());
        let physics = &obj.physics;

        Self {
            sprite_name: undefined(&obj.sprite),
            solid: gm_bool(obj.solid),
            visible: gm_bool(obj.visible),
            depth: obj.depth,
            persistent: gm_bool(obj.persistent),
            parent_name: undefined(&obj.parent),
            mask_name: undefined(&obj.mask),
            events: GmxEvents {
                events: obj
                    .events
                    .iter()
                    .map(|event| GmxEvent {
                        category: event.code.category,
                        subcode: match event.object {
                            Some(_) => None,
                            None => Some(event.code.subcode),
                        },
                        object: event.object.clone(),
                        actions: event
                            .actions
                            .iter()
                            .map(|a| GmxAction::execute_code(&a.code))
                            .collect(),
                    })
                    .collect(),
            },
            physics_object: physics.object.clone(),
            physics_sensor: physics.sensor.clone(),
            physics_shape: physics.shape.clone(),
            physics_density: physics.density.clone(),
            physics_restitution: physics.restitution.clone(),
            physics_group: physics.group.clone(),
            physics_linear_damping: physics.linear_damping.clone(),
            physics_angular_damping: physics.angular_damping.clone(),
            physics_friction: physics.friction.clone(),
            physics_awake: physics.awake.clone(),
            physics_kinematic: physics.kinematic.clone(),
            physics_shape_points: GmxShapePoints {
                points: physics.shape_points.clone(),
            },
        }
    }
}

impl TryFrom<GmxObject> for GmObject {
    type Error = GmxError;

    fn try_from(gmx: GmxObject) -> Result<Self, Self::Error> {
        let mut events = Vec::with_capacity(gmx.events.events.len());
        for event in gmx.events.events {
            let code = EventCode::new(event.category, event.subcode.unwrap_or(0));
            let mut actions = Vec::with_capacity(event.actions.len());
            for action in event.actions {
                if action.exetype != EXE_CODE {
                    return Err(GmxError::VisualAction(code));
                }
                let code_arg = action
                    .arguments
                    .arguments
                    .into_iter()
                    .next()
                    .ok_or(GmxError::VisualAction(code))?;
                actions.push(Action::new(code_arg.string.replace("\r\n", "\n")));
            }
            events.push(Event {
                code,
                object: event.object.filter(|o| !o.is_empty()),
                actions,
            });
        }

        Ok(GmObject {
            sprite: reference(&gmx.sprite_name),
            visible: gmx.visible != 0,
            solid: gmx.solid != 0,
            persistent: gmx.persistent != 0,
            depth: gmx.depth,
            parent: reference(&gmx.parent_name),
            mask: reference(&gmx.mask_name),
            physics: Physics {
                object: gmx.physics_object,
                sensor: gmx.physics_sensor,
                shape: gmx.physics_shape,
                density: gmx.physics_density,
                restitution: gmx.physics_restitution,
                group: gmx.physics_group,
                linear_damping: gmx.physics_linear_damping,
                angular_damping: gmx.physics_angular_damping,
                friction: gmx.physics_friction,
                awake: gmx.physics_awake,
                kinematic: gmx.physics_kinematic,
                shape_points: gmx.physics_shape_points.points,
            },
            events,
        })
    }
}

/// Decode an `.object.gmx` document
///
/// Fails if any action is not an "Execute code" action; nothing is returned
/// for partially supported objects.
pub fn decode_gmx(xml: &str) -> Result<GmObject, GmxError> {
    let xml = protect_code_whitespace(xml);
    let gmx: GmxObject =
        quick_xml::de::from_str(&xml).map_err(|e| GmxError::Decode(e.to_string()))?;
    GmObject::try_from(gmx)
}

/// Rewrite leading and trailing whitespace of every `<string>` value as
/// character references
///
/// The deserializer trims whitespace at both ends of text content, which
/// would strip the indentation of a code action's first line.
fn protect_code_whitespace(xml: &str) -> String {
    const OPEN: &str = "<string>";
    const CLOSE: &str = "</string>";

    let mut out = String::with_capacity(xml.len());
    let mut rest = xml;
    while let Some(start) = rest.find(OPEN) {
        let body_start = start + OPEN.len();
        let Some(len) = rest[body_start..].find(CLOSE) else {
            break;
        };
        let body = &rest[body_start..body_start + len];
        out.push_str(&rest[..body_start]);

        let after_lead = body.trim_start();
        let core = after_lead.trim_end();
        push_char_refs(&mut out, &body[..body.len() - after_lead.len()]);
        out.push_str(core);
        push_char_refs(&mut out, &after_lead[core.len()..]);

        rest = &rest[body_start + len..];
    }
    out.push_str(rest);
    out
}

fn push_char_refs(out: &mut String, chars: &str) {
    for c in chars.chars() {
        out.push_str(&format!("&#{};", u32::from(c)));
    }
}

/// Encode an object as GameMaker writes it
pub fn encode_gmx(obj: &GmObject) -> Result<String, GmxError> {
    let gmx = GmxObject::from(obj);

    let mut text = String::new();
    let mut writer = CrlfWriter { inner: &mut text };
    let mut ser = quick_xml::se::Serializer::new(&mut writer);
    ser.indent(' ', 2);
    gmx.serialize(ser)
        .map_err(|e| GmxError::Encode(e.to_string()))?;

    if obj.physics.shape_points.is_empty() {
        text = insert_line_before(&text, "</object>", "  <PhysicsShapePoints/>")
            .ok_or_else(|| GmxError::Encode("missing closing </object> line".to_string()))?;
    }
    Ok(text)
}

/// Applies [`fix_newlines`] to everything written through it
///
/// The serializer emits each escaped text value in a single write, so an
/// escape sequence never straddles two chunks.
struct CrlfWriter<W> {
    inner: W,
}

impl<W: std::fmt::Write> std::fmt::Write for CrlfWriter<W> {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        if s.contains(['\n', '\r', '&']) {
            self.inner.write_str(&fix_newlines(s))
        } else {
            self.inner.write_str(s)
        }
    }
}

/// Turn escaped newlines into real ones, then make every newline `\r\n`
pub fn fix_newlines(raw: &str) -> String {
    raw.replace("&#xA;", "\n")
        .replace("&#10;", "\n")
        .replace("\r\n", "\n")
        .replace('\n', "\r\n")
}
