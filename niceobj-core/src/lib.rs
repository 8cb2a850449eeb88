//! NiceObjects Core Library
//!
//! This crate provides the translation engine behind NiceObjects:
//! - Event code registry (names <-> GameMaker event numbers)
//! - Object model shared by both formats
//! - Human-editable `.gmo` parser and writer
//! - GameMaker `.object.gmx` adapter
//! - Project manifest patching and configuration

pub mod events;
pub mod gmx;
pub mod human;
pub mod manifest;
pub mod path_utils;
pub mod types;

// Re-export commonly used types
pub use events::{EventCode, EventDescriptor, EventError, EventRegistry, ParamRule};
pub use gmx::{decode_gmx, encode_gmx, fix_newlines, GmxError};
pub use human::{parse_human_object, write_human_object, ParseError, ParseErrorKind, WriteMode};
pub use manifest::{find_project_manifest, register_resource, ManifestError, ResourceKind};
pub use path_utils::{has_extension, is_gmx_object, resource_name, write_atomic};
pub use types::{
    Action, ConfigError, Event, GmObject, Physics, ProjectConfig, SyncConfig, SyncMode,
    CONFIG_FILE_NAME,
};
