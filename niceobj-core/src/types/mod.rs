//! Core data types
//!
//! The object model shared by both formats, and the project configuration.

mod config;
mod object;

pub use config::*;
pub use object::*;
