//! CLI command implementations.
//!
//! # Command Modules
//!
//! - [`common`] - Rendering options and helpers shared by every command
//! - [`generate`] - Render flight paths by area, by radius or from a request file

pub mod common;
pub mod generate;
