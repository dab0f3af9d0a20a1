// logsift - platform/mod.rs
//
// Platform abstraction layer: config directory, config.toml, file access.
// Dependencies: standard library, directories, toml.
// Must NOT depend on: core.

pub mod config;
pub mod fs;
