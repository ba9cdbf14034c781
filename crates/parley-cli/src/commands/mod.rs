//! CLI command implementations for the `parley` binary.

pub mod config;
pub mod console;
pub mod demo;
