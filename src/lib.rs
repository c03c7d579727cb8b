//! sshush - ssh_config from grouped host definitions
//!
//! This crate loads YAML definition files, layers them into a single
//! document and writes the ssh_config produced by the `sshush-resolve`
//! engine.

pub mod config;
pub mod logging;
pub mod runner;
pub mod source;

pub use config::{CliOverrides, EffectiveSettings, SettingsError};
pub use runner::{RunError, RunOptions, RunReport, Runner};
pub use source::{LoadError, SourceFile};
pub use sshush_resolve as resolve;
