//! Resolution engine for sshush.
//!
//! Turns a layered document of host groups into ssh_config blocks. Each host's
//! options are merged from, lowest precedence first: the `default` block, the
//! group named by `Extends` (followed transitively), the group's own `Config`,
//! and the host entry itself. Output order is fully deterministic: groups in
//! input order, hosts sorted by alias, `HostName` first, other keys sorted.
//!
//! The engine performs no I/O. Callers parse their sources into [`Mapping`]s,
//! layer them into a [`Document`] and call [`render`].

mod document;
mod error;
mod extends;
mod group;
mod hosts;
mod merge;
mod render;
mod value;

pub use document::{Document, DEFAULT_KEY, GLOBAL_KEY};
pub use error::ResolveError;
pub use extends::{resolve_extensions, ExtensionEntry, ExtensionTable};
pub use group::{compute_group_config, GroupDefinition};
pub use hosts::{normalize_hosts, resolve_aliased_host, resolve_host, HostEntry, HOST_NAME_KEY};
pub use merge::{merge, merge_layers};
pub use render::{render, resolve, Resolution, ResolvedGroup, ResolvedHost};
pub use value::{Mapping, Value};
