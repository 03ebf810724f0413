//! Plugin-list resolution service
//!
//! Turns the plugin-list source into pinned `ResolvedPlugin` records and
//! exposes the combined "resolve all, then generate" entry point used by
//! the CLI. Per-plugin failure isolation and fetch parallelism live here
//! and nowhere else.

pub mod errors;
pub mod github;
pub mod list;
pub mod update;

pub use errors::ResolveError;
pub use github::{RemoteSource, RevisionSource};
pub use list::parse_plugin_list;
pub use update::update_and_generate;
