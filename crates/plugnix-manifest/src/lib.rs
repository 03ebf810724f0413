//! Plugin-set manifest generation
//!
//! This crate holds the core data model for the plugin set, the build-variant
//! classifier, and the manifest emitter that turns resolved plugins into the
//! generated Nix overlay file.

pub mod classify;
pub mod emit;
pub mod errors;
pub mod types;

pub use classify::is_neovim_plugin;
pub use emit::{Emitter, HEADER};
pub use errors::ManifestError;
pub use types::{MembershipSet, PluginDescriptor, RepoHost, ResolvedPlugin};
