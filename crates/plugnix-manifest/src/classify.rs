//! Build-variant classification
//!
//! A plugin that is also packaged in the companion Lua package set builds
//! with the Neovim build function; everything else uses the plain Vim one.
//! Absence from the set is the normal case.

use crate::types::{MembershipSet, ResolvedPlugin};
use tracing::debug;

/// Whether this is a neovim-only plugin. Pure lookup, never fails.
pub fn is_neovim_plugin(plugin: &ResolvedPlugin, members: &MembershipSet) -> bool {
    if members.contains(&plugin.normalized_name()) {
        debug!("{} is a neovim plugin", plugin.name);
        return true;
    }
    false
}
