//! Plugin-list source parsing
//!
//! One plugin per line: `url[,branch[,alias]]`. Blank lines and `#`
//! comments are ignored. A malformed line is a per-plugin resolution
//! failure: it is logged and skipped, never fatal to the run.

use plugnix_manifest::PluginDescriptor;
use tracing::warn;

pub fn parse_plugin_list(text: &str) -> Vec<PluginDescriptor> {
    let mut descriptors = Vec::new();

    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields = line.split(',').map(str::trim);
        let url = fields.next().unwrap_or_default();
        let branch = fields.next().filter(|f| !f.is_empty());
        let alias = fields.next().filter(|f| !f.is_empty());

        if url.is_empty() || fields.next().is_some() {
            warn!("skipping malformed plugin line {}: {:?}", number + 1, line);
            continue;
        }

        descriptors.push(PluginDescriptor::new(
            url,
            branch.map(str::to_string),
            alias.map(str::to_string),
        ));
    }

    descriptors
}
