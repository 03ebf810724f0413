//! Manifest rendering and assembly
//!
//! The generated file is a function taking the build helpers, returning an
//! overlay of one attribute per plugin. Output is byte-deterministic for a
//! fixed input set: fragments are sorted by the descriptor's name,
//! case-insensitively, so regeneration diffs reflect upstream changes only.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::classify::is_neovim_plugin;
use crate::errors::ManifestError;
use crate::types::{MembershipSet, PluginDescriptor, ResolvedPlugin};

/// First line of the generated file. Never hand-edit the output.
pub const HEADER: &str = "# GENERATED by plugnix. Do not edit!";

const PREAMBLE: &str = "\n{ lib, buildVimPlugin, buildNeovimPlugin, fetchFromGitHub, fetchgit }:\n\nfinal: prev:\n{\n";

const CLOSING: &str = "\n}\n";

/// Manifest emitter: the output path, header, and membership oracle for one
/// run. Passed into the resolution service as the generation callback.
pub struct Emitter<'a> {
    path: PathBuf,
    header: &'a str,
    members: &'a MembershipSet,
}

impl<'a> Emitter<'a> {
    pub fn new(path: PathBuf, members: &'a MembershipSet) -> Self {
        Emitter {
            path,
            header: HEADER,
            members,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Render one plugin into its manifest fragment
    pub fn render_fragment(&self, desc: &PluginDescriptor, plugin: &ResolvedPlugin) -> String {
        let build_fn = if is_neovim_plugin(plugin, self.members) {
            "buildNeovimPlugin"
        } else {
            "buildVimPlugin"
        };

        let content = format!(
            "  {key} = {build_fn} {{\n    pname = \"{name}\";\n    version = \"{version}\";\n    src = {src};\n    meta.homepage = \"{homepage}\";\n  }};\n\n",
            key = plugin.normalized_name(),
            build_fn = build_fn,
            name = plugin.name,
            version = plugin.version,
            src = desc.src_expr(plugin),
            homepage = desc.uri(),
        );
        debug!("{}", content);
        content
    }

    /// Render the whole manifest: header, preamble, sorted fragments,
    /// closing brace
    pub fn render(&self, plugins: &[(PluginDescriptor, ResolvedPlugin)]) -> String {
        let mut sorted: Vec<&(PluginDescriptor, ResolvedPlugin)> = plugins.iter().collect();
        sorted.sort_by_key(|(desc, _)| desc.name().to_lowercase());

        let mut out = String::new();
        out.push_str(self.header);
        out.push_str(PREAMBLE);
        for (desc, plugin) in sorted {
            out.push_str(&self.render_fragment(desc, plugin));
        }
        out.push_str(CLOSING);
        out
    }

    /// Overwrite the manifest file in place. The write is whole-file, so an
    /// unwritable target surfaces as-is with no partial cleanup needed.
    pub fn assemble(&self, plugins: &[(PluginDescriptor, ResolvedPlugin)]) -> Result<(), ManifestError> {
        let text = self.render(plugins);
        fs::write(&self.path, text)?;
        info!("wrote {} plugin(s) to {:?}", plugins.len(), self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn pair(url: &str, alias: Option<&str>, name: &str, version: &str) -> (PluginDescriptor, ResolvedPlugin) {
        (
            PluginDescriptor::new(url, None, alias.map(str::to_string)),
            ResolvedPlugin {
                name: name.to_string(),
                version: version.to_string(),
                commit: format!("{:0>7}cafe", name.len()),
                sha256: "sha256-AAAA".to_string(),
            },
        )
    }

    #[test]
    fn test_fragment_shape() {
        let members = MembershipSet::default();
        let emitter = Emitter::new(PathBuf::from("generated.nix"), &members);
        let (desc, plugin) = pair(
            "https://github.com/tpope/vim-fugitive/",
            None,
            "vim-fugitive",
            "2024-03-01",
        );

        let fragment = emitter.render_fragment(&desc, &plugin);
        let expected = "  vim-fugitive = buildVimPlugin {\n    pname = \"vim-fugitive\";\n    version = \"2024-03-01\";\n    src = fetchFromGitHub {\n      owner = \"tpope\";\n      repo = \"vim-fugitive\";\n      rev = \"0000012cafe\";\n      sha256 = \"sha256-AAAA\";\n    };\n    meta.homepage = \"https://github.com/tpope/vim-fugitive/\";\n  };\n\n";
        assert_eq!(fragment, expected);
    }

    #[test]
    fn test_member_renders_alternate_build_fn() {
        let members: MembershipSet = ["plenary-nvim".to_string()].into_iter().collect();
        let emitter = Emitter::new(PathBuf::from("generated.nix"), &members);
        let (desc, plugin) = pair(
            "https://github.com/nvim-lua/plenary.nvim/",
            None,
            "plenary.nvim",
            "2024-03-01",
        );

        let fragment = emitter.render_fragment(&desc, &plugin);
        assert!(fragment.contains("plenary-nvim = buildNeovimPlugin {"));
        assert!(!fragment.contains("buildVimPlugin"));
    }

    #[test]
    fn test_render_sorts_case_insensitively() {
        // "Alpha" < "beta" under the case-insensitive order even though
        // 'b' < 'A' byte-wise
        let members: MembershipSet = ["beta".to_string()].into_iter().collect();
        let emitter = Emitter::new(PathBuf::from("generated.nix"), &members);
        let pairs = vec![
            pair("https://github.com/r2/beta/", None, "beta", "2.0"),
            pair("https://github.com/r1/Alpha/", None, "Alpha", "1.0"),
        ];

        let text = emitter.render(&pairs);
        let alpha_at = text.find("Alpha = buildVimPlugin");
        let beta_at = text.find("beta = buildNeovimPlugin");
        assert!(alpha_at.is_some_and(|a| beta_at.is_some_and(|b| a < b)));
    }

    #[test]
    fn test_render_deterministic_under_permutation() {
        let members = MembershipSet::default();
        let emitter = Emitter::new(PathBuf::from("generated.nix"), &members);
        let a = pair("https://github.com/o/aaa/", None, "aaa", "1.0");
        let b = pair("https://github.com/o/BBB/", None, "BBB", "1.0");
        let c = pair("https://github.com/o/ccc/", None, "ccc", "1.0");

        let forward = emitter.render(&[a.clone(), b.clone(), c.clone()]);
        let shuffled = emitter.render(&[c, a, b]);
        assert_eq!(forward, shuffled);
    }

    #[test]
    fn test_render_twice_is_byte_identical() {
        let members = MembershipSet::default();
        let emitter = Emitter::new(PathBuf::from("generated.nix"), &members);
        let pairs = vec![pair("https://github.com/o/p/", None, "p", "1.0")];
        assert_eq!(emitter.render(&pairs), emitter.render(&pairs));
    }

    #[test]
    fn test_file_layout() {
        let members = MembershipSet::default();
        let emitter = Emitter::new(PathBuf::from("generated.nix"), &members);
        let text = emitter.render(&[pair("https://github.com/o/p/", None, "p", "1.0")]);

        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(HEADER));
        assert_eq!(
            lines.next(),
            Some("{ lib, buildVimPlugin, buildNeovimPlugin, fetchFromGitHub, fetchgit }:")
        );
        assert_eq!(lines.next(), Some(""));
        assert_eq!(lines.next(), Some("final: prev:"));
        assert_eq!(lines.next(), Some("{"));
        assert!(text.ends_with("\n}\n"));
    }

    #[test]
    fn test_assemble_writes_file() {
        let Ok(dir) = TempDir::new() else {
            return;
        };
        let out = dir.path().join("generated.nix");
        let members = MembershipSet::default();
        let emitter = Emitter::new(out.clone(), &members);
        let pairs = vec![pair("https://github.com/o/p/", None, "p", "1.0")];

        assert!(emitter.assemble(&pairs).is_ok());
        let written = std::fs::read_to_string(&out);
        assert!(written.is_ok_and(|text| text == emitter.render(&pairs)));
    }

    #[test]
    fn test_assemble_unwritable_path_errors() {
        let members = MembershipSet::default();
        let emitter = Emitter::new(PathBuf::from("/nonexistent-dir/generated.nix"), &members);
        assert!(emitter.assemble(&[]).is_err());
    }

    #[test]
    fn test_example_scenario() {
        // Plugin list Alpha/beta with beta in the membership set: alpha's
        // fragment uses the default build function and precedes beta's
        // alternate one.
        let members: MembershipSet = ["beta".to_string()].into_iter().collect();
        let emitter = Emitter::new(PathBuf::from("generated.nix"), &members);
        let pairs = vec![
            pair("https://github.com/r2/beta/", None, "beta", "2.0"),
            pair("https://github.com/r1/Alpha/", None, "Alpha", "1.0"),
        ];

        let text = emitter.render(&pairs);
        let alpha = text.find("  Alpha = buildVimPlugin {");
        let beta = text.find("  beta = buildNeovimPlugin {");
        assert!(alpha.is_some_and(|a| beta.is_some_and(|b| a < b)));
    }
}
