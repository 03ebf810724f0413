//! The full update run: membership query, revision snapshot, plugin
//! resolution, manifest assembly, then the grammar cascade.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;

use plugnix_config::Config;
use plugnix_eval::{query_membership, NixEval, NixPrefetch};
use plugnix_git::GitCli;
use plugnix_logger as logger;
use plugnix_manifest::{Emitter, MembershipSet};
use plugnix_resolve::{parse_plugin_list, update_and_generate, RemoteSource};

use crate::cascade::{self, ProcessUpdater, TRACKED_PLUGIN};
use crate::GlobalOpts;

#[derive(Parser, Debug)]
pub struct UpdateCommand {
    /// Root of the target tree (defaults to the configured root)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Plugin-list source file (defaults to the tree's plugin list)
    #[arg(long)]
    pub plugin_file: Option<PathBuf>,

    /// Output manifest path (defaults to the tree's generated file)
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn handle_update(cmd: UpdateCommand, _opts: GlobalOpts) -> Result<()> {
    let mut config = Config::load().context("Failed to load config")?;
    let nix_path = config.ensure_nix_path()?;
    let git_path = config.ensure_git_path()?;

    // CLI overrides are scoped to this run; they are never saved back
    if let Some(ref root) = cmd.root {
        config.set("root", root.display().to_string());
    }
    let root = config.get_root();
    let plugin_file = cmd.plugin_file.unwrap_or_else(|| config.get_plugin_file());
    let manifest_path = cmd.out.unwrap_or_else(|| config.get_manifest_path());

    let eval = NixEval::new(nix_path, root.clone());

    // The companion package set is queried exactly once per run and passed
    // down as a value; membership failure aborts before anything is written.
    logger::spinner_start("Querying companion package set");
    let membership = query_membership(&eval);
    logger::spinner_stop();
    let members: MembershipSet = membership
        .context("Failed to query the companion package set")?
        .into_iter()
        .collect();
    logger::debug(&format!("{} companion package(s)", members.len()));

    // Snapshot the tracked plugin's pinned revision before the manifest
    // moves it
    let snapshot =
        cascade::snapshot_revision(&eval).context("Failed to query the tracked revision")?;

    let list_text = fs::read_to_string(&plugin_file)
        .with_context(|| format!("Failed to read plugin list {}", plugin_file.display()))?;
    let descriptors = parse_plugin_list(&list_text);
    logger::info(&format!("{} plugin(s) in the list", descriptors.len()));

    let source = RemoteSource::new(config.get_github_api(), git_path.clone(), NixPrefetch::new())?;
    let emitter = Emitter::new(manifest_path.clone(), &members);

    logger::spinner_start("Resolving plugin revisions");
    let result = update_and_generate(&source, &descriptors, |pairs| emitter.assemble(pairs));
    logger::spinner_stop();
    let pairs = result.context("Failed to resolve and generate the manifest")?;

    println!("updated {}", manifest_path.display());

    // Manifest assembly is complete; the cascade may now compare revisions
    let fresh = pairs
        .iter()
        .find(|(_, plugin)| plugin.name == TRACKED_PLUGIN)
        .map(|(_, plugin)| plugin.commit.as_str());

    let updater = ProcessUpdater::new(config.get_treesitter_dir());
    let vcs = GitCli::new(git_path, root);
    cascade::run(
        &snapshot,
        fresh,
        &updater,
        &vcs,
        config.treesitter_artifact(),
    )?;

    Ok(())
}
