use crate::GlobalOpts;
use clap::Subcommand;
use colored::Colorize;
use plugnix_config::Config;
use plugnix_logger as logger;

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    Show,
    Set {
        key: String,
        value: String,
    },
    /// Get or set the path to the config file.
    /// If `new_path` is provided, the CLI will set the config path to that value.
    /// If omitted, the CLI will print the current configuration file path.
    Path {
        /// Optional new config path to set
        new_path: Option<String>,
    },
}

const KNOWN_KEYS: &str = "root, plugin-file, manifest-path, nix-path, git-path, github-api";

pub fn handle_config(action: ConfigAction, opts: GlobalOpts) {
    match action {
        ConfigAction::Show => match Config::load() {
            Ok(config) => {
                println!("{}", "Configuration:".bold().green());
                if config.is_empty() {
                    if opts.verbosity_level() > 0 {
                        println!("  {}", "(empty)".yellow());
                    }
                } else {
                    for (key, value) in config.values_iter() {
                        println!("  {}: {}", key.cyan(), value);
                    }
                }
            }
            Err(e) => {
                logger::error(&format!("Failed to load config: {}", e));
            }
        },
        ConfigAction::Set { key, value } => match Config::load() {
            Ok(mut config) => {
                if config.get(&key).is_some()
                    || matches!(
                        key.as_str(),
                        "root" | "plugin-file" | "manifest-path" | "nix-path" | "git-path"
                            | "github-api"
                    )
                {
                    config.set(&key, value.clone());
                    match config.save() {
                        Ok(_) => {
                            logger::success(&format!("Set {} = {}", key, value));
                        }
                        Err(e) => {
                            logger::error(&format!("Failed to save config: {}", e));
                        }
                    }
                } else {
                    logger::error(&format!(
                        "Unknown config key: {}. Currently supported keys: {}",
                        key, KNOWN_KEYS
                    ));
                }
            }
            Err(e) => {
                logger::error(&format!("Failed to load config: {}", e));
            }
        },
        ConfigAction::Path { new_path } => {
            let config_path = Config::path();
            logger::debug(&format!("Reading config from: {}", config_path.display()));

            match new_path {
                Some(p) => {
                    // Pointer file lives next to the default config, named
                    // `.plugnix_config_path`
                    let pointer_path = config_path
                        .parent()
                        .unwrap_or_else(|| std::path::Path::new("."))
                        .join(".plugnix_config_path");

                    if let Some(parent) = pointer_path.parent() {
                        if let Err(e) = std::fs::create_dir_all(parent) {
                            logger::error(&format!("Failed to set config path: {}", e));
                            return;
                        }
                    }

                    if let Err(e) = std::fs::write(&pointer_path, p.as_bytes()) {
                        logger::error(&format!("Failed to set config path: {}", e));
                        return;
                    }

                    logger::success(&format!("Config path set to {}", p));
                }
                None => {
                    println!("{}", config_path.display());

                    // If pointer file exists, also show the override
                    let pointer_path = config_path
                        .parent()
                        .unwrap_or_else(|| std::path::Path::new("."))
                        .join(".plugnix_config_path");
                    if pointer_path.exists() {
                        if let Ok(contents) = std::fs::read_to_string(&pointer_path) {
                            let trimmed = contents.trim();
                            if !trimmed.is_empty() {
                                println!("{} {}", "overridden-by".cyan(), trimmed);
                            }
                        }
                    }
                }
            }
        }
    }
}
