use clap::{Parser, Subcommand};
use plugnix::{
    commands::{
        config::{self, ConfigAction},
        update,
    },
    GlobalOpts,
};
use plugnix_logger as logger;

#[derive(Parser)]
#[command(name = "plugnix")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Vim plugin set updater",
    long_about = "plugnix regenerates the pinned Nix manifest for the Vim/Neovim plugin set."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve plugin revisions and regenerate the manifest
    Update(update::UpdateCommand),
    /// Configure the plugnix tool
    #[command(subcommand_required = true, arg_required_else_help = true)]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::init_with_verbosity(cli.global.verbosity_level()) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }
    init_tracing(cli.global.verbosity_level());

    match cli.command {
        Commands::Update(cmd) => {
            if let Err(e) = update::handle_update(cmd, cli.global) {
                logger::error(&format!("Update failed: {:#}", e));
                std::process::exit(1);
            }
        }
        Commands::Config { action } => {
            config::handle_config(action, cli.global);
        }
    }
}

/// Route library-crate tracing to stderr at a level matching the CLI flags
fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
