//! plugnix library - expose modules for testing
//!
//! The binary in `main.rs` is a thin clap dispatcher over these modules.

pub mod cascade;
pub mod commands;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    #[arg(short, long, global = true, help = "Decrease verbosity")]
    pub quiet: bool,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Increase verbosity (-v for debug, -vv for trace)")]
    pub verbose: u8,
}

impl GlobalOpts {
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            // 0 = quiet/warn only, 1 = debug (-v), 2 = trace (-vv)
            self.verbose
        }
    }
}
