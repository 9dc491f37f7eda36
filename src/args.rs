use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Clone, Debug, Parser)]
#[clap(infer_subcommands = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Command {
    /// Renders the templates once
    Build(BuildArgs),
    /// Renders the templates and again on every change
    Watch(WatchArgs),
}

#[derive(Clone, Debug, Parser)]
pub struct BuildArgs {
    /// Directory containing prerender.toml
    #[clap(default_value = ".")]
    pub directory: PathBuf,
}

#[derive(Clone, Debug, Parser)]
pub struct WatchArgs {
    /// Directory containing prerender.toml
    #[clap(default_value = ".")]
    pub directory: PathBuf,

    /// Milliseconds to wait for further changes before rebuilding
    #[clap(long, default_value_t = 100)]
    pub debounce: u64,
}
