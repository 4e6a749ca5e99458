use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::infra::config::Settings;

/// Shared application context for global flags
#[derive(Clone, Debug)]
pub struct AppContext {
    pub no_color: bool,     // global --no-color
    pub settings: Settings, // config file + env + flags
}

#[derive(Parser)]
#[command(name = "rpgarch")]
#[command(
    about = "List, copy, move, and remove RPG Maker MV save slots across save directories and .rpgarch archives"
)]
#[command(
    version,
    long_about = None,
    after_help = "Paths take an optional id list: PATH#1,3,5-8,10- (\"-\" at the end means \"and everything after\")."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Overwrite existing saves without asking
    #[arg(short, long, global = true)]
    pub force: bool,

    /// Keep gaps between save ids when copying or moving
    #[arg(short, long, global = true)]
    pub keep_gap: bool,

    /// Suppress non-error messages
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Do not add .rpgarch to archive names without an extension
    #[arg(long, global = true)]
    pub no_default_ext: bool,

    /// Set this comment on copied or moved saves
    #[arg(short, long, global = true, value_name = "TEXT")]
    pub comment: Option<String>,

    /// Store archive payloads as plain JSON instead of lz-string
    #[arg(short = 'j', long, global = true, hide = true)]
    pub raw_json: bool,

    /// Pretty-print archive JSON
    #[arg(short, long, global = true, hide = true)]
    pub pretty: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List saves in directories or archives
    Ls(LsArgs),

    /// Copy saves into a destination
    Cp(TransferArgs),

    /// Move saves into a destination
    Mv(TransferArgs),

    /// Remove saves
    Rm(RmArgs),

    /// Initialize an rpgarch.toml config file
    Init(InitArgs),

    /// Decode an lz-string file
    #[command(name = "d", hide = true)]
    Decode(CodecArgs),

    /// Encode a file as lz-string
    #[command(name = "e", hide = true)]
    Encode(CodecArgs),
}

#[derive(Parser, Debug)]
pub struct LsArgs {
    /// Save directories or archives, each with an optional #ids
    #[arg(default_value = ".")]
    pub paths: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct TransferArgs {
    /// Sources followed by the destination (format: path#ids)
    #[arg(required = true, num_args = 2.., value_name = "PATH")]
    pub paths: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct RmArgs {
    /// Saves to remove (format: path#ids, path#* for all)
    #[arg(required = true, value_name = "PATH")]
    pub paths: Vec<String>,
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize config in (use --force to overwrite)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Args, Debug)]
pub struct CodecArgs {
    /// Input file
    pub src: PathBuf,

    /// Output file; stdout when omitted or "-"
    pub dest: Option<PathBuf>,
}
