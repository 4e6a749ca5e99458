use anyhow::Result;
use clap::Parser;
use rpgarch::cli::{AppContext, Cli, Commands};
use rpgarch::commands;
use rpgarch::infra::config;
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> Result<()> {
    let cli = Cli::parse();

    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    // Build a context once, pass everywhere
    let ctx = AppContext {
        no_color: cli.no_color,
        settings: config::load_config()?.with_cli(&cli),
    };

    match cli.command {
        Commands::Ls(args) => commands::ls(args, &ctx),
        Commands::Cp(args) => commands::cp(args, &ctx),
        Commands::Mv(args) => commands::mv(args, &ctx),
        Commands::Rm(args) => commands::rm(args, &ctx),
        Commands::Init(args) => config::init(args, &ctx.settings),
        Commands::Decode(args) => commands::decode(args),
        Commands::Encode(args) => commands::encode(args),
    }
}
