use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::{Cli, InitArgs};

/// Runtime switches threaded through every command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings
{
    /// Overwrite existing slots without asking
    pub force: bool,

    /// Keep the spacing between source ids when copying/moving
    pub keep_gap: bool,

    /// Embed metadata and bodies as JSON in archives
    pub raw_json: bool,

    /// Tab-indent archive JSON
    pub pretty_json: bool,

    /// Append ".rpgarch" to missing bare names
    pub default_ext: bool,

    /// Report each copied/moved/removed slot
    pub verbose: bool,

    /// Comment stamped on slots placed by cp/mv
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Default for Settings
{
    fn default() -> Self
    {
        Self {
            force: false,
            keep_gap: false,
            raw_json: false,
            pretty_json: false,
            default_ext: true,
            verbose: true,
            comment: None,
        }
    }
}

impl Settings
{
    /// Command-line flags win over file and environment values
    pub fn with_cli(
        mut self,
        cli: &Cli,
    ) -> Self
    {
        self.force |= cli.force;
        self.keep_gap |= cli.keep_gap;
        self.raw_json |= cli.raw_json;
        self.pretty_json |= cli.pretty;

        if cli.no_default_ext
        {
            self.default_ext = false;
        }

        if cli.quiet
        {
            self.verbose = false;
        }

        if let Some(c) = &cli.comment
        {
            self.comment = Some(c.clone());
        }

        self
    }
}

pub fn load_config() -> Result<Settings>
{
    let mut builder = config::Config::builder();

    // Load from config files in priority order
    let config_paths = ["rpgarch.toml", "rpgarch.yaml", "rpgarch.json", ".rpgarch.toml"];

    for path in &config_paths
    {
        if Path::new(path).exists()
        {
            builder = builder.add_source(config::File::with_name(path));
            break;
        }
    }

    // Add environment variables with RPGARCH_ prefix
    builder = builder.add_source(config::Environment::with_prefix("RPGARCH").try_parsing(true));

    let cfg = builder
        .build()
        .context("Failed to load configuration")?;
    let parsed: Settings = cfg
        .try_deserialize()
        .context("Failed to parse configuration")?;

    Ok(parsed)
}

pub fn init(
    args: InitArgs,
    settings: &Settings,
) -> Result<()>
{
    let config_path = args
        .path
        .join("rpgarch.toml");

    if config_path.exists() && !settings.force
    {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let toml_string =
        toml::to_string_pretty(&Settings::default()).context("Failed to serialize default config")?;

    std::fs::write(&config_path, toml_string).context("Failed to write config file")?;

    if settings.verbose
    {
        println!("Created config file at {}", config_path.display());
    }
    Ok(())
}
