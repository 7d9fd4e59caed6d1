use crate::config::{Config, DEFAULT_CONFIG_FILE};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "quill_blog")]
#[command(version)]
#[command(about = "Blog content-management API server", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to the TOML configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    #[command(name = "serve")]
    #[command(about = "Start the API server (default)")]
    Serve,

    #[command(name = "init-config")]
    #[command(about = "Write a default configuration file")]
    InitConfig {
        #[arg(long, help = "Overwrite an existing file")]
        force: bool,
    },
}

pub fn init_config(path: &Path, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() && !force {
        return Err(format!(
            "'{}' already exists, pass --force to overwrite",
            path.display()
        )
        .into());
    }

    Config::default().save(path)?;
    println!("✓ Configuration written to: {}", path.display());
    println!("  - Set ADMIN_EMAIL, ADMIN_PASSWORD and JWT_SECRET before serving");
    Ok(())
}
