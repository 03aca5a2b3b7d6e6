use std::path::PathBuf;

use clap::Subcommand;
use fingerdraw_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show {
        /// Config file (defaults to the platform config dir)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Get a config value
    Get {
        /// Dot-separated key (e.g. "session.countdown_ms")
        key: String,
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Set a config value and save the file
    Set {
        /// Dot-separated key
        key: String,
        /// New value
        value: String,
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Write a default config file
    Init {
        #[arg(long)]
        path: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the default config file location
    Path,
}

/// Load `path` if given, else the default location (falling back to defaults).
pub fn load(path: Option<&PathBuf>) -> Result<Config, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(Config::load_from(path)?),
        None => Ok(Config::load_or_default()),
    }
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show { path } => {
            let config = load(path.as_ref())?;
            print!("{}", config.to_toml_string()?);
        }
        ConfigAction::Get { key, path } => {
            let config = load(path.as_ref())?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => {
                    eprintln!("unknown key: {key}");
                    std::process::exit(1);
                }
            }
        }
        ConfigAction::Set { key, value, path } => {
            let path = match path {
                Some(path) => path,
                None => Config::default_path()?,
            };
            let mut config = if path.exists() {
                Config::load_from(&path)?
            } else {
                Config::default()
            };
            config.set(&key, &value)?;
            config.save_to(&path)?;
            println!("ok");
        }
        ConfigAction::Init { path, force } => {
            let path = match path {
                Some(path) => path,
                None => Config::default_path()?,
            };
            if path.exists() && !force {
                return Err(format!("{} already exists (use --force)", path.display()).into());
            }
            Config::default().save_to(&path)?;
            println!("wrote {}", path.display());
        }
        ConfigAction::Path => {
            println!("{}", Config::default_path()?.display());
        }
    }
    Ok(())
}
