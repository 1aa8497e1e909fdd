use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Name of the base variant
    #[arg(short, long, default_value = "Basis")]
    pub base_name: String,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    let config = Config {
        base_suffix: format!("_{}", args.base_name),
        base_name: args.base_name,
        ..Config::default()
    };

    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json + "\n")?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("Next steps:");
    println!("  1. Adjust templatePattern and substringTargets for your bank");
    println!("  2. Run: lsxgen expand Body.lsf.lsx --variants {},Slim,Heavy", config.base_name);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(dir: &std::path::Path, base_name: &str, force: bool) -> Result<()> {
        init(
            InitArgs {
                base_name: base_name.to_string(),
                force,
            },
            dir.to_str().unwrap(),
        )
    }

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = tempfile::tempdir().unwrap();
        run(dir.path(), "Neutral", false).unwrap();

        let config = Config::load(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(config.base_name, "Neutral");
        assert_eq!(config.base_suffix, "_Neutral");
    }

    #[test]
    fn test_init_keeps_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_NAME);
        fs::write(&path, "{}").unwrap();

        run(dir.path(), "Basis", false).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");

        run(dir.path(), "Basis", true).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("\"baseName\""));
    }
}
