//! `httpswatch init` — write a starter configuration file.

use crate::config::{defaults, parser, CONFIG_FILE_NAME};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

/// Run the `httpswatch init` command. Returns the path written, or `None`
/// when a file already exists and `force` is off.
pub fn run_init(template: &str, output_path: Option<&str>, force: bool) -> Result<Option<PathBuf>> {
    let output_file = match output_path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir()
            .context("Failed to get current directory")?
            .join(CONFIG_FILE_NAME),
    };

    if output_file.exists() && !force {
        println!(
            "  {} A config file already exists at {}",
            "⚠".yellow(),
            output_file.display()
        );
        println!("  Use --force to overwrite it, or edit it directly.");
        return Ok(None);
    }

    let yaml = defaults::get_template(template).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown template '{}'. Available templates: {}",
            template,
            defaults::available_templates().join(", ")
        )
    })?;

    // Never write a template that wouldn't load back
    let config = parser::parse_config_str(yaml).context("Built-in template is invalid")?;

    std::fs::write(&output_file, yaml)
        .with_context(|| format!("Failed to write {}", output_file.display()))?;

    println!();
    println!(
        "  {} Created {} ({})",
        "✓".green().bold(),
        output_file.display().to_string().cyan(),
        config.name
    );
    println!("  {}", config.describe().dimmed());
    println!();

    Ok(Some(output_file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_loadable_file() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join(CONFIG_FILE_NAME);
        let written = run_init("strict", out.to_str(), false).unwrap();
        assert_eq!(written, Some(out.clone()));

        let config = parser::parse_config_file(&out).unwrap();
        assert_eq!(config.name, "strict-v1");
    }

    #[test]
    fn test_init_does_not_overwrite_without_force() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join(CONFIG_FILE_NAME);
        std::fs::write(&out, "name: mine\n").unwrap();

        assert_eq!(run_init("default", out.to_str(), false).unwrap(), None);
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "name: mine\n");

        assert!(run_init("default", out.to_str(), true).unwrap().is_some());
        assert!(std::fs::read_to_string(&out).unwrap().contains("default-v1"));
    }

    #[test]
    fn test_init_unknown_template() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("x.yaml");
        assert!(run_init("paranoid", out.to_str(), false).is_err());
        assert!(!out.exists());
    }
}
