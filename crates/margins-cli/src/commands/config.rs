//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use margins_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "content_base": config.content_base,
                    "namespace": config.namespace,
                    "refresh_policy": config.refresh_policy,
                    "site_url": config.site_url,
                    "site_title": config.site_title,
                    "fetch_timeout_secs": config.fetch_timeout_secs,
                    "log_file": config.log_file
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.cache_path().display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:           {}", config.data_dir.display());
            println!("  content_base:       {}", config.content_base);
            println!("  namespace:          {}", config.namespace);
            println!("  refresh_policy:     {}", config.refresh_policy);
            println!(
                "  site_url:           {}",
                config.site_url.as_deref().unwrap_or("(not set)")
            );
            println!("  site_title:         {}", config.site_title);
            println!("  fetch_timeout_secs: {}", config.fetch_timeout_secs);
            println!(
                "  log_file:           {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    // Save to the CLI-specified path or default
    match config_path {
        Some(path) => config.save_to_path(path),
        None => config.save(),
    }
    .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "data_dir" => {
            config.data_dir = value.into();
        }
        "content_base" => {
            if value.trim().is_empty() {
                bail!("content_base cannot be empty");
            }
            config.content_base = value.to_string();
        }
        "namespace" => {
            if value.trim().is_empty() {
                bail!("namespace cannot be empty");
            }
            config.namespace = value.to_string();
        }
        "refresh_policy" => {
            config.refresh_policy = value.parse().map_err(anyhow::Error::msg)?;
        }
        "site_url" => {
            config.site_url = optional(value);
        }
        "site_title" => {
            config.site_title = value.to_string();
        }
        "fetch_timeout_secs" => {
            config.fetch_timeout_secs = value
                .parse()
                .context("Invalid value for fetch_timeout_secs. Use a whole number of seconds.")?;
        }
        "log_file" => {
            config.log_file = optional(value).map(PathBuf::from);
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: data_dir, content_base, namespace, refresh_policy, site_url, \
                 site_title, fetch_timeout_secs, log_file",
                key
            );
        }
    }
    Ok(())
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() || value == "none" {
        None
    } else {
        Some(value.to_string())
    }
}
