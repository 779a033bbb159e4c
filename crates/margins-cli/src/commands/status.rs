//! Status command handler

use anyhow::Result;

use margins_core::{Config, ContentStore};

use crate::output::{Output, OutputFormat};

/// Show what is in the local cache, without touching the network
pub fn show(config: &Config, output: &Output) -> Result<()> {
    let store = ContentStore::from_config(config);
    let state = store.load();

    match output.format {
        OutputFormat::Json => {
            let cache = state.as_ref().map(|s| {
                serde_json::json!({
                    "content_version": s.content_version,
                    "theme": s.theme,
                    "show_drafts": s.ui.show_drafts,
                    "folded": s.ui.folded.len(),
                    "counts": {
                        "pages": s.pages.len(),
                        "articles": s.blocks.articles.len(),
                        "drafts": s.blocks.articles.iter().filter(|a| a.draft).count(),
                        "forests": s.blocks.forests.len()
                    }
                })
            });
            println!(
                "{}",
                serde_json::json!({
                    "cache_path": store.path(),
                    "content_base": config.content_base,
                    "refresh_policy": config.refresh_policy,
                    "cache": cache
                })
            );
        }
        OutputFormat::Quiet => {
            let version = state.as_ref().and_then(|s| s.content_version);
            match version {
                Some(v) => println!("{}", v),
                None => println!("-"),
            }
        }
        OutputFormat::Human => {
            println!("Margins Status");
            println!("==============");
            println!();
            println!("Content:");
            println!("  Source: {}", config.content_base);
            println!("  Policy: {}", config.refresh_policy);
            println!();
            println!("Cache:");
            println!("  Path:   {}", store.path().display());
            match &state {
                None => println!("  (empty - run 'margins sync')"),
                Some(s) => {
                    println!(
                        "  Version: {}",
                        s.content_version
                            .map(|v| v.to_string())
                            .unwrap_or_else(|| "(unversioned)".to_string())
                    );
                    println!("  Theme:   {}", s.theme);
                    println!(
                        "  Drafts:  {}",
                        if s.ui.show_drafts { "shown" } else { "hidden" }
                    );
                    println!();
                    println!("Counts:");
                    println!("  Pages:    {}", s.pages.len());
                    println!("  Articles: {}", s.blocks.articles.len());
                    println!("  Folded:   {}", s.ui.folded.len());
                }
            }
        }
    }

    Ok(())
}
