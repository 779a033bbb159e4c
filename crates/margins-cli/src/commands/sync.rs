//! Sync and reset command handlers

use anyhow::{Context, Result};

use margins_core::sync::{IndexRefresh, SyncDecision};
use margins_core::{Config, ContentStore, SyncReport};

use super::Session;
use crate::output::{Output, OutputFormat};

/// Report the boot reconciliation that produced `session`
pub fn sync(session: &Session, output: &Output) -> Result<()> {
    let report = &session.report;

    match output.format {
        OutputFormat::Json => output.json(report),
        OutputFormat::Quiet => {}
        OutputFormat::Human => {
            for line in describe(report) {
                println!("{}", line);
            }
            println!(
                "  {} pages, {} articles ({} drafts)",
                session.model.pages().len(),
                session.model.articles().len(),
                session.model.draft_count()
            );
        }
    }

    Ok(())
}

/// Clear the cache slot
pub fn reset(config: &Config, output: &Output) -> Result<()> {
    let store = ContentStore::from_config(config);
    if !store.exists() {
        output.message("Cache is already empty.");
        return Ok(());
    }
    store
        .clear()
        .with_context(|| format!("Failed to clear {}", store.path().display()))?;
    output.success(&format!("Cleared {}", store.path().display()));
    Ok(())
}

fn describe(report: &SyncReport) -> Vec<String> {
    let mut lines = Vec::new();

    let versions = match (report.cached_version, report.remote_version) {
        (cached, Some(remote)) => format!(
            " (cached {}, remote {})",
            cached.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string()),
            remote
        ),
        _ => String::new(),
    };
    match &report.decision {
        SyncDecision::AdoptCache => {
            lines.push(format!("✓ Using cached content{}", versions));
        }
        SyncDecision::FullRefresh { reason } => {
            lines.push(format!("✓ Refreshed content: {}{}", reason, versions));
        }
    }

    for resource in &report.fallbacks {
        lines.push(format!("  ! {} unavailable, using fallback", resource));
    }

    match &report.articles {
        Some(IndexRefresh::Replaced { count, dropped }) if *dropped > 0 => lines.push(format!(
            "  Article index: {} articles ({} invalid entries skipped)",
            count, dropped
        )),
        Some(IndexRefresh::Replaced { count, .. }) => {
            lines.push(format!("  Article index: {} articles", count))
        }
        Some(IndexRefresh::Kept { reason }) => {
            lines.push(format!("  ! Article index kept: {}", reason))
        }
        None => {}
    }

    lines
}
