//! Export command handler

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ValueEnum;

use margins_core::export::{rss_xml, sitemap_xml, state_json};

use super::Session;
use crate::output::Output;

/// What to export
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportKind {
    /// sitemap.xml of pages and published articles
    Sitemap,
    /// RSS 2.0 feed of the latest articles
    Rss,
    /// The cached site state
    Json,
}

/// Write an export to `out`, or stdout
pub fn export(
    session: &Session,
    kind: ExportKind,
    out: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let base = session.config.export_base();
    if base.is_empty() && kind != ExportKind::Json {
        tracing::warn!("site_url is not set; exported links are relative");
    }

    let content = match kind {
        ExportKind::Sitemap => sitemap_xml(&session.model, &base),
        ExportKind::Rss => rss_xml(&session.model, &base, &session.config.site_title),
        ExportKind::Json => state_json(&session.model)?,
    };

    match out {
        Some(path) => {
            fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            output.success(&format!("Wrote {}", path.display()));
        }
        None => print!("{}", content),
    }
    Ok(())
}
