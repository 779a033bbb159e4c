//! Tag command handlers

use anyhow::Result;

use margins_core::{Article, ContentModel};

use super::Session;
use crate::output::Output;

/// List all tags with usage counts
pub fn list(session: &Session, output: &Output) -> Result<()> {
    output.print_tags(&session.model.collect_tags());
    Ok(())
}

/// Articles carrying a tag
pub fn show(session: &Session, tag: &str, output: &Output) -> Result<()> {
    let (tag, articles) = tagged(&session.model, tag);
    if articles.is_empty() {
        output.message(&format!("No articles tagged #{}", tag));
        return Ok(());
    }
    output.print_articles(&articles);
    Ok(())
}

/// The tag name without its leading `#`, and the articles carrying it
fn tagged<'a, 't>(model: &'a ContentModel, tag: &'t str) -> (&'t str, Vec<&'a Article>) {
    let tag = tag.trim_start_matches('#');
    (tag, model.articles_tagged(tag))
}
