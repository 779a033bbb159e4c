//! Article command handlers

use anyhow::{bail, Result};

use margins_core::markdown::render_markdown;
use margins_core::models::MISSING_BODY;
use margins_core::render::render_article;
use margins_core::Article;

use super::Session;
use crate::output::Output;

/// List articles, newest first
///
/// Drafts follow the persisted toggle unless `all` is set.
pub fn list(session: &Session, all: bool, output: &Output) -> Result<()> {
    let articles = if all {
        let mut articles: Vec<&Article> = session.model.articles().iter().collect();
        articles.sort_by(|a, b| b.sort_key().cmp(a.sort_key()));
        articles
    } else {
        session.model.listable_articles()
    };
    output.print_articles(&articles);
    Ok(())
}

/// Show an article, fetching its body on first view
pub async fn show(session: &mut Session, id: &str, html: bool, output: &Output) -> Result<()> {
    let Session { engine, model, .. } = session;

    if engine.ensure_body(model, id).await.is_none() {
        bail!("Article not found: {}", id);
    }
    let Some(article) = model.find_article(id) else {
        bail!("Article not found: {}", id);
    };

    if html {
        println!("{}", render_article(article));
    } else {
        let body = article.body.as_deref().unwrap_or(MISSING_BODY);
        output.print_article(article, &render_markdown(body));
    }
    Ok(())
}

/// Add a "Saved" note pointing at an article
pub fn save_to_notes(session: &mut Session, id: &str, output: &Output) -> Result<()> {
    if !session.model.save_article_to_notes(id) {
        bail!("Article not found: {}", id);
    }
    output.success(&format!("Saved '{}' to notes", id));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::session;
    use crate::output::OutputFormat;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_show_html_loads_body_once() {
        let content = TempDir::new().unwrap();
        let data = TempDir::new().unwrap();
        let mut session = session(&content, &data).await;
        let output = Output::new(OutputFormat::Quiet);

        assert!(session.model.find_article("hello").unwrap().body.is_none());
        show(&mut session, "hello", true, &output).await.unwrap();
        assert_eq!(
            session.model.find_article("hello").unwrap().body.as_deref(),
            Some("# Hi\n\nBody")
        );

        let err = show(&mut session, "nope", true, &output).await.unwrap_err();
        assert_eq!(err.to_string(), "Article not found: nope");
    }

    #[tokio::test]
    async fn test_save_to_notes_requires_known_article() {
        let content = TempDir::new().unwrap();
        let data = TempDir::new().unwrap();
        let mut session = session(&content, &data).await;
        let output = Output::new(OutputFormat::Quiet);

        assert!(save_to_notes(&mut session, "nope", &output).is_err());
        save_to_notes(&mut session, "hello", &output).unwrap();
        assert!(session.model.blocks_for("notes")[0].text.contains("Hello"));
        list(&session, true, &output).unwrap();
    }
}
