//! Page and route command handlers

use anyhow::{bail, Result};

use margins_core::render::{
    article_card, render_about, render_blocks, render_dashboard, render_resume,
};
use margins_core::{Page, Route, View};

use super::{article, tag, Session};
use crate::output::{Output, OutputFormat};

/// List the navigation
pub fn list(session: &Session, output: &Output) -> Result<()> {
    output.print_pages(session.model.pages(), &session.model);
    Ok(())
}

/// Show a page; unknown ids fall back to the first page
pub fn show(session: &Session, id: &str, html: bool, output: &Output) -> Result<()> {
    let route = Route::Page(id.to_lowercase());
    let View::Page(page) = route.resolve(&session.model) else {
        bail!("'{}' is not a page", id);
    };
    show_page(session, &page, html, output);
    Ok(())
}

/// Resolve any fragment route and show its view
pub async fn route(
    session: &mut Session,
    fragment: &str,
    html: bool,
    output: &Output,
) -> Result<()> {
    let route = Route::parse(fragment);
    tracing::debug!("Route {} resolved from '{}'", route.to_fragment(), fragment);

    let article_id = match route.resolve(&session.model) {
        View::Page(page) => {
            show_page(session, &page, html, output);
            return Ok(());
        }
        View::Tag { tag: name, .. } => return tag::show(session, &name, output),
        View::ArticleNotFound(id) => bail!("Article not found: {}", id),
        View::Article(found) => found.id.clone(),
    };
    article::show(session, &article_id, html, output).await
}

fn show_page(session: &Session, page: &Page, html: bool, output: &Output) {
    let model = &session.model;
    match (page.id.as_str(), html) {
        ("dashboard", false) => output.print_dashboard(&model.dashboard()),
        ("dashboard", true) => println!("{}", render_dashboard(model)),
        ("articles", false) => output.print_articles(&model.listable_articles()),
        ("articles", true) => {
            let cards: String = model
                .listable_articles()
                .into_iter()
                .map(article_card)
                .collect();
            println!("{}", cards);
        }
        ("resume", false) => output.print_resume(&model.state().blocks.resume),
        ("resume", true) => println!("{}", render_resume(&model.state().blocks.resume)),
        ("about", true) => println!("{}", render_about(model)),
        ("about", false) => match (&model.state().blocks.about_markdown, output.format) {
            (Some(markdown), OutputFormat::Json) => {
                output.json(&serde_json::json!({"markdown": markdown}))
            }
            (Some(markdown), _) => {
                if !output.is_quiet() {
                    println!("{}", page.title);
                    println!("{}", "=".repeat(page.title.chars().count().max(3)));
                }
                println!("{}", markdown);
            }
            (None, _) => output.print_outline(model, page),
        },
        (_, true) => println!("{}", render_blocks(model, &page.id)),
        (_, false) => output.print_outline(model, page),
    }
}
