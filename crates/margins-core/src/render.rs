//! HTML fragments for the content views
//!
//! These are the pieces a view layer mounts: block outlines (with fold
//! state applied), article cards and bodies, the résumé and the about page.

use crate::markdown::{decorate_text, escape_html, render_markdown, tag_link};
use crate::model::ContentModel;
use crate::models::{Article, Block, BlockPath, MISSING_BODY};
use crate::resume::Resume;

/// Outline of a page's block forest
pub fn render_blocks(model: &ContentModel, page_id: &str) -> String {
    let root = BlockPath::new(page_id, Vec::new());
    model
        .blocks_for(page_id)
        .iter()
        .enumerate()
        .map(|(i, block)| render_block(model, &root.child(i), block))
        .collect()
}

fn render_block(model: &ContentModel, path: &BlockPath, block: &Block) -> String {
    let folded = model.is_folded(path);
    let meta = block
        .meta
        .as_deref()
        .map(|m| format!(r#" <span class="meta">({})</span>"#, escape_html(m)))
        .unwrap_or_default();

    let children: String = block
        .children
        .iter()
        .enumerate()
        .map(|(i, child)| render_block(model, &path.child(i), child))
        .collect();
    let display = if folded { "none" } else { "block" };

    format!(
        r#"<div class="block" data-path="{path}"><div class="bullet" title="Toggle"></div><div><div>{text}{meta}</div>{tags}<div class="children" style="display:{display}">{children}</div></div></div>"#,
        path = escape_html(&path.to_string()),
        text = decorate_text(&block.text),
        tags = render_tags(&block.tags),
    )
}

/// Tag links under a block or card; empty for no tags
pub fn render_tags(tags: &[String]) -> String {
    if tags.is_empty() {
        return String::new();
    }
    let links: String = tags.iter().map(|t| tag_link(t)).collect();
    format!(r#"<div class="tags">{}</div>"#, links)
}

/// Summary card used in article lists and tag views
pub fn article_card(article: &Article) -> String {
    let draft = if article.draft {
        r#" <span class="pill">Draft</span>"#
    } else {
        ""
    };
    let date = if article.date.is_empty() {
        String::new()
    } else {
        format!("{} · ", escape_html(&article.date))
    };
    let tags: String = article.tags.iter().map(|t| tag_link(t)).collect();
    let summary = if article.summary.is_empty() {
        String::new()
    } else {
        format!("<div>{}</div>", escape_html(&article.summary))
    };

    format!(
        r##"<div class="card"><div class="block-title">{title}{draft}</div><div class="meta">{date}{tags}</div>{summary}<a class="btn link" href="#/a/{slug}">Open</a></div>"##,
        title = escape_html(&article.title),
        slug = crate::markdown::encode_component(&article.slug),
    )
}

/// Landing view: profile card, recent articles and résumé teaser
pub fn render_dashboard(model: &ContentModel) -> String {
    let dashboard = model.dashboard();
    let profile = dashboard.profile;

    let tagline = if profile.tagline.is_empty() {
        String::new()
    } else {
        format!(r#"<p class="meta">{}</p>"#, escape_html(&profile.tagline))
    };
    let links: String = profile
        .links
        .iter()
        .map(|l| {
            format!(
                r#"<a class="btn link" href="{}">{}</a>"#,
                escape_html(&l.href),
                escape_html(&l.label)
            )
        })
        .collect();
    let feed: String = dashboard.recent.iter().map(|a| article_card(a)).collect();
    let teaser: String = dashboard
        .resume_teaser
        .iter()
        .map(|row| {
            format!(
                r#"<div class="card"><div class="title">{}</div><div class="meta">{}</div></div>"#,
                escape_html(&row.title),
                escape_html(&row.meta)
            )
        })
        .collect();

    format!(
        r##"<div class="grid cols-3"><section class="card"><div class="block-title">{title}</div>{tagline}<div class="links">{links}</div><a class="link" href="#/about">Read more</a></section><section class="card"><div class="block-title">Recent articles</div><div class="meta">{shown} shown · {total} total</div><a class="btn link" href="#/articles">View all</a>{feed}</section><section class="card"><div class="block-title">Resume</div><div class="meta">{entries} entries</div>{teaser}<a class="btn link" href="#/resume">Open resume</a></section></div>"##,
        title = escape_html(&profile.title),
        shown = dashboard.recent.len(),
        total = dashboard.published_total,
        entries = dashboard.resume_entries,
    )
}

/// Reading view of an article
pub fn render_article(article: &Article) -> String {
    let body = article.body.as_deref().unwrap_or(MISSING_BODY);
    let tags: String = article.tags.iter().map(|t| tag_link(t)).collect();
    format!(
        r#"<article><h1>{title}</h1><div class="meta">{date} {tags}</div><div class="article-body">{body}</div></article>"#,
        title = escape_html(&article.title),
        date = escape_html(&article.date),
        body = render_markdown(body),
    )
}

/// The résumé, section by section
pub fn render_resume(resume: &Resume) -> String {
    let mut html = String::from(r#"<div class="resume">"#);
    for section in &resume.sections {
        html.push_str(&format!(
            r#"<section><h2>{}</h2>"#,
            escape_html(&section.title)
        ));
        for row in &section.rows {
            let bullets: String = row
                .bullets
                .iter()
                .map(|b| format!(r#"<div class="meta">• {}</div>"#, escape_html(b)))
                .collect();
            html.push_str(&format!(
                r#"<div class="row"><div><div class="title">{}</div>{}</div><div class="meta">{}</div></div>"#,
                escape_html(&row.title),
                bullets,
                escape_html(&row.meta)
            ));
        }
        for group in &section.groups {
            html.push_str(&format!(
                r#"<div class="row"><div class="title">{}</div><div>{}</div></div>"#,
                escape_html(&group.label),
                escape_html(&group.items.join(", "))
            ));
        }
        html.push_str("</section>");
    }
    html.push_str("</div>");
    html
}

/// About page: profile card plus the Markdown body or about blocks
pub fn render_about(model: &ContentModel) -> String {
    let profile = &model.state().profile;

    let body = match &model.state().blocks.about_markdown {
        Some(markdown) => render_markdown(markdown),
        None => model
            .blocks_for("about")
            .iter()
            .map(|b| format!("<p>{}</p>", decorate_text(&b.text)))
            .collect(),
    };

    let tagline = if profile.tagline.is_empty() {
        String::new()
    } else {
        format!(r#"<p class="meta">{}</p>"#, escape_html(&profile.tagline))
    };
    let links: String = profile
        .links
        .iter()
        .map(|l| {
            format!(
                r#"<a class="btn link" href="{}">{}</a>"#,
                escape_html(&l.href),
                escape_html(&l.label)
            )
        })
        .collect();

    format!(
        r#"<section class="card"><div class="block-title">{title}</div>{tagline}<div class="links">{links}</div></section><section class="card"><div class="block-title">About</div><div class="article-body">{body}</div></section>"#,
        title = escape_html(&profile.title),
    )
}
