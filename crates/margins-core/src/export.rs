//! Site exports: sitemap, RSS feed and the raw state
//!
//! All three are pure functions of the current model. `base` is the public
//! site URL with a trailing slash (see `Config::export_base`); routes are
//! appended as fragments.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate};
use rss::{ChannelBuilder, GuidBuilder, ItemBuilder};

use crate::model::ContentModel;
use crate::models::Article;

/// XML namespace for sitemap
const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Items in the RSS feed
pub const RSS_ITEM_LIMIT: usize = 20;

/// Feed description used when the profile has no tagline
const DEFAULT_DESCRIPTION: &str = "Articles and notes";

/// Sitemap of the fixed pages plus every published article
pub fn sitemap_xml(model: &ContentModel, base: &str) -> String {
    let fixed = ["#/", "#/articles", "#/resume", "#/about"]
        .into_iter()
        .map(|route| format!("{}{}", base, route));
    let articles = model
        .published_articles()
        .into_iter()
        .map(|a| article_url(base, a));

    let mut xml = String::with_capacity(1024);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(&format!(r#"<urlset xmlns="{SITEMAP_NS}">"#));
    xml.push('\n');
    for loc in fixed.chain(articles) {
        xml.push_str(&format!("  <url><loc>{}</loc></url>\n", escape_xml(&loc)));
    }
    xml.push_str("</urlset>\n");
    xml
}

/// RSS 2.0 feed of the latest published articles
pub fn rss_xml(model: &ContentModel, base: &str, title: &str) -> String {
    let items: Vec<_> = model
        .published_articles()
        .into_iter()
        .take(RSS_ITEM_LIMIT)
        .map(|a| article_to_rss_item(a, base))
        .collect();

    let tagline = &model.state().profile.tagline;
    let description = if tagline.is_empty() {
        DEFAULT_DESCRIPTION
    } else {
        tagline.as_str()
    };

    ChannelBuilder::default()
        .title(title)
        .link(base)
        .description(description)
        .generator("margins".to_string())
        .items(items)
        .build()
        .to_string()
}

/// The whole cached state, pretty-printed
pub fn state_json(model: &ContentModel) -> Result<String> {
    serde_json::to_string_pretty(model.state()).context("Failed to serialize site state")
}

fn article_url(base: &str, article: &Article) -> String {
    format!("{}#/a/{}", base, article.slug)
}

fn article_to_rss_item(article: &Article, base: &str) -> rss::Item {
    let summary = (!article.summary.is_empty()).then(|| article.summary.clone());

    ItemBuilder::default()
        .title(Some(article.title.clone()))
        .link(Some(article_url(base, article)))
        .guid(
            GuidBuilder::default()
                .permalink(false)
                .value(article.id.clone())
                .build(),
        )
        .description(summary)
        .pub_date(rfc2822_date(&article.date))
        .build()
}

/// RFC 2822 form of `YYYY-MM-DD` or RFC 3339 dates
fn rfc2822_date(date: &str) -> Option<String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        return Some(dt.to_rfc2822());
    }
    let day = date.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().to_rfc2822())
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
