//! Data models for Margins
//!
//! Defines the persisted site shape: profile, pages, block forests, articles
//! and the UI flags that travel with them. Every collection field tolerates
//! being absent or `null` in source JSON and normalizes to an empty value.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::resume::Resume;

/// Deserialize `null` or a missing value as `T::default()`
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A link shown on the profile card
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileLink {
    #[serde(default, deserialize_with = "nullable")]
    pub label: String,
    #[serde(default, deserialize_with = "nullable")]
    pub href: String,
}

/// Site owner profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub tagline: String,
    #[serde(default, deserialize_with = "nullable")]
    pub links: Vec<ProfileLink>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            title: "Site".to_string(),
            tagline: String::new(),
            links: Vec::new(),
        }
    }
}

/// Page flavour
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    /// Built-in page rendered by a dedicated view
    System,
    #[serde(other)]
    Other,
}

/// A navigable page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Page {
    /// Unique lowercase token, also the route segment
    pub id: String,
    pub title: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<PageKind>,
}

impl Page {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind: None,
        }
    }

    pub fn is_system(&self) -> bool {
        self.kind == Some(PageKind::System)
    }
}

/// Navigation used when the page list is missing or empty
pub fn default_pages() -> Vec<Page> {
    [
        ("dashboard", "Dashboard"),
        ("articles", "Articles"),
        ("notes", "Notes"),
        ("resume", "Resume"),
        ("projects", "Projects"),
        ("about", "About"),
    ]
    .into_iter()
    .map(|(id, title)| Page::new(id, title))
    .collect()
}

/// A node of a page outline
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Block {
    #[serde(default, deserialize_with = "nullable")]
    pub text: String,
    #[serde(default, deserialize_with = "nullable")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub children: Vec<Block>,
}

impl Block {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_children(mut self, children: Vec<Block>) -> Self {
        self.children = children;
        self
    }

    /// Text searched by free-text queries
    pub fn haystack(&self) -> String {
        format!(
            "{} {} {}",
            self.text,
            self.tags.join(" "),
            self.summary.as_deref().unwrap_or("")
        )
    }
}

/// Placeholder body stored when an article body cannot be fetched
pub const MISSING_BODY: &str = "_Could not load article body._";

/// A published or draft article
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Article {
    /// Alias of `slug`
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub date: String,
    #[serde(default, deserialize_with = "nullable")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub summary: String,
    #[serde(default, deserialize_with = "nullable")]
    pub draft: bool,
    /// Markdown source, populated lazily
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl Article {
    pub fn new(slug: impl Into<String>, title: impl Into<String>) -> Self {
        let slug = slug.into();
        Self {
            id: slug.clone(),
            slug,
            title: title.into(),
            date: String::new(),
            tags: Vec::new(),
            summary: String::new(),
            draft: false,
            body: None,
        }
    }

    /// Normalize a raw index entry; entries without a slug are rejected
    pub fn from_index(entry: ArticleIndexEntry) -> Option<Self> {
        let slug = entry.slug.filter(|s| !s.trim().is_empty())?;
        let title = entry.title.unwrap_or_else(|| slug.clone());
        Some(Self {
            id: slug.clone(),
            slug,
            title,
            date: entry.date.unwrap_or_default(),
            tags: entry.tags.unwrap_or_default(),
            summary: entry.summary.unwrap_or_default(),
            draft: entry.draft.unwrap_or(false),
            body: None,
        })
    }

    /// Whether this article answers to the given id or slug
    pub fn matches(&self, id_or_slug: &str) -> bool {
        self.id == id_or_slug || self.slug == id_or_slug
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Lexical sort key; dates not shaped like `YYYY-MM...` sort lowest
    pub fn sort_key(&self) -> &str {
        if is_iso_like(&self.date) {
            &self.date
        } else {
            ""
        }
    }
}

fn is_iso_like(date: &str) -> bool {
    let bytes = date.as_bytes();
    bytes.len() >= 7
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b'-'
        && bytes[5..7].iter().all(u8::is_ascii_digit)
}

/// Raw article metadata as found in `content/articles/index.json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleIndexEntry {
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub draft: Option<bool>,
}

/// Color theme
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme '{}' (expected light or dark)", other)),
        }
    }
}

/// View state persisted alongside content
///
/// Fold flags live here, keyed by block path, so content is never touched by
/// UI toggles.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
    #[serde(default, deserialize_with = "nullable")]
    pub show_drafts: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub folded: BTreeSet<String>,
}

/// Location of a block: page id plus child indices from the forest root
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BlockPath {
    pub page: String,
    pub indices: Vec<usize>,
}

impl BlockPath {
    pub fn new(page: impl Into<String>, indices: Vec<usize>) -> Self {
        Self {
            page: page.into(),
            indices,
        }
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.indices.clone();
        indices.push(index);
        Self {
            page: self.page.clone(),
            indices,
        }
    }
}

impl fmt::Display for BlockPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.page)?;
        for i in &self.indices {
            write!(f, "/{}", i)?;
        }
        Ok(())
    }
}

impl FromStr for BlockPath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim_matches('/').split('/');
        let page = parts
            .next()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| format!("invalid block path '{}'", s))?;
        let indices = parts
            .map(|p| {
                p.parse::<usize>()
                    .map_err(|_| format!("invalid index '{}' in block path '{}'", p, s))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if indices.is_empty() {
            return Err(format!("block path '{}' names a page, not a block", s));
        }
        Ok(Self::new(page, indices))
    }
}

/// Every collection of content, keyed like the site's `blocks` object
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Blocks {
    #[serde(default, deserialize_with = "nullable")]
    pub articles: Vec<Article>,
    #[serde(default)]
    pub resume: Resume,
    /// About page Markdown; when absent the `about` forest is used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about_markdown: Option<String>,
    /// Block forests by page id
    #[serde(flatten)]
    pub forests: BTreeMap<String, Vec<Block>>,
}

/// The persisted site state
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SiteState {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub ui: UiState,
    #[serde(default)]
    pub profile: Profile,
    #[serde(default, deserialize_with = "nullable")]
    pub pages: Vec<Page>,
    #[serde(default)]
    pub blocks: Blocks,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_version: Option<u64>,
}

impl SiteState {
    /// A cache is usable without a version check when it has navigation
    pub fn has_valid_shape(&self) -> bool {
        !self.pages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_null_collections_normalize() {
        let block: Block =
            serde_json::from_str(r#"{"text": "hi", "tags": null, "children": null}"#).unwrap();
        assert_eq!(block.text, "hi");
        assert!(block.tags.is_empty());
        assert!(block.children.is_empty());

        let block: Block = serde_json::from_str(r#"{}"#).unwrap();
        assert!(block.text.is_empty());
        assert!(block.tags.is_empty());
    }

    #[test]
    fn test_block_ignores_legacy_fold_flag() {
        let block: Block =
            serde_json::from_str(r#"{"text": "x", "_fold": true, "children": [{"text": "y"}]}"#)
                .unwrap();
        assert_eq!(block.children.len(), 1);
        assert_eq!(block.children[0].text, "y");
    }

    #[test]
    fn test_article_from_index_defaults() {
        let entry: ArticleIndexEntry =
            serde_json::from_str(r#"{"slug": "hello", "title": "Hello"}"#).unwrap();
        let article = Article::from_index(entry).unwrap();
        assert_eq!(article.id, "hello");
        assert_eq!(article.slug, "hello");
        assert_eq!(article.date, "");
        assert!(article.tags.is_empty());
        assert!(!article.draft);
        assert!(article.body.is_none());
    }

    #[test]
    fn test_article_from_index_rejects_empty_slug() {
        let entry: ArticleIndexEntry = serde_json::from_str(r#"{"title": "Nope"}"#).unwrap();
        assert!(Article::from_index(entry).is_none());

        let entry: ArticleIndexEntry =
            serde_json::from_str(r#"{"slug": "  ", "title": "Nope"}"#).unwrap();
        assert!(Article::from_index(entry).is_none());
    }

    #[test]
    fn test_article_missing_title_uses_slug() {
        let entry: ArticleIndexEntry = serde_json::from_str(r#"{"slug": "untitled"}"#).unwrap();
        assert_eq!(Article::from_index(entry).unwrap().title, "untitled");
    }

    #[test]
    fn test_sort_key_rejects_non_iso_dates() {
        let mut article = Article::new("a", "A");
        article.date = "2024-03-01".to_string();
        assert_eq!(article.sort_key(), "2024-03-01");

        article.date = "March 1st".to_string();
        assert_eq!(article.sort_key(), "");
    }

    #[test]
    fn test_block_path_round_trip() {
        let path: BlockPath = "notes/0/2".parse().unwrap();
        assert_eq!(path.page, "notes");
        assert_eq!(path.indices, vec![0, 2]);
        assert_eq!(path.to_string(), "notes/0/2");

        assert!("notes".parse::<BlockPath>().is_err());
        assert!("notes/x".parse::<BlockPath>().is_err());
        assert!("".parse::<BlockPath>().is_err());
    }

    #[test]
    fn test_theme_parse_and_toggle() {
        assert_eq!("Dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("blue".parse::<Theme>().is_err());
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
    }

    #[test]
    fn test_page_kind_system() {
        let page: Page =
            serde_json::from_str(r#"{"id": "articles", "title": "Articles", "type": "system"}"#)
                .unwrap();
        assert!(page.is_system());

        let page: Page =
            serde_json::from_str(r#"{"id": "x", "title": "X", "type": "weird"}"#).unwrap();
        assert_eq!(page.kind, Some(PageKind::Other));
    }

    #[test]
    fn test_site_state_shape() {
        let json = r#"{
            "theme": "dark",
            "ui": {"showDrafts": true},
            "pages": [{"id": "notes", "title": "Notes"}],
            "blocks": {
                "notes": [{"text": "a", "tags": ["x"]}],
                "articles": [{"id": "s", "slug": "s", "title": "S"}]
            },
            "contentVersion": 3
        }"#;
        let state: SiteState = serde_json::from_str(json).unwrap();
        assert_eq!(state.theme, Theme::Dark);
        assert!(state.ui.show_drafts);
        assert_eq!(state.content_version, Some(3));
        assert_eq!(state.blocks.forests["notes"][0].tags, vec!["x"]);
        assert_eq!(state.blocks.articles[0].slug, "s");
        assert!(state.has_valid_shape());

        let out = serde_json::to_value(&state).unwrap();
        assert_eq!(out["contentVersion"], 3);
        assert_eq!(out["ui"]["showDrafts"], true);
        assert!(out["blocks"]["notes"].is_array());
        assert!(out["blocks"]["articles"].is_array());
    }

    #[test]
    fn test_default_state_lacks_version() {
        let state = SiteState::default();
        assert!(state.content_version.is_none());
        assert!(!state.has_valid_shape());
        assert_eq!(state.profile.title, "Site");
        assert!(state.blocks.articles.is_empty());
    }
}
