//! Fragment routes
//!
//! Routes are the hash fragments the site links to:
//!
//! | Fragment               | Route                    |
//! |------------------------|--------------------------|
//! | `#/` or empty          | `Page("dashboard")`      |
//! | `#/<pageId>`           | `Page(<pageId>)`         |
//! | `#/a/<slug>`           | `Shared(<slug>)`         |
//! | `#/article/<idOrSlug>` | `Article(<idOrSlug>)`    |
//! | `#/tag/<tag>`          | `Tag(<tag>)`             |
//!
//! Sub-resource segments are percent-decoded. Resolving a route against the
//! model never fails: unknown pages land on the default page.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;

use crate::model::ContentModel;
use crate::models::{Article, Page};

/// Page shown for an empty fragment
pub const HOME: &str = "dashboard";

/// A parsed fragment route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// A navigable page by id (lowercased)
    Page(String),
    /// Shareable article link, `#/a/<slug>`
    Shared(String),
    /// Article by id or slug
    Article(String),
    /// Tag filter
    Tag(String),
}

impl Route {
    /// Parse a fragment such as `#/tag/rust`
    pub fn parse(fragment: &str) -> Self {
        let raw = fragment.trim();
        let raw = raw.strip_prefix('#').unwrap_or(raw);
        let raw = raw.strip_prefix('/').unwrap_or(raw);

        if raw.is_empty() {
            return Route::Page(HOME.to_string());
        }

        if let Some(rest) = raw.strip_prefix("a/") {
            return Route::Shared(first_segment(rest));
        }
        if let Some(rest) = raw.strip_prefix("article/") {
            return Route::Article(first_segment(rest));
        }
        if let Some(rest) = raw.strip_prefix("tag/") {
            return Route::Tag(first_segment(rest));
        }

        Route::Page(raw.to_lowercase())
    }

    /// Resolve against the model
    pub fn resolve<'a>(&self, model: &'a ContentModel) -> View<'a> {
        match self {
            Route::Shared(slug) => match model.articles().iter().find(|a| &a.slug == slug) {
                Some(article) => View::Article(article),
                // No such article: behaves like an unknown page
                None => View::Page(fallback_page(model)),
            },
            Route::Article(id) => match model.find_article(id) {
                Some(article) => View::Article(article),
                None => View::ArticleNotFound(id.clone()),
            },
            Route::Tag(tag) => View::Tag {
                tag: tag.clone(),
                articles: model.articles_tagged(tag),
            },
            Route::Page(id) => match model.page(id) {
                Some(page) => View::Page(Cow::Borrowed(page)),
                None => View::Page(fallback_page(model)),
            },
        }
    }

    /// The fragment that links to this route
    pub fn to_fragment(&self) -> String {
        use crate::markdown::encode_component;
        match self {
            Route::Page(id) => format!("#/{}", id),
            Route::Shared(slug) => format!("#/a/{}", encode_component(slug)),
            Route::Article(id) => format!("#/article/{}", encode_component(id)),
            Route::Tag(tag) => format!("#/tag/{}", encode_component(tag)),
        }
    }
}

/// What a route resolves to
#[derive(Debug, Clone, PartialEq)]
pub enum View<'a> {
    Page(Cow<'a, Page>),
    Article(&'a Article),
    ArticleNotFound(String),
    Tag {
        tag: String,
        articles: Vec<&'a Article>,
    },
}

fn first_segment(rest: &str) -> String {
    let segment = rest.split('/').next().unwrap_or_default();
    percent_decode_str(segment).decode_utf8_lossy().into_owned()
}

/// First page, or a built-in home page when there is no navigation at all
fn fallback_page(model: &ContentModel) -> Cow<'_, Page> {
    match model.default_page() {
        Some(page) => Cow::Borrowed(page),
        None => Cow::Owned(Page::new(HOME, "Home")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SiteState;
    use crate::store::ContentStore;
    use tempfile::TempDir;

    fn model(dir: &TempDir) -> ContentModel {
        let mut state = SiteState::default();
        state.pages = vec![Page::new("dashboard", "Dashboard"), Page::new("notes", "Notes")];
        let mut article = Article::new("hello-world", "Hello");
        article.tags = vec!["c++".to_string()];
        state.blocks.articles = vec![article];
        ContentModel::new(state, ContentStore::new(dir.path(), "site"))
    }

    #[test]
    fn test_parse_routes() {
        assert_eq!(Route::parse(""), Route::Page("dashboard".into()));
        assert_eq!(Route::parse("#/"), Route::Page("dashboard".into()));
        assert_eq!(Route::parse("#/Notes"), Route::Page("notes".into()));
        assert_eq!(Route::parse("notes"), Route::Page("notes".into()));
        assert_eq!(Route::parse("#/a/hello-world"), Route::Shared("hello-world".into()));
        assert_eq!(Route::parse("#/article/Hello"), Route::Article("Hello".into()));
        assert_eq!(Route::parse("#/tag/c%2B%2B/extra"), Route::Tag("c++".into()));
        assert_eq!(Route::parse("#/tag/caf%C3%A9"), Route::Tag("café".into()));
    }

    #[test]
    fn test_fragment_round_trip() {
        for route in [
            Route::Page("notes".into()),
            Route::Shared("hello-world".into()),
            Route::Tag("c++ tips".into()),
        ] {
            assert_eq!(Route::parse(&route.to_fragment()), route);
        }
    }

    #[test]
    fn test_resolve_pages() {
        let dir = TempDir::new().unwrap();
        let model = model(&dir);

        match Route::parse("#/notes").resolve(&model) {
            View::Page(page) => assert_eq!(page.id, "notes"),
            other => panic!("unexpected view {:?}", other),
        }
        match Route::parse("#/missing").resolve(&model) {
            View::Page(page) => assert_eq!(page.id, "dashboard"),
            other => panic!("unexpected view {:?}", other),
        }
    }

    #[test]
    fn test_resolve_articles() {
        let dir = TempDir::new().unwrap();
        let model = model(&dir);

        assert!(matches!(
            Route::parse("#/a/hello-world").resolve(&model),
            View::Article(a) if a.slug == "hello-world"
        ));
        assert!(matches!(
            Route::parse("#/a/nope").resolve(&model),
            View::Page(_)
        ));
        assert_eq!(
            Route::parse("#/article/nope").resolve(&model),
            View::ArticleNotFound("nope".into())
        );
    }

    #[test]
    fn test_resolve_tag() {
        let dir = TempDir::new().unwrap();
        let model = model(&dir);

        match Route::parse("#/tag/c%2B%2B").resolve(&model) {
            View::Tag { tag, articles } => {
                assert_eq!(tag, "c++");
                assert_eq!(articles.len(), 1);
            }
            other => panic!("unexpected view {:?}", other),
        }
    }

    #[test]
    fn test_resolve_without_pages() {
        let dir = TempDir::new().unwrap();
        let model = ContentModel::new(SiteState::default(), ContentStore::new(dir.path(), "s"));
        match Route::parse("").resolve(&model) {
            View::Page(page) => assert_eq!(page.title, "Home"),
            other => panic!("unexpected view {:?}", other),
        }
    }
}
