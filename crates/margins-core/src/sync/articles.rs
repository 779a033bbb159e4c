//! Article index ingestion and lazy body loading

use serde::Serialize;
use tracing::{debug, info, warn};

use super::engine::SyncEngine;
use super::resources;
use crate::model::ContentModel;
use crate::models::{Article, ArticleIndexEntry, MISSING_BODY};
use crate::source::ContentSource;

/// Result of an index refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum IndexRefresh {
    /// The collection was replaced
    Replaced { count: usize, dropped: usize },
    /// The index was unavailable; the previous collection stays
    Kept { reason: String },
}

impl<S: ContentSource> SyncEngine<S> {
    /// Replace the article collection from the published index
    ///
    /// On any failure the current collection is left untouched.
    pub async fn refresh_article_index(&self, model: &mut ContentModel) -> IndexRefresh {
        let entries = match self
            .source()
            .fetch_json::<Vec<ArticleIndexEntry>>(resources::ARTICLE_INDEX)
            .await
        {
            Ok(entries) => entries,
            Err(e) => {
                warn!(
                    "Article index unavailable; keeping {} cached articles: {}",
                    model.articles().len(),
                    e
                );
                return IndexRefresh::Kept {
                    reason: e.to_string(),
                };
            }
        };

        let total = entries.len();
        let articles: Vec<Article> = entries.into_iter().filter_map(Article::from_index).collect();
        let dropped = total - articles.len();
        if dropped > 0 {
            warn!("Dropped {} article index entries without a slug", dropped);
        }

        let count = articles.len();
        model.replace_articles(articles);
        info!("Loaded {} articles", count);
        IndexRefresh::Replaced { count, dropped }
    }

    /// Populate an article's body on first use
    ///
    /// At most one fetch per article: a failed fetch stores a placeholder so
    /// later views do not retry. Returns `None` for an unknown article.
    pub async fn ensure_body<'m>(
        &self,
        model: &'m mut ContentModel,
        id_or_slug: &str,
    ) -> Option<&'m str> {
        let article = model.find_article(id_or_slug)?;

        if article.body.is_none() {
            let slug = article.slug.clone();
            let body = match self.source().fetch_text(&resources::article_body(&slug)).await {
                Ok(body) => body,
                Err(e) => {
                    warn!("Could not load body of '{}': {}", slug, e);
                    MISSING_BODY.to_string()
                }
            };
            model.set_article_body(&slug, body);
        } else {
            debug!("Body of '{}' already loaded", id_or_slug);
        }

        model
            .find_article(id_or_slug)
            .and_then(|a| a.body.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SiteState;
    use crate::source::MemorySource;
    use crate::store::ContentStore;
    use crate::sync::RefreshPolicy;
    use tempfile::TempDir;

    fn model_with(dir: &TempDir, articles: Vec<Article>) -> ContentModel {
        let mut state = SiteState::default();
        state.blocks.articles = articles;
        ContentModel::new(state, ContentStore::new(dir.path(), "site"))
    }

    fn engine(source: MemorySource) -> SyncEngine<MemorySource> {
        SyncEngine::new(source, RefreshPolicy::VersionChecked)
    }

    #[tokio::test]
    async fn test_index_normalization() {
        let dir = TempDir::new().unwrap();
        let mut model = model_with(&dir, Vec::new());
        let engine = engine(MemorySource::new().with(
            resources::ARTICLE_INDEX,
            r#"[
                {"slug": "a", "title": "A", "date": null, "tags": null},
                {"title": "No slug"},
                {"slug": "", "title": "Empty slug"},
                {"slug": "b", "draft": true, "summary": "Later"}
            ]"#,
        ));

        let outcome = engine.refresh_article_index(&mut model).await;

        assert_eq!(outcome, IndexRefresh::Replaced { count: 2, dropped: 2 });
        let articles = model.articles();
        assert_eq!(articles[0].id, "a");
        assert_eq!(articles[0].date, "");
        assert!(articles[0].tags.is_empty());
        assert_eq!(articles[1].title, "b");
        assert!(articles[1].draft);
        assert!(articles.iter().all(|a| !a.slug.is_empty() && a.id == a.slug));

        let persisted = model.store().load().unwrap();
        assert_eq!(persisted.blocks.articles.len(), 2);
    }

    #[tokio::test]
    async fn test_index_failure_keeps_existing() {
        let dir = TempDir::new().unwrap();
        let mut model = model_with(&dir, vec![Article::new("kept", "Kept")]);

        let outcome = engine(MemorySource::new())
            .refresh_article_index(&mut model)
            .await;
        assert!(matches!(outcome, IndexRefresh::Kept { .. }));
        assert_eq!(model.articles()[0].slug, "kept");

        let outcome = engine(MemorySource::new().with(resources::ARTICLE_INDEX, r#"{"a": 1}"#))
            .refresh_article_index(&mut model)
            .await;
        assert!(matches!(outcome, IndexRefresh::Kept { .. }));
        assert_eq!(model.articles().len(), 1);
    }

    #[tokio::test]
    async fn test_ensure_body_fetches_once() {
        let dir = TempDir::new().unwrap();
        let mut model = model_with(&dir, vec![Article::new("post", "Post")]);
        let engine = engine(MemorySource::new().with("content/articles/post.md", "# Post"));

        assert_eq!(engine.ensure_body(&mut model, "post").await, Some("# Post"));
        assert_eq!(engine.ensure_body(&mut model, "post").await, Some("# Post"));
        assert_eq!(engine.source().fetch_count(), 1);

        let persisted = model.store().load().unwrap();
        assert_eq!(persisted.blocks.articles[0].body.as_deref(), Some("# Post"));
    }

    #[tokio::test]
    async fn test_missing_body_stores_placeholder() {
        let dir = TempDir::new().unwrap();
        let mut model = model_with(&dir, vec![Article::new("gone", "Gone")]);
        let engine = engine(MemorySource::new());

        assert_eq!(engine.ensure_body(&mut model, "gone").await, Some(MISSING_BODY));
        assert_eq!(engine.ensure_body(&mut model, "gone").await, Some(MISSING_BODY));
        assert_eq!(engine.source().fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_ensure_body_unknown_article() {
        let dir = TempDir::new().unwrap();
        let mut model = model_with(&dir, Vec::new());
        let engine = engine(MemorySource::new());

        assert_eq!(engine.ensure_body(&mut model, "nope").await, None);
        assert_eq!(engine.source().fetch_count(), 0);
    }
}
