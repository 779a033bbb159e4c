//! Command handlers

pub mod article;
pub mod config;
pub mod export;
pub mod note;
pub mod page;
pub mod search;
pub mod status;
pub mod sync;
pub mod tag;

use anyhow::{Context, Result};
use tracing::info;

use margins_core::{Config, ContentModel, ContentStore, Source, SyncEngine, SyncReport};

/// A booted site: configuration, the engine that fetched it and the model
pub struct Session {
    pub config: Config,
    pub engine: SyncEngine<Source>,
    pub model: ContentModel,
    pub report: SyncReport,
}

impl Session {
    /// Run the boot reconciliation, or a forced refresh when `force` is set
    pub async fn open(config: Config, force: bool) -> Result<Self> {
        let source = Source::from_config(&config)
            .with_context(|| format!("Failed to open content source '{}'", config.content_base))?;
        let engine = SyncEngine::new(source, config.refresh_policy);
        let store = ContentStore::from_config(&config);

        let (model, report) = if force {
            engine.force_refresh(store).await
        } else {
            engine.boot(store).await
        };
        info!(
            "Booted from {} ({} articles)",
            config.content_base,
            model.articles().len()
        );

        Ok(Self {
            config,
            engine,
            model,
            report,
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// Content directory with two pages, a nested note and one article
    pub fn site(root: &TempDir) {
        let content = root.path().join("content");
        fs::create_dir_all(content.join("blocks")).unwrap();
        fs::create_dir_all(content.join("articles")).unwrap();
        fs::write(content.join("meta.json"), r#"{"version": 2}"#).unwrap();
        fs::write(
            content.join("pages.json"),
            r#"[{"id": "notes", "title": "Notes"}, {"id": "articles", "title": "Articles"}]"#,
        )
        .unwrap();
        fs::write(
            content.join("blocks").join("notes.json"),
            r#"[{"text": "First", "children": [{"text": "Nested"}]}, {"text": "Read [[Articles]] later"}]"#,
        )
        .unwrap();
        fs::write(
            content.join("articles").join("index.json"),
            r#"[{"slug": "hello", "title": "Hello", "date": "2024-02-01", "tags": ["rust"]}]"#,
        )
        .unwrap();
        fs::write(content.join("articles").join("hello.md"), "# Hi\n\nBody").unwrap();
    }

    pub fn config(content: &TempDir, data: &TempDir) -> Config {
        Config {
            data_dir: data.path().to_path_buf(),
            content_base: content.path().display().to_string(),
            ..Config::default()
        }
    }

    /// Boot a session over `site` content
    pub async fn session(content: &TempDir, data: &TempDir) -> Session {
        site(content);
        Session::open(config(content, data), false).await.unwrap()
    }
}
