//! Margins Core Library
//!
//! This crate provides the content pipeline behind Margins, a personal
//! site of articles, notes, a résumé and an about page.
//!
//! # Architecture
//!
//! - **ContentStore**: one JSON slot holding the whole site state
//! - **SyncEngine**: decides on boot whether the cache is still current and
//!   rebuilds it from the content source when it is not
//! - **ContentModel**: owns the state; all queries and mutations go through it
//! - **Markdown**: text decoration and a small Markdown dialect
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let engine = SyncEngine::new(Source::from_config(&config)?, config.refresh_policy);
//! let (mut model, report) = engine.boot(ContentStore::from_config(&config)).await;
//!
//! for article in model.published_articles() {
//!     println!("{} {}", article.date, article.title);
//! }
//! let body = engine.ensure_body(&mut model, "hello-world").await;
//! ```
//!
//! # Modules
//!
//! - `store`: the local cache slot
//! - `models`: persisted data structures
//! - `resume`: résumé wire shapes and their canonical form
//! - `model`: the content model, its queries and mutations
//! - `source`: where content is fetched from
//! - `sync`: boot-time reconciliation and lazy article loading
//! - `markdown`: decoration and Markdown rendering
//! - `render`: HTML fragments for each view
//! - `route`: fragment route parsing and resolution
//! - `export`: sitemap, RSS and JSON exports
//! - `config`: application configuration

pub mod config;
pub mod error;
pub mod export;
pub mod markdown;
pub mod model;
pub mod models;
pub mod render;
pub mod resume;
pub mod route;
pub mod source;
pub mod store;
pub mod sync;

pub use config::Config;
pub use error::{FetchError, StoreError};
pub use model::{classify_query, Backlink, ContentModel, Dashboard, Query, SearchHit};
pub use models::{Article, Block, BlockPath, Page, Profile, SiteState, Theme};
pub use resume::Resume;
pub use route::{Route, View};
pub use source::{ContentSource, DirSource, HttpSource, MemorySource, Source};
pub use store::ContentStore;
pub use sync::{RefreshPolicy, SyncEngine, SyncReport};
