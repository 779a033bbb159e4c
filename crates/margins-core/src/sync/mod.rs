//! Content synchronization
//!
//! Decides on each boot whether the cached site state can be used as-is or
//! must be rebuilt from the content source.
//!
//! ## Protocol
//!
//! 1. Fetch `content/meta.json` for the remote content version (0 if absent)
//! 2. Load the cached state
//! 3. Refresh everything when the cache is missing, unversioned or stale
//! 4. Otherwise adopt the cache as-is
//!
//! The [`RefreshPolicy`] selects between this version-checked protocol and
//! the two simpler variants (always refresh the article index, or trust any
//! cache that has pages).
//!
//! ## Usage
//!
//! ```ignore
//! let engine = SyncEngine::new(Source::from_config(&config)?, config.refresh_policy);
//! let (model, report) = engine.boot(ContentStore::from_config(&config)).await;
//! ```

mod articles;
mod engine;
mod policy;

pub use articles::IndexRefresh;
pub use engine::{CoreContent, RefreshReason, SyncDecision, SyncEngine, SyncReport};
pub use policy::RefreshPolicy;

/// Resource paths, relative to the content base
pub mod resources {
    pub const META: &str = "content/meta.json";
    pub const PROFILE: &str = "content/profile.json";
    pub const PAGES: &str = "content/pages.json";
    pub const ABOUT_MD: &str = "content/blocks/about.md";
    pub const ABOUT_JSON: &str = "content/blocks/about.json";
    pub const ARTICLE_INDEX: &str = "content/articles/index.json";

    /// Block collection of a page
    pub fn blocks(page_id: &str) -> String {
        format!("content/blocks/{}.json", page_id)
    }

    /// Markdown body of an article
    pub fn article_body(slug: &str) -> String {
        format!("content/articles/{}.md", slug)
    }
}
