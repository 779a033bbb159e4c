//! Boot-time reconciliation of the cache against the content source

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::articles::IndexRefresh;
use super::policy::RefreshPolicy;
use super::resources;
use crate::error::FetchError;
use crate::model::ContentModel;
use crate::models::{default_pages, Block, Blocks, Page, Profile, SiteState, UiState};
use crate::resume::{Resume, ResumeData};
use crate::source::ContentSource;
use crate::store::ContentStore;

/// Text shown when neither about.md nor about.json is available
const ABOUT_PLACEHOLDER: &str = "About page not configured yet.";

/// Why the cache was not adopted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RefreshReason {
    /// Nothing cached yet
    NoCache,
    /// Cache predates version stamping
    Unversioned,
    /// Publisher bumped the content version
    VersionChanged,
    /// Cache has no navigation
    InvalidShape,
    /// Requested explicitly
    Forced,
}

impl fmt::Display for RefreshReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RefreshReason::NoCache => "no cached state",
            RefreshReason::Unversioned => "cached state has no content version",
            RefreshReason::VersionChanged => "content version changed",
            RefreshReason::InvalidShape => "cached state has no pages",
            RefreshReason::Forced => "refresh requested",
        };
        f.write_str(text)
    }
}

/// What the boot sequence did with the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum SyncDecision {
    AdoptCache,
    FullRefresh { reason: RefreshReason },
}

/// Outcome of a boot, for display
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub policy: RefreshPolicy,
    /// `None` when the policy skips the version check
    pub remote_version: Option<u64>,
    pub cached_version: Option<u64>,
    pub decision: SyncDecision,
    /// Resources replaced by their fallback during a full refresh
    pub fallbacks: Vec<String>,
    /// `None` when the article index was not consulted
    pub articles: Option<IndexRefresh>,
}

impl SyncReport {
    fn new(policy: RefreshPolicy, decision: SyncDecision) -> Self {
        Self {
            policy,
            remote_version: None,
            cached_version: None,
            decision,
            fallbacks: Vec::new(),
            articles: None,
        }
    }

    pub fn refreshed(&self) -> bool {
        matches!(self.decision, SyncDecision::FullRefresh { .. })
    }
}

/// Everything a full refresh loads besides the article index
#[derive(Debug, Clone, Default)]
pub struct CoreContent {
    pub profile: Profile,
    pub pages: Vec<Page>,
    pub forests: BTreeMap<String, Vec<Block>>,
    pub resume: Resume,
    pub about_markdown: Option<String>,
    pub fallbacks: Vec<String>,
}

impl CoreContent {
    /// Build a fresh state, carrying view preferences and the last known
    /// articles over from `previous`
    ///
    /// Fold flags are dropped because block paths may no longer line up.
    pub fn into_state(self, previous: Option<&SiteState>) -> SiteState {
        let (theme, show_drafts, articles) = match previous {
            Some(prev) => (prev.theme, prev.ui.show_drafts, prev.blocks.articles.clone()),
            None => Default::default(),
        };

        SiteState {
            theme,
            ui: UiState {
                show_drafts,
                folded: Default::default(),
            },
            profile: self.profile,
            pages: self.pages,
            blocks: Blocks {
                articles,
                resume: self.resume,
                about_markdown: self.about_markdown,
                forests: self.forests,
            },
            content_version: None,
        }
    }
}

/// Reconciles the cache slot with a content source
#[derive(Debug)]
pub struct SyncEngine<S> {
    source: S,
    policy: RefreshPolicy,
}

impl<S: ContentSource> SyncEngine<S> {
    pub fn new(source: S, policy: RefreshPolicy) -> Self {
        Self { source, policy }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn policy(&self) -> RefreshPolicy {
        self.policy
    }

    /// Remote content version; 0 when the descriptor is missing or broken
    pub async fn fetch_meta(&self) -> u64 {
        match self
            .source
            .fetch_json::<serde_json::Value>(resources::META)
            .await
        {
            Ok(meta) => {
                let version = meta.get("version").and_then(|v| {
                    v.as_u64()
                        .or_else(|| v.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
                });
                version.unwrap_or_else(|| {
                    warn!("{} has no numeric version; using 0", resources::META);
                    0
                })
            }
            Err(e) => {
                warn!("Content version unavailable ({}); using 0", e);
                0
            }
        }
    }

    /// Decide between the cache and a full refresh, then carry it out
    ///
    /// Never fails: every missing resource degrades to its fallback.
    pub async fn boot(&self, store: ContentStore) -> (ContentModel, SyncReport) {
        let remote = if self.policy.checks_version() {
            Some(self.fetch_meta().await)
        } else {
            None
        };
        let cached = store.load();

        let decision = decide(self.policy, cached.as_ref(), remote);
        let mut report = SyncReport::new(self.policy, decision);
        report.remote_version = remote;
        report.cached_version = cached.as_ref().and_then(|c| c.content_version);

        match decision {
            SyncDecision::AdoptCache => {
                info!("Using cached content (version {:?})", report.cached_version);
                let state = cached.unwrap_or_default();
                let mut model = ContentModel::new(state, store);
                if self.policy.refreshes_articles_on_adopt() {
                    report.articles = Some(self.refresh_article_index(&mut model).await);
                }
                (model, report)
            }
            SyncDecision::FullRefresh { reason } => {
                info!("Refreshing all content: {}", reason);
                let stamp = remote.or_else(|| cached.as_ref().and_then(|c| c.content_version));
                let model = self.rebuild(cached, store, stamp, &mut report).await;
                (model, report)
            }
        }
    }

    /// Full refresh regardless of the cache
    pub async fn force_refresh(&self, store: ContentStore) -> (ContentModel, SyncReport) {
        let mut report = SyncReport::new(
            self.policy,
            SyncDecision::FullRefresh {
                reason: RefreshReason::Forced,
            },
        );
        let cached = store.load();
        report.cached_version = cached.as_ref().and_then(|c| c.content_version);

        let stamp = if self.policy.checks_version() {
            let version = self.fetch_meta().await;
            report.remote_version = Some(version);
            Some(version)
        } else {
            report.cached_version
        };

        let model = self.rebuild(cached, store, stamp, &mut report).await;
        (model, report)
    }

    async fn rebuild(
        &self,
        cached: Option<SiteState>,
        store: ContentStore,
        stamp: Option<u64>,
        report: &mut SyncReport,
    ) -> ContentModel {
        let core = self.load_core().await;
        report.fallbacks = core.fallbacks.clone();

        let mut state = core.into_state(cached.as_ref());
        state.content_version = stamp;

        let mut model = ContentModel::new(state, store);
        report.articles = Some(self.refresh_article_index(&mut model).await);
        model.persist();
        model
    }

    /// Fetch profile, pages and every block collection
    ///
    /// The fetches fill disjoint keys, so they run concurrently.
    pub async fn load_core(&self) -> CoreContent {
        let dashboard_res = resources::blocks("dashboard");
        let notes_res = resources::blocks("notes");
        let resume_res = resources::blocks("resume");
        let projects_res = resources::blocks("projects");

        let (profile, pages, dashboard, notes, resume, projects, about) = tokio::join!(
            self.source.fetch_json::<Profile>(resources::PROFILE),
            self.source.fetch_json::<Vec<Page>>(resources::PAGES),
            self.source.fetch_json::<Vec<Block>>(&dashboard_res),
            self.source.fetch_json::<Vec<Block>>(&notes_res),
            self.source.fetch_json::<ResumeData>(&resume_res),
            self.source.fetch_json::<Vec<Block>>(&projects_res),
            self.load_about(),
        );

        let mut fallbacks = Vec::new();

        let profile = or_fallback(resources::PROFILE, profile, Profile::default, &mut fallbacks);
        let mut pages = or_fallback(resources::PAGES, pages, default_pages, &mut fallbacks);
        if pages.is_empty() {
            warn!("{} lists no pages; using the default navigation", resources::PAGES);
            pages = default_pages();
        }

        let mut forests = BTreeMap::new();
        for (id, resource, result) in [
            ("dashboard", &dashboard_res, dashboard),
            ("notes", &notes_res, notes),
            ("projects", &projects_res, projects),
        ] {
            forests.insert(
                id.to_string(),
                or_fallback(resource, result, Vec::new, &mut fallbacks),
            );
        }

        let resume = or_fallback(&resume_res, resume, ResumeData::default, &mut fallbacks);
        // Legacy résumé blocks stay walkable for tags, search and backlinks
        if let ResumeData::Legacy(blocks) = &resume {
            if !blocks.is_empty() {
                forests.insert("resume".to_string(), blocks.clone());
            }
        }
        let resume: Resume = resume.into();

        let (about_markdown, about_blocks) = about;
        let about_blocks = about_blocks.map(|result| {
            or_fallback(
                resources::ABOUT_JSON,
                result,
                || vec![Block::new(ABOUT_PLACEHOLDER).with_tags(["about"])],
                &mut fallbacks,
            )
        });
        if let Some(blocks) = about_blocks {
            forests.insert("about".to_string(), blocks);
        }

        CoreContent {
            profile,
            pages,
            forests,
            resume,
            about_markdown,
            fallbacks,
        }
    }

    /// About prefers Markdown; JSON blocks are only fetched when it is empty
    async fn load_about(&self) -> (Option<String>, Option<Result<Vec<Block>, FetchError>>) {
        match self.source.fetch_text(resources::ABOUT_MD).await {
            Ok(markdown) if !markdown.trim().is_empty() => (Some(markdown), None),
            Ok(_) => {
                debug!("{} is empty; trying {}", resources::ABOUT_MD, resources::ABOUT_JSON);
                (None, Some(self.source.fetch_json(resources::ABOUT_JSON).await))
            }
            Err(e) => {
                debug!("{} unavailable ({}); trying {}", resources::ABOUT_MD, e, resources::ABOUT_JSON);
                (None, Some(self.source.fetch_json(resources::ABOUT_JSON).await))
            }
        }
    }
}

/// Policy decision given the cached state and (optionally) the remote version
fn decide(policy: RefreshPolicy, cached: Option<&SiteState>, remote: Option<u64>) -> SyncDecision {
    let refresh = |reason| SyncDecision::FullRefresh { reason };

    let Some(cached) = cached else {
        return refresh(RefreshReason::NoCache);
    };

    if !policy.checks_version() {
        return if cached.has_valid_shape() {
            SyncDecision::AdoptCache
        } else {
            refresh(RefreshReason::InvalidShape)
        };
    }

    match (cached.content_version, remote) {
        (None, _) => refresh(RefreshReason::Unversioned),
        (Some(local), Some(remote)) if local != remote => refresh(RefreshReason::VersionChanged),
        _ => SyncDecision::AdoptCache,
    }
}

/// Resolve a fetch result, substituting its fallback on failure
fn or_fallback<T>(
    resource: &str,
    result: Result<T, FetchError>,
    fallback: impl FnOnce() -> T,
    fallbacks: &mut Vec<String>,
) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!("Using fallback for {}: {}", resource, e);
            fallbacks.push(resource.to_string());
            fallback()
        }
    }
}
