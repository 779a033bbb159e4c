//! In-memory content model
//!
//! `ContentModel` owns the `SiteState` and is the only way to change it.
//! Every mutation writes the whole state back through the `ContentStore`
//! before returning, so the cache slot always matches the last mutation
//! that was fully applied.
//!
//! Queries derive views from the state: published/draft partitions, the tag
//! index, backlinks and search hits.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::models::{Article, Block, BlockPath, Page, Profile, SiteState, Theme};
use crate::resume::ResumeRow;
use crate::store::ContentStore;

/// Page id of the notes forest
pub const NOTES_PAGE: &str = "notes";

/// Recent articles shown on the dashboard
pub const DASHBOARD_ARTICLES: usize = 4;

/// Résumé rows teased on the dashboard
pub const DASHBOARD_RESUME_ROWS: usize = 2;

/// The landing view: profile card, recent articles and a résumé teaser
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard<'a> {
    pub profile: &'a Profile,
    pub recent: Vec<&'a Article>,
    /// All published articles, of which `recent` is the head
    pub published_total: usize,
    pub resume_teaser: Vec<&'a ResumeRow>,
    pub resume_entries: usize,
}

/// A block that links to a page by title
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Backlink<'a> {
    pub page_id: &'a str,
    pub page_title: &'a str,
    pub path: BlockPath,
    pub text: &'a str,
}

/// One search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SearchHit<'a> {
    Block {
        page_id: &'a str,
        page_title: &'a str,
        path: BlockPath,
        text: &'a str,
    },
    Article {
        slug: &'a str,
        title: &'a str,
        draft: bool,
    },
}

/// What a search box entry asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query<'a> {
    /// Nothing to search for
    Empty,
    /// `#tag`: navigate to the tag view
    Tag(&'a str),
    /// Free-text search
    Text(&'a str),
}

/// Classify raw search input
pub fn classify_query(input: &str) -> Query<'_> {
    let trimmed = input.trim();
    match trimmed.strip_prefix('#') {
        Some(tag) if !tag.trim().is_empty() => Query::Tag(tag.trim()),
        Some(_) => Query::Empty,
        None if trimmed.is_empty() => Query::Empty,
        None => Query::Text(trimmed),
    }
}

/// The site state plus the slot it persists to
#[derive(Debug)]
pub struct ContentModel {
    state: SiteState,
    store: ContentStore,
}

impl ContentModel {
    pub fn new(state: SiteState, store: ContentStore) -> Self {
        Self { state, store }
    }

    pub fn state(&self) -> &SiteState {
        &self.state
    }

    pub fn into_state(self) -> SiteState {
        self.state
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    /// Write the current state to the store (best-effort)
    pub fn persist(&self) {
        self.store.save(&self.state);
    }

    // ==================== Pages & blocks ====================

    pub fn pages(&self) -> &[Page] {
        &self.state.pages
    }

    pub fn page(&self, id: &str) -> Option<&Page> {
        self.state.pages.iter().find(|p| p.id == id)
    }

    /// First page in navigation order
    pub fn default_page(&self) -> Option<&Page> {
        self.state.pages.first()
    }

    /// Display title for a page id, falling back to the id itself
    pub fn page_title<'a>(&'a self, id: &'a str) -> &'a str {
        self.page(id).map(|p| p.title.as_str()).unwrap_or(id)
    }

    /// The block forest of a page (empty if the page has none)
    pub fn blocks_for(&self, page_id: &str) -> &[Block] {
        self.state
            .blocks
            .forests
            .get(page_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Look up a block by path
    pub fn block(&self, path: &BlockPath) -> Option<&Block> {
        let (first, rest) = path.indices.split_first()?;
        let mut block = self.blocks_for(&path.page).get(*first)?;
        for i in rest {
            block = block.children.get(*i)?;
        }
        Some(block)
    }

    pub fn is_folded(&self, path: &BlockPath) -> bool {
        self.state.ui.folded.contains(&path.to_string())
    }

    /// Forests in navigation order, then any forest without a page
    fn forests(&self) -> Vec<(&str, &[Block])> {
        let forests = &self.state.blocks.forests;
        let mut ordered: Vec<(&str, &[Block])> = self
            .state
            .pages
            .iter()
            .filter_map(|p| forests.get_key_value(&p.id))
            .map(|(id, blocks)| (id.as_str(), blocks.as_slice()))
            .collect();

        for (id, blocks) in forests {
            if self.page(id).is_none() {
                ordered.push((id.as_str(), blocks.as_slice()));
            }
        }
        ordered
    }

    /// Visit every block of every forest, depth-first
    fn walk_blocks<'a>(&'a self, mut visit: impl FnMut(&'a str, BlockPath, &'a Block)) {
        fn walk<'a>(
            page_id: &'a str,
            blocks: &'a [Block],
            parent: &BlockPath,
            visit: &mut impl FnMut(&'a str, BlockPath, &'a Block),
        ) {
            for (i, block) in blocks.iter().enumerate() {
                let path = parent.child(i);
                visit(page_id, path.clone(), block);
                walk(page_id, &block.children, &path, visit);
            }
        }

        for (page_id, blocks) in self.forests() {
            walk(page_id, blocks, &BlockPath::new(page_id, Vec::new()), &mut visit);
        }
    }

    // ==================== Articles ====================

    pub fn articles(&self) -> &[Article] {
        &self.state.blocks.articles
    }

    pub fn show_drafts(&self) -> bool {
        self.state.ui.show_drafts
    }

    /// Non-draft articles, newest first
    pub fn published_articles(&self) -> Vec<&Article> {
        sorted_by_date(self.articles().iter().filter(|a| !a.draft).collect())
    }

    /// Articles shown in lists: drafts included only when enabled
    pub fn listable_articles(&self) -> Vec<&Article> {
        if self.state.ui.show_drafts {
            sorted_by_date(self.articles().iter().collect())
        } else {
            self.published_articles()
        }
    }

    pub fn draft_count(&self) -> usize {
        self.articles().iter().filter(|a| a.draft).count()
    }

    /// Listable articles carrying `tag`
    pub fn articles_tagged(&self, tag: &str) -> Vec<&Article> {
        self.listable_articles()
            .into_iter()
            .filter(|a| a.has_tag(tag))
            .collect()
    }

    pub fn find_article(&self, id_or_slug: &str) -> Option<&Article> {
        self.articles().iter().find(|a| a.matches(id_or_slug))
    }

    // ==================== Derived views ====================

    /// Tag occurrence counts across every forest and every article
    pub fn collect_tags(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        self.walk_blocks(|_, _, block| {
            for tag in &block.tags {
                *counts.entry(tag.clone()).or_insert(0) += 1;
            }
        });
        for article in self.articles() {
            for tag in &article.tags {
                *counts.entry(tag.clone()).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Blocks anywhere whose text contains `[[<page title>]]`
    pub fn backlinks_for_page(&self, page_id: &str) -> Vec<Backlink<'_>> {
        let needle = format!("[[{}]]", self.page_title(page_id));
        let mut hits = Vec::new();
        self.walk_blocks(|source, path, block| {
            if block.text.contains(&needle) {
                hits.push(Backlink {
                    page_id: source,
                    page_title: self.page_title(source),
                    path,
                    text: &block.text,
                });
            }
        });
        hits
    }

    /// Case-insensitive substring search over blocks and listable articles
    pub fn search(&self, term: &str) -> Vec<SearchHit<'_>> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut hits = Vec::new();
        self.walk_blocks(|page_id, path, block| {
            if block.haystack().to_lowercase().contains(&needle) {
                hits.push(SearchHit::Block {
                    page_id,
                    page_title: self.page_title(page_id),
                    path,
                    text: &block.text,
                });
            }
        });

        let articles = self
            .listable_articles()
            .into_iter()
            .filter(|a| {
                format!("{} {} {}", a.title, a.tags.join(" "), a.summary)
                    .to_lowercase()
                    .contains(&needle)
            })
            .map(|a| SearchHit::Article {
                slug: &a.slug,
                title: &a.title,
                draft: a.draft,
            });

        hits.extend(articles);
        hits
    }

    pub fn dashboard(&self) -> Dashboard<'_> {
        let published = self.published_articles();
        let resume = &self.state.blocks.resume;
        Dashboard {
            profile: &self.state.profile,
            published_total: published.len(),
            recent: published.into_iter().take(DASHBOARD_ARTICLES).collect(),
            resume_teaser: resume.teaser(DASHBOARD_RESUME_ROWS),
            resume_entries: resume.entry_count(),
        }
    }

    // ==================== Mutations ====================

    pub fn set_show_drafts(&mut self, show: bool) {
        self.state.ui.show_drafts = show;
        self.persist();
    }

    /// Flip the fold flag of a block; `None` if no block lives at `path`
    pub fn toggle_fold(&mut self, path: &BlockPath) -> Option<bool> {
        self.block(path)?;
        let key = path.to_string();
        let folded = if self.state.ui.folded.remove(&key) {
            false
        } else {
            self.state.ui.folded.insert(key);
            true
        };
        self.persist();
        Some(folded)
    }

    /// Prepend a note to the notes forest
    pub fn append_note<I, T>(&mut self, text: impl Into<String>, tags: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        // Existing notes move down one slot; their fold flags follow them
        let prefix = format!("{}/", NOTES_PAGE);
        let shifted: Vec<String> = self
            .state
            .ui
            .folded
            .iter()
            .filter(|key| key.starts_with(&prefix))
            .cloned()
            .collect();
        for key in shifted {
            self.state.ui.folded.remove(&key);
            if let Ok(mut path) = key.parse::<BlockPath>() {
                path.indices[0] += 1;
                self.state.ui.folded.insert(path.to_string());
            }
        }

        self.state
            .blocks
            .forests
            .entry(NOTES_PAGE.to_string())
            .or_default()
            .insert(0, Block::new(text).with_tags(tags));
        self.persist();
    }

    /// Add a "Saved: <title>" note for an article; false if unknown
    pub fn save_article_to_notes(&mut self, id_or_slug: &str) -> bool {
        let Some(title) = self.find_article(id_or_slug).map(|a| a.title.clone()) else {
            return false;
        };
        self.append_note(format!("Saved: {}", title), ["saved", "article"]);
        true
    }

    /// Replace the article collection wholesale
    pub fn replace_articles(&mut self, articles: Vec<Article>) {
        debug!("Replacing {} articles with {}", self.articles().len(), articles.len());
        self.state.blocks.articles = articles;
        self.persist();
    }

    /// Store a lazily loaded body; false if no such article
    pub fn set_article_body(&mut self, id_or_slug: &str, body: String) -> bool {
        let Some(article) = self
            .state
            .blocks
            .articles
            .iter_mut()
            .find(|a| a.matches(id_or_slug))
        else {
            return false;
        };
        article.body = Some(body);
        self.persist();
        true
    }

    pub fn theme(&self) -> Theme {
        self.state.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.state.theme = theme;
        self.persist();
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.set_theme(self.state.theme.toggled());
        self.state.theme
    }
}

/// Stable sort by date, newest first
fn sorted_by_date(mut articles: Vec<&Article>) -> Vec<&Article> {
    articles.sort_by(|a, b| b.sort_key().cmp(a.sort_key()));
    articles
}
