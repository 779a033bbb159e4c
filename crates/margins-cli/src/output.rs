//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use std::collections::BTreeMap;

use serde::Serialize;

use margins_core::model::{Backlink, SearchHit};
use margins_core::resume::Resume;
use margins_core::{Article, Block, BlockPath, ContentModel, Dashboard, Page};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Print any serializable value as pretty JSON
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to serialize output: {}", e),
        }
    }

    /// Print the navigation
    pub fn print_pages(&self, pages: &[Page], model: &ContentModel) {
        match self.format {
            OutputFormat::Human => {
                if pages.is_empty() {
                    println!("No pages.");
                    return;
                }
                for page in pages {
                    let kind = if page.is_system() { " (system)" } else { "" };
                    println!(
                        "{:<12} {}{} [{} blocks]",
                        page.id,
                        page.title,
                        kind,
                        model.blocks_for(&page.id).len()
                    );
                }
            }
            OutputFormat::Json => self.json(pages),
            OutputFormat::Quiet => {
                for page in pages {
                    println!("{}", page.id);
                }
            }
        }
    }

    /// Print a block outline, honoring fold state
    pub fn print_outline(&self, model: &ContentModel, page: &Page) {
        let blocks = model.blocks_for(&page.id);
        match self.format {
            OutputFormat::Human => {
                println!("{}", page.title);
                println!("{}", "=".repeat(page.title.chars().count().max(3)));
                if blocks.is_empty() {
                    println!("No blocks on this page.");
                    return;
                }
                let root = BlockPath::new(page.id.as_str(), Vec::new());
                for line in outline_lines(model, &root, blocks, 0) {
                    println!("{}", line);
                }
            }
            OutputFormat::Json => self.json(blocks),
            OutputFormat::Quiet => {
                for block in blocks {
                    println!("{}", block.text);
                }
            }
        }
    }

    /// Print the landing view
    pub fn print_dashboard(&self, dashboard: &Dashboard<'_>) {
        match self.format {
            OutputFormat::Human => {
                for line in dashboard_lines(dashboard) {
                    println!("{}", line);
                }
            }
            OutputFormat::Json => self.json(dashboard),
            OutputFormat::Quiet => {
                for article in &dashboard.recent {
                    println!("{}", article.slug);
                }
            }
        }
    }

    /// Print a list of articles
    pub fn print_articles(&self, articles: &[&Article]) {
        match self.format {
            OutputFormat::Human => {
                if articles.is_empty() {
                    println!("No articles found.");
                    return;
                }
                for article in articles {
                    let draft = if article.draft { " [draft]" } else { "" };
                    println!(
                        "{:<10} | {}{} | {}",
                        if article.date.is_empty() { "-" } else { &article.date },
                        truncate(&article.title, 40),
                        draft,
                        article.slug
                    );
                }
                println!("\n{} article(s)", articles.len());
            }
            OutputFormat::Json => self.json(articles),
            OutputFormat::Quiet => {
                for article in articles {
                    println!("{}", article.slug);
                }
            }
        }
    }

    /// Print one article with its rendered body
    pub fn print_article(&self, article: &Article, html: &str) {
        match self.format {
            OutputFormat::Human => {
                println!("Title:   {}", article.title);
                println!("Slug:    {}", article.slug);
                if !article.date.is_empty() {
                    println!("Date:    {}", article.date);
                }
                if !article.tags.is_empty() {
                    println!("Tags:    {}", hashtags(&article.tags));
                }
                if article.draft {
                    println!("Status:  draft");
                }
                if !article.summary.is_empty() {
                    println!();
                    println!("{}", article.summary);
                }
                println!();
                println!("{}", html);
            }
            OutputFormat::Json => {
                self.json(&serde_json::json!({
                    "article": article,
                    "html": html,
                }));
            }
            OutputFormat::Quiet => println!("{}", html),
        }
    }

    /// Print tag counts
    pub fn print_tags(&self, tags: &BTreeMap<String, usize>) {
        match self.format {
            OutputFormat::Human => {
                if tags.is_empty() {
                    println!("No tags found.");
                    return;
                }
                for (name, count) in tags {
                    println!("#{} ({})", name, count);
                }
                println!("\n{} tag(s)", tags.len());
            }
            OutputFormat::Json => {
                let json_tags: Vec<_> = tags
                    .iter()
                    .map(|(name, count)| serde_json::json!({"name": name, "count": count}))
                    .collect();
                self.json(&json_tags);
            }
            OutputFormat::Quiet => {
                for name in tags.keys() {
                    println!("{}", name);
                }
            }
        }
    }

    pub fn print_backlinks(&self, title: &str, links: &[Backlink<'_>]) {
        match self.format {
            OutputFormat::Human => {
                if links.is_empty() {
                    println!("No pages link to [[{}]].", title);
                    return;
                }
                for link in links {
                    println!("{} ({}): {}", link.page_title, link.path, link.text);
                }
                println!("\n{} backlink(s)", links.len());
            }
            OutputFormat::Json => self.json(links),
            OutputFormat::Quiet => {
                for link in links {
                    println!("{}", link.path);
                }
            }
        }
    }

    pub fn print_search(&self, term: &str, hits: &[SearchHit<'_>]) {
        match self.format {
            OutputFormat::Human => {
                if hits.is_empty() {
                    println!("No results for \"{}\".", term);
                    return;
                }
                for hit in hits {
                    match hit {
                        SearchHit::Block {
                            page_title, text, ..
                        } => println!("{:<12} {}", page_title, truncate(text, 60)),
                        SearchHit::Article { title, draft, .. } => {
                            let draft = if *draft { " [draft]" } else { "" };
                            println!("{:<12} {}{}", "article", title, draft)
                        }
                    }
                }
                println!("\n{} result(s)", hits.len());
            }
            OutputFormat::Json => self.json(hits),
            OutputFormat::Quiet => {
                for hit in hits {
                    match hit {
                        SearchHit::Block { path, .. } => println!("{}", path),
                        SearchHit::Article { slug, .. } => println!("a/{}", slug),
                    }
                }
            }
        }
    }

    pub fn print_resume(&self, resume: &Resume) {
        match self.format {
            OutputFormat::Human => {
                if resume.is_empty() {
                    println!("No résumé published.");
                    return;
                }
                for section in &resume.sections {
                    println!("{}", section.title);
                    println!("{}", "-".repeat(section.title.chars().count()));
                    for row in &section.rows {
                        if row.meta.is_empty() {
                            println!("{}", row.title);
                        } else {
                            println!("{}  ({})", row.title, row.meta);
                        }
                        for bullet in &row.bullets {
                            println!("  • {}", bullet);
                        }
                    }
                    for group in &section.groups {
                        println!("{}: {}", group.label, group.items.join(", "));
                    }
                    println!();
                }
            }
            OutputFormat::Json => self.json(resume),
            OutputFormat::Quiet => {
                for row in resume.sections.iter().flat_map(|s| &s.rows) {
                    println!("{}", row.title);
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// Indented outline; folded blocks show `▸` and hide their children
fn outline_lines(
    model: &ContentModel,
    parent: &BlockPath,
    blocks: &[Block],
    depth: usize,
) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, block) in blocks.iter().enumerate() {
        let path = parent.child(i);
        let folded = model.is_folded(&path) && !block.children.is_empty();
        let bullet = if folded { "▸" } else { "•" };

        let mut line = format!("{}{} {}", "  ".repeat(depth), bullet, block.text);
        if let Some(meta) = &block.meta {
            line.push_str(&format!(" ({})", meta));
        }
        if !block.tags.is_empty() {
            line.push_str(&format!("  {}", hashtags(&block.tags)));
        }
        if folded {
            line.push_str(&format!("  [{} hidden]", block.children.len()));
        }
        lines.push(line);

        if !folded {
            lines.extend(outline_lines(model, &path, &block.children, depth + 1));
        }
    }
    lines
}

fn dashboard_lines(dashboard: &Dashboard<'_>) -> Vec<String> {
    let profile = dashboard.profile;
    let mut lines = vec![profile.title.clone()];
    if !profile.tagline.is_empty() {
        lines.push(profile.tagline.clone());
    }
    for link in &profile.links {
        lines.push(format!("  {} <{}>", link.label, link.href));
    }

    lines.push(String::new());
    lines.push(format!(
        "Recent articles ({} shown · {} total)",
        dashboard.recent.len(),
        dashboard.published_total
    ));
    for article in &dashboard.recent {
        let date = if article.date.is_empty() { "-" } else { article.date.as_str() };
        lines.push(format!("  {:<10} {}", date, truncate(&article.title, 50)));
    }

    lines.push(String::new());
    lines.push(format!("Resume ({} entries)", dashboard.resume_entries));
    for row in &dashboard.resume_teaser {
        if row.meta.is_empty() {
            lines.push(format!("  {}", row.title));
        } else {
            lines.push(format!("  {}  ({})", row.title, row.meta));
        }
    }
    lines
}

fn hashtags(tags: &[String]) -> String {
    tags.iter()
        .map(|t| format!("#{}", t))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Truncate a string to max length, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use margins_core::{ContentStore, SiteState};
    use tempfile::TempDir;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
        assert_eq!(truncate("résumé résumé", 8), "résum...");
    }

    #[test]
    fn test_dashboard_lines() {
        let dir = TempDir::new().unwrap();
        let mut state = SiteState::default();
        state.profile.title = "Mark".to_string();
        state.profile.tagline = "Notes in the margins".to_string();
        let mut article = Article::new("hello", "Hello");
        article.date = "2024-03-01".to_string();
        state.blocks.articles = vec![article];
        let model = ContentModel::new(state, ContentStore::new(dir.path(), "site"));

        let lines = dashboard_lines(&model.dashboard());
        assert_eq!(lines[0], "Mark");
        assert_eq!(lines[1], "Notes in the margins");
        assert!(lines.contains(&"Recent articles (1 shown · 1 total)".to_string()));
        assert!(lines.contains(&"  2024-03-01 Hello".to_string()));
        assert_eq!(lines.last().map(String::as_str), Some("Resume (0 entries)"));
    }

    #[test]
    fn test_outline_hides_folded_children() {
        let dir = TempDir::new().unwrap();
        let mut state = SiteState::default();
        state.pages = vec![Page::new("notes", "Notes")];
        state.blocks.forests.insert(
            "notes".to_string(),
            vec![Block::new("Parent")
                .with_tags(["a"])
                .with_children(vec![Block::new("Child")])],
        );
        let mut model = ContentModel::new(state, ContentStore::new(dir.path(), "site"));
        let root = BlockPath::new("notes", Vec::new());

        let lines = outline_lines(&model, &root, model.blocks_for("notes"), 0);
        assert_eq!(lines, vec!["• Parent  #a", "  • Child"]);

        model.toggle_fold(&"notes/0".parse().unwrap());
        let lines = outline_lines(&model, &root, model.blocks_for("notes"), 0);
        assert_eq!(lines, vec!["▸ Parent  #a  [1 hidden]"]);
    }
}
