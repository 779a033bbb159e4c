//! Search and backlink command handlers

use anyhow::Result;

use margins_core::{classify_query, Query};

use super::{tag, Session};
use crate::output::Output;

/// Free-text search; `#tag` switches to the tag view
pub fn search(session: &Session, input: &str, output: &Output) -> Result<()> {
    match classify_query(input) {
        Query::Empty => {
            output.message("Nothing to search for.");
            Ok(())
        }
        Query::Tag(name) => tag::show(session, name, output),
        Query::Text(term) => {
            let hits = session.model.search(term);
            output.print_search(term, &hits);
            Ok(())
        }
    }
}

/// Blocks that link to a page with `[[Title]]`
pub fn backlinks(session: &Session, page: &str, output: &Output) -> Result<()> {
    let page_id = page.to_lowercase();
    let links = session.model.backlinks_for_page(&page_id);
    output.print_backlinks(session.model.page_title(&page_id), &links);
    Ok(())
}
