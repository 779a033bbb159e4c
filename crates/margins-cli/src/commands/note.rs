//! Notes and UI state command handlers

use anyhow::{bail, Result};

use margins_core::{BlockPath, Theme};

use super::Session;
use crate::output::Output;

/// Prepend a note to the notes page
pub fn add(session: &mut Session, text: &str, tags: Vec<String>, output: &Output) -> Result<()> {
    let text = text.trim();
    if text.is_empty() {
        bail!("Note text cannot be empty");
    }
    let tags: Vec<String> = tags
        .into_iter()
        .map(|t| t.trim().trim_start_matches('#').to_string())
        .filter(|t| !t.is_empty())
        .collect();

    session.model.append_note(text, tags);
    output.success("Note added");
    Ok(())
}

/// Persist the draft visibility toggle
pub fn drafts(session: &mut Session, value: &str, output: &Output) -> Result<()> {
    let show = match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "show" => true,
        "off" | "false" | "hide" => false,
        other => bail!("Invalid value '{}'. Use 'on' or 'off'.", other),
    };
    session.model.set_show_drafts(show);
    output.success(&format!(
        "Drafts {} ({} in collection)",
        if show { "shown" } else { "hidden" },
        session.model.draft_count()
    ));
    Ok(())
}

/// Toggle the fold flag of a block
pub fn fold(session: &mut Session, path: &str, output: &Output) -> Result<()> {
    let path: BlockPath = path.parse().map_err(anyhow::Error::msg)?;
    match session.model.toggle_fold(&path) {
        Some(true) => output.success(&format!("Folded {}", path)),
        Some(false) => output.success(&format!("Unfolded {}", path)),
        None => bail!("No block at {}", path),
    }
    Ok(())
}

/// Show, set or toggle the theme
pub fn theme(session: &mut Session, value: Option<&str>, output: &Output) -> Result<()> {
    let theme = match value {
        None => {
            output.message(&session.model.theme().to_string());
            return Ok(());
        }
        Some("toggle") => session.model.toggle_theme(),
        Some(name) => {
            let theme: Theme = name.parse().map_err(anyhow::Error::msg)?;
            session.model.set_theme(theme);
            theme
        }
    };
    output.success(&format!("Theme set to {}", theme));
    Ok(())
}
