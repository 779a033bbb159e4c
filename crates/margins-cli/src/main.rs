//! Margins CLI
//!
//! Command-line interface for Margins - sync, browse and export a personal
//! site of articles, notes and pages.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use margins_core::Config;

mod commands;
mod output;

use commands::export::ExportKind;
use commands::Session;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "margins")]
#[command(about = "Margins - a personal site of articles, notes and pages")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile the cache with the content source
    Sync {
        /// Refetch everything regardless of version
        #[arg(long)]
        force: bool,
    },
    /// List pages in navigation order
    Pages,
    /// Show a page
    Page {
        /// Page id (e.g. notes, resume, about)
        id: String,
        /// Print the HTML fragment instead of text
        #[arg(long)]
        html: bool,
    },
    /// List articles
    Articles {
        /// Include drafts regardless of the drafts setting
        #[arg(long)]
        drafts: bool,
    },
    /// Show an article, loading its body on first view
    Article {
        /// Article id or slug
        id: String,
        /// Print the full HTML view
        #[arg(long)]
        html: bool,
    },
    /// List articles with a tag
    Tag {
        /// Tag name (with or without '#')
        tag: String,
    },
    /// List all tags with counts
    Tags,
    /// Show blocks linking to a page
    Backlinks {
        /// Page id
        page: String,
    },
    /// Search blocks and articles ('#tag' lists a tag)
    Search {
        /// Search text
        query: String,
    },
    /// Resolve a fragment route (e.g. '#/a/hello-world')
    Route {
        /// Route fragment
        fragment: String,
        /// Print the HTML fragment instead of text
        #[arg(long)]
        html: bool,
    },
    /// Show or hide drafts in lists
    Drafts {
        /// on or off
        value: String,
    },
    /// Fold or unfold a block
    Fold {
        /// Block path (e.g. notes/0/1)
        path: String,
    },
    /// Add a note to the notes page
    Note {
        /// Note text
        text: String,
        /// Tags for the note
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },
    /// Save an article to notes
    SaveNote {
        /// Article id or slug
        id: String,
    },
    /// Show or change the theme
    Theme {
        /// light, dark or toggle
        value: Option<String>,
    },
    /// Export the sitemap, RSS feed or site state
    Export {
        /// What to export
        #[arg(value_enum)]
        kind: ExportKind,
        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Show or modify configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Show cache status
    Status,
    /// Clear the cache slot
    Reset,
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, content_base, refresh_policy, ...)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    // Commands that don't need the content model
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), config_path, &output);
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    init_logging(&config);

    match &cli.command {
        Commands::Status => return commands::status::show(&config, &output),
        Commands::Reset => return commands::sync::reset(&config, &output),
        _ => {}
    }

    config
        .ensure_data_dir()
        .context("Failed to create data directory")?;
    let force = matches!(cli.command, Commands::Sync { force: true });
    let mut session = Session::open(config, force).await?;

    match cli.command {
        Commands::Config { .. } => unreachable!(), // Handled above
        Commands::Status | Commands::Reset => unreachable!(), // Handled above
        Commands::Sync { .. } => commands::sync::sync(&session, &output),
        Commands::Pages => commands::page::list(&session, &output),
        Commands::Page { id, html } => commands::page::show(&session, &id, html, &output),
        Commands::Articles { drafts } => commands::article::list(&session, drafts, &output),
        Commands::Article { id, html } => {
            commands::article::show(&mut session, &id, html, &output).await
        }
        Commands::Tag { tag } => commands::tag::show(&session, &tag, &output),
        Commands::Tags => commands::tag::list(&session, &output),
        Commands::Backlinks { page } => commands::search::backlinks(&session, &page, &output),
        Commands::Search { query } => commands::search::search(&session, &query, &output),
        Commands::Route { fragment, html } => {
            commands::page::route(&mut session, &fragment, html, &output).await
        }
        Commands::Drafts { value } => commands::note::drafts(&mut session, &value, &output),
        Commands::Fold { path } => commands::note::fold(&mut session, &path, &output),
        Commands::Note { text, tags } => commands::note::add(&mut session, &text, tags, &output),
        Commands::SaveNote { id } => {
            commands::article::save_to_notes(&mut session, &id, &output)
        }
        Commands::Theme { value } => {
            commands::note::theme(&mut session, value.as_deref(), &output)
        }
        Commands::Export {
            kind,
            output: out,
        } => commands::export::export(&session, kind, out.as_ref(), &output),
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Initialize logging when MARGINS_LOG is set
///
/// Logs go to `log_file` when configured, stderr otherwise.
/// Set MARGINS_LOG=debug for verbose output.
fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var("MARGINS_LOG") else {
        return;
    };
    let filter = EnvFilter::new(format!(
        "margins_core={},margins_cli={}",
        log_level, log_level
    ));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let file = config.log_file.as_ref().and_then(|path| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| eprintln!("Cannot open log file {}: {}", path.display(), e))
            .ok()
    });

    let _ = match file {
        Some(file) => builder
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init(),
        None => builder.with_writer(std::io::stderr).try_init(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_note_with_tags() {
        let cli = Cli::try_parse_from(["margins", "note", "Buy milk", "-t", "todo", "--tag", "home"])
            .unwrap();
        match cli.command {
            Commands::Note { text, tags } => {
                assert_eq!(text, "Buy milk");
                assert_eq!(tags, vec!["todo", "home"]);
            }
            _ => panic!("expected note command"),
        }
    }

    #[test]
    fn test_parse_global_flags_after_command() {
        let cli = Cli::try_parse_from(["margins", "export", "rss", "--json", "-o", "feed.xml"])
            .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Export { kind, output } => {
                assert_eq!(kind, ExportKind::Rss);
                assert_eq!(output, Some(PathBuf::from("feed.xml")));
            }
            _ => panic!("expected export command"),
        }
    }
}
