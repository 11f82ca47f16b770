//! CLI interface for team-aar

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;

use crate::coach::{Coach, RECENT_WINDOW};
use crate::config::{Config, StorageBackend};
use crate::store::{open_store, RecordStore};
use crate::types::Entry;

#[derive(Parser)]
#[command(name = "team-aar")]
#[command(about = "Team retrospective (AAR) logger with AI coaching", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web UI
    Serve {
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,
    },
    /// Log one retrospective entry and get a coaching tip
    Log {
        /// Who is logging (must be on the roster)
        #[arg(short, long)]
        user: String,
        /// What went right
        #[arg(short = 'r', long, default_value = "")]
        right: String,
        /// What went wrong
        #[arg(short = 'w', long, default_value = "")]
        wrong: String,
        /// What to do differently next time
        #[arg(short = 'n', long, default_value = "")]
        next: String,
        /// Skip the coaching tip after saving
        #[arg(long)]
        no_tip: bool,
    },
    /// Show logged entries, newest first
    History {
        /// Only show entries for this user
        #[arg(short, long)]
        user: Option<String>,
        /// Maximum entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Get a coaching tip from a user's stored history
    Tip {
        /// Whose history to coach on
        #[arg(short, long)]
        user: String,
    },
    /// Initialize the configured storage backend (idempotent)
    Init,
    /// Configure the tool
    Config {
        /// Set the LLM API key
        #[arg(long)]
        set_api_key: Option<String>,
        /// Set the Sheets bearer token
        #[arg(long)]
        set_sheets_token: Option<String>,
        /// Select the storage backend: sqlite or sheets
        #[arg(long)]
        backend: Option<String>,
        /// Set the spreadsheet document id
        #[arg(long)]
        set_spreadsheet_id: Option<String>,
        /// Set the coach model id
        #[arg(long)]
        set_model: Option<String>,
        /// Replace the roster (comma-separated names)
        #[arg(long)]
        set_roster: Option<String>,
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

/// Run the CLI
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, host } => {
            let config = Arc::new(Config::load()?);
            let store = open_store(&config).await?;
            if let Err(e) = store.ensure_initialized().await {
                tracing::warn!("Could not initialize storage backend: {}", e);
            }
            let coach = Arc::new(Coach::from_config(&config.coach));

            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            crate::server::start(&host, port, config, store, coach).await
        }
        Commands::Log { user, right, wrong, next, no_tip } => {
            log_entry(&user, &right, &wrong, &next, no_tip).await
        }
        Commands::History { user, limit } => show_history(user.as_deref(), limit).await,
        Commands::Tip { user } => show_tip(&user).await,
        Commands::Init => {
            let config = Config::load()?;
            let store = open_store(&config).await?;
            store.ensure_initialized().await?;
            println!("Storage backend '{}' initialized.", config.storage.backend);
            Ok(())
        }
        Commands::Config {
            set_api_key,
            set_sheets_token,
            backend,
            set_spreadsheet_id,
            set_model,
            set_roster,
            show,
        } => {
            if let Some(key) = set_api_key {
                crate::secrets::set_api_key(&key)?;
                println!("LLM API key stored securely.");
            }
            if let Some(token) = set_sheets_token {
                crate::secrets::set_sheets_token(&token)?;
                println!("Sheets token stored securely.");
            }
            if let Some(name) = backend {
                let backend = match name.as_str() {
                    "sqlite" => StorageBackend::Sqlite,
                    "sheets" => StorageBackend::Sheets,
                    other => anyhow::bail!("Unknown backend '{}'. Use 'sqlite' or 'sheets'.", other),
                };
                crate::config::set_backend(backend)?;
            }
            if let Some(id) = set_spreadsheet_id {
                crate::config::set_spreadsheet_id(&id)?;
            }
            if let Some(model) = set_model {
                crate::config::set_model(&model)?;
            }
            if let Some(names) = set_roster {
                crate::config::set_roster(&names)?;
            }
            if show {
                crate::config::show_config()?;
            }
            Ok(())
        }
    }
}

/// Append one entry, then print the coaching tip (unless suppressed)
async fn log_entry(user: &str, right: &str, wrong: &str, next: &str, no_tip: bool) -> Result<()> {
    let config = Config::load()?;

    if !config.is_roster_member(user) {
        anyhow::bail!(
            "'{}' is not on the roster ({}). Use 'team-aar config --set-roster' to change it.",
            user,
            config.roster.join(", ")
        );
    }

    let entry = Entry::now(user, right, wrong, next);
    if entry.is_blank() {
        anyhow::bail!("Please fill out at least one of --right / --wrong.");
    }

    let store = open_store(&config).await?;
    store.ensure_initialized().await?;
    store.append(entry).await?;
    println!("✅ Entry saved.");

    if no_tip {
        return Ok(());
    }

    // Tip failures print a message; the save above already succeeded
    let tip = coach_tip(&config, store, user).await;
    println!("\n💡 AI Coach: {}", tip);
    Ok(())
}

/// Print the history table, newest first
async fn show_history(user: Option<&str>, limit: usize) -> Result<()> {
    let config = Config::load()?;
    let store = open_store(&config).await?;

    let entries = match store.load(user).await {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("❌ Could not load history: {}", e);
            return Ok(());
        }
    };

    if entries.is_empty() {
        println!("No records found yet.");
        return Ok(());
    }

    println!(
        "{:<12} {:<10} {:<10} {:<24} {:<24} {:<24}",
        "Date", "Time", "User", "Went Right", "Went Wrong", "Next Steps"
    );
    for entry in entries.iter().take(limit) {
        println!(
            "{:<12} {:<10} {:<10} {:<24} {:<24} {:<24}",
            entry.date,
            entry.time.format("%H:%M:%S"),
            entry.user,
            truncate(&entry.went_right, 24),
            truncate(&entry.went_wrong, 24),
            truncate(&entry.next_steps, 24),
        );
    }
    Ok(())
}

/// Print a coaching tip from stored history only
async fn show_tip(user: &str) -> Result<()> {
    let config = Config::load()?;
    let store = open_store(&config).await?;
    let tip = coach_tip(&config, store, user).await;
    println!("💡 AI Coach: {}", tip);
    Ok(())
}

/// Never fails: coaching problems come back as the tip text itself.
async fn coach_tip(config: &Config, store: Arc<dyn RecordStore>, user: &str) -> String {
    let coach = Coach::from_config(&config.coach);
    let history = match store.load(Some(user)).await {
        Ok(history) => history,
        Err(e) => return format!("History could not be loaded for coaching: {e}"),
    };
    let window = &history[..history.len().min(RECENT_WINDOW)];
    coach.generate_tip(window, user).await
}

/// Shorten a cell to fit the history table
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", cut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 24), "short");
        let long = "a".repeat(30);
        let cut = truncate(&long, 24);
        assert_eq!(cut.chars().count(), 24);
        assert!(cut.ends_with('…'));
    }
}
