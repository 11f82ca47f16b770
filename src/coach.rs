//! Coach component: one short improvement tip from a user's recent entries

use tracing::warn;

use crate::config::CoachConfig;
use crate::llm::{ChatMessage, LlmClient};
use crate::types::Entry;

/// How many of the newest entries feed one tip
pub const RECENT_WINDOW: usize = 5;

/// Fixed reply when a user has no history yet
pub const NO_HISTORY_TIP: &str = "Log more entries to get AI coaching!";

/// Produces a natural-language coaching tip from recent retrospective entries.
///
/// Tip generation is deliberately infallible from the caller's point of view:
/// any model failure comes back as a readable string so a failed tip can never
/// roll back or hide a successful save. That includes construction: when the
/// client cannot be built at all (no API key stored yet), the coach still
/// exists and answers with an error-string tip instead.
pub struct Coach {
    client: Result<LlmClient, String>,
    model: String,
    max_tokens: u32,
}

impl Coach {
    pub fn new(client: LlmClient, config: &CoachConfig) -> Self {
        Self::with_client(Ok(client), config)
    }

    /// Build the coach from config. Never fails: a missing API key or client
    /// build error is remembered and surfaced per-tip.
    pub fn from_config(config: &CoachConfig) -> Self {
        match LlmClient::from_config(config) {
            Ok(client) => Self::with_client(Ok(client), config),
            Err(e) => {
                warn!("Coach client unavailable: {:#}", e);
                Self::with_client(Err(format!("{e:#}")), config)
            }
        }
    }

    pub(crate) fn with_client(client: Result<LlmClient, String>, config: &CoachConfig) -> Self {
        Self {
            client,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        }
    }

    /// Generate one tip for `user` from their newest-first history.
    ///
    /// Uses at most the first [`RECENT_WINDOW`] entries. An empty history
    /// returns [`NO_HISTORY_TIP`] without touching the network.
    pub async fn generate_tip(&self, recent: &[Entry], user: &str) -> String {
        if recent.is_empty() {
            return NO_HISTORY_TIP.to_string();
        }

        let client = match &self.client {
            Ok(client) => client,
            Err(reason) => return format!("AI Error: Client not connected: {reason}"),
        };

        let prompt = build_prompt(recent, user);
        let messages = vec![ChatMessage::user(prompt)];

        match client.complete(&self.model, messages, Some(self.max_tokens)).await {
            Ok(tip) => tip,
            Err(e) => {
                warn!("Coach request failed for {}: {:#}", user, e);
                format!("AI Connection Error: {e:#}")
            }
        }
    }
}

/// Build the coaching prompt from at most [`RECENT_WINDOW`] entries.
///
/// Entry text is embedded verbatim; the entries are free-form notes from the
/// user's own team, not untrusted input.
fn build_prompt(recent: &[Entry], user: &str) -> String {
    let mut history_text = String::new();
    for entry in recent.iter().take(RECENT_WINDOW) {
        history_text.push_str(&format!(
            "- Date: {}\n  Went Wrong: {}\n  Went Right: {}\n\n",
            entry.date, entry.went_wrong, entry.went_right,
        ));
    }

    format!(
        "You are an expert Agile Team Coach.\n\
         Analyze these recent AARs for user {user}:\n\n\
         {history_text}\n\
         TASK:\n\
         Identify the underlying pattern of what is going wrong.\n\
         Provide ONE specific, actionable, and short tip (under 50 words) \
         to help them improve tomorrow."
    )
}
