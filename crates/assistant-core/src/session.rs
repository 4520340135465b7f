//! Session Management
//!
//! A session owns the visible conversation history and runs exactly one
//! agent turn per user submission.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::message::{Conversation, Message};
use crate::reasoning::{Agent, TurnOutcome, TurnReport};

/// Unique session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A chat session
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier
    pub id: SessionId,

    /// User and assistant turns, oldest first
    pub conversation: Conversation,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last activity timestamp
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a new session
    pub fn new() -> Self {
        Self::with_id(SessionId::new())
    }

    /// Create with specific ID
    pub fn with_id(id: SessionId) -> Self {
        let now = Utc::now();
        Self {
            id,
            conversation: Conversation::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Update the activity timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Run one turn and record it
    ///
    /// The input is trimmed first. Blank input is ignored and returns `None`.
    /// Provider failures do not escape: they become an
    /// `"I encountered an error: ..."` answer recorded like any other.
    pub async fn submit(&mut self, agent: &Agent, input: &str) -> Option<TurnReport> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        let report = match agent.respond(input, &self.conversation).await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(session = %self.id, error = %e, "Turn failed");
                TurnReport {
                    answer: format!("I encountered an error: {e}"),
                    outcome: TurnOutcome::Failed,
                    steps: Vec::new(),
                    llm_calls: 0,
                }
            }
        };

        self.conversation.push(Message::user(input));
        self.conversation.push(Message::assistant(&report.answer));
        self.touch();

        Some(report)
    }

    /// Drop every recorded turn
    pub fn clear(&mut self) {
        self.conversation = Conversation::new();
        self.touch();
    }

    /// Get the first user message as a title
    pub fn title(&self) -> String {
        self.conversation
            .turns()
            .find(|m| m.role == crate::message::Role::User)
            .map_or_else(
                || format!("Session {}", self.id.as_str().chars().take(8).collect::<String>()),
                |m| {
                    let preview: String = m.content.chars().take(50).collect();
                    if m.content.chars().count() > 50 {
                        format!("{preview}...")
                    } else {
                        preview
                    }
                },
            )
    }

    /// Message count
    pub fn message_count(&self) -> usize {
        self.conversation.len()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
