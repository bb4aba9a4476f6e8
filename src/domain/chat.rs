//! Chat Access and History
//!
//! Enablement tiers for the chat widget and the bounded plain-text history
//! buffer sent along with each chat request.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Chat widget enablement tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatAccess {
    /// Not logged in; chat is locked behind login/registration.
    Guest,
    /// Logged in but the account email is not verified yet.
    Unverified,
    /// Verified account; chat is enabled.
    Active,
}

impl ChatAccess {
    /// Derive the tier from the liveness-check result.
    pub fn for_account(logged_in: bool, verified: bool) -> Self {
        match (logged_in, verified) {
            (false, _) => ChatAccess::Guest,
            (true, false) => ChatAccess::Unverified,
            (true, true) => ChatAccess::Active,
        }
    }

    pub fn can_send(&self) -> bool {
        matches!(self, ChatAccess::Active)
    }
}

/// Speaker of one chat turn. Wire names match the backend contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatRole {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "ai")]
    Ai,
}

/// One plain-text turn of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

/// Bounded buffer of recent turns. The backend receives at most `limit`
/// turns per request; the buffer itself keeps twice that so both sides of
/// the oldest forwarded exchange stay available.
#[derive(Debug, Clone)]
pub struct ChatHistory {
    turns: VecDeque<ChatTurn>,
    limit: usize,
}

impl ChatHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            turns: VecDeque::new(),
            limit,
        }
    }

    /// Record one completed exchange, trimming the oldest turns past the
    /// retention cap.
    pub fn push_exchange(&mut self, user_message: &str, ai_reply: &str) {
        self.turns.push_back(ChatTurn {
            role: ChatRole::User,
            content: user_message.to_string(),
        });
        self.turns.push_back(ChatTurn {
            role: ChatRole::Ai,
            content: ai_reply.to_string(),
        });
        while self.turns.len() > self.limit * 2 {
            self.turns.pop_front();
        }
    }

    /// The most recent turns to forward with the next request.
    pub fn recent(&self) -> Vec<ChatTurn> {
        let skip = self.turns.len().saturating_sub(self.limit);
        self.turns.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
