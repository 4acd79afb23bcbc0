use hearth_schema::ChatMessage;
use std::collections::VecDeque;

/// Default number of entries kept (ten user/assistant turns).
pub const DEFAULT_MAX_CONTEXT_ENTRIES: usize = 20;

/// Bounded conversation history, trimmed oldest-first.
#[derive(Debug, Clone)]
pub struct ConversationContext {
    entries: VecDeque<ChatMessage>,
    max_entries: usize,
}

impl Default for ConversationContext {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONTEXT_ENTRIES)
    }
}

impl ConversationContext {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_entries.saturating_add(2)),
            max_entries,
        }
    }

    /// Appends one user/assistant turn and drops the oldest entries beyond the cap.
    pub fn push_turn(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        self.entries.push_back(ChatMessage::user(user));
        self.entries.push_back(ChatMessage::assistant(assistant));

        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    pub fn snapshot(&self) -> Vec<ChatMessage> {
        self.entries.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
