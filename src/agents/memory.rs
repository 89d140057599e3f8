use std::collections::VecDeque;
use std::sync::Mutex;

use crate::llm::ChatTurn;

/// Bounded conversation buffer shared by every chat request.
///
/// Oldest turns are evicted once `max_turns` is reached.
pub struct ConversationMemory {
    turns: Mutex<VecDeque<ChatTurn>>,
    max_turns: usize,
}

impl ConversationMemory {
    pub fn new(max_turns: usize) -> Self {
        Self {
            turns: Mutex::new(VecDeque::new()),
            max_turns,
        }
    }

    pub fn history(&self) -> Vec<ChatTurn> {
        let turns = self.turns.lock().unwrap_or_else(|e| e.into_inner());
        turns.iter().cloned().collect()
    }

    /// Record one user/assistant exchange.
    pub fn record(&self, user: &str, assistant: &str) {
        let mut turns = self.turns.lock().unwrap_or_else(|e| e.into_inner());
        turns.push_back(ChatTurn::user(user));
        turns.push_back(ChatTurn::assistant(assistant));

        while turns.len() > self.max_turns {
            turns.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.turns.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.turns.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}
