//! Conversation memory for the tutor agent.
//!
//! A [`ConversationMemory`] is an append-only buffer of user/assistant turns
//! stored under a memory key. The [`MemoryStore`] hands out memories:
//!
//! - callers that do not name a session all share one memory, keyed by the
//!   configured memory key (`chat_history` by default), for the life of the
//!   process;
//! - callers that send a `session_id` get a memory of their own, created on
//!   first use. At most `max_sessions` are kept; the least recently used one
//!   is dropped to make room.
//!
//! Locks are only held to snapshot or append. Two requests running against the
//! same memory can both snapshot before either appends, so their turns
//! interleave in completion order.

use crate::types::{Message, MessageRole};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Default key of the shared memory.
pub const DEFAULT_MEMORY_KEY: &str = "chat_history";

/// Default number of session memories kept at once.
pub const DEFAULT_MAX_SESSIONS: usize = 1024;

/// Ordered history of exchanges under a single memory key.
#[derive(Debug)]
pub struct ConversationMemory {
    key: String,
    messages: Mutex<Vec<Message>>,
}

impl ConversationMemory {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            messages: Mutex::new(Vec::new()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Snapshot of the history as it is right now.
    pub fn load(&self) -> Vec<Message> {
        self.messages.lock().clone()
    }

    /// Append one user prompt and the answer it received.
    pub fn save_exchange(&self, prompt: &str, answer: &str) {
        let mut messages = self.messages.lock();
        messages.push(Message::new(MessageRole::User, prompt));
        messages.push(Message::new(MessageRole::Assistant, answer));
    }

    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }
}

/// Hands out the shared memory and per-session memories.
pub struct MemoryStore {
    shared: Arc<ConversationMemory>,
    sessions: Mutex<LruCache<String, Arc<ConversationMemory>>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_KEY, DEFAULT_MAX_SESSIONS)
    }
}

impl MemoryStore {
    /// `max_sessions` of zero is treated as one.
    pub fn new(shared_key: impl Into<String>, max_sessions: usize) -> Self {
        let capacity = NonZeroUsize::new(max_sessions).unwrap_or(NonZeroUsize::MIN);
        Self {
            shared: Arc::new(ConversationMemory::new(shared_key)),
            sessions: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// The process-wide memory used by callers without a session.
    pub fn shared(&self) -> Arc<ConversationMemory> {
        self.shared.clone()
    }

    /// Memory for `session_id`, or the shared memory when there is none.
    pub fn resolve(&self, session_id: Option<&str>) -> Arc<ConversationMemory> {
        match session_id {
            Some(id) => self.session(id),
            None => self.shared(),
        }
    }

    /// Memory of a named session, created on first use. Creating a session
    /// when the store is full forgets the least recently used one.
    pub fn session(&self, session_id: &str) -> Arc<ConversationMemory> {
        let mut sessions = self.sessions.lock();
        if let Some(memory) = sessions.get(session_id) {
            return memory.clone();
        }

        let memory = Arc::new(ConversationMemory::new(session_id));
        if let Some((_, evicted)) = sessions.push(session_id.to_string(), memory.clone()) {
            tracing::debug!(
                max_sessions = sessions.cap().get(),
                evicted_messages = evicted.len(),
                "Evicted least recently used session memory"
            );
        }
        memory
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn max_sessions(&self) -> usize {
        self.sessions.lock().cap().get()
    }
}
