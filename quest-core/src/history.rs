//! Rolling prompt context sent to the model.

use groq::Message;

/// Maximum number of messages kept in the rolling window.
const MAX_MESSAGES: usize = 10;

/// Conversation history with a fixed-size sliding window.
///
/// When the window overflows, the oldest non-leading entries are dropped:
/// the first message (the system prompt) always survives truncation. Older
/// turns vanish silently, so the model only remembers the system prompt
/// plus the most recent exchanges. This is a window, not a summary.
#[derive(Debug, Clone, Default)]
pub struct History {
    messages: Vec<Message>,
}

impl History {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Append a message, then trim back to the window size.
    pub fn record(&mut self, message: Message) {
        self.messages.push(message);
        if self.messages.len() > MAX_MESSAGES {
            let tail_start = self.messages.len() - (MAX_MESSAGES - 1);
            self.messages.drain(1..tail_start);
        }
    }

    /// The messages to send on the next API call.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
