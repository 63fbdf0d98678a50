#[cfg(test)]
#[path = "transcript_test.rs"]
mod tests;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::Author;
use super::Message;

pub const GREETING: &str = "👋 Hi! I'm **Faiz**, your AI companion. How can I help you?";

/// The ordered conversation history exchanged with the model. Append-only for
/// the life of a session, except for `clear()` which drops everything back to
/// the seeded greeting.
#[derive(Clone, Serialize, Deserialize)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Default for Transcript {
    fn default() -> Transcript {
        return Transcript {
            messages: vec![Message::new(Author::Assistant, GREETING)],
        };
    }
}

impl Transcript {
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn clear(&mut self) {
        self.messages = Transcript::default().messages;
    }

    pub fn all(&self) -> &[Message] {
        return &self.messages;
    }

    pub fn len(&self) -> usize {
        return self.messages.len();
    }
}
