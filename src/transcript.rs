/// A single message in the conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

/// The ordered log of everything said in this session.
///
/// Messages are only ever appended, never reordered or edited; appends go
/// against the current value, so a reply arriving late can only extend the
/// log, not roll it back.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Current messages in append order, for rendering.
    pub fn snapshot(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_transcript() {
        let transcript = Transcript::new();
        assert!(transcript.is_empty());
        assert_eq!(transcript.snapshot().len(), 0);
    }

    #[test]
    fn test_append_preserves_order() {
        let mut transcript = Transcript::new();
        transcript.append(ChatMessage::user("first"));
        transcript.append(ChatMessage::assistant("second"));
        transcript.append(ChatMessage::user("third"));

        let messages = transcript.snapshot();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0], ChatMessage::user("first"));
        assert_eq!(messages[1], ChatMessage::assistant("second"));
        assert_eq!(messages[2], ChatMessage::user("third"));
    }

    #[test]
    fn test_snapshot_length_matches_appends() {
        for n in [0usize, 1, 2, 17] {
            let mut transcript = Transcript::new();
            for i in 0..n {
                transcript.append(ChatMessage::user(format!("message {i}")));
            }
            assert_eq!(transcript.len(), n);
            assert_eq!(transcript.snapshot().len(), n);
        }
    }

    #[test]
    fn test_clone_is_independent() {
        let mut transcript = Transcript::new();
        transcript.append(ChatMessage::user("hello"));

        let frozen = transcript.clone();
        transcript.append(ChatMessage::assistant("hi"));

        assert_eq!(frozen.len(), 1);
        assert_eq!(transcript.len(), 2);
    }
}
