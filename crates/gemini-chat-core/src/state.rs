//! UI-agnostic conversation state
//!
//! The transcript shown by any front end is a [`Conversation`]: an append-only
//! list of [`MessageEntry`] values kept in memory for the session only.

/// One item in the chat transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageEntry {
    /// Text the user submitted, exactly as typed
    User { text: String },
    /// A reply (or error notice) and the local time it was recorded
    Bot { text: String, timestamp: String },
}

impl MessageEntry {
    pub fn user(text: impl Into<String>) -> Self {
        MessageEntry::User { text: text.into() }
    }

    pub fn bot(text: impl Into<String>, timestamp: impl Into<String>) -> Self {
        MessageEntry::Bot {
            text: text.into(),
            timestamp: timestamp.into(),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            MessageEntry::User { text } | MessageEntry::Bot { text, .. } => text,
        }
    }

    pub fn timestamp(&self) -> Option<&str> {
        match self {
            MessageEntry::User { .. } => None,
            MessageEntry::Bot { timestamp, .. } => Some(timestamp),
        }
    }

    pub fn is_user(&self) -> bool {
        matches!(self, MessageEntry::User { .. })
    }
}

/// Ordered, append-only transcript
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    entries: Vec<MessageEntry>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: MessageEntry) {
        self.entries.push(entry);
    }

    /// All entries in insertion order
    pub fn all(&self) -> &[MessageEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &MessageEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&MessageEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_keeps_insertion_order() {
        let mut conversation = Conversation::new();
        conversation.append(MessageEntry::user("Hi"));
        conversation.append(MessageEntry::bot("Hello!", "3:07:09 PM"));
        conversation.append(MessageEntry::user("How are you?"));

        let texts: Vec<&str> = conversation.all().iter().map(|e| e.text()).collect();
        assert_eq!(texts, vec!["Hi", "Hello!", "How are you?"]);
        assert_eq!(conversation.len(), 3);
        assert!(conversation.last().is_some_and(|e| e.is_user()));
    }

    #[test]
    fn test_new_conversation_is_empty() {
        let conversation = Conversation::new();
        assert!(conversation.is_empty());
        assert!(conversation.all().is_empty());
        assert!(conversation.last().is_none());
    }

    #[test]
    fn test_only_bot_entries_carry_timestamps() {
        let user = MessageEntry::user("Hi");
        let bot = MessageEntry::bot("Hello!", "9:00:00 AM");
        assert_eq!(user.timestamp(), None);
        assert_eq!(bot.timestamp(), Some("9:00:00 AM"));
    }
}
