pub const CHAT_ERROR_TEXT: &str = "System error, please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatSender {
    User,
    System,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    pub sender: ChatSender,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub result: String,
    pub chat_id: String,
}

/// Newest-first transcript plus the conversation id handed out by the remote.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChatTranscript {
    lines: Vec<ChatLine>,
    chat_id: Option<String>,
}

impl ChatTranscript {
    pub fn push(&mut self, sender: ChatSender, text: impl Into<String>) {
        self.lines.insert(
            0,
            ChatLine {
                sender,
                text: text.into(),
            },
        );
    }

    pub fn set_chat_id(&mut self, chat_id: String) {
        self.chat_id = Some(chat_id);
    }

    pub fn chat_id(&self) -> Option<&str> {
        self.chat_id.as_deref()
    }

    pub fn lines(&self) -> &[ChatLine] {
        &self.lines
    }
}
