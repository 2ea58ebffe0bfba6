/// A chat message delivered by the host event source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageReceived {
    pub message_id: u64,
    pub author_id: u64,
    pub author_is_bot: bool,
    pub channel_id: u64,
    pub content: String,
}

impl MessageReceived {
    pub fn new(message_id: u64, author_id: u64, channel_id: u64, content: impl Into<String>) -> Self {
        Self {
            message_id,
            author_id,
            author_is_bot: false,
            channel_id,
            content: content.into(),
        }
    }

    pub fn from_bot(mut self) -> Self {
        self.author_is_bot = true;
        self
    }
}
