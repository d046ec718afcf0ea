use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef},
    Result,
};

/// Cross-messenger port.
///
/// Telegram is the first implementation; the core hands a reply string plus
/// the conversation id to this trait and never awaits delivery semantics
/// beyond the `Result` (fire-and-forget from the ledger's perspective).
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef>;
}
