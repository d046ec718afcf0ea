//! Telegram update handlers.
//!
//! Thin by design: reduce the update to (chat, text), serialize per chat,
//! ask the core for the reply, hand it back to the messenger.

use std::sync::Arc;

use teloxide::{prelude::*, types::Message};

use etb_core::domain::ChatId;

use crate::router::AppState;

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    // Photos, stickers, voice notes: not our department. Ignore silently.
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let chat_id = msg.chat.id.0;

    // One command fully processed before the next for the same chat.
    let _guard = state.chat_locks.lock_chat(chat_id).await;

    let reply = state.processor.handle(ChatId(chat_id), text);

    // Delivery is fire-and-forget from the core's perspective; a failed send
    // never affects ledger state.
    if let Err(e) = state.messenger.send_text(ChatId(chat_id), &reply).await {
        eprintln!("send failed for chat {chat_id}: {e}");
    }

    Ok(())
}
