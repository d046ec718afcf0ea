use std::{collections::HashMap, sync::Arc};

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use tokio::sync::{Mutex, OwnedMutexGuard};

use etb_core::{
    commands::CommandProcessor, config::Config, ledger::LedgerStore,
    messaging::port::MessagingPort,
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub processor: Arc<CommandProcessor>,
    pub messenger: Arc<dyn MessagingPort>,
    pub chat_locks: Arc<ChatLocks>,
}

/// Per-chat serialization: if the runtime delivers two updates from the same
/// chat concurrently, the second waits for the first to finish.
#[derive(Default)]
pub struct ChatLocks {
    inner: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl ChatLocks {
    pub async fn lock_chat(&self, chat_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            map.entry(chat_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

pub async fn run_polling(cfg: Arc<Config>, store: Arc<LedgerStore>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    // Resolve our own identity once: /invite needs it, and it makes a nicer
    // startup line. Best-effort; the bot still runs without it.
    let invite_link = match bot.get_me().await {
        Ok(me) => {
            println!("etb started: @{}", me.username());
            Some(format!("https://t.me/{}", me.username()))
        }
        Err(e) => {
            eprintln!("getMe failed, /invite will be degraded: {e}");
            None
        }
    };
    println!(
        "Budget tracking: {}",
        if cfg.budget_tracking { "on" } else { "off" }
    );

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let processor = Arc::new(CommandProcessor::new(cfg.clone(), store, invite_link));

    let state = Arc::new(AppState {
        cfg,
        processor,
        messenger,
        chat_locks: Arc::new(ChatLocks::default()),
    });

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}
