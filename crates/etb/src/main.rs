use std::sync::Arc;

use etb_core::{config::Config, ledger::LedgerStore};

#[tokio::main]
async fn main() -> Result<(), etb_core::Error> {
    etb_core::logging::init("etb")?;

    let cfg = Arc::new(Config::load()?);
    let store = Arc::new(LedgerStore::new());

    etb_telegram::router::run_polling(cfg, store)
        .await
        .map_err(|e| etb_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
