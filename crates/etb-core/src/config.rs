use std::{env, fs, path::Path};

use crate::{errors::Error, Result};

/// Typed configuration for the bot.
///
/// Everything comes from the environment (with an optional `.env` file); the
/// core itself never reads env vars outside `Config::load`.
#[derive(Clone, Debug)]
pub struct Config {
    pub telegram_bot_token: String,

    /// Enables `/money`, `/balance` and the budget alert lines appended to
    /// mutation confirmations. Off, the bot is a plain expense logger.
    pub budget_tracking: bool,

    /// Prefix used by all currency formatting. Constant per deployment.
    pub currency_symbol: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let telegram_bot_token = env_str("TELEGRAM_BOT_TOKEN").unwrap_or_default();
        if telegram_bot_token.trim().is_empty() {
            return Err(Error::Config(
                "TELEGRAM_BOT_TOKEN environment variable is required".to_string(),
            ));
        }

        let budget_tracking = env_bool("BUDGET_TRACKING").unwrap_or(true);
        let currency_symbol = env_str("CURRENCY_SYMBOL")
            .and_then(non_empty)
            .unwrap_or_else(|| "₹".to_string());

        Ok(Self {
            telegram_bot_token,
            budget_tracking,
            currency_symbol,
        })
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_bool(key: &str) -> Option<bool> {
    env_str(key).map(|s| {
        matches!(
            s.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
