use herald_types::S_WHATSAPP_NET;

use crate::error::{NewsletterError, Result};

pub const DEFAULT_DECRYPT_CONCURRENCY: usize = 16;

/// Adapter settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsletterConfig {
    /// Routing address for tunneled queries and typed history fetches.
    pub server_jid: String,
    /// Upper bound on posts decrypted at once while parsing a history batch.
    pub decrypt_concurrency: usize,
}

impl Default for NewsletterConfig {
    fn default() -> Self {
        Self {
            server_jid: S_WHATSAPP_NET.to_string(),
            decrypt_concurrency: DEFAULT_DECRYPT_CONCURRENCY,
        }
    }
}

impl NewsletterConfig {
    /// Reads `HERALD_SERVER_JID` and `HERALD_DECRYPT_CONCURRENCY`, loading
    /// `.env` first if one exists. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(jid) = lookup("HERALD_SERVER_JID") {
            if jid.trim().is_empty() {
                return Err(NewsletterError::invalid("HERALD_SERVER_JID is empty"));
            }
            config.server_jid = jid;
        }

        if let Some(raw) = lookup("HERALD_DECRYPT_CONCURRENCY") {
            config.decrypt_concurrency = match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(NewsletterError::invalid(format!(
                        "HERALD_DECRYPT_CONCURRENCY must be a positive integer, got '{}'",
                        raw
                    )));
                }
            };
        }

        Ok(config)
    }
}
