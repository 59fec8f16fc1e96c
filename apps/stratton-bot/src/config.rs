use anyhow::{Context, Result};
use std::env;
use std::fmt;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";
pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_SPEECH_API_URL: &str = "https://speech.googleapis.com/v1";
pub const DEFAULT_SPEECH_LANGUAGE: &str = "ru-RU";
pub const DEFAULT_STRIPE_API_URL: &str = "https://api.stripe.com/v1";
pub const DEFAULT_PAYMENT_CURRENCY: &str = "usd";

#[derive(Clone)]
pub struct BotConfig {
    pub bot_token: String,
    /// Used to build the `t.me` redirect links. Resolved with `getMe` when unset.
    pub bot_username: Option<String>,
    pub stripe_secret_key: String,
    pub stripe_api_url: String,
    pub payment_currency: String,
    pub gemini_api_key: String,
    pub gemini_api_url: String,
    pub gemini_model: String,
    pub speech_api_key: String,
    pub speech_api_url: String,
    pub speech_language: String,
}

impl BotConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("{} is not set", key))
        };
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or_default =
            |key: &str, default: &str| optional(key).unwrap_or_else(|| default.to_string());

        let gemini_api_key = required("GEMINI_API_KEY")?;

        Ok(Self {
            bot_token: required("BOT_TOKEN")?,
            bot_username: optional("BOT_USERNAME").map(|u| u.trim_start_matches('@').to_string()),
            stripe_secret_key: required("STRIPE_API_KEY")?,
            stripe_api_url: or_default("STRIPE_API_URL", DEFAULT_STRIPE_API_URL),
            payment_currency: or_default("PAYMENT_CURRENCY", DEFAULT_PAYMENT_CURRENCY)
                .to_lowercase(),
            speech_api_key: optional("SPEECH_API_KEY").unwrap_or_else(|| gemini_api_key.clone()),
            speech_api_url: or_default("SPEECH_API_URL", DEFAULT_SPEECH_API_URL),
            speech_language: or_default("SPEECH_LANGUAGE", DEFAULT_SPEECH_LANGUAGE),
            gemini_api_url: or_default("GEMINI_API_URL", DEFAULT_GEMINI_API_URL),
            gemini_model: or_default("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
            gemini_api_key,
        })
    }
}

// Secrets stay out of the logs.
impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("bot_token", &"***")
            .field("bot_username", &self.bot_username)
            .field("stripe_secret_key", &"***")
            .field("stripe_api_url", &self.stripe_api_url)
            .field("payment_currency", &self.payment_currency)
            .field("gemini_api_key", &"***")
            .field("gemini_api_url", &self.gemini_api_url)
            .field("gemini_model", &self.gemini_model)
            .field("speech_api_key", &"***")
            .field("speech_api_url", &self.speech_api_url)
            .field("speech_language", &self.speech_language)
            .finish()
    }
}
