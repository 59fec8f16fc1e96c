use dotenvy::dotenv;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod bot;
mod config;
mod error;
mod services;
mod state;

use crate::bot::router::Router;
use crate::config::BotConfig;
use crate::services::audio_service::OggOpusDecoder;
use crate::services::catalog_service::{default_plans, PlanCatalog};
use crate::services::gemini_service::GeminiClient;
use crate::services::pay_service::{PayService, StripeGateway};
use crate::services::speech_service::GoogleSpeechClient;
use crate::services::subscription_service::InMemorySubscriptionStore;
use crate::services::voice_service::VoiceRelay;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stratton_bot=info,teloxide=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Stratton Bot...");

    let config = BotConfig::from_env()?;
    tracing::debug!("Loaded config: {:?}", config);

    let bot = Bot::new(&config.bot_token);
    let bot_username = bot::resolve_username(&bot, config.bot_username.clone()).await?;

    let catalog = Arc::new(PlanCatalog::new(default_plans())?);
    let store = Arc::new(InMemorySubscriptionStore::new(catalog.clone()));

    let gateway = Arc::new(StripeGateway::new(
        config.stripe_api_url.clone(),
        config.stripe_secret_key.clone(),
    ));
    let pay_service = PayService::new(
        catalog.clone(),
        gateway,
        bot_username,
        config.payment_currency.clone(),
    );

    let voice = VoiceRelay::new(
        store.clone(),
        Arc::new(OggOpusDecoder),
        Arc::new(GoogleSpeechClient::new(
            config.speech_api_url.clone(),
            config.speech_api_key.clone(),
        )),
        Arc::new(GeminiClient::new(
            config.gemini_api_url.clone(),
            config.gemini_model.clone(),
            config.gemini_api_key.clone(),
        )),
        config.speech_language.clone(),
    );

    let state = AppState {
        router: Router::new(catalog, store, pay_service),
        voice,
    };

    let (tx, rx) = tokio::sync::broadcast::channel(1);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = tx.send(());
        }
    });

    bot::run_bot(bot, rx, state).await;
    Ok(())
}
