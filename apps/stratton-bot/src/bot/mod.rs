use teloxide::{dptree, prelude::*, types::Update};
use tracing::{error, info};

pub mod deep_link;
pub mod handlers;
pub mod keyboards;
pub mod router;
pub mod screens;
pub mod utils;

/// Resolves the bot's public username, used for the payment redirect links.
pub async fn resolve_username(bot: &Bot, configured: Option<String>) -> anyhow::Result<String> {
    if let Some(username) = configured {
        return Ok(username);
    }

    info!("Bot identity check...");
    let me = bot.get_me().await?;
    let username = me
        .username
        .clone()
        .ok_or_else(|| anyhow::anyhow!("bot account has no username"))?;
    info!("Bot connected as: @{}", username);
    Ok(username)
}

pub async fn run_bot(
    bot: Bot,
    mut shutdown_signal: tokio::sync::broadcast::Receiver<()>,
    state: crate::AppState,
) {
    info!("Starting bot dispatcher...");

    std::panic::set_hook(Box::new(|info| {
        error!("CRITICAL BOT PANIC: {:?}", info);
    }));

    let voice_handler = Update::filter_message()
        .filter(|msg: Message| msg.voice().is_some())
        .endpoint(handlers::voice::voice_handler);
    let message_handler = Update::filter_message().endpoint(handlers::command::message_handler);
    let callback_handler =
        Update::filter_callback_query().endpoint(handlers::callback::callback_handler);

    let mut dispatcher = Dispatcher::builder(
        bot,
        dptree::entry()
            .branch(voice_handler)
            .branch(message_handler)
            .branch(callback_handler),
    )
    .dependencies(dptree::deps![state])
    .default_handler(|upd: std::sync::Arc<Update>| async move {
        info!("Unhandled update: {:?}", upd.kind);
    })
    .build();

    tokio::select! {
        _ = dispatcher.dispatch() => {
            info!("Bot dispatcher exited naturally");
        }
        _ = shutdown_signal.recv() => {
            info!("Bot received shutdown signal, stopping...");
        }
    }
}
