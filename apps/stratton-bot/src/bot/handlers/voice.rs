use crate::bot::{keyboards, screens};
use crate::error::BotError;
use crate::AppState;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, Voice};
use tracing::{error, info, warn};

/// User-facing text for a failed voice request.
pub fn voice_error_text(e: &BotError) -> &'static str {
    match e {
        BotError::SubscriptionRequired => screens::VOICE_SUBSCRIPTION_REQUIRED,
        BotError::SpeechNotRecognized => screens::VOICE_NOT_RECOGNIZED,
        _ => screens::VOICE_FAILED,
    }
}

/// Resolves the voice file on Telegram's side and downloads it into memory.
async fn fetch_voice(bot: &Bot, voice: &Voice) -> anyhow::Result<Vec<u8>> {
    let file = bot.get_file(voice.file.id.clone()).await?;
    let mut buffer = Vec::new();
    bot.download_file(&file.path, &mut buffer).await?;
    Ok(buffer)
}

pub async fn voice_handler(
    bot: Bot,
    msg: Message,
    state: AppState,
) -> Result<(), teloxide::RequestError> {
    let (Some(voice), Some(user)) = (msg.voice(), msg.from.as_ref()) else {
        return Ok(());
    };
    let chat_id = msg.chat.id;
    info!("Received voice from user {}", user.id.0);

    // No point downloading audio we are going to refuse.
    if !state.voice.is_allowed(user.id).await {
        bot.send_message(chat_id, screens::VOICE_SUBSCRIPTION_REQUIRED)
            .reply_markup(keyboards::main_menu())
            .await?;
        return Ok(());
    }

    let _ = bot.send_chat_action(chat_id, ChatAction::Typing).await;

    let buffer = match fetch_voice(&bot, voice).await {
        Ok(buffer) => buffer,
        Err(e) => {
            error!("Failed to fetch voice from user {}: {}", user.id.0, e);
            bot.send_message(chat_id, screens::VOICE_FAILED).await?;
            return Ok(());
        }
    };

    match state.voice.handle(user.id, &buffer).await {
        Ok(reply) => {
            bot.send_message(chat_id, screens::voice_transcript(&reply.transcript))
                .await?;
            bot.send_message(chat_id, screens::voice_answer(reply.outcome.text()))
                .await?;
        }
        Err(BotError::SubscriptionRequired) => {
            bot.send_message(chat_id, screens::VOICE_SUBSCRIPTION_REQUIRED)
                .reply_markup(keyboards::main_menu())
                .await?;
        }
        Err(e) => {
            warn!("Voice from user {} failed: {}", user.id.0, e);
            bot.send_message(chat_id, voice_error_text(&e)).await?;
        }
    }

    Ok(())
}
