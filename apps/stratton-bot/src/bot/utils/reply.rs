use crate::bot::router::Screen;
use teloxide::prelude::*;
use teloxide::types::{LinkPreviewOptions, MessageId};
use teloxide::{ApiError, RequestError};
use tracing::{debug, error};

fn preview_disabled() -> LinkPreviewOptions {
    LinkPreviewOptions {
        is_disabled: true,
        url: None,
        prefer_small_media: false,
        prefer_large_media: false,
        show_above_text: false,
    }
}

/// Sends the screen as a new message.
pub async fn send_screen(bot: &Bot, chat_id: ChatId, screen: Screen) -> Result<Message, RequestError> {
    let mut req = bot
        .send_message(chat_id, screen.text)
        .reply_markup(screen.keyboard);
    if let Some(mode) = screen.parse_mode {
        req = req.parse_mode(mode);
    }
    if screen.disable_preview {
        req = req.link_preview_options(preview_disabled());
    }
    req.await
}

/// Replaces the text and keyboard of an existing bot message.
pub async fn edit_screen(bot: &Bot, chat_id: ChatId, message_id: MessageId, screen: Screen) {
    let mut req = bot
        .edit_message_text(chat_id, message_id, screen.text)
        .reply_markup(screen.keyboard);
    if let Some(mode) = screen.parse_mode {
        req = req.parse_mode(mode);
    }
    if screen.disable_preview {
        req = req.link_preview_options(preview_disabled());
    }

    match req.await {
        Ok(_) => {}
        // Pressing the button of the screen already shown is a no-op edit.
        Err(RequestError::Api(ApiError::MessageNotModified)) => {
            debug!("Screen unchanged in chat {}", chat_id.0);
        }
        Err(e) => error!("Failed to edit message in chat {}: {}", chat_id.0, e),
    }
}
