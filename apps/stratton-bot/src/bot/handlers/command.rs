use crate::bot::utils::send_screen;
use crate::AppState;
use teloxide::prelude::*;
use tracing::{error, info};

/// Splits `/start`, `/start@bot_name` and `/start <payload>`. Returns `None`
/// for anything that isn't a start command.
pub fn parse_start(text: &str) -> Option<Option<&str>> {
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let command = parts.next()?;
    let command = command.split('@').next().unwrap_or(command);
    if command != "/start" {
        return None;
    }
    Some(parts.next().map(str::trim).filter(|arg| !arg.is_empty()))
}

pub async fn message_handler(
    bot: Bot,
    msg: Message,
    state: AppState,
) -> Result<(), teloxide::RequestError> {
    let (Some(text), Some(user)) = (msg.text(), msg.from.as_ref()) else {
        return Ok(());
    };

    let Some(arg) = parse_start(text) else {
        info!("Ignoring text from user {}", user.id.0);
        return Ok(());
    };

    info!("User {} executed /start {:?}", user.id.0, arg);
    let screen = state.router.start(user.id, arg).await;
    if let Err(e) = send_screen(&bot, msg.chat.id, screen).await {
        error!("Failed to answer /start in chat {}: {}", msg.chat.id.0, e);
    }
    Ok(())
}
