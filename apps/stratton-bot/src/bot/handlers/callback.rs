use crate::bot::router::Reply;
use crate::bot::utils::edit_screen;
use crate::AppState;
use teloxide::prelude::*;
use teloxide::types::CallbackQuery;
use tracing::{error, info};

pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    state: AppState,
) -> Result<(), teloxide::RequestError> {
    info!("Received callback: {:?}", q.data);
    let callback_id = q.id.clone();

    let Some(data) = q.data.as_deref() else {
        let _ = bot.answer_callback_query(callback_id).await;
        return Ok(());
    };

    match state.router.callback(q.from.id, data).await {
        Reply::Screen(screen) => {
            let _ = bot.answer_callback_query(callback_id).await;
            if let Some(msg) = q.message.as_ref() {
                edit_screen(&bot, msg.chat().id, msg.id(), screen).await;
            }
        }
        Reply::Alert(text) => {
            if let Err(e) = bot
                .answer_callback_query(callback_id)
                .text(text)
                .show_alert(true)
                .await
            {
                error!("Failed to show alert to user {}: {}", q.from.id.0, e);
            }
        }
        Reply::Ignore => {
            let _ = bot.answer_callback_query(callback_id).await;
        }
    }

    Ok(())
}
