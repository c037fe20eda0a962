//! Callback Handler module for processing inline keyboard callback queries

use std::sync::Arc;

use anyhow::Result;
use teloxide::prelude::*;
use tracing::debug;

use crate::dialogue::Event;
use crate::gateway::GenerationBackend;
use crate::session::SessionStore;

use super::message_handler::dispatch_known;

/// Handle callback queries from inline keyboards
pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    store: Arc<dyn SessionStore>,
    backend: Arc<dyn GenerationBackend>,
) -> Result<()> {
    debug!(user_id = %q.from.id, data = ?q.data, "Received callback query from user");

    if let Some(msg) = &q.message {
        let chat_id = msg.chat().id;
        match q.data.as_deref().and_then(parse_callback) {
            Some(event) => {
                dispatch_known(&bot, chat_id, &store, &backend, event).await?;
            }
            None => {
                debug!(user_id = %q.from.id, "Ignoring unrecognized callback data");
            }
        }
    }

    // Answer the callback query to remove the loading state
    bot.answer_callback_query(q.id).await?;

    Ok(())
}

/// Decodes `kind:value` callback data into an engine event.
pub fn parse_callback(data: &str) -> Option<Event> {
    let (kind, value) = data.split_once(':')?;
    match kind {
        "count" => value.parse().ok().map(Event::CountChosen),
        "girls" => value.parse().ok().map(Event::GirlsChosen),
        "age" => value.parse().ok().map(Event::AgeChosen),
        "restart" => match value {
            "keep" => Some(Event::RestartKeep),
            "new" => Some(Event::RestartNew),
            _ => None,
        },
        _ => None,
    }
}
