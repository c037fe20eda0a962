//! Message Handler module for processing incoming Telegram messages

use std::sync::Arc;

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::{FileId, InputFile};
use tracing::{debug, error, info};

use crate::dialogue::{transition, Action, Event, PhotoRef, Session};
use crate::gateway::GenerationBackend;
use crate::session::SessionStore;

use super::ui_builder::{render, Reply, RESULT_CAPTION, UNKNOWN_SESSION_NOTICE};

/// Builds the public download URL for an uploaded Telegram file.
pub async fn telegram_file_url(bot: &Bot, file_id: FileId) -> Result<String> {
    let file = bot.get_file(file_id).await?;
    Ok(format!(
        "https://api.telegram.org/file/bot{}/{}",
        bot.token(),
        file.path
    ))
}

pub async fn message_handler(
    bot: Bot,
    msg: Message,
    store: Arc<dyn SessionStore>,
    backend: Arc<dyn GenerationBackend>,
) -> Result<()> {
    let chat_id = msg.chat.id;

    if let Some(text) = msg.text() {
        debug!(user_id = %chat_id, message_length = text.len(), "Received text message from user");

        // `/start` is the only input allowed to create a session.
        if text.trim() == "/start" {
            let session = store.get(chat_id).unwrap_or_default();
            return apply(&bot, chat_id, &store, &backend, session, Event::StartCommand).await;
        }

        dispatch_known(&bot, chat_id, &store, &backend, Event::Text(text.to_string())).await
    } else if let Some(photos) = msg.photo() {
        debug!(user_id = %chat_id, "Received photo message from user");

        let Some(largest_photo) = photos.last() else {
            return Ok(());
        };
        let url = match telegram_file_url(&bot, largest_photo.file.id.clone()).await {
            Ok(url) => url,
            Err(e) => {
                error!(user_id = %chat_id, error = %e, "Failed to resolve uploaded photo");
                bot.send_message(chat_id, "I couldn't read that photo, please send it again.")
                    .await?;
                return Ok(());
            }
        };

        dispatch_known(
            &bot,
            chat_id,
            &store,
            &backend,
            Event::PhotoUploaded(PhotoRef::Url(url)),
        )
        .await
    } else {
        debug!(user_id = %chat_id, "Received unsupported message type from user");
        // Stickers, voice notes and the like get the same generic rejection
        // as stray text.
        dispatch_known(
            &bot,
            chat_id,
            &store,
            &backend,
            Event::Text(String::new()),
        )
        .await
    }
}

/// Routes an event for a user who must already have a session. Unknown users
/// are told to begin again; no session is auto-created.
pub(crate) async fn dispatch_known(
    bot: &Bot,
    chat_id: ChatId,
    store: &Arc<dyn SessionStore>,
    backend: &Arc<dyn GenerationBackend>,
    event: Event,
) -> Result<()> {
    let Some(session) = store.get(chat_id) else {
        debug!(user_id = %chat_id, "Event for unknown session");
        bot.send_message(chat_id, UNKNOWN_SESSION_NOTICE).await?;
        return Ok(());
    };
    apply(bot, chat_id, store, backend, session, event).await
}

/// Runs one engine transition, persists the new session, and executes the
/// resulting action. A `Generate` action additionally drives the gateway call
/// and feeds the outcome back through the engine.
pub(crate) async fn apply(
    bot: &Bot,
    chat_id: ChatId,
    store: &Arc<dyn SessionStore>,
    backend: &Arc<dyn GenerationBackend>,
    session: Session,
    event: Event,
) -> Result<()> {
    let (session, action) = transition(session, event);
    store.put(chat_id, session);

    if let Action::Generate(request) = &action {
        send_reply(bot, chat_id, render(&action)).await?;

        let outcome = match backend.generate(request).await {
            Ok(bytes) => {
                info!(user_id = %chat_id, image_bytes = bytes.len(), "Generation succeeded");
                bot.send_photo(chat_id, InputFile::memory(bytes).file_name("children.png"))
                    .caption(RESULT_CAPTION)
                    .await?;
                Event::GenerationSucceeded
            }
            Err(e) => {
                error!(user_id = %chat_id, error = %e, "Generation failed");
                Event::GenerationFailed
            }
        };

        // Re-read rather than reuse the pre-call session: the user may have
        // issued /start while the call was in flight.
        let current = store.get(chat_id).unwrap_or_default();
        let (current, action) = transition(current, outcome);
        store.put(chat_id, current);
        return send_reply(bot, chat_id, render(&action)).await;
    }

    send_reply(bot, chat_id, render(&action)).await
}

pub(crate) async fn send_reply(bot: &Bot, chat_id: ChatId, reply: Reply) -> Result<()> {
    match reply.keyboard {
        Some(keyboard) => {
            bot.send_message(chat_id, reply.text)
                .reply_markup(keyboard)
                .await?;
        }
        None => {
            bot.send_message(chat_id, reply.text).await?;
        }
    }
    Ok(())
}
