use std::sync::Arc;

use anyhow::Result;
use teloxide::prelude::*;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use progeny::bot;
use progeny::config::Config;
use progeny::gateway::GenerationBackend;
use progeny::health;
use progeny::session::{InMemorySessionStore, SessionStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting Progeny Telegram Bot");

    // Refuse to start without credentials
    let config = Config::from_env()?;

    let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    let backend: Arc<dyn GenerationBackend> = config.build_backend();

    // Health endpoint runs independently of the bot
    let health_port = config.port;
    tokio::spawn(async move {
        if let Err(err) = health::serve(health_port).await {
            error!(error = %err, "Health endpoint terminated");
        }
    });

    // Initialize the bot
    let bot = Bot::new(config.telegram_token.clone());

    info!("Bot initialized, starting dispatcher");

    // Set up the dispatcher with the shared session store and backend
    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint({
            let store = Arc::clone(&store);
            let backend = Arc::clone(&backend);
            move |bot: Bot, msg: Message| {
                let store = Arc::clone(&store);
                let backend = Arc::clone(&backend);
                async move { bot::message_handler(bot, msg, store, backend).await }
            }
        }))
        .branch(Update::filter_callback_query().endpoint({
            let store = Arc::clone(&store);
            let backend = Arc::clone(&backend);
            move |bot: Bot, q: CallbackQuery| {
                let store = Arc::clone(&store);
                let backend = Arc::clone(&backend);
                async move { bot::callback_handler(bot, q, store, backend).await }
            }
        }));

    Dispatcher::builder(bot, handler)
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
