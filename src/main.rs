use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use flashcards::bot;
use flashcards::config::Config;
use flashcards::db;
use flashcards::dialogue::CardDialogueState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Vocabulary Flashcards Telegram Bot");

    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url())
        .await?;

    db::init_schema(&pool).await?;

    let bot = Bot::new(config.token.clone());

    info!("Bot initialized, starting dispatcher");

    let handler = Update::filter_message()
        .enter_dialogue::<Message, InMemStorage<CardDialogueState>, CardDialogueState>()
        .endpoint(bot::message_handler);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![
            InMemStorage::<CardDialogueState>::new(),
            Arc::new(pool)
        ])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
