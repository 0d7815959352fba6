//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use sqlx::postgres::PgPool;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{debug, error, warn};

use crate::db;
use crate::dialogue::{parse_word_pair, ActiveCard, CardDialogue, CardDialogueState};

use super::ui_builder::{self, labels};

/// Wrong answer options shown next to the correct one.
const DISTRACTOR_COUNT: i64 = 4;

const DB_UNAVAILABLE: &str = "Слова временно недоступны. Попробуйте позже.";

pub async fn message_handler(
    bot: Bot,
    msg: Message,
    dialogue: CardDialogue,
    pool: Arc<PgPool>,
) -> Result<()> {
    let Some(text) = msg.text() else {
        debug!(user_id = %msg.chat.id, "Received non-text message");
        bot.send_message(msg.chat.id, "Я понимаю только текстовые сообщения.")
            .await?;
        return Ok(());
    };

    debug!(user_id = %msg.chat.id, message_length = text.len(), "Received text message from user");

    match text {
        "/start" | "/cards" | labels::NEXT => send_card(&bot, &msg, &dialogue, &pool).await?,
        labels::ADD_WORD => {
            bot.send_message(
                msg.chat.id,
                "Введите слово и его перевод через пробел (например: Apple Яблоко):",
            )
            .await?;
            dialogue.update(CardDialogueState::AwaitingNewWord).await?;
        }
        labels::DELETE_WORD => handle_delete_button(&bot, &msg, &dialogue, &pool).await?,
        labels::START_QUIZ => send_quiz_question(&bot, &msg, &dialogue, &pool).await?,
        labels::END_QUIZ => {
            bot.send_message(msg.chat.id, "Викторина завершена.")
                .reply_markup(ui_builder::menu_keyboard())
                .await?;
            dialogue.exit().await?;
        }
        _ => handle_free_text(&bot, &msg, &dialogue, &pool, text).await?,
    }

    Ok(())
}

/// Route a non-button text message according to the conversation state.
async fn handle_free_text(
    bot: &Bot,
    msg: &Message,
    dialogue: &CardDialogue,
    pool: &PgPool,
    text: &str,
) -> Result<()> {
    let state = dialogue.get().await?.unwrap_or_default();

    match state {
        CardDialogueState::AwaitingAnswer { card } => {
            handle_answer(bot, msg, dialogue, pool, text, &card, false).await
        }
        CardDialogueState::Quiz { card } => {
            handle_answer(bot, msg, dialogue, pool, text, &card, true).await
        }
        CardDialogueState::AwaitingNewWord => {
            handle_new_word_input(bot, msg, dialogue, pool, text).await
        }
        CardDialogueState::AwaitingDeleteWord => {
            handle_delete_word_input(bot, msg, dialogue, pool, text).await
        }
        CardDialogueState::Idle => {
            bot.send_message(
                msg.chat.id,
                "Нажмите /cards, чтобы получить новую карточку.",
            )
            .reply_markup(ui_builder::menu_keyboard())
            .await?;
            Ok(())
        }
    }
}

/// Check an answer attempt against the card on screen. In the card flow a
/// correct answer is recorded as learned and the next card follows; the
/// quiz flow only advances.
async fn handle_answer(
    bot: &Bot,
    msg: &Message,
    dialogue: &CardDialogue,
    pool: &PgPool,
    text: &str,
    card: &ActiveCard,
    quiz: bool,
) -> Result<()> {
    if text != card.word {
        bot.send_message(
            msg.chat.id,
            format!(
                "Допущена ошибка!\nПопробуй ещё раз вспомнить слово 🇷🇺{}",
                card.translation
            ),
        )
        .await?;
        return Ok(());
    }

    bot.send_message(
        msg.chat.id,
        format!("Отлично!❤\n{} -> {}", card.word, card.translation),
    )
    .await?;

    if quiz {
        return send_quiz_question(bot, msg, dialogue, pool).await;
    }

    if let Err(e) = db::mark_word_learned(pool, sender_id(msg), card.word_id).await {
        error!(user_id = %msg.chat.id, word_id = card.word_id, error = %e, "Failed to record learned word");
    }

    send_card(bot, msg, dialogue, pool).await
}

/// Show the next card: a random unseen word with shuffled answer options.
async fn send_card(bot: &Bot, msg: &Message, dialogue: &CardDialogue, pool: &PgPool) -> Result<()> {
    let user_id = sender_id(msg);

    if let Err(e) = db::ensure_user(pool, user_id, sender_username(msg)).await {
        error!(user_id, error = %e, "Failed to register user");
    }

    let word = match db::get_random_unseen_word(pool, user_id).await {
        Ok(Some(word)) => word,
        Ok(None) => {
            bot.send_message(msg.chat.id, "Вы изучили все слова! Добавьте новые слова.")
                .reply_markup(ui_builder::menu_keyboard())
                .await?;
            dialogue.exit().await?;
            return Ok(());
        }
        Err(e) => {
            error!(user_id, error = %e, "Failed to fetch card");
            bot.send_message(msg.chat.id, DB_UNAVAILABLE).await?;
            return Ok(());
        }
    };

    let mut options = match db::get_distractor_words(pool, word.word_id, DISTRACTOR_COUNT).await {
        Ok(words) => words,
        Err(e) => {
            error!(user_id, error = %e, "Failed to fetch distractors");
            Vec::new()
        }
    };
    options.push(word.word.clone());

    bot.send_message(msg.chat.id, ui_builder::question_text(&word.translation))
        .reply_markup(ui_builder::answer_keyboard(&options))
        .await?;

    dialogue
        .update(CardDialogueState::AwaitingAnswer { card: word.into() })
        .await?;

    Ok(())
}

/// Show the next quiz question from the user's quiz pool.
async fn send_quiz_question(
    bot: &Bot,
    msg: &Message,
    dialogue: &CardDialogue,
    pool: &PgPool,
) -> Result<()> {
    let user_id = sender_id(msg);

    if let Err(e) = db::ensure_user(pool, user_id, sender_username(msg)).await {
        error!(user_id, error = %e, "Failed to register user");
    }

    let quiz_pool = match db::get_quiz_pool(pool, user_id).await {
        Ok(words) => words,
        Err(e) => {
            error!(user_id, error = %e, "Failed to fetch quiz pool");
            bot.send_message(msg.chat.id, DB_UNAVAILABLE).await?;
            return Ok(());
        }
    };

    // One target plus at least one wrong option.
    if quiz_pool.len() < 2 {
        warn!(user_id, pool_size = quiz_pool.len(), "Quiz pool too small");
        bot.send_message(
            msg.chat.id,
            "Недостаточно слов для викторины. Добавьте новые слова.",
        )
        .reply_markup(ui_builder::menu_keyboard())
        .await?;
        dialogue.exit().await?;
        return Ok(());
    }

    let options: Vec<String> = quiz_pool.iter().map(|w| w.word.clone()).collect();
    // The pool comes back in random order, so the first entry is a fair pick.
    let Some(target) = quiz_pool.into_iter().next() else {
        return Ok(());
    };

    bot.send_message(msg.chat.id, ui_builder::question_text(&target.translation))
        .reply_markup(ui_builder::quiz_keyboard(&options))
        .await?;

    dialogue
        .update(CardDialogueState::Quiz {
            card: target.into(),
        })
        .await?;

    Ok(())
}

/// The delete button removes the card on screen from the learned set, or
/// prompts for a word when no card is active.
async fn handle_delete_button(
    bot: &Bot,
    msg: &Message,
    dialogue: &CardDialogue,
    pool: &PgPool,
) -> Result<()> {
    let state = dialogue.get().await?.unwrap_or_default();

    if let CardDialogueState::AwaitingAnswer { card } = state {
        match db::unmark_word_learned(pool, sender_id(msg), card.word_id).await {
            Ok(_) => {
                bot.send_message(
                    msg.chat.id,
                    format!("Слово '{}' удалено из вашего списка изученных.", card.word),
                )
                .await?;
            }
            Err(e) => {
                error!(user_id = %msg.chat.id, word_id = card.word_id, error = %e, "Failed to unmark word");
                bot.send_message(msg.chat.id, DB_UNAVAILABLE).await?;
            }
        }
        return Ok(());
    }

    bot.send_message(msg.chat.id, "Введите слово, которое хотите удалить:")
        .await?;
    dialogue.update(CardDialogueState::AwaitingDeleteWord).await?;
    Ok(())
}

/// One-shot `word translation` input after the add button.
async fn handle_new_word_input(
    bot: &Bot,
    msg: &Message,
    dialogue: &CardDialogue,
    pool: &PgPool,
    text: &str,
) -> Result<()> {
    // Single-step prompt: whatever happens, the next message is handled
    // normally again.
    dialogue.exit().await?;

    let Some((word, translation)) = parse_word_pair(text) else {
        bot.send_message(
            msg.chat.id,
            "Неверный формат. Пожалуйста, введите слово и его перевод через пробел.",
        )
        .await?;
        return Ok(());
    };

    match db::add_word(pool, &word, &translation).await {
        Ok(true) => {
            bot.send_message(msg.chat.id, format!("Слово '{word}' добавлено в базу данных."))
                .reply_markup(ui_builder::menu_keyboard())
                .await?;
        }
        Ok(false) => {
            bot.send_message(msg.chat.id, format!("Слово '{word}' уже есть в базе данных."))
                .reply_markup(ui_builder::menu_keyboard())
                .await?;
        }
        Err(e) => {
            error!(user_id = %msg.chat.id, error = %e, "Failed to add word");
            bot.send_message(msg.chat.id, DB_UNAVAILABLE).await?;
        }
    }

    Ok(())
}

/// One-shot word-name input after the delete button was pressed with no
/// card on screen.
async fn handle_delete_word_input(
    bot: &Bot,
    msg: &Message,
    dialogue: &CardDialogue,
    pool: &PgPool,
    text: &str,
) -> Result<()> {
    dialogue.exit().await?;

    let word = text.trim();
    let user_id = sender_id(msg);

    let found = match db::find_word(pool, word).await {
        Ok(found) => found,
        Err(e) => {
            error!(user_id, error = %e, "Failed to look up word for deletion");
            bot.send_message(msg.chat.id, DB_UNAVAILABLE).await?;
            return Ok(());
        }
    };

    let Some(entry) = found else {
        bot.send_message(msg.chat.id, format!("Слово '{word}' не найдено."))
            .reply_markup(ui_builder::menu_keyboard())
            .await?;
        return Ok(());
    };

    let reply = match db::unmark_word_learned(pool, user_id, entry.word_id).await {
        Ok(true) => format!("Слово '{word}' удалено из вашего списка изученных."),
        Ok(false) => format!("Слово '{word}' не было в вашем списке изученных."),
        Err(e) => {
            error!(user_id, word_id = entry.word_id, error = %e, "Failed to unmark word");
            DB_UNAVAILABLE.to_string()
        }
    };

    bot.send_message(msg.chat.id, reply)
        .reply_markup(ui_builder::menu_keyboard())
        .await?;
    Ok(())
}

/// Platform user id of the sender; falls back to the chat id, which equals
/// the user id in private chats.
fn sender_id(msg: &Message) -> i64 {
    msg.from
        .as_ref()
        .map(|user| user.id.0 as i64)
        .unwrap_or(msg.chat.id.0)
}

fn sender_username(msg: &Message) -> Option<&str> {
    msg.from.as_ref().and_then(|user| user.username.as_deref())
}
