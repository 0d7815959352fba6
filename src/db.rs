//! Word repository and schema initialization.
//!
//! Every operation takes a shared [`sqlx::PgPool`]; the pool guarantees the
//! connection is returned on every exit path, success or error. A
//! `user_words` row means "this user has learned this word" — deleting the
//! association never deletes the shared `words` row.

use anyhow::{Context, Result};
use sqlx::postgres::PgPool;
use tracing::{debug, info};

/// A vocabulary entry.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Word {
    pub word_id: i32,
    pub word: String,
    pub translation: String,
}

/// Baseline vocabulary, inserted once on first startup.
pub const SEED_WORDS: &[(&str, &str)] = &[
    ("красный", "red"),
    ("синий", "blue"),
    ("зеленый", "green"),
    ("я", "I"),
    ("ты", "you"),
    ("он", "he"),
    ("она", "she"),
    ("оно", "it"),
    ("мы", "we"),
    ("они", "they"),
];

/// Create the three tables and seed the baseline vocabulary.
///
/// Safe to call on every process start: tables use `IF NOT EXISTS` and the
/// seed insert is guarded by the unique constraint on `words.word`.
pub async fn init_schema(pool: &PgPool) -> Result<()> {
    info!("Initializing database schema...");

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            user_id BIGINT PRIMARY KEY,
            username TEXT
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create users table")?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS words (
            word_id SERIAL PRIMARY KEY,
            word TEXT NOT NULL UNIQUE,
            translation TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create words table")?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS user_words (
            user_id BIGINT NOT NULL REFERENCES users(user_id),
            word_id INT NOT NULL REFERENCES words(word_id),
            PRIMARY KEY (user_id, word_id)
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create user_words table")?;

    for (word, translation) in SEED_WORDS {
        sqlx::query("INSERT INTO words (word, translation) VALUES ($1, $2) ON CONFLICT (word) DO NOTHING")
            .bind(word)
            .bind(translation)
            .execute(pool)
            .await
            .context("Failed to seed words table")?;
    }

    info!("Database schema initialized successfully");
    Ok(())
}

/// Register a user on first interaction; no-op if already present.
pub async fn ensure_user(pool: &PgPool, user_id: i64, username: Option<&str>) -> Result<()> {
    sqlx::query("INSERT INTO users (user_id, username) VALUES ($1, $2) ON CONFLICT (user_id) DO NOTHING")
        .bind(user_id)
        .bind(username)
        .execute(pool)
        .await
        .context("Failed to insert user")?;
    Ok(())
}

/// Pick one word the user has not learned yet, uniformly at random.
/// Returns `None` when the user has learned everything.
pub async fn get_random_unseen_word(pool: &PgPool, user_id: i64) -> Result<Option<Word>> {
    let word = sqlx::query_as::<_, Word>(
        "SELECT w.word_id, w.word, w.translation
         FROM words w
         WHERE w.word_id NOT IN (
             SELECT uw.word_id FROM user_words uw WHERE uw.user_id = $1
         )
         ORDER BY RANDOM()
         LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .context("Failed to fetch random unseen word")?;

    debug!(user_id, found = word.is_some(), "Fetched random unseen word");
    Ok(word)
}

/// Random sample of other words to use as wrong answer options.
/// May return fewer than `count` when the table is small.
pub async fn get_distractor_words(pool: &PgPool, word_id: i32, count: i64) -> Result<Vec<String>> {
    let words = sqlx::query_scalar::<_, String>(
        "SELECT word FROM words WHERE word_id != $1 ORDER BY RANDOM() LIMIT $2",
    )
    .bind(word_id)
    .bind(count)
    .fetch_all(pool)
    .await
    .context("Failed to fetch distractor words")?;

    Ok(words)
}

/// Mark a word as learned for a user; no-op if already marked.
pub async fn mark_word_learned(pool: &PgPool, user_id: i64, word_id: i32) -> Result<()> {
    sqlx::query(
        "INSERT INTO user_words (user_id, word_id) VALUES ($1, $2)
         ON CONFLICT (user_id, word_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(word_id)
    .execute(pool)
    .await
    .context("Failed to mark word as learned")?;

    debug!(user_id, word_id, "Marked word as learned");
    Ok(())
}

/// Remove a word from the user's learned set. Returns whether an
/// association actually existed.
pub async fn unmark_word_learned(pool: &PgPool, user_id: i64, word_id: i32) -> Result<bool> {
    let result = sqlx::query("DELETE FROM user_words WHERE user_id = $1 AND word_id = $2")
        .bind(user_id)
        .bind(word_id)
        .execute(pool)
        .await
        .context("Failed to unmark learned word")?;

    Ok(result.rows_affected() > 0)
}

/// Add a word to the shared vocabulary. Returns `false` when the word was
/// already present (the insert silently no-ops on duplicates).
pub async fn add_word(pool: &PgPool, word: &str, translation: &str) -> Result<bool> {
    let result = sqlx::query(
        "INSERT INTO words (word, translation) VALUES ($1, $2) ON CONFLICT (word) DO NOTHING",
    )
    .bind(word)
    .bind(translation)
    .execute(pool)
    .await
    .context("Failed to insert word")?;

    let inserted = result.rows_affected() > 0;
    info!(word, inserted, "Added word to vocabulary");
    Ok(inserted)
}

/// Look up a vocabulary entry by its exact word text.
pub async fn find_word(pool: &PgPool, word: &str) -> Result<Option<Word>> {
    let found = sqlx::query_as::<_, Word>(
        "SELECT word_id, word, translation FROM words WHERE word = $1",
    )
    .bind(word)
    .fetch_optional(pool)
    .await
    .context("Failed to look up word")?;

    Ok(found)
}

/// Quiz candidates for a user: up to 4 words that are either globally
/// unassociated or learned by this user, in random order.
pub async fn get_quiz_pool(pool: &PgPool, user_id: i64) -> Result<Vec<Word>> {
    let words = sqlx::query_as::<_, Word>(
        "SELECT w.word_id, w.word, w.translation
         FROM words w
         LEFT JOIN user_words uw ON w.word_id = uw.word_id
         WHERE uw.user_id = $1 OR uw.user_id IS NULL
         ORDER BY RANDOM()
         LIMIT 4",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("Failed to fetch quiz pool")?;

    debug!(user_id, pool_size = words.len(), "Fetched quiz pool");
    Ok(words)
}
