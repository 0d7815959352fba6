//! Per-chat conversation state for the card and quiz flows.

use serde::{Deserialize, Serialize};
use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};

use crate::db::Word;

/// The card currently shown to a chat: the answer word, its translation
/// (the question text), and the database id for progress updates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveCard {
    pub word_id: i32,
    pub word: String,
    pub translation: String,
}

impl From<Word> for ActiveCard {
    fn from(word: Word) -> Self {
        Self {
            word_id: word.word_id,
            word: word.word,
            translation: word.translation,
        }
    }
}

/// Conversation state, one per chat. Created when the first card is shown,
/// overwritten on each new card, and evicted on process restart (the
/// learned-word history survives in the database).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub enum CardDialogueState {
    #[default]
    Idle,
    /// A card is on screen and the next text message is an answer attempt.
    AwaitingAnswer { card: ActiveCard },
    /// A quiz question is on screen; answers are checked but progress is
    /// not recorded.
    Quiz { card: ActiveCard },
    /// The add button was pressed; the next message is `word translation`.
    AwaitingNewWord,
    /// The delete button was pressed with no card on screen; the next
    /// message names the word to remove from the learned set.
    AwaitingDeleteWord,
}

/// Type alias for the per-chat dialogue.
pub type CardDialogue = Dialogue<CardDialogueState, InMemStorage<CardDialogueState>>;

/// Split `word translation` input at the first whitespace run.
/// The translation may itself contain spaces; a single token is malformed.
pub fn parse_word_pair(input: &str) -> Option<(String, String)> {
    let (word, translation) = input.trim().split_once(char::is_whitespace)?;
    let translation = translation.trim();
    if translation.is_empty() {
        return None;
    }
    Some((word.to_string(), translation.to_string()))
}
