//! UI Builder module for creating reply keyboards and formatting messages

use rand::seq::SliceRandom;
use teloxide::types::{KeyboardButton, KeyboardMarkup};

/// Menu button labels, matched verbatim against incoming message text.
pub mod labels {
    pub const ADD_WORD: &str = "Добавить слово ➕";
    pub const DELETE_WORD: &str = "Удалить слово🔙";
    pub const NEXT: &str = "Дальше ⏭";
    pub const START_QUIZ: &str = "Начать викторину";
    pub const END_QUIZ: &str = "Закончить викторину";
}

/// The question line shown above the answer keyboard.
pub fn question_text(translation: &str) -> String {
    format!("Выбери перевод слова:\n🇷🇺 {translation}")
}

/// Keyboard for the card flow: shuffled answer options in rows of two,
/// then the control buttons.
pub fn answer_keyboard(options: &[String]) -> KeyboardMarkup {
    let mut rows = option_rows(options);
    rows.push(vec![
        KeyboardButton::new(labels::NEXT),
        KeyboardButton::new(labels::ADD_WORD),
        KeyboardButton::new(labels::DELETE_WORD),
    ]);
    rows.push(vec![KeyboardButton::new(labels::START_QUIZ)]);

    KeyboardMarkup::new(rows).resize_keyboard()
}

/// Keyboard for the quiz flow: shuffled options plus the end-quiz button.
pub fn quiz_keyboard(options: &[String]) -> KeyboardMarkup {
    let mut rows = option_rows(options);
    rows.push(vec![KeyboardButton::new(labels::END_QUIZ)]);

    KeyboardMarkup::new(rows).resize_keyboard()
}

/// Menu-only keyboard, shown when no card is on screen.
pub fn menu_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![
            KeyboardButton::new(labels::NEXT),
            KeyboardButton::new(labels::ADD_WORD),
            KeyboardButton::new(labels::DELETE_WORD),
        ],
        vec![KeyboardButton::new(labels::START_QUIZ)],
    ])
    .resize_keyboard()
}

fn option_rows(options: &[String]) -> Vec<Vec<KeyboardButton>> {
    let mut shuffled: Vec<&String> = options.iter().collect();
    shuffled.shuffle(&mut rand::thread_rng());

    shuffled
        .chunks(2)
        .map(|pair| pair.iter().map(|text| KeyboardButton::new(text.as_str())).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button_texts(markup: &KeyboardMarkup) -> Vec<String> {
        markup
            .keyboard
            .iter()
            .flatten()
            .map(|button| button.text.clone())
            .collect()
    }

    #[test]
    fn test_answer_keyboard_contains_all_options_and_controls() {
        let options = vec![
            "red".to_string(),
            "blue".to_string(),
            "green".to_string(),
            "I".to_string(),
            "you".to_string(),
        ];

        let markup = answer_keyboard(&options);
        let texts = button_texts(&markup);

        for option in &options {
            assert!(texts.contains(option), "missing option {option}");
        }
        assert!(texts.contains(&labels::NEXT.to_string()));
        assert!(texts.contains(&labels::ADD_WORD.to_string()));
        assert!(texts.contains(&labels::DELETE_WORD.to_string()));
        assert!(texts.contains(&labels::START_QUIZ.to_string()));
    }

    #[test]
    fn test_answer_keyboard_rows_of_two() {
        let options = vec![
            "red".to_string(),
            "blue".to_string(),
            "green".to_string(),
            "I".to_string(),
            "you".to_string(),
        ];

        let markup = answer_keyboard(&options);
        // 5 options -> rows of 2, 2, 1, then two control rows.
        assert_eq!(markup.keyboard.len(), 5);
        assert_eq!(markup.keyboard[0].len(), 2);
        assert_eq!(markup.keyboard[1].len(), 2);
        assert_eq!(markup.keyboard[2].len(), 1);
    }

    #[test]
    fn test_quiz_keyboard_has_end_button() {
        let options = vec!["red".to_string(), "blue".to_string()];

        let texts = button_texts(&quiz_keyboard(&options));

        assert!(texts.contains(&"red".to_string()));
        assert!(texts.contains(&"blue".to_string()));
        assert!(texts.contains(&labels::END_QUIZ.to_string()));
        assert!(!texts.contains(&labels::NEXT.to_string()));
    }

    #[test]
    fn test_question_text_format() {
        assert_eq!(question_text("red"), "Выбери перевод слова:\n🇷🇺 red");
    }
}
