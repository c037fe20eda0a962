//! UI Builder module for creating keyboards and formatting messages

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::dialogue::{Action, MAX_AGE, MAX_CHILDREN};

/// Notice for users who send anything before `/start`.
pub const UNKNOWN_SESSION_NOTICE: &str =
    "I don't have an active session for you yet. Send /start to begin.";

/// Caption attached to the delivered result photo.
pub const RESULT_CAPTION: &str = "Here is the result \u{1F476}";

/// One outbound message: text plus an optional inline keyboard.
pub struct Reply {
    pub text: String,
    pub keyboard: Option<InlineKeyboardMarkup>,
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    fn with_keyboard(text: impl Into<String>, keyboard: InlineKeyboardMarkup) -> Self {
        Self {
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }
}

/// Render an engine action into the single message it stands for.
pub fn render(action: &Action) -> Reply {
    match action {
        Action::Welcome => Reply::text(
            "Hi! I generate photos of a couple's future children from the parents' photos.\n\
             Send a photo of the mother \u{1F469}",
        ),
        Action::PromptFirstPhoto => Reply::text("Send a photo of the mother \u{1F469}"),
        Action::PromptSecondPhoto => {
            Reply::text("Got it \u{2705} Now send a photo of the father \u{1F468}")
        }
        Action::PromptChildCount => Reply::with_keyboard(
            "How many children should I generate?",
            child_count_keyboard(),
        ),
        Action::PromptGirlsCount { count } => Reply::with_keyboard(
            format!("{count} it is. How many of them should be girls?"),
            girls_count_keyboard(*count),
        ),
        Action::PromptAge { child_number } => Reply::with_keyboard(
            format!("Choose the age for child {child_number} (0\u{2013}{MAX_AGE}), or type a number:"),
            age_keyboard(),
        ),
        Action::RejectAge { child_number } => Reply::with_keyboard(
            format!(
                "That doesn't look like an age between 0 and {MAX_AGE}. \
                 Pick an age for child {child_number}:"
            ),
            age_keyboard(),
        ),
        Action::RejectFreeText => Reply::text("Please use the buttons or send a photo."),
        Action::Generate(_) => Reply::text("Generating the image, this can take a minute\u{2026}"),
        Action::OfferRestart { after_failure } => {
            let text = if *after_failure {
                "Image generation failed. Want to try again?"
            } else {
                "Want to generate another photo?"
            };
            Reply::with_keyboard(text, restart_keyboard())
        }
    }
}

/// One row of 1..=3 buttons with `count:N` callback data.
pub fn child_count_keyboard() -> InlineKeyboardMarkup {
    let row = (1..=MAX_CHILDREN)
        .map(|i| InlineKeyboardButton::callback(i.to_string(), format!("count:{i}")))
        .collect::<Vec<_>>();
    InlineKeyboardMarkup::new(vec![row])
}

/// One row of 0..=count buttons with `girls:N` callback data.
pub fn girls_count_keyboard(count: u8) -> InlineKeyboardMarkup {
    let row = (0..=count)
        .map(|i| InlineKeyboardButton::callback(i.to_string(), format!("girls:{i}")))
        .collect::<Vec<_>>();
    InlineKeyboardMarkup::new(vec![row])
}

/// Ages 0..=25 in rows of six, `age:N` callback data.
pub fn age_keyboard() -> InlineKeyboardMarkup {
    let buttons = (0..=MAX_AGE)
        .map(|i| InlineKeyboardButton::callback(i.to_string(), format!("age:{i}")))
        .collect::<Vec<_>>();
    let rows = buttons.chunks(6).map(|row| row.to_vec()).collect::<Vec<_>>();
    InlineKeyboardMarkup::new(rows)
}

pub fn restart_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("Keep current photos", "restart:keep"),
        InlineKeyboardButton::callback("Upload new photos", "restart:new"),
    ]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::InlineKeyboardButtonKind;

    fn callback_data(button: &InlineKeyboardButton) -> &str {
        match &button.kind {
            InlineKeyboardButtonKind::CallbackData(data) => data,
            other => panic!("expected callback button, got {other:?}"),
        }
    }

    #[test]
    fn child_count_keyboard_offers_one_to_three() {
        let kb = child_count_keyboard();
        assert_eq!(kb.inline_keyboard.len(), 1);
        let data: Vec<&str> = kb.inline_keyboard[0].iter().map(callback_data).collect();
        assert_eq!(data, vec!["count:1", "count:2", "count:3"]);
    }

    #[test]
    fn girls_keyboard_includes_zero_and_count() {
        let kb = girls_count_keyboard(2);
        let data: Vec<&str> = kb.inline_keyboard[0].iter().map(callback_data).collect();
        assert_eq!(data, vec!["girls:0", "girls:1", "girls:2"]);
    }

    #[test]
    fn age_keyboard_covers_the_full_range_in_rows_of_six() {
        let kb = age_keyboard();
        let all: Vec<String> = kb
            .inline_keyboard
            .iter()
            .flatten()
            .map(|b| callback_data(b).to_string())
            .collect();
        assert_eq!(all.len(), 26);
        assert_eq!(all.first().map(String::as_str), Some("age:0"));
        assert_eq!(all.last().map(String::as_str), Some("age:25"));
        assert!(kb.inline_keyboard.iter().all(|row| row.len() <= 6));
    }

    #[test]
    fn restart_keyboard_offers_keep_and_new() {
        let kb = restart_keyboard();
        let data: Vec<&str> = kb.inline_keyboard[0].iter().map(callback_data).collect();
        assert_eq!(data, vec!["restart:keep", "restart:new"]);
    }

    #[test]
    fn failure_restart_offer_mentions_the_failure() {
        let reply = render(&Action::OfferRestart {
            after_failure: true,
        });
        assert!(reply.text.contains("failed"));
        assert!(reply.keyboard.is_some());
    }
}
