//! Guided-dialogue state machine for collecting parent photos and child
//! parameters.
//!
//! The whole conversation is modeled as a pure transition function
//! `(Session, Event) -> (Session, Action)` so the engine can be tested
//! without a Telegram connection. The transport adapter in [`crate::bot`]
//! maps updates to [`Event`]s and renders [`Action`]s into outbound messages.

use serde::{Deserialize, Serialize};

/// Upper bound for the child-count keyboard.
pub const MAX_CHILDREN: u8 = 3;

/// Oldest age offered on the age keyboard (ages run 0..=MAX_AGE).
pub const MAX_AGE: u8 = 25;

/// Opaque reference to an uploaded parent photo.
///
/// The Telegram adapter stores the file URL; a backend that needs inline
/// bytes dereferences it at call time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhotoRef {
    Url(String),
    Bytes(Vec<u8>),
}

/// Position in the guided conversation: what input is expected next.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Step {
    #[default]
    AwaitingFirstPhoto,
    AwaitingSecondPhoto,
    AwaitingChildCount,
    AwaitingGenderSplit,
    /// Collecting the age for child `index` (zero-based).
    AwaitingAge {
        index: u8,
    },
    Generating,
    Completed,
}

/// Per-user conversation record. Lives only in process memory.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub step: Step,
    pub first_photo: Option<PhotoRef>,
    pub second_photo: Option<PhotoRef>,
    pub child_count: Option<u8>,
    pub girls: Option<u8>,
    pub boys: Option<u8>,
    pub ages: Vec<u8>,
}

/// Fully assembled set of parameters ready to send to the image backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationRequest {
    pub first_photo: PhotoRef,
    pub second_photo: PhotoRef,
    pub child_count: u8,
    pub girls: u8,
    pub boys: u8,
    pub ages: Vec<u8>,
}

/// Inbound event, already stripped of transport details.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    StartCommand,
    PhotoUploaded(PhotoRef),
    CountChosen(u8),
    GirlsChosen(u8),
    AgeChosen(u8),
    Text(String),
    GenerationSucceeded,
    GenerationFailed,
    RestartKeep,
    RestartNew,
}

/// Outbound action produced by a transition. Every transition yields exactly
/// one action, and every action renders to exactly one outbound message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Greeting plus the first-photo prompt (sent on `/start`).
    Welcome,
    PromptFirstPhoto,
    PromptSecondPhoto,
    PromptChildCount,
    PromptGirlsCount { count: u8 },
    /// Ask the age for the `child_number`-th child (one-based, for display).
    PromptAge { child_number: u8 },
    /// Age out of range or unparsable; the child index did not advance.
    RejectAge { child_number: u8 },
    /// Free text arrived outside an age step.
    RejectFreeText,
    /// The record is complete; the adapter must call the generation gateway.
    Generate(GenerationRequest),
    OfferRestart { after_failure: bool },
}

/// Advances the session by one event and returns the single outbound action.
pub fn transition(session: Session, event: Event) -> (Session, Action) {
    let mut s = session;
    match event {
        // `/start` always resets, whatever the current step.
        Event::StartCommand => (Session::default(), Action::Welcome),

        Event::PhotoUploaded(photo) => match s.step {
            Step::AwaitingFirstPhoto => {
                s.first_photo = Some(photo);
                s.step = Step::AwaitingSecondPhoto;
                (s, Action::PromptSecondPhoto)
            }
            Step::AwaitingSecondPhoto => {
                s.second_photo = Some(photo);
                s.step = Step::AwaitingChildCount;
                (s, Action::PromptChildCount)
            }
            _ => {
                let action = reprompt(&s);
                (s, action)
            }
        },

        Event::CountChosen(count) => match s.step {
            Step::AwaitingChildCount if (1..=MAX_CHILDREN).contains(&count) => {
                s.child_count = Some(count);
                s.step = Step::AwaitingGenderSplit;
                (s, Action::PromptGirlsCount { count })
            }
            _ => {
                let action = reprompt(&s);
                (s, action)
            }
        },

        Event::GirlsChosen(girls) => match (s.step, s.child_count) {
            (Step::AwaitingGenderSplit, Some(count)) if girls <= count => {
                s.girls = Some(girls);
                s.boys = Some(count - girls);
                s.step = Step::AwaitingAge { index: 0 };
                (s, Action::PromptAge { child_number: 1 })
            }
            _ => {
                let action = reprompt(&s);
                (s, action)
            }
        },

        Event::AgeChosen(age) => accept_age(s, age),

        Event::Text(text) => match s.step {
            Step::AwaitingAge { index } => match text.trim().parse::<u8>() {
                Ok(age) => accept_age(s, age),
                Err(_) => {
                    let action = Action::RejectAge {
                        child_number: index + 1,
                    };
                    (s, action)
                }
            },
            // A non-image where an image is expected: re-prompt, no transition.
            Step::AwaitingFirstPhoto => (s, Action::PromptFirstPhoto),
            Step::AwaitingSecondPhoto => (s, Action::PromptSecondPhoto),
            _ => (s, Action::RejectFreeText),
        },

        Event::GenerationSucceeded => match s.step {
            Step::Generating => {
                s.step = Step::Completed;
                (s, Action::OfferRestart { after_failure: false })
            }
            _ => {
                let action = reprompt(&s);
                (s, action)
            }
        },

        // A failed attempt offers a restart without advancing to Completed.
        Event::GenerationFailed => match s.step {
            Step::Generating => (s, Action::OfferRestart { after_failure: true }),
            _ => {
                let action = reprompt(&s);
                (s, action)
            }
        },

        Event::RestartKeep => match s.step {
            Step::Generating | Step::Completed
                if s.first_photo.is_some() && s.second_photo.is_some() =>
            {
                let kept = Session {
                    step: Step::AwaitingChildCount,
                    first_photo: s.first_photo,
                    second_photo: s.second_photo,
                    ..Session::default()
                };
                (kept, Action::PromptChildCount)
            }
            _ => {
                let action = reprompt(&s);
                (s, action)
            }
        },

        Event::RestartNew => match s.step {
            Step::Generating | Step::Completed => (Session::default(), Action::PromptFirstPhoto),
            _ => {
                let action = reprompt(&s);
                (s, action)
            }
        },
    }
}

/// Stores an accepted age, or rejects it without advancing the child index.
fn accept_age(mut s: Session, age: u8) -> (Session, Action) {
    let Step::AwaitingAge { index } = s.step else {
        let action = reprompt(&s);
        return (s, action);
    };

    if age > MAX_AGE {
        return (
            s,
            Action::RejectAge {
                child_number: index + 1,
            },
        );
    }

    s.ages.push(age);
    let count = s.child_count.unwrap_or(0);
    if (s.ages.len() as u8) < count {
        s.step = Step::AwaitingAge { index: index + 1 };
        (
            s,
            Action::PromptAge {
                child_number: index + 2,
            },
        )
    } else {
        match assemble_request(&s) {
            Some(request) => {
                s.step = Step::Generating;
                (s, Action::Generate(request))
            }
            // Unreachable through the public transitions: the age steps are
            // only entered after both photos and the counts are recorded.
            None => (Session::default(), Action::Welcome),
        }
    }
}

/// Prompt matching the current step, used when input arrives out of order.
fn reprompt(session: &Session) -> Action {
    match session.step {
        Step::AwaitingFirstPhoto => Action::PromptFirstPhoto,
        Step::AwaitingSecondPhoto => Action::PromptSecondPhoto,
        Step::AwaitingChildCount => Action::PromptChildCount,
        Step::AwaitingGenderSplit => Action::PromptGirlsCount {
            count: session.child_count.unwrap_or(1),
        },
        Step::AwaitingAge { index } => Action::PromptAge {
            child_number: index + 1,
        },
        Step::Generating | Step::Completed => Action::OfferRestart {
            after_failure: false,
        },
    }
}

fn assemble_request(session: &Session) -> Option<GenerationRequest> {
    Some(GenerationRequest {
        first_photo: session.first_photo.clone()?,
        second_photo: session.second_photo.clone()?,
        child_count: session.child_count?,
        girls: session.girls?,
        boys: session.boys?,
        ages: session.ages.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(name: &str) -> PhotoRef {
        PhotoRef::Url(format!("https://files.example/{name}"))
    }

    #[test]
    fn start_resets_any_session() {
        let session = Session {
            step: Step::AwaitingGenderSplit,
            first_photo: Some(photo("a")),
            child_count: Some(2),
            ..Session::default()
        };
        let (next, action) = transition(session, Event::StartCommand);
        assert_eq!(next, Session::default());
        assert_eq!(action, Action::Welcome);
    }

    #[test]
    fn photos_advance_in_order() {
        let (s, action) = transition(Session::default(), Event::PhotoUploaded(photo("a")));
        assert_eq!(s.step, Step::AwaitingSecondPhoto);
        assert_eq!(action, Action::PromptSecondPhoto);

        let (s, action) = transition(s, Event::PhotoUploaded(photo("b")));
        assert_eq!(s.step, Step::AwaitingChildCount);
        assert_eq!(action, Action::PromptChildCount);
        assert_eq!(s.first_photo, Some(photo("a")));
        assert_eq!(s.second_photo, Some(photo("b")));
    }

    #[test]
    fn out_of_range_count_reprompts() {
        let session = Session {
            step: Step::AwaitingChildCount,
            ..Session::default()
        };
        let (s, action) = transition(session, Event::CountChosen(4));
        assert_eq!(s.step, Step::AwaitingChildCount);
        assert_eq!(action, Action::PromptChildCount);
        assert_eq!(s.child_count, None);
    }
}
