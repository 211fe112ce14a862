//! Flashcard quizzes that favour the cards you struggle with.

// Cards are split into hard, medium and easy by how often they were answered correctly, then
// dealt round robin from each tier with a weight per tier.

/// Shared types and traits
pub mod traits;

/// Error type
pub mod error;

// / A single flashcard.
pub mod card;

// / Collection of cards and its file format.
pub mod deck;

// / Places to keep a deck between runs.
pub mod storage;

// / Difficulty classification and card dealing.
pub mod algorithm;

// / Running a quiz.
pub mod quiz;

// / Quiz settings.
pub mod config;

pub use card::Card;
pub use deck::Deck;
pub use error::QuizError;
pub use quiz::{Answer, CorrectAnswer, Question, Quiz, Session};
