use crate::deck::Deck;
use crate::error::QuizError;
use serde::{Deserialize, Serialize};

/// Ratio of correct answers to attempts.
pub type Ratio = f64;

/// Difficulty tier of a card, derived from its statistics every session.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Hard,
    Medium,
    Easy,
}

impl Difficulty {
    /// The order in which tiers are visited during a cycle.
    pub const ORDER: [Difficulty; 3] = [Difficulty::Hard, Difficulty::Medium, Difficulty::Easy];
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::Hard => write!(f, "hard"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Easy => write!(f, "easy"),
        }
    }
}

/// The kind of question to ask.
#[derive(Debug, Default, PartialEq, Eq, Copy, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizType {
    #[default]
    FillInTheBlank,
    MultipleChoice,
}

impl std::fmt::Display for QuizType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuizType::FillInTheBlank => write!(f, "fill in the blank"),
            QuizType::MultipleChoice => write!(f, "multiple choice"),
        }
    }
}

/// Number of cards in a session.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Deserialize, Serialize)]
#[serde(try_from = "CardCountRepr", into = "CardCountRepr")]
pub enum CardCount {
    /// As many cards as the deck holds.
    All,
    Count(usize),
}

impl CardCount {
    /// Resolve against the number of cards in the deck.
    pub fn resolve(&self, deck_len: usize) -> usize {
        match *self {
            CardCount::All => deck_len,
            CardCount::Count(n) => n,
        }
    }
}

impl Default for CardCount {
    fn default() -> Self {
        CardCount::Count(20)
    }
}

impl std::fmt::Display for CardCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CardCount::All => write!(f, "all"),
            CardCount::Count(n) => write!(f, "{n}"),
        }
    }
}

impl std::str::FromStr for CardCount {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(CardCount::All);
        }
        s.parse::<usize>()
            .map(CardCount::Count)
            .map_err(|_| format!("{s} is not a natural number or 'all'."))
    }
}

// On disk this is either a plain number or the word "all".
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
enum CardCountRepr {
    Number(usize),
    Word(String),
}

impl TryFrom<CardCountRepr> for CardCount {
    type Error = String;
    fn try_from(value: CardCountRepr) -> Result<Self, Self::Error> {
        match value {
            CardCountRepr::Number(n) => Ok(CardCount::Count(n)),
            CardCountRepr::Word(w) => w.parse(),
        }
    }
}

impl From<CardCount> for CardCountRepr {
    fn from(value: CardCount) -> Self {
        match value {
            CardCount::All => CardCountRepr::Word("all".to_owned()),
            CardCount::Count(n) => CardCountRepr::Number(n),
        }
    }
}

/// Repeat counts per tier for each cycle of the card generator. Zero skips the tier.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Weights {
    pub hard: usize,
    pub medium: usize,
    pub easy: usize,
}

impl Weights {
    pub fn new(hard: usize, medium: usize, easy: usize) -> Self {
        Weights { hard, medium, easy }
    }

    pub fn get(&self, difficulty: Difficulty) -> usize {
        match difficulty {
            Difficulty::Hard => self.hard,
            Difficulty::Medium => self.medium,
            Difficulty::Easy => self.easy,
        }
    }
}

impl Default for Weights {
    fn default() -> Self {
        Weights::new(1, 1, 1)
    }
}

/// Something that holds a deck between sessions.
pub trait Storage: std::fmt::Debug {
    /// Load the deck.
    fn load(&self) -> Result<Deck, QuizError>;

    /// Persist the deck, replacing what was stored before.
    fn save(&mut self, deck: &Deck) -> Result<(), QuizError>;
}
