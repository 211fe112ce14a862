use crate::card::{Card, TIMESTAMP_FORMAT};
use crate::error::QuizError;
use chrono::NaiveDateTime;
use std::collections::BTreeSet;
use std::path::Path;

/// Prefix of the first line, followed by the deck name.
const NAME_MARKER: &str = "Name:";
/// Line that introduces the card rows.
const QUIZ_MARKER: &str = "Quiz:";
const COLUMNS: [&str; 5] = ["Question", "Answer", "Attempts", "Correct", "Last Shown"];

/// A named, ordered collection of cards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Deck {
    name: String,
    cards: Vec<Card>,
}

impl Deck {
    pub fn new(name: &str) -> Self {
        Deck {
            name: name.to_owned(),
            cards: vec![],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_card(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Cards in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Card> {
        self.cards.iter()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub(crate) fn card_mut(&mut self, index: usize) -> Option<&mut Card> {
        self.cards.get_mut(index)
    }

    /// All distinct answers in the deck.
    pub fn distinct_answers(&self) -> BTreeSet<String> {
        self.cards.iter().map(|c| c.answer().to_owned()).collect()
    }

    /// New deck with the same name where question and answer of every card are exchanged.
    pub fn swapped(&self) -> Deck {
        Deck {
            name: self.name.clone(),
            cards: self.cards.iter().map(Card::swapped).collect(),
        }
    }

    /// Load a deck from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Deck, QuizError> {
        let file = std::fs::File::open(path.as_ref())?;
        Deck::from_reader(file)
    }

    /// Save the deck, if overwrite is false an existing file is an error.
    pub fn save<P: AsRef<Path>>(&self, path: P, overwrite: bool) -> Result<(), QuizError> {
        let path = path.as_ref();
        if !overwrite && path.exists() {
            return Err(QuizError::AlreadyExists(path.to_path_buf()));
        }
        use std::fs::OpenOptions;
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        self.to_writer(file)
    }

    /// Parse the textual deck format.
    pub fn from_reader<R: std::io::Read>(mut reader: R) -> Result<Deck, QuizError> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;

        let mut lines = content.splitn(3, '\n');
        let name_line = lines.next().unwrap_or_default().trim_end_matches('\r');
        let name = name_line
            .strip_prefix(NAME_MARKER)
            .ok_or_else(|| QuizError::InvalidFormat(format!("expected '{NAME_MARKER}' header")))?
            .trim();

        let quiz_line = lines.next().unwrap_or_default().trim();
        if quiz_line != QUIZ_MARKER {
            return Err(QuizError::InvalidFormat(format!(
                "expected '{QUIZ_MARKER}' marker, found {quiz_line:?}"
            )));
        }

        let rows = lines.next().unwrap_or_default();
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(rows.as_bytes());

        let headers = csv_reader.headers()?;
        let known = headers
            .iter()
            .zip(COLUMNS.iter())
            .take(2)
            .filter(|(found, expected)| found.eq_ignore_ascii_case(expected))
            .count();
        if known != 2 {
            return Err(QuizError::InvalidFormat(format!(
                "expected column header, found {:?}",
                headers.iter().collect::<Vec<_>>()
            )));
        }

        let mut deck = Deck::new(name);
        for record in csv_reader.records() {
            deck.add_card(parse_row(&record?)?);
        }
        Ok(deck)
    }

    /// Write the textual deck format.
    pub fn to_writer<W: std::io::Write>(&self, mut writer: W) -> Result<(), QuizError> {
        writeln!(writer, "{NAME_MARKER} {}", self.name)?;
        writeln!(writer, "{QUIZ_MARKER}")?;
        let mut csv_writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(writer);
        csv_writer.write_record(COLUMNS)?;
        for card in self.cards.iter() {
            let last_shown = card
                .last_shown()
                .map(|t| t.format(TIMESTAMP_FORMAT).to_string())
                .unwrap_or_default();
            let attempts = card.attempts().to_string();
            let correct = card.correct().to_string();
            csv_writer.write_record([
                card.question(),
                card.answer(),
                attempts.as_str(),
                correct.as_str(),
                last_shown.as_str(),
            ])?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Deck {
    type Item = &'a Card;
    type IntoIter = std::slice::Iter<'a, Card>;
    fn into_iter(self) -> Self::IntoIter {
        self.cards.iter()
    }
}

fn parse_count(record: &csv::StringRecord, index: usize) -> Result<u32, QuizError> {
    match record.get(index) {
        None | Some("") => Ok(0),
        Some(v) => v.parse::<u32>().map_err(|_| {
            QuizError::InvalidFormat(format!("{v:?} is not a valid {}", COLUMNS[index]))
        }),
    }
}

fn parse_row(record: &csv::StringRecord) -> Result<Card, QuizError> {
    if record.len() < 2 {
        return Err(QuizError::InvalidFormat(format!(
            "expected at least a question and answer, found {:?}",
            record.iter().collect::<Vec<_>>()
        )));
    }
    let attempts = parse_count(record, 2)?;
    let correct = parse_count(record, 3)?;
    let last_shown = match record.get(4) {
        None | Some("") => None,
        // Fraction is optional when reading.
        Some(v) => Some(NaiveDateTime::parse_from_str(v, "%Y-%m-%d %H:%M:%S%.f").map_err(
            |e| QuizError::InvalidFormat(format!("{v:?} is not a valid timestamp: {e}")),
        )?),
    };
    Card::with_statistics(&record[0], &record[1], attempts, correct, last_shown)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Name: Sample Deck
Quiz:
Question,Answer,Attempts,Correct,Last Shown
1 + 1, 2
1 + 2, 3
1 + 3, 4
1 + 4, 5
1 + 5, 6
1 + 6, 7
1 + 7, 8
1 + 8, 9
1 + 9, 10
";

    fn make_deck() -> Deck {
        let mut deck = Deck::new("test deck");
        deck.add_card(Card::new("q0", "a0"));
        deck.add_card(Card::with_statistics("q1", "a1", 4, 3, None).unwrap());
        let mut card = Card::new("q2, with a comma", "\"quoted\" a2");
        card.record_correct();
        deck.add_card(card);
        deck
    }

    #[test]
    fn test_creation() {
        let mut deck = Deck::new("test deck");
        assert_eq!(deck.name(), "test deck");
        assert!(deck.is_empty());
        for (idx, c) in ["card 0", "card 1", "card 2"].iter().enumerate() {
            deck.add_card(Card::new(c, c));
            assert_eq!(deck.len(), idx + 1);
        }
    }

    #[test]
    fn test_sample_deck() {
        let deck = Deck::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(deck.name(), "Sample Deck");
        assert_eq!(deck.len(), 9);
        let first = &deck.cards()[0];
        assert_eq!(first.question(), "1 + 1");
        assert_eq!(first.answer(), "2");
        assert_eq!(first.attempts(), 0);
        assert_eq!(first.last_shown(), None);
    }

    #[test]
    fn test_write_read() {
        let deck = make_deck();
        let mut buffer: Vec<u8> = vec![];
        deck.to_writer(&mut buffer).unwrap();
        let text = String::from_utf8(buffer.clone()).unwrap();
        assert!(text.starts_with("Name: test deck\nQuiz:\nQuestion,Answer,Attempts,Correct,Last Shown\n"));
        assert!(text.contains("q1,a1,4,3,\n"));

        let back = Deck::from_reader(&buffer[..]).unwrap();
        // Timestamps are written with microsecond precision.
        assert_eq!(back.len(), deck.len());
        assert_eq!(back.cards()[..2], deck.cards()[..2]);
        assert_eq!(back.cards()[2].question(), "q2, with a comma");
        assert_eq!(back.cards()[2].answer(), "\"quoted\" a2");
        assert_eq!(back.cards()[2].attempts(), 1);
        assert!(back.cards()[2].last_shown().is_some());
    }

    #[test]
    fn test_timestamp_without_fraction() {
        let text = "Name: t\nQuiz:\nQuestion,Answer,Attempts,Correct,Last Shown\nq,a,2,1,2015-06-01 12:30:00\n";
        let deck = Deck::from_reader(text.as_bytes()).unwrap();
        let shown = deck.cards()[0].last_shown().unwrap();
        assert_eq!(shown.format(TIMESTAMP_FORMAT).to_string(), "2015-06-01 12:30:00.000000");
    }

    #[test]
    fn test_invalid_format() {
        let cases = [
            "",
            "Quiz:\nQuestion,Answer\nq,a\n",
            "Name: x\nQuestion,Answer\nq,a\n",
            "Name: x\nQuiz:\n",
            "Name: x\nQuiz:\nfoo,bar\n",
            "Name: x\nQuiz:\nQuestion,Answer\nonly\n",
            "Name: x\nQuiz:\nQuestion,Answer,Attempts\nq,a,many\n",
            "Name: x\nQuiz:\nQuestion,Answer,Attempts,Correct,Last Shown\nq,a,1,1,yesterday\n",
        ];
        for case in cases {
            let r = Deck::from_reader(case.as_bytes());
            assert!(matches!(r, Err(QuizError::InvalidFormat(_))), "{case:?} gave {r:?}");
        }
    }

    #[test]
    fn test_invalid_statistics() {
        let text = "Name: x\nQuiz:\nQuestion,Answer,Attempts,Correct\nq,a,1,2\n";
        let r = Deck::from_reader(text.as_bytes());
        assert!(matches!(r, Err(QuizError::InvalidStatistics { .. })));
    }

    #[test]
    fn test_load_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.txt");
        let mut deck = Deck::new("saved");
        deck.add_card(Card::new("q0", "a0"));
        deck.add_card(Card::with_statistics("q1", "a1", 3, 1, None).unwrap());

        deck.save(&path, false).unwrap();
        assert_eq!(Deck::load(&path).unwrap(), deck);

        let r = deck.save(&path, false);
        assert!(matches!(r, Err(QuizError::AlreadyExists(p)) if p == path));

        deck.add_card(Card::new("q2", "a2"));
        deck.save(&path, true).unwrap();
        assert_eq!(Deck::load(&path).unwrap().len(), 3);
    }

    #[test]
    fn test_distinct_answers() {
        let mut deck = Deck::new("answers");
        deck.add_card(Card::new("q0", "a"));
        deck.add_card(Card::new("q1", "b"));
        deck.add_card(Card::new("q2", "a"));
        let answers = deck.distinct_answers();
        assert_eq!(answers.len(), 2);
        assert!(answers.contains("a"));
        assert!(answers.contains("b"));
    }

    #[test]
    fn test_swapped() {
        let deck = make_deck();
        let swapped = deck.swapped();
        assert_eq!(swapped.name(), deck.name());
        assert_eq!(swapped.len(), deck.len());
        for (a, b) in deck.iter().zip(swapped.iter()) {
            assert_eq!(a.question(), b.answer());
            assert_eq!(a.answer(), b.question());
            assert_eq!(b.attempts(), 0);
        }
    }
}
