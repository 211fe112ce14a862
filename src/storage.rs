// Implementations of the Storage trait.

use crate::deck::Deck;
use crate::error::QuizError;
use crate::traits::Storage;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Storage that only keeps the deck in memory. Clones share the same saved snapshots, so a test
/// can keep a handle to observe what a quiz persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    deck: Deck,
    saved: Rc<RefCell<Vec<Deck>>>,
}

impl MemoryStorage {
    pub fn new(deck: Deck) -> Self {
        MemoryStorage {
            deck,
            saved: Default::default(),
        }
    }

    /// Every deck passed to save, oldest first.
    pub fn saved(&self) -> Vec<Deck> {
        self.saved.borrow().clone()
    }

    /// Number of times save was called.
    pub fn save_count(&self) -> usize {
        self.saved.borrow().len()
    }
}

impl Storage for MemoryStorage {
    fn load(&self) -> Result<Deck, QuizError> {
        Ok(self
            .saved
            .borrow()
            .last()
            .cloned()
            .unwrap_or_else(|| self.deck.clone()))
    }

    fn save(&mut self, deck: &Deck) -> Result<(), QuizError> {
        self.saved.borrow_mut().push(deck.clone());
        Ok(())
    }
}

/// Storage that reads and overwrites a deck file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        FileStorage {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for FileStorage {
    fn load(&self) -> Result<Deck, QuizError> {
        Deck::load(&self.path)
    }

    fn save(&mut self, deck: &Deck) -> Result<(), QuizError> {
        log::info!("Saving deck {:?} to {}", deck.name(), self.path.display());
        deck.save(&self.path, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Card;

    #[test]
    fn test_memory_storage() {
        let mut deck = Deck::new("memory");
        deck.add_card(Card::new("q", "a"));
        let mut storage = MemoryStorage::new(deck.clone());
        let handle = storage.clone();
        assert_eq!(storage.load().unwrap(), deck);
        assert_eq!(handle.save_count(), 0);

        deck.add_card(Card::new("q2", "a2"));
        storage.save(&deck).unwrap();
        assert_eq!(handle.save_count(), 1);
        assert_eq!(handle.saved()[0], deck);
        assert_eq!(storage.load().unwrap().len(), 2);
    }

    #[test]
    fn test_file_storage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.txt");
        let mut storage = FileStorage::new(&path);
        assert!(matches!(storage.load(), Err(QuizError::Io(_))));

        let mut deck = Deck::new("file");
        deck.add_card(Card::new("q", "a"));
        storage.save(&deck).unwrap();
        // Saving again overwrites.
        storage.save(&deck).unwrap();
        assert_eq!(storage.load().unwrap(), deck);
        assert_eq!(storage.path(), path.as_path());
    }
}
