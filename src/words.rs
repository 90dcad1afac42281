use std::fmt;

use crate::error::WordListError;

/// Shown before anything has been selected, and whenever the sentence is
/// empty again.
pub const DEFAULT_WORDS: [&str; 13] = [
    "I", "What", "We", "Hello", "Yes", "No", "Help", "Stop", "Go", "Thank", "Please", "Need",
    "Want",
];

/// Full pool of candidate words. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordList(Vec<String>);

impl WordList {
    /// Trims every word and drops blanks.
    pub fn new<I, S>(words: I) -> Result<Self, WordListError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: Vec<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();

        if words.is_empty() {
            return Err(WordListError::Empty);
        }
        Ok(Self(words))
    }

    pub fn defaults() -> Self {
        Self(DEFAULT_WORDS.iter().map(|w| w.to_string()).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Three words starting at `start`, wrapping around to the front as many
    /// times as needed.
    pub fn window(&self, start: usize) -> DisplayedTriple {
        let len = self.0.len();
        DisplayedTriple(std::array::from_fn(|i| self.0[(start + i) % len].clone()))
    }
}

impl Default for WordList {
    fn default() -> Self {
        Self::defaults()
    }
}

/// Screen position of a displayed word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Left,
    Middle,
    Right,
}

impl Slot {
    pub const fn index(self) -> usize {
        match self {
            Slot::Left => 0,
            Slot::Middle => 1,
            Slot::Right => 2,
        }
    }
}

/// The three words currently offered for selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DisplayedTriple([String; 3]);

impl DisplayedTriple {
    pub fn new(words: [&str; 3]) -> Self {
        Self(words.map(str::to_string))
    }

    pub fn get(&self, slot: Slot) -> &str {
        &self.0[slot.index()]
    }

    pub fn as_array(&self) -> &[String; 3] {
        &self.0
    }
}

impl fmt::Display for DisplayedTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} | {} | {}]", self.0[0], self.0[1], self.0[2])
    }
}

/// Cursor that walks a [`WordList`] three words at a time.
#[derive(Debug, Clone, Default)]
pub struct WordRotator {
    cursor: usize,
}

impl WordRotator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Called when the list is replaced so the next tick starts from the new
    /// top suggestions.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    pub fn tick(&mut self, words: &WordList) -> DisplayedTriple {
        let start = if self.cursor < words.len() { self.cursor } else { 0 };
        self.cursor = (start + 3) % words.len();
        words.window(start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lists_are_rejected() {
        assert_eq!(WordList::new(Vec::<String>::new()), Err(WordListError::Empty));
        assert_eq!(WordList::new(["", "  "]), Err(WordListError::Empty));
    }

    #[test]
    fn words_are_trimmed() {
        let list = WordList::new([" need ", "", "water"]).unwrap();
        assert_eq!(list.as_slice(), ["need", "water"]);
    }

    #[test]
    fn triple_always_has_three_words() {
        for len in 1..=13 {
            let list = WordList::new(&DEFAULT_WORDS[..len]).unwrap();
            let mut rotator = WordRotator::new();
            for _ in 0..10 {
                let triple = rotator.tick(&list);
                assert_eq!(triple.as_array().len(), 3);
                assert!(triple.as_array().iter().all(|w| !w.is_empty()));
            }
        }
    }

    #[test]
    fn short_lists_wrap_from_the_start() {
        let list = WordList::new(["A", "B"]).unwrap();
        assert_eq!(WordRotator::new().tick(&list), DisplayedTriple::new(["A", "B", "A"]));

        let list = WordList::new(["A"]).unwrap();
        assert_eq!(WordRotator::new().tick(&list), DisplayedTriple::new(["A", "A", "A"]));
    }

    #[test]
    fn default_list_rotates_by_three() {
        let list = WordList::defaults();
        let mut rotator = WordRotator::new();

        assert_eq!(rotator.tick(&list), DisplayedTriple::new(["I", "What", "We"]));
        assert_eq!(rotator.tick(&list), DisplayedTriple::new(["Hello", "Yes", "No"]));
        assert_eq!(rotator.cursor(), 6);

        rotator.tick(&list);
        rotator.tick(&list);
        // 12 -> ["Want", "I", "What"], cursor wraps to 2
        assert_eq!(rotator.tick(&list), DisplayedTriple::new(["Want", "I", "What"]));
        assert_eq!(rotator.cursor(), 2);
    }

    #[test]
    fn cursor_past_a_shorter_list_starts_over() {
        let mut rotator = WordRotator::new();
        let long = WordList::defaults();
        for _ in 0..3 {
            rotator.tick(&long);
        }
        assert_eq!(rotator.cursor(), 9);

        let short = WordList::new(["water", "food", "rest", "help"]).unwrap();
        assert_eq!(rotator.tick(&short), DisplayedTriple::new(["water", "food", "rest"]));
    }

    #[test]
    fn slots_index_the_triple() {
        let triple = DisplayedTriple::new(["Yes", "No", "Stop"]);
        assert_eq!(triple.get(Slot::Left), "Yes");
        assert_eq!(triple.get(Slot::Middle), "No");
        assert_eq!(triple.get(Slot::Right), "Stop");
    }
}
