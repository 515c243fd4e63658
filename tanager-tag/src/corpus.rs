//! Sentence containers exchanged with corpus loaders.

/// A sentence with one state label per word, as produced by a labeled
/// corpus reader.
///
/// `words` and `tags` are parallel sequences of equal length; the trainer
/// rejects sentences where the lengths differ.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TaggedSentence {
    /// Observation symbols in time order.
    pub words: Vec<String>,
    /// State labels, parallel to `words`.
    pub tags: Vec<String>,
}

impl TaggedSentence {
    /// Create a sentence from parallel word and tag sequences.
    pub fn new(words: Vec<String>, tags: Vec<String>) -> Self {
        Self { words, tags }
    }

    /// Create a sentence from `(word, tag)` pairs.
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            words: pairs.iter().map(|(w, _)| w.to_string()).collect(),
            tags: pairs.iter().map(|(_, t)| t.to_string()).collect(),
        }
    }

    /// Number of words in the sentence.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the sentence has no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
