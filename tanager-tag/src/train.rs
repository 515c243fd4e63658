//! Supervised estimation of HMM parameters from tagged sentences.
//!
//! [`train`] builds a model by frequency counting over a labeled corpus;
//! [`tag`] extends a model's vocabulary for unseen words and decodes one
//! tag sequence per sentence.
//!
//! ```
//! use tanager_tag::{tag, train, TaggedSentence};
//!
//! let corpus = vec![TaggedSentence::from_pairs(&[
//!     ("the", "DET"),
//!     ("dog", "NOUN"),
//!     ("runs", "VERB"),
//! ])];
//! let mut model = train(&corpus, &["DET", "NOUN", "VERB"]).unwrap();
//!
//! // "cat" was never seen; tagging extends the vocabulary first.
//! let sentences = vec![vec!["the".to_string(), "cat".to_string(), "runs".to_string()]];
//! let decoded = tag(&sentences, &mut model).unwrap();
//! assert_eq!(decoded[0], vec!["DET", "NOUN", "VERB"]);
//! ```

use tanager_core::{Mat, Result, TanagerError};

use crate::corpus::TaggedSentence;
use crate::hmm::Hmm;
use crate::vocab::SymbolTable;

/// Estimate initial, transition, and emission probabilities from a tagged
/// corpus and return a freshly parameterized model.
///
/// State indices follow the order of `tags`; observation indices follow
/// first-seen order across `sentences`. Counts are row-normalized into
/// probabilities. A state with no transition or emission counts receives a
/// uniform row, so every row of the returned model is a valid distribution.
///
/// # Errors
///
/// Returns `InvalidInput` for an empty corpus or tag list, a sentence with
/// mismatched word/tag lengths, or a sentence with no words; returns
/// `UnknownSymbol` for a sentence tag absent from `tags`.
pub fn train<S: AsRef<str>>(sentences: &[TaggedSentence], tags: &[S]) -> Result<Hmm> {
    if tags.is_empty() {
        return Err(TanagerError::InvalidInput("tag list is empty".into()));
    }
    if sentences.is_empty() {
        return Err(TanagerError::InvalidInput("training corpus is empty".into()));
    }

    let states = SymbolTable::from_symbols(tags);
    let mut vocab = SymbolTable::new();
    let mut word_seqs: Vec<Vec<usize>> = Vec::with_capacity(sentences.len());
    for sent in sentences {
        if sent.words.len() != sent.tags.len() {
            return Err(TanagerError::InvalidInput(format!(
                "sentence has {} words but {} tags",
                sent.words.len(),
                sent.tags.len()
            )));
        }
        if sent.is_empty() {
            return Err(TanagerError::InvalidInput(
                "training sentence has no words".into(),
            ));
        }
        word_seqs.push(sent.words.iter().map(|w| vocab.insert(w)).collect());
    }

    let s = states.len();
    let mut initial = vec![0.0; s];
    let mut transition = Mat::zeros(s, s);
    let mut emission = Mat::zeros(s, vocab.len());

    for (sent, words) in sentences.iter().zip(&word_seqs) {
        let tag_idx: Vec<usize> = sent
            .tags
            .iter()
            .map(|t| {
                states
                    .index_of(t)
                    .ok_or_else(|| TanagerError::UnknownSymbol(t.clone()))
            })
            .collect::<Result<_>>()?;

        initial[tag_idx[0]] += 1.0;
        for (&ti, &wi) in tag_idx.iter().zip(words) {
            emission.set(ti, wi, emission.get(ti, wi) + 1.0);
        }
        for pair in tag_idx.windows(2) {
            transition.set(pair[0], pair[1], transition.get(pair[0], pair[1]) + 1.0);
        }
    }

    normalize_rows(&mut transition);
    normalize_rows(&mut emission);
    let total: f64 = initial.iter().sum();
    for p in &mut initial {
        *p /= total;
    }

    Hmm::new(initial, transition, emission, vocab, states)
}

/// Decode one tag sequence per input sentence.
///
/// Symbols absent from the model's vocabulary are first registered via
/// [`Hmm::add_unseen_symbol`], then every sentence is decoded with Viterbi.
/// Extension mutates the model in place, so the caller holds exclusive
/// access for the duration of the call; the decoding itself only reads the
/// model and, with the `parallel` feature, runs across sentences on rayon.
///
/// # Errors
///
/// Returns `InvalidInput` if any sentence is empty.
pub fn tag(sentences: &[Vec<String>], model: &mut Hmm) -> Result<Vec<Vec<String>>> {
    for sent in sentences {
        for word in sent {
            model.add_unseen_symbol(word);
        }
    }

    #[cfg(feature = "parallel")]
    let decoded = {
        use rayon::prelude::*;
        let model = &*model;
        sentences
            .par_iter()
            .map(|sent| model.viterbi(sent))
            .collect::<Result<Vec<_>>>()?
    };
    #[cfg(not(feature = "parallel"))]
    let decoded = sentences
        .iter()
        .map(|sent| model.viterbi(sent))
        .collect::<Result<Vec<_>>>()?;

    Ok(decoded)
}

/// Row-normalize counts into probabilities. A row with zero total becomes
/// uniform, so the result always satisfies the model's row-sum invariant.
fn normalize_rows(m: &mut Mat) {
    for r in 0..m.rows() {
        let sum: f64 = m.row(r).iter().sum();
        let row = m.row_mut(r);
        if sum == 0.0 {
            let uniform = 1.0 / row.len() as f64;
            for v in row {
                *v = uniform;
            }
        } else {
            for v in row {
                *v /= sum;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    fn toy_corpus() -> Vec<TaggedSentence> {
        vec![
            TaggedSentence::from_pairs(&[("the", "DET"), ("dog", "NOUN"), ("runs", "VERB")]),
            TaggedSentence::from_pairs(&[("the", "DET"), ("cat", "NOUN"), ("sleeps", "VERB")]),
            TaggedSentence::from_pairs(&[("dogs", "NOUN"), ("run", "VERB")]),
        ]
    }

    // -----------------------------------------------------------------------
    // Parameter estimation
    // -----------------------------------------------------------------------

    #[test]
    fn two_state_end_to_end() {
        let corpus = vec![TaggedSentence::from_pairs(&[("dog", "N"), ("runs", "V")])];
        let model = train(&corpus, &["N", "V"]).unwrap();

        assert_eq!(model.initial(), &[1.0, 0.0]);
        // N -> V observed once; V has no outgoing counts and falls back to uniform
        assert_eq!(model.transition().row(0), &[0.0, 1.0]);
        assert_eq!(model.transition().row(1), &[0.5, 0.5]);
        // each state's emissions concentrate on its observed word
        assert_eq!(model.emission().row(0), &[1.0, 0.0]);
        assert_eq!(model.emission().row(1), &[0.0, 1.0]);

        let path = model.viterbi(&["dog", "runs"]).unwrap();
        assert_eq!(path, vec!["N", "V"]);
    }

    #[test]
    fn state_indices_follow_tag_order() {
        let model = train(&toy_corpus(), &["VERB", "DET", "NOUN"]).unwrap();
        assert_eq!(model.states().index_of("VERB"), Some(0));
        assert_eq!(model.states().index_of("DET"), Some(1));
        assert_eq!(model.states().index_of("NOUN"), Some(2));
    }

    #[test]
    fn observation_indices_follow_first_seen_order() {
        let model = train(&toy_corpus(), &["DET", "NOUN", "VERB"]).unwrap();
        let expected = ["the", "dog", "runs", "cat", "sleeps", "dogs", "run"];
        for (i, word) in expected.iter().enumerate() {
            assert_eq!(model.vocab().index_of(word), Some(i), "word {word:?}");
        }
    }

    #[test]
    fn initial_distribution_counts_first_tags() {
        let model = train(&toy_corpus(), &["DET", "NOUN", "VERB"]).unwrap();
        // two sentences start with DET, one with NOUN
        let pi = model.initial();
        assert!((pi[0] - 2.0 / 3.0).abs() < TOL);
        assert!((pi[1] - 1.0 / 3.0).abs() < TOL);
        assert!((pi[2] - 0.0).abs() < TOL);
    }

    #[test]
    fn rows_are_normalized() {
        let model = train(&toy_corpus(), &["DET", "NOUN", "VERB"]).unwrap();
        for r in 0..model.n_states() {
            let a_sum: f64 = model.transition().row(r).iter().sum();
            let b_sum: f64 = model.emission().row(r).iter().sum();
            assert!((a_sum - 1.0).abs() < TOL, "transition row {r}");
            assert!((b_sum - 1.0).abs() < TOL, "emission row {r}");
        }
    }

    #[test]
    fn unused_tag_gets_uniform_rows() {
        let corpus = vec![TaggedSentence::from_pairs(&[("dog", "N"), ("runs", "V")])];
        let model = train(&corpus, &["N", "V", "X"]).unwrap();

        let x = model.states().index_of("X").unwrap();
        for &v in model.transition().row(x) {
            assert!((v - 1.0 / 3.0).abs() < TOL);
        }
        for &v in model.emission().row(x) {
            assert!((v - 0.5).abs() < TOL);
        }
        assert_eq!(model.initial()[x], 0.0);
    }

    #[test]
    fn duplicate_tags_keep_first_index() {
        let corpus = vec![TaggedSentence::from_pairs(&[("dog", "N"), ("runs", "V")])];
        let model = train(&corpus, &["N", "V", "N"]).unwrap();
        assert_eq!(model.n_states(), 2);
    }

    #[test]
    fn training_is_reproducible() {
        let corpus = toy_corpus();
        let tags = ["DET", "NOUN", "VERB"];
        let m1 = train(&corpus, &tags).unwrap();
        let m2 = train(&corpus, &tags).unwrap();

        assert_eq!(m1.initial(), m2.initial());
        assert_eq!(m1.transition(), m2.transition());
        assert_eq!(m1.emission(), m2.emission());
        assert_eq!(m1.vocab().symbols(), m2.vocab().symbols());
        assert_eq!(m1.states().symbols(), m2.states().symbols());
    }

    // -----------------------------------------------------------------------
    // Tagging
    // -----------------------------------------------------------------------

    #[test]
    fn tag_decodes_each_sentence() {
        let mut model = train(&toy_corpus(), &["DET", "NOUN", "VERB"]).unwrap();
        let sentences = vec![
            vec!["the".to_string(), "dog".to_string(), "runs".to_string()],
            vec!["the".to_string(), "cat".to_string(), "sleeps".to_string()],
        ];
        let decoded = tag(&sentences, &mut model).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0], vec!["DET", "NOUN", "VERB"]);
        assert_eq!(decoded[1], vec!["DET", "NOUN", "VERB"]);
    }

    #[test]
    fn tag_extends_vocabulary_for_novel_words() {
        let mut model = train(&toy_corpus(), &["DET", "NOUN", "VERB"]).unwrap();
        let n_symbols = model.n_symbols();
        let n_states = model.n_states();

        let sentences = vec![vec![
            "the".to_string(),
            "wombat".to_string(),
            "runs".to_string(),
        ]];
        let decoded = tag(&sentences, &mut model).unwrap();

        // exactly one new observation index and one new emission column
        assert_eq!(model.n_symbols(), n_symbols + 1);
        assert_eq!(model.emission().cols(), n_symbols + 1);
        assert_eq!(model.vocab().index_of("wombat"), Some(n_symbols));
        assert_eq!(model.n_states(), n_states);
        assert_eq!(model.vocab().index_of("the"), Some(0));

        assert_eq!(decoded[0].len(), 3);
        assert_eq!(decoded[0], vec!["DET", "NOUN", "VERB"]);
    }

    #[test]
    fn tag_empty_input_yields_no_sequences() {
        let mut model = train(&toy_corpus(), &["DET", "NOUN", "VERB"]).unwrap();
        let decoded = tag(&[], &mut model).unwrap();
        assert!(decoded.is_empty());
    }

    // -----------------------------------------------------------------------
    // Error handling
    // -----------------------------------------------------------------------

    #[test]
    fn error_on_empty_corpus_or_tags() {
        let corpus = toy_corpus();
        assert!(train(&corpus, &[] as &[&str]).is_err());
        assert!(train(&[], &["N"]).is_err());
    }

    #[test]
    fn error_on_mismatched_sentence() {
        let bad = TaggedSentence::new(
            vec!["dog".to_string(), "runs".to_string()],
            vec!["N".to_string()],
        );
        assert!(train(&[bad], &["N", "V"]).is_err());
    }

    #[test]
    fn error_on_empty_sentence() {
        let empty = TaggedSentence::new(vec![], vec![]);
        assert!(train(&[empty], &["N"]).is_err());
    }

    #[test]
    fn error_on_tag_missing_from_list() {
        let corpus = vec![TaggedSentence::from_pairs(&[("dog", "N"), ("runs", "V")])];
        assert!(matches!(
            train(&corpus, &["N"]),
            Err(TanagerError::UnknownSymbol(s)) if s == "V"
        ));
    }
}
