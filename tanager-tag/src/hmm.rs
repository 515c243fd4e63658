//! Discrete Hidden Markov Model engine for sequence tagging.
//!
//! Implements the classic inference algorithms over a fixed state space and
//! an extensible observation vocabulary: forward, backward, sequence
//! probability, posterior state marginals, pairwise transition posteriors,
//! and Viterbi decoding.
//!
//! All computations run directly in probability space. Sentences in the
//! part-of-speech setting are short enough that underflow is not a
//! practical concern.
//!
//! # Quick start
//!
//! ```
//! use tanager_core::Mat;
//! use tanager_tag::hmm::Hmm;
//! use tanager_tag::vocab::SymbolTable;
//!
//! // 2-state determiner/noun model
//! let states = SymbolTable::from_symbols(&["DET", "NOUN"]);
//! let vocab = SymbolTable::from_symbols(&["the", "dog"]);
//! let initial = vec![1.0, 0.0];
//! let transition = Mat::from_vec(2, 2, vec![0.1, 0.9, 0.6, 0.4]);
//! let emission = Mat::from_vec(2, 2, vec![0.8, 0.2, 0.3, 0.7]);
//!
//! let model = Hmm::new(initial, transition, emission, vocab, states).unwrap();
//! let path = model.viterbi(&["the", "dog"]).unwrap();
//! assert_eq!(path, vec!["DET", "NOUN"]);
//! ```

use tanager_core::{Mat, Result, TanagerError};

use crate::vocab::SymbolTable;

/// Emission probability assigned to observation symbols first registered at
/// tagging time (see [`Hmm::add_unseen_symbol`]).
pub const UNSEEN_EMISSION: f64 = 1e-6;

/// Tolerance for probability-sum checks at construction.
const PROB_TOL: f64 = 1e-6;

/// A discrete Hidden Markov Model over symbolic states and observations.
///
/// The model owns its parameters and both dictionaries. Inference methods
/// take `&self` and never mutate the model; the only mutation is
/// [`add_unseen_symbol`](Self::add_unseen_symbol), which grows the
/// observation vocabulary and the emission matrix together. Callers that
/// extend and decode concurrently must hold exclusive access for the
/// extension, which the borrow checker enforces.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hmm {
    /// Initial state probabilities pi[i] (length `n_states`).
    initial: Vec<f64>,
    /// Transition matrix A[(i, j)] = P(state_j | state_i), `n_states x n_states`.
    transition: Mat,
    /// Emission matrix B[(i, k)] = P(symbol_k | state_i), `n_states x n_symbols`.
    /// Grows by one column per unseen symbol.
    emission: Mat,
    /// Observation symbol dictionary (extensible).
    vocab: SymbolTable,
    /// Hidden state dictionary (fixed after construction).
    states: SymbolTable,
}

impl Hmm {
    /// Create a new model after validating dimensions and probability sums.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - either dictionary is empty
    /// - matrix or vector dimensions do not match the dictionary sizes
    /// - `initial` or any row of `transition` or `emission` does not sum to
    ///   approximately 1.0 (tolerance 1e-6)
    ///
    /// The probability-sum check applies at construction only; vocabulary
    /// extension later pushes emission row sums slightly above 1.
    pub fn new(
        initial: Vec<f64>,
        transition: Mat,
        emission: Mat,
        vocab: SymbolTable,
        states: SymbolTable,
    ) -> Result<Self> {
        let s = states.len();
        let o = vocab.len();
        if s == 0 {
            return Err(TanagerError::InvalidInput("state dictionary is empty".into()));
        }
        if o == 0 {
            return Err(TanagerError::InvalidInput(
                "observation dictionary is empty".into(),
            ));
        }
        if initial.len() != s {
            return Err(TanagerError::InvalidInput(format!(
                "initial length {} != state count {s}",
                initial.len()
            )));
        }
        if transition.rows() != s || transition.cols() != s {
            return Err(TanagerError::InvalidInput(format!(
                "transition is {}x{}, expected {s}x{s}",
                transition.rows(),
                transition.cols()
            )));
        }
        if emission.rows() != s || emission.cols() != o {
            return Err(TanagerError::InvalidInput(format!(
                "emission is {}x{}, expected {s}x{o}",
                emission.rows(),
                emission.cols()
            )));
        }

        let pi_sum: f64 = initial.iter().sum();
        if (pi_sum - 1.0).abs() > PROB_TOL {
            return Err(TanagerError::InvalidInput(format!(
                "initial probabilities sum to {pi_sum}, expected ~1.0"
            )));
        }
        for i in 0..s {
            let row_sum: f64 = transition.row(i).iter().sum();
            if (row_sum - 1.0).abs() > PROB_TOL {
                return Err(TanagerError::InvalidInput(format!(
                    "transition row {i} sums to {row_sum}, expected ~1.0"
                )));
            }
        }
        for i in 0..s {
            let row_sum: f64 = emission.row(i).iter().sum();
            if (row_sum - 1.0).abs() > PROB_TOL {
                return Err(TanagerError::InvalidInput(format!(
                    "emission row {i} sums to {row_sum}, expected ~1.0"
                )));
            }
        }

        Ok(Self {
            initial,
            transition,
            emission,
            vocab,
            states,
        })
    }

    /// Number of hidden states.
    pub fn n_states(&self) -> usize {
        self.states.len()
    }

    /// Number of observation symbols currently in the vocabulary.
    pub fn n_symbols(&self) -> usize {
        self.vocab.len()
    }

    /// The hidden state dictionary.
    pub fn states(&self) -> &SymbolTable {
        &self.states
    }

    /// The observation dictionary.
    pub fn vocab(&self) -> &SymbolTable {
        &self.vocab
    }

    /// Initial state probabilities.
    pub fn initial(&self) -> &[f64] {
        &self.initial
    }

    /// The transition matrix.
    pub fn transition(&self) -> &Mat {
        &self.transition
    }

    /// The emission matrix.
    pub fn emission(&self) -> &Mat {
        &self.emission
    }

    // -----------------------------------------------------------------------
    // Vocabulary extension
    // -----------------------------------------------------------------------

    /// Register `symbol` in the observation vocabulary, appending one
    /// emission column with probability [`UNSEEN_EMISSION`] for every state.
    ///
    /// The column append and the dictionary insert happen together, so the
    /// emission matrix and the vocabulary never disagree on the symbol
    /// count. Existing rows are deliberately left unnormalized afterwards:
    /// unseen-word handling takes priority over keeping emission rows on the
    /// probability simplex.
    ///
    /// Returns the symbol's index. A symbol that is already known is a
    /// no-op returning its existing index.
    pub fn add_unseen_symbol(&mut self, symbol: &str) -> usize {
        if let Some(idx) = self.vocab.index_of(symbol) {
            return idx;
        }
        let col = vec![UNSEEN_EMISSION; self.n_states()];
        self.emission.push_col(&col);
        self.vocab.insert(symbol)
    }

    // -----------------------------------------------------------------------
    // Observation encoding
    // -----------------------------------------------------------------------

    /// Translate raw symbols to vocabulary indices.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty sequence and `UnknownSymbol` for
    /// a symbol absent from the vocabulary. The engine performs no
    /// extension here; tagging paths must extend first.
    fn encode<S: AsRef<str>>(&self, observations: &[S]) -> Result<Vec<usize>> {
        if observations.is_empty() {
            return Err(TanagerError::InvalidInput(
                "observation sequence is empty".into(),
            ));
        }
        observations
            .iter()
            .map(|sym| {
                let sym = sym.as_ref();
                self.vocab
                    .index_of(sym)
                    .ok_or_else(|| TanagerError::UnknownSymbol(sym.to_string()))
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Forward algorithm
    // -----------------------------------------------------------------------

    /// Run the forward algorithm.
    ///
    /// Returns alpha as an `n_states x L` matrix where `alpha[(i, t)]` is
    /// the joint probability of the first `t + 1` observations and being in
    /// state `i` at time `t`.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty sequence or an out-of-vocabulary
    /// symbol.
    pub fn forward<S: AsRef<str>>(&self, observations: &[S]) -> Result<Mat> {
        let obs = self.encode(observations)?;
        Ok(self.forward_encoded(&obs))
    }

    fn forward_encoded(&self, obs: &[usize]) -> Mat {
        let s = self.n_states();
        let l = obs.len();
        let mut alpha = Mat::zeros(s, l);

        for j in 0..s {
            alpha.set(j, 0, self.initial[j] * self.emission.get(j, obs[0]));
        }
        for t in 1..l {
            for j in 0..s {
                let mut acc = 0.0;
                for i in 0..s {
                    acc += self.transition.get(i, j) * alpha.get(i, t - 1);
                }
                alpha.set(j, t, self.emission.get(j, obs[t]) * acc);
            }
        }
        alpha
    }

    // -----------------------------------------------------------------------
    // Backward algorithm
    // -----------------------------------------------------------------------

    /// Run the backward algorithm.
    ///
    /// Returns beta as an `n_states x L` matrix where `beta[(i, t)]` is the
    /// probability of the observation suffix after time `t` given state `i`
    /// at time `t`.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty sequence or an out-of-vocabulary
    /// symbol.
    pub fn backward<S: AsRef<str>>(&self, observations: &[S]) -> Result<Mat> {
        let obs = self.encode(observations)?;
        Ok(self.backward_encoded(&obs))
    }

    fn backward_encoded(&self, obs: &[usize]) -> Mat {
        let s = self.n_states();
        let l = obs.len();
        let mut beta = Mat::zeros(s, l);

        for j in 0..s {
            beta.set(j, l - 1, 1.0);
        }
        for t in (0..l - 1).rev() {
            for i in 0..s {
                let mut acc = 0.0;
                for j in 0..s {
                    acc += beta.get(j, t + 1)
                        * self.transition.get(i, j)
                        * self.emission.get(j, obs[t + 1]);
                }
                beta.set(i, t, acc);
            }
        }
        beta
    }

    // -----------------------------------------------------------------------
    // Sequence probability
    // -----------------------------------------------------------------------

    /// Total probability of the observation sequence under the model,
    /// marginalizing the final state.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty sequence or an out-of-vocabulary
    /// symbol.
    pub fn sequence_prob<S: AsRef<str>>(&self, observations: &[S]) -> Result<f64> {
        let obs = self.encode(observations)?;
        let alpha = self.forward_encoded(&obs);
        Ok(Self::last_col_sum(&alpha))
    }

    fn last_col_sum(alpha: &Mat) -> f64 {
        let last = alpha.cols() - 1;
        (0..alpha.rows()).map(|i| alpha.get(i, last)).sum()
    }

    // -----------------------------------------------------------------------
    // Posterior state marginals
    // -----------------------------------------------------------------------

    /// Posterior probability of each state at each time given the full
    /// sequence: `gamma[(i, t)] = alpha[(i, t)] * beta[(i, t)] / P(O)`.
    ///
    /// Forward, backward, and the sequence probability are recomputed on
    /// every call; callers needing all three should call
    /// [`forward`](Self::forward) and [`backward`](Self::backward) directly
    /// and assemble the product themselves if recomputation matters.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty sequence, an out-of-vocabulary symbol,
    /// or a sequence with zero probability under the model.
    pub fn posterior_prob<S: AsRef<str>>(&self, observations: &[S]) -> Result<Mat> {
        let obs = self.encode(observations)?;
        let alpha = self.forward_encoded(&obs);
        let beta = self.backward_encoded(&obs);
        let total = Self::last_col_sum(&alpha);
        if total == 0.0 {
            return Err(TanagerError::Degenerate(
                "sequence has zero probability under the model".into(),
            ));
        }

        let s = self.n_states();
        let l = obs.len();
        let mut prob = Mat::zeros(s, l);
        for i in 0..s {
            for t in 0..l {
                prob.set(i, t, alpha.get(i, t) * beta.get(i, t) / total);
            }
        }
        Ok(prob)
    }

    // -----------------------------------------------------------------------
    // Pairwise transition posteriors
    // -----------------------------------------------------------------------

    /// Posterior probability of each state transition given the full
    /// sequence.
    ///
    /// Returns one `n_states x n_states` matrix per time step `t` in
    /// `0..L-1`, where element `(i, j)` of the `t`-th matrix is the
    /// probability of being in state `i` at time `t` and state `j` at time
    /// `t + 1`.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty sequence, an out-of-vocabulary symbol,
    /// or a sequence with zero probability under the model.
    pub fn likelihood_prob<S: AsRef<str>>(&self, observations: &[S]) -> Result<Vec<Mat>> {
        let obs = self.encode(observations)?;
        let alpha = self.forward_encoded(&obs);
        let beta = self.backward_encoded(&obs);
        let total = Self::last_col_sum(&alpha);
        if total == 0.0 {
            return Err(TanagerError::Degenerate(
                "sequence has zero probability under the model".into(),
            ));
        }

        let s = self.n_states();
        let l = obs.len();
        let mut prob = Vec::with_capacity(l - 1);
        for t in 0..l - 1 {
            let mut xi = Mat::zeros(s, s);
            for i in 0..s {
                for j in 0..s {
                    let v = alpha.get(i, t)
                        * self.transition.get(i, j)
                        * self.emission.get(j, obs[t + 1])
                        * beta.get(j, t + 1)
                        / total;
                    xi.set(i, j, v);
                }
            }
            prob.push(xi);
        }
        Ok(prob)
    }

    // -----------------------------------------------------------------------
    // Viterbi decoding
    // -----------------------------------------------------------------------

    /// Decode the maximum-a-posteriori state path, returned as state
    /// symbols in time order.
    ///
    /// Ties in any argmax resolve to the lowest state index, so decoding is
    /// deterministic.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty sequence or an out-of-vocabulary
    /// symbol.
    pub fn viterbi<S: AsRef<str>>(&self, observations: &[S]) -> Result<Vec<String>> {
        let obs = self.encode(observations)?;
        let s = self.n_states();
        let l = obs.len();

        let mut delta = Mat::zeros(s, l);
        // psi[i][t]: argmax predecessor of state i at time t
        let mut psi = vec![vec![0usize; l]; s];

        for i in 0..s {
            delta.set(i, 0, self.initial[i] * self.emission.get(i, obs[0]));
        }
        for t in 1..l {
            for i in 0..s {
                let mut best = f64::NEG_INFINITY;
                let mut arg = 0;
                for k in 0..s {
                    let v = self.transition.get(k, i) * delta.get(k, t - 1);
                    if v > best {
                        best = v;
                        arg = k;
                    }
                }
                delta.set(i, t, self.emission.get(i, obs[t]) * best);
                psi[i][t] = arg;
            }
        }

        let mut z = 0;
        let mut best = f64::NEG_INFINITY;
        for i in 0..s {
            if delta.get(i, l - 1) > best {
                best = delta.get(i, l - 1);
                z = i;
            }
        }

        let mut path_idx = vec![0usize; l];
        path_idx[l - 1] = z;
        for t in (1..l).rev() {
            z = psi[z][t];
            path_idx[t - 1] = z;
        }

        let symbols = self.states.symbols();
        Ok(path_idx.into_iter().map(|i| symbols[i].clone()).collect())
    }
}
