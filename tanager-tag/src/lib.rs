//! Hidden Markov Model part-of-speech tagging for the Tanager ecosystem.
//!
//! `tanager-tag` provides:
//!
//! - **Engine** — [`Hmm`] with forward/backward, posterior and pairwise
//!   marginals, and Viterbi decoding over symbolic state and observation
//!   dictionaries
//! - **Training** — [`train`], supervised frequency-count estimation from
//!   tagged sentences
//! - **Tagging** — [`tag`], vocabulary extension for unseen words followed
//!   by per-sentence Viterbi decoding

pub mod corpus;
pub mod hmm;
pub mod train;
pub mod vocab;

pub use corpus::TaggedSentence;
pub use hmm::Hmm;
pub use train::{tag, train};
pub use vocab::SymbolTable;
