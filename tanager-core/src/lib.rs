//! Shared primitives for the Tanager part-of-speech tagging ecosystem.
//!
//! `tanager-core` provides the foundation that the other Tanager crates
//! build on:
//!
//! - **Error types** — [`TanagerError`] and [`Result`] for structured error handling
//! - **Matrices** — [`Mat`], a dense row-major matrix with append-only column growth

pub mod error;
pub mod matrix;

pub use error::{Result, TanagerError};
pub use matrix::Mat;
