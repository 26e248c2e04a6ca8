//! Query engine entry points.
//!
//! # Responsibility
//! - Resolve a free-text term plus structured filters into a record subset.
//! - Keep the fuzzy-matching policy (scorer, threshold, cap) inside core.
//!
//! # Invariants
//! - Candidate selection and exact refinement are separate stages.
//! - "No results" is an empty list, never an error.

pub mod engine;
pub mod filter;
pub mod fuzzy;
