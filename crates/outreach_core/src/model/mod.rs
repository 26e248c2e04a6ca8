//! Domain model for outreach application records.
//!
//! # Responsibility
//! - Define the canonical record shape shared by repository, engine and
//!   presentation callers.
//! - Own boundary validation for enum-like and date fields.
//!
//! # Invariants
//! - Every persisted record is identified by a store-assigned `ApplicationId`.
//! - Deletion is a hard delete; ids are never resurrected.

pub mod application;
