//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository and query-engine calls into use-case APIs.
//! - Keep presentation callers decoupled from storage details.

pub mod application_service;
