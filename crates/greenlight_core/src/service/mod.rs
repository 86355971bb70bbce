//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate credential handling, validation and store calls into
//!   use-case level APIs.
//! - Keep transport layers decoupled from storage details.
//!
//! # Invariants
//! - Services never retry on `EditConflict`; the caller owns the
//!   read-modify-write loop.

pub mod movie_service;
pub mod user_service;
