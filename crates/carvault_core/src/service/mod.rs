//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into read/write use-case APIs.
//! - Keep transport layers decoupled from storage details.
//!
//! # Invariants
//! - Services never bypass repository persistence contracts.
//! - Concurrency conflicts are detected optimistically via the version
//!   comparison in the write path; nothing is retried internally.

pub mod notifier;
pub mod read_service;
pub mod write_service;
