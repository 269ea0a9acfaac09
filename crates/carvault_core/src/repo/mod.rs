//! Repository layer: query construction and SQLite persistence.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for the vehicle
//!   aggregate and its referenced brand.
//! - Translate sparse filter criteria into composed, paginated query plans.
//! - Isolate SQL details from service orchestration.
//!
//! # Invariants
//! - Multi-row writes (aggregate insert, cascading delete, file replace)
//!   run inside a single transaction.
//! - Repository APIs return semantic errors (`NotFound`, `DuplicateKey`) in
//!   addition to DB transport errors.

pub mod brand_repo;
pub mod pageable;
pub mod query_builder;
pub mod vehicle_repo;
