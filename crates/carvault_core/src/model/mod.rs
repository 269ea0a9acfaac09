//! Domain model for the vehicle catalog aggregate.
//!
//! # Responsibility
//! - Define the canonical data structures used by core business logic.
//! - Keep the aggregate boundary explicit: a vehicle owns its equipment and
//!   optional file, and merely references a brand.
//!
//! # Invariants
//! - Every vehicle is identified by a stable `VehicleId`.
//! - `version` strictly increases on every successful update.
//! - Equipment never exists without its owning vehicle.

pub mod validation;
pub mod vehicle;
