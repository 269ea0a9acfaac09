//! Core domain logic for the carvault vehicle catalog.
//! This crate is the single source of truth for catalog invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::validation::{FieldError, ValidationFailure};
pub use model::vehicle::{
    Brand, Equipment, FileBlob, NewEquipment, NewVehicle, Transmission, Vehicle, VehicleId,
    VehiclePatch, INITIAL_VERSION,
};
pub use repo::brand_repo::{BrandRepository, NewBrand, SqliteBrandRepository};
pub use repo::pageable::{
    create_pageable, create_pageable_clamped, Pageable, Slice, DEFAULT_PAGE_NUMBER,
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
pub use repo::query_builder::SearchCriteria;
pub use repo::vehicle_repo::{
    RepoError, RepoResult, SqliteVehicleRepository, VehicleRepository,
};
pub use service::notifier::{LogNotifier, Notification, Notifier};
pub use service::read_service::VehicleReadService;
pub use service::write_service::{UpdateParams, VehicleWriteService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
