//! Field validation for vehicle write inputs.
//!
//! # Responsibility
//! - Provide an explicit, composable list of field validators.
//! - Aggregate all violations into one `ValidationFailure` instead of
//!   stopping at the first.
//!
//! # Invariants
//! - Error parts are ordered by field declaration order.
//! - Each part is prefixed by its field name; embedded objects use a dotted
//!   path (`equipment.interior_material`).
//! - The aggregated message joins parts with `"; "` so callers can split it
//!   back into individual field errors.

use crate::model::vehicle::{NewVehicle, Vehicle};
use chrono::Datelike;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Karl Benz's Patent-Motorwagen. No earlier year is accepted.
pub const MIN_YEAR_BUILT: i64 = 1886;

/// VIN shape: 17 characters, no I, O or Q.
static CHASSIS_NUMBER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-HJ-NPR-Z0-9]{17}$").expect("chassis number pattern is valid"));

/// One violated constraint, addressed by (dotted) field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub reason: String,
}

/// Aggregated validation outcome carrying every violated field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    pub errors: Vec<FieldError>,
}

impl Display for ValidationFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|error| format!("{} {}", error.field, error.reason))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl Error for ValidationFailure {}

type NewVehicleValidator = fn(&NewVehicle) -> Option<FieldError>;

/// Validator list in field declaration order. Extend here, never inline.
const NEW_VEHICLE_VALIDATORS: &[NewVehicleValidator] = &[
    |input| check_designation(&input.designation),
    |input| check_chassis_number(&input.chassis_number),
    |input| check_year_built(input.year_built),
    |input| check_horsepower(input.horsepower),
    |input| check_new_price(input.new_price),
    |input| check_max_speed(input.max_speed),
    |input| check_interior_material(&input.equipment.interior_material),
];

/// Validates a creation input, aggregating every violation.
pub fn validate_new_vehicle(input: &NewVehicle) -> Result<(), ValidationFailure> {
    let errors: Vec<FieldError> = NEW_VEHICLE_VALIDATORS
        .iter()
        .filter_map(|validator| validator(input))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationFailure { errors })
    }
}

/// Validates the scalar fields of a merged vehicle before an update persists.
///
/// Equipment is not updated through this path, so only the scalar checks run.
pub fn validate_merged_vehicle(vehicle: &Vehicle) -> Result<(), ValidationFailure> {
    let checks = [
        check_designation(&vehicle.designation),
        check_chassis_number(&vehicle.chassis_number),
        check_year_built(vehicle.year_built),
        check_horsepower(vehicle.horsepower),
        check_new_price(vehicle.new_price),
        check_max_speed(vehicle.max_speed),
    ];
    let errors: Vec<FieldError> = checks.into_iter().flatten().collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationFailure { errors })
    }
}

fn check_designation(designation: &str) -> Option<FieldError> {
    if designation.trim().is_empty() {
        return Some(field_error("designation", "must not be empty"));
    }
    None
}

fn check_chassis_number(chassis_number: &str) -> Option<FieldError> {
    if !CHASSIS_NUMBER_PATTERN.is_match(chassis_number) {
        return Some(field_error(
            "chassis_number",
            "must be 17 characters and must not contain I, O or Q",
        ));
    }
    None
}

fn check_year_built(year_built: i64) -> Option<FieldError> {
    let current_year = i64::from(chrono::Utc::now().year());
    if year_built < MIN_YEAR_BUILT || year_built > current_year {
        return Some(field_error(
            "year_built",
            format!("must be between {MIN_YEAR_BUILT} and {current_year}"),
        ));
    }
    None
}

fn check_horsepower(horsepower: i64) -> Option<FieldError> {
    if horsepower <= 0 {
        return Some(field_error("horsepower", "must be positive"));
    }
    None
}

fn check_new_price(new_price: Option<f64>) -> Option<FieldError> {
    match new_price {
        Some(price) if !price.is_finite() || price < 0.0 => {
            Some(field_error("new_price", "must be a non-negative amount"))
        }
        _ => None,
    }
}

fn check_max_speed(max_speed: i64) -> Option<FieldError> {
    if max_speed <= 0 {
        return Some(field_error("max_speed", "must be positive"));
    }
    None
}

fn check_interior_material(interior_material: &str) -> Option<FieldError> {
    if interior_material.trim().is_empty() {
        return Some(field_error(
            "equipment.interior_material",
            "must not be empty",
        ));
    }
    None
}

fn field_error(field: &str, reason: impl Into<String>) -> FieldError {
    FieldError {
        field: field.to_string(),
        reason: reason.into(),
    }
}
