//! Predicate builder: sparse filter criteria to composed query plans.
//!
//! # Responsibility
//! - Translate a `SearchCriteria` object into SQL over `vehicle` joined with
//!   `equipment`, paginated per `Pageable`.
//! - Produce the matching unpaginated count query for `total_elements`.
//!
//! # Invariants
//! - Predicates are AND-combined in a fixed order: designation, horsepower,
//!   max_speed, then the remaining equality keys.
//! - Unparsable numeric criteria are dropped silently, never raised as
//!   errors (lenient-parse policy).
//! - Every plan orders by `vehicle.id ASC` so identical requests return
//!   identical row sets across calls.

use crate::model::vehicle::{Transmission, VehicleId};
use crate::repo::pageable::Pageable;
use crate::repo::vehicle_repo::transmission_to_db;
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

const FILTER_SELECT_SQL: &str = "SELECT
    vehicle.id,
    vehicle.version,
    vehicle.designation,
    vehicle.chassis_number,
    vehicle.year_built,
    vehicle.horsepower,
    vehicle.new_price,
    vehicle.max_speed,
    vehicle.created_at,
    vehicle.updated_at,
    equipment.id AS equipment_id,
    equipment.air_conditioning,
    equipment.seat_heating,
    equipment.transmission,
    equipment.interior_material
FROM vehicle
INNER JOIN equipment ON equipment.vehicle_id = vehicle.id";

const FILTER_COUNT_SQL: &str = "SELECT COUNT(*)
FROM vehicle
INNER JOIN equipment ON equipment.vehicle_id = vehicle.id";

const AGGREGATE_SELECT_SQL: &str = "SELECT
    vehicle.id,
    vehicle.version,
    vehicle.designation,
    vehicle.chassis_number,
    vehicle.year_built,
    vehicle.horsepower,
    vehicle.new_price,
    vehicle.max_speed,
    vehicle.created_at,
    vehicle.updated_at,
    equipment.id AS equipment_id,
    equipment.air_conditioning,
    equipment.seat_heating,
    equipment.transmission,
    equipment.interior_material,
    brand.id AS brand_id,
    brand.name AS brand_name,
    brand.founding_year AS brand_founding_year,
    brand.founder AS brand_founder
FROM vehicle
INNER JOIN equipment ON equipment.vehicle_id = vehicle.id
LEFT JOIN brand ON brand.id = vehicle.brand_id";

/// Sparse filter object for `find`. Absent fields add no predicate.
///
/// `horsepower` and `max_speed` arrive as raw strings from the transport
/// layer and are parsed leniently; the other fields are typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchCriteria {
    /// Case-insensitive substring match on the designation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
    /// Inclusive lower bound, lenient-parsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horsepower: Option<String>,
    /// Inclusive upper bound, lenient-parsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_speed: Option<String>,
    /// Exact match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_built: Option<i64>,
    /// Exact match on the joined equipment row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transmission: Option<Transmission>,
}

impl SearchCriteria {
    /// Returns whether no criterion is set at all.
    pub fn is_empty(&self) -> bool {
        self.designation.is_none()
            && self.horsepower.is_none()
            && self.max_speed.is_none()
            && self.year_built.is_none()
            && self.transmission.is_none()
    }
}

/// An executable query plan: row SQL, count SQL and the shared WHERE binds.
///
/// LIMIT/OFFSET values are baked into `sql` from the normalized pageable, so
/// `binds` applies to both statements unchanged.
#[derive(Debug, Clone)]
pub struct VehicleQuery {
    pub sql: String,
    pub count_sql: String,
    pub binds: Vec<Value>,
}

/// Builds the single-row lookup plan: vehicle inner-joined with equipment,
/// left-joined with brand, no pagination.
pub fn build_by_id(id: VehicleId) -> VehicleQuery {
    VehicleQuery {
        sql: format!("{AGGREGATE_SELECT_SQL}\nWHERE vehicle.id = ?;"),
        count_sql: String::new(),
        binds: vec![Value::Integer(id)],
    }
}

/// Builds the filtered, paginated plan for `find`.
///
/// Empty criteria produce no WHERE clause, so the plan returns all vehicles
/// (still paginated and ordered). A pageable size of 0 skips LIMIT/OFFSET.
pub fn build(criteria: &SearchCriteria, pageable: Pageable) -> VehicleQuery {
    let mut predicates: Vec<&'static str> = Vec::new();
    let mut binds: Vec<Value> = Vec::new();

    if let Some(designation) = &criteria.designation {
        // SQLite LIKE is ASCII-case-insensitive, standing in for ILIKE.
        predicates.push("vehicle.designation LIKE ?");
        binds.push(Value::Text(format!("%{designation}%")));
    }

    if let Some(raw) = criteria.horsepower.as_deref() {
        if let Some(horsepower) = parse_int_lenient(raw) {
            predicates.push("vehicle.horsepower >= ?");
            binds.push(Value::Integer(horsepower));
        }
    }

    if let Some(raw) = criteria.max_speed.as_deref() {
        if let Some(max_speed) = parse_int_lenient(raw) {
            predicates.push("vehicle.max_speed <= ?");
            binds.push(Value::Integer(max_speed));
        }
    }

    if let Some(year_built) = criteria.year_built {
        predicates.push("vehicle.year_built = ?");
        binds.push(Value::Integer(year_built));
    }

    if let Some(transmission) = criteria.transmission {
        predicates.push("equipment.transmission = ?");
        binds.push(Value::Text(transmission_to_db(transmission).to_string()));
    }

    let where_sql = if predicates.is_empty() {
        String::new()
    } else {
        format!("\nWHERE {}", predicates.join(" AND "))
    };

    let mut sql = format!("{FILTER_SELECT_SQL}{where_sql}\nORDER BY vehicle.id ASC");
    if pageable.size != 0 {
        // A pathological page index saturates into an empty page.
        let skip = pageable.number.saturating_mul(pageable.size);
        sql.push_str(&format!("\nLIMIT {} OFFSET {skip}", pageable.size));
    }
    sql.push(';');

    let count_sql = format!("{FILTER_COUNT_SQL}{where_sql};");

    VehicleQuery {
        sql,
        count_sql,
        binds,
    }
}

/// Parses the leading integer of a raw criterion value.
///
/// Mirrors the lenient numeric handling of query parameters: an optional
/// sign followed by at least one digit; trailing garbage is ignored, and a
/// value with no leading digits yields `None`.
pub fn parse_int_lenient(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    let (sign, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }

    digits.parse::<i64>().ok().map(|value| sign * value)
}
