//! Vehicle repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide aggregate-level persistence APIs over the `vehicle`,
//!   `equipment` and `vehicle_file` tables.
//! - Own the shared `RepoError` taxonomy raised by repositories and
//!   services.
//!
//! # Invariants
//! - Aggregate insert, cascading delete and file replacement each run in one
//!   `Immediate` transaction; a partial aggregate must never be observable.
//! - `version` is bumped by storage on every successful update and never
//!   decreases.
//! - At most one `vehicle_file` row exists per vehicle at any time.

use crate::db::DbError;
use crate::model::validation::ValidationFailure;
use crate::model::vehicle::{
    Brand, Equipment, FileBlob, NewVehicle, Transmission, Vehicle, VehicleId, INITIAL_VERSION,
};
use crate::repo::pageable::{Pageable, Slice};
use crate::repo::query_builder::{self, SearchCriteria};
use log::debug;
use rusqlite::{params, params_from_iter, Connection, Row, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Error taxonomy shared by the read and write paths.
///
/// All variants propagate to the transport layer unchanged; nothing is
/// retried internally.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// No row for the given entity kind and lookup key.
    NotFound {
        entity: &'static str,
        key: String,
    },
    /// A unique field already holds the given value.
    DuplicateKey {
        field: &'static str,
        value: String,
    },
    /// The submitted version string does not have the quoted-integer shape.
    InvalidVersionToken(String),
    /// The submitted version lags behind the stored one.
    OutdatedVersion {
        submitted: i64,
        current: i64,
    },
    Validation(ValidationFailure),
    /// Persisted state failed to parse; surfaced instead of masked.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, key } => write!(f, "{entity} not found: {key}"),
            Self::DuplicateKey { field, value } => {
                write!(f, "{field} `{value}` already exists")
            }
            Self::InvalidVersionToken(raw) => write!(f, "invalid version token: {raw}"),
            Self::OutdatedVersion { submitted, current } => write!(
                f,
                "submitted version {submitted} is outdated, current version is {current}"
            ),
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<ValidationFailure> for RepoError {
    fn from(value: ValidationFailure) -> Self {
        Self::Validation(value)
    }
}

/// Repository interface for the vehicle aggregate.
pub trait VehicleRepository {
    /// Loads one full aggregate (equipment inlined, brand when present).
    fn find_by_id(&self, id: VehicleId) -> RepoResult<Option<Vehicle>>;
    /// Runs a filtered, paginated query; `total_elements` ignores the window.
    fn find(&self, criteria: &SearchCriteria, pageable: Pageable) -> RepoResult<Slice<Vehicle>>;
    /// Probes chassis-number uniqueness before an insert.
    fn exists_by_chassis_number(&self, chassis_number: &str) -> RepoResult<bool>;
    /// Resolves the non-owning brand reference.
    fn find_brand(&self, id: i64) -> RepoResult<Option<Brand>>;
    /// Inserts vehicle and equipment atomically, returns the generated id.
    fn insert_aggregate(&mut self, input: &NewVehicle) -> RepoResult<VehicleId>;
    /// Persists merged scalar fields, bumps and returns the new version.
    fn update_vehicle(&mut self, vehicle: &Vehicle) -> RepoResult<i64>;
    /// Deletes file, equipment and vehicle in one transaction; returns
    /// whether the vehicle row deletion affected a row.
    fn delete_aggregate(&mut self, id: VehicleId) -> RepoResult<bool>;
    /// Replaces the owned file (delete-then-insert) in one transaction.
    fn replace_file(
        &mut self,
        vehicle_id: VehicleId,
        data: Vec<u8>,
        filename: &str,
        mimetype: &str,
    ) -> RepoResult<FileBlob>;
    /// Loads the owned file, if any.
    fn find_file_by_vehicle_id(&self, vehicle_id: VehicleId) -> RepoResult<Option<FileBlob>>;
}

/// SQLite-backed vehicle repository.
pub struct SqliteVehicleRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteVehicleRepository<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl VehicleRepository for SqliteVehicleRepository<'_> {
    fn find_by_id(&self, id: VehicleId) -> RepoResult<Option<Vehicle>> {
        let query = query_builder::build_by_id(id);
        let mut stmt = self.conn.prepare(&query.sql)?;
        let mut rows = stmt.query(params_from_iter(query.binds))?;

        if let Some(row) = rows.next()? {
            return Ok(Some(parse_aggregate_row(row)?));
        }

        Ok(None)
    }

    fn find(&self, criteria: &SearchCriteria, pageable: Pageable) -> RepoResult<Slice<Vehicle>> {
        let query = query_builder::build(criteria, pageable);
        debug!(
            "event=find module=vehicle_repo page={} size={}",
            pageable.number, pageable.size
        );

        let mut stmt = self.conn.prepare(&query.sql)?;
        let mut rows = stmt.query(params_from_iter(query.binds.clone()))?;
        let mut content = Vec::new();
        while let Some(row) = rows.next()? {
            content.push(parse_filter_row(row)?);
        }

        let total_elements: i64 =
            self.conn
                .query_row(&query.count_sql, params_from_iter(query.binds), |row| {
                    row.get(0)
                })?;

        Ok(Slice {
            content,
            total_elements,
        })
    }

    fn exists_by_chassis_number(&self, chassis_number: &str) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM vehicle WHERE chassis_number = ?1);",
            [chassis_number],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn find_brand(&self, id: i64) -> RepoResult<Option<Brand>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, founding_year, founder
             FROM brand
             WHERE id = ?1;",
        )?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(Brand {
                id: row.get("id")?,
                name: row.get("name")?,
                founding_year: row.get("founding_year")?,
                founder: row.get("founder")?,
            }));
        }
        Ok(None)
    }

    fn insert_aggregate(&mut self, input: &NewVehicle) -> RepoResult<VehicleId> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
            "INSERT INTO vehicle (
                version,
                designation,
                chassis_number,
                year_built,
                horsepower,
                new_price,
                max_speed,
                brand_id,
                created_at,
                updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8,
                (strftime('%s', 'now') * 1000),
                (strftime('%s', 'now') * 1000)
            );",
            params![
                INITIAL_VERSION,
                input.designation.as_str(),
                input.chassis_number.as_str(),
                input.year_built,
                input.horsepower,
                input.new_price,
                input.max_speed,
                input.brand_id,
            ],
        )?;
        let vehicle_id = tx.last_insert_rowid();

        tx.execute(
            "INSERT INTO equipment (
                vehicle_id,
                air_conditioning,
                seat_heating,
                transmission,
                interior_material
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                vehicle_id,
                bool_to_int(input.equipment.air_conditioning),
                bool_to_int(input.equipment.seat_heating),
                transmission_to_db(input.equipment.transmission),
                input.equipment.interior_material.as_str(),
            ],
        )?;

        tx.commit()?;
        Ok(vehicle_id)
    }

    fn update_vehicle(&mut self, vehicle: &Vehicle) -> RepoResult<i64> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let changed = tx.execute(
            "UPDATE vehicle
             SET
                designation = ?1,
                chassis_number = ?2,
                year_built = ?3,
                horsepower = ?4,
                new_price = ?5,
                max_speed = ?6,
                version = version + 1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?7;",
            params![
                vehicle.designation.as_str(),
                vehicle.chassis_number.as_str(),
                vehicle.year_built,
                vehicle.horsepower,
                vehicle.new_price,
                vehicle.max_speed,
                vehicle.id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "vehicle",
                key: vehicle.id.to_string(),
            });
        }

        let new_version: i64 = tx.query_row(
            "SELECT version FROM vehicle WHERE id = ?1;",
            [vehicle.id],
            |row| row.get(0),
        )?;

        tx.commit()?;
        Ok(new_version)
    }

    fn delete_aggregate(&mut self, id: VehicleId) -> RepoResult<bool> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        // Owned rows first: foreign keys forbid the reverse order.
        tx.execute("DELETE FROM vehicle_file WHERE vehicle_id = ?1;", [id])?;
        tx.execute("DELETE FROM equipment WHERE vehicle_id = ?1;", [id])?;
        let affected = tx.execute("DELETE FROM vehicle WHERE id = ?1;", [id])?;

        tx.commit()?;
        Ok(affected > 0)
    }

    fn replace_file(
        &mut self,
        vehicle_id: VehicleId,
        data: Vec<u8>,
        filename: &str,
        mimetype: &str,
    ) -> RepoResult<FileBlob> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
            "DELETE FROM vehicle_file WHERE vehicle_id = ?1;",
            [vehicle_id],
        )?;
        tx.execute(
            "INSERT INTO vehicle_file (vehicle_id, filename, mimetype, data)
             VALUES (?1, ?2, ?3, ?4);",
            params![vehicle_id, filename, mimetype, data.as_slice()],
        )?;
        let id = tx.last_insert_rowid();

        tx.commit()?;
        Ok(FileBlob {
            id,
            vehicle_id,
            filename: filename.to_string(),
            mimetype: mimetype.to_string(),
            data,
        })
    }

    fn find_file_by_vehicle_id(&self, vehicle_id: VehicleId) -> RepoResult<Option<FileBlob>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, vehicle_id, filename, mimetype, data
             FROM vehicle_file
             WHERE vehicle_id = ?1;",
        )?;
        let mut rows = stmt.query([vehicle_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(FileBlob {
                id: row.get("id")?,
                vehicle_id: row.get("vehicle_id")?,
                filename: row.get("filename")?,
                mimetype: row.get("mimetype")?,
                data: row.get("data")?,
            }));
        }
        Ok(None)
    }
}

fn parse_filter_row(row: &Row<'_>) -> RepoResult<Vehicle> {
    parse_vehicle_row(row, false)
}

fn parse_aggregate_row(row: &Row<'_>) -> RepoResult<Vehicle> {
    parse_vehicle_row(row, true)
}

fn parse_vehicle_row(row: &Row<'_>, with_brand: bool) -> RepoResult<Vehicle> {
    let transmission_text: String = row.get("transmission")?;
    let transmission = parse_transmission(&transmission_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid transmission value `{transmission_text}` in equipment.transmission"
        ))
    })?;

    let equipment = Equipment {
        id: row.get("equipment_id")?,
        air_conditioning: int_to_bool(row.get("air_conditioning")?, "equipment.air_conditioning")?,
        seat_heating: int_to_bool(row.get("seat_heating")?, "equipment.seat_heating")?,
        transmission,
        interior_material: row.get("interior_material")?,
    };

    let brand = if with_brand {
        match row.get::<_, Option<i64>>("brand_id")? {
            Some(brand_id) => Some(Brand {
                id: brand_id,
                name: row.get("brand_name")?,
                founding_year: row.get("brand_founding_year")?,
                founder: row.get("brand_founder")?,
            }),
            None => None,
        }
    } else {
        None
    };

    Ok(Vehicle {
        id: row.get("id")?,
        version: row.get("version")?,
        designation: row.get("designation")?,
        chassis_number: row.get("chassis_number")?,
        year_built: row.get("year_built")?,
        horsepower: row.get("horsepower")?,
        new_price: row.get("new_price")?,
        max_speed: row.get("max_speed")?,
        equipment,
        brand,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub(crate) fn transmission_to_db(transmission: Transmission) -> &'static str {
    match transmission {
        Transmission::Automatic => "AUTOMATIC",
        Transmission::Manual => "MANUAL",
    }
}

fn parse_transmission(value: &str) -> Option<Transmission> {
    match value {
        "AUTOMATIC" => Some(Transmission::Automatic),
        "MANUAL" => Some(Transmission::Manual),
        _ => None,
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}
