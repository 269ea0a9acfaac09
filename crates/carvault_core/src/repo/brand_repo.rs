//! Brand repository: reference-data management for the non-owning side.
//!
//! # Responsibility
//! - Create and look up brands referenced by vehicles.
//!
//! # Invariants
//! - Deleting a brand is out of scope; no cascade onto vehicles exists.

use crate::model::vehicle::Brand;
use crate::repo::vehicle_repo::RepoResult;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

/// Input for creating one brand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBrand {
    pub name: String,
    pub founding_year: i64,
    pub founder: String,
}

/// Repository interface for brand reference data.
pub trait BrandRepository {
    fn create_brand(&self, input: &NewBrand) -> RepoResult<i64>;
    fn get_brand(&self, id: i64) -> RepoResult<Option<Brand>>;
    fn list_brands(&self) -> RepoResult<Vec<Brand>>;
}

/// SQLite-backed brand repository.
pub struct SqliteBrandRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBrandRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl BrandRepository for SqliteBrandRepository<'_> {
    fn create_brand(&self, input: &NewBrand) -> RepoResult<i64> {
        self.conn.execute(
            "INSERT INTO brand (name, founding_year, founder)
             VALUES (?1, ?2, ?3);",
            params![
                input.name.as_str(),
                input.founding_year,
                input.founder.as_str()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_brand(&self, id: i64) -> RepoResult<Option<Brand>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, founding_year, founder
             FROM brand
             WHERE id = ?1;",
        )?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_brand_row(row)?));
        }
        Ok(None)
    }

    fn list_brands(&self) -> RepoResult<Vec<Brand>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, founding_year, founder
             FROM brand
             ORDER BY name ASC, id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut brands = Vec::new();
        while let Some(row) = rows.next()? {
            brands.push(parse_brand_row(row)?);
        }
        Ok(brands)
    }
}

fn parse_brand_row(row: &rusqlite::Row<'_>) -> RepoResult<Brand> {
    Ok(Brand {
        id: row.get("id")?,
        name: row.get("name")?,
        founding_year: row.get("founding_year")?,
        founder: row.get("founder")?,
    })
}
