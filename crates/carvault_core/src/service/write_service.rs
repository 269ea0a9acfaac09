//! Vehicle write service.
//!
//! # Responsibility
//! - Create, update, delete and file-replace operations on the vehicle
//!   aggregate, with uniqueness checks and optimistic concurrency control.
//! - Trigger the post-commit creation notification.
//!
//! # Invariants
//! - A missing brand or duplicate chassis number never leaves a partially
//!   created aggregate behind.
//! - The version comparison is strictly-less: a submitted version ahead of
//!   the stored one is accepted. This is the established concurrency
//!   contract; do not tighten it to inequality.
//! - Notification failures are logged and never roll back a commit.

use crate::model::validation::{validate_merged_vehicle, validate_new_vehicle};
use crate::model::vehicle::{FileBlob, NewVehicle, VehicleId, VehiclePatch};
use crate::repo::vehicle_repo::{RepoError, RepoResult, VehicleRepository};
use crate::service::notifier::{Notification, Notifier};
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;

/// Quoted-integer shape required for submitted version tokens, e.g. `"3"`.
static VERSION_TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^"\d{1,3}"$"#).expect("version token pattern is valid"));

/// Parameters for `update`.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateParams {
    pub id: VehicleId,
    /// Only the fields present here are merged onto the stored vehicle.
    pub patch: VehiclePatch,
    /// Version token as received from the transport layer, quotes included.
    pub version: String,
}

/// Write-side use-case service over a vehicle repository.
pub struct VehicleWriteService<R: VehicleRepository, N: Notifier> {
    repo: R,
    notifier: N,
}

impl<R: VehicleRepository, N: Notifier> VehicleWriteService<R, N> {
    pub fn new(repo: R, notifier: N) -> Self {
        Self { repo, notifier }
    }

    /// Creates one vehicle aggregate and returns the generated id.
    ///
    /// # Errors
    /// - `Validation` when field constraints are violated.
    /// - `DuplicateKey` when the chassis number is already taken.
    /// - `NotFound` (brand) when the referenced brand does not exist.
    pub fn create(&mut self, input: &NewVehicle) -> RepoResult<VehicleId> {
        debug!(
            "event=create module=write_service chassis_number={}",
            input.chassis_number
        );

        validate_new_vehicle(input)?;

        if self.repo.exists_by_chassis_number(&input.chassis_number)? {
            return Err(RepoError::DuplicateKey {
                field: "chassis_number",
                value: input.chassis_number.clone(),
            });
        }

        if self.repo.find_brand(input.brand_id)?.is_none() {
            return Err(RepoError::NotFound {
                entity: "brand",
                key: input.brand_id.to_string(),
            });
        }

        let id = self.repo.insert_aggregate(input)?;
        info!("event=create module=write_service status=ok id={id}");

        // Side effect after commit; a failure here must not undo the create.
        self.notify_created(id, &input.designation);

        Ok(id)
    }

    /// Updates scalar fields of one vehicle under optimistic concurrency.
    ///
    /// Returns the new version counter assigned by storage.
    ///
    /// # Errors
    /// - `InvalidVersionToken` when the token is not a quoted integer.
    /// - `NotFound` when the id resolves to no vehicle.
    /// - `OutdatedVersion` when the submitted version lags the stored one.
    /// - `DuplicateKey` when the patched chassis number belongs to another
    ///   vehicle.
    /// - `Validation` when the merged fields violate constraints.
    pub fn update(&mut self, params: UpdateParams) -> RepoResult<i64> {
        let UpdateParams { id, patch, version } = params;
        debug!("event=update module=write_service id={id} version={version}");

        let submitted = parse_version_token(&version)?;

        let mut vehicle = self.repo.find_by_id(id)?.ok_or_else(|| RepoError::NotFound {
            entity: "vehicle",
            key: id.to_string(),
        })?;

        if submitted < vehicle.version {
            return Err(RepoError::OutdatedVersion {
                submitted,
                current: vehicle.version,
            });
        }

        // Same uniqueness probe as `create`, but only when the patch moves
        // the chassis number off its stored value.
        if let Some(chassis_number) = patch.chassis_number.as_deref() {
            if chassis_number != vehicle.chassis_number
                && self.repo.exists_by_chassis_number(chassis_number)?
            {
                return Err(RepoError::DuplicateKey {
                    field: "chassis_number",
                    value: chassis_number.to_string(),
                });
            }
        }

        patch.apply_to(&mut vehicle);
        validate_merged_vehicle(&vehicle)?;

        let new_version = self.repo.update_vehicle(&vehicle)?;
        info!("event=update module=write_service status=ok id={id} new_version={new_version}");
        Ok(new_version)
    }

    /// Deletes one aggregate: file, equipment, then the vehicle itself.
    ///
    /// Returns whether the vehicle row deletion affected a row. A lost race
    /// between load and delete yields `false`, not an error.
    ///
    /// # Errors
    /// - `NotFound` when the initial load resolves to no vehicle.
    pub fn delete(&mut self, id: VehicleId) -> RepoResult<bool> {
        debug!("event=delete module=write_service id={id}");

        let vehicle = self.repo.find_by_id(id)?.ok_or_else(|| RepoError::NotFound {
            entity: "vehicle",
            key: id.to_string(),
        })?;

        let deleted = self.repo.delete_aggregate(vehicle.id)?;
        info!("event=delete module=write_service status=ok id={id} deleted={deleted}");
        Ok(deleted)
    }

    /// Stores a binary file for one vehicle, replacing any existing one.
    ///
    /// # Errors
    /// - `NotFound` when the id resolves to no vehicle.
    pub fn add_file(
        &mut self,
        id: VehicleId,
        data: Vec<u8>,
        filename: &str,
        mimetype: &str,
    ) -> RepoResult<FileBlob> {
        debug!(
            "event=add_file module=write_service id={id} filename={filename} mimetype={mimetype}"
        );

        let vehicle = self.repo.find_by_id(id)?.ok_or_else(|| RepoError::NotFound {
            entity: "vehicle",
            key: id.to_string(),
        })?;

        let blob = self
            .repo
            .replace_file(vehicle.id, data, filename, mimetype)?;
        info!("event=add_file module=write_service status=ok id={id} file_id={}", blob.id);
        Ok(blob)
    }

    fn notify_created(&self, id: VehicleId, designation: &str) {
        let notification = Notification {
            subject: format!("New vehicle {id}"),
            body: format!(
                "The vehicle with designation <strong>{designation}</strong> has been created"
            ),
        };
        if let Err(err) = self.notifier.send(&notification) {
            warn!("event=notification module=write_service status=error id={id} error={err}");
        }
    }
}

fn parse_version_token(raw: &str) -> RepoResult<i64> {
    if !VERSION_TOKEN_PATTERN.is_match(raw) {
        return Err(RepoError::InvalidVersionToken(raw.to_string()));
    }

    raw[1..raw.len() - 1]
        .parse::<i64>()
        .map_err(|_| RepoError::InvalidVersionToken(raw.to_string()))
}
