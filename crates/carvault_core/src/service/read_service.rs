//! Vehicle read service.
//!
//! # Responsibility
//! - Single-entity and filtered multi-entity lookup on top of the predicate
//!   builder and repository.
//! - Turn empty result sets into `NotFound` errors whose message lets the
//!   caller tell "no matches for this filter" from "page out of range".
//!
//! # Invariants
//! - `total_elements` is always the unpaginated match count for the filter.
//! - Absent or empty criteria delegate to the all-vehicles path.

use crate::model::vehicle::{FileBlob, Vehicle, VehicleId};
use crate::repo::pageable::{Pageable, Slice};
use crate::repo::query_builder::SearchCriteria;
use crate::repo::vehicle_repo::{RepoError, RepoResult, VehicleRepository};
use log::debug;

/// Read-side use-case service over a vehicle repository.
pub struct VehicleReadService<R: VehicleRepository> {
    repo: R,
}

impl<R: VehicleRepository> VehicleReadService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Loads one aggregate by id.
    ///
    /// # Errors
    /// - `NotFound` when no vehicle has the given id.
    pub fn find_by_id(&self, id: VehicleId) -> RepoResult<Vehicle> {
        debug!("event=find_by_id module=read_service id={id}");
        self.repo.find_by_id(id)?.ok_or_else(|| RepoError::NotFound {
            entity: "vehicle",
            key: id.to_string(),
        })
    }

    /// Runs a filtered, paginated search.
    ///
    /// # Errors
    /// - `NotFound` with the serialized criteria and requested page when the
    ///   filter matches nothing.
    /// - `NotFound` with an invalid-page key when empty criteria paired with
    ///   a page index land beyond the data.
    pub fn find(
        &self,
        criteria: Option<&SearchCriteria>,
        pageable: Pageable,
    ) -> RepoResult<Slice<Vehicle>> {
        debug!(
            "event=find module=read_service page={} size={}",
            pageable.number, pageable.size
        );

        let criteria = match criteria {
            Some(criteria) if !criteria.is_empty() => criteria,
            _ => return self.find_all(pageable),
        };

        let slice = self.repo.find(criteria, pageable)?;
        if slice.content.is_empty() {
            debug!("event=find module=read_service status=empty");
            return Err(RepoError::NotFound {
                entity: "vehicle",
                key: format!(
                    "criteria {}, page {}",
                    serialize_criteria(criteria),
                    pageable.number
                ),
            });
        }

        Ok(slice)
    }

    /// Loads the binary file owned by a vehicle, if one exists.
    ///
    /// Boundary for the blob delivery collaborator; `None` is not an error.
    pub fn find_file_by_vehicle_id(&self, vehicle_id: VehicleId) -> RepoResult<Option<FileBlob>> {
        debug!("event=find_file module=read_service vehicle_id={vehicle_id}");
        self.repo.find_file_by_vehicle_id(vehicle_id)
    }

    fn find_all(&self, pageable: Pageable) -> RepoResult<Slice<Vehicle>> {
        let slice = self.repo.find(&SearchCriteria::default(), pageable)?;
        if slice.content.is_empty() {
            return Err(RepoError::NotFound {
                entity: "vehicle",
                key: format!("invalid page {}", pageable.number),
            });
        }
        Ok(slice)
    }
}

fn serialize_criteria(criteria: &SearchCriteria) -> String {
    serde_json::to_string(criteria).unwrap_or_else(|_| "<unserializable criteria>".to_string())
}
