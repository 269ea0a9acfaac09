//! Vehicle aggregate model.
//!
//! # Responsibility
//! - Define the persisted aggregate view (`Vehicle`), its owned parts
//!   (`Equipment`, `FileBlob`) and the referenced `Brand`.
//! - Define the write-side inputs: `NewVehicle` for creation and
//!   `VehiclePatch` for merge-on-update.
//!
//! # Invariants
//! - `version` starts at `INITIAL_VERSION` and strictly increases on every
//!   successful update.
//! - A patch field of `None` means "leave the stored value as-is"; for the
//!   nullable `new_price`, `Some(None)` means "explicitly clear".

use serde::{Deserialize, Serialize};

/// Stable identifier for vehicles. Generated by storage on insert.
pub type VehicleId = i64;

/// Version counter value assigned to a freshly created vehicle.
pub const INITIAL_VERSION: i64 = 1;

/// Gearbox kind of a vehicle's equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Transmission {
    Automatic,
    Manual,
}

/// Equipment owned 1:1 by a vehicle.
///
/// Cannot exist without its owning vehicle; deleted when the vehicle is
/// deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: i64,
    pub air_conditioning: bool,
    pub seat_heating: bool,
    pub transmission: Transmission,
    pub interior_material: String,
}

/// Brand referenced (not owned) by many vehicles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    pub id: i64,
    pub name: String,
    pub founding_year: i64,
    pub founder: String,
}

/// Binary file owned 1:1 by a vehicle, e.g. a photo or a spec sheet.
///
/// At most one per vehicle; replacing it is delete-then-insert, never a
/// partial update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileBlob {
    pub id: i64,
    pub vehicle_id: VehicleId,
    pub filename: String,
    pub mimetype: String,
    #[serde(skip_serializing)]
    pub data: Vec<u8>,
}

/// Persisted vehicle aggregate as returned by read paths.
///
/// Equipment is always inlined (mandatory 1:1); the brand is inlined when the
/// query loaded it and the reference is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    /// Optimistic concurrency counter, compared at write time.
    pub version: i64,
    pub designation: String,
    /// 17-character VIN-shaped string, unique across all vehicles.
    pub chassis_number: String,
    pub year_built: i64,
    pub horsepower: i64,
    pub new_price: Option<f64>,
    pub max_speed: i64,
    pub equipment: Equipment,
    pub brand: Option<Brand>,
    /// Epoch milliseconds, set by storage on insert.
    pub created_at: i64,
    /// Epoch milliseconds, refreshed by storage on every update.
    pub updated_at: i64,
}

/// Equipment input for vehicle creation. Mandatory: a vehicle is never
/// created without equipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEquipment {
    pub air_conditioning: bool,
    pub seat_heating: bool,
    pub transmission: Transmission,
    pub interior_material: String,
}

/// Input for creating one vehicle aggregate atomically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewVehicle {
    pub designation: String,
    pub chassis_number: String,
    pub year_built: i64,
    pub horsepower: i64,
    pub new_price: Option<f64>,
    pub max_speed: i64,
    /// Reference to an existing brand; resolved against storage at create.
    pub brand_id: i64,
    pub equipment: NewEquipment,
}

/// Partial update of scalar vehicle fields.
///
/// Equipment and brand are not updated through this path. `None` leaves the
/// stored value untouched; `new_price` is the one nullable scalar, so it uses
/// a second `Option` level to keep "not provided" and "explicitly cleared"
/// distinguishable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehiclePatch {
    pub designation: Option<String>,
    pub chassis_number: Option<String>,
    pub year_built: Option<i64>,
    pub horsepower: Option<i64>,
    pub new_price: Option<Option<f64>>,
    pub max_speed: Option<i64>,
}

impl VehiclePatch {
    /// Returns whether the patch carries no field at all.
    pub fn is_empty(&self) -> bool {
        self.designation.is_none()
            && self.chassis_number.is_none()
            && self.year_built.is_none()
            && self.horsepower.is_none()
            && self.new_price.is_none()
            && self.max_speed.is_none()
    }

    /// Merges the provided fields onto a loaded vehicle, in place.
    ///
    /// Fields absent from the patch retain their stored values.
    pub fn apply_to(&self, vehicle: &mut Vehicle) {
        if let Some(designation) = &self.designation {
            vehicle.designation = designation.clone();
        }
        if let Some(chassis_number) = &self.chassis_number {
            vehicle.chassis_number = chassis_number.clone();
        }
        if let Some(year_built) = self.year_built {
            vehicle.year_built = year_built;
        }
        if let Some(horsepower) = self.horsepower {
            vehicle.horsepower = horsepower;
        }
        if let Some(new_price) = self.new_price {
            vehicle.new_price = new_price;
        }
        if let Some(max_speed) = self.max_speed {
            vehicle.max_speed = max_speed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded_vehicle() -> Vehicle {
        Vehicle {
            id: 1,
            version: INITIAL_VERSION,
            designation: "Porsche 911".to_string(),
            chassis_number: "WP0ZZZ99ZTS392124".to_string(),
            year_built: 1999,
            horsepower: 225,
            new_price: Some(20_500.0),
            max_speed: 220,
            equipment: Equipment {
                id: 1,
                air_conditioning: true,
                seat_heating: false,
                transmission: Transmission::Manual,
                interior_material: "leather".to_string(),
            },
            brand: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn empty_patch_changes_nothing() {
        let mut vehicle = loaded_vehicle();
        let before = vehicle.clone();
        VehiclePatch::default().apply_to(&mut vehicle);
        assert_eq!(vehicle, before);
    }

    #[test]
    fn patch_merges_only_provided_fields() {
        let mut vehicle = loaded_vehicle();
        let patch = VehiclePatch {
            horsepower: Some(300),
            max_speed: Some(250),
            ..VehiclePatch::default()
        };
        patch.apply_to(&mut vehicle);
        assert_eq!(vehicle.horsepower, 300);
        assert_eq!(vehicle.max_speed, 250);
        assert_eq!(vehicle.designation, "Porsche 911");
        assert_eq!(vehicle.new_price, Some(20_500.0));
    }

    #[test]
    fn patch_distinguishes_clearing_from_omitting_new_price() {
        let mut vehicle = loaded_vehicle();
        let omitted = VehiclePatch::default();
        omitted.apply_to(&mut vehicle);
        assert_eq!(vehicle.new_price, Some(20_500.0));

        let cleared = VehiclePatch {
            new_price: Some(None),
            ..VehiclePatch::default()
        };
        cleared.apply_to(&mut vehicle);
        assert_eq!(vehicle.new_price, None);
    }

    #[test]
    fn transmission_serializes_to_external_enum_names() {
        let automatic = serde_json::to_string(&Transmission::Automatic).unwrap();
        assert_eq!(automatic, "\"AUTOMATIC\"");
        let manual: Transmission = serde_json::from_str("\"MANUAL\"").unwrap();
        assert_eq!(manual, Transmission::Manual);
    }
}
