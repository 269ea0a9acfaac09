use carvault_core::db::open_db_in_memory;
use carvault_core::{
    BrandRepository, LogNotifier, NewBrand, NewEquipment, NewVehicle, Pageable, RepoError,
    SearchCriteria, Slice, SqliteBrandRepository, SqliteVehicleRepository, Transmission, Vehicle,
    VehicleReadService, VehicleWriteService,
};
use rusqlite::Connection;

#[test]
fn designation_filter_matches_substrings_case_insensitively() {
    let mut conn = seeded_db();

    let slice = find(
        &mut conn,
        SearchCriteria {
            designation: Some("911".to_string()),
            ..SearchCriteria::default()
        },
        page(0, 10),
    )
    .unwrap();
    assert_eq!(designations(&slice), ["Porsche 911 Carrera", "Porsche 911 Turbo"]);

    let slice = find(
        &mut conn,
        SearchCriteria {
            designation: Some("cayenne".to_string()),
            ..SearchCriteria::default()
        },
        page(0, 10),
    )
    .unwrap();
    assert_eq!(designations(&slice), ["Porsche Cayenne"]);
}

#[test]
fn total_elements_counts_matches_beyond_the_page_window() {
    let mut conn = seeded_db();

    let slice = find(
        &mut conn,
        SearchCriteria {
            designation: Some("Porsche".to_string()),
            ..SearchCriteria::default()
        },
        page(0, 2),
    )
    .unwrap();

    assert_eq!(slice.content.len(), 2);
    assert_eq!(slice.total_elements, 3);
}

#[test]
fn horsepower_filter_is_an_inclusive_lower_bound() {
    let mut conn = seeded_db();

    let slice = find(
        &mut conn,
        SearchCriteria {
            horsepower: Some("340".to_string()),
            ..SearchCriteria::default()
        },
        page(0, 10),
    )
    .unwrap();

    assert_eq!(designations(&slice), ["Porsche 911 Turbo", "Porsche Cayenne"]);
}

#[test]
fn unparsable_horsepower_widens_instead_of_failing() {
    let mut conn = seeded_db();

    let slice = find(
        &mut conn,
        SearchCriteria {
            horsepower: Some("plenty".to_string()),
            ..SearchCriteria::default()
        },
        page(0, 10),
    )
    .unwrap();

    assert_eq!(slice.total_elements, 4);
}

#[test]
fn max_speed_applies_inclusive_upper_bound_when_value_parses() {
    let mut conn = seeded_db();

    let slice = find(
        &mut conn,
        SearchCriteria {
            max_speed: Some("240".to_string()),
            ..SearchCriteria::default()
        },
        page(0, 10),
    )
    .unwrap();
    assert_eq!(designations(&slice), ["Porsche Cayenne", "VW Golf GTI"]);

    // Trailing garbage after the digits is tolerated.
    let slice = find(
        &mut conn,
        SearchCriteria {
            max_speed: Some("240 km/h".to_string()),
            ..SearchCriteria::default()
        },
        page(0, 10),
    )
    .unwrap();
    assert_eq!(slice.total_elements, 2);
}

#[test]
fn year_built_and_transmission_filter_by_equality() {
    let mut conn = seeded_db();

    let slice = find(
        &mut conn,
        SearchCriteria {
            year_built: Some(2001),
            transmission: Some(Transmission::Manual),
            ..SearchCriteria::default()
        },
        page(0, 10),
    )
    .unwrap();

    assert_eq!(designations(&slice), ["Porsche 911 Turbo", "VW Golf GTI"]);
}

#[test]
fn zero_match_filter_fails_with_criteria_and_page_in_the_key() {
    let mut conn = seeded_db();

    let err = find(
        &mut conn,
        SearchCriteria {
            designation: Some("Trabant".to_string()),
            year_built: Some(1960),
            ..SearchCriteria::default()
        },
        page(2, 5),
    )
    .unwrap_err();

    let RepoError::NotFound { entity, key } = err else {
        panic!("expected not-found");
    };
    assert_eq!(entity, "vehicle");
    assert!(key.contains(r#""designation":"Trabant""#), "key was: {key}");
    assert!(key.contains(r#""year_built":1960"#), "key was: {key}");
    assert!(!key.contains("horsepower"), "unset fields must not leak: {key}");
    assert!(key.ends_with("page 2"), "key was: {key}");
}

#[test]
fn absent_and_empty_criteria_return_all_vehicles_paginated() {
    let mut conn = seeded_db();

    let all = find_opt(&mut conn, None, page(0, 10)).unwrap();
    assert_eq!(all.content.len(), 4);
    assert_eq!(all.total_elements, 4);

    let empty = find(&mut conn, SearchCriteria::default(), page(1, 3)).unwrap();
    assert_eq!(empty.content.len(), 1);
    assert_eq!(empty.total_elements, 4);
}

#[test]
fn page_beyond_the_data_fails_with_invalid_page_key() {
    let mut conn = seeded_db();

    let err = find_opt(&mut conn, None, page(7, 10)).unwrap_err();

    assert!(matches!(
        err,
        RepoError::NotFound { entity: "vehicle", key } if key == "invalid page 7"
    ));
}

#[test]
fn identical_requests_return_identical_pages() {
    let mut conn = seeded_db();
    let criteria = SearchCriteria {
        designation: Some("Porsche".to_string()),
        ..SearchCriteria::default()
    };

    let first = find(&mut conn, criteria.clone(), page(1, 2)).unwrap();
    let second = find(&mut conn, criteria, page(1, 2)).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.content.len(), 1);
}

#[test]
fn size_zero_returns_the_unbounded_result_set() {
    let mut conn = seeded_db();

    let slice = find_opt(&mut conn, None, page(0, 0)).unwrap();

    assert_eq!(slice.content.len(), 4);
    assert_eq!(slice.total_elements, 4);
}

#[test]
fn filter_rows_inline_equipment_but_not_the_brand() {
    let mut conn = seeded_db();

    let slice = find(
        &mut conn,
        SearchCriteria {
            designation: Some("Carrera".to_string()),
            ..SearchCriteria::default()
        },
        page(0, 10),
    )
    .unwrap();

    let vehicle = &slice.content[0];
    assert_eq!(vehicle.equipment.transmission, Transmission::Manual);
    assert_eq!(vehicle.equipment.interior_material, "leather");
    assert!(vehicle.brand.is_none(), "list rows skip the brand join");
}

fn seeded_db() -> Connection {
    let mut conn = open_db_in_memory().unwrap();
    let brand_id = SqliteBrandRepository::new(&conn)
        .create_brand(&NewBrand {
            name: "Porsche".to_string(),
            founding_year: 1931,
            founder: "Ferdinand Porsche".to_string(),
        })
        .unwrap();

    let fleet = [
        ("Porsche 911 Carrera", 300, 260, 1999, Transmission::Manual),
        ("Porsche 911 Turbo", 420, 305, 2001, Transmission::Manual),
        ("Porsche Cayenne", 340, 240, 2005, Transmission::Automatic),
        ("VW Golf GTI", 180, 220, 2001, Transmission::Manual),
    ];

    let mut service =
        VehicleWriteService::new(SqliteVehicleRepository::new(&mut conn), LogNotifier);
    for (index, (designation, horsepower, max_speed, year_built, transmission)) in
        fleet.into_iter().enumerate()
    {
        service
            .create(&NewVehicle {
                designation: designation.to_string(),
                chassis_number: format!("WVWZZZ1JZXW{:06}", index),
                year_built,
                horsepower,
                new_price: Some(30_000.0),
                max_speed,
                brand_id,
                equipment: NewEquipment {
                    air_conditioning: true,
                    seat_heating: false,
                    transmission,
                    interior_material: "leather".to_string(),
                },
            })
            .unwrap();
    }
    drop(service);
    conn
}

fn find(
    conn: &mut Connection,
    criteria: SearchCriteria,
    pageable: Pageable,
) -> Result<Slice<Vehicle>, RepoError> {
    find_opt(conn, Some(&criteria), pageable)
}

fn find_opt(
    conn: &mut Connection,
    criteria: Option<&SearchCriteria>,
    pageable: Pageable,
) -> Result<Slice<Vehicle>, RepoError> {
    let service = VehicleReadService::new(SqliteVehicleRepository::new(conn));
    service.find(criteria, pageable)
}

fn page(number: i64, size: i64) -> Pageable {
    Pageable { number, size }
}

fn designations(slice: &Slice<Vehicle>) -> Vec<&str> {
    slice
        .content
        .iter()
        .map(|vehicle| vehicle.designation.as_str())
        .collect()
}
