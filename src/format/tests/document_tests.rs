//! Tests for reading and validating project documents.

use serde_json::{Value, json};

use super::background_url;
use crate::constants::MAX_POINT_NUMBER;
use crate::format::{FormatError, ProjectDocument, ProjectFormat};

fn parse(value: Value) -> Result<crate::format::Project, FormatError> {
    ProjectFormat.deserialize(value.to_string().as_bytes())
}

fn point(id: &str, number: u32, x: f64, y: f64) -> Value {
    json!({
        "id": id,
        "number": number,
        "x": x,
        "y": y,
        "title": "",
        "description": "",
        "imageDataUrl": null,
    })
}

#[test]
fn test_minimal_document() {
    let project = parse(json!({ "backgroundImage": background_url() })).unwrap();
    assert_eq!(project.starting_number, 1);
    assert!(project.points.is_empty());
    assert_eq!(project.background.size(), (40, 30));
    assert_eq!(project.background.data_url(), background_url());
}

#[test]
fn test_points_sorted_on_load() {
    let project = parse(json!({
        "version": "1.0",
        "backgroundImage": background_url(),
        "startingPointNumber": 3,
        "points": [
            point("c", 9, 0.9, 0.9),
            point("a", 3, 0.1, 0.1),
            point("b", 4, 0.5, 0.5),
        ],
    }))
    .unwrap();

    assert_eq!(project.starting_number, 3);
    let order: Vec<(&str, u32)> = project
        .points
        .iter()
        .map(|p| (p.id.as_str(), p.number))
        .collect();
    assert_eq!(order, vec![("a", 3), ("b", 4), ("c", 9)]);
}

#[test]
fn test_optional_point_fields_default() {
    let project = parse(json!({
        "backgroundImage": background_url(),
        "points": [{ "id": "1", "number": 1, "x": 0.5, "y": 0.5 }],
    }))
    .unwrap();

    let point = &project.points[0];
    assert!(point.title.is_empty());
    assert!(point.description.is_empty());
    assert!(point.image_data_url.is_none());
}

#[test]
fn test_null_fields_read_as_defaults() {
    let project = parse(json!({
        "backgroundImage": background_url(),
        "startingPointNumber": null,
        "points": null,
    }))
    .unwrap();
    assert_eq!(project.starting_number, 1);
    assert!(project.points.is_empty());
}

#[test]
fn test_unparseable_json() {
    let result = ProjectFormat.deserialize(b"{ not json");
    assert!(matches!(result, Err(FormatError::Json(_))));

    let wrong_shape = parse(json!({ "backgroundImage": background_url(), "points": 5 }));
    assert!(matches!(wrong_shape, Err(FormatError::Json(_))));
}

#[test]
fn test_missing_background() {
    assert!(matches!(
        parse(json!({ "points": [] })),
        Err(FormatError::MissingBackgroundImage)
    ));
    assert!(matches!(
        parse(json!({ "backgroundImage": "" })),
        Err(FormatError::MissingBackgroundImage)
    ));
    assert!(matches!(
        parse(json!({ "backgroundImage": null })),
        Err(FormatError::MissingBackgroundImage)
    ));
}

#[test]
fn test_undecodable_background() {
    assert!(matches!(
        parse(json!({ "backgroundImage": "not a data url" })),
        Err(FormatError::InvalidDataUrl { .. })
    ));
    assert!(matches!(
        parse(json!({ "backgroundImage": "data:image/png;base64,AAAA" })),
        Err(FormatError::UnsupportedImage { .. })
    ));
}

#[test]
fn test_duplicate_numbers_rejected() {
    let result = parse(json!({
        "backgroundImage": background_url(),
        "points": [point("a", 1, 0.1, 0.1), point("b", 1, 0.2, 0.2)],
    }));
    assert!(matches!(result, Err(FormatError::InvalidFormat { .. })));
}

#[test]
fn test_duplicate_ids_rejected() {
    let result = parse(json!({
        "backgroundImage": background_url(),
        "points": [point("a", 1, 0.1, 0.1), point("a", 2, 0.2, 0.2)],
    }));
    assert!(matches!(result, Err(FormatError::InvalidFormat { .. })));
}

#[test]
fn test_out_of_range_values_rejected() {
    let outside = parse(json!({
        "backgroundImage": background_url(),
        "points": [point("a", 1, 1.5, 0.1)],
    }));
    assert!(matches!(outside, Err(FormatError::InvalidFormat { .. })));

    let zero_number = parse(json!({
        "backgroundImage": background_url(),
        "points": [point("a", 0, 0.5, 0.5)],
    }));
    assert!(matches!(zero_number, Err(FormatError::InvalidFormat { .. })));

    let zero_start = parse(json!({
        "backgroundImage": background_url(),
        "startingPointNumber": 0,
    }));
    assert!(matches!(zero_start, Err(FormatError::InvalidFormat { .. })));

    let start_too_high = parse(json!({
        "backgroundImage": background_url(),
        "startingPointNumber": MAX_POINT_NUMBER,
        "points": [point("a", 1, 0.1, 0.1), point("b", 2, 0.2, 0.2)],
    }));
    assert!(matches!(start_too_high, Err(FormatError::InvalidFormat { .. })));
}

#[test]
fn test_version_handling() {
    let newer_minor = parse(json!({ "version": "1.3", "backgroundImage": background_url() }));
    assert!(newer_minor.is_ok());

    let newer_major = parse(json!({ "version": "2.0", "backgroundImage": background_url() }));
    assert!(matches!(newer_major, Err(FormatError::VersionMismatch { .. })));

    let garbage = parse(json!({ "version": "one", "backgroundImage": background_url() }));
    assert!(matches!(garbage, Err(FormatError::VersionMismatch { .. })));
}

#[test]
fn test_version_parsing() {
    assert_eq!(ProjectDocument::parse_version("1.0"), Some((1, 0)));
    assert_eq!(ProjectDocument::parse_version("1"), Some((1, 0)));
    assert_eq!(ProjectDocument::parse_version("1.2.3"), Some((1, 2)));
    assert_eq!(ProjectDocument::parse_version("1.2.3.4"), None);
    assert_eq!(ProjectDocument::parse_version("1.x"), None);
    assert_eq!(ProjectDocument::parse_version(""), None);

    assert!(ProjectDocument::is_version_compatible(ProjectDocument::CURRENT_VERSION));
    assert!(ProjectDocument::is_version_readable("1.9"));
    assert!(!ProjectDocument::is_version_compatible("1.9"));
    assert!(!ProjectDocument::is_version_readable("0.9"));
}
