// ABOUTME: Integration tests for the groups://{groupId} resource
// ABOUTME: Pruned member documents, metrics grouping, missing groups and URI validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Family Serve

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use family_serve::errors::ErrorCode;
use family_serve::models::GroupInput;
use family_serve::resources::{read_group_resource, GROUP_RESOURCE_TEMPLATE};
use family_serve::tools::InMemoryGroupDirectory;
use serde_json::{json, Value};

fn directory() -> InMemoryGroupDirectory {
    common::init_test_logging();
    let athletes: GroupInput = serde_json::from_value(json!({
        "id": "g-fit",
        "name": "Fit Family",
        "members": [{
            "id": "m-1",
            "firstName": "Rosa",
            "lastName": "",
            "weightKg": 61.5,
            "heightCm": 170,
            "activityLevel": "high",
            "healthGoals": [],
            "nutritionTargets": {"proteinG": 120, "notes": null},
            "dietaryProfile": {"healthNotes": ""}
        }]
    }))
    .unwrap();
    InMemoryGroupDirectory::new(vec![common::smith_household(), athletes])
}

async fn read_document(uri: &str) -> Value {
    let contents = read_group_resource(&directory(), uri).await.unwrap();
    assert_eq!(contents.contents.len(), 1);
    assert_eq!(contents.contents[0].uri, uri);
    serde_json::from_str(&contents.contents[0].text).unwrap()
}

#[tokio::test]
async fn test_group_document_lists_members() {
    let document = read_document("groups://g-smith").await;

    assert_eq!(document["id"], "g-smith");
    assert_eq!(document["name"], "Smith Household");
    assert_eq!(document["membersCount"], 4);
    assert_eq!(document["members"].as_array().unwrap().len(), 4);
    assert_eq!(document["members"][0]["role"], "ADMIN");
    assert_eq!(
        document["members"][0]["dietaryProfile"]["allergies"],
        json!(["Tree nuts", {"name": "Milk"}])
    );
    assert_eq!(document["members"][3], json!({"id": "m-dan", "firstName": "Dan"}));
}

#[tokio::test]
async fn test_empty_declarations_are_pruned() {
    let document = read_document("groups://g-smith").await;
    let carol = &document["members"][2];

    assert_eq!(carol["dietaryProfile"]["allergies"], json!([42]));
    assert_eq!(
        carol["dietaryProfile"]["restrictions"],
        json!([{"type": "UNKNOWN", "reason": "IGNORED"}])
    );
    assert!(carol.get("lastName").is_none());
    assert!(carol.get("metrics").is_none());
}

#[tokio::test]
async fn test_body_metrics_grouped() {
    let document = read_document("groups://g-fit").await;
    let member = &document["members"][0];

    assert_eq!(
        member["metrics"],
        json!({"weightKg": 61.5, "heightCm": 170.0, "activityLevel": "high"})
    );
    assert!(member.get("weightKg").is_none());
    assert!(member.get("lastName").is_none());
    assert!(member.get("healthGoals").is_none());
    assert!(member.get("dietaryProfile").is_none());
    assert_eq!(member["nutritionTargets"], json!({"proteinG": 120}));
}

#[tokio::test]
async fn test_missing_group_has_no_contents() {
    let contents = read_group_resource(&directory(), "groups://g-404")
        .await
        .unwrap();
    assert!(contents.contents.is_empty());
}

#[tokio::test]
async fn test_invalid_uri_rejected() {
    assert_eq!(GROUP_RESOURCE_TEMPLATE, "groups://{groupId}");
    for uri in ["recipes://g-smith", "groups://", "groups://a/b"] {
        let error = read_group_resource(&directory(), uri).await.unwrap_err();
        assert_eq!(error.code, ErrorCode::InvalidInput);
    }
}
