//! Attribute extraction and identifier resolution against a scripted backend

mod common;

use common::{group, FakeBackend};
use reqwest::StatusCode;
use serde_json::json;
use suggestion_harvester::suggestions::{
    AttributeExtractor, AttributeField, AttributeSet, MappingResolver,
};
use suggestion_harvester::AppError;

const SOURCE: &str = "consumer-products";

#[tokio::test]
async fn test_extract_sorts_and_dedups_facets() {
    let backend = FakeBackend::new()
        .with_facet("category", &["Rings", "Earrings", "Rings"])
        .with_facet("occasion", &["Wedding", "Engagement"])
        .with_facet("metalType", &["Gold", "Platinum"]);

    let attributes = AttributeExtractor::new(&backend, 999)
        .extract(SOURCE)
        .await
        .unwrap();

    assert_eq!(attributes.categories, vec!["Earrings", "Rings"]);
    assert_eq!(attributes.occasions, vec!["Engagement", "Wedding"]);
    assert_eq!(attributes.metals, vec!["Gold", "Platinum"]);
    assert!(attributes.styles.is_empty());
    assert!(attributes.collections.is_empty());
    assert_eq!(attributes.total_values(), 6);
}

#[tokio::test]
async fn test_extract_issues_single_count_only_query() {
    let backend = FakeBackend::new().with_facet("category", &["Rings"]);

    AttributeExtractor::new(&backend, 50)
        .extract(SOURCE)
        .await
        .unwrap();

    let calls = backend.search_calls();
    assert_eq!(calls.len(), 1);

    let (collection, params) = &calls[0];
    assert_eq!(collection, SOURCE);
    assert_eq!(params.per_page, 0);
    assert_eq!(params.max_facet_values, Some(50));
    assert_eq!(params.group_by.as_deref(), Some("pId"));
}

#[tokio::test]
async fn test_extract_failure_is_fatal() {
    let mut backend = FakeBackend::new();
    backend.facet_error = Some(StatusCode::NOT_FOUND);

    let result = AttributeExtractor::new(&backend, 999).extract("missing").await;

    match result {
        Err(AppError::Backend { collection, .. }) => assert_eq!(collection, "missing"),
        other => panic!("expected backend error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_resolve_grouped_identifiers() {
    let backend = FakeBackend::new()
        .with_group_pages(
            "category",
            vec![vec![
                group(vec![json!({ "category": "Rings", "cId": 3 })]),
                group(vec![json!({ "category": "Earrings", "cId": 7 })]),
                group(vec![json!({ "category": "Unknown" })]),
            ]],
        )
        .with_group_pages(
            "collection",
            vec![vec![group(vec![
                json!({ "collection": "Aurora", "collectionSlug": "aurora-2024" }),
            ])]],
        );

    let mapping = MappingResolver::new(&backend, 10)
        .resolve(&AttributeSet::default(), SOURCE)
        .await;

    assert_eq!(mapping.categories.get("Rings"), Some(&3));
    assert_eq!(mapping.categories.get("Earrings"), Some(&7));
    assert!(!mapping.categories.contains_key("Unknown"));
    assert_eq!(
        mapping.collections.get("Aurora").map(String::as_str),
        Some("aurora-2024")
    );
    assert_eq!(
        mapping.identifier(AttributeField::Category, "Rings").as_deref(),
        Some("3")
    );
}

#[tokio::test]
async fn test_resolve_by_intersecting_samples() {
    let attributes = AttributeSet::default()
        .with_values(AttributeField::Occasion, ["Engagement", "Wedding"])
        .with_values(AttributeField::Style, ["Halo"]);

    let backend = FakeBackend::new()
        .with_samples(
            "occasion:=Engagement",
            vec![
                json!({ "oId": [4, 21, 9] }),
                json!({ "oId": [21, 4] }),
                json!({ "oId": [30, 21] }),
            ],
        )
        .with_samples(
            "occasion:=Wedding",
            vec![json!({ "oId": [1, 2] }), json!({ "oId": [3] })],
        )
        .with_samples(
            "style:=Halo",
            vec![
                json!({ "styleIds": ["halo", "vintage"] }),
                json!({ "styleIds": ["solitaire", "halo"] }),
            ],
        );

    let mapping = MappingResolver::new(&backend, 10)
        .resolve(&attributes, SOURCE)
        .await;

    assert_eq!(mapping.occasions.get("Engagement"), Some(&21));
    assert!(!mapping.occasions.contains_key("Wedding"));
    assert_eq!(mapping.styles.get("Halo").map(String::as_str), Some("halo"));
}

#[tokio::test]
async fn test_resolve_sample_size_bounds_query() {
    let attributes =
        AttributeSet::default().with_values(AttributeField::SubCategory, ["Solitaire"]);
    let backend = FakeBackend::new().with_samples(
        "subCategory:=Solitaire",
        vec![json!({ "scId": [12] }), json!({ "scId": [12, 13] })],
    );

    let mapping = MappingResolver::new(&backend, 4)
        .resolve(&attributes, SOURCE)
        .await;
    assert_eq!(mapping.sub_categories.get("Solitaire"), Some(&12));

    let sampled = backend
        .search_calls()
        .into_iter()
        .find(|(_, p)| p.filter_by.as_deref() == Some("subCategory:=Solitaire"))
        .map(|(_, p)| p)
        .unwrap();
    assert_eq!(sampled.per_page, 4);
    assert_eq!(sampled.include_fields.as_deref(), Some("scId"));
}

#[tokio::test]
async fn test_resolve_errors_leave_value_unresolved() {
    let attributes = AttributeSet::default()
        .with_values(AttributeField::Occasion, ["Engagement", "Anniversary"]);

    let mut backend = FakeBackend::new()
        .with_failing_filter("occasion:=Engagement")
        .with_samples("occasion:=Anniversary", vec![json!({ "oId": [8] })]);
    backend.failing_group_page.insert("category".to_string(), 1);

    let mapping = MappingResolver::new(&backend, 10)
        .resolve(&attributes, SOURCE)
        .await;

    assert!(mapping.categories.is_empty());
    assert!(!mapping.occasions.contains_key("Engagement"));
    assert_eq!(mapping.occasions.get("Anniversary"), Some(&8));
}

#[tokio::test]
async fn test_resolve_skips_values_that_cannot_be_filtered() {
    let attributes =
        AttributeSet::default().with_values(AttributeField::Occasion, ["Valentine`s"]);
    let backend = FakeBackend::new();

    let mapping = MappingResolver::new(&backend, 10)
        .resolve(&attributes, SOURCE)
        .await;

    assert!(mapping.occasions.is_empty());
    assert!(backend
        .search_calls()
        .iter()
        .all(|(_, params)| params.filter_by.is_none()));
}
