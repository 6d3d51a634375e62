//! Link following, recursion order and the active-path cycle guard.

use serde_json::json;
use twin_directory::fakes::MemoryAssetDirectory;
use twin_schema::{
    load_schema_file, AssetSchema, LinkConstraint, PropertyConstraint, SchemaDocument,
    SchemaTarget,
};
use twin_validator::{AssetValidator, IssueKind, IssueLog};

fn measurement_schema() -> AssetSchema {
    // Placeholder source/ids: a link target is always re-scoped to the link.
    AssetSchema::new("source")
        .with_ids(["id"])
        .with_property("type", PropertyConstraint::any().allowed(["Measurement"]))
        .with_property("derived.unit", PropertyConstraint::string())
}

fn ptm_schema() -> AssetSchema {
    AssetSchema::new("s1")
        .with_property("derived.low", PropertyConstraint::number())
        .with_link(LinkConstraint::new("signal", measurement_schema()))
}

fn pair(id: &str, source: &str) -> (String, String) {
    (id.to_string(), source.to_string())
}

async fn validate(directory: &MemoryAssetDirectory, document: &SchemaDocument) -> Vec<String> {
    let validator = AssetValidator::new(directory);
    let mut issues = IssueLog::new();
    validator.validate(document, &mut issues).await.unwrap();
    issues.lines()
}

#[tokio::test]
async fn empty_links_report_requirement_once_without_fetching() {
    let directory = MemoryAssetDirectory::new().with_asset(
        "s1",
        "a1",
        json!({ "derived": { "low": 1 }, "links": [] }),
    );

    let lines = validate(&directory, &SchemaDocument::inline(ptm_schema())).await;

    assert_eq!(lines, vec!["PropertyMissing: s1 - a1 - links[signal]"]);
    assert_eq!(directory.fetched(), vec![pair("a1", "s1")]);
}

#[tokio::test]
async fn absent_links_name_every_required_type() {
    let directory = MemoryAssetDirectory::new().with_asset("s1", "a1", json!({}));
    let schema = AssetSchema::new("s1")
        .with_link(LinkConstraint::new("signal", measurement_schema()))
        .with_link(LinkConstraint::new("parent", AssetSchema::new("s0")));

    let lines = validate(&directory, &SchemaDocument::inline(schema)).await;

    assert_eq!(lines, vec!["PropertyMissing: s1 - a1 - links[signal,parent]"]);
}

#[tokio::test]
async fn linked_asset_is_fetched_by_the_link_not_the_schema() {
    let directory = MemoryAssetDirectory::new()
        .with_asset(
            "s1",
            "a1",
            json!({
                "derived": { "low": "0.5" },
                "links": [{ "type": "signal", "id": "m1", "source": "s2" }]
            }),
        )
        .with_asset("s2", "m1", json!({ "type": "Measurement", "derived": { "unit": "bar" } }))
        .with_asset("source", "id", json!({}));

    let lines = validate(&directory, &SchemaDocument::inline(ptm_schema())).await;

    assert!(lines.is_empty(), "unexpected issues: {:?}", lines);
    assert_eq!(directory.fetched(), vec![pair("a1", "s1"), pair("m1", "s2")]);
}

#[tokio::test]
async fn linked_issues_follow_parent_issues() {
    let directory = MemoryAssetDirectory::new()
        .with_asset(
            "s1",
            "a1",
            json!({
                "derived": { "low": "n/a" },
                "links": [{ "type": "signal", "id": "m1", "source": "s2" }]
            }),
        )
        .with_asset("s2", "m1", json!({ "derived": { "unit": ["bar"] } }))
        .with_asset("s1", "a2", json!({ "links": [{ "type": "other", "id": "x", "source": "s2" }] }));

    let lines = validate(&directory, &SchemaDocument::inline(ptm_schema())).await;

    assert_eq!(
        lines,
        vec![
            "TypeMismatch: s1 - a1 - derived.low",
            "PropertyMissing: s2 - m1 - type",
            "PropertyMissing: s1 - a2 - derived.low",
            "NotFound: s1 - a2 - signal",
        ]
    );
}

#[tokio::test]
async fn first_matching_link_wins() {
    let directory = MemoryAssetDirectory::new()
        .with_asset(
            "s1",
            "a1",
            json!({
                "derived": { "low": 1 },
                "links": [
                    { "type": "parent", "id": "p1", "source": "s0" },
                    { "type": "signal", "id": "m1", "source": "s2" },
                    { "type": "signal", "id": "m2", "source": "s2" }
                ]
            }),
        )
        .with_asset("s2", "m1", json!({ "type": "Measurement", "derived": { "unit": "bar" } }))
        .with_asset("s2", "m2", json!({}));

    let lines = validate(&directory, &SchemaDocument::inline(ptm_schema())).await;

    assert!(lines.is_empty(), "unexpected issues: {:?}", lines);
    assert!(!directory.fetched().contains(&pair("m2", "s2")));
}

#[tokio::test]
async fn unmatched_link_type_continues_with_next_constraint() {
    let directory = MemoryAssetDirectory::new()
        .with_asset(
            "s1",
            "a1",
            json!({ "links": [{ "type": "parent", "id": "p1", "source": "s0" }] }),
        )
        .with_asset("s0", "p1", json!({}));
    let schema = AssetSchema::new("s1")
        .with_link(LinkConstraint::new("signal", measurement_schema()))
        .with_link(LinkConstraint::new(
            "parent",
            AssetSchema::new("s0").with_property("name", PropertyConstraint::string()),
        ));

    let lines = validate(&directory, &SchemaDocument::inline(schema)).await;

    assert_eq!(
        lines,
        vec![
            "NotFound: s1 - a1 - signal",
            "PropertyMissing: s0 - p1 - name",
        ]
    );
}

#[tokio::test]
async fn missing_link_target_is_reported_on_the_outer_asset() {
    let directory = MemoryAssetDirectory::new().with_asset(
        "s1",
        "a1",
        json!({
            "derived": { "low": 2 },
            "links": [{ "type": "signal", "id": "m9", "source": "s2" }]
        }),
    );

    let validator = AssetValidator::new(&directory);
    let mut issues = IssueLog::new();
    validator
        .validate(&SchemaDocument::inline(ptm_schema()), &mut issues)
        .await
        .unwrap();

    assert_eq!(issues.len(), 1);
    let issue = &issues.as_slice()[0];
    assert_eq!(issue.kind, IssueKind::NotFound);
    assert_eq!(issue.context(), "s1/a1");
    assert_eq!(issue.to_string(), "NotFound: s1 - a1 - signal -> s2/m9");
}

#[tokio::test]
async fn shared_target_is_validated_once_per_path() {
    let link = json!([{ "type": "signal", "id": "m1", "source": "s2" }]);
    let directory = MemoryAssetDirectory::new()
        .with_asset("s1", "a1", json!({ "derived": { "low": 1 }, "links": link.clone() }))
        .with_asset("s1", "a2", json!({ "derived": { "low": 2 }, "links": link }))
        .with_asset("s2", "m1", json!({ "type": "Measurement" }));

    let lines = validate(&directory, &SchemaDocument::inline(ptm_schema())).await;

    assert_eq!(
        lines,
        vec![
            "PropertyMissing: s2 - m1 - derived.unit",
            "PropertyMissing: s2 - m1 - derived.unit",
        ]
    );
    assert_eq!(
        directory.fetched(),
        vec![
            pair("a1", "s1"),
            pair("m1", "s2"),
            pair("a2", "s1"),
            pair("m1", "s2"),
        ]
    );
}

#[tokio::test]
async fn schema_and_data_cycle_terminates() {
    let node_a = AssetSchema::new("sa")
        .with_property("name", PropertyConstraint::string())
        .with_link(LinkConstraint::new("next", SchemaTarget::reference("b")));
    let node_b = AssetSchema::new("sb")
        .with_property("name", PropertyConstraint::string())
        .with_link(LinkConstraint::new("back", SchemaTarget::reference("a")));
    let document = SchemaDocument::inline(node_a.clone())
        .with_definition("a", node_a)
        .with_definition("b", node_b);
    document.validate_structure().unwrap();

    let directory = MemoryAssetDirectory::new()
        .with_asset(
            "sa",
            "a1",
            json!({ "links": [{ "type": "next", "id": "b1", "source": "sb" }] }),
        )
        .with_asset(
            "sb",
            "b1",
            json!({ "name": "b", "links": [{ "type": "back", "id": "a1", "source": "sa" }] }),
        );

    let lines = validate(&directory, &document).await;

    assert_eq!(lines, vec!["PropertyMissing: sa - a1 - name"]);
    assert_eq!(directory.fetched(), vec![pair("a1", "sa"), pair("b1", "sb")]);
}

#[tokio::test]
async fn self_link_terminates() {
    let node = AssetSchema::new("s1").with_link(LinkConstraint::new(
        "self",
        SchemaTarget::reference("node"),
    ));
    let document = SchemaDocument::inline(node.clone()).with_definition("node", node);
    let directory = MemoryAssetDirectory::new().with_asset(
        "s1",
        "a1",
        json!({ "links": [{ "type": "self", "id": "a1", "source": "s1" }] }),
    );

    assert!(validate(&directory, &document).await.is_empty());
    assert_eq!(directory.fetched(), vec![pair("a1", "s1")]);
}

#[tokio::test]
async fn long_chain_through_ref_is_followed() {
    let node = AssetSchema::new("chain")
        .with_property("seq", PropertyConstraint::number())
        .with_link(LinkConstraint::new("next", SchemaTarget::reference("node")));
    let document = SchemaDocument::inline(node.clone().with_ids(["n0"])).with_definition("node", node);

    let directory = MemoryAssetDirectory::new();
    for i in 0..50 {
        directory.insert(
            "chain",
            &format!("n{}", i),
            json!({
                "seq": i,
                "links": [{ "type": "next", "id": format!("n{}", i + 1), "source": "chain" }]
            }),
        );
    }

    let lines = validate(&directory, &document).await;

    // The chain ends at n50, which does not exist.
    assert_eq!(lines, vec!["NotFound: chain - n49 - next -> chain/n50"]);
    assert_eq!(directory.fetched().len(), 51);
}

#[tokio::test]
async fn shipped_ptm_schema_validates_live_shape() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../schemas/ptm.json");
    let document = load_schema_file(&path).unwrap();

    let directory = MemoryAssetDirectory::new()
        .with_asset(
            "no:nyh:ptm",
            "ptm-1",
            json!({
                "id": "ptm-1",
                "source": "no:nyh:ptm",
                "derived": {
                    "low": "0",
                    "high": 16.5,
                    "xRealtimeId": "PT-1001",
                    "xRealtimeSource": "no:nyh:pi"
                },
                "links": [{ "type": "signal", "id": "sig-1", "source": "no:nyh:pi" }]
            }),
        )
        .with_asset(
            "no:nyh:ptm",
            "ptm-2",
            json!({
                "id": "ptm-2",
                "derived": { "low": "low", "xRealtimeId": "PT-1002" },
                "links": []
            }),
        )
        .with_asset(
            "no:nyh:pi",
            "sig-1",
            json!({ "type": "Measurement", "derived": { "unit": "barg" } }),
        );

    let lines = validate(&directory, &document).await;

    assert_eq!(
        lines,
        vec![
            "TypeMismatch: no:nyh:ptm - ptm-2 - derived.low",
            "PropertyMissing: no:nyh:ptm - ptm-2 - derived.high",
            "PropertyMissing: no:nyh:ptm - ptm-2 - derived.xRealtimeSource",
            "PropertyMissing: no:nyh:ptm - ptm-2 - links[signal]",
        ]
    );
}
