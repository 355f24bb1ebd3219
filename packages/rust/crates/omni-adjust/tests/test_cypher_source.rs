//! Cypher HTTP source tests that need no running graph server.

mod common;

use omni_adjust::source::{CypherHttpSource, parse_transaction_response};
use omni_adjust::{
    AdjustError, AdjusterKind, AdjusterSettings, GraphSettings, PageWindow, RowSource, Scalar,
    SourceError, SourceFailurePolicy, SourceQuery,
};
use serde_json::json;

use common::hits;

fn unreachable_graph() -> GraphSettings {
    GraphSettings {
        url: "http://127.0.0.1:9".to_string(),
        timeout_secs: 2,
        ..GraphSettings::default()
    }
}

#[test]
fn test_endpoint_targets_transaction_commit() -> anyhow::Result<()> {
    let source = CypherHttpSource::new(&GraphSettings {
        url: "http://graph:7474/".to_string(),
        database: "catalog".to_string(),
        ..GraphSettings::default()
    })?;

    assert_eq!(source.endpoint(), "http://graph:7474/db/catalog/tx/commit");
    assert_eq!(source.backend_name(), "cypher");
    assert!(!source.requires_connection());
    Ok(())
}

#[test]
fn test_unreachable_server_is_source_error() -> anyhow::Result<()> {
    let source = CypherHttpSource::new(&unreachable_graph())?;

    let result = source.execute(&SourceQuery::new("MATCH (n) RETURN n.id AS id"));

    assert!(result.is_err());
    Ok(())
}

#[test]
fn test_unreachable_server_under_both_policies() -> anyhow::Result<()> {
    let mut raw = json!({"gas-filter": {"query": "MATCH (n:Hidden) RETURN n.id AS id"}})
        .as_object()
        .cloned()
        .unwrap_or_default();

    let lenient = AdjusterKind::CypherFilter.build(AdjusterSettings {
        graph: unreachable_graph(),
        ..AdjusterSettings::default()
    })?;
    let request = lenient.prepare(&mut raw)?;
    assert_eq!(request.window, PageWindow::new(0, 10));
    let adjusted = lenient.adjust(hits(&[("1", 2.0), ("2", 1.0)]), &request)?;
    assert_eq!(adjusted.ids(), vec!["1", "2"]);

    let strict = AdjusterKind::CypherFilter.build(AdjusterSettings {
        graph: unreachable_graph(),
        on_source_error: SourceFailurePolicy::Reject,
        ..AdjusterSettings::default()
    })?;
    let err = strict.adjust(hits(&[("1", 2.0)]), &request).unwrap_err();
    assert!(matches!(err, AdjustError::ExternalSource(_)));
    Ok(())
}

#[test]
fn test_transaction_rows_feed_identifiers() -> anyhow::Result<()> {
    let body = json!({
        "results": [{
            "columns": ["id", "score"],
            "data": [
                {"row": ["a", 2.0]},
                {"row": [7, null]}
            ]
        }],
        "errors": []
    })
    .to_string();

    let rows = parse_transaction_response(&body)?;

    assert_eq!(rows.len(), 2);
    assert_eq!(rows.rows[0].get("id"), Some(&Scalar::Text("a".to_string())));
    assert_eq!(rows.rows[1].get("id"), Some(&Scalar::Int(7)));
    assert_eq!(rows.rows[1].get("score"), Some(&Scalar::Null));
    Ok(())
}

#[test]
fn test_transaction_errors_are_query_errors() {
    let body = json!({
        "results": [],
        "errors": [{"code": "Neo.ClientError.Statement.SyntaxError", "message": "bad"}]
    })
    .to_string();

    let err = parse_transaction_response(&body).unwrap_err();

    assert!(matches!(err, SourceError::Query(ref message) if message.contains("SyntaxError")));
}

#[test]
fn test_unsigned_ids_past_i64_still_match() -> anyhow::Result<()> {
    let body = json!({
        "results": [{"columns": ["id"], "data": [{"row": [u64::MAX]}]}],
        "errors": []
    })
    .to_string();
    let rows = parse_transaction_response(&body)?;
    let remote = omni_adjust::collect_identifiers(&rows, "id", "cypher")?;

    let request = omni_adjust::AdjustRequest::new("q", PageWindow::new(0, 10)).with_exclude(false);
    let adjusted = omni_adjust::MembershipFilter::apply(
        hits(&[("18446744073709551615", 1.0), ("18446744073709552000", 2.0)]),
        &remote,
        &request,
    );

    assert_eq!(adjusted.ids(), vec!["18446744073709551615"]);
    Ok(())
}
