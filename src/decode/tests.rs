//! Tests for the decode module

use super::*;
use crate::error::Error;
use bytes::Bytes;
use serde_json::json;

// ============================================================================
// JSON envelope
// ============================================================================

#[test]
fn test_extract_data() {
    let body = json!({
        "kind": "tasks",
        "data": [
            {"id": "IEAAA1", "title": "One"},
            {"id": "IEAAA2", "title": "Two"}
        ]
    });

    let records = extract_data(&body).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1]["title"], "Two");
}

#[test]
fn test_extract_data_empty() {
    let records = extract_data(&json!({"kind": "tasks", "data": []})).unwrap();
    assert!(records.is_empty());
}

#[test]
fn test_extract_data_missing() {
    let err = extract_data(&json!({"errorDescription": "nope"})).unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
}

#[test]
fn test_extract_data_non_object_item() {
    let err = extract_data(&json!({"data": [{"id": "1"}, 5]})).unwrap_err();
    assert!(err.to_string().contains("data[1]"));
}

#[test]
fn test_next_page_token() {
    assert_eq!(
        next_page_token(&json!({"data": [], "nextPageToken": "AAB"})),
        Some("AAB".to_string())
    );
    assert_eq!(next_page_token(&json!({"data": [], "nextPageToken": ""})), None);
    assert_eq!(next_page_token(&json!({"data": []})), None);
}

// ============================================================================
// Export manifest
// ============================================================================

#[test]
fn test_manifest_from_wrike_response() {
    let body = json!({
        "kind": "dataExport",
        "data": [{
            "id": "IEAAAXPORT",
            "status": "Completed",
            "resources": [
                {"name": "tasks", "url": "http://x/tasks.csv"},
                {"name": "folders", "url": "http://x/folders.csv"}
            ]
        }]
    });

    let manifest = ExportManifest::from_response(&body).unwrap();
    assert_eq!(manifest.resources.len(), 2);
    assert_eq!(manifest.find("folders").unwrap().url, "http://x/folders.csv");
    assert_eq!(manifest.find("tasks").unwrap().url, "http://x/tasks.csv");
}

#[test]
fn test_manifest_top_level_resources() {
    let body = json!({"resources": [{"name": "tasks", "url": "http://x/tasks.csv"}]});
    let manifest = ExportManifest::from_response(&body).unwrap();
    assert_eq!(manifest.resources.len(), 1);
}

#[test]
fn test_manifest_resource_not_found() {
    let body = json!({"resources": [{"name": "tasks", "url": "http://x/tasks.csv"}]});
    let manifest = ExportManifest::from_response(&body).unwrap();

    let err = manifest.find("timelogs").unwrap_err();
    assert!(matches!(err, Error::ResourceNotFound { ref name } if name == "timelogs"));
}

#[test]
fn test_manifest_without_data() {
    let err = ExportManifest::from_response(&json!({"kind": "dataExport"})).unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
}

// ============================================================================
// CSV rows
// ============================================================================

#[test]
fn test_csv_rows_keyed_by_header() {
    let rows = CsvRows::from_bytes(Bytes::from_static(b"id,title,importance\n1,Plan,High\n2,Build,Normal\n"))
        .unwrap();
    assert_eq!(rows.headers(), ["id", "title", "importance"]);

    let rows: Vec<_> = rows.map(Result::unwrap).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["id"], "1");
    assert_eq!(rows[1]["importance"], "Normal");
}

#[test]
fn test_csv_quoted_fields_with_newlines() {
    let body = "id,description\n1,\"line one\nline two\"\n2,\"has \"\"quotes\"\"\"\n";
    let rows: Vec<_> = CsvRows::from_bytes(Bytes::from(body))
        .unwrap()
        .map(Result::unwrap)
        .collect();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["description"], "line one\nline two");
    assert_eq!(rows[1]["description"], "has \"quotes\"");
}

#[test]
fn test_csv_strips_bom() {
    let body = b"\xEF\xBB\xBFid,title\n7,Bom\n".to_vec();
    let mut rows = CsvRows::from_bytes(Bytes::from(body)).unwrap();
    assert_eq!(rows.headers()[0], "id");
    assert_eq!(rows.next().unwrap().unwrap()["id"], "7");
}

#[test]
fn test_csv_is_forward_only() {
    let mut rows = CsvRows::from_bytes(Bytes::from_static(b"id\n1\n2\n")).unwrap();
    assert_eq!(rows.next().unwrap().unwrap()["id"], "1");
    assert_eq!(rows.position(), 1);
    assert_eq!(rows.next().unwrap().unwrap()["id"], "2");
    assert!(rows.next().is_none());
    assert!(rows.next().is_none());
    assert_eq!(rows.position(), 2);
}

#[test]
fn test_csv_short_rows() {
    let rows: Vec<_> = CsvRows::from_bytes(Bytes::from_static(b"id,title,status\n1,Only title\n"))
        .unwrap()
        .map(Result::unwrap)
        .collect();
    assert_eq!(rows[0].len(), 2);
    assert!(!rows[0].contains_key("status"));
}

#[test]
fn test_csv_invalid_utf8() {
    let mut rows = CsvRows::from_bytes(Bytes::from_static(b"id,title\n1,\xFF\xFE\n")).unwrap();
    assert!(matches!(rows.next(), Some(Err(Error::Csv(_)))));
}

#[test]
fn test_csv_empty_body() {
    let mut rows = CsvRows::from_bytes(Bytes::new()).unwrap();
    assert!(rows.headers().is_empty());
    assert!(rows.next().is_none());
}

#[test]
fn test_row_to_record() {
    let mut row = crate::types::StringMap::new();
    row.insert("id".to_string(), "5".to_string());
    let record = row_to_record(row);
    assert_eq!(record["id"], json!("5"));
}
