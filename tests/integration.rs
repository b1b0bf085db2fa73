//! Integration tests for logs2records
//!
//! These tests drive the complete pipeline over a realistic NDJSON request
//! log fixture: decode, predicate, projection, validation, partitioning,
//! and the output encoders.

use arrow::array::{Array, Int64Array, StringArray};
use arrow::record_batch::RecordBatch;

use logs2records::{
    decode_records, request_summary_pipeline, to_ipc, to_json, Attribute, Error,
    PartitionedBatches, Pipeline, Predicate,
};

const FIXTURE: &[u8] = include_bytes!("fixtures/requests.ndjson");

fn pipeline() -> Pipeline {
    request_summary_pipeline(Predicate::always()).unwrap()
}

fn fixture_output() -> PartitionedBatches {
    let records = decode_records(FIXTURE).unwrap();
    pipeline().process_batch(&records).unwrap()
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> &'a StringArray {
    batch
        .column_by_name(name)
        .unwrap()
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap()
}

fn int_column<'a>(batch: &'a RecordBatch, name: &str) -> &'a Int64Array {
    batch
        .column_by_name(name)
        .unwrap()
        .as_any()
        .downcast_ref::<Int64Array>()
        .unwrap()
}

// ============================================================================
// Pipeline integration tests
// ============================================================================

#[test]
fn test_full_pipeline_ndjson() {
    let output = fixture_output();

    // Six input lines: four request summaries make it through, the heartbeat
    // is turned away, and the record without an Hour field fails.
    assert_eq!(output.total_records, 4);
    assert_eq!(output.rejected, 1);
    assert_eq!(output.failures.len(), 1);
    assert_eq!(output.failures[0].index, 5);
    assert!(matches!(
        output.failures[0].error,
        Error::PartitionDimensionMissing { .. }
    ));

    // Two partitions, ordered by first occurrence in the input.
    assert_eq!(output.len(), 2);
    assert_eq!(
        output.batches[0].path.to_string(),
        "request.summary/request.summary/2024-01-01/05"
    );
    assert_eq!(output.batches[0].record_count, 3);
    assert_eq!(output.batches[0].min_timestamp_ns, 1_704_085_260_000_000_000);

    assert_eq!(
        output.batches[1].path.to_string(),
        "request.summary/request.summary/2024-01-01/06"
    );
    assert_eq!(output.batches[1].record_count, 1);
    assert_eq!(output.batches[1].min_timestamp_ns, 1_704_088_920_000_000_000);
}

#[test]
fn test_request_summary_schema_consistency() {
    let output = fixture_output();
    let schema = output.batches[0].batch.schema();

    let expected_fields = [
        "Timestamp",
        "Type",
        "Hostname",
        "Logger",
        "EnvVersion",
        "Severity",
        "Pid",
        "fields_agent",
        "fields_lang",
        "fields_method",
        "fields_path",
        "fields_rid",
        "fields_uid",
        "fields_user_agent_browser",
        "fields_user_agent_os",
        "fields_user_agent_version",
        "fields_errno",
        "fields_t",
        "fields",
    ];
    assert_eq!(schema.fields().len(), expected_fields.len());
    for field in expected_fields {
        assert!(
            schema.field_with_name(field).is_ok(),
            "Missing field: {field}"
        );
    }
}

#[test]
fn test_typed_projection() {
    let output = fixture_output();
    let batch = &output.batches[0].batch;

    // Rows keep input order within a partition.
    let method = string_column(batch, "fields_method");
    assert_eq!(method.value(0), "GET");
    assert_eq!(method.value(1), "POST");
    assert_eq!(method.value(2), "GET");

    assert_eq!(string_column(batch, "Hostname").value(0), "web-1.prod.example.com");
    assert_eq!(string_column(batch, "fields_path").value(1), "/api/submit");
    assert_eq!(int_column(batch, "Timestamp").value(0), 1_704_085_500_000_000_000);

    // errno and t arrive as strings or JSON numbers; both land as int64.
    let errno = int_column(batch, "fields_errno");
    let t = int_column(batch, "fields_t");
    assert_eq!(errno.value(0), 0);
    assert_eq!(errno.value(1), 0);
    assert_eq!(t.value(0), 250);
    assert_eq!(t.value(1), 512);
    assert_eq!(t.value(2), 3);

    // The curl request carries no uid or lang.
    assert!(string_column(batch, "fields_uid").is_null(2));
    assert!(string_column(batch, "fields_lang").is_null(2));
}

#[test]
fn test_user_agent_decomposition() {
    let output = fixture_output();
    let batch = &output.batches[0].batch;

    let browser = string_column(batch, "fields_user_agent_browser");
    let os = string_column(batch, "fields_user_agent_os");
    let version = int_column(batch, "fields_user_agent_version");
    let agent = string_column(batch, "fields_agent");

    // Recognized agents decompose; the raw string column stays null.
    assert_eq!(browser.value(0), "Firefox");
    assert_eq!(os.value(0), "Windows");
    assert_eq!(version.value(0), 89);
    assert!(agent.is_null(0));

    assert_eq!(browser.value(1), "Chrome");
    assert_eq!(os.value(1), "Macintosh");
    assert_eq!(version.value(1), 120);
    assert!(agent.is_null(1));

    // Unrecognized agents keep the raw string; the parsed columns stay null.
    assert_eq!(agent.value(2), "curl/8.4.0");
    assert!(browser.is_null(2));
    assert!(os.is_null(2));
    assert!(version.is_null(2));
}

#[test]
fn test_base_predicate_composes() {
    let base = Predicate::attribute_equals(Attribute::Hostname, "web-1.prod.example.com");
    let pipeline = request_summary_pipeline(base).unwrap();

    let records = decode_records(FIXTURE).unwrap();
    let output = pipeline.process_batch(&records).unwrap();

    // Only the two web-1 request summaries pass both predicate legs; the
    // web-1 record without an Hour field still reaches partitioning and
    // fails there.
    assert_eq!(output.total_records, 2);
    assert_eq!(output.rejected, 3);
    assert_eq!(output.failures.len(), 1);
    assert_eq!(output.failures[0].index, 5);
}

// ============================================================================
// Output format tests
// ============================================================================

#[test]
fn test_ndjson_output() {
    let output = fixture_output();
    let ndjson = to_json(&output.batches[0].batch).unwrap();
    let ndjson_str = String::from_utf8(ndjson).unwrap();

    let rows: Vec<serde_json::Value> = ndjson_str
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(rows.len(), 3);

    assert_eq!(rows[0]["Hostname"], "web-1.prod.example.com");
    assert_eq!(rows[0]["fields_method"], "GET");
    assert_eq!(rows[0]["Timestamp"], 1_704_085_500_000_000_000i64);

    // Projected fields never reappear in the residual map; the partition
    // sources do, since no rule binds them.
    assert_eq!(
        rows[0]["fields"],
        serde_json::json!({
            "Type": "request.summary",
            "Date": "2024-01-01",
            "Hour": "05",
        })
    );

    // Null columns are omitted entirely.
    assert!(rows[2].get("fields_uid").is_none());
    assert!(rows[2].get("fields_user_agent_browser").is_none());
}

#[test]
fn test_ipc_output() {
    let output = fixture_output();

    for batch in output.iter().map(|(_, batch)| batch) {
        let ipc = to_ipc(batch).unwrap();
        assert!(!ipc.is_empty(), "Expected non-empty IPC output");
    }
}

#[cfg(feature = "parquet")]
#[test]
fn test_parquet_output() {
    let output = fixture_output();
    let bytes = logs2records::to_parquet(&output.batches[0].batch).unwrap();

    assert!(bytes.starts_with(b"PAR1"), "Missing parquet header magic");
    assert!(bytes.ends_with(b"PAR1"), "Missing parquet footer magic");
}

// ============================================================================
// Error reporting tests
// ============================================================================

#[test]
fn test_decode_reports_line_numbers() {
    let payload = b"{\"Timestamp\":1,\"Fields\":{}}\nnot json\n";

    let err = decode_records(payload).unwrap_err();
    match err {
        Error::Decode(msg) => assert!(msg.contains("line 2"), "unexpected message: {msg}"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_missing_timestamp_is_required_column_error() {
    let payload = br#"{"Type":"request.summary","Fields":{"Type":"request.summary","Date":"2024-01-01","Hour":"05"}}"#;
    let records = decode_records(payload).unwrap();

    let err = pipeline().process(&records[0]).unwrap_err();
    match err {
        Error::MissingRequiredColumn { column } => assert_eq!(column, "Timestamp"),
        other => panic!("unexpected error: {other:?}"),
    }
}
