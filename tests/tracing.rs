use feedsieve::observability::init_tracing;
use feedsieve::Config;

#[test]
fn spans_are_exported_as_otlp_json_lines() {
    let dir = tempfile::tempdir().unwrap();
    let trace_file = dir.path().join("traces/feedsieve-otlp.json");

    init_tracing(&Config {
        trace_level: Some("debug".to_string()),
        trace_file: Some(trace_file.clone()),
        ..Config::default()
    });

    tracing::debug_span!("sample_pass", pass_kind = "Full").in_scope(|| {
        tracing::debug!(filtered_total = 2, "pass complete");
    });

    let contents = std::fs::read_to_string(&trace_file).unwrap();
    let line = contents.lines().last().unwrap();
    let doc: serde_json::Value = serde_json::from_str(line).unwrap();

    let scope_spans = &doc["resourceSpans"][0]["scopeSpans"][0];
    assert_eq!(scope_spans["scope"]["name"], "feedsieve");
    assert!(scope_spans["spans"]
        .as_array()
        .unwrap()
        .iter()
        .any(|span| span["name"] == "sample_pass"));
}
