//! Output formatting - plaintext and JSON.

use serde::Serialize;
use serde_json::json;

use crate::annotate::LineAnnotation;
use crate::index::{ConstantRecord, RebuildSummary};

/// Annotations of one line of one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileLineReport {
    pub file: String,
    /// 1-based line number
    pub line: usize,
    pub annotations: Vec<LineAnnotation>,
}

/// Prints every known constant in plain text format.
pub fn print_records_plain(records: &[&ConstantRecord]) {
    if records.is_empty() {
        println!("No constants found.");
        return;
    }
    println!("CONSTANTS ({}):", records.len());
    for r in records {
        println!("- {} = {}  ({})", r.qualified_name(), r.value, r.source);
    }
}

/// Prints annotated lines in plain text format.
pub fn print_annotations_plain(lines: &[FileLineReport]) {
    if lines.is_empty() {
        println!("No constant references found.");
        return;
    }
    for l in lines {
        for a in &l.annotations {
            println!("{}:{}:{}: {} = {}", l.file, l.line, a.offset + 1, a.identifier, a.display);
        }
    }
}

/// Prints a rebuild summary in plain text format.
pub fn print_summary_plain(summary: &RebuildSummary) {
    println!(
        "Indexed {} unit(s), skipped {}, failed {}: {} constant(s) in {} ms",
        summary.indexed_units,
        summary.skipped_units,
        summary.failed_units.len(),
        summary.records,
        summary.elapsed.as_millis()
    );
    for (source, message) in &summary.failed_units {
        println!("  failed: {} ({})", source, message);
    }
}

fn summary_json(summary: &RebuildSummary) -> serde_json::Value {
    json!({
        "indexed_units": summary.indexed_units,
        "skipped_units": summary.skipped_units,
        "failed_units": summary
            .failed_units
            .iter()
            .map(|(source, message)| json!({ "source": source, "message": message }))
            .collect::<Vec<_>>(),
        "records": summary.records,
        "elapsed_ms": summary.elapsed.as_millis() as u64,
    })
}

/// Prints the rebuild summary, constants and annotations as one JSON document.
pub fn print_json(
    summary: &RebuildSummary,
    records: Option<&[&ConstantRecord]>,
    lines: &[FileLineReport],
) {
    let mut doc = json!({
        "summary": summary_json(summary),
        "annotations": lines,
    });
    if let Some(records) = records {
        doc["constants"] = json!(records);
    }

    match serde_json::to_string_pretty(&doc) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("[WARN] JSON serialization failed: {}", e);
            println!("{{\"records\": {}}}", summary.records);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_json_shape() {
        let summary = RebuildSummary {
            indexed_units: 2,
            skipped_units: 1,
            failed_units: vec![("Bad.cs".into(), "unterminated string literal".into())],
            records: 5,
            ..Default::default()
        };
        let value = summary_json(&summary);
        assert_eq!(value["indexed_units"], 2);
        assert_eq!(value["failed_units"][0]["source"], "Bad.cs");
        assert_eq!(value["records"], 5);
    }

    #[test]
    fn test_line_report_serializes() {
        let report = FileLineReport {
            file: "Program.cs".into(),
            line: 3,
            annotations: vec![LineAnnotation {
                offset: 8,
                identifier: "MAX".into(),
                display: "10".into(),
            }],
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["annotations"][0]["display"], "10");
        assert_eq!(value["line"], 3);
    }
}
