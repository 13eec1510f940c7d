//! Field-path extraction and display formatting.
//!
//! Records arrive as opaque JSON; every table cell is produced by
//! [`format_field`], which must render *something* for any record and any
//! path. Malformed input degrades to sentinel strings instead of errors so
//! one bad field never aborts a rendering pass.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

/// Rendered when a path does not resolve inside the record.
pub const MISSING_FIELD: &str = "undefined";
/// Rendered when a timestamp field cannot be parsed.
pub const INVALID_DATE: &str = "Invalid Date";
/// Rendered when a task-reference list is absent or empty.
pub const NO_REFERENCE: &str = "no reference found";

const TIME_DISPLAY_FORMAT: &str = "%m/%d %H:%M:%S";

/// Walk a dot-delimited path through nested objects.
///
/// Lookup is strictly left-to-right over object keys; arrays are not
/// indexable. Empty segments (leading dots, doubled dots) are skipped.
pub fn resolve_path<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = record;
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Render the value at `path` inside `record` as a display string.
///
/// Rule precedence, matched on the final path segment:
/// 1. missing path -> [`MISSING_FIELD`]
/// 2. `tasks` -> comma-joined task reference names, or [`NO_REFERENCE`]
/// 3. `heartTime` / `startTime` / `time` -> a pre-formatted top-level
///    `time` string verbatim, else the parsed value as `MM/DD HH:mm:ssZ`
///    in UTC, else [`INVALID_DATE`]
/// 4. `variables` object -> its top-level key names joined with `", "`
/// 5. any other object or array -> pretty JSON, 4-space indent
/// 6. scalars as-is
pub fn format_field(record: &Value, path: &str) -> String {
    let Some(value) = resolve_path(record, path) else {
        return MISSING_FIELD.to_string();
    };

    let last_segment = path
        .split('.')
        .filter(|s| !s.is_empty())
        .last()
        .unwrap_or_default();

    match last_segment {
        "tasks" => format_task_refs(value),
        "heartTime" | "startTime" | "time" => {
            // Backend-localized formatting wins over a UTC re-derivation
            if let Some(preformatted) = record.get("time").and_then(Value::as_str) {
                return preformatted.to_string();
            }
            format_time(value)
        }
        // Compact summary: the declared variable names, not their values
        "variables" => match value.as_object() {
            Some(map) => map.keys().cloned().collect::<Vec<_>>().join(", "),
            None => format_plain(value),
        },
        _ => format_plain(value),
    }
}

/// Render a raw timestamp value as `MM/DD HH:mm:ss` UTC with a literal `Z`.
pub fn format_time(value: &Value) -> String {
    let parsed: Option<DateTime<Utc>> = match value {
        Value::String(raw) => parse_datetime(raw),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    };

    match parsed {
        Some(instant) => format!("{}Z", instant.format(TIME_DISPLAY_FORMAT)),
        None => INVALID_DATE.to_string(),
    }
}

fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Utc));
    }
    // Timezone-less backend timestamps are taken as UTC
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    None
}

fn format_task_refs(value: &Value) -> String {
    let Some(entries) = value.as_array() else {
        return NO_REFERENCE.to_string();
    };

    let names: Vec<&str> = entries
        .iter()
        .filter_map(|entry| {
            entry
                .get("taskRef")
                .and_then(Value::as_str)
                .or_else(|| entry.get("name").and_then(Value::as_str))
        })
        .collect();

    if names.is_empty() {
        NO_REFERENCE.to_string()
    } else {
        names.join(",")
    }
}

fn format_plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(_) | Value::Array(_) => pretty_json(value),
        other => other.to_string(),
    }
}

fn pretty_json(value: &Value) -> String {
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut buffer = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    match serde::Serialize::serialize(value, &mut serializer) {
        Ok(()) => String::from_utf8_lossy(&buffer).into_owned(),
        Err(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_path_walks_nested_objects() {
        let record = json!({"metadata": {"name": "demo", "namespace": "ops-system"}});

        assert_eq!(
            resolve_path(&record, "metadata.name"),
            Some(&json!("demo"))
        );
        assert_eq!(resolve_path(&record, "metadata.missing"), None);
        assert_eq!(resolve_path(&record, "spec.deep.path"), None);
    }

    #[test]
    fn test_missing_path_yields_undefined() {
        let record = json!({"metadata": {"name": "demo"}});
        assert_eq!(format_field(&record, "status.runStatus"), "undefined");
    }

    #[test]
    fn test_variables_render_as_key_summary() {
        let record = json!({"spec": {"variables": {"a": {"value": 1}, "b": {"default": 2}}}});
        assert_eq!(format_field(&record, "spec.variables"), "a, b");
    }

    #[test]
    fn test_heart_time_formats_utc() {
        let record = json!({"status": {"heartTime": "2024-01-02T03:04:05Z"}});
        assert_eq!(format_field(&record, "status.heartTime"), "01/02 03:04:05Z");
    }

    #[test]
    fn test_unparseable_time_yields_invalid_date() {
        let record = json!({"status": {"heartTime": "not-a-date"}});
        assert_eq!(format_field(&record, "status.heartTime"), "Invalid Date");
    }

    #[test]
    fn test_naive_timestamp_taken_as_utc() {
        let record = json!({"status": {"startTime": "2024-01-02 03:04:05"}});
        assert_eq!(format_field(&record, "status.startTime"), "01/02 03:04:05Z");
    }

    #[test]
    fn test_offset_timestamp_converted_to_utc() {
        let record = json!({"status": {"startTime": "2024-01-02T05:04:05+02:00"}});
        assert_eq!(format_field(&record, "status.startTime"), "01/02 03:04:05Z");
    }

    #[test]
    fn test_preformatted_event_time_wins() {
        let record = json!({"subject": "ops.hosts", "event": "{}", "time": "08/15 12:00:00"});
        assert_eq!(format_field(&record, "time"), "08/15 12:00:00");
    }

    #[test]
    fn test_task_refs_join_with_name_fallback() {
        let record = json!({"spec": {"tasks": [
            {"name": "build", "taskRef": "compile"},
            {"name": "push"},
        ]}});
        assert_eq!(format_field(&record, "spec.tasks"), "compile,push");
    }

    #[test]
    fn test_empty_task_list_yields_no_reference() {
        let record = json!({"spec": {"tasks": []}});
        assert_eq!(format_field(&record, "spec.tasks"), "no reference found");

        let scalar = json!({"spec": {"tasks": "oops"}});
        assert_eq!(format_field(&scalar, "spec.tasks"), "no reference found");
    }

    #[test]
    fn test_scalars_render_unquoted() {
        let record = json!({"metadata": {"name": "demo"}, "count": 3, "active": true});
        assert_eq!(format_field(&record, "metadata.name"), "demo");
        assert_eq!(format_field(&record, "count"), "3");
        assert_eq!(format_field(&record, "active"), "true");
    }

    #[test]
    fn test_structured_fallback_pretty_prints() {
        let record = json!({"spec": {"selector": {"app": "portal"}}});
        let rendered = format_field(&record, "spec.selector");
        assert!(rendered.contains("\"app\": \"portal\""));
        assert!(rendered.contains("    \"app\""));
    }

    #[test]
    fn test_format_time_accepts_epoch_millis() {
        assert_eq!(format_time(&json!(1704164645000i64)), "01/02 03:04:05Z");
        assert_eq!(format_time(&json!(null)), "Invalid Date");
    }
}
