use crate::api::models::{
    Page, STATUS_ABORTED, STATUS_FAILED, STATUS_RUNNING, STATUS_SUCCESSED, Summary,
};
use crate::display::fields::format_field;
use crate::error::{AppError, DisplayError};
use crate::utils::units::format_memory;
use comfy_table::{Attribute, Cell, Color, Table, presets};
use crossterm::terminal;
use serde_json::Value;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Post-processing applied to a column's extracted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellFormat {
    Text,
    /// Ki-denominated capacity quantity, shown with a binary suffix
    Memory,
}

/// One rendered column: header text plus the field path that fills it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub header: &'static str,
    pub path: &'static str,
    pub format: CellFormat,
}

impl ColumnSpec {
    pub const fn new(header: &'static str, path: &'static str) -> Self {
        Self {
            header,
            path,
            format: CellFormat::Text,
        }
    }

    pub const fn memory(header: &'static str, path: &'static str) -> Self {
        Self {
            header,
            path,
            format: CellFormat::Memory,
        }
    }
}

// Heart-status keys vary in case across kinds
fn is_status_path(path: &str) -> bool {
    path.to_ascii_lowercase().ends_with("status")
}

/// Formatter and utilities for table display
pub struct TableDisplay {
    max_width: Option<usize>,
    use_colors: bool,
}

impl TableDisplay {
    /// Create a new TableDisplay instance
    pub fn new() -> Self {
        Self {
            max_width: Self::detect_terminal_width(),
            use_colors: true,
        }
    }

    /// Detect terminal width
    fn detect_terminal_width() -> Option<usize> {
        match terminal::size() {
            Ok((cols, _rows)) => {
                let width = cols as usize;
                // Clamp for stability on extreme terminals
                if width < 40 {
                    Some(40)
                } else if width > 200 {
                    Some(200)
                } else {
                    Some(width)
                }
            }
            Err(_) => Some(80), // Default width
        }
    }

    /// Create a TableDisplay instance with maximum width setting
    pub fn with_max_width(mut self, width: usize) -> Self {
        self.max_width = Some(width);
        self
    }

    /// Set color usage
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Render a page of records, one row per record, cells via the
    /// field formatter.
    pub fn render_record_list(
        &self,
        records: &[Value],
        columns: &[ColumnSpec],
    ) -> Result<String, AppError> {
        if records.is_empty() {
            return Ok("No resources found.".to_string());
        }

        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL);
        table.set_content_arrangement(comfy_table::ContentArrangement::Dynamic);
        self.configure_table_width(&mut table);

        table.set_header(self.header_cells(columns.iter().map(|c| c.header)));

        for record in records {
            let row: Vec<Cell> = columns
                .iter()
                .map(|column| {
                    let mut text = format_field(record, column.path);
                    if column.format == CellFormat::Memory {
                        text = format_memory(&text);
                    }
                    if text.width() > 100 {
                        text = self.truncate_text(&text, 100);
                    }
                    if is_status_path(column.path) {
                        self.status_cell(text)
                    } else {
                        Cell::new(text)
                    }
                })
                .collect();
            table.add_row(row);
        }

        Ok(table.to_string())
    }

    /// Render one record as Field | Value rows.
    ///
    /// Top-level scalar fields come through directly; `metadata`, `spec`
    /// and `status` are flattened one level so their entries are
    /// addressable rows.
    pub fn render_record_details(&self, record: &Value) -> Result<String, AppError> {
        let Some(map) = record.as_object() else {
            return Err(DisplayError::TableFormat(
                "record details require a JSON object".to_string(),
            )
            .into());
        };

        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL);
        table.set_content_arrangement(comfy_table::ContentArrangement::Dynamic);
        self.configure_table_width(&mut table);

        table.set_header(self.header_cells(["Field", "Value"]));

        for (key, value) in map {
            match value.as_object() {
                Some(children) if matches!(key.as_str(), "metadata" | "spec" | "status") => {
                    for child in children.keys() {
                        let path = format!("{}.{}", key, child);
                        table.add_row(self.detail_row(&path, format_field(record, &path)));
                    }
                }
                _ => {
                    table.add_row(self.detail_row(key, format_field(record, key)));
                }
            }
        }

        Ok(table.to_string())
    }

    /// Render the resource counts overview.
    pub fn render_summary(&self, summary: &Summary) -> Result<String, AppError> {
        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL);
        table.set_content_arrangement(comfy_table::ContentArrangement::Dynamic);

        table.set_header(self.header_cells(["Resource", "Count"]));

        let counts = [
            ("Clusters", summary.clusters),
            ("Hosts", summary.hosts),
            ("Tasks", summary.tasks),
            ("Task Runs", summary.taskruns),
            ("Pipelines", summary.pipelines),
            ("Pipeline Runs", summary.pipelineruns),
        ];
        for (label, count) in counts {
            table.add_row(vec![Cell::new(label), Cell::new(count.to_string())]);
        }

        Ok(table.to_string())
    }

    /// Render namespace names with the active one marked.
    pub fn render_namespace_list(&self, namespaces: &[String], active: &str) -> String {
        namespaces
            .iter()
            .map(|ns| {
                if ns == active {
                    format!("* {}", ns)
                } else {
                    format!("  {}", ns)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Pagination footer line for list views.
    pub fn render_page_footer(&self, page: &Page) -> String {
        format!(
            "Page {} of {} ({} total)",
            page.page,
            page.total_pages(),
            page.total
        )
    }

    fn header_cells<'a>(&self, headers: impl IntoIterator<Item = &'a str>) -> Vec<Cell> {
        headers
            .into_iter()
            .map(|h| {
                if self.use_colors {
                    Cell::new(h).add_attribute(Attribute::Bold).fg(Color::Green)
                } else {
                    Cell::new(h).add_attribute(Attribute::Bold)
                }
            })
            .collect()
    }

    fn detail_row(&self, field: &str, value: String) -> Vec<Cell> {
        vec![
            if self.use_colors {
                Cell::new(field).fg(Color::Yellow)
            } else {
                Cell::new(field)
            },
            Cell::new(value),
        ]
    }

    // Run-status cells are colored by their value
    fn status_cell(&self, text: String) -> Cell {
        if !self.use_colors {
            return Cell::new(text);
        }
        match text.as_str() {
            STATUS_SUCCESSED => Cell::new(text).fg(Color::Green),
            STATUS_FAILED => Cell::new(text).fg(Color::Red),
            STATUS_RUNNING => Cell::new(text).fg(Color::Yellow),
            STATUS_ABORTED => Cell::new(text).fg(Color::DarkGrey),
            _ => Cell::new(text),
        }
    }

    /// Set table width to match the terminal size
    fn configure_table_width(&self, table: &mut Table) {
        if let Some(terminal_width) = self.max_width {
            // Adjust considering borders and padding from terminal width
            let available_width = if terminal_width > 20 {
                terminal_width - 6
            } else {
                terminal_width.max(40)
            };

            table.set_width(available_width as u16);
        } else {
            table.set_width(80);
        }
    }

    /// Truncate text to specified width and add ellipsis
    fn truncate_text(&self, text: &str, max_width: usize) -> String {
        if text.width() <= max_width {
            return text.to_string();
        }

        let ellipsis = "...";
        let ellipsis_width = ellipsis.width();

        if max_width <= ellipsis_width {
            return ellipsis[..max_width].to_string();
        }

        let target_width = max_width - ellipsis_width;
        let mut result = String::new();
        let mut current_width = 0;

        for ch in text.chars() {
            let ch_width = ch.width().unwrap_or(0);
            if current_width + ch_width > target_width {
                break;
            }
            result.push(ch);
            current_width += ch_width;
        }

        result.push_str(ellipsis);
        result
    }
}

impl Default for TableDisplay {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn taskrun(name: &str, status: &str) -> Value {
        json!({
            "metadata": {"name": name, "namespace": "ops-system"},
            "spec": {"taskRef": "nightly-backup", "crontab": "0 2 * * *"},
            "status": {"startTime": "2024-01-02T03:04:05Z", "runStatus": status},
        })
    }

    const TASKRUN_COLUMNS: &[ColumnSpec] = &[
        ColumnSpec::new("Name", "metadata.name"),
        ColumnSpec::new("Task", "spec.taskRef"),
        ColumnSpec::new("Started", "status.startTime"),
        ColumnSpec::new("Status", "status.runStatus"),
    ];

    #[test]
    fn test_table_display_creation() {
        let display = TableDisplay::new();
        assert!(display.use_colors);

        let display = TableDisplay::new().with_max_width(80).with_colors(false);
        assert_eq!(display.max_width, Some(80));
        assert!(!display.use_colors);
    }

    #[test]
    fn test_truncate_text() {
        let display = TableDisplay::new();

        // Short text remains unchanged
        assert_eq!(display.truncate_text("Hello", 10), "Hello");

        // Long text is truncated
        assert_eq!(display.truncate_text("Hello World", 8), "Hello...");
    }

    #[test]
    fn test_render_record_list() {
        let display = TableDisplay::new().with_max_width(160).with_colors(false);
        let records = vec![taskrun("run-1", "Successed"), taskrun("run-2", "Failed")];

        let rendered = display
            .render_record_list(&records, TASKRUN_COLUMNS)
            .expect("render failed");

        assert!(rendered.contains("Name"));
        assert!(rendered.contains("run-1"));
        assert!(rendered.contains("run-2"));
        assert!(rendered.contains("nightly-backup"));
        assert!(rendered.contains("01/02 03:04:05Z"));
        assert!(rendered.contains("Successed"));
        assert!(rendered.contains("Failed"));
    }

    #[test]
    fn test_memory_column_formats_quantity() {
        let display = TableDisplay::new().with_max_width(160).with_colors(false);
        let nodes = vec![json!({
            "metadata": {"name": "node-1"},
            "status": {"capacity": {"cpu": "8", "memory": "16384Ki"}},
        })];
        let columns = [
            ColumnSpec::new("Name", "metadata.name"),
            ColumnSpec::memory("Memory", "status.capacity.memory"),
        ];

        let rendered = display
            .render_record_list(&nodes, &columns)
            .expect("render failed");
        assert!(rendered.contains("16.00 Mi"));
    }

    #[test]
    fn test_status_path_detection_ignores_case() {
        assert!(is_status_path("status.runStatus"));
        assert!(is_status_path("status.heartStatus"));
        assert!(is_status_path("status.heartstatus"));
        assert!(!is_status_path("status.startTime"));
    }

    #[test]
    fn test_render_empty_record_list() {
        let display = TableDisplay::new().with_colors(false);
        let rendered = display
            .render_record_list(&[], TASKRUN_COLUMNS)
            .expect("render failed");
        assert_eq!(rendered, "No resources found.");
    }

    #[test]
    fn test_render_record_details_flattens_sections() {
        let display = TableDisplay::new().with_max_width(160).with_colors(false);
        let rendered = display
            .render_record_details(&taskrun("run-1", "Running"))
            .expect("render failed");

        assert!(rendered.contains("metadata.name"));
        assert!(rendered.contains("spec.taskRef"));
        assert!(rendered.contains("status.runStatus"));
        assert!(rendered.contains("Running"));
    }

    #[test]
    fn test_render_record_details_rejects_non_object() {
        let display = TableDisplay::new().with_colors(false);
        assert!(display.render_record_details(&json!([1, 2, 3])).is_err());
    }

    #[test]
    fn test_render_page_footer() {
        let display = TableDisplay::new();
        let page = Page {
            page_size: 10,
            page: 2,
            total: 35,
            list: vec![],
        };
        assert_eq!(display.render_page_footer(&page), "Page 2 of 4 (35 total)");
    }

    #[test]
    fn test_render_summary() {
        let display = TableDisplay::new().with_colors(false);
        let summary = Summary {
            clusters: 3,
            hosts: 12,
            pipelines: 4,
            pipelineruns: 40,
            tasks: 9,
            taskruns: 87,
        };

        let rendered = display.render_summary(&summary).expect("render failed");
        assert!(rendered.contains("Clusters"));
        assert!(rendered.contains("87"));
        assert!(rendered.contains("Pipeline Runs"));
    }

    #[test]
    fn test_render_namespace_list_marks_active() {
        let display = TableDisplay::new();
        let namespaces = vec!["default".to_string(), "ops-system".to_string()];

        let rendered = display.render_namespace_list(&namespaces, "ops-system");
        assert_eq!(rendered, "  default\n* ops-system");
    }
}
