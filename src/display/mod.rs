pub mod fields;
pub mod table;

pub use fields::{format_field, format_time, resolve_path};
pub use table::{CellFormat, ColumnSpec, TableDisplay};
