// mod.rs - Input file loaders

pub mod json;
pub mod markers;

pub use json::{DatasetRecord, SummaryRecord};
pub use markers::{load_marker_column_list, load_marker_list};
