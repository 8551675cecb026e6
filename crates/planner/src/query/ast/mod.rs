pub mod append;
pub mod common;
pub mod create_table;
pub mod predicate;
pub mod show_columns;
pub mod watermark;
