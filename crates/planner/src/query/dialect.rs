//! Defines the `Dialect` trait for engine-specific SQL syntax.

use model::core::schema::ColumnType;

pub trait Dialect: Send + Sync {
    /// Wraps an identifier (like a table or column name) in the correct
    /// quotation marks for the dialect.
    fn quote_identifier(&self, ident: &str) -> String;

    /// Renders a string literal, escaping embedded quotes.
    fn quote_literal(&self, value: &str) -> String;

    /// Renders a destination column type into the engine's type name.
    fn render_column_type(&self, data_type: &ColumnType) -> String;
}

/// Trino SQL, as spoken by both the Kafka and the Iceberg connectors.
#[derive(Debug, Clone, Copy, Default)]
pub struct Trino;

impl Dialect for Trino {
    fn quote_identifier(&self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    fn quote_literal(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    fn render_column_type(&self, data_type: &ColumnType) -> String {
        match data_type {
            ColumnType::Integer => "INTEGER".into(),
            ColumnType::Bigint => "BIGINT".into(),
            ColumnType::Varchar => "VARCHAR".into(),
            ColumnType::Timestamp(Some(precision)) => format!("TIMESTAMP({precision})"),
            ColumnType::Timestamp(None) => "TIMESTAMP".into(),
        }
    }
}
