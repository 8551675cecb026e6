//! Defines the AST for a CREATE TABLE statement.

use model::core::{identifiers::QualifiedName, schema::ColumnDef};

#[derive(Debug, Clone)]
pub struct CreateTable {
    pub table: QualifiedName,
    pub columns: Vec<ColumnDef>,
    pub if_not_exists: bool,
}
