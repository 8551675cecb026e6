use crate::query::ast::predicate::AfterWatermarks;
use model::core::identifiers::QualifiedName;

/// `SELECT COALESCE(MAX(offset), -1)`: the single highest committed offset.
#[derive(Debug, Clone)]
pub struct MaxOffset {
    pub table: QualifiedName,
}

/// Highest committed offset per partition.
#[derive(Debug, Clone)]
pub struct PartitionWatermarks {
    pub table: QualifiedName,
}

/// Number of destination rows positioned after the given watermarks.
#[derive(Debug, Clone)]
pub struct CountAfter<'a> {
    pub table: QualifiedName,
    pub predicate: AfterWatermarks<'a>,
}
