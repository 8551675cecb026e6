use crate::query::ast::common::ColumnRef;
use model::core::offset::Watermarks;

/// Matches rows positioned strictly after `after`, partition by partition.
///
/// Partitions with a watermark are compared against it; every other
/// partition is compared against the floor.
#[derive(Debug, Clone)]
pub struct AfterWatermarks<'a> {
    pub partition: ColumnRef,
    pub offset: ColumnRef,
    pub after: &'a Watermarks,
}
