//! Fixed column layout of the destination table.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Bigint,
    Varchar,
    /// `None` leaves the precision to the engine default.
    Timestamp(Option<u8>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub data_type: ColumnType,
}

pub const COL_ID: &str = "id";
pub const COL_NAME: &str = "name";
pub const COL_TIMESTAMP: &str = "timestamp";
pub const COL_OFFSET: &str = "offset";
pub const COL_PARTITION_ID: &str = "partition_id";
pub const COL_INGEST_TIME: &str = "ingest_time";

/// Destination columns, in the order the append statement writes them.
pub const DESTINATION_COLUMNS: [ColumnDef; 6] = [
    ColumnDef {
        name: COL_ID,
        data_type: ColumnType::Integer,
    },
    ColumnDef {
        name: COL_NAME,
        data_type: ColumnType::Varchar,
    },
    ColumnDef {
        name: COL_TIMESTAMP,
        data_type: ColumnType::Timestamp(Some(6)),
    },
    ColumnDef {
        name: COL_OFFSET,
        data_type: ColumnType::Bigint,
    },
    ColumnDef {
        name: COL_PARTITION_ID,
        data_type: ColumnType::Bigint,
    },
    ColumnDef {
        name: COL_INGEST_TIME,
        data_type: ColumnType::Timestamp(None),
    },
];

pub fn destination_column_names() -> Vec<&'static str> {
    DESTINATION_COLUMNS.iter().map(|c| c.name).collect()
}
