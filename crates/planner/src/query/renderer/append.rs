use crate::query::{
    ast::{
        append::{
            AppendBatch, BATCH_ALIAS, DEST_ALIAS, SOURCE_ALIAS, SRC_MESSAGE, SRC_PARTITION_ID,
            SRC_PARTITION_OFFSET,
        },
        common::ColumnRef,
        predicate::AfterWatermarks,
    },
    renderer::{Render, Renderer},
};
use model::core::schema::{
    COL_ID, COL_NAME, COL_OFFSET, COL_PARTITION_ID, COL_TIMESTAMP, ColumnType, DESTINATION_COLUMNS,
};

impl AppendBatch<'_> {
    /// Casts one JSON field of the message payload to its destination type.
    fn render_payload_field(&self, r: &mut Renderer, field: &str, data_type: &ColumnType) {
        let message = ColumnRef::qualified(BATCH_ALIAS, SRC_MESSAGE);
        let type_name = r.dialect.render_column_type(data_type);

        r.push("CAST(");
        let is_timestamp = matches!(data_type, ColumnType::Timestamp(_));
        if is_timestamp {
            // Nanosecond-precision parse; the plain variant stops at milliseconds.
            r.push("from_iso8601_timestamp_nanos(");
        }
        r.push("json_extract_scalar(json_parse(");
        r.render_column(&message);
        r.push("), ");
        r.render_literal(&format!("$.{field}"));
        r.push(")");
        if is_timestamp {
            r.push(")");
        }
        r.push(" AS ");
        r.push(&type_name);
        r.push(")");
    }

    fn render_projection(&self, r: &mut Renderer) {
        r.render_list(&DESTINATION_COLUMNS, ", ", |r, col| match col.name {
            COL_ID | COL_NAME | COL_TIMESTAMP => {
                self.render_payload_field(r, col.name, &col.data_type)
            }
            COL_OFFSET => r.render_column(&ColumnRef::qualified(BATCH_ALIAS, SRC_PARTITION_OFFSET)),
            COL_PARTITION_ID => {
                r.render_column(&ColumnRef::qualified(BATCH_ALIAS, SRC_PARTITION_ID))
            }
            // ingest_time
            _ => {
                let type_name = r.dialect.render_column_type(&col.data_type);
                r.push("CAST(current_timestamp AS ");
                r.push(&type_name);
                r.push(")");
            }
        });
    }

    fn render_not_yet_ingested(&self, r: &mut Renderer) {
        r.push("NOT EXISTS (SELECT 1 FROM ");
        r.render_table_ref(&self.destination);
        r.push(" AS ");
        r.push(DEST_ALIAS);
        r.push(" WHERE ");
        r.render_column(&ColumnRef::qualified(DEST_ALIAS, COL_PARTITION_ID));
        r.push(" = ");
        r.render_column(&ColumnRef::qualified(SOURCE_ALIAS, SRC_PARTITION_ID));
        r.push(" AND ");
        r.render_column(&ColumnRef::qualified(DEST_ALIAS, COL_OFFSET));
        r.push(" = ");
        r.render_column(&ColumnRef::qualified(SOURCE_ALIAS, SRC_PARTITION_OFFSET));
        r.push(")");
    }
}

impl Render for AppendBatch<'_> {
    fn render(&self, r: &mut Renderer) {
        let partition = ColumnRef::qualified(SOURCE_ALIAS, SRC_PARTITION_ID);
        let offset = ColumnRef::qualified(SOURCE_ALIAS, SRC_PARTITION_OFFSET);

        r.push("INSERT INTO ");
        r.render_table_ref(&self.destination);
        r.push(" (");
        r.render_list(&DESTINATION_COLUMNS, ", ", |r, col| r.render_ident(col.name));
        r.push(") SELECT ");
        self.render_projection(r);

        // Inner query bounds and orders the batch before any payload is cast.
        r.push(" FROM (SELECT ");
        r.render_list(&[SRC_MESSAGE, SRC_PARTITION_ID, SRC_PARTITION_OFFSET], ", ", |r, c| {
            r.render_column(&ColumnRef::qualified(SOURCE_ALIAS, *c))
        });
        r.push(" FROM ");
        r.render_table_ref(&self.source);
        r.push(" AS ");
        r.push(SOURCE_ALIAS);
        r.push(" WHERE ");
        AfterWatermarks {
            partition,
            offset,
            after: self.after,
        }
        .render(r);
        r.push(" AND ");
        self.render_not_yet_ingested(r);
        r.push(" ORDER BY ");
        r.render_column(&partition);
        r.push(", ");
        r.render_column(&offset);
        r.push(" LIMIT ");
        r.push(&self.limit.to_string());
        r.push(") AS ");
        r.push(BATCH_ALIAS);
    }
}
