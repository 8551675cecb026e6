use crate::query::{
    ast::watermark::{CountAfter, MaxOffset, PartitionWatermarks},
    renderer::{Render, Renderer},
};
use model::core::{
    offset::NO_OFFSET,
    schema::{COL_OFFSET, COL_PARTITION_ID},
};

impl Render for MaxOffset {
    fn render(&self, r: &mut Renderer) {
        r.push("SELECT COALESCE(MAX(");
        r.render_ident(COL_OFFSET);
        r.push("), ");
        r.render_int(NO_OFFSET);
        r.push(") FROM ");
        r.render_table_ref(&self.table);
    }
}

impl Render for PartitionWatermarks {
    fn render(&self, r: &mut Renderer) {
        r.push("SELECT ");
        r.render_ident(COL_PARTITION_ID);
        r.push(", MAX(");
        r.render_ident(COL_OFFSET);
        r.push(") FROM ");
        r.render_table_ref(&self.table);
        r.push(" GROUP BY ");
        r.render_ident(COL_PARTITION_ID);
        r.push(" ORDER BY ");
        r.render_ident(COL_PARTITION_ID);
    }
}

impl Render for CountAfter<'_> {
    fn render(&self, r: &mut Renderer) {
        r.push("SELECT COUNT(*) FROM ");
        r.render_table_ref(&self.table);
        if let Some(alias) = self.predicate.offset.qualifier {
            r.push(" AS ");
            r.push(alias);
        }
        r.push(" WHERE ");
        self.predicate.render(r);
    }
}
