use crate::query::{
    ast::create_table::CreateTable,
    renderer::{Render, Renderer},
};

impl Render for CreateTable {
    fn render(&self, r: &mut Renderer) {
        r.push("CREATE TABLE ");
        if self.if_not_exists {
            r.push("IF NOT EXISTS ");
        }
        r.render_table_ref(&self.table);
        r.push(" (");
        r.render_list(&self.columns, ", ", |r, col| {
            r.render_ident(col.name);
            r.push(" ");
            let type_name = r.dialect.render_column_type(&col.data_type);
            r.push(&type_name);
        });
        r.push(")");
    }
}
