use crate::query::{
    ast::show_columns::ShowColumns,
    renderer::{Render, Renderer},
};

impl Render for ShowColumns {
    fn render(&self, r: &mut Renderer) {
        r.push("SHOW COLUMNS FROM ");
        r.render_table_ref(&self.table);
    }
}
