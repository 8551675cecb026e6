use crate::query::{
    ast::predicate::AfterWatermarks,
    renderer::{Render, Renderer},
};

impl Render for AfterWatermarks<'_> {
    fn render(&self, r: &mut Renderer) {
        if self.after.is_uniform() {
            r.render_column(&self.offset);
            r.push(" > ");
            r.render_int(self.after.floor());
            return;
        }

        let marks: Vec<_> = self.after.iter().collect();
        r.push("(");
        r.render_list(&marks, " OR ", |r, mark| {
            r.push("(");
            r.render_column(&self.partition);
            r.push(" = ");
            r.render_int(mark.partition_id);
            r.push(" AND ");
            r.render_column(&self.offset);
            r.push(" > ");
            r.render_int(mark.offset);
            r.push(")");
        });

        // Partitions that have not committed anything yet.
        r.push(" OR (");
        r.render_column(&self.partition);
        r.push(" NOT IN (");
        r.render_list(&marks, ", ", |r, mark| r.render_int(mark.partition_id));
        r.push(") AND ");
        r.render_column(&self.offset);
        r.push(" > ");
        r.render_int(self.after.floor());
        r.push("))");
    }
}
