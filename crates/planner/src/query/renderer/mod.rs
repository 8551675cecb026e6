//! Defines the core rendering trait and context for converting AST to SQL.

use crate::query::{ast::common::ColumnRef, dialect::Dialect};
use model::core::identifiers::QualifiedName;

pub mod append;
pub mod create_table;
pub mod predicate;
pub mod show_columns;
pub mod watermark;

/// A trait for any AST node that can be rendered into a SQL string.
pub trait Render {
    fn render(&self, renderer: &mut Renderer);
}

/// Accumulates the SQL string and gives access to the dialect for
/// syntax-specific details.
pub struct Renderer<'a> {
    pub sql: String,
    pub dialect: &'a dyn Dialect,
}

impl<'a> Renderer<'a> {
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Self {
            sql: String::new(),
            dialect,
        }
    }

    pub fn finish(self) -> String {
        self.sql
    }

    pub fn push(&mut self, fragment: &str) {
        self.sql.push_str(fragment);
    }

    pub fn render_ident(&mut self, ident: &str) {
        let quoted = self.dialect.quote_identifier(ident);
        self.sql.push_str(&quoted);
    }

    pub fn render_table_ref(&mut self, table: &QualifiedName) {
        for (i, part) in table.parts().iter().enumerate() {
            if i > 0 {
                self.sql.push('.');
            }
            self.render_ident(part);
        }
    }

    pub fn render_column(&mut self, column: &ColumnRef) {
        if let Some(qualifier) = column.qualifier {
            self.sql.push_str(qualifier);
            self.sql.push('.');
        }
        self.render_ident(column.name);
    }

    pub fn render_literal(&mut self, value: &str) {
        let quoted = self.dialect.quote_literal(value);
        self.sql.push_str(&quoted);
    }

    pub fn render_int(&mut self, value: i64) {
        self.sql.push_str(&value.to_string());
    }

    /// Renders `items` separated by `sep` using `f` for each item.
    pub fn render_list<T>(&mut self, items: &[T], sep: &str, mut f: impl FnMut(&mut Self, &T)) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(sep);
            }
            f(self, item);
        }
    }
}
