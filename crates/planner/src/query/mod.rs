use crate::query::{
    dialect::Dialect,
    renderer::{Render, Renderer},
};

pub mod ast;
pub mod dialect;
pub mod renderer;

/// Renders a statement AST to SQL text for the given dialect.
pub fn to_sql(node: &dyn Render, dialect: &dyn Dialect) -> String {
    let mut renderer = Renderer::new(dialect);
    node.render(&mut renderer);
    renderer.finish()
}
