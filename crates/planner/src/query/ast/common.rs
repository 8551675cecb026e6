/// A column reference, optionally qualified by a table alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRef {
    pub qualifier: Option<&'static str>,
    pub name: &'static str,
}

impl ColumnRef {
    pub const fn qualified(qualifier: &'static str, name: &'static str) -> Self {
        Self {
            qualifier: Some(qualifier),
            name,
        }
    }
}
