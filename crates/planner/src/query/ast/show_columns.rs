use model::core::identifiers::QualifiedName;

/// `SHOW COLUMNS FROM <table>`; rows are `(Column, Type, Extra, Comment)`.
#[derive(Debug, Clone)]
pub struct ShowColumns {
    pub table: QualifiedName,
}
