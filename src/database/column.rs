/// Column types understood by [`Backend::create_table`](super::Backend::create_table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// `VARCHAR(n)`
    Varchar(u32),
    Text,
    Integer,
    BigInteger,
    Double,
    Boolean,
}

/// A column definition for table creation. Document backends ignore the definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlColumn {
    pub name: String,
    pub kind: ColumnType,
    pub nullable: bool,
}

impl SqlColumn {
    /// A nullable column.
    pub fn new(name: impl Into<String>, kind: ColumnType) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable: true,
        }
    }

    pub fn varchar(name: impl Into<String>, length: u32) -> Self {
        Self::new(name, ColumnType::Varchar(length))
    }

    #[must_use]
    pub const fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }
}
