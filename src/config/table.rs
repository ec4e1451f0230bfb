//! Table descriptors: what the SQL builder and migrations need to know about a resource's storage.

/// One stored column. Names are snake_case; the API exposes them in camelCase.
#[derive(Clone, Debug)]
pub struct ColumnSpec {
    pub name: &'static str,
    /// PostgreSQL type, also used for parameter casts (e.g. `date`, `jsonb`).
    pub pg_type: &'static str,
    pub nullable: bool,
    pub unique: bool,
    /// Table referenced by a foreign key on this column.
    pub references: Option<&'static str>,
}

impl ColumnSpec {
    pub const fn required(name: &'static str, pg_type: &'static str) -> Self {
        Self {
            name,
            pg_type,
            nullable: false,
            unique: false,
            references: None,
        }
    }

    pub const fn optional(name: &'static str, pg_type: &'static str) -> Self {
        Self {
            name,
            pg_type,
            nullable: true,
            unique: false,
            references: None,
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn references(mut self, table: &'static str) -> Self {
        self.references = Some(table);
        self
    }
}

/// Columns every table gets on top of its declared ones.
pub const PRIMARY_KEY: &str = "id";
pub const CREATED_AT: &str = "created_at";
pub const UPDATED_AT: &str = "updated_at";

#[derive(Clone, Debug)]
pub struct TableSpec {
    pub schema_name: String,
    pub table_name: &'static str,
    pub columns: Vec<ColumnSpec>,
}

impl TableSpec {
    pub fn new(schema_name: &str, table_name: &'static str, columns: Vec<ColumnSpec>) -> Self {
        Self {
            schema_name: schema_name.to_string(),
            table_name,
            columns,
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Tables this one holds foreign keys to.
    pub fn dependencies(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().filter_map(|c| c.references)
    }
}
