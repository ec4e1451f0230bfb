//! Apply the resource catalog to the database: the schema, then one table per resource.
//! Resources are applied in catalog order, so referenced tables exist before their dependents.

use crate::config::table::{TableSpec, CREATED_AT, PRIMARY_KEY, UPDATED_AT};
use crate::config::ResourceDefinition;
use crate::error::RepositoryError;
use crate::sql::{qualified_table, quoted};
use sqlx::PgPool;

/// `CREATE TABLE IF NOT EXISTS` for one resource table.
pub fn create_table_sql(table: &TableSpec) -> String {
    let mut col_defs = vec![format!("{} BIGSERIAL PRIMARY KEY", quoted(PRIMARY_KEY))];
    for c in &table.columns {
        let mut def = format!("{} {}", quoted(c.name), c.pg_type.to_uppercase());
        if !c.nullable {
            def.push_str(" NOT NULL");
        }
        if c.unique {
            def.push_str(" UNIQUE");
        }
        if let Some(target) = c.references {
            def.push_str(&format!(
                " REFERENCES {}.{} ({})",
                quoted(&table.schema_name),
                quoted(target),
                quoted(PRIMARY_KEY)
            ));
        }
        col_defs.push(def);
    }
    for name in [CREATED_AT, UPDATED_AT] {
        col_defs.push(format!("{} TIMESTAMPTZ NOT NULL DEFAULT NOW()", quoted(name)));
    }
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n  {}\n)",
        qualified_table(table),
        col_defs.join(",\n  ")
    )
}

/// Idempotent: schema and tables use IF NOT EXISTS.
pub async fn apply_migrations(
    pool: &PgPool,
    resources: &[ResourceDefinition],
) -> Result<(), RepositoryError> {
    let Some(first) = resources.first() else {
        return Ok(());
    };
    sqlx::query(&format!(
        "CREATE SCHEMA IF NOT EXISTS {}",
        quoted(&first.table.schema_name)
    ))
    .execute(pool)
    .await?;

    for def in resources {
        sqlx::query(&create_table_sql(&def.table)).execute(pool).await?;
        tracing::info!(table = def.table.table_name, "table ready");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::catalog;
    use crate::config::table::ColumnSpec;

    #[test]
    fn table_ddl_has_keys_constraints_and_timestamps() {
        let table = TableSpec::new(
            "medibloc",
            "appointments",
            vec![
                ColumnSpec::required("patient_id", "bigint").references("patients"),
                ColumnSpec::required("code", "text").unique(),
                ColumnSpec::optional("notes", "text"),
            ],
        );
        let sql = create_table_sql(&table);
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS \"medibloc\".\"appointments\""));
        assert!(sql.contains("\"id\" BIGSERIAL PRIMARY KEY"));
        assert!(sql.contains(
            "\"patient_id\" BIGINT NOT NULL REFERENCES \"medibloc\".\"patients\" (\"id\")"
        ));
        assert!(sql.contains("\"code\" TEXT NOT NULL UNIQUE"));
        assert!(sql.contains("\"notes\" TEXT,"));
        assert!(sql.contains("\"created_at\" TIMESTAMPTZ NOT NULL DEFAULT NOW()"));
        assert!(sql.contains("\"updated_at\" TIMESTAMPTZ NOT NULL DEFAULT NOW()"));
    }

    #[test]
    fn catalog_references_only_earlier_tables() {
        let resources = catalog("medibloc").unwrap();
        let mut created: Vec<&str> = Vec::new();
        for def in &resources {
            for dep in def.table.dependencies() {
                assert!(
                    created.contains(&dep),
                    "{} references {} before it exists",
                    def.table.table_name,
                    dep
                );
            }
            created.push(def.table.table_name);
        }
    }
}
