//! Destination-table schema resolution and table-meta snapshots.
//!
//! `fetch_columns` issues the one metadata query an import job is allowed:
//! column names and declared types for a (table, schema) pair, in physical
//! column order. A resolved schema can also be captured to a YAML snapshot
//! ([`TableMeta`]) and reloaded later to drive script generation without a
//! live store.

use std::{fmt, fs::File, io::Write, path::Path};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ImportError, Result},
    store::StoreConnector,
};

/// Destination (schema, table) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRef {
    pub table_schema: String,
    pub table_name: String,
}

impl TableRef {
    pub fn new(table_schema: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            table_schema: table_schema.into(),
            table_name: table_name.into(),
        }
    }

    /// `schema.table`, the form statements insert into.
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.table_schema, self.table_name)
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified())
    }
}

/// One column of the destination table. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    pub data_type: String,
}

impl ColumnSchema {
    /// Lower-cases the type tag so coercion dispatch is case-insensitive.
    pub fn new(name: impl Into<String>, data_type: &str) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.to_ascii_lowercase(),
        }
    }
}

/// Looks up the declared type for a column name, exact match.
pub fn dtype_of<'a>(schema: &'a [ColumnSchema], name: &str) -> Option<&'a str> {
    schema
        .iter()
        .find(|col| col.name == name)
        .map(|col| col.data_type.as_str())
}

fn metadata_query(table: &TableRef) -> String {
    format!(
        "SELECT COLUMN_NAME, DATA_TYPE FROM INFORMATION_SCHEMA.COLUMNS \
         WHERE TABLE_NAME = '{}' AND TABLE_SCHEMA = '{}' \
         ORDER BY ORDINAL_POSITION",
        table.table_name, table.table_schema
    )
}

/// Resolves the destination table's columns, in ordinal position order.
///
/// Returns an empty sequence when the table has no matching columns; callers
/// must treat that as "nothing importable" rather than success. Called
/// exactly once per job; results are never cached across calls.
pub fn fetch_columns(connector: &dyn StoreConnector, table: &TableRef) -> Result<Vec<ColumnSchema>> {
    let mut conn = connector
        .connect()
        .map_err(|e| ImportError::schema_lookup(table.qualified(), e.to_string()))?;
    let rows = match conn.query_rows(&metadata_query(table)) {
        Ok(rows) => rows,
        Err(e) => {
            return Err(ImportError::schema_lookup(table.qualified(), e.to_string()));
        }
    };
    conn.close()?;

    let mut columns = Vec::with_capacity(rows.len());
    for row in rows {
        let [name, data_type] = row.as_slice() else {
            return Err(ImportError::schema_lookup(
                table.qualified(),
                format!("malformed metadata row with {} field(s)", row.len()),
            ));
        };
        columns.push(ColumnSchema::new(name.clone(), data_type));
    }
    Ok(columns)
}

/// YAML snapshot of a resolved table schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableMeta {
    pub table_schema: String,
    pub table_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<NaiveDateTime>,
    pub columns: Vec<ColumnSchema>,
}

impl TableMeta {
    /// Fetches the live schema and stamps the snapshot time.
    pub fn capture(connector: &dyn StoreConnector, table: &TableRef) -> Result<Self> {
        let columns = fetch_columns(connector, table)?;
        Ok(Self {
            table_schema: table.table_schema.clone(),
            table_name: table.table_name.clone(),
            fetched_at: Some(chrono::Utc::now().naive_utc()),
            columns,
        })
    }

    pub fn table(&self) -> TableRef {
        TableRef::new(self.table_schema.clone(), self.table_name.clone())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mut meta: TableMeta = serde_yaml::from_reader(file)?;
        // Hand-written snapshots may carry upper-cased type tags.
        for col in &mut meta.columns {
            col.data_type.make_ascii_lowercase();
        }
        Ok(meta)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let serialized = serde_yaml::to_string(self)?;
        let mut file = File::create(path)?;
        file.write_all(serialized.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualified_joins_schema_and_table() {
        let table = TableRef::new("dbo", "people");
        assert_eq!(table.qualified(), "dbo.people");
        assert_eq!(table.to_string(), "dbo.people");
    }

    #[test]
    fn column_schema_lowercases_the_type_tag() {
        let col = ColumnSchema::new("Age", "INT");
        assert_eq!(col.data_type, "int");
    }

    #[test]
    fn dtype_lookup_is_exact_match() {
        let schema = vec![
            ColumnSchema::new("Name", "varchar"),
            ColumnSchema::new("Age", "int"),
        ];
        assert_eq!(dtype_of(&schema, "Age"), Some("int"));
        assert_eq!(dtype_of(&schema, "age"), None);
        assert_eq!(dtype_of(&schema, "Missing"), None);
    }

    #[test]
    fn table_meta_round_trips_and_normalizes_type_tags() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("dbo.people.yaml");
        std::fs::write(
            &path,
            "table_schema: dbo\ntable_name: people\ncolumns:\n  - name: Age\n    data_type: INT\n",
        )
        .expect("write meta");

        let meta = TableMeta::load(&path).expect("load meta");
        assert_eq!(meta.table().qualified(), "dbo.people");
        assert_eq!(meta.columns[0].data_type, "int");
        assert!(meta.fetched_at.is_none());

        let saved = dir.path().join("saved.yaml");
        meta.save(&saved).expect("save meta");
        let reloaded = TableMeta::load(&saved).expect("reload meta");
        assert_eq!(reloaded.columns, meta.columns);
    }

    #[test]
    fn metadata_query_scopes_and_orders() {
        let sql = metadata_query(&TableRef::new("dbo", "people"));
        assert!(sql.contains("TABLE_NAME = 'people'"));
        assert!(sql.contains("TABLE_SCHEMA = 'dbo'"));
        assert!(sql.ends_with("ORDER BY ORDINAL_POSITION"));
    }
}
