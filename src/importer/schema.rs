// ==========================================
// tabload - target table schema derivation
// ==========================================
// Derives the target table's ordered column list from the
// specification: dimension columns first (forming the uniqueness
// constraint), then data columns, each carrying its coerced semantic
// type. Invoked once, before any row is written.
// ==========================================

use crate::domain::dimension::DimensionType;
use crate::domain::spec::DataSpecification;
use crate::importer::error::{ImportError, ImportResult};

/// SQL affinity for a coerced semantic type.
fn sql_type(ty: DimensionType) -> &'static str {
    match ty {
        DimensionType::String => "TEXT",
        DimensionType::Time => "TEXT", // ISO-8601 text
        DimensionType::Numeric => "REAL",
    }
}

/// One target-table column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub sql_type: &'static str,
    /// Part of the table's uniqueness constraint (a dimension column).
    pub key: bool,
}

/// Ordered column list plus table name; consumed by the sink's
/// create_table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub table: String,
    pub columns: Vec<ColumnDef>,
}

impl TableSchema {
    /// Derive the schema for `table` from a validated specification.
    pub fn derive(table: &str, spec: &DataSpecification) -> ImportResult<Self> {
        spec.validate()?;
        if table.is_empty() {
            return Err(ImportError::Config("table name must not be empty".into()));
        }
        let mut columns = Vec::with_capacity(spec.dimension_cols.len() + spec.data_cols.len());
        for (&col, key) in spec
            .dimension_cols
            .iter()
            .map(|c| (c, true))
            .chain(spec.data_cols.iter().map(|c| (c, false)))
        {
            let name = spec
                .name_of(col)
                .ok_or_else(|| ImportError::Config(format!("no name for column {}", col)))?
                .to_string();
            columns.push(ColumnDef {
                name,
                sql_type: sql_type(spec.dimensions[col].ty),
                key,
            });
        }
        Ok(Self {
            table: table.to_string(),
            columns,
        })
    }

    pub fn key_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| c.key)
    }

    pub fn data_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| !c.key)
    }

    /// CREATE TABLE statement, composite primary key over the dimension
    /// columns when any exist.
    pub fn create_table_sql(&self) -> String {
        let mut sql = format!("CREATE TABLE {} (", quote_ident(&self.table));
        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(&quote_ident(&col.name));
            sql.push(' ');
            sql.push_str(col.sql_type);
        }
        let keys: Vec<String> = self.key_columns().map(|c| quote_ident(&c.name)).collect();
        if !keys.is_empty() {
            sql.push_str(&format!(", PRIMARY KEY ({})", keys.join(", ")));
        }
        sql.push(')');
        sql
    }
}

/// Double-quote an identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dimension::Dimension;

    fn spec() -> DataSpecification {
        // data col 1 sits between dimension cols 0 and 2 in the file;
        // the table still lists dimension columns first
        DataSpecification::builder()
            .num_cols(4)
            .dimension_cols([0, 2])
            .data_cols([1, 3])
            .dimension_names(["station", "trips", "day", "duration"])
            .dimensions(vec![
                Dimension::string(),
                Dimension::numeric(),
                Dimension::time(),
                Dimension::numeric(),
            ])
            .build()
            .unwrap()
    }

    #[test]
    fn test_dimension_columns_come_first() {
        let schema = TableSchema::derive("trips", &spec()).unwrap();
        let names: Vec<&str> = schema.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["station", "day", "trips", "duration"]);
        assert!(schema.columns[0].key && schema.columns[1].key);
        assert!(!schema.columns[2].key && !schema.columns[3].key);
    }

    #[test]
    fn test_sql_types_follow_dimension_types() {
        let schema = TableSchema::derive("trips", &spec()).unwrap();
        let types: Vec<&str> = schema.columns.iter().map(|c| c.sql_type).collect();
        assert_eq!(types, vec!["TEXT", "TEXT", "REAL", "REAL"]);
    }

    #[test]
    fn test_create_table_sql() {
        let schema = TableSchema::derive("trips", &spec()).unwrap();
        assert_eq!(
            schema.create_table_sql(),
            "CREATE TABLE \"trips\" (\"station\" TEXT, \"day\" TEXT, \
             \"trips\" REAL, \"duration\" REAL, PRIMARY KEY (\"station\", \"day\"))"
        );
    }

    #[test]
    fn test_no_key_clause_without_dimension_cols() {
        let spec = DataSpecification::builder()
            .num_cols(1)
            .data_cols([0])
            .dimensions(vec![Dimension::numeric()])
            .build()
            .unwrap();
        let schema = TableSchema::derive("t", &spec).unwrap();
        assert!(!schema.create_table_sql().contains("PRIMARY KEY"));
    }

    #[test]
    fn test_empty_table_name_rejected() {
        let err = TableSchema::derive("", &spec()).unwrap_err();
        assert!(matches!(err, ImportError::Config(_)));
    }
}
