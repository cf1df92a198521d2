//! SQL dialects
//!
//! A dialect turns one change descriptor into statement text. Dialects are
//! selected by identifier so the diff and change-set stages never depend
//! on the target database.

pub mod mssql;
pub mod postgres;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::schema::changes::ChangeDescriptor;
use crate::schema::type_map::TypeMapper;
use crate::schema::types::ColumnShape;

pub use mssql::MsSqlDialect;
pub use postgres::PostgresDialect;

/// Statement syntax and type vocabulary of one target database
pub trait Dialect: Send + Sync {
    /// Identifier of this dialect
    fn kind(&self) -> DialectKind;

    /// Type vocabulary used for column declarations
    fn type_mapper(&self) -> &TypeMapper;

    /// Render one change as statement text
    fn render_change(&self, change: &ChangeDescriptor) -> String;

    /// Comment line opening a table's block
    fn table_header(&self, table: &str) -> String {
        format!("-- Changes for table {}", table)
    }

    /// Script returned when there is nothing to change
    fn empty_script(&self) -> String {
        "-- No schema changes required".to_string()
    }

    /// Declared type of a column, with its length or precision
    fn column_type(&self, shape: &ColumnShape) -> String {
        self.type_mapper().map_column(shape)
    }
}

/// Supported dialect identifiers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    #[default]
    MsSql,
    Postgres,
}

impl DialectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DialectKind::MsSql => "mssql",
            DialectKind::Postgres => "postgres",
        }
    }

    /// Build the dialect, applying synonym overrides to its type table
    pub fn dialect(&self, type_overrides: &IndexMap<String, String>) -> Box<dyn Dialect> {
        match self {
            DialectKind::MsSql => Box::new(MsSqlDialect::new(
                TypeMapper::mssql().with_overrides(type_overrides),
            )),
            DialectKind::Postgres => Box::new(PostgresDialect::new(
                TypeMapper::postgres().with_overrides(type_overrides),
            )),
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DialectKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mssql" | "sqlserver" | "tsql" => Ok(DialectKind::MsSql),
            "postgres" | "postgresql" | "pg" => Ok(DialectKind::Postgres),
            other => Err(Error::UnsupportedDialect(other.to_string())),
        }
    }
}

/// Read a nullability flag as exported by common tools
pub fn parse_nullable(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "yes" | "y" | "true" | "1" | "null" | "nullable" => Some(true),
        "no" | "n" | "false" | "0" | "not null" | "not nullable" => Some(false),
        _ => None,
    }
}

/// Escape a value for use inside a single-quoted SQL literal
pub(crate) fn quote_literal(value: &str) -> String {
    value.replace('\'', "''")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialect_identifiers() {
        assert_eq!("SQLServer".parse::<DialectKind>().unwrap(), DialectKind::MsSql);
        assert_eq!("pg".parse::<DialectKind>().unwrap(), DialectKind::Postgres);
        assert!(matches!(
            "oracle".parse::<DialectKind>(),
            Err(Error::UnsupportedDialect(name)) if name == "oracle"
        ));
    }

    #[test]
    fn nullable_flags() {
        assert_eq!(parse_nullable("YES"), Some(true));
        assert_eq!(parse_nullable(" 0 "), Some(false));
        assert_eq!(parse_nullable("maybe"), None);
    }
}
