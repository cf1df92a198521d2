//! SQL Server dialect

use crate::schema::changes::{ChangeDescriptor, ChangeKind, MismatchValues};
use crate::schema::dialect::{parse_nullable, quote_literal, Dialect, DialectKind};
use crate::schema::type_map::TypeMapper;
use crate::schema::types::Attribute;

/// Batch separator appended after every statement
const BATCH_SEPARATOR: &str = "GO";

/// SQL Server statement templates
pub struct MsSqlDialect {
    types: TypeMapper,
}

impl MsSqlDialect {
    pub fn new(types: TypeMapper) -> Self {
        Self { types }
    }
}

impl Default for MsSqlDialect {
    fn default() -> Self {
        Self::new(TypeMapper::mssql())
    }
}

impl Dialect for MsSqlDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::MsSql
    }

    fn type_mapper(&self) -> &TypeMapper {
        &self.types
    }

    fn render_change(&self, change: &ChangeDescriptor) -> String {
        let table = &change.table;
        let statement = match &change.kind {
            ChangeKind::AddColumn { column, shape, .. } => {
                format!("ALTER TABLE {} ADD {} {};", table, column, self.column_type(shape))
            }
            ChangeKind::ColumnRename { from, to } => format!(
                "EXEC sp_rename '{}.{}', '{}', 'COLUMN';",
                quote_literal(table),
                quote_literal(from),
                quote_literal(to)
            ),
            ChangeKind::AttributeMismatch {
                values: MismatchValues::TypeFields,
                column,
                to,
                ..
            } => format!(
                "ALTER TABLE {} ALTER COLUMN {} {};",
                table,
                column,
                self.types.map(to, "")
            ),
            ChangeKind::AttributeMismatch {
                attribute: Attribute::IsNullable,
                column,
                to,
                desired,
                ..
            } => match parse_nullable(to) {
                Some(nullable) => format!(
                    "ALTER TABLE {} ALTER COLUMN {} {} {};",
                    table,
                    column,
                    self.column_type(desired),
                    if nullable { "NULL" } else { "NOT NULL" }
                ),
                None => {
                    tracing::warn!(%table, %column, value = %to, "Unrecognised nullability flag");
                    return format!(
                        "-- Unrecognised nullability '{}' for {}.{}, no statement generated",
                        to, table, column
                    );
                }
            },
            ChangeKind::AttributeMismatch {
                column, desired, ..
            } => format!(
                "ALTER TABLE {} ALTER COLUMN {} {};",
                table,
                column,
                self.column_type(desired)
            ),
        };

        format!("{}\n{}", statement, BATCH_SEPARATOR)
    }
}
