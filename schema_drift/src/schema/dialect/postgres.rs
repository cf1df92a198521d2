//! PostgreSQL dialect

use crate::schema::changes::{ChangeDescriptor, ChangeKind, MismatchValues};
use crate::schema::dialect::{parse_nullable, Dialect, DialectKind};
use crate::schema::type_map::TypeMapper;
use crate::schema::types::Attribute;

/// PostgreSQL statement templates
pub struct PostgresDialect {
    types: TypeMapper,
}

impl PostgresDialect {
    pub fn new(types: TypeMapper) -> Self {
        Self { types }
    }
}

impl Default for PostgresDialect {
    fn default() -> Self {
        Self::new(TypeMapper::postgres())
    }
}

impl Dialect for PostgresDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::Postgres
    }

    fn type_mapper(&self) -> &TypeMapper {
        &self.types
    }

    fn render_change(&self, change: &ChangeDescriptor) -> String {
        let table = &change.table;
        match &change.kind {
            ChangeKind::AddColumn { column, shape, .. } => format!(
                "ALTER TABLE {} ADD COLUMN {} {};",
                table,
                column,
                self.column_type(shape)
            ),
            ChangeKind::ColumnRename { from, to } => {
                format!("ALTER TABLE {} RENAME COLUMN {} TO {};", table, from, to)
            }
            ChangeKind::AttributeMismatch {
                values: MismatchValues::TypeFields,
                column,
                to,
                ..
            } => format!(
                "ALTER TABLE {} ALTER COLUMN {} TYPE {};",
                table,
                column,
                self.types.map(to, "")
            ),
            ChangeKind::AttributeMismatch {
                attribute: Attribute::IsNullable,
                column,
                to,
                ..
            } => match parse_nullable(to) {
                Some(true) => format!("ALTER TABLE {} ALTER COLUMN {} DROP NOT NULL;", table, column),
                Some(false) => format!("ALTER TABLE {} ALTER COLUMN {} SET NOT NULL;", table, column),
                None => {
                    tracing::warn!(%table, %column, value = %to, "Unrecognised nullability flag");
                    format!(
                        "-- Unrecognised nullability '{}' for {}.{}, no statement generated",
                        to, table, column
                    )
                }
            },
            ChangeKind::AttributeMismatch {
                column, desired, ..
            } => format!(
                "ALTER TABLE {} ALTER COLUMN {} TYPE {};",
                table,
                column,
                self.column_type(desired)
            ),
        }
    }
}
