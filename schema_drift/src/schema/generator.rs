//! Script generator
//!
//! Renders change descriptors as a DDL script for one dialect, grouped per
//! table in the order tables are first encountered.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

use crate::schema::changes::ChangeDescriptor;
use crate::schema::dialect::{Dialect, DialectKind};

/// Statements for one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableBlock {
    pub table: String,
    pub header: String,
    pub statements: Vec<String>,
}

/// A generated script
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedScript {
    pub dialect: DialectKind,
    pub blocks: Vec<TableBlock>,
    text: String,
}

impl RenderedScript {
    /// Full script text; never empty
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether the script contains no statements
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn statement_count(&self) -> usize {
        self.blocks.iter().map(|b| b.statements.len()).sum()
    }
}

impl fmt::Display for RenderedScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Script generator over one dialect
pub struct ScriptGenerator<'a> {
    dialect: &'a dyn Dialect,
}

impl<'a> ScriptGenerator<'a> {
    /// Create a new script generator
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Self { dialect }
    }

    /// Render change descriptors
    pub fn generate(&self, changes: &[ChangeDescriptor]) -> RenderedScript {
        let mut by_table: IndexMap<&str, Vec<&ChangeDescriptor>> = IndexMap::new();
        for change in changes {
            by_table.entry(change.table.as_str()).or_default().push(change);
        }

        let blocks: Vec<TableBlock> = by_table
            .into_iter()
            .map(|(table, items)| TableBlock {
                table: table.to_string(),
                header: self.dialect.table_header(table),
                statements: self.render_block(table, items),
            })
            .collect();

        let text = if blocks.is_empty() {
            self.dialect.empty_script()
        } else {
            let mut lines = Vec::new();
            for block in &blocks {
                lines.push(block.header.as_str());
                lines.extend(block.statements.iter().map(String::as_str));
                lines.push("");
            }
            lines.join("\n")
        };

        tracing::debug!(
            dialect = %self.dialect.kind(),
            tables = blocks.len(),
            changes = changes.len(),
            "Rendered script"
        );

        RenderedScript {
            dialect: self.dialect.kind(),
            blocks,
            text,
        }
    }

    /// Render one table's changes. Several attribute changes on a column
    /// can render to the same statement; a repeat of the previous
    /// statement is emitted once.
    fn render_block(&self, table: &str, changes: Vec<&ChangeDescriptor>) -> Vec<String> {
        let mut statements: Vec<String> = Vec::with_capacity(changes.len());
        for change in changes {
            let statement = self.dialect.render_change(change);
            if statements.last() == Some(&statement) {
                tracing::debug!(%table, change_type = %change.change_type(), "Skipping repeated statement");
                continue;
            }
            statements.push(statement);
        }
        statements
    }
}
