//! schema_drift: detects drift between two tabular schema exports
//!
//! Two exports (a source and a target, e.g. `INFORMATION_SCHEMA.COLUMNS`
//! dumps) are normalized, diffed column by column, turned into
//! direction-aware change descriptors and rendered as DDL for a target
//! dialect. Every stage is a pure transformation; the engine performs no
//! I/O of its own.

pub mod config;
pub mod error;
pub mod input;
pub mod schema;
pub mod utils;


use serde::Serialize;

// Re-export main types for easier access
pub use config::Config;
pub use error::{Error, Result, ValidationError};
pub use input::RawTable;
pub use schema::changes::{ChangeDescriptor, ChangeSet, ChangeSetBuilder, Direction, MismatchValues};
pub use schema::dialect::{Dialect, DialectKind};
pub use schema::generator::{RenderedScript, ScriptGenerator};
pub use schema::resolver::ColumnAliases;
pub use schema::types::{ComparisonSet, DiffRecord, DiffRow, Side};

/// Initialize the engine from the specified configuration file
pub fn init(config_path: &str) -> Result<DriftEngine> {
    let config = config::load_from_file(config_path)?;
    DriftEngine::new(config)
}

/// Everything one comparison produces
#[derive(Debug, Clone, Serialize)]
pub struct DriftReport {
    pub diff: Vec<DiffRow>,
    pub changes: ChangeSet,
    pub script: RenderedScript,
}

impl DriftReport {
    /// Whether the two exports match on every comparable attribute
    pub fn is_clean(&self) -> bool {
        self.diff.is_empty()
    }
}

/// The comparison pipeline with its configuration applied.
///
/// Holds only read-only tables, so one engine can serve any number of
/// independent comparisons.
pub struct DriftEngine {
    config: Config,
    aliases: ColumnAliases,
    dialect: Box<dyn Dialect>,
}

impl DriftEngine {
    /// Create an engine from configuration
    pub fn new(config: Config) -> Result<Self> {
        let dialect_kind = config.dialect_kind()?;
        Self::with_dialect(config, dialect_kind)
    }

    /// Create an engine rendering for a dialect other than the configured one
    pub fn with_dialect(config: Config, dialect_kind: DialectKind) -> Result<Self> {
        let aliases = config.column_aliases()?;
        let dialect = dialect_kind.dialect(config.type_mapping.overrides_for(dialect_kind));

        Ok(Self {
            config,
            aliases,
            dialect,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// Normalize one side of a comparison
    pub fn normalize(&self, raw: &RawTable, side: Side) -> Result<ComparisonSet> {
        schema::normalizer::SchemaNormalizer::new(&self.aliases, &self.config.comparison.default_schema)
            .normalize(raw, side)
    }

    /// Normalize both exports and diff them.
    ///
    /// Each side is validated on its own so the error names the malformed one.
    pub fn compare(&self, source: &RawTable, target: &RawTable) -> Result<Vec<DiffRow>> {
        let source = self.normalize(source, Side::Source)?;
        let target = self.normalize(target, Side::Target)?;
        Ok(schema::diff::compare(&source, &target))
    }

    /// Turn diff rows into change descriptors
    pub fn build_changes(&self, rows: &[DiffRow], direction: Direction) -> ChangeSet {
        ChangeSetBuilder::new(direction)
            .mismatch_values(self.config.comparison.mismatch_values)
            .build(rows)
    }

    /// Render change descriptors with the engine's dialect
    pub fn render(&self, changes: &[ChangeDescriptor]) -> RenderedScript {
        ScriptGenerator::new(self.dialect.as_ref()).generate(changes)
    }

    /// Complete workflow: normalize, diff, build changes and render
    pub fn run(&self, source: &RawTable, target: &RawTable, direction: Direction) -> Result<DriftReport> {
        let diff = self.compare(source, target)?;
        let changes = self.build_changes(&diff, direction);
        let script = self.render(&changes.changes);

        tracing::info!(
            diff_rows = diff.len(),
            changes = changes.changes.len(),
            unsupported = changes.unsupported.len(),
            dialect = %self.dialect.kind(),
            %direction,
            "Schema comparison complete"
        );

        Ok(DriftReport {
            diff,
            changes,
            script,
        })
    }
}
