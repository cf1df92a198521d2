//! Schema module for schema_drift
//!
//! This module holds the comparison pipeline: header resolution,
//! normalization, diffing, change-set building and script rendering.

pub mod changes;
pub mod diff;
pub mod dialect;
pub mod generator;
pub mod normalizer;
pub mod resolver;
pub mod type_map;
pub mod types;

// Re-export key types
pub use changes::{
    build_changes, ChangeDescriptor, ChangeKind, ChangeRecord, ChangeSet, ChangeSetBuilder,
    Direction, MismatchValues, UnsupportedChange,
};
pub use diff::{comparable_attributes, compare};
pub use dialect::{Dialect, DialectKind, MsSqlDialect, PostgresDialect};
pub use generator::{RenderedScript, ScriptGenerator, TableBlock};
pub use normalizer::{normalize, SchemaNormalizer};
pub use resolver::{ColumnAliases, ResolvedHeader};
pub use type_map::TypeMapper;
pub use types::{
    Attribute, ColumnShape, ComparisonSet, DiffKind, DiffRecord, DiffRow, SchemaRecord, Side,
};
