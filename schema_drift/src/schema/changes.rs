//! Change-set builder
//!
//! Reinterprets diff rows as typed, direction-aware change descriptors
//! that a dialect can render.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::schema::types::{Attribute, ColumnShape, DiffKind, DiffRow, Side};

/// Which side is the current state to be migrated toward the other
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    SourceToTarget,
    TargetToSource,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::SourceToTarget => "source_to_target",
            Direction::TargetToSource => "target_to_source",
        }
    }

    /// Orders a (source, target) pair as (from, to)
    fn orient<T>(&self, source: T, target: T) -> (T, T) {
        match self {
            Direction::TargetToSource => (target, source),
            Direction::SourceToTarget => (source, target),
        }
    }

    /// The side whose values are the desired state
    fn desired_side(&self) -> Side {
        match self {
            Direction::TargetToSource => Side::Source,
            Direction::SourceToTarget => Side::Target,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "source_to_target" => Ok(Direction::SourceToTarget),
            "target_to_source" => Ok(Direction::TargetToSource),
            other => Err(Error::InvalidDirection(other.to_string())),
        }
    }
}

/// Where mismatch descriptors take their `from`/`to` values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchValues {
    /// The values of the attribute that actually differs
    #[default]
    Attribute,
    /// The data type fields of the row, whatever attribute differs
    TypeFields,
}

/// What a change descriptor asks for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeKind {
    /// Copy a column that exists on one side only onto `target`
    AddColumn {
        column: String,
        target: Side,
        /// Shape of the existing column
        shape: ColumnShape,
    },
    ColumnRename { from: String, to: String },
    AttributeMismatch {
        attribute: Attribute,
        column: String,
        from: String,
        to: String,
        /// Shape of the column on the desired side
        desired: ColumnShape,
        values: MismatchValues,
    },
}

/// A typed instruction derived from one diff row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeDescriptor {
    pub table: String,
    pub kind: ChangeKind,
    pub direction: Direction,
}

impl ChangeDescriptor {
    /// `add_column`, `column_rename` or `<attribute>_mismatch`
    pub fn change_type(&self) -> String {
        match &self.kind {
            ChangeKind::AddColumn { .. } => "add_column".to_string(),
            ChangeKind::ColumnRename { .. } => "column_rename".to_string(),
            ChangeKind::AttributeMismatch { attribute, .. } => format!("{}_mismatch", attribute),
        }
    }

    /// Flat export form
    pub fn to_record(&self) -> ChangeRecord {
        let mut record = ChangeRecord {
            change_type: self.change_type(),
            table: self.table.clone(),
            column: None,
            from: None,
            to: None,
            target: None,
            direction: self.direction,
        };
        match &self.kind {
            ChangeKind::AddColumn { column, target, .. } => {
                record.column = Some(column.clone());
                record.target = Some(*target);
            }
            ChangeKind::ColumnRename { from, to } => {
                record.from = Some(from.clone());
                record.to = Some(to.clone());
            }
            ChangeKind::AttributeMismatch { column, from, to, .. } => {
                record.column = Some(column.clone());
                record.from = Some(from.clone());
                record.to = Some(to.clone());
            }
        }
        record
    }
}

/// JSON shape of a change descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub change_type: String,
    pub table: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<Side>,
    pub direction: Direction,
}

/// A diff the change set cannot express
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnsupportedChange {
    /// No column metadata is available to create the table
    TableMissingNoSchema { table: String, missing_in: Side },
}

impl fmt::Display for UnsupportedChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnsupportedChange::TableMissingNoSchema { table, missing_in } => write!(
                f,
                "unsupported: table '{}' missing in {}, skipped",
                table, missing_in
            ),
        }
    }
}

/// Change descriptors for one comparison, plus what had to be skipped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub direction: Direction,
    pub changes: Vec<ChangeDescriptor>,
    pub unsupported: Vec<UnsupportedChange>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn records(&self) -> Vec<ChangeRecord> {
        self.changes.iter().map(ChangeDescriptor::to_record).collect()
    }
}

/// Builds a [`ChangeSet`] from diff rows
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeSetBuilder {
    direction: Direction,
    values: MismatchValues,
}

impl ChangeSetBuilder {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            values: MismatchValues::default(),
        }
    }

    /// Choose where mismatch `from`/`to` values come from
    pub fn mismatch_values(mut self, values: MismatchValues) -> Self {
        self.values = values;
        self
    }

    pub fn build(&self, rows: &[DiffRow]) -> ChangeSet {
        let mut set = ChangeSet {
            direction: self.direction,
            ..Default::default()
        };

        for row in rows {
            match &row.kind {
                DiffKind::ColumnRename => {
                    let (from, to) = self
                        .direction
                        .orient(&row.column_in_source, &row.column_in_target);
                    set.changes.push(self.descriptor(
                        row,
                        ChangeKind::ColumnRename {
                            from: from.clone(),
                            to: to.clone(),
                        },
                    ));
                }
                DiffKind::ColumnMissing(missing_in) => {
                    let present = missing_in.opposite();
                    let column = match present {
                        Side::Source => &row.column_in_source,
                        Side::Target => &row.column_in_target,
                    };
                    set.changes.push(self.descriptor(
                        row,
                        ChangeKind::AddColumn {
                            column: column.clone(),
                            target: *missing_in,
                            shape: row.shape(present).clone(),
                        },
                    ));
                }
                DiffKind::AttributesDiffer(attributes) => {
                    for attribute in attributes {
                        let kind = self.mismatch(row, *attribute);
                        set.changes.push(self.descriptor(row, kind));
                    }
                }
                DiffKind::TableMissing(missing_in) => {
                    let unsupported = UnsupportedChange::TableMissingNoSchema {
                        table: row.table_name.clone(),
                        missing_in: *missing_in,
                    };
                    tracing::warn!(table = %row.table_name, missing_in = %missing_in, "{}", unsupported);
                    set.unsupported.push(unsupported);
                }
            }
        }

        tracing::debug!(
            direction = %self.direction,
            changes = set.changes.len(),
            unsupported = set.unsupported.len(),
            "Built change set"
        );

        set
    }

    fn descriptor(&self, row: &DiffRow, kind: ChangeKind) -> ChangeDescriptor {
        ChangeDescriptor {
            table: row.table_name.clone(),
            kind,
            direction: self.direction,
        }
    }

    fn mismatch(&self, row: &DiffRow, attribute: Attribute) -> ChangeKind {
        let carrier = match self.values {
            MismatchValues::Attribute => attribute,
            MismatchValues::TypeFields => Attribute::DataType,
        };
        let (from, to) = self
            .direction
            .orient(row.source.get(carrier), row.target.get(carrier));

        ChangeKind::AttributeMismatch {
            attribute,
            column: row.column().to_string(),
            from: from.to_string(),
            to: to.to_string(),
            desired: row.shape(self.direction.desired_side()).clone(),
            values: self.values,
        }
    }
}

/// Build a change set with attribute-level mismatch values
pub fn build_changes(rows: &[DiffRow], direction: Direction) -> ChangeSet {
    ChangeSetBuilder::new(direction).build(rows)
}
