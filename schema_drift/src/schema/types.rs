//! Type definitions for normalized schema exports and their differences

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Schema name injected when an export has no schema column
pub const DEFAULT_SCHEMA_NAME: &str = "default_schema";

/// One of the two sides of a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Source,
    Target,
}

impl Side {
    /// Lower-case name, as used in change descriptors
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Source => "source",
            Side::Target => "target",
        }
    }

    /// The other side
    pub fn opposite(&self) -> Side {
        match self {
            Side::Source => Side::Target,
            Side::Target => Side::Source,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Source => f.write_str("SOURCE"),
            Side::Target => f.write_str("TARGET"),
        }
    }
}

/// Canonical attribute names an export column can resolve to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    SchemaName,
    TableName,
    ColumnName,
    DataType,
    MaxLength,
    IsNullable,
    Precision,
    Scale,
    DefaultValue,
    PrimaryKey,
    Identity,
}

impl Attribute {
    pub const ALL: [Attribute; 11] = [
        Attribute::SchemaName,
        Attribute::TableName,
        Attribute::ColumnName,
        Attribute::DataType,
        Attribute::MaxLength,
        Attribute::IsNullable,
        Attribute::Precision,
        Attribute::Scale,
        Attribute::DefaultValue,
        Attribute::PrimaryKey,
        Attribute::Identity,
    ];

    /// Attributes the diff engine checks, in the order their labels are reported
    pub const COMPARED: [Attribute; 5] = [
        Attribute::DataType,
        Attribute::MaxLength,
        Attribute::IsNullable,
        Attribute::Precision,
        Attribute::Scale,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Attribute::SchemaName => "schema_name",
            Attribute::TableName => "table_name",
            Attribute::ColumnName => "column_name",
            Attribute::DataType => "data_type",
            Attribute::MaxLength => "max_length",
            Attribute::IsNullable => "is_nullable",
            Attribute::Precision => "precision",
            Attribute::Scale => "scale",
            Attribute::DefaultValue => "default_value",
            Attribute::PrimaryKey => "primary_key",
            Attribute::Identity => "identity",
        }
    }

    pub fn from_name(name: &str) -> Option<Attribute> {
        Attribute::ALL.iter().copied().find(|attr| attr.name() == name)
    }

    /// Key attributes identify a record and are never compared as values
    pub fn is_key(&self) -> bool {
        matches!(
            self,
            Attribute::SchemaName | Attribute::TableName | Attribute::ColumnName
        )
    }

    /// Label used in a diff comment when this attribute differs; `None`
    /// for attributes the diff engine never compares
    pub fn diff_label(&self) -> Option<&'static str> {
        match self {
            Attribute::DataType => Some("datatype differs"),
            Attribute::MaxLength => Some("length differs"),
            Attribute::IsNullable => Some("nullable differs"),
            Attribute::Precision => Some("precision differs"),
            Attribute::Scale => Some("scale differs"),
            _ => None,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Normalize a raw cell: trimmed, with `nan`/`none` read as empty
pub fn normalize_value(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("nan") || trimmed.eq_ignore_ascii_case("none") {
        String::new()
    } else {
        trimmed.to_string()
    }
}

/// One normalized row of a schema export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaRecord {
    pub schema_name: String,
    pub table_name: String,
    pub column_name: String,
    /// Optional descriptive attributes, present only if the export had the column
    pub attributes: IndexMap<Attribute, String>,
    /// Columns that did not resolve to a canonical attribute
    pub extra: IndexMap<String, String>,
}

impl SchemaRecord {
    /// Create a record with only its key fields set
    pub fn new(schema_name: &str, table_name: &str, column_name: &str) -> Self {
        Self {
            schema_name: schema_name.to_string(),
            table_name: table_name.to_string(),
            column_name: column_name.to_string(),
            attributes: IndexMap::new(),
            extra: IndexMap::new(),
        }
    }

    /// Set an optional attribute
    pub fn with(mut self, attribute: Attribute, value: &str) -> Self {
        self.attributes.insert(attribute, value.to_string());
        self
    }

    /// Value of an attribute, `None` if the export never had it
    pub fn get(&self, attribute: Attribute) -> Option<&str> {
        match attribute {
            Attribute::SchemaName => Some(&self.schema_name),
            Attribute::TableName => Some(&self.table_name),
            Attribute::ColumnName => Some(&self.column_name),
            _ => self.attributes.get(&attribute).map(String::as_str),
        }
    }

    /// Lower-cased column name used to match columns across sides
    pub fn column_key(&self) -> String {
        self.column_name.to_lowercase()
    }

    /// The comparable part of this record
    pub fn shape(&self) -> ColumnShape {
        let value = |attr| self.get(attr).unwrap_or_default().to_string();
        ColumnShape {
            data_type: value(Attribute::DataType),
            max_length: value(Attribute::MaxLength),
            is_nullable: value(Attribute::IsNullable),
            precision: value(Attribute::Precision),
            scale: value(Attribute::Scale),
        }
    }
}

/// All normalized records for one side of a comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonSet {
    pub side: Side,
    /// Optional attributes the export carried, under any alias
    pub attributes: BTreeSet<Attribute>,
    /// Unresolved headers, lower-cased and trimmed
    pub extra_columns: Vec<String>,
    pub records: Vec<SchemaRecord>,
}

impl ComparisonSet {
    /// Create an empty set
    pub fn new(side: Side) -> Self {
        Self {
            side,
            attributes: BTreeSet::new(),
            extra_columns: Vec::new(),
            records: Vec::new(),
        }
    }

    /// Whether the export had this attribute (key attributes are always present)
    pub fn has_attribute(&self, attribute: Attribute) -> bool {
        attribute.is_key() || self.attributes.contains(&attribute)
    }

    /// Distinct table names
    pub fn table_names(&self) -> BTreeSet<&str> {
        self.records.iter().map(|r| r.table_name.as_str()).collect()
    }

    /// Records belonging to one table, in input order
    pub fn table_records<'a>(&'a self, table: &'a str) -> impl Iterator<Item = &'a SchemaRecord> + 'a {
        self.records.iter().filter(move |r| r.table_name == table)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Comparable values of one column on one side
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnShape {
    pub data_type: String,
    pub max_length: String,
    pub is_nullable: String,
    pub precision: String,
    pub scale: String,
}

impl ColumnShape {
    pub fn get(&self, attribute: Attribute) -> &str {
        match attribute {
            Attribute::DataType => &self.data_type,
            Attribute::MaxLength => &self.max_length,
            Attribute::IsNullable => &self.is_nullable,
            Attribute::Precision => &self.precision,
            Attribute::Scale => &self.scale,
            _ => "",
        }
    }

    /// `precision[,scale]`, or `None` without a precision
    pub fn precision_scale(&self) -> Option<String> {
        if self.precision.is_empty() {
            None
        } else if self.scale.is_empty() {
            Some(self.precision.clone())
        } else {
            Some(format!("{},{}", self.precision, self.scale))
        }
    }
}

/// Classification of a diff row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffKind {
    /// The table exists only on the other side
    TableMissing(Side),
    /// The column exists only on the other side
    ColumnMissing(Side),
    /// Same column, spelled with different case
    ColumnRename,
    /// One or more compared attributes differ, in `Attribute::COMPARED` order
    AttributesDiffer(Vec<Attribute>),
}

impl DiffKind {
    pub fn comment(&self) -> String {
        match self {
            DiffKind::TableMissing(side) => format!("table missing in {side}"),
            DiffKind::ColumnMissing(side) => format!("column missing in {side}"),
            DiffKind::ColumnRename => "column rename required".to_string(),
            DiffKind::AttributesDiffer(attributes) => attributes
                .iter()
                .filter_map(Attribute::diff_label)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// One detected discrepancy between source and target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRow {
    pub table_name: String,
    pub column_in_source: String,
    pub column_in_target: String,
    pub source: ColumnShape,
    pub target: ColumnShape,
    pub kind: DiffKind,
}

impl DiffRow {
    /// A table present on one side only
    pub fn table_missing(table: &str, missing_in: Side) -> Self {
        Self {
            table_name: table.to_string(),
            column_in_source: String::new(),
            column_in_target: String::new(),
            source: ColumnShape::default(),
            target: ColumnShape::default(),
            kind: DiffKind::TableMissing(missing_in),
        }
    }

    pub fn comment(&self) -> String {
        self.kind.comment()
    }

    pub fn source_datatype(&self) -> &str {
        &self.source.data_type
    }

    pub fn target_datatype(&self) -> &str {
        &self.target.data_type
    }

    pub fn source_length(&self) -> &str {
        &self.source.max_length
    }

    pub fn target_length(&self) -> &str {
        &self.target.max_length
    }

    /// Column name on whichever side has it, source first
    pub fn column(&self) -> &str {
        if self.column_in_source.is_empty() {
            &self.column_in_target
        } else {
            &self.column_in_source
        }
    }

    pub fn shape(&self, side: Side) -> &ColumnShape {
        match side {
            Side::Source => &self.source,
            Side::Target => &self.target,
        }
    }
}

/// Flat export form of a diff row, one field per output column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRecord {
    pub table_name: String,
    pub column_in_source: String,
    pub column_in_target: String,
    pub source_datatype: String,
    pub target_datatype: String,
    pub source_length: String,
    pub target_length: String,
    pub comment: String,
}

impl From<&DiffRow> for DiffRecord {
    fn from(row: &DiffRow) -> Self {
        Self {
            table_name: row.table_name.clone(),
            column_in_source: row.column_in_source.clone(),
            column_in_target: row.column_in_target.clone(),
            source_datatype: row.source.data_type.clone(),
            target_datatype: row.target.data_type.clone(),
            source_length: row.source.max_length.clone(),
            target_length: row.target.max_length.clone(),
            comment: row.comment(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_compared_attributes_have_labels() {
        for attribute in Attribute::ALL {
            assert_eq!(
                attribute.diff_label().is_some(),
                Attribute::COMPARED.contains(&attribute),
                "{attribute}"
            );
        }
    }

    #[test]
    fn precision_scale_parameter() {
        let mut shape = ColumnShape {
            data_type: "decimal".to_string(),
            max_length: "9".to_string(),
            ..Default::default()
        };
        assert_eq!(shape.precision_scale(), None);

        shape.precision = "18".to_string();
        assert_eq!(shape.precision_scale().as_deref(), Some("18"));

        shape.scale = "2".to_string();
        assert_eq!(shape.precision_scale().as_deref(), Some("18,2"));
    }
}
