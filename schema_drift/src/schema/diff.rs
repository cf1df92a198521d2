//! Schema difference calculator
//!
//! Matches tables and columns between two normalized exports and emits one
//! [`DiffRow`] per discrepancy. Tables and columns are visited in sorted
//! order, so the output is reproducible.

use std::collections::{BTreeMap, BTreeSet};

use crate::schema::types::{Attribute, ComparisonSet, DiffKind, DiffRow, SchemaRecord, Side};

/// Attributes present on both sides, excluding the key attributes
pub fn comparable_attributes(source: &ComparisonSet, target: &ComparisonSet) -> BTreeSet<Attribute> {
    source
        .attributes
        .intersection(&target.attributes)
        .copied()
        .filter(|attr| !attr.is_key())
        .collect()
}

/// Compare two normalized exports
pub fn compare(source: &ComparisonSet, target: &ComparisonSet) -> Vec<DiffRow> {
    let comparable = comparable_attributes(source, target);
    let checked: Vec<Attribute> = Attribute::COMPARED
        .iter()
        .copied()
        .filter(|attr| comparable.contains(attr))
        .collect();

    tracing::debug!(comparable = ?comparable, checked = ?checked, "Comparing attributes");

    let source_tables = source.table_names();
    let target_tables = target.table_names();
    let all_tables: BTreeSet<&str> = source_tables.union(&target_tables).copied().collect();

    let mut rows = Vec::new();

    for table in all_tables {
        if !source_tables.contains(table) {
            rows.push(DiffRow::table_missing(table, Side::Source));
            continue;
        }
        if !target_tables.contains(table) {
            rows.push(DiffRow::table_missing(table, Side::Target));
            continue;
        }

        compare_table(table, source, target, &checked, &mut rows);
    }

    tracing::debug!(rows = rows.len(), "Schema comparison finished");
    rows
}

/// Lower-cased column name to record, for one table on one side
fn column_map<'a>(set: &'a ComparisonSet, table: &'a str) -> BTreeMap<String, &'a SchemaRecord> {
    set.table_records(table)
        .map(|record| (record.column_key(), record))
        .collect()
}

fn compare_table(
    table: &str,
    source: &ComparisonSet,
    target: &ComparisonSet,
    checked: &[Attribute],
    rows: &mut Vec<DiffRow>,
) {
    let source_columns = column_map(source, table);
    let target_columns = column_map(target, table);

    let all_keys: BTreeSet<&String> = source_columns.keys().chain(target_columns.keys()).collect();

    for key in all_keys {
        let (source_record, target_record) = match (source_columns.get(key), target_columns.get(key)) {
            (None, Some(target_record)) => {
                rows.push(DiffRow {
                    table_name: table.to_string(),
                    column_in_source: String::new(),
                    column_in_target: target_record.column_name.clone(),
                    source: Default::default(),
                    target: target_record.shape(),
                    kind: DiffKind::ColumnMissing(Side::Source),
                });
                continue;
            }
            (Some(source_record), None) => {
                rows.push(DiffRow {
                    table_name: table.to_string(),
                    column_in_source: source_record.column_name.clone(),
                    column_in_target: String::new(),
                    source: source_record.shape(),
                    target: Default::default(),
                    kind: DiffKind::ColumnMissing(Side::Target),
                });
                continue;
            }
            (Some(source_record), Some(target_record)) => (*source_record, *target_record),
            (None, None) => continue,
        };

        let kind = if source_record.column_name != target_record.column_name {
            Some(DiffKind::ColumnRename)
        } else {
            let differing: Vec<Attribute> = checked
                .iter()
                .copied()
                .filter(|attr| attribute_differs(*attr, source_record, target_record))
                .collect();
            (!differing.is_empty()).then_some(DiffKind::AttributesDiffer(differing))
        };

        if let Some(kind) = kind {
            rows.push(DiffRow {
                table_name: table.to_string(),
                column_in_source: source_record.column_name.clone(),
                column_in_target: target_record.column_name.clone(),
                source: source_record.shape(),
                target: target_record.shape(),
                kind,
            });
        }
    }
}

/// Two empty values never differ. Type names and nullability flags
/// compare case-insensitively; the numeric attributes compare exactly.
fn attribute_differs(attribute: Attribute, source: &SchemaRecord, target: &SchemaRecord) -> bool {
    let source_value = source.get(attribute).unwrap_or_default();
    let target_value = target.get(attribute).unwrap_or_default();

    if source_value.is_empty() && target_value.is_empty() {
        return false;
    }

    match attribute {
        Attribute::DataType | Attribute::IsNullable => {
            source_value.to_lowercase() != target_value.to_lowercase()
        }
        _ => source_value != target_value,
    }
}
