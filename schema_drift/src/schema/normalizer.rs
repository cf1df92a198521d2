//! Schema normalizer
//!
//! Turns a raw export into a [`ComparisonSet`]: headers are resolved to
//! canonical attributes, a default schema is injected and every value is
//! trimmed so comparisons are deterministic.

use indexmap::map::Entry;
use indexmap::IndexMap;

use crate::error::{Result, ValidationError};
use crate::input::RawTable;
use crate::schema::resolver::{ColumnAliases, ResolvedHeader};
use crate::schema::types::{normalize_value, Attribute, ComparisonSet, SchemaRecord, Side};

/// Where a raw column ends up after header resolution
enum Slot {
    Attribute(Attribute),
    Extra(String),
    Ignored,
}

/// Normalizes raw exports for one comparison
pub struct SchemaNormalizer<'a> {
    aliases: &'a ColumnAliases,
    default_schema: &'a str,
}

impl<'a> SchemaNormalizer<'a> {
    /// Create a normalizer over an alias table
    pub fn new(aliases: &'a ColumnAliases, default_schema: &'a str) -> Self {
        Self {
            aliases,
            default_schema,
        }
    }

    /// Normalize one side of a comparison
    pub fn normalize(&self, raw: &RawTable, side: Side) -> Result<ComparisonSet> {
        let slots = self.resolve_headers(raw.headers(), side);
        let mut set = ComparisonSet::new(side);

        for slot in &slots {
            match slot {
                Slot::Attribute(attribute) if !attribute.is_key() => {
                    set.attributes.insert(*attribute);
                }
                Slot::Extra(name) => set.extra_columns.push(name.clone()),
                _ => {}
            }
        }

        for required in [Attribute::TableName, Attribute::ColumnName] {
            let present = slots
                .iter()
                .any(|slot| matches!(slot, Slot::Attribute(a) if *a == required));
            if !present {
                return Err(ValidationError::MissingRequiredColumn {
                    side,
                    column: required,
                }
                .into());
            }
        }

        // Keyed by (table, lower(column)); a later duplicate overwrites in place.
        let mut records: IndexMap<(String, String), SchemaRecord> = IndexMap::new();

        for (index, row) in raw.rows().iter().enumerate() {
            let row_number = index + 1;
            if row.iter().all(|cell| normalize_value(cell).is_empty()) {
                tracing::debug!(%side, row = row_number, "Skipping blank row");
                continue;
            }

            let record = self.build_record(&slots, row, side, row_number)?;
            match records.entry((record.table_name.clone(), record.column_key())) {
                Entry::Occupied(mut existing) => {
                    tracing::warn!(
                        %side,
                        table = %record.table_name,
                        column = %record.column_name,
                        row = row_number,
                        "Duplicate column definition, keeping the last one"
                    );
                    existing.insert(record);
                }
                Entry::Vacant(slot) => {
                    slot.insert(record);
                }
            }
        }

        set.records = records.into_values().collect();

        tracing::debug!(
            %side,
            records = set.records.len(),
            attributes = ?set.attributes,
            extra = ?set.extra_columns,
            "Normalized schema export"
        );

        Ok(set)
    }

    /// Lower-case, trim and resolve every header. A canonical attribute
    /// claimed by more than one header keeps the first.
    fn resolve_headers(&self, headers: &[String], side: Side) -> Vec<Slot> {
        let mut seen = Vec::new();
        headers
            .iter()
            .map(|header| {
                let cleaned = header.trim().to_lowercase();
                match self.aliases.resolve(&cleaned) {
                    ResolvedHeader::Canonical(attribute) => {
                        if seen.contains(&attribute) {
                            tracing::warn!(%side, %header, %attribute, "Header resolves to an attribute already mapped, ignoring it");
                            Slot::Ignored
                        } else {
                            seen.push(attribute);
                            Slot::Attribute(attribute)
                        }
                    }
                    ResolvedHeader::Unresolved(name) => Slot::Extra(name),
                }
            })
            .collect()
    }

    fn build_record(
        &self,
        slots: &[Slot],
        row: &[String],
        side: Side,
        row_number: usize,
    ) -> Result<SchemaRecord> {
        let mut record = SchemaRecord::new(self.default_schema, "", "");

        for (slot, cell) in slots.iter().zip(row.iter()) {
            let value = normalize_value(cell);
            match slot {
                Slot::Attribute(Attribute::SchemaName) => {
                    if !value.is_empty() {
                        record.schema_name = value;
                    }
                }
                Slot::Attribute(Attribute::TableName) => record.table_name = value,
                Slot::Attribute(Attribute::ColumnName) => record.column_name = value,
                Slot::Attribute(attribute) => {
                    record.attributes.insert(*attribute, value);
                }
                Slot::Extra(name) => {
                    record.extra.insert(name.clone(), value);
                }
                Slot::Ignored => {}
            }
        }

        // Rows shorter than the header still carry every attribute the export has
        for slot in slots.iter().skip(row.len()) {
            if let Slot::Attribute(attribute) = slot {
                if !attribute.is_key() {
                    record.attributes.entry(*attribute).or_default();
                }
            }
        }

        for (column, value) in [
            (Attribute::TableName, &record.table_name),
            (Attribute::ColumnName, &record.column_name),
        ] {
            if value.is_empty() {
                return Err(ValidationError::EmptyKey {
                    side,
                    row: row_number,
                    column,
                }
                .into());
            }
        }

        Ok(record)
    }
}

/// Normalize with the builtin alias table and default schema name
pub fn normalize(raw: &RawTable, side: Side) -> Result<ComparisonSet> {
    let aliases = ColumnAliases::default();
    SchemaNormalizer::new(&aliases, crate::schema::types::DEFAULT_SCHEMA_NAME).normalize(raw, side)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use pretty_assertions::assert_eq;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn injects_default_schema_and_trims_values() {
        let raw = table(
            &["Table Name", "Column", "Type", "Length"],
            &[&[" users ", " id ", " int ", "NaN"]],
        );

        let set = normalize(&raw, Side::Source).unwrap();

        assert_eq!(set.records.len(), 1);
        let record = &set.records[0];
        assert_eq!(record.schema_name, "default_schema");
        assert_eq!(record.table_name, "users");
        assert_eq!(record.column_name, "id");
        assert_eq!(record.get(Attribute::DataType), Some("int"));
        assert_eq!(record.get(Attribute::MaxLength), Some(""));
        assert_eq!(record.get(Attribute::Precision), None);
    }

    #[test]
    fn missing_required_column_names_the_side() {
        let raw = table(&["table_name", "data_type"], &[&["users", "int"]]);

        let err = normalize(&raw, Side::Target).unwrap_err();
        match err {
            Error::Validation(ValidationError::MissingRequiredColumn { side, column }) => {
                assert_eq!(side, Side::Target);
                assert_eq!(column, Attribute::ColumnName);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_key_is_rejected_but_blank_rows_are_skipped() {
        let raw = table(
            &["table_name", "column_name"],
            &[&["users", "id"], &["", " "], &["users", "none"]],
        );

        let err = normalize(&raw, Side::Source).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: SOURCE row 3 has an empty column_name"
        );
    }

    #[test]
    fn duplicate_columns_keep_last_values() {
        let raw = table(
            &["table_name", "column_name", "data_type"],
            &[
                &["users", "id", "int"],
                &["users", "name", "varchar"],
                &["users", "ID", "bigint"],
            ],
        );

        let set = normalize(&raw, Side::Source).unwrap();

        assert_eq!(set.records.len(), 2);
        assert_eq!(set.records[0].column_name, "ID");
        assert_eq!(set.records[0].get(Attribute::DataType), Some("bigint"));
        assert_eq!(set.records[1].column_name, "name");
    }

    #[test]
    fn unresolved_headers_are_preserved() {
        let raw = table(
            &["table_name", "column_name", "Collation"],
            &[&["users", "name", "Latin1_General_CI_AS"]],
        );

        let set = normalize(&raw, Side::Source).unwrap();

        assert_eq!(set.extra_columns, vec!["collation".to_string()]);
        assert_eq!(
            set.records[0].extra.get("collation").map(String::as_str),
            Some("Latin1_General_CI_AS")
        );
    }

    #[test]
    fn second_alias_for_same_attribute_is_ignored() {
        let raw = table(
            &["table_name", "column_name", "data_type", "type"],
            &[&["users", "id", "int", "bigint"]],
        );

        let set = normalize(&raw, Side::Source).unwrap();
        assert_eq!(set.records[0].get(Attribute::DataType), Some("int"));
    }

    #[test]
    fn alias_choice_does_not_change_the_set() {
        let spelled = table(&["Table Name", "Column Name"], &[&["users", "id"]]);
        let compact = table(&["tablename", "columnname"], &[&["users", "id"]]);

        assert_eq!(
            normalize(&spelled, Side::Source).unwrap(),
            normalize(&compact, Side::Source).unwrap()
        );
    }
}
