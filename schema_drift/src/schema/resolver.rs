//! Column resolver
//!
//! Maps the many spellings found in schema export headers onto the fixed
//! set of canonical attributes.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::schema::types::Attribute;

/// Builtin alias table. "lenth" is a misspelling seen in real exports.
const BUILTIN_ALIASES: &[(Attribute, &[&str])] = &[
    (Attribute::SchemaName, &["schema_name", "table_schema", "schema"]),
    (Attribute::TableName, &["table_name", "table name", "table", "tablename"]),
    (Attribute::ColumnName, &["column_name", "column", "columnname", "column name"]),
    (Attribute::DataType, &["data_type", "datatype", "data type", "type"]),
    (
        Attribute::MaxLength,
        &["max_length", "length", "lenth", "char_length", "character_maximum_length"],
    ),
    (
        Attribute::IsNullable,
        &["is_nullable", "nullable", "is null", "nullability", "null"],
    ),
    (Attribute::Precision, &["precision", "numeric_precision"]),
    (Attribute::Scale, &["scale", "numeric_scale"]),
    (Attribute::DefaultValue, &["default_value", "column_default", "default"]),
    (Attribute::PrimaryKey, &["primary_key", "is_primary_key", "pk"]),
    (Attribute::Identity, &["identity", "is_identity", "auto_increment"]),
];

static BUILTIN: Lazy<ColumnAliases> = Lazy::new(|| {
    let mut aliases = ColumnAliases::empty();
    for (attribute, spellings) in BUILTIN_ALIASES {
        aliases.insert(*attribute, spellings.iter().copied());
    }
    aliases
});

/// A header after resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedHeader {
    Canonical(Attribute),
    /// No alias matched; the header is passed through verbatim
    Unresolved(String),
}

impl ResolvedHeader {
    pub fn name(&self) -> &str {
        match self {
            ResolvedHeader::Canonical(attribute) => attribute.name(),
            ResolvedHeader::Unresolved(header) => header,
        }
    }
}

/// Alias table from canonical attribute to known spellings
#[derive(Debug, Clone)]
pub struct ColumnAliases {
    spellings: IndexMap<Attribute, Vec<String>>,
    lookup: HashMap<String, Attribute>,
}

impl Default for ColumnAliases {
    fn default() -> Self {
        BUILTIN.clone()
    }
}

impl ColumnAliases {
    /// An alias table with no entries
    pub fn empty() -> Self {
        Self {
            spellings: IndexMap::new(),
            lookup: HashMap::new(),
        }
    }

    /// Add spellings for a canonical attribute. Spellings are stored
    /// lower-cased and trimmed; a spelling already claimed by another
    /// attribute is reassigned to this one.
    pub fn insert<I, S>(&mut self, attribute: Attribute, spellings: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entry = self.spellings.entry(attribute).or_default();
        for spelling in spellings {
            let spelling = spelling.as_ref().trim().to_lowercase();
            if spelling.is_empty() {
                continue;
            }
            if let Some(previous) = self.lookup.insert(spelling.clone(), attribute) {
                if previous != attribute {
                    tracing::warn!(%spelling, from = %previous, to = %attribute, "Alias reassigned");
                }
            }
            if !entry.contains(&spelling) {
                entry.push(spelling);
            }
        }
    }

    /// Merge extra spellings keyed by canonical attribute name
    pub fn extend_from_names(&mut self, extra: &IndexMap<String, Vec<String>>) -> Result<()> {
        for (name, spellings) in extra {
            let attribute = Attribute::from_name(&name.trim().to_lowercase()).ok_or_else(|| {
                Error::ConfigError(format!("Unknown canonical column in aliases: {}", name))
            })?;
            self.insert(attribute, spellings);
        }
        Ok(())
    }

    /// Resolve a raw header (case-insensitive, trimmed)
    pub fn resolve(&self, header: &str) -> ResolvedHeader {
        match self.lookup.get(&header.trim().to_lowercase()) {
            Some(attribute) => ResolvedHeader::Canonical(*attribute),
            None => ResolvedHeader::Unresolved(header.to_string()),
        }
    }

    /// Known spellings for an attribute
    pub fn spellings(&self, attribute: Attribute) -> &[String] {
        self.spellings
            .get(&attribute)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Table Name", Attribute::TableName)]
    #[case("tablename", Attribute::TableName)]
    #[case("  TABLE_SCHEMA ", Attribute::SchemaName)]
    #[case("columnname", Attribute::ColumnName)]
    #[case("Data Type", Attribute::DataType)]
    #[case("lenth", Attribute::MaxLength)]
    #[case("CHARACTER_MAXIMUM_LENGTH", Attribute::MaxLength)]
    #[case("Nullability", Attribute::IsNullable)]
    #[case("numeric_scale", Attribute::Scale)]
    #[case("auto_increment", Attribute::Identity)]
    fn resolves_known_spellings(#[case] header: &str, #[case] expected: Attribute) {
        let aliases = ColumnAliases::default();
        assert_eq!(aliases.resolve(header), ResolvedHeader::Canonical(expected));
    }

    #[test]
    fn unknown_header_passes_through_verbatim() {
        let aliases = ColumnAliases::default();
        let resolved = aliases.resolve("Collation Name");
        assert_eq!(resolved, ResolvedHeader::Unresolved("Collation Name".to_string()));
        assert_eq!(resolved.name(), "Collation Name");
    }

    #[test]
    fn extra_spellings_extend_the_table() {
        let mut extra = IndexMap::new();
        extra.insert("max_length".to_string(), vec!["Size".to_string()]);

        let mut aliases = ColumnAliases::default();
        aliases.extend_from_names(&extra).unwrap();

        assert_eq!(aliases.resolve("size"), ResolvedHeader::Canonical(Attribute::MaxLength));
        assert!(aliases.spellings(Attribute::MaxLength).contains(&"lenth".to_string()));
    }

    #[test]
    fn unknown_canonical_name_is_a_config_error() {
        let mut extra = IndexMap::new();
        extra.insert("collation".to_string(), vec!["coll".to_string()]);

        let err = ColumnAliases::default().extend_from_names(&extra).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }
}
