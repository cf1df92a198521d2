//! Type mapping
//!
//! Translates the free-text type names found in schema exports into a
//! dialect's type vocabulary through an explicit synonym table.

use indexmap::IndexMap;

use crate::schema::types::ColumnShape;

/// Type used when an export gives no type at all
pub const DEFAULT_TYPE: &str = "VARCHAR(255)";

/// Synonym table and parameter rules for one dialect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMapper {
    synonyms: IndexMap<String, String>,
    parameterized: Vec<String>,
    /// Families parameterized by `precision[,scale]` rather than length
    numeric: Vec<String>,
    /// Parameter written for an unbounded length, if the dialect has one
    unbounded: Option<String>,
    default_type: String,
}

impl TypeMapper {
    /// Create a mapper from (raw, dialect) pairs and the families that take a parameter
    pub fn new(synonyms: &[(&str, &str)], parameterized: &[&str]) -> Self {
        Self {
            synonyms: synonyms
                .iter()
                .map(|(raw, mapped)| (raw.to_uppercase(), mapped.to_string()))
                .collect(),
            parameterized: parameterized.iter().map(|s| s.to_uppercase()).collect(),
            numeric: Vec::new(),
            unbounded: None,
            default_type: DEFAULT_TYPE.to_string(),
        }
    }

    /// Mark families whose parameter is `precision[,scale]`
    pub fn numeric_families(mut self, families: &[&str]) -> Self {
        self.numeric = families.iter().map(|s| s.to_uppercase()).collect();
        self
    }

    /// Parameter to write when an export reports an unbounded length
    pub fn unbounded_parameter(mut self, parameter: &str) -> Self {
        self.unbounded = Some(parameter.to_string());
        self
    }

    /// SQL Server vocabulary
    pub fn mssql() -> Self {
        Self::new(
            &[
                ("INT", "INT"),
                ("INTEGER", "INT"),
                ("BIGINT", "BIGINT"),
                ("SMALLINT", "SMALLINT"),
                ("BOOLEAN", "BIT"),
                ("BOOL", "BIT"),
                ("BIT", "BIT"),
                ("DATE", "DATE"),
                ("DATETIME", "DATETIME"),
                ("TIMESTAMP", "DATETIME2"),
                ("TEXT", "VARCHAR(MAX)"),
            ],
            &["VARCHAR", "NVARCHAR", "DECIMAL", "NUMERIC"],
        )
        .numeric_families(&["DECIMAL", "NUMERIC"])
        .unbounded_parameter("MAX")
    }

    /// PostgreSQL vocabulary
    pub fn postgres() -> Self {
        Self::new(
            &[
                ("INT", "INTEGER"),
                ("INTEGER", "INTEGER"),
                ("INT4", "INTEGER"),
                ("BIGINT", "BIGINT"),
                ("INT8", "BIGINT"),
                ("SMALLINT", "SMALLINT"),
                ("TINYINT", "SMALLINT"),
                ("BOOLEAN", "BOOLEAN"),
                ("BOOL", "BOOLEAN"),
                ("BIT", "BOOLEAN"),
                ("DATE", "DATE"),
                ("DATETIME", "TIMESTAMP"),
                ("DATETIME2", "TIMESTAMP"),
                ("TIMESTAMP", "TIMESTAMP"),
                ("NVARCHAR", "VARCHAR"),
                ("NVARCHAR(MAX)", "TEXT"),
                ("VARCHAR(MAX)", "TEXT"),
                ("TEXT", "TEXT"),
                ("UNIQUEIDENTIFIER", "UUID"),
                ("FLOAT", "DOUBLE PRECISION"),
                ("MONEY", "NUMERIC(19,4)"),
            ],
            &["VARCHAR", "CHAR", "DECIMAL", "NUMERIC"],
        )
        .numeric_families(&["DECIMAL", "NUMERIC"])
    }

    /// Replace or add synonyms; keys are matched upper-cased
    pub fn with_overrides(mut self, overrides: &IndexMap<String, String>) -> Self {
        for (raw, mapped) in overrides {
            self.synonyms
                .insert(raw.trim().to_uppercase(), mapped.trim().to_string());
        }
        self
    }

    /// Map a raw type and optional length/precision to a dialect type.
    ///
    /// Unknown types pass through upper-cased. The parameter is appended
    /// only for parameterized families.
    pub fn map(&self, raw_type: &str, raw_length: &str) -> String {
        match self.base_type(raw_type) {
            Some(base) => self.with_parameter(base, raw_length.trim()),
            None => self.default_type.clone(),
        }
    }

    /// Map a column's type, picking the parameter its family takes.
    ///
    /// Numeric families use `precision[,scale]` and fall back to the length;
    /// every other family uses the length and falls back to the precision.
    pub fn map_column(&self, shape: &ColumnShape) -> String {
        let Some(base) = self.base_type(&shape.data_type) else {
            return self.default_type.clone();
        };

        let length = shape.max_length.trim();
        let parameter = if self.numeric.contains(&base) {
            shape.precision_scale().unwrap_or_else(|| length.to_string())
        } else if !length.is_empty() {
            length.to_string()
        } else {
            shape.precision_scale().unwrap_or_default()
        };

        self.with_parameter(base, &parameter)
    }

    fn base_type(&self, raw_type: &str) -> Option<String> {
        let raw_type = raw_type.trim();
        if raw_type.is_empty() {
            return None;
        }
        let upper = raw_type.to_uppercase();
        Some(self.synonyms.get(&upper).cloned().unwrap_or(upper))
    }

    fn with_parameter(&self, base: String, parameter: &str) -> String {
        if parameter.is_empty() || !self.parameterized.contains(&base) {
            return base;
        }

        // SQL Server exports report MAX lengths as -1
        if parameter == "-1" || parameter.eq_ignore_ascii_case("max") {
            if let Some(mapped) = self.synonyms.get(&format!("{}(MAX)", base)) {
                return mapped.clone();
            }
            return match &self.unbounded {
                Some(unbounded) => format!("{}({})", base, unbounded),
                None => base,
            };
        }

        format!("{}({})", base, parameter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("integer", "", "INT")]
    #[case("bool", "", "BIT")]
    #[case("timestamp", "", "DATETIME2")]
    #[case("text", "", "VARCHAR(MAX)")]
    #[case("varchar", "100", "VARCHAR(100)")]
    #[case("nvarchar", " 50 ", "NVARCHAR(50)")]
    #[case("decimal", "10,2", "DECIMAL(10,2)")]
    #[case("int", "4", "INT")]
    #[case("varchar", "-1", "VARCHAR(MAX)")]
    #[case("nvarchar", "max", "NVARCHAR(MAX)")]
    #[case("geography", "", "GEOGRAPHY")]
    #[case("", "", "VARCHAR(255)")]
    #[case("  ", "30", "VARCHAR(255)")]
    fn maps_mssql_types(#[case] raw: &str, #[case] length: &str, #[case] expected: &str) {
        assert_eq!(TypeMapper::mssql().map(raw, length), expected);
    }

    #[rstest]
    #[case("int", "", "INTEGER")]
    #[case("bit", "", "BOOLEAN")]
    #[case("nvarchar", "80", "VARCHAR(80)")]
    #[case("datetime2", "", "TIMESTAMP")]
    #[case("nvarchar", "-1", "TEXT")]
    #[case("varchar", "-1", "TEXT")]
    #[case("char", "-1", "CHAR")]
    fn maps_postgres_types(#[case] raw: &str, #[case] length: &str, #[case] expected: &str) {
        assert_eq!(TypeMapper::postgres().map(raw, length), expected);
    }

    fn shape(data_type: &str, max_length: &str, precision: &str, scale: &str) -> ColumnShape {
        ColumnShape {
            data_type: data_type.to_string(),
            max_length: max_length.to_string(),
            precision: precision.to_string(),
            scale: scale.to_string(),
            ..Default::default()
        }
    }

    #[rstest]
    #[case(shape("decimal", "9", "18", "2"), "DECIMAL(18,2)")]
    #[case(shape("NUMERIC", "5", "9", ""), "NUMERIC(9)")]
    #[case(shape("decimal", "10,2", "", ""), "DECIMAL(10,2)")]
    #[case(shape("varchar", "120", "0", "0"), "VARCHAR(120)")]
    #[case(shape("varchar", "-1", "", ""), "VARCHAR(MAX)")]
    #[case(shape("int", "4", "10", "0"), "INT")]
    #[case(shape("", "4", "", ""), "VARCHAR(255)")]
    fn maps_columns_by_family(#[case] column: ColumnShape, #[case] expected: &str) {
        assert_eq!(TypeMapper::mssql().map_column(&column), expected);
    }

    #[test]
    fn overrides_take_precedence() {
        let mut overrides = IndexMap::new();
        overrides.insert("uuid".to_string(), "UNIQUEIDENTIFIER".to_string());
        overrides.insert("TEXT".to_string(), "NVARCHAR(MAX)".to_string());

        let mapper = TypeMapper::mssql().with_overrides(&overrides);

        assert_eq!(mapper.map("UUID", ""), "UNIQUEIDENTIFIER");
        assert_eq!(mapper.map("text", ""), "NVARCHAR(MAX)");
    }
}
