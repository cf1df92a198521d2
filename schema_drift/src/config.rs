//! Configuration handling for schema_drift

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::schema::changes::{Direction, MismatchValues};
use crate::schema::dialect::DialectKind;
use crate::schema::resolver::ColumnAliases;
use crate::schema::types::DEFAULT_SCHEMA_NAME;

/// Load configuration from a TOML file
pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let config_str = fs::read_to_string(path)
        .map_err(|e| Error::ConfigError(format!("Failed to read config file: {}", e)))?;

    let config: Config = toml::from_str(&config_str)
        .map_err(|e| Error::ConfigError(format!("Failed to parse config file: {}", e)))?;

    Ok(config)
}

/// Represents the complete schema_drift configuration
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub comparison: ComparisonConfig,
    /// Extra header spellings keyed by canonical attribute name
    pub aliases: IndexMap<String, Vec<String>>,
    pub output: OutputConfig,
    pub type_mapping: TypeMappingConfig,
    pub logging: Option<LoggingConfig>,
}

impl Config {
    /// Builtin alias table extended with the configured spellings
    pub fn column_aliases(&self) -> Result<ColumnAliases> {
        let mut aliases = ColumnAliases::default();
        aliases.extend_from_names(&self.aliases)?;
        Ok(aliases)
    }

    /// The configured dialect identifier, parsed
    pub fn dialect_kind(&self) -> Result<DialectKind> {
        self.output.dialect.parse()
    }
}

/// Comparison behavior
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ComparisonConfig {
    pub default_schema: String,
    pub mismatch_values: MismatchValues,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            default_schema: DEFAULT_SCHEMA_NAME.to_string(),
            mismatch_values: MismatchValues::default(),
        }
    }
}

/// Script output defaults; both can be overridden per run
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub dialect: String,
    pub direction: Direction,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dialect: DialectKind::default().as_str().to_string(),
            direction: Direction::default(),
        }
    }
}

/// Type synonym overrides per dialect
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct TypeMappingConfig {
    pub mssql: IndexMap<String, String>,
    pub postgres: IndexMap<String, String>,
}

impl TypeMappingConfig {
    pub fn overrides_for(&self, dialect: DialectKind) -> &IndexMap<String, String> {
        match dialect {
            DialectKind::MsSql => &self.mssql,
            DialectKind::Postgres => &self.postgres,
        }
    }
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    pub format: String,
    pub console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            format: "text".to_string(),
            console: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::Attribute;
    use crate::schema::resolver::ResolvedHeader;

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config.comparison.default_schema, "default_schema");
        assert_eq!(config.comparison.mismatch_values, MismatchValues::Attribute);
        assert_eq!(config.dialect_kind().unwrap(), DialectKind::MsSql);
        assert_eq!(config.output.direction, Direction::SourceToTarget);
        assert!(config.logging.is_none());
    }

    #[test]
    fn parses_every_section() {
        let config: Config = toml::from_str(
            r#"
            [comparison]
            default_schema = "dbo"
            mismatch_values = "type_fields"

            [aliases]
            max_length = ["size"]

            [output]
            dialect = "postgresql"
            direction = "target_to_source"

            [type_mapping.postgres]
            MONEY = "NUMERIC(12,2)"

            [logging]
            level = "debug"
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.comparison.default_schema, "dbo");
        assert_eq!(config.comparison.mismatch_values, MismatchValues::TypeFields);
        assert_eq!(config.dialect_kind().unwrap(), DialectKind::Postgres);
        assert_eq!(config.output.direction, Direction::TargetToSource);
        assert_eq!(
            config.type_mapping.overrides_for(DialectKind::Postgres).get("MONEY").map(String::as_str),
            Some("NUMERIC(12,2)")
        );
        assert_eq!(
            config.column_aliases().unwrap().resolve("Size"),
            ResolvedHeader::Canonical(Attribute::MaxLength)
        );

        let logging = config.logging.unwrap();
        assert_eq!(logging.level, "debug");
        assert!(logging.console);
    }

    #[test]
    fn unknown_dialect_is_rejected() {
        let config: Config = toml::from_str("[output]\ndialect = \"db2\"").unwrap();
        assert!(matches!(config.dialect_kind(), Err(Error::UnsupportedDialect(_))));
    }
}
