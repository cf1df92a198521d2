use std::fs;
use std::path::PathBuf;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use schema_drift::input::{self, RawTable};
use schema_drift::{Direction, DriftEngine, Error};

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

fn read(path: &PathBuf) -> RawTable {
    input::read_csv(path, b',').expect("read export")
}

#[test]
fn config_file_drives_the_whole_pipeline() {
    let dir = TempDir::new().unwrap();
    let config_path = write_file(
        &dir,
        "drift.toml",
        r#"
[comparison]
default_schema = "dbo"

[aliases]
max_length = ["size"]

[output]
dialect = "mssql"
direction = "target_to_source"

[type_mapping.mssql]
TEXT = "NVARCHAR(MAX)"
"#,
    );
    let source_path = write_file(
        &dir,
        "source.csv",
        "Table Name,Column Name,Data Type,Size\n\
         users,id,int,\n\
         users,email,varchar,100\n\
         users,bio,text,\n",
    );
    let target_path = write_file(
        &dir,
        "target.csv",
        "Table Name,Column Name,Data Type,Size\n\
         users,id,INT,\n\
         users,email,varchar,150\n",
    );

    let engine = schema_drift::init(config_path.to_str().unwrap()).unwrap();
    let direction = engine.config().output.direction;
    let report = engine
        .run(&read(&source_path), &read(&target_path), direction)
        .unwrap();

    let comments: Vec<String> = report.diff.iter().map(|row| row.comment()).collect();
    assert_eq!(comments, vec!["column missing in TARGET", "length differs"]);

    assert_eq!(
        report.script.as_str(),
        "-- Changes for table users\n\
         ALTER TABLE users ADD bio NVARCHAR(MAX);\nGO\n\
         ALTER TABLE users ALTER COLUMN email VARCHAR(100);\nGO\n"
    );
}

#[test]
fn identical_exports_render_the_placeholder() {
    let dir = TempDir::new().unwrap();
    let export = "table_name;column_name;data_type;is_nullable\n\
                  orders;id;int;NO\n\
                  orders;total;decimal;YES\n";
    let source_path = write_file(&dir, "source.csv", export);
    let target_path = write_file(&dir, "target.csv", export);

    let delimiter = input::parse_delimiter(";").unwrap();
    let source = input::read_csv(&source_path, delimiter).unwrap();
    let target = input::read_csv(&target_path, delimiter).unwrap();

    let engine = DriftEngine::new(Default::default()).unwrap();
    let report = engine.run(&source, &target, Direction::SourceToTarget).unwrap();

    assert!(report.is_clean());
    assert!(report.changes.is_empty());
    assert_eq!(report.script.as_str(), "-- No schema changes required");
}

#[test]
fn change_records_serialize_without_empty_fields() {
    let dir = TempDir::new().unwrap();
    let source_path = write_file(&dir, "source.csv", "table,column,type\nusers,userId,int\n");
    let target_path = write_file(&dir, "target.csv", "table,column,type\nusers,USERID,int\n");

    let engine = DriftEngine::new(Default::default()).unwrap();
    let report = engine
        .run(&read(&source_path), &read(&target_path), Direction::SourceToTarget)
        .unwrap();

    let json = serde_json::to_value(report.changes.records()).unwrap();
    assert_eq!(
        json,
        serde_json::json!([{
            "change_type": "column_rename",
            "table": "users",
            "from": "userId",
            "to": "USERID",
            "direction": "source_to_target"
        }])
    );
}

#[test]
fn malformed_config_is_a_config_error() {
    let dir = TempDir::new().unwrap();
    let config_path = write_file(&dir, "bad.toml", "[output]\ndialect = \"mssql\"\nunclosed = [");

    let result = schema_drift::init(config_path.to_str().unwrap());

    assert!(matches!(result, Err(Error::ConfigError(_))));
}

#[test]
fn unknown_alias_attribute_is_rejected() {
    let dir = TempDir::new().unwrap();
    let config_path = write_file(&dir, "aliases.toml", "[aliases]\ncolour = [\"color\"]\n");

    let result = schema_drift::init(config_path.to_str().unwrap());

    assert!(matches!(result, Err(Error::ConfigError(_))));
}
