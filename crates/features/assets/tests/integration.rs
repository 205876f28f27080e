use std::collections::BTreeMap;
use std::io::Write;
use tempfile::NamedTempFile;
use vhub_assets::{AssetsError, StylesheetConfig, ThemeTokens, load_stylesheet_config};

const SHIPPED_RECORD: &str = r#"{
  "content": ["./templates/**/*.html", "./static/js/**/*.js"],
  "theme": {
    "extend": {
      "colors": {
        "primary": "#3B82F6",
        "secondary": "#6B7280"
      }
    }
  },
  "plugins": []
}"#;

fn write_record(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(json.as_bytes()).expect("write record");
    file
}

#[test]
fn loads_shipped_record() {
    let file = write_record(SHIPPED_RECORD);
    let config = load_stylesheet_config(file.path()).expect("load should succeed");

    assert_eq!(
        config.content,
        vec!["./templates/**/*.html".to_owned(), "./static/js/**/*.js".to_owned()]
    );
    assert_eq!(config.theme.extend["colors"]["primary"], "#3B82F6");
    assert_eq!(config.theme.extend["colors"]["secondary"], "#6B7280");
    assert!(config.plugins.is_empty(), "no implicit default plugins");
}

#[test]
fn repeated_loads_are_identical() {
    let file = write_record(SHIPPED_RECORD);

    let first = load_stylesheet_config(file.path()).unwrap();
    let second = load_stylesheet_config(file.path()).unwrap();

    assert_eq!(first, second);
}

#[test]
fn serialization_roundtrip_preserves_record() {
    let file = write_record(SHIPPED_RECORD);
    let config = load_stylesheet_config(file.path()).unwrap();

    let json = config.to_json().unwrap();
    let reloaded = StylesheetConfig::from_json(&json).unwrap();

    assert_eq!(config, reloaded);
}

#[test]
fn empty_content_is_accepted() {
    let file = write_record(r#"{ "content": [], "plugins": [] }"#);
    let config = load_stylesheet_config(file.path()).expect("empty content is a boundary, not an error");

    assert!(config.content.is_empty());
    assert!(config.theme.extend.is_empty());
}

#[test]
fn invalid_glob_fails_load() {
    let file = write_record(r#"{ "content": ["./templates/["] }"#);
    let err = load_stylesheet_config(file.path()).unwrap_err();

    assert!(matches!(err, AssetsError::InvalidGlob { .. }));
}

#[test]
fn malformed_json_fails_load() {
    let file = write_record("{ not json");
    let err = load_stylesheet_config(file.path()).unwrap_err();

    assert!(matches!(err, AssetsError::Parse { .. }));
}

#[test]
fn missing_file_fails_load() {
    let err = load_stylesheet_config("does/not/exist.json").unwrap_err();

    assert!(matches!(err, AssetsError::Io { .. }));
}

#[test]
fn unknown_keys_are_tolerated() {
    let file = write_record(
        r#"{ "content": ["./templates/**/*.html"], "darkMode": "class", "plugins": [] }"#,
    );
    let config = load_stylesheet_config(file.path()).expect("extra pipeline options are ignored");

    assert_eq!(config.content.len(), 1);
}

#[test]
fn theme_extension_wins_on_collision() {
    let file = write_record(SHIPPED_RECORD);
    let config = load_stylesheet_config(file.path()).unwrap();

    let mut base: ThemeTokens = BTreeMap::new();
    base.insert(
        "colors".to_owned(),
        BTreeMap::from([
            ("primary".to_owned(), "#000000".to_owned()),
            ("accent".to_owned(), "#FF0000".to_owned()),
        ]),
    );
    base.insert(
        "spacing".to_owned(),
        BTreeMap::from([("wide".to_owned(), "4rem".to_owned())]),
    );

    let merged = config.merged_theme(&base);

    // Collision: the extension value replaces the base value.
    assert_eq!(merged["colors"]["primary"], "#3B82F6");
    // Augmentation: base tokens without a collision survive.
    assert_eq!(merged["colors"]["accent"], "#FF0000");
    assert_eq!(merged["spacing"]["wide"], "4rem");
    // New tokens from the extension appear.
    assert_eq!(merged["colors"]["secondary"], "#6B7280");
}
