use docrepo_core::config::{
    validate_section, ConfigError, ConfigProperties, ConfigValue, DocrepoConfig, PropertyKey,
};
use serial_test::serial;
use std::fs;

#[test]
fn test_empty_config() {
    let config = DocrepoConfig::empty();
    assert!(matches!(
        config.get::<String>("mongo.uri"),
        Err(ConfigError::NotFound(key)) if key == "mongo.uri"
    ));
}

#[test]
fn test_set_and_get() {
    let mut config = DocrepoConfig::empty();
    config.set("app.name", "billing");
    config.set("mongo.max_pool_size", 20i64);
    assert_eq!(config.get::<String>("app.name").unwrap(), "billing");
    assert_eq!(config.get::<u32>("mongo.max_pool_size").unwrap(), 20);
}

#[test]
fn test_get_or_and_get_opt() {
    let mut config = DocrepoConfig::empty();
    config.set("present", ConfigValue::Null);
    assert_eq!(config.get_or("missing", 7i64), 7);
    assert_eq!(config.get_opt::<String>("missing").unwrap(), None);
    assert_eq!(config.get_opt::<Option<String>>("present").unwrap(), Some(None));
}

#[test]
fn test_type_mismatch() {
    let mut config = DocrepoConfig::empty();
    config.set("mongo.max_pool_size", "lots");
    let err = config.get::<u32>("mongo.max_pool_size").unwrap_err();
    assert!(matches!(err, ConfigError::TypeMismatch { expected: "i64", .. }));
}

#[test]
fn test_from_yaml_str() {
    let yaml = r#"
mongo:
  uri: "mongodb://localhost:27017"
  database: shop
app:
  name: catalog
  tags:
    - a
    - b
"#;
    let config = DocrepoConfig::from_yaml_str(yaml, "test").unwrap();
    assert_eq!(
        config.get::<String>("mongo.uri").unwrap(),
        "mongodb://localhost:27017"
    );
    assert_eq!(config.get::<String>("mongo.database").unwrap(), "shop");
    assert_eq!(config.get::<Vec<String>>("app.tags").unwrap(), vec!["a", "b"]);
    assert_eq!(config.profile(), "test");
}

// --- typed sections ---

#[derive(Debug, Clone)]
struct StoreSection {
    uri: String,
    database: String,
    retries: u32,
}

impl ConfigProperties for StoreSection {
    fn prefix() -> &'static str {
        "store"
    }

    fn keys() -> Vec<PropertyKey> {
        vec![
            PropertyKey {
                key: "store.uri",
                type_name: "String",
                required: true,
                description: Some("connection string"),
            },
            PropertyKey {
                key: "store.database",
                type_name: "String",
                required: true,
                description: None,
            },
            PropertyKey {
                key: "store.retries",
                type_name: "u32",
                required: false,
                description: None,
            },
        ]
    }

    fn from_config(config: &DocrepoConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            uri: config.get("store.uri")?,
            database: config.get("store.database")?,
            retries: config.get_opt("store.retries")?.unwrap_or(3),
        })
    }
}

#[test]
fn test_with_typed_deref() {
    let yaml = "store:\n  uri: mongodb://db\n  database: main\n";
    let config = DocrepoConfig::from_yaml_str(yaml, "test")
        .unwrap()
        .with_typed::<StoreSection>()
        .unwrap();
    assert_eq!(config.uri, "mongodb://db");
    assert_eq!(config.database, "main");
    assert_eq!(config.retries, 3);
    assert_eq!(config.raw().get::<String>("store.uri").unwrap(), "mongodb://db");
}

#[test]
fn test_validate_section_lists_every_missing_key() {
    let config = DocrepoConfig::empty();
    let err = validate_section::<StoreSection>(&config).unwrap_err();
    let keys: Vec<&str> = err.errors.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, vec!["store.uri", "store.database"]);
    assert_eq!(err.errors[0].env_hint, "STORE_URI");

    let rendered = err.to_string();
    assert!(rendered.contains("STORE_DATABASE"));
    assert!(rendered.contains("connection string"));
}

#[test]
fn test_validate_section_reports_type_mismatch() {
    let mut config = DocrepoConfig::empty();
    config.set("store.uri", "mongodb://db");
    config.set("store.database", "main");
    config.set("store.retries", "many");
    let err = validate_section::<StoreSection>(&config).unwrap_err();
    assert_eq!(err.errors.len(), 1);
    assert_eq!(err.errors[0].key, "store.retries");
}

#[test]
fn test_validate_section_ok() {
    let mut config = DocrepoConfig::empty();
    config.set("store.uri", "mongodb://db");
    config.set("store.database", "main");
    assert!(validate_section::<StoreSection>(&config).is_ok());
}

// --- layered loading (touches the process environment) ---

#[test]
#[serial]
fn test_profile_file_overrides_base() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("application.yaml"),
        "layer:\n  database: base\n  name: base-name\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("application-staging.yaml"),
        "layer:\n  database: staging\n",
    )
    .unwrap();

    let config = DocrepoConfig::load_from(dir.path(), "staging").unwrap();
    assert_eq!(config.get::<String>("layer.database").unwrap(), "staging");
    assert_eq!(config.get::<String>("layer.name").unwrap(), "base-name");
    assert_eq!(config.profile(), "staging");
}

#[test]
#[serial]
fn test_env_overrides_yaml() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("application.yaml"),
        "docrepotest:\n  layered:\n    uri: from-yaml\n",
    )
    .unwrap();

    std::env::set_var("DOCREPOTEST_LAYERED_URI", "from-env");
    let config = DocrepoConfig::load_from(dir.path(), "dev").unwrap();
    std::env::remove_var("DOCREPOTEST_LAYERED_URI");

    assert_eq!(
        config.get::<String>("docrepotest.layered.uri").unwrap(),
        "from-env"
    );
}

#[test]
#[serial]
fn test_dotenv_file_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(".env"), "DOCREPOTEST_DOTENV_DATABASE=from-dotenv\n").unwrap();

    let config = DocrepoConfig::load_from(dir.path(), "dev").unwrap();
    std::env::remove_var("DOCREPOTEST_DOTENV_DATABASE");

    assert_eq!(
        config.get::<String>("docrepotest.dotenv.database").unwrap(),
        "from-dotenv"
    );
}

#[test]
#[serial]
fn test_placeholders_resolved_from_env() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("application.yaml"),
        "secretcheck:\n  uri: \"mongodb://app:${DOCREPOTEST_PASSWORD}@db\"\n",
    )
    .unwrap();

    std::env::set_var("DOCREPOTEST_PASSWORD", "hunter2");
    let config = DocrepoConfig::load_from(dir.path(), "dev").unwrap();
    std::env::remove_var("DOCREPOTEST_PASSWORD");

    assert_eq!(
        config.get::<String>("secretcheck.uri").unwrap(),
        "mongodb://app:hunter2@db"
    );
}

#[test]
#[serial]
fn test_profile_env_var_wins() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("application-qa.yaml"), "profiled:\n  flag: true\n").unwrap();

    std::env::set_var("DOCREPO_PROFILE", "qa");
    let config = DocrepoConfig::load_from(dir.path(), "dev");
    std::env::remove_var("DOCREPO_PROFILE");

    let config = config.unwrap();
    assert_eq!(config.profile(), "qa");
    assert!(config.get::<bool>("profiled.flag").unwrap());
}

#[cfg(unix)]
#[test]
#[serial]
fn test_non_utf8_env_vars_are_skipped() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempfile::tempdir().unwrap();
    let raw = OsStr::from_bytes(b"\xff\xfe");
    std::env::set_var("DOCREPOTEST_BINARY", raw);
    std::env::set_var("DOCREPOTEST_PLAIN_KEY", "kept");
    let config = DocrepoConfig::load_from(dir.path(), "dev");
    std::env::remove_var("DOCREPOTEST_BINARY");
    std::env::remove_var("DOCREPOTEST_PLAIN_KEY");

    let config = config.unwrap();
    assert!(!config.contains_key("docrepotest.binary"));
    assert_eq!(config.get::<String>("docrepotest.plain.key").unwrap(), "kept");
}
