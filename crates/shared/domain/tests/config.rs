use serde_json::json;
use vhub_domain::config::{AppConfig, DatabaseConfig, SecurityConfig, ServerConfig, StorageConfig};

#[test]
fn config_defaults_are_sane() {
    let server = ServerConfig::default();
    assert_eq!(server.port, 8080);
    assert_eq!(server.address.to_string(), "127.0.0.1");
    assert!(server.ssl.is_none());

    let db = DatabaseConfig::default();
    assert_eq!(db.url, "mem://");
    assert_eq!(db.namespace, "vhub");
    assert_eq!(db.database, "core");
    assert!(db.credentials.is_some());

    let storage = StorageConfig::default();
    assert_eq!(storage.data_dir, std::path::PathBuf::from("data"));
    assert_eq!(storage.static_dir, std::path::PathBuf::from("static"));
    assert_eq!(storage.max_artifact_bytes, 32 * 1024 * 1024);
    assert!(!storage.compression);

    let security = SecurityConfig::default();
    assert_eq!(security.admin.username, "admin");
    assert_eq!(security.admin.password, "admin123");
    assert_eq!(security.session.ttl_seconds, 604_800);
    assert_eq!(security.share.ttl_seconds, 3600);
    assert_eq!(security.token_cache.ttl_seconds, 60);
    assert_eq!(security.token_cache.capacity, 10_000);
}

#[test]
fn app_config_deserializes() {
    let raw = json!({
        "server": { "address": "::", "port": 9090 },
        "database": { "url": "mem://", "namespace": "n", "database": "d", "credentials": null },
        "storage": { "data_dir": "/tmp/data", "static_dir": "/tmp/static" },
        "security": { "admin": { "username": "root", "password": "s3cret" } }
    });

    let cfg: AppConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.server.port, 9090);
    assert_eq!(cfg.database.namespace, "n");
    assert_eq!(cfg.storage.static_dir, std::path::PathBuf::from("/tmp/static"));
    assert_eq!(cfg.security.admin.username, "root");
    // Unset sections fall back to defaults.
    assert_eq!(cfg.security.session.ttl_seconds, 604_800);
}
