// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the registry and the path resolver.
//!
//! These tests drive a registry end to end through real files on disk, with the
//! mock loader from `common` and with the bundled loaders.

mod common;

use cfgtree::domain::{ConfigError, Kind};
use cfgtree::service::Registry;
use common::{init_tracing, write_file, MockLoader};
use std::sync::Arc;
use tempfile::TempDir;

#[test]
fn test_load_single_file_and_lookup() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "app.conf", "port=8080\nname=svc\n");

    let registry = Registry::new();
    registry.use_loader(MockLoader::new()).unwrap();
    registry.load_configs(&path).unwrap();

    let port = registry.lookup(["port"]).unwrap();
    assert_eq!(port.kind(), Kind::Number);
    assert_eq!(port.as_i64().unwrap(), 8080);

    let name = registry.lookup(["name"]).unwrap();
    assert_eq!(name.kind(), Kind::String);
    assert_eq!(name.as_string().unwrap(), "svc");

    assert!(registry.lookup(["missing"]).is_none());
}

#[test]
fn test_load_without_loader() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "app.conf", "a=1");

    let registry = Registry::new();
    let err = registry.load_configs(&path).unwrap_err();
    assert!(matches!(err, ConfigError::LoaderUndefined));
}

#[test]
fn test_clear_then_root_and_lookup_are_absent() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "app.conf", "port=8080");

    let registry = Registry::new();
    let loader = Arc::new(MockLoader::new());
    registry.use_shared(loader.clone()).unwrap();
    registry.load_configs(&path).unwrap();
    assert!(registry.root().is_some());

    registry.clear();
    assert!(registry.root().is_none());
    assert!(registry.lookup(["port"]).is_none());
    assert!(registry.lookup(["any", "path"]).is_none());
    assert_eq!(loader.clears(), 1);
}

#[test]
fn test_directory_rejected_before_reading() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "a.conf", "a=1");

    let registry = Registry::new();
    let loader = Arc::new(MockLoader::new());
    registry.use_shared(loader.clone()).unwrap();

    let err = registry.load_configs(dir.path()).unwrap_err();
    assert!(matches!(err.cause(), ConfigError::PathNotFile));
    assert_eq!(err.path(), Some(dir.path()));
    assert_eq!(loader.loads(), 0);
}

#[test]
fn test_directory_aggregates_into_one_load() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "10-db.conf", "db=postgres");
    write_file(dir.path(), "00-app.conf", "port=8080");
    write_file(dir.path(), "extra/20-cache.conf", "cache=64");
    write_file(dir.path(), "README.md", "ignored");

    let registry = Registry::new();
    let loader = Arc::new(MockLoader::new().allowing_dirs().with_pattern(r"\.conf$"));
    registry.use_shared(loader.clone()).unwrap();
    registry.load_configs(dir.path()).unwrap();

    assert_eq!(loader.loads(), 1);
    let seen = loader.seen();
    assert_eq!(
        seen[0],
        vec![
            dir.path().join("00-app.conf"),
            dir.path().join("10-db.conf"),
            dir.path().join("extra/20-cache.conf"),
        ]
    );

    assert_eq!(registry.lookup(["port"]).unwrap().as_i64().unwrap(), 8080);
    assert_eq!(registry.lookup(["cache"]).unwrap().as_u64().unwrap(), 64);
}

#[test]
fn test_pattern_matching_nothing_has_no_content() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "notes.txt", "a=1");

    let registry = Registry::new();
    let loader = Arc::new(MockLoader::new().allowing_dirs().with_pattern(r"\.conf$"));
    registry.use_shared(loader.clone()).unwrap();

    let err = registry.load_configs(dir.path()).unwrap_err();
    assert!(matches!(err.cause(), ConfigError::PathNoContent));
    assert_eq!(loader.loads(), 0);
}

#[test]
fn test_missing_and_empty_paths() {
    let dir = TempDir::new().unwrap();
    let registry = Registry::new();
    registry.use_loader(MockLoader::new()).unwrap();

    let err = registry.load_configs(dir.path().join("nope.conf")).unwrap_err();
    assert!(matches!(err.cause(), ConfigError::PathNotFound { .. }));

    let err = registry.load_configs("").unwrap_err();
    assert!(matches!(err, ConfigError::PathUndefined));

    let blank = write_file(dir.path(), "blank.conf", "\n   \n");
    let err = registry.load_configs(&blank).unwrap_err();
    assert!(matches!(err.cause(), ConfigError::PathNoContent));
}

#[test]
fn test_failed_load_leaves_previous_state() {
    let dir = TempDir::new().unwrap();
    let good = write_file(dir.path(), "good.conf", "port=1");
    let bad = write_file(dir.path(), "bad.conf", "this line has no separator");

    let registry = Registry::new();
    registry.use_loader(MockLoader::new()).unwrap();
    registry.load_configs(&good).unwrap();
    let before = registry.root().unwrap();

    let err = registry.load_configs(&bad).unwrap_err();
    assert!(matches!(err.cause(), ConfigError::ParseError { .. }));
    assert_eq!(err.path(), Some(bad.as_path()));
    assert!(Arc::ptr_eq(&before, &registry.root().unwrap()));
    assert_eq!(registry.lookup(["port"]).unwrap().as_i64().unwrap(), 1);
}

#[test]
fn test_rejected_registration() {
    let registry = Registry::new();
    let err = registry
        .use_loader(MockLoader::new().rejecting_registration())
        .unwrap_err();

    match err {
        ConfigError::LoaderRegistrationFailed { loader, source } => {
            assert_eq!(loader, "mock");
            assert!(matches!(*source, ConfigError::DecodeError { .. }));
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(registry.loader_type().is_none());
}

#[test]
fn test_use_replaces_loader() {
    let registry = Registry::new();
    registry.use_loader(MockLoader::new()).unwrap();
    assert_eq!(registry.loader_type().as_deref(), Some("mock"));

    #[cfg(feature = "yaml")]
    {
        registry.use_loader(cfgtree::adapters::YamlLoader::new()).unwrap();
        assert_eq!(registry.loader_type().as_deref(), Some("yaml"));
    }
}

#[test]
#[cfg(feature = "yaml")]
fn test_yaml_directory_merge() {
    use cfgtree::adapters::YamlLoader;

    init_tracing();

    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "00-base.yaml",
        "server:\n  port: 80\n  host: 0.0.0.0\nfeatures: [a]\n",
    );
    write_file(dir.path(), "10-override.yml", "server:\n  port: 8080\nfeatures: [b, c]\n");
    write_file(dir.path(), "ignored.json", "{\"server\": {\"port\": 1}}");

    let registry = Registry::new();
    registry.use_loader(YamlLoader::new()).unwrap();
    registry.load_configs(dir.path()).unwrap();

    let port = registry.lookup(["server", "port"]).unwrap();
    assert_eq!(port.as_i64().unwrap(), 8080);
    assert_eq!(port.file(), Some(dir.path().join("10-override.yml").as_path()));
    assert_eq!(port.reference(), Some("server.port"));

    assert_eq!(
        registry.lookup(["server", "host"]).unwrap().as_string().unwrap(),
        "0.0.0.0"
    );
    assert_eq!(
        registry.lookup(["features"]).unwrap().as_string_list().unwrap(),
        vec!["b", "c"]
    );
}

#[test]
#[cfg(feature = "json")]
fn test_json_round_trip_through_loader() {
    use cfgtree::adapters::JsonLoader;

    let dir = TempDir::new().unwrap();
    let source = r#"{"name":"svc","limits":{"ratio":0.30000000000000000000001,"max":9007199254740993},"tags":["a",true,null]}"#;
    let path = write_file(dir.path(), "app.json", source);

    let registry = Registry::new();
    registry.use_loader(JsonLoader::new()).unwrap();
    registry.load_configs(&path).unwrap();
    let root = registry.root().unwrap();

    let json = root.to_json_string().unwrap();
    assert_eq!(json, source);

    let reparsed = write_file(dir.path(), "reparsed.json", &json);
    let again = registry.load_from_path(&reparsed).unwrap();
    assert_eq!(&again, root.as_ref());
    assert_eq!(
        again.lookup(["limits", "max"]).unwrap().as_i64().unwrap(),
        9_007_199_254_740_993
    );
}

#[test]
#[cfg(feature = "yaml")]
fn test_decode_loaded_section() {
    use cfgtree::adapters::YamlLoader;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Server {
        host: String,
        port: u16,
        tls: Option<bool>,
    }

    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "app.yaml", "server:\n  host: example.org\n  port: 443\n");

    let registry = Registry::new();
    registry.use_loader(YamlLoader::new()).unwrap();
    registry.load_configs(&path).unwrap();

    let server: Server = registry.lookup(["server"]).unwrap().decode().unwrap();
    assert_eq!(
        server,
        Server {
            host: "example.org".to_string(),
            port: 443,
            tls: None,
        }
    );

    let overflow = write_file(dir.path(), "overflow.yaml", "server:\n  host: x\n  port: 70000\n");
    let value = registry.load_from_path(&overflow).unwrap();
    assert!(value.lookup(["server"]).unwrap().decode::<Server>().is_err());
}
