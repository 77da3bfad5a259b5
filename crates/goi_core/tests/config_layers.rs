use std::fs;

use goi_core::config::EngineConfig;
use goi_core::error::CONFIG_INVALID;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

#[test]
fn toml_file_overrides_defaults_per_field() {
    let tmp = tempdir().expect("tempdir");
    let path = tmp.path().join("engine.toml");
    fs::write(
        &path,
        r#"
[bm25]
k1 = 1.2

[cache]
ttl_seconds = 60

[backend]
base_url = "http://127.0.0.1:11434"
"#,
    )
    .expect("write");

    let cfg = EngineConfig::load(Some(&path)).expect("load");
    assert_eq!(cfg.bm25.k1, 1.2);
    assert_eq!(cfg.bm25.b, 0.75);
    assert_eq!(cfg.cache.ttl_seconds, 60);
    assert!(cfg.cache.enabled);
    assert_eq!(cfg.backend.base_url.as_deref(), Some("http://127.0.0.1:11434"));
    assert_eq!(cfg.retrieval, EngineConfig::default().retrieval);
}

#[test]
fn invalid_values_in_file_are_rejected() {
    let tmp = tempdir().expect("tempdir");
    let path = tmp.path().join("engine.toml");
    fs::write(&path, "[retrieval]\ndefault_k = 80\nmax_k = 50\n").expect("write");

    let err = EngineConfig::load(Some(&path)).expect_err("invalid");
    assert_eq!(err.code, CONFIG_INVALID);
}
