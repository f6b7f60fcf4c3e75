use std::fs;
use std::path::Path;
use tempfile::TempDir;

use seedpage_core::config::{resolve_with_base, Config, PagingSettings};
use seedpage_core::Error;

#[test]
fn defaults_apply_without_any_file() {
    let config = Config::from_toml_str("").expect("config");
    let settings = config.settings().expect("settings");
    assert_eq!(settings.paging, PagingSettings { default_size: 20, max_size: 2000 });
    assert_eq!(settings.index.dir, None);
    assert_eq!(settings.index.writer_heap_bytes, 50_000_000);
}

#[test]
fn inline_toml_overrides_defaults() {
    let config = Config::from_toml_str("[paging]\ndefault_size = 9\nmax_size = 100\n[index]\ndir = \"idx\"\n").expect("config");
    let settings = config.settings().expect("settings");
    assert_eq!(settings.paging.default_size, 9);
    assert_eq!(settings.paging.max_size, 100);
    assert_eq!(settings.index.resolved_dir(Path::new("/srv")), Some(Path::new("/srv/idx").to_path_buf()));
    let size: u64 = config.get("paging.default_size").expect("get");
    assert_eq!(size, 9);
}

#[test]
fn env_overlay_file_wins_over_base_file() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("config.toml"), "[paging]\ndefault_size = 10\n").unwrap();
    fs::write(tmp.path().join("config.prod.toml"), "[paging]\ndefault_size = 50\n").unwrap();

    let dev = Config::load_for_env(tmp.path(), "dev").expect("dev").settings().expect("settings");
    let prod = Config::load_for_env(tmp.path(), "prod").expect("prod").settings().expect("settings");
    assert_eq!(dev.paging.default_size, 10);
    assert_eq!(prod.paging.default_size, 50);
}

#[test]
fn default_size_above_max_is_rejected() {
    let err = Config::from_toml_str("[paging]\ndefault_size = 30\nmax_size = 20\n").err().expect("invalid");
    assert!(matches!(err, Error::InvalidConfig(_)), "got {err:?}");
}

#[test]
fn tiny_writer_heap_is_rejected() {
    assert!(Config::from_toml_str("[index]\nwriter_heap_bytes = 1000\n").is_err());
}

#[test]
fn absolute_paths_are_not_rebased() {
    assert_eq!(resolve_with_base(Path::new("/base"), "/abs/idx"), Path::new("/abs/idx").to_path_buf());
    assert_eq!(resolve_with_base(Path::new("/base"), "rel"), Path::new("/base/rel").to_path_buf());
}

#[test]
fn missing_key_is_a_config_error() {
    let config = Config::from_toml_str("").expect("config");
    let err = config.get::<String>("nope.missing").unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));
}
