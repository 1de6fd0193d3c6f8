//! Tests for configuration layering.

use figment::Jail;
use leafcheck_core::config::{SettleKind, DEFAULT_CONFIG_FILE};
use leafcheck_core::{HarnessConfig, HarnessError, LocatorMap};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn loads_explicit_toml_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("viewer.toml");
    fs::write(
        &path,
        r#"
[viewer]
base_url = "http://localhost:8080"
book_path = "/details/sample"

[timeouts]
settle_ms = 2500

[settle]
strategy = "stable"

[session]
storage_state = "playwright/.auth/guest.json"

[selectors.controls]
flip-next = ".next-page"
"#,
    )
    .unwrap();

    let config = HarnessConfig::load(Some(&path)).unwrap();
    assert_eq!(config.viewer_url(), "http://localhost:8080/details/sample");
    assert_eq!(config.timeouts.settle_ms, 2500);
    assert_eq!(config.timeouts.control_visible_ms, 10_000);
    assert_eq!(config.settle.strategy, SettleKind::Stable);
    assert_eq!(
        config.session.storage_state,
        Some(PathBuf::from("playwright/.auth/guest.json"))
    );
    assert_eq!(config.selectors.controls["flip-next"], ".next-page");
}

#[test]
fn environment_overrides_file() {
    Jail::expect_with(|jail| {
        jail.create_file(
            DEFAULT_CONFIG_FILE,
            r#"
[viewer]
base_url = "http://localhost:8080"

[timeouts]
control_visible_ms = 5000
"#,
        )?;
        jail.set_env("LEAFCHECK_TIMEOUTS__CONTROL_VISIBLE_MS", "20000");
        jail.set_env("LEAFCHECK_BROWSER__HEADLESS", "false");

        let config = HarnessConfig::load(None).map_err(|e| e.to_string())?;
        assert_eq!(config.viewer.base_url, "http://localhost:8080");
        assert_eq!(config.timeouts.control_visible_ms, 20_000);
        assert!(!config.browser.headless);
        Ok(())
    });
}

#[test]
fn defaults_apply_without_a_file() {
    Jail::expect_with(|_jail| {
        let config = HarnessConfig::load(None).map_err(|e| e.to_string())?;
        assert_eq!(config, HarnessConfig::default());
        Ok(())
    });
}

#[test]
fn malformed_values_are_config_errors() {
    Jail::expect_with(|jail| {
        jail.create_file(
            DEFAULT_CONFIG_FILE,
            r#"
[timeouts]
settle_ms = "soon"
"#,
        )?;
        let err = HarnessConfig::load(None).unwrap_err();
        assert!(matches!(err, HarnessError::Config(_)));
        Ok(())
    });
}

#[test]
fn invalid_base_url_fails_validation() {
    Jail::expect_with(|jail| {
        jail.set_env("LEAFCHECK_VIEWER__BASE_URL", "localhost:8080");
        let err = HarnessConfig::load(None).unwrap_err();
        assert!(err.to_string().contains("http(s)"));
        Ok(())
    });
}

#[test]
fn selector_overrides_reach_the_locator_map() {
    Jail::expect_with(|jail| {
        jail.create_file(
            DEFAULT_CONFIG_FILE,
            r##"
[selectors]
shell = "#reader"
"##,
        )?;
        let config = HarnessConfig::load(None).map_err(|e| e.to_string())?;
        let map = LocatorMap::from_config(&config.selectors).map_err(|e| e.to_string())?;
        assert_eq!(
            map.control(leafcheck_core::Control::ZoomIn).selectors(),
            ["ia-book-theater", "#reader", ".BRfooter", ".BRicon.zoom_in"]
        );
        Ok(())
    });
}
