use std::rc::Rc;

use vidchrome::capability::{Capabilities, FullscreenVendor};
use vidchrome::config::{ConfigOverrides, ElementAttributes, PlayerConfig};
use vidchrome::db::{MemoryStorage, PreferenceStore, WriteOutcome};
use vidchrome::platform::PlatformApi;
use vidchrome::utils::{format_time, parse_bool, parse_hex_color, parse_number};

#[test]
fn formatting_and_parsing_helpers() {
    assert_eq!(format_time(0.0), "0:00");
    assert_eq!(format_time(61.9), "1:01");
    assert_eq!(format_time(3725.0), "1:02:05");
    assert_eq!(format_time(f64::NAN), "0:00");

    assert!(parse_bool(Some(" YES "), false));
    assert!(!parse_bool(Some("maybe"), false));
    assert_eq!(parse_number(Some("12.5"), 1.0), 12.5);
    assert_eq!(parse_number(Some("Infinity"), 1.0), 1.0);
    assert_eq!(parse_hex_color(Some("#ABC"), "#000"), "#ABC");
    assert_eq!(parse_hex_color(Some("#abcd"), "#000"), "#000");
}

#[test]
fn element_attributes_then_caller_overrides() {
    let manager = PlayerConfig::default().merged(
        &ConfigOverrides::from_json(r##"{"accent":"#101010","rate":1.25}"##).unwrap(),
    );
    let attrs = ElementAttributes {
        accent: Some("#ff0000".into()),
        pip: Some("0".into()),
        skip: Some("45".into()),
        ..Default::default()
    };
    let config = manager.for_element(
        &attrs,
        &ConfigOverrides {
            accent: Some("#00ff00".into()),
            ..Default::default()
        },
    );
    assert_eq!(config.accent, "#00ff00");
    assert!(!config.pip);
    assert_eq!(config.skip_step, 45);
    assert_eq!(config.rate, 1.25);
}

#[test]
fn preferences_survive_a_new_store_over_the_same_backend() {
    let backend = Rc::new(MemoryStorage::default());
    let config = PlayerConfig::default();

    let first = PreferenceStore::new(backend.clone());
    assert_eq!(first.write_volume(&config, 0.4, true), WriteOutcome::Written);
    assert_eq!(first.write_skip_step(&config, 60), WriteOutcome::Written);
    assert_eq!(first.write_rate(&config, 1.75), WriteOutcome::Written);

    let second = PreferenceStore::new(backend);
    assert_eq!(second.read_volume(&config), Some(0.4));
    assert_eq!(second.read_muted(&config), Some(true));
    assert_eq!(second.read_skip_step(&config), 60);
    assert_eq!(second.read_rate(&config), 1.75);
}

#[test]
fn custom_keys_are_respected() {
    let backend = Rc::new(MemoryStorage::with_entries([("site_skip", "30")]));
    let config = PlayerConfig::default().merged(&ConfigOverrides {
        skip_key: Some("site_skip".into()),
        ..Default::default()
    });
    let store = PreferenceStore::new(backend);
    assert_eq!(store.read_skip_step(&config), 30);
    assert_eq!(store.read_skip_step(&PlayerConfig::default()), 10);
}

/// Only the webkit variants exist.
struct WebkitOnly;

impl PlatformApi for WebkitOnly {
    fn wrapper_has_method(&self, name: &str) -> bool {
        name == "webkitRequestFullscreen"
    }
    fn document_has_method(&self, name: &str) -> bool {
        name == "webkitExitFullscreen"
    }
    fn document_has_element(&self, name: &str) -> bool {
        name == "webkitFullscreenElement"
    }
    fn call_wrapper_method(&self, _name: &str) {}
    fn call_document_method(&self, _name: &str) {}
    fn picture_in_picture_available(&self) -> bool {
        false
    }
    fn picture_in_picture_active(&self) -> bool {
        false
    }
    fn request_picture_in_picture(&self) {}
    fn exit_picture_in_picture(&self) {}
}

#[test]
fn capability_probe_resolves_prefixed_fullscreen() {
    let caps = Capabilities::probe(&WebkitOnly);
    let strategy = caps.fullscreen.unwrap();
    assert_eq!(strategy.request, FullscreenVendor::Webkit);
    assert_eq!(strategy.exit, Some(FullscreenVendor::Webkit));
    assert!(caps.is_fullscreen(&WebkitOnly));
    assert!(!caps.supports_pip());
}
