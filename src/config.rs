//! Player configuration: built-in defaults, per-element attributes and
//! caller overrides, merged in ascending priority.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::utils::{clamp, parse_bool, parse_hex_color, parse_number, slugify};

pub const SKIP_STEP_MIN: f64 = 1.0;
pub const SKIP_STEP_MAX: f64 = 90.0;
pub const RATE_MIN: f64 = 0.25;
pub const RATE_MAX: f64 = 4.0;

/// Controls hide after this much quiet time during playback.
pub const IDLE_DELAY_MS: u32 = 1600;
/// Skips stop this far before the end so they never trigger `ended`.
pub const END_GUARD_SECS: f64 = 0.25;
/// Volume restored when unmuting would otherwise stay silent.
pub const UNMUTE_VOLUME: f64 = 0.5;
/// Integer resolution of the scrub slider.
pub const SCRUB_RESOLUTION: u32 = 1000;

pub const DEFAULT_SELECTOR: &str = "video.vc-video, video.vidchrome";
pub const DEFAULT_ACCENT: &str = "#7c3aed";

pub static DEFAULT_CONFIG: Lazy<PlayerConfig> = Lazy::new(|| PlayerConfig {
    selector: DEFAULT_SELECTOR.to_string(),
    accent: DEFAULT_ACCENT.to_string(),
    autohide: true,
    hotkeys: true,
    pip: true,
    remember_volume: true,
    skip_step: 10,
    skip_options: vec![10.0, 30.0, 60.0, 90.0],
    rate: 1.0,
    rate_options: vec![0.75, 1.0, 1.25, 1.5, 2.0],
    volume_key: "vc_volume_v1".to_string(),
    muted_key: "vc_muted_v1".to_string(),
    skip_key: "vc_skip_v1".to_string(),
    rate_key: "vc_rate_v1".to_string(),
    theme: None,
    title: None,
});

/// The single clamp for skip-step, whatever the source (attribute, caller,
/// stored preference, chip).
pub fn clamp_skip_step(seconds: f64) -> u32 {
    clamp(seconds.round(), SKIP_STEP_MIN, SKIP_STEP_MAX) as u32
}

pub fn clamp_rate(rate: f64) -> f64 {
    clamp(rate, RATE_MIN, RATE_MAX)
}

/// Effective configuration of one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerConfig {
    pub selector: String,
    pub accent: String,
    pub autohide: bool,
    pub hotkeys: bool,
    pub pip: bool,
    pub remember_volume: bool,
    pub skip_step: u32,
    pub skip_options: Vec<f64>,
    pub rate: f64,
    pub rate_options: Vec<f64>,
    pub volume_key: String,
    pub muted_key: String,
    pub skip_key: String,
    pub rate_key: String,
    pub theme: Option<String>,
    pub title: Option<String>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        DEFAULT_CONFIG.clone()
    }
}

impl PlayerConfig {
    /// Layer `overrides` on top of `self`; fields left `None` keep their value.
    pub fn merged(&self, overrides: &ConfigOverrides) -> Self {
        let mut next = self.clone();
        if let Some(selector) = &overrides.selector {
            next.selector = selector.clone();
        }
        if let Some(accent) = &overrides.accent {
            next.accent = parse_hex_color(Some(accent), &self.accent);
        }
        if let Some(v) = overrides.autohide {
            next.autohide = v;
        }
        if let Some(v) = overrides.hotkeys {
            next.hotkeys = v;
        }
        if let Some(v) = overrides.pip {
            next.pip = v;
        }
        if let Some(v) = overrides.remember_volume {
            next.remember_volume = v;
        }
        if let Some(step) = overrides.skip_step {
            if step.is_finite() {
                next.skip_step = clamp_skip_step(step);
            }
        }
        if let Some(options) = &overrides.skip_options {
            next.skip_options = finite(options);
        }
        if let Some(rate) = overrides.rate {
            if rate.is_finite() {
                next.rate = clamp_rate(rate);
            }
        }
        if let Some(options) = &overrides.rate_options {
            next.rate_options = finite(options);
        }
        if let Some(key) = &overrides.volume_key {
            next.volume_key = key.clone();
        }
        if let Some(key) = &overrides.muted_key {
            next.muted_key = key.clone();
        }
        if let Some(key) = &overrides.skip_key {
            next.skip_key = key.clone();
        }
        if let Some(key) = &overrides.rate_key {
            next.rate_key = key.clone();
        }
        if let Some(theme) = &overrides.theme {
            next.theme = normalize_theme(theme);
        }
        if let Some(title) = &overrides.title {
            next.title = non_empty(title);
        }
        next
    }

    /// Full merge for one element: `self` (defaults plus manager options),
    /// then the element's attributes, then the call-site overrides.
    pub fn for_element(&self, attributes: &ElementAttributes, overrides: &ConfigOverrides) -> Self {
        self.merged(&attributes.to_overrides(self)).merged(overrides)
    }

    /// CSS class carrying the theme preset, if any.
    pub fn theme_class(&self) -> Option<String> {
        self.theme.as_ref().map(|t| format!("vc-theme-{t}"))
    }
}

fn finite(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| v.is_finite()).collect()
}

fn normalize_theme(raw: &str) -> Option<String> {
    let slug = slugify(raw.trim());
    if slug.is_empty() {
        None
    } else {
        Some(slug)
    }
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Caller-supplied overrides. Every field is optional; JSON keys are camelCase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigOverrides {
    pub selector: Option<String>,
    pub accent: Option<String>,
    pub autohide: Option<bool>,
    pub hotkeys: Option<bool>,
    pub pip: Option<bool>,
    pub remember_volume: Option<bool>,
    pub skip_step: Option<f64>,
    pub skip_options: Option<Vec<f64>>,
    pub rate: Option<f64>,
    pub rate_options: Option<Vec<f64>>,
    pub volume_key: Option<String>,
    pub muted_key: Option<String>,
    pub skip_key: Option<String>,
    pub rate_key: Option<String>,
    pub theme: Option<String>,
    pub title: Option<String>,
}

impl ConfigOverrides {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn is_empty(&self) -> bool {
        self == &ConfigOverrides::default()
    }
}

/// Raw `data-*` attributes read off a host element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementAttributes {
    pub accent: Option<String>,
    pub autohide: Option<String>,
    pub hotkeys: Option<String>,
    pub pip: Option<String>,
    pub skip: Option<String>,
    pub theme: Option<String>,
    pub title: Option<String>,
}

impl ElementAttributes {
    /// Parse each attribute against `base`. Missing or malformed values
    /// produce no override so the lower layer wins.
    pub fn to_overrides(&self, base: &PlayerConfig) -> ConfigOverrides {
        let accent = self
            .accent
            .as_deref()
            .map(|raw| parse_hex_color(Some(raw), &base.accent))
            .filter(|accent| accent != &base.accent);
        let skip = parse_number(self.skip.as_deref(), f64::NAN);

        ConfigOverrides {
            accent,
            autohide: Some(parse_bool(self.autohide.as_deref(), base.autohide)),
            hotkeys: Some(parse_bool(self.hotkeys.as_deref(), base.hotkeys)),
            pip: Some(parse_bool(self.pip.as_deref(), base.pip)),
            skip_step: skip.is_finite().then_some(skip),
            theme: self.theme.clone().filter(|t| !t.trim().is_empty()),
            title: self.title.clone().filter(|t| !t.trim().is_empty()),
            ..ConfigOverrides::default()
        }
    }
}
