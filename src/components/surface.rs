//! Render model of the control surface.
//!
//! The model is rebuilt from live media state after every event and handed
//! to a [`SurfaceRenderer`](crate::platform::SurfaceRenderer); it never
//! holds media state of its own between renders.

use crate::capability::Capabilities;
use crate::components::Icon;
use crate::config::{PlayerConfig, SCRUB_RESOLUTION};
use crate::utils::{clamp, format_number, format_time};

/// Remaining-time text while duration is unknown.
pub const REMAINING_PLACEHOLDER: &str = "-0:00";

#[derive(Debug, Clone, PartialEq)]
pub enum ChipAction {
    SkipStep(u32),
    Rate(f64),
}

/// A selectable option in the settings popover.
#[derive(Debug, Clone, PartialEq)]
pub struct Chip {
    pub label: String,
    pub pressed: bool,
    pub action: ChipAction,
}

impl Chip {
    /// Value carried in the DOM so a delegated click can recover the action.
    pub fn value(&self) -> f64 {
        match self.action {
            ChipAction::SkipStep(step) => f64::from(step),
            ChipAction::Rate(rate) => rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControlSurface {
    pub accent: String,
    pub theme_class: Option<String>,
    pub title: Option<String>,
    pub playing: bool,
    pub ui_hidden: bool,
    /// Muted flag set, or volume exactly zero.
    pub muted: bool,
    pub fullscreen: bool,
    /// Playback fraction in `[0, SCRUB_RESOLUTION]`.
    pub scrub: u32,
    /// CSS percentage matching `scrub`, e.g. `"42.000%"`.
    pub progress: String,
    pub remaining: String,
    pub volume: f64,
    pub skip_label: String,
    pub skip_back_label: String,
    pub skip_forward_label: String,
    pub popover_open: bool,
    pub skip_chips: Vec<Chip>,
    pub rate_chips: Vec<Chip>,
    pub pip_visible: bool,
    pub fullscreen_enabled: bool,
}

impl ControlSurface {
    pub fn build(config: &PlayerConfig, capabilities: &Capabilities) -> Self {
        let mut surface = Self {
            accent: config.accent.clone(),
            theme_class: config.theme_class(),
            title: config.title.clone(),
            playing: false,
            ui_hidden: false,
            muted: false,
            fullscreen: false,
            scrub: 0,
            progress: "0%".to_string(),
            remaining: REMAINING_PLACEHOLDER.to_string(),
            volume: 1.0,
            skip_label: String::new(),
            skip_back_label: String::new(),
            skip_forward_label: String::new(),
            popover_open: false,
            skip_chips: Vec::new(),
            rate_chips: Vec::new(),
            pip_visible: config.pip && capabilities.supports_pip(),
            fullscreen_enabled: capabilities.supports_fullscreen(),
        };
        surface.set_skip_step(config.skip_step);
        surface.rebuild_chips(config, config.skip_step, config.rate);
        surface
    }

    pub fn set_skip_step(&mut self, step: u32) {
        self.skip_label = step.to_string();
        self.skip_back_label = format!("Skip back {step} seconds");
        self.skip_forward_label = format!("Skip forward {step} seconds");
    }

    /// Regenerate both chip lists so the active choices are marked pressed.
    pub fn rebuild_chips(&mut self, config: &PlayerConfig, skip_step: u32, rate: f64) {
        self.skip_chips = config
            .skip_options
            .iter()
            .map(|&option| Chip {
                label: format!("{}s", format_number(option)),
                pressed: option == f64::from(skip_step),
                action: ChipAction::SkipStep(option.round().max(0.0) as u32),
            })
            .collect();
        self.rate_chips = config
            .rate_options
            .iter()
            .map(|&option| Chip {
                label: format!("{}x", format_number(option)),
                pressed: (option - rate).abs() < 1e-9,
                action: ChipAction::Rate(option),
            })
            .collect();
    }

    pub fn apply_progress(&mut self, view: &ProgressView, include_scrub: bool) {
        if include_scrub {
            self.scrub = view.scrub;
            self.progress = view.progress.clone();
        }
        self.remaining = view.remaining.clone();
    }

    pub fn apply_volume(&mut self, volume: f64, muted: bool) {
        let volume = clamp(volume, 0.0, 1.0);
        self.volume = volume;
        self.muted = muted || volume == 0.0;
    }

    pub fn play_icon(&self) -> Icon {
        if self.playing {
            Icon::Pause
        } else {
            Icon::Play
        }
    }

    pub fn volume_icon(&self) -> Icon {
        if self.muted {
            Icon::Muted
        } else {
            Icon::Volume
        }
    }

    pub fn fullscreen_icon(&self) -> Icon {
        if self.fullscreen {
            Icon::ExitFullscreen
        } else {
            Icon::Fullscreen
        }
    }
}

/// Scrub position and remaining time derived from one reading of the media.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressView {
    pub scrub: u32,
    pub progress: String,
    pub remaining: String,
}

impl ProgressView {
    pub fn compute(current: f64, duration: f64) -> Self {
        if !known_duration(duration) || !current.is_finite() {
            return Self {
                scrub: 0,
                progress: "0%".to_string(),
                remaining: REMAINING_PLACEHOLDER.to_string(),
            };
        }
        let fraction = clamp(current / duration, 0.0, 1.0);
        let remaining = clamp(duration - current, 0.0, duration);
        Self {
            scrub: (fraction * f64::from(SCRUB_RESOLUTION)).round() as u32,
            progress: format!("{:.3}%", fraction * 100.0),
            remaining: format!("-{}", format_time(remaining)),
        }
    }
}

pub fn known_duration(duration: f64) -> bool {
    duration.is_finite() && duration > 0.0
}

/// Time for a scrub slider value, or `None` while duration is unknown.
pub fn time_for_scrub(value: u32, duration: f64) -> Option<f64> {
    if !known_duration(duration) {
        return None;
    }
    let value = value.min(SCRUB_RESOLUTION);
    Some(f64::from(value) / f64::from(SCRUB_RESOLUTION) * duration)
}
