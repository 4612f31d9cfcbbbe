//! Player controller: keeps the control surface and the host media element
//! consistent.
//!
//! Every input, whether a DOM listener, a media notification, a timer or a
//! call from host code, is expressed as a [`PlayerEvent`] and goes through
//! [`Player::handle`]. Handlers always re-read the media element instead of
//! trusting earlier readings, so a notification that arrives twice, or a
//! frame tick racing a `timeupdate`, is harmless.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::capability::Capabilities;
use crate::components::surface::{known_duration, time_for_scrub, ControlSurface, ProgressView};
use crate::config::{
    clamp_rate, clamp_skip_step, PlayerConfig, END_GUARD_SECS, IDLE_DELAY_MS, UNMUTE_VOLUME,
};
use crate::db::PreferenceStore;
use crate::platform::{
    FrameId, MediaHost, PlatformApi, PlayerBindings, Scheduler, SurfaceRenderer, TimerId,
};
use crate::utils::{clamp, parse_hex_color};

pub type PlayerHandle = Rc<RefCell<Player>>;

/// Kinds of user activity that wake the control surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    PointerMove,
    TouchStart,
    Focus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    // Media element notifications.
    MediaPlay,
    MediaPause,
    MediaEnded,
    TimeUpdate,
    DurationChange,
    VolumeChange,
    FullscreenChange,

    // User input and host-code calls.
    Play,
    Pause,
    TogglePlay,
    SeekBy(f64),
    SkipBack,
    SkipForward,
    ScrubStart,
    ScrubEnd,
    ScrubInput(u32),
    VolumeInput(f64),
    ToggleMute,
    ToggleFullscreen,
    TogglePip,
    SetAccent(String),
    SelectSkipStep(f64),
    SelectRate(f64),
    OpenSettings,
    CloseSettings,
    ToggleSettings,
    DocumentClick { inside_surface: bool },
    Activity(Activity),
    KeyDown(String),

    // Scheduler callbacks.
    IdleTimeout,
    FrameTick,
}

/// Whether the binding should suppress the browser's default action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Consumed,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hotkey {
    TogglePlay,
    SeekBack,
    SeekForward,
    ToggleMute,
    ToggleFullscreen,
    CloseSettings,
}

impl Hotkey {
    /// Map a `KeyboardEvent.key` value, case-insensitively.
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            " " | "spacebar" | "k" => Some(Hotkey::TogglePlay),
            "arrowleft" => Some(Hotkey::SeekBack),
            "arrowright" => Some(Hotkey::SeekForward),
            "m" => Some(Hotkey::ToggleMute),
            "f" => Some(Hotkey::ToggleFullscreen),
            "escape" | "esc" => Some(Hotkey::CloseSettings),
            _ => None,
        }
    }
}

pub struct Player {
    config: PlayerConfig,
    capabilities: Capabilities,
    media: Box<dyn MediaHost>,
    platform: Box<dyn PlatformApi>,
    renderer: Box<dyn SurfaceRenderer>,
    scheduler: Box<dyn Scheduler>,
    preferences: PreferenceStore,
    surface: ControlSurface,
    seeking: bool,
    popover_open: bool,
    visibility: Visibility,
    idle_timer: Option<TimerId>,
    frame_loop: Option<FrameId>,
    destroyed: bool,
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("config", &self.config)
            .field("capabilities", &self.capabilities)
            .field("seeking", &self.seeking)
            .field("popover_open", &self.popover_open)
            .field("visibility", &self.visibility)
            .field("idle_timer", &self.idle_timer)
            .field("frame_loop", &self.frame_loop)
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}

impl Player {
    /// Probe capabilities, build the surface model, restore preferences and
    /// render once. Event listeners are the binding's job.
    pub fn new(config: PlayerConfig, bindings: PlayerBindings) -> Self {
        let PlayerBindings {
            media,
            platform,
            renderer,
            scheduler,
            preferences,
        } = bindings;

        let capabilities = Capabilities::probe(platform.as_ref());
        let surface = ControlSurface::build(&config, &capabilities);
        media.set_native_controls(false);

        let mut player = Self {
            config,
            capabilities,
            media,
            platform,
            renderer,
            scheduler,
            preferences,
            surface,
            seeking: false,
            popover_open: false,
            visibility: Visibility::Visible,
            idle_timer: None,
            frame_loop: None,
            destroyed: false,
        };
        player.restore_preferences();
        player.refresh_all();
        // Autoplaying media never emits a `play` we could observe.
        if !player.media.paused() {
            player.on_media(&PlayerEvent::MediaPlay);
        }
        player.render();
        debug!(skip_step = player.config.skip_step, "player attached");
        player
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn surface(&self) -> &ControlSurface {
        &self.surface
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn skip_step(&self) -> u32 {
        self.config.skip_step
    }

    pub fn is_seeking(&self) -> bool {
        self.seeking
    }

    pub fn is_settings_open(&self) -> bool {
        self.popover_open
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn play(&mut self) {
        self.handle(PlayerEvent::Play);
    }

    pub fn pause(&mut self) {
        self.handle(PlayerEvent::Pause);
    }

    pub fn toggle_play(&mut self) {
        self.handle(PlayerEvent::TogglePlay);
    }

    pub fn seek_by(&mut self, seconds: f64) {
        self.handle(PlayerEvent::SeekBy(seconds));
    }

    pub fn set_accent(&mut self, hex: &str) {
        self.handle(PlayerEvent::SetAccent(hex.to_string()));
    }

    pub fn toggle_mute(&mut self) {
        self.handle(PlayerEvent::ToggleMute);
    }

    pub fn toggle_fullscreen(&mut self) {
        self.handle(PlayerEvent::ToggleFullscreen);
    }

    pub fn toggle_picture_in_picture(&mut self) {
        self.handle(PlayerEvent::TogglePip);
    }

    pub fn set_skip_step(&mut self, seconds: f64) {
        self.handle(PlayerEvent::SelectSkipStep(seconds));
    }

    pub fn set_playback_rate(&mut self, rate: f64) {
        self.handle(PlayerEvent::SelectRate(rate));
    }

    pub fn open_settings(&mut self) {
        self.handle(PlayerEvent::OpenSettings);
    }

    pub fn close_settings(&mut self) {
        self.handle(PlayerEvent::CloseSettings);
    }

    pub fn toggle_settings(&mut self) {
        self.handle(PlayerEvent::ToggleSettings);
    }

    /// Single entry point for every input. Events after teardown are ignored.
    pub fn handle(&mut self, event: PlayerEvent) -> EventOutcome {
        if self.destroyed {
            return EventOutcome::Ignored;
        }
        trace!(?event, "player event");

        let outcome = match &event {
            PlayerEvent::MediaPlay
            | PlayerEvent::MediaPause
            | PlayerEvent::MediaEnded
            | PlayerEvent::TimeUpdate
            | PlayerEvent::DurationChange
            | PlayerEvent::VolumeChange
            | PlayerEvent::FullscreenChange
            | PlayerEvent::FrameTick => self.on_media(&event),

            PlayerEvent::Play
            | PlayerEvent::Pause
            | PlayerEvent::TogglePlay
            | PlayerEvent::SeekBy(_)
            | PlayerEvent::SkipBack
            | PlayerEvent::SkipForward
            | PlayerEvent::ScrubStart
            | PlayerEvent::ScrubEnd
            | PlayerEvent::ScrubInput(_)
            | PlayerEvent::ToggleFullscreen
            | PlayerEvent::TogglePip => self.on_transport(&event),

            PlayerEvent::VolumeInput(_) | PlayerEvent::ToggleMute => self.on_volume(&event),

            PlayerEvent::SetAccent(_)
            | PlayerEvent::SelectSkipStep(_)
            | PlayerEvent::SelectRate(_)
            | PlayerEvent::OpenSettings
            | PlayerEvent::CloseSettings
            | PlayerEvent::ToggleSettings
            | PlayerEvent::DocumentClick { .. } => self.on_settings(&event),

            PlayerEvent::Activity(_) | PlayerEvent::IdleTimeout => self.on_idle(&event),

            PlayerEvent::KeyDown(key) => {
                self.schedule_autohide();
                self.on_key(key)
            }
        };

        self.render();
        outcome
    }

    /// Tear down: stop timers, close the popover, hand native controls
    /// back and detach the surface. Only the first call does anything.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.stop_frame_loop();
        self.cancel_idle();
        self.popover_open = false;
        self.visibility = Visibility::Visible;
        self.render();
        self.media.set_native_controls(true);
        self.renderer.detach();
        self.destroyed = true;
        debug!("player destroyed");
    }

    fn on_media(&mut self, event: &PlayerEvent) -> EventOutcome {
        match event {
            PlayerEvent::MediaPlay => {
                self.surface.playing = true;
                self.start_frame_loop();
                self.schedule_autohide();
            }
            PlayerEvent::MediaPause | PlayerEvent::MediaEnded => {
                self.surface.playing = false;
                self.stop_frame_loop();
                self.cancel_idle();
                self.show();
            }
            PlayerEvent::TimeUpdate => self.sync_progress(true),
            PlayerEvent::FrameTick => {
                // A tick that raced a cancel is stale.
                if self.frame_loop.take().is_none() {
                    return EventOutcome::Ignored;
                }
                self.frame_loop = Some(self.scheduler.request_frame());
                self.sync_progress(true);
            }
            PlayerEvent::DurationChange => self.sync_progress(false),
            PlayerEvent::VolumeChange => {
                self.remember_volume();
                self.sync_volume();
            }
            PlayerEvent::FullscreenChange => self.sync_fullscreen(),
            _ => return EventOutcome::Ignored,
        }
        EventOutcome::Consumed
    }

    fn on_transport(&mut self, event: &PlayerEvent) -> EventOutcome {
        match *event {
            PlayerEvent::Play => self.media.request_play(),
            PlayerEvent::Pause => self.media.pause(),
            PlayerEvent::TogglePlay => {
                if self.media.paused() {
                    self.media.request_play();
                } else {
                    self.media.pause();
                }
            }
            PlayerEvent::SeekBy(seconds) => self.seek_relative(seconds),
            PlayerEvent::SkipBack => self.seek_relative(-f64::from(self.config.skip_step)),
            PlayerEvent::SkipForward => self.seek_relative(f64::from(self.config.skip_step)),
            PlayerEvent::ScrubStart => self.seeking = true,
            PlayerEvent::ScrubEnd => self.seeking = false,
            PlayerEvent::ScrubInput(value) => {
                if let Some(time) = time_for_scrub(value, self.media.duration()) {
                    self.media.set_current_time(time);
                    self.sync_progress(false);
                }
            }
            PlayerEvent::ToggleFullscreen => {
                self.capabilities.toggle_fullscreen(self.platform.as_ref())
            }
            PlayerEvent::TogglePip => self.capabilities.toggle_pip(self.platform.as_ref()),
            _ => return EventOutcome::Ignored,
        }
        EventOutcome::Consumed
    }

    fn on_volume(&mut self, event: &PlayerEvent) -> EventOutcome {
        match *event {
            PlayerEvent::VolumeInput(value) => {
                let volume = clamp(value, 0.0, 1.0);
                self.media.set_volume(volume);
                if volume > 0.0 && self.media.muted() {
                    self.media.set_muted(false);
                }
            }
            PlayerEvent::ToggleMute => {
                let muted = !self.media.muted();
                self.media.set_muted(muted);
                if !muted && self.media.volume() == 0.0 {
                    self.media.set_volume(UNMUTE_VOLUME);
                }
            }
            _ => return EventOutcome::Ignored,
        }
        self.remember_volume();
        self.sync_volume();
        EventOutcome::Consumed
    }

    fn on_settings(&mut self, event: &PlayerEvent) -> EventOutcome {
        match event {
            PlayerEvent::SetAccent(hex) => {
                let accent = parse_hex_color(Some(hex.as_str()), &self.config.accent);
                self.surface.accent = accent.clone();
                self.config.accent = accent;
            }
            PlayerEvent::SelectSkipStep(seconds) => {
                let step = clamp_skip_step(*seconds);
                self.config.skip_step = step;
                self.preferences.write_skip_step(&self.config, step);
                self.surface.set_skip_step(step);
                self.rebuild_chips();
            }
            PlayerEvent::SelectRate(rate) => {
                let rate = clamp_rate(*rate);
                self.media.set_playback_rate(rate);
                self.preferences.write_rate(&self.config, rate);
                self.rebuild_chips();
            }
            PlayerEvent::OpenSettings => self.open_popover(),
            PlayerEvent::CloseSettings => self.popover_open = false,
            PlayerEvent::ToggleSettings => {
                if self.popover_open {
                    self.popover_open = false;
                } else {
                    self.open_popover();
                }
            }
            PlayerEvent::DocumentClick { inside_surface } => {
                if !self.popover_open || *inside_surface {
                    return EventOutcome::Ignored;
                }
                self.popover_open = false;
            }
            _ => return EventOutcome::Ignored,
        }
        EventOutcome::Consumed
    }

    fn on_idle(&mut self, event: &PlayerEvent) -> EventOutcome {
        match event {
            PlayerEvent::Activity(_) => self.schedule_autohide(),
            PlayerEvent::IdleTimeout => {
                if let Some(id) = self.idle_timer.take() {
                    self.scheduler.clear_timeout(id);
                }
                if self.may_hide() {
                    self.visibility = Visibility::Hidden;
                }
            }
            _ => return EventOutcome::Ignored,
        }
        EventOutcome::Consumed
    }

    fn on_key(&mut self, key: &str) -> EventOutcome {
        if !self.config.hotkeys {
            return EventOutcome::Ignored;
        }
        let Some(hotkey) = Hotkey::from_key(key) else {
            return EventOutcome::Ignored;
        };
        let event = match hotkey {
            Hotkey::TogglePlay => PlayerEvent::TogglePlay,
            Hotkey::SeekBack => PlayerEvent::SkipBack,
            Hotkey::SeekForward => PlayerEvent::SkipForward,
            Hotkey::ToggleMute => PlayerEvent::ToggleMute,
            Hotkey::ToggleFullscreen => PlayerEvent::ToggleFullscreen,
            Hotkey::CloseSettings if self.popover_open => PlayerEvent::CloseSettings,
            Hotkey::CloseSettings => return EventOutcome::Ignored,
        };
        match event {
            PlayerEvent::ToggleMute => self.on_volume(&event),
            PlayerEvent::CloseSettings => self.on_settings(&event),
            _ => self.on_transport(&event),
        }
    }

    fn seek_relative(&mut self, seconds: f64) {
        let duration = self.media.duration();
        if !seconds.is_finite() || !known_duration(duration) {
            return;
        }
        let latest = (duration - END_GUARD_SECS).max(0.0);
        let target = clamp(self.media.current_time() + seconds, 0.0, latest);
        self.media.set_current_time(target);
        self.sync_progress(false);
        self.schedule_autohide();
    }

    fn open_popover(&mut self) {
        self.popover_open = true;
        self.show();
    }

    fn restore_preferences(&mut self) {
        if self.config.remember_volume {
            if let Some(volume) = self.preferences.read_volume(&self.config) {
                self.media.set_volume(volume);
            }
            if let Some(muted) = self.preferences.read_muted(&self.config) {
                self.media.set_muted(muted);
            }
        }
        let step = self.preferences.read_skip_step(&self.config);
        self.config.skip_step = step;
        self.surface.set_skip_step(step);
        self.media
            .set_playback_rate(self.preferences.read_rate(&self.config));
        self.rebuild_chips();
    }

    fn remember_volume(&self) {
        if self.config.remember_volume {
            self.preferences
                .write_volume(&self.config, self.media.volume(), self.media.muted());
        }
    }

    fn rebuild_chips(&mut self) {
        let rate = self.media.playback_rate();
        self.surface
            .rebuild_chips(&self.config, self.config.skip_step, rate);
    }

    fn refresh_all(&mut self) {
        self.sync_progress(false);
        self.sync_volume();
        self.sync_fullscreen();
    }

    /// With `respect_seeking`, a drag in progress keeps the scrub where the
    /// user holds it; remaining time always follows the media.
    fn sync_progress(&mut self, respect_seeking: bool) {
        let view = ProgressView::compute(self.media.current_time(), self.media.duration());
        let include_scrub = !(respect_seeking && self.seeking);
        self.surface.apply_progress(&view, include_scrub);
    }

    fn sync_volume(&mut self) {
        self.surface
            .apply_volume(self.media.volume(), self.media.muted());
    }

    fn sync_fullscreen(&mut self) {
        self.surface.fullscreen = self.capabilities.is_fullscreen(self.platform.as_ref());
    }

    fn start_frame_loop(&mut self) {
        if self.frame_loop.is_some() {
            return;
        }
        self.frame_loop = Some(self.scheduler.request_frame());
    }

    fn stop_frame_loop(&mut self) {
        if let Some(id) = self.frame_loop.take() {
            self.scheduler.cancel_frame(id);
        }
    }

    fn cancel_idle(&mut self) {
        if let Some(id) = self.idle_timer.take() {
            self.scheduler.clear_timeout(id);
        }
    }

    fn show(&mut self) {
        self.visibility = Visibility::Visible;
    }

    /// Show the surface and re-arm the single idle timer. While autohide is
    /// off or the media is paused no timer is armed.
    fn schedule_autohide(&mut self) {
        self.show();
        self.cancel_idle();
        if !self.config.autohide || self.media.paused() {
            return;
        }
        self.idle_timer = Some(self.scheduler.set_timeout(IDLE_DELAY_MS));
    }

    fn may_hide(&self) -> bool {
        self.config.autohide
            && !self.media.paused()
            && !self.popover_open
            && !self.seeking
            && !self.renderer.control_focused()
    }

    fn render(&mut self) {
        self.surface.popover_open = self.popover_open;
        self.surface.ui_hidden = self.visibility == Visibility::Hidden;
        self.renderer.render(&self.surface);
    }
}
