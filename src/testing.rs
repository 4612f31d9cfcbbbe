//! In-memory hosts for driving players without a browser.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::components::{
    ControlSurface, EventOutcome, HostEnvironment, Player, PlayerEvent, PlayerHandle,
    PlayerTable,
};
use crate::config::{ConfigOverrides, ElementAttributes, PlayerConfig};
use crate::db::{MemoryStorage, PreferenceStore};
use crate::platform::{
    FrameId, MediaHost, PlatformApi, PlayerBindings, Scheduler, SurfaceRenderer, TimerId,
};

#[derive(Debug)]
struct MediaState {
    paused: bool,
    current_time: f64,
    duration: f64,
    volume: f64,
    muted: bool,
    rate: f64,
    native_controls: bool,
    play_requests: usize,
    pause_requests: usize,
}

/// A media element whose play/pause requests are only counted; tests
/// deliver the resulting notifications themselves.
#[derive(Debug, Clone)]
pub struct FakeMedia(Rc<RefCell<MediaState>>);

impl Default for FakeMedia {
    fn default() -> Self {
        Self(Rc::new(RefCell::new(MediaState {
            paused: true,
            current_time: 0.0,
            duration: f64::NAN,
            volume: 1.0,
            muted: false,
            rate: 1.0,
            native_controls: true,
            play_requests: 0,
            pause_requests: 0,
        })))
    }
}

impl FakeMedia {
    pub fn set_paused(&self, paused: bool) {
        self.0.borrow_mut().paused = paused;
    }

    pub fn set_duration(&self, duration: f64) {
        self.0.borrow_mut().duration = duration;
    }

    pub fn native_controls(&self) -> bool {
        self.0.borrow().native_controls
    }

    pub fn play_requests(&self) -> usize {
        self.0.borrow().play_requests
    }

    pub fn pause_requests(&self) -> usize {
        self.0.borrow().pause_requests
    }
}

impl MediaHost for FakeMedia {
    fn paused(&self) -> bool {
        self.0.borrow().paused
    }

    fn current_time(&self) -> f64 {
        self.0.borrow().current_time
    }

    fn set_current_time(&self, seconds: f64) {
        self.0.borrow_mut().current_time = seconds;
    }

    fn duration(&self) -> f64 {
        self.0.borrow().duration
    }

    fn volume(&self) -> f64 {
        self.0.borrow().volume
    }

    fn set_volume(&self, volume: f64) {
        self.0.borrow_mut().volume = volume;
    }

    fn muted(&self) -> bool {
        self.0.borrow().muted
    }

    fn set_muted(&self, muted: bool) {
        self.0.borrow_mut().muted = muted;
    }

    fn playback_rate(&self) -> f64 {
        self.0.borrow().rate
    }

    fn set_playback_rate(&self, rate: f64) {
        self.0.borrow_mut().rate = rate;
    }

    fn request_play(&self) {
        self.0.borrow_mut().play_requests += 1;
    }

    fn pause(&self) {
        self.0.borrow_mut().pause_requests += 1;
    }

    fn set_native_controls(&self, enabled: bool) {
        self.0.borrow_mut().native_controls = enabled;
    }
}

#[derive(Debug, Default)]
struct PlatformState {
    methods: HashSet<String>,
    fullscreen_property: Option<String>,
    pip_available: bool,
    pip_active: bool,
    calls: Vec<String>,
}

/// Reflection fake: one method set serves both wrapper and document.
#[derive(Debug, Clone, Default)]
pub struct FakePlatform(Rc<RefCell<PlatformState>>);

impl FakePlatform {
    pub fn with_methods(methods: &[&str]) -> Self {
        let platform = Self::default();
        platform.0.borrow_mut().methods = methods.iter().map(|m| m.to_string()).collect();
        platform
    }

    pub fn set_fullscreen_property(&self, property: Option<&str>) {
        self.0.borrow_mut().fullscreen_property = property.map(str::to_string);
    }

    pub fn set_pip(&self, available: bool, active: bool) {
        let mut state = self.0.borrow_mut();
        state.pip_available = available;
        state.pip_active = active;
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.borrow().calls.clone()
    }

    fn record(&self, name: &str) {
        self.0.borrow_mut().calls.push(name.to_string());
    }
}

impl PlatformApi for FakePlatform {
    fn wrapper_has_method(&self, name: &str) -> bool {
        self.0.borrow().methods.contains(name)
    }

    fn document_has_method(&self, name: &str) -> bool {
        self.0.borrow().methods.contains(name)
    }

    fn document_has_element(&self, name: &str) -> bool {
        self.0.borrow().fullscreen_property.as_deref() == Some(name)
    }

    fn call_wrapper_method(&self, name: &str) {
        self.record(name);
    }

    fn call_document_method(&self, name: &str) {
        self.record(name);
    }

    fn picture_in_picture_available(&self) -> bool {
        self.0.borrow().pip_available
    }

    fn picture_in_picture_active(&self) -> bool {
        self.0.borrow().pip_active
    }

    fn request_picture_in_picture(&self) {
        self.record("requestPictureInPicture");
    }

    fn exit_picture_in_picture(&self) {
        self.record("exitPictureInPicture");
    }
}

#[derive(Debug, Default)]
struct RenderState {
    last: Option<ControlSurface>,
    renders: usize,
    focused: bool,
    detaches: usize,
}

/// Keeps the most recent surface model instead of touching widgets.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface(Rc<RefCell<RenderState>>);

impl RecordingSurface {
    pub fn last(&self) -> ControlSurface {
        self.0
            .borrow()
            .last
            .clone()
            .expect("surface rendered at least once")
    }

    pub fn render_count(&self) -> usize {
        self.0.borrow().renders
    }

    pub fn detach_count(&self) -> usize {
        self.0.borrow().detaches
    }

    pub fn detached(&self) -> bool {
        self.detach_count() > 0
    }

    pub fn set_focused(&self, focused: bool) {
        self.0.borrow_mut().focused = focused;
    }
}

impl SurfaceRenderer for RecordingSurface {
    fn render(&mut self, surface: &ControlSurface) {
        let mut state = self.0.borrow_mut();
        state.last = Some(surface.clone());
        state.renders += 1;
    }

    fn control_focused(&self) -> bool {
        self.0.borrow().focused
    }

    fn detach(&mut self) {
        self.0.borrow_mut().detaches += 1;
    }
}

#[derive(Debug, Default)]
struct SchedulerState {
    next_id: i32,
    timers: Vec<(TimerId, u32)>,
    frames: Vec<FrameId>,
}

/// Timers and frames fire only when a test says so.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler(Rc<RefCell<SchedulerState>>);

impl ManualScheduler {
    pub fn pending_timers(&self) -> Vec<u32> {
        self.0.borrow().timers.iter().map(|(_, delay)| *delay).collect()
    }

    pub fn pending_frames(&self) -> usize {
        self.0.borrow().frames.len()
    }

    fn take_timer(&self) -> Option<TimerId> {
        let mut state = self.0.borrow_mut();
        (!state.timers.is_empty()).then(|| state.timers.remove(0).0)
    }

    fn take_frame(&self) -> Option<FrameId> {
        let mut state = self.0.borrow_mut();
        (!state.frames.is_empty()).then(|| state.frames.remove(0))
    }

    fn next_id(&self) -> i32 {
        let mut state = self.0.borrow_mut();
        state.next_id += 1;
        state.next_id
    }
}

impl Scheduler for ManualScheduler {
    fn set_timeout(&mut self, delay_ms: u32) -> TimerId {
        let id = TimerId(self.next_id());
        self.0.borrow_mut().timers.push((id, delay_ms));
        id
    }

    fn clear_timeout(&mut self, id: TimerId) {
        self.0.borrow_mut().timers.retain(|(t, _)| *t != id);
    }

    fn request_frame(&mut self) -> FrameId {
        let id = FrameId(self.next_id());
        self.0.borrow_mut().frames.push(id);
        id
    }

    fn cancel_frame(&mut self, id: FrameId) {
        self.0.borrow_mut().frames.retain(|f| *f != id);
    }
}

/// Fresh fakes for one player, sharing the given storage.
pub struct FakeHost {
    pub media: FakeMedia,
    pub platform: FakePlatform,
    pub renderer: RecordingSurface,
    pub scheduler: ManualScheduler,
}

impl FakeHost {
    pub fn new(platform: FakePlatform) -> Self {
        Self {
            media: FakeMedia::default(),
            platform,
            renderer: RecordingSurface::default(),
            scheduler: ManualScheduler::default(),
        }
    }

    pub fn bindings(&self, preferences: PreferenceStore) -> PlayerBindings {
        PlayerBindings {
            media: Box::new(self.media.clone()),
            platform: Box::new(self.platform.clone()),
            renderer: Box::new(self.renderer.clone()),
            scheduler: Box::new(self.scheduler.clone()),
            preferences,
        }
    }
}

/// A player wired to fakes, with the fakes kept for inspection.
pub struct Rig {
    pub player: PlayerHandle,
    pub media: FakeMedia,
    pub platform: FakePlatform,
    pub renderer: RecordingSurface,
    pub scheduler: ManualScheduler,
    pub storage: Rc<MemoryStorage>,
}

impl Rig {
    pub fn builder() -> RigBuilder {
        RigBuilder::default()
    }

    pub fn dispatch(&self, event: PlayerEvent) -> EventOutcome {
        self.player.borrow_mut().handle(event)
    }

    /// Media starts playing and reports it.
    pub fn start_playback(&self) {
        self.media.set_paused(false);
        self.dispatch(PlayerEvent::MediaPlay);
    }

    pub fn stop_playback(&self) {
        self.media.set_paused(true);
        self.dispatch(PlayerEvent::MediaPause);
    }

    pub fn fire_idle(&self) {
        let fired = self.scheduler.take_timer();
        assert!(fired.is_some(), "no idle timer pending");
        self.dispatch(PlayerEvent::IdleTimeout);
    }

    pub fn tick_frame(&self) {
        let fired = self.scheduler.take_frame();
        assert!(fired.is_some(), "no frame pending");
        self.dispatch(PlayerEvent::FrameTick);
    }
}

pub struct RigBuilder {
    overrides: ConfigOverrides,
    entries: Vec<(String, String)>,
    storage: Option<Rc<MemoryStorage>>,
    duration: f64,
    platform: FakePlatform,
    playing: bool,
}

impl Default for RigBuilder {
    fn default() -> Self {
        Self {
            overrides: ConfigOverrides::default(),
            entries: Vec::new(),
            storage: None,
            duration: f64::NAN,
            platform: FakePlatform::with_methods(&["requestFullscreen", "exitFullscreen"]),
            playing: false,
        }
    }
}

impl RigBuilder {
    pub fn overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn stored(mut self, key: &str, value: &str) -> Self {
        self.entries.push((key.to_string(), value.to_string()));
        self
    }

    pub fn storage_unavailable(mut self) -> Self {
        self.storage = Some(Rc::new(MemoryStorage::unavailable()));
        self
    }

    pub fn storage_from(mut self, other: &Rig) -> Self {
        self.storage = Some(other.storage.clone());
        self
    }

    pub fn duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    pub fn platform_methods(mut self, methods: &[&str]) -> Self {
        let pip = self.platform.picture_in_picture_available();
        self.platform = FakePlatform::with_methods(methods);
        self.platform.set_pip(pip, false);
        self
    }

    pub fn pip(self, available: bool) -> Self {
        self.platform.set_pip(available, false);
        self
    }

    pub fn already_playing(mut self) -> Self {
        self.playing = true;
        self
    }

    pub fn build(self) -> Rig {
        let storage = self
            .storage
            .unwrap_or_else(|| Rc::new(MemoryStorage::with_entries(self.entries)));
        let host = FakeHost::new(self.platform);
        host.media.set_duration(self.duration);
        host.media.set_paused(!self.playing);

        let config = PlayerConfig::default().merged(&self.overrides);
        let bindings = host.bindings(PreferenceStore::new(storage.clone()));
        let player = Rc::new(RefCell::new(Player::new(config, bindings)));

        Rig {
            player,
            media: host.media,
            platform: host.platform,
            renderer: host.renderer,
            scheduler: host.scheduler,
            storage,
        }
    }
}

/// A page of numbered elements. The selector is recorded, not matched.
#[derive(Default)]
pub struct FakeEnvironment {
    pub attributes: HashMap<u32, ElementAttributes>,
    pub unbindable: HashSet<u32>,
    pub storage: Rc<MemoryStorage>,
    players: PlayerTable<u32>,
    hosts: RefCell<HashMap<u32, FakeHost>>,
    binds: RefCell<usize>,
    wired: RefCell<usize>,
    selectors: RefCell<Vec<String>>,
}

impl FakeEnvironment {
    /// Another view of the same page: same players, same storage, its own
    /// bind counters.
    pub fn same_page(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            players: self.players.clone(),
            ..Default::default()
        }
    }

    pub fn media(&self, element: u32) -> Option<FakeMedia> {
        self.hosts.borrow().get(&element).map(|h| h.media.clone())
    }

    pub fn renderer(&self, element: u32) -> Option<RecordingSurface> {
        self.hosts.borrow().get(&element).map(|h| h.renderer.clone())
    }

    pub fn bind_count(&self) -> usize {
        *self.binds.borrow()
    }

    pub fn wired_count(&self) -> usize {
        *self.wired.borrow()
    }

    pub fn selectors(&self) -> Vec<String> {
        self.selectors.borrow().clone()
    }
}

impl HostEnvironment for FakeEnvironment {
    type Element = u32;
    type Root = Vec<u32>;
    type Wiring = u32;

    fn players(&self) -> &PlayerTable<u32> {
        &self.players
    }

    fn discover(&self, root: &Vec<u32>, selector: &str) -> Vec<u32> {
        self.selectors.borrow_mut().push(selector.to_string());
        root.clone()
    }

    fn attributes(&self, element: &u32) -> ElementAttributes {
        self.attributes.get(element).cloned().unwrap_or_default()
    }

    fn bind(&self, element: &u32, _config: &PlayerConfig) -> Option<(PlayerBindings, u32)> {
        if self.unbindable.contains(element) {
            return None;
        }
        *self.binds.borrow_mut() += 1;
        let host = FakeHost::new(FakePlatform::with_methods(&[
            "requestFullscreen",
            "exitFullscreen",
        ]));
        let bindings = host.bindings(PreferenceStore::new(self.storage.clone()));
        self.hosts.borrow_mut().insert(*element, host);
        Some((bindings, *element))
    }

    fn wire(&self, _wiring: u32, _player: &PlayerHandle) {
        *self.wired.borrow_mut() += 1;
    }
}
