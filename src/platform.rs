//! Seams between the controller and the host page.
//!
//! The browser implementations live in `crate::web`; tests drive the same
//! traits with in-memory fakes.

use crate::components::ControlSurface;
use crate::db::PreferenceStore;

/// The host `<video>`/`<audio>` element. Every getter reads live state;
/// callers must not cache results across a suspension point.
pub trait MediaHost {
    fn paused(&self) -> bool;
    fn current_time(&self) -> f64;
    fn set_current_time(&self, seconds: f64);
    /// NaN or infinite until metadata is known.
    fn duration(&self) -> f64;
    fn volume(&self) -> f64;
    fn set_volume(&self, volume: f64);
    fn muted(&self) -> bool;
    fn set_muted(&self, muted: bool);
    fn playback_rate(&self) -> f64;
    fn set_playback_rate(&self, rate: f64);
    /// Fire-and-forget. The outcome arrives later as `play`/`pause`
    /// notifications; a rejection is swallowed.
    fn request_play(&self);
    fn pause(&self);
    fn set_native_controls(&self, enabled: bool);
}

/// Reflection over document/wrapper features that come in vendor-prefixed
/// variants, plus picture-in-picture.
pub trait PlatformApi {
    /// Whether the control wrapper exposes a callable method `name`.
    fn wrapper_has_method(&self, name: &str) -> bool;
    fn document_has_method(&self, name: &str) -> bool;
    /// Whether the document property `name` currently holds an element.
    fn document_has_element(&self, name: &str) -> bool;
    fn call_wrapper_method(&self, name: &str);
    fn call_document_method(&self, name: &str);

    /// `document.pictureInPictureEnabled` and a `requestPictureInPicture`
    /// method on the media element.
    fn picture_in_picture_available(&self) -> bool;
    fn picture_in_picture_active(&self) -> bool;
    /// Asynchronous; failures are swallowed.
    fn request_picture_in_picture(&self);
    /// Asynchronous; failures are swallowed.
    fn exit_picture_in_picture(&self);
}

/// Writes the surface model into real widgets.
pub trait SurfaceRenderer {
    /// Idempotent: called after every event with the full model.
    fn render(&mut self, surface: &ControlSurface);
    /// True when focus sits on an interactive descendant of the wrapper
    /// (the wrapper itself does not count).
    fn control_focused(&self) -> bool;
    /// Put the media element back where it was and drop the subtree.
    fn detach(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub i32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub i32);

/// One-shot timers and display-frame callbacks. Fired timers arrive as
/// `PlayerEvent::IdleTimeout`, frames as `PlayerEvent::FrameTick`.
pub trait Scheduler {
    fn set_timeout(&mut self, delay_ms: u32) -> TimerId;
    fn clear_timeout(&mut self, id: TimerId);
    fn request_frame(&mut self) -> FrameId;
    fn cancel_frame(&mut self, id: FrameId);
}

/// Everything a player needs from its host, built once per element.
pub struct PlayerBindings {
    pub media: Box<dyn MediaHost>,
    pub platform: Box<dyn PlatformApi>,
    pub renderer: Box<dyn SurfaceRenderer>,
    pub scheduler: Box<dyn Scheduler>,
    pub preferences: PreferenceStore,
}
