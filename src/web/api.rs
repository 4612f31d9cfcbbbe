//! The JavaScript API.
//!
//! ```javascript
//! import init, { VidChrome, defaultManager } from 'vidchrome';
//!
//! await init();
//! const video = document.querySelector('#trailer');
//! const player = defaultManager().get(video) ?? new VidChrome().add(video, { skipStep: 30 });
//! player.setPlaybackRate(1.5);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlMediaElement};

use crate::components::{PlayerHandle, Registry};
use crate::config::ConfigOverrides;

use super::env::{WebEnvironment, WebRoot};

thread_local! {
    static DEFAULT_MANAGER: RefCell<Option<VidChrome>> = const { RefCell::new(None) };
}

/// Read a plain options object. Anything unusable means "no overrides".
fn overrides_from_js(options: &JsValue) -> ConfigOverrides {
    if options.is_undefined() || options.is_null() {
        return ConfigOverrides::default();
    }
    let json = match js_sys::JSON::stringify(options) {
        Ok(json) => json.as_string().unwrap_or_default(),
        Err(err) => {
            warn!(?err, "options are not serializable, ignoring");
            return ConfigOverrides::default();
        }
    };
    ConfigOverrides::from_json(&json).unwrap_or_else(|err| {
        warn!(%err, "ignoring invalid options");
        ConfigOverrides::default()
    })
}

fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// A manager: one registry over the current document.
#[wasm_bindgen]
#[derive(Clone)]
pub struct VidChrome {
    registry: Rc<RefCell<Registry<WebEnvironment>>>,
}

#[wasm_bindgen]
impl VidChrome {
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<VidChrome, JsValue> {
        let env = WebEnvironment::new().map_err(to_js_error)?;
        let overrides = overrides_from_js(&options);
        Ok(Self {
            registry: Rc::new(RefCell::new(Registry::new(env, &overrides))),
        })
    }

    /// Attach to every matching element under `root` (the document when
    /// omitted). Returns how many elements are now controlled there.
    pub fn init(&self, root: Option<Element>) -> usize {
        let mut registry = self.registry.borrow_mut();
        let root = match root {
            Some(element) => WebRoot::Element(element),
            None => WebRoot::Document(registry.env().document().clone()),
        };
        registry.discover_and_attach(&root).len()
    }

    /// `undefined` when `element` is not a media element or cannot be
    /// wrapped.
    pub fn add(&self, element: Element, options: JsValue) -> Option<VidChromePlayer> {
        let media = element.dyn_into::<HtmlMediaElement>().ok()?;
        let overrides = overrides_from_js(&options);
        self.registry
            .borrow_mut()
            .attach(&media, &overrides)
            .map(VidChromePlayer::from)
    }

    pub fn get(&self, element: Element) -> Option<VidChromePlayer> {
        let media = element.dyn_into::<HtmlMediaElement>().ok()?;
        self.registry
            .borrow()
            .lookup(&media)
            .map(VidChromePlayer::from)
    }

    pub fn destroy(&self, element: Element) -> bool {
        let Ok(media) = element.dyn_into::<HtmlMediaElement>() else {
            return false;
        };
        self.registry.borrow_mut().detach(&media)
    }

    #[wasm_bindgen(js_name = destroyAll)]
    pub fn destroy_all(&self) -> usize {
        self.registry.borrow_mut().detach_all()
    }

    #[wasm_bindgen(getter)]
    pub fn size(&self) -> usize {
        self.registry.borrow().len()
    }

    /// Effective manager configuration as a plain object.
    #[wasm_bindgen(getter)]
    pub fn config(&self) -> Result<JsValue, JsValue> {
        let json = serde_json::to_string(self.registry.borrow().config()).map_err(to_js_error)?;
        js_sys::JSON::parse(&json)
    }
}

/// Handle to one attached player.
#[wasm_bindgen]
pub struct VidChromePlayer {
    handle: PlayerHandle,
}

impl From<PlayerHandle> for VidChromePlayer {
    fn from(handle: PlayerHandle) -> Self {
        Self { handle }
    }
}

impl VidChromePlayer {
    fn with(&self, f: impl FnOnce(&mut crate::components::Player)) {
        match self.handle.try_borrow_mut() {
            Ok(mut player) => f(&mut player),
            Err(_) => warn!("player busy, call ignored"),
        }
    }
}

#[wasm_bindgen]
impl VidChromePlayer {
    pub fn play(&self) {
        self.with(|p| p.play());
    }

    pub fn pause(&self) {
        self.with(|p| p.pause());
    }

    #[wasm_bindgen(js_name = togglePlay)]
    pub fn toggle_play(&self) {
        self.with(|p| p.toggle_play());
    }

    #[wasm_bindgen(js_name = seekBy)]
    pub fn seek_by(&self, seconds: f64) {
        self.with(|p| p.seek_by(seconds));
    }

    #[wasm_bindgen(js_name = setAccent)]
    pub fn set_accent(&self, hex: &str) {
        self.with(|p| p.set_accent(hex));
    }

    #[wasm_bindgen(js_name = toggleMute)]
    pub fn toggle_mute(&self) {
        self.with(|p| p.toggle_mute());
    }

    #[wasm_bindgen(js_name = toggleFullscreen)]
    pub fn toggle_fullscreen(&self) {
        self.with(|p| p.toggle_fullscreen());
    }

    #[wasm_bindgen(js_name = togglePictureInPicture)]
    pub fn toggle_picture_in_picture(&self) {
        self.with(|p| p.toggle_picture_in_picture());
    }

    #[wasm_bindgen(js_name = setSkipStep)]
    pub fn set_skip_step(&self, seconds: f64) {
        self.with(|p| p.set_skip_step(seconds));
    }

    #[wasm_bindgen(js_name = setPlaybackRate)]
    pub fn set_playback_rate(&self, rate: f64) {
        self.with(|p| p.set_playback_rate(rate));
    }

    #[wasm_bindgen(js_name = openSettings)]
    pub fn open_settings(&self) {
        self.with(|p| p.open_settings());
    }

    #[wasm_bindgen(js_name = closeSettings)]
    pub fn close_settings(&self) {
        self.with(|p| p.close_settings());
    }

    #[wasm_bindgen(js_name = toggleSettings)]
    pub fn toggle_settings(&self) {
        self.with(|p| p.toggle_settings());
    }

    pub fn destroy(&self) {
        self.with(|p| p.destroy());
    }

    #[wasm_bindgen(getter, js_name = skipStep)]
    pub fn skip_step(&self) -> u32 {
        self.handle.try_borrow().map_or(0, |p| p.skip_step())
    }

    #[wasm_bindgen(getter, js_name = settingsOpen)]
    pub fn settings_open(&self) -> bool {
        self.handle.try_borrow().map_or(false, |p| p.is_settings_open())
    }

    #[wasm_bindgen(getter, js_name = supportsFullscreen)]
    pub fn supports_fullscreen(&self) -> bool {
        self.handle
            .try_borrow()
            .map_or(false, |p| p.capabilities().supports_fullscreen())
    }

    #[wasm_bindgen(getter, js_name = supportsPictureInPicture)]
    pub fn supports_picture_in_picture(&self) -> bool {
        self.handle
            .try_borrow()
            .map_or(false, |p| p.capabilities().supports_pip())
    }

    #[wasm_bindgen(getter)]
    pub fn destroyed(&self) -> bool {
        self.handle.try_borrow().map_or(false, |p| p.is_destroyed())
    }
}

#[wasm_bindgen(js_name = version)]
pub fn library_version() -> String {
    crate::version().to_string()
}

/// The manager created at start-up, once the document is ready.
#[wasm_bindgen(js_name = defaultManager)]
pub fn default_manager() -> Option<VidChrome> {
    DEFAULT_MANAGER.with(|slot| slot.borrow().clone())
}

fn init_default_manager() {
    let exists = DEFAULT_MANAGER.with(|slot| slot.borrow().is_some());
    if exists {
        return;
    }
    match VidChrome::new(JsValue::UNDEFINED) {
        Ok(manager) => {
            let count = manager.init(None);
            debug!(count, "default manager initialized");
            DEFAULT_MANAGER.with(|slot| *slot.borrow_mut() = Some(manager));
        }
        Err(err) => warn!(?err, "no document, skipping auto-init"),
    }
}

fn on_dom_ready(document: &Document, f: fn()) {
    if document.ready_state() != "loading" {
        f();
        return;
    }
    let callback = Closure::wrap(Box::new(f) as Box<dyn FnMut()>);
    let _ = document
        .add_event_listener_with_callback("DOMContentLoaded", callback.as_ref().unchecked_ref());
    callback.forget();
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if let Some(document) = web_sys::window().and_then(|w| w.document()) {
        on_dom_ready(&document, init_default_manager);
    }
}
