use js_sys::{Function, Promise, Reflect};
use tracing::debug;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Document, HtmlElement, HtmlMediaElement};

use crate::platform::{MediaHost, PlatformApi};
use crate::utils::clamp;

/// A live `HTMLMediaElement`. Nothing is cached.
pub struct WebMedia {
    element: HtmlMediaElement,
}

impl WebMedia {
    pub fn new(element: HtmlMediaElement) -> Self {
        Self { element }
    }
}

impl MediaHost for WebMedia {
    fn paused(&self) -> bool {
        self.element.paused()
    }

    fn current_time(&self) -> f64 {
        self.element.current_time()
    }

    fn set_current_time(&self, seconds: f64) {
        self.element.set_current_time(seconds);
    }

    fn duration(&self) -> f64 {
        self.element.duration()
    }

    fn volume(&self) -> f64 {
        self.element.volume()
    }

    fn set_volume(&self, volume: f64) {
        // Out-of-range values throw on the JS side.
        self.element.set_volume(clamp(volume, 0.0, 1.0));
    }

    fn muted(&self) -> bool {
        self.element.muted()
    }

    fn set_muted(&self, muted: bool) {
        self.element.set_muted(muted);
    }

    fn playback_rate(&self) -> f64 {
        self.element.playback_rate()
    }

    fn set_playback_rate(&self, rate: f64) {
        self.element.set_playback_rate(rate);
    }

    fn request_play(&self) {
        match self.element.play() {
            Ok(promise) => settle_quietly("play", promise),
            Err(err) => debug!(?err, "play request threw"),
        }
    }

    fn pause(&self) {
        if let Err(err) = self.element.pause() {
            debug!(?err, "pause request threw");
        }
    }

    fn set_native_controls(&self, enabled: bool) {
        self.element.set_controls(enabled);
    }
}

/// Vendor-prefixed fullscreen and picture-in-picture, reached through
/// reflection because web-sys only models the standard names.
pub struct WebPlatform {
    wrapper: HtmlElement,
    media: HtmlMediaElement,
    document: Document,
}

impl WebPlatform {
    pub fn new(wrapper: HtmlElement, media: HtmlMediaElement, document: Document) -> Self {
        Self {
            wrapper,
            media,
            document,
        }
    }
}

fn property(target: &JsValue, name: &str) -> JsValue {
    Reflect::get(target, &JsValue::from_str(name)).unwrap_or(JsValue::UNDEFINED)
}

fn has_method(target: &JsValue, name: &str) -> bool {
    property(target, name).is_function()
}

fn call_method(target: &JsValue, name: &str) {
    let Ok(method) = property(target, name).dyn_into::<Function>() else {
        return;
    };
    match method.call0(target) {
        Ok(result) => {
            if let Ok(promise) = result.dyn_into::<Promise>() {
                settle_quietly(name, promise);
            }
        }
        Err(err) => debug!(method = name, ?err, "platform call threw"),
    }
}

/// Await a platform promise and drop the outcome; the media element reports
/// what actually happened through its own events.
fn settle_quietly(what: &str, promise: Promise) {
    let what = what.to_string();
    spawn_local(async move {
        if let Err(err) = JsFuture::from(promise).await {
            debug!(request = %what, ?err, "platform request rejected");
        }
    });
}

impl PlatformApi for WebPlatform {
    fn wrapper_has_method(&self, name: &str) -> bool {
        has_method(self.wrapper.as_ref(), name)
    }

    fn document_has_method(&self, name: &str) -> bool {
        has_method(self.document.as_ref(), name)
    }

    fn document_has_element(&self, name: &str) -> bool {
        let value = property(self.document.as_ref(), name);
        !value.is_null() && !value.is_undefined()
    }

    fn call_wrapper_method(&self, name: &str) {
        call_method(self.wrapper.as_ref(), name);
    }

    fn call_document_method(&self, name: &str) {
        call_method(self.document.as_ref(), name);
    }

    fn picture_in_picture_available(&self) -> bool {
        let enabled = property(self.document.as_ref(), "pictureInPictureEnabled");
        enabled.as_bool() == Some(true) && has_method(self.media.as_ref(), "requestPictureInPicture")
    }

    fn picture_in_picture_active(&self) -> bool {
        self.document_has_element("pictureInPictureElement")
    }

    fn request_picture_in_picture(&self) {
        call_method(self.media.as_ref(), "requestPictureInPicture");
    }

    fn exit_picture_in_picture(&self) {
        call_method(self.document.as_ref(), "exitPictureInPicture");
    }
}
