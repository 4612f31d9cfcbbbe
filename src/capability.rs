//! Fullscreen and picture-in-picture capability detection.
//!
//! Fullscreen exists under several vendor names. The table below is walked
//! once, in preference order, when a player is created; the result is a
//! single resolved strategy instead of a cascade of checks per call.

use tracing::debug;

use crate::platform::PlatformApi;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullscreenVendor {
    Standard,
    Webkit,
    Ms,
}

impl FullscreenVendor {
    pub const PREFERENCE: [FullscreenVendor; 3] = [
        FullscreenVendor::Standard,
        FullscreenVendor::Webkit,
        FullscreenVendor::Ms,
    ];

    pub fn request_method(self) -> &'static str {
        match self {
            FullscreenVendor::Standard => "requestFullscreen",
            FullscreenVendor::Webkit => "webkitRequestFullscreen",
            FullscreenVendor::Ms => "msRequestFullscreen",
        }
    }

    pub fn exit_method(self) -> &'static str {
        match self {
            FullscreenVendor::Standard => "exitFullscreen",
            FullscreenVendor::Webkit => "webkitExitFullscreen",
            FullscreenVendor::Ms => "msExitFullscreen",
        }
    }

    pub fn element_property(self) -> &'static str {
        match self {
            FullscreenVendor::Standard => "fullscreenElement",
            FullscreenVendor::Webkit => "webkitFullscreenElement",
            FullscreenVendor::Ms => "msFullscreenElement",
        }
    }

    pub fn change_event(self) -> &'static str {
        match self {
            FullscreenVendor::Standard => "fullscreenchange",
            FullscreenVendor::Webkit => "webkitfullscreenchange",
            FullscreenVendor::Ms => "msfullscreenchange",
        }
    }

    pub fn change_events() -> impl Iterator<Item = &'static str> {
        Self::PREFERENCE.into_iter().map(Self::change_event)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FullscreenStrategy {
    pub request: FullscreenVendor,
    pub exit: Option<FullscreenVendor>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub fullscreen: Option<FullscreenStrategy>,
    pub pip: bool,
}

impl Capabilities {
    pub fn probe(api: &dyn PlatformApi) -> Self {
        let request = FullscreenVendor::PREFERENCE
            .into_iter()
            .find(|v| api.wrapper_has_method(v.request_method()));
        let exit = FullscreenVendor::PREFERENCE
            .into_iter()
            .find(|v| api.document_has_method(v.exit_method()));
        let fullscreen = request.map(|request| FullscreenStrategy { request, exit });
        let pip = api.picture_in_picture_available();
        debug!(?fullscreen, pip, "resolved capabilities");
        Self { fullscreen, pip }
    }

    pub fn supports_fullscreen(&self) -> bool {
        self.fullscreen.is_some()
    }

    pub fn supports_pip(&self) -> bool {
        self.pip
    }

    /// Any vendor's fullscreen element counts; the page may have entered
    /// fullscreen through a different variant than ours.
    pub fn is_fullscreen(&self, api: &dyn PlatformApi) -> bool {
        FullscreenVendor::PREFERENCE
            .into_iter()
            .any(|v| api.document_has_element(v.element_property()))
    }

    pub fn request_fullscreen(&self, api: &dyn PlatformApi) {
        if let Some(strategy) = self.fullscreen {
            api.call_wrapper_method(strategy.request.request_method());
        }
    }

    pub fn exit_fullscreen(&self, api: &dyn PlatformApi) {
        if let Some(exit) = self.fullscreen.and_then(|s| s.exit) {
            api.call_document_method(exit.exit_method());
        }
    }

    pub fn toggle_fullscreen(&self, api: &dyn PlatformApi) {
        if !self.supports_fullscreen() {
            return;
        }
        if self.is_fullscreen(api) {
            self.exit_fullscreen(api);
        } else {
            self.request_fullscreen(api);
        }
    }

    pub fn toggle_pip(&self, api: &dyn PlatformApi) {
        if !self.pip {
            return;
        }
        if api.picture_in_picture_active() {
            api.exit_picture_in_picture();
        } else {
            api.request_picture_in_picture();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakePlatform;

    #[test]
    fn standard_api_wins_over_prefixes() {
        let platform = FakePlatform::with_methods(&[
            "webkitRequestFullscreen",
            "requestFullscreen",
            "exitFullscreen",
        ]);
        let caps = Capabilities::probe(&platform);
        assert_eq!(
            caps.fullscreen,
            Some(FullscreenStrategy {
                request: FullscreenVendor::Standard,
                exit: Some(FullscreenVendor::Standard),
            })
        );
    }

    #[test]
    fn falls_back_to_prefixed_variant() {
        let platform =
            FakePlatform::with_methods(&["webkitRequestFullscreen", "webkitExitFullscreen"]);
        let caps = Capabilities::probe(&platform);
        caps.request_fullscreen(&platform);
        assert_eq!(platform.calls(), vec!["webkitRequestFullscreen".to_string()]);
    }

    #[test]
    fn missing_fullscreen_is_a_no_op() {
        let platform = FakePlatform::with_methods(&[]);
        let caps = Capabilities::probe(&platform);
        assert!(!caps.supports_fullscreen());
        caps.toggle_fullscreen(&platform);
        assert!(platform.calls().is_empty());
    }

    #[test]
    fn toggle_exits_when_any_vendor_is_fullscreen() {
        let platform = FakePlatform::with_methods(&["requestFullscreen", "exitFullscreen"]);
        platform.set_fullscreen_property(Some("msFullscreenElement"));
        let caps = Capabilities::probe(&platform);
        caps.toggle_fullscreen(&platform);
        assert_eq!(platform.calls(), vec!["exitFullscreen".to_string()]);
    }

    #[test]
    fn pip_toggle_exits_when_active() {
        let platform = FakePlatform::with_methods(&[]);
        platform.set_pip(true, true);
        let caps = Capabilities::probe(&platform);
        caps.toggle_pip(&platform);
        assert_eq!(platform.calls(), vec!["exitPictureInPicture".to_string()]);
    }

    #[test]
    fn change_events_cover_all_vendors() {
        let events: Vec<_> = FullscreenVendor::change_events().collect();
        assert_eq!(
            events,
            vec!["fullscreenchange", "webkitfullscreenchange", "msfullscreenchange"]
        );
    }
}
