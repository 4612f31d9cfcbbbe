//! VidChrome - a custom control overlay for native `<video>`/`<audio>` elements.
//!
//! The host media element keeps decoding and rendering; this crate replaces
//! its built-in chrome with a scrub bar, transport buttons, volume control,
//! settings popover and fullscreen / picture-in-picture toggles, and keeps
//! them in step with the element's live state.
//!
//! The controller core is platform independent and driven through the
//! traits in [`platform`]. On `wasm32` the `web` module binds it to the DOM
//! and exports a JavaScript API:
//!
//! ```javascript
//! import init, { VidChrome } from 'vidchrome';
//!
//! await init();
//! const chrome = new VidChrome({ accent: '#e11d48', skipStep: 30 });
//! chrome.init();
//! chrome.get(document.querySelector('video'))?.play();
//! ```

pub mod capability;
pub mod components;
pub mod config;
pub mod db;
pub mod error;
pub mod platform;
pub mod utils;

#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(test)]
mod testing;

pub use capability::Capabilities;
pub use components::{Player, PlayerEvent, PlayerHandle, Registry};
pub use config::{ConfigOverrides, PlayerConfig};
pub use db::PreferenceStore;

/// Library version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
