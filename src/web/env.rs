use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::warn;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlMediaElement, Window};

use crate::components::{HostEnvironment, PlayerHandle, PlayerTable};
use crate::config::{ElementAttributes, PlayerConfig};
use crate::db::PreferenceStore;
use crate::error::BindError;
use crate::platform::PlayerBindings;

use super::dom::{DomSurface, ListenerBag, SurfaceNodes};
use super::events;
use super::host::{WebMedia, WebPlatform};
use super::scheduler::{PlayerSlot, WebScheduler};

thread_local! {
    static PAGE_PLAYERS: PlayerTable<HtmlMediaElement> = Rc::default();
}

/// Where discovery starts.
#[derive(Clone)]
pub enum WebRoot {
    Document(Document),
    Element(Element),
}

/// Built DOM waiting for its player.
pub struct DomWiring {
    nodes: SurfaceNodes,
    slot: PlayerSlot,
    listeners: ListenerBag,
}

/// The current page. Every manager sees the same players table and the same
/// `localStorage`.
pub struct WebEnvironment {
    window: Window,
    document: Document,
    players: PlayerTable<HtmlMediaElement>,
    preferences: PreferenceStore,
}

impl WebEnvironment {
    pub fn new() -> Result<Self, BindError> {
        let window = web_sys::window().ok_or(BindError::NoDocument)?;
        let document = window.document().ok_or(BindError::NoDocument)?;
        Ok(Self {
            window,
            document,
            players: PAGE_PLAYERS.with(Rc::clone),
            preferences: PreferenceStore::local(),
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

impl HostEnvironment for WebEnvironment {
    type Element = HtmlMediaElement;
    type Root = WebRoot;
    type Wiring = DomWiring;

    fn players(&self) -> &PlayerTable<HtmlMediaElement> {
        &self.players
    }

    fn discover(&self, root: &WebRoot, selector: &str) -> Vec<HtmlMediaElement> {
        let found = match root {
            WebRoot::Document(document) => document.query_selector_all(selector),
            WebRoot::Element(element) => element.query_selector_all(selector),
        };
        let list = match found {
            Ok(list) => list,
            Err(err) => {
                warn!(selector, ?err, "invalid selector");
                return Vec::new();
            }
        };
        (0..list.length())
            .filter_map(|i| list.get(i))
            .filter_map(|node| node.dyn_into::<HtmlMediaElement>().ok())
            .collect()
    }

    fn attributes(&self, element: &HtmlMediaElement) -> ElementAttributes {
        let data = |name: &str| element.get_attribute(&format!("data-{name}"));
        ElementAttributes {
            accent: data("accent"),
            autohide: data("autohide"),
            hotkeys: data("hotkeys"),
            pip: data("pip"),
            skip: data("skip"),
            theme: data("theme"),
            title: data("title"),
        }
    }

    fn bind(
        &self,
        element: &HtmlMediaElement,
        config: &PlayerConfig,
    ) -> Option<(PlayerBindings, DomWiring)> {
        let nodes = match SurfaceNodes::build(&self.document, element, config) {
            Ok(nodes) => nodes,
            Err(err) => {
                warn!(%err, "cannot build controls for media element");
                return None;
            }
        };
        let slot: PlayerSlot = Rc::new(RefCell::new(Weak::new()));
        let listeners: ListenerBag = Rc::default();

        let bindings = PlayerBindings {
            media: Box::new(WebMedia::new(element.clone())),
            platform: Box::new(WebPlatform::new(
                nodes.wrapper.clone(),
                element.clone(),
                self.document.clone(),
            )),
            renderer: Box::new(DomSurface::new(nodes.clone(), listeners.clone())),
            scheduler: Box::new(WebScheduler::new(self.window.clone(), slot.clone())),
            preferences: self.preferences.clone(),
        };
        Some((
            bindings,
            DomWiring {
                nodes,
                slot,
                listeners,
            },
        ))
    }

    fn wire(&self, wiring: DomWiring, player: &PlayerHandle) {
        *wiring.slot.borrow_mut() = Rc::downgrade(player);
        events::wire(&wiring.nodes, &wiring.slot, &wiring.listeners);
    }
}
