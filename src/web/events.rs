//! DOM listeners, each translating one browser event into a `PlayerEvent`.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, Event, EventTarget, HtmlElement, HtmlInputElement, KeyboardEvent, Node};

use crate::capability::FullscreenVendor;
use crate::components::{Activity, EventOutcome, PlayerEvent};

use super::dom::{chip_target, Listener, ListenerBag, SurfaceNodes};
use super::scheduler::{dispatch, PlayerSlot};

const MEDIA_EVENTS: [(&str, PlayerEvent); 7] = [
    ("play", PlayerEvent::MediaPlay),
    ("pause", PlayerEvent::MediaPause),
    ("ended", PlayerEvent::MediaEnded),
    ("timeupdate", PlayerEvent::TimeUpdate),
    ("durationchange", PlayerEvent::DurationChange),
    ("loadedmetadata", PlayerEvent::DurationChange),
    ("volumechange", PlayerEvent::VolumeChange),
];

const ACTIVITY_EVENTS: [(&str, Activity); 4] = [
    ("mousemove", Activity::PointerMove),
    ("pointermove", Activity::PointerMove),
    ("touchstart", Activity::TouchStart),
    ("focusin", Activity::Focus),
];

struct Wirer<'a> {
    slot: &'a PlayerSlot,
    listeners: Vec<Listener>,
}

impl Wirer<'_> {
    /// Forward `event` on `target` as whatever `translate` returns.
    fn on<F>(&mut self, target: &EventTarget, event: &'static str, translate: F)
    where
        F: Fn(&Event) -> Option<PlayerEvent> + 'static,
    {
        self.listen(target, event, false, translate);
    }

    fn on_passive<F>(&mut self, target: &EventTarget, event: &'static str, translate: F)
    where
        F: Fn(&Event) -> Option<PlayerEvent> + 'static,
    {
        self.listen(target, event, true, translate);
    }

    fn listen<F>(&mut self, target: &EventTarget, event: &'static str, passive: bool, translate: F)
    where
        F: Fn(&Event) -> Option<PlayerEvent> + 'static,
    {
        let slot = self.slot.clone();
        self.listeners
            .push(Listener::new(target, event, passive, move |e: Event| {
                if let Some(player_event) = translate(&e) {
                    dispatch(&slot, player_event);
                }
            }));
    }

    fn click(&mut self, target: &EventTarget, event: PlayerEvent) {
        self.on(target, "click", move |_| Some(event.clone()));
    }
}

/// Text-entry targets keep their keys; range sliders and buttons do not.
fn is_editable_target(event: &Event) -> bool {
    let Some(element) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
        return false;
    };
    if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
        return !matches!(input.type_().as_str(), "range" | "button" | "checkbox");
    }
    let tag = element.tag_name().to_ascii_lowercase();
    tag == "textarea"
        || tag == "select"
        || element
            .get_attribute("contenteditable")
            .map_or(false, |v| v.to_ascii_lowercase() != "false")
}

/// Uses the path captured at dispatch: a chip click re-renders its row, so
/// by the time the click reaches the document its target is detached.
fn click_inside(event: &Event, wrapper: &HtmlElement) -> bool {
    let path = event.composed_path();
    if path.length() > 0 {
        let wrapper: &JsValue = wrapper.as_ref();
        return path.iter().any(|node| &node == wrapper);
    }
    let target = event.target().and_then(|t| t.dyn_into::<Node>().ok());
    let wrapper: &Node = wrapper.as_ref();
    wrapper.contains(target.as_ref())
}

fn input_value(event: &Event) -> Option<String> {
    event
        .target()?
        .dyn_into::<HtmlInputElement>()
        .ok()
        .map(|input| input.value())
}

/// Attach every listener for one player and hand them to `bag`, which the
/// surface empties on detach.
pub fn wire(nodes: &SurfaceNodes, slot: &PlayerSlot, bag: &ListenerBag) {
    let mut w = Wirer {
        slot,
        listeners: Vec::new(),
    };

    for (name, event) in MEDIA_EVENTS {
        w.on(&nodes.media, name, move |_| Some(event.clone()));
    }
    for name in FullscreenVendor::change_events() {
        w.on(&nodes.document, name, |_| Some(PlayerEvent::FullscreenChange));
    }

    let wrapper = nodes.wrapper.clone();
    w.on(&nodes.document, "click", move |e| {
        Some(PlayerEvent::DocumentClick {
            inside_surface: click_inside(e, &wrapper),
        })
    });

    w.click(&nodes.click_layer, PlayerEvent::TogglePlay);
    w.click(&nodes.play, PlayerEvent::TogglePlay);
    w.click(&nodes.skip_back, PlayerEvent::SkipBack);
    w.click(&nodes.skip_forward, PlayerEvent::SkipForward);
    w.click(&nodes.mute, PlayerEvent::ToggleMute);
    w.click(&nodes.fullscreen, PlayerEvent::ToggleFullscreen);
    if let Some(pip) = &nodes.pip {
        w.click(pip, PlayerEvent::TogglePip);
    }
    w.on(&nodes.settings, "click", |e| {
        // The document listener would otherwise close what we just opened.
        e.stop_propagation();
        Some(PlayerEvent::ToggleSettings)
    });
    w.on(&nodes.popover, "click", |e| {
        let (kind, value) = chip_target(e)?;
        match kind.as_str() {
            "skip" => Some(PlayerEvent::SelectSkipStep(value)),
            "rate" => Some(PlayerEvent::SelectRate(value)),
            _ => None,
        }
    });

    w.on(&nodes.scrub, "pointerdown", |_| Some(PlayerEvent::ScrubStart));
    w.on(&nodes.scrub, "pointerup", |_| Some(PlayerEvent::ScrubEnd));
    w.on(&nodes.scrub, "pointercancel", |_| Some(PlayerEvent::ScrubEnd));
    w.on(&nodes.scrub, "input", |e| {
        let value = input_value(e)?.parse::<f64>().ok()?;
        Some(PlayerEvent::ScrubInput(value.round().max(0.0) as u32))
    });
    w.on(&nodes.volume, "input", |e| {
        let value = input_value(e)?.parse::<f64>().ok()?;
        Some(PlayerEvent::VolumeInput(value))
    });

    for (name, activity) in ACTIVITY_EVENTS {
        w.on_passive(&nodes.wrapper, name, move |_| {
            Some(PlayerEvent::Activity(activity))
        });
    }

    // Hotkeys need preventDefault, so this one dispatches by hand.
    let key_slot = slot.clone();
    w.listeners.push(Listener::new(
        &nodes.wrapper,
        "keydown",
        false,
        move |e: Event| {
            let Some(key_event) = e.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            if key_event.default_prevented() || key_event.is_composing() || is_editable_target(&e)
            {
                return;
            }
            let outcome = dispatch(&key_slot, PlayerEvent::KeyDown(key_event.key()));
            if outcome == EventOutcome::Consumed {
                e.prevent_default();
            }
        },
    ));

    bag.borrow_mut().extend(w.listeners);
}
