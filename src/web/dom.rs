use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    AddEventListenerOptions, Document, Element, Event, EventTarget, HtmlButtonElement, HtmlElement,
    HtmlInputElement, HtmlMediaElement, Node,
};

use crate::components::{Chip, ChipAction, ControlSurface, Icon};
use crate::config::{PlayerConfig, SCRUB_RESOLUTION};
use crate::error::BindError;
use crate::platform::SurfaceRenderer;
use crate::utils::format_number;

/// An event listener that unregisters itself when dropped.
pub struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    pub fn new<F>(target: &EventTarget, event: &'static str, passive: bool, handler: F) -> Self
    where
        F: FnMut(Event) + 'static,
    {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        if passive {
            let options = AddEventListenerOptions::new();
            options.set_passive(true);
            let _ = target.add_event_listener_with_callback_and_add_event_listener_options(
                event,
                callback.as_ref().unchecked_ref(),
                &options,
            );
        } else {
            let _ = target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref());
        }
        Self {
            target: target.clone(),
            event,
            callback,
        }
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }
}

pub type ListenerBag = Rc<RefCell<Vec<Listener>>>;

/// Handles to every widget of one control surface.
#[derive(Clone)]
pub struct SurfaceNodes {
    pub document: Document,
    pub media: HtmlMediaElement,
    pub wrapper: HtmlElement,
    pub click_layer: HtmlElement,
    pub scrub: HtmlInputElement,
    pub play: HtmlButtonElement,
    pub skip_back: HtmlButtonElement,
    pub skip_forward: HtmlButtonElement,
    pub back_step: HtmlElement,
    pub forward_step: HtmlElement,
    pub mute: HtmlButtonElement,
    pub volume: HtmlInputElement,
    pub settings: HtmlButtonElement,
    pub remaining: HtmlElement,
    pub pip: Option<HtmlButtonElement>,
    pub fullscreen: HtmlButtonElement,
    pub popover: HtmlElement,
    pub skip_options: HtmlElement,
    pub rate_options: HtmlElement,
}

fn create<T: JsCast>(document: &Document, tag: &str, class: &str) -> Result<T, BindError> {
    let element = document.create_element(tag)?;
    element.set_class_name(class);
    element
        .dyn_into::<T>()
        .map_err(|_| BindError::Dom(format!("<{tag}> has an unexpected type")))
}

fn icon_button(
    document: &Document,
    class: &str,
    label: &str,
    icon: Icon,
) -> Result<HtmlButtonElement, BindError> {
    let button: HtmlButtonElement = create(document, "button", &format!("vc-btn {class}"))?;
    button.set_type("button");
    button.set_attribute("aria-label", label)?;
    button.set_inner_html(&icon.markup());
    Ok(button)
}

fn range(
    document: &Document,
    class: &str,
    label: &str,
    max: &str,
    step: &str,
) -> Result<HtmlInputElement, BindError> {
    let input: HtmlInputElement = create(document, "input", class)?;
    input.set_type("range");
    input.set_min("0");
    input.set_max(max);
    input.set_step(step);
    input.set_attribute("aria-label", label)?;
    Ok(input)
}

macro_rules! append {
    ($parent:expr, $($child:expr),+ $(,)?) => {
        $( $parent.append_child($child)?; )+
    };
}

impl SurfaceNodes {
    /// Build the control subtree and move `media` inside it. Runs once per
    /// element; the registry guarantees it.
    pub fn build(
        document: &Document,
        media: &HtmlMediaElement,
        config: &PlayerConfig,
    ) -> Result<Self, BindError> {
        let parent = media.parent_node().ok_or(BindError::Detached)?;

        media.set_controls(false);
        if media.get_attribute("preload").map_or(true, |p| p.is_empty()) {
            media.set_attribute("preload", "metadata")?;
        }

        let wrapper: HtmlElement = create(document, "div", "vc-player")?;
        wrapper.set_tab_index(0);
        let media_node: &Node = media.as_ref();
        parent.insert_before(&wrapper, Some(media_node))?;
        wrapper.append_child(media)?;

        let click_layer: HtmlElement = create(document, "div", "vc-clicklayer")?;
        click_layer.set_attribute("aria-hidden", "true")?;

        let controls: HtmlElement = create(document, "div", "vc-controls")?;
        controls.set_attribute("role", "group")?;
        controls.set_attribute("aria-label", "Video controls")?;

        let scrub_row: HtmlElement = create(document, "div", "vc-scrub")?;
        let scrub = range(
            document,
            "vc-scrub-bar",
            "Seek",
            &SCRUB_RESOLUTION.to_string(),
            "1",
        )?;
        scrub.set_value("0");
        append!(scrub_row, &scrub);

        let row: HtmlElement = create(document, "div", "vc-row")?;
        let left: HtmlElement = create(document, "div", "vc-left")?;
        let spacer: HtmlElement = create(document, "div", "vc-spacer")?;
        let right: HtmlElement = create(document, "div", "vc-right")?;

        let play = icon_button(document, "vc-play-button", "Play", Icon::Play)?;
        let skip_back = icon_button(document, "vc-skip-back", "Skip back", Icon::SkipBack)?;
        let skip_forward =
            icon_button(document, "vc-skip-forward", "Skip forward", Icon::SkipForward)?;
        let back_step: HtmlElement = create(document, "span", "vc-skip-step vc-skip-step-back")?;
        let forward_step: HtmlElement =
            create(document, "span", "vc-skip-step vc-skip-step-forward")?;
        let back_wrap: HtmlElement = create(document, "div", "vc-skip-wrap")?;
        append!(back_wrap, &skip_back, &back_step);
        let forward_wrap: HtmlElement = create(document, "div", "vc-skip-wrap")?;
        append!(forward_wrap, &skip_forward, &forward_step);

        let volume_group: HtmlElement = create(document, "div", "vc-volume")?;
        let mute = icon_button(document, "vc-mute-button", "Mute", Icon::Volume)?;
        let volume = range(document, "vc-volume-slider", "Volume", "1", "0.01")?;
        append!(volume_group, &mute, &volume);

        let settings = icon_button(document, "vc-settings-button", "Settings", Icon::Settings)?;
        settings.set_attribute("aria-expanded", "false")?;
        let remaining: HtmlElement = create(document, "div", "vc-time-remaining")?;
        let pip = if config.pip {
            Some(icon_button(
                document,
                "vc-pip-button",
                "Picture in Picture",
                Icon::Pip,
            )?)
        } else {
            None
        };
        let fullscreen =
            icon_button(document, "vc-fullscreen-button", "Fullscreen", Icon::Fullscreen)?;

        append!(left, &play, &back_wrap, &forward_wrap, &volume_group);
        append!(right, &settings, &remaining);
        if let Some(pip) = &pip {
            append!(right, pip);
        }
        append!(right, &fullscreen);
        append!(row, &left, &spacer, &right);
        append!(controls, &scrub_row, &row);

        let popover: HtmlElement = create(document, "div", "vc-popover")?;
        popover.set_attribute("role", "dialog")?;
        popover.set_attribute("aria-label", "Player settings")?;
        popover.set_attribute("aria-hidden", "true")?;
        let skip_heading: HtmlElement = create(document, "h4", "vc-popover-heading")?;
        skip_heading.set_text_content(Some("Skip Buttons"));
        let skip_options: HtmlElement = create(document, "div", "vc-option-row vc-skip-options")?;
        let rate_heading: HtmlElement = create(document, "h4", "vc-popover-heading")?;
        rate_heading.set_text_content(Some("Playback Speed"));
        let rate_options: HtmlElement = create(document, "div", "vc-option-row vc-rate-options")?;
        append!(popover, &skip_heading, &skip_options, &rate_heading, &rate_options);

        append!(wrapper, &click_layer, &controls, &popover);

        Ok(Self {
            document: document.clone(),
            media: media.clone(),
            wrapper,
            click_layer,
            scrub,
            play,
            skip_back,
            skip_forward,
            back_step,
            forward_step,
            mute,
            volume,
            settings,
            remaining,
            pip,
            fullscreen,
            popover,
            skip_options,
            rate_options,
        })
    }

    /// Whether `node` lies inside the wrapper, the wrapper included.
    pub fn contains(&self, node: Option<&Node>) -> bool {
        let wrapper: &Node = self.wrapper.as_ref();
        wrapper.contains(node)
    }
}

/// The DOM side of a player: writes each new surface model into the
/// widgets, touching only what changed since the last render.
pub struct DomSurface {
    nodes: SurfaceNodes,
    listeners: ListenerBag,
    last: Option<ControlSurface>,
    detached: bool,
}

fn changed<T: PartialEq>(
    last: Option<&ControlSurface>,
    next: &ControlSurface,
    field: impl Fn(&ControlSurface) -> T,
) -> bool {
    last.map_or(true, |last| field(last) != field(next))
}

fn render_chips(document: &Document, row: &HtmlElement, chips: &[Chip]) {
    row.set_inner_html("");
    for chip in chips {
        let Ok(button) = create::<HtmlButtonElement>(document, "button", "vc-chip") else {
            continue;
        };
        button.set_type("button");
        button.set_text_content(Some(&chip.label));
        let kind = match chip.action {
            ChipAction::SkipStep(_) => "skip",
            ChipAction::Rate(_) => "rate",
        };
        let _ = button.set_attribute("data-chip-kind", kind);
        let _ = button.set_attribute("data-value", &format_number(chip.value()));
        let _ = button.set_attribute("aria-pressed", if chip.pressed { "true" } else { "false" });
        let _ = row.append_child(&button);
    }
}

impl DomSurface {
    pub fn new(nodes: SurfaceNodes, listeners: ListenerBag) -> Self {
        Self {
            nodes,
            listeners,
            last: None,
            detached: false,
        }
    }
}

impl SurfaceRenderer for DomSurface {
    fn render(&mut self, surface: &ControlSurface) {
        if self.detached {
            return;
        }
        let last = self.last.as_ref();
        let n = &self.nodes;
        let style = n.wrapper.style();
        let classes = n.wrapper.class_list();

        if last.is_none() {
            if let Some(theme) = &surface.theme_class {
                let _ = classes.add_1(theme);
            }
            if let Some(title) = &surface.title {
                let _ = n.wrapper.set_attribute("aria-label", title);
            }
        }
        if changed(last, surface, |s| s.accent.clone()) {
            let _ = style.set_property("--vc-accent", &surface.accent);
        }
        if changed(last, surface, |s| s.progress.clone()) {
            let _ = style.set_property("--vc-progress", &surface.progress);
        }
        if changed(last, surface, |s| s.scrub) {
            n.scrub.set_value(&surface.scrub.to_string());
        }
        if changed(last, surface, |s| s.remaining.clone()) {
            n.remaining.set_text_content(Some(&surface.remaining));
        }

        let _ = classes.toggle_with_force("vc-is-playing", surface.playing);
        let _ = classes.toggle_with_force("vc-ui-hidden", surface.ui_hidden);
        let _ = classes.toggle_with_force("vc-muted", surface.muted);
        let _ = classes.toggle_with_force("vc-fullscreen", surface.fullscreen);

        if changed(last, surface, |s| s.playing) {
            n.play.set_inner_html(&surface.play_icon().markup());
            let label = if surface.playing { "Pause" } else { "Play" };
            let _ = n.play.set_attribute("aria-label", label);
        }
        if changed(last, surface, |s| s.muted) {
            n.mute.set_inner_html(&surface.volume_icon().markup());
            let label = if surface.muted { "Unmute" } else { "Mute" };
            let _ = n.mute.set_attribute("aria-label", label);
        }
        if changed(last, surface, |s| s.fullscreen) {
            n.fullscreen
                .set_inner_html(&surface.fullscreen_icon().markup());
            let label = if surface.fullscreen {
                "Exit fullscreen"
            } else {
                "Fullscreen"
            };
            let _ = n.fullscreen.set_attribute("aria-label", label);
        }
        if changed(last, surface, |s| s.volume.to_bits()) {
            n.volume.set_value(&format_number(surface.volume));
        }

        if changed(last, surface, |s| s.skip_label.clone()) {
            n.back_step.set_text_content(Some(&surface.skip_label));
            n.forward_step.set_text_content(Some(&surface.skip_label));
            let _ = n.skip_back.set_attribute("aria-label", &surface.skip_back_label);
            let _ = n
                .skip_forward
                .set_attribute("aria-label", &surface.skip_forward_label);
        }

        if changed(last, surface, |s| s.popover_open) {
            let open = surface.popover_open;
            let _ = n
                .popover
                .set_attribute("aria-hidden", if open { "false" } else { "true" });
            let _ = n
                .settings
                .set_attribute("aria-expanded", if open { "true" } else { "false" });
            let _ = classes.toggle_with_force("vc-settings-open", open);
        }
        if changed(last, surface, |s| s.skip_chips.clone()) {
            render_chips(&n.document, &n.skip_options, &surface.skip_chips);
        }
        if changed(last, surface, |s| s.rate_chips.clone()) {
            render_chips(&n.document, &n.rate_options, &surface.rate_chips);
        }

        if let Some(pip) = &n.pip {
            if changed(last, surface, |s| s.pip_visible) {
                let pip_style = pip.style();
                if surface.pip_visible {
                    let _ = pip_style.remove_property("display");
                } else {
                    let _ = pip_style.set_property("display", "none");
                }
            }
        }
        n.fullscreen.set_disabled(!surface.fullscreen_enabled);

        self.last = Some(surface.clone());
    }

    fn control_focused(&self) -> bool {
        let Some(active) = self.nodes.document.active_element() else {
            return false;
        };
        let wrapper: &Node = self.nodes.wrapper.as_ref();
        let active: &Node = active.as_ref();
        self.nodes.contains(Some(active)) && !wrapper.is_same_node(Some(active))
    }

    fn detach(&mut self) {
        if self.detached {
            return;
        }
        self.detached = true;
        self.listeners.borrow_mut().clear();

        let n = &self.nodes;
        if let Some(parent) = n.wrapper.parent_node() {
            let wrapper: &Node = n.wrapper.as_ref();
            let _ = parent.insert_before(&n.media, Some(wrapper));
            let _ = parent.remove_child(&n.wrapper);
        } else {
            let _ = n.wrapper.remove_child(&n.media);
        }
    }
}

/// The chip under a delegated click, if any.
pub fn chip_target(event: &Event) -> Option<(String, f64)> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    let chip = target.closest("[data-chip-kind]").ok()??;
    let kind = chip.get_attribute("data-chip-kind")?;
    let value = chip.get_attribute("data-value")?.parse::<f64>().ok()?;
    Some((kind, value))
}
