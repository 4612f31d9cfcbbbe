use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use gloo_timers::callback::Timeout;
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::Window;

use crate::components::{EventOutcome, Player, PlayerEvent};
use crate::platform::{FrameId, Scheduler, TimerId};

/// Where DOM callbacks find their player. Filled in once the player exists;
/// weak so the page's listeners never keep a player alive.
pub type PlayerSlot = Rc<RefCell<Weak<RefCell<Player>>>>;

/// Deliver `event` to the slot's player. An event arriving while the player
/// is already handling one (a listener fired synchronously by a DOM write)
/// is dropped.
pub fn dispatch(slot: &PlayerSlot, event: PlayerEvent) -> EventOutcome {
    let Some(handle) = slot.borrow().upgrade() else {
        return EventOutcome::Ignored;
    };
    let Ok(mut player) = handle.try_borrow_mut() else {
        warn!(?event, "re-entrant player event dropped");
        return EventOutcome::Ignored;
    };
    player.handle(event)
}

pub struct WebScheduler {
    window: Window,
    slot: PlayerSlot,
    timers: Rc<RefCell<HashMap<i32, Timeout>>>,
    next_timer: i32,
    frame: Closure<dyn FnMut(f64)>,
}

impl WebScheduler {
    pub fn new(window: Window, slot: PlayerSlot) -> Self {
        let frame_slot = slot.clone();
        let frame = Closure::wrap(Box::new(move |_timestamp: f64| {
            dispatch(&frame_slot, PlayerEvent::FrameTick);
        }) as Box<dyn FnMut(f64)>);
        Self {
            window,
            slot,
            timers: Rc::new(RefCell::new(HashMap::new())),
            next_timer: 0,
            frame,
        }
    }
}

impl Scheduler for WebScheduler {
    fn set_timeout(&mut self, delay_ms: u32) -> TimerId {
        self.next_timer += 1;
        let id = self.next_timer;
        let slot = self.slot.clone();
        let timers = self.timers.clone();
        let timeout = Timeout::new(delay_ms, move || {
            // The Timeout owns this closure; release it from a later task.
            spawn_local(async move {
                let live = timers.borrow_mut().remove(&id).is_some();
                if live {
                    dispatch(&slot, PlayerEvent::IdleTimeout);
                }
            });
        });
        self.timers.borrow_mut().insert(id, timeout);
        TimerId(id)
    }

    fn clear_timeout(&mut self, id: TimerId) {
        // Dropping a gloo Timeout cancels it.
        self.timers.borrow_mut().remove(&id.0);
    }

    fn request_frame(&mut self) -> FrameId {
        let id = self
            .window
            .request_animation_frame(self.frame.as_ref().unchecked_ref())
            .unwrap_or_else(|err| {
                warn!(?err, "requestAnimationFrame failed");
                0
            });
        FrameId(id)
    }

    fn cancel_frame(&mut self, id: FrameId) {
        if id.0 != 0 {
            let _ = self.window.cancel_animation_frame(id.0);
        }
    }
}

impl Drop for WebScheduler {
    fn drop(&mut self) {
        self.timers.borrow_mut().clear();
    }
}
