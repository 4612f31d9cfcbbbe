//! Element-to-player side table.
//!
//! Elements are never stamped with their player. Every registry over the
//! same page shares one [`PlayerTable`], so an element has at most one
//! player no matter how many managers try to attach to it. Each registry
//! also remembers the players it created itself; those are what
//! [`Registry::detach_all`] tears down.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use crate::components::player::{Player, PlayerHandle};
use crate::config::{ConfigOverrides, ElementAttributes, PlayerConfig};
use crate::platform::PlayerBindings;

/// Page-wide element to player association. Holds weak handles; the
/// registry that created a player keeps it alive.
pub type PlayerTable<E> = Rc<RefCell<Vec<(E, Weak<RefCell<Player>>)>>>;

/// The page a registry manages: how to find elements, read their
/// attributes, and build the host bindings for a new player.
pub trait HostEnvironment {
    /// Compared by identity.
    type Element: Clone + PartialEq;
    type Root;
    /// Whatever `bind` produced that still needs the player handle, such
    /// as listener targets.
    type Wiring;

    /// The table shared by every registry over this page.
    fn players(&self) -> &PlayerTable<Self::Element>;
    fn discover(&self, root: &Self::Root, selector: &str) -> Vec<Self::Element>;
    fn attributes(&self, element: &Self::Element) -> ElementAttributes;
    /// Build the surface and bindings. `None` when the element cannot host
    /// a player; the environment logs why.
    fn bind(
        &self,
        element: &Self::Element,
        config: &PlayerConfig,
    ) -> Option<(PlayerBindings, Self::Wiring)>;
    fn wire(&self, wiring: Self::Wiring, player: &PlayerHandle);
}

pub struct Registry<H: HostEnvironment> {
    env: H,
    config: PlayerConfig,
    owned: Vec<(H::Element, PlayerHandle)>,
}

impl<H: HostEnvironment> Registry<H> {
    /// Manager-level configuration: defaults plus `overrides`.
    pub fn new(env: H, overrides: &ConfigOverrides) -> Self {
        Self {
            env,
            config: PlayerConfig::default().merged(overrides),
            owned: Vec::new(),
        }
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn env(&self) -> &H {
        &self.env
    }

    /// Attach to every element under `root` matching the configured
    /// selector. Returns the players for all matches, new or existing.
    pub fn discover_and_attach(&mut self, root: &H::Root) -> Vec<PlayerHandle> {
        let elements = self.env.discover(root, &self.config.selector);
        debug!(count = elements.len(), "discovered media elements");
        elements
            .iter()
            .filter_map(|element| self.attach(element, &ConfigOverrides::default()))
            .collect()
    }

    /// Idempotent across every registry on the page: an element that
    /// already has a live player gets it back unchanged and `overrides`
    /// are ignored.
    pub fn attach(
        &mut self,
        element: &H::Element,
        overrides: &ConfigOverrides,
    ) -> Option<PlayerHandle> {
        self.prune();
        if let Some(existing) = self.lookup(element) {
            if !overrides.is_empty() {
                debug!("element already has a player, options ignored");
            }
            return Some(existing);
        }

        let attributes = self.env.attributes(element);
        let config = self.config.for_element(&attributes, overrides);
        let (bindings, wiring) = self.env.bind(element, &config)?;
        let player = Rc::new(RefCell::new(Player::new(config, bindings)));
        self.env.wire(wiring, &player);
        self.env
            .players()
            .borrow_mut()
            .push((element.clone(), Rc::downgrade(&player)));
        self.owned.push((element.clone(), player.clone()));
        debug!(players = self.owned.len(), "attached player");
        Some(player)
    }

    /// The element's live player, whichever registry created it.
    pub fn lookup(&self, element: &H::Element) -> Option<PlayerHandle> {
        self.env
            .players()
            .borrow()
            .iter()
            .filter(|(e, _)| e == element)
            .filter_map(|(_, player)| player.upgrade())
            .find(is_live)
    }

    /// Destroy and forget the element's player, whichever registry created
    /// it. Returns whether a live one existed.
    pub fn detach(&mut self, element: &H::Element) -> bool {
        let player = self.lookup(element);
        self.owned.retain(|(e, _)| e != element);
        self.env.players().borrow_mut().retain(|(e, _)| e != element);
        match player {
            Some(player) => {
                destroy(&player);
                true
            }
            None => false,
        }
    }

    /// Tear down the players this registry created. Players another
    /// registry created are left alone.
    pub fn detach_all(&mut self) -> usize {
        let players = std::mem::take(&mut self.owned);
        let count = players.len();
        self.env
            .players()
            .borrow_mut()
            .retain(|(e, _)| !players.iter().any(|(owned, _)| owned == e));
        for (_, player) in &players {
            destroy(player);
        }
        debug!(count, "detached all players");
        count
    }

    /// Live players this registry created.
    pub fn len(&self) -> usize {
        self.owned.iter().filter(|(_, p)| is_live(p)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn prune(&mut self) {
        self.owned.retain(|(_, player)| is_live(player));
        self.env
            .players()
            .borrow_mut()
            .retain(|(_, player)| player.upgrade().is_some_and(|p| is_live(&p)));
    }
}

/// A player busy handling an event is alive by definition.
fn is_live(player: &PlayerHandle) -> bool {
    player
        .try_borrow()
        .map(|p| !p.is_destroyed())
        .unwrap_or(true)
}

fn destroy(player: &PlayerHandle) {
    match player.try_borrow_mut() {
        Ok(mut player) => player.destroy(),
        Err(_) => warn!("player busy, teardown skipped"),
    }
}
