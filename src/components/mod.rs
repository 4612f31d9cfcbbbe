//! The components module contains the control surface and the players
//! that drive it.

mod icons;
mod player;
mod registry;
mod surface;

pub use icons::*;
pub use player::*;
pub use registry::*;
pub use surface::*;
