//! Browser bindings: the DOM implementations of the platform traits and the
//! JavaScript-facing API.

mod api;
mod dom;
mod env;
mod events;
mod host;
mod scheduler;

pub use api::*;
pub use dom::{DomSurface, SurfaceNodes};
pub use env::{WebEnvironment, WebRoot};
pub use host::{WebMedia, WebPlatform};
pub use scheduler::{dispatch, PlayerSlot, WebScheduler};
