pub mod geometry;
pub mod spin;
pub mod widget;

pub use spin::{Selection, SpinEngine};
pub use widget::{Ring, Wheel};
