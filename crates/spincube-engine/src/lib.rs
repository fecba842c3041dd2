//! spincube engine crate.
//!
//! A window, a GPU context, and a cube spinning in it.

pub mod device;
pub mod window;
pub mod time;
pub mod core;

pub mod logging;
pub mod render;
pub mod cube;
